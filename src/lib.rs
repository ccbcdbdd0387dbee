//! Coastal bacterial-risk prediction service.
//!
//! Pipeline per request: feature vectorization -> physics prior + learned
//! residual -> tier classification -> deterministic 8x8 risk grid. The
//! learned model is an opaque residual function loaded once at startup;
//! everything else is pure and synchronous.

pub mod config;
pub mod error;
pub mod features;
pub mod grid;
pub mod meta;
pub mod model;
pub mod physics;
pub mod scorer;
pub mod types;
