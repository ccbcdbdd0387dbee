//! Feature vectorization: typed request -> fixed-order f32 vector.
//!
//! Vector order is the trained model's input schema. It must never be
//! reordered once a model has been trained against it.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

use crate::types::PredictionRequest;

/// Beach ids in training order. Index 0 doubles as the fallback for ids the
/// model has never seen.
pub const DEFAULT_GEOMS: &[&str] = &["IB", "COR", "PL", "LJS", "MB", "OB"];

pub const FEATURES_BASIC: &[&str] = &[
    "rainfall72_mm",
    "wind_ms",
    "tide_phase",
    "wave_height_m",
    "sst_c",
    "community_score",
];

pub const FEATURES_TEMPORAL: &[&str] = &[
    "hour_sin",
    "hour_cos",
    "month_sin",
    "month_cos",
    "is_weekend",
    "rain_trend_24h",
];

/// Which input layout the loaded artifact was trained against. Chosen from
/// the metadata sidecar at startup, never inferred from vector length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSchema {
    /// Six raw readings + geom_idx.
    Basic7,
    /// Raw readings + cyclical time encodings + weekend flag + rain trend
    /// + geom_idx.
    Temporal13,
}

impl FeatureSchema {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "basic_v1" => Some(Self::Basic7),
            "temporal_v2" => Some(Self::Temporal13),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Basic7 => 7,
            Self::Temporal13 => 13,
        }
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = FEATURES_BASIC.iter().map(|s| s.to_string()).collect();
        if *self == Self::Temporal13 {
            names.extend(FEATURES_TEMPORAL.iter().map(|s| s.to_string()));
        }
        names.push("geom_idx".to_string());
        names
    }
}

pub struct FeatureVectorizer {
    schema: FeatureSchema,
    geoms: Vec<String>,
}

impl FeatureVectorizer {
    pub fn new(schema: FeatureSchema, geoms: Vec<String>) -> Self {
        Self { schema, geoms }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn geoms(&self) -> &[String] {
        &self.geoms
    }

    /// Normalized position of a beach id in the training list, in [0,1].
    /// Unknown ids map to index 0 rather than failing.
    pub fn geom_to_idx(&self, geom_id: &str) -> f64 {
        let i = self.geoms.iter().position(|g| g == geom_id).unwrap_or(0);
        i as f64 / self.geoms.len().saturating_sub(1).max(1) as f64
    }

    /// Pure function of the request and the supplied wall-clock instant.
    /// Hour/month overrides in the request take precedence; the weekend flag
    /// always comes from `now`.
    pub fn vectorize(&self, req: &PredictionRequest, now: DateTime<Utc>) -> Vec<f32> {
        let geom_idx = self.geom_to_idx(&req.geom_id) as f32;

        let mut row = Vec::with_capacity(self.schema.len());
        row.push(req.rainfall as f32);
        row.push(req.wind as f32);
        row.push(req.tides as f32);
        row.push(req.waves as f32);
        row.push(req.sst as f32);
        row.push(req.community as f32);

        if self.schema == FeatureSchema::Temporal13 {
            let hour = req.hour.unwrap_or(now.hour());
            let month = req.month.unwrap_or(now.month());

            // cyclical encodings avoid the 23->0 / 12->1 wraparound cliff a
            // raw integer feature would introduce
            let hour_angle = 2.0 * PI * hour as f64 / 24.0;
            let month_angle = 2.0 * PI * (month as f64 - 1.0) / 12.0;
            row.push(hour_angle.sin() as f32);
            row.push(hour_angle.cos() as f32);
            row.push(month_angle.sin() as f32);
            row.push(month_angle.cos() as f32);

            let is_weekend = if now.weekday().num_days_from_monday() >= 5 { 1.0 } else { 0.0 };
            row.push(is_weekend);
            row.push(req.rain_trend.unwrap_or(1.0) as f32);
        }

        row.push(geom_idx);
        row
    }
}
