//! Model provenance (sidecar descriptor + content hash) and process-wide
//! runtime counters.

use chrono::Utc;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::features::FeatureSchema;
use crate::grid::GridParams;
use crate::scorer::Thresholds;

// ---------- Sidecar descriptor ----------

/// Fields the training side writes next to the artifact. Everything is
/// optional; a missing or corrupt sidecar degrades to an empty record.
#[derive(Debug, Default, Deserialize)]
pub struct Sidecar {
    pub features: Option<Vec<String>>,
    pub geoms: Option<Vec<String>>,
    pub rows: Option<u64>,
    pub train_rows: Option<u64>,
    pub val_r2: Option<f64>,
    pub test_r2: Option<f64>,
    pub test_advisory_recall: Option<f64>,
    pub test_closure_recall: Option<f64>,
    pub architecture: Option<String>,
    pub timestamp: Option<String>,
    // Serving-profile overrides: constants that belong to a model
    // generation, not to the code.
    pub schema: Option<String>,
    pub thresholds: Option<[f64; 2]>,
    pub spread: Option<f64>,
    pub uncertainty_base: Option<f64>,
    pub uncertainty_width: Option<f64>,
}

/// Provenance snapshot, immutable for the process lifetime.
#[derive(Debug)]
pub struct ModelMetadata {
    pub path: String,
    pub hash: String,
    pub sidecar: Sidecar,
}

impl ModelMetadata {
    /// Sidecar read failure is recovered (empty record); the content hash
    /// falls back to "unknown" if the artifact itself is unreadable.
    pub fn load(model_path: &str) -> Self {
        let p = Path::new(model_path);

        let sidecar = fs::read_to_string(p.with_extension("json"))
            .ok()
            .and_then(|txt| serde_json::from_str::<Sidecar>(&txt).ok())
            .unwrap_or_default();

        let hash = match fs::read(p) {
            Ok(bytes) => {
                let digest = Sha256::digest(&bytes);
                let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
                hex[..12].to_string()
            }
            Err(_) => "unknown".to_string(),
        };

        Self { path: model_path.to_string(), hash, sidecar }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.sidecar
            .schema
            .as_deref()
            .and_then(FeatureSchema::from_tag)
            .unwrap_or(FeatureSchema::Temporal13)
    }

    pub fn thresholds(&self) -> Thresholds {
        match self.sidecar.thresholds {
            Some([advisory, closure]) => Thresholds { advisory, closure },
            None => Thresholds::default(),
        }
    }

    pub fn grid_params(&self) -> GridParams {
        let d = GridParams::default();
        GridParams {
            spread: self.sidecar.spread.unwrap_or(d.spread),
            uncertainty_base: self.sidecar.uncertainty_base.unwrap_or(d.uncertainty_base),
            uncertainty_width: self.sidecar.uncertainty_width.unwrap_or(d.uncertainty_width),
        }
    }

    pub fn model_version(&self) -> String {
        self.sidecar
            .architecture
            .clone()
            .unwrap_or_else(|| "PGNN_v2".to_string())
    }

    pub fn provenance_json(&self, features: &[String], geoms: &[String]) -> Value {
        json!({
            "rows": self.sidecar.rows,
            "test_r2": self.sidecar.test_r2,
            "advisory_recall": self.sidecar.test_advisory_recall,
            "closure_recall": self.sidecar.test_closure_recall,
            "features": self.sidecar.features.as_deref().unwrap_or(features),
            "geoms": self.sidecar.geoms.as_deref().unwrap_or(geoms),
            "model_hash": self.hash,
            "architecture": self.model_version(),
        })
    }
}

// ---------- Runtime counters ----------

/// The only mutable process-wide state: a monotone request counter and a
/// last-request timestamp. Owned and lock-protected so concurrent-access
/// behavior is auditable in isolation.
pub struct ServiceMetadata {
    started_at: String,
    request_count: AtomicU64,
    last_request_at: Mutex<Option<String>>,
}

impl ServiceMetadata {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now().to_rfc3339(),
            request_count: AtomicU64::new(0),
            last_request_at: Mutex::new(None),
        }
    }

    pub fn record_request(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request_at.lock() = Some(Utc::now().to_rfc3339());
    }

    pub fn runtime_json(&self) -> Value {
        json!({
            "request_count": self.request_count.load(Ordering::Relaxed),
            "last_request_at": *self.last_request_at.lock(),
            "started_at": self.started_at,
        })
    }
}
