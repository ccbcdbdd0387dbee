use serde::{Deserialize, Serialize};

use crate::grid::RiskCell;
use crate::scorer::RiskClass;

// ---------- Request ----------

/// One risk query. `when` is display-only and never enters the computation.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    pub when: String,
    #[serde(rename = "geomId")]
    pub geom_id: String,
    /// Rainfall over the trailing 72h (mm).
    pub rainfall: f64,
    /// Wind speed (m/s).
    pub wind: f64,
    /// Tide phase, -1..1.
    pub tides: f64,
    /// Wave height (m).
    pub waves: f64,
    /// Sea surface temperature (degC).
    pub sst: f64,
    /// Community signal, 0..1.
    pub community: f64,
    // Temporal overrides; the server derives these from wall clock if absent.
    pub hour: Option<u32>,
    pub month: Option<u32>,
    pub rain_trend: Option<f64>,
    // Optional grid center.
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PredictionRequest {
    /// All continuous readings must be finite; NaN/inf would poison the
    /// feature vector silently otherwise.
    pub fn validate(&self) -> Result<(), String> {
        let readings = [
            ("rainfall", self.rainfall),
            ("wind", self.wind),
            ("tides", self.tides),
            ("waves", self.waves),
            ("sst", self.sst),
            ("community", self.community),
        ];
        for (name, v) in readings {
            if !v.is_finite() {
                return Err(format!("field '{}' must be finite, got {}", name, v));
            }
        }
        if let Some(t) = self.rain_trend {
            if !t.is_finite() {
                return Err(format!("field 'rain_trend' must be finite, got {}", t));
            }
        }
        if let Some(h) = self.hour {
            if h > 23 {
                return Err(format!("field 'hour' must be 0..=23, got {}", h));
            }
        }
        if let Some(m) = self.month {
            if !(1..=12).contains(&m) {
                return Err(format!("field 'month' must be 1..=12, got {}", m));
            }
        }
        Ok(())
    }

    pub fn center(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

// ---------- Response ----------

#[derive(Debug, Serialize)]
pub struct Aggregate {
    #[serde(rename = "riskScore")]
    pub risk_score: f64,
    #[serde(rename = "riskClass")]
    pub risk_class: RiskClass,
    #[serde(rename = "physicsBase")]
    pub physics_base: f64,
    pub residual: f64,
}

#[derive(Debug, Serialize)]
pub struct PredictionMeta {
    pub when: String,
    pub backend: &'static str,
    pub model_version: String,
    pub model_hash: String,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub cells: Vec<RiskCell>,
    pub aggregate: Aggregate,
    pub meta: PredictionMeta,
}
