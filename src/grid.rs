//! Deterministic 8x8 spatial risk grid around a center coordinate.
//!
//! No randomness: per-cell variation comes from a hash over the cell indices
//! and the beach id, so a fixed request always reproduces the same grid.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::scorer::Thresholds;

pub const GRID_DIM: u32 = 8;
pub const CELL_STEP_DEG: f64 = 0.01;
pub const DEFAULT_CENTER: (f64, f64) = (32.56, -117.15);

#[derive(Debug, Clone, Serialize)]
pub struct RiskCell {
    pub lon: f64,
    pub lat: f64,
    #[serde(rename = "riskClass")]
    pub risk_class: crate::scorer::RiskClass,
    #[serde(rename = "riskScore")]
    pub risk_score: f64,
    pub uncertainty: f64,
}

/// Per-generation grid constants. Historical generations varied the spread
/// and the uncertainty band, so these travel with the model profile rather
/// than being universal literals.
#[derive(Debug, Clone, Copy)]
pub struct GridParams {
    /// Max deviation of a cell from the aggregate score.
    pub spread: f64,
    pub uncertainty_base: f64,
    pub uncertainty_width: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self { spread: 0.08, uncertainty_base: 0.15, uncertainty_width: 0.15 }
    }
}

fn round_to(x: f64, places: i32) -> f64 {
    let p = 10f64.powi(places);
    (x * p).round() / p
}

/// Uniform-ish value in [0,1) derived from the cell position and beach id:
/// first 4 bytes of SHA-256 over "{ix}-{iy}-{geom_id}", little-endian,
/// reduced mod 1000.
fn cell_jitter(ix: u32, iy: u32, geom_id: &str) -> f64 {
    let digest = Sha256::digest(format!("{}-{}-{}", ix, iy, geom_id).as_bytes());
    let h = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (h % 1000) as f64 / 1000.0
}

pub struct GridRenderer {
    params: GridParams,
    thresholds: Thresholds,
}

impl GridRenderer {
    pub fn new(params: GridParams, thresholds: Thresholds) -> Self {
        Self { params, thresholds }
    }

    /// 64 cells, row-major over iy then ix, symmetric about `center`
    /// (lat, lon). Coordinates rounded to 3 decimals, scores to 3,
    /// uncertainty to 2, for stable compact payloads.
    pub fn render(&self, center: Option<(f64, f64)>, aggregate: f64, geom_id: &str) -> Vec<RiskCell> {
        let (lat0, lng0) = center.unwrap_or(DEFAULT_CENTER);
        let mut cells = Vec::with_capacity((GRID_DIM * GRID_DIM) as usize);

        for iy in 0..GRID_DIM {
            for ix in 0..GRID_DIM {
                let dlat = (iy as f64 - 3.5) * CELL_STEP_DEG;
                let dlng = (ix as f64 - 3.5) * CELL_STEP_DEG;

                let jitter = cell_jitter(ix, iy, geom_id);
                let local = (aggregate + (jitter - 0.5) * self.params.spread).clamp(0.0, 1.0);
                let uncertainty =
                    self.params.uncertainty_base + (1.0 - (0.5 - local).abs()) * self.params.uncertainty_width;

                cells.push(RiskCell {
                    lon: round_to(lng0 + dlng, 3),
                    lat: round_to(lat0 + dlat, 3),
                    risk_class: self.thresholds.classify(local),
                    risk_score: round_to(local, 3),
                    uncertainty: round_to(uncertainty, 2),
                });
            }
        }
        cells
    }
}
