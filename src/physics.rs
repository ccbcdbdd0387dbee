//! Closed-form baseline risk from raw physical readings.
//!
//! This is the non-learned half of the score: the residual model only has to
//! correct this baseline, which keeps out-of-distribution predictions bounded.

fn clip01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Weighted sum of four independently-normalized factors, each clipped to
/// [0,1] before weighting. Rainfall-driven runoff dominates; the community
/// self-report signal carries the lowest weight.
pub fn physics_prior(rainfall_mm: f64, wind_ms: f64, tide_phase: f64, community: f64) -> f64 {
    let rain = clip01(rainfall_mm / 50.0);
    let wind = clip01(wind_ms / 20.0);
    let tide = clip01(tide_phase.abs() / 2.0);
    let comm = clip01(community);
    0.4 * rain + 0.3 * wind + 0.2 * tide + 0.1 * comm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_inputs_give_zero_prior() {
        assert_eq!(physics_prior(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn saturated_inputs_give_unit_prior() {
        let p = physics_prior(50.0, 20.0, 2.0, 1.0);
        assert!((p - 1.0).abs() < 1e-12);
    }

    #[test]
    fn prior_is_bounded_for_wild_inputs() {
        for &(r, w, t, c) in &[
            (1e6, 1e6, -1e6, 1e6),
            (-500.0, -3.0, 0.0, -1.0),
            (25.0, 10.0, -1.0, 0.5),
        ] {
            let p = physics_prior(r, w, t, c);
            assert!((0.0..=1.0).contains(&p), "prior {} out of range", p);
        }
    }

    #[test]
    fn negative_tide_counts_by_magnitude() {
        assert_eq!(
            physics_prior(0.0, 0.0, -1.5, 0.0),
            physics_prior(0.0, 0.0, 1.5, 0.0)
        );
    }
}
