//! Maps raw per-driver request fields into the fixed six-feature vector the
//! classifier expects, applying the defaulting and clamping rules.

use crate::error::PredictError;
use crate::ratings;
use crate::types::{DriverInput, FeatureVector};

/// Grid slots run 1..=20.
pub const MIN_GRID_SLOT: u8 = 1;
pub const MAX_GRID_SLOT: u8 = 20;

/// Plausible track surface temperatures in Celsius; inputs outside this range
/// are clamped, not rejected.
pub const TRACK_TEMP_RANGE_C: (f64, f64) = (-10.0, 60.0);

/// Tire strategy multipliers outside this band carry no extra signal.
pub const TIRE_STRATEGY_RANGE: (f64, f64) = (0.5, 1.5);

/// Build the feature vector for one driver.
///
/// Pure function: no side effects, and applying it to input already within
/// range reproduces the same vector (clamping is idempotent). Unseen driver
/// and team ids fall back to the mid-pack default rating rather than failing.
pub fn normalize(
    driver: &DriverInput,
    weather_dry: bool,
    track_temp_c: f64,
) -> Result<FeatureVector, PredictError> {
    if driver.driver.trim().is_empty() {
        return Err(PredictError::validation("driver", "must not be empty"));
    }
    if !(MIN_GRID_SLOT..=MAX_GRID_SLOT).contains(&driver.qualifying_position) {
        return Err(PredictError::validation(
            "qualifying_position",
            format!(
                "{} outside grid range {}..={}",
                driver.qualifying_position, MIN_GRID_SLOT, MAX_GRID_SLOT
            ),
        ));
    }
    if !driver.tire_strategy.is_finite() || driver.tire_strategy <= 0.0 {
        return Err(PredictError::validation(
            "tire_strategy",
            format!("{} is not a positive multiplier", driver.tire_strategy),
        ));
    }
    if !track_temp_c.is_finite() {
        return Err(PredictError::validation(
            "track_temp_c",
            "must be a finite temperature",
        ));
    }

    let vector = FeatureVector {
        qualifying_position: f64::from(driver.qualifying_position),
        driver_rating: ratings::driver_rating(&driver.driver),
        team_performance: ratings::team_performance(&driver.team),
        weather_dry: if weather_dry { 1.0 } else { 0.0 },
        track_temperature: track_temp_c.clamp(TRACK_TEMP_RANGE_C.0, TRACK_TEMP_RANGE_C.1),
        tire_strategy: driver
            .tire_strategy
            .clamp(TIRE_STRATEGY_RANGE.0, TIRE_STRATEGY_RANGE.1),
    };

    // Ratings and clamps above cannot produce NaN/inf; if they ever do it is
    // a bug, not a caller error.
    if !vector.is_finite() {
        return Err(PredictError::InvalidFeature(format!("{:?}", vector)));
    }

    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(driver: &str, team: &str, pos: u8, tire: f64) -> DriverInput {
        DriverInput {
            driver: driver.to_string(),
            team: team.to_string(),
            qualifying_position: pos,
            tire_strategy: tire,
        }
    }

    #[test]
    fn pole_sitter_normalizes_to_expected_vector() {
        let v = normalize(&input("verstappen", "red_bull", 1, 1.0), true, 25.0).unwrap();
        assert_eq!(v.qualifying_position, 1.0);
        assert!((v.driver_rating - 0.95).abs() < 1e-12);
        assert!((v.team_performance - 0.95).abs() < 1e-12);
        assert_eq!(v.weather_dry, 1.0);
        assert_eq!(v.track_temperature, 25.0);
        assert_eq!(v.tire_strategy, 1.0);
    }

    #[test]
    fn qualifying_position_out_of_range_rejected() {
        for pos in [0u8, 21, 40] {
            let err = normalize(&input("norris", "mclaren", pos, 1.0), true, 25.0).unwrap_err();
            match err {
                PredictError::Validation { field, .. } => {
                    assert_eq!(field, "qualifying_position")
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn empty_driver_rejected() {
        let err = normalize(&input("  ", "mclaren", 3, 1.0), true, 25.0).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Validation { field: "driver", .. }
        ));
    }

    #[test]
    fn non_positive_or_non_finite_tire_strategy_rejected() {
        for tire in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = normalize(&input("gasly", "alpine", 9, tire), true, 25.0).unwrap_err();
            assert!(matches!(
                err,
                PredictError::Validation {
                    field: "tire_strategy",
                    ..
                }
            ));
        }
    }

    #[test]
    fn extreme_inputs_are_clamped() {
        let v = normalize(&input("stroll", "aston_martin", 12, 9.0), false, 80.0).unwrap();
        assert_eq!(v.track_temperature, TRACK_TEMP_RANGE_C.1);
        assert_eq!(v.tire_strategy, TIRE_STRATEGY_RANGE.1);
        assert_eq!(v.weather_dry, 0.0);

        let v = normalize(&input("stroll", "aston_martin", 12, 0.1), false, -40.0).unwrap();
        assert_eq!(v.track_temperature, TRACK_TEMP_RANGE_C.0);
        assert_eq!(v.tire_strategy, TIRE_STRATEGY_RANGE.0);
    }

    #[test]
    fn normalize_is_idempotent_on_in_range_input() {
        let first = normalize(&input("albon", "williams", 8, 1.2), true, 31.0).unwrap();
        // Re-normalizing input that is already within every range must be a no-op.
        let again = normalize(&input("albon", "williams", 8, first.tire_strategy), true, first.track_temperature)
            .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn unknown_driver_and_team_default_mid_pack() {
        let v = normalize(&input("newcomer", "garage56", 10, 1.0), true, 25.0).unwrap();
        assert_eq!(v.driver_rating, crate::ratings::DEFAULT_RATING);
        assert_eq!(v.team_performance, crate::ratings::DEFAULT_RATING);
    }
}
