//! Metric/imperial conversions
//!
//! Comparisons run in the tables' imperial units at full precision;
//! [`round2`] is only for values leaving the engine.

use shared_types::Measure;

pub const FEET_PER_METER: f64 = 3.28084;
pub const SQFT_PER_SQM: f64 = 10.7639;
pub const MM_PER_INCH: f64 = 25.4;

pub fn meters_to_feet(m: f64) -> f64 {
    m * FEET_PER_METER
}

pub fn feet_to_meters(ft: f64) -> f64 {
    ft / FEET_PER_METER
}

pub fn sqm_to_sqft(sqm: f64) -> f64 {
    sqm * SQFT_PER_SQM
}

pub fn sqft_to_sqm(sqft: f64) -> f64 {
    sqft / SQFT_PER_SQM
}

pub fn inches_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Round to two decimals for presentation
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Present a length given in feet
pub fn length_ft(ft: f64) -> Measure {
    Measure {
        imperial: round2(ft),
        metric: round2(feet_to_meters(ft)),
    }
}

/// Present an area given in square feet
pub fn area_sqft(sqft: f64) -> Measure {
    Measure {
        imperial: round2(sqft),
        metric: round2(sqft_to_sqm(sqft)),
    }
}

/// Present a width given in inches
pub fn width_in(inches: f64) -> Measure {
    Measure {
        imperial: round2(inches),
        metric: round2(inches_to_mm(inches)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        assert!((meters_to_feet(1.0) - 3.28084).abs() < 1e-9);
        assert!((feet_to_meters(75.0) - 22.86).abs() < 0.001);
    }

    #[test]
    fn test_area_conversions() {
        assert!((sqm_to_sqft(1000.0) - 10763.9).abs() < 1e-6);
        assert!((sqft_to_sqm(10763.9) - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_width_conversions() {
        assert!((inches_to_mm(44.0) - 1117.6).abs() < 1e-9);
        assert!((mm_to_inches(1117.6) - 44.0).abs() < 1e-9);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(39.370_08), 39.37);
        assert_eq!(round2(22.866), 22.87);
        assert_eq!(round2(-1.004), -1.0);
    }

    #[test]
    fn test_presentation_measures() {
        let m = length_ft(75.0);
        assert_eq!(m.imperial, 75.0);
        assert_eq!(m.metric, 22.86);

        let w = width_in(44.0);
        assert_eq!(w.metric, 1117.6);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: meters -> feet -> meters stays within 0.01
        #[test]
        fn length_round_trip(x in 0.0f64..10_000.0) {
            prop_assert!((feet_to_meters(meters_to_feet(x)) - x).abs() < 0.01);
        }

        #[test]
        fn area_round_trip(x in 0.0f64..1_000_000.0) {
            prop_assert!((sqft_to_sqm(sqm_to_sqft(x)) - x).abs() < 0.01);
        }

        #[test]
        fn width_round_trip(x in 0.0f64..10_000.0) {
            prop_assert!((inches_to_mm(mm_to_inches(x)) - x).abs() < 0.01);
        }
    }
}
