/// Logistic squashing of a raw score into a default probability.
///
/// Evaluates the exponential only on non-positive arguments so neither branch can
/// overflow; infinities map to exactly 0.0 and 1.0.
pub fn calibrate(raw: f64) -> f64 {
    if raw >= 0.0 {
        1.0 / (1.0 + (-raw).exp())
    } else {
        let e = raw.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_even_odds() {
        assert_eq!(calibrate(0.0), 0.5);
    }

    #[test]
    fn symmetric_around_zero() {
        for raw in [0.3, 1.7, 4.2, 12.0] {
            assert!((calibrate(raw) + calibrate(-raw) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn extreme_scores_stay_within_unit_interval() {
        for raw in [-1e308, -800.0, -40.0, 40.0, 800.0, 1e308] {
            let p = calibrate(raw);
            assert!(p.is_finite());
            assert!((0.0..=1.0).contains(&p), "{raw} -> {p}");
        }
        assert!(calibrate(-40.0) > 0.0);
        assert!(calibrate(30.0) < 1.0);
        assert_eq!(calibrate(f64::NEG_INFINITY), 0.0);
        assert_eq!(calibrate(f64::INFINITY), 1.0);
    }

    #[test]
    fn monotonic_in_raw_score() {
        let mut previous = calibrate(-50.0);
        let mut raw = -50.0;
        while raw < 50.0 {
            raw += 0.25;
            let p = calibrate(raw);
            assert!(p >= previous, "{raw}: {p} < {previous}");
            previous = p;
        }
    }
}
