//! Unit-interval score helpers
//!
//! Every confidence, impact, support and quality value lives in [0, 1].
//! Adjustments are signed deltas that are clamped after application.

/// Clamp a score into [0, 1], mapping non-finite input to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Apply a signed delta and clamp the result into [0, 1]
pub fn adjust(value: f64, delta: f64) -> f64 {
    clamp_unit(value + delta)
}

/// Check that a value is a finite score in [0, 1]
pub fn is_unit(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Round to four decimal places for stable presentation
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.4), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(0.35), 0.35);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_adjust() {
        assert_eq!(adjust(0.9, 0.2), 1.0);
        assert_eq!(adjust(0.02, -0.05), 0.0);
        assert!((adjust(0.5, 0.1) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_is_unit() {
        assert!(is_unit(0.0));
        assert!(is_unit(1.0));
        assert!(!is_unit(1.01));
        assert!(!is_unit(f64::NAN));
    }
}
