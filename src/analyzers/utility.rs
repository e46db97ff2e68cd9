/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage change from `previous` to `current`.
///
/// A zero baseline cannot be divided by, so growth from nothing reports a
/// flat +100% and nothing-to-nothing reports 0%.
pub fn pct_change(current: u64, previous: u64) -> f64 {
    if previous > 0 {
        (current as f64 - previous as f64) / previous as f64 * 100.0
    } else if current > 0 {
        100.0
    } else {
        0.0
    }
}

/// Signed difference of two counts.
pub fn change(current: u64, previous: u64) -> i64 {
    current as i64 - previous as i64
}

/// Rounds half away from zero to `places` decimals. Presentation only.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[0.2, 0.4]) - 0.3).abs() < 1e-12);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(150, 100), 50.0);
        assert_eq!(pct_change(50, 100), -50.0);
        assert_eq!(pct_change(0, 0), 0.0);
        assert_eq!(pct_change(5, 0), 100.0);
        assert_eq!(pct_change(0, 40), -100.0);
    }

    #[test]
    fn test_change() {
        assert_eq!(change(80, 70), 10);
        assert_eq!(change(0, 12), -12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(80.0 / 70.0 * 100.0 - 100.0, 2), 14.29);
        assert_eq!(round_to(-2.345, 1), -2.3);
        assert_eq!(round_to(0.05000000000000004, 4), 0.05);
    }
}
