//! Numeric Sanitizer
//!
//! JSON has no NaN/Infinity tokens, so non-finite floats must never cross the
//! transport boundary in either direction.
//!
//! - Inbound: a non-finite scalar in a request cell becomes the missing
//!   marker (`None`); the table and the preprocessor expect a clean missing
//!   marker, not a raw non-finite float.
//! - Outbound: a non-finite value in a response array becomes 0.0.
//!
//! Both directions are idempotent: sanitizing already-sanitized data changes
//! nothing.

/// Inbound: collapse non-finite cell values to the missing marker.
pub fn clean_cell(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Outbound: replace a non-finite value with a finite placeholder.
pub fn clean_value(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Outbound: sanitize a vector in place-free style.
pub fn clean_vec(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(clean_value).collect()
}

/// Outbound: sanitize a row-major matrix.
pub fn clean_matrix(rows: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    rows.into_iter().map(clean_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_cell_keeps_finite() {
        assert_eq!(clean_cell(Some(1.5)), Some(1.5));
        assert_eq!(clean_cell(Some(0.0)), Some(0.0));
        assert_eq!(clean_cell(None), None);
    }

    #[test]
    fn test_clean_cell_drops_non_finite() {
        assert_eq!(clean_cell(Some(f64::NAN)), None);
        assert_eq!(clean_cell(Some(f64::INFINITY)), None);
        assert_eq!(clean_cell(Some(f64::NEG_INFINITY)), None);
    }

    #[test]
    fn test_clean_value_replaces_non_finite_with_zero() {
        assert_eq!(clean_value(f64::NAN), 0.0);
        assert_eq!(clean_value(f64::INFINITY), 0.0);
        assert_eq!(clean_value(f64::NEG_INFINITY), 0.0);
        assert_eq!(clean_value(-3.25), -3.25);
    }

    #[test]
    fn test_sanitization_is_idempotent() {
        let once = clean_vec(vec![1.0, f64::NAN, f64::INFINITY, -2.0]);
        let twice = clean_vec(once.clone());
        assert_eq!(once, twice);

        let m = clean_matrix(vec![vec![f64::NEG_INFINITY, 4.0]]);
        assert_eq!(m, clean_matrix(m.clone()));
    }
}
