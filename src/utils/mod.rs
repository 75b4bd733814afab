//! Id helpers for components that read numeric ids from attributes.
//!
//! Values are trimmed and may be written in any integral float notation
//! (`"7"`, `"7.0"`, `"1e3"`). Missing and blank values are rejected.

/// Positive integer id from an attribute value.
///
/// # Example
///
/// ```ignore
/// assert_eq!(parse_id(Some("42")), Some(42));
/// assert_eq!(parse_id(Some("0")), None);
/// ```
pub fn parse_id(attr: Option<&str>) -> Option<u64> {
    parse_integral(attr).filter(|id| *id > 0)
}

/// Non-negative integer id from an attribute value.
pub fn parse_id_allow_zero(attr: Option<&str>) -> Option<u64> {
    parse_integral(attr)
}

fn parse_integral(attr: Option<&str>) -> Option<u64> {
    let text = attr?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(id) = text.parse::<u64>() {
        return Some(id);
    }

    let value = text.parse::<f64>().ok()?;
    let integral = value.is_finite() && value.fract() == 0.0;
    // u64::MAX as f64 rounds up, so the bound is exclusive
    (integral && value >= 0.0 && value < u64::MAX as f64).then_some(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some("42")), Some(42));
        assert_eq!(parse_id(Some(" 7 ")), Some(7));
        assert_eq!(parse_id(Some("7.0")), Some(7));
        assert_eq!(parse_id(Some("1e3")), Some(1000));
        assert_eq!(parse_id(Some("0")), None);
        assert_eq!(parse_id(Some("-3")), None);
        assert_eq!(parse_id(Some("2.5")), None);
        assert_eq!(parse_id(Some("abc")), None);
        assert_eq!(parse_id(Some("NaN")), None);
        assert_eq!(parse_id(Some("inf")), None);
        assert_eq!(parse_id(Some("")), None);
        assert_eq!(parse_id(None), None);
    }

    #[test]
    fn test_parse_id_allow_zero() {
        assert_eq!(parse_id_allow_zero(Some("0")), Some(0));
        assert_eq!(parse_id_allow_zero(Some("-0")), Some(0));
        assert_eq!(parse_id_allow_zero(Some("12")), Some(12));
        assert_eq!(parse_id_allow_zero(Some("-1")), None);
        assert_eq!(parse_id_allow_zero(Some("   ")), None);
        assert_eq!(parse_id_allow_zero(None), None);
    }
}
