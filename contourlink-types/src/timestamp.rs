//! Meter timestamp handling
//!
//! Timestamps on the wire are 12 ASCII digits, `YYYYMMDDHHMM`, with no
//! seconds field.

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// Reformat a meter timestamp as `YYYY-MM-DD HH:MM`
///
/// The input must be exactly 12 ASCII digits and must denote a real
/// calendar datetime.
pub fn normalize(timestamp: &str) -> Result<String> {
    if timestamp.len() != 12 || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Format(format!("Malformed timestamp '{timestamp}'")));
    }

    let parsed = NaiveDateTime::parse_from_str(timestamp, "%Y%m%d%H%M")
        .map_err(|_| Error::Format(format!("Malformed timestamp '{timestamp}'")))?;

    Ok(parsed.format("%Y-%m-%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("201601021530").unwrap(), "2016-01-02 15:30");
    }

    #[test]
    fn test_wrong_length() {
        assert!(normalize("20160102153").is_err());
        assert!(normalize("2016010215300").is_err());
        assert!(normalize("").is_err());
    }

    #[test]
    fn test_non_digits() {
        assert!(normalize("2016010215:0").is_err());
        assert!(normalize("201601021 30").is_err());
    }

    #[test]
    fn test_impossible_date() {
        assert!(normalize("201613021530").is_err());
        assert!(normalize("201601022460").is_err());
    }
}
