//! Human-readable byte sizes ("10mb", "512kb", "100")

use serde::de::{self, Deserializer, Visitor};
use std::fmt;

const UNITS: [(&str, u64); 4] = [
    ("gb", 1024 * 1024 * 1024),
    ("mb", 1024 * 1024),
    ("kb", 1024),
    ("b", 1),
];

/// Parse a size string into bytes.
///
/// Units are 1024-based and case-insensitive. A bare number is bytes.
pub fn parse_size(input: &str) -> Result<u64, String> {
    let normalized = input.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err("size is empty".to_string());
    }

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, mult)| {
            normalized
                .strip_suffix(suffix)
                .map(|rest| (rest.trim_end(), *mult))
        })
        .unwrap_or((normalized.as_str(), 1));

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid size '{input}'"))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size '{input}' is too large"))
}

/// Serde adapter accepting either an integer byte count or a size string
pub fn deserialize_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct SizeVisitor;

    impl Visitor<'_> for SizeVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a byte count or a size string such as \"10mb\"")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::custom(format!("negative size {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            parse_size(v).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(SizeVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_size("10mb"), Ok(10_485_760));
        assert_eq!(parse_size("512kb"), Ok(524_288));
        assert_eq!(parse_size("1GB"), Ok(1_073_741_824));
        assert_eq!(parse_size("64b"), Ok(64));
        assert_eq!(parse_size("100"), Ok(100));
        assert_eq!(parse_size(" 2 mb "), Ok(2_097_152));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_size("").is_err());
        assert!(parse_size("mb").is_err());
        assert!(parse_size("ten mb").is_err());
        assert!(parse_size("-1kb").is_err());
        assert!(parse_size("99999999999999999999gb").is_err());
    }
}
