//! Field decoders
//!
//! Turn `Ok` payloads into typed values. Every decoder either returns a value
//! or a [`DecodeError`]; none of them panic or fall back to a default.

mod label;
mod system_info;
mod versions;

pub use label::{CodeKey, CodeLabel, CodeTable, Coded, Labeled};
pub use system_info::{decode_system_info, SystemInfo, SYSTEM_INFO_MIN_LEN};
pub use versions::{decode_versions, SoftwareComponent, SoftwareVersions};

use thiserror::Error;

/// A payload that arrived but cannot be read as the expected type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,

    #[error("expected 0 or 1, got '{0}'")]
    NotBoolean(String),

    #[error("expected a decimal integer, got '{0}'")]
    NotNumeric(String),

    #[error("value {value} outside {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("payload too short: need {needed} characters, got {actual}")]
    TooShort { needed: usize, actual: usize },
}

/// `"0"` is off, `"1"` is on, anything else is unknown
pub fn decode_bool(payload: &str) -> Result<bool, DecodeError> {
    match payload {
        "0" => Ok(false),
        "1" => Ok(true),
        "" => Err(DecodeError::Empty),
        other => Err(DecodeError::NotBoolean(other.to_string())),
    }
}

/// Parse a signed base-10 integer
pub fn decode_integer(payload: &str) -> Result<i64, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    payload
        .parse::<i64>()
        .map_err(|_| DecodeError::NotNumeric(payload.to_string()))
}

/// Parse an integer and require it to sit inside `min..=max`
pub fn decode_bounded(payload: &str, min: i64, max: i64) -> Result<i64, DecodeError> {
    let value = decode_integer(payload)?;
    if value < min || value > max {
        return Err(DecodeError::OutOfRange { value, min, max });
    }
    Ok(value)
}

/// Text payloads (MAC address, resolution...) only need to be present
pub fn decode_text(payload: &str) -> Result<String, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool() {
        assert_eq!(decode_bool("0"), Ok(false));
        assert_eq!(decode_bool("1"), Ok(true));
        assert_eq!(decode_bool("2"), Err(DecodeError::NotBoolean("2".into())));
        assert_eq!(decode_bool("10"), Err(DecodeError::NotBoolean("10".into())));
        assert_eq!(decode_bool(""), Err(DecodeError::Empty));
    }

    #[test]
    fn test_integer() {
        assert_eq!(decode_integer("7"), Ok(7));
        assert_eq!(decode_integer("00123"), Ok(123));
        assert_eq!(decode_integer("-15"), Ok(-15));
        assert_eq!(decode_integer("ab"), Err(DecodeError::NotNumeric("ab".into())));
        assert_eq!(decode_integer("1 2"), Err(DecodeError::NotNumeric("1 2".into())));
        assert_eq!(decode_integer(""), Err(DecodeError::Empty));
    }

    #[test]
    fn test_bounded() {
        assert_eq!(decode_bounded("10", 0, 10), Ok(10));
        assert_eq!(decode_bounded("-40", -40, 40), Ok(-40));
        assert_eq!(
            decode_bounded("11", 0, 10),
            Err(DecodeError::OutOfRange {
                value: 11,
                min: 0,
                max: 10
            })
        );
        assert!(matches!(
            decode_bounded("x", 0, 10),
            Err(DecodeError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_text() {
        assert_eq!(decode_text("1920x1080"), Ok("1920x1080".to_string()));
        assert_eq!(decode_text(""), Err(DecodeError::Empty));
    }
}
