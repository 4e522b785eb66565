//! System information record
//!
//! The `150 1` query packs several fields into one fixed-width payload:
//!
//! ```text
//! a bbbbb cc dddd [ee]
//! | |     |  |     +-- picture mode (2 digits, newer firmware only)
//! | |     |  +-------- firmware code
//! | |     +----------- input source (2 digits)
//! | +----------------- lamp hours
//! +------------------- power flag
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{decode_bool, decode_integer, DecodeError, Labeled};
use crate::commands::{InputSource, PictureMode};

/// Shortest payload that still carries the firmware field
pub const SYSTEM_INFO_MIN_LEN: usize = 13;

/// Decoded system information.
///
/// Sub-fields decode independently, so one malformed digit group leaves the
/// rest usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Power
    pub power: Option<bool>,
    /// Lamp hours
    pub lamp_hours: Option<i64>,
    /// Active input
    pub source: Labeled<InputSource>,
    /// Four-character firmware code, undecoded
    pub firmware: String,
    /// Only sent by newer firmware
    pub picture_mode: Option<Labeled<PictureMode>>,
}

/// Decode the `150 1` record. Payloads shorter than
/// [`SYSTEM_INFO_MIN_LEN`] fail as a whole.
pub fn decode_system_info(payload: &str) -> Result<SystemInfo, DecodeError> {
    if payload.len() < SYSTEM_INFO_MIN_LEN || !payload.is_ascii() {
        return Err(DecodeError::TooShort {
            needed: SYSTEM_INFO_MIN_LEN,
            actual: payload.len(),
        });
    }

    let power = decode_bool(&payload[0..1]).ok();
    let lamp_hours = decode_integer(&payload[1..6]).ok();
    let source = InputSource::SYSTEM_INFO_TABLE.lookup(&payload[6..8]).into();
    let firmware = payload[8..12].to_string();
    let picture_mode = payload
        .get(12..14)
        .map(|code| PictureMode::SYSTEM_INFO_TABLE.lookup(code).into());

    Ok(SystemInfo {
        power,
        lamp_hours,
        source,
        firmware,
        picture_mode,
    })
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let power = match self.power {
            Some(true) => "on",
            Some(false) => "off",
            None => "?",
        };
        write!(f, "power {}", power)?;
        if let Some(hours) = self.lamp_hours {
            write!(f, ", lamp {}h", hours)?;
        }
        write!(f, ", source {}, firmware {}", self.source.label, self.firmware)?;
        if let Some(mode) = &self.picture_mode {
            write!(f, ", mode {}", mode.label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_record() {
        let info = decode_system_info("10050007C10001").unwrap();
        assert_eq!(
            info,
            SystemInfo {
                power: Some(true),
                lamp_hours: Some(500),
                source: Labeled::known(InputSource::Hdmi1),
                firmware: "C100".into(),
                picture_mode: Some(Labeled::known(PictureMode::Presentation)),
            }
        );
    }

    #[test]
    fn test_unknown_codes_keep_raw_value() {
        let info = decode_system_info("1001237072001001").unwrap();
        assert_eq!(info.power, Some(true));
        assert_eq!(info.lamp_hours, Some(123));
        assert_eq!(info.source.tag, None);
        assert_eq!(info.source.label, "Unknown (70)");
        assert_eq!(info.firmware, "7200");
        assert_eq!(info.picture_mode.unwrap().label, "Unknown (10)");
    }

    #[test]
    fn test_minimum_length_record() {
        let info = decode_system_info("0000122012342").unwrap();
        assert_eq!(info.power, Some(false));
        assert_eq!(info.lamp_hours, Some(12));
        assert_eq!(info.source.tag, Some(InputSource::AndroidHome));
        assert_eq!(info.firmware, "1234");
        assert_eq!(info.picture_mode, None);
    }

    #[test]
    fn test_short_payload_fails_whole_record() {
        assert_eq!(
            decode_system_info("100500"),
            Err(DecodeError::TooShort {
                needed: SYSTEM_INFO_MIN_LEN,
                actual: 6
            })
        );
        assert!(decode_system_info("").is_err());
    }

    #[test]
    fn test_bad_subfield_does_not_poison_others() {
        let info = decode_system_info("x00a0007C1001").unwrap();
        assert_eq!(info.power, None);
        assert_eq!(info.lamp_hours, None);
        assert_eq!(info.source.tag, Some(InputSource::Hdmi1));
    }
}
