//! Command table
//!
//! Maps every logical projector operation onto the feature code and sub-code
//! the frame codec needs, plus the decoder for its response. Entries are
//! static; [`COMMAND_TABLE`] lists them all for lookup by name.
//!
//! Set commands on this device family carry their value in the sub-code slot
//! (`~0021 7` sets brightness to 7), which is what [`Operand::Value`] and
//! [`Operand::Select`] describe.

mod settings;

pub use settings::{
    AspectRatio, ColorTemperature, DigitalZoom, InputSource, Language, OsdKey, PictureMode,
    ProjectionMode,
};

use serde::Serialize;
use std::fmt;

use crate::decode::{
    decode_bool, decode_bounded, decode_integer, decode_system_info, decode_text,
    decode_versions, DecodeError, SoftwareVersions, SystemInfo,
};
use crate::protocol::{Command, DeviceAddress, ProtocolError};

/// Where the sub-code comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Always this sub-code
    Fixed(u16),
    /// Caller-supplied value, checked against `min..=max` before sending
    Value {
        /// Smallest accepted value
        min: i32,
        /// Largest accepted value
        max: i32,
    },
    /// Select code of a typed setting
    Select,
}

/// Expected response and how to decode its payload
#[derive(Debug, Clone, Copy)]
pub enum ResponseKind {
    /// Bare acknowledgement; only success matters
    Ack,
    /// `0` or `1`
    Boolean,
    /// Decimal integer
    Integer,
    /// Decimal integer that must fall in `min..=max`
    Bounded {
        /// Lower bound, inclusive
        min: i64,
        /// Upper bound, inclusive
        max: i64,
    },
    /// Enumerated code rendered to its label
    Label(fn(&str) -> Result<String, DecodeError>),
    /// Free text, trimmed
    Text,
    /// Fixed-width system information record
    SystemInfo,
    /// Prefix-letter software version record
    Versions,
}

/// Value produced by a table-driven query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodedValue {
    /// Rendered as `on`/`off`
    Bool(bool),
    /// Plain or range-checked number
    Integer(i64),
    /// Label of an enumerated code
    Label(String),
    /// Trimmed free text
    Text(String),
    /// Decoded `150 1` record
    SystemInfo(SystemInfo),
    /// Per-component firmware versions
    Versions(SoftwareVersions),
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Bool(true) => write!(f, "on"),
            DecodedValue::Bool(false) => write!(f, "off"),
            DecodedValue::Integer(n) => write!(f, "{}", n),
            DecodedValue::Label(s) | DecodedValue::Text(s) => f.write_str(s),
            DecodedValue::SystemInfo(info) => write!(f, "{}", info),
            DecodedValue::Versions(versions) => write!(f, "{}", versions),
        }
    }
}

impl ResponseKind {
    /// Decode a payload; `Ack` entries carry nothing worth decoding
    pub fn decode(&self, payload: &str) -> Result<Option<DecodedValue>, DecodeError> {
        let value = match self {
            ResponseKind::Ack => return Ok(None),
            ResponseKind::Boolean => DecodedValue::Bool(decode_bool(payload)?),
            ResponseKind::Integer => DecodedValue::Integer(decode_integer(payload)?),
            ResponseKind::Bounded { min, max } => {
                DecodedValue::Integer(decode_bounded(payload, *min, *max)?)
            }
            ResponseKind::Label(decode) => DecodedValue::Label(decode(payload)?),
            ResponseKind::Text => DecodedValue::Text(decode_text(payload)?),
            ResponseKind::SystemInfo => DecodedValue::SystemInfo(decode_system_info(payload)?),
            ResponseKind::Versions => DecodedValue::Versions(decode_versions(payload)),
        };
        Ok(Some(value))
    }
}

/// One row of the command table
#[derive(Debug, Clone, Copy)]
pub struct CommandEntry {
    /// Stable dotted name, e.g. `brightness.set`
    pub name: &'static str,
    /// Feature code placed after the address
    pub feature_code: u16,
    /// Where the sub-code comes from
    pub sub_code: Operand,
    /// How to read the answer
    pub response: ResponseKind,
}

impl CommandEntry {
    const fn new(
        name: &'static str,
        feature_code: u16,
        sub_code: Operand,
        response: ResponseKind,
    ) -> Self {
        Self {
            name,
            feature_code,
            sub_code,
            response,
        }
    }

    /// Whether the caller supplies the sub-code
    pub fn takes_value(&self) -> bool {
        !matches!(self.sub_code, Operand::Fixed(_))
    }

    /// Build the command for this entry.
    ///
    /// Range checks happen here, so an out-of-range value fails before any
    /// frame exists.
    pub fn command(
        &self,
        address: DeviceAddress,
        value: Option<i32>,
    ) -> Result<Command, ProtocolError> {
        let sub_code = match (self.sub_code, value) {
            (Operand::Fixed(code), None) => code,
            (Operand::Value { min, max }, Some(v)) => {
                if v < min || v > max {
                    return Err(ProtocolError::OutOfRange {
                        what: self.name,
                        value: v,
                        min,
                        max,
                    });
                }
                v as u16
            }
            (Operand::Select, Some(v)) => u16::try_from(v).map_err(|_| ProtocolError::OutOfRange {
                what: self.name,
                value: v,
                min: 0,
                max: u16::MAX as i32,
            })?,
            (Operand::Fixed(_), Some(_)) => {
                return Err(ProtocolError::InvalidFrame(format!(
                    "{} takes no value",
                    self.name
                )))
            }
            (_, None) => {
                return Err(ProtocolError::InvalidFrame(format!(
                    "{} needs a value",
                    self.name
                )))
            }
        };
        Ok(Command::new(address, self.feature_code, sub_code))
    }
}

fn source_label(payload: &str) -> Result<String, DecodeError> {
    InputSource::QUERY_TABLE.decode(payload).map(|c| c.label())
}

fn picture_mode_label(payload: &str) -> Result<String, DecodeError> {
    PictureMode::QUERY_TABLE.decode(payload).map(|c| c.label())
}

fn projection_label(payload: &str) -> Result<String, DecodeError> {
    ProjectionMode::QUERY_TABLE.decode(payload).map(|c| c.label())
}

fn color_temperature_label(payload: &str) -> Result<String, DecodeError> {
    ColorTemperature::QUERY_TABLE.decode(payload).map(|c| c.label())
}

fn aspect_ratio_label(payload: &str) -> Result<String, DecodeError> {
    AspectRatio::QUERY_TABLE.decode(payload).map(|c| c.label())
}

fn digital_zoom_label(payload: &str) -> Result<String, DecodeError> {
    DigitalZoom::QUERY_TABLE.decode(payload).map(|c| c.label())
}

use Operand::{Fixed, Select, Value};
use ResponseKind::{Ack, Boolean, Bounded, Integer, Label, Text};

/// Image settings range (brightness, contrast)
pub const IMAGE_MIN: i32 = 0;
/// Upper bound for brightness and contrast
pub const IMAGE_MAX: i32 = 10;

/// Volume range
pub const VOLUME_MIN: i32 = 0;
/// Loudest volume step
pub const VOLUME_MAX: i32 = 10;

/// Vertical keystone range
pub const KEYSTONE_MIN: i64 = -40;
/// Largest positive keystone
pub const KEYSTONE_MAX: i64 = 40;

/// Number of fans reporting RPM (0 and 1 system, 2 optical)
pub const FAN_COUNT: i32 = 3;

// Power
/// `power.on`
pub const POWER_ON: CommandEntry = CommandEntry::new("power.on", 0, Fixed(1), Ack);
/// `power.off`
pub const POWER_OFF: CommandEntry = CommandEntry::new("power.off", 0, Fixed(0), Ack);
/// `power.state`
pub const POWER_STATE: CommandEntry = CommandEntry::new("power.state", 124, Fixed(1), Boolean);

// Mute and freeze
/// `av_mute.on`
pub const AV_MUTE_ON: CommandEntry = CommandEntry::new("av_mute.on", 2, Fixed(1), Ack);
/// `av_mute.off`
pub const AV_MUTE_OFF: CommandEntry = CommandEntry::new("av_mute.off", 2, Fixed(0), Ack);
/// `av_mute.state`
pub const AV_MUTE_STATE: CommandEntry =
    CommandEntry::new("av_mute.state", 355, Fixed(1), Boolean);
/// `audio_mute.on`
pub const AUDIO_MUTE_ON: CommandEntry = CommandEntry::new("audio_mute.on", 3, Fixed(1), Ack);
/// `audio_mute.off`
pub const AUDIO_MUTE_OFF: CommandEntry = CommandEntry::new("audio_mute.off", 3, Fixed(0), Ack);
/// `audio_mute.state`
pub const AUDIO_MUTE_STATE: CommandEntry =
    CommandEntry::new("audio_mute.state", 356, Fixed(1), Boolean);
/// `freeze.on`
pub const FREEZE_ON: CommandEntry = CommandEntry::new("freeze.on", 4, Fixed(1), Ack);
/// `freeze.off`
pub const FREEZE_OFF: CommandEntry = CommandEntry::new("freeze.off", 4, Fixed(0), Ack);

// Source and display
/// `source.select`
pub const SOURCE_SELECT: CommandEntry = CommandEntry::new("source.select", 12, Select, Ack);
/// `source.query`
pub const SOURCE_QUERY: CommandEntry =
    CommandEntry::new("source.query", 121, Fixed(1), Label(source_label));
/// `picture_mode.select`
pub const PICTURE_MODE_SELECT: CommandEntry =
    CommandEntry::new("picture_mode.select", 20, Select, Ack);
/// `picture_mode.query`
pub const PICTURE_MODE_QUERY: CommandEntry =
    CommandEntry::new("picture_mode.query", 123, Fixed(1), Label(picture_mode_label));
/// `projection.select`
pub const PROJECTION_SELECT: CommandEntry =
    CommandEntry::new("projection.select", 71, Select, Ack);
/// `projection.query`
pub const PROJECTION_QUERY: CommandEntry =
    CommandEntry::new("projection.query", 129, Fixed(1), Label(projection_label));
/// `aspect_ratio.select`
pub const ASPECT_RATIO_SELECT: CommandEntry =
    CommandEntry::new("aspect_ratio.select", 60, Select, Ack);
/// `aspect_ratio.query`
pub const ASPECT_RATIO_QUERY: CommandEntry =
    CommandEntry::new("aspect_ratio.query", 127, Fixed(1), Label(aspect_ratio_label));
/// `digital_zoom.set`
pub const DIGITAL_ZOOM_SET: CommandEntry =
    CommandEntry::new("digital_zoom.set", 62, Value { min: 0, max: 6 }, Ack);
/// `digital_zoom.query`
pub const DIGITAL_ZOOM_QUERY: CommandEntry =
    CommandEntry::new("digital_zoom.query", 543, Fixed(9), Label(digital_zoom_label));

// Image
/// `brightness.set`
pub const BRIGHTNESS_SET: CommandEntry = CommandEntry::new(
    "brightness.set",
    21,
    Value {
        min: IMAGE_MIN,
        max: IMAGE_MAX,
    },
    Ack,
);
/// `brightness.query`
pub const BRIGHTNESS_QUERY: CommandEntry = CommandEntry::new(
    "brightness.query",
    125,
    Fixed(1),
    Bounded {
        min: IMAGE_MIN as i64,
        max: IMAGE_MAX as i64,
    },
);
/// `contrast.set`
pub const CONTRAST_SET: CommandEntry = CommandEntry::new(
    "contrast.set",
    22,
    Value {
        min: IMAGE_MIN,
        max: IMAGE_MAX,
    },
    Ack,
);
/// `contrast.query`
pub const CONTRAST_QUERY: CommandEntry = CommandEntry::new(
    "contrast.query",
    126,
    Fixed(1),
    Bounded {
        min: IMAGE_MIN as i64,
        max: IMAGE_MAX as i64,
    },
);
/// `color_temperature.select`
pub const COLOR_TEMPERATURE_SELECT: CommandEntry =
    CommandEntry::new("color_temperature.select", 36, Select, Ack);
/// `color_temperature.query`
pub const COLOR_TEMPERATURE_QUERY: CommandEntry = CommandEntry::new(
    "color_temperature.query",
    128,
    Fixed(1),
    Label(color_temperature_label),
);

// Geometry
/// `auto_keystone.on`
pub const AUTO_KEYSTONE_ON: CommandEntry =
    CommandEntry::new("auto_keystone.on", 69, Fixed(1), Ack);
/// `auto_keystone.off`
pub const AUTO_KEYSTONE_OFF: CommandEntry =
    CommandEntry::new("auto_keystone.off", 69, Fixed(0), Ack);
/// `keystone.vertical`
pub const KEYSTONE_QUERY: CommandEntry = CommandEntry::new(
    "keystone.vertical",
    543,
    Fixed(3),
    Bounded {
        min: KEYSTONE_MIN,
        max: KEYSTONE_MAX,
    },
);

// Audio
/// `volume.up`
pub const VOLUME_UP: CommandEntry = CommandEntry::new("volume.up", 140, Fixed(18), Ack);
/// `volume.down`
pub const VOLUME_DOWN: CommandEntry = CommandEntry::new("volume.down", 140, Fixed(17), Ack);
/// `volume.query`
pub const VOLUME_QUERY: CommandEntry = CommandEntry::new(
    "volume.query",
    120,
    Fixed(1),
    Bounded {
        min: VOLUME_MIN as i64,
        max: VOLUME_MAX as i64,
    },
);

// OSD
/// `language.select`
pub const LANGUAGE_SELECT: CommandEntry = CommandEntry::new("language.select", 70, Select, Ack);
/// `osd.key`
pub const OSD_KEY: CommandEntry = CommandEntry::new("osd.key", 140, Select, Ack);

// Digital signage
/// `signage.on`
pub const SIGNAGE_ON: CommandEntry = CommandEntry::new("signage.on", 569, Fixed(2), Ack);
/// `signage.off`
pub const SIGNAGE_OFF: CommandEntry = CommandEntry::new("signage.off", 569, Fixed(1), Ack);
/// `signage.state`
pub const SIGNAGE_STATE: CommandEntry =
    CommandEntry::new("signage.state", 568, Fixed(1), Boolean);

// Diagnostics
/// `info.system`
pub const SYSTEM_INFO: CommandEntry =
    CommandEntry::new("info.system", 150, Fixed(1), ResponseKind::SystemInfo);
/// `info.versions`
pub const SOFTWARE_VERSIONS: CommandEntry =
    CommandEntry::new("info.versions", 122, Fixed(1), ResponseKind::Versions);
/// `info.ddp_version`
pub const DDP_VERSION: CommandEntry = CommandEntry::new("info.ddp_version", 357, Fixed(3), Text);
/// `info.android_version`
pub const ANDROID_VERSION: CommandEntry =
    CommandEntry::new("info.android_version", 357, Fixed(4), Text);
/// `info.lamp_hours`
pub const LAMP_HOURS: CommandEntry = CommandEntry::new("info.lamp_hours", 108, Fixed(1), Integer);
/// `info.system_hours`
pub const SYSTEM_HOURS: CommandEntry =
    CommandEntry::new("info.system_hours", 150, Fixed(21), Integer);
/// `info.temperature`
pub const TEMPERATURE: CommandEntry =
    CommandEntry::new("info.temperature", 352, Fixed(1), Integer);
/// `info.fan_speed`
pub const FAN_SPEED: CommandEntry = CommandEntry::new(
    "info.fan_speed",
    351,
    Value {
        min: 0,
        max: FAN_COUNT - 1,
    },
    Integer,
);
/// `info.mac_address`
pub const MAC_ADDRESS: CommandEntry = CommandEntry::new("info.mac_address", 555, Fixed(2), Text);
/// `info.device_id`
pub const DEVICE_ID: CommandEntry = CommandEntry::new("info.device_id", 558, Fixed(1), Text);
/// `info.network`
pub const NETWORK_STATUS: CommandEntry =
    CommandEntry::new("info.network", 451, Fixed(1), Boolean);
/// `info.signal`
pub const SIGNAL_STATUS: CommandEntry = CommandEntry::new("info.signal", 150, Fixed(23), Boolean);
/// `info.resolution`
pub const RESOLUTION: CommandEntry = CommandEntry::new("info.resolution", 150, Fixed(4), Text);
/// `info.refresh_rate`
pub const REFRESH_RATE: CommandEntry =
    CommandEntry::new("info.refresh_rate", 150, Fixed(19), Text);

// Reset
/// `reset.factory`
pub const FACTORY_RESET: CommandEntry = CommandEntry::new("reset.factory", 112, Fixed(1), Ack);
/// `reset.osd`
pub const OSD_RESET: CommandEntry = CommandEntry::new("reset.osd", 546, Fixed(1), Ack);

/// Every operation, in menu order
pub static COMMAND_TABLE: &[CommandEntry] = &[
    POWER_ON,
    POWER_OFF,
    POWER_STATE,
    AV_MUTE_ON,
    AV_MUTE_OFF,
    AV_MUTE_STATE,
    AUDIO_MUTE_ON,
    AUDIO_MUTE_OFF,
    AUDIO_MUTE_STATE,
    FREEZE_ON,
    FREEZE_OFF,
    SOURCE_SELECT,
    SOURCE_QUERY,
    PICTURE_MODE_SELECT,
    PICTURE_MODE_QUERY,
    PROJECTION_SELECT,
    PROJECTION_QUERY,
    ASPECT_RATIO_SELECT,
    ASPECT_RATIO_QUERY,
    DIGITAL_ZOOM_SET,
    DIGITAL_ZOOM_QUERY,
    BRIGHTNESS_SET,
    BRIGHTNESS_QUERY,
    CONTRAST_SET,
    CONTRAST_QUERY,
    COLOR_TEMPERATURE_SELECT,
    COLOR_TEMPERATURE_QUERY,
    AUTO_KEYSTONE_ON,
    AUTO_KEYSTONE_OFF,
    KEYSTONE_QUERY,
    VOLUME_UP,
    VOLUME_DOWN,
    VOLUME_QUERY,
    LANGUAGE_SELECT,
    OSD_KEY,
    SIGNAGE_ON,
    SIGNAGE_OFF,
    SIGNAGE_STATE,
    SYSTEM_INFO,
    SOFTWARE_VERSIONS,
    DDP_VERSION,
    ANDROID_VERSION,
    LAMP_HOURS,
    SYSTEM_HOURS,
    TEMPERATURE,
    FAN_SPEED,
    MAC_ADDRESS,
    DEVICE_ID,
    NETWORK_STATUS,
    SIGNAL_STATUS,
    RESOLUTION,
    REFRESH_RATE,
    FACTORY_RESET,
    OSD_RESET,
];

/// Look up an entry by its dotted name (e.g. `"brightness.set"`)
pub fn entry(name: &str) -> Option<&'static CommandEntry> {
    COMMAND_TABLE.iter().find(|e| e.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let mut seen = HashSet::new();
        for e in COMMAND_TABLE {
            assert!(seen.insert(e.name), "duplicate entry {}", e.name);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let e = entry("power.state").unwrap();
        assert_eq!(e.feature_code, 124);
        assert_eq!(e.sub_code, Operand::Fixed(1));
        assert!(entry("power.explode").is_none());
    }

    #[test]
    fn test_fixed_command_frames() {
        let addr = DeviceAddress::BROADCAST;
        assert_eq!(POWER_ON.command(addr, None).unwrap().encode(), b"~0000 1\r");
        assert_eq!(
            SYSTEM_HOURS.command(addr, None).unwrap().encode(),
            b"~00150 21\r"
        );
        assert_eq!(VOLUME_UP.command(addr, None).unwrap().encode(), b"~00140 18\r");
    }

    #[test]
    fn test_value_is_range_checked() {
        let addr = DeviceAddress::BROADCAST;
        assert_eq!(
            BRIGHTNESS_SET.command(addr, Some(7)).unwrap().encode(),
            b"~0021 7\r"
        );
        for bad in [-1, 11] {
            let err = BRIGHTNESS_SET.command(addr, Some(bad)).unwrap_err();
            assert!(matches!(err, ProtocolError::OutOfRange { value, .. } if value == bad));
        }
        assert!(DIGITAL_ZOOM_SET.command(addr, Some(7)).is_err());
        assert!(FAN_SPEED.command(addr, Some(3)).is_err());
    }

    #[test]
    fn test_value_presence_must_match_operand() {
        let addr = DeviceAddress::BROADCAST;
        assert!(POWER_ON.command(addr, Some(1)).is_err());
        assert!(BRIGHTNESS_SET.command(addr, None).is_err());
        assert!(SOURCE_SELECT.command(addr, None).is_err());
        assert!(SOURCE_SELECT.command(addr, Some(-1)).is_err());
    }

    #[test]
    fn test_response_kinds_decode() {
        assert_eq!(
            POWER_STATE.response.decode("1"),
            Ok(Some(DecodedValue::Bool(true)))
        );
        assert_eq!(
            SOURCE_QUERY.response.decode("20"),
            Ok(Some(DecodedValue::Label(
                "Android Home (USB-A/SD Card)".into()
            )))
        );
        assert_eq!(
            ASPECT_RATIO_QUERY.response.decode("9"),
            Ok(Some(DecodedValue::Label("Unknown (9)".into())))
        );
        assert_eq!(POWER_ON.response.decode("anything"), Ok(None));
        assert!(KEYSTONE_QUERY.response.decode("41").is_err());
    }
}
