//! Software version record
//!
//! The `122 1` query returns one token per firmware component, each starting
//! with a known prefix letter and running until the next known prefix, e.g.
//! `C102M15R3.1`. Which components appear depends on the model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Firmware component named by a version prefix letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SoftwareComponent {
    /// Display processor (`C`)
    #[serde(rename = "DDP")]
    Ddp,
    /// Microcontroller (`M`)
    #[serde(rename = "MCU")]
    Mcu,
    /// Android platform (`R`)
    Android,
    /// Network module (`L`)
    #[serde(rename = "LAN")]
    Lan,
    /// HDBaseT receiver (`H`)
    #[serde(rename = "HDBaseT")]
    HdBaseT,
    /// System bundle (`S`)
    System,
}

impl SoftwareComponent {
    /// Component for a prefix letter, if it is one
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            'C' => Some(SoftwareComponent::Ddp),
            'M' => Some(SoftwareComponent::Mcu),
            'R' => Some(SoftwareComponent::Android),
            'L' => Some(SoftwareComponent::Lan),
            'H' => Some(SoftwareComponent::HdBaseT),
            'S' => Some(SoftwareComponent::System),
            _ => None,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            SoftwareComponent::Ddp => "DDP",
            SoftwareComponent::Mcu => "MCU",
            SoftwareComponent::Android => "Android",
            SoftwareComponent::Lan => "LAN",
            SoftwareComponent::HdBaseT => "HDBaseT",
            SoftwareComponent::System => "System",
        }
    }
}

/// Component -> version string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoftwareVersions(pub BTreeMap<SoftwareComponent, String>);

impl SoftwareVersions {
    /// Version string reported for `component`
    pub fn get(&self, component: SoftwareComponent) -> Option<&str> {
        self.0.get(&component).map(String::as_str)
    }

    /// No components were reported
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SoftwareVersions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (component, version) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", component.name(), version)?;
            first = false;
        }
        Ok(())
    }
}

/// Split the payload on known prefix letters. Any other character, uppercase
/// included, belongs to the current version string. Text before the first
/// known prefix is skipped. Never fails; an unreadable payload just yields an
/// empty map.
pub fn decode_versions(payload: &str) -> SoftwareVersions {
    let mut versions = BTreeMap::new();
    let mut current: Option<(SoftwareComponent, String)> = None;

    let mut finish = |token: Option<(SoftwareComponent, String)>| {
        if let Some((component, version)) = token {
            if !version.is_empty() {
                versions.insert(component, version);
            }
        }
    };

    for c in payload.chars() {
        if let Some(component) = SoftwareComponent::from_prefix(c) {
            finish(current.take());
            current = Some((component, String::new()));
        } else if let Some((_, version)) = current.as_mut() {
            version.push(c);
        }
    }
    finish(current);

    SoftwareVersions(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_three_components() {
        let v = decode_versions("C102M15R3.1");
        assert_eq!(v.get(SoftwareComponent::Ddp), Some("102"));
        assert_eq!(v.get(SoftwareComponent::Mcu), Some("15"));
        assert_eq!(v.get(SoftwareComponent::Android), Some("3.1"));
        assert_eq!(v.0.len(), 3);
    }

    #[test]
    fn test_unknown_letters_stay_in_the_version() {
        let v = decode_versions("A01C102X77S9");
        assert_eq!(v.get(SoftwareComponent::Ddp), Some("102X77"));
        assert_eq!(v.get(SoftwareComponent::System), Some("9"));
        assert_eq!(v.0.len(), 2);
    }

    #[test]
    fn test_system_version_after_ddp() {
        let v = decode_versions("C102SV2.1");
        assert_eq!(v.get(SoftwareComponent::Ddp), Some("102"));
        assert_eq!(v.get(SoftwareComponent::System), Some("V2.1"));
    }

    #[test]
    fn test_version_with_letter_suffix() {
        assert_eq!(
            decode_versions("M1.0B").get(SoftwareComponent::Mcu),
            Some("1.0B")
        );
        let v = decode_versions("C102M1.0BR9.0");
        assert_eq!(v.get(SoftwareComponent::Mcu), Some("1.0B"));
        assert_eq!(v.get(SoftwareComponent::Android), Some("9.0"));
    }

    #[test]
    fn test_leading_junk_and_empty_tokens() {
        let v = decode_versions("12C1MH4");
        assert_eq!(v.get(SoftwareComponent::Ddp), Some("1"));
        assert_eq!(v.get(SoftwareComponent::Mcu), None);
        assert_eq!(v.get(SoftwareComponent::HdBaseT), Some("4"));
    }

    #[test]
    fn test_empty_payload() {
        assert!(decode_versions("").is_empty());
        assert!(decode_versions("123").is_empty());
    }

    #[test]
    fn test_display_and_json_names() {
        let v = decode_versions("M2C1");
        assert_eq!(v.to_string(), "DDP 1, MCU 2");
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"DDP":"1","MCU":"2"}"#);
    }
}
