//! Configuration snapshots
//!
//! Capture every readable setting into a [`Snapshot`], write it to JSON or
//! YAML, and replay it onto a projector later. Enumerated settings are stored
//! with their stable tag next to the display label; restore only looks at the
//! tag, so hand-edited labels do not change what gets applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::commands::{
    AspectRatio, ColorTemperature, DigitalZoom, InputSource, PictureMode, ProjectionMode,
};
use crate::decode::{Coded, CodeLabel, Labeled, SoftwareVersions, SystemInfo};
use crate::projector::Projector;
use crate::protocol::ProtocolError;

/// Snapshot file errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported snapshot format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// On-disk encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Json
    Json,
    /// Yaml
    Yaml,
}

impl SnapshotFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "yaml" | "yml" => Ok(SnapshotFormat::Yaml),
            _ => Err(SnapshotError::UnsupportedFormat(ext)),
        }
    }
}

/// When and from which unit a snapshot was taken
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotMetadata {
    /// UTC time the capture finished
    pub captured_at: DateTime<Utc>,
    /// Projector's reported device ID
    pub device_id: Option<String>,
    /// LAN MAC address
    pub mac_address: Option<String>,
    /// Version of the library that wrote the file
    pub generator: String,
}

/// Power state; replayed only with [`ApplyOptions::include_power`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSection {
    /// `true` for on
    pub state: Option<bool>,
}

/// Input selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Active input
    pub input: Option<Labeled<InputSource>>,
}

/// Picture mode, projection and framing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Picture mode
    pub mode: Option<Labeled<PictureMode>>,
    /// Projection mode
    pub projection_mode: Option<Labeled<ProjectionMode>>,
    /// Aspect ratio
    pub aspect_ratio: Option<Labeled<AspectRatio>>,
    /// Digital zoom
    pub digital_zoom: Option<Labeled<DigitalZoom>>,
}

/// Image adjustments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSection {
    /// Brightness
    pub brightness: Option<i64>,
    /// Contrast
    pub contrast: Option<i64>,
    /// Color temperature
    pub color_temperature: Option<Labeled<ColorTemperature>>,
}

/// Volume and mutes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSection {
    /// Replayed by stepping from the current level
    pub volume: Option<i64>,
    /// Audio mute
    pub audio_mute: Option<bool>,
    /// Picture and sound blanked
    pub av_mute: Option<bool>,
}

/// Keystone; read-only, never replayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySection {
    /// Vertical keystone
    pub v_keystone: Option<i64>,
}

/// Read-only values, kept for reference and never replayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSection {
    /// Compound `150 1` record
    pub system_info: Option<SystemInfo>,
    /// All components from the version record
    pub software_versions: Option<SoftwareVersions>,
    /// DDP firmware from its dedicated query
    pub ddp_version: Option<String>,
    /// Android firmware from its dedicated query
    pub android_version: Option<String>,
    /// Lamp hours
    pub lamp_hours: Option<i64>,
    /// System hours
    pub system_hours: Option<i64>,
    /// Degrees Celsius
    pub temperature: Option<i64>,
    /// RPM per fan, system fans first
    pub fan_speeds: Vec<Option<i64>>,
    /// LAN link up
    pub network_status: Option<bool>,
    /// Signage mode on
    pub digital_signage: Option<bool>,
    /// Active input carries a signal
    pub signal_present: Option<bool>,
    /// Input resolution as reported, e.g. `1920x1080`
    pub resolution: Option<String>,
    /// Input refresh rate as reported
    pub refresh_rate: Option<String>,
}

/// Everything readable from one projector at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Capture time and device identity
    pub metadata: SnapshotMetadata,
    /// See [`PowerSection`]
    pub power: PowerSection,
    /// See [`SourceSection`]
    pub source: SourceSection,
    /// See [`DisplaySection`]
    pub display: DisplaySection,
    /// See [`ImageSection`]
    pub image: ImageSection,
    /// See [`AudioSection`]
    pub audio: AudioSection,
    /// See [`GeometrySection`]
    pub geometry: GeometrySection,
    /// See [`DiagnosticsSection`]
    pub diagnostics: DiagnosticsSection,
}

/// What to replay
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Replay the power state too. Off by default so restoring a file never
    /// switches the projector off by surprise.
    pub include_power: bool,
}

/// Result of [`Snapshot::apply`], one `section.field=value` entry per setting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// `section.field=value` for each setting the projector accepted
    pub succeeded: Vec<String>,
    /// Settings rejected by the projector or out of range
    pub failed: Vec<String>,
    /// Settings not sent, with the reason
    pub skipped: Vec<String>,
}

impl ApplyReport {
    /// No setting failed
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// File a setter result under `field=value`.
    ///
    /// Rejected arguments count as failures; transport faults abort the apply.
    fn record(
        &mut self,
        field: &str,
        value: impl Display,
        result: Result<bool, ProtocolError>,
    ) -> Result<(), ProtocolError> {
        let entry = format!("{}={}", field, value);
        match result {
            Ok(true) => self.succeeded.push(entry),
            Ok(false) => self.failed.push(entry),
            Err(e) if !e.is_transport() => {
                warn!(%entry, error = %e, "snapshot value rejected");
                self.failed.push(entry);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn skip(&mut self, field: &str, why: &str) {
        self.skipped.push(format!("{} ({})", field, why));
    }
}

fn labeled<T: CodeLabel>(coded: Option<Coded<T>>) -> Option<Labeled<T>> {
    coded.map(Labeled::from)
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

impl Snapshot {
    /// Read every setting from the projector.
    ///
    /// Values the projector does not report are left `None`; only transport
    /// faults fail the capture.
    pub fn capture(projector: &mut Projector) -> Result<Self, ProtocolError> {
        let metadata = SnapshotMetadata {
            captured_at: Utc::now(),
            device_id: projector.device_id()?,
            mac_address: projector.mac_address()?,
            generator: format!("projlink {}", crate::VERSION),
        };

        let snapshot = Snapshot {
            metadata,
            power: PowerSection {
                state: projector.power_state()?,
            },
            source: SourceSection {
                input: labeled(projector.source()?),
            },
            display: DisplaySection {
                mode: labeled(projector.picture_mode()?),
                projection_mode: labeled(projector.projection()?),
                aspect_ratio: labeled(projector.aspect_ratio()?),
                digital_zoom: labeled(projector.digital_zoom()?),
            },
            image: ImageSection {
                brightness: projector.brightness()?,
                contrast: projector.contrast()?,
                color_temperature: labeled(projector.color_temperature()?),
            },
            audio: AudioSection {
                volume: projector.volume()?,
                audio_mute: projector.audio_mute()?,
                av_mute: projector.av_mute()?,
            },
            geometry: GeometrySection {
                v_keystone: projector.keystone()?,
            },
            diagnostics: DiagnosticsSection {
                system_info: projector.system_info()?,
                software_versions: projector.software_versions()?,
                ddp_version: projector.ddp_version()?,
                android_version: projector.android_version()?,
                lamp_hours: projector.lamp_hours()?,
                system_hours: projector.system_hours()?,
                temperature: projector.temperature()?,
                fan_speeds: projector.fan_speeds()?,
                network_status: projector.network_status()?,
                digital_signage: projector.signage()?,
                signal_present: projector.signal_present()?,
                resolution: projector.resolution()?,
                refresh_rate: projector.refresh_rate()?,
            },
        };

        info!(device_id = ?snapshot.metadata.device_id, "captured projector snapshot");
        Ok(snapshot)
    }

    /// Replay the writable settings onto a projector.
    ///
    /// Absent fields are ignored. Enumerated fields without a known tag are
    /// skipped. Geometry and diagnostics are read-only and never sent.
    pub fn apply(
        &self,
        projector: &mut Projector,
        options: ApplyOptions,
    ) -> Result<ApplyReport, ProtocolError> {
        let mut report = ApplyReport::default();

        match (options.include_power, self.power.state) {
            (false, _) => report.skip("power.state", "not requested"),
            (true, Some(true)) => report.record("power.state", "on", projector.power_on())?,
            (true, Some(false)) => report.record("power.state", "off", projector.power_off())?,
            (true, None) => {}
        }

        apply_tagged(&mut report, "source.input", &self.source.input, |source| {
            projector.select_source(source)
        })?;
        apply_tagged(&mut report, "display.mode", &self.display.mode, |mode| {
            projector.select_picture_mode(mode)
        })?;
        apply_tagged(
            &mut report,
            "display.projection_mode",
            &self.display.projection_mode,
            |mode| projector.select_projection(mode),
        )?;
        apply_tagged(
            &mut report,
            "display.aspect_ratio",
            &self.display.aspect_ratio,
            |ratio| projector.select_aspect_ratio(ratio),
        )?;
        apply_tagged(
            &mut report,
            "display.digital_zoom",
            &self.display.digital_zoom,
            |zoom| projector.set_digital_zoom(zoom),
        )?;

        if let Some(brightness) = self.image.brightness {
            let result = projector.set_brightness(clamp_i32(brightness));
            report.record("image.brightness", brightness, result)?;
        }
        if let Some(contrast) = self.image.contrast {
            let result = projector.set_contrast(clamp_i32(contrast));
            report.record("image.contrast", contrast, result)?;
        }
        apply_tagged(
            &mut report,
            "image.color_temperature",
            &self.image.color_temperature,
            |temperature| projector.select_color_temperature(temperature),
        )?;

        if let Some(volume) = self.audio.volume {
            let result = projector.set_volume(clamp_i32(volume));
            report.record("audio.volume", volume, result)?;
        }
        if let Some(on) = self.audio.audio_mute {
            let result = projector.set_audio_mute(on);
            report.record("audio.audio_mute", on_off(on), result)?;
        }
        if let Some(on) = self.audio.av_mute {
            let result = projector.set_av_mute(on);
            report.record("audio.av_mute", on_off(on), result)?;
        }

        debug!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "snapshot applied"
        );
        Ok(report)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, SnapshotError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse YAML
    pub fn from_yaml(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Save, choosing the format from the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        self.save_as(path, SnapshotFormat::from_path(path)?)
    }

    /// Save in an explicit format, creating parent directories as needed
    pub fn save_as<P: AsRef<Path>>(
        &self,
        path: P,
        format: SnapshotFormat,
    ) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let text = match format {
            SnapshotFormat::Json => self.to_json()?,
            SnapshotFormat::Yaml => self.to_yaml()?,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, text)?;
        debug!(path = %path.display(), ?format, "snapshot saved");
        Ok(())
    }

    /// Load, choosing the format from the file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let format = SnapshotFormat::from_path(path)?;
        let text = fs::read_to_string(path)?;
        match format {
            SnapshotFormat::Json => Self::from_json(&text),
            SnapshotFormat::Yaml => Self::from_yaml(&text),
        }
    }
}

/// Replay an enumerated field by its tag
fn apply_tagged<T: CodeLabel>(
    report: &mut ApplyReport,
    field: &str,
    value: &Option<Labeled<T>>,
    mut set: impl FnMut(T) -> Result<bool, ProtocolError>,
) -> Result<(), ProtocolError> {
    let Some(value) = value else {
        return Ok(());
    };
    match value.tag {
        Some(tag) => report.record(field, &value.label, set(tag)),
        None => {
            report.skip(field, &format!("no setter for '{}'", value.label));
            Ok(())
        }
    }
}

/// Saturate file values so a wild number still reaches the range check
fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
