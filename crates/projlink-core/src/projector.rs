//! Typed projector API
//!
//! One method per device feature. Setters return `Ok(true)` when the
//! projector acknowledged the command and `Ok(false)` when it refused or
//! stayed silent. Queries return `Ok(None)` when the value is unavailable,
//! whether because the projector refused, did not answer, or sent a payload
//! that does not decode. `Err` is reserved for transport faults and for
//! arguments rejected before any I/O.

use tracing::{debug, warn};

use crate::commands::{
    self, AspectRatio, ColorTemperature, CommandEntry, DecodedValue, DigitalZoom, InputSource,
    Language, OsdKey, PictureMode, ProjectionMode, FAN_COUNT, VOLUME_MAX, VOLUME_MIN,
};
use crate::decode::{
    decode_bool, decode_bounded, decode_integer, decode_system_info, decode_text,
    decode_versions, Coded, DecodeError, SoftwareVersions, SystemInfo,
};
use crate::protocol::{Command, Connection, ConnectionConfig, Outcome, ProtocolError};

/// Signed number of volume steps from `current` to `target`; positive means up
pub fn volume_steps(current: i64, target: i64) -> i64 {
    target - current
}

/// Controller for one projector
pub struct Projector {
    conn: Connection,
}

impl Projector {
    /// Create a controller; the port opens on first use
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            conn: Connection::new(config),
        }
    }

    /// Wrap an existing connection, e.g. one over a simulator
    pub fn with_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Underlying connection, for connect and disconnect
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Give back the connection
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    // ---- table plumbing ----

    /// Build and run the command for `entry`
    pub fn execute(
        &mut self,
        entry: &CommandEntry,
        value: Option<i32>,
    ) -> Result<Outcome, ProtocolError> {
        let command = entry.command(self.conn.address(), value)?;
        self.conn.exchange(&command)
    }

    /// Send an arbitrary frame; no range checks beyond the frame codec's own
    pub fn raw(
        &mut self,
        feature_code: u16,
        sub_code: u16,
        argument: Option<i32>,
    ) -> Result<Outcome, ProtocolError> {
        let mut command = Command::new(self.conn.address(), feature_code, sub_code);
        if let Some(arg) = argument {
            command = command.with_argument(arg);
        }
        self.conn.exchange(&command)
    }

    fn set(&mut self, entry: &CommandEntry, value: Option<i32>) -> Result<bool, ProtocolError> {
        let outcome = self.execute(entry, value)?;
        if !outcome.is_success() {
            debug!(operation = entry.name, %outcome, "setter not acknowledged");
        }
        Ok(outcome.is_success())
    }

    fn toggle(
        &mut self,
        on: bool,
        on_entry: &CommandEntry,
        off_entry: &CommandEntry,
    ) -> Result<bool, ProtocolError> {
        self.set(if on { on_entry } else { off_entry }, None)
    }

    fn query<T>(
        &mut self,
        entry: &CommandEntry,
        value: Option<i32>,
        decode: impl FnOnce(&str) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, ProtocolError> {
        let outcome = self.execute(entry, value)?;
        let Some(payload) = outcome.into_payload() else {
            return Ok(None);
        };
        match decode(&payload) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(operation = entry.name, %payload, error = %e, "undecodable payload");
                Ok(None)
            }
        }
    }

    /// Run any table entry by name and decode its response generically.
    ///
    /// Setters come back as `Bool(acknowledged)`.
    pub fn query_by_name(
        &mut self,
        name: &str,
        value: Option<i32>,
    ) -> Result<Option<DecodedValue>, ProtocolError> {
        let entry =
            commands::entry(name).ok_or_else(|| ProtocolError::UnknownCommand(name.to_string()))?;
        if matches!(entry.response, commands::ResponseKind::Ack) {
            return self.set(entry, value).map(|ok| Some(DecodedValue::Bool(ok)));
        }
        let kind = entry.response;
        Ok(self
            .query(entry, value, |payload| kind.decode(payload))?
            .flatten())
    }

    // ---- power ----

    /// Switch the projector on
    pub fn power_on(&mut self) -> Result<bool, ProtocolError> {
        self.set(&commands::POWER_ON, None)
    }

    /// Switch the projector off (standby)
    pub fn power_off(&mut self) -> Result<bool, ProtocolError> {
        self.set(&commands::POWER_OFF, None)
    }

    /// `Some(true)` when the projector reports it is on
    pub fn power_state(&mut self) -> Result<Option<bool>, ProtocolError> {
        self.query(&commands::POWER_STATE, None, decode_bool)
    }

    // ---- source and display ----

    /// Switch input
    pub fn select_source(&mut self, source: InputSource) -> Result<bool, ProtocolError> {
        self.set(&commands::SOURCE_SELECT, Some(source.select_code() as i32))
    }

    /// Active input as reported; media inputs show as Android home
    pub fn source(&mut self) -> Result<Option<Coded<InputSource>>, ProtocolError> {
        self.query(&commands::SOURCE_QUERY, None, |p| {
            InputSource::QUERY_TABLE.decode(p)
        })
    }

    /// Switch picture mode
    pub fn select_picture_mode(&mut self, mode: PictureMode) -> Result<bool, ProtocolError> {
        self.set(&commands::PICTURE_MODE_SELECT, Some(mode.select_code() as i32))
    }

    /// Active picture mode
    pub fn picture_mode(&mut self) -> Result<Option<Coded<PictureMode>>, ProtocolError> {
        self.query(&commands::PICTURE_MODE_QUERY, None, |p| {
            PictureMode::QUERY_TABLE.decode(p)
        })
    }

    /// Set projection orientation
    pub fn select_projection(&mut self, mode: ProjectionMode) -> Result<bool, ProtocolError> {
        self.set(&commands::PROJECTION_SELECT, Some(mode.select_code() as i32))
    }

    /// Projection orientation
    pub fn projection(&mut self) -> Result<Option<Coded<ProjectionMode>>, ProtocolError> {
        self.query(&commands::PROJECTION_QUERY, None, |p| {
            ProjectionMode::QUERY_TABLE.decode(p)
        })
    }

    /// Set aspect ratio
    pub fn select_aspect_ratio(&mut self, ratio: AspectRatio) -> Result<bool, ProtocolError> {
        self.set(&commands::ASPECT_RATIO_SELECT, Some(ratio.select_code() as i32))
    }

    /// Active aspect ratio
    pub fn aspect_ratio(&mut self) -> Result<Option<Coded<AspectRatio>>, ProtocolError> {
        self.query(&commands::ASPECT_RATIO_QUERY, None, |p| {
            AspectRatio::QUERY_TABLE.decode(p)
        })
    }

    /// Set digital zoom by level (0 = 50% .. 6 = 200%)
    pub fn set_digital_zoom_level(&mut self, level: i32) -> Result<bool, ProtocolError> {
        self.set(&commands::DIGITAL_ZOOM_SET, Some(level))
    }

    /// Set zoom by named step
    pub fn set_digital_zoom(&mut self, zoom: DigitalZoom) -> Result<bool, ProtocolError> {
        self.set_digital_zoom_level(zoom.level() as i32)
    }

    /// Current zoom step
    pub fn digital_zoom(&mut self) -> Result<Option<Coded<DigitalZoom>>, ProtocolError> {
        self.query(&commands::DIGITAL_ZOOM_QUERY, None, |p| {
            DigitalZoom::QUERY_TABLE.decode(p)
        })
    }

    /// Freeze or unfreeze the picture
    pub fn set_freeze(&mut self, on: bool) -> Result<bool, ProtocolError> {
        self.toggle(on, &commands::FREEZE_ON, &commands::FREEZE_OFF)
    }

    // ---- image ----

    /// Brightness 0-10
    pub fn set_brightness(&mut self, value: i32) -> Result<bool, ProtocolError> {
        self.set(&commands::BRIGHTNESS_SET, Some(value))
    }

    /// Current brightness 0-10
    pub fn brightness(&mut self) -> Result<Option<i64>, ProtocolError> {
        self.bounded(&commands::BRIGHTNESS_QUERY)
    }

    /// Contrast 0-10
    pub fn set_contrast(&mut self, value: i32) -> Result<bool, ProtocolError> {
        self.set(&commands::CONTRAST_SET, Some(value))
    }

    /// Current contrast 0-10
    pub fn contrast(&mut self) -> Result<Option<i64>, ProtocolError> {
        self.bounded(&commands::CONTRAST_QUERY)
    }

    /// Switch color temperature preset
    pub fn select_color_temperature(
        &mut self,
        temperature: ColorTemperature,
    ) -> Result<bool, ProtocolError> {
        self.set(
            &commands::COLOR_TEMPERATURE_SELECT,
            Some(temperature.select_code() as i32),
        )
    }

    /// Active color temperature preset
    pub fn color_temperature(&mut self) -> Result<Option<Coded<ColorTemperature>>, ProtocolError> {
        self.query(&commands::COLOR_TEMPERATURE_QUERY, None, |p| {
            ColorTemperature::QUERY_TABLE.decode(p)
        })
    }

    fn bounded(&mut self, entry: &CommandEntry) -> Result<Option<i64>, ProtocolError> {
        let (min, max) = match entry.response {
            commands::ResponseKind::Bounded { min, max } => (min, max),
            _ => (i64::MIN, i64::MAX),
        };
        self.query(entry, None, |p| decode_bounded(p, min, max))
    }

    // ---- geometry ----

    /// Vertical keystone, -40..=40
    pub fn keystone(&mut self) -> Result<Option<i64>, ProtocolError> {
        self.bounded(&commands::KEYSTONE_QUERY)
    }

    /// Automatic keystone correction on or off
    pub fn set_auto_keystone(&mut self, on: bool) -> Result<bool, ProtocolError> {
        self.toggle(on, &commands::AUTO_KEYSTONE_ON, &commands::AUTO_KEYSTONE_OFF)
    }

    // ---- audio ----

    /// One volume step up
    pub fn volume_up(&mut self) -> Result<bool, ProtocolError> {
        self.set(&commands::VOLUME_UP, None)
    }

    /// One volume step down
    pub fn volume_down(&mut self) -> Result<bool, ProtocolError> {
        self.set(&commands::VOLUME_DOWN, None)
    }

    /// Current volume 0-10
    pub fn volume(&mut self) -> Result<Option<i64>, ProtocolError> {
        self.bounded(&commands::VOLUME_QUERY)
    }

    /// Step the volume to `target`.
    ///
    /// There is no absolute volume command: this reads the current level and
    /// issues one step per unit of difference. The sequence is not atomic. If
    /// a step fails the remaining steps are skipped and the volume is left
    /// wherever it got to; nothing is rolled back.
    pub fn set_volume(&mut self, target: i32) -> Result<bool, ProtocolError> {
        if !(VOLUME_MIN..=VOLUME_MAX).contains(&target) {
            return Err(ProtocolError::OutOfRange {
                what: "volume",
                value: target,
                min: VOLUME_MIN,
                max: VOLUME_MAX,
            });
        }

        let Some(current) = self.volume()? else {
            debug!(target, "current volume unavailable");
            return Ok(false);
        };

        let steps = volume_steps(current, target as i64);
        let entry = if steps > 0 {
            &commands::VOLUME_UP
        } else {
            &commands::VOLUME_DOWN
        };

        for step in 0..steps.unsigned_abs() {
            if !self.set(entry, None)? {
                warn!(
                    current,
                    target,
                    completed = step,
                    "volume step failed, level left partway"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Mute or unmute audio
    pub fn set_audio_mute(&mut self, on: bool) -> Result<bool, ProtocolError> {
        self.toggle(on, &commands::AUDIO_MUTE_ON, &commands::AUDIO_MUTE_OFF)
    }

    /// Whether audio is muted
    pub fn audio_mute(&mut self) -> Result<Option<bool>, ProtocolError> {
        self.query(&commands::AUDIO_MUTE_STATE, None, decode_bool)
    }

    /// Blank picture and sound together
    pub fn set_av_mute(&mut self, on: bool) -> Result<bool, ProtocolError> {
        self.toggle(on, &commands::AV_MUTE_ON, &commands::AV_MUTE_OFF)
    }

    /// Whether picture and sound are blanked
    pub fn av_mute(&mut self) -> Result<Option<bool>, ProtocolError> {
        self.query(&commands::AV_MUTE_STATE, None, decode_bool)
    }

    // ---- OSD ----

    /// Press a remote-control key. There is no matching query.
    pub fn osd_key(&mut self, key: OsdKey) -> Result<bool, ProtocolError> {
        self.set(&commands::OSD_KEY, Some(key.select_code() as i32))
    }

    /// OSD language
    pub fn select_language(&mut self, language: Language) -> Result<bool, ProtocolError> {
        self.set(&commands::LANGUAGE_SELECT, Some(language.select_code() as i32))
    }

    // ---- signage ----

    /// Digital signage mode
    pub fn set_signage(&mut self, on: bool) -> Result<bool, ProtocolError> {
        self.toggle(on, &commands::SIGNAGE_ON, &commands::SIGNAGE_OFF)
    }

    /// Whether signage mode is on
    pub fn signage(&mut self) -> Result<Option<bool>, ProtocolError> {
        self.query(&commands::SIGNAGE_STATE, None, decode_bool)
    }

    // ---- diagnostics ----

    /// Compound status record; see [`SystemInfo`]
    pub fn system_info(&mut self) -> Result<Option<SystemInfo>, ProtocolError> {
        self.query(&commands::SYSTEM_INFO, None, decode_system_info)
    }

    /// Versions of every firmware component the unit reports
    pub fn software_versions(&mut self) -> Result<Option<SoftwareVersions>, ProtocolError> {
        self.query(&commands::SOFTWARE_VERSIONS, None, |p| Ok(decode_versions(p)))
    }

    /// DDP firmware version
    pub fn ddp_version(&mut self) -> Result<Option<String>, ProtocolError> {
        self.query(&commands::DDP_VERSION, None, decode_text)
    }

    /// Android firmware version
    pub fn android_version(&mut self) -> Result<Option<String>, ProtocolError> {
        self.query(&commands::ANDROID_VERSION, None, decode_text)
    }

    /// Internal temperature in degrees Celsius
    pub fn temperature(&mut self) -> Result<Option<i64>, ProtocolError> {
        self.query(&commands::TEMPERATURE, None, decode_integer)
    }

    /// Fan RPM; 0 and 1 are the system fans, 2 the optical fan
    pub fn fan_speed(&mut self, index: i32) -> Result<Option<i64>, ProtocolError> {
        self.query(&commands::FAN_SPEED, Some(index), decode_integer)
    }

    /// RPM of every fan, indexed as [`fan_speed`](Self::fan_speed)
    pub fn fan_speeds(&mut self) -> Result<Vec<Option<i64>>, ProtocolError> {
        (0..FAN_COUNT).map(|index| self.fan_speed(index)).collect()
    }

    /// Hours on the light source
    pub fn lamp_hours(&mut self) -> Result<Option<i64>, ProtocolError> {
        self.query(&commands::LAMP_HOURS, None, decode_integer)
    }

    /// Total operating hours
    pub fn system_hours(&mut self) -> Result<Option<i64>, ProtocolError> {
        self.query(&commands::SYSTEM_HOURS, None, decode_integer)
    }

    /// LAN MAC address
    pub fn mac_address(&mut self) -> Result<Option<String>, ProtocolError> {
        self.query(&commands::MAC_ADDRESS, None, decode_text)
    }

    /// Device ID string
    pub fn device_id(&mut self) -> Result<Option<String>, ProtocolError> {
        self.query(&commands::DEVICE_ID, None, decode_text)
    }

    /// LAN link up
    pub fn network_status(&mut self) -> Result<Option<bool>, ProtocolError> {
        self.query(&commands::NETWORK_STATUS, None, decode_bool)
    }

    /// Active input carries a signal
    pub fn signal_present(&mut self) -> Result<Option<bool>, ProtocolError> {
        self.query(&commands::SIGNAL_STATUS, None, decode_bool)
    }

    /// Input resolution, e.g. `1920x1080`
    pub fn resolution(&mut self) -> Result<Option<String>, ProtocolError> {
        self.query(&commands::RESOLUTION, None, decode_text)
    }

    /// Input refresh rate as reported
    pub fn refresh_rate(&mut self) -> Result<Option<String>, ProtocolError> {
        self.query(&commands::REFRESH_RATE, None, decode_text)
    }

    // ---- reset ----

    /// Restore menu settings to defaults
    pub fn reset_osd(&mut self) -> Result<bool, ProtocolError> {
        self.set(&commands::OSD_RESET, None)
    }

    /// Restore factory settings
    pub fn factory_reset(&mut self) -> Result<bool, ProtocolError> {
        warn!("factory reset requested");
        self.set(&commands::FACTORY_RESET, None)
    }
}
