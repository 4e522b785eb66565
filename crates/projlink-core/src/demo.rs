//! Demo Mode - simulated projector for running without hardware
//!
//! [`SimulatedProjector`] is a [`Transport`] that parses each request frame
//! and answers the way a real unit would. It keeps state for the writable
//! settings, so a value set is the value read back. Temperature and fan
//! speeds wander a little between reads.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::trace;

use crate::commands::{
    AspectRatio, ColorTemperature, DigitalZoom, InputSource, Language, OsdKey, PictureMode,
    ProjectionMode, IMAGE_MAX, VOLUME_MAX,
};
use crate::decode::CodeTable;
use crate::protocol::frame;
use crate::protocol::{
    Command, DeviceAddress, Transport, FAILURE_SENTINEL, FRAME_TERMINATOR, SUCCESS_PREFIX,
    SUCCESS_SENTINEL,
};

/// Nominal fan RPM: two system fans and the optical fan
const FAN_BASE_RPM: [i64; 3] = [1800, 1850, 2400];

/// Settings held by the simulated unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    /// On or standby
    pub power: bool,
    /// Selected input
    pub source: InputSource,
    /// Picture mode
    pub picture_mode: PictureMode,
    /// Projection
    pub projection: ProjectionMode,
    /// Color temperature
    pub color_temperature: ColorTemperature,
    /// Aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Digital zoom
    pub digital_zoom: DigitalZoom,
    /// 0-10
    pub brightness: i32,
    /// 0-10
    pub contrast: i32,
    /// 0-10
    pub volume: i32,
    /// Vertical keystone, reported only
    pub keystone: i32,
    /// Auto keystone
    pub auto_keystone: bool,
    /// Audio mute
    pub audio_mute: bool,
    /// Picture and sound blanked
    pub av_mute: bool,
    /// Freeze
    pub freeze: bool,
    /// Digital signage mode
    pub signage: bool,
    /// OSD language
    pub language: Language,
    /// Lamp hours
    pub lamp_hours: u32,
    /// System hours
    pub system_hours: u32,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            power: true,
            source: InputSource::Hdmi1,
            picture_mode: PictureMode::Presentation,
            projection: ProjectionMode::FrontDesktop,
            color_temperature: ColorTemperature::Standard,
            aspect_ratio: AspectRatio::Auto,
            digital_zoom: DigitalZoom::Percent100,
            brightness: 5,
            contrast: 5,
            volume: 5,
            keystone: 0,
            auto_keystone: false,
            audio_mute: false,
            av_mute: false,
            freeze: false,
            signage: false,
            language: Language::English,
            lamp_hours: 1234,
            system_hours: 2345,
        }
    }
}

impl DeviceState {
    /// Back to the menu defaults, keeping power and counters
    fn reset_osd(&mut self) {
        *self = Self {
            power: self.power,
            lamp_hours: self.lamp_hours,
            system_hours: self.system_hours,
            ..Self::default()
        };
    }
}

/// In-memory projector speaking the serial protocol
pub struct SimulatedProjector {
    address: DeviceAddress,
    state: DeviceState,
    /// Bytes written by the host, up to the next terminator
    inbound: Vec<u8>,
    /// Reply bytes waiting to be read
    outbound: Vec<u8>,
    frames: u64,
    rng: StdRng,
}

impl Default for SimulatedProjector {
    fn default() -> Self {
        Self::new(DeviceAddress::BROADCAST)
    }
}

impl SimulatedProjector {
    /// Create a simulator answering to `address` (and to broadcast)
    pub fn new(address: DeviceAddress) -> Self {
        Self::with_rng(address, StdRng::from_entropy())
    }

    /// Deterministic jitter for tests
    pub fn seeded(address: DeviceAddress, seed: u64) -> Self {
        Self::with_rng(address, StdRng::seed_from_u64(seed))
    }

    fn with_rng(address: DeviceAddress, rng: StdRng) -> Self {
        Self {
            address,
            state: DeviceState::default(),
            inbound: Vec::new(),
            outbound: Vec::new(),
            frames: 0,
            rng,
        }
    }

    /// Current simulated settings
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Edit the simulated settings directly
    pub fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    /// Number of complete frames received
    pub fn frames_received(&self) -> u64 {
        self.frames
    }

    fn handle_frame(&mut self, bytes: &[u8]) {
        self.frames += 1;
        let reply = match frame::parse(bytes) {
            Ok(cmd) if cmd.address != self.address && !cmd.address.is_broadcast() => {
                trace!(command = %cmd, "frame for another projector ignored");
                return;
            }
            Ok(cmd) => self.respond(&cmd),
            Err(e) => {
                trace!(error = %e, "unparseable frame");
                FAILURE_SENTINEL.to_string()
            }
        };
        trace!(reply = %reply, "simulated reply");
        self.outbound.extend_from_slice(reply.as_bytes());
        self.outbound.push(FRAME_TERMINATOR);
    }

    fn respond(&mut self, cmd: &Command) -> String {
        let s = &mut self.state;
        let sub = cmd.sub_code;
        let ack = |ok: bool| {
            if ok {
                SUCCESS_SENTINEL.to_string()
            } else {
                FAILURE_SENTINEL.to_string()
            }
        };
        let data = |payload: &dyn std::fmt::Display| format!("{}{}", SUCCESS_PREFIX, payload);

        match (cmd.feature_code, sub) {
            // power
            (0, 0 | 1) => {
                s.power = sub == 1;
                ack(true)
            }
            (124, 1) => data(&u8::from(s.power)),

            // mutes and freeze
            (2, 0 | 1) => {
                s.av_mute = sub == 1;
                ack(true)
            }
            (355, 1) => data(&u8::from(s.av_mute)),
            (3, 0 | 1) => {
                s.audio_mute = sub == 1;
                ack(true)
            }
            (356, 1) => data(&u8::from(s.audio_mute)),
            (4, 0 | 1) => {
                s.freeze = sub == 1;
                ack(true)
            }

            // source and display
            (12, code) => select(&mut s.source, InputSource::ALL, code, |v| v.select_code()),
            (121, 1) => {
                // Media sources report as the Android home screen
                let shown = match s.source {
                    InputSource::UsbA | InputSource::SdCard => InputSource::AndroidHome,
                    other => other,
                };
                report(&InputSource::QUERY_TABLE, shown)
            }
            (20, code) => select(&mut s.picture_mode, PictureMode::ALL, code, |v| {
                v.select_code()
            }),
            (123, 1) => report(&PictureMode::QUERY_TABLE, s.picture_mode),
            (71, code) => select(&mut s.projection, ProjectionMode::ALL, code, |v| {
                v.select_code()
            }),
            (129, 1) => report(&ProjectionMode::QUERY_TABLE, s.projection),
            (60, code) => select(&mut s.aspect_ratio, AspectRatio::ALL, code, |v| {
                v.select_code()
            }),
            (127, 1) => report(&AspectRatio::QUERY_TABLE, s.aspect_ratio),
            (62, level) => match DigitalZoom::from_level(level) {
                Some(zoom) => {
                    s.digital_zoom = zoom;
                    ack(true)
                }
                None => ack(false),
            },
            (543, 9) => report(&DigitalZoom::QUERY_TABLE, s.digital_zoom),

            // image
            (21, value) => set_level(&mut s.brightness, value, IMAGE_MAX),
            (125, 1) => data(&s.brightness),
            (22, value) => set_level(&mut s.contrast, value, IMAGE_MAX),
            (126, 1) => data(&s.contrast),
            (36, code) => select(&mut s.color_temperature, ColorTemperature::ALL, code, |v| {
                v.select_code()
            }),
            (128, 1) => report(&ColorTemperature::QUERY_TABLE, s.color_temperature),

            // geometry
            (69, 0 | 1) => {
                s.auto_keystone = sub == 1;
                ack(true)
            }
            (543, 3) => data(&s.keystone),

            // audio and remote keys share feature 140
            (140, 18) => {
                s.volume = (s.volume + 1).min(VOLUME_MAX);
                ack(true)
            }
            (140, 17) => {
                s.volume = (s.volume - 1).max(0);
                ack(true)
            }
            (140, code) => ack(OsdKey::ALL.iter().any(|k| k.select_code() == code)),
            (120, 1) => data(&s.volume),
            (70, code) => select(&mut s.language, Language::ALL, code, |v| v.select_code()),

            // signage
            (569, 1 | 2) => {
                s.signage = sub == 2;
                ack(true)
            }
            (568, 1) => data(&u8::from(s.signage)),

            // diagnostics
            (150, 1) => {
                let source = InputSource::SYSTEM_INFO_TABLE
                    .code_for(s.source)
                    .unwrap_or("20");
                let mode = PictureMode::SYSTEM_INFO_TABLE
                    .code_for(s.picture_mode)
                    .unwrap_or("00");
                data(&format!(
                    "{}{:05}{}{}{}",
                    u8::from(s.power),
                    s.lamp_hours,
                    source,
                    "C102",
                    mode
                ))
            }
            (122, 1) => data(&"C102M15R9.0"),
            (357, 3) => data(&"102"),
            (357, 4) => data(&"9.0"),
            (108, 1) => data(&s.lamp_hours),
            (150, 21) => data(&s.system_hours),
            (352, 1) => {
                let base = if s.power { 38 } else { 24 };
                let temperature = base + self.rng.gen_range(0..4);
                data(&temperature)
            }
            (351, fan) => match FAN_BASE_RPM.get(fan as usize) {
                Some(rpm) if s.power => {
                    let rpm = rpm + self.rng.gen_range(-50..=50);
                    data(&rpm)
                }
                Some(_) => data(&0),
                None => ack(false),
            },
            (555, 2) => data(&"00:1A:2B:3C:4D:5E"),
            (558, 1) => data(&format!("PJ{}", self.address)),
            (451, 1) => data(&1),
            (150, 23) => data(&u8::from(s.power)),
            (150, 4) => data(&"1920x1080"),
            (150, 19) => data(&"60Hz"),

            // reset
            (112, 1) => {
                *s = DeviceState::default();
                ack(true)
            }
            (546, 1) => {
                s.reset_osd();
                ack(true)
            }

            _ => ack(false),
        }
    }
}

/// Apply a select code if some value of `all` carries it
fn select<T: Copy>(slot: &mut T, all: &[T], code: u16, select_code: impl Fn(&T) -> u16) -> String {
    match all.iter().find(|&v| select_code(v) == code) {
        Some(value) => {
            *slot = *value;
            SUCCESS_SENTINEL.to_string()
        }
        None => FAILURE_SENTINEL.to_string(),
    }
}

fn set_level(slot: &mut i32, value: u16, max: i32) -> String {
    let value = i32::from(value);
    if value > max {
        return FAILURE_SENTINEL.to_string();
    }
    *slot = value;
    SUCCESS_SENTINEL.to_string()
}

/// Report a setting with its query code
fn report<T: crate::decode::CodeLabel>(table: &CodeTable<T>, value: T) -> String {
    match table.code_for(value) {
        Some(code) => format!("{}{}", SUCCESS_PREFIX, code),
        None => FAILURE_SENTINEL.to_string(),
    }
}

impl Read for SimulatedProjector {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.outbound.len());
        buf[..n].copy_from_slice(&self.outbound[..n]);
        self.outbound.drain(..n);
        Ok(n)
    }
}

impl Write for SimulatedProjector {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.inbound.push(byte);
            if byte == FRAME_TERMINATOR {
                let bytes = std::mem::take(&mut self.inbound);
                self.handle_frame(&bytes);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for SimulatedProjector {
    fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }

    fn clear_input_buffer(&mut self) -> io::Result<()> {
        self.outbound.clear();
        Ok(())
    }

    fn clear_output_buffer(&mut self) -> io::Result<()> {
        self.inbound.clear();
        Ok(())
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        Ok(self.outbound.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Outcome;

    fn ask(sim: &mut SimulatedProjector, feature: u16, sub: u16) -> Outcome {
        let bytes = frame::encode(DeviceAddress::BROADCAST, feature, sub, None);
        sim.write_all(&bytes).unwrap();
        let mut buf = Vec::new();
        sim.read_to_end(&mut buf).unwrap();
        Outcome::classify(&frame::strip(&buf))
    }

    #[test]
    fn test_set_then_query() {
        let mut sim = SimulatedProjector::seeded(DeviceAddress::BROADCAST, 1);
        assert_eq!(ask(&mut sim, 21, 8), Outcome::Success);
        assert_eq!(ask(&mut sim, 125, 1), Outcome::Data("8".into()));
        assert_eq!(ask(&mut sim, 20, 16), Outcome::Success);
        assert_eq!(ask(&mut sim, 123, 1), Outcome::Data("14".into()));
    }

    #[test]
    fn test_unknown_command_fails() {
        let mut sim = SimulatedProjector::default();
        assert!(!ask(&mut sim, 999, 1).is_success());
        assert!(!ask(&mut sim, 21, 11).is_success());
        assert_eq!(sim.state().brightness, 5);
    }

    #[test]
    fn test_other_address_is_ignored() {
        let mut sim = SimulatedProjector::new(DeviceAddress::new(3).unwrap());
        let bytes = frame::encode(DeviceAddress::new(4).unwrap(), 124, 1, None);
        sim.write_all(&bytes).unwrap();
        assert_eq!(sim.bytes_to_read().unwrap(), 0);
        assert_eq!(ask(&mut sim, 124, 1), Outcome::Data("1".into()));
    }

    #[test]
    fn test_volume_saturates() {
        let mut sim = SimulatedProjector::default();
        sim.state_mut().volume = VOLUME_MAX;
        assert_eq!(ask(&mut sim, 140, 18), Outcome::Success);
        assert_eq!(sim.state().volume, VOLUME_MAX);
    }

    #[test]
    fn test_fan_rpm_jitter_stays_near_nominal() {
        let mut sim = SimulatedProjector::seeded(DeviceAddress::BROADCAST, 7);
        for (fan, base) in FAN_BASE_RPM.iter().enumerate() {
            let rpm: i64 = ask(&mut sim, 351, fan as u16)
                .into_payload()
                .unwrap()
                .parse()
                .unwrap();
            assert!((rpm - base).abs() <= 50);
        }
        assert!(!ask(&mut sim, 351, 3).is_success());
    }

    #[test]
    fn test_split_writes_assemble_one_frame() {
        let mut sim = SimulatedProjector::default();
        sim.write_all(b"~00124").unwrap();
        assert_eq!(sim.bytes_to_read().unwrap(), 0);
        sim.write_all(b" 1\r").unwrap();
        assert_eq!(sim.frames_received(), 1);
        assert!(sim.bytes_to_read().unwrap() > 0);
    }
}
