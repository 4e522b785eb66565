use pretty_assertions::assert_eq;
use projlink_core::commands::DecodedValue;
use projlink_core::decode::SoftwareComponent;
use projlink_core::prelude::*;
use projlink_core::protocol::{ReaderConfig, Transport};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What the mock saw and what it will say next
#[derive(Default)]
struct MockState {
    /// Complete frames written by the host
    frames: Vec<String>,
    /// One entry per frame; `None` means stay silent
    script: VecDeque<Option<&'static str>>,
    pending: Vec<u8>,
    partial: Vec<u8>,
    fail_on_send: bool,
}

/// Scripted transport; clones share state so tests can inspect it after
/// handing one to a connection
#[derive(Clone, Default)]
struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    fn with_responses(responses: &[Option<&'static str>]) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().script = responses.iter().copied().collect();
        mock
    }

    fn failing() -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().fail_on_send = true;
        mock
    }

    fn frames(&self) -> Vec<String> {
        self.state.lock().unwrap().frames.clone()
    }

    fn write_count(&self) -> usize {
        self.state.lock().unwrap().frames.len()
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let n = buf.len().min(state.pending.len());
        buf[..n].copy_from_slice(&state.pending[..n]);
        state.pending.drain(..n);
        Ok(n)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.fail_on_send {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "cable pulled"));
        }
        for &byte in buf {
            state.partial.push(byte);
            if byte == b'\r' {
                let frame = std::mem::take(&mut state.partial);
                state.frames.push(String::from_utf8_lossy(&frame).into_owned());
                if let Some(Some(reply)) = state.script.pop_front() {
                    state.pending.extend_from_slice(reply.as_bytes());
                    state.pending.push(b'\r');
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }

    fn clear_input_buffer(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().pending.clear();
        Ok(())
    }

    fn clear_output_buffer(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        Ok(self.state.lock().unwrap().pending.len() as u32)
    }
}

fn fast_reader() -> ReaderConfig {
    ReaderConfig {
        attempts: 10,
        poll_interval_ms: 1,
        ..ReaderConfig::default()
    }
}

fn projector_with(mock: &MockTransport) -> Projector {
    let config = ConnectionConfig {
        reader: fast_reader(),
        ..ConnectionConfig::default()
    };
    Projector::with_connection(Connection::with_transport(config, Box::new(mock.clone())))
}

#[test]
fn test_brightness_out_of_range_writes_nothing() {
    let mock = MockTransport::with_responses(&[Some("P"), Some("P")]);
    let mut projector = projector_with(&mock);

    for value in [11, -1] {
        let err = projector.set_brightness(value).unwrap_err();
        assert!(matches!(err, ProtocolError::OutOfRange { what: "brightness.set", .. }));
    }
    assert!(projector.set_contrast(42).is_err());
    assert!(projector.set_digital_zoom_level(7).is_err());
    assert_eq!(mock.write_count(), 0);
}

#[test]
fn test_brightness_in_range_frame() {
    let mock = MockTransport::with_responses(&[Some("P")]);
    let mut projector = projector_with(&mock);

    assert!(projector.set_brightness(10).unwrap());
    assert_eq!(mock.frames(), vec!["~0021 10\r"]);
}

#[test]
fn test_volume_steps_up() {
    let mock = MockTransport::with_responses(&[
        Some("Ok3"),
        Some("P"),
        Some("P"),
        Some("P"),
        Some("P"),
    ]);
    let mut projector = projector_with(&mock);

    assert!(projector.set_volume(7).unwrap());
    let frames = mock.frames();
    assert_eq!(frames[0], "~00120 1\r");
    assert_eq!(frames[1..].to_vec(), vec!["~00140 18\r"; 4]);
}

#[test]
fn test_volume_steps_down() {
    let mock = MockTransport::with_responses(&[Some("Ok3"), Some("P"), Some("P")]);
    let mut projector = projector_with(&mock);

    assert!(projector.set_volume(1).unwrap());
    let frames = mock.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1..].to_vec(), vec!["~00140 17\r"; 2]);
}

#[test]
fn test_volume_already_at_target() {
    let mock = MockTransport::with_responses(&[Some("Ok5")]);
    let mut projector = projector_with(&mock);

    assert!(projector.set_volume(5).unwrap());
    assert_eq!(mock.write_count(), 1);
}

#[test]
fn test_volume_stops_at_first_failed_step() {
    let mock =
        MockTransport::with_responses(&[Some("Ok2"), Some("P"), Some("F"), Some("P"), Some("P")]);
    let mut projector = projector_with(&mock);

    assert!(!projector.set_volume(6).unwrap());
    // query + two steps, the second of which failed
    assert_eq!(mock.write_count(), 3);
}

#[test]
fn test_volume_unreadable_sends_no_steps() {
    let mock = MockTransport::with_responses(&[Some("F")]);
    let mut projector = projector_with(&mock);

    assert!(!projector.set_volume(6).unwrap());
    assert_eq!(mock.write_count(), 1);
}

#[test]
fn test_power_state_ok1_is_true() {
    let mock = MockTransport::with_responses(&[Some("Ok1"), Some("Ok0"), Some("Ok7")]);
    let mut projector = projector_with(&mock);

    assert_eq!(projector.power_state().unwrap(), Some(true));
    assert_eq!(projector.power_state().unwrap(), Some(false));
    assert_eq!(projector.power_state().unwrap(), None);
    assert_eq!(mock.frames()[0], "~00124 1\r");
}

#[test]
fn test_setter_results() {
    let mock = MockTransport::with_responses(&[Some("P"), Some("F"), Some("garbage"), None]);
    let mut projector = projector_with(&mock);

    assert!(projector.power_on().unwrap());
    assert!(!projector.power_on().unwrap());
    assert!(!projector.power_on().unwrap());
    assert!(!projector.power_on().unwrap());
}

#[test]
fn test_system_info_compound_decode() {
    let mock = MockTransport::with_responses(&[Some("Ok1001237072001001")]);
    let mut projector = projector_with(&mock);

    let info = projector.system_info().unwrap().unwrap();
    assert_eq!(info.power, Some(true));
    assert_eq!(info.lamp_hours, Some(123));
    assert_eq!(info.source.tag, None);
    assert!(info.source.label.contains("70"));
    assert_eq!(info.firmware, "7200");
    assert_eq!(info.picture_mode.map(|m| m.label), Some("Unknown (10)".to_string()));
}

#[test]
fn test_short_system_info_is_unavailable() {
    let mock = MockTransport::with_responses(&[Some("Ok10012")]);
    let mut projector = projector_with(&mock);

    assert_eq!(projector.system_info().unwrap(), None);
}

#[test]
fn test_malformed_payload_is_unavailable() {
    let mock = MockTransport::with_responses(&[Some("Okab"), Some("Ok11"), Some("Ok-12")]);
    let mut projector = projector_with(&mock);

    assert_eq!(projector.brightness().unwrap(), None);
    assert_eq!(projector.brightness().unwrap(), None);
    assert_eq!(projector.keystone().unwrap(), Some(-12));
}

#[test]
fn test_enumerated_queries() {
    let mock = MockTransport::with_responses(&[
        Some("Ok14"),
        Some("Ok5"),
        Some("Ok20"),
        Some("Ok99"),
        Some("Ok3"),
    ]);
    let mut projector = projector_with(&mock);

    assert_eq!(
        projector.picture_mode().unwrap().and_then(|m| m.known()),
        Some(PictureMode::Photo)
    );
    assert_eq!(
        projector.color_temperature().unwrap().and_then(|c| c.known()),
        Some(ColorTemperature::Cold)
    );
    assert_eq!(
        projector.source().unwrap().and_then(|s| s.known()),
        Some(InputSource::AndroidHome)
    );
    assert_eq!(
        projector.aspect_ratio().unwrap().map(|a| a.label()),
        Some("Unknown (99)".to_string())
    );
    assert_eq!(
        projector.digital_zoom().unwrap().and_then(|z| z.known()),
        Some(DigitalZoom::Percent125)
    );
}

#[test]
fn test_versions_and_fans() {
    let mock = MockTransport::with_responses(&[
        Some("OkC102M15R9.0"),
        Some("Ok1800"),
        None,
        Some("Ok2400"),
    ]);
    let mut projector = projector_with(&mock);

    let versions = projector.software_versions().unwrap().unwrap();
    assert_eq!(versions.get(SoftwareComponent::Android), Some("9.0"));
    assert_eq!(
        projector.fan_speeds().unwrap(),
        vec![Some(1800), None, Some(2400)]
    );
    assert_eq!(
        mock.frames()[1..].to_vec(),
        vec!["~00351 0\r", "~00351 1\r", "~00351 2\r"]
    );
}

#[test]
fn test_select_uses_select_code() {
    let mock = MockTransport::with_responses(&[Some("P"), Some("P"), Some("P")]);
    let mut projector = projector_with(&mock);

    projector.select_picture_mode(PictureMode::Photo).unwrap();
    projector.osd_key(OsdKey::Menu).unwrap();
    projector.select_source(InputSource::SdCard).unwrap();
    assert_eq!(mock.frames(), vec!["~0020 16\r", "~00140 20\r", "~0012 31\r"]);
}

#[test]
fn test_query_by_name() {
    let mock = MockTransport::with_responses(&[Some("Ok38"), Some("P")]);
    let mut projector = projector_with(&mock);

    assert_eq!(
        projector.query_by_name("info.temperature", None).unwrap(),
        Some(DecodedValue::Integer(38))
    );
    assert_eq!(
        projector.query_by_name("freeze.on", None).unwrap(),
        Some(DecodedValue::Bool(true))
    );
}

#[test]
fn test_no_response_is_bounded() {
    let mock = MockTransport::with_responses(&[None]);
    let reader = ReaderConfig {
        attempts: 10,
        poll_interval_ms: 20,
        ..ReaderConfig::default()
    };
    let budget = reader.budget();
    let config = ConnectionConfig {
        reader,
        ..ConnectionConfig::default()
    };
    let mut projector =
        Projector::with_connection(Connection::with_transport(config, Box::new(mock.clone())));

    let start = Instant::now();
    assert_eq!(projector.power_state().unwrap(), None);
    let elapsed = start.elapsed();

    assert!(elapsed >= budget);
    assert!(elapsed < budget * 3, "waited {:?}", elapsed);
}

#[test]
fn test_default_budget_is_about_one_second() {
    assert_eq!(ReaderConfig::default().budget(), Duration::from_millis(1000));
}

#[test]
fn test_transport_fault_drops_connection() {
    let mock = MockTransport::failing();
    let mut projector = projector_with(&mock);

    let err = projector.power_on().unwrap_err();
    assert!(err.is_transport());
    assert!(!projector.connection().is_connected());
    assert_eq!(projector.connection().state(), ConnectionState::Error);
}

#[test]
fn test_frames_carry_configured_address() {
    let mock = MockTransport::with_responses(&[Some("P")]);
    let config = ConnectionConfig {
        address: DeviceAddress::new(12).unwrap(),
        reader: fast_reader(),
        ..ConnectionConfig::default()
    };
    let mut projector =
        Projector::with_connection(Connection::with_transport(config, Box::new(mock.clone())));

    projector.reset_osd().unwrap();
    assert_eq!(mock.frames(), vec!["~12546 1\r"]);
}

#[test]
fn test_projector_is_shareable_behind_mutex() {
    let mock = MockTransport::with_responses(&[Some("Ok1"), Some("Ok0")]);
    let shared = Arc::new(Mutex::new(projector_with(&mock)));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || shared.lock().unwrap().av_mute().unwrap())
        })
        .collect();
    let mut results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort();

    assert_eq!(results, vec![Some(false), Some(true)]);
    assert_eq!(mock.write_count(), 2);
}
