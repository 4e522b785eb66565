//! Connection management
//!
//! Owns the link to one projector and runs exchanges over it, one at a time.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    reader::{self, ReaderConfig},
    serial::{clear_buffers, configure_port, open_port},
    Command, DeviceAddress, Outcome, ProtocolError, SerialChannel, Transport, DEFAULT_BAUD_RATE,
    DEFAULT_SETTLE_DELAY_MS, DEFAULT_TIMEOUT_MS,
};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Port open in progress
    Connecting,
    /// Connected and ready
    Connected,
    /// Last exchange hit a transport fault; the next one reopens the port
    Error,
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Serial port name (e.g. "/dev/ttyUSB0" or "COM10")
    pub port_name: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Projector ID placed in every frame
    pub address: DeviceAddress,
    /// Blocking read timeout on the port, in milliseconds
    pub read_timeout_ms: u64,
    /// Wait after asserting RTS/DTR before first use
    pub settle_delay_ms: u64,
    /// Poll budget and completion rule
    pub reader: ReaderConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            address: DeviceAddress::BROADCAST,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            reader: ReaderConfig::default(),
        }
    }
}

impl ConnectionConfig {
    /// Defaults for everything but the port name
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Self::default()
        }
    }
}

/// Projector connection.
///
/// Exchanges take `&mut self`, so a single `Connection` can never have two
/// exchanges in flight. Share one across threads behind a `Mutex`.
pub struct Connection {
    /// Open link, if any
    transport: Option<Box<dyn Transport>>,
    /// Current connection state
    state: ConnectionState,
    /// Connection configuration
    config: ConnectionConfig,
    /// Metrics: cumulative bytes and exchanges
    tx_bytes: u64,
    rx_bytes: u64,
    exchanges: u64,
}

impl Connection {
    /// Create a new connection (not yet connected)
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            transport: None,
            state: ConnectionState::Disconnected,
            config,
            tx_bytes: 0,
            rx_bytes: 0,
            exchanges: 0,
        }
    }

    /// Create a connection over an already-open transport.
    ///
    /// The configured read timeout is applied to the transport. A transport
    /// that refuses it is still used, with a warning.
    pub fn with_transport(config: ConnectionConfig, mut transport: Box<dyn Transport>) -> Self {
        let timeout = Duration::from_millis(config.read_timeout_ms);
        if let Err(e) = transport.set_timeout(timeout) {
            warn!(error = %e, "transport rejected read timeout");
        }
        let mut conn = Self::new(config);
        conn.transport = Some(transport);
        conn.state = ConnectionState::Connected;
        conn
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether a link is currently open
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Configuration this connection was created with
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Address used for outgoing frames
    pub fn address(&self) -> DeviceAddress {
        self.config.address
    }

    /// Get cumulative tx bytes, rx bytes and exchange count
    pub fn get_counters(&self) -> (u64, u64, u64) {
        (self.tx_bytes, self.rx_bytes, self.exchanges)
    }

    /// Open the serial port. Does nothing if already open.
    pub fn connect(&mut self) -> Result<(), ProtocolError> {
        if self.transport.is_some() {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        match self.open_serial() {
            Ok(transport) => {
                info!(
                    port = %self.config.port_name,
                    baud = self.config.baud_rate,
                    "connected to projector"
                );
                self.transport = Some(transport);
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Error;
                Err(e)
            }
        }
    }

    fn open_serial(&self) -> Result<Box<dyn Transport>, ProtocolError> {
        let mut port = open_port(&self.config)?;
        configure_port(port.as_mut())?;

        // Give the adapter time to settle after the modem lines change
        std::thread::sleep(Duration::from_millis(self.config.settle_delay_ms));
        clear_buffers(port.as_mut())?;

        Ok(Box::new(SerialChannel::new(port)))
    }

    /// Close the link
    pub fn disconnect(&mut self) {
        if self.transport.take().is_some() {
            debug!("connection closed");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Close and reopen the link; the only recovery for a faulted transport
    pub fn reconnect(&mut self) -> Result<(), ProtocolError> {
        self.disconnect();
        self.connect()
    }

    /// Build a command addressed to this connection's projector
    pub fn command(&self, feature_code: u16, sub_code: u16) -> Command {
        Command::new(self.config.address, feature_code, sub_code)
    }

    /// Run one exchange and classify the response.
    ///
    /// Opens the port first if needed. Transport faults close the link and
    /// come back as errors; everything the projector says (including nothing
    /// at all) comes back as an [`Outcome`].
    pub fn exchange(&mut self, command: &Command) -> Result<Outcome, ProtocolError> {
        self.connect()?;
        let transport = self.transport.as_mut().ok_or(ProtocolError::NotConnected)?;

        let frame = command.encode();
        let result = reader::exchange(transport.as_mut(), &frame, &self.config.reader);

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(command = %command, error = %e, "transport fault, dropping connection");
                self.transport = None;
                self.state = ConnectionState::Error;
                return Err(e);
            }
        };

        self.tx_bytes = self.tx_bytes.saturating_add(frame.len() as u64);
        self.rx_bytes = self
            .rx_bytes
            .saturating_add(response.bytes_received as u64);
        self.exchanges = self.exchanges.saturating_add(1);

        let outcome = Outcome::classify(&response.text);
        debug!(command = %command, response = %response.text, outcome = %outcome, "exchange done");
        Ok(outcome)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FailureReason;
    use std::io::{self, Read, Write};

    /// Answers every frame with a fixed reply
    struct EchoChannel {
        reply: Vec<u8>,
        pending: Vec<u8>,
        fail_writes: bool,
    }

    impl Read for EchoChannel {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    impl Write for EchoChannel {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
            }
            self.pending = self.reply.clone();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for EchoChannel {
        fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
            Ok(())
        }

        fn clear_input_buffer(&mut self) -> io::Result<()> {
            self.pending.clear();
            Ok(())
        }

        fn clear_output_buffer(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn bytes_to_read(&mut self) -> io::Result<u32> {
            Ok(self.pending.len() as u32)
        }
    }

    /// Records the timeout it was given
    struct TimeoutChannel(std::sync::Arc<std::sync::Mutex<Option<Duration>>>);

    impl Read for TimeoutChannel {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for TimeoutChannel {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for TimeoutChannel {
        fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
            *self.0.lock().unwrap() = Some(timeout);
            Ok(())
        }

        fn clear_input_buffer(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn clear_output_buffer(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn bytes_to_read(&mut self) -> io::Result<u32> {
            Ok(0)
        }
    }

    fn fast_config() -> ConnectionConfig {
        ConnectionConfig {
            reader: ReaderConfig {
                attempts: 3,
                poll_interval_ms: 1,
                ..ReaderConfig::default()
            },
            ..ConnectionConfig::default()
        }
    }

    fn echo(reply: &str, fail_writes: bool) -> Box<dyn Transport> {
        Box::new(EchoChannel {
            reply: reply.as_bytes().to_vec(),
            pending: Vec::new(),
            fail_writes,
        })
    }

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.address, DeviceAddress::BROADCAST);
        assert_eq!(config.settle_delay_ms, 200);
        assert_eq!(config.reader.attempts, 10);
    }

    #[test]
    fn test_with_transport_applies_read_timeout() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
        let config = ConnectionConfig {
            read_timeout_ms: 250,
            ..fast_config()
        };
        let conn = Connection::with_transport(config, Box::new(TimeoutChannel(seen.clone())));
        assert!(conn.is_connected());
        assert_eq!(*seen.lock().unwrap(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_connection_state() {
        let conn = Connection::new(ConnectionConfig::default());
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.is_connected());
    }

    #[test]
    fn test_lazy_connect_without_port_fails() {
        let mut conn = Connection::new(fast_config());
        let cmd = conn.command(124, 1);
        let err = conn.exchange(&cmd).unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionFailed(_)));
        assert_eq!(conn.state(), ConnectionState::Error);
    }

    #[test]
    fn test_exchange_classifies_and_counts() {
        let mut conn = Connection::with_transport(fast_config(), echo("Ok1\r", false));
        let cmd = conn.command(124, 1);
        let outcome = conn.exchange(&cmd).unwrap();
        assert_eq!(outcome, Outcome::Data("1".into()));
        assert_eq!(conn.get_counters(), (9, 4, 1));
    }

    #[test]
    fn test_silence_is_an_outcome_not_an_error() {
        let mut conn = Connection::with_transport(fast_config(), echo("", false));
        let cmd = conn.command(124, 1);
        let outcome = conn.exchange(&cmd).unwrap();
        assert_eq!(outcome, Outcome::Failure(FailureReason::NoResponse));
        assert!(conn.is_connected());
    }

    #[test]
    fn test_write_fault_drops_transport() {
        let mut conn = Connection::with_transport(fast_config(), echo("P", true));
        let cmd = conn.command(0, 1);
        let err = conn.exchange(&cmd).unwrap_err();
        assert!(err.is_transport());
        assert!(!conn.is_connected());
        assert_eq!(conn.state(), ConnectionState::Error);
    }

    #[test]
    fn test_command_uses_configured_address() {
        let config = ConnectionConfig {
            address: DeviceAddress::new(7).unwrap(),
            ..ConnectionConfig::default()
        };
        let conn = Connection::new(config);
        assert_eq!(conn.command(21, 5).encode(), b"~0721 5\r");
    }
}
