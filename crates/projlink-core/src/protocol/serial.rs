//! Serial port handling
//!
//! Opens and configures the RS-232 link to the projector.

use serialport::SerialPort;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ConnectionConfig, ProtocolError};

/// Open a serial port with the connection's baud rate and read timeout.
///
/// The port is left unconfigured beyond that; see [`configure_port`].
pub fn open_port(config: &ConnectionConfig) -> Result<Box<dyn SerialPort>, ProtocolError> {
    if config.port_name.is_empty() {
        return Err(ProtocolError::ConnectionFailed(
            "no serial port configured".to_string(),
        ));
    }

    serialport::new(&config.port_name, config.baud_rate)
        .timeout(Duration::from_millis(config.read_timeout_ms))
        .open()
        .map_err(|e| ProtocolError::ConnectionFailed(format!("{}: {}", config.port_name, e)))
}

/// Configure a serial port for projector communication
pub fn configure_port(port: &mut dyn SerialPort) -> Result<(), ProtocolError> {
    // Standard 8N1, no flow control
    port.set_data_bits(serialport::DataBits::Eight)?;
    port.set_parity(serialport::Parity::None)?;
    port.set_stop_bits(serialport::StopBits::One)?;
    port.set_flow_control(serialport::FlowControl::None)?;

    // Some USB adapters refuse modem-line control; the projector does not need it
    if let Err(e) = port.write_request_to_send(true) {
        warn!(error = %e, "failed to assert RTS, continuing");
    }
    if let Err(e) = port.write_data_terminal_ready(true) {
        warn!(error = %e, "failed to assert DTR, continuing");
    }

    debug!("port configured 8N1, RTS/DTR asserted");
    Ok(())
}

/// Clear the serial port buffers
pub fn clear_buffers(port: &mut dyn SerialPort) -> Result<(), ProtocolError> {
    port.clear(serialport::ClearBuffer::All)?;
    Ok(())
}
