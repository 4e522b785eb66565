//! Protocol errors

use thiserror::Error;

/// Errors that can occur while talking to the projector.
///
/// A projector answering with its failure sentinel is *not* an error; that is
/// reported as [`Outcome::Failure`](super::Outcome::Failure). Errors here are
/// either transport faults (recoverable by reconnecting) or caller mistakes
/// rejected before any byte reaches the wire.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("Not connected to projector")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("{what} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        what: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("Invalid device address '{0}' (expected two digits 00-99)")]
    InvalidAddress(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProtocolError {
    /// True for faults on the link itself, as opposed to rejected input.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProtocolError::SerialError(_)
                | ProtocolError::NotConnected
                | ProtocolError::ConnectionFailed(_)
                | ProtocolError::IoError(_)
        )
    }
}

impl From<serialport::Error> for ProtocolError {
    fn from(e: serialport::Error) -> Self {
        ProtocolError::SerialError(e.to_string())
    }
}
