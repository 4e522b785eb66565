//! Serial Protocol Communication
//!
//! Implements the ASCII RS-232 command protocol used by DDP-based projectors.
//!
//! An exchange is one request frame followed by a short, unframed response:
//! `P` (accepted), `F` (rejected) or `Ok` plus a payload. Responses carry no
//! length field, so the reader polls and decides completion heuristically.

mod connection;
mod error;
pub mod frame;
mod outcome;
pub mod reader;
pub mod serial;
pub mod stream;

pub use connection::{Connection, ConnectionConfig, ConnectionState};
pub use error::ProtocolError;
pub use frame::{Command, DeviceAddress};
pub use outcome::{FailureReason, Outcome};
pub use reader::{CompletionMode, ReaderConfig};
pub use serial::{clear_buffers, configure_port, open_port};
pub use stream::{SerialChannel, Transport};

/// Default baud rate for projector RS-232 ports
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default blocking read timeout on the port itself, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Delay after asserting RTS/DTR before the first exchange
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

/// Poll iterations per exchange
pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;

/// Delay before each poll iteration
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// First byte of every request frame
pub const FRAME_START: char = '~';

/// Last byte of every request frame
pub const FRAME_TERMINATOR: u8 = b'\r';

/// Bare acknowledgement
pub const SUCCESS_SENTINEL: &str = "P";

/// Rejection
pub const FAILURE_SENTINEL: &str = "F";

/// Prefix of a data-bearing response
pub const SUCCESS_PREFIX: &str = "Ok";
