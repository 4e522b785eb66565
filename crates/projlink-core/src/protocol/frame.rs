//! Frame codec
//!
//! Builds the ASCII wire frame for a command and cleans up raw response bytes.
//!
//! Request layout:
//!
//! ```text
//! ~ AA FF.. <space> SS.. [<space> ARG] \r
//! ```
//!
//! - `AA`  : two-digit device address (`00` is broadcast)
//! - `FF..`: feature code, at least two digits (`00` = power, `124` = power query)
//! - `SS..`: sub-code, plain decimal
//! - `ARG` : optional signed decimal argument
//!
//! Range checks on values do not happen here; the projector API rejects
//! out-of-range values before a frame is ever built.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ProtocolError, FRAME_START, FRAME_TERMINATOR};

/// Two-digit projector address (00-99)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    /// Address every projector answers to regardless of its configured ID
    pub const BROADCAST: DeviceAddress = DeviceAddress(0);

    /// Address for projector ID `id`; fails above 99
    pub fn new(id: u8) -> Result<Self, ProtocolError> {
        if id > 99 {
            return Err(ProtocolError::InvalidAddress(id.to_string()));
        }
        Ok(Self(id))
    }

    /// Numeric projector ID
    pub fn id(&self) -> u8 {
        self.0
    }

    /// Whether this is the broadcast address
    pub fn is_broadcast(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self::BROADCAST
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for DeviceAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtocolError::InvalidAddress(s.to_string()));
        }
        s.parse::<u8>()
            .map_err(|_| ProtocolError::InvalidAddress(s.to_string()))
            .and_then(Self::new)
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceAddress> for String {
    fn from(addr: DeviceAddress) -> Self {
        addr.to_string()
    }
}

/// One logical command, alive for a single exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Target projector
    pub address: DeviceAddress,
    /// Feature code
    pub feature_code: u16,
    /// Sub code
    pub sub_code: u16,
    /// Optional trailing argument
    pub argument: Option<i32>,
}

impl Command {
    /// Command without a trailing argument
    pub fn new(address: DeviceAddress, feature_code: u16, sub_code: u16) -> Self {
        Self {
            address,
            feature_code,
            sub_code,
            argument: None,
        }
    }

    /// Append a trailing argument
    pub fn with_argument(mut self, argument: i32) -> Self {
        self.argument = Some(argument);
        self
    }

    /// Encode into the exact bytes written to the wire
    pub fn encode(&self) -> Vec<u8> {
        encode(self.address, self.feature_code, self.sub_code, self.argument)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{:02} {}",
            FRAME_START, self.address, self.feature_code, self.sub_code
        )?;
        if let Some(arg) = self.argument {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Build a request frame.
///
/// ```
/// use projlink_core::protocol::{frame, DeviceAddress};
///
/// let bytes = frame::encode(DeviceAddress::BROADCAST, 124, 1, None);
/// assert_eq!(bytes, b"~00124 1\r");
/// ```
pub fn encode(
    address: DeviceAddress,
    feature_code: u16,
    sub_code: u16,
    argument: Option<i32>,
) -> Vec<u8> {
    let mut text = format!("{}{}{:02} {}", FRAME_START, address, feature_code, sub_code);
    if let Some(arg) = argument {
        text.push(' ');
        text.push_str(&arg.to_string());
    }
    let mut bytes = text.into_bytes();
    bytes.push(FRAME_TERMINATOR);
    bytes
}

/// Parse a request frame back into its logical fields.
///
/// Used by the simulated projector to interpret what the host sent.
pub fn parse(bytes: &[u8]) -> Result<Command, ProtocolError> {
    let invalid = |why: &str| {
        ProtocolError::InvalidFrame(format!("{} in {:?}", why, String::from_utf8_lossy(bytes)))
    };

    let text = std::str::from_utf8(bytes).map_err(|_| invalid("invalid UTF-8"))?;
    let body = text
        .strip_prefix(FRAME_START)
        .ok_or_else(|| invalid("missing start marker"))?;
    let body = body
        .strip_suffix(FRAME_TERMINATOR as char)
        .ok_or_else(|| invalid("missing terminator"))?;

    if body.len() < 2 || !body.is_char_boundary(2) {
        return Err(invalid("truncated address"));
    }
    let (address, rest) = body.split_at(2);
    let address: DeviceAddress = address.parse()?;

    let mut fields = rest.split(' ');
    let feature_code = fields
        .next()
        .filter(|f| f.len() >= 2)
        .and_then(|f| f.parse::<u16>().ok())
        .ok_or_else(|| invalid("bad feature code"))?;
    let sub_code = fields
        .next()
        .and_then(|f| f.parse::<u16>().ok())
        .ok_or_else(|| invalid("bad sub-code"))?;
    let argument = match fields.next() {
        Some(arg) => Some(arg.parse::<i32>().map_err(|_| invalid("bad argument"))?),
        None => None,
    };
    if fields.next().is_some() {
        return Err(invalid("trailing fields"));
    }

    Ok(Command {
        address,
        feature_code,
        sub_code,
        argument,
    })
}

/// Turn raw response bytes into a trimmed ASCII string.
///
/// Bytes outside 7-bit ASCII are dropped; this never fails.
pub fn strip(raw: &[u8]) -> String {
    let text: String = raw
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect();
    text.trim().to_string()
}
