//! # ProjLink Core Library
//!
//! Host-side control of projectors over their RS-232 command port.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The serial wire protocol: framing, the polling response reader and
//!   response classification
//! - Field decoders for the projector's status payloads
//! - A command table and a typed API with one call per projector feature
//! - Configuration snapshots saved as JSON or YAML and replayed later
//! - A simulated projector for running without hardware
//!
//! ## Example
//!
//! ```rust,no_run
//! use projlink_core::prelude::*;
//!
//! let mut projector = Projector::new(ConnectionConfig::new("/dev/ttyUSB0"));
//!
//! if projector.power_state()? == Some(false) {
//!     projector.power_on()?;
//! }
//! projector.set_brightness(7)?;
//! println!("source: {:?}", projector.source()?.map(|s| s.label()));
//! # Ok::<(), projlink_core::protocol::ProtocolError>(())
//! ```

pub mod commands;
pub mod decode;
pub mod demo;
pub mod projector;
pub mod protocol;
pub mod snapshot;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commands::{
        AspectRatio, ColorTemperature, DecodedValue, DigitalZoom, InputSource, Language, OsdKey,
        PictureMode, ProjectionMode,
    };
    pub use crate::decode::{Coded, Labeled, SoftwareVersions, SystemInfo};
    pub use crate::demo::SimulatedProjector;
    pub use crate::projector::Projector;
    pub use crate::protocol::{
        Connection, ConnectionConfig, ConnectionState, DeviceAddress, Outcome, ProtocolError,
    };
    pub use crate::snapshot::{ApplyOptions, ApplyReport, Snapshot, SnapshotFormat};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
