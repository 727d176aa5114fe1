//! # mhz14a core library
//!
//! Core functionality for talking to MH-Z14A infrared CO2 sensors.

#![warn(missing_docs)]

//!
//! This library provides:
//! - Serial port configuration through the host's termios interface
//! - The 9-byte MH-Z14A packet protocol with checksum validation
//! - Timeout-bounded full-buffer transfers over a non-blocking descriptor
//! - A sensor session driving open, configure, request/response and close
//!
//! ## Example
//!
//! ```rust,ignore
//! use mhz14a_core::session::{process_command, SensorCommand, SessionOptions};
//!
//! let mut opts = SessionOptions::new("/dev/ttyS0", SensorCommand::ReadGasConcentration);
//! process_command(&mut opts)?;
//! println!("CO2: {} ppm", opts.gas_concentration.unwrap_or_default());
//! ```

pub mod logging;
pub mod protocol;
pub mod serial;
pub mod session;
pub mod transfer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::logging::LogLevel;
    pub use crate::protocol::{Packet, ProtocolError};
    pub use crate::serial::{Direction, SerialConfig, SerialError};
    pub use crate::session::{process_command, SensorCommand, SessionError, SessionOptions};
    pub use crate::transfer::TransferError;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
