//! Serial port handling
//!
//! Maps logical line parameters (baud rate, data bits, parity, stop bits and
//! direction) onto the host's termios attributes and owns the tty descriptor.

mod baud;
mod config;
mod error;
pub mod line;
mod port;
pub mod ports;

pub use baud::{lookup_speed_code, supported_baud_rates, BaudEntry, BAUD_TABLE};
pub use config::{configure, Configured, Direction, SerialConfig};
pub use error::SerialError;
pub use line::Parity;
pub use port::{TerminalControl, TtyPort};
pub use ports::{list_ports, PortInfo};

/// Default baud rate of the MH-Z14A UART
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default device the sensor is wired to
pub const DEFAULT_DEVICE: &str = "/dev/ttyS0";
