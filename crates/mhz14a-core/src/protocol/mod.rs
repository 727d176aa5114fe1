//! MH-Z14A packet protocol
//!
//! Every exchange with the sensor uses a fixed 9-byte packet: a `0xFF` start
//! marker, seven payload bytes and a trailing checksum byte.

mod error;
mod packet;

pub use error::ProtocolError;
pub use packet::{checksum, parse_gas_response, Packet};

/// Size of every packet on the wire
pub const PACKET_LEN: usize = 9;

/// First byte of every packet
pub const START_BYTE: u8 = 0xFF;

/// Sensor address used in requests
pub const SENSOR_ID: u8 = 0x01;

/// Read gas concentration
pub const CMD_GAS_CONCENTRATION: u8 = 0x86;

/// Calibrate zero point
pub const CMD_CALIBRATE_ZERO: u8 = 0x87;

/// Calibrate span point
pub const CMD_CALIBRATE_SPAN: u8 = 0x88;
