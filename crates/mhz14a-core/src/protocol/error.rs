//! Protocol errors

use thiserror::Error;

/// Reasons a response packet is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid start byte: {0:#04x}")]
    InvalidStartByte(u8),

    #[error("Unexpected command in response: {0:#04x}")]
    UnexpectedCommand(u8),

    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}
