//! Serial configuration errors

use thiserror::Error;

/// Errors raised while translating or applying serial line settings
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    #[error("Unsupported number of data bits: {0}")]
    UnsupportedDataBits(u8),

    #[error("Unsupported parity: {0:?}")]
    UnsupportedParity(char),

    #[error("Unsupported stop bits: {0} (expected 10 or 20)")]
    UnsupportedStopBits(u8),

    #[error("Failed to read terminal attributes: {0}")]
    GetAttributes(#[source] std::io::Error),

    #[error("Failed to set line speed: {0}")]
    SetSpeed(#[source] std::io::Error),

    #[error("Failed to write terminal attributes: {0}")]
    SetAttributes(#[source] std::io::Error),
}
