//! Packet encoding/decoding
//!
//! Packet layout:
//! - byte 0: start marker `0xFF`
//! - bytes 1..=7: payload
//! - byte 8: checksum, `0x100 - sum(payload)` modulo 256
//!
//! Requests carry the sensor id at byte 1 and the command at byte 2; the span
//! calibration request adds the span point (big-endian) at bytes 3..=4.
//! Gas responses carry the command at byte 1 and the concentration
//! (big-endian) at bytes 2..=3.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use super::{
    ProtocolError, CMD_CALIBRATE_SPAN, CMD_CALIBRATE_ZERO, CMD_GAS_CONCENTRATION, PACKET_LEN,
    SENSOR_ID, START_BYTE,
};

const CHECKSUM_OFFSET: usize = PACKET_LEN - 1;

/// A 9-byte protocol packet
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Packet([u8; PACKET_LEN]);

impl Packet {
    /// Wrap raw bytes received from the wire without validating them
    pub fn from_bytes(bytes: [u8; PACKET_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes to put on the wire
    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    /// The seven bytes between the start marker and the checksum
    pub fn payload(&self) -> &[u8] {
        &self.0[1..CHECKSUM_OFFSET]
    }

    /// Checksum byte as carried by the packet
    pub fn checksum_byte(&self) -> u8 {
        self.0[CHECKSUM_OFFSET]
    }

    /// Request for the current gas concentration
    pub fn read_gas() -> Self {
        Self::request(CMD_GAS_CONCENTRATION, |_| {})
    }

    /// Request to calibrate the zero point
    pub fn calibrate_zero() -> Self {
        Self::request(CMD_CALIBRATE_ZERO, |_| {})
    }

    /// Request to calibrate the span point
    pub fn calibrate_span(span_point: u16) -> Self {
        Self::request(CMD_CALIBRATE_SPAN, |bytes| {
            BigEndian::write_u16(&mut bytes[3..5], span_point)
        })
    }

    fn request(command: u8, fill: impl FnOnce(&mut [u8; PACKET_LEN])) -> Self {
        let mut bytes = [0u8; PACKET_LEN];
        bytes[0] = START_BYTE;
        bytes[1] = SENSOR_ID;
        bytes[2] = command;
        fill(&mut bytes);
        let mut packet = Self(bytes);
        packet.0[CHECKSUM_OFFSET] = checksum(Some(&packet));
        packet
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Packet({:02x?})", self.0)
    }
}

/// Compute the checksum over the payload of `packet`
///
/// `None` yields `0xFF`, which is never compared against a real packet.
pub fn checksum(packet: Option<&Packet>) -> u8 {
    let Some(packet) = packet else {
        return 0xFF;
    };
    packet
        .payload()
        .iter()
        .fold(0xFFu8, |cs, &b| cs.wrapping_sub(b))
        .wrapping_add(1)
}

/// Validate a gas concentration response and decode the concentration
///
/// Checks run in order (start byte, command, checksum) and the first failure
/// is returned.
pub fn parse_gas_response(packet: &Packet) -> Result<u16, ProtocolError> {
    let bytes = packet.as_bytes();
    if bytes[0] != START_BYTE {
        return Err(ProtocolError::InvalidStartByte(bytes[0]));
    }
    if bytes[1] != CMD_GAS_CONCENTRATION {
        return Err(ProtocolError::UnexpectedCommand(bytes[1]));
    }
    let expected = checksum(Some(packet));
    if expected != packet.checksum_byte() {
        return Err(ProtocolError::ChecksumMismatch {
            expected,
            actual: packet.checksum_byte(),
        });
    }
    Ok(BigEndian::read_u16(&bytes[2..4]))
}
