//! Line encoding
//!
//! Pure transforms from data bits, parity and stop bits onto the `c_cflag`
//! field of a termios structure. Each function only touches its own bits and
//! returns the input untouched on error.

use libc::tcflag_t;

use super::SerialError;

/// Parity mode of the serial line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
    /// Space parity, encoded exactly like [`Parity::None`]
    Space,
}

impl Parity {
    /// Character used for this parity in mode strings such as `8N1`
    pub fn as_char(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
            Parity::Space => 'S',
        }
    }
}

impl TryFrom<char> for Parity {
    type Error = SerialError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'N' => Ok(Parity::None),
            'E' => Ok(Parity::Even),
            'O' => Ok(Parity::Odd),
            'S' => Ok(Parity::Space),
            _ => Err(SerialError::UnsupportedParity(c)),
        }
    }
}

/// Bits of `c_cflag` holding the parity setting
pub const PARITY_MASK: tcflag_t = libc::PARENB | libc::PARODD;

/// Replace the character size with `bits` data bits (5 to 8)
pub fn apply_data_bits(bits: u8, flags: tcflag_t) -> Result<tcflag_t, SerialError> {
    let size = match bits {
        5 => libc::CS5,
        6 => libc::CS6,
        7 => libc::CS7,
        8 => libc::CS8,
        _ => return Err(SerialError::UnsupportedDataBits(bits)),
    };
    Ok((flags & !libc::CSIZE) | size)
}

/// Apply the parity named by `parity` (`N`, `E`, `O` or `S`, any case)
///
/// Space parity clears the parity bits just like `N`; termios has no
/// portable space-parity flag.
pub fn apply_parity(parity: char, flags: tcflag_t) -> Result<tcflag_t, SerialError> {
    let bits = match Parity::try_from(parity)? {
        Parity::None | Parity::Space => 0,
        Parity::Even => libc::PARENB,
        Parity::Odd => libc::PARENB | libc::PARODD,
    };
    Ok((flags & !PARITY_MASK) | bits)
}

/// Apply stop bits encoded as bits x 10 (10 = one, 20 = two)
pub fn apply_stop_bits(stop_bits: u8, flags: tcflag_t) -> Result<tcflag_t, SerialError> {
    match stop_bits {
        10 => Ok(flags & !libc::CSTOPB),
        20 => Ok(flags | libc::CSTOPB),
        _ => Err(SerialError::UnsupportedStopBits(stop_bits)),
    }
}
