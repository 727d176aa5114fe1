//! Baud rate lookup
//!
//! Translates integer baud rates into the OS `speed_t` codes expected by
//! `cfsetispeed`/`cfsetospeed`. Only exact matches are accepted.

use libc::speed_t;

use super::SerialError;

/// A supported baud rate and its termios speed code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudEntry {
    /// Rate in bits per second
    pub rate: u32,
    /// Opaque OS speed constant (`B9600` and friends)
    pub speed: speed_t,
}

const fn entry(rate: u32, speed: speed_t) -> BaudEntry {
    BaudEntry { rate, speed }
}

/// Supported rates on Linux, ordered by rate
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const BAUD_TABLE: &[BaudEntry] = &[
    entry(0, libc::B0),
    entry(50, libc::B50),
    entry(75, libc::B75),
    entry(110, libc::B110),
    entry(134, libc::B134),
    entry(150, libc::B150),
    entry(200, libc::B200),
    entry(300, libc::B300),
    entry(600, libc::B600),
    entry(1200, libc::B1200),
    entry(1800, libc::B1800),
    entry(2400, libc::B2400),
    entry(4800, libc::B4800),
    entry(9600, libc::B9600),
    entry(19200, libc::B19200),
    entry(38400, libc::B38400),
    entry(57600, libc::B57600),
    entry(115200, libc::B115200),
    entry(230400, libc::B230400),
    entry(460800, libc::B460800),
    entry(500000, libc::B500000),
    entry(576000, libc::B576000),
    entry(921600, libc::B921600),
    entry(1000000, libc::B1000000),
    entry(1152000, libc::B1152000),
    entry(1500000, libc::B1500000),
    entry(2000000, libc::B2000000),
    entry(2500000, libc::B2500000),
    entry(3000000, libc::B3000000),
    entry(3500000, libc::B3500000),
    entry(4000000, libc::B4000000),
];

/// Supported rates on BSD-derived systems, ordered by rate
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub const BAUD_TABLE: &[BaudEntry] = &[
    entry(0, libc::B0),
    entry(50, libc::B50),
    entry(75, libc::B75),
    entry(110, libc::B110),
    entry(134, libc::B134),
    entry(150, libc::B150),
    entry(200, libc::B200),
    entry(300, libc::B300),
    entry(600, libc::B600),
    entry(1200, libc::B1200),
    entry(1800, libc::B1800),
    entry(2400, libc::B2400),
    entry(4800, libc::B4800),
    entry(9600, libc::B9600),
    entry(19200, libc::B19200),
    entry(38400, libc::B38400),
    entry(57600, libc::B57600),
    entry(115200, libc::B115200),
    entry(230400, libc::B230400),
];

/// Look up the termios speed code for an exact baud rate
pub fn lookup_speed_code(rate: u32) -> Result<speed_t, SerialError> {
    BAUD_TABLE
        .iter()
        .find(|entry| entry.rate == rate)
        .map(|entry| entry.speed)
        .ok_or(SerialError::UnsupportedBaudRate(rate))
}

/// All baud rates accepted by [`lookup_speed_code`]
pub fn supported_baud_rates() -> impl Iterator<Item = u32> {
    BAUD_TABLE.iter().map(|entry| entry.rate)
}
