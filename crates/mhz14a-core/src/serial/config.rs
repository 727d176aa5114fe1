//! Port configuration
//!
//! Reads the termios structure of a port, applies speed and line encoding and
//! writes it back in one `tcsetattr` call.

use std::path::PathBuf;

use super::line::{apply_data_bits, apply_parity, apply_stop_bits};
use super::{lookup_speed_code, SerialError, TerminalControl, DEFAULT_BAUD_RATE, DEFAULT_DEVICE};

/// Which clock direction a speed setting applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Leave both speeds untouched
    #[default]
    Unset,
    /// Receive speed only
    Input,
    /// Transmit speed only
    Output,
    /// Receive and transmit speed
    Both,
}

/// Serial line parameters
///
/// `data_bits == 0`, `parity == None` and `stop_bits == 0` each mean "keep
/// the port's current setting".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Serial device path
    pub device: PathBuf,
    /// Baud rate, must be present in the baud table
    pub baud_rate: u32,
    /// Data bits, 5 to 8
    pub data_bits: u8,
    /// Parity character: `N`, `E`, `O` or `S`, any case
    pub parity: Option<char>,
    /// Stop bits x 10: 10 for one stop bit, 20 for two
    pub stop_bits: u8,
    /// Which direction the baud rate is applied to
    pub direction: Direction,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            parity: Some('N'),
            stop_bits: 10,
            direction: Direction::Both,
        }
    }
}

impl SerialConfig {
    /// True when no line setting was requested at all
    pub fn is_noop(&self) -> bool {
        self.direction == Direction::Unset
            && self.data_bits == 0
            && self.parity.is_none()
            && self.stop_bits == 0
    }
}

/// Result of a successful [`configure`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configured {
    /// Attributes were written to the port
    Applied,
    /// Nothing was requested, the port was not touched
    Unchanged,
}

/// Apply `config` to the terminal behind `port`
///
/// The port is always switched to raw input with the receiver enabled and
/// modem control lines ignored.
pub fn configure<T>(port: &mut T, config: &SerialConfig) -> Result<Configured, SerialError>
where
    T: TerminalControl + ?Sized,
{
    let speed = lookup_speed_code(config.baud_rate)?;

    if config.is_noop() {
        tracing::debug!("configure: nothing requested, leaving port untouched");
        return Ok(Configured::Unchanged);
    }

    let mut attrs = port.attributes().map_err(SerialError::GetAttributes)?;

    // SAFETY: the cfset* functions only write speed fields of `attrs`.
    let rc = unsafe {
        match config.direction {
            Direction::Unset => 0,
            Direction::Input => libc::cfsetispeed(&mut attrs, speed),
            Direction::Output => libc::cfsetospeed(&mut attrs, speed),
            Direction::Both => libc::cfsetspeed(&mut attrs, speed),
        }
    };
    if rc != 0 {
        return Err(SerialError::SetSpeed(std::io::Error::last_os_error()));
    }

    if config.data_bits != 0 {
        attrs.c_cflag = apply_data_bits(config.data_bits, attrs.c_cflag)?;
    }
    if let Some(parity) = config.parity {
        attrs.c_cflag = apply_parity(parity, attrs.c_cflag)?;
    }
    if config.stop_bits != 0 {
        attrs.c_cflag = apply_stop_bits(config.stop_bits, attrs.c_cflag)?;
    }

    attrs.c_cflag |= libc::CLOCAL | libc::CREAD;
    attrs.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ECHOE | libc::ISIG);

    port.set_attributes(&attrs).map_err(SerialError::SetAttributes)?;

    tracing::info!(
        "configured {} at {} baud ({:?}), mode {}{}{}",
        config.device.display(),
        config.baud_rate,
        config.direction,
        config.data_bits,
        config.parity.unwrap_or('-'),
        config.stop_bits / 10
    );
    Ok(Configured::Applied)
}
