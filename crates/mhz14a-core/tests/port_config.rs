//! Port configuration against an in-memory terminal

use std::io;

use mhz14a_core::serial::{
    configure, Configured, Direction, SerialConfig, SerialError, TerminalControl,
};
use pretty_assertions::assert_eq;

/// Terminal whose attributes live in memory
struct MockTerminal {
    attrs: libc::termios,
    reads: usize,
    writes: usize,
    fail_get: bool,
    fail_set: bool,
}

impl MockTerminal {
    fn new() -> Self {
        // SAFETY: termios is plain old data; all-zero is a valid value.
        let mut attrs: libc::termios = unsafe { std::mem::zeroed() };
        attrs.c_cflag = libc::CS8 | libc::HUPCL;
        attrs.c_lflag = libc::ICANON | libc::ECHO | libc::ECHOE | libc::ISIG | libc::IEXTEN;
        attrs.c_iflag = libc::ICRNL;
        attrs.c_oflag = libc::OPOST;
        unsafe {
            libc::cfsetspeed(&mut attrs, libc::B9600);
        }
        Self {
            attrs,
            reads: 0,
            writes: 0,
            fail_get: false,
            fail_set: false,
        }
    }

    fn input_speed(&self) -> libc::speed_t {
        unsafe { libc::cfgetispeed(&self.attrs) }
    }

    fn output_speed(&self) -> libc::speed_t {
        unsafe { libc::cfgetospeed(&self.attrs) }
    }
}

impl TerminalControl for MockTerminal {
    fn attributes(&self) -> io::Result<libc::termios> {
        if self.fail_get {
            return Err(io::Error::from_raw_os_error(libc::ENOTTY));
        }
        Ok(self.attrs)
    }

    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()> {
        if self.fail_set {
            return Err(io::Error::from_raw_os_error(libc::EIO));
        }
        self.writes += 1;
        self.attrs = *attrs;
        Ok(())
    }

    fn discard_input(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn config(baud_rate: u32, direction: Direction) -> SerialConfig {
    SerialConfig {
        baud_rate,
        direction,
        ..SerialConfig::default()
    }
}

#[test]
fn test_configure_7o2_both_directions() {
    let mut term = MockTerminal::new();
    let cfg = SerialConfig {
        baud_rate: 115200,
        data_bits: 7,
        parity: Some('o'),
        stop_bits: 20,
        direction: Direction::Both,
        ..SerialConfig::default()
    };

    assert_eq!(configure(&mut term, &cfg).unwrap(), Configured::Applied);
    assert_eq!(term.writes, 1);
    assert_eq!(term.input_speed(), libc::B115200);
    assert_eq!(term.output_speed(), libc::B115200);

    let cflag = term.attrs.c_cflag;
    assert_eq!(cflag & libc::CSIZE, libc::CS7);
    assert_eq!(cflag & (libc::PARENB | libc::PARODD), libc::PARENB | libc::PARODD);
    assert_eq!(cflag & libc::CSTOPB, libc::CSTOPB);
    assert_eq!(cflag & (libc::CLOCAL | libc::CREAD), libc::CLOCAL | libc::CREAD);
    assert_eq!(cflag & libc::HUPCL, libc::HUPCL);
}

#[test]
fn test_configure_forces_raw_input() {
    let mut term = MockTerminal::new();
    configure(&mut term, &SerialConfig::default()).unwrap();

    let lflag = term.attrs.c_lflag;
    assert_eq!(lflag & (libc::ICANON | libc::ECHO | libc::ECHOE | libc::ISIG), 0);
    // Untouched fields stay as they were
    assert_eq!(lflag & libc::IEXTEN, libc::IEXTEN);
    assert_eq!(term.attrs.c_iflag, libc::ICRNL);
    assert_eq!(term.attrs.c_oflag, libc::OPOST);
}

#[test]
fn test_configure_input_speed_only() {
    let mut term = MockTerminal::new();
    configure(&mut term, &config(19200, Direction::Input)).unwrap();
    // glibc keeps both speeds in the same c_cflag bits, so only the
    // requested direction is checked
    assert_eq!(term.input_speed(), libc::B19200);
}

#[test]
fn test_configure_output_speed_only() {
    let mut term = MockTerminal::new();
    configure(&mut term, &config(19200, Direction::Output)).unwrap();
    assert_eq!(term.output_speed(), libc::B19200);
}

#[test]
fn test_configure_unset_direction_keeps_speed() {
    let mut term = MockTerminal::new();
    assert_eq!(
        configure(&mut term, &config(57600, Direction::Unset)).unwrap(),
        Configured::Applied
    );
    assert_eq!(term.input_speed(), libc::B9600);
    assert_eq!(term.output_speed(), libc::B9600);
}

#[test]
fn test_configure_nothing_requested() {
    let mut term = MockTerminal::new();
    term.fail_get = true;
    let cfg = SerialConfig {
        data_bits: 0,
        parity: None,
        stop_bits: 0,
        direction: Direction::Unset,
        ..SerialConfig::default()
    };
    assert_eq!(configure(&mut term, &cfg).unwrap(), Configured::Unchanged);
    assert_eq!(term.writes, 0);
}

#[test]
fn test_baud_checked_before_noop() {
    let mut term = MockTerminal::new();
    let cfg = SerialConfig {
        baud_rate: 12345,
        data_bits: 0,
        parity: None,
        stop_bits: 0,
        direction: Direction::Unset,
        ..SerialConfig::default()
    };
    assert!(matches!(
        configure(&mut term, &cfg),
        Err(SerialError::UnsupportedBaudRate(12345))
    ));
}

#[test]
fn test_configure_step_errors() {
    let mut term = MockTerminal::new();
    term.fail_get = true;
    assert!(matches!(
        configure(&mut term, &SerialConfig::default()),
        Err(SerialError::GetAttributes(_))
    ));

    let mut term = MockTerminal::new();
    let cfg = SerialConfig {
        data_bits: 9,
        ..SerialConfig::default()
    };
    assert!(matches!(
        configure(&mut term, &cfg),
        Err(SerialError::UnsupportedDataBits(9))
    ));

    let cfg = SerialConfig {
        parity: Some('X'),
        ..SerialConfig::default()
    };
    assert!(matches!(
        configure(&mut term, &cfg),
        Err(SerialError::UnsupportedParity('X'))
    ));

    let cfg = SerialConfig {
        stop_bits: 15,
        ..SerialConfig::default()
    };
    assert!(matches!(
        configure(&mut term, &cfg),
        Err(SerialError::UnsupportedStopBits(15))
    ));
    assert_eq!(term.writes, 0);

    term.fail_set = true;
    assert!(matches!(
        configure(&mut term, &SerialConfig::default()),
        Err(SerialError::SetAttributes(_))
    ));
}

#[test]
fn test_unchanged_fields_are_skipped() {
    let mut term = MockTerminal::new();
    term.attrs.c_cflag |= libc::CSTOPB | libc::PARENB;
    let cfg = SerialConfig {
        data_bits: 0,
        parity: None,
        stop_bits: 0,
        ..SerialConfig::default()
    };
    configure(&mut term, &cfg).unwrap();
    let cflag = term.attrs.c_cflag;
    assert_eq!(cflag & libc::CSIZE, libc::CS8);
    assert_eq!(cflag & (libc::CSTOPB | libc::PARENB), libc::CSTOPB | libc::PARENB);
}
