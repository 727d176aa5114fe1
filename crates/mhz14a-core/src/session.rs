//! Sensor session
//!
//! Drives one command against the sensor: open the device, configure the
//! line, send the request (and read the response for gas readings) within a
//! retry budget, then close the device. The device is closed exactly once on
//! every path after a successful open.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::protocol::{parse_gas_response, Packet, ProtocolError, PACKET_LEN};
use crate::protocol::{CMD_CALIBRATE_SPAN, CMD_CALIBRATE_ZERO, CMD_GAS_CONCENTRATION};
use crate::serial::{configure, Direction, SerialConfig, SerialError, TerminalControl, TtyPort};
use crate::transfer::{read_full, write_full, SerialIo, TransferError};

/// Default number of send/receive attempts
pub const DEFAULT_TRIES: u32 = 3;

/// Default per-attempt readiness timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Command to run on the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCommand {
    /// Read the CO2 concentration in ppm
    ReadGasConcentration,
    /// Calibrate the zero point (sensor must sit in 400 ppm air)
    CalibrateZero,
    /// Calibrate the span point to the given concentration
    CalibrateSpan(u16),
}

impl SensorCommand {
    /// Command byte on the wire
    pub fn code(&self) -> u8 {
        match self {
            SensorCommand::ReadGasConcentration => CMD_GAS_CONCENTRATION,
            SensorCommand::CalibrateZero => CMD_CALIBRATE_ZERO,
            SensorCommand::CalibrateSpan(_) => CMD_CALIBRATE_SPAN,
        }
    }

    /// Build a command from its wire code; `span_point` is only used by
    /// span calibration
    ///
    /// For library callers holding raw command bytes. The `mhz14a` binary
    /// builds [`SensorCommand`] values directly from its flags, so it never
    /// produces [`SessionError::UnsupportedCommand`].
    pub fn from_code(code: u8, span_point: u16) -> Result<Self, SessionError> {
        match code {
            CMD_GAS_CONCENTRATION => Ok(SensorCommand::ReadGasConcentration),
            CMD_CALIBRATE_ZERO => Ok(SensorCommand::CalibrateZero),
            CMD_CALIBRATE_SPAN => Ok(SensorCommand::CalibrateSpan(span_point)),
            other => Err(SessionError::UnsupportedCommand(other)),
        }
    }

    /// Request packet for this command
    pub fn request(&self) -> Packet {
        match *self {
            SensorCommand::ReadGasConcentration => Packet::read_gas(),
            SensorCommand::CalibrateZero => Packet::calibrate_zero(),
            SensorCommand::CalibrateSpan(span_point) => Packet::calibrate_span(span_point),
        }
    }

    /// Whether the sensor's reply is read and validated
    ///
    /// Calibration replies are not awaited.
    pub fn expects_response(&self) -> bool {
        matches!(self, SensorCommand::ReadGasConcentration)
    }
}

/// Everything needed to run one command, plus its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Line settings; the direction is forced to [`Direction::Both`]
    pub serial: SerialConfig,
    /// Command to execute
    pub command: SensorCommand,
    /// Send/receive attempts, at least one is always made
    pub tries: u32,
    /// Per-attempt readiness timeout, `None` waits forever
    pub timeout: Option<Duration>,
    /// Output: concentration in ppm after a successful read
    pub gas_concentration: Option<u16>,
}

impl SessionOptions {
    /// Options with default line settings for `device`
    pub fn new(device: impl Into<PathBuf>, command: SensorCommand) -> Self {
        Self {
            serial: SerialConfig {
                device: device.into(),
                ..SerialConfig::default()
            },
            command,
            tries: DEFAULT_TRIES,
            timeout: Some(DEFAULT_TIMEOUT),
            gas_concentration: None,
        }
    }
}

/// Session progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing done yet
    Idle,
    /// Device open
    PortOpened,
    /// Line settings applied
    PortConfigured,
    /// Full request written
    RequestSent,
    /// Full response read
    ResponseReceived,
    /// Command finished and device closed
    Done,
    /// Command failed; see the returned error
    Failed,
}

/// Session errors, one variant per failure class
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to configure port: {0}")]
    Configure(#[from] SerialError),

    #[error("Failed to send request after {attempts} attempt(s)")]
    Write {
        attempts: u32,
        #[source]
        source: Option<TransferError>,
    },

    #[error("No complete response after {attempts} attempt(s)")]
    Read {
        attempts: u32,
        #[source]
        source: Option<TransferError>,
    },

    #[error("Invalid response: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Unsupported command: {0:#04x}")]
    UnsupportedCommand(u8),

    #[error("Failed to close port: {0}")]
    Close(#[source] io::Error),
}

/// A device the session can configure, talk to and close
pub trait SensorPort: TerminalControl + SerialIo {
    /// Release the device
    fn close(self) -> io::Result<()>;
}

impl SensorPort for TtyPort {
    fn close(self) -> io::Result<()> {
        TtyPort::close(self)
    }
}

/// Opens devices for a session
pub trait PortOpener {
    /// Port type produced
    type Port: SensorPort;

    /// Open the device at `path`
    fn open(&mut self, path: &Path) -> io::Result<Self::Port>;
}

/// Opens real tty devices
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyOpener;

impl PortOpener for TtyOpener {
    type Port = TtyPort;

    fn open(&mut self, path: &Path) -> io::Result<TtyPort> {
        TtyPort::open(path)
    }
}

/// Which half of an attempt fell short
enum Shortfall {
    Write(Option<TransferError>),
    Read(Option<TransferError>),
}

/// Runs sensor commands through a [`PortOpener`]
#[derive(Debug)]
pub struct SensorSession<O: PortOpener = TtyOpener> {
    opener: O,
    state: SessionState,
}

impl SensorSession<TtyOpener> {
    /// Session on real tty devices
    pub fn new() -> Self {
        Self::with_opener(TtyOpener)
    }
}

impl Default for SensorSession<TtyOpener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: PortOpener> SensorSession<O> {
    /// Session using a custom opener
    pub fn with_opener(opener: O) -> Self {
        Self {
            opener,
            state: SessionState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("session: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Execute `opts.command`; on a successful read the concentration is
    /// stored in `opts.gas_concentration`
    pub fn process_command(&mut self, opts: &mut SessionOptions) -> Result<(), SessionError> {
        self.state = SessionState::Idle;
        let result = self.run(opts);
        if let Err(e) = &result {
            tracing::debug!("command failed: {}", e);
            self.transition(SessionState::Failed);
        }
        result
    }

    fn run(&mut self, opts: &mut SessionOptions) -> Result<(), SessionError> {
        let path = opts.serial.device.clone();
        let mut port = self
            .opener
            .open(&path)
            .map_err(|source| SessionError::Open { path, source })?;
        self.transition(SessionState::PortOpened);

        let exchanged = self.exchange(&mut port, opts);
        let closed = port.close();

        match (exchanged, closed) {
            (Ok(concentration), Ok(())) => {
                if let Some(value) = concentration {
                    opts.gas_concentration = Some(value);
                }
                self.transition(SessionState::Done);
                Ok(())
            }
            (Ok(_), Err(e)) => Err(SessionError::Close(e)),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!("also failed to close port: {}", close_err);
                Err(e)
            }
        }
    }

    fn exchange(
        &mut self,
        port: &mut O::Port,
        opts: &SessionOptions,
    ) -> Result<Option<u16>, SessionError> {
        let config = SerialConfig {
            direction: Direction::Both,
            ..opts.serial.clone()
        };
        configure(port, &config)?;
        self.transition(SessionState::PortConfigured);

        let request = opts.command.request();
        let tries = opts.tries.max(1);
        let mut shortfall = Shortfall::Write(None);

        for attempt in 1..=tries {
            if attempt > 1 {
                // Leftovers of a late reply would shift the next response
                if let Err(e) = port.discard_input() {
                    tracing::warn!(
                        "attempt {}/{}: failed to flush input: {}",
                        attempt,
                        tries,
                        e
                    );
                }
            }
            tracing::debug!("attempt {}/{}: sending {:?}", attempt, tries, request);
            match write_full(port, request.as_bytes(), opts.timeout) {
                Ok(PACKET_LEN) => {}
                Ok(n) => {
                    tracing::warn!(
                        "attempt {}/{}: short write ({} of {} bytes)",
                        attempt,
                        tries,
                        n,
                        PACKET_LEN
                    );
                    shortfall = Shortfall::Write(None);
                    continue;
                }
                Err(e @ TransferError::DeadlineExceeded(_)) => {
                    tracing::warn!("attempt {}/{}: {}", attempt, tries, e);
                    shortfall = Shortfall::Write(Some(e));
                    continue;
                }
                Err(e) => {
                    return Err(SessionError::Write {
                        attempts: attempt,
                        source: Some(e),
                    })
                }
            }
            self.transition(SessionState::RequestSent);

            if !opts.command.expects_response() {
                tracing::info!("{:?} sent, not waiting for a reply", opts.command);
                return Ok(None);
            }

            let mut buf = [0u8; PACKET_LEN];
            match read_full(port, &mut buf, opts.timeout) {
                Ok(PACKET_LEN) => {}
                Ok(n) => {
                    tracing::warn!(
                        "attempt {}/{}: short read ({} of {} bytes)",
                        attempt,
                        tries,
                        n,
                        PACKET_LEN
                    );
                    shortfall = Shortfall::Read(None);
                    continue;
                }
                Err(e @ TransferError::DeadlineExceeded(_)) => {
                    tracing::warn!("attempt {}/{}: {}", attempt, tries, e);
                    shortfall = Shortfall::Read(Some(e));
                    continue;
                }
                Err(e) => {
                    return Err(SessionError::Read {
                        attempts: attempt,
                        source: Some(e),
                    })
                }
            }
            self.transition(SessionState::ResponseReceived);

            let response = Packet::from_bytes(buf);
            tracing::debug!("received {:?}", response);
            let concentration = parse_gas_response(&response)?;
            tracing::info!("gas concentration: {} ppm", concentration);
            return Ok(Some(concentration));
        }

        Err(match shortfall {
            Shortfall::Write(source) => SessionError::Write {
                attempts: tries,
                source,
            },
            Shortfall::Read(source) => SessionError::Read {
                attempts: tries,
                source,
            },
        })
    }
}

/// Run `opts.command` against the real device named in `opts`
pub fn process_command(opts: &mut SessionOptions) -> Result<(), SessionError> {
    SensorSession::new().process_command(opts)
}
