//! Command-line parsing
//!
//! Options mirror the classic getopt interface of the tool: short flags take
//! their value either attached (`-b9600`) or as the next argument, long flags
//! either as `--baud=9600` or `--baud 9600`.

use std::path::PathBuf;
use std::time::Duration;

use mhz14a_core::logging::{LogLevel, UnknownLogLevel};
use mhz14a_core::serial::{SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_DEVICE};
use mhz14a_core::session::{SensorCommand, SessionOptions, DEFAULT_TRIES};
use thiserror::Error;

/// Default per-attempt timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 1;

/// Argument errors, each with its own exit code
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgsError {
    #[error("no command given (use --read, --zero or --span)")]
    NoCommand,

    #[error("only one of --read, --zero and --span may be given")]
    DuplicateCommand,

    #[error("invalid mode '{0}' (expected e.g. 8N1)")]
    InvalidMode(String),

    #[error("invalid value '{value}' for {option}")]
    InvalidValue { option: String, value: String },

    #[error("option {0} requires a value")]
    MissingValue(String),

    #[error("unknown option {0}")]
    UnknownOption(String),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error(transparent)]
    LogLevel(#[from] UnknownLogLevel),
}

impl ArgsError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            ArgsError::NoCommand => 1,
            ArgsError::DuplicateCommand => 2,
            ArgsError::InvalidMode(_) => 3,
            ArgsError::InvalidValue { .. }
            | ArgsError::MissingValue(_)
            | ArgsError::UnknownOption(_)
            | ArgsError::LogLevel(_) => 4,
            ArgsError::UnexpectedArgument(_) => 5,
        }
    }
}

/// A sensor command ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub options: SessionOptions,
    pub log_level: LogLevel,
    pub json: bool,
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(RunConfig),
    ListPorts(LogLevel),
    Version,
    Help,
}

/// Usage text for `--help`
pub fn usage() -> String {
    format!(
        "Usage: mhz14a [OPTIONS] (-r | -z | -s SPAN)

Commands:
  -r, --read             Read gas concentration (ppm)
  -z, --zero             Calibrate zero point
  -s, --span SPAN        Calibrate span point to SPAN ppm

Options:
  -d, --dev FILE         Serial device (default: {device})
  -b, --baud RATE        Baud rate (default: {baud})
  -m, --mode MODE        Data bits, parity and stop bits (default: 8N1)
  -t, --tries N          Send/receive attempts (default: {tries})
  -T, --timeout SECS     Per-attempt timeout, 0 waits forever (default: {timeout})
  -l, --log-level LEVEL  ERROR, WARNING, INFO, DEBUG or 0-3 (default: ERROR)
  -j, --json             Print the result as JSON
  -L, --list             List serial ports and exit
  -v, --version          Print version and exit
  -h, --help             Print this help and exit
",
        device = DEFAULT_DEVICE,
        baud = DEFAULT_BAUD_RATE,
        tries = DEFAULT_TRIES,
        timeout = DEFAULT_TIMEOUT_SECS,
    )
}

/// Line mode such as `8N1`: data bits, parity, stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub data_bits: u8,
    pub parity: char,
    /// Stop bits x 10
    pub stop_bits: u8,
}

impl Mode {
    /// Check the shape only; value ranges are validated when the port is
    /// configured
    pub fn parse(s: &str) -> Result<Self, ArgsError> {
        let chars: Vec<char> = s.chars().collect();
        match chars.as_slice() {
            [data, parity, stop]
                if data.is_ascii_digit() && parity.is_ascii_alphabetic() && stop.is_ascii_digit() =>
            {
                Ok(Self {
                    data_bits: *data as u8 - b'0',
                    parity: *parity,
                    stop_bits: (*stop as u8 - b'0') * 10,
                })
            }
            _ => Err(ArgsError::InvalidMode(s.to_string())),
        }
    }
}

/// Split `--name=value` and `-xVALUE` into flag and attached value
fn split_flag(arg: &str) -> (&str, Option<&str>) {
    if let Some(long) = arg.strip_prefix("--") {
        if let Some((name, value)) = long.split_once('=') {
            return (&arg[..name.len() + 2], Some(value));
        }
        return (arg, None);
    }
    if arg.starts_with('-') && arg.len() > 2 && arg.is_char_boundary(2) {
        return (&arg[..2], Some(&arg[2..]));
    }
    (arg, None)
}

fn parse_number<T: std::str::FromStr>(option: &str, value: &str) -> Result<T, ArgsError> {
    value.parse().map_err(|_| ArgsError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
    })
}

fn set_command(slot: &mut Option<SensorCommand>, command: SensorCommand) -> Result<(), ArgsError> {
    if slot.replace(command).is_some() {
        return Err(ArgsError::DuplicateCommand);
    }
    Ok(())
}

/// Parse arguments (without the program name)
pub fn parse<I>(args: I) -> Result<Invocation, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();

    let mut device = PathBuf::from(DEFAULT_DEVICE);
    let mut baud_rate = DEFAULT_BAUD_RATE;
    let mut mode = Mode {
        data_bits: 8,
        parity: 'N',
        stop_bits: 10,
    };
    let mut command = None;
    let mut tries = DEFAULT_TRIES;
    let mut timeout_secs = DEFAULT_TIMEOUT_SECS;
    let mut log_level = LogLevel::default();
    let mut json = false;
    let mut list = false;

    while let Some(arg) = iter.next() {
        let (flag, inline) = split_flag(&arg);
        let flag = flag.to_string();
        let inline = inline.map(str::to_string);

        let mut value = || -> Result<String, ArgsError> {
            match inline.clone() {
                Some(v) => Ok(v),
                None => iter
                    .next()
                    .ok_or_else(|| ArgsError::MissingValue(flag.clone())),
            }
        };

        match flag.as_str() {
            "-d" | "--dev" => device = PathBuf::from(value()?),
            "-b" | "--baud" => baud_rate = parse_number(&flag, &value()?)?,
            "-m" | "--mode" => mode = Mode::parse(&value()?)?,
            "-s" | "--span" => {
                let span = parse_number(&flag, &value()?)?;
                set_command(&mut command, SensorCommand::CalibrateSpan(span))?;
            }
            "-t" | "--tries" => tries = parse_number(&flag, &value()?)?,
            "-T" | "--timeout" => timeout_secs = parse_number(&flag, &value()?)?,
            "-l" | "--log-level" => log_level = value()?.parse()?,
            _ if inline.is_some() && flag.starts_with("--") => {
                return Err(ArgsError::InvalidValue {
                    option: flag.clone(),
                    value: inline.clone().unwrap_or_default(),
                })
            }
            _ if inline.is_some() => return Err(ArgsError::UnknownOption(arg.clone())),
            "-r" | "--read" => set_command(&mut command, SensorCommand::ReadGasConcentration)?,
            "-z" | "--zero" => set_command(&mut command, SensorCommand::CalibrateZero)?,
            "-j" | "--json" => json = true,
            "-L" | "--list" => list = true,
            "-v" | "--version" => return Ok(Invocation::Version),
            "-h" | "--help" => return Ok(Invocation::Help),
            s if s.starts_with('-') && s.len() > 1 => {
                return Err(ArgsError::UnknownOption(s.to_string()))
            }
            _ => return Err(ArgsError::UnexpectedArgument(arg.clone())),
        }
    }

    if list {
        return Ok(Invocation::ListPorts(log_level));
    }

    let command = command.ok_or(ArgsError::NoCommand)?;
    let timeout = (timeout_secs != 0).then(|| Duration::from_secs(timeout_secs));

    Ok(Invocation::Run(RunConfig {
        options: SessionOptions {
            serial: SerialConfig {
                device,
                baud_rate,
                data_bits: mode.data_bits,
                parity: Some(mode.parity),
                stop_bits: mode.stop_bits,
                ..SerialConfig::default()
            },
            command,
            tries,
            timeout,
            gas_concentration: None,
        },
        log_level,
        json,
    }))
}
