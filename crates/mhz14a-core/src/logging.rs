//! Log verbosity configuration
//!
//! The library itself only emits `tracing` events. Binaries turn a
//! [`LogLevel`] into a subscriber filter at startup.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Verbosity of diagnostic output, from least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Errors only
    #[default]
    Error,
    /// Errors and warnings
    Warning,
    /// Progress information
    Info,
    /// Packet dumps and state transitions
    Debug,
}

/// Unknown log level name or number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown log level: {0}")]
pub struct UnknownLogLevel(pub String);

impl LogLevel {
    /// All levels in numeric order
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    /// Upper-case name as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Matching `tracing` filter
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    /// Accepts a number (`0` = ERROR .. `3` = DEBUG) or a level name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            return s
                .parse::<usize>()
                .ok()
                .and_then(|n| Self::ALL.get(n).copied())
                .ok_or_else(|| UnknownLogLevel(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLogLevel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_levels() {
        assert_eq!("0".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert_eq!("3".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("4".parse::<LogLevel>().is_err());
        assert!("1x".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_named_levels() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!("".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_default_is_error() {
        assert_eq!(LogLevel::default(), LogLevel::Error);
        assert_eq!(LogLevel::default().as_level_filter(), LevelFilter::ERROR);
    }
}
