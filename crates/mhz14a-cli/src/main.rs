//! mhz14a: read and calibrate MH-Z14A CO2 sensors over a serial port

mod args;
mod output;

use std::process::ExitCode;

use mhz14a_core::logging::LogLevel;
use mhz14a_core::serial::list_ports;
use mhz14a_core::session::{process_command, SessionError};
use tracing_subscriber::EnvFilter;

use args::{Invocation, RunConfig};
use output::Report;

/// Install the stderr subscriber; `RUST_LOG` overrides `level`
fn init_logging(level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.as_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Exit code for each session failure class
fn session_exit_code(err: &SessionError) -> u8 {
    match err {
        SessionError::Open { .. } => 10,
        SessionError::Configure(_) => 11,
        SessionError::Write { .. } => 12,
        SessionError::Read { .. } => 13,
        SessionError::Protocol(_) => 14,
        // Only reachable through `SensorCommand::from_code`
        SessionError::UnsupportedCommand(_) => 15,
        SessionError::Close(_) => 16,
    }
}

fn run(mut config: RunConfig) -> ExitCode {
    if let Err(e) = process_command(&mut config.options) {
        eprintln!("Error: {}", e);
        return ExitCode::from(session_exit_code(&e));
    }

    let report = Report::from_options(&config.options);
    if config.json {
        match serde_json::to_string(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to encode result: {}", e);
                return ExitCode::from(255);
            }
        }
    } else {
        println!("{}", report.to_text());
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let invocation = match args::parse(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Try 'mhz14a --help' for more information.");
            return ExitCode::from(e.exit_code());
        }
    };

    match invocation {
        Invocation::Help => {
            print!("{}", args::usage());
            ExitCode::SUCCESS
        }
        Invocation::Version => {
            println!("mhz14a version {}", mhz14a_core::VERSION);
            ExitCode::SUCCESS
        }
        Invocation::ListPorts(level) => {
            init_logging(level);
            for port in list_ports() {
                match port.product {
                    Some(product) => println!("{}\t{}", port.name, product),
                    None => println!("{}", port.name),
                }
            }
            ExitCode::SUCCESS
        }
        Invocation::Run(config) => {
            init_logging(config.log_level);
            tracing::debug!("running {:?}", config.options);
            run(config)
        }
    }
}
