//! Full-buffer transfers over a non-blocking descriptor
//!
//! [`perform_transfer`] keeps reading or writing until the whole buffer has
//! moved. With a timeout every attempt first waits for readiness; the wait is
//! per attempt, not cumulative.

use std::io::{self, ErrorKind};
use std::time::Duration;

use thiserror::Error;

/// Readiness a transfer waits for before touching the descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Data available to read
    Readable,
    /// Room to write
    Writable,
}

/// Raw, possibly partial, I/O on a serial descriptor
pub trait SerialIo {
    /// Wait until the descriptor is ready, `None` waits forever.
    /// Returns `false` if the timeout expired first.
    fn wait_ready(&mut self, readiness: Readiness, timeout: Option<Duration>) -> io::Result<bool>;

    /// One `read(2)` call
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// One `write(2)` call
    fn write_some(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// The buffer to move and which way it goes
#[derive(Debug)]
pub enum Operation<'a> {
    /// Fill the buffer from the descriptor
    Read(&'a mut [u8]),
    /// Send the buffer to the descriptor
    Write(&'a [u8]),
}

impl Operation<'_> {
    fn len(&self) -> usize {
        match self {
            Operation::Read(buf) => buf.len(),
            Operation::Write(buf) => buf.len(),
        }
    }

    fn readiness(&self) -> Readiness {
        match self {
            Operation::Read(_) => Readiness::Readable,
            Operation::Write(_) => Readiness::Writable,
        }
    }

    fn step<I: SerialIo + ?Sized>(&mut self, io: &mut I, offset: usize) -> io::Result<usize> {
        match self {
            Operation::Read(buf) => io.read_some(&mut buf[offset..]),
            Operation::Write(buf) => io.write_some(&buf[offset..]),
        }
    }
}

/// Errors from [`perform_transfer`]
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Device not ready within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Readiness check failed: {0}")]
    Poll(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn wait<I: SerialIo + ?Sized>(
    io: &mut I,
    readiness: Readiness,
    timeout: Option<Duration>,
) -> Result<bool, TransferError> {
    loop {
        match io.wait_ready(readiness, timeout) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::Poll(e)),
            Ok(ready) => return Ok(ready),
        }
    }
}

/// Move the whole buffer of `op`, returning the number of bytes transferred
///
/// A result shorter than the buffer means the descriptor stopped making
/// progress (end of file or a zero-length write). "Would block" and
/// "interrupted" results are retried; any other error aborts.
pub fn perform_transfer<I: SerialIo + ?Sized>(
    io: &mut I,
    mut op: Operation<'_>,
    timeout: Option<Duration>,
) -> Result<usize, TransferError> {
    let len = op.len();
    let readiness = op.readiness();
    let mut done = 0;

    while done < len {
        if let Some(limit) = timeout {
            if !wait(io, readiness, Some(limit))? {
                tracing::debug!(
                    "transfer: not {:?} within {:?} ({} of {} bytes)",
                    readiness,
                    limit,
                    done,
                    len
                );
                return Err(TransferError::DeadlineExceeded(limit));
            }
        }

        match op.step(io, done) {
            Ok(0) => {
                tracing::debug!("transfer: no progress after {} of {} bytes", done, len);
                break;
            }
            Ok(n) => done += n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                if timeout.is_none() {
                    wait(io, readiness, None)?;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                tracing::debug!("transfer: error after {} of {} bytes: {}", done, len, e);
                return Err(TransferError::Io(e));
            }
        }
    }

    Ok(done)
}

/// Read until `buf` is full
pub fn read_full<I: SerialIo + ?Sized>(
    io: &mut I,
    buf: &mut [u8],
    timeout: Option<Duration>,
) -> Result<usize, TransferError> {
    perform_transfer(io, Operation::Read(buf), timeout)
}

/// Write all of `buf`
pub fn write_full<I: SerialIo + ?Sized>(
    io: &mut I,
    buf: &[u8],
    timeout: Option<Duration>,
) -> Result<usize, TransferError> {
    perform_transfer(io, Operation::Write(buf), timeout)
}
