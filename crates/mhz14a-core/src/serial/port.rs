//! tty descriptor ownership
//!
//! [`TtyPort`] owns the open device and exposes it through the two seams the
//! rest of the crate is written against: [`TerminalControl`] for termios
//! access and [`SerialIo`] for readiness polling and raw transfers.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::mem::MaybeUninit;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transfer::{Readiness, SerialIo};

/// Read and write access to a terminal's attribute structure
pub trait TerminalControl {
    /// Fetch the current attributes (`tcgetattr`)
    fn attributes(&self) -> io::Result<libc::termios>;

    /// Replace the attributes immediately (`tcsetattr` with `TCSANOW`)
    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()>;

    /// Drop received bytes that have not been read yet (`tcflush` with
    /// `TCIFLUSH`)
    fn discard_input(&mut self) -> io::Result<()>;
}

/// An open serial character device
#[derive(Debug)]
pub struct TtyPort {
    file: File,
    path: PathBuf,
}

impl TtyPort {
    /// Open `path` for reading and writing, non-blocking, without making it
    /// the controlling terminal
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK | libc::O_NOCTTY)
            .open(path)?;
        tracing::debug!("opened {} (fd {})", path.display(), file.as_raw_fd());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Device path this port was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the descriptor, reporting the result of `close(2)`
    pub fn close(self) -> io::Result<()> {
        let fd = self.file.into_raw_fd();
        // SAFETY: `fd` was just released from the owning `File`, so this is
        // the only close it will ever see.
        if unsafe { libc::close(fd) } != 0 {
            return Err(io::Error::last_os_error());
        }
        tracing::debug!("closed {} (fd {})", self.path.display(), fd);
        Ok(())
    }
}

impl AsRawFd for TtyPort {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl TerminalControl for TtyPort {
    fn attributes(&self) -> io::Result<libc::termios> {
        let mut attrs = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: tcgetattr fully initializes the structure when it returns 0.
        if unsafe { libc::tcgetattr(self.as_raw_fd(), attrs.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(unsafe { attrs.assume_init() })
    }

    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()> {
        // SAFETY: `attrs` points to a valid termios for the duration of the call.
        if unsafe { libc::tcsetattr(self.as_raw_fd(), libc::TCSANOW, attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn discard_input(&mut self) -> io::Result<()> {
        // SAFETY: plain fd call, no pointers involved.
        if unsafe { libc::tcflush(self.as_raw_fd(), libc::TCIFLUSH) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Milliseconds for `poll(2)`, rounded up so a non-zero timeout never
/// becomes an immediate return
fn poll_timeout_ms(timeout: Duration) -> libc::c_int {
    timeout
        .as_nanos()
        .div_ceil(1_000_000)
        .min(libc::c_int::MAX as u128) as libc::c_int
}

impl SerialIo for TtyPort {
    fn wait_ready(&mut self, readiness: Readiness, timeout: Option<Duration>) -> io::Result<bool> {
        let events = match readiness {
            Readiness::Readable => libc::POLLIN,
            Readiness::Writable => libc::POLLOUT,
        };
        let mut pfd = libc::pollfd {
            fd: self.as_raw_fd(),
            events,
            revents: 0,
        };
        let timeout_ms = match timeout {
            Some(t) => poll_timeout_ms(t),
            None => -1,
        };
        // SAFETY: a single valid pollfd is passed with nfds = 1.
        match unsafe { libc::poll(&mut pfd, 1, timeout_ms) } {
            -1 => Err(io::Error::last_os_error()),
            0 => Ok(false),
            _ => Ok(true),
        }
    }

    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_some(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }
}
