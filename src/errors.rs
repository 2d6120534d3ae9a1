//! Utilities dealing with error handling in this crate.

use failure::Fail;

/// Errors produced by this crate.
#[derive(Debug, Fail)]
pub enum Error {
    /// Errors originating from calls to `libc` or other system utilties.
    #[fail(display = "System Error - {}", _0)]
    System(#[cause] nix::Error),
    /// Caused when the hardware or a driver path does not support fixed counters.
    ///
    /// This is a status, not a fault: callers are expected to continue without
    /// the optional path that reported it.
    #[fail(display = "Fixed performance counters not supported")]
    NotSupported,
}

impl Error {
    /// Create a new instance of error from the `errno` variable.
    #[inline]
    pub fn from_errno() -> Self {
        Error::System(nix::Error::Sys(nix::errno::Errno::last()))
    }
}

impl From<nix::Error> for Error {
    #[inline]
    fn from(err: nix::Error) -> Self {
        Error::System(err)
    }
}

/// Result type used in this crate.
pub type Result<T> = std::result::Result<T, Error>;
