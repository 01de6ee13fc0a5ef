//! Our error types for the Keithley 2231A driver.

use thiserror::Error;

use crate::{commands::ScpiCommand, types::Parameter};

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for Keithley 2231A communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    /// The interface could not be opened.
    #[error("Failed to open interface")]
    OpenFailed(I),
    /// An exchange of the connect handshake failed, so no handle was established.
    #[error("Connect handshake failed at {0:?}: {1}")]
    HandshakeFailed(ScpiCommand, HandshakeFault<I>),
    /// The `*IDN?` reply did not name the expected instrument.
    #[error("Connected instrument did not identify as expected")]
    UnexpectedIdentity,
    #[error("Invalid channel number: {0}")]
    InvalidChannel(u8),
    #[error("Invalid {0} value: {1}")]
    InvalidRange(Parameter, f64),
    /// Display text would break the command framing.
    #[error("Display text contains a quote or line terminator")]
    InvalidText,
    #[error("Serial communication error")]
    SerialError(I),
    #[error("Communication timeout")]
    Timeout,
    #[error("Invalid response received")]
    InvalidResponse,
    #[error("Command or reply does not fit the line buffer")]
    BufferError,
}

impl<I: embedded_io::Error> Error<I> {
    /// The handle could not be established. Fatal for `connect`/`open`.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Error::OpenFailed(_) | Error::HandshakeFailed(..) | Error::UnexpectedIdentity
        )
    }

    /// A caller supplied value was rejected before any I/O happened.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidChannel(_) | Error::InvalidRange(..) | Error::InvalidText
        )
    }

    /// The exchange with the instrument failed or returned something unexpected.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Error::SerialError(_) | Error::Timeout | Error::InvalidResponse | Error::BufferError
        )
    }

    /// Reclassify an exchange failure during the connect handshake as a connection error.
    pub(crate) fn during_handshake(self, step: ScpiCommand) -> Self {
        let fault = match self {
            Error::SerialError(err) => HandshakeFault::SerialError(err),
            Error::Timeout => HandshakeFault::Timeout,
            Error::InvalidResponse => HandshakeFault::InvalidResponse,
            Error::BufferError => HandshakeFault::BufferError,
            other => return other,
        };
        Error::HandshakeFailed(step, fault)
    }

    /// Map an interface error, keeping timeouts distinct.
    pub(crate) fn from_interface(err: I) -> Self {
        match err.kind() {
            embedded_io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::SerialError(err),
        }
    }
}

/// What went wrong in a failed handshake exchange.
#[derive(Error, Debug)]
pub enum HandshakeFault<I: embedded_io::Error> {
    #[error("serial communication error")]
    SerialError(I),
    #[error("no reply")]
    Timeout,
    #[error("invalid response")]
    InvalidResponse,
    #[error("reply does not fit the line buffer")]
    BufferError,
}

impl<I: embedded_io::Error> From<core::fmt::Error> for Error<I> {
    // `core::fmt::Write` on a heapless string only fails when capacity runs out.
    fn from(_: core::fmt::Error) -> Self {
        Error::BufferError
    }
}
