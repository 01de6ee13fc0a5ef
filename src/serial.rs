//! Opening a 2231A on a named serial port with the `serialport` crate.
//!
//! Only available with the `serialport` feature.

use serialport::{DataBits, Parity, SerialPort, StopBits};

use crate::{
    config::{DriverConfig, LinkSettings},
    error::{Error, Result},
    psu::Keithley2231A,
};

/// Long enough to behave as "wait forever" when no read timeout is configured.
const UNBOUNDED_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60 * 60 * 24 * 365);

/// Adapts a [SerialPort] to [embedded_io].
pub struct SerialInterface(Box<dyn SerialPort>);

/// A [std::io::Error] carrying an [embedded_io::ErrorKind].
#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_io::ErrorKind as K;
        use std::io::ErrorKind as Io;
        match self.0.kind() {
            Io::NotFound => K::NotFound,
            Io::PermissionDenied => K::PermissionDenied,
            Io::BrokenPipe => K::BrokenPipe,
            Io::InvalidInput => K::InvalidInput,
            Io::InvalidData => K::InvalidData,
            Io::TimedOut | Io::WouldBlock => K::TimedOut,
            Io::Interrupted => K::Interrupted,
            Io::Unsupported => K::Unsupported,
            Io::OutOfMemory => K::OutOfMemory,
            _ => K::Other,
        }
    }
}

impl embedded_io::ErrorType for SerialInterface {
    type Error = IoError;
}

impl embedded_io::Read for SerialInterface {
    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for SerialInterface {
    fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> core::result::Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

impl SerialInterface {
    /// Open `port_name` with the given link settings.
    ///
    /// Without a timeout, reads block for as long as the instrument takes to answer.
    pub fn open(
        port_name: &str,
        link: &LinkSettings,
        timeout: Option<std::time::Duration>,
    ) -> core::result::Result<Self, serialport::Error> {
        let (data_bits, stop_bits) = framing(link)?;
        let port = serialport::new(port_name, link.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(Parity::None)
            .timeout(timeout.unwrap_or(UNBOUNDED_TIMEOUT))
            .open()?;
        Ok(Self(port))
    }
}

/// Map the link's character framing onto [serialport] settings.
fn framing(link: &LinkSettings) -> core::result::Result<(DataBits, StopBits), serialport::Error> {
    let data_bits = match link.data_bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        8 => DataBits::Eight,
        _ => {
            return Err(serialport::Error::new(
                serialport::ErrorKind::InvalidInput,
                "unsupported number of data bits",
            ));
        }
    };
    let stop_bits = match link.stop_bits {
        1 => StopBits::One,
        2 => StopBits::Two,
        _ => {
            return Err(serialport::Error::new(
                serialport::ErrorKind::InvalidInput,
                "unsupported number of stop bits",
            ));
        }
    };
    Ok((data_bits, stop_bits))
}

impl<const L: usize> Keithley2231A<SerialInterface, L> {
    /// Open the serial port at `port_name` and run the [connect](Self::connect) handshake.
    pub fn open(port_name: &str, config: DriverConfig) -> Result<Self, IoError> {
        let timeout = config
            .read_timeout
            .map(|t| std::time::Duration::from_millis(t.to_millis() as u64));
        let interface =
            SerialInterface::open(port_name, &config.link, timeout).map_err(|err| {
                tracing::error!(parent: &config.span, port = port_name, %err, "failed to open serial port");
                Error::OpenFailed(IoError(err.into()))
            })?;
        tracing::info!(parent: &config.span, port = port_name, baud = config.link.baud_rate, "serial port open");
        Self::connect(interface, config)
    }
}
