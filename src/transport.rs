//! Line framing on top of a byte interface.
//!
//! The 2231A speaks one text line per command and one text line per reply. This
//! module turns any [embedded_io::Read] + [embedded_io::Write] interface into
//! that line channel.

use embedded_io::Error as _;
use heapless::{String, Vec};

use crate::error::{Error, Result};

/// A line oriented channel to the instrument.
///
/// `L` is the capacity of the reply buffer in bytes, including the read terminator.
pub struct LineTransport<S: embedded_io::Read + embedded_io::Write, const L: usize = 128> {
    interface: S,
    /// Appended to every written line.
    write_termination: &'static str,
    /// Marks the end of a reply.
    read_termination: &'static str,
    /// Flush the interface after each line.
    send_end: bool,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> LineTransport<S, L> {
    /// Create a transport using `\n` in both directions with end-of-message flushing.
    pub fn new(interface: S) -> Self {
        Self {
            interface,
            write_termination: "\n",
            read_termination: "\n",
            send_end: true,
        }
    }

    /// Set the terminators used for writing and reading lines.
    ///
    /// An empty read terminator is ignored, since a reply could then never end.
    pub fn with_terminators(mut self, write: &'static str, read: &'static str) -> Self {
        self.write_termination = write;
        if !read.is_empty() {
            self.read_termination = read;
        }
        self
    }

    /// Set whether the interface is flushed after each line.
    pub fn with_send_end(mut self, send_end: bool) -> Self {
        self.send_end = send_end;
        self
    }

    /// Send a line. No reply is expected.
    pub fn write_line(&mut self, line: &str) -> Result<(), S::Error> {
        self.interface
            .write_all(line.as_bytes())
            .map_err(Error::from_interface)?;
        self.interface
            .write_all(self.write_termination.as_bytes())
            .map_err(Error::from_interface)?;
        if self.send_end {
            self.interface.flush().map_err(Error::from_interface)?;
        }
        Ok(())
    }

    /// Send a line and block until exactly one reply line arrives.
    ///
    /// The reply is returned without its terminator.
    pub fn query_line(&mut self, line: &str) -> Result<String<L>, S::Error> {
        self.write_line(line)?;
        self.read_line()
    }

    /// Read bytes until the read terminator has been seen.
    pub fn read_line(&mut self) -> Result<String<L>, S::Error> {
        let terminator = self.read_termination.as_bytes();
        let mut buff: Vec<u8, L> = Vec::new();

        // One byte at a time, so nothing past the terminator is consumed.
        let mut byte = [0u8; 1];
        while !buff.ends_with(terminator) {
            match self.interface.read(&mut byte) {
                // End of stream before the reply was complete.
                Ok(0) => return Err(Error::InvalidResponse),
                Ok(_) => buff.push(byte[0]).map_err(|_| Error::BufferError)?,
                Err(e) if matches!(e.kind(), embedded_io::ErrorKind::Interrupted) => continue,
                Err(e) => return Err(Error::from_interface(e)),
            }
        }
        buff.truncate(buff.len() - terminator.len());

        String::from_utf8(buff).map_err(|_| Error::InvalidResponse)
    }

    /// Borrow the underlying interface.
    pub fn interface(&self) -> &S {
        &self.interface
    }

    /// Give back the underlying interface.
    pub fn release(self) -> S {
        self.interface
    }
}
