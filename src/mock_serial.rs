//! We use this mocking module in unit tests to emulate a 2231A on the end of a serial port.
//!
//! Every complete line written is recorded. Lines carrying a query get a reply
//! queued the way the instrument would answer them.

use std::{
    collections::VecDeque,
    string::{String, ToString},
    vec::Vec,
};

/// Identity reported by a genuine 2231A.
pub const MOCK_IDENTITY: &str = "Keithley instruments, 2231A-30-3, 802437010727420017, 1.05-1.04";
/// Calibration date reported by the mock.
pub const MOCK_CALIBRATION_DATE: &str = "2021-11-04";

/// Our mock type used to emulate the instrument.
pub struct MockSerial {
    /// Every byte written to the mock serial port.
    write_buffer: Vec<u8>,
    /// Bytes of the line currently being written.
    pending_line: Vec<u8>,
    /// Complete lines received, terminator stripped.
    lines: Vec<String>,
    /// Reply bytes waiting to be read.
    read_buffer: VecDeque<u8>,
    terminator: &'static str,
    identity: String,
    /// Replaces every generated reply when set.
    reply_override: Option<String>,
    flushes: usize,
    /// Never answer, reads time out.
    silent: bool,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// Simulated timeout error
    Timeout,
    /// Generic simulated error for testing
    SimulatedError,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::Timeout => embedded_io::ErrorKind::TimedOut,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }

        self.write_buffer.extend_from_slice(buf);
        for &byte in buf {
            self.pending_line.push(byte);
            if self.pending_line.ends_with(self.terminator.as_bytes()) {
                let len = self.pending_line.len() - self.terminator.len();
                let line = String::from_utf8_lossy(&self.pending_line[..len]).to_string();
                self.pending_line.clear();
                self.answer(&line);
                self.lines.push(line);
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        self.flushes += 1;
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }

        if self.read_buffer.is_empty() {
            return Err(MockSerialError::Timeout);
        }

        let mut count = 0;
        while count < buf.len() {
            match self.read_buffer.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

impl MockSerial {
    /// Create a new MockSerial which answers like a healthy 2231A.
    pub fn new() -> Self {
        Self {
            write_buffer: Vec::new(),
            pending_line: Vec::new(),
            lines: Vec::new(),
            read_buffer: VecDeque::new(),
            terminator: "\n",
            identity: MOCK_IDENTITY.to_string(),
            reply_override: None,
            flushes: 0,
            silent: false,
            should_error_on_write: false,
            should_error_on_read: false,
        }
    }

    /// Queue the reply for a received line. Only queries are answered.
    fn answer(&mut self, line: &str) {
        if self.silent || !line.contains('?') {
            return;
        }
        let reply = match &self.reply_override {
            Some(reply) => reply.clone(),
            None if line.starts_with("*IDN?") => std::format!("{};1", self.identity),
            None if line.starts_with("CAL:STR?") => std::format!("{};1", MOCK_CALIBRATION_DATE),
            None => "1".to_string(),
        };
        self.read_buffer.extend(reply.as_bytes());
        self.read_buffer.extend(self.terminator.as_bytes());
    }

    /// Get a reference to the data that was written to this mock serial port
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Complete lines written so far, without terminators.
    pub fn written_lines(&self) -> &[String] {
        &self.lines
    }

    /// Forget everything written so far.
    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
        self.lines.clear();
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Line terminator used in both directions.
    pub fn set_terminator(&mut self, terminator: &'static str) {
        self.terminator = terminator;
    }

    /// Identity string returned for `*IDN?`.
    pub fn set_identity(&mut self, identity: &str) {
        self.identity = identity.to_string();
    }

    /// Answer every query with `reply` instead of the normal response.
    pub fn set_reply(&mut self, reply: &str) {
        self.reply_override = Some(reply.to_string());
    }

    /// Queue bytes to be read regardless of what gets written.
    pub fn push_raw_reply(&mut self, data: &[u8]) {
        self.read_buffer.extend(data);
    }

    /// Stop answering queries.
    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    fn read_all(mock: &mut MockSerial) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buffer = [0u8; 16];
        while let Ok(n) = mock.read(&mut buffer) {
            out.extend_from_slice(&buffer[..n]);
        }
        out
    }

    #[test]
    fn test_new_mock_serial() {
        let mock = MockSerial::new();
        assert!(mock.written_data().is_empty());
        assert!(mock.written_lines().is_empty());
        assert_eq!(mock.flush_count(), 0);
    }

    #[test]
    fn test_lines_split_across_writes() {
        let mut mock = MockSerial::new();
        mock.write(b"SYST:").unwrap();
        mock.write(b"BEEP;*OPC?\nOUTP 0").unwrap();

        assert_eq!(mock.written_lines(), ["SYST:BEEP;*OPC?"]);
        assert_eq!(read_all(&mut mock), b"1\n");
    }

    #[test]
    fn test_identity_reply() {
        let mut mock = MockSerial::new();
        mock.set_identity("ACME,PSU");
        mock.write(b"*IDN?;*OPC?\n").unwrap();

        assert_eq!(read_all(&mut mock), b"ACME,PSU;1\n");
    }

    #[test]
    fn test_commands_without_query_get_no_reply() {
        let mut mock = MockSerial::new();
        mock.write(b"SYSTEM:LOCAL\n").unwrap();

        let mut buffer = [0u8; 4];
        assert!(matches!(mock.read(&mut buffer), Err(MockSerialError::Timeout)));
    }

    #[test]
    fn test_silent() {
        let mut mock = MockSerial::new();
        mock.set_silent(true);
        mock.write(b"*RST;*OPC?\n").unwrap();

        let mut buffer = [0u8; 4];
        assert!(matches!(mock.read(&mut buffer), Err(MockSerialError::Timeout)));
    }

    #[test]
    fn test_write_error_simulation() {
        let mut mock = MockSerial::new();
        mock.set_write_error(true);

        assert!(matches!(mock.write(b"test"), Err(MockSerialError::SimulatedError)));
        assert!(matches!(mock.flush(), Err(MockSerialError::SimulatedError)));
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn test_read_error_simulation() {
        let mut mock = MockSerial::new();
        mock.push_raw_reply(b"1\n");
        mock.set_read_error(true);

        let mut buffer = [0u8; 4];
        assert!(matches!(mock.read(&mut buffer), Err(MockSerialError::SimulatedError)));
    }

    #[test]
    fn test_error_kinds() {
        use embedded_io::Error;
        assert!(matches!(MockSerialError::Timeout.kind(), embedded_io::ErrorKind::TimedOut));
        assert!(matches!(MockSerialError::SimulatedError.kind(), embedded_io::ErrorKind::Other));
    }

    #[test]
    fn test_clear_written_data() {
        let mut mock = MockSerial::new();
        mock.write(b"*RST;*OPC?\n").unwrap();
        assert!(!mock.written_data().is_empty());

        mock.clear_written_data();
        assert!(mock.written_data().is_empty());
        assert!(mock.written_lines().is_empty());
    }
}
