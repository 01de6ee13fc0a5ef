//! Driver and link configuration.

#[cfg(feature = "serialport")]
use fugit::MillisDurationU32;

/// Identity substring a genuine 2231A reports in its `*IDN?` reply.
pub const EXPECTED_IDENTITY: &str = "Keithley instruments, 2231A-30-3";

/// Fixed serial link parameters of the 2231A.
///
/// These are not configurable on the instrument side for the serial interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub write_termination: &'static str,
    pub read_termination: &'static str,
    /// Flush after each line.
    pub send_end: bool,
}

impl LinkSettings {
    pub const KEITHLEY_2231A: LinkSettings = LinkSettings {
        baud_rate: 9600,
        data_bits: 8,
        stop_bits: 1,
        write_termination: "\n",
        read_termination: "\n",
        send_end: true,
    };
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self::KEITHLEY_2231A
    }
}

/// How [`display_text`](crate::psu::Keithley2231A::display_text) treats text that
/// contains the quote delimiter or a line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPolicy {
    /// Refuse the text with [`Error::InvalidText`](crate::error::Error::InvalidText).
    #[default]
    Reject,
    /// Embed the text as is. A quote in the text produces a malformed command.
    Verbatim,
}

/// Use this type to configure how a [`Keithley2231A`](crate::psu::Keithley2231A) connects and behaves.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Substring the `*IDN?` reply must contain.
    pub expected_identity: &'static str,
    /// Fail the connection when the identity does not match, rather than only warning.
    pub strict_identity: bool,
    /// Send `*RST` at the end of the connect handshake.
    pub reset_on_connect: bool,
    pub text_policy: TextPolicy,
    pub link: LinkSettings,
    /// Bound on each blocking read. `None` waits forever.
    #[cfg(feature = "serialport")]
    pub read_timeout: Option<MillisDurationU32>,
    /// Span every driver event is recorded under.
    pub span: tracing::Span,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            expected_identity: EXPECTED_IDENTITY,
            strict_identity: true,
            reset_on_connect: true,
            text_policy: TextPolicy::default(),
            link: LinkSettings::default(),
            #[cfg(feature = "serialport")]
            read_timeout: None,
            span: tracing::info_span!("keithley_2231a"),
        }
    }
}

impl DriverConfig {
    /// Set the identity substring to look for.
    pub fn with_expected_identity(mut self, identity: &'static str) -> Self {
        self.expected_identity = identity;
        self
    }

    /// Set whether an identity mismatch aborts the connection.
    pub fn with_strict_identity(mut self, strict: bool) -> Self {
        self.strict_identity = strict;
        self
    }

    /// Set whether the instrument is reset after connecting.
    pub fn with_reset_on_connect(mut self, reset: bool) -> Self {
        self.reset_on_connect = reset;
        self
    }

    pub fn with_text_policy(mut self, policy: TextPolicy) -> Self {
        self.text_policy = policy;
        self
    }

    /// Override the line terminators and end-of-message flushing.
    pub fn with_link(mut self, link: LinkSettings) -> Self {
        self.link = link;
        self
    }

    /// Bound each blocking read on the serial port.
    #[cfg(feature = "serialport")]
    pub fn with_read_timeout(mut self, timeout: MillisDurationU32) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Record driver events under the given span instead of the default one.
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }
}
