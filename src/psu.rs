use core::fmt::{Arguments, Write as _};

use fugit::MillisDurationU32;
use heapless::String;
use tracing::{debug, info, trace, warn};

use crate::{
    commands::{OPC_QUERY, ScpiCommand},
    config::{DriverConfig, TextPolicy},
    error::{Error, Result},
    transport::LineTransport,
    types::{Channel, Parameter, State},
};

/// You can create a Keithley2231A using any interface which implements [embedded_io::Read] & [embedded_io::Write].
///
/// A handle only exists after a successful [Self::connect] handshake, and [Self::close]
/// consumes it. Every operation takes `&mut self`, so only one command is ever in
/// flight per instrument.
///
/// Channel-scoped setters without a channel argument act on whichever channel the
/// instrument has selected. The driver does not track that selection; call
/// [Self::select_channel] first.
///
/// `L` bounds the length of a command line and of a reply, in bytes.
pub struct Keithley2231A<S: embedded_io::Read + embedded_io::Write, const L: usize = 128> {
    transport: LineTransport<S, L>,
    text_policy: TextPolicy,
    span: tracing::Span,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> Keithley2231A<S, L> {
    /// Take control of an instrument on an already opened interface.
    ///
    /// Identifies the instrument, puts it in remote mode, logs the calibration date
    /// and, unless disabled in the config, resets it to factory defaults.
    pub fn connect(interface: S, config: DriverConfig) -> Result<Self, S::Error> {
        let transport = LineTransport::new(interface)
            .with_terminators(config.link.write_termination, config.link.read_termination)
            .with_send_end(config.link.send_end);
        let mut psu = Self {
            transport,
            text_policy: config.text_policy,
            span: config.span,
        };

        let identity = psu
            .identify()
            .map_err(|err| err.during_handshake(ScpiCommand::Identify))?;
        if identity.contains(config.expected_identity) {
            info!(parent: &psu.span, identity = identity.as_str(), "connected");
        } else {
            warn!(
                parent: &psu.span,
                identity = identity.as_str(),
                expected = config.expected_identity,
                "unexpected instrument identity"
            );
            if config.strict_identity {
                return Err(Error::UnexpectedIdentity);
            }
        }

        psu.set_remote()
            .map_err(|err| err.during_handshake(ScpiCommand::Remote))?;
        let calibration_date = psu
            .calibration_date()
            .map_err(|err| err.during_handshake(ScpiCommand::CalibrationDate))?;
        info!(parent: &psu.span, date = calibration_date.as_str(), "last calibrated");

        if config.reset_on_connect {
            psu.reset()
                .map_err(|err| err.during_handshake(ScpiCommand::Reset))?;
        }
        Ok(psu)
    }

    /// Return the instrument to front panel control and give back the interface.
    pub fn close(mut self) -> Result<S, S::Error> {
        self.set_local()?;
        debug!(parent: &self.span, "closed");
        Ok(self.transport.release())
    }

    /// Send `command` with the completion query appended and block until the instrument answers.
    ///
    /// The reply is returned as received, without its terminator. No validation is done here.
    pub fn send_command_synced(&mut self, command: &str) -> Result<String<L>, S::Error> {
        let mut line: String<L> = String::new();
        line.push_str(command).map_err(|_| Error::BufferError)?;
        line.push_str(OPC_QUERY).map_err(|_| Error::BufferError)?;

        debug!(parent: &self.span, command = line.as_str(), "send");
        let reply = self.transport.query_line(&line)?;
        trace!(parent: &self.span, reply = reply.as_str(), "reply");
        Ok(reply)
    }

    /// Return the `*IDN?` identity string.
    pub fn identify(&mut self) -> Result<String<L>, S::Error> {
        self.query(ScpiCommand::Identify)
    }

    /// Return the date of the last calibration.
    pub fn calibration_date(&mut self) -> Result<String<L>, S::Error> {
        self.query(ScpiCommand::CalibrationDate)
    }

    /// Reset the instrument to default values.
    pub fn reset(&mut self) -> Result<(), S::Error> {
        self.execute(ScpiCommand::Reset, None)
    }

    /// Lock the front panel. Only [Self::set_local] unlocks it again.
    pub fn set_remote_lock(&mut self) -> Result<(), S::Error> {
        self.execute(ScpiCommand::RemoteLock, None)
    }

    /// Release the instrument from remote access mode.
    ///
    /// Sent without the completion query: the instrument stops answering on the
    /// serial port as part of this command.
    pub fn set_local(&mut self) -> Result<(), S::Error> {
        let command = ScpiCommand::Local.header();
        debug!(parent: &self.span, command, "send");
        self.transport.write_line(command)
    }

    /// Go into remote access mode.
    pub fn set_remote(&mut self) -> Result<(), S::Error> {
        self.execute(ScpiCommand::Remote, None)
    }

    /// Select the channel (1 to 3) later channel-scoped commands apply to.
    pub fn select_channel(&mut self, channel: u8) -> Result<(), S::Error> {
        let channel = self.check_channel(channel)?;
        self.execute(
            ScpiCommand::SelectChannel,
            Some(format_args!("{}", channel.number())),
        )
    }

    /// Enable/disable the output of the selected channel.
    pub fn set_channel_output_state(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        let state = state.into();
        self.execute(ScpiCommand::ChannelOutput, Some(format_args!("{}", state as u8)))
    }

    /// Enable/disable all outputs, whichever channel is selected.
    pub fn set_all_channels_output_state(
        &mut self,
        state: impl Into<State>,
    ) -> Result<(), S::Error> {
        let state = state.into();
        self.execute(ScpiCommand::AllOutputs, Some(format_args!("{}", state as u8)))
    }

    /// Configure the delay before the selected channel switches off, in seconds.
    ///
    /// Accepts 0.1 to 9999.9 s. The instrument is sent the whole number of seconds,
    /// so 0.1 goes out as `OUTP:TIM:DEL 0`.
    pub fn set_output_timer_delay(&mut self, seconds: f64) -> Result<(), S::Error> {
        let seconds = self.check(Parameter::TimerDelay, seconds)?;
        self.execute(ScpiCommand::TimerDelay, Some(format_args!("{}", seconds as u32)))
    }

    /// Same as [Self::set_output_timer_delay], taking a duration.
    pub fn set_output_timer_delay_duration(
        &mut self,
        delay: MillisDurationU32,
    ) -> Result<(), S::Error> {
        self.set_output_timer_delay(delay.to_millis() as f64 / 1000.0)
    }

    /// Activate or deactivate the turn-off timer of the selected channel.
    pub fn set_output_timer_state(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        let state = state.into();
        self.execute(ScpiCommand::TimerState, Some(format_args!("{}", state as u8)))
    }

    /// Makes noise.
    pub fn send_beep(&mut self) -> Result<(), S::Error> {
        self.execute(ScpiCommand::Beep, None)
    }

    /// Show custom text on the display.
    ///
    /// With [TextPolicy::Reject], text containing `"` or a line break is refused.
    pub fn display_text(&mut self, text: &str) -> Result<(), S::Error> {
        if self.text_policy == TextPolicy::Reject
            && text.contains(|c: char| matches!(c, '"' | '\n' | '\r'))
        {
            warn!(parent: &self.span, text, "display text would break command framing");
            return Err(Error::InvalidText);
        }
        self.execute(ScpiCommand::DisplayText, Some(format_args!("\"{}\"", text)))
    }

    /// Clear the display.
    pub fn clear_text(&mut self) -> Result<(), S::Error> {
        self.execute(ScpiCommand::ClearText, None)
    }

    /// Set voltage (0 to 30 V) and current (0 to 3 A) of a channel (1 to 3) in one command.
    ///
    /// All three values are checked before anything is sent.
    pub fn set_channel_source(
        &mut self,
        channel: u8,
        voltage: f64,
        current: f64,
    ) -> Result<(), S::Error> {
        let channel = self.check_channel(channel)?;
        let voltage = self.check(Parameter::Voltage, voltage)?;
        let current = self.check(Parameter::Current, current)?;
        self.execute(
            ScpiCommand::Apply,
            Some(format_args!("{},{:.6},{:.6}", channel, voltage, current)),
        )
    }

    /// Set the current setpoint (0 to 3 A) of the selected channel.
    pub fn set_current_value(&mut self, current: f64) -> Result<(), S::Error> {
        let current = self.check(Parameter::Current, current)?;
        self.execute(ScpiCommand::Current, Some(format_args!("{:.6}", current)))
    }

    /// Set the voltage setpoint (0 to 30 V) of the selected channel.
    pub fn set_voltage_value(&mut self, voltage: f64) -> Result<(), S::Error> {
        let voltage = self.check(Parameter::Voltage, voltage)?;
        self.execute(ScpiCommand::Voltage, Some(format_args!("{:.6}", voltage)))
    }

    /// Format and send an action command, then require the `1` acknowledgement.
    fn execute(
        &mut self,
        command: ScpiCommand,
        args: Option<Arguments<'_>>,
    ) -> Result<(), S::Error> {
        let mut line: String<L> = String::new();
        line.push_str(command.header()).map_err(|_| Error::BufferError)?;
        if let Some(args) = args {
            write!(line, " {}", args)?;
        }

        let reply = self.send_command_synced(&line)?;
        // A combined message is answered field by field, the completion query last.
        match reply.rsplit(';').next() {
            Some(ack) if ack.trim() == "1" => Ok(()),
            _ => {
                warn!(parent: &self.span, reply = reply.as_str(), "missing completion acknowledgement");
                Err(Error::InvalidResponse)
            }
        }
    }

    /// Send a query and return its answer with the acknowledgement field removed.
    fn query(&mut self, command: ScpiCommand) -> Result<String<L>, S::Error> {
        let reply = self.send_command_synced(command.header())?;
        // Tolerate `\r\n` line endings.
        match reply.trim().strip_suffix(";1") {
            Some(answer) => String::try_from(answer).map_err(|_| Error::BufferError),
            None => {
                warn!(parent: &self.span, reply = reply.as_str(), "missing completion acknowledgement");
                Err(Error::InvalidResponse)
            }
        }
    }

    fn check_channel(&self, channel: u8) -> Result<Channel, S::Error> {
        Channel::try_from(channel).map_err(|channel| {
            warn!(parent: &self.span, channel, "invalid channel number");
            Error::InvalidChannel(channel)
        })
    }

    fn check(&self, parameter: Parameter, value: f64) -> Result<f64, S::Error> {
        parameter.check(value).inspect_err(|_| {
            warn!(parent: &self.span, %parameter, value, "value out of range");
        })
    }

    /// Borrow the underlying interface.
    #[cfg(test)]
    pub(crate) fn interface(&self) -> &S {
        self.transport.interface()
    }
}
