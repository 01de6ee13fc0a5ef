//! This module is used to define the SCPI command headers understood by the 2231A.

use strum_macros::{EnumIter, IntoStaticStr};

/// Suffix appended to a command so the instrument only answers once it has finished executing it.
pub const OPC_QUERY: &str = ";*OPC?";

/// Command headers, without arguments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum ScpiCommand {
    /// __Q__ - Instrument identity string.
    #[strum(serialize = "*IDN?")]
    Identify,
    /// __Q__ - Date of the last calibration.
    #[strum(serialize = "CAL:STR?")]
    CalibrationDate,
    /// Restore factory defaults.
    #[strum(serialize = "*RST")]
    Reset,
    /// Remote mode with the front panel locked. Only `SYSTEM:LOCAL` unlocks it.
    #[strum(serialize = "SYSTEM:RWLock")]
    RemoteLock,
    /// Return to front panel control.
    ///
    /// The instrument stops answering on the serial port after this one, so it
    /// is never sent with [OPC_QUERY].
    #[strum(serialize = "SYSTEM:LOCAL")]
    Local,
    /// Remote mode, front panel still usable.
    #[strum(serialize = "SYSTEM:REMOTE")]
    Remote,
    /// `<1-3>` - Select the channel later `SOURCE:*` and `CHAN:*` commands act on.
    #[strum(serialize = "INST:NSEL")]
    SelectChannel,
    /// `<0|1>` - Output of the selected channel.
    #[strum(serialize = "CHAN:OUTP")]
    ChannelOutput,
    /// `<0|1>` - Output of all channels.
    #[strum(serialize = "OUTP")]
    AllOutputs,
    /// `<seconds>` - Delay before the selected channel switches off.
    #[strum(serialize = "OUTP:TIM:DEL")]
    TimerDelay,
    /// `<0|1>` - Enable the output timer of the selected channel.
    #[strum(serialize = "OUTP:TIM")]
    TimerState,
    #[strum(serialize = "SYST:BEEP")]
    Beep,
    /// `"<text>"`
    #[strum(serialize = "DISPLAY:TEXT")]
    DisplayText,
    #[strum(serialize = "DISPLAY:TEXT:CLEAR")]
    ClearText,
    /// `CH<n>,<volts>,<amps>`
    #[strum(serialize = "SOURCE:APPLY")]
    Apply,
    /// `<amps>` - Current setpoint of the selected channel.
    #[strum(serialize = "SOURCE:CURRENT")]
    Current,
    /// `<volts>` - Voltage setpoint of the selected channel.
    #[strum(serialize = "SOURCE:VOLTAGE")]
    Voltage,
}

impl ScpiCommand {
    /// The header text as sent on the wire.
    pub fn header(self) -> &'static str {
        self.into()
    }

    /// Whether this command is sent with [OPC_QUERY] appended.
    pub fn is_synced(self) -> bool {
        !matches!(self, ScpiCommand::Local)
    }
}
