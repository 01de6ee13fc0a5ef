//! This module contains the value types carried by 2231A commands and their limits.

use core::ops::RangeInclusive;

use strum_macros::{Display, EnumIter};

use crate::error::Error;

/// Voltage setpoint limits in volts.
pub const VOLTAGE_RANGE_V: RangeInclusive<f64> = 0.0..=30.0;
/// Current setpoint limits in amps.
pub const CURRENT_RANGE_A: RangeInclusive<f64> = 0.0..=3.0;
/// Output timer delay limits in seconds.
pub const TIMER_DELAY_RANGE_S: RangeInclusive<f64> = 0.1..=9999.9;

/// One of the three output channels.
#[derive(Debug, Display, EnumIter, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Channel {
    #[strum(serialize = "CH1")]
    Ch1 = 1,
    #[strum(serialize = "CH2")]
    Ch2 = 2,
    #[strum(serialize = "CH3")]
    Ch3 = 3,
}

impl Channel {
    /// Channel number as sent on the wire, 1 to 3.
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Channel {
    /// The rejected channel number.
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Channel::Ch1),
            2 => Ok(Channel::Ch2),
            3 => Ok(Channel::Ch3),
            other => Err(other),
        }
    }
}

/// Used to be less ambiguous and whether something is on or off.
///
/// Sent as `0`/`1`. Integer flags from elsewhere go through `TryFrom<u8>`, which
/// only accepts those two values.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum State {
    /// Disabled.
    Off = 0,
    /// Enabled.
    On = 1,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

impl TryFrom<u8> for State {
    /// The rejected flag value.
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(State::Off),
            1 => Ok(State::On),
            other => Err(other),
        }
    }
}

/// Names the bounded quantity that failed validation.
#[derive(Debug, Display, EnumIter, PartialEq, Eq, Clone, Copy)]
pub enum Parameter {
    #[strum(serialize = "voltage")]
    Voltage,
    #[strum(serialize = "current")]
    Current,
    #[strum(serialize = "timer delay")]
    TimerDelay,
}

impl Parameter {
    /// Inclusive limits of this parameter.
    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            Parameter::Voltage => VOLTAGE_RANGE_V,
            Parameter::Current => CURRENT_RANGE_A,
            Parameter::TimerDelay => TIMER_DELAY_RANGE_S,
        }
    }

    /// Return `value` if it lies within [Self::range].
    ///
    /// NaN never satisfies a range comparison, so it is rejected along with the infinities.
    pub fn check<I: embedded_io::Error>(self, value: f64) -> Result<f64, Error<I>> {
        if self.range().contains(&value) {
            Ok(value)
        } else {
            Err(Error::InvalidRange(self, value))
        }
    }
}
