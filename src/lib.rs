//! This crate provides an interface for communicating with and controlling the Keithley 2231A-30-3
//! triple channel programmable power supply.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! Output channels:
//! * CH1 - 0 to 30 V, 0 to 3 A
//! * CH2 - 0 to 30 V, 0 to 3 A
//! * CH3 - 0 to 30 V, 0 to 3 A (the instrument itself limits CH3 to 5 V)
//!
//! It uses the instrument's SCPI command set over its serial port. Every command that
//! changes state is sent with `;*OPC?` appended and the driver waits for the instrument
//! to acknowledge it before returning. Setpoints are range checked before anything
//! is sent.
//!
//! The serial port used for PSU comms should be configured like so:
//! * Baud rate: 9600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Line terminator: `\n`
//!
//! With the `serialport` feature, [`psu::Keithley2231A::open`] does this for you.
//! Diagnostics are emitted through `tracing`.

#![cfg_attr(feature = "no-std", no_std)]

#[cfg(all(test, feature = "no-std"))]
extern crate std;

pub mod commands;
pub mod config;
pub mod error;
pub mod psu;
#[cfg(feature = "serialport")]
pub mod serial;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_serial;
