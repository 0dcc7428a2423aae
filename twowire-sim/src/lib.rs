//! Simulated TWI hardware
//!
//! A register-level model of a master-mode TWI controller with devices
//! attached, plus a clock that advances on every read. Used to drive the
//! master deterministically in host tests:
//!
//! - Every bus phase is recorded as a [`BusEvent`]
//! - Any phase can be made to stall (for a number of polls, or forever)
//! - Any phase can be made to complete with a forced status code
//! - Devices model a register pointer of 0, 1 or 2 bytes over 256 bytes of memory

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod clock;
pub mod device;

pub use bus::{BusEvent, PhaseKind, SimBus, TRACE_LEN};
pub use clock::SimClock;
pub use device::SimDevice;
