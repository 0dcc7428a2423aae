//! twowire Hardware Abstraction Layer
//!
//! This crate defines the traits the master driver is written against.
//! Chip-specific crates (or the simulator) implement them, so the same
//! transaction logic runs on real silicon and in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / device drivers           │
//! └─────────────────────────────────────────┘
//!                     │  I2cBus, embedded-hal I2c
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  twowire-master (transaction sequencer) │
//! └─────────────────────────────────────────┘
//!                     │  TwiPeripheral + Millis (this crate)
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ chip register │       │  twowire-sim  │
//! │    access     │       │  (host tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`twi::TwiPeripheral`] - TWI controller register interface
//! - [`clock::Millis`] - Millisecond monotonic clock for timeouts
//! - [`i2c::I2cBus`] - Byte-oriented I2C master operations

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod i2c;
pub mod twi;

// Re-export key traits at crate root for convenience
pub use clock::Millis;
pub use i2c::I2cBus;
pub use twi::{Prescaler, TwiPeripheral};
