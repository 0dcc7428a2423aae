//! Master-mode TWI driver
//!
//! This crate drives a polled two-wire controller through the
//! [`TwiPeripheral`](twowire_hal::TwiPeripheral) trait:
//!
//! - Bus primitives (start, address, byte out, byte in, stop) with
//!   per-phase timeouts
//! - Lockup recovery: a controller reset after every timeout or bus fault
//! - Transaction sequencing for plain, 8-bit and 16-bit register devices
//! - A fixed-capacity receive buffer for reads without a caller buffer
//! - Bus scanning
//! - `embedded-hal` 1.0 [`I2c`](embedded_hal::i2c::I2c) and
//!   [`I2cBus`](twowire_hal::I2cBus) implementations
//!
//! Every call blocks until the transaction has finished and leaves the bus
//! idle, whether it succeeded or not.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buffer;
mod bus;
mod embedded;
pub mod master;
mod primitives;
pub mod scan;
mod sequencer;

pub use buffer::ReceiveBuffer;
pub use master::TwiMaster;
pub use scan::ScanReport;

pub use twowire_core::{
    result_code, BusConfig, BusSpeed, Error, Phase, PrimitiveError, Register, Scalar, Status,
};
pub use twowire_hal::i2c::Direction;
