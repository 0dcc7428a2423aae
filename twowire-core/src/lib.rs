//! Board-agnostic protocol vocabulary for the twowire TWI master
//!
//! This crate holds everything about the bus protocol that does not
//! touch hardware:
//!
//! - Controller status codes and their classification
//! - Transaction phases and the fault-code table
//! - The unified error taxonomy / result codes
//! - Register address and scalar value encodings (big-endian on the wire)
//! - Bus configuration types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod phase;
pub mod register;
pub mod scalar;
pub mod status;

pub use config::{BusConfig, BusSpeed, RECEIVE_BUFFER_LEN, SCAN_TIMEOUT_MS};
pub use error::{result_code, Error, PrimitiveError};
pub use phase::Phase;
pub use register::Register;
pub use scalar::Scalar;
pub use status::Status;
