//! Bus primitives
//!
//! Each primitive issues one bus phase, waits for it to complete and checks
//! the resulting status. Primitives do not know where they sit in a
//! transaction; the sequencer attributes their failures to a [`Phase`].
//!
//! Failure handling:
//! - Timeout: controller reset, [`PrimitiveError::Timeout`]
//! - NACK of an address or data byte: stop condition, then the NACK status
//! - Any other unexpected status: controller reset, then that status
//!
//! [`Phase`]: twowire_core::Phase

use twowire_core::{PrimitiveError, Status};
use twowire_hal::{Millis, TwiPeripheral};

use crate::bus::TwiBus;

impl<P: TwiPeripheral, C: Millis> TwiBus<P, C> {
    /// Issue a start (or repeated start) condition
    pub(crate) fn start(&mut self) -> Result<(), PrimitiveError> {
        self.peripheral.issue_start();
        self.wait_for(|p| p.is_complete())?;

        let status = self.status();
        if status.is_start() {
            Ok(())
        } else {
            Err(self.fault(status))
        }
    }

    /// Transmit an address byte (SLA+R/W) and check for acknowledgment
    pub(crate) fn send_address(&mut self, address_byte: u8) -> Result<(), PrimitiveError> {
        self.peripheral.issue_address(address_byte);
        self.wait_for(|p| p.is_complete())?;

        let status = self.status();
        if status.is_address_ack() {
            Ok(())
        } else if status.is_address_nack() {
            Err(self.rejected(status))
        } else {
            Err(self.fault(status))
        }
    }

    /// Transmit one data byte and check for acknowledgment
    pub(crate) fn send_byte(&mut self, data: u8) -> Result<(), PrimitiveError> {
        self.peripheral.issue_byte(data);
        self.wait_for(|p| p.is_complete())?;

        let status = self.status();
        if status == Status::MT_DATA_ACK {
            Ok(())
        } else if status == Status::MT_DATA_NACK {
            Err(self.rejected(status))
        } else {
            Err(self.fault(status))
        }
    }

    /// Receive one byte, acknowledging it if more are wanted
    pub(crate) fn receive_byte(&mut self, ack: bool) -> Result<u8, PrimitiveError> {
        self.peripheral.issue_receive(ack);
        self.wait_for(|p| p.is_complete())?;

        let status = self.status();
        if status == Status::data_received(ack) {
            Ok(self.peripheral.read_data())
        } else {
            Err(self.fault(status))
        }
    }

    /// Issue a stop condition and wait for the controller to finish it
    pub(crate) fn stop(&mut self) -> Result<(), PrimitiveError> {
        self.peripheral.issue_stop();
        self.wait_for(|p| !p.is_stop_pending())
    }

    /// The far end said no: release the bus with a stop and report it
    fn rejected(&mut self, status: Status) -> PrimitiveError {
        // The NACK is what the caller needs to see; a stop timeout has
        // already reset the controller.
        let _ = self.stop();
        PrimitiveError::Status(status)
    }

    /// Unexpected controller state: reset and report it
    fn fault(&mut self, status: Status) -> PrimitiveError {
        #[cfg(feature = "defmt")]
        defmt::warn!("TWI unexpected status {=u8:#x}", status.raw());
        self.recover();
        PrimitiveError::Status(status)
    }
}
