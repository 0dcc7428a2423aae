//! Bus trait implementations
//!
//! [`TwiMaster`] implements both the `embedded-hal` 1.0 blocking
//! [`I2c`] trait and the [`I2cBus`] trait from `twowire-hal`, so device
//! drivers written against either work unchanged.

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use twowire_core::Error;
use twowire_hal::i2c::Direction;
use twowire_hal::{I2cBus, Millis, TwiPeripheral};

use crate::master::TwiMaster;

impl<P: TwiPeripheral, C: Millis, const N: usize> ErrorType for TwiMaster<P, C, N> {
    type Error = Error;
}

impl<P: TwiPeripheral, C: Millis, const N: usize> I2c<SevenBitAddress> for TwiMaster<P, C, N> {
    /// Run `operations` as one bus transaction
    ///
    /// Adjacent operations of the same direction are merged; a change of
    /// direction issues a repeated start and a new address phase. The last
    /// byte of each read run is NACKed and empty reads are skipped. The bus
    /// is stopped at the end.
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut current: Option<Direction> = None;

        for index in 0..operations.len() {
            let (head, rest) = operations.split_at_mut(index + 1);
            let op = &mut head[index];

            // An empty read clocks nothing; opening SLA+R for it would leave
            // the slave driving SDA with only a stop to follow
            if matches!(op, Operation::Read(buf) if buf.is_empty()) {
                continue;
            }

            let direction = match op {
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };
            if current != Some(direction) {
                self.bus.open(address, direction, current.is_some())?;
                current = Some(direction);
            }

            match op {
                Operation::Write(bytes) => self.bus.send_all(&bytes[..])?,
                Operation::Read(buf) => {
                    // Keep acknowledging while the merged run still wants bytes
                    let more = rest
                        .iter()
                        .take_while(|next| matches!(next, Operation::Read(_)))
                        .any(|next| matches!(next, Operation::Read(b) if !b.is_empty()));
                    self.bus.receive_run(buf.len(), !more, |i, byte| buf[i] = byte)?;
                }
            }
        }

        if current.is_some() {
            self.bus.close()?;
        }
        Ok(())
    }
}

impl<P: TwiPeripheral, C: Millis, const N: usize> I2cBus for TwiMaster<P, C, N> {
    type Error = Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.write(address, &[], data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        I2cBus::write_read(self, address, &[], buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus
            .read(address, write_data, read_buf.len(), |index, byte| {
                if let Some(slot) = read_buf.get_mut(index) {
                    *slot = byte;
                }
            })
    }
}
