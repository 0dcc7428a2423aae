//! I2C bus abstractions
//!
//! Addressing helpers shared by every layer, plus the byte-oriented master
//! interface that device drivers are written against. The twowire master
//! implements [`I2cBus`] on top of the register-level
//! [`TwiPeripheral`](crate::twi::TwiPeripheral).

/// Highest valid 7-bit device address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Transfer direction carried in the R/W bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master transmits (R/W bit = 0)
    Write,
    /// Master receives (R/W bit = 1)
    Read,
}

impl Direction {
    /// Value of the R/W bit
    pub const fn bit(self) -> u8 {
        match self {
            Direction::Write => 0,
            Direction::Read => 1,
        }
    }
}

/// Build the address byte (SLA+W / SLA+R) put on the wire
///
/// Only the low seven bits of `address` are used.
pub const fn address_byte(address: u8, direction: Direction) -> u8 {
    ((address & MAX_ADDRESS) << 1) | direction.bit()
}

/// I2C bus master
///
/// Each call is one complete transaction: it opens with a start condition,
/// closes with a stop condition and leaves the bus idle whether it
/// succeeds or not.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// Every byte but the last is acknowledged.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read without releasing the bus (repeated start)
    ///
    /// This is the register-read pattern: `write_data` selects the register,
    /// `read_buf` receives its contents.
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_byte() {
        assert_eq!(address_byte(0x50, Direction::Write), 0xA0);
        assert_eq!(address_byte(0x50, Direction::Read), 0xA1);
        assert_eq!(address_byte(0x68, Direction::Read), 0xD1);
        // Eighth bit is dropped
        assert_eq!(address_byte(0xFF, Direction::Write), 0xFE);
    }
}
