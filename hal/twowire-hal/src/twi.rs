//! TWI controller register interface
//!
//! Models a polled two-wire controller of the AVR TWI family: every bus
//! phase is started by writing the control register, completion is
//! signalled by an interrupt flag, and the outcome is a status code read
//! back from the status register.
//!
//! | Method              | AVR equivalent                       |
//! |---------------------|--------------------------------------|
//! | `issue_start`       | `TWCR = TWINT \| TWSTA \| TWEN`        |
//! | `issue_address`     | `TWDR = sla; TWCR = TWINT \| TWEN`     |
//! | `issue_byte`        | `TWDR = data; TWCR = TWINT \| TWEN`    |
//! | `issue_receive`     | `TWCR = TWINT \| TWEN [\| TWEA]`        |
//! | `issue_stop`        | `TWCR = TWINT \| TWEN \| TWSTO`         |
//! | `is_complete`       | `TWCR & TWINT`                       |
//! | `is_stop_pending`   | `TWCR & TWSTO`                       |
//! | `status`            | `TWSR & 0xF8`                        |
//! | `read_data`         | `TWDR`                               |

/// Bit rate prescaler (TWPS bits of the status register)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    #[default]
    Div1,
    Div4,
    Div16,
    Div64,
}

impl Prescaler {
    /// Division factor applied to the bit rate
    pub const fn factor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div4 => 4,
            Prescaler::Div16 => 16,
            Prescaler::Div64 => 64,
        }
    }

    /// Raw TWPS field value
    pub const fn bits(self) -> u8 {
        match self {
            Prescaler::Div1 => 0,
            Prescaler::Div4 => 1,
            Prescaler::Div16 => 2,
            Prescaler::Div64 => 3,
        }
    }
}

/// Two-wire controller peripheral
///
/// The `issue_*` methods only start a bus phase; they never wait. The
/// driver polls [`is_complete`](Self::is_complete) (or
/// [`is_stop_pending`](Self::is_stop_pending) for a stop) and then reads
/// [`status`](Self::status).
///
/// Methods take `&mut self` because every register access on real
/// hardware needs exclusive access to the peripheral.
pub trait TwiPeripheral {
    /// Request a start (or repeated start) condition
    fn issue_start(&mut self);

    /// Load an address byte (7-bit address plus R/W bit) and transmit it
    fn issue_address(&mut self, address_byte: u8);

    /// Load a data byte and transmit it
    fn issue_byte(&mut self, data: u8);

    /// Clock in one byte, acknowledging it when `ack` is true
    fn issue_receive(&mut self, ack: bool);

    /// Request a stop condition
    fn issue_stop(&mut self);

    /// Whether the current phase has completed (interrupt flag set)
    fn is_complete(&mut self) -> bool;

    /// Whether a requested stop condition is still being transmitted
    fn is_stop_pending(&mut self) -> bool;

    /// Status code of the last completed phase, prescaler bits masked off
    fn status(&mut self) -> u8;

    /// Last byte received on the bus
    fn read_data(&mut self) -> u8;

    /// Enable the controller with acknowledgment generation active
    fn enable(&mut self);

    /// Disable the controller, releasing both bus lines
    fn disable(&mut self);

    /// Program the bit rate divisor and prescaler
    fn set_bit_rate(&mut self, divisor: u8, prescaler: Prescaler);

    /// Enable or disable the internal pull-ups on the SDA/SCL pins
    ///
    /// Which pins these are depends on the chip variant.
    fn set_pullups(&mut self, enabled: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prescaler_encoding() {
        assert_eq!(Prescaler::default(), Prescaler::Div1);
        assert_eq!(Prescaler::Div1.bits(), 0);
        assert_eq!(Prescaler::Div64.bits(), 3);
        assert_eq!(Prescaler::Div16.factor(), 16);
    }
}
