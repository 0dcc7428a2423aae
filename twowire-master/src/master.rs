//! Bus controller handle
//!
//! [`TwiMaster`] owns one TWI peripheral, the clock used for timeouts, the
//! bus configuration and the internal receive buffer. Nothing is global:
//! several buses can be driven side by side by holding several masters.
//!
//! # Example
//!
//! ```ignore
//! let mut twi = TwiMaster::new(peripheral, clock, BusConfig::default().timeout(25));
//! twi.setup();
//!
//! // Write 0x1234 to register 0x10 of the device at 0x50
//! twi.write_value(0x50, Register::Byte(0x10), 0x1234u16)?;
//!
//! // Read four bytes starting at register 0x00 of the device at 0x68
//! twi.read_register(0x68, 0x00, 4)?;
//! while twi.available() > 0 {
//!     let byte = twi.next_byte();
//! }
//! ```

use twowire_core::config::RECEIVE_BUFFER_LEN;
use twowire_core::{BusConfig, BusSpeed, Error, Phase, Register, Scalar};
use twowire_hal::i2c::{address_byte, Direction};
use twowire_hal::{Millis, Prescaler, TwiPeripheral};

use crate::buffer::ReceiveBuffer;
use crate::bus::TwiBus;

/// Master-mode driver for one two-wire bus
///
/// `N` is the capacity of the internal receive buffer.
pub struct TwiMaster<P, C, const N: usize = RECEIVE_BUFFER_LEN> {
    pub(crate) bus: TwiBus<P, C>,
    config: BusConfig,
    buffer: ReceiveBuffer<N>,
    active: bool,
}

impl<P: TwiPeripheral, C: Millis> TwiMaster<P, C> {
    /// Create a master with the default receive buffer
    ///
    /// The peripheral is not touched until [`setup`](Self::setup).
    pub fn new(peripheral: P, clock: C, config: BusConfig) -> Self {
        Self::with_buffer(peripheral, clock, config)
    }
}

impl<P: TwiPeripheral, C: Millis, const N: usize> TwiMaster<P, C, N> {
    /// Create a master with an `N`-byte receive buffer
    pub fn with_buffer(peripheral: P, clock: C, config: BusConfig) -> Self {
        Self {
            bus: TwiBus::new(peripheral, clock, config.timeout_ms),
            config,
            buffer: ReceiveBuffer::new(),
            active: false,
        }
    }

    // --- Lifecycle and configuration ---

    /// Configure pull-ups and bit rate, then enable the controller
    pub fn setup(&mut self) {
        let divisor = self.config.divisor();
        self.bus.peripheral.set_pullups(self.config.pullups);
        self.bus.peripheral.set_bit_rate(divisor, Prescaler::Div1);
        self.bus.peripheral.enable();
        self.active = true;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "TWI up: {} Hz, divisor {}, timeout {} ms",
            self.config.speed.hz(),
            divisor,
            self.config.timeout_ms
        );
    }

    /// Disable the controller
    pub fn shutdown(&mut self) {
        self.bus.peripheral.disable();
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Per-phase timeout in milliseconds; 0 blocks forever
    pub fn set_timeout(&mut self, timeout_ms: u16) {
        self.config.timeout_ms = timeout_ms;
        self.bus.timeout_ms = timeout_ms;
    }

    pub fn timeout(&self) -> u16 {
        self.bus.timeout_ms
    }

    /// Select fast (400 kHz) or standard (100 kHz) mode
    pub fn set_speed(&mut self, fast: bool) {
        self.set_bus_speed(BusSpeed::from_fast(fast));
    }

    pub fn set_bus_speed(&mut self, speed: BusSpeed) {
        self.config.speed = speed;
        self.bus
            .peripheral
            .set_bit_rate(self.config.divisor(), Prescaler::Div1);
    }

    pub fn set_pullups(&mut self, enabled: bool) {
        self.config.pullups = enabled;
        self.bus.peripheral.set_pullups(enabled);
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn peripheral(&self) -> &P {
        &self.bus.peripheral
    }

    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.bus.peripheral
    }

    pub fn clock(&self) -> &C {
        &self.bus.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.bus.clock
    }

    /// Give back the peripheral and clock
    pub fn release(self) -> (P, C) {
        (self.bus.peripheral, self.bus.clock)
    }

    // --- Primitives ---
    // For devices that do not speak a register protocol. The caller is
    // responsible for the order of phases; each call still resets the
    // controller or stops the bus on failure.

    /// Start condition (repeated start if the bus is already held)
    pub fn start(&mut self) -> Result<(), Error> {
        self.bus.start().map_err(|e| e.during(Phase::Start))
    }

    /// Address phase
    pub fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
        self.bus
            .send_address(address_byte(address, direction))
            .map_err(|e| e.during(Phase::address(direction == Direction::Read)))
    }

    pub fn send_byte(&mut self, data: u8) -> Result<(), Error> {
        self.bus
            .send_byte(data)
            .map_err(|e| e.during(Phase::SendData))
    }

    /// Receive one byte; `ack` asks the slave for another
    pub fn receive_byte(&mut self, ack: bool) -> Result<u8, Error> {
        self.bus
            .receive_byte(ack)
            .map_err(|e| e.during(Phase::ReceiveData))
    }

    pub fn stop(&mut self) -> Result<(), Error> {
        self.bus.close()
    }

    // --- Transactions ---

    /// Write `data` after an optional register pointer
    pub fn transmit(&mut self, address: u8, register: Register, data: &[u8]) -> Result<(), Error> {
        self.bus.write(address, &register.to_bytes(), data)
    }

    /// Read `count` bytes into the internal buffer
    ///
    /// The count is capped at the buffer capacity and raised to at least
    /// one. Returns the number of bytes now available. On failure the bytes
    /// received before the fault stay available.
    pub fn receive(
        &mut self,
        address: u8,
        register: Register,
        count: usize,
    ) -> Result<usize, Error> {
        self.buffer.clear();
        let count = count.max(1).min(N);
        self.bus.read(address, &register.to_bytes(), count, |_, byte| {
            let _ = self.buffer.push(byte);
        })?;
        Ok(self.buffer.available())
    }

    /// Read `buf.len()` bytes into a caller buffer
    ///
    /// An empty buffer still reads (and drops) one byte.
    pub fn receive_into(
        &mut self,
        address: u8,
        register: Register,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        self.bus
            .read(address, &register.to_bytes(), buf.len(), |index, byte| {
                if let Some(slot) = buf.get_mut(index) {
                    *slot = byte;
                }
            })
    }

    // --- Writes ---

    /// Write raw bytes to a device without a register pointer
    pub fn write_bytes(&mut self, address: u8, data: &[u8]) -> Result<(), Error> {
        self.transmit(address, Register::None, data)
    }

    pub fn write_register(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), Error> {
        self.transmit(address, Register::Byte(register), data)
    }

    pub fn write_register16(
        &mut self,
        address: u8,
        register: u16,
        data: &[u8],
    ) -> Result<(), Error> {
        self.transmit(address, Register::Word(register), data)
    }

    /// Set a device's register pointer without writing data
    ///
    /// A following [`read_bytes`](Self::read_bytes) starts at that register.
    pub fn write_register_pointer(&mut self, address: u8, register: Register) -> Result<(), Error> {
        self.transmit(address, register, &[])
    }

    /// Write a scalar, most-significant byte first
    pub fn write_value<T: Scalar>(
        &mut self,
        address: u8,
        register: Register,
        value: T,
    ) -> Result<(), Error> {
        self.transmit(address, register, value.to_wire().as_ref())
    }

    /// Write the bytes of a string (no terminator)
    pub fn write_str(&mut self, address: u8, register: Register, text: &str) -> Result<(), Error> {
        self.transmit(address, register, text.as_bytes())
    }

    // --- Reads ---

    /// Read from a device without a register pointer into the internal buffer
    pub fn read_bytes(&mut self, address: u8, count: usize) -> Result<usize, Error> {
        self.receive(address, Register::None, count)
    }

    pub fn read_bytes_into(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.receive_into(address, Register::None, buf)
    }

    pub fn read_register(
        &mut self,
        address: u8,
        register: u8,
        count: usize,
    ) -> Result<usize, Error> {
        self.receive(address, Register::Byte(register), count)
    }

    pub fn read_register16(
        &mut self,
        address: u8,
        register: u16,
        count: usize,
    ) -> Result<usize, Error> {
        self.receive(address, Register::Word(register), count)
    }

    pub fn read_register_into(
        &mut self,
        address: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        self.receive_into(address, Register::Byte(register), buf)
    }

    pub fn read_register16_into(
        &mut self,
        address: u8,
        register: u16,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        self.receive_into(address, Register::Word(register), buf)
    }

    /// Read a scalar sent most-significant byte first
    pub fn read_value<T: Scalar>(&mut self, address: u8, register: Register) -> Result<T, Error> {
        let mut bytes = T::Bytes::default();
        self.receive_into(address, register, bytes.as_mut())?;
        Ok(T::from_wire(bytes))
    }

    pub fn read_u8(&mut self, address: u8, register: Register) -> Result<u8, Error> {
        self.read_value(address, register)
    }

    pub fn read_u16(&mut self, address: u8, register: Register) -> Result<u16, Error> {
        self.read_value(address, register)
    }

    pub fn read_u32(&mut self, address: u8, register: Register) -> Result<u32, Error> {
        self.read_value(address, register)
    }

    pub fn read_u64(&mut self, address: u8, register: Register) -> Result<u64, Error> {
        self.read_value(address, register)
    }

    // --- Internal buffer ---

    /// Bytes left in the internal buffer
    pub fn available(&self) -> usize {
        self.buffer.available()
    }

    /// Next byte from the internal buffer, 0 once it is drained
    pub fn next_byte(&mut self) -> u8 {
        self.buffer.next_byte()
    }

    pub fn buffer(&self) -> &ReceiveBuffer<N> {
        &self.buffer
    }
}
