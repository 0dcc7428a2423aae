//! Transaction sequencer
//!
//! Every read and write entry point of the driver reduces to one of two
//! orderings of the bus primitives:
//!
//! ```text
//! write: START → SLA+W → prefix… → payload… → STOP
//! read:  START → SLA+R → data… → STOP
//!        START → SLA+W → prefix… → REPEATED START → SLA+R → data… → STOP
//! ```
//!
//! The prefix is the register address (0, 1 or 2 bytes, MSB first). The
//! first failing primitive ends the sequence; it has already left the bus
//! idle, so the sequencer only attributes the failure to its phase.

use twowire_core::{Error, Phase};
use twowire_hal::i2c::{address_byte, Direction};
use twowire_hal::{Millis, TwiPeripheral};

use crate::bus::TwiBus;

impl<P: TwiPeripheral, C: Millis> TwiBus<P, C> {
    /// Start (or repeated start) followed by the address phase
    pub(crate) fn open(
        &mut self,
        address: u8,
        direction: Direction,
        repeated: bool,
    ) -> Result<(), Error> {
        self.start()
            .map_err(|e| e.during(Phase::start(repeated)))?;
        self.send_address(address_byte(address, direction))
            .map_err(|e| e.during(Phase::address(direction == Direction::Read)))
    }

    /// Transmit bytes, stopping at the first rejected one
    pub(crate) fn send_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &byte in bytes {
            self.send_byte(byte).map_err(|e| e.during(Phase::SendData))?;
        }
        Ok(())
    }

    /// Receive `count` bytes, handing each to `sink` with its index
    ///
    /// Every byte is acknowledged except the last one when `nack_last` is
    /// set, which tells the slave the read is over.
    pub(crate) fn receive_run(
        &mut self,
        count: usize,
        nack_last: bool,
        mut sink: impl FnMut(usize, u8),
    ) -> Result<(), Error> {
        for index in 0..count {
            let ack = !(nack_last && index + 1 == count);
            let byte = self
                .receive_byte(ack)
                .map_err(|e| e.during(Phase::ReceiveData))?;
            sink(index, byte);
        }
        Ok(())
    }

    pub(crate) fn close(&mut self) -> Result<(), Error> {
        self.stop().map_err(|e| e.during(Phase::Stop))
    }

    /// Complete write transaction
    pub(crate) fn write(
        &mut self,
        address: u8,
        prefix: &[u8],
        payload: &[u8],
    ) -> Result<(), Error> {
        self.open(address, Direction::Write, false)?;
        self.send_all(prefix)?;
        self.send_all(payload)?;
        self.close()
    }

    /// Complete read transaction
    ///
    /// A non-empty prefix is written first and the read follows a repeated
    /// start. A count of 0 reads one byte.
    pub(crate) fn read(
        &mut self,
        address: u8,
        prefix: &[u8],
        count: usize,
        sink: impl FnMut(usize, u8),
    ) -> Result<(), Error> {
        if prefix.is_empty() {
            self.open(address, Direction::Read, false)?;
        } else {
            self.open(address, Direction::Write, false)?;
            self.send_all(prefix)?;
            self.open(address, Direction::Read, true)?;
        }
        self.receive_run(count.max(1), true, sink)?;
        self.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twowire_core::Status;
    use twowire_sim::{BusEvent, PhaseKind, SimBus, SimClock, SimDevice};

    const TIMEOUT_MS: u16 = 10;

    fn bus() -> TwiBus<SimBus, SimClock> {
        let sim = SimBus::new().with_device(SimDevice::new(0x68).with_memory(0, &[1, 2, 3, 4]));
        TwiBus::new(sim, SimClock::new(1), TIMEOUT_MS)
    }

    fn register_read(bus: &mut TwiBus<SimBus, SimClock>) -> Result<(), Error> {
        bus.read(0x68, &[0x00], 2, |_, _| {})
    }

    fn assert_recovered(bus: &TwiBus<SimBus, SimClock>) {
        assert_eq!(bus.peripheral.disable_count(), 1);
        assert!(bus.peripheral.is_enabled());
        assert!(!bus.peripheral.is_owned());
    }

    #[test]
    fn test_write_sequence() {
        let mut bus = bus();
        assert_eq!(bus.write(0x68, &[0x02], &[0xAA, 0xBB]), Ok(()));
        assert_eq!(
            bus.peripheral.events(),
            &[
                BusEvent::Start,
                BusEvent::Address(0xD0),
                BusEvent::Write(0x02),
                BusEvent::Write(0xAA),
                BusEvent::Write(0xBB),
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_plain_read_has_no_repeated_start() {
        let mut bus = bus();
        let mut got = [0u8; 2];
        assert_eq!(bus.read(0x68, &[], 2, |i, b| got[i] = b), Ok(()));
        assert_eq!(got, [1, 2]);
        assert_eq!(
            bus.peripheral.events(),
            &[
                BusEvent::Start,
                BusEvent::Address(0xD1),
                BusEvent::Read { value: 1, ack: true },
                BusEvent::Read { value: 2, ack: false },
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_zero_count_reads_one_byte() {
        let mut bus = bus();
        let mut calls = 0;
        assert_eq!(bus.read(0x68, &[], 0, |_, _| calls += 1), Ok(()));
        assert_eq!(calls, 1);
        assert!(bus
            .peripheral
            .events()
            .contains(&BusEvent::Read { value: 1, ack: false }));
    }

    #[test]
    fn test_start_timeout_is_code_1() {
        let mut bus = bus();
        bus.peripheral.stall_forever(PhaseKind::Start);
        let result = register_read(&mut bus);
        assert_eq!(result, Err(Error::Timeout(Phase::Start)));
        assert_eq!(result.unwrap_err().code(), 1);
        assert_recovered(&bus);
    }

    #[test]
    fn test_address_write_timeout_is_code_2() {
        let mut bus = bus();
        bus.peripheral.stall_forever(PhaseKind::Address);
        assert_eq!(register_read(&mut bus).unwrap_err().code(), 2);
        assert_recovered(&bus);
    }

    #[test]
    fn test_register_byte_timeout_is_code_3() {
        let mut bus = bus();
        bus.peripheral.stall_forever(PhaseKind::Write);
        assert_eq!(register_read(&mut bus).unwrap_err().code(), 3);
        assert_recovered(&bus);
    }

    #[test]
    fn test_repeated_start_timeout_is_code_4() {
        let mut bus = bus();
        bus.peripheral.stall_forever_after(PhaseKind::Start, 1);
        assert_eq!(register_read(&mut bus).unwrap_err().code(), 4);
        assert_recovered(&bus);
    }

    #[test]
    fn test_address_read_timeout_is_code_5() {
        let mut bus = bus();
        bus.peripheral.stall_forever_after(PhaseKind::Address, 1);
        assert_eq!(register_read(&mut bus).unwrap_err().code(), 5);
        assert_recovered(&bus);
    }

    #[test]
    fn test_receive_timeout_is_code_6() {
        let mut bus = bus();
        bus.peripheral.stall_forever_after(PhaseKind::Receive, 1);
        assert_eq!(register_read(&mut bus).unwrap_err().code(), 6);
        assert_recovered(&bus);
    }

    #[test]
    fn test_stop_timeout_is_code_7() {
        let mut bus = bus();
        bus.peripheral.stall_forever(PhaseKind::Stop);
        assert_eq!(register_read(&mut bus).unwrap_err().code(), 7);
        assert_recovered(&bus);
    }

    #[test]
    fn test_plain_read_address_timeout_is_code_5() {
        let mut bus = bus();
        bus.peripheral.stall_forever(PhaseKind::Address);
        assert_eq!(
            bus.read(0x68, &[], 1, |_, _| {}),
            Err(Error::Timeout(Phase::AddressRead))
        );
    }

    #[test]
    fn test_address_nack_aborts_write() {
        let mut bus = bus();
        assert_eq!(
            bus.write(0x21, &[0x00], &[0x01]),
            Err(Error::Status(Status::MT_SLA_NACK))
        );
        // Nothing is transmitted after the rejected address
        assert_eq!(
            bus.peripheral.events(),
            &[BusEvent::Start, BusEvent::Address(0x42), BusEvent::Stop]
        );
        assert_eq!(bus.peripheral.disable_count(), 0);
    }

    #[test]
    fn test_arbitration_loss_passes_raw_status() {
        let mut bus = bus();
        bus.peripheral
            .force_status_after(PhaseKind::Write, 0, Status::ARBITRATION_LOST);
        let result = bus.write(0x68, &[0x00], &[]);
        assert_eq!(result, Err(Error::Status(Status::ARBITRATION_LOST)));
        assert_eq!(result.unwrap_err().code(), 0x38);
        assert_recovered(&bus);
    }
}
