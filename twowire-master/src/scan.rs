//! Device discovery

use core::fmt::Write;

use heapless::Vec;
use twowire_core::{Error, SCAN_TIMEOUT_MS};
use twowire_hal::i2c::{Direction, MAX_ADDRESS};
use twowire_hal::{Millis, TwiPeripheral};

use crate::master::TwiMaster;

/// Number of addresses a scan visits
const ADDRESS_COUNT: usize = MAX_ADDRESS as usize + 1;

/// Addresses that acknowledged during a scan, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    found: Vec<u8, ADDRESS_COUNT>,
}

impl ScanReport {
    pub fn addresses(&self) -> &[u8] {
        &self.found
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn contains(&self, address: u8) -> bool {
        self.found.contains(&address)
    }
}

impl<P: TwiPeripheral, C: Millis, const N: usize> TwiMaster<P, C, N> {
    /// Check whether a device answers at `address`
    ///
    /// Sends start and the address with write direction. An acknowledged
    /// address is closed with a stop; a rejected one has already stopped
    /// the bus. Any other failure is returned.
    ///
    /// A stop that times out after the acknowledgment does not change the
    /// answer; the controller has already been reset, as on the NACK path.
    pub fn probe(&mut self, address: u8) -> Result<bool, Error> {
        match self.bus.open(address, Direction::Write, false) {
            Ok(()) => {
                let _ = self.bus.close();
                Ok(true)
            }
            Err(Error::Status(status)) if status.is_address_nack() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Probe all 128 addresses, printing progress to `out`
    ///
    /// Runs with a short fixed timeout so a wedged bus cannot hang the scan;
    /// the configured timeout is restored afterwards in every case. A
    /// timeout aborts the scan, other faults only skip the address.
    pub fn scan<W: Write>(&mut self, out: &mut W) -> Result<ScanReport, Error> {
        let saved = self.timeout();
        self.set_timeout(SCAN_TIMEOUT_MS);
        let result = self.scan_all(out);
        self.set_timeout(saved);
        result
    }

    fn scan_all<W: Write>(&mut self, out: &mut W) -> Result<ScanReport, Error> {
        // Console output is best effort
        let _ = writeln!(out, "Scanning for devices...please wait");
        let _ = writeln!(out);

        let mut report = ScanReport::default();
        for address in 0..=MAX_ADDRESS {
            match self.probe(address) {
                Ok(true) => {
                    let _ = writeln!(out, "Found device at address -  0x{:X}", address);
                    let _ = report.found.push(address);
                }
                Ok(false) => {}
                Err(e) if e.is_timeout() => {
                    let _ = writeln!(
                        out,
                        "There is a problem with the bus, could not complete scan"
                    );
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Scan aborted at {=u8:#x}: {}", address, e);
                    return Err(e);
                }
                Err(_) => {}
            }
        }

        if report.is_empty() {
            let _ = writeln!(out, "No devices found");
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Scan found {} device(s): {=[u8]:#x}", report.len(), report.addresses());

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use twowire_core::{BusConfig, Phase, Status};
    use twowire_sim::{BusEvent, PhaseKind, SimBus, SimClock, SimDevice};

    type Console = heapless::String<1024>;

    fn master(sim: SimBus, timeout_ms: u16) -> TwiMaster<SimBus, SimClock> {
        let mut twi = TwiMaster::new(sim, SimClock::new(1), BusConfig::default().timeout(timeout_ms));
        twi.setup();
        twi
    }

    #[test]
    fn test_probe() {
        let mut twi = master(SimBus::new().with_device(SimDevice::new(0x50)), 10);
        twi.peripheral_mut().clear_events();

        assert_eq!(twi.probe(0x50), Ok(true));
        assert_eq!(twi.probe(0x51), Ok(false));
        assert_eq!(
            twi.peripheral().events(),
            &[
                BusEvent::Start,
                BusEvent::Address(0xA0),
                BusEvent::Stop,
                BusEvent::Start,
                BusEvent::Address(0xA2),
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_scan_reports_devices() {
        let sim = SimBus::new()
            .with_device(SimDevice::new(0x68))
            .with_device(SimDevice::new(0x3C));
        let mut twi = master(sim, 0);
        let mut console = Console::new();

        let report = twi.scan(&mut console).unwrap();
        assert_eq!(report.addresses(), &[0x3C, 0x68]);
        assert!(report.contains(0x68));
        assert_eq!(
            console.as_str(),
            "Scanning for devices...please wait\n\n\
             Found device at address -  0x3C\n\
             Found device at address -  0x68\n"
        );
        assert_eq!(twi.timeout(), 0);
    }

    #[test]
    fn test_scan_empty_bus() {
        let mut twi = master(SimBus::new(), 25);
        let mut console = Console::new();
        let report = twi.scan(&mut console).unwrap();
        assert!(report.is_empty());
        assert!(console.ends_with("No devices found\n"));
    }

    #[test]
    fn test_scan_aborts_on_timeout() {
        let mut sim = SimBus::new().with_device(SimDevice::new(0x10));
        // Wedge the bus on the 6th address
        sim.stall_forever_after(PhaseKind::Address, 5);
        let mut twi = master(sim, 500);
        let mut console = Console::new();

        assert_eq!(
            twi.scan(&mut console),
            Err(Error::Timeout(Phase::AddressWrite))
        );
        assert!(console.ends_with("There is a problem with the bus, could not complete scan\n"));
        assert_eq!(twi.timeout(), 500);
        // The scan deadline, not the configured one, applied
        assert!(twi.clock().now() < 500);
        assert_eq!(twi.peripheral().disable_count(), 1);
    }

    #[test]
    fn test_scan_skips_bus_fault() {
        let mut sim = SimBus::new().with_device(SimDevice::new(0x20));
        sim.force_status_after(PhaseKind::Address, 3, Status::ARBITRATION_LOST);
        let mut twi = master(sim, 10);
        let mut console = Console::new();

        let report = twi.scan(&mut console).unwrap();
        assert_eq!(report.addresses(), &[0x20]);
        assert_eq!(twi.peripheral().disable_count(), 1);
    }

    #[test]
    fn test_scan_continues_after_stop_timeout() {
        let sim = SimBus::new()
            .with_device(SimDevice::new(0x10))
            .with_device(SimDevice::new(0x20));
        let mut twi = master(sim, 10);
        // Addresses 0x00..=0x0F are NACKed, one stop each; the next stop
        // closes the acknowledged probe of 0x10
        twi.peripheral_mut()
            .stall_forever_after(PhaseKind::Stop, 0x10);
        let mut console = Console::new();

        let report = twi.scan(&mut console).unwrap();
        assert_eq!(report.addresses(), &[0x10, 0x20]);
        assert_eq!(twi.peripheral().disable_count(), 1);
        assert_eq!(twi.timeout(), 10);
        assert!(!console.contains("problem with the bus"));
    }

    proptest! {
        #[test]
        fn scan_restores_timeout(
            timeout in any::<u16>(),
            addresses in proptest::collection::btree_set(0u8..=0x7F, 0..8),
        ) {
            let mut sim = SimBus::new();
            for &address in &addresses {
                sim.attach(SimDevice::new(address));
            }
            let mut twi = master(sim, timeout);
            let mut console = Console::new();

            let report = twi.scan(&mut console).unwrap();
            prop_assert_eq!(twi.timeout(), timeout);
            prop_assert_eq!(twi.config().timeout_ms, timeout);
            let expected: std::vec::Vec<u8> = addresses.into_iter().collect();
            prop_assert_eq!(report.addresses(), expected.as_slice());
        }
    }
}
