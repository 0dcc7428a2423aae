//! Controller handle shared by the primitive and sequencer layers

use twowire_core::{PrimitiveError, Status};
use twowire_hal::{Millis, TwiPeripheral};

/// Peripheral, clock and the timeout that guards every bus phase
pub(crate) struct TwiBus<P, C> {
    pub(crate) peripheral: P,
    pub(crate) clock: C,
    /// 0 disables timeout checking entirely
    pub(crate) timeout_ms: u16,
}

impl<P: TwiPeripheral, C: Millis> TwiBus<P, C> {
    pub(crate) fn new(peripheral: P, clock: C, timeout_ms: u16) -> Self {
        Self {
            peripheral,
            clock,
            timeout_ms,
        }
    }

    /// Spin until `done` holds, bounded by the timeout
    ///
    /// The clock is only consulted while a timeout is configured. On
    /// timeout the controller is reset before returning.
    pub(crate) fn wait_for(
        &mut self,
        mut done: impl FnMut(&mut P) -> bool,
    ) -> Result<(), PrimitiveError> {
        let started = self.clock.millis();
        while !done(&mut self.peripheral) {
            if self.timeout_ms == 0 {
                continue;
            }
            if self.clock.elapsed_since(started) >= u32::from(self.timeout_ms) {
                #[cfg(feature = "defmt")]
                defmt::debug!("TWI phase timed out after {} ms", self.timeout_ms);
                self.recover();
                return Err(PrimitiveError::Timeout);
            }
        }
        Ok(())
    }

    /// Status of the phase that just completed
    pub(crate) fn status(&mut self) -> Status {
        Status::from_raw(self.peripheral.status())
    }

    /// Lockup recovery
    ///
    /// Disabling the controller releases SDA and SCL; re-enabling it with
    /// acknowledgment on leaves it idle and ready for a new start. No retry
    /// is attempted.
    pub(crate) fn recover(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::warn!("TWI lockup, resetting controller");
        self.peripheral.disable();
        self.peripheral.enable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twowire_sim::{BusEvent, PhaseKind, SimBus, SimClock};

    #[test]
    fn test_recover_disables_then_enables() {
        let mut bus = TwiBus::new(SimBus::new(), SimClock::new(1), 10);
        bus.recover();
        assert_eq!(bus.peripheral.events(), &[BusEvent::Disable, BusEvent::Enable]);
        assert!(bus.peripheral.is_enabled());
    }

    #[test]
    fn test_wait_times_out_at_deadline() {
        let mut bus = TwiBus::new(SimBus::new(), SimClock::new(1), 25);
        bus.peripheral.stall_forever(PhaseKind::Start);
        bus.peripheral.issue_start();

        let result = bus.wait_for(|p| p.is_complete());
        assert_eq!(result, Err(PrimitiveError::Timeout));
        // One read per step of 1 ms: deadline reached exactly at 25 ms
        assert_eq!(bus.clock.now(), 26);
        assert_eq!(bus.peripheral.disable_count(), 1);
    }

    #[test]
    fn test_zero_timeout_never_reads_clock_while_spinning() {
        let mut bus = TwiBus::new(SimBus::new(), SimClock::new(1000), 0);
        bus.peripheral.stall_for(PhaseKind::Start, 10_000);
        bus.peripheral.issue_start();

        assert_eq!(bus.wait_for(|p| p.is_complete()), Ok(()));
        // Only the starting timestamp was taken
        assert_eq!(bus.clock.reads(), 1);
        assert_eq!(bus.peripheral.disable_count(), 0);
    }
}
