//! Simulated TWI controller and bus
//!
//! Models the controller side of an AVR-style TWI: each `issue_*` call
//! computes the outcome immediately and raises the completion flag, unless
//! a stall was armed for that kind of phase. Status codes follow the AVR
//! master-mode table.

use heapless::Vec;
use twowire_core::Status;
use twowire_hal::{Prescaler, TwiPeripheral};

use crate::device::SimDevice;

/// Maximum number of recorded bus events
pub const TRACE_LEN: usize = 1024;

/// Maximum number of attached devices
pub const MAX_DEVICES: usize = 8;

/// Something that happened on the simulated bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Start or repeated start requested
    Start,
    /// Address byte (SLA+R/W) transmitted
    Address(u8),
    /// Data byte transmitted by the master
    Write(u8),
    /// Data byte received by the master
    Read { value: u8, ack: bool },
    /// Stop requested
    Stop,
    /// Controller disabled
    Disable,
    /// Controller enabled
    Enable,
}

/// Kind of bus phase, used to arm stalls and forced statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseKind {
    Start,
    Address,
    Write,
    Receive,
    Stop,
}

/// Completion hold-off for a stalled phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hold {
    /// Complete after this many more polls
    Polls(u32),
    /// Never complete until the controller is reset
    Forever,
}

#[derive(Debug, Clone, Copy)]
struct Armed<T> {
    kind: PhaseKind,
    /// Number of matching phases to let through first
    skip: usize,
    value: T,
}

/// Simulated controller with attached devices
#[derive(Debug, Clone)]
pub struct SimBus {
    devices: Vec<SimDevice, MAX_DEVICES>,
    trace: Vec<BusEvent, TRACE_LEN>,
    trace_overflow: bool,

    enabled: bool,
    pullups: bool,
    bit_rate: Option<(u8, Prescaler)>,

    owned: bool,
    target: Option<(usize, bool)>,
    status: Status,
    data: u8,
    complete: bool,
    stop_pending: bool,
    hold: Option<Hold>,

    stall: Option<Armed<Hold>>,
    forced: Option<Armed<Status>>,

    polls: u32,
    disables: u32,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    /// Empty bus with a disabled controller
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            trace: Vec::new(),
            trace_overflow: false,
            enabled: false,
            pullups: false,
            bit_rate: None,
            owned: false,
            target: None,
            status: Status::NO_INFO,
            data: 0,
            complete: false,
            stop_pending: false,
            hold: None,
            stall: None,
            forced: None,
            polls: 0,
            disables: 0,
        }
    }

    /// Attach a device; ignored once [`MAX_DEVICES`] are attached
    pub fn with_device(mut self, device: SimDevice) -> Self {
        let _ = self.devices.push(device);
        self
    }

    /// Attach a device; returns false when the bus is full
    pub fn attach(&mut self, device: SimDevice) -> bool {
        self.devices.push(device).is_ok()
    }

    /// Make the next phase of `kind` hang for `polls` completion checks
    pub fn stall_for(&mut self, kind: PhaseKind, polls: u32) {
        self.stall = Some(Armed {
            kind,
            skip: 0,
            value: Hold::Polls(polls),
        });
    }

    /// Make the next phase of `kind` hang until the controller is reset
    pub fn stall_forever(&mut self, kind: PhaseKind) {
        self.stall_forever_after(kind, 0);
    }

    /// Like [`stall_forever`](Self::stall_forever), but let `skip`
    /// matching phases complete first
    pub fn stall_forever_after(&mut self, kind: PhaseKind, skip: usize) {
        self.stall = Some(Armed {
            kind,
            skip,
            value: Hold::Forever,
        });
    }

    /// Complete the next phase of `kind` with `status` instead of the
    /// simulated outcome
    pub fn force_status(&mut self, kind: PhaseKind, status: Status) {
        self.force_status_after(kind, 0, status);
    }

    /// Like [`force_status`](Self::force_status), but let `skip` matching
    /// phases complete normally first
    pub fn force_status_after(&mut self, kind: PhaseKind, skip: usize, status: Status) {
        self.forced = Some(Armed {
            kind,
            skip,
            value: status,
        });
    }

    /// Recorded bus events, oldest first
    pub fn events(&self) -> &[BusEvent] {
        &self.trace
    }

    /// Forget recorded events
    pub fn clear_events(&mut self) {
        self.trace.clear();
        self.trace_overflow = false;
    }

    /// Whether events were dropped because the trace was full
    pub fn trace_overflowed(&self) -> bool {
        self.trace_overflow
    }

    /// Number of times the controller was disabled
    ///
    /// Every lockup recovery disables the controller exactly once.
    pub fn disable_count(&self) -> u32 {
        self.disables
    }

    /// Number of completion-flag polls seen
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Whether the controller is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the internal pull-ups are on
    pub fn pullups_enabled(&self) -> bool {
        self.pullups
    }

    /// Last programmed bit rate
    pub fn bit_rate(&self) -> Option<(u8, Prescaler)> {
        self.bit_rate
    }

    /// Whether the master currently holds the bus (start seen, no stop yet)
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Attached device by address
    pub fn device(&self, address: u8) -> Option<&SimDevice> {
        self.devices.iter().find(|d| d.address() == address)
    }

    fn record(&mut self, event: BusEvent) {
        if self.trace.push(event).is_err() {
            self.trace_overflow = true;
        }
    }

    /// Consume an armed stall or forced status if it matches `kind`
    fn take_armed<T: Copy>(slot: &mut Option<Armed<T>>, kind: PhaseKind) -> Option<T> {
        match slot {
            Some(armed) if armed.kind == kind => {
                if armed.skip > 0 {
                    armed.skip -= 1;
                    None
                } else {
                    let value = armed.value;
                    *slot = None;
                    Some(value)
                }
            }
            _ => None,
        }
    }

    /// Finish issuing a phase: apply a forced status and any armed stall
    fn settle(&mut self, kind: PhaseKind, status: Status) {
        self.status = Self::take_armed(&mut self.forced, kind).unwrap_or(status);
        self.hold = Self::take_armed(&mut self.stall, kind);
        self.complete = self.hold.is_none();
    }

    fn target_device(&mut self) -> Option<&mut SimDevice> {
        let (index, _) = self.target?;
        self.devices.get_mut(index)
    }

    /// Advance a pending hold by one poll, returning whether it released
    fn tick_hold(&mut self) -> bool {
        match self.hold {
            None => true,
            Some(Hold::Forever) => false,
            Some(Hold::Polls(0)) => {
                self.hold = None;
                true
            }
            Some(Hold::Polls(n)) => {
                self.hold = Some(Hold::Polls(n - 1));
                false
            }
        }
    }
}

impl TwiPeripheral for SimBus {
    fn issue_start(&mut self) {
        self.record(BusEvent::Start);
        let status = if self.owned {
            Status::REPEATED_START
        } else {
            Status::START
        };
        self.owned = true;
        self.target = None;
        self.settle(PhaseKind::Start, status);
    }

    fn issue_address(&mut self, address_byte: u8) {
        self.record(BusEvent::Address(address_byte));
        let address = address_byte >> 1;
        let read = address_byte & 1 == 1;

        self.target = self
            .devices
            .iter()
            .position(|d| d.address() == address)
            .map(|index| (index, read));

        let status = match (self.target.is_some(), read) {
            (true, false) => Status::MT_SLA_ACK,
            (true, true) => Status::MR_SLA_ACK,
            (false, false) => Status::MT_SLA_NACK,
            (false, true) => Status::MR_SLA_NACK,
        };
        if !read {
            if let Some(device) = self.target_device() {
                device.begin_write();
            }
        }
        self.settle(PhaseKind::Address, status);
    }

    fn issue_byte(&mut self, data: u8) {
        self.record(BusEvent::Write(data));
        let acked = match self.target {
            Some((_, false)) => self.target_device().map_or(false, |d| d.write(data)),
            _ => false,
        };
        let status = if acked {
            Status::MT_DATA_ACK
        } else {
            Status::MT_DATA_NACK
        };
        self.settle(PhaseKind::Write, status);
    }

    fn issue_receive(&mut self, ack: bool) {
        let value = match self.target {
            Some((_, true)) => self.target_device().map_or(0xFF, |d| d.read()),
            // Released SDA reads as all ones
            _ => 0xFF,
        };
        self.data = value;
        self.record(BusEvent::Read { value, ack });
        self.settle(PhaseKind::Receive, Status::data_received(ack));
    }

    fn issue_stop(&mut self) {
        self.record(BusEvent::Stop);
        self.owned = false;
        self.target = None;
        self.status = Status::NO_INFO;
        self.hold = Self::take_armed(&mut self.stall, PhaseKind::Stop);
        self.stop_pending = self.hold.is_some();
        // Stop does not raise the completion flag
        self.complete = false;
    }

    fn is_complete(&mut self) -> bool {
        self.polls = self.polls.saturating_add(1);
        if !self.complete && self.hold.is_some() && self.tick_hold() {
            self.complete = true;
        }
        self.complete
    }

    fn is_stop_pending(&mut self) -> bool {
        self.polls = self.polls.saturating_add(1);
        if self.stop_pending && self.tick_hold() {
            self.stop_pending = false;
        }
        self.stop_pending
    }

    fn status(&mut self) -> u8 {
        self.status.raw()
    }

    fn read_data(&mut self) -> u8 {
        self.data
    }

    fn enable(&mut self) {
        self.record(BusEvent::Enable);
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.record(BusEvent::Disable);
        self.disables += 1;
        self.enabled = false;
        // Releasing the lines frees a wedged bus
        self.owned = false;
        self.target = None;
        self.hold = None;
        self.complete = false;
        self.stop_pending = false;
        self.status = Status::NO_INFO;
    }

    fn set_bit_rate(&mut self, divisor: u8, prescaler: Prescaler) {
        self.bit_rate = Some((divisor, prescaler));
    }

    fn set_pullups(&mut self, enabled: bool) {
        self.pullups = enabled;
    }
}
