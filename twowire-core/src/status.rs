//! TWI status codes
//!
//! Master-mode status values of the AVR TWI status register (prescaler
//! bits masked). Values not listed here are vendor-defined; they are
//! carried through verbatim so callers can look them up in the datasheet.

/// Raw status code read back after a bus phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u8);

impl Status {
    /// Illegal start or stop condition detected
    pub const BUS_ERROR: Status = Status(0x00);
    /// Start condition transmitted
    pub const START: Status = Status(0x08);
    /// Repeated start condition transmitted
    pub const REPEATED_START: Status = Status(0x10);
    /// SLA+W transmitted, ACK received
    pub const MT_SLA_ACK: Status = Status(0x18);
    /// SLA+W transmitted, NACK received
    pub const MT_SLA_NACK: Status = Status(0x20);
    /// Data byte transmitted, ACK received
    pub const MT_DATA_ACK: Status = Status(0x28);
    /// Data byte transmitted, NACK received
    pub const MT_DATA_NACK: Status = Status(0x30);
    /// Arbitration lost in SLA+R/W or data
    pub const ARBITRATION_LOST: Status = Status(0x38);
    /// SLA+R transmitted, ACK received
    pub const MR_SLA_ACK: Status = Status(0x40);
    /// SLA+R transmitted, NACK received
    pub const MR_SLA_NACK: Status = Status(0x48);
    /// Data byte received, ACK returned
    pub const MR_DATA_ACK: Status = Status(0x50);
    /// Data byte received, NACK returned
    pub const MR_DATA_NACK: Status = Status(0x58);
    /// No relevant state information (controller idle)
    pub const NO_INFO: Status = Status(0xF8);

    /// Wrap a raw status register value
    pub const fn from_raw(raw: u8) -> Self {
        Status(raw)
    }

    /// The raw status register value
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Start or repeated start transmitted
    pub fn is_start(self) -> bool {
        self == Self::START || self == Self::REPEATED_START
    }

    /// Address acknowledged, in either direction
    pub fn is_address_ack(self) -> bool {
        self == Self::MT_SLA_ACK || self == Self::MR_SLA_ACK
    }

    /// Address rejected, in either direction
    pub fn is_address_nack(self) -> bool {
        self == Self::MT_SLA_NACK || self == Self::MR_SLA_NACK
    }

    /// Far end rejected an address or a transmitted data byte
    pub fn is_nack(self) -> bool {
        self.is_address_nack() || self == Self::MT_DATA_NACK
    }

    /// Another master won the bus
    pub fn is_arbitration_lost(self) -> bool {
        self == Self::ARBITRATION_LOST
    }

    /// Status expected after receiving a byte with the given ack flag
    pub fn data_received(ack: bool) -> Self {
        if ack {
            Self::MR_DATA_ACK
        } else {
            Self::MR_DATA_NACK
        }
    }
}

impl From<u8> for Status {
    fn from(raw: u8) -> Self {
        Status(raw)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.0
    }
}
