//! Transaction phases
//!
//! A full register read walks through every phase in order:
//!
//! ```text
//! START → SLA+W → register byte(s) → REPEATED START → SLA+R → data… → STOP
//! ```
//!
//! Each phase has its own timeout code so a caller can tell where in the
//! transaction the bus hung.

/// Point in a transaction at which a primitive was waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Initial start condition
    Start,
    /// Address with write direction, waiting for ACK/NACK
    AddressWrite,
    /// Data (or register) byte transmitted, waiting for ACK/NACK
    SendData,
    /// Repeated start condition
    RepeatedStart,
    /// Address with read direction, waiting for ACK/NACK
    AddressRead,
    /// Data byte being received
    ReceiveData,
    /// Stop condition
    Stop,
}

impl Phase {
    /// All phases in transaction order
    pub const ALL: [Phase; 7] = [
        Phase::Start,
        Phase::AddressWrite,
        Phase::SendData,
        Phase::RepeatedStart,
        Phase::AddressRead,
        Phase::ReceiveData,
        Phase::Stop,
    ];

    /// Result code reported when this phase times out (1-7)
    pub const fn timeout_code(self) -> u8 {
        match self {
            Phase::Start => 1,
            Phase::AddressWrite => 2,
            Phase::SendData => 3,
            Phase::RepeatedStart => 4,
            Phase::AddressRead => 5,
            Phase::ReceiveData => 6,
            Phase::Stop => 7,
        }
    }

    /// Inverse of [`timeout_code`](Self::timeout_code)
    pub fn from_timeout_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.timeout_code() == code)
    }

    /// Start phase for a given position in the transaction
    pub const fn start(repeated: bool) -> Self {
        if repeated {
            Phase::RepeatedStart
        } else {
            Phase::Start
        }
    }

    /// Address phase for a given direction
    pub const fn address(read: bool) -> Self {
        if read {
            Phase::AddressRead
        } else {
            Phase::AddressWrite
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_codes_are_ordered() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.timeout_code() as usize, i + 1);
        }
    }

    #[test]
    fn test_from_timeout_code() {
        assert_eq!(Phase::from_timeout_code(4), Some(Phase::RepeatedStart));
        assert_eq!(Phase::from_timeout_code(0), None);
        assert_eq!(Phase::from_timeout_code(8), None);
    }

    #[test]
    fn test_mode_sensitive_selection() {
        assert_eq!(Phase::start(false).timeout_code(), 1);
        assert_eq!(Phase::start(true).timeout_code(), 4);
        assert_eq!(Phase::address(false).timeout_code(), 2);
        assert_eq!(Phase::address(true).timeout_code(), 5);
    }
}
