//! Error taxonomy and result codes
//!
//! Primitives report phase-agnostic [`PrimitiveError`]s. The sequencer knows
//! which [`Phase`] it was in and turns them into an [`Error`], whose
//! [`code`](Error::code) is the unified result code:
//!
//! | Code     | Meaning                                              |
//! |----------|------------------------------------------------------|
//! | 0        | Success                                              |
//! | 1 - 7    | Timeout, see [`Phase::timeout_code`]                 |
//! | 8 - 0xFF | Raw controller status (vendor-defined, see datasheet) |

use core::fmt;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

use crate::phase::Phase;
use crate::status::Status;

/// Failure of a single bus primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrimitiveError {
    /// Completion flag not seen within the configured timeout
    Timeout,
    /// Phase completed with an unexpected status
    Status(Status),
}

impl PrimitiveError {
    /// Attribute this failure to the phase the caller was in
    pub fn during(self, phase: Phase) -> Error {
        match self {
            PrimitiveError::Timeout => Error::Timeout(phase),
            PrimitiveError::Status(status) => Error::Status(status),
        }
    }
}

/// Transaction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Bus phase did not complete in time; the controller was reset
    Timeout(Phase),
    /// Controller reported a NACK or a bus-level fault
    Status(Status),
}

impl Error {
    /// Unified numeric result code
    pub fn code(&self) -> u8 {
        match self {
            Error::Timeout(phase) => phase.timeout_code(),
            Error::Status(status) => status.raw(),
        }
    }

    /// Rebuild an error from a non-zero result code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => None,
            1..=7 => Phase::from_timeout_code(code).map(Error::Timeout),
            raw => Some(Error::Status(Status::from_raw(raw))),
        }
    }

    /// Far end rejected the address or a data byte
    ///
    /// The bus was stopped cleanly; no controller reset took place.
    pub fn is_nack(&self) -> bool {
        matches!(self, Error::Status(status) if status.is_nack())
    }

    /// Whether the failure was a phase timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

/// Flatten a typed result into the numeric result code (0 on success)
pub fn result_code<T>(result: &Result<T, Error>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => e.code(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Timeout(phase) => write!(f, "bus timeout during {:?}", phase),
            Error::Status(status) => write!(f, "TWI status 0x{:02X}", status.raw()),
        }
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match *self {
            Error::Status(s) if s.is_address_nack() => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            Error::Status(Status::MT_DATA_NACK) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
            }
            Error::Status(Status::ARBITRATION_LOST) => ErrorKind::ArbitrationLoss,
            Error::Status(Status::BUS_ERROR) => ErrorKind::Bus,
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    #[test]
    fn test_timeout_maps_to_phase_code() {
        let expected = [
            (Phase::Start, 1),
            (Phase::AddressWrite, 2),
            (Phase::SendData, 3),
            (Phase::RepeatedStart, 4),
            (Phase::AddressRead, 5),
            (Phase::ReceiveData, 6),
            (Phase::Stop, 7),
        ];
        for (phase, code) in expected {
            assert_eq!(PrimitiveError::Timeout.during(phase).code(), code);
        }
    }

    #[test]
    fn test_status_passes_through_unchanged() {
        for phase in Phase::ALL {
            let err = PrimitiveError::Status(Status::MT_SLA_NACK).during(phase);
            assert_eq!(err, Error::Status(Status::MT_SLA_NACK));
            assert_eq!(err.code(), 0x20);
        }
    }

    #[test]
    fn test_result_code() {
        let ok: Result<(), Error> = Ok(());
        assert_eq!(result_code(&ok), 0);

        let err: Result<(), Error> = Err(Error::Timeout(Phase::Stop));
        assert_eq!(result_code(&err), 7);

        let err: Result<u8, Error> = Err(Error::Status(Status::MR_SLA_NACK));
        assert_eq!(result_code(&err), 0x48);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Error::from_code(0), None);
        assert_eq!(Error::from_code(5), Some(Error::Timeout(Phase::AddressRead)));
        assert_eq!(
            Error::from_code(0x38),
            Some(Error::Status(Status::ARBITRATION_LOST))
        );
    }

    #[test]
    fn test_nack_and_timeout_predicates() {
        assert!(Error::Status(Status::MT_DATA_NACK).is_nack());
        assert!(!Error::Status(Status::ARBITRATION_LOST).is_nack());
        assert!(Error::Timeout(Phase::Start).is_timeout());
        assert!(!Error::Timeout(Phase::Start).is_nack());
    }

    #[test]
    fn test_embedded_hal_kind() {
        assert_eq!(
            Error::Status(Status::MR_SLA_NACK).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(
            Error::Status(Status::MT_DATA_NACK).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
        );
        assert_eq!(
            Error::Status(Status::ARBITRATION_LOST).kind(),
            ErrorKind::ArbitrationLoss
        );
        assert_eq!(Error::Status(Status::BUS_ERROR).kind(), ErrorKind::Bus);
        assert_eq!(Error::Timeout(Phase::Stop).kind(), ErrorKind::Other);
    }
}
