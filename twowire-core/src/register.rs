//! Device register addressing
//!
//! Most devices expose a register pointer that the master sets by writing
//! one or two bytes right after the address phase. Wide pointers go on the
//! wire most-significant byte first.

use heapless::Vec;

/// Maximum register pointer width in bytes
pub const MAX_REGISTER_WIDTH: usize = 2;

/// Register pointer sent ahead of the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Device has no register pointer
    #[default]
    None,
    /// 8-bit register address
    Byte(u8),
    /// 16-bit register address (EEPROMs and similar)
    Word(u16),
}

impl Register {
    /// Number of pointer bytes on the wire
    pub const fn width(&self) -> usize {
        match self {
            Register::None => 0,
            Register::Byte(_) => 1,
            Register::Word(_) => 2,
        }
    }

    /// Pointer bytes in transmission order
    pub fn to_bytes(&self) -> Vec<u8, MAX_REGISTER_WIDTH> {
        let mut bytes = Vec::new();
        match *self {
            Register::None => {}
            Register::Byte(reg) => {
                // Capacity is 2; a single push cannot fail
                let _ = bytes.push(reg);
            }
            Register::Word(reg) => {
                let _ = bytes.extend_from_slice(&reg.to_be_bytes());
            }
        }
        bytes
    }

    /// Whether a register pointer is present
    ///
    /// Reads with a pointer need a repeated start between the pointer
    /// write and the data read.
    pub const fn is_some(&self) -> bool {
        !matches!(self, Register::None)
    }
}

impl From<u8> for Register {
    fn from(reg: u8) -> Self {
        Register::Byte(reg)
    }
}

impl From<u16> for Register {
    fn from(reg: u16) -> Self {
        Register::Word(reg)
    }
}
