//! Simulated register-mapped slave device

/// Size of each device's register space
pub const MEMORY_LEN: usize = 256;

/// Slave device with a register pointer over 256 bytes of memory
///
/// After SLA+W the first `pointer_width` bytes set the register pointer
/// (most-significant byte first); further bytes are stored at the pointer,
/// which auto-increments. Reads return memory at the pointer, also
/// auto-incrementing. The pointer wraps within the register space.
#[derive(Debug, Clone)]
pub struct SimDevice {
    address: u8,
    pointer_width: usize,
    memory: [u8; MEMORY_LEN],
    pointer: u16,
    /// Pointer bytes still expected in the current write
    pointer_bytes_left: usize,
    /// Data bytes accepted in the current write
    bytes_written: usize,
    /// NACK data once this many bytes were accepted
    nack_after: Option<usize>,
}

impl SimDevice {
    /// Device with an 8-bit register pointer
    pub fn new(address: u8) -> Self {
        Self {
            address,
            pointer_width: 1,
            memory: [0; MEMORY_LEN],
            pointer: 0,
            pointer_bytes_left: 0,
            bytes_written: 0,
            nack_after: None,
        }
    }

    /// Set the register pointer width (0, 1 or 2 bytes)
    pub fn with_pointer_width(mut self, width: usize) -> Self {
        self.pointer_width = width.min(2);
        self
    }

    /// Preload memory starting at `offset`
    pub fn with_memory(mut self, offset: usize, data: &[u8]) -> Self {
        for (i, byte) in data.iter().enumerate() {
            self.memory[(offset + i) % MEMORY_LEN] = *byte;
        }
        self
    }

    /// Reject every written byte after the first `count` of a transaction
    ///
    /// Pointer bytes count too.
    pub fn nack_after(mut self, count: usize) -> Self {
        self.nack_after = Some(count);
        self
    }

    /// 7-bit bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Current register pointer
    pub fn pointer(&self) -> u16 {
        self.pointer
    }

    /// Device memory
    pub fn memory(&self) -> &[u8; MEMORY_LEN] {
        &self.memory
    }

    /// Called when the device is addressed for writing
    pub(crate) fn begin_write(&mut self) {
        self.pointer_bytes_left = self.pointer_width;
        self.bytes_written = 0;
        if self.pointer_width > 0 {
            self.pointer = 0;
        }
    }

    /// Accept one byte from the master, returning whether it is acknowledged
    pub(crate) fn write(&mut self, byte: u8) -> bool {
        if let Some(limit) = self.nack_after {
            if self.bytes_written >= limit {
                return false;
            }
        }
        self.bytes_written += 1;

        if self.pointer_bytes_left > 0 {
            self.pointer = (self.pointer << 8) | byte as u16;
            self.pointer_bytes_left -= 1;
        } else {
            let index = self.index();
            self.memory[index] = byte;
            self.pointer = self.pointer.wrapping_add(1);
        }
        true
    }

    /// Supply one byte to the master
    pub(crate) fn read(&mut self) -> u8 {
        let byte = self.memory[self.index()];
        self.pointer = self.pointer.wrapping_add(1);
        byte
    }

    fn index(&self) -> usize {
        self.pointer as usize % MEMORY_LEN
    }
}
