//! Internal receive buffer
//!
//! Reads that are not given a caller buffer land here and are handed out
//! one byte at a time, oldest first.

use heapless::Vec;

/// Fixed-capacity FIFO of received bytes
#[derive(Debug, Clone, Default)]
pub struct ReceiveBuffer<const N: usize> {
    data: Vec<u8, N>,
    /// Bytes not yet handed out
    available: usize,
    /// Index of the byte last handed out
    cursor: usize,
}

impl<const N: usize> ReceiveBuffer<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            available: 0,
            cursor: 0,
        }
    }

    /// Drop all content ahead of a new read
    pub fn clear(&mut self) {
        self.data.clear();
        self.available = 0;
        self.cursor = 0;
    }

    /// Append a received byte; returns false when the buffer is full
    pub fn push(&mut self, byte: u8) -> bool {
        if self.data.push(byte).is_err() {
            return false;
        }
        self.available += 1;
        true
    }

    /// Number of bytes that [`next_byte`](Self::next_byte) can still return
    pub fn available(&self) -> usize {
        self.available
    }

    /// Next unread byte, or 0 when everything was read
    ///
    /// Running dry also rewinds the cursor.
    pub fn next_byte(&mut self) -> u8 {
        if self.available == 0 {
            self.cursor = 0;
            return 0;
        }
        self.cursor = self.data.len() - self.available;
        self.available -= 1;
        self.data[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Everything received by the last read, read or not
    pub fn received(&self) -> &[u8] {
        &self.data
    }
}
