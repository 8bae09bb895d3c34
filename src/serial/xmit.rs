// src/serial/xmit.rs

//! Transmit ring buffer.
//!
//! Head and tail are free-running counters; the slot index is the counter
//! masked by `N - 1`, so all `N` slots are usable and `pending` is simply
//! `head - tail`.

/// Fixed-capacity byte queue between writers and the transmit interrupt.
pub struct TransmitQueue<const N: usize> {
    buf: [u8; N],
    head: usize,
    tail: usize,
}

impl<const N: usize> TransmitQueue<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "transmit queue size must be a power of two");
        N - 1
    };

    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes queued and not yet handed to the hardware.
    pub const fn pending(&self) -> usize {
        self.head.wrapping_sub(self.tail)
    }

    pub const fn free(&self) -> usize {
        N - self.pending()
    }

    pub const fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    pub const fn is_full(&self) -> bool {
        self.pending() == N
    }

    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buf[self.head & Self::MASK] = byte;
        self.head = self.head.wrapping_add(1);
        true
    }

    /// Queue as much of `bytes` as fits; returns how many were taken.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(self.free());
        for &byte in &bytes[..take] {
            self.buf[self.head & Self::MASK] = byte;
            self.head = self.head.wrapping_add(1);
        }
        take
    }

    /// Oldest queued byte, left in place.
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.buf[self.tail & Self::MASK])
        }
    }

    /// Drop the oldest byte once the hardware has accepted it.
    pub fn advance(&mut self) {
        if !self.is_empty() {
            self.tail = self.tail.wrapping_add(1);
        }
    }

    pub fn pop(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.advance();
        Some(byte)
    }

    /// Discard everything queued.
    pub fn clear(&mut self) {
        self.tail = self.head;
    }
}

impl<const N: usize> Default for TransmitQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for TransmitQueue<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransmitQueue")
            .field("capacity", &N)
            .field("pending", &self.pending())
            .finish()
    }
}
