//! # Frame Buffer
//!
//! Fixed-capacity scratch region holding one in-progress or completed frame.
//!
//! The buffer is allocated once and reused by every read and write; each
//! operation starts by clearing it, so a failed frame never leaks into the
//! next one.

use std::io;
use thiserror::Error;

use crate::channel::Channel;

/// Default capacity: 2048 payload bytes + 2 length bytes + 2 checksum bytes
pub const DEFAULT_CAPACITY: usize = 2052;

/// Attempt to store past the end of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame buffer full ({capacity} bytes)")]
pub struct CapacityExceeded {
    pub capacity: usize,
}

/// Reusable fixed-capacity byte buffer
pub struct FrameBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl FrameBuffer {
    /// Allocate a buffer of exactly `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes still available before the buffer is full
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Drop everything past `len`; no-op if already shorter
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// The filled part of the buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn push(&mut self, byte: u8) -> Result<(), CapacityExceeded> {
        if self.len == self.capacity() {
            return Err(CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<(), CapacityExceeded> {
        if bytes.len() > self.remaining() {
            return Err(CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        self.data[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    /// Append up to `count` bytes read from `channel`.
    ///
    /// Keeps reading until `count` bytes arrived or a read returns zero
    /// bytes. `count` is clamped to the free space.
    ///
    /// # Returns
    ///
    /// * `io::Result<usize>` - Number of bytes actually appended
    pub fn fill_from<C: Channel + ?Sized>(&mut self, channel: &mut C, count: usize) -> io::Result<usize> {
        let start = self.len;
        let target = start + count.min(self.remaining());

        while self.len < target {
            let n = channel.read(&mut self.data[self.len..target])?;
            if n == 0 {
                break;
            }
            self.len += n;
        }

        Ok(self.len - start)
    }
}

/// Formatted text goes straight into the buffer; fails once it is full
impl std::fmt::Write for FrameBuffer {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.extend_from_slice(s.as_bytes()).map_err(|_| std::fmt::Error)
    }
}
