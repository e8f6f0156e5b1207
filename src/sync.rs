//! # Frame Synchronization
//!
//! Skips input bytes until a two-byte start sequence is seen.
//!
//! Both protocols use the same three-state automaton; only the marker bytes
//! differ (`A0 A2` for OSP, `LF $` for NMEA). Patience is spent on every
//! byte that does not advance the automaton and on every empty read.

use std::io;
use tracing::debug;

use crate::channel::Channel;

/// Automaton state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    WaitFirstMarker,
    WaitSecondMarker,
    Found,
}

/// Result of feeding one byte to the automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: SyncState,
    /// Byte counts against the patience budget
    pub costs_patience: bool,
}

/// Start-sequence scanner for one protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Synchronizer {
    first: u8,
    second: u8,
}

impl Synchronizer {
    pub const fn new(first: u8, second: u8) -> Self {
        Self { first, second }
    }

    pub fn markers(&self) -> [u8; 2] {
        [self.first, self.second]
    }

    /// Transition table
    ///
    /// | state            | first marker     | second marker    | other                  |
    /// |------------------|------------------|------------------|------------------------|
    /// | WaitFirstMarker  | WaitSecondMarker | stay             | stay, costs patience   |
    /// | WaitSecondMarker | stay             | Found            | WaitFirst, costs patience |
    pub fn step(&self, state: SyncState, byte: u8) -> Transition {
        use SyncState::*;

        let (next, costs_patience) = match state {
            WaitFirstMarker if byte == self.first => (WaitSecondMarker, false),
            WaitFirstMarker if byte == self.second => (WaitFirstMarker, false),
            WaitFirstMarker => (WaitFirstMarker, true),
            WaitSecondMarker if byte == self.second => (Found, false),
            // A repeated first marker re-arms the sequence
            WaitSecondMarker if byte == self.first => (WaitSecondMarker, false),
            WaitSecondMarker => (WaitFirstMarker, true),
            Found => (Found, false),
        };

        Transition { next, costs_patience }
    }

    /// Consume bytes from `channel` until the start sequence has been read.
    ///
    /// # Arguments
    ///
    /// * `channel` - Byte source, read one byte at a time
    /// * `patience` - Mismatched bytes plus empty reads tolerated
    ///
    /// # Returns
    ///
    /// * `io::Result<bool>` - `true` once both markers were consumed, `false`
    ///   if patience ran out first
    ///
    /// # Errors
    ///
    /// Returns the channel's error if a read fails outright
    pub fn synchronize<C: Channel + ?Sized>(&self, channel: &mut C, patience: usize) -> io::Result<bool> {
        let mut state = SyncState::WaitFirstMarker;
        let mut patience = patience;
        let mut empty_reads = 0usize;
        let mut byte = [0u8; 1];

        while state != SyncState::Found && patience > 0 {
            if channel.read(&mut byte)? == 1 {
                let transition = self.step(state, byte[0]);
                state = transition.next;
                if transition.costs_patience {
                    patience -= 1;
                }
            } else {
                empty_reads += 1;
                patience -= 1;
            }
        }

        debug!(
            "synchronize {:02X?}: state={:?} patience_left={} empty_reads={}",
            self.markers(),
            state,
            patience,
            empty_reads
        );
        Ok(state == SyncState::Found)
    }
}
