//! Frame sequence numbering
//!
//! The controller uses the sequence field to accept and order commands, so
//! every frame a process sends must carry a fresh, strictly larger value.
//! A single [`SequenceCounter`] is created at startup and cloned into every
//! component that encodes frames.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Process-wide sequence number source
///
/// Thread-safe and can be cloned cheaply (Arc internally). Clones share the
/// same counter. Values never wrap and are never reused.
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    next: Arc<AtomicU32>,
}

impl SequenceCounter {
    /// First value issued by [`SequenceCounter::new`]
    pub const INITIAL: u32 = 1;

    pub fn new() -> Self {
        Self::starting_at(Self::INITIAL)
    }

    /// Counter whose first issued value is `first` (deterministic tests)
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: Arc::new(AtomicU32::new(first)),
        }
    }

    /// Take the next sequence number
    ///
    /// Returns [`Error::SequenceExhausted`] once `u32::MAX - 1` has been issued.
    pub fn next_sequence(&self) -> Result<u32> {
        // u32::MAX is never issued; it marks exhaustion
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(1)
            })
            .map_err(|_| Error::SequenceExhausted)
    }

    /// Value the next call to [`SequenceCounter::next_sequence`] would return
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::Acquire)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}
