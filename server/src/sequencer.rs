//! Per-player sequence gate that makes command application idempotent
//!
//! Clients may resend a command after a transport hiccup. Each player slot
//! remembers the highest sequence number it accepted, and anything equal or
//! lower is treated as a replay.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct CommandSequencer {
    /// Ledger entry per registered slot; `None` until its first command.
    last_accepted: HashMap<u32, Option<u64>>,
}

impl CommandSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh ledger entry for a newly registered slot.
    pub fn open(&mut self, slot: u32) {
        self.last_accepted.insert(slot, None);
    }

    /// Drops the ledger entry so a re-registered slot starts over.
    pub fn close(&mut self, slot: u32) {
        self.last_accepted.remove(&slot);
    }

    /// Whether `sequence` would be accepted, without recording it.
    pub fn is_fresh(&self, slot: u32, sequence: u64) -> bool {
        match self.last_accepted.get(&slot).copied().flatten() {
            Some(last) => sequence > last,
            None => true,
        }
    }

    /// Records `sequence` if it is strictly greater than the last accepted
    /// number for `slot`. Returns false for duplicates.
    ///
    /// Slots without a ledger entry accept any number and record nothing;
    /// entries only exist between `open` and `close`.
    pub fn accept(&mut self, slot: u32, sequence: u64) -> bool {
        match self.last_accepted.get_mut(&slot) {
            Some(Some(last)) if sequence <= *last => false,
            Some(entry) => {
                *entry = Some(sequence);
                true
            }
            None => true,
        }
    }

    pub fn last_accepted(&self, slot: u32) -> Option<u64> {
        self.last_accepted.get(&slot).copied().flatten()
    }

    pub fn is_tracking(&self, slot: u32) -> bool {
        self.last_accepted.contains_key(&slot)
    }
}
