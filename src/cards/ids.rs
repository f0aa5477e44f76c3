//! Id generators for blank cards.
//!
//! Every editing session owns its own generator, so two sessions never
//! share a counter. `SequentialIds` produces readable `BLANK-0001` style
//! ids; `SeededIds` produces random ids that stay unique across sessions
//! which later get merged into one deck.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Prefix shared by all generated blank card ids.
pub const BLANK_ID_PREFIX: &str = "BLANK-";

/// Source of fresh blank card ids.
pub trait BlankIdGenerator: Send {
    /// Produce the next id.
    fn next_id(&mut self) -> String;
}

/// `BLANK-0001`, `BLANK-0002`, ...
///
/// ```
/// use deck_sheet::cards::{BlankIdGenerator, SequentialIds};
///
/// let mut ids = SequentialIds::new();
/// assert_eq!(ids.next_id(), "BLANK-0001");
/// assert_eq!(ids.next_id(), "BLANK-0002");
/// ```
#[derive(Clone, Debug)]
pub struct SequentialIds {
    next: u32,
}

impl SequentialIds {
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Continue numbering after `last`, e.g. after importing `BLANK-0007`.
    #[must_use]
    pub fn starting_after(last: u32) -> Self {
        Self { next: last.saturating_add(1) }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl BlankIdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{BLANK_ID_PREFIX}{:04}", self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// `BLANK-` followed by 8 hex digits from a seeded ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct SeededIds {
    inner: ChaCha8Rng,
}

impl SeededIds {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl BlankIdGenerator for SeededIds {
    fn next_id(&mut self) -> String {
        let value: u32 = self.inner.gen();
        format!("{BLANK_ID_PREFIX}{value:08X}")
    }
}

/// Numeric suffix of a sequential id, if it has one.
#[must_use]
pub fn sequence_number(id: &str) -> Option<u32> {
    id.strip_prefix(BLANK_ID_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_are_per_instance() {
        let mut a = SequentialIds::new();
        let mut b = SequentialIds::new();
        assert_eq!(a.next_id(), "BLANK-0001");
        assert_eq!(a.next_id(), "BLANK-0002");
        assert_eq!(b.next_id(), "BLANK-0001");
    }

    #[test]
    fn test_starting_after() {
        let mut ids = SequentialIds::starting_after(41);
        assert_eq!(ids.next_id(), "BLANK-0042");
    }

    #[test]
    fn test_seeded_ids_are_deterministic() {
        let mut a = SeededIds::new(7);
        let mut b = SeededIds::new(7);
        let first = a.next_id();
        assert_eq!(first, b.next_id());
        assert!(first.starts_with(BLANK_ID_PREFIX));
        assert_eq!(first.len(), BLANK_ID_PREFIX.len() + 8);
        assert_ne!(first, a.next_id());
    }

    #[test]
    fn test_sequence_number() {
        assert_eq!(sequence_number("BLANK-0012"), Some(12));
        assert_eq!(sequence_number("OP01-001"), None);
    }
}
