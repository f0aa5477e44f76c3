//! Deck composition: leader, optional don card, card counts and a name.
//!
//! Counts live in an `im::OrdMap`, so cloning a composition (for undo
//! snapshots or export) costs O(1). A zero count is never stored: lowering
//! an entry to zero removes it.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use crate::cards::Catalog;

/// Number of cells in the sheet grid.
pub const GRID_CAPACITY: usize = 50;

/// A deck as the user built it.
///
/// ## Example
///
/// ```
/// use deck_sheet::deck::DeckComposition;
///
/// let mut deck = DeckComposition::new("OP01-001");
/// deck.add("OP01-002", 4);
/// deck.remove("OP01-002", 1);
///
/// assert_eq!(deck.count("OP01-002"), 3);
/// assert_eq!(deck.total_cards(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckComposition {
    pub leader: String,
    pub don: Option<String>,
    cards: OrdMap<String, u32>,
    pub name: Option<String>,
}

impl DeckComposition {
    #[must_use]
    pub fn new(leader: impl Into<String>) -> Self {
        Self {
            leader: leader.into(),
            don: None,
            cards: OrdMap::new(),
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_don(mut self, don: impl Into<String>) -> Self {
        self.don = Some(don.into());
        self
    }

    /// Builder form of `add`.
    #[must_use]
    pub fn with_card(mut self, id: impl Into<String>, count: u32) -> Self {
        self.add(id, count);
        self
    }

    /// Add `count` copies of a card.
    pub fn add(&mut self, id: impl Into<String>, count: u32) {
        if count == 0 {
            return;
        }
        let entry = self.cards.entry(id.into()).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Remove up to `count` copies. The entry disappears when it reaches zero.
    pub fn remove(&mut self, id: &str, count: u32) {
        let Some(current) = self.cards.get(id).copied() else {
            return;
        };
        if current <= count {
            self.cards.remove(id);
        } else {
            self.cards.insert(id.to_string(), current - count);
        }
    }

    /// Replace an entry's count. Zero removes the entry.
    pub fn set_count(&mut self, id: impl Into<String>, count: u32) {
        let id = id.into();
        if count == 0 {
            self.cards.remove(&id);
        } else {
            self.cards.insert(id, count);
        }
    }

    #[must_use]
    pub fn count(&self, id: &str) -> u32 {
        self.cards.get(id).copied().unwrap_or(0)
    }

    /// Entries ordered by id (not deck order; see `sorted_entries`).
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.cards.iter().map(|(id, &count)| (id.as_str(), count))
    }

    /// Entries in canonical deck order.
    #[must_use]
    pub fn sorted_entries(&self, catalog: &impl Catalog) -> Vec<(String, u32)> {
        let ids = catalog.sort_deck_entries(self.cards.keys().cloned().collect());
        ids.into_iter()
            .map(|id| {
                let count = self.count(&id);
                (id, count)
            })
            .collect()
    }

    /// One id per copy in deck order, truncated to the grid capacity.
    #[must_use]
    pub fn grid_ids(&self, catalog: &impl Catalog) -> Vec<String> {
        self.sorted_entries(catalog)
            .into_iter()
            .flat_map(|(id, count)| std::iter::repeat(id).take(count as usize))
            .take(GRID_CAPACITY)
            .collect()
    }

    /// Total number of copies, leader excluded.
    #[must_use]
    pub fn total_cards(&self) -> u32 {
        self.cards.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Drop all entries; leader, don and name stay.
    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCatalog, CardRecord, CardType};

    #[test]
    fn test_add_and_remove() {
        let mut deck = DeckComposition::new("OP01-001");
        deck.add("OP01-002", 2);
        deck.add("OP01-002", 2);
        assert_eq!(deck.count("OP01-002"), 4);

        deck.remove("OP01-002", 3);
        assert_eq!(deck.count("OP01-002"), 1);

        deck.remove("OP01-002", 5);
        assert_eq!(deck.count("OP01-002"), 0);
        assert!(deck.is_empty());
    }

    #[test]
    fn test_zero_counts_are_never_stored() {
        let mut deck = DeckComposition::new("OP01-001");
        deck.add("OP01-002", 0);
        assert!(deck.is_empty());

        deck.set_count("OP01-003", 2);
        deck.set_count("OP01-003", 0);
        assert!(deck.is_empty());
        assert_eq!(deck.entries().count(), 0);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut deck = DeckComposition::new("OP01-001");
        deck.remove("OP01-002", 1);
        assert!(deck.is_empty());
    }

    #[test]
    fn test_grid_ids_expand_and_truncate() {
        let catalog: CardCatalog = (1..=15)
            .map(|i| {
                CardRecord::new(format!("C-{i:02}"), "c", CardType::Character).with_cost(i)
            })
            .collect();

        let mut deck = DeckComposition::new("L");
        for i in 1..=15 {
            deck.add(format!("C-{i:02}"), 4);
        }
        assert_eq!(deck.total_cards(), 60);

        let grid = deck.grid_ids(&catalog);
        assert_eq!(grid.len(), GRID_CAPACITY);
        assert_eq!(&grid[0..4], ["C-01", "C-01", "C-01", "C-01"]);
        assert_eq!(grid[49], "C-13");
        assert!(!grid.iter().any(|id| id == "C-14" || id == "C-15"));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut deck = DeckComposition::new("L").with_card("A", 1);
        let snapshot = deck.clone();
        deck.add("A", 1);
        assert_eq!(snapshot.count("A"), 1);
        assert_eq!(deck.count("A"), 2);
    }
}
