//! Card catalog lookup and deck ordering.
//!
//! The real catalog (CSV loading, search, filters) lives outside this
//! crate. It is reached through the `Catalog` trait, which provides card
//! lookup and the canonical deck sort order. `CardCatalog` is the
//! in-memory implementation used by hosts that preload their cards, and
//! by tests.

use rustc_hash::FxHashMap;

use super::record::{CardRecord, CardType};

/// Sort key for deck entries: type rank, cost, catalog priority, id.
///
/// Ids the catalog does not know sort after every known id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeckSortKey {
    unknown: bool,
    rank: u8,
    cost: i32,
    priority: u32,
    id: String,
}

impl DeckSortKey {
    /// Key for a card the catalog knows.
    #[must_use]
    pub fn known(card_type: CardType, cost: i32, priority: u32, id: impl Into<String>) -> Self {
        Self {
            unknown: false,
            rank: card_type.rank(),
            cost,
            priority,
            id: id.into(),
        }
    }

    /// Key for an id outside the catalog (blank cards).
    #[must_use]
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            unknown: true,
            rank: u8::MAX,
            cost: i32::MAX,
            priority: u32::MAX,
            id: id.into(),
        }
    }
}

/// Catalog collaborator.
pub trait Catalog {
    /// Look up a card by id.
    fn find_card(&self, id: &str) -> Option<&CardRecord>;

    /// Sort key for an id.
    fn sort_key(&self, id: &str) -> DeckSortKey;

    /// Put ids into canonical deck order.
    ///
    /// Deck text and the sheet grid both use this order, which is what
    /// makes two exports of the same deck byte-identical.
    fn sort_deck_entries(&self, mut ids: Vec<String>) -> Vec<String> {
        ids.sort_by_cached_key(|id| self.sort_key(id));
        ids
    }
}

/// In-memory catalog.
///
/// Priority is the registration order, matching the row order of the
/// source listing.
///
/// ## Example
///
/// ```
/// use deck_sheet::cards::{Catalog, CardCatalog, CardRecord, CardType};
///
/// let mut catalog = CardCatalog::new();
/// catalog.register(CardRecord::new("OP01-016", "Nami", CardType::Character).with_cost(1));
///
/// let found = catalog.find_card("OP01-016").unwrap();
/// assert_eq!(found.name, "Nami");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<String, CardRecord>,
    priority: FxHashMap<String, u32>,
    next_priority: u32,
}

impl CardCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card.
    ///
    /// Panics if a card with the same id already exists.
    pub fn register(&mut self, card: CardRecord) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with id {:?} already registered", card.id);
        }
        self.priority.insert(card.id.clone(), self.next_priority);
        self.next_priority += 1;
        self.cards.insert(card.id.clone(), card);
    }

    /// Check if an id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.cards.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all cards, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &CardRecord> {
        self.cards.values()
    }

    /// Find cards by type.
    pub fn find_by_type(&self, card_type: CardType) -> impl Iterator<Item = &CardRecord> {
        self.cards.values().filter(move |c| c.card_type == card_type)
    }
}

impl FromIterator<CardRecord> for CardCatalog {
    fn from_iter<I: IntoIterator<Item = CardRecord>>(iter: I) -> Self {
        let mut catalog = CardCatalog::new();
        for card in iter {
            catalog.register(card);
        }
        catalog
    }
}

impl Catalog for CardCatalog {
    fn find_card(&self, id: &str) -> Option<&CardRecord> {
        self.cards.get(id)
    }

    fn sort_key(&self, id: &str) -> DeckSortKey {
        match (self.cards.get(id), self.priority.get(id)) {
            (Some(card), Some(&priority)) => {
                DeckSortKey::known(card.card_type, card.cost, priority, id)
            }
            _ => DeckSortKey::unknown(id),
        }
    }
}
