//! Deck editing session.
//!
//! A session holds the deck under construction and the blank cards the
//! user authored for it. Every edit pushes an O(1) snapshot (the state is
//! built on `im` maps), so edits can be undone. Blank card ids come from a
//! generator owned by the session.

use im::OrdMap;
use tracing::debug;

use crate::cards::{BlankIdGenerator, CardRecord, Catalog, SequentialIds};

use super::composition::DeckComposition;
use super::markers::SideChannel;
use super::text::export_text;

/// Default number of undo steps kept.
pub const DEFAULT_UNDO_DEPTH: usize = 64;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SessionState {
    leader: Option<String>,
    don: Option<String>,
    name: Option<String>,
    cards: OrdMap<String, u32>,
    blanks: OrdMap<String, CardRecord>,
}

/// Deck under construction.
///
/// ## Example
///
/// ```
/// use deck_sheet::cards::{CardRecord, CardType};
/// use deck_sheet::deck::DeckSession;
///
/// let mut session = DeckSession::new();
/// session.set_leader("OP01-001");
/// session.add_card("OP01-016");
///
/// let id = session.create_blank(CardRecord::new("", "Custom", CardType::Event));
/// assert_eq!(id, "BLANK-0001");
/// session.add_card(&id);
///
/// let deck = session.deck().unwrap();
/// assert_eq!(deck.count("BLANK-0001"), 1);
/// ```
pub struct DeckSession {
    state: SessionState,
    history: Vec<SessionState>,
    undo_depth: usize,
    ids: Box<dyn BlankIdGenerator>,
}

impl DeckSession {
    /// Session numbering blank cards `BLANK-0001`, `BLANK-0002`, ...
    #[must_use]
    pub fn new() -> Self {
        Self::with_ids(Box::new(SequentialIds::new()))
    }

    /// Session using the given id generator.
    #[must_use]
    pub fn with_ids(ids: Box<dyn BlankIdGenerator>) -> Self {
        Self {
            state: SessionState::default(),
            history: Vec::new(),
            undo_depth: DEFAULT_UNDO_DEPTH,
            ids,
        }
    }

    #[must_use]
    pub fn with_undo_depth(mut self, depth: usize) -> Self {
        self.undo_depth = depth;
        self
    }

    fn checkpoint(&mut self) {
        if self.undo_depth == 0 {
            return;
        }
        if self.history.len() == self.undo_depth {
            self.history.remove(0);
        }
        self.history.push(self.state.clone());
    }

    pub fn set_leader(&mut self, id: impl Into<String>) {
        self.checkpoint();
        self.state.leader = Some(id.into());
    }

    pub fn set_don(&mut self, id: Option<String>) {
        self.checkpoint();
        self.state.don = id;
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.checkpoint();
        self.state.name = name;
    }

    /// Add one copy of a card.
    pub fn add_card(&mut self, id: &str) {
        self.checkpoint();
        let count = self.state.cards.get(id).copied().unwrap_or(0);
        self.state.cards.insert(id.to_string(), count.saturating_add(1));
    }

    /// Remove one copy of a card. Returns false if the deck had none.
    pub fn remove_card(&mut self, id: &str) -> bool {
        let Some(count) = self.state.cards.get(id).copied() else {
            return false;
        };
        self.checkpoint();
        if count <= 1 {
            self.state.cards.remove(id);
        } else {
            self.state.cards.insert(id.to_string(), count - 1);
        }
        true
    }

    /// Empty the deck. Blank cards stay available.
    pub fn reset(&mut self) {
        self.checkpoint();
        self.state.leader = None;
        self.state.don = None;
        self.state.name = None;
        self.state.cards.clear();
    }

    /// Store a new blank card and return its assigned id.
    ///
    /// The template's id and portrait are ignored.
    pub fn create_blank(&mut self, template: CardRecord) -> String {
        let id = loop {
            let id = self.ids.next_id();
            if !self.state.blanks.contains_key(&id) {
                break id;
            }
        };
        self.checkpoint();
        let card = CardRecord {
            id: id.clone(),
            portrait: None,
            ..template
        };
        debug!(id = %id, name = %card.name, "created blank card");
        self.state.blanks.insert(id.clone(), card);
        id
    }

    /// Replace a stored blank card. Returns false if the id is unknown.
    pub fn update_blank(&mut self, card: CardRecord) -> bool {
        if !self.state.blanks.contains_key(&card.id) {
            return false;
        }
        self.checkpoint();
        let card = CardRecord { portrait: None, ..card };
        self.state.blanks.insert(card.id.clone(), card);
        true
    }

    /// Delete a blank card together with its deck entry.
    pub fn remove_blank(&mut self, id: &str) -> bool {
        if !self.state.blanks.contains_key(id) {
            return false;
        }
        self.checkpoint();
        self.state.blanks.remove(id);
        self.state.cards.remove(id);
        if self.state.leader.as_deref() == Some(id) {
            self.state.leader = None;
        }
        true
    }

    /// Adopt blank cards recovered from a sheet, keeping their ids.
    pub fn adopt_blanks(&mut self, cards: impl IntoIterator<Item = CardRecord>) {
        self.checkpoint();
        for card in cards {
            self.state.blanks.insert(card.id.clone(), CardRecord { portrait: None, ..card });
        }
    }

    /// Replace the deck with an imported one.
    pub fn load(&mut self, deck: &DeckComposition) {
        self.checkpoint();
        self.state.leader = Some(deck.leader.clone());
        self.state.don = deck.don.clone();
        self.state.name = deck.name.clone();
        self.state.cards = deck.entries().map(|(id, n)| (id.to_string(), n)).collect();
    }

    /// Revert the last edit.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.state = previous;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn blank(&self, id: &str) -> Option<&CardRecord> {
        self.state.blanks.get(id)
    }

    pub fn blanks(&self) -> impl Iterator<Item = &CardRecord> {
        self.state.blanks.values()
    }

    #[must_use]
    pub fn count(&self, id: &str) -> u32 {
        self.state.cards.get(id).copied().unwrap_or(0)
    }

    /// Current deck, or `None` until a leader is chosen.
    #[must_use]
    pub fn deck(&self) -> Option<DeckComposition> {
        let mut deck = DeckComposition::new(self.state.leader.clone()?);
        deck.don = self.state.don.clone();
        deck.name = self.state.name.clone();
        for (id, &count) in &self.state.cards {
            deck.set_count(id.clone(), count);
        }
        Some(deck)
    }

    /// Look up a card in the session's blanks first, then the catalog.
    #[must_use]
    pub fn resolve<'a>(&'a self, id: &str, catalog: &'a impl Catalog) -> Option<&'a CardRecord> {
        self.state.blanks.get(id).or_else(|| catalog.find_card(id))
    }

    /// Side-channel markers for the current deck.
    #[must_use]
    pub fn side_channel(&self, deck: &DeckComposition) -> SideChannel {
        let blank_counts = deck
            .entries()
            .filter(|(id, _)| self.state.blanks.contains_key(*id))
            .map(|(id, count)| (id.to_string(), count))
            .collect();
        SideChannel {
            blank_counts,
            don: deck.don.clone(),
            blank_leader: self.state.blanks.get(&deck.leader).map(crate::cards::codec::encode),
        }
    }

    /// Main QR payload: deck text for catalog cards plus markers.
    ///
    /// Blank card entries leave the deck lines and travel in `#BLANK`.
    #[must_use]
    pub fn sheet_text(&self, catalog: &impl Catalog) -> Option<String> {
        let deck = self.deck()?;
        let side = self.side_channel(&deck);

        let mut canonical = deck.clone();
        for (id, _) in &side.blank_counts {
            canonical.set_count(id.clone(), 0);
        }
        canonical.don = None;

        Some(side.append_to(&export_text(&canonical, catalog)))
    }
}

impl Default for DeckSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DeckSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckSession")
            .field("state", &self.state)
            .field("undo_steps", &self.history.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCatalog, CardColor, CardType, SeededIds};

    fn catalog() -> CardCatalog {
        [
            CardRecord::new("OP01-001", "Zoro", CardType::Leader),
            CardRecord::new("OP01-002", "Law", CardType::Character).with_cost(4),
            CardRecord::new("OP01-003", "Luffy", CardType::Character).with_cost(2),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_no_deck_without_leader() {
        let mut session = DeckSession::new();
        session.add_card("OP01-002");
        assert!(session.deck().is_none());
        assert!(session.sheet_text(&catalog()).is_none());
    }

    #[test]
    fn test_add_remove_reset() {
        let mut session = DeckSession::new();
        session.set_leader("OP01-001");
        session.add_card("OP01-002");
        session.add_card("OP01-002");
        assert_eq!(session.count("OP01-002"), 2);

        assert!(session.remove_card("OP01-002"));
        assert!(session.remove_card("OP01-002"));
        assert!(!session.remove_card("OP01-002"));
        assert_eq!(session.deck().unwrap().entries().count(), 0);

        session.add_card("OP01-003");
        session.reset();
        assert!(session.deck().is_none());
        assert_eq!(session.count("OP01-003"), 0);
    }

    #[test]
    fn test_undo() {
        let mut session = DeckSession::new();
        session.set_leader("OP01-001");
        session.add_card("OP01-002");
        session.add_card("OP01-003");

        assert!(session.undo());
        assert_eq!(session.count("OP01-003"), 0);
        assert_eq!(session.count("OP01-002"), 1);

        assert!(session.undo());
        assert!(session.undo());
        assert!(session.deck().is_none());
        assert!(!session.undo());
    }

    #[test]
    fn test_undo_depth_is_bounded() {
        let mut session = DeckSession::new().with_undo_depth(2);
        session.set_leader("OP01-001");
        for _ in 0..5 {
            session.add_card("OP01-002");
        }
        assert!(session.undo());
        assert!(session.undo());
        assert!(!session.undo());
        assert_eq!(session.count("OP01-002"), 3);
    }

    #[test]
    fn test_blank_ids_come_from_session_generator() {
        let mut a = DeckSession::new();
        let mut b = DeckSession::new();
        let template = CardRecord::new("ignored", "X", CardType::Event).with_portrait("u");
        assert_eq!(a.create_blank(template.clone()), "BLANK-0001");
        assert_eq!(a.create_blank(template.clone()), "BLANK-0002");
        assert_eq!(b.create_blank(template.clone()), "BLANK-0001");
        assert!(a.blank("BLANK-0001").unwrap().is_blank());

        let mut seeded = DeckSession::with_ids(Box::new(SeededIds::new(3)));
        let id = seeded.create_blank(template);
        assert!(id.starts_with("BLANK-"));
        assert_eq!(id.len(), 14);
    }

    #[test]
    fn test_update_and_remove_blank() {
        let mut session = DeckSession::new();
        let id = session.create_blank(CardRecord::new("", "Old", CardType::Event));
        session.add_card(&id);

        let mut edited = session.blank(&id).unwrap().clone();
        edited.name = "New".into();
        assert!(session.update_blank(edited));
        assert_eq!(session.blank(&id).unwrap().name, "New");

        assert!(!session.update_blank(CardRecord::new("BLANK-9999", "?", CardType::Event)));

        assert!(session.remove_blank(&id));
        assert_eq!(session.count(&id), 0);
        assert!(session.blank(&id).is_none());
    }

    #[test]
    fn test_sheet_text_moves_blanks_to_markers() {
        let catalog = catalog();
        let mut session = DeckSession::new();
        let leader = session.create_blank(
            CardRecord::new("", "Boss", CardType::Leader)
                .with_colors([CardColor::Black])
                .with_life(5),
        );
        session.set_leader(&leader);
        session.set_don(Some("DON-01".into()));
        session.set_name(Some("Custom".into()));
        session.add_card("OP01-002");
        let blank = session.create_blank(CardRecord::new("", "Trick", CardType::Event));
        session.add_card(&blank);
        session.add_card(&blank);

        let text = session.sheet_text(&catalog).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Custom");
        assert_eq!(lines[1], "1xBLANK-0001");
        assert_eq!(lines[2], "1xOP01-002");
        assert_eq!(lines[3], "#BLANK:BLANK-0002=2");
        assert_eq!(lines[4], "#DON:DON-01");
        assert!(lines[5].starts_with("#LEADER:B|BLANK-0001|Boss|L|黒|5|"));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_load_replaces_deck() {
        let mut session = DeckSession::new();
        session.set_leader("X");
        let deck = DeckComposition::new("OP01-001").with_card("OP01-002", 3);
        session.load(&deck);
        assert_eq!(session.deck().unwrap(), deck);
        assert!(session.undo());
        assert_eq!(session.deck().unwrap().leader, "X");
    }
}
