//! Turning a scanned sheet back into a deck.

use tracing::{debug, info};

use crate::cards::CardRecord;
use crate::error::DeckTextError;
use crate::scan::SheetScan;

use super::composition::DeckComposition;
use super::markers::SideChannel;
use super::text::import_text;

/// Result of importing a scanned sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportedDeck {
    /// The deck, or `None` when no main QR was recovered.
    pub deck: Option<DeckComposition>,

    /// Blank leader, from the `#LEADER` marker or the leader region.
    pub leader: Option<CardRecord>,

    /// Every other recovered blank card.
    pub blank_cards: Vec<CardRecord>,
}

impl ImportedDeck {
    #[must_use]
    pub fn deck_detected(&self) -> bool {
        self.deck.is_some()
    }
}

/// Build a deck from a scan result.
///
/// The blank leader comes from the `#LEADER` marker, else from the leader
/// region. A region leader whose id differs from the deck's leader is kept
/// as a plain blank card; leader-type cards from grid cells always are.
/// Marker lines are stripped and merged around `import_text`. Only a
/// malformed leader line is an error; a scan without deck text still
/// yields its blank cards.
pub fn import_scan(scan: &SheetScan) -> Result<ImportedDeck, DeckTextError> {
    let mut blank_cards = scan.blank_cards.clone();

    let (deck, marker_leader) = match scan.deck_text.as_deref() {
        Some(text) => {
            let (rest, side) = SideChannel::strip(text);
            let mut deck = import_text(&rest)?;
            let leader = side.merge_into(&mut deck);
            (Some(deck), leader)
        }
        None => {
            info!(blank_cards = blank_cards.len(), "no deck detected on sheet");
            (None, None)
        }
    };

    let region_leader = match (&scan.leader, &deck) {
        (Some(card), Some(deck)) if card.id != deck.leader => {
            debug!(id = %card.id, leader = %deck.leader, "leader region card is not the deck leader");
            blank_cards.push(card.clone());
            None
        }
        (card, _) => card.clone(),
    };

    Ok(ImportedDeck {
        deck,
        leader: marker_leader.or(region_leader),
        blank_cards,
    })
}
