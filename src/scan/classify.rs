//! Payload classification.
//!
//! Every string read from a QR is classified once, before anything
//! structural is done with it. Region scans accept or reject hits by kind.

use crate::cards::{codec, CardRecord};

/// What a decoded QR string turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Deck text, possibly with side-channel markers.
    Deck(String),

    /// A blank card record.
    BlankCard(CardRecord),

    /// Anything else, including a blank-card prefix with too few fields.
    Unrecognized,
}

impl Payload {
    /// Classify a decoded string.
    ///
    /// ```
    /// use deck_sheet::scan::Payload;
    ///
    /// assert!(matches!(Payload::classify("1xOP01-001\n4xOP01-016"), Payload::Deck(_)));
    /// assert!(matches!(Payload::classify("B|BLANK-0001|Foo|E|赤|3|0|0||||"), Payload::BlankCard(_)));
    /// assert_eq!(Payload::classify("B|short"), Payload::Unrecognized);
    /// assert_eq!(Payload::classify("https://example.com"), Payload::Unrecognized);
    /// ```
    #[must_use]
    pub fn classify(text: &str) -> Self {
        if codec::is_blank_payload(text) {
            return codec::decode(text).map_or(Payload::Unrecognized, Payload::BlankCard);
        }
        if looks_like_deck(text) {
            Payload::Deck(text.to_string())
        } else {
            Payload::Unrecognized
        }
    }

    #[must_use]
    pub fn is_deck(&self) -> bool {
        matches!(self, Payload::Deck(_))
    }

    #[must_use]
    pub fn is_blank_card(&self) -> bool {
        matches!(self, Payload::BlankCard(_))
    }
}

/// Deck text shape: a `# <name>` line followed by more content, or any
/// content line reading `<count>x<id>`. A named payload counts even when
/// its leader line is broken, so the import reports the bad line.
fn looks_like_deck(text: &str) -> bool {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    let named = lines.next_if(|l| l.starts_with('#')).is_some();
    let mut content = lines.filter(|l| !l.starts_with('#'));
    if named {
        return content.next().is_some();
    }
    content.any(is_entry_line)
}

fn is_entry_line(line: &str) -> bool {
    match line.split_once('x') {
        Some((count, id)) => !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit()) && !id.trim().is_empty(),
        None => false,
    }
}
