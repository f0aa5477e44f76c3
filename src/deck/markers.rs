//! Side-channel marker lines.
//!
//! Deck text only knows catalog ids. Whatever else a sheet has to carry is
//! appended as marker lines:
//!
//! ```text
//! #BLANK:BLANK-0001=2,BLANK-0002=1
//! #DON:P-DON-01
//! #LEADER:B|BLANK-0003|Boss|L|黒|5|5000|0||||
//! ```
//!
//! Markers are stripped before deck text is parsed (BLANK, then DON, then
//! LEADER) and merged back into the parsed deck afterwards.

use crate::cards::{codec, CardRecord};

use super::composition::DeckComposition;

pub const BLANK_TAG: &str = "#BLANK:";
pub const DON_TAG: &str = "#DON:";
pub const LEADER_TAG: &str = "#LEADER:";

/// Data carried next to the deck text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SideChannel {
    /// Counts of blank cards in the deck, in deck order.
    pub blank_counts: Vec<(String, u32)>,
    pub don: Option<String>,
    /// Blank card payload of a blank leader.
    pub blank_leader: Option<String>,
}

impl SideChannel {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blank_counts.is_empty() && self.don.is_none() && self.blank_leader.is_none()
    }

    /// Marker lines, one per present marker.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let counts: Vec<String> = self
            .blank_counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(id, count)| format!("{id}={count}"))
            .collect();
        if !counts.is_empty() {
            lines.push(format!("{BLANK_TAG}{}", counts.join(",")));
        }
        if let Some(don) = &self.don {
            lines.push(format!("{DON_TAG}{don}"));
        }
        if let Some(leader) = &self.blank_leader {
            lines.push(format!("{LEADER_TAG}{leader}"));
        }
        lines
    }

    /// Append the marker lines to deck text.
    #[must_use]
    pub fn append_to(&self, deck_text: &str) -> String {
        let mut out = deck_text.to_string();
        for line in self.lines() {
            out.push('\n');
            out.push_str(&line);
        }
        out
    }

    /// Split marker lines out of a text, returning the remaining deck text.
    ///
    /// Unparsable `#BLANK:` items are skipped; a repeated marker keeps the
    /// last value for DON and LEADER and accumulates BLANK counts.
    #[must_use]
    pub fn strip(text: &str) -> (String, SideChannel) {
        let mut side = SideChannel::default();

        let rest = take_lines(text, BLANK_TAG, |value| {
            for item in value.split(',') {
                let Some((id, count)) = item.split_once('=') else {
                    continue;
                };
                let id = id.trim();
                match count.trim().parse::<u32>() {
                    Ok(count) if count > 0 && !id.is_empty() => {
                        side.blank_counts.push((id.to_string(), count));
                    }
                    _ => {}
                }
            }
        });

        let rest = take_lines(&rest, DON_TAG, |value| {
            let value = value.trim();
            if !value.is_empty() {
                side.don = Some(value.to_string());
            }
        });

        let rest = take_lines(&rest, LEADER_TAG, |value| {
            if codec::is_blank_payload(value) {
                side.blank_leader = Some(value.to_string());
            }
        });

        (rest, side)
    }

    /// Merge the markers into a parsed deck.
    ///
    /// Blank counts are added, the don id is set, and a decodable blank
    /// leader replaces the leader id. The decoded leader is returned.
    pub fn merge_into(&self, deck: &mut DeckComposition) -> Option<CardRecord> {
        for (id, count) in &self.blank_counts {
            deck.add(id.clone(), *count);
        }
        if let Some(don) = &self.don {
            deck.don = Some(don.clone());
        }
        let leader = self.blank_leader.as_deref().and_then(codec::decode)?;
        deck.leader = leader.id.clone();
        Some(leader)
    }
}

fn take_lines(text: &str, tag: &str, mut on_value: impl FnMut(&str)) -> String {
    let mut kept = Vec::new();
    for line in text.lines() {
        match line.trim().strip_prefix(tag) {
            Some(value) => on_value(value),
            None => kept.push(line),
        }
    }
    kept.join("\n")
}
