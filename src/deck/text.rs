//! Deck text: the canonical line format of a deck.
//!
//! ```text
//! # Red Zoro
//! 1xOP01-001
//! 4xOP01-016
//! 2xOP01-025
//! ```
//!
//! An optional `# <name>` line, the leader as `1x<id>`, then one
//! `<count>x<id>` line per entry in canonical deck order. Export output
//! has no trailing newline, so the same deck always yields the same bytes.

use crate::cards::Catalog;
use crate::error::DeckTextError;

use super::composition::DeckComposition;

/// Render a deck as deck text.
///
/// ```
/// use deck_sheet::cards::{CardCatalog, CardRecord, CardType};
/// use deck_sheet::deck::{text, DeckComposition};
///
/// let catalog: CardCatalog = [
///     CardRecord::new("OP01-001", "Zoro", CardType::Leader),
///     CardRecord::new("OP01-002", "Law", CardType::Character).with_cost(4),
///     CardRecord::new("OP01-003", "Luffy", CardType::Character).with_cost(2),
/// ]
/// .into_iter()
/// .collect();
///
/// let deck = DeckComposition::new("OP01-001")
///     .with_card("OP01-002", 4)
///     .with_card("OP01-003", 2);
///
/// assert_eq!(text::export_text(&deck, &catalog), "1xOP01-001\n2xOP01-003\n4xOP01-002");
/// ```
#[must_use]
pub fn export_text(deck: &DeckComposition, catalog: &impl Catalog) -> String {
    let mut lines = Vec::with_capacity(deck.entries().count() + 2);

    if let Some(name) = deck.name.as_deref().map(name_line).filter(|n| !n.is_empty()) {
        lines.push(format!("# {name}"));
    }
    lines.push(format!("1x{}", deck.leader));

    for (id, count) in deck.sorted_entries(catalog) {
        lines.push(format!("{count}x{id}"));
    }
    lines.join("\n")
}

/// Parse deck text.
///
/// Fails only when the leader line is missing or has no `x`. Entry lines
/// that do not parse, or carry a non-positive count, are skipped, as are
/// `#` lines after the leader. Repeated ids accumulate.
pub fn import_text(text: &str) -> Result<DeckComposition, DeckTextError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();

    let name = match lines.peek() {
        Some(line) if line.starts_with('#') => {
            let name = line.trim_start_matches('#').trim().to_string();
            lines.next();
            Some(name).filter(|n| !n.is_empty())
        }
        _ => None,
    };

    let leader_line = lines.next().ok_or(DeckTextError::MissingLeaderLine)?;
    let leader = parse_leader(leader_line)?;

    let mut deck = DeckComposition::new(leader);
    deck.name = name;

    for line in lines {
        if line.starts_with('#') {
            continue;
        }
        if let Some((id, count)) = parse_entry(line) {
            deck.add(id, count);
        }
    }
    Ok(deck)
}

/// A name must stay on its own line, so line breaks become spaces.
fn name_line(name: &str) -> String {
    name.replace(['\r', '\n'], " ").trim().to_string()
}

fn parse_leader(line: &str) -> Result<String, DeckTextError> {
    let malformed = || DeckTextError::MalformedLeaderLine { line: line.to_string() };
    let (_, id) = line.split_once('x').ok_or_else(malformed)?;
    let id = id.trim();
    if id.is_empty() {
        return Err(malformed());
    }
    Ok(id.to_string())
}

fn parse_entry(line: &str) -> Option<(&str, u32)> {
    let (count, id) = line.split_once('x')?;
    let count: i64 = count.trim().parse().ok()?;
    let id = id.trim();
    if count <= 0 || id.is_empty() {
        return None;
    }
    Some((id, u32::try_from(count).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCatalog, CardRecord, CardType};

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
    fn test_literal_export() {
        let deck = DeckComposition::new("OP01-001")
            .with_card("OP01-002", 4)
            .with_card("OP01-003", 2);
        assert_eq!(export_text(&deck, &catalog()), "1xOP01-001\n2xOP01-003\n4xOP01-002");
    }

    #[test]
    fn test_export_with_name() {
        let deck = DeckComposition::new("OP01-001").with_name("Red Zoro");
        assert_eq!(export_text(&deck, &catalog()), "# Red Zoro\n1xOP01-001");
    }

    #[test]
    fn test_blank_name_is_omitted() {
        let deck = DeckComposition::new("OP01-001").with_name("   ");
        assert_eq!(export_text(&deck, &catalog()), "1xOP01-001");
    }

    #[test]
    fn test_multiline_name_stays_on_one_line() {
        let deck = DeckComposition::new("OP01-001")
            .with_name("Red\nZoro\r\n")
            .with_card("OP01-002", 4);
        let text = export_text(&deck, &catalog());
        assert_eq!(text, "# Red Zoro\n1xOP01-001\n4xOP01-002");

        let back = import_text(&text).unwrap();
        assert_eq!(back.leader, "OP01-001");
        assert_eq!(back.name.as_deref(), Some("Red Zoro"));
        assert_eq!(back.count("OP01-002"), 4);
    }

    #[test]
    fn test_import_round_trip() {
        let deck = DeckComposition::new("OP01-001")
            .with_name("Test")
            .with_card("OP01-002", 4)
            .with_card("OP01-003", 2);
        let back = import_text(&export_text(&deck, &catalog())).unwrap();
        assert_eq!(back, deck);
    }

    #[test]
    fn test_import_skips_bad_lines() {
        let text = "1xOP01-001\n4xOP01-002\nfoo\n0xOP01-003\n-2xOP01-004\nzzxOP01-005\n2x\n#DON:OP01-x\n1xOP01-002";
        let deck = import_text(text).unwrap();
        assert_eq!(deck.count("OP01-002"), 5);
        assert_eq!(deck.entries().count(), 1);
    }

    #[test]
    fn test_import_missing_leader() {
        assert_eq!(import_text(""), Err(DeckTextError::MissingLeaderLine));
        assert_eq!(import_text("# only a name"), Err(DeckTextError::MissingLeaderLine));
    }

    #[test]
    fn test_import_malformed_leader() {
        assert_eq!(
            import_text("# name\nOP01-001"),
            Err(DeckTextError::MalformedLeaderLine { line: "OP01-001".into() })
        );
        assert!(matches!(
            import_text("1x"),
            Err(DeckTextError::MalformedLeaderLine { .. })
        ));
    }

    #[test]
    fn test_import_tolerates_crlf_and_blank_lines() {
        let deck = import_text("# Deck\r\n\r\n1xOP01-001\r\n3xOP01-003\r\n").unwrap();
        assert_eq!(deck.name.as_deref(), Some("Deck"));
        assert_eq!(deck.leader, "OP01-001");
        assert_eq!(deck.count("OP01-003"), 3);
    }
}
