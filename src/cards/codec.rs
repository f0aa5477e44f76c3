//! Blank card wire format.
//!
//! A blank card travels as one `|`-delimited line of 12 positional fields:
//!
//! ```text
//! B|<id>|<name>|<type>|<colors>|<cost>|<power>|<counter>|<attribute>|<features>|<text>|<trigger>
//! ```
//!
//! - `type` is a one-letter code (`L`, `C`, `E`, `S`).
//! - `colors` and `features` are comma-joined.
//! - For leaders the cost slot carries the life value, since leaders
//!   have no cost.
//! - `text` and `trigger` have `|` and newline replaced by reserved glyphs.
//!   `id` and `name` are written verbatim and must not contain either.
//!
//! The format is tagless on purpose: the payload has to fit a QR code
//! printed inside a single grid cell.

use super::record::{normalize_colors, CardColor, CardRecord, CardType, NO_COST};

/// First field of every blank card payload.
pub const BLANK_MARKER: &str = "B";

/// Prefix every blank card payload starts with.
pub const BLANK_PREFIX: &str = "B|";

/// Replaces `|` inside text and trigger.
pub const PIPE_GLYPH: char = '¦';

/// Replaces newline inside text and trigger.
pub const NEWLINE_GLYPH: char = '⏎';

const FIELD_COUNT: usize = 12;

/// Letter for a card type.
///
/// `L` sits outside the generic alphabet and is only produced for leaders.
#[must_use]
pub const fn type_code(card_type: CardType) -> char {
    match card_type {
        CardType::Leader => 'L',
        CardType::Character => 'C',
        CardType::Event => 'E',
        CardType::Stage => 'S',
    }
}

/// Card type for a letter. Unknown letters fall back to `Character`.
#[must_use]
pub fn type_from_code(code: &str) -> CardType {
    match code {
        "L" => CardType::Leader,
        "E" => CardType::Event,
        "S" => CardType::Stage,
        _ => CardType::Character,
    }
}

/// Does this string look like a blank card payload?
#[must_use]
pub fn is_blank_payload(payload: &str) -> bool {
    payload.starts_with(BLANK_PREFIX)
}

fn escape(field: &str) -> String {
    field.replace('|', &PIPE_GLYPH.to_string()).replace('\n', &NEWLINE_GLYPH.to_string())
}

fn unescape(field: &str) -> String {
    field.replace(PIPE_GLYPH, "|").replace(NEWLINE_GLYPH, "\n")
}

fn join_colors(colors: &[CardColor]) -> String {
    colors.iter().map(|c| c.token()).collect::<Vec<_>>().join(",")
}

/// Encode a card as a blank card payload. The portrait is not carried.
///
/// ```
/// use deck_sheet::cards::{codec, CardColor, CardRecord, CardType};
///
/// let card = CardRecord::new("BLANK-0001", "Foo", CardType::Event)
///     .with_colors([CardColor::Red])
///     .with_cost(3)
///     .with_text("line1\nline2");
///
/// assert_eq!(codec::encode(&card), "B|BLANK-0001|Foo|E|赤|3|0|0|||line1⏎line2|");
/// ```
#[must_use]
pub fn encode(card: &CardRecord) -> String {
    let cost_slot = if card.is_leader() { card.life } else { card.cost };

    let fields: [String; FIELD_COUNT] = [
        BLANK_MARKER.to_string(),
        card.id.clone(),
        card.name.clone(),
        type_code(card.card_type).to_string(),
        join_colors(&card.colors),
        cost_slot.to_string(),
        card.power.to_string(),
        card.counter.to_string(),
        card.attribute.clone(),
        card.features.join(","),
        escape(&card.text),
        escape(&card.trigger),
    ];
    fields.join("|")
}

/// Decode a blank card payload.
///
/// Returns `None` for anything that is not a blank card payload: a missing
/// prefix or fewer than 12 fields. Unknown type letters and color tokens
/// are replaced by defaults instead of failing. Unparsable numbers read
/// as 0.
#[must_use]
pub fn decode(payload: &str) -> Option<CardRecord> {
    if !is_blank_payload(payload) {
        return None;
    }

    let fields: Vec<&str> = payload.split('|').collect();
    if fields.len() < FIELD_COUNT {
        return None;
    }

    let card_type = type_from_code(fields[3]);
    let colors = normalize_colors(fields[4].split(',').filter_map(CardColor::from_token));
    let cost_slot = parse_int(fields[5]);

    let (cost, life) = if card_type == CardType::Leader {
        (NO_COST, cost_slot)
    } else {
        (cost_slot, 0)
    };

    Some(CardRecord {
        id: fields[1].to_string(),
        name: fields[2].to_string(),
        card_type,
        colors,
        cost,
        power: parse_int(fields[6]),
        counter: parse_int(fields[7]),
        attribute: fields[8].to_string(),
        features: fields[9]
            .split(',')
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect(),
        text: unescape(fields[10]),
        trigger: unescape(fields[11]),
        life,
        portrait: None,
    })
}

fn parse_int(field: &str) -> i32 {
    field.trim().parse().unwrap_or(0)
}
