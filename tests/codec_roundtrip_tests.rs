//! Round-trip properties of the card codec, deck text and markers.

use proptest::prelude::*;

use deck_sheet::cards::{codec, CardCatalog, CardColor, CardRecord, CardType, NO_COST};
use deck_sheet::deck::{export_text, import_text, DeckComposition, SideChannel};

// =============================================================================
// Strategies
// =============================================================================

fn card_type_strategy() -> impl Strategy<Value = CardType> {
    prop::sample::select(CardType::ALL.to_vec())
}

fn card_strategy() -> impl Strategy<Value = CardRecord> {
    (
        "BLANK-[0-9A-F]{4,8}",
        "[A-Za-z0-9 あ-ん]{0,16}",
        card_type_strategy(),
        prop::sample::subsequence(CardColor::ALL.to_vec(), 0..=2),
        0..12i32,
        -1000..13000i32,
        0..3000i32,
        "[A-Za-z]{0,8}",
        prop::collection::vec("[A-Za-z]{1,8}", 0..3),
        "[a-z |\n]{0,40}",
        "[a-z |\n]{0,20}",
    )
        .prop_map(|(id, name, card_type, colors, cost, power, counter, attribute, features, text, trigger)| {
            let card = CardRecord::new(id, name, card_type)
                .with_colors(colors)
                .with_power(power)
                .with_counter(counter)
                .with_attribute(attribute)
                .with_features(features)
                .with_text(text)
                .with_trigger(trigger);
            if card_type == CardType::Leader {
                card.with_life(cost)
            } else {
                card.with_cost(cost)
            }
        })
}

fn deck_strategy() -> impl Strategy<Value = DeckComposition> {
    (
        "OP0[1-9]-00[1-9]",
        prop::option::of("[A-Za-z \r\n]{1,12}"),
        prop::collection::btree_map("(OP|ST)0[1-9]-0[0-9]{2}", 1..5u32, 0..12),
    )
        .prop_map(|(leader, name, cards)| {
            let mut deck = DeckComposition::new(leader);
            deck.name = name;
            for (id, count) in cards {
                deck.add(id, count);
            }
            deck
        })
}

/// The name as it reads back: line breaks flattened, ends trimmed.
fn one_line_name(deck: &DeckComposition) -> Option<String> {
    deck.name
        .as_deref()
        .map(|n| n.replace(['\r', '\n'], " ").trim().to_string())
        .filter(|n| !n.is_empty())
}

fn catalog() -> CardCatalog {
    (1..=9)
        .flat_map(|set| {
            (0..30).map(move |n| {
                let id = format!("OP0{set}-0{n:02}");
                let card_type = if n % 7 == 0 { CardType::Event } else { CardType::Character };
                CardRecord::new(id.clone(), id, card_type).with_cost(n % 10)
            })
        })
        .collect()
}

// =============================================================================
// Card codec
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn card_roundtrip(card in card_strategy()) {
        let payload = codec::encode(&card);
        prop_assert!(!payload.contains('\n'));
        prop_assert_eq!(payload.split('|').count(), 12);
        prop_assert_eq!(codec::decode(&payload), Some(card));
    }

    #[test]
    fn decode_never_panics(text in "\\PC{0,80}") {
        let _ = codec::decode(&text);
    }

    #[test]
    fn deck_text_roundtrip(deck in deck_strategy()) {
        let catalog = catalog();
        let text = export_text(&deck, &catalog);
        let parsed = import_text(&text).unwrap();

        prop_assert_eq!(&parsed.leader, &deck.leader);
        prop_assert_eq!(parsed.entries().collect::<Vec<_>>(), deck.entries().collect::<Vec<_>>());
        prop_assert_eq!(&parsed.name, &one_line_name(&deck));
        prop_assert_eq!(export_text(&parsed, &catalog), text);
    }

    #[test]
    fn markers_survive_strip(deck in deck_strategy(), blanks in prop::collection::vec(1..4u32, 0..4)) {
        let catalog = catalog();
        let side = SideChannel {
            blank_counts: blanks.iter().enumerate().map(|(i, c)| (format!("BLANK-{:04}", i + 1), *c)).collect(),
            don: Some("DON-001".to_string()),
            blank_leader: None,
        };
        let text = side.append_to(&export_text(&deck, &catalog));

        let (rest, stripped) = SideChannel::strip(&text);
        prop_assert_eq!(&stripped, &side);

        let mut parsed = import_text(&rest).unwrap();
        stripped.merge_into(&mut parsed);
        for (id, count) in &side.blank_counts {
            prop_assert_eq!(parsed.count(id), *count);
        }
        prop_assert_eq!(parsed.don.as_deref(), Some("DON-001"));
    }
}

// =============================================================================
// Fixed cases
// =============================================================================

#[test]
fn test_literal_event_payload() {
    let card = CardRecord::new("BLANK-0001", "Foo", CardType::Event)
        .with_colors([CardColor::Red])
        .with_cost(3)
        .with_text("line1\nline2");

    let payload = codec::encode(&card);
    assert_eq!(payload, "B|BLANK-0001|Foo|E|赤|3|0|0|||line1⏎line2|");
    assert_eq!(codec::decode(&payload).unwrap().text, "line1\nline2");
}

#[test]
fn test_leader_payload_carries_life() {
    let leader = CardRecord::new("BLANK-0003", "Boss", CardType::Leader)
        .with_colors([CardColor::Black])
        .with_life(5)
        .with_power(5000);

    let payload = codec::encode(&leader);
    assert_eq!(payload, "B|BLANK-0003|Boss|L|黒|5|5000|0||||");

    let decoded = codec::decode(&payload).unwrap();
    assert_eq!(decoded.card_type, CardType::Leader);
    assert_eq!(decoded.cost, NO_COST);
    assert_eq!(decoded.life, 5);
}

#[test]
fn test_ordering_example() {
    let catalog: CardCatalog = [
        CardRecord::new("OP01-001", "Zoro", CardType::Leader),
        CardRecord::new("OP01-002", "Law", CardType::Character).with_cost(4),
        CardRecord::new("OP01-003", "Luffy", CardType::Character).with_cost(2),
    ]
    .into_iter()
    .collect();

    let deck = DeckComposition::new("OP01-001")
        .with_card("OP01-002", 4)
        .with_card("OP01-003", 2);
    assert_eq!(export_text(&deck, &catalog), "1xOP01-001\n2xOP01-003\n4xOP01-002");
}
