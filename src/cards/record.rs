//! Card records - the data behind every card on a sheet.
//!
//! A `CardRecord` either comes from the catalog (and carries a portrait
//! URL) or is authored by the user as a *blank* card with no portrait.
//! Blank cards are drawn by the placeholder renderer and travel inside
//! the sheet as cell QR payloads.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Sentinel cost for cards where cost does not apply (leaders).
pub const NO_COST: i32 = -1;

/// Card type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardType {
    Leader,
    #[default]
    Character,
    Event,
    Stage,
}

impl CardType {
    /// All types in deck sort order.
    pub const ALL: [CardType; 4] = [
        CardType::Leader,
        CardType::Character,
        CardType::Event,
        CardType::Stage,
    ];

    /// Rank used when sorting deck entries.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            CardType::Leader => 0,
            CardType::Character => 1,
            CardType::Event => 2,
            CardType::Stage => 3,
        }
    }

    /// Label printed in the placeholder's bottom bar.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            CardType::Leader => "LEADER",
            CardType::Character => "CHARACTER",
            CardType::Event => "EVENT",
            CardType::Stage => "STAGE",
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Card color.
///
/// Variants are declared in render priority order, so sorting a color set
/// yields the order it is drawn and serialized in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardColor {
    Red,
    Green,
    Blue,
    Purple,
    Black,
    Yellow,
}

impl CardColor {
    /// All colors in priority order.
    pub const ALL: [CardColor; 6] = [
        CardColor::Red,
        CardColor::Green,
        CardColor::Blue,
        CardColor::Purple,
        CardColor::Black,
        CardColor::Yellow,
    ];

    /// Token used in the wire format and the catalog.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            CardColor::Red => "赤",
            CardColor::Green => "緑",
            CardColor::Blue => "青",
            CardColor::Purple => "紫",
            CardColor::Black => "黒",
            CardColor::Yellow => "黄",
        }
    }

    /// Parse a wire token. Unknown tokens yield `None`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == token.trim())
    }

    /// Swatch used for backgrounds and the bottom bar.
    #[must_use]
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            CardColor::Red => [204, 44, 48],
            CardColor::Green => [28, 140, 84],
            CardColor::Blue => [36, 104, 196],
            CardColor::Purple => [122, 58, 160],
            CardColor::Black => [42, 42, 46],
            CardColor::Yellow => [238, 206, 48],
        }
    }

    /// Perceptual luminance of the swatch in `0.0..=1.0` (Rec. 601 luma).
    #[must_use]
    pub fn luminance(self) -> f32 {
        let [r, g, b] = self.rgb();
        (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)) / 255.0
    }
}

/// Ordered, de-duplicated color set. Most cards have one or two colors.
pub type ColorSet = SmallVec<[CardColor; 2]>;

/// One card, from the catalog or authored by the user.
///
/// ## Example
///
/// ```
/// use deck_sheet::cards::{CardColor, CardRecord, CardType};
///
/// let card = CardRecord::new("BLANK-0001", "Foo", CardType::Event)
///     .with_colors([CardColor::Blue, CardColor::Red])
///     .with_cost(3);
///
/// assert!(card.is_blank());
/// assert_eq!(card.colors.as_slice(), &[CardColor::Red, CardColor::Blue]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    pub card_type: CardType,

    /// Colors in priority order.
    pub colors: ColorSet,

    /// Play cost, `NO_COST` when not applicable.
    pub cost: i32,
    pub power: i32,
    pub counter: i32,
    pub attribute: String,
    pub features: Vec<String>,
    pub text: String,
    pub trigger: String,

    /// Life value. Only meaningful for leaders.
    pub life: i32,

    /// Portrait URL. `None` marks a blank card.
    pub portrait: Option<String>,
}

impl CardRecord {
    /// Create a record with empty stats.
    ///
    /// Leaders start with `NO_COST`, everything else with cost 0.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            card_type,
            colors: ColorSet::new(),
            cost: if card_type == CardType::Leader { NO_COST } else { 0 },
            power: 0,
            counter: 0,
            attribute: String::new(),
            features: Vec::new(),
            text: String::new(),
            trigger: String::new(),
            life: 0,
            portrait: None,
        }
    }

    /// Set the colors; they are sorted into priority order and de-duplicated.
    #[must_use]
    pub fn with_colors(mut self, colors: impl IntoIterator<Item = CardColor>) -> Self {
        self.colors = normalize_colors(colors);
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_power(mut self, power: i32) -> Self {
        self.power = power;
        self
    }

    #[must_use]
    pub fn with_counter(mut self, counter: i32) -> Self {
        self.counter = counter;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    #[must_use]
    pub fn with_features<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = trigger.into();
        self
    }

    #[must_use]
    pub fn with_life(mut self, life: i32) -> Self {
        self.life = life;
        self
    }

    #[must_use]
    pub fn with_portrait(mut self, url: impl Into<String>) -> Self {
        self.portrait = Some(url.into());
        self
    }

    /// A blank card has no portrait and is drawn as a placeholder.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.portrait.is_none()
    }

    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.card_type == CardType::Leader
    }

    /// Highest-priority color, used to pick ink and the bottom bar.
    #[must_use]
    pub fn primary_color(&self) -> Option<CardColor> {
        self.colors.first().copied()
    }
}

/// Sort colors into priority order and drop duplicates.
#[must_use]
pub fn normalize_colors(colors: impl IntoIterator<Item = CardColor>) -> ColorSet {
    let mut set: ColorSet = colors.into_iter().collect();
    set.sort_unstable();
    set.dedup();
    set
}
