//! Cards: records, the blank card codec, catalog access and id generation.
//!
//! ## Key Types
//!
//! - `CardRecord`: one card, catalog or blank
//! - `CardType`, `CardColor`: fixed enumerations with wire tokens
//! - `Catalog`: lookup and canonical ordering, implemented by `CardCatalog`
//! - `BlankIdGenerator`: per-session id source for blank cards

pub mod catalog;
pub mod codec;
pub mod ids;
pub mod record;

pub use catalog::{CardCatalog, Catalog, DeckSortKey};
pub use ids::{BlankIdGenerator, SeededIds, SequentialIds};
pub use record::{CardColor, CardRecord, CardType, ColorSet, NO_COST};
