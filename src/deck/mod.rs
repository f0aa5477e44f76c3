//! Decks: composition, deck text, side-channel markers, editing and import.
//!
//! ## Flow
//!
//! - Export: `DeckSession::sheet_text` renders deck text for catalog cards
//!   and appends `SideChannel` markers for everything else.
//! - Import: `import_scan` strips the markers, parses deck text with
//!   `text::import_text`, then merges the markers back.

pub mod composition;
pub mod import;
pub mod markers;
pub mod session;
pub mod text;

pub use composition::{DeckComposition, GRID_CAPACITY};
pub use import::{import_scan, ImportedDeck};
pub use markers::SideChannel;
pub use session::DeckSession;
pub use text::{export_text, import_text};
