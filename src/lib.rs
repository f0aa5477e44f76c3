//! # deck-sheet
//!
//! Printable deck sheets that double as machine-readable decks.
//!
//! A sheet is one 2150×2048 image: the leader, a caption, a 10×5 grid of
//! cards and a main QR holding the deck text. Cards that exist in no
//! catalog ("blank" cards) are drawn as placeholders carrying their own
//! small QR, so a later scan rebuilds them without any lookup. Scans
//! tolerate rescaled and recompressed copies of a sheet.
//!
//! ## Round Trip
//!
//! - Export: `DeckSession::sheet_text` → `sheet::SheetExporter` → PNG
//! - Import: `scan::SheetDecoder::decode` → `deck::import_scan` →
//!   `DeckComposition` plus blank cards
//!
//! ## Modules
//!
//! - `cards`: card records, the blank card codec, catalog access, blank ids
//! - `deck`: compositions, deck text, side-channel markers, sessions, import
//! - `sheet`: layout geometry, drawing, QR adapters, composition, export
//! - `scan`: region recovery and sheet decoding
//! - `config`: TOML-loadable settings
//! - `error`: error types
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod cards;
pub mod config;
pub mod deck;
pub mod error;
pub mod scan;
pub mod sheet;

// Re-export commonly used types
pub use crate::cards::{
    BlankIdGenerator, CardCatalog, CardColor, CardRecord, CardType, Catalog, SeededIds, SequentialIds,
};

pub use crate::deck::{export_text, import_scan, import_text, DeckComposition, DeckSession, ImportedDeck, SideChannel};

pub use crate::sheet::{
    Compositor, EcLevel, ExportRequest, ExportedSheet, HttpPortraitSource, NoPortraits, PortraitSource, SheetContent,
    SheetExporter, DESIGN_HEIGHT, DESIGN_WIDTH,
};

pub use crate::scan::{CancelToken, DecodeConfig, Payload, SheetDecoder, SheetScan};

pub use crate::config::{ExportConfig, SessionConfig, SheetConfig};

pub use crate::error::{ConfigError, DeckTextError, SheetError};
