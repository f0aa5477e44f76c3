//! Sheets: layout, drawing, QR codes and export.
//!
//! A sheet is one 2150×2048 raster with three regions:
//!
//! - Upper left: the leader portrait's upper half, or a blank leader's
//!   placeholder.
//! - Upper right: the main QR carrying deck text and markers, above a
//!   caption.
//! - Lower: a 10×5 grid, one cell per card copy. Catalog cards show their
//!   portrait; blank cards show a placeholder with a small QR of the card.
//!
//! All coordinates live in `geometry`, in design space. The decoder
//! rescales them to whatever raster it is given.

pub mod compose;
pub mod export;
pub mod geometry;
pub mod paint;
pub mod placeholder;
pub mod qr;

pub use compose::{ComposeReport, Compositor, GridCell, LeaderSlot, SheetContent};
pub use export::{ExportRequest, ExportedSheet, HttpPortraitSource, NoPortraits, PortraitSource, SheetExporter};
pub use geometry::{PixelRect, Rect, DESIGN_HEIGHT, DESIGN_WIDTH};
pub use paint::Typeface;
pub use placeholder::PlaceholderRenderer;
pub use qr::{EcLevel, QrEncoder, QrMatrix, QrReader, QrcodeEncoder, RqrrReader};
