//! Scanning sheets back into payloads.
//!
//! ## Key Types
//!
//! - `SheetDecoder`: scans a candidate image, region by region
//! - `DecodeConfig`: retry ladders, threshold and resampling filter
//! - `Payload`: classification of every decoded string
//! - `SheetScan`: deck text plus recovered blank cards
//!
//! Region rectangles come from `sheet::geometry`, rescaled to the
//! candidate's measured size, so a resized or recompressed copy of a sheet
//! still scans.

pub mod classify;
pub mod config;
pub mod decoder;
pub mod region;

pub use classify::Payload;
pub use config::{DecodeConfig, LadderConfig, Resample};
pub use decoder::{CancelToken, SheetDecoder, SheetScan};
pub use region::{binarize, RegionHit, RegionScanner, SheetScale};
