//! Error types.
//!
//! Only a few failures are allowed to escape as errors. Payload decoding
//! returns `Option`, and a missed QR region is data, not an error. The
//! enums here cover what remains: a deck text without a usable leader line,
//! rasters that cannot be read or written, cancelled scans and bad config.

use thiserror::Error;

/// Errors raised while importing deck text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckTextError {
    /// The text ended before a leader line was found.
    #[error("deck text has no leader line")]
    MissingLeaderLine,

    /// The line in leader position does not look like `<count>x<id>`.
    #[error("leader line malformed: {line:?}")]
    MalformedLeaderLine { line: String },
}

/// Errors raised while exporting or scanning a sheet image.
#[derive(Debug, Error)]
pub enum SheetError {
    /// The candidate bytes are not a readable raster.
    #[error("cannot read sheet image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// The composed raster could not be written as PNG.
    #[error("cannot encode sheet image: {0}")]
    ImageEncode(#[source] image::ImageError),

    /// The caller abandoned the scan.
    #[error("scan cancelled")]
    Cancelled,

    /// The blocking scan task panicked or was aborted.
    #[error("scan task failed: {0}")]
    Task(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
