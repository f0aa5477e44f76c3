//! Crate configuration.
//!
//! `SheetConfig` gathers everything a host tunes: export (fonts, QR error
//! correction, portrait fetch timeout), the decode ladders and the editing
//! session. Every section has documented defaults and missing TOML keys
//! fall back to them.
//!
//! ```
//! use deck_sheet::SheetConfig;
//!
//! let config = SheetConfig::from_toml_str(
//!     r#"
//!     [export]
//!     fetch_timeout_ms = 2500
//!
//!     [decode]
//!     binarize_threshold = 120
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.export.fetch_timeout_ms, 2500);
//! assert_eq!(config.decode.binarize_threshold, 120);
//! assert_eq!(config.session.undo_depth, 64);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cards::SeededIds;
use crate::deck::session::{DeckSession, DEFAULT_UNDO_DEPTH};
use crate::error::ConfigError;
use crate::scan::{DecodeConfig, SheetDecoder};
use crate::sheet::paint::Typeface;
use crate::sheet::qr::{EcLevel, QrcodeEncoder, RqrrReader};
use crate::sheet::{Compositor, HttpPortraitSource, SheetExporter};

/// Export settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Timeout for each portrait fetch, in milliseconds.
    pub fetch_timeout_ms: u64,

    /// TTF/OTF font for sheet text. Without one, text is skipped.
    pub font_path: Option<PathBuf>,

    /// Error correction of the main QR.
    pub main_ec: EcLevel,

    /// Error correction of blank card QRs.
    pub cell_ec: EcLevel,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            font_path: None,
            main_ec: EcLevel::Medium,
            cell_ec: EcLevel::Low,
        }
    }
}

impl ExportConfig {
    #[must_use]
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = timeout.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Load the configured font, if any.
    pub fn typeface(&self) -> Result<Option<Typeface>, ConfigError> {
        match &self.font_path {
            Some(path) => {
                let face = Typeface::load(path)?;
                if face.is_none() {
                    tracing::warn!(path = %path.display(), "font file is not a usable font");
                }
                Ok(face)
            }
            None => Ok(None),
        }
    }

    /// Compositor with this section's font and error correction levels.
    pub fn compositor(&self) -> Result<Compositor, ConfigError> {
        Ok(Compositor::new(Arc::new(QrcodeEncoder))
            .with_face(self.typeface()?)
            .with_main_ec(self.main_ec)
            .with_cell_ec(self.cell_ec))
    }
}

/// Editing session settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Undo steps kept (0 disables undo).
    pub undo_depth: usize,

    /// Seed for random blank card ids. Without one, ids are sequential.
    pub id_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            id_seed: None,
        }
    }
}

impl SessionConfig {
    /// Start a session with these settings.
    #[must_use]
    pub fn session(&self) -> DeckSession {
        let session = match self.id_seed {
            Some(seed) => DeckSession::with_ids(Box::new(SeededIds::new(seed))),
            None => DeckSession::new(),
        };
        session.with_undo_depth(self.undo_depth)
    }
}

/// All settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub export: ExportConfig,
    pub decode: DecodeConfig,
    pub session: SessionConfig,
}

impl SheetConfig {
    /// Parse TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Exporter fetching portraits over HTTP.
    pub fn exporter(&self) -> Result<SheetExporter, ConfigError> {
        let source = HttpPortraitSource::new(self.export.fetch_timeout());
        Ok(SheetExporter::new(self.export.compositor()?, Arc::new(source)))
    }

    /// Decoder reading QR codes with `rqrr`.
    #[must_use]
    pub fn decoder(&self) -> SheetDecoder {
        SheetDecoder::new(Arc::new(RqrrReader)).with_config(self.decode.clone())
    }
}
