//! Decode ladder configuration.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Retry ladder for one kind of region.
///
/// Keys missing from a partial table fall back to `LadderConfig::main_qr`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// Magnifications tried on the tight rectangle, in order.
    /// The scratch buffer is `rect size × magnification`.
    pub magnifications: Vec<f32>,

    /// Magnifications tried on the widened rectangle once the tight
    /// ladder is exhausted.
    pub widened_magnifications: Vec<f32>,

    /// Fraction of the rectangle size added on every side when widening.
    pub widen_fraction: f32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self::main_qr()
    }
}

impl LadderConfig {
    /// Ladder for the single large main QR.
    #[must_use]
    pub fn main_qr() -> Self {
        Self {
            magnifications: vec![1.0, 1.5, 0.75, 2.0],
            widened_magnifications: vec![1.0],
            widen_fraction: 0.08,
        }
    }

    /// Wider ladder for the small card QRs in the grid and leader region.
    #[must_use]
    pub fn card_qr() -> Self {
        Self {
            magnifications: vec![2.0, 3.0, 1.0, 4.0, 1.5, 5.0],
            widened_magnifications: vec![1.0, 2.0],
            widen_fraction: 0.15,
        }
    }

    #[must_use]
    pub fn with_magnifications(mut self, magnifications: Vec<f32>) -> Self {
        self.magnifications = magnifications;
        self
    }

    #[must_use]
    pub fn with_widened(mut self, magnifications: Vec<f32>, fraction: f32) -> Self {
        self.widened_magnifications = magnifications;
        self.widen_fraction = fraction;
        self
    }

    /// Total attempts this ladder makes on a region that never decodes.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.magnifications.len() + self.widened_magnifications.len()
    }
}

/// Resampling filter for the scratch buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resample {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<Resample> for FilterType {
    fn from(filter: Resample) -> Self {
        match filter {
            Resample::Nearest => FilterType::Nearest,
            Resample::Triangle => FilterType::Triangle,
            Resample::CatmullRom => FilterType::CatmullRom,
            Resample::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Decoder configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Ladder for the main QR.
    pub main: LadderConfig,

    /// Ladder for blank card QRs (leader region and grid cells).
    pub card: LadderConfig,

    /// Binarization threshold on the mean of R, G and B.
    /// Pixels at or above it become white.
    pub binarize_threshold: u8,

    /// Also read the inverted image when a direct read finds nothing.
    pub try_inverted: bool,

    /// Retry each attempt on a binarized copy.
    pub binarize: bool,

    pub resample: Resample,

    /// Upper bound on either side of a scratch buffer, in pixels.
    pub max_scratch_side: u32,

    /// Scan the leader region for a blank leader.
    pub scan_leader: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            main: LadderConfig::main_qr(),
            card: LadderConfig::card_qr(),
            binarize_threshold: 128,
            try_inverted: true,
            binarize: true,
            resample: Resample::Triangle,
            max_scratch_side: 2048,
            scan_leader: true,
        }
    }
}

impl DecodeConfig {
    #[must_use]
    pub fn with_main_ladder(mut self, ladder: LadderConfig) -> Self {
        self.main = ladder;
        self
    }

    #[must_use]
    pub fn with_card_ladder(mut self, ladder: LadderConfig) -> Self {
        self.card = ladder;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.binarize_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_resample(mut self, resample: Resample) -> Self {
        self.resample = resample;
        self
    }

    #[must_use]
    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }
}
