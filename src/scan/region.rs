//! Region recovery.
//!
//! A region is a design-space rectangle expected to hold one QR. It is
//! mapped onto the candidate image, then read through a ladder of
//! attempts:
//!
//! 1. crop the rectangle and resample it into a scratch buffer at
//!    `size × magnification`;
//! 2. read it directly, in both polarities;
//! 3. binarize it on the mean of R, G and B and read again.
//!
//! The first accepted hit ends the ladder. When the tight rectangle fails
//! at every magnification, a widened rectangle is tried at the widened
//! magnifications. A miss is `Ok(None)`; only cancellation is an error.

use image::{imageops, GrayImage, Luma, RgbaImage};
use tracing::trace;

use super::classify::Payload;
use super::config::{DecodeConfig, LadderConfig};
use super::decoder::CancelToken;
use crate::error::SheetError;
use crate::sheet::geometry::{Rect, DESIGN_HEIGHT, DESIGN_WIDTH};
use crate::sheet::qr::{read_luma, QrReader};

/// An accepted read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionHit {
    /// The raw decoded string.
    pub text: String,
    pub payload: Payload,
}

/// Ratio between a candidate image and the design canvas, per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SheetScale {
    pub x: f32,
    pub y: f32,
}

impl SheetScale {
    #[must_use]
    pub fn of(img: &RgbaImage) -> Self {
        Self {
            x: img.width() as f32 / DESIGN_WIDTH as f32,
            y: img.height() as f32 / DESIGN_HEIGHT as f32,
        }
    }

    /// Map a design-space rectangle onto the candidate image.
    #[must_use]
    pub fn map(&self, design: Rect) -> Rect {
        design.scale(self.x, self.y)
    }
}

/// Runs region ladders against one candidate image.
pub struct RegionScanner<'a> {
    img: &'a RgbaImage,
    scale: SheetScale,
    reader: &'a dyn QrReader,
    config: &'a DecodeConfig,
    cancel: &'a CancelToken,
}

impl<'a> RegionScanner<'a> {
    #[must_use]
    pub fn new(img: &'a RgbaImage, reader: &'a dyn QrReader, config: &'a DecodeConfig, cancel: &'a CancelToken) -> Self {
        Self {
            img,
            scale: SheetScale::of(img),
            reader,
            config,
            cancel,
        }
    }

    /// Run `ladder` on the design rectangle `design`, keeping the first
    /// hit whose payload `accept` allows.
    pub fn scan(
        &self,
        design: Rect,
        ladder: &LadderConfig,
        accept: impl Fn(&Payload) -> bool,
    ) -> Result<Option<RegionHit>, SheetError> {
        let tight = self.scale.map(design);
        for &magnification in &ladder.magnifications {
            if let Some(hit) = self.attempt(tight, magnification, &accept)? {
                return Ok(Some(hit));
            }
        }

        let wide = self.scale.map(design.widen(ladder.widen_fraction));
        for &magnification in &ladder.widened_magnifications {
            if let Some(hit) = self.attempt(wide, magnification, &accept)? {
                trace!(x = design.x, y = design.y, "recovered with widened rect");
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    fn attempt(
        &self,
        rect: Rect,
        magnification: f32,
        accept: &impl Fn(&Payload) -> bool,
    ) -> Result<Option<RegionHit>, SheetError> {
        self.cancel.check()?;

        let Some(scratch) = self.resample(rect, magnification) else {
            return Ok(None);
        };

        let gray = imageops::grayscale(&scratch);
        if let Some(hit) = self.pick(read_luma(self.reader, &gray, self.config.try_inverted), accept) {
            trace!(magnification, "direct read");
            return Ok(Some(hit));
        }

        if self.config.binarize {
            let binary = binarize(&scratch, self.config.binarize_threshold);
            if let Some(hit) = self.pick(read_luma(self.reader, &binary, self.config.try_inverted), accept) {
                trace!(magnification, "binarized read");
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    /// Crop `rect` and resize it into a fresh buffer.
    fn resample(&self, rect: Rect, magnification: f32) -> Option<RgbaImage> {
        let px = rect.to_pixels(self.img.width(), self.img.height())?;
        let crop = imageops::crop_imm(self.img, px.x, px.y, px.w, px.h).to_image();
        if (magnification - 1.0).abs() < f32::EPSILON {
            return Some(crop);
        }

        let limit = self.config.max_scratch_side.max(1) as f32;
        let longest = px.w.max(px.h) as f32;
        let factor = magnification.min(limit / longest);
        let w = (px.w as f32 * factor).round().max(1.0) as u32;
        let h = (px.h as f32 * factor).round().max(1.0) as u32;
        Some(imageops::resize(&crop, w, h, self.config.resample.into()))
    }

    fn pick(&self, found: Vec<String>, accept: &impl Fn(&Payload) -> bool) -> Option<RegionHit> {
        found.into_iter().find_map(|text| {
            let payload = Payload::classify(&text);
            if accept(&payload) {
                Some(RegionHit { text, payload })
            } else {
                trace!(len = text.len(), "rejected payload");
                None
            }
        })
    }
}

/// Force every pixel to black or white by comparing the mean of its RGB
/// channels with `threshold`.
#[must_use]
pub fn binarize(img: &RgbaImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, _] = img.get_pixel(x, y).0;
        let mean = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        if mean >= u16::from(threshold) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
