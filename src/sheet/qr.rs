//! QR primitives.
//!
//! Encoding and decoding are delegated to `qrcode` and `rqrr` behind two
//! small traits, so the compositor and the decoder can be driven by other
//! implementations (or fakes in tests). The module matrix is painted into
//! the sheet here rather than through the encoder crate's own renderer,
//! which keeps module edges aligned to whatever rectangle the layout asks
//! for.

use image::{GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::paint::{fill_rect, BLACK, WHITE};

/// Error correction level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EcLevel {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::Low => qrcode::EcLevel::L,
            EcLevel::Medium => qrcode::EcLevel::M,
            EcLevel::Quartile => qrcode::EcLevel::Q,
            EcLevel::High => qrcode::EcLevel::H,
        }
    }
}

/// Square module matrix, row-major, `true` = dark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Build from rows. Returns `None` unless `modules.len() == width²`.
    #[must_use]
    pub fn new(width: usize, modules: Vec<bool>) -> Option<Self> {
        (width > 0 && modules.len() == width * width).then_some(Self { width, modules })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }
}

/// Text → module matrix.
pub trait QrEncoder: Send + Sync {
    /// `None` when the text does not fit any QR version at this level.
    fn encode(&self, text: &str, level: EcLevel) -> Option<QrMatrix>;
}

/// Grayscale raster → payloads.
pub trait QrReader: Send + Sync {
    /// Every payload found in the image, in detection order.
    fn read(&self, gray: &GrayImage) -> Vec<String>;
}

/// Read `gray`; if nothing is found and `both_polarities` is set, read
/// the inverted image too.
pub fn read_luma(reader: &dyn QrReader, gray: &GrayImage, both_polarities: bool) -> Vec<String> {
    let found = reader.read(gray);
    if !found.is_empty() || !both_polarities {
        return found;
    }
    let mut inverted = gray.clone();
    image::imageops::invert(&mut inverted);
    reader.read(&inverted)
}

/// `QrEncoder` backed by the `qrcode` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrcodeEncoder;

impl QrEncoder for QrcodeEncoder {
    fn encode(&self, text: &str, level: EcLevel) -> Option<QrMatrix> {
        let code = qrcode::QrCode::with_error_correction_level(text.as_bytes(), level.into()).ok()?;
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        QrMatrix::new(code.width(), modules)
    }
}

/// `QrReader` backed by the `rqrr` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct RqrrReader;

impl QrReader for RqrrReader {
    fn read(&self, gray: &GrayImage) -> Vec<String> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            gray.width() as usize,
            gray.height() as usize,
            |x, y| gray.get_pixel(x as u32, y as u32)[0],
        );
        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| grid.decode().ok().map(|(_, content)| content))
            .collect()
    }
}

/// Paint a QR square into `rect` with `quiet` light modules of margin.
///
/// Each destination pixel samples the module under its center, so the
/// code stays crisp at any rectangle size.
pub fn draw_qr(img: &mut RgbaImage, matrix: &QrMatrix, rect: Rect, quiet: usize) {
    fill_rect(img, rect, WHITE);
    let Some(px) = rect.to_pixels(img.width(), img.height()) else {
        return;
    };
    let span = (matrix.width() + 2 * quiet) as f32;
    let module_w = rect.w / span;
    let module_h = rect.h / span;

    for y in px.y..px.y + px.h {
        let my = ((y as f32 + 0.5 - rect.y) / module_h).floor() as isize - quiet as isize;
        if my < 0 || my as usize >= matrix.width() {
            continue;
        }
        for x in px.x..px.x + px.w {
            let mx = ((x as f32 + 0.5 - rect.x) / module_w).floor() as isize - quiet as isize;
            if mx < 0 || mx as usize >= matrix.width() {
                continue;
            }
            if matrix.is_dark(mx as usize, my as usize) {
                img.put_pixel(x, y, BLACK);
            }
        }
    }
}

/// Render a matrix alone, `scale` pixels per module, for tests and previews.
#[must_use]
pub fn matrix_to_luma(matrix: &QrMatrix, scale: u32, quiet: u32) -> GrayImage {
    let side = (matrix.width() as u32 + 2 * quiet) * scale;
    GrayImage::from_fn(side, side, |x, y| {
        let mx = (x / scale) as i64 - i64::from(quiet);
        let my = (y / scale) as i64 - i64::from(quiet);
        let inside = (0..matrix.width() as i64).contains(&mx) && (0..matrix.width() as i64).contains(&my);
        if inside && matrix.is_dark(mx as usize, my as usize) {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}
