//! Raster drawing helpers on `RgbaImage`.
//!
//! Shapes and glyphs come from `imageproc`; gradients, translucent panels
//! and text fitting are done here. Text needs a `Typeface`; callers skip
//! text elements when the sheet has none.

use std::path::Path;
use std::sync::Arc;

use ab_glyph::{FontVec, PxScale};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut, text_size};

use super::geometry::{PixelRect, Rect};
use crate::error::ConfigError;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Trailing mark for truncated text.
pub const ELLIPSIS: &str = "…";

/// Font used for every text element on a sheet.
#[derive(Clone)]
pub struct Typeface(Arc<FontVec>);

impl Typeface {
    /// Parse a TTF/OTF font.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        FontVec::try_from_vec(bytes).ok().map(|f| Self(Arc::new(f)))
    }

    /// Load a font file. Unparsable files are reported as `None`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_bytes(bytes))
    }

    fn font(&self) -> &FontVec {
        &self.0
    }
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Typeface(..)")
    }
}

/// `Rgba` from an RGB triple and alpha.
#[must_use]
pub fn rgba([r, g, b]: [u8; 3], a: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round().clamp(0.0, 255.0) as u8
}

fn mix(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// Color at position `t` in `0..=1` of evenly spaced stops.
#[must_use]
pub fn gradient_at(stops: &[[u8; 3]], t: f32) -> [u8; 3] {
    match stops {
        [] => [255, 255, 255],
        [only] => *only,
        _ => {
            let span = (stops.len() - 1) as f32;
            let pos = t.clamp(0.0, 1.0) * span;
            let i = (pos.floor() as usize).min(stops.len() - 2);
            mix(stops[i], stops[i + 1], pos - i as f32)
        }
    }
}

/// Gradient axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
    Diagonal,
}

/// Fill a rectangle with a gradient. One stop is a flat fill.
pub fn fill_gradient(img: &mut RgbaImage, rect: Rect, stops: &[[u8; 3]], axis: Axis) {
    let Some(px) = rect.to_pixels(img.width(), img.height()) else {
        return;
    };
    let w = px.w.max(2) as f32 - 1.0;
    let h = px.h.max(2) as f32 - 1.0;
    for y in px.y..px.y + px.h {
        for x in px.x..px.x + px.w {
            let dx = (x - px.x) as f32 / w;
            let dy = (y - px.y) as f32 / h;
            let t = match axis {
                Axis::Horizontal => dx,
                Axis::Vertical => dy,
                Axis::Diagonal => (dx + dy) / 2.0,
            };
            img.put_pixel(x, y, rgba(gradient_at(stops, t), 255));
        }
    }
}

/// Opaque rectangle fill.
pub fn fill_rect(img: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    if let Some(px) = rect.to_pixels(img.width(), img.height()) {
        fill_pixels(img, px, color);
    }
}

fn fill_pixels(img: &mut RgbaImage, px: PixelRect, color: Rgba<u8>) {
    for y in px.y..px.y + px.h {
        for x in px.x..px.x + px.w {
            img.put_pixel(x, y, color);
        }
    }
}

fn blend_pixel(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let a = f32::from(src[3]) / 255.0;
    for c in 0..3 {
        dst[c] = lerp(dst[c], src[c], a);
    }
    dst[3] = 255;
}

/// Alpha-blend a rectangle with rounded corners of `radius` pixels.
pub fn blend_rounded_rect(img: &mut RgbaImage, rect: Rect, radius: f32, color: Rgba<u8>) {
    let Some(px) = rect.to_pixels(img.width(), img.height()) else {
        return;
    };
    let r = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    for y in px.y..px.y + px.h {
        for x in px.x..px.x + px.w {
            let fx = x as f32 + 0.5;
            let fy = y as f32 + 0.5;
            let cx = fx.clamp(rect.x + r, rect.right() - r);
            let cy = fy.clamp(rect.y + r, rect.bottom() - r);
            if (fx - cx).powi(2) + (fy - cy).powi(2) > r * r {
                continue;
            }
            blend_pixel(img.get_pixel_mut(x, y), color);
        }
    }
}

/// Filled circle.
pub fn fill_circle(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    draw_filled_circle_mut(img, (cx.round() as i32, cy.round() as i32), radius.round() as i32, color);
}

/// Copy `src` into `rect`, cropping to the rectangle's aspect ratio first
/// (center crop, like CSS `object-fit: cover`).
pub fn draw_cover(img: &mut RgbaImage, src: &RgbaImage, rect: Rect) {
    let Some(px) = rect.to_pixels(img.width(), img.height()) else {
        return;
    };
    if src.width() == 0 || src.height() == 0 {
        return;
    }
    let target = px.w as f32 / px.h as f32;
    let source = src.width() as f32 / src.height() as f32;
    let (cw, ch) = if source > target {
        ((src.height() as f32 * target).round().max(1.0) as u32, src.height())
    } else {
        (src.width(), (src.width() as f32 / target).round().max(1.0) as u32)
    };
    let cx = (src.width() - cw.min(src.width())) / 2;
    let cy = (src.height() - ch.min(src.height())) / 2;
    let cropped = imageops::crop_imm(src, cx, cy, cw, ch).to_image();
    let scaled = imageops::resize(&cropped, px.w, px.h, imageops::FilterType::Triangle);
    imageops::replace(img, &scaled, i64::from(px.x), i64::from(px.y));
}

/// Size of `text` at `px` pixels.
#[must_use]
pub fn measure(face: &Typeface, px: f32, text: &str) -> (u32, u32) {
    text_size(PxScale::from(px), face.font(), text)
}

/// Draw one line of text with its top-left corner at `(x, y)`.
pub fn draw_text(img: &mut RgbaImage, face: &Typeface, px: f32, x: f32, y: f32, color: Rgba<u8>, text: &str) {
    if text.is_empty() {
        return;
    }
    draw_text_mut(img, color, x.round() as i32, y.round() as i32, PxScale::from(px), face.font(), text);
}

/// Draw text twice, one pixel apart, for a heavier stroke.
pub fn draw_text_bold(img: &mut RgbaImage, face: &Typeface, px: f32, x: f32, y: f32, color: Rgba<u8>, text: &str) {
    draw_text(img, face, px, x, y, color, text);
    draw_text(img, face, px, x + 1.0, y, color, text);
}

/// Draw one line centered horizontally in `rect` at vertical offset `y`.
pub fn draw_text_centered(img: &mut RgbaImage, face: &Typeface, px: f32, rect: Rect, y: f32, color: Rgba<u8>, text: &str) {
    let (w, _) = measure(face, px, text);
    let x = rect.x + (rect.w - w as f32) / 2.0;
    draw_text(img, face, px, x.max(rect.x), y, color, text);
}

/// Draw text right-aligned so it ends at `right`.
pub fn draw_text_right(img: &mut RgbaImage, face: &Typeface, px: f32, right: f32, y: f32, color: Rgba<u8>, text: &str) {
    let (w, _) = measure(face, px, text);
    draw_text(img, face, px, right - w as f32, y, color, text);
}

/// Draw text rotated a quarter turn counter-clockwise, reading bottom-up,
/// with its bounding box's top-left corner at `(x, y)`.
pub fn draw_text_rotated(img: &mut RgbaImage, face: &Typeface, px: f32, x: f32, y: f32, color: Rgba<u8>, text: &str) {
    let (w, h) = measure(face, px, text);
    if w == 0 || h == 0 {
        return;
    }
    let mut strip = RgbaImage::from_pixel(w + 2, h + 2, Rgba([color[0], color[1], color[2], 0]));
    draw_text_mut(&mut strip, color, 1, 1, PxScale::from(px), face.font(), text);
    let rotated = imageops::rotate270(&strip);
    imageops::overlay(img, &rotated, x.round() as i64, y.round() as i64);
}

/// Shorten `text` with an ellipsis until it fits `max_width`.
#[must_use]
pub fn ellipsize(face: &Typeface, px: f32, text: &str, max_width: f32) -> String {
    if measure(face, px, text).0 as f32 <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + ELLIPSIS;
        if measure(face, px, &candidate).0 as f32 <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Shrink from `px` towards `min_px` until `text` fits, then ellipsize.
#[must_use]
pub fn fit_line(face: &Typeface, text: &str, max_width: f32, px: f32, min_px: f32) -> (f32, String) {
    let mut size = px;
    while size > min_px && measure(face, size, text).0 as f32 > max_width {
        size = (size - 1.0).max(min_px);
    }
    (size, ellipsize(face, size, text, max_width))
}

/// Break `text` into lines no wider than `max_width`.
///
/// Breaks at spaces when possible and between any two characters
/// otherwise (CJK text has no spaces). Explicit newlines are kept. When
/// more than `max_lines` lines are needed, the last kept line ends in an
/// ellipsis.
#[must_use]
pub fn wrap(face: &Typeface, px: f32, text: &str, max_width: f32, max_lines: usize) -> Vec<String> {
    if max_lines == 0 || text.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for ch in paragraph.chars() {
            let mut candidate = line.clone();
            candidate.push(ch);
            if line.is_empty() || measure(face, px, &candidate).0 as f32 <= max_width {
                line = candidate;
                continue;
            }
            match line.rfind(' ') {
                Some(i) if i > 0 => {
                    let tail = line[i + 1..].to_string();
                    line.truncate(i);
                    lines.push(std::mem::replace(&mut line, tail));
                }
                _ => lines.push(std::mem::take(&mut line)),
            }
            line.push(ch);
        }
        lines.push(line);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(face, px, &format!("{last}{ELLIPSIS}"), max_width);
        }
    }
    lines
}
