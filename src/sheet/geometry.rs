//! Sheet geometry in design space.
//!
//! Every region of a sheet is defined on the canonical 2150×2048 canvas.
//! The compositor draws at exactly that size. The decoder measures the
//! candidate image, derives `scale_x`/`scale_y`, and maps the same design
//! rectangles onto it. Absolute pixel positions are never stored.
//!
//! ```text
//! +--------------------------------------------------------------+
//! | leader (upper half of portrait) |   caption    |   main QR   |  upper band
//! +--------------------------------------------------------------+
//! |  10 × 5 card grid, centered                                  |  lower band
//! +--------------------------------------------------------------+
//! ```

use serde::{Deserialize, Serialize};

/// Canonical sheet width in pixels.
pub const DESIGN_WIDTH: u32 = 2150;

/// Canonical sheet height in pixels.
pub const DESIGN_HEIGHT: u32 = 2048;

/// Outer margin and band spacing.
pub const MARGIN: f32 = 30.0;

/// Height of the upper band (leader, caption, main QR).
pub const UPPER_HEIGHT: f32 = 520.0;

/// Width / height of a full card portrait.
pub const PORTRAIT_ASPECT: f32 = 600.0 / 838.0;

/// Width / height of the upper half of a portrait, as drawn in the leader region.
pub const LEADER_CROP_ASPECT: f32 = PORTRAIT_ASPECT * 2.0;

/// Side of the main QR square.
pub const MAIN_QR_SIZE: f32 = 480.0;

/// Caption backdrop height.
pub const CAPTION_HEIGHT: f32 = 160.0;

pub const GRID_COLUMNS: usize = 10;
pub const GRID_ROWS: usize = 5;
pub const CELL_WIDTH: f32 = 200.0;
pub const CELL_HEIGHT: f32 = 280.0;
pub const CELL_GAP: f32 = 8.0;

/// Cell QR position inside a card, as fractions of the card rectangle.
///
/// The square's side is `CELL_QR_SIDE × card width`. Both the placeholder
/// renderer and the decoder use these numbers.
pub const CELL_QR_X: f32 = 0.22;
pub const CELL_QR_Y: f32 = 0.14;
pub const CELL_QR_SIDE: f32 = 0.56;

/// Axis-aligned rectangle in floating-point pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Integer pixel rectangle, clamped to an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Sub-rectangle given in fractions of this one.
    #[must_use]
    pub fn fraction(&self, fx: f32, fy: f32, fw: f32, fh: f32) -> Rect {
        Rect::new(self.x + fx * self.w, self.y + fy * self.h, fw * self.w, fh * self.h)
    }

    /// Map from design space onto an image scaled by `(sx, sy)`.
    #[must_use]
    pub fn scale(&self, sx: f32, sy: f32) -> Rect {
        Rect::new(self.x * sx, self.y * sy, self.w * sx, self.h * sy)
    }

    /// Grow by `fraction` of the size on every side.
    #[must_use]
    pub fn widen(&self, fraction: f32) -> Rect {
        let dx = self.w * fraction;
        let dy = self.h * fraction;
        Rect::new(self.x - dx, self.y - dy, self.w + 2.0 * dx, self.h + 2.0 * dy)
    }

    /// Round outward to whole pixels and clamp to a `width × height` image.
    ///
    /// Returns `None` when nothing of the rectangle is inside the image.
    #[must_use]
    pub fn to_pixels(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x0 = self.x.floor().max(0.0);
        let y0 = self.y.floor().max(0.0);
        let x1 = self.right().ceil().min(width as f32);
        let y1 = self.bottom().ceil().min(height as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect {
            x: x0 as u32,
            y: y0 as u32,
            w: (x1 - x0) as u32,
            h: (y1 - y0) as u32,
        })
    }
}

/// Leader region: the upper half of the leader portrait.
#[must_use]
pub fn leader_rect() -> Rect {
    Rect::new(MARGIN, MARGIN, UPPER_HEIGHT * LEADER_CROP_ASPECT, UPPER_HEIGHT)
}

/// Card-shaped rectangle at the left of the leader region, used for a
/// blank leader's placeholder.
#[must_use]
pub fn leader_card_rect() -> Rect {
    Rect::new(MARGIN, MARGIN, UPPER_HEIGHT * PORTRAIT_ASPECT, UPPER_HEIGHT)
}

/// Main QR square at the right edge of the upper band.
#[must_use]
pub fn main_qr_rect() -> Rect {
    Rect::new(
        DESIGN_WIDTH as f32 - MARGIN - MAIN_QR_SIZE,
        MARGIN + (UPPER_HEIGHT - MAIN_QR_SIZE) / 2.0,
        MAIN_QR_SIZE,
        MAIN_QR_SIZE,
    )
}

/// Caption backdrop between the leader and the main QR.
#[must_use]
pub fn caption_rect() -> Rect {
    let left = leader_rect().right() + MARGIN;
    let right = main_qr_rect().x - MARGIN;
    Rect::new(left, MARGIN + (UPPER_HEIGHT - CAPTION_HEIGHT) / 2.0, right - left, CAPTION_HEIGHT)
}

/// Top-left corner of the grid.
#[must_use]
pub fn grid_origin() -> (f32, f32) {
    let grid_width = GRID_COLUMNS as f32 * CELL_WIDTH + (GRID_COLUMNS - 1) as f32 * CELL_GAP;
    let x = (DESIGN_WIDTH as f32 - grid_width) / 2.0;
    let y = MARGIN + UPPER_HEIGHT + MARGIN;
    (x, y)
}

/// Rectangle of grid cell `index`, filled row-major.
#[must_use]
pub fn cell_rect(index: usize) -> Rect {
    let (x0, y0) = grid_origin();
    let col = (index % GRID_COLUMNS) as f32;
    let row = (index / GRID_COLUMNS) as f32;
    Rect::new(
        x0 + col * (CELL_WIDTH + CELL_GAP),
        y0 + row * (CELL_HEIGHT + CELL_GAP),
        CELL_WIDTH,
        CELL_HEIGHT,
    )
}

/// Number of grid cells.
#[must_use]
pub const fn cell_count() -> usize {
    GRID_COLUMNS * GRID_ROWS
}

/// QR square inside a card-shaped rectangle.
#[must_use]
pub fn card_qr_rect(card: Rect) -> Rect {
    let side = CELL_QR_SIDE * card.w;
    Rect::new(card.x + CELL_QR_X * card.w, card.y + CELL_QR_Y * card.h, side, side)
}
