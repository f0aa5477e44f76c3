//! Sheet composition.
//!
//! `Compositor::compose` draws one canonical 2150×2048 raster from
//! already-resolved inputs (portraits fetched, cards sorted). Missing inputs
//! leave their region empty, so composition always completes.

use std::sync::Arc;

use image::{imageops, Rgba, RgbaImage};
use tracing::{info, warn};

use super::geometry::{
    caption_rect, card_qr_rect, cell_count, cell_rect, leader_card_rect, leader_rect, main_qr_rect, Rect,
    DESIGN_HEIGHT, DESIGN_WIDTH,
};
use super::paint::{self, Axis, Typeface, WHITE};
use super::placeholder::PlaceholderRenderer;
use super::qr::{draw_qr, EcLevel, QrEncoder};
use crate::cards::CardRecord;

/// Background when no theme colors are given.
pub const DEFAULT_THEME: [u8; 3] = [38, 40, 52];

/// Quiet-zone modules around the main QR.
pub const MAIN_QR_QUIET: usize = 4;

const CAPTION_BACKDROP: Rgba<u8> = Rgba([0, 0, 0, 120]);
const CAPTION_PX: f32 = 64.0;
const CAPTION_MIN_PX: f32 = 28.0;

/// What goes into the leader region.
#[derive(Clone, Debug, Default)]
pub struct LeaderSlot {
    pub card: Option<CardRecord>,
    pub portrait: Option<RgbaImage>,
}

/// One grid cell: a card and, for catalog cards, its fetched portrait.
#[derive(Clone, Debug)]
pub struct GridCell {
    pub card: CardRecord,
    pub portrait: Option<RgbaImage>,
}

impl GridCell {
    #[must_use]
    pub fn blank(card: CardRecord) -> Self {
        Self { card, portrait: None }
    }
}

/// Everything drawn on one sheet.
#[derive(Clone, Debug, Default)]
pub struct SheetContent {
    pub leader: LeaderSlot,
    /// Deck text plus markers, carried by the main QR.
    pub main_payload: String,
    pub caption: String,
    /// Cells in deck order. Only the first 50 are drawn.
    pub cells: Vec<GridCell>,
    pub theme: Vec<[u8; 3]>,
}

/// Counters from one composition, mostly for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComposeReport {
    pub main_qr: bool,
    pub photos: usize,
    pub placeholders: usize,
    pub cell_qrs: usize,
    pub empty_cells: usize,
}

/// Draws sheets.
#[derive(Clone)]
pub struct Compositor {
    encoder: Arc<dyn QrEncoder>,
    placeholder: PlaceholderRenderer,
    face: Option<Typeface>,
    main_ec: EcLevel,
}

impl Compositor {
    #[must_use]
    pub fn new(encoder: Arc<dyn QrEncoder>) -> Self {
        Self {
            placeholder: PlaceholderRenderer::new(encoder.clone()),
            encoder,
            face: None,
            main_ec: EcLevel::Medium,
        }
    }

    #[must_use]
    pub fn with_face(mut self, face: Option<Typeface>) -> Self {
        self.placeholder = self.placeholder.with_face(face.clone());
        self.face = face;
        self
    }

    #[must_use]
    pub fn with_main_ec(mut self, level: EcLevel) -> Self {
        self.main_ec = level;
        self
    }

    #[must_use]
    pub fn with_cell_ec(mut self, level: EcLevel) -> Self {
        self.placeholder = self.placeholder.with_ec_level(level);
        self
    }

    /// Compose a sheet.
    pub fn compose(&self, content: &SheetContent) -> RgbaImage {
        self.compose_with_report(content).0
    }

    /// Compose a sheet and report what was drawn.
    pub fn compose_with_report(&self, content: &SheetContent) -> (RgbaImage, ComposeReport) {
        let mut img = RgbaImage::new(DESIGN_WIDTH, DESIGN_HEIGHT);
        let mut report = ComposeReport::default();

        let theme: &[[u8; 3]] = if content.theme.is_empty() { &[DEFAULT_THEME] } else { &content.theme };
        let canvas = Rect::new(0.0, 0.0, DESIGN_WIDTH as f32, DESIGN_HEIGHT as f32);
        paint::fill_gradient(&mut img, canvas, theme, Axis::Horizontal);

        self.draw_leader(&mut img, &content.leader);
        report.main_qr = self.draw_main_qr(&mut img, &content.main_payload);
        self.draw_caption(&mut img, &content.caption);

        for (index, cell) in content.cells.iter().take(cell_count()).enumerate() {
            let rect = cell_rect(index);
            match (&cell.portrait, cell.card.is_blank()) {
                (Some(photo), _) => {
                    paint::draw_cover(&mut img, photo, rect);
                    report.photos += 1;
                }
                (None, true) => {
                    report.placeholders += 1;
                    if self.placeholder.render(&mut img, &cell.card, rect) {
                        report.cell_qrs += 1;
                    }
                }
                (None, false) => report.empty_cells += 1,
            }
        }

        if content.cells.len() > cell_count() {
            warn!(cards = content.cells.len(), "grid holds {} cards, rest dropped", cell_count());
        }
        info!(
            main_qr = report.main_qr,
            photos = report.photos,
            placeholders = report.placeholders,
            cell_qrs = report.cell_qrs,
            "composed sheet"
        );
        (img, report)
    }

    fn draw_leader(&self, img: &mut RgbaImage, leader: &LeaderSlot) {
        if let Some(portrait) = &leader.portrait {
            let upper = imageops::crop_imm(portrait, 0, 0, portrait.width(), (portrait.height() / 2).max(1)).to_image();
            paint::draw_cover(img, &upper, leader_rect());
            return;
        }
        match &leader.card {
            Some(card) if card.is_blank() => {
                self.placeholder.render(img, card, leader_card_rect());
            }
            _ => {}
        }
    }

    fn draw_main_qr(&self, img: &mut RgbaImage, payload: &str) -> bool {
        if payload.is_empty() {
            return false;
        }
        match self.encoder.encode(payload, self.main_ec) {
            Some(matrix) => {
                draw_qr(img, &matrix, main_qr_rect(), MAIN_QR_QUIET);
                true
            }
            None => {
                warn!(len = payload.len(), "deck text too long for main QR");
                false
            }
        }
    }

    fn draw_caption(&self, img: &mut RgbaImage, caption: &str) {
        let rect = caption_rect();
        paint::blend_rounded_rect(img, rect, 24.0, CAPTION_BACKDROP);

        let Some(face) = &self.face else {
            return;
        };
        let caption = caption.trim();
        if caption.is_empty() {
            return;
        }
        let inner = Rect::new(rect.x + 24.0, rect.y, rect.w - 48.0, rect.h);
        let (px, line) = paint::fit_line(face, caption, inner.w, CAPTION_PX, CAPTION_MIN_PX);
        let (_, th) = paint::measure(face, px, &line);
        let y = rect.y + (rect.h - th as f32) / 2.0;
        let (w, _) = paint::measure(face, px, &line);
        let x = inner.x + (inner.w - w as f32) / 2.0;
        paint::draw_text_bold(img, face, px, x, y, WHITE, &line);
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("placeholder", &self.placeholder)
            .field("main_ec", &self.main_ec)
            .finish_non_exhaustive()
    }
}

/// Cell QR rectangle of grid cell `index`, for callers that want to
/// inspect a composed sheet.
#[must_use]
pub fn cell_qr_rect(index: usize) -> Rect {
    card_qr_rect(cell_rect(index))
}
