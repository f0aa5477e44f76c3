//! Placeholder artwork for cards without a portrait.
//!
//! Every element sits at a fixed fraction of the card rectangle, so the
//! same card looks the same in a 200 px grid cell and in the leader slot.
//! The embedded QR square is placed by `geometry::card_qr_rect`, which the
//! decoder uses to find it again.
//!
//! ```text
//! +----------------------+
//! |(3)        5000 Slash |   cost badge, power / attribute
//! |+      +------+       |
//! |1      |  QR  |       |   counter (rotated, only if > 0)
//! |0      +------+       |
//! |0  +--------------+   |
//! |   | effect text  |   |
//! |   +--------------+   |
//! |   trigger            |
//! |======================|
//! |  EVENT / name / feat |   bottom color bar
//! |ID                    |
//! +----------------------+
//! ```

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tracing::trace;

use super::geometry::{card_qr_rect, Rect};
use super::paint::{self, rgba, Axis, Typeface, BLACK, WHITE};
use super::qr::{draw_qr, EcLevel, QrEncoder};
use crate::cards::{codec, CardRecord};

/// Background used when a card has no colors.
const NEUTRAL: [u8; 3] = [150, 150, 150];

/// Quiet-zone modules around a cell QR.
pub const CELL_QR_QUIET: usize = 3;

const BADGE_CX: f32 = 0.13;
const BADGE_CY: f32 = 0.09;
const BADGE_R: f32 = 0.10;
const POWER_Y: f32 = 0.025;
const POWER_PX: f32 = 0.075;
const ATTRIBUTE_Y: f32 = 0.09;
const ATTRIBUTE_PX: f32 = 0.035;
const COUNTER_X: f32 = 0.02;
const COUNTER_Y: f32 = 0.22;
const COUNTER_PX: f32 = 0.045;
const PANEL: (f32, f32, f32, f32) = (0.06, 0.58, 0.88, 0.21);
const PANEL_PX: f32 = 0.036;
const TRIGGER_Y: f32 = 0.805;
const TRIGGER_PX: f32 = 0.034;
const BAR_Y: f32 = 0.855;
const TYPE_Y: f32 = 0.858;
const TYPE_PX: f32 = 0.024;
const NAME_Y: f32 = 0.882;
const NAME_PX: f32 = 0.042;
const NAME_MIN_PX: f32 = 0.022;
const FEATURES_Y: f32 = 0.925;
const FEATURES_PX: f32 = 0.022;
const ID_Y: f32 = 0.972;
const ID_PX: f32 = 0.02;

/// Ink that reads on the card's primary color: black on light colors,
/// white on dark ones (luma threshold 0.5).
#[must_use]
pub fn ink_for(card: &CardRecord) -> Rgba<u8> {
    match card.primary_color() {
        Some(color) if color.luminance() <= 0.5 => WHITE,
        _ => BLACK,
    }
}

/// Draws blank cards.
#[derive(Clone)]
pub struct PlaceholderRenderer {
    face: Option<Typeface>,
    encoder: Arc<dyn QrEncoder>,
    ec_level: EcLevel,
}

impl PlaceholderRenderer {
    #[must_use]
    pub fn new(encoder: Arc<dyn QrEncoder>) -> Self {
        Self {
            face: None,
            encoder,
            ec_level: EcLevel::Low,
        }
    }

    #[must_use]
    pub fn with_face(mut self, face: Option<Typeface>) -> Self {
        self.face = face;
        self
    }

    #[must_use]
    pub fn with_ec_level(mut self, level: EcLevel) -> Self {
        self.ec_level = level;
        self
    }

    /// Draw `card` into `rect`, including its QR payload.
    ///
    /// Returns whether the QR was embedded; a payload too long for a QR
    /// code leaves the square empty.
    pub fn render(&self, img: &mut RgbaImage, card: &CardRecord, rect: Rect) -> bool {
        let stops: Vec<[u8; 3]> = if card.colors.is_empty() {
            vec![NEUTRAL]
        } else {
            card.colors.iter().map(|c| c.rgb()).collect()
        };
        paint::fill_gradient(img, rect, &stops, Axis::Diagonal);

        let ink = ink_for(card);
        let bar_color = card.primary_color().map_or(NEUTRAL, |c| c.rgb());

        let badge_r = BADGE_R * rect.w;
        let (badge_x, badge_y) = (rect.x + BADGE_CX * rect.w, rect.y + BADGE_CY * rect.h);
        let badge_value = if card.is_leader() { Some(card.life) } else { Some(card.cost).filter(|c| *c >= 0) };
        if badge_value.is_some() {
            paint::fill_circle(img, badge_x, badge_y, badge_r, rgba([30, 30, 34], 255));
        }

        paint::blend_rounded_rect(
            img,
            rect.fraction(PANEL.0, PANEL.1, PANEL.2, PANEL.3),
            0.03 * rect.w,
            Rgba([255, 255, 255, 210]),
        );
        paint::fill_rect(img, rect.fraction(0.0, BAR_Y, 1.0, 1.0 - BAR_Y), rgba(bar_color, 255));

        let payload = codec::encode(card);
        let embedded = match self.encoder.encode(&payload, self.ec_level) {
            Some(matrix) => {
                draw_qr(img, &matrix, card_qr_rect(rect), CELL_QR_QUIET);
                true
            }
            None => {
                trace!(id = %card.id, len = payload.len(), "blank card payload too long for cell QR");
                false
            }
        };

        if let Some(face) = &self.face {
            draw_labels(img, face, card, rect, ink, badge_value);
        }
        embedded
    }
}

fn draw_labels(
    img: &mut RgbaImage,
    face: &Typeface,
    card: &CardRecord,
    rect: Rect,
    ink: Rgba<u8>,
    badge_value: Option<i32>,
) {
    let h = rect.h;
    let w = rect.w;

    if let Some(value) = badge_value {
        let badge = Rect::new(
            rect.x + (BADGE_CX - BADGE_R) * w,
            rect.y + BADGE_CY * h - BADGE_R * w,
            2.0 * BADGE_R * w,
            2.0 * BADGE_R * w,
        );
        let px = BADGE_R * w * 1.2;
        let (_, th) = paint::measure(face, px, &value.to_string());
        paint::draw_text_centered(img, face, px, badge, badge.y + (badge.h - th as f32) / 2.0, WHITE, &value.to_string());
    }

    let right = rect.right() - 0.04 * w;
    if card.power != 0 || card.is_leader() {
        let power = card.power.to_string();
        let (pw, _) = paint::measure(face, POWER_PX * h, &power);
        paint::draw_text_bold(img, face, POWER_PX * h, right - pw as f32 - 1.0, rect.y + POWER_Y * h, ink, &power);
    }
    if !card.attribute.is_empty() {
        paint::draw_text_right(img, face, ATTRIBUTE_PX * h, right, rect.y + ATTRIBUTE_Y * h, ink, &card.attribute);
    }

    if card.counter > 0 {
        paint::draw_text_rotated(
            img,
            face,
            COUNTER_PX * h,
            rect.x + COUNTER_X * w,
            rect.y + COUNTER_Y * h,
            ink,
            &format!("+{}", card.counter),
        );
    }

    let panel = rect.fraction(PANEL.0, PANEL.1, PANEL.2, PANEL.3);
    let text_px = PANEL_PX * h;
    let line_h = text_px * 1.15;
    let budget = ((panel.h - 0.02 * h) / line_h).floor().max(1.0) as usize;
    let lines = paint::wrap(face, text_px, &card.text, panel.w - 0.04 * w, budget);
    for (i, line) in lines.iter().enumerate() {
        paint::draw_text(img, face, text_px, panel.x + 0.02 * w, panel.y + 0.01 * h + i as f32 * line_h, BLACK, line);
    }

    if !card.trigger.is_empty() {
        let trigger = paint::ellipsize(face, TRIGGER_PX * h, &card.trigger.replace('\n', " "), 0.88 * w);
        paint::draw_text(img, face, TRIGGER_PX * h, rect.x + 0.06 * w, rect.y + TRIGGER_Y * h, ink, &trigger);
    }

    let inner = rect.fraction(0.04, 0.0, 0.92, 1.0);
    paint::draw_text_centered(img, face, TYPE_PX * h, inner, rect.y + TYPE_Y * h, ink, card.card_type.label());

    let (name_px, name) = paint::fit_line(face, &card.name, inner.w, NAME_PX * h, NAME_MIN_PX * h);
    paint::draw_text_centered(img, face, name_px, inner, rect.y + NAME_Y * h, ink, &name);

    let features = card.features.join("/");
    let feature_lines = paint::wrap(face, FEATURES_PX * h, &features, inner.w, 2);
    for (i, line) in feature_lines.iter().enumerate() {
        let y = rect.y + FEATURES_Y * h + i as f32 * FEATURES_PX * h * 1.1;
        paint::draw_text_centered(img, face, FEATURES_PX * h, inner, y, ink, line);
    }

    paint::draw_text(img, face, ID_PX * h, rect.x + 0.03 * w, rect.y + ID_Y * h, ink, &card.id);
}

impl std::fmt::Debug for PlaceholderRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderRenderer")
            .field("face", &self.face.is_some())
            .field("ec_level", &self.ec_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardColor, CardType};
    use crate::sheet::qr::{QrReader, QrcodeEncoder, RqrrReader};

    fn renderer() -> PlaceholderRenderer {
        PlaceholderRenderer::new(Arc::new(QrcodeEncoder))
    }

    #[test]
    fn test_ink_follows_primary_luminance() {
        let yellow = CardRecord::new("a", "a", CardType::Event).with_colors([CardColor::Yellow, CardColor::Black]);
        assert_eq!(ink_for(&yellow), BLACK);
        let black = CardRecord::new("b", "b", CardType::Event).with_colors([CardColor::Black]);
        assert_eq!(ink_for(&black), WHITE);
        let none = CardRecord::new("c", "c", CardType::Event);
        assert_eq!(ink_for(&none), BLACK);
    }

    #[test]
    fn test_rendered_qr_decodes_to_same_card() {
        let card = CardRecord::new("BLANK-0001", "Foo", CardType::Event)
            .with_colors([CardColor::Red])
            .with_cost(3)
            .with_text("line1\nline2");
        let rect = Rect::new(0.0, 0.0, 400.0, 560.0);
        let mut img = RgbaImage::new(400, 560);
        assert!(renderer().render(&mut img, &card, rect));

        let qr = card_qr_rect(rect).to_pixels(400, 560).unwrap();
        let crop = image::imageops::crop_imm(&img, qr.x, qr.y, qr.w, qr.h).to_image();
        let gray = image::DynamicImage::ImageRgba8(crop).to_luma8();
        let payloads = RqrrReader.read(&gray);
        assert_eq!(payloads.len(), 1);
        assert_eq!(codec::decode(&payloads[0]), Some(card));
    }

    #[test]
    fn test_background_and_bar_use_colors() {
        let card = CardRecord::new("BLANK-0002", "Bar", CardType::Stage).with_colors([CardColor::Green]);
        let mut img = RgbaImage::new(200, 280);
        renderer().render(&mut img, &card, Rect::new(0.0, 0.0, 200.0, 280.0));

        let green = rgba(CardColor::Green.rgb(), 255);
        assert_eq!(*img.get_pixel(199, 2), green);
        assert_eq!(*img.get_pixel(100, 275), green);
    }

    #[test]
    fn test_render_stays_inside_rect() {
        let card = CardRecord::new("BLANK-0003", "Edge", CardType::Character).with_colors([CardColor::Blue]);
        let mut img = RgbaImage::from_pixel(300, 400, Rgba([1, 2, 3, 255]));
        renderer().render(&mut img, &card, Rect::new(50.0, 60.0, 200.0, 280.0));
        assert_eq!(*img.get_pixel(49, 200), Rgba([1, 2, 3, 255]));
        assert_eq!(*img.get_pixel(250, 200), Rgba([1, 2, 3, 255]));
        assert_eq!(*img.get_pixel(100, 59), Rgba([1, 2, 3, 255]));
        assert_eq!(*img.get_pixel(100, 340), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_oversized_payload_skips_qr() {
        let card = CardRecord::new("BLANK-0004", "Long", CardType::Event).with_text("x".repeat(4000));
        let mut img = RgbaImage::new(200, 280);
        assert!(!renderer().render(&mut img, &card, Rect::new(0.0, 0.0, 200.0, 280.0)));
    }
}
