//! Sheet decoder.
//!
//! Recovers the main deck text and every blank card from a candidate
//! image that may have been rescaled or recompressed since composition.
//! Regions are scanned in a fixed order:
//!
//! 1. the main QR, which must hold deck text (a blank card payload there
//!    is rejected and the ladder goes on);
//! 2. the leader region, which only accepts a blank card;
//! 3. every grid cell, which only accepts a blank card.
//!
//! A leader-type card from the leader region is kept apart as the sheet's
//! leader; leader-type cards from grid cells are ordinary blank cards.
//! A payload string seen once is not recorded again. Misses only shrink
//! the result; the only errors are unreadable bytes and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbaImage;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use super::classify::Payload;
use super::config::DecodeConfig;
use super::region::{RegionHit, RegionScanner};
use crate::cards::CardRecord;
use crate::error::SheetError;
use crate::sheet::compose::cell_qr_rect;
use crate::sheet::geometry::{card_qr_rect, cell_count, leader_card_rect, main_qr_rect};
use crate::sheet::qr::QrReader;

/// What a scan recovered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetScan {
    /// Main QR payload: deck text plus markers.
    pub deck_text: Option<String>,

    /// Blank leader read from the leader region.
    pub leader: Option<CardRecord>,

    /// De-duplicated blank cards from the grid, plus any non-leader card
    /// found in the leader region. Order is not meaningful.
    pub blank_cards: Vec<CardRecord>,
}

impl SheetScan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deck_text.is_none() && self.leader.is_none() && self.blank_cards.is_empty()
    }
}

/// Shared flag for abandoning a scan.
///
/// Clones observe the same flag. Once cancelled, the scan stops at its
/// next attempt and returns `SheetError::Cancelled` with nothing partial.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<(), SheetError> {
        if self.is_cancelled() {
            Err(SheetError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Decodes sheets.
#[derive(Clone)]
pub struct SheetDecoder {
    reader: Arc<dyn QrReader>,
    config: DecodeConfig,
}

impl SheetDecoder {
    #[must_use]
    pub fn new(reader: Arc<dyn QrReader>) -> Self {
        Self {
            reader,
            config: DecodeConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DecodeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Scan a decoded raster.
    pub fn decode(&self, img: &RgbaImage, cancel: &CancelToken) -> Result<SheetScan, SheetError> {
        let scanner = RegionScanner::new(img, self.reader.as_ref(), &self.config, cancel);
        let mut collector = Collector::default();

        let deck_text = match scanner.scan(main_qr_rect(), &self.config.main, Payload::is_deck)? {
            Some(RegionHit { text, .. }) => Some(text),
            None => {
                debug!(width = img.width(), height = img.height(), "main QR not recovered");
                None
            }
        };

        let mut leader = None;
        if self.config.scan_leader {
            let hit = scanner.scan(card_qr_rect(leader_card_rect()), &self.config.card, Payload::is_blank_card)?;
            leader = collector.push_leader(hit);
        }

        let mut misses = 0;
        for index in 0..cell_count() {
            match scanner.scan(cell_qr_rect(index), &self.config.card, Payload::is_blank_card)? {
                Some(hit) => collector.push(Some(hit)),
                None => misses += 1,
            }
        }

        info!(
            deck = deck_text.is_some(),
            blank_leader = leader.is_some(),
            blank_cards = collector.cards.len(),
            empty_cells = misses,
            "decoded sheet"
        );
        Ok(SheetScan {
            deck_text,
            leader,
            blank_cards: collector.cards,
        })
    }

    /// Scan encoded image bytes (PNG, JPEG or WebP).
    pub fn decode_bytes(&self, bytes: &[u8], cancel: &CancelToken) -> Result<SheetScan, SheetError> {
        let img = image::load_from_memory(bytes).map_err(SheetError::ImageDecode)?;
        self.decode(&img.to_rgba8(), cancel)
    }

    /// Scan on a blocking thread.
    pub async fn decode_async(&self, img: RgbaImage, cancel: CancelToken) -> Result<SheetScan, SheetError> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || decoder.decode(&img, &cancel))
            .await
            .map_err(|e| SheetError::Task(e.to_string()))?
    }

    /// Scan encoded image bytes on a blocking thread.
    pub async fn decode_bytes_async(&self, bytes: Vec<u8>, cancel: CancelToken) -> Result<SheetScan, SheetError> {
        let decoder = self.clone();
        tokio::task::spawn_blocking(move || decoder.decode_bytes(&bytes, &cancel))
            .await
            .map_err(|e| SheetError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for SheetDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetDecoder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Append-only, de-duplicated by payload string.
#[derive(Default)]
struct Collector {
    seen: FxHashSet<String>,
    cards: Vec<CardRecord>,
}

impl Collector {
    fn push(&mut self, hit: Option<RegionHit>) {
        let Some(RegionHit { text, payload: Payload::BlankCard(card) }) = hit else {
            return;
        };
        if self.seen.insert(text) {
            self.cards.push(card);
        }
    }

    /// Leader region hit: a leader-type card is returned, anything else
    /// joins the blank cards.
    fn push_leader(&mut self, hit: Option<RegionHit>) -> Option<CardRecord> {
        match hit {
            Some(RegionHit { text, payload: Payload::BlankCard(card) }) if card.is_leader() => {
                self.seen.insert(text);
                Some(card)
            }
            other => {
                self.push(other);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{codec, CardType};
    use crate::deck::import_scan;
    use crate::error::DeckTextError;
    use crate::sheet::compose::{Compositor, GridCell, SheetContent};
    use crate::sheet::qr::{QrcodeEncoder, RqrrReader};

    fn decoder() -> SheetDecoder {
        SheetDecoder::new(Arc::new(RqrrReader))
    }

    fn trick() -> CardRecord {
        CardRecord::new("BLANK-0002", "Trick", CardType::Event).with_cost(1)
    }

    #[test]
    fn test_blank_canvas_yields_nothing() {
        let img = RgbaImage::from_pixel(1075, 1024, image::Rgba([30, 30, 30, 255]));
        let scan = decoder()
            .with_config(DecodeConfig::default().with_binarize(false))
            .decode(&img, &CancelToken::new())
            .unwrap();
        assert!(scan.is_empty());
    }

    #[test]
    fn test_blank_payload_in_main_region_is_rejected() {
        let content = SheetContent {
            main_payload: codec::encode(&trick()),
            ..SheetContent::default()
        };
        let img = Compositor::new(Arc::new(QrcodeEncoder)).compose(&content);
        let scan = decoder().decode(&img, &CancelToken::new()).unwrap();
        assert_eq!(scan.deck_text, None);
        assert!(scan.blank_cards.is_empty());
    }

    #[test]
    fn test_duplicate_cells_recorded_once() {
        let content = SheetContent {
            main_payload: "1xOP01-001".into(),
            cells: vec![GridCell::blank(trick()), GridCell::blank(trick()), GridCell::blank(trick())],
            ..SheetContent::default()
        };
        let img = Compositor::new(Arc::new(QrcodeEncoder)).compose(&content);
        let scan = decoder().decode(&img, &CancelToken::new()).unwrap();

        assert_eq!(scan.deck_text.as_deref(), Some("1xOP01-001"));
        assert_eq!(scan.blank_cards, vec![trick()]);
    }

    #[test]
    fn test_named_deck_with_broken_leader_line_is_kept() {
        let content = SheetContent {
            main_payload: "# Deck\nOP01-001\n4xOP01-016".into(),
            ..SheetContent::default()
        };
        let img = Compositor::new(Arc::new(QrcodeEncoder)).compose(&content);
        let scan = decoder().decode(&img, &CancelToken::new()).unwrap();

        assert_eq!(scan.deck_text.as_deref(), Some("# Deck\nOP01-001\n4xOP01-016"));
        assert!(matches!(
            import_scan(&scan),
            Err(DeckTextError::MalformedLeaderLine { line }) if line == "OP01-001"
        ));
    }

    #[test]
    fn test_leader_type_card_in_grid_is_not_the_leader() {
        let stray = CardRecord::new("BLANK-0001", "Stray", CardType::Leader).with_life(4);
        let content = SheetContent {
            main_payload: "1xOP01-001\n1xBLANK-0001".into(),
            cells: vec![GridCell::blank(stray.clone())],
            ..SheetContent::default()
        };
        let img = Compositor::new(Arc::new(QrcodeEncoder)).compose(&content);
        let scan = decoder().decode(&img, &CancelToken::new()).unwrap();

        assert_eq!(scan.leader, None);
        assert_eq!(scan.blank_cards, vec![stray]);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.clone().cancel();
        let img = RgbaImage::new(215, 205);
        assert!(matches!(decoder().decode(&img, &cancel), Err(SheetError::Cancelled)));
    }

    #[test]
    fn test_unreadable_bytes() {
        let err = decoder().decode_bytes(b"not an image", &CancelToken::new()).unwrap_err();
        assert!(matches!(err, SheetError::ImageDecode(_)));
    }

    #[tokio::test]
    async fn test_decode_async() {
        let content = SheetContent {
            main_payload: "1xOP01-001\n2xOP01-016".into(),
            ..SheetContent::default()
        };
        let img = Compositor::new(Arc::new(QrcodeEncoder)).compose(&content);
        let scan = decoder().decode_async(img, CancelToken::new()).await.unwrap();
        assert_eq!(scan.deck_text.as_deref(), Some("1xOP01-001\n2xOP01-016"));
    }
}
