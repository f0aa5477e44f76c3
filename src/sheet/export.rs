//! Sheet export: resolve cards, fetch portraits, compose, encode PNG.
//!
//! Portrait fetches run one after another with a fixed timeout. A failed
//! or timed-out fetch just leaves that region empty.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbaImage};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::compose::{Compositor, GridCell, LeaderSlot, SheetContent};
use crate::cards::{CardRecord, Catalog};
use crate::deck::DeckSession;
use crate::error::SheetError;

/// Where portrait bytes come from.
#[async_trait]
pub trait PortraitSource: Send + Sync {
    /// Fetch a portrait. Any failure is `None`.
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

/// Portraits over HTTP(S).
#[derive(Clone, Debug)]
pub struct HttpPortraitSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPortraitSource {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl PortraitSource for HttpPortraitSource {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let request = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            response.bytes().await
        };
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(bytes)) => Some(bytes.to_vec()),
            Ok(Err(e)) => {
                warn!(url, error = %e, "portrait fetch failed");
                None
            }
            Err(_) => {
                warn!(url, timeout_ms = self.timeout.as_millis() as u64, "portrait fetch timed out");
                None
            }
        }
    }
}

/// Source that never has a portrait (offline export).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPortraits;

#[async_trait]
impl PortraitSource for NoPortraits {
    async fn fetch(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Inputs of one export, with every card already resolved.
#[derive(Clone, Debug, Default)]
pub struct ExportRequest {
    pub leader: Option<CardRecord>,
    pub main_payload: String,
    pub caption: String,
    /// Cards in deck order, one per copy.
    pub cards: Vec<CardRecord>,
    pub theme: Vec<[u8; 3]>,
}

impl ExportRequest {
    /// Build a request from a session.
    ///
    /// Returns `None` until the session has a leader. Ids that neither the
    /// session nor the catalog know are skipped. The caption defaults to
    /// the deck name, then the leader's name; the theme follows the
    /// leader's colors.
    #[must_use]
    pub fn from_session(session: &DeckSession, catalog: &impl Catalog) -> Option<Self> {
        let deck = session.deck()?;
        let main_payload = session.sheet_text(catalog)?;
        let leader = session.resolve(&deck.leader, catalog).cloned();

        let cards = deck
            .grid_ids(catalog)
            .iter()
            .filter_map(|id| {
                let card = session.resolve(id, catalog).cloned();
                if card.is_none() {
                    debug!(id = %id, "skipping unknown card");
                }
                card
            })
            .collect();

        let caption = deck
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| leader.as_ref().map(|l| l.name.clone()))
            .unwrap_or_default();
        let theme = leader
            .as_ref()
            .map(|l| l.colors.iter().map(|c| c.rgb()).collect())
            .unwrap_or_default();

        Some(Self {
            leader,
            main_payload,
            caption,
            cards,
            theme,
        })
    }
}

/// A composed sheet.
#[derive(Clone, Debug)]
pub struct ExportedSheet {
    pub image: RgbaImage,
}

impl ExportedSheet {
    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, SheetError> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(self.image.clone())
            .write_to(&mut out, ImageFormat::Png)
            .map_err(SheetError::ImageEncode)?;
        Ok(out.into_inner())
    }
}

/// Fetches portraits and composes sheets.
#[derive(Clone)]
pub struct SheetExporter {
    compositor: Compositor,
    source: Arc<dyn PortraitSource>,
}

impl SheetExporter {
    #[must_use]
    pub fn new(compositor: Compositor, source: Arc<dyn PortraitSource>) -> Self {
        Self { compositor, source }
    }

    /// Compose a sheet for `request`.
    pub async fn export(&self, request: &ExportRequest) -> ExportedSheet {
        let mut portraits: FxHashMap<String, Option<RgbaImage>> = FxHashMap::default();
        let urls = request
            .leader
            .iter()
            .chain(request.cards.iter())
            .filter_map(|c| c.portrait.clone());
        for url in urls {
            if portraits.contains_key(&url) {
                continue;
            }
            let image = self.load_portrait(&url).await;
            portraits.insert(url, image);
        }
        let portrait_for = |card: &CardRecord| card.portrait.as_ref().and_then(|u| portraits.get(u).cloned().flatten());

        let content = SheetContent {
            leader: LeaderSlot {
                portrait: request.leader.as_ref().and_then(portrait_for),
                card: request.leader.clone(),
            },
            main_payload: request.main_payload.clone(),
            caption: request.caption.clone(),
            cells: request
                .cards
                .iter()
                .map(|card| GridCell {
                    portrait: portrait_for(card),
                    card: card.clone(),
                })
                .collect(),
            theme: request.theme.clone(),
        };

        ExportedSheet {
            image: self.compositor.compose(&content),
        }
    }

    async fn load_portrait(&self, url: &str) -> Option<RgbaImage> {
        let bytes = self.source.fetch(url).await?;
        match image::load_from_memory(&bytes) {
            Ok(image) => Some(image.to_rgba8()),
            Err(e) => {
                warn!(url, error = %e, "portrait is not a readable image");
                None
            }
        }
    }
}

impl std::fmt::Debug for SheetExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetExporter")
            .field("compositor", &self.compositor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::cards::{CardCatalog, CardColor, CardType};
    use crate::sheet::geometry::cell_rect;
    use crate::sheet::qr::QrcodeEncoder;

    struct CountingSource {
        png: Vec<u8>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PortraitSource for CountingSource {
        async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (url != "broken").then(|| self.png.clone())
        }
    }

    fn png(color: [u8; 4]) -> Vec<u8> {
        let sheet = ExportedSheet {
            image: RgbaImage::from_pixel(60, 84, image::Rgba(color)),
        };
        sheet.to_png().unwrap()
    }

    fn catalog() -> CardCatalog {
        [
            CardRecord::new("OP01-001", "Zoro", CardType::Leader)
                .with_colors([CardColor::Red])
                .with_portrait("leader"),
            CardRecord::new("OP01-002", "Law", CardType::Character)
                .with_cost(4)
                .with_portrait("law"),
            CardRecord::new("OP01-003", "Luffy", CardType::Character)
                .with_cost(2)
                .with_portrait("broken"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_request_from_session() {
        let catalog = catalog();
        let mut session = DeckSession::new();
        assert!(ExportRequest::from_session(&session, &catalog).is_none());

        session.set_leader("OP01-001");
        session.add_card("OP01-002");
        session.add_card("OP01-003");
        session.add_card("OP99-999");
        let request = ExportRequest::from_session(&session, &catalog).unwrap();

        assert_eq!(request.caption, "Zoro");
        assert_eq!(request.theme, vec![CardColor::Red.rgb()]);
        let ids: Vec<&str> = request.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["OP01-003", "OP01-002"]);
        assert!(request.main_payload.starts_with("1xOP01-001\n"));
    }

    #[tokio::test]
    async fn test_export_fetches_each_url_once() {
        let catalog = catalog();
        let mut session = DeckSession::new();
        session.set_leader("OP01-001");
        for _ in 0..4 {
            session.add_card("OP01-002");
        }
        session.add_card("OP01-003");
        let request = ExportRequest::from_session(&session, &catalog).unwrap();

        let source = Arc::new(CountingSource {
            png: png([5, 150, 5, 255]),
            calls: AtomicUsize::new(0),
        });
        let exporter = SheetExporter::new(Compositor::new(Arc::new(QrcodeEncoder)), source.clone());
        let sheet = exporter.export(&request).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        // cell 0 is the broken Luffy portrait, cell 1 a Law photo
        let photo = cell_rect(1);
        assert_eq!(*sheet.image.get_pixel(photo.x as u32 + 100, photo.y as u32 + 140), image::Rgba([5, 150, 5, 255]));
    }

    #[tokio::test]
    async fn test_export_without_portraits_completes() {
        let request = ExportRequest {
            leader: Some(CardRecord::new("OP01-001", "Zoro", CardType::Leader).with_portrait("leader")),
            main_payload: "1xOP01-001".into(),
            ..ExportRequest::default()
        };
        let exporter = SheetExporter::new(Compositor::new(Arc::new(QrcodeEncoder)), Arc::new(NoPortraits));
        let sheet = exporter.export(&request).await;
        assert_eq!(sheet.image.dimensions(), (2150, 2048));
        let png = sheet.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
