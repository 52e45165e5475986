// Common test utilities: an in-memory render session and page builders

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use brandprobe::errors::BrandprobeError;
use brandprobe::session::{RenderOptions, RenderSession, ScanRequest, SessionFactory};
use brandprobe::summary::TextGenerator;
use brandprobe::types::{
    BoundingBox, NodeSnapshot, PageSnapshot, PaintTree, PointProbe, ResourceEvent, ResourceKind,
    StyleRecord, ViewportSize,
};
use brandprobe::HeuristicConfig;

/// Heuristics with the fixed waits turned down so tests run fast
pub fn fast_config() -> HeuristicConfig {
    HeuristicConfig {
        hydration_wait_ms: 0,
        hover_settle_ms: 1,
        hover_probe_timeout_ms: 200,
        ..HeuristicConfig::default()
    }
}

pub fn style(bg: &str, color: &str) -> StyleRecord {
    StyleRecord {
        background_color: bg.to_string(),
        color: color.to_string(),
        border_width: "0px".to_string(),
        border_color: color.to_string(),
        border_radius: "6px".to_string(),
        font_family: "\"Inter\", sans-serif".to_string(),
        display: "inline-block".to_string(),
        visibility: "visible".to_string(),
        opacity: "1".to_string(),
    }
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> BoundingBox {
    BoundingBox {
        x,
        y,
        width,
        height,
    }
}

pub fn node(index: usize, tag: &str, text: &str, bounds: BoundingBox, bg: &str) -> NodeSnapshot {
    NodeSnapshot {
        index,
        tag: tag.to_string(),
        markup: format!("<{tag}>{text}</{tag}>"),
        text: text.to_string(),
        rect: bounds,
        paint: PaintTree {
            style: style(bg, "rgb(255, 255, 255)"),
            ..PaintTree::default()
        },
        ..NodeSnapshot::default()
    }
}

/// 1440x900 page on a white background
pub fn page(nodes: Vec<NodeSnapshot>) -> PageSnapshot {
    PageSnapshot {
        viewport: ViewportSize::default(),
        background_color: "rgb(255, 255, 255)".to_string(),
        nodes,
    }
}

/// How the fake page behaves
#[derive(Clone, Default)]
pub struct FakePage {
    pub snapshot: PageSnapshot,
    /// Hover paint per node index; nodes without an entry report their own paint
    pub hover: HashMap<usize, PaintTree>,
    /// Node indices whose hover probe fails
    pub failing_probes: Vec<usize>,
    /// Node indices whose hover probe never answers
    pub hanging_probes: Vec<usize>,
    pub resources: Vec<ResourceEvent>,
    pub navigation_error: Option<String>,
    pub navigation_delay: Option<Duration>,
    pub scan_error: Option<String>,
    pub open_error: Option<String>,
}

impl FakePage {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    fn node_at(&self, x: f64, y: f64) -> Option<&NodeSnapshot> {
        self.snapshot.nodes.iter().rev().find(|n| {
            x >= n.rect.x
                && x <= n.rect.x + n.rect.width
                && y >= n.rect.y
                && y <= n.rect.y + n.rect.height
        })
    }
}

/// Counters shared between a factory and every session it opened
#[derive(Default)]
pub struct Tally {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub calls: Mutex<Vec<String>>,
}

impl Tally {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct FakeSession {
    page: FakePage,
    tally: Arc<Tally>,
    pointer: Mutex<Option<(f64, f64)>>,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.tally.record(format!("navigate {}", url));
        if let Some(delay) = self.page.navigation_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(e) = &self.page.navigation_error {
            return Err(BrandprobeError::Navigation(e.clone()).into());
        }
        Ok(())
    }

    async fn scan(&self, request: &ScanRequest) -> Result<PageSnapshot> {
        self.tally.record(format!("scan {}", request.selector));
        if let Some(e) = &self.page.scan_error {
            anyhow::bail!("{}", e);
        }
        Ok(self.page.snapshot.clone())
    }

    async fn move_cursor(&self, x: f64, y: f64) -> Result<()> {
        self.tally.record(format!("move {:.0},{:.0}", x, y));
        *self.pointer.lock().unwrap() = Some((x, y));
        Ok(())
    }

    async fn probe_point(&self, x: f64, y: f64) -> Result<Option<PointProbe>> {
        self.tally.record(format!("probe {:.0},{:.0}", x, y));
        assert_eq!(
            *self.pointer.lock().unwrap(),
            Some((x, y)),
            "probe must follow a move to the same point"
        );

        let Some(node) = self.page.node_at(x, y) else {
            return Ok(None);
        };
        if self.page.hanging_probes.contains(&node.index) {
            std::future::pending::<()>().await;
        }
        if self.page.failing_probes.contains(&node.index) {
            anyhow::bail!("stale element reference");
        }

        let hit = self
            .page
            .hover
            .get(&node.index)
            .cloned()
            .unwrap_or_else(|| node.paint.clone());
        Ok(Some(PointProbe { hit, parent: None }))
    }

    async fn resource_events(&self) -> Result<Vec<ResourceEvent>> {
        self.tally.record("resources".to_string());
        Ok(self.page.resources.clone())
    }

    async fn close(&self) -> Result<()> {
        self.tally.record("close".to_string());
        self.tally.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeFactory {
    pub page: FakePage,
    pub tally: Arc<Tally>,
}

impl FakeFactory {
    pub fn new(page: FakePage) -> (Self, Arc<Tally>) {
        let tally = Arc::new(Tally::default());
        (
            Self {
                page,
                tally: tally.clone(),
            },
            tally,
        )
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    async fn open(&self, _options: &RenderOptions) -> Result<FakeSession> {
        if let Some(e) = &self.page.open_error {
            anyhow::bail!("{}", e);
        }
        self.tally.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            page: self.page.clone(),
            tally: self.tally.clone(),
            pointer: Mutex::new(None),
        })
    }
}

/// Text generator returning a fixed reply or error, counting calls
pub struct CannedGenerator {
    reply: Result<String, String>,
    pub calls: Arc<AtomicUsize>,
}

impl CannedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

pub fn font(url: &str) -> ResourceEvent {
    ResourceEvent {
        url: url.to_string(),
        kind: ResourceKind::Font,
    }
}
