//! Render collaborator seam.
//!
//! The pipeline never talks to a browser directly. A [`SessionFactory`]
//! opens one exclusive [`RenderSession`] per analysis; the session exposes
//! computed-style snapshots, a virtual pointer and the page's observed
//! resources. [`crate::webdriver`] provides the production implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::HeuristicConfig;
use crate::errors::BrandprobeError;
use crate::types::{PageSnapshot, PointProbe, ResourceEvent, ViewportSize};

/// Options for opening a render session
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub viewport: ViewportSize,
    /// Navigation timeout
    pub timeout: Duration,
    pub headless: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            viewport: ViewportSize::default(),
            timeout: Duration::from_millis(60_000),
            headless: true,
        }
    }
}

/// What the initial scan should capture
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub selector: String,
    pub ancestor_depth: usize,
    pub markup_max_chars: usize,
    pub max_descendants: usize,
}

impl From<&HeuristicConfig> for ScanRequest {
    fn from(config: &HeuristicConfig) -> Self {
        Self {
            selector: config.clickable_selector.clone(),
            ancestor_depth: config.ancestor_depth,
            markup_max_chars: config.markup_max_chars,
            max_descendants: config.max_descendants,
        }
    }
}

/// One exclusive page render. Calls are made strictly sequentially.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Load `url`, failing with [`BrandprobeError::Navigation`] on timeout or
    /// an unreachable host.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Snapshot every node matching the request's selector set, plus the
    /// page background and the actual viewport.
    async fn scan(&self, request: &ScanRequest) -> Result<PageSnapshot>;

    /// Move the virtual pointer to viewport coordinates
    async fn move_cursor(&self, x: f64, y: f64) -> Result<()>;

    /// Paint information for the element at a point, if any
    async fn probe_point(&self, x: f64, y: f64) -> Result<Option<PointProbe>>;

    /// Network resources observed since navigation
    async fn resource_events(&self) -> Result<Vec<ResourceEvent>>;

    /// Release the session. Must be safe to call after any failure.
    async fn close(&self) -> Result<()>;
}

/// Opens render sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: RenderSession + 'static;

    async fn open(&self, options: &RenderOptions) -> Result<Self::Session>;
}

/// Process-wide cap on simultaneously open render sessions.
///
/// Acquisition never waits: when every slot is taken the request fails
/// immediately with [`BrandprobeError::SessionUnavailable`].
#[derive(Clone)]
pub struct SessionLimiter {
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl SessionLimiter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn try_acquire(&self) -> Result<OwnedSemaphorePermit, BrandprobeError> {
        self.slots.clone().try_acquire_owned().map_err(|_| {
            BrandprobeError::SessionUnavailable(format!(
                "all {} render sessions are in use",
                self.capacity
            ))
        })
    }

    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}

impl Default for SessionLimiter {
    fn default() -> Self {
        Self::new(4)
    }
}
