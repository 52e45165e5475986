//! End-to-end brand analysis.
//!
//! render → scan → score/rank → hover sampling → fonts → (session closed)
//! → mood summary. The render session is owned by one request and is closed
//! on every path before the text-generation call is made.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, info, warn};

use crate::config::HeuristicConfig;
use crate::errors::BrandprobeError;
use crate::fonts::collect_font_urls;
use crate::hover::{HoverTiming, sample_all};
use crate::ranking::score_and_rank;
use crate::session::{RenderOptions, RenderSession, ScanRequest, SessionFactory, SessionLimiter};
use crate::summary::{TextGenerator, assemble, summarize};
use crate::target::{DEFAULT_SEARCH_URL, resolve_target};
use crate::types::{BrandReport, FinalButton};

/// Structural data gathered while the session is open
#[derive(Debug)]
struct Extraction {
    page_background: String,
    buttons: Vec<FinalButton>,
    fonts: Vec<String>,
}

/// An open session together with its limiter slot.
///
/// Dropping the guard without calling [`SessionGuard::release`] (the caller
/// cancelled or timed out `analyze`) closes the session on a background task.
struct SessionGuard<S: RenderSession + 'static> {
    session: Arc<S>,
    permit: Option<OwnedSemaphorePermit>,
    released: bool,
}

impl<S: RenderSession + 'static> SessionGuard<S> {
    fn new(session: S, permit: OwnedSemaphorePermit) -> Self {
        Self {
            session: Arc::new(session),
            permit: Some(permit),
            released: false,
        }
    }

    async fn release(mut self) {
        if let Err(e) = self.session.close().await {
            warn!("Failed to close render session: {:#}", e);
        }
        self.released = true;
    }
}

impl<S: RenderSession + 'static> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let session = self.session.clone();
        let permit = self.permit.take();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Analysis abandoned, closing render session in the background");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!("Failed to close abandoned render session: {:#}", e);
                    }
                    drop(permit);
                });
            }
            Err(_) => warn!("Render session dropped outside a runtime, not closed"),
        }
    }
}

pub struct Analyzer<F, G> {
    factory: F,
    generator: Option<G>,
    config: HeuristicConfig,
    render: RenderOptions,
    limiter: SessionLimiter,
    search_url: String,
}

impl<F, G> Analyzer<F, G>
where
    F: SessionFactory,
    G: TextGenerator,
{
    pub fn new(factory: F, config: HeuristicConfig) -> Self {
        Self {
            factory,
            generator: None,
            config,
            render: RenderOptions::default(),
            limiter: SessionLimiter::default(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }

    pub fn with_generator(mut self, generator: Option<G>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn with_limiter(mut self, limiter: SessionLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Analyze a URL, domain or brand name
    pub async fn analyze(&self, input: &str) -> Result<BrandReport, BrandprobeError> {
        let target = resolve_target(input, &self.search_url)?;
        let url = target.url().to_string();
        info!("Analyzing {}", url);

        let permit = self.limiter.try_acquire()?;

        let session = self.factory.open(&self.render).await.map_err(|e| {
            match BrandprobeError::from(e) {
                BrandprobeError::Other(e) => BrandprobeError::SessionUnavailable(format!("{:#}", e)),
                typed => typed,
            }
        })?;
        let guard = SessionGuard::new(session, permit);

        let extraction = self.extract(guard.session.as_ref(), &url).await;
        guard.release().await;

        let extraction = extraction?;

        let summary = assemble(
            &extraction.page_background,
            &extraction.buttons,
            self.config.summary_buttons,
        );
        let analysis = summarize(self.generator.as_ref(), &summary).await;

        Ok(BrandReport {
            url,
            page_background: extraction.page_background,
            fonts: extraction.fonts,
            buttons: extraction.buttons,
            analysis,
            analyzed_at: Utc::now(),
        })
    }

    async fn extract(
        &self,
        session: &F::Session,
        url: &str,
    ) -> Result<Extraction, BrandprobeError> {
        session.navigate(url).await.map_err(|e| match BrandprobeError::from(e) {
            BrandprobeError::Other(e) => BrandprobeError::Navigation(format!("{:#}", e)),
            typed => typed,
        })?;

        if self.config.hydration_wait_ms > 0 {
            debug!("Waiting {}ms for hydration", self.config.hydration_wait_ms);
            tokio::time::sleep(Duration::from_millis(self.config.hydration_wait_ms)).await;
        }

        let snapshot = session.scan(&ScanRequest::from(&self.config)).await?;
        info!(
            "Scanned {} clickable nodes ({}x{} viewport)",
            snapshot.nodes.len(),
            snapshot.viewport.width,
            snapshot.viewport.height
        );

        let ranked = score_and_rank(&snapshot, &self.config);
        if ranked.is_empty() {
            info!("No button candidates survived ranking");
        }

        let buttons = sample_all(session, ranked, HoverTiming::from_config(&self.config)).await;

        let fonts = match session.resource_events().await {
            Ok(events) => collect_font_urls(events),
            Err(e) => {
                warn!("Could not read resource events: {:#}", e);
                Vec::new()
            }
        };
        debug!("Found {} font URLs", fonts.len());

        Ok(Extraction {
            page_background: snapshot.background_color,
            buttons,
            fonts,
        })
    }
}
