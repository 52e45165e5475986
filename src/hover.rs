//! Hover state sampling.
//!
//! The virtual pointer is shared session state, so candidates are probed
//! strictly one after another: move, settle, sample. A failed probe only
//! degrades that candidate, whose hover style then equals its default.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::paint::resolve_hover_paint;
use crate::session::RenderSession;
use crate::types::{DefaultStyle, FinalButton, HoverStyle, Point, ScoredCandidate};

/// Timing for hover probes
#[derive(Debug, Clone, Copy)]
pub struct HoverTiming {
    /// Fixed wait after moving the pointer, for CSS transitions
    pub settle: Duration,
    /// Upper bound for one whole probe
    pub probe_timeout: Duration,
}

impl HoverTiming {
    pub fn from_config(config: &crate::config::HeuristicConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.hover_settle_ms),
            probe_timeout: Duration::from_millis(config.hover_probe_timeout_ms),
        }
    }
}

/// Sample the hover style at one point. `Ok(None)` means the probe ran but
/// found nothing painted.
pub async fn sample_hover<S>(
    session: &S,
    point: Point,
    timing: HoverTiming,
) -> Result<Option<HoverStyle>>
where
    S: RenderSession + ?Sized,
{
    let probe = async {
        session.move_cursor(point.x, point.y).await?;
        tokio::time::sleep(timing.settle).await;
        session.probe_point(point.x, point.y).await
    };

    let hit = tokio::time::timeout(timing.probe_timeout, probe)
        .await
        .map_err(|_| anyhow::anyhow!("hover probe timed out after {:?}", timing.probe_timeout))??;

    Ok(hit.as_ref().and_then(resolve_hover_paint))
}

/// Turn ranked candidates into final buttons, probing each in ranking order
pub async fn sample_all<S>(
    session: &S,
    ranked: Vec<ScoredCandidate>,
    timing: HoverTiming,
) -> Vec<FinalButton>
where
    S: RenderSession + ?Sized,
{
    let mut buttons = Vec::with_capacity(ranked.len());

    for scored in ranked {
        let default_style = DefaultStyle::from(&scored.resolved);

        let sampled = match sample_hover(session, scored.center, timing).await {
            Ok(Some(hover)) => Some(hover),
            Ok(None) => {
                debug!(
                    "No paint under pointer for '{}', keeping default style",
                    scored.candidate.text
                );
                None
            }
            Err(e) => {
                warn!(
                    "Hover probe failed for '{}': {:#}",
                    scored.candidate.text, e
                );
                None
            }
        };

        let hover_sampled = sampled.is_some();
        let hover_style = sampled.unwrap_or_else(|| HoverStyle::from(&default_style));

        buttons.push(FinalButton {
            text: scored.candidate.text,
            score: scored.score,
            x: scored.center.x,
            y: scored.center.y,
            default_style,
            hover_style,
            hover_sampled,
        });
    }

    buttons
}
