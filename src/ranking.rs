//! Candidate extraction, scoring and ranking.

use tracing::debug;

use crate::config::HeuristicConfig;
use crate::consent::ConsentClassifier;
use crate::paint::resolve_paint;
use crate::types::{CandidateElement, NodeSnapshot, PageSnapshot, ScoredCandidate};

/// Full visible label for a node with whitespace collapsed: rendered text,
/// then `aria-label`, then the submit `value`. Empty when none is present.
pub fn visible_text(node: &NodeSnapshot) -> String {
    let raw = [
        Some(node.text.as_str()),
        node.aria_label.as_deref(),
        node.value.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|t| !t.is_empty())
    .unwrap_or("");

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display label: [`visible_text`] trimmed to `max_chars` characters
pub fn candidate_text(node: &NodeSnapshot, max_chars: usize) -> String {
    let truncated: String = visible_text(node).chars().take(max_chars).collect();
    match truncated.trim() {
        "" => "Button".to_string(),
        t => t.to_string(),
    }
}

/// Apply the size and visibility invariant to a scanned node
pub fn to_candidate(node: &NodeSnapshot, config: &HeuristicConfig) -> Option<CandidateElement> {
    if node.rect.width <= config.min_width || node.rect.height <= config.min_height {
        return None;
    }
    if !node.paint.style.is_rendered() {
        return None;
    }
    Some(CandidateElement {
        index: node.index,
        rect: node.rect,
        text: candidate_text(node, config.text_max_chars),
        style: node.paint.style.clone(),
    })
}

/// Scores candidates against one page's viewport
pub struct Scorer<'a> {
    config: &'a HeuristicConfig,
    classifier: ConsentClassifier,
    keywords: Vec<String>,
    viewport_height: f64,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a HeuristicConfig, viewport_height: u32) -> Self {
        Self {
            config,
            classifier: ConsentClassifier::new(config),
            keywords: config.all_action_keywords().filter(|k| !k.is_empty()).collect(),
            viewport_height: f64::from(viewport_height.max(1)),
        }
    }

    /// Score one scanned node. Returns `None` when the node is not a
    /// candidate at all: too small, hidden, or carrying no paint anywhere.
    pub fn score(&self, node: &NodeSnapshot) -> Option<ScoredCandidate> {
        let candidate = to_candidate(node, self.config)?;
        let resolved = resolve_paint(&node.paint)?;

        // Matching runs on the untruncated label
        let text = visible_text(node);
        let score = if let Some(signal) = self.classifier.classify(node, &text) {
            debug!(
                "Candidate #{} '{}' is a consent artifact ({:?})",
                candidate.index, candidate.text, signal
            );
            self.config.consent_penalty
        } else {
            self.positive_score(&candidate, &text)
        };

        let center = candidate.rect.center();
        Some(ScoredCandidate {
            candidate,
            resolved,
            score,
            center,
        })
    }

    fn positive_score(&self, candidate: &CandidateElement, text: &str) -> i32 {
        let bonuses = &self.config.bonuses;
        let mut score = 0;

        let relative_y = candidate.rect.y / self.viewport_height;
        if self.config.hero_band.contains(relative_y) {
            score += bonuses.hero_zone;
        }

        // Every candidate reaching this point resolved to some paint
        score += bonuses.painted;

        if candidate.rect.width > self.config.wide_threshold {
            score += bonuses.wide;
        }
        if candidate.rect.height > self.config.tall_threshold {
            score += bonuses.tall;
        }

        let text = text.to_lowercase();
        if self.keywords.iter().any(|k| text.contains(k.as_str())) {
            score += bonuses.keyword;
        }

        score
    }
}

/// Score every node in the snapshot, drop non-positive scores, sort by
/// descending score (stable, so scan order breaks ties) and keep at most
/// `max_candidates`.
pub fn score_and_rank(snapshot: &PageSnapshot, config: &HeuristicConfig) -> Vec<ScoredCandidate> {
    let scorer = Scorer::new(config, snapshot.viewport.height);

    let mut ranked: Vec<ScoredCandidate> = snapshot
        .nodes
        .iter()
        .filter_map(|node| scorer.score(node))
        .filter(|scored| scored.score > 0)
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(config.max_candidates);

    debug!(
        "Ranked {} of {} scanned nodes",
        ranked.len(),
        snapshot.nodes.len()
    );
    ranked
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod ranking_test;
