//! Tunable heuristics for candidate extraction, scoring and hover sampling.
//!
//! Every threshold, keyword list and provider identifier used by the
//! pipeline lives in [`HeuristicConfig`]. The defaults mirror the values the
//! tool has been tuned to; a JSON file can override any subset of fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bumped whenever default values change meaning
pub const HEURISTICS_VERSION: u32 = 3;

/// Vertical band of the viewport, as fractions of its height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub top: f64,
    pub bottom: f64,
}

impl Band {
    /// Strict containment of `fraction` in the band
    pub fn contains(&self, fraction: f64) -> bool {
        fraction > self.top && fraction < self.bottom
    }
}

/// Additive score contributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bonuses {
    pub hero_zone: i32,
    pub painted: i32,
    pub wide: i32,
    pub tall: i32,
    pub keyword: i32,
}

impl Default for Bonuses {
    fn default() -> Self {
        Self {
            hero_zone: 50,
            painted: 20,
            wide: 10,
            tall: 0,
            keyword: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub version: u32,

    /// CSS selector set for clickable-looking nodes
    pub clickable_selector: String,
    /// Candidates must be strictly wider than this
    pub min_width: f64,
    /// Candidates must be strictly taller than this
    pub min_height: f64,
    /// Width above which the `wide` bonus applies
    pub wide_threshold: f64,
    /// Height above which the `tall` bonus applies
    pub tall_threshold: f64,
    pub hero_band: Band,
    pub bonuses: Bonuses,
    /// Score assigned to consent artifacts
    pub consent_penalty: i32,
    /// Action verbs per locale
    pub action_keywords: BTreeMap<String, Vec<String>>,
    /// Consent and dismiss vocabulary per locale
    pub consent_terms: BTreeMap<String, Vec<String>>,
    /// Substrings identifying consent-management platforms in ids, classes or markup
    pub consent_providers: Vec<String>,
    /// Ancestor levels inspected by the consent classifier
    pub ancestor_depth: usize,
    pub max_candidates: usize,
    /// Number of ranked buttons forwarded to the summarizer
    pub summary_buttons: usize,
    pub text_max_chars: usize,
    /// Markup captured per node for the consent classifier
    pub markup_max_chars: usize,
    /// Descendants captured per node for paint resolution
    pub max_descendants: usize,
    /// Wait after navigation before scanning
    pub hydration_wait_ms: u64,
    /// Wait after moving the pointer before re-sampling
    pub hover_settle_ms: u64,
    /// Upper bound for one hover probe (move, settle, sample)
    pub hover_probe_timeout_ms: u64,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        let mut action_keywords = BTreeMap::new();
        action_keywords.insert(
            "en".to_string(),
            words(&[
                "shop", "buy", "get", "start", "discover", "join", "try", "sign up", "order",
                "explore",
            ]),
        );
        action_keywords.insert(
            "pl".to_string(),
            words(&[
                "kup", "sklep", "zamów", "zacznij", "rozpocznij", "odkryj", "dołącz", "wypróbuj",
                "sprawdź",
            ]),
        );

        let mut consent_terms = BTreeMap::new();
        consent_terms.insert(
            "en".to_string(),
            words(&[
                "cookie", "accept", "agree", "privacy", "settings", "close", "consent", "reject",
                "dismiss", "preferences",
            ]),
        );
        consent_terms.insert(
            "pl".to_string(),
            words(&[
                "ciasteczk", "akceptuj", "zgoda", "zgadzam", "polityka", "prywatno", "ustawienia",
                "zamknij", "odrzuć",
            ]),
        );

        Self {
            version: HEURISTICS_VERSION,
            clickable_selector: r#"a, button, div[role="button"], input[type="submit"]"#
                .to_string(),
            min_width: 30.0,
            min_height: 15.0,
            wide_threshold: 100.0,
            tall_threshold: 35.0,
            hero_band: Band {
                top: 0.10,
                bottom: 0.60,
            },
            bonuses: Bonuses::default(),
            consent_penalty: -500,
            action_keywords,
            consent_terms,
            consent_providers: words(&[
                "onetrust",
                "optanon",
                "cookiebot",
                "cybotcookiebot",
                "didomi",
                "usercentrics",
                "cookieyes",
                "cky-consent",
                "trustarc",
                "truste",
                "qc-cmp",
                "quantcast",
                "osano",
                "iubenda",
                "termly",
                "cookielaw",
                "cookie-consent",
                "cookie-banner",
                "cookie-notice",
                "cc-banner",
                "cc-window",
                "gdpr",
                "consent",
            ]),
            ancestor_depth: 5,
            max_candidates: 6,
            summary_buttons: 2,
            text_max_chars: 25,
            markup_max_chars: 2048,
            max_descendants: 200,
            hydration_wait_ms: 2500,
            hover_settle_ms: 300,
            hover_probe_timeout_ms: 5000,
        }
    }
}

impl HeuristicConfig {
    /// Load a config file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read heuristics file {}", path.display()))?;
        let config: HeuristicConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid heuristics file {}", path.display()))?;
        config.validate()?;
        info!("Loaded heuristics from {}", path.display());
        Ok(config)
    }

    /// Default location: ~/.brandprobe/heuristics.json
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".brandprobe").join("heuristics.json"))
    }

    /// Resolve the effective config: explicit path, then the default
    /// location if it exists, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("Using built-in heuristics v{}", HEURISTICS_VERSION);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.hero_band.top)
            || !(0.0..=1.0).contains(&self.hero_band.bottom)
            || self.hero_band.top >= self.hero_band.bottom
        {
            anyhow::bail!(
                "hero_band must satisfy 0 <= top < bottom <= 1 (got {}..{})",
                self.hero_band.top,
                self.hero_band.bottom
            );
        }
        if self.ancestor_depth < 3 {
            anyhow::bail!("ancestor_depth must be at least 3");
        }
        if self.max_candidates == 0 {
            anyhow::bail!("max_candidates must be at least 1");
        }
        if self.consent_penalty >= 0 {
            anyhow::bail!("consent_penalty must be negative");
        }
        if self.clickable_selector.trim().is_empty() {
            anyhow::bail!("clickable_selector must not be empty");
        }
        Ok(())
    }

    /// All action keywords across locales, lowercased
    pub fn all_action_keywords(&self) -> impl Iterator<Item = String> + '_ {
        self.action_keywords
            .values()
            .flatten()
            .map(|w| w.to_lowercase())
    }

    /// All consent terms across locales, lowercased
    pub fn all_consent_terms(&self) -> impl Iterator<Item = String> + '_ {
        self.consent_terms.values().flatten().map(|w| w.to_lowercase())
    }
}
