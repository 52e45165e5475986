//! Brand summary assembly and best-effort mood annotation.
//!
//! The extracted data is always the result; the text-generation service only
//! annotates it. Any failure there (transport, timeout, unparsable reply)
//! yields [`fallback_analysis`] and the request carries on.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{Analysis, AnalysisSource, FinalButton};

pub const FALLBACK_MOOD: &str = "Unavailable";
pub const FALLBACK_EASE: &str = "power2.out";
pub const FALLBACK_ADVICE: &str =
    "Mood analysis is unavailable; the extracted colors and fonts are still accurate.";

pub const SYSTEM_PROMPT: &str = "You are a creative developer assistant. Output JSON only.";

/// External text-generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}

/// What gets sent to the text-generation service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    pub page_background: String,
    pub buttons: Vec<FinalButton>,
}

/// Keep the page background and the top `limit` buttons
pub fn assemble(page_background: &str, buttons: &[FinalButton], limit: usize) -> BrandSummary {
    BrandSummary {
        page_background: page_background.to_string(),
        buttons: buttons.iter().take(limit).cloned().collect(),
    }
}

pub fn build_prompt(summary: &BrandSummary) -> Result<String> {
    let buttons = serde_json::to_string(&summary.buttons)?;
    Ok(format!(
        "Analyze this website design data.\n\
         Site background: {}\n\
         Buttons found: {}\n\
         Return JSON: {{ \"mood\": \"a 3-word description of the brand vibe\", \
         \"gsap_ease\": \"a GSAP easing curve that fits the mood, e.g. power2.out\", \
         \"animation_advice\": \"one sentence recommending a banner animation style\" }}",
        summary.page_background, buttons
    ))
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    mood: Option<String>,
    #[serde(alias = "easingHint", alias = "easing", alias = "ease")]
    gsap_ease: Option<String>,
    #[serde(alias = "advice", alias = "recommendation")]
    animation_advice: Option<String>,
}

/// Pull the analysis out of a model reply. Tolerates markdown code fences
/// and prose around the JSON object; all three fields must be non-empty.
pub fn parse_reply(reply: &str) -> Result<Analysis> {
    let start = reply.find('{').context("reply contains no JSON object")?;
    let end = reply.rfind('}').context("reply contains no JSON object")?;
    if end < start {
        anyhow::bail!("reply contains no JSON object");
    }

    let raw: RawAnalysis =
        serde_json::from_str(&reply[start..=end]).context("reply is not valid JSON")?;

    let field = |value: Option<String>, name: &str| -> Result<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .with_context(|| format!("reply is missing '{}'", name))
    };

    Ok(Analysis {
        mood: field(raw.mood, "mood")?,
        easing_hint: field(raw.gsap_ease, "gsap_ease")?,
        advice: field(raw.animation_advice, "animation_advice")?,
        source: AnalysisSource::Generated,
    })
}

pub fn fallback_analysis() -> Analysis {
    Analysis {
        mood: FALLBACK_MOOD.to_string(),
        easing_hint: FALLBACK_EASE.to_string(),
        advice: FALLBACK_ADVICE.to_string(),
        source: AnalysisSource::Fallback,
    }
}

/// Ask the generator for a mood analysis; never fails
pub async fn summarize<G>(generator: Option<&G>, summary: &BrandSummary) -> Analysis
where
    G: TextGenerator + ?Sized,
{
    let Some(generator) = generator else {
        info!("No text generator configured, using fallback analysis");
        return fallback_analysis();
    };

    let attempt = async {
        let prompt = build_prompt(summary)?;
        let reply = generator.generate(SYSTEM_PROMPT, &prompt).await?;
        parse_reply(&reply)
    };

    match attempt.await {
        Ok(analysis) => {
            info!("Mood analysis: {}", analysis.mood);
            analysis
        }
        Err(e) => {
            warn!("Mood analysis failed, using fallback: {:#}", e);
            fallback_analysis()
        }
    }
}
