use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format for programmatic consumption
    Json,
    /// Human-readable simple format
    Simple,
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl Default for ViewportSize {
    /// Desktop size used for every analysis so coordinates stay comparable
    fn default() -> Self {
        ViewportSize {
            width: 1440,
            height: 900,
        }
    }
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1440x900")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1440x900)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        if width == 0 || height == 0 {
            anyhow::bail!("Viewport dimensions must be positive");
        }

        Ok(ViewportSize { width, height })
    }
}

/// Axis-aligned box in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Computed style values for one node or pseudo-element.
///
/// All values are CSS computed-value strings exactly as the browser reports
/// them; missing properties deserialize to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleRecord {
    pub background_color: String,
    pub color: String,
    pub border_width: String,
    pub border_color: String,
    pub border_radius: String,
    pub font_family: String,
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

impl StyleRecord {
    /// Border width in pixels, taking the leading number of the computed value
    /// (`"2px"`, `"1.5px 0px"`).
    pub fn border_width_px(&self) -> f64 {
        let first = self.border_width.split_whitespace().next().unwrap_or("");
        first
            .trim_end_matches("px")
            .parse::<f64>()
            .unwrap_or(0.0)
    }

    /// Whether the node is rendered at all
    pub fn is_rendered(&self) -> bool {
        if self.display == "none" || self.visibility == "hidden" {
            return false;
        }
        !matches!(self.opacity.trim().parse::<f64>(), Ok(o) if o <= 0.0)
    }

    /// First family of the font stack with quotes stripped
    pub fn primary_font(&self) -> String {
        self.font_family
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .replace(['"', '\''], "")
    }
}

/// A descendant's style together with its rendered box
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaintedBox {
    pub style: StyleRecord,
    pub rect: BoundingBox,
}

/// Everything needed to work out where a node's visible paint comes from:
/// its own style, its pseudo-elements and its descendants in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintTree {
    pub style: StyleRecord,
    pub before: Option<StyleRecord>,
    pub after: Option<StyleRecord>,
    pub descendants: Vec<PaintedBox>,
}

/// Identity attributes of an ancestor element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeIdentity {
    pub tag: String,
    pub id: String,
    pub class_name: String,
}

/// Snapshot of one clickable-looking node from the initial scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSnapshot {
    /// Position in scan order
    pub index: usize,
    pub tag: String,
    pub id: String,
    pub class_name: String,
    /// Serialized markup, possibly truncated by the render session
    pub markup: String,
    /// Rendered text (`innerText`)
    pub text: String,
    pub aria_label: Option<String>,
    /// `value` attribute for submit inputs
    pub value: Option<String>,
    pub rect: BoundingBox,
    /// Nearest ancestor first
    pub ancestors: Vec<NodeIdentity>,
    #[serde(flatten)]
    pub paint: PaintTree,
}

/// Result of the initial page scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSnapshot {
    pub viewport: ViewportSize,
    pub background_color: String,
    pub nodes: Vec<NodeSnapshot>,
}

/// Paint information for the element under a screen point, and its parent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointProbe {
    pub hit: PaintTree,
    pub parent: Option<PaintTree>,
}

/// Kind of network resource the page loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Font,
    Stylesheet,
    Script,
    Image,
    Other,
}

/// One observed network response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvent {
    pub url: String,
    pub kind: ResourceKind,
}

/// A clickable-looking node that passed the size and visibility filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateElement {
    pub index: usize,
    pub rect: BoundingBox,
    pub text: String,
    pub style: StyleRecord,
}

/// Where a resolved style came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintOrigin {
    Node,
    Before,
    After,
    Descendant,
}

/// The paint-bearing style attributed to a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    pub background_color: String,
    pub color: String,
    pub border_radius: String,
    pub font_family: String,
    pub origin: PaintOrigin,
}

impl ResolvedStyle {
    pub fn from_record(style: &StyleRecord, origin: PaintOrigin) -> Self {
        ResolvedStyle {
            background_color: style.background_color.clone(),
            color: style.color.clone(),
            border_radius: style.border_radius.clone(),
            font_family: style.primary_font(),
            origin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: CandidateElement,
    pub resolved: ResolvedStyle,
    pub score: i32,
    /// Hover probe coordinate
    pub center: Point,
}

/// Default appearance of a button as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultStyle {
    pub bg: String,
    pub color: String,
    pub radius: String,
    pub font: String,
}

impl From<&ResolvedStyle> for DefaultStyle {
    fn from(style: &ResolvedStyle) -> Self {
        DefaultStyle {
            bg: style.background_color.clone(),
            color: style.color.clone(),
            radius: style.border_radius.clone(),
            font: style.font_family.clone(),
        }
    }
}

/// Appearance under the pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverStyle {
    pub bg: String,
    pub color: String,
}

impl From<&DefaultStyle> for HoverStyle {
    fn from(style: &DefaultStyle) -> Self {
        HoverStyle {
            bg: style.bg.clone(),
            color: style.color.clone(),
        }
    }
}

/// A ranked button with its default and hover appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalButton {
    pub text: String,
    pub score: i32,
    pub x: f64,
    pub y: f64,
    pub default_style: DefaultStyle,
    pub hover_style: HoverStyle,
    /// False when the hover probe failed and `hover_style` is the default
    pub hover_sampled: bool,
}

/// Whether the analysis came from the text-generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Generated,
    Fallback,
}

/// Mood summary attached to a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub mood: String,
    pub easing_hint: String,
    pub advice: String,
    pub source: AnalysisSource,
}

/// Complete result of one analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandReport {
    pub url: String,
    pub page_background: String,
    pub fonts: Vec<String>,
    pub buttons: Vec<FinalButton>,
    pub analysis: Analysis,
    pub analyzed_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
