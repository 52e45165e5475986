//! # brandprobe
#![allow(clippy::uninlined_format_args)]
//!
//! Extracts a website's brand signature from a real browser render: the page
//! background, the fonts it loads, and the styling of its primary buttons in
//! both default and hover states. The structured result is optionally
//! annotated with a short mood description from an OpenAI-compatible
//! chat-completions service.
//!
//! ## Installation
//!
//! ```bash
//! cargo install brandprobe
//! # with the HTTP endpoint
//! cargo install brandprobe --features server
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # A full URL, a bare domain or a brand name
//! brandprobe analyze "https://gsap.com"
//! brandprobe analyze stripe.com
//! brandprobe analyze "Acme Rockets"
//!
//! # Human-readable output, Firefox, custom viewport
//! brandprobe analyze gsap.com --format simple --browser firefox --viewport 1280x800
//!
//! # Use an already running driver
//! brandprobe analyze gsap.com --webdriver-url http://localhost:9515
//!
//! # Print the effective scoring heuristics
//! brandprobe heuristics
//!
//! # Serve POST /analyze (feature "server")
//! brandprobe serve --port 8080
//! ```
//!
//! Mood analysis is enabled by setting `BRANDPROBE_LLM_API_KEY` (or
//! `GROQ_API_KEY`). Without a key, or when the service fails, the report
//! carries a fallback analysis and everything else is unchanged.
//!
//! ### JSON Output and Processing with jq
//!
//! ```bash
//! # Primary button background
//! brandprobe analyze gsap.com | jq -r '.buttons[0].defaultStyle.bg'
//!
//! # Buttons whose hover state could not be sampled
//! brandprobe analyze gsap.com | jq '.buttons[] | select(.hoverSampled | not) | .text'
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use brandprobe::{Analyzer, BrowserType, ChatCompletionsClient, HeuristicConfig, WebDriverFactory};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let factory = WebDriverFactory::new(BrowserType::Chrome);
//! let analyzer: Analyzer<_, ChatCompletionsClient> =
//!     Analyzer::new(factory, HeuristicConfig::default());
//!
//! let report = analyzer.analyze("gsap.com").await?;
//! println!("{} buttons on {}", report.buttons.len(), report.url);
//! # Ok(())
//! # }
//! ```

/// End-to-end analysis pipeline
pub mod analyzer;

/// CSS color visibility
pub mod color;

/// Tunable scoring heuristics
pub mod config;

/// Cookie and consent UI detection
pub mod consent;

pub mod errors;

/// Font resource collection
pub mod fonts;

/// Hover state sampling
pub mod hover;

/// Chat-completions client for mood analysis
pub mod llm;

/// Effective paint resolution
pub mod paint;

/// Candidate filtering, scoring and ranking
pub mod ranking;

/// HTTP endpoint
#[cfg(feature = "server")]
pub mod server;

/// Render session traits
pub mod session;

/// Brand summary and mood annotation
pub mod summary;

/// Input to URL resolution
pub mod target;

/// Type definitions for snapshots and reports
pub mod types;

/// WebDriver render sessions
pub mod webdriver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

pub use analyzer::Analyzer;
pub use config::HeuristicConfig;
pub use errors::BrandprobeError;
pub use llm::{ChatCompletionsClient, LlmConfig};
pub use session::{RenderOptions, RenderSession, SessionFactory, SessionLimiter};
pub use summary::TextGenerator;
pub use types::{Analysis, BrandReport, FinalButton, OutputFormat, ViewportSize};
pub use webdriver::{Browser, BrowserType, WebDriverFactory};
