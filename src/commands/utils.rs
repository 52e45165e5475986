use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use brandprobe::{
    Analyzer, BrowserType, ChatCompletionsClient, HeuristicConfig, LlmConfig, RenderOptions,
    SessionLimiter, ViewportSize, WebDriverFactory,
};

pub type CliAnalyzer = Analyzer<WebDriverFactory, ChatCompletionsClient>;

/// Render and heuristics options shared by `analyze` and `serve`
#[derive(Args, Clone, Debug)]
pub struct RenderArgs {
    /// Browser to use (chrome or firefox)
    #[arg(short, long, default_value = "chrome")]
    pub browser: String,

    /// Set viewport size (WIDTHxHEIGHT, e.g., 1440x900)
    #[arg(long)]
    pub viewport: Option<String>,

    /// Run browser in visible mode (disables headless)
    #[arg(long = "no-headless")]
    pub no_headless: bool,

    /// Connect to a running WebDriver instead of starting one
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value = "60000")]
    pub timeout_ms: u64,

    /// Search engine used for brand names
    #[arg(long)]
    pub search_url: Option<String>,

    /// Heuristics override file (JSON)
    #[arg(long)]
    pub heuristics: Option<PathBuf>,
}

impl RenderArgs {
    pub fn render_options(&self) -> Result<RenderOptions> {
        let viewport = match &self.viewport {
            Some(v) => ViewportSize::parse(v)?,
            None => ViewportSize::default(),
        };
        Ok(RenderOptions {
            viewport,
            timeout: Duration::from_millis(self.timeout_ms),
            headless: !self.no_headless,
        })
    }
}

/// Wire the WebDriver factory, heuristics and (optional) summarizer together
pub fn build_analyzer(args: &RenderArgs, limiter: SessionLimiter) -> Result<CliAnalyzer> {
    let browser_type: BrowserType = args.browser.parse()?;
    let config = HeuristicConfig::load(args.heuristics.as_deref())?;

    let factory = WebDriverFactory::new(browser_type)
        .with_webdriver_url(args.webdriver_url.clone())
        .with_probe_descendants(config.max_descendants);

    let generator = match LlmConfig::from_env() {
        Some(llm) => {
            info!("Mood analysis via {} ({})", llm.base_url, llm.model);
            Some(ChatCompletionsClient::new(llm)?)
        }
        None => {
            debug!("No LLM API key set, mood analysis disabled");
            None
        }
    };

    let mut analyzer = Analyzer::new(factory, config)
        .with_generator(generator)
        .with_render_options(args.render_options()?)
        .with_limiter(limiter);
    if let Some(url) = &args.search_url {
        analyzer = analyzer.with_search_url(url.clone());
    }
    Ok(analyzer)
}
