use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::actions::{InputSource, MouseActions, PointerAction};
use fantoccini::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::errors::BrandprobeError;
use crate::fonts::classify_resource;
use crate::session::{RenderOptions, RenderSession, ScanRequest, SessionFactory};
use crate::types::{PageSnapshot, PointProbe, ResourceEvent, ViewportSize};
use crate::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

/// Extra client-side wait past the driver's own page load timeout
const NAVIGATION_GRACE: Duration = Duration::from_secs(2);

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    pub fn driver_name(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }
}

/// Computed-style helpers shared by the scan and probe scripts. Pseudo
/// elements without generated content are not rendered and are reported as
/// null.
const PAINT_HELPERS: &str = r#"
const pick = (s) => ({
    backgroundColor: s.backgroundColor || '',
    color: s.color || '',
    borderWidth: s.borderWidth || s.borderTopWidth || '',
    borderColor: s.borderColor || s.borderTopColor || '',
    borderRadius: s.borderRadius || '',
    fontFamily: s.fontFamily || '',
    display: s.display || '',
    visibility: s.visibility || '',
    opacity: s.opacity || ''
});
const box = (r) => ({ x: r.x, y: r.y, width: r.width, height: r.height });
const classOf = (el) => (el.getAttribute && el.getAttribute('class')) || '';
const pseudo = (el, which) => {
    const s = window.getComputedStyle(el, which);
    if (!s || s.content === 'none' || s.content === 'normal' || s.content === '') return null;
    return pick(s);
};
const paintTree = (el, maxDescendants) => {
    const descendants = [];
    const all = el.querySelectorAll('*');
    for (let i = 0; i < all.length && descendants.length < maxDescendants; i++) {
        const r = all[i].getBoundingClientRect();
        if (r.width <= 0 || r.height <= 0) continue;
        descendants.push({ style: pick(window.getComputedStyle(all[i])), rect: box(r) });
    }
    return {
        style: pick(window.getComputedStyle(el)),
        before: pseudo(el, '::before'),
        after: pseudo(el, '::after'),
        descendants
    };
};
"#;

const SCAN_SCRIPT: &str = r#"
const opts = arguments[0];
const nodes = [];
document.querySelectorAll(opts.selector).forEach((el, index) => {
    const r = el.getBoundingClientRect();
    if (r.width <= 0 || r.height <= 0) return;
    const ancestors = [];
    let p = el.parentElement;
    while (p && ancestors.length < opts.ancestorDepth) {
        ancestors.push({ tag: p.tagName.toLowerCase(), id: p.id || '', className: classOf(p) });
        p = p.parentElement;
    }
    const node = paintTree(el, opts.maxDescendants);
    node.index = index;
    node.tag = el.tagName.toLowerCase();
    node.id = el.id || '';
    node.className = classOf(el);
    node.markup = (el.outerHTML || '').slice(0, opts.markupMaxChars);
    node.text = (el.innerText || el.textContent || '').trim();
    node.ariaLabel = el.getAttribute('aria-label');
    node.value = el.tagName === 'INPUT' ? (el.value || null) : null;
    node.rect = box(r);
    node.ancestors = ancestors;
    nodes.push(node);
});
const body = document.body || document.documentElement;
return {
    viewport: { width: window.innerWidth, height: window.innerHeight },
    backgroundColor: window.getComputedStyle(body).backgroundColor || '',
    nodes
};
"#;

const PROBE_SCRIPT: &str = r#"
const [x, y, maxDescendants] = arguments;
const el = document.elementFromPoint(x, y);
if (!el) return null;
return {
    hit: paintTree(el, maxDescendants),
    parent: el.parentElement ? paintTree(el.parentElement, maxDescendants) : null
};
"#;

const RESOURCES_SCRIPT: &str = r#"
return performance.getEntriesByType('resource').map((e) => ({
    url: e.name,
    initiator: e.initiatorType || ''
}));
"#;

#[derive(Debug, Deserialize)]
struct RawResource {
    url: String,
    #[serde(default)]
    initiator: String,
}

/// Browser instance driven over WebDriver. One instance is one render
/// session.
pub struct Browser {
    client: Client,
    browser_type: BrowserType,
    timeout: Duration,
    probe_descendants: usize,
    // Removed from disk when the session is dropped
    _profile_dir: Option<TempDir>,
}

impl Browser {
    /// Start a browser session on the given driver, or on a managed driver
    /// when `webdriver_url` is `None`.
    pub async fn new(
        browser_type: BrowserType,
        webdriver_url: Option<&str>,
        options: &RenderOptions,
    ) -> Result<Self> {
        info!("Connecting to {:?} WebDriver", browser_type);

        let webdriver_url = match webdriver_url {
            Some(url) => url.to_string(),
            None => GLOBAL_WEBDRIVER_MANAGER
                .ensure_driver(&browser_type)
                .await
                .map_err(|e| BrandprobeError::WebDriverFailed(format!("{:#}", e)))?,
        };

        // Chrome refuses to share a profile directory between sessions
        let profile_dir = match browser_type {
            BrowserType::Chrome => Some(
                tempfile::Builder::new()
                    .prefix("brandprobe-chrome-")
                    .tempdir()?,
            ),
            BrowserType::Firefox => None,
        };

        let caps = Self::capabilities(browser_type, options, profile_dir.as_ref());

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&webdriver_url)
            .await
            .map_err(|e| {
                BrandprobeError::WebDriverFailed(format!(
                    "Failed to connect to WebDriver at {}: {}",
                    webdriver_url, e
                ))
            })?;

        let browser = Browser {
            client,
            browser_type,
            timeout: options.timeout,
            probe_descendants: 200,
            _profile_dir: profile_dir,
        };

        browser.fit_viewport(options.viewport).await;

        Ok(browser)
    }

    fn capabilities(
        browser_type: BrowserType,
        options: &RenderOptions,
        profile_dir: Option<&TempDir>,
    ) -> serde_json::Map<String, serde_json::Value> {
        let vp = options.viewport;
        let mut caps = serde_json::Map::new();

        match browser_type {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if options.headless {
                    args.push("--headless".to_string());
                }
                args.push(format!("--width={}", vp.width));
                args.push(format!("--height={}", vp.height));

                caps.insert(
                    "moz:firefoxOptions".to_string(),
                    json!({
                        "args": args,
                        "prefs": {
                            "permissions.default.image": 2,
                            "media.autoplay.default": 5
                        }
                    }),
                );
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if options.headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                args.push(format!("--window-size={},{}", vp.width, vp.height));
                // Images and media are never inspected
                args.push("--blink-settings=imagesEnabled=false".to_string());
                args.push("--autoplay-policy=user-gesture-required".to_string());
                args.push("--hide-scrollbars".to_string());
                if let Some(dir) = profile_dir {
                    args.push(format!("--user-data-dir={}", dir.path().display()));
                }

                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        // The driver aborts slow loads itself so the session is free again
        // by the time the client-side timeout fires
        caps.insert("pageLoadStrategy".to_string(), json!("eager"));
        caps.insert(
            "timeouts".to_string(),
            json!({ "pageLoad": options.timeout.as_millis() as u64 }),
        );

        caps
    }

    /// Size the window so that the layout viewport matches `vp`. Best-effort.
    async fn fit_viewport(&self, vp: ViewportSize) {
        debug!("Setting viewport to {}x{}", vp.width, vp.height);
        if let Err(e) = self.client.set_window_size(vp.width, vp.height).await {
            debug!("Note: Could not set window size: {}", e);
            return;
        }

        let inner = self
            .client
            .execute(
                "return { width: window.innerWidth, height: window.innerHeight };",
                vec![],
            )
            .await
            .ok()
            .and_then(|v| serde_json::from_value::<ViewportSize>(v).ok());

        if let Some(inner) = inner
            && inner != vp
        {
            let width = (2 * vp.width).saturating_sub(inner.width).max(vp.width);
            let height = (2 * vp.height).saturating_sub(inner.height).max(vp.height);
            debug!("Window chrome detected, resizing outer window to {}x{}", width, height);
            if let Err(e) = self.client.set_window_size(width, height).await {
                debug!("Note: Could not adjust window size: {}", e);
            }
        }
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    async fn run_script(&self, script: &str, args: Vec<serde_json::Value>) -> Result<serde_json::Value> {
        self.client
            .execute(&[PAINT_HELPERS, script].concat(), args)
            .await
            .context("Failed to execute script")
    }

    async fn wait_ready(&self) {
        for _ in 0..20 {
            match self
                .client
                .execute("return document.readyState !== 'loading';", vec![])
                .await
            {
                Ok(val) if val.as_bool().unwrap_or(false) => return,
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
        debug!("Document still loading after 2s, continuing");
    }
}

#[async_trait]
impl RenderSession for Browser {
    async fn navigate(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);

        let deadline = self.timeout + NAVIGATION_GRACE;
        match tokio::time::timeout(deadline, self.client.goto(url)).await {
            Err(_) => {
                return Err(BrandprobeError::Navigation(format!(
                    "{} did not load within {}ms",
                    url,
                    self.timeout.as_millis()
                ))
                .into());
            }
            Ok(Err(e)) => {
                return Err(BrandprobeError::Navigation(format!("{}: {}", url, e)).into());
            }
            Ok(Ok(())) => {}
        }

        self.wait_ready().await;
        Ok(())
    }

    async fn scan(&self, request: &ScanRequest) -> Result<PageSnapshot> {
        let args = json!({
            "selector": request.selector,
            "ancestorDepth": request.ancestor_depth,
            "markupMaxChars": request.markup_max_chars,
            "maxDescendants": request.max_descendants,
        });

        let value = self.run_script(SCAN_SCRIPT, vec![args]).await?;
        serde_json::from_value(value).context("Scan returned an unexpected shape")
    }

    async fn move_cursor(&self, x: f64, y: f64) -> Result<()> {
        let pointer = MouseActions::new("brandprobe-pointer".to_string()).then(
            PointerAction::MoveTo {
                duration: Some(Duration::from_millis(50)),
                x: x.round() as i64,
                y: y.round() as i64,
            },
        );

        self.client
            .perform_actions(pointer)
            .await
            .context("Failed to move pointer")
    }

    async fn probe_point(&self, x: f64, y: f64) -> Result<Option<PointProbe>> {
        let value = self
            .run_script(
                PROBE_SCRIPT,
                vec![json!(x), json!(y), json!(self.probe_descendants)],
            )
            .await?;

        if value.is_null() {
            return Ok(None);
        }
        let probe = serde_json::from_value(value).context("Probe returned an unexpected shape")?;
        Ok(Some(probe))
    }

    async fn resource_events(&self) -> Result<Vec<ResourceEvent>> {
        let value = self
            .client
            .execute(RESOURCES_SCRIPT, vec![])
            .await
            .context("Failed to read resource timing entries")?;

        let raw: Vec<RawResource> = serde_json::from_value(value)?;
        Ok(raw
            .into_iter()
            .map(|r| ResourceEvent {
                kind: classify_resource(&r.url, &r.initiator),
                url: r.url,
            })
            .collect())
    }

    async fn close(&self) -> Result<()> {
        // Client is a handle; closing any clone ends the WebDriver session
        self.client.clone().close().await?;
        Ok(())
    }
}

/// Opens a fresh [`Browser`] per analysis
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    browser_type: BrowserType,
    webdriver_url: Option<String>,
    probe_descendants: usize,
}

impl WebDriverFactory {
    pub fn new(browser_type: BrowserType) -> Self {
        Self {
            browser_type,
            webdriver_url: None,
            probe_descendants: 200,
        }
    }

    /// Use an already running driver instead of a managed one
    pub fn with_webdriver_url(mut self, url: Option<String>) -> Self {
        self.webdriver_url = url;
        self
    }

    /// Cap on descendant boxes reported by hover probes
    pub fn with_probe_descendants(mut self, max: usize) -> Self {
        self.probe_descendants = max;
        self
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    type Session = Browser;

    async fn open(&self, options: &RenderOptions) -> Result<Browser> {
        let mut browser =
            Browser::new(self.browser_type, self.webdriver_url.as_deref(), options).await?;
        browser.probe_descendants = self.probe_descendants;
        Ok(browser)
    }
}
