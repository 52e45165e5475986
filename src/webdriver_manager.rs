use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::webdriver::BrowserType;

/// Starts and tracks WebDriver processes (geckodriver, chromedriver)
#[derive(Default)]
pub struct WebDriverManager {
    processes: Mutex<Vec<DriverProcess>>,
    /// Held from port selection until the new driver is registered
    startup: tokio::sync::Mutex<()>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl DriverProcess {
    fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            // The driver leads its own process group, which also holds the
            // browser processes it launched
            let pgid = Pid::from_raw(self.child.id() as i32);
            if let Err(e) = killpg(pgid, Signal::SIGTERM) {
                debug!("SIGTERM to process group {} failed: {}", pgid, e);
            }
        }

        if let Err(e) = self.child.kill() {
            debug!("Driver {} already exited: {}", self.url, e);
        }
        match self.child.wait() {
            Ok(status) => debug!("Driver {} exited with {}", self.url, status),
            Err(e) => debug!("Could not reap driver {}: {}", self.url, e),
        }
    }
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn processes(&self) -> std::sync::MutexGuard<'_, Vec<DriverProcess>> {
        // A panic while holding the lock leaves the list itself intact
        self.processes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the URL of a ready driver for `browser_type`, starting one if
    /// neither a managed nor an external driver on the standard port answers.
    pub async fn ensure_driver(&self, browser_type: &BrowserType) -> Result<String> {
        if let Some(url) = self.ready_managed_driver(browser_type).await {
            return Ok(url);
        }

        let standard_url = format!("http://localhost:{}", Self::standard_port(browser_type));
        if Self::is_driver_ready(&standard_url).await {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url);
        }

        // Concurrent callers wait here; the first one's driver is reused
        let _startup = self.startup.lock().await;
        if let Some(url) = self.ready_managed_driver(browser_type).await {
            return Ok(url);
        }

        info!("WebDriver not detected, attempting to start automatically...");
        self.start_driver(browser_type).await
    }

    async fn ready_managed_driver(&self, browser_type: &BrowserType) -> Option<String> {
        let managed_urls: Vec<String> = self
            .processes()
            .iter()
            .filter(|p| p.browser_type == *browser_type)
            .map(|p| p.url.clone())
            .collect();

        for url in managed_urls {
            if Self::is_driver_ready(&url).await {
                debug!("Using existing managed WebDriver at {}", url);
                return Some(url);
            }
        }
        None
    }

    fn claimed_ports(&self) -> Vec<u16> {
        self.processes().iter().map(|p| p.port).collect()
    }

    fn standard_port(browser_type: &BrowserType) -> u16 {
        match browser_type {
            BrowserType::Firefox => 4444,
            BrowserType::Chrome => 9515,
        }
    }

    async fn start_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let command = browser_type.driver_name();
        let port = Self::free_port_excluding(browser_type, &self.claimed_ports())?;
        let args = match browser_type {
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
            BrowserType::Chrome => vec![format!("--port={}", port)],
        };

        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Please install it:\n\
                  macOS: brew install {}\n\
                  Or see: https://www.selenium.dev/documentation/webdriver/getting_started/install_drivers/",
                command,
                command
            );
        }

        info!("Starting {} on port {}", command, port);

        let mut cmd = Command::new(command);
        cmd.args(&args).stdout(Stdio::null()).stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", command))?;

        let url = format!("http://localhost:{}", port);
        self.processes().push(DriverProcess {
            browser_type: *browser_type,
            child,
            port,
            url: url.clone(),
        });

        // 3 seconds total
        for _ in 0..30 {
            if Self::is_driver_ready(&url).await {
                info!("WebDriver started successfully on port {}", port);
                return Ok(url);
            }
            sleep(Duration::from_millis(100)).await;
        }

        self.stop_url(&url);
        anyhow::bail!("{} failed to start within timeout", command)
    }

    pub fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        let finder = "which";
        #[cfg(windows)]
        let finder = "where";

        Command::new(finder)
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Prefer the driver's conventional port, then let the OS choose
    pub fn find_free_port(browser_type: &BrowserType) -> Result<u16> {
        Self::free_port_excluding(browser_type, &[])
    }

    /// Like [`Self::find_free_port`], skipping ports already handed to a
    /// driver that may not have bound them yet
    fn free_port_excluding(browser_type: &BrowserType, claimed: &[u16]) -> Result<u16> {
        let preferred = Self::standard_port(browser_type);
        for port in preferred..preferred + 3 {
            if !claimed.contains(&port) && !Self::is_port_in_use(port) {
                return Ok(port);
            }
            debug!("Port {} is in use for {:?}", port, browser_type);
        }

        loop {
            let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
            let port = listener.local_addr()?.port();
            if !claimed.contains(&port) {
                return Ok(port);
            }
        }
    }

    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// A driver is usable when `/status` reports `ready: true`
    pub async fn is_driver_ready(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        let response = match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            _ => return false,
        };

        response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.pointer("/value/ready").and_then(|r| r.as_bool()))
            .unwrap_or(false)
    }

    fn stop_url(&self, url: &str) {
        let mut processes = self.processes();
        if let Some(index) = processes.iter().position(|p| p.url == url) {
            warn!("Killing WebDriver at {}", url);
            processes.remove(index).terminate();
        }
    }

    /// Stop every driver this process started
    pub fn stop_all(&self) {
        let mut processes = self.processes();
        for process in processes.iter_mut() {
            debug!("Stopping WebDriver at {}", process.url);
            process.terminate();
        }
        processes.clear();
    }

    pub fn managed_count(&self) -> usize {
        self.processes().len()
    }
}

impl Drop for WebDriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

lazy_static::lazy_static! {
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;
