//! Chrome process launch and DevTools endpoint discovery.
//!
//! Spawns Chrome with a persistent `--user-data-dir` (so the portal
//! login survives restarts) and remote debugging enabled, then polls
//! the `/json/version` discovery endpoint until DevTools is reachable.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::{Child, Command};

use crate::cdp::CdpConnection;
use crate::error::BrowserError;
use crate::page::PageHandle;

/// How long to keep polling the discovery endpoint after spawn.
const DISCOVERY_ATTEMPTS: u32 = 40;
const DISCOVERY_INTERVAL: Duration = Duration::from_millis(500);

/// Launch configuration for the controlled Chrome instance.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Explicit Chrome executable. `None` falls back to `google-chrome`
    /// on PATH.
    pub executable: Option<PathBuf>,
    /// Persistent profile directory.
    pub user_data_dir: PathBuf,
    /// Remote debugging port.
    pub debug_port: u16,
    /// Run headless. The portal login is interactive, so the default
    /// is headed.
    pub headless: bool,
}

impl BrowserConfig {
    pub fn new(user_data_dir: impl Into<PathBuf>, debug_port: u16) -> Self {
        Self {
            executable: None,
            user_data_dir: user_data_dir.into(),
            debug_port,
            headless: false,
        }
    }
}

/// A running Chrome process plus its DevTools HTTP endpoint.
///
/// Keep this alive for as long as the page connection is in use; the
/// child process is not killed on drop, so a persistent session
/// survives server restarts.
pub struct Browser {
    #[allow(dead_code)]
    child: Child,
    http_endpoint: String,
}

/// A single target entry from `/json/list`.
#[derive(Debug, Deserialize)]
struct TargetInfo {
    #[serde(rename = "type")]
    target_type: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    ws_debugger_url: Option<String>,
}

/// Version payload from `/json/version`, used only as a liveness probe.
#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "Browser")]
    browser: String,
}

/// Spawn Chrome and wait for its DevTools endpoint to come up.
pub async fn launch(config: &BrowserConfig) -> Result<Browser, BrowserError> {
    let program = config
        .executable
        .as_ref()
        .map(|p| p.as_os_str().to_os_string())
        .unwrap_or_else(|| "google-chrome".into());

    let mut cmd = Command::new(&program);
    cmd.arg(format!("--remote-debugging-port={}", config.debug_port))
        .arg(format!(
            "--user-data-dir={}",
            config.user_data_dir.display()
        ))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--no-first-run")
        .arg("--no-default-browser-check");
    if config.headless {
        cmd.arg("--headless=new");
    }

    let child = cmd
        .spawn()
        .map_err(|e| BrowserError::Launch(format!("{}: {e}", program.to_string_lossy())))?;

    let http_endpoint = format!("http://127.0.0.1:{}", config.debug_port);

    // Chrome needs a moment before the discovery endpoint answers.
    let mut last_err = String::new();
    for attempt in 0..DISCOVERY_ATTEMPTS {
        match probe_version(&http_endpoint).await {
            Ok(version) => {
                tracing::info!(
                    browser = %version.browser,
                    endpoint = %http_endpoint,
                    attempt,
                    "Chrome DevTools endpoint is live",
                );
                return Ok(Browser {
                    child,
                    http_endpoint,
                });
            }
            Err(e) => {
                last_err = e.to_string();
                tokio::time::sleep(DISCOVERY_INTERVAL).await;
            }
        }
    }

    Err(BrowserError::Discovery(format!(
        "DevTools endpoint at {http_endpoint} never came up: {last_err}"
    )))
}

async fn probe_version(endpoint: &str) -> Result<VersionInfo, BrowserError> {
    let info = reqwest::get(format!("{endpoint}/json/version"))
        .await
        .map_err(|e| BrowserError::Discovery(e.to_string()))?
        .json::<VersionInfo>()
        .await
        .map_err(|e| BrowserError::Discovery(e.to_string()))?;
    Ok(info)
}

impl Browser {
    /// Connect to the first open page target.
    ///
    /// A fresh profile always has exactly one page (about:blank or the
    /// restored session), which mirrors the single-tab assumption the
    /// rest of the automation makes.
    pub async fn connect_page(&self) -> Result<PageHandle, BrowserError> {
        let targets: Vec<TargetInfo> = reqwest::get(format!("{}/json/list", self.http_endpoint))
            .await
            .map_err(|e| BrowserError::Discovery(e.to_string()))?
            .json()
            .await
            .map_err(|e| BrowserError::Discovery(e.to_string()))?;

        let page = targets
            .into_iter()
            .find(|t| t.target_type == "page")
            .ok_or_else(|| BrowserError::Discovery("No page target found".to_string()))?;

        let ws_url = page.ws_debugger_url.ok_or_else(|| {
            BrowserError::Discovery(format!(
                "Page target '{}' has no webSocketDebuggerUrl (another client attached?)",
                page.url
            ))
        })?;

        let conn = CdpConnection::connect(&ws_url).await?;
        tracing::info!(page_url = %page.url, "Attached to page target");
        Ok(PageHandle::new(conn))
    }
}
