use std::sync::Arc;

use tilebot_automation::AutomationService;

use crate::config::ServerConfig;

/// Shared application state injected into every handler.
///
/// `browser` keeps the Chrome process handle alive for the lifetime of
/// the server; the page surface itself lives inside the automation
/// service once login installs it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub automation: Arc<AutomationService>,
    pub browser: Arc<tokio::sync::Mutex<Option<tilebot_browser::Browser>>>,
}

impl AppState {
    pub fn new(config: ServerConfig, automation: Arc<AutomationService>) -> Self {
        Self {
            config: Arc::new(config),
            automation,
            browser: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }
}
