//! Login bootstrap: launch Chrome, open the portal, and hand the page
//! to the automation service once the user has signed in.
//!
//! The portal login itself is interactive (the user types credentials
//! into the real browser window), so the handler answers as soon as
//! the login page is open and a background task waits for the
//! logged-in marker with no deadline. `GET /health` reports
//! `browser_ready` once the surface is installed.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use tilebot_automation::driver::selectors::{LOGIN_MARKER_XPATH, LOGIN_MENU_XPATH};
use tilebot_browser::BrowserConfig;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/login
pub async fn login(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let config = &state.config;

    let mut slot = state.browser.lock().await;
    let browser = match slot.as_mut() {
        Some(browser) => browser,
        None => {
            let mut browser_config = BrowserConfig::new(
                config.chrome_user_data_dir.clone(),
                config.chrome_debug_port,
            );
            browser_config.executable = config.chrome_path.clone();

            let launched = tilebot_browser::launch(&browser_config).await?;
            tracing::info!(
                port = config.chrome_debug_port,
                "Chrome launched for portal login",
            );
            slot.insert(launched)
        }
    };

    let page = browser.connect_page().await?;
    page.navigate(&config.portal_url).await?;
    page.click_xpath(LOGIN_MENU_XPATH).await?;

    // The marker element only renders after a successful sign-in; the
    // user may take minutes, so this waits on a background task.
    let automation = Arc::clone(&state.automation);
    tokio::spawn(async move {
        match page.wait_for_xpath(LOGIN_MARKER_XPATH).await {
            Ok(()) => {
                automation.install_surface(Arc::new(page)).await;
                tracing::info!("Portal login completed");
            }
            Err(e) => {
                tracing::error!(error = %e, "Portal login watch failed");
            }
        }
    });

    Ok(Json(DataResponse {
        data: serde_json::json!({ "login_started": true }),
    }))
}
