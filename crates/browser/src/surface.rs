//! The [`UiSurface`] trait: the contract between the automation engine
//! and the controlled browser.
//!
//! The upload driver only ever talks to this trait, so tests can swap
//! in a scripted surface while production wires in [`PageHandle`].

use std::path::Path;

use async_trait::async_trait;

use crate::error::BrowserError;
use crate::page::PageHandle;

/// Everything the upload driver needs from the controlled page.
///
/// All `frame_*` operations are scoped to the portal's upload iframe;
/// the rest target the top-level document.
#[async_trait]
pub trait UiSurface: Send + Sync {
    /// Load a URL in the controlled page.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Click a top-level element by XPath.
    async fn click_xpath(&self, xpath: &str) -> Result<(), BrowserError>;

    /// Wait (no deadline) until a top-level XPath matches.
    async fn wait_for_xpath(&self, xpath: &str) -> Result<(), BrowserError>;

    /// Click the iframe `<input>` with the given `value` attribute.
    async fn frame_click_value(&self, value: &str) -> Result<(), BrowserError>;

    /// Click the iframe element whose trimmed text matches.
    async fn frame_click_text(&self, text: &str, exact: bool) -> Result<(), BrowserError>;

    /// Click an iframe element by XPath.
    async fn frame_click_xpath(&self, xpath: &str) -> Result<(), BrowserError>;

    /// Attach a file to the iframe's file input.
    async fn frame_set_files(&self, path: &Path) -> Result<(), BrowserError>;

    /// Wait (no deadline) until an iframe XPath matches.
    async fn frame_wait_for_xpath(&self, xpath: &str) -> Result<(), BrowserError>;

    /// Read an iframe input's current value.
    async fn frame_input_value(&self, xpath: &str) -> Result<String, BrowserError>;

    /// Fill an iframe input.
    async fn frame_fill(&self, xpath: &str, value: &str) -> Result<(), BrowserError>;

    /// Choose an iframe dropdown option by index.
    async fn frame_select_index(&self, xpath: &str, index: u32) -> Result<(), BrowserError>;
}

#[async_trait]
impl UiSurface for PageHandle {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        PageHandle::navigate(self, url).await
    }

    async fn click_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        PageHandle::click_xpath(self, xpath).await
    }

    async fn wait_for_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        PageHandle::wait_for_xpath(self, xpath).await
    }

    async fn frame_click_value(&self, value: &str) -> Result<(), BrowserError> {
        PageHandle::frame_click_value(self, value).await
    }

    async fn frame_click_text(&self, text: &str, exact: bool) -> Result<(), BrowserError> {
        PageHandle::frame_click_text(self, text, exact).await
    }

    async fn frame_click_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        PageHandle::frame_click_xpath(self, xpath).await
    }

    async fn frame_set_files(&self, path: &Path) -> Result<(), BrowserError> {
        PageHandle::frame_set_files(self, path).await
    }

    async fn frame_wait_for_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        PageHandle::frame_wait_for_xpath(self, xpath).await
    }

    async fn frame_input_value(&self, xpath: &str) -> Result<String, BrowserError> {
        PageHandle::frame_input_value(self, xpath).await
    }

    async fn frame_fill(&self, xpath: &str, value: &str) -> Result<(), BrowserError> {
        PageHandle::frame_fill(self, xpath, value).await
    }

    async fn frame_select_index(&self, xpath: &str, index: u32) -> Result<(), BrowserError> {
        PageHandle::frame_select_index(self, xpath, index).await
    }
}
