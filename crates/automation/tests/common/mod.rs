//! Shared fixtures: a scripted [`UiSurface`] and metadata builders.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use tilebot_browser::{BrowserError, UiSurface};
use tilebot_core::job::BatchMetadata;

/// Scripted stand-in for the controlled page.
///
/// The per-file behavior is keyed by the file name last handed to
/// `frame_set_files`: the form's derived address field reads from the
/// `alamat` script, and a file listed in `fail_fill_for` makes every
/// form fill fail. An optional semaphore gate blocks the
/// metadata-extraction wait until the test releases a permit, which
/// lets tests freeze a run mid-file.
#[derive(Default)]
pub struct MockSurface {
    alamat: HashMap<String, String>,
    fail_fill_for: Option<String>,
    gate: Option<Arc<Semaphore>>,
    current_file: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the derived address returned for a file. Files without a
    /// script get a non-blank default.
    pub fn with_alamat(mut self, file: &str, value: &str) -> Self {
        self.alamat.insert(file.to_string(), value.to_string());
        self
    }

    /// Make every form fill fail while the given file is attached.
    pub fn failing_fill_on(mut self, file: &str) -> Self {
        self.fail_fill_for = Some(file.to_string());
        self
    }

    /// Block the metadata-extraction wait on the given semaphore.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn current_file(&self) -> String {
        self.current_file.lock().unwrap().clone().unwrap_or_default()
    }
}

#[async_trait]
impl UiSurface for MockSurface {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.record(format!("navigate:{url}"));
        Ok(())
    }

    async fn click_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        self.record(format!("click:{xpath}"));
        Ok(())
    }

    async fn wait_for_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        self.record(format!("wait:{xpath}"));
        Ok(())
    }

    async fn frame_click_value(&self, value: &str) -> Result<(), BrowserError> {
        self.record(format!("frame_click_value:{value}"));
        Ok(())
    }

    async fn frame_click_text(&self, text: &str, _exact: bool) -> Result<(), BrowserError> {
        self.record(format!("frame_click_text:{text}"));
        Ok(())
    }

    async fn frame_click_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        self.record(format!("frame_click_xpath:{xpath}"));
        Ok(())
    }

    async fn frame_set_files(&self, path: &Path) -> Result<(), BrowserError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(format!("frame_set_files:{name}"));
        *self.current_file.lock().unwrap() = Some(name);
        Ok(())
    }

    async fn frame_wait_for_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        self.record(format!("frame_wait:{xpath}"));
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| BrowserError::Connection("gate closed".to_string()))?;
            permit.forget();
        }
        Ok(())
    }

    async fn frame_input_value(&self, _xpath: &str) -> Result<String, BrowserError> {
        let value = self
            .alamat
            .get(&self.current_file())
            .cloned()
            .unwrap_or_else(|| "Jl. Contoh No. 1".to_string());
        Ok(value)
    }

    async fn frame_fill(&self, xpath: &str, value: &str) -> Result<(), BrowserError> {
        if self.fail_fill_for.as_deref() == Some(self.current_file().as_str()) {
            return Err(BrowserError::Script(format!(
                "input rejected value {value:?}"
            )));
        }
        self.record(format!("frame_fill:{xpath}={value}"));
        Ok(())
    }

    async fn frame_select_index(&self, xpath: &str, index: u32) -> Result<(), BrowserError> {
        self.record(format!("frame_select:{xpath}#{index}"));
        Ok(())
    }
}

pub fn metadata() -> BatchMetadata {
    BatchMetadata {
        resolution: "0.1".to_string(),
        accuracy: "0.3".to_string(),
        survey_year: "2024".to_string(),
        data_source_index: 2,
        phone_number: "081234567890".to_string(),
    }
}
