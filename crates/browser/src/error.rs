/// Errors from the browser automation layer.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// Chrome could not be started.
    #[error("Failed to launch Chrome: {0}")]
    Launch(String),

    /// The DevTools discovery endpoint did not answer or returned
    /// something unusable.
    #[error("DevTools discovery failed: {0}")]
    Discovery(String),

    /// The WebSocket connection to the page target failed or closed.
    #[error("DevTools connection error: {0}")]
    Connection(String),

    /// A DevTools command was answered with an error object.
    #[error("DevTools protocol error ({method}): {message}")]
    Protocol { method: String, message: String },

    /// Injected JavaScript threw or could not run.
    #[error("Script error: {0}")]
    Script(String),

    /// A selector/XPath did not match anything on the page.
    #[error("Element not found: {0}")]
    ElementNotFound(String),
}
