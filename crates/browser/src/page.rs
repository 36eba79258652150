//! Page-level operations built on `Runtime.evaluate` and the DOM domain.
//!
//! The portal renders its upload forms inside a same-origin iframe, so
//! every frame-scoped operation resolves `iframe.contentDocument`
//! first. Element lookups use XPath (matching the selectors recorded
//! from the portal) or CSS where the control is identified by its
//! `value` attribute.
//!
//! Waits are polling-based with no deadline: the portal's metadata
//! extraction is allowed to take arbitrarily long, and a slow portal
//! is not an error.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::cdp::CdpConnection;
use crate::error::BrowserError;

/// Poll interval for wait/navigation loops.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Navigation is bounded (unlike form waits): 60 seconds.
const NAVIGATION_ATTEMPTS: u32 = 120;

/// Handle to the single controlled page.
pub struct PageHandle {
    conn: Arc<CdpConnection>,
}

/// Uniform reply shape produced by every injected script.
#[derive(Debug, Deserialize)]
struct EvalReply {
    ok: bool,
    #[serde(default)]
    err: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

/// Quote a Rust string as a JavaScript string literal.
fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Prologue that resolves the portal iframe's document as `d`, or
/// bails out with a not-found reply.
const FRAME_PROLOGUE: &str = "const f = document.querySelector('iframe');\
     const d = f && f.contentDocument;\
     if (!d) return { ok: false, err: 'iframe not found' };";

/// XPath lookup against document `d`, binding the node as `el`.
fn xpath_lookup(xpath: &str) -> String {
    format!(
        "const el = d.evaluate({xp}, d, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null)\
             .singleNodeValue;\
         if (!el) return {{ ok: false, err: 'no match for xpath ' + {xp} }};",
        xp = quote(xpath)
    )
}

impl PageHandle {
    pub fn new(conn: Arc<CdpConnection>) -> Self {
        Self { conn }
    }

    /// Evaluate an expression body wrapped in an IIFE and parse the
    /// uniform `{ok, err?, value?}` reply.
    async fn eval(&self, body: &str) -> Result<EvalReply, BrowserError> {
        let expression = format!("(() => {{ {body} }})()");
        let result = self
            .conn
            .call(
                "Runtime.evaluate",
                json!({ "expression": expression, "returnByValue": true }),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let text = details
                .get("exception")
                .and_then(|e| e.get("description"))
                .or_else(|| details.get("text"))
                .and_then(|t| t.as_str())
                .unwrap_or("script threw");
            return Err(BrowserError::Script(text.to_string()));
        }

        let value = result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        serde_json::from_value(value)
            .map_err(|e| BrowserError::Script(format!("malformed script reply: {e}")))
    }

    /// Run a script body and turn a `{ok: false}` reply into
    /// [`BrowserError::ElementNotFound`].
    async fn run(&self, body: &str) -> Result<EvalReply, BrowserError> {
        let reply = self.eval(body).await?;
        if reply.ok {
            Ok(reply)
        } else {
            Err(BrowserError::ElementNotFound(
                reply.err.unwrap_or_else(|| "element not found".to_string()),
            ))
        }
    }

    /// Run a script body, reporting only whether the target exists.
    async fn probe(&self, body: &str) -> Result<bool, BrowserError> {
        Ok(self.eval(body).await?.ok)
    }

    // -- top-level document operations --------------------------------------

    /// Navigate the page and wait (bounded) for the load to settle.
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.conn
            .call("Page.navigate", json!({ "url": url }))
            .await?;

        for _ in 0..NAVIGATION_ATTEMPTS {
            let settled = self
                .probe("return { ok: document.readyState === 'complete' };")
                .await?;
            if settled {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Err(BrowserError::Script(format!("navigation to {url} timed out")))
    }

    /// Click an element in the top-level document by XPath.
    pub async fn click_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        let body = format!(
            "const el = document.evaluate({xp}, document, null,\
                 XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;\
             if (!el) return {{ ok: false, err: 'no match for xpath ' + {xp} }};\
             el.click();\
             return {{ ok: true }};",
            xp = quote(xpath)
        );
        self.run(&body).await?;
        Ok(())
    }

    /// Wait without deadline until an XPath matches in the top-level
    /// document. Used for the logged-in marker during login bootstrap.
    pub async fn wait_for_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        let body = format!(
            "const el = document.evaluate({xp}, document, null,\
                 XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;\
             return {{ ok: !!el }};",
            xp = quote(xpath)
        );
        loop {
            if self.probe(&body).await? {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    // -- iframe-scoped operations --------------------------------------------

    /// Click the `<input>` whose `value` attribute equals `value`.
    pub async fn frame_click_value(&self, value: &str) -> Result<(), BrowserError> {
        let body = format!(
            "{FRAME_PROLOGUE}\
             const el = d.querySelector('input[value=' + {v} + ']');\
             if (!el) return {{ ok: false, err: 'no input with value ' + {v} }};\
             el.click();\
             return {{ ok: true }};",
            v = quote(value)
        );
        self.run(&body).await?;
        Ok(())
    }

    /// Click an element inside the iframe by XPath.
    pub async fn frame_click_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        let body = format!(
            "{FRAME_PROLOGUE}\
             {lookup}\
             el.click();\
             return {{ ok: true }};",
            lookup = xpath_lookup(xpath)
        );
        self.run(&body).await?;
        Ok(())
    }

    /// Click the deepest element whose trimmed text matches.
    ///
    /// Non-exact matching is substring-based, mirroring how the portal
    /// labels carry stray whitespace.
    pub async fn frame_click_text(&self, text: &str, exact: bool) -> Result<(), BrowserError> {
        let body = format!(
            "{FRAME_PROLOGUE}\
             const needle = {t}.trim();\
             const all = Array.from(d.querySelectorAll('*'));\
             const hits = all.filter(el => {{\
                 const s = (el.textContent || '').trim();\
                 return {exact} ? s === needle : s.includes(needle);\
             }});\
             const leaf = hits.find(el => !hits.some(o => o !== el && el.contains(o)));\
             if (!leaf) return {{ ok: false, err: 'no element with text ' + {t} }};\
             leaf.click();\
             return {{ ok: true }};",
            t = quote(text),
            exact = exact
        );
        self.run(&body).await?;
        Ok(())
    }

    /// Wait without deadline until an XPath matches inside the iframe.
    pub async fn frame_wait_for_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        let body = format!(
            "{FRAME_PROLOGUE}\
             {lookup}\
             return {{ ok: true }};",
            lookup = xpath_lookup(xpath)
        );
        loop {
            if self.probe(&body).await? {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Read the current value of an input inside the iframe.
    pub async fn frame_input_value(&self, xpath: &str) -> Result<String, BrowserError> {
        let body = format!(
            "{FRAME_PROLOGUE}\
             {lookup}\
             return {{ ok: true, value: String(el.value ?? '') }};",
            lookup = xpath_lookup(xpath)
        );
        let reply = self.run(&body).await?;
        Ok(reply.value.unwrap_or_default())
    }

    /// Fill an input inside the iframe, firing input/change events so
    /// the portal's own listeners observe the edit.
    pub async fn frame_fill(&self, xpath: &str, value: &str) -> Result<(), BrowserError> {
        let body = format!(
            "{FRAME_PROLOGUE}\
             {lookup}\
             el.value = {v};\
             el.dispatchEvent(new Event('input', {{ bubbles: true }}));\
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));\
             return {{ ok: true }};",
            lookup = xpath_lookup(xpath),
            v = quote(value)
        );
        self.run(&body).await?;
        Ok(())
    }

    /// Choose a dropdown option by index inside the iframe.
    pub async fn frame_select_index(&self, xpath: &str, index: u32) -> Result<(), BrowserError> {
        let body = format!(
            "{FRAME_PROLOGUE}\
             {lookup}\
             if (el.options.length <= {index})\
                 return {{ ok: false, err: 'select has ' + el.options.length + ' options' }};\
             el.selectedIndex = {index};\
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));\
             return {{ ok: true }};",
            lookup = xpath_lookup(xpath)
        );
        self.run(&body).await?;
        Ok(())
    }

    /// Attach a file to the iframe's file input.
    ///
    /// JavaScript cannot set file inputs, so this goes through the DOM
    /// domain: a piercing document snapshot, a search for the input,
    /// then `DOM.setFileInputFiles`.
    pub async fn frame_set_files(&self, path: &Path) -> Result<(), BrowserError> {
        // Enables the DOM agent and gives the search a root.
        self.conn
            .call("DOM.getDocument", json!({ "depth": -1, "pierce": true }))
            .await?;

        let search = self
            .conn
            .call(
                "DOM.performSearch",
                json!({ "query": "input[type=\"file\"]", "includeUserAgentShadowDOM": false }),
            )
            .await?;

        let search_id = search
            .get("searchId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BrowserError::Script("DOM.performSearch returned no searchId".into()))?
            .to_string();
        let count = search
            .get("resultCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        if count == 0 {
            let _ = self
                .conn
                .call("DOM.discardSearchResults", json!({ "searchId": search_id }))
                .await;
            return Err(BrowserError::ElementNotFound(
                "no file input on the page".to_string(),
            ));
        }

        let results = self
            .conn
            .call(
                "DOM.getSearchResults",
                json!({ "searchId": search_id, "fromIndex": 0, "toIndex": 1 }),
            )
            .await?;
        let node_id = results
            .get("nodeIds")
            .and_then(|v| v.as_array())
            .and_then(|a| a.first())
            .and_then(|v| v.as_u64())
            .ok_or_else(|| BrowserError::Script("DOM.getSearchResults returned no node".into()))?;

        let _ = self
            .conn
            .call("DOM.discardSearchResults", json!({ "searchId": search_id }))
            .await;

        self.conn
            .call(
                "DOM.setFileInputFiles",
                json!({ "files": [path.display().to_string()], "nodeId": node_id }),
            )
            .await?;
        Ok(())
    }
}
