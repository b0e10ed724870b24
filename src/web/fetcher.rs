//! Single-request page fetcher with text extraction.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use super::FetchError;

/// Timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Paragraphs at or below this many bytes are left out of the structured text.
const MIN_PARAGRAPH_LEN: usize = 20;

/// Extracted page content.
#[derive(Debug, Clone, Serialize)]
pub struct PageContent {
    /// URL actually requested
    pub url: String,
    /// Trimmed `<title>` text
    pub title: String,
    /// `<meta name="description">` content
    pub description: String,
    /// Trimmed body text without scripts or styles
    pub body: String,
    /// Headings, then paragraphs, then list items, one per line
    pub all_text: String,
    /// Response headers
    pub headers: BTreeMap<String, Vec<String>>,
    /// HTTP status code
    pub status_code: u16,
    /// When the response was received
    pub fetched_at: DateTime<Utc>,
}

impl PageContent {
    /// Structured text if any was found, else the body text.
    pub fn main_content(&self) -> &str {
        if self.all_text.is_empty() {
            &self.body
        } else {
            &self.all_text
        }
    }
}

/// HTTP page fetcher.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher; `None` or a zero duration uses [`DEFAULT_TIMEOUT`].
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let timeout = timeout.filter(|t| !t.is_zero()).unwrap_or(DEFAULT_TIMEOUT);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, timeout })
    }

    /// Configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches and parses one page. No retries.
    pub async fn fetch(&self, url: &str) -> Result<PageContent, FetchError> {
        let url = normalize_url(url)?;
        info!(url = %url, timeout_secs = self.timeout.as_secs(), "Fetching page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let html = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;
        debug!(url = %url, bytes = html.len(), "Received page body");

        let mut content = parse_page(url.as_str(), &html)?;
        content.status_code = status.as_u16();
        content.headers = headers;
        Ok(content)
    }
}

/// Adds `https://` when no scheme is given and validates the result.
pub fn normalize_url(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    Url::parse(&with_scheme).map_err(|e| FetchError::Parse(format!("invalid URL {with_scheme}: {e}")))
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse(format!("selector {css}: {e}")))
}

/// Extracts title, description and text from an HTML document.
pub fn parse_page(url: &str, html: &str) -> Result<PageContent, FetchError> {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector("title")?)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let description = document
        .select(&selector("meta[name='description']")?)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string();

    let body = document
        .select(&selector("body")?)
        .next()
        .map(|el| visible_text(el).trim().to_string())
        .unwrap_or_default();

    let mut texts = Vec::new();
    for el in document.select(&selector("h1, h2, h3, h4, h5, h6")?) {
        let text = visible_text(el);
        let text = text.trim();
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }
    for el in document.select(&selector("p")?) {
        let text = visible_text(el);
        let text = text.trim();
        if text.len() > MIN_PARAGRAPH_LEN {
            texts.push(text.to_string());
        }
    }
    for el in document.select(&selector("li")?) {
        let text = visible_text(el);
        let text = text.trim();
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }

    Ok(PageContent {
        url: url.to_string(),
        title,
        description,
        body,
        all_text: texts.join("\n"),
        headers: BTreeMap::new(),
        status_code: 200,
        fetched_at: Utc::now(),
    })
}

/// Text content of `element`, skipping `<script>` and `<style>` subtrees.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_visible_text(element, &mut out);
    out
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !matches!(child_element.value().name(), "script" | "style") {
                collect_visible_text(child_element, out);
            }
        }
    }
}
