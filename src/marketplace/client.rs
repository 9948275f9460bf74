//! HTTP page extractor for rules.art card pages

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::traits::{PageExtractor, RawPage};
use crate::config::MarketplaceConfig;
use crate::constants::USER_AGENT;
use crate::error::{Error, Result};
use crate::records::RecordKind;
use crate::utils::{Pacer, RetryStrategy};

/// Downloads card pages and reads the title and table regions by CSS selector.
/// Consecutive requests are spaced by the configured settle delay.
pub struct HttpPageExtractor {
    http: HttpClient,
    pacer: Pacer,
    retry: RetryStrategy,
    title_selector: String,
    table_selector: String,
    offers_selector: String,
}

#[derive(Debug)]
enum DownloadError {
    Transient(String),
    Permanent(String),
}

impl DownloadError {
    fn is_transient(&self) -> bool {
        matches!(self, DownloadError::Transient(_))
    }

    fn into_message(self) -> String {
        match self {
            DownloadError::Transient(msg) | DownloadError::Permanent(msg) => msg,
        }
    }
}

impl std::fmt::Display for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadError::Transient(msg) | DownloadError::Permanent(msg) => f.write_str(msg),
        }
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
            DownloadError::Transient(e.to_string())
        } else {
            DownloadError::Permanent(e.to_string())
        }
    }
}

impl HttpPageExtractor {
    pub fn new(config: &MarketplaceConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        Self::with_client(config, http)
    }

    /// Use a prebuilt client; the request timeout and user agent are whatever
    /// `http` was built with.
    pub fn with_client(config: &MarketplaceConfig, http: HttpClient) -> Result<Self> {
        for selector in [
            &config.title_selector,
            &config.table_selector,
            &config.offers_selector,
        ] {
            parse_selector(selector)?;
        }

        Ok(Self {
            http,
            pacer: Pacer::new(config.settle_delay()),
            retry: config.retry_strategy(),
            title_selector: config.title_selector.clone(),
            table_selector: config.table_selector.clone(),
            offers_selector: config.offers_selector.clone(),
        })
    }

    fn table_selector(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Sales => &self.table_selector,
            RecordKind::Offers => &self.offers_selector,
        }
    }

    /// Every attempt, retries included, waits its turn on the pacer.
    async fn download(&self, url: &str) -> std::result::Result<String, DownloadError> {
        self.pacer.wait().await;
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let msg = format!("HTTP {} from {}", status, url);
            return Err(
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                    DownloadError::Transient(msg)
                } else {
                    DownloadError::Permanent(msg)
                },
            );
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl PageExtractor for HttpPageExtractor {
    async fn fetch(&self, url: &str, kind: RecordKind) -> Result<RawPage> {
        debug!("Fetching {} page: {}", kind, url);

        let body = self
            .retry
            .run(url, DownloadError::is_transient, move || self.download(url))
            .await
            .map_err(|e| Error::Fetch(e.into_message()))?;

        extract_regions(&body, &self.title_selector, self.table_selector(kind))
    }
}

/// Read the visible text of the title and table regions from `html`.
///
/// Each non-blank text node becomes one line. A missing title yields an
/// empty string; a missing table is a parse error.
pub fn extract_regions(html: &str, title_selector: &str, table_selector: &str) -> Result<RawPage> {
    let document = Html::parse_document(html);

    let title = select_text(&document, title_selector)?.unwrap_or_default();
    let table_text = select_text(&document, table_selector)?.ok_or_else(|| {
        Error::Parse(format!("table region {:?} not found on page", table_selector))
    })?;

    Ok(RawPage { title, table_text })
}

fn select_text(document: &Html, selector: &str) -> Result<Option<String>> {
    let selector = parse_selector(selector)?;
    Ok(document.select(&selector).next().map(visible_lines))
}

fn visible_lines(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::Config(format!("Invalid selector {:?}: {:?}", selector, e)))
}
