use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::records::DatasetKey;
use crate::utils::RetryStrategy;

/// Work list plus everything the ingestion and render passes need.
///
/// The JSON file is flat: marketplace and chart settings sit next to the
/// work list and are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub card_types: Vec<String>,
    pub seasons: Vec<u32>,
    pub entity_names: Vec<String>,
    pub storage_root: PathBuf,
    pub image_root: PathBuf,
    #[serde(flatten)]
    pub marketplace: MarketplaceConfig,
    #[serde(flatten)]
    pub chart: ChartConfig,
    #[serde(default = "default_concurrency")]
    pub max_concurrent_fetches: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_offers_suffix")]
    pub offers_path_suffix: String,
    #[serde(default)]
    pub track_offers: bool,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Derived from the retry and pacing settings when absent.
    #[serde(default)]
    pub entity_timeout_secs: Option<u64>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
    #[serde(default = "default_title_selector")]
    pub title_selector: String,
    #[serde(default = "default_table_selector")]
    pub table_selector: String,
    #[serde(default = "default_offers_selector")]
    pub offers_selector: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Html,
    Svg,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Html => "html",
            ChartFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChartConfig {
    #[serde(default)]
    pub chart_format: ChartFormat,
    #[serde(default)]
    pub last_n: Option<usize>,
}

fn default_concurrency() -> usize {
    1
}

fn default_base_url() -> String {
    MARKETPLACE_CARD_URL.to_string()
}

fn default_offers_suffix() -> String {
    OFFERS_PATH_SUFFIX.to_string()
}

fn default_settle_delay_ms() -> u64 {
    SETTLE_DELAY_MS
}

fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    MAX_RETRIES
}

fn default_retry_initial_delay_ms() -> u64 {
    RETRY_INITIAL_DELAY_MS
}

fn default_title_selector() -> String {
    TITLE_SELECTOR.to_string()
}

fn default_table_selector() -> String {
    SALES_TABLE_SELECTOR.to_string()
}

fn default_offers_selector() -> String {
    OFFERS_TABLE_SELECTOR.to_string()
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            offers_path_suffix: default_offers_suffix(),
            track_offers: false,
            settle_delay_ms: default_settle_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            entity_timeout_secs: None,
            max_retries: default_max_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            title_selector: default_title_selector(),
            table_selector: default_table_selector(),
            offers_selector: default_offers_selector(),
        }
    }
}

impl MarketplaceConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy::new(
            self.max_retries,
            Duration::from_millis(self.retry_initial_delay_ms),
            Duration::from_millis(RETRY_MAX_DELAY_MS),
        )
    }

    /// Longest one page fetch can take: every attempt times out, every
    /// backoff is slept, and each attempt queues behind `concurrency`
    /// pacing gaps.
    pub fn fetch_budget(&self, concurrency: usize) -> Duration {
        let retry = self.retry_strategy();
        let attempts = self.max_retries + 1;
        let queued = self.settle_delay() * concurrency.max(1) as u32;
        let backoff: Duration = (0..self.max_retries)
            .map(|attempt| retry.delay_for_attempt(attempt))
            .sum();
        (self.request_timeout() + queued) * attempts + backoff
    }
}

impl Config {
    /// Load `.env`, then the JSON file named by `CARD_LEDGER_CONFIG`
    /// (or `card-ledger.json`), then apply root overrides from the environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_with_overrides(path)
    }

    /// Load `.env`, then the JSON file at `path`, then apply root overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        Self::load_with_overrides(path)
    }

    fn load_with_overrides(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::parse(&read_file(path.as_ref())?)?;

        if let Ok(root) = std::env::var(STORAGE_ROOT_ENV) {
            config.storage_root = PathBuf::from(root);
        }
        if let Ok(root) = std::env::var(IMAGE_ROOT_ENV) {
            config.image_root = PathBuf::from(root);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&read_file(path.as_ref())?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config = Self::parse(text)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Per-entity deadline: the configured value, or room for every page the
    /// entity fetches at its worst plus a margin for parsing and writing.
    pub fn entity_timeout(&self) -> Duration {
        if let Some(secs) = self.marketplace.entity_timeout_secs {
            return Duration::from_secs(secs);
        }
        let pages = if self.marketplace.track_offers { 2 } else { 1 };
        self.marketplace.fetch_budget(self.max_concurrent_fetches) * pages
            + Duration::from_secs(ENTITY_TIMEOUT_MARGIN_SECS)
    }

    pub fn validate(&self) -> Result<()> {
        if self.card_types.is_empty() {
            return Err(Error::Config("card_types is empty".into()));
        }
        if self.seasons.is_empty() {
            return Err(Error::Config("seasons is empty".into()));
        }
        if self.entity_names.is_empty() {
            return Err(Error::Config("entity_names is empty".into()));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(Error::Config("max_concurrent_fetches must be at least 1".into()));
        }
        if self.chart.last_n == Some(0) {
            return Err(Error::Config("last_n must be at least 1 when set".into()));
        }
        Ok(())
    }

    /// Every (card_type, season, entity_name) triple, card types outermost.
    pub fn work_list(&self) -> Vec<DatasetKey> {
        let mut keys = Vec::with_capacity(
            self.card_types.len() * self.seasons.len() * self.entity_names.len(),
        );
        for card_type in &self.card_types {
            for season in &self.seasons {
                for name in &self.entity_names {
                    keys.push(DatasetKey::new(card_type, *season, name));
                }
            }
        }
        keys
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}
