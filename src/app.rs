use std::path::PathBuf;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::chart::{chart_path, render_to_file, ChartData};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::marketplace::{CardUrls, PageExtractor};
use crate::records::{parse_offers, parse_sales, DatasetKey, RecordKind, SaleRecord};
use crate::store::{DatasetStore, MergeSummary};

/// What one entity's ingestion changed on disk.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub key: DatasetKey,
    pub title: String,
    pub sales: MergeSummary,
    pub offers: Option<MergeSummary>,
}

/// Result of a whole pass over the work list.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub succeeded: Vec<DatasetKey>,
    pub failures: Vec<Error>,
}

impl RunReport {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            succeeded: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn record_failure(&mut self, err: Error) {
        if err.is_corruption() {
            error!("{}", err);
        } else {
            warn!("{}", err);
        }
        self.failures.push(err);
    }

    fn finish(mut self, pass: &str) -> Self {
        self.finished_at = Utc::now();
        info!(
            "{} finished in {}s: {} succeeded, {} failed",
            pass,
            self.finished_at
                .signed_duration_since(self.started_at)
                .num_seconds(),
            self.succeeded.len(),
            self.failures.len()
        );
        self
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch, parse and merge one card. Offers are only touched when
/// `track_offers` is set; sales already persisted stay persisted if the
/// offers step fails.
pub async fn ingest_entity(
    extractor: &dyn PageExtractor,
    store: &DatasetStore,
    urls: &CardUrls,
    key: &DatasetKey,
    track_offers: bool,
) -> Result<IngestOutcome> {
    let url = urls.card_url(key)?;
    let page = extractor.fetch(url.as_str(), RecordKind::Sales).await?;
    debug!("{}: fetched page for {:?}", key, page.title);

    let sales = parse_sales(&page.table_text)?;
    if sales.is_empty() {
        warn!("{}: no sales found at {}", key, url);
    }
    let sales_summary = store.merge_and_persist(key, sales).await?;

    let offers_summary = if track_offers {
        let url = urls.offers_url(key)?;
        let offers_page = extractor.fetch(url.as_str(), RecordKind::Offers).await?;
        let offers = parse_offers(&offers_page.table_text)?;
        Some(store.merge_and_persist(key, offers).await?)
    } else {
        None
    };

    Ok(IngestOutcome {
        key: key.clone(),
        title: page.title,
        sales: sales_summary,
        offers: offers_summary,
    })
}

/// Ingest every key of the work list. A failing key is logged and reported;
/// it never stops the others.
pub async fn run_ingest(config: &Config, extractor: &dyn PageExtractor) -> Result<RunReport> {
    let store = DatasetStore::new(&config.storage_root);
    let urls = CardUrls::from_config(&config.marketplace)?;
    let keys = config.work_list();
    let entity_timeout = config.entity_timeout();
    let track_offers = config.marketplace.track_offers;

    info!("Ingestion started");
    info!("================================");
    info!("Entities: {}", keys.len());
    info!("Storage root: {}", store.root().display());
    info!("Tracking offers: {}", track_offers);

    let mut report = RunReport::start();

    let results: Vec<(DatasetKey, Result<IngestOutcome>)> = stream::iter(keys)
        .map(|key| {
            let store = &store;
            let urls = &urls;
            async move {
                let result = match timeout(
                    entity_timeout,
                    ingest_entity(extractor, store, urls, &key, track_offers),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::Fetch(format!(
                        "gave up after {}s",
                        entity_timeout.as_secs()
                    ))),
                };
                let result = result.map_err(|e| e.for_key(&key));
                (key, result)
            }
        })
        .buffer_unordered(config.max_concurrent_fetches)
        .collect()
        .await;

    for (key, result) in results {
        match result {
            Ok(outcome) => {
                info!(
                    "{}: {} sales fetched, {} new, {} total",
                    key,
                    outcome.sales.fetched,
                    outcome.sales.added(),
                    outcome.sales.merged
                );
                if let Some(offers) = outcome.offers {
                    info!(
                        "{}: {} offers fetched, {} total",
                        key, offers.fetched, offers.merged
                    );
                }
                report.succeeded.push(key);
            }
            Err(e) => report.record_failure(e),
        }
    }

    Ok(report.finish("Ingestion"))
}

/// Chart one key's sales history and return where it was written.
pub fn render_entity(store: &DatasetStore, config: &Config, key: &DatasetKey) -> Result<PathBuf> {
    let sales: Vec<SaleRecord> = store
        .load(key)?
        .ok_or_else(|| Error::MissingDataset(store.path_for(key, RecordKind::Sales)))?;

    let data = ChartData::from_sales(key, &sales, config.chart.last_n)?;
    let path = chart_path(&config.image_root, key, config.chart.chart_format);
    render_to_file(&data, config.chart.chart_format, &path)?;
    Ok(path)
}

/// Chart every key of the work list from what is already on disk.
pub fn run_render(config: &Config) -> RunReport {
    let store = DatasetStore::new(&config.storage_root);

    info!("Rendering started");
    info!("================================");
    info!("Image root: {}", config.image_root.display());

    let mut report = RunReport::start();
    for key in config.work_list() {
        match render_entity(&store, config, &key) {
            Ok(path) => {
                info!("{}: chart written to {}", key, path.display());
                report.succeeded.push(key);
            }
            Err(e) => report.record_failure(e.for_key(&key)),
        }
    }
    report.finish("Rendering")
}
