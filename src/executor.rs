use crate::config::HarvesterConfig;
use crate::feed::FeedClient;
use crate::harvest::pipeline::{HarvestPipeline, HarvestResult};
use crate::registry::MitreClient;
use crate::store::OsvStore;
use crate::traits::{FeedSource, HarvestError, RegistrySource};
use tracing::{info, instrument};

/// Summary of a completed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Records written to the store
    pub written: usize,
    /// CVE ids seen in the feed
    pub seen: usize,
}

/// Runs a full update: fetch the feed, reconcile against the store, and
/// persist the new records.
pub struct HarvesterExecutor<F, R> {
    config: HarvesterConfig,
    feed: F,
    registry: R,
    store: OsvStore,
}

impl HarvesterExecutor<FeedClient, MitreClient> {
    /// Executor talking to the real feed and registry.
    pub fn from_config(config: HarvesterConfig) -> Result<Self, HarvestError> {
        let feed = FeedClient::new(&config)?;
        let registry = MitreClient::new(&config)?;
        Ok(Self::new(config, feed, registry))
    }
}

impl<F, R> HarvesterExecutor<F, R>
where
    F: FeedSource,
    R: RegistrySource,
{
    pub fn new(config: HarvesterConfig, feed: F, registry: R) -> Self {
        let store = OsvStore::new(config.vulns_dir());
        Self {
            config,
            feed,
            registry,
            store,
        }
    }

    pub fn config(&self) -> &HarvesterConfig {
        &self.config
    }

    /// Fetches the feed and returns the records that need writing.
    ///
    /// Nothing is written here.
    #[instrument(skip(self), fields(dir = %self.store.dir().display()))]
    pub async fn collect(&self) -> Result<HarvestResult, HarvestError> {
        let feed = self.feed.fetch_feed().await?;
        let index = self.store.load_index().await?;
        HarvestPipeline::new(&self.registry, &self.config)
            .run(&feed, &index)
            .await
    }

    /// Collects and persists.
    ///
    /// # Errors
    ///
    /// Stops at the first fetch, decode or persistence failure.
    #[instrument(skip(self))]
    pub async fn update(&self) -> Result<UpdateSummary, HarvestError> {
        info!("Fetching k8s CVEs");
        let result = self.collect().await?;

        for record in &result.records {
            self.store.write(record).await?;
        }

        let summary = UpdateSummary {
            written: result.records.len(),
            seen: result.stats.cve_ids,
        };
        info!(written = summary.written, seen = summary.seen, "Update finished");
        Ok(summary)
    }
}
