//! Harvest pipeline orchestrator.
//!
//! This module provides the [`HarvestPipeline`] coordinator that walks the
//! feed and runs every CVE id through the sequential stages
//! (Exclusion → Reconciler → Registry → Component/Versions → OSV) with:
//! - One registry request in flight at a time
//! - A tagged [`Outcome`] per CVE id separating silent skips from fatal errors
//! - Structured logging via `tracing`

use std::time::Instant;
use tracing::{debug, info};

use crate::config::HarvesterConfig;
use crate::harvest::component::{component_from_description, resolve_component};
use crate::harvest::osv::assemble;
use crate::harvest::reconcile::ModifiedIndex;
use crate::model::{FeedDocument, FeedItem, OsvRecord};
use crate::traits::{HarvestError, RegistrySource};

// ============================================================================
// Pipeline Types
// ============================================================================

/// Why a CVE id produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The raw feed-item id is on the exclusion list
    Excluded,

    /// The persisted record is at least as fresh as the feed item
    NotNewer,

    /// The registry record lacks a component, versions or a CVSS vector
    Incomplete,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excluded => "excluded",
            Self::NotNewer => "not_newer",
            Self::Incomplete => "incomplete",
        }
    }
}

/// Result of processing a single CVE id.
#[derive(Debug)]
pub enum Outcome {
    Emit(Box<OsvRecord>),
    Skip(SkipReason),
    Fatal(HarvestError),
}

/// Records produced by a full pass over the feed.
#[derive(Debug)]
pub struct HarvestResult {
    /// Records to persist, in feed order
    pub records: Vec<OsvRecord>,

    /// Processing statistics
    pub stats: HarvestStats,
}

/// Statistics about a pipeline pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestStats {
    /// Feed items processed
    pub items: usize,

    /// CVE ids derived from those items
    pub cve_ids: usize,

    pub emitted: usize,
    pub excluded: usize,
    pub not_newer: usize,
    pub incomplete: usize,

    /// Total time spent in the pass (milliseconds)
    pub total_duration_ms: u64,
}

impl HarvestStats {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Excluded => self.excluded += 1,
            SkipReason::NotNewer => self.not_newer += 1,
            SkipReason::Incomplete => self.incomplete += 1,
        }
    }
}

/// Splits a feed-item id into its CVE ids.
///
/// Comma-separated ids keep only the trimmed entries that start with `CVE-`;
/// an id without a comma is returned as is.
pub fn split_cve_ids(id: &str) -> Vec<String> {
    if !id.contains(',') {
        return vec![id.to_string()];
    }
    id.split(',')
        .map(str::trim)
        .filter(|part| part.starts_with("CVE-"))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Turns a feed document into OSV records.
///
/// # Example
///
/// ```ignore
/// let pipeline = HarvestPipeline::new(MitreClient::new(&config)?, &config);
/// let result = pipeline.run(&feed, &index).await?;
/// println!("{} records", result.records.len());
/// ```
pub struct HarvestPipeline<'a, R>
where
    R: RegistrySource,
{
    /// Registry record fetcher
    registry: R,

    config: &'a HarvesterConfig,
}

impl<'a, R> HarvestPipeline<'a, R>
where
    R: RegistrySource,
{
    pub fn new(registry: R, config: &'a HarvesterConfig) -> Self {
        Self { registry, config }
    }

    /// Processes every item of `feed` and returns the records to persist.
    ///
    /// # Errors
    ///
    /// Returns the first [`HarvestError`] raised by the registry; no partial
    /// output is returned in that case.
    pub async fn run(
        &self,
        feed: &FeedDocument,
        index: &ModifiedIndex,
    ) -> Result<HarvestResult, HarvestError> {
        let start = Instant::now();
        let mut stats = HarvestStats::default();
        let mut records = Vec::new();

        info!(items = feed.items.len(), known = index.len(), "Starting harvest pass");

        for item in &feed.items {
            stats.items += 1;
            for cve_id in split_cve_ids(&item.id) {
                stats.cve_ids += 1;
                match self.process(item, &cve_id, index).await {
                    Outcome::Emit(record) => {
                        debug!(
                            cve_id = %cve_id,
                            package = %record.affected[0].package.name,
                            "Emitting record"
                        );
                        stats.emitted += 1;
                        records.push(*record);
                    }
                    Outcome::Skip(reason) => {
                        debug!(cve_id = %cve_id, reason = reason.as_str(), "Skipping CVE");
                        stats.record_skip(reason);
                    }
                    Outcome::Fatal(e) => return Err(e),
                }
            }
        }

        stats.total_duration_ms = start.elapsed().as_millis() as u64;
        info!(
            emitted = stats.emitted,
            excluded = stats.excluded,
            not_newer = stats.not_newer,
            incomplete = stats.incomplete,
            duration_ms = stats.total_duration_ms,
            "Harvest pass completed"
        );

        Ok(HarvestResult { records, stats })
    }

    /// Runs one CVE id of `item` through all stages.
    pub async fn process(&self, item: &FeedItem, cve_id: &str, index: &ModifiedIndex) -> Outcome {
        if self.config.is_excluded(&item.id) {
            return Outcome::Skip(SkipReason::Excluded);
        }
        if index.is_stale(cve_id, &item.date_published) {
            return Outcome::Skip(SkipReason::NotNewer);
        }

        let record = match self.registry.fetch_record(&item.external_url, cve_id).await {
            Ok(record) => record,
            Err(e) => return Outcome::Fatal(e),
        };
        if !record.is_complete() {
            return Outcome::Skip(SkipReason::Incomplete);
        }

        let description_component = component_from_description(&record.description)
            .or_else(|| component_from_description(&item.content_text));
        let component = resolve_component(description_component.as_deref(), &record.component);

        Outcome::Emit(Box::new(assemble(
            item,
            cve_id,
            &record.description,
            &component,
            &record.versions,
            &record.cvss,
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
