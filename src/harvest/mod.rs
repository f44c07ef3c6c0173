//! Harvest module - CVE feed to OSV transformation pipeline.
//!
//! This module provides the decision logic of the harvester:
//! - **Versions**: free-text version expressions to range boundaries ([`versions`])
//! - **Components**: registry/product names to canonical `org/repo` ids ([`component`])
//! - **Reconciliation**: freshness check against persisted records ([`ModifiedIndex`])
//! - **OSV**: record assembly ([`osv`])
//! - **Pipeline**: per-CVE orchestration via [`HarvestPipeline`]

pub mod component;
pub mod osv;
pub mod pipeline;
pub mod reconcile;
pub mod versions;

// Re-export commonly used types
pub use pipeline::{
    split_cve_ids, HarvestPipeline, HarvestResult, HarvestStats, Outcome, SkipReason,
};
pub use reconcile::ModifiedIndex;
