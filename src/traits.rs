use crate::model::{FeedDocument, RegistryRecord};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a harvest run.
///
/// Per-record data problems (missing component, no versions, unparsable
/// stored timestamps) are never reported through this type; the pipeline
/// skips those records instead.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// The feed or registry could not be reached, or answered with an error status
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// A response body or stored record is not the JSON we expect
    #[error("Failed to decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    /// Directory creation, file read or file write failed
    #[error("Failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize OSV record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Source of the upstream CVE feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches and decodes the whole feed document.
    async fn fetch_feed(&self) -> Result<FeedDocument, HarvestError>;
}

/// Source of authoritative CVE records.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Retrieves the registry record for `cve_id`.
    ///
    /// `external_url` is the feed item's registry link. Implementations may
    /// return an empty [`RegistryRecord`] when the link does not point at the
    /// registry; the pipeline's completeness gate skips such records.
    async fn fetch_record(
        &self,
        external_url: &str,
        cve_id: &str,
    ) -> Result<RegistryRecord, HarvestError>;
}

#[async_trait]
impl<'a, T> RegistrySource for &'a T
where
    T: RegistrySource + ?Sized,
{
    async fn fetch_record(
        &self,
        external_url: &str,
        cve_id: &str,
    ) -> Result<RegistryRecord, HarvestError> {
        (**self).fetch_record(external_url, cve_id).await
    }
}
