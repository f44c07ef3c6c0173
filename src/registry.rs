//! CVE registry client.
//!
//! Fetches CVE JSON 5 records from `{registry_base_url}/{cve_id}` and reduces
//! them to a [`RegistryRecord`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::HarvesterConfig;
use crate::harvest::versions::version_spec;
use crate::model::{CvssVector, RegistryRecord, CVSS_V3};
use crate::traits::{HarvestError, RegistrySource};

// ============================================================================
// CVE JSON 5 wire format (only the fields we read)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CveRecord {
    pub containers: Containers,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Containers {
    pub cna: Cna,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Cna {
    pub affected: Vec<AffectedProduct>,
    pub descriptions: Vec<Description>,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AffectedProduct {
    pub product: String,
    pub versions: Vec<RegistryVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryVersion {
    pub status: String,
    pub version: String,
    pub less_than: String,
    pub less_than_or_equal: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Description {
    pub lang: String,
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Metric {
    #[serde(rename = "cvssV3_1")]
    pub cvss_v3_1: Option<Cvss>,
    #[serde(rename = "cvssV3_0")]
    pub cvss_v3_0: Option<Cvss>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cvss {
    pub vector_string: String,
}

impl CveRecord {
    /// Reduces the wire record to the fields the pipeline uses.
    pub fn into_registry_record(self) -> RegistryRecord {
        let cna = self.containers.cna;

        let component = cna
            .affected
            .iter()
            .map(|a| a.product.trim())
            .find(|p| !p.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let versions = cna
            .affected
            .iter()
            .flat_map(|a| a.versions.iter())
            .filter(|v| v.status.eq_ignore_ascii_case("affected"))
            .filter_map(|v| version_spec(&v.version, &v.less_than, &v.less_than_or_equal))
            .collect();

        let description = cna
            .descriptions
            .iter()
            .find(|d| d.lang.to_ascii_lowercase().starts_with("en"))
            .or_else(|| cna.descriptions.first())
            .map(|d| d.value.trim().to_string())
            .unwrap_or_default();

        let vector = cna
            .metrics
            .iter()
            .find_map(|m| m.cvss_v3_1.as_ref())
            .or_else(|| cna.metrics.iter().find_map(|m| m.cvss_v3_0.as_ref()))
            .map(|c| c.vector_string.trim().to_string())
            .unwrap_or_default();

        RegistryRecord {
            description,
            component,
            versions,
            cvss: CvssVector {
                kind: CVSS_V3.to_string(),
                vector,
            },
        }
    }
}

/// Decodes a CVE JSON 5 body into a [`RegistryRecord`].
pub fn parse_record(body: &str, source_name: &str) -> Result<RegistryRecord, HarvestError> {
    let record: CveRecord = serde_json::from_str(body).map_err(|e| HarvestError::Decode {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(record.into_registry_record())
}

// ============================================================================
// HTTP client
// ============================================================================

/// Registry client backed by `reqwest`.
pub struct MitreClient {
    base_url: String,
    cve_list_prefix: String,
    http_client: reqwest::Client,
}

impl MitreClient {
    /// Creates a client for the registry configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: &HarvesterConfig) -> Result<Self, HarvestError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| HarvestError::Fetch {
                url: config.registry_base_url.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: config.registry_base_url.trim_end_matches('/').to_string(),
            cve_list_prefix: config.cve_list_prefix.clone(),
            http_client,
        })
    }

    fn record_url(&self, cve_id: &str) -> String {
        format!("{}/{}", self.base_url, cve_id)
    }
}

#[async_trait]
impl RegistrySource for MitreClient {
    async fn fetch_record(
        &self,
        external_url: &str,
        cve_id: &str,
    ) -> Result<RegistryRecord, HarvestError> {
        if !external_url.starts_with(&self.cve_list_prefix) {
            debug!(cve_id, external_url, "No registry link, skipping lookup");
            return Ok(RegistryRecord::default());
        }

        let url = self.record_url(cve_id);
        debug!(cve_id, url = %url, "Fetching registry record");

        let body = get_text(&self.http_client, &url).await?;
        parse_record(&body, &url)
    }
}

/// GETs `url` and returns the body, mapping transport and status failures
/// to [`HarvestError::Fetch`].
pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, HarvestError> {
    let fetch_error = |reason: String| HarvestError::Fetch {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?
        .error_for_status()
        .map_err(|e| fetch_error(e.to_string()))?;

    response.text().await.map_err(|e| fetch_error(e.to_string()))
}
