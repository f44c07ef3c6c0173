//! Harvester configuration.
//!
//! Every external location the harvester touches lives here and is passed
//! explicitly into the executor, pipeline and store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Official Kubernetes CVE feed (JSON Feed format).
pub const DEFAULT_FEED_URL: &str =
    "https://kubernetes.io/docs/reference/issues-security/official-cve-feed/index.json";

/// CVE JSON 5 registry API; records live at `{base}/{cve_id}`.
pub const DEFAULT_REGISTRY_URL: &str = "https://cveawg.mitre.org/api/cve";

/// Feed items whose `external_url` does not start with this prefix are not
/// looked up in the registry.
pub const DEFAULT_CVE_LIST_PREFIX: &str = "https://www.cve.org/";

pub const DEFAULT_VULN_LIST_DIR: &str = "k8s";

/// Sub-folder of the vuln-list dir holding one OSV file per CVE.
pub const VULN_FOLDER: &str = "vulns";

/// CVEs with missing data or affecting non-core components.
pub const DEFAULT_EXCLUDED_IDS: &str = "CVE-2019-11255,CVE-2020-8554";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    /// URL of the upstream CVE feed
    pub feed_url: String,

    /// Base URL of the CVE registry API
    pub registry_base_url: String,

    /// Prefix an item's `external_url` must carry to be looked up
    pub cve_list_prefix: String,

    /// Root of the persisted store (records go to `{vuln_list_dir}/vulns`)
    pub vuln_list_dir: PathBuf,

    /// Comma-delimited exclusion list.
    ///
    /// Matched by substring containment of the raw feed-item id, so a
    /// multi-CVE item is only excluded when its whole id appears here.
    pub excluded_ids: String,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            registry_base_url: DEFAULT_REGISTRY_URL.to_string(),
            cve_list_prefix: DEFAULT_CVE_LIST_PREFIX.to_string(),
            vuln_list_dir: PathBuf::from(DEFAULT_VULN_LIST_DIR),
            excluded_ids: DEFAULT_EXCLUDED_IDS.to_string(),
            user_agent: format!("k8s-vuln-harvester/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HarvesterConfig {
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_base_url = url.into();
        self
    }

    pub fn with_vuln_list_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.vuln_list_dir = dir.into();
        self
    }

    pub fn with_excluded_ids(mut self, ids: impl Into<String>) -> Self {
        self.excluded_ids = ids.into();
        self
    }

    /// Directory holding the per-CVE OSV files.
    pub fn vulns_dir(&self) -> PathBuf {
        self.vuln_list_dir.join(VULN_FOLDER)
    }

    /// Returns `true` if the raw feed-item id is on the exclusion list.
    pub fn is_excluded(&self, item_id: &str) -> bool {
        self.excluded_ids.contains(item_id)
    }
}
