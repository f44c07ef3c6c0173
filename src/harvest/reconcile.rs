//! Incremental reconciliation against the persisted store.

use chrono::DateTime;
use std::collections::HashMap;
use tracing::warn;

/// Previously persisted `modified` timestamps, keyed by CVE id.
///
/// Built once per run from the store and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ModifiedIndex {
    entries: HashMap<String, String>,
}

impl ModifiedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cve_id: impl Into<String>, modified: impl Into<String>) {
        self.entries.insert(cve_id.into(), modified.into());
    }

    pub fn get(&self, cve_id: &str) -> Option<&str> {
        self.entries.get(cve_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when the stored record is at least as fresh as
    /// `published`, meaning the fresh record must not be written.
    ///
    /// Unknown ids and unparsable timestamps never block emission.
    /// Equal timestamps count as stale.
    pub fn is_stale(&self, cve_id: &str, published: &str) -> bool {
        let Some(stored) = self.get(cve_id) else {
            return false;
        };

        let stored_at = match DateTime::parse_from_rfc3339(stored) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(cve_id, stored, error = %e, "Unparsable stored timestamp, keeping record");
                return false;
            }
        };
        let published_at = match DateTime::parse_from_rfc3339(published) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(cve_id, published, error = %e, "Unparsable feed timestamp, keeping record");
                return false;
            }
        };

        published_at <= stored_at
    }
}

impl FromIterator<(String, String)> for ModifiedIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
