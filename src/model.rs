//! Data model shared by the feed, registry, pipeline and store layers.
//!
//! Input side:
//! - [`FeedDocument`] / [`FeedItem`]: the official Kubernetes CVE feed
//! - [`RegistryRecord`] / [`VersionSpec`] / [`CvssVector`]: one CVE as seen by the registry
//!
//! Output side:
//! - [`OsvRecord`] and its parts, serialized with the OSV field names
//!   (<https://ossf.github.io/osv-schema>)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ecosystem tag written into every OSV package.
pub const K8S_ECOSYSTEM: &str = "kubernetes";

/// OSV severity type used for CVSS v3.x vectors.
pub const CVSS_V3: &str = "CVSS_V3";

// ============================================================================
// Feed
// ============================================================================

/// The feed document: a JSON Feed with one item per advisory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

/// One advisory from the feed.
///
/// `id` may carry several CVE identifiers separated by commas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedItem {
    pub id: String,
    pub summary: String,
    pub content_text: String,
    pub date_published: String,
    /// Link to the CVE registry entry, used to decide whether to query the registry
    pub external_url: String,
    /// Canonical advisory URL (usually the GitHub issue)
    pub url: String,
}

// ============================================================================
// Registry
// ============================================================================

/// The registry's view of one CVE, reduced to what the OSV output needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRecord {
    pub description: String,
    /// Product name as reported by the registry (lowercase)
    pub component: String,
    pub versions: Vec<VersionSpec>,
    pub cvss: CvssVector,
}

impl RegistryRecord {
    /// Returns `true` when the record carries everything an OSV entry needs:
    /// a component, at least one version spec and a CVSS vector.
    pub fn is_complete(&self) -> bool {
        !self.component.is_empty() && !self.versions.is_empty() && !self.cvss.vector.is_empty()
    }
}

/// One affected-range expression. Empty strings mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSpec {
    pub introduced: String,
    pub fixed: String,
    pub last_affected: String,
}

/// CVSS vector with its OSV severity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CvssVector {
    pub kind: String,
    pub vector: String,
}

// ============================================================================
// Canonical component
// ============================================================================

/// Lowercase `organization/repository` identifier used as the OSV package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalComponent(String);

impl CanonicalComponent {
    /// Builds the identifier from an organization and repository pair.
    pub fn new(org: &str, repo: &str) -> Self {
        Self(format!("{}/{}", org, repo).to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// OSV
// ============================================================================

/// Open Source Vulnerability record. One file per CVE identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsvRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub published: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub details: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<Affected>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Affected {
    pub package: Package,
    #[serde(rename = "severity", skip_serializing_if = "Vec::is_empty")]
    pub severities: Vec<Severity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<Range>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ecosystem: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Range {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

/// A single OSV range event. Exactly one field is set per event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub introduced: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fixed: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_affected: String,
}

impl Event {
    pub fn introduced(version: impl Into<String>) -> Self {
        Self {
            introduced: version.into(),
            ..Self::default()
        }
    }

    pub fn fixed(version: impl Into<String>) -> Self {
        Self {
            fixed: version.into(),
            ..Self::default()
        }
    }

    pub fn last_affected(version: impl Into<String>) -> Self {
        Self {
            last_affected: version.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Severity {
    #[serde(rename = "type")]
    pub kind: String,
    pub score: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

impl Reference {
    pub fn advisory(url: impl Into<String>) -> Self {
        Self {
            kind: "ADVISORY".to_string(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_item_ignores_unknown_fields() {
        let json = r#"{
            "items": [{
                "id": "CVE-2023-2431",
                "url": "https://github.com/kubernetes/kubernetes/issues/118690",
                "external_url": "https://www.cve.org/cverecord?id=CVE-2023-2431",
                "summary": "Bypass of seccomp profile enforcement",
                "content_text": "A security issue was discovered in Kubelet",
                "date_published": "2023-06-15T14:42:32Z",
                "_kubernetes_io": {"google_group_url": "https://groups.google.com"}
            }]
        }"#;

        let doc: FeedDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.items[0].id, "CVE-2023-2431");
        assert_eq!(doc.items[0].date_published, "2023-06-15T14:42:32Z");
    }

    #[test]
    fn test_registry_record_completeness() {
        let mut record = RegistryRecord {
            description: "desc".to_string(),
            component: "kubelet".to_string(),
            versions: vec![VersionSpec {
                introduced: "1.2.0".to_string(),
                ..VersionSpec::default()
            }],
            cvss: CvssVector {
                kind: CVSS_V3.to_string(),
                vector: "CVSS:3.1/AV:L/AC:L/PR:L/UI:N/S:U/C:L/I:L/A:N".to_string(),
            },
        };
        assert!(record.is_complete());

        record.cvss.vector.clear();
        assert!(!record.is_complete());
        assert!(!RegistryRecord::default().is_complete());
    }

    #[test]
    fn test_canonical_component_is_lowercase() {
        let component = CanonicalComponent::new("K8s.io", "Kubelet");
        assert_eq!(component.as_str(), "k8s.io/kubelet");
        assert_eq!(component.to_string(), "k8s.io/kubelet");
    }

    #[test]
    fn test_osv_serialization_uses_schema_names() {
        let record = OsvRecord {
            id: "CVE-2023-2431".to_string(),
            affected: vec![Affected {
                package: Package {
                    ecosystem: K8S_ECOSYSTEM.to_string(),
                    name: "k8s.io/kubelet".to_string(),
                },
                severities: vec![Severity {
                    kind: CVSS_V3.to_string(),
                    score: "CVSS:3.1/AV:L".to_string(),
                }],
                ranges: vec![Range {
                    kind: "SEMVER".to_string(),
                    events: vec![Event::introduced("1.27.0"), Event::last_affected("1.27.1")],
                }],
            }],
            ..OsvRecord::default()
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["affected"][0]["severity"][0]["type"], "CVSS_V3");
        assert_eq!(value["affected"][0]["ranges"][0]["type"], "SEMVER");
        assert_eq!(
            value["affected"][0]["ranges"][0]["events"][1]["last_affected"],
            "1.27.1"
        );
        assert!(value.get("modified").is_none());
        assert!(value["affected"][0]["ranges"][0]["events"][0]
            .get("fixed")
            .is_none());
    }
}
