//! OSV record assembly.

use crate::model::{
    Affected, CanonicalComponent, CvssVector, Event, FeedItem, OsvRecord, Package, Range,
    Reference, Severity, VersionSpec, K8S_ECOSYSTEM,
};

/// Range type for every emitted range.
pub const SEMVER_RANGE: &str = "SEMVER";

/// Flattens version specs into one ordered event sequence.
///
/// A spec without an `introduced` version contributes nothing. Otherwise it
/// yields `introduced` followed by `fixed`, or `last_affected`, or (when
/// neither is known) `last_affected` equal to `introduced`.
pub fn affected_events(versions: &[VersionSpec]) -> Vec<Event> {
    let mut events = Vec::with_capacity(versions.len() * 2);

    for spec in versions {
        if spec.introduced.is_empty() {
            continue;
        }
        events.push(Event::introduced(spec.introduced.as_str()));

        if !spec.fixed.is_empty() {
            events.push(Event::fixed(spec.fixed.as_str()));
        } else if !spec.last_affected.is_empty() {
            events.push(Event::last_affected(spec.last_affected.as_str()));
        } else {
            events.push(Event::last_affected(spec.introduced.as_str()));
        }
    }

    events
}

/// Builds the single `affected` entry of a record.
pub fn affected(
    component: &CanonicalComponent,
    versions: &[VersionSpec],
    cvss: &CvssVector,
) -> Affected {
    Affected {
        package: Package {
            ecosystem: K8S_ECOSYSTEM.to_string(),
            name: component.to_string(),
        },
        severities: vec![Severity {
            kind: cvss.kind.clone(),
            score: cvss.vector.clone(),
        }],
        ranges: vec![Range {
            kind: SEMVER_RANGE.to_string(),
            events: affected_events(versions),
        }],
    }
}

/// Assembles the OSV record for one CVE id of a feed item.
///
/// `modified` and `published` both carry the item's publication date;
/// `details` is the registry description.
pub fn assemble(
    item: &FeedItem,
    cve_id: &str,
    details: &str,
    component: &CanonicalComponent,
    versions: &[VersionSpec],
    cvss: &CvssVector,
) -> OsvRecord {
    OsvRecord {
        id: cve_id.to_string(),
        modified: item.date_published.clone(),
        published: item.date_published.clone(),
        summary: item.summary.clone(),
        details: details.to_string(),
        affected: vec![affected(component, versions, cvss)],
        references: vec![
            Reference::advisory(item.url.as_str()),
            Reference::advisory(item.external_url.as_str()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CVSS_V3;

    fn spec(introduced: &str, fixed: &str, last_affected: &str) -> VersionSpec {
        VersionSpec {
            introduced: introduced.to_string(),
            fixed: fixed.to_string(),
            last_affected: last_affected.to_string(),
        }
    }

    #[test]
    fn test_events_prefer_fixed_over_last_affected() {
        let events = affected_events(&[spec("1.2.0", "1.2.5", "1.2.4")]);
        assert_eq!(events, vec![Event::introduced("1.2.0"), Event::fixed("1.2.5")]);
    }

    #[test]
    fn test_events_last_affected() {
        let events = affected_events(&[spec("1.2.0", "", "1.2.5")]);
        assert_eq!(
            events,
            vec![Event::introduced("1.2.0"), Event::last_affected("1.2.5")]
        );
    }

    #[test]
    fn test_events_single_point_range() {
        let events = affected_events(&[spec("1.2.5", "", "")]);
        assert_eq!(
            events,
            vec![Event::introduced("1.2.5"), Event::last_affected("1.2.5")]
        );
    }

    #[test]
    fn test_events_skip_specs_without_introduced() {
        let events = affected_events(&[spec("", "1.2.5", ""), spec("1.3.0", "", "1.3.2")]);
        assert_eq!(
            events,
            vec![Event::introduced("1.3.0"), Event::last_affected("1.3.2")]
        );
        assert!(affected_events(&[spec("", "", "1.0.0")]).is_empty());
    }

    #[test]
    fn test_events_keep_input_order() {
        let events = affected_events(&[spec("1.27.0", "", "1.27.1"), spec("1.26.0", "1.26.4", "")]);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].introduced, "1.27.0");
        assert_eq!(events[2].introduced, "1.26.0");
        assert_eq!(events[3].fixed, "1.26.4");
    }

    #[test]
    fn test_assemble_record() {
        let item = FeedItem {
            id: "CVE-2023-2431".to_string(),
            summary: "Bypass of seccomp profile enforcement".to_string(),
            content_text: String::new(),
            date_published: "2023-06-15T14:42:32Z".to_string(),
            external_url: "https://www.cve.org/cverecord?id=CVE-2023-2431".to_string(),
            url: "https://github.com/kubernetes/kubernetes/issues/118690".to_string(),
        };
        let cvss = CvssVector {
            kind: CVSS_V3.to_string(),
            vector: "CVSS:3.1/AV:L/AC:L/PR:L/UI:N/S:U/C:N/I:L/A:N".to_string(),
        };
        let component = CanonicalComponent::new("k8s.io", "kubelet");

        let record = assemble(
            &item,
            "CVE-2023-2431",
            "registry description",
            &component,
            &[spec("1.27.0", "", "1.27.1")],
            &cvss,
        );

        assert_eq!(record.id, "CVE-2023-2431");
        assert_eq!(record.modified, item.date_published);
        assert_eq!(record.published, item.date_published);
        assert_eq!(record.details, "registry description");
        assert_eq!(record.affected.len(), 1);

        let affected = &record.affected[0];
        assert_eq!(affected.package.name, "k8s.io/kubelet");
        assert_eq!(affected.package.ecosystem, "kubernetes");
        assert_eq!(affected.ranges.len(), 1);
        assert_eq!(affected.ranges[0].kind, "SEMVER");
        assert_eq!(affected.severities.len(), 1);
        assert_eq!(affected.severities[0].score, cvss.vector);

        assert_eq!(record.references.len(), 2);
        assert!(record.references.iter().all(|r| r.kind == "ADVISORY"));
        assert_eq!(record.references[0].url, item.url);
        assert_eq!(record.references[1].url, item.external_url);
    }
}
