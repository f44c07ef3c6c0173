//! Component resolution.
//!
//! Maps the component named by a CVE to the `organization/repository`
//! identifier used as the OSV package name.

use crate::model::CanonicalComponent;
use std::collections::HashMap;

/// Generic project name; registry entries often report it instead of the
/// actual sub-component.
pub const PROJECT_NAME: &str = "kubernetes";

const DEFAULT_ORG: &str = "k8s.io";
const DEFAULT_REPO: &str = "kubernetes";

/// Known components and their upstream `(organization, repository)`.
const UPSTREAM_REPOS: &[(&str, &str, &str)] = &[
    ("kubernetes", "k8s.io", "kubernetes"),
    ("kube-apiserver", "k8s.io", "apiserver"),
    ("apiserver", "k8s.io", "apiserver"),
    ("kubelet", "k8s.io", "kubelet"),
    ("kube-proxy", "k8s.io", "kube-proxy"),
    ("kube-controller-manager", "k8s.io", "controller-manager"),
    ("kube-scheduler", "k8s.io", "kube-scheduler"),
    ("kubectl", "k8s.io", "kubectl"),
    ("kubeadm", "k8s.io", "kubeadm"),
    ("kube-state-metrics", "k8s.io", "kube-state-metrics"),
    ("ingress-nginx", "k8s.io", "ingress-nginx"),
    ("csi-proxy", "k8s.io", "csi-proxy"),
    ("secrets-store-csi-driver", "sigs.k8s.io", "secrets-store-csi-driver"),
    ("aws-iam-authenticator", "sigs.k8s.io", "aws-iam-authenticator"),
    ("external-dns", "sigs.k8s.io", "external-dns"),
    ("metrics-server", "sigs.k8s.io", "metrics-server"),
    ("kustomize", "sigs.k8s.io", "kustomize"),
    ("cluster-api", "sigs.k8s.io", "cluster-api"),
    ("image-builder", "sigs.k8s.io", "image-builder"),
];

/// Looks up the upstream location of a component name.
///
/// Unknown names resolve to the project's own repository.
pub fn upstream_repo(name: &str) -> (&'static str, &'static str) {
    let name = normalize(name);
    UPSTREAM_REPOS
        .iter()
        .find(|(component, _, _)| *component == name)
        .map(|(_, org, repo)| (*org, *repo))
        .unwrap_or((DEFAULT_ORG, DEFAULT_REPO))
}

/// Guesses the affected sub-component from free text.
///
/// Counts mentions of known component names (the generic project name is
/// not a candidate) and returns the most frequent one; ties go to the name
/// mentioned first.
pub fn component_from_description(text: &str) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    let tokens = text
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .map(|t| t.trim_matches('-'))
        .filter(|t| !t.is_empty());

    for (position, token) in tokens.enumerate() {
        let token = token.to_ascii_lowercase();
        let Some((name, _, _)) = UPSTREAM_REPOS
            .iter()
            .find(|(component, _, _)| *component == token && *component != PROJECT_NAME)
        else {
            continue;
        };
        let entry = counts.entry(*name).or_insert((0, position));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(name, _)| name.to_string())
}

/// Picks the component name to report and maps it to its canonical id.
///
/// A registry component other than the generic project name always wins.
/// When the registry only says "kubernetes", the description-derived name
/// is used if there is one.
pub fn resolve_component(
    description_component: Option<&str>,
    registry_component: &str,
) -> CanonicalComponent {
    let registry_component = registry_component.trim();

    let winner = if registry_component.eq_ignore_ascii_case(PROJECT_NAME) {
        description_component
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(PROJECT_NAME)
    } else if registry_component.is_empty() {
        description_component.unwrap_or(PROJECT_NAME)
    } else {
        registry_component
    };

    let (org, repo) = upstream_repo(winner);
    CanonicalComponent::new(org, repo)
}

fn normalize(name: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    match name.rsplit_once('/') {
        Some((_, last)) => last.to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_repo_lookup() {
        assert_eq!(upstream_repo("kubelet"), ("k8s.io", "kubelet"));
        assert_eq!(upstream_repo(" Kube-Apiserver "), ("k8s.io", "apiserver"));
        assert_eq!(upstream_repo("k8s.io/kubectl"), ("k8s.io", "kubectl"));
        assert_eq!(
            upstream_repo("secrets-store-csi-driver"),
            ("sigs.k8s.io", "secrets-store-csi-driver")
        );
    }

    #[test]
    fn test_unknown_component_defaults_to_project() {
        assert_eq!(upstream_repo("something-else"), ("k8s.io", "kubernetes"));
        assert_eq!(upstream_repo(""), ("k8s.io", "kubernetes"));
    }

    #[test]
    fn test_component_from_description_picks_most_frequent() {
        let text = "A security issue was discovered in kube-apiserver that allows \
                    kubelet bypass. Kubelet versions affected. Upgrade kubelet.";
        assert_eq!(component_from_description(text), Some("kubelet".to_string()));
    }

    #[test]
    fn test_component_from_description_tie_goes_to_first() {
        let text = "kube-proxy and kubectl (Kubernetes)";
        assert_eq!(
            component_from_description(text),
            Some("kube-proxy".to_string())
        );
    }

    #[test]
    fn test_component_from_description_ignores_project_name() {
        assert_eq!(
            component_from_description("Kubernetes clusters using Kubernetes"),
            None
        );
        assert_eq!(component_from_description(""), None);
    }

    #[test]
    fn test_generic_registry_component_prefers_description() {
        let component = resolve_component(Some("kubelet"), "Kubernetes");
        assert_eq!(component.as_str(), "k8s.io/kubelet");
    }

    #[test]
    fn test_generic_registry_component_without_description() {
        let component = resolve_component(None, "kubernetes");
        assert_eq!(component.as_str(), "k8s.io/kubernetes");
    }

    #[test]
    fn test_specific_registry_component_wins() {
        let component = resolve_component(Some("kubelet"), "ingress-nginx");
        assert_eq!(component.as_str(), "k8s.io/ingress-nginx");

        let component = resolve_component(Some("kubelet"), "kube-apiserver");
        assert_eq!(component.as_str(), "k8s.io/apiserver");
    }

    #[test]
    fn test_resolved_component_is_never_empty() {
        let component = resolve_component(None, "");
        assert_eq!(component.as_str(), "k8s.io/kubernetes");
    }
}
