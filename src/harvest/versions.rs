//! Version extraction.
//!
//! Turns the loosely written version fields of a registry entry into the
//! `(introduced, last_affected)` / `fixed` boundaries of a [`VersionSpec`].
//! Nothing in here fails: a string that cannot be interpreted becomes a
//! single affected version.

use crate::model::VersionSpec;

/// Parses a free-text version expression.
///
/// `"1.2.3 - 1.2.5"` yields `("1.2.3", "1.2.5")`; anything without a
/// whitespace-surrounded hyphen is a single version with no upper bound:
/// `"1.2.5"` yields `("1.2.5", "")`.
pub fn extract_range_versions(expr: &str) -> (String, String) {
    if let Some((from, to)) = split_range(expr) {
        return (from.to_string(), to.to_string());
    }
    (expr.trim().to_string(), String::new())
}

/// Computes boundaries for a "less than `less`" bound.
///
/// The upper bound is returned verbatim (trimmed). The lower bound is the
/// `major.minor.0` of `less`; the base `version` never affects it. A `less`
/// without a numeric major becomes a single-point range on itself.
pub fn update_versions(less: &str, _version: &str) -> (String, String) {
    let less = less.trim();
    let mut parts = less.split('.').map(str::trim);
    let major = parts.next().filter(|p| is_numeric(p));
    let minor = parts.next().filter(|p| is_numeric(p));

    let introduced = match (major, minor) {
        (Some(major), Some(minor)) => format!("{}.{}.0", major, minor),
        (Some(major), None) => format!("{}.0.0", major),
        _ => less.to_string(),
    };

    (introduced, less.to_string())
}

/// Builds a [`VersionSpec`] from the raw fields of one affected registry entry.
///
/// Returns `None` when the entry carries no usable version at all
/// (`n/a` without a bound, or everything empty).
pub fn version_spec(
    version: &str,
    less_than: &str,
    less_than_or_equal: &str,
) -> Option<VersionSpec> {
    let raw_version = version.trim();
    let mut less_than = clean(less_than).to_string();
    let mut less_than_or_equal = clean(less_than_or_equal).to_string();

    if raw_version.contains("n/a") && less_than.is_empty() && less_than_or_equal.is_empty() {
        return None;
    }

    // Some entries put the comparator into the version field itself.
    let cleaned = clean(raw_version);
    let mut version = cleaned;
    if let Some(rest) = cleaned.strip_prefix("<=") {
        if less_than_or_equal.is_empty() {
            less_than_or_equal = clean(rest).to_string();
        }
        version = "";
    } else if let Some(rest) = cleaned.strip_prefix('<') {
        if less_than.is_empty() {
            less_than = clean(rest).to_string();
        }
        version = "";
    }

    if !less_than_or_equal.is_empty() {
        let (introduced, last_affected) = update_versions(&less_than_or_equal, version);
        return Some(VersionSpec {
            introduced,
            last_affected,
            ..VersionSpec::default()
        });
    }

    if !less_than.is_empty() {
        let (introduced, fixed) = update_versions(&less_than, version);
        return Some(VersionSpec {
            introduced,
            fixed,
            ..VersionSpec::default()
        });
    }

    if version.is_empty() {
        return None;
    }

    let (introduced, last_affected) = extract_range_versions(version);
    Some(VersionSpec {
        introduced: strip_v(&introduced).to_string(),
        last_affected: strip_v(&last_affected).to_string(),
        ..VersionSpec::default()
    })
}

/// Splits `"a - b"` on a hyphen that has whitespace on both sides.
fn split_range(expr: &str) -> Option<(&str, &str)> {
    let bytes = expr.as_bytes();
    for (idx, ch) in expr.char_indices() {
        if ch != '-' || idx == 0 || idx + 1 >= bytes.len() {
            continue;
        }
        if bytes[idx - 1].is_ascii_whitespace() && bytes[idx + 1].is_ascii_whitespace() {
            let from = expr[..idx].trim();
            let to = expr[idx + 1..].trim();
            if !from.is_empty() && !to.is_empty() {
                return Some((from, to));
            }
        }
    }
    None
}

/// Trims, strips a leading `v`, and blanks out placeholder values.
fn clean(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("unspecified") || trimmed == "*" || trimmed.contains("n/a") {
        return "";
    }
    strip_v(trimmed)
}

fn strip_v(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
}

fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}
