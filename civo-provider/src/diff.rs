//! Comparing desired and observed state
use semver::Version;
use tracing::warn;

/// Whether two collections differ when compared as sets
///
/// Both sides must have the same length and be element-wise equal once
/// sorted; order never matters.
pub fn needs_update<T: Ord>(desired: &[T], observed: &[T]) -> bool {
    if desired.len() != observed.len() {
        return true;
    }
    let mut desired = desired.iter().collect::<Vec<_>>();
    let mut observed = observed.iter().collect::<Vec<_>>();
    desired.sort();
    observed.sort();
    desired != observed
}

/// Whether `desired` is a strictly newer version than `observed`
///
/// Downgrades never trigger. A version that does not parse as semver, with or
/// without a leading `v`, never triggers either.
pub fn version_upgrade_needed(desired: &str, observed: &str) -> bool {
    match (parse_version(desired), parse_version(observed)) {
        (Some(desired), Some(observed)) => desired > observed,
        _ => {
            warn!(desired, observed, "cannot compare versions, skipping upgrade");
            false
        }
    }
}

fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    Version::parse(version.strip_prefix('v').unwrap_or(version)).ok()
}
