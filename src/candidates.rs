//! Candidate URL expansion across provider bases.

use std::collections::HashSet;

use crate::descriptor::ModuleDescriptor;

/// Expand provider bases into fully-qualified candidate URLs.
///
/// When a path exists, each base contributes three variants in fixed order:
/// the direct path, a `/umd/` build, then a `/dist/` build. Unbundled source
/// is expected at the path itself, with bundled builds as fallbacks. An
/// explicit `path` on the descriptor yields one candidate per base, and a
/// descriptor with no path at all falls back to the bare package root.
/// Duplicates across bases are dropped, keeping first-seen order.
pub fn build_candidates(desc: &ModuleDescriptor, bases: &[String]) -> Vec<String> {
    let pkg = desc.package_name();
    let version = desc.version_segment();
    let file = desc
        .file
        .as_deref()
        .unwrap_or("")
        .trim_start_matches('/');
    let prefix = desc
        .path_prefix
        .as_deref()
        .unwrap_or("")
        .trim_matches('/');
    let explicit = desc.path.as_deref().unwrap_or("").trim_start_matches('/');

    let combined = [prefix, file]
        .iter()
        .filter(|segment| !segment.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut push = |url: String| {
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    };

    for base in bases {
        let package_root = format!("{}{}{}", base, pkg, version);
        if !explicit.is_empty() {
            push(format!("{}/{}", package_root, explicit));
        } else if !combined.is_empty() {
            push(format!("{}/{}", package_root, combined));
            push(format!("{}/umd/{}", package_root, combined));
            push(format!("{}/dist/{}", package_root, combined));
        } else {
            push(package_root);
        }
    }

    urls
}
