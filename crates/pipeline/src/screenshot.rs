//! Screenshot lookup for a post id.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glob::Pattern;
use walkdir::WalkDir;

/// File-name patterns for `id`, most specific first: timestamped captures,
/// then the bare legacy name, then anything mentioning the id.
pub fn screenshot_patterns(id: &str) -> Vec<Pattern> {
    let id = Pattern::escape(id);
    [
        format!("tweet_{id}_*.png"),
        format!("tweet_{id}.png"),
        format!("*{id}*.png"),
    ]
    .iter()
    .filter_map(|p| Pattern::new(p).ok())
    .collect()
}

/// Find the screenshot for `id` anywhere under `root`.
///
/// The first pattern with any match wins. Among its matches the most
/// recently modified file is returned.
pub fn find_screenshot(root: &Path, id: &str) -> Option<PathBuf> {
    let candidates: Vec<(PathBuf, SystemTime)> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "Skipping unreadable screenshot entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (entry.into_path(), modified)
        })
        .collect();

    for pattern in screenshot_patterns(id) {
        let newest = candidates
            .iter()
            .filter(|(path, _)| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| pattern.matches(name))
            })
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        if let Some((path, _)) = newest {
            tracing::debug!(
                id,
                pattern = pattern.as_str(),
                path = %path.display(),
                "Found screenshot"
            );
            return Some(path.clone());
        }
    }
    None
}
