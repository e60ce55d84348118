//! Route and path helper functions

use chrono::NaiveDateTime;
use std::path::{Component, Path, PathBuf};

/// Normalize a route or alias so equivalent spellings compare equal
///
/// # Examples
/// ```ignore
/// normalize_route(" /Posts/Hello/ ") // -> "posts/hello"
/// ```
pub fn normalize_route(route: &str) -> String {
    route.trim().trim_matches('/').to_lowercase()
}

/// Display form of a route, always wrapped in slashes
pub fn display_route(route: &str) -> String {
    let normalized = normalize_route(route);
    if normalized.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", normalized)
    }
}

/// Expand a permalink pattern for one record
///
/// # Examples
/// ```ignore
/// expand_permalink(":year/:month/:slug/", &date, "di-basics", None) // -> "/2025/02/di-basics/"
/// ```
pub fn expand_permalink(
    pattern: &str,
    date: &NaiveDateTime,
    slug: &str,
    category: Option<&str>,
) -> String {
    let category = category.map(slug::slugify).unwrap_or_default();

    let result = pattern
        .replace(":year", &date.format("%Y").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":i_month", &date.format("%-m").to_string())
        .replace(":i_day", &date.format("%-d").to_string())
        .replace(":title", slug)
        .replace(":slug", slug)
        .replace(":category", &category);

    // An empty category leaves a double slash behind
    let collapsed: Vec<&str> = result.split('/').filter(|s| !s.is_empty()).collect();
    display_route(&collapsed.join("/"))
}

/// Whether an asset reference points off-site rather than at a file
pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("//")
        || reference
            .split_once("://")
            .map(|(scheme, _)| {
                !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+')
            })
            .unwrap_or(false)
}

/// Lexically resolve `.` and `..` without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
