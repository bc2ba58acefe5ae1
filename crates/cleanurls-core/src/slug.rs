//! Slug helpers for clean path segments.

/// Converts a display name to a URL-safe slug.
///
/// Lowercases the input, replaces every non-alphanumeric character with a
/// hyphen, collapses runs of hyphens and trims them from both ends.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '-',
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Builds a course-module segment: the module id followed by the sluggified
/// module name, e.g. `42-a-test-forum`. The numeric prefix keeps the segment
/// resolvable even when module names are ambiguous.
pub fn module_segment(cmid: u64, name: &str) -> String {
    format!("{}-{}", cmid, slugify(name))
}

/// Extracts the numeric id prefix from a segment like `42-a-test-forum`.
pub fn leading_id(segment: &str) -> Option<u64> {
    segment.split('-').next()?.parse().ok()
}

/// Extracts the numeric id suffix from a segment like `subcategory-6`.
pub fn trailing_id(segment: &str) -> Option<u64> {
    segment.rsplit('-').next()?.parse().ok()
}
