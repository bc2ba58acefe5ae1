//! Non-cleanable URL classes.
//!
//! A closed exclusion set checked before any cache lookup or entity
//! resolution. File-serving scripts keep their path-encoded arguments, and
//! library/theme assets must resolve as plain files, so all of them pass
//! through unchanged.

/// File-serving and utility scripts that are never cleaned. These appear as
/// the first path component, possibly with trailing path arguments
/// (e.g. `draftfile.php/5/user/draft/...`).
const EXCLUDED_SCRIPTS: &[&str] = &["draftfile.php", "pluginfile.php", "help.php"];

/// Static asset roots that are never cleaned.
const EXCLUDED_ROOTS: &[&str] = &["lib", "theme"];

/// Returns true when the local path belongs to a non-cleanable URL class.
pub fn is_excluded(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    EXCLUDED_SCRIPTS.contains(&first) || EXCLUDED_ROOTS.contains(&first)
}
