use serde::{Deserialize, Serialize};

/// Engine configuration, read at transform time.
///
/// The embedding platform owns the authoritative settings store; this struct
/// is the snapshot handed to the services when they are constructed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root the engine rewrites under, without a trailing slash
    /// (e.g. `http://www.example.com/moodle`). URLs outside this root are
    /// never transformed.
    pub wwwroot: String,
    /// Master switch. When off, `clean` is the identity transform and the
    /// path cache is neither read nor written.
    pub cleaning_on: bool,
    /// Whether usernames may appear as clean path segments.
    pub clean_usernames: bool,
}

impl Config {
    /// Creates a configuration with cleaning and username cleaning enabled.
    pub fn new(wwwroot: impl Into<String>) -> Self {
        let wwwroot = wwwroot.into().trim_end_matches('/').to_owned();
        Self {
            wwwroot,
            cleaning_on: true,
            clean_usernames: true,
        }
    }

    /// Returns a copy with the master switch set as given.
    pub fn with_cleaning(mut self, on: bool) -> Self {
        self.cleaning_on = on;
        self
    }

    /// Returns a copy with username cleaning set as given.
    pub fn with_clean_usernames(mut self, on: bool) -> Self {
        self.clean_usernames = on;
        self
    }
}
