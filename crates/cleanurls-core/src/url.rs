//! URL model: original (parameter-based) URLs, outbound clean URLs and
//! inbound clean paths.
//!
//! All three types are transient, built and dropped per request. Parsing is
//! always relative to the configured `wwwroot`; a URL outside the site root
//! is simply not local and never transformed.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use std::borrow::Cow;

/// Characters escaped inside a clean path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'/')
    .add(b'\\')
    .add(b'{')
    .add(b'}');

/// Characters escaped in query parameter names and values.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn decode(text: &str) -> Cow<'_, str> {
    percent_decode_str(text).decode_utf8_lossy()
}

fn encode_query(text: &str) -> String {
    utf8_percent_encode(text, QUERY).to_string()
}

/// Strips the site root from an absolute URL, also accepting root-relative
/// paths. Returns the local part without a leading slash.
fn localize<'a>(url: &'a str, wwwroot: &str) -> Option<&'a str> {
    if !wwwroot.is_empty() {
        if let Some(rest) = url.strip_prefix(wwwroot) {
            // Reject prefix matches that fall inside a longer path component,
            // e.g. wwwroot `/moodle` against `/moodlexyz/...`.
            if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') {
                return Some(rest.strip_prefix('/').unwrap_or(rest));
            }
            return None;
        }
    }
    if url.starts_with('/') {
        return Some(&url[1..]);
    }
    None
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (decode(name).into_owned(), decode(value).into_owned()),
            None => (decode(pair).into_owned(), String::new()),
        };
        // Duplicate names: the last occurrence wins, matching the host
        // platform's parameter array semantics.
        match params.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => params.push((name, value)),
        }
    }
    params
}

fn render_query(params: &[(String, String)]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = params
        .iter()
        .map(|(name, value)| format!("{}={}", encode_query(name), encode_query(value)))
        .collect();
    format!("?{}", rendered.join("&"))
}

/// The platform's native addressable form: a local script path plus ordered
/// query parameters. Parameter values are stored decoded and re-escaped when
/// the URL is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalUrl {
    path: String,
    params: Vec<(String, String)>,
}

impl OriginalUrl {
    /// Creates an original URL for a local script path with no parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Appends (or overwrites) a query parameter, builder style.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(name, value);
        self
    }

    /// Sets a query parameter, overwriting any previous value for the name.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.params.push((name, value)),
        }
    }

    /// Parses a URL as local to the given site root.
    ///
    /// Accepts absolute URLs under `wwwroot` and root-relative paths.
    /// Returns `None` for foreign URLs.
    pub fn parse_local(url: &str, wwwroot: &str) -> Option<Self> {
        let local = localize(url, wwwroot)?;
        let (path, query) = match local.split_once('?') {
            Some((path, query)) => (path, query),
            None => (local, ""),
        };
        Some(Self {
            path: path.to_owned(),
            params: parse_query(query),
        })
    }

    /// The local path, without a leading slash (e.g. `course/view.php`).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The ordered query parameters, decoded.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Looks up a query parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a numeric query parameter by name.
    pub fn id_param(&self, name: &str) -> Option<u64> {
        self.param(name)?.parse().ok()
    }

    /// Renders the absolute URL under the given site root.
    pub fn render(&self, wwwroot: &str) -> String {
        format!("{}/{}{}", wwwroot, self.path, render_query(&self.params))
    }
}

/// An outbound clean URL under construction: decoded path segments plus the
/// query parameters that cannot be embedded in the path (e.g. `?course=1`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanUrl {
    segments: Vec<String>,
    params: Vec<(String, String)>,
}

impl CleanUrl {
    /// Creates a clean URL from an initial run of path segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            params: Vec::new(),
        }
    }

    /// Appends a path segment.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Appends a trailing query parameter, builder style.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// The decoded path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Renders the absolute clean URL under the given site root, escaping
    /// each segment.
    pub fn render(&self, wwwroot: &str) -> String {
        let path: Vec<String> = self
            .segments
            .iter()
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        format!("{}/{}{}", wwwroot, path.join("/"), render_query(&self.params))
    }
}

/// An inbound clean path as requested: raw (still-escaped) segments plus
/// decoded query parameters.
///
/// Segments stay raw because the course-by-name reverse rule deliberately
/// carries the escaped text into the rebuilt query string; slug resolution
/// decodes on demand instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPath {
    raw: Vec<String>,
    params: Vec<(String, String)>,
}

impl CleanPath {
    /// Parses a requested URL as a local clean path. Returns `None` for
    /// foreign URLs.
    pub fn parse_local(url: &str, wwwroot: &str) -> Option<Self> {
        let local = localize(url, wwwroot)?;
        let (path, query) = match local.split_once('?') {
            Some((path, query)) => (path, query),
            None => (local, ""),
        };
        Some(Self {
            raw: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            params: parse_query(query),
        })
    }

    /// The raw, still-escaped path segments.
    pub fn raw_segments(&self) -> &[String] {
        &self.raw
    }

    /// A raw segment by position.
    pub fn raw(&self, index: usize) -> Option<&str> {
        self.raw.get(index).map(String::as_str)
    }

    /// A segment by position, percent-decoded.
    pub fn decoded(&self, index: usize) -> Option<Cow<'_, str>> {
        self.raw.get(index).map(|s| decode(s))
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The raw local path, segments re-joined.
    pub fn local_path(&self) -> String {
        self.raw.join("/")
    }

    /// Looks up a trailing query parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
