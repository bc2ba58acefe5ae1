//! Page decoration hook.
//!
//! Runs once per rendered page, before any other head content, to reconcile
//! the URL the client sees with the canonical clean URL. It does not touch
//! the rewrite engine; it only compares the two forms of the current
//! request's URL and emits the appropriate head snippet.

use std::fmt::Write;
use tracing::debug;

/// The clean and raw forms of the current request's URL, plus the optional
/// platform-level override set when a reverse proxy already normalized the
/// request.
#[derive(Debug, Clone, Default)]
pub struct PageUrls<'a> {
    /// Canonical clean form of the current page URL.
    pub clean: &'a str,
    /// The URL as actually requested.
    pub raw: &'a str,
    /// Override base URL. When present, canonicalization is suppressed: the
    /// browser must keep resolving relative links against this base, because
    /// rewriting changes path nesting and depth and would break legacy
    /// relative links.
    pub base_override: Option<&'a str>,
}

/// Sink for labeled values attached to the current request's diagnostic
/// context, so log post-processors can correlate raw and clean URLs.
pub trait NoteSink: Send + Sync {
    fn record_note(&self, key: &str, value: &str);
}

/// Default sink: publishes notes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotes;

impl NoteSink for TracingNotes {
    fn record_note(&self, key: &str, value: &str) {
        debug!(key, value, "request note");
    }
}

/// Builds the head content for the current page.
///
/// - With a base override, only a `<base href>` tag is emitted.
/// - When the requested URL is already canonical, nothing is emitted.
/// - Otherwise: a history-replace script (which must run before any other
///   page script, so analytics only ever see the clean URL), a
///   `rel=canonical` link so robots treat both forms as one page, and a
///   `CLEANURL` note for webserver-log correlation.
pub fn pre_head_content(urls: &PageUrls<'_>, notes: &dyn NoteSink) -> String {
    let mut output = String::new();

    if let Some(base) = urls.base_override {
        let _ = writeln!(output, "<base href='{}'>", base);
        return output;
    }

    if urls.raw == urls.clean {
        return output;
    }

    let _ = writeln!(
        output,
        "<script>history.replaceState && history.replaceState({{}}, '', '{}');</script>",
        urls.clean
    );
    let _ = writeln!(output, "<link rel='canonical' href='{}' />", urls.clean);
    notes.record_note("CLEANURL", urls.clean);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotes {
        notes: Mutex<Vec<(String, String)>>,
    }

    impl NoteSink for RecordingNotes {
        fn record_note(&self, key: &str, value: &str) {
            self.notes
                .lock()
                .unwrap()
                .push((key.to_owned(), value.to_owned()));
        }
    }

    const CLEAN: &str = "http://www.example.com/moodle/course/shortname";
    const RAW: &str = "http://www.example.com/moodle/course/view.php?id=2";

    #[test]
    fn override_emits_base_tag_only() {
        let notes = RecordingNotes::default();
        let urls = PageUrls {
            clean: CLEAN,
            raw: RAW,
            base_override: Some("http://proxy.example.com/moodle/"),
        };

        let output = pre_head_content(&urls, &notes);
        assert_eq!(output, "<base href='http://proxy.example.com/moodle/'>\n");
        assert!(notes.notes.lock().unwrap().is_empty());
    }

    #[test]
    fn canonical_request_emits_nothing() {
        let notes = RecordingNotes::default();
        let urls = PageUrls {
            clean: CLEAN,
            raw: CLEAN,
            base_override: None,
        };

        assert_eq!(pre_head_content(&urls, &notes), "");
        assert!(notes.notes.lock().unwrap().is_empty());
    }

    #[test]
    fn legacy_request_emits_replace_state_then_canonical() {
        let notes = RecordingNotes::default();
        let urls = PageUrls {
            clean: CLEAN,
            raw: RAW,
            base_override: None,
        };

        let output = pre_head_content(&urls, &notes);
        let expected = format!(
            "<script>history.replaceState && history.replaceState({{}}, '', '{0}');</script>\n\
             <link rel='canonical' href='{0}' />\n",
            CLEAN
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn legacy_request_records_clean_url_note() {
        let notes = RecordingNotes::default();
        let urls = PageUrls {
            clean: CLEAN,
            raw: RAW,
            base_override: None,
        };

        pre_head_content(&urls, &notes);
        let recorded = notes.notes.lock().unwrap();
        assert_eq!(recorded.as_slice(), &[("CLEANURL".to_owned(), CLEAN.to_owned())]);
    }
}
