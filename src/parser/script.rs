//! Script discovery in the HTML body: inline `<script>` bodies and remote `src` URLs.

use std::sync::LazyLock;

use regex::Regex;

use super::{keep_successes, naming};
use crate::fetch::ScriptFetcher;
use crate::model::resource::{Resource, ResourceSource};

/// Content type given to every discovered script.
pub const SCRIPT_CONTENT_TYPE: &str = "text/javascript";

/// `<script ... src="URL" ...>` with either quote style, any case.
static SCRIPT_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<script\s+[^>]*src=["'](.*?)["'][^>]*>"#).expect("valid script pattern")
});

/// Inline scripts in document order, one resource per `<script>` element
/// that has no `src` and a body that is not just whitespace.
#[cfg(feature = "html")]
pub fn inline_scripts(html: &str) -> Vec<Resource> {
    use scraper::{Html, Selector};

    let selector = match Selector::parse("script") {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid script selector, skipping inline scripts");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter(|el| el.value().attr("src").is_none_or(str::is_empty))
        .filter_map(|el| {
            let text: String = el.text().collect();
            if text.trim().is_empty() {
                return None;
            }
            Some(Resource::new(
                SCRIPT_CONTENT_TYPE,
                naming::inline_script_name(),
                ResourceSource::Inline,
                text.into_bytes(),
            ))
        })
        .collect()
}

/// Without an HTML parser the inline phase is skipped.
#[cfg(not(feature = "html"))]
pub fn inline_scripts(_html: &str) -> Vec<Resource> {
    tracing::warn!("HTML parsing not available, skipping inline script extraction");
    Vec::new()
}

/// Every absolute `http://` / `https://` script URL, in match order.
pub fn script_urls(html: &str) -> Vec<&str> {
    SCRIPT_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .collect()
}

/// Download every remote script referenced by the page, one at a time.
///
/// A URL that fails is logged and skipped; the rest are still tried.
pub fn external_scripts(html: &str, fetcher: &dyn ScriptFetcher) -> Vec<Resource> {
    let outcomes = script_urls(html)
        .into_iter()
        .map(|url| {
            fetcher.fetch(url).map(|body| {
                tracing::info!(url, size = body.len(), "Downloaded external script");
                Resource::new(
                    SCRIPT_CONTENT_TYPE,
                    naming::external_script_name(url),
                    ResourceSource::External,
                    body,
                )
                .with_location(Some(url.to_string()))
            })
        })
        .collect();
    keep_successes(outcomes, "external scripts")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::fetch::FetchError;

    /// Serves canned bodies and records every requested URL.
    struct CannedFetcher {
        requested: RefCell<Vec<String>>,
    }

    impl CannedFetcher {
        fn new() -> Self {
            Self {
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl ScriptFetcher for CannedFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            if url.contains("broken") {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            } else {
                Ok(format!("// {url}").into_bytes())
            }
        }
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_inline_skips_src_and_blank_scripts() {
        let html = r#"<script>console.log(1)</script><script src="a.js"></script><script> </script>"#;
        let scripts = inline_scripts(html);
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].data(), b"console.log(1)");
        assert_eq!(scripts[0].source, ResourceSource::Inline);
        assert_eq!(scripts[0].content_type, "text/javascript");
        assert!(scripts[0].filename.starts_with("inline_script_"));
        assert!(scripts[0].filename.ends_with(".js"));
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_inline_keeps_document_order() {
        let html = "<html><head><script>var a;</script></head>\
                    <body><p>x</p><script type=\"module\">var b;</script></body></html>";
        let scripts = inline_scripts(html);
        let bodies: Vec<&[u8]> = scripts.iter().map(|s| s.data()).collect();
        assert_eq!(bodies, [b"var a;".as_slice(), b"var b;".as_slice()]);
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_inline_empty_src_counts_as_inline() {
        let scripts = inline_scripts(r#"<script src="">run();</script>"#);
        assert_eq!(scripts.len(), 1);
    }

    #[test]
    fn test_script_urls_filters_relative() {
        let html = r#"
            <SCRIPT type="text/javascript" SRC="https://cdn.example.com/a.js"></SCRIPT>
            <script src='http://example.com/b.js?v=2' defer></script>
            <script src="/local/c.js"></script>
            <script>inline()</script>
        "#;
        assert_eq!(
            script_urls(html),
            ["https://cdn.example.com/a.js", "http://example.com/b.js?v=2"]
        );
    }

    #[test]
    fn test_external_continues_after_failure() {
        let html = r#"<script src="https://x.test/broken.js"></script>
                      <script src="https://x.test/lib/ok.js?x=1"></script>"#;
        let fetcher = CannedFetcher::new();
        let scripts = external_scripts(html, &fetcher);

        assert_eq!(fetcher.requested.borrow().len(), 2);
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].filename, "ok.js");
        assert_eq!(scripts[0].source, ResourceSource::External);
        assert_eq!(scripts[0].location.as_deref(), Some("https://x.test/lib/ok.js?x=1"));
        assert_eq!(scripts[0].data(), b"// https://x.test/lib/ok.js?x=1");
    }

    #[test]
    fn test_external_without_remote_urls_fetches_nothing() {
        let fetcher = CannedFetcher::new();
        let scripts = external_scripts(r#"<script src="app.js"></script>"#, &fetcher);
        assert!(scripts.is_empty());
        assert!(fetcher.requested.borrow().is_empty());
    }
}
