//! Shared types passed between pipeline stages.
//!
//! Everything here is transient: built once per run, never mutated after
//! construction, and dropped when the page has been published.

use std::collections::BTreeMap;
use std::fmt;

/// Which kind of wiki page is being converted.
///
/// Selects both the fetch strategy and the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageKind {
    /// A regular article, fetched in one `action=parse` call.
    #[default]
    Article,
    /// A category page. The member listing comes from `action=render` on
    /// `index.php`, the title and categories from the API.
    Category,
}

/// A successfully parsed page as reported by the wiki API.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQueryResult {
    /// Display title as normalized by the wiki (`Test Page`, not `test_page`).
    pub title: String,
    /// Rendered article body.
    pub body_html: String,
    /// Rendered category listing. `None` when the page has no categories,
    /// which is not the same thing as an empty listing.
    pub categories_html: Option<String>,
}

/// Diagnostic pairs from an API `error` object, e.g. `code` and `info`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiError {
    pub diagnostics: BTreeMap<String, String>,
}

impl ApiError {
    pub fn code(&self) -> Option<&str> {
        self.diagnostics.get("code").map(String::as_str)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .diagnostics
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        write!(f, "{}", pairs.join("; "))
    }
}

/// Outcome of one wiki query: either page content or the API's error payload.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Parsed(ArticleQueryResult),
    Failed(ApiError),
}

/// A complete HTML document, ready to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage(String);

impl RenderedPage {
    pub fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Canned access policy applied to a published object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acl {
    PublicRead,
}

impl Acl {
    pub fn as_str(self) -> &'static str {
        match self {
            Acl::PublicRead => "public-read",
        }
    }
}

/// Where and how the rendered page is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishTarget {
    pub bucket: String,
    pub key: String,
    pub content_type: &'static str,
    pub acl: Acl,
    /// Website redirect location, served by S3 instead of the object body.
    pub redirect: Option<String>,
}

pub const HTML_CONTENT_TYPE: &str = "text/html";

impl PublishTarget {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            content_type: HTML_CONTENT_TYPE,
            acl: Acl::PublicRead,
            redirect: None,
        }
    }

    pub fn with_redirect(mut self, location: Option<String>) -> Self {
        self.redirect = location;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_target_defaults_to_public_html() {
        let target = PublishTarget::new("bucket", "Page.html");
        assert_eq!(target.content_type, "text/html");
        assert_eq!(target.acl.as_str(), "public-read");
        assert!(target.redirect.is_none());
    }

    #[test]
    fn api_error_display_lists_pairs_in_key_order() {
        let mut diagnostics = BTreeMap::new();
        diagnostics.insert("info".to_string(), "The page you specified doesn't exist.".to_string());
        diagnostics.insert("code".to_string(), "missingtitle".to_string());
        let err = ApiError { diagnostics };

        assert_eq!(err.code(), Some("missingtitle"));
        assert_eq!(
            err.to_string(),
            "code: missingtitle; info: The page you specified doesn't exist."
        );
    }
}
