//! Fetch → rewrite → assemble → publish, for one page.
//!
//! Each stage is injected ([`ArticleSource`], [`PageRenderer`],
//! [`ObjectStore`]) so the whole run can be exercised without a wiki or a
//! bucket. A dry run does everything up to the rendered document and asks
//! the store only where the page would go.

use crate::config::{Config, ConfigError};
use crate::fetch::{ArticleSource, FetchError};
use crate::publish::{self, ObjectStore, PublishError, object_key, redirect_location};
use crate::render::{PageRenderer, assemble};
use crate::types::{ApiError, PageKind, PublishTarget, QueryOutcome, RenderedPage};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Input(String),
    #[error("wiki API returned an error: {0}")]
    Remote(ApiError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What to convert and how to name it.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Wiki page title, as typed by the user.
    pub title: String,
    /// Object name without `.html`. Defaults to the normalized title.
    pub output_name: Option<String>,
    /// Page name or path the published object should redirect to.
    pub redirect: Option<String>,
    pub kind: PageKind,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Title as reported by the wiki.
    pub title: String,
    pub target: PublishTarget,
    pub page: RenderedPage,
    /// Where the page was written, or would have been on a dry run.
    pub destination: String,
    pub dry_run: bool,
}

/// Reject requests that cannot succeed, before anything touches the network.
pub fn validate_request(request: &Request) -> Result<(), PipelineError> {
    if request.title.trim().is_empty() {
        return Err(PipelineError::Input(
            "You must specify the article name.".to_string(),
        ));
    }
    Ok(())
}

/// Build the page and its publish target without writing anything.
///
/// Returns the page, its target, and the title as reported by the wiki.
pub fn build(
    config: &Config,
    request: &Request,
    source: &dyn ArticleSource,
    renderer: &dyn PageRenderer,
) -> Result<(RenderedPage, PublishTarget, String), PipelineError> {
    validate_request(request)?;

    let article = match source.fetch(&request.title, request.kind)? {
        QueryOutcome::Parsed(article) => article,
        QueryOutcome::Failed(err) => return Err(PipelineError::Remote(err)),
    };
    debug!(
        title = %article.title,
        body_bytes = article.body_html.len(),
        has_categories = article.categories_html.is_some(),
        "fetched page"
    );

    let page = assemble(&article, request.kind, config.links.pipeline, renderer);

    // The key follows the requested title, not the wiki's normalized one.
    let key = object_key(&request.title, request.output_name.as_deref());
    let target = PublishTarget::new(config.publish.bucket.clone(), key)
        .with_redirect(request.redirect.as_deref().map(redirect_location));

    Ok((page, target, article.title))
}

/// Run the whole conversion. With `dry_run` set nothing is written to `store`.
///
/// A failed write is returned as [`PipelineError::Publish`]; there is no
/// report for a page that did not land.
pub fn run(
    config: &Config,
    request: &Request,
    source: &dyn ArticleSource,
    renderer: &dyn PageRenderer,
    store: &dyn ObjectStore,
    dry_run: bool,
) -> Result<Report, PipelineError> {
    let (page, target, title) = build(config, request, source, renderer)?;

    if dry_run {
        debug!(key = %target.key, "dry run, skipping publish");
    } else {
        publish::publish(store, &target, &page)?;
    }

    Ok(Report {
        title,
        destination: store.describe(&target),
        target,
        page,
        dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::MemoryStore;
    use crate::render::SiteTemplates;
    use crate::types::ArticleQueryResult;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    struct Canned {
        outcome: QueryOutcome,
        calls: Cell<usize>,
    }

    impl Canned {
        fn new(outcome: QueryOutcome) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
            }
        }
    }

    impl ArticleSource for Canned {
        fn fetch(&self, _title: &str, _kind: PageKind) -> Result<QueryOutcome, FetchError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.outcome.clone())
        }
    }

    fn article(title: &str) -> QueryOutcome {
        QueryOutcome::Parsed(ArticleQueryResult {
            title: title.to_string(),
            body_html: "<p>body</p>".to_string(),
            categories_html: None,
        })
    }

    fn request(title: &str) -> Request {
        Request {
            title: title.to_string(),
            ..Request::default()
        }
    }

    #[test]
    fn empty_title_fails_before_fetch() {
        let config = Config::default();
        let source = Canned::new(article("x"));
        let templates = SiteTemplates::new(&config.site);
        let store = MemoryStore::new();

        let err = run(&config, &request("  "), &source, &templates, &store, false).unwrap_err();

        assert!(matches!(err, PipelineError::Input(_)));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn api_error_aborts_without_publishing() {
        let config = Config::default();
        let mut diagnostics = BTreeMap::new();
        diagnostics.insert("code".to_string(), "missingtitle".to_string());
        let source = Canned::new(QueryOutcome::Failed(ApiError { diagnostics }));
        let templates = SiteTemplates::new(&config.site);
        let store = MemoryStore::new();

        let err = run(&config, &request("Nope"), &source, &templates, &store, false).unwrap_err();

        match err {
            PipelineError::Remote(api) => assert_eq!(api.code(), Some("missingtitle")),
            other => panic!("expected remote error, got {other:?}"),
        }
        assert!(store.objects().is_empty());
    }

    #[test]
    fn output_name_and_redirect_shape_target() {
        let config = Config::default();
        let source = Canned::new(article("Test Page"));
        let templates = SiteTemplates::new(&config.site);
        let req = Request {
            title: "Test Page".to_string(),
            output_name: Some("index".to_string()),
            redirect: Some("Main Street".to_string()),
            kind: PageKind::Article,
        };
        let store = MemoryStore::new();

        let report = run(&config, &req, &source, &templates, &store, true).unwrap();

        assert_eq!(report.target.key, "index.html");
        assert_eq!(report.target.bucket, "www.fracturedfairfax.com");
        assert_eq!(report.target.redirect.as_deref(), Some("/Main_Street.html"));
        assert!(report.dry_run);
        assert!(store.objects().is_empty());
    }

    #[test]
    fn published_report_names_destination() {
        let config = Config::default();
        let source = Canned::new(article("Test Page"));
        let templates = SiteTemplates::new(&config.site);
        let store = MemoryStore::new();

        let report = run(&config, &request("Test Page"), &source, &templates, &store, false).unwrap();

        assert_eq!(report.destination, "memory://www.fracturedfairfax.com/Test_Page.html");
        assert!(!report.dry_run);
        assert_eq!(store.objects().len(), 1);
    }

    #[test]
    fn dry_run_names_destination_without_writing() {
        let config = Config::default();
        let source = Canned::new(article("Test Page"));
        let templates = SiteTemplates::new(&config.site);
        let store = MemoryStore::new();

        let report = run(&config, &request("Test Page"), &source, &templates, &store, true).unwrap();

        assert_eq!(report.destination, "memory://www.fracturedfairfax.com/Test_Page.html");
        assert!(store.objects().is_empty());
    }
}
