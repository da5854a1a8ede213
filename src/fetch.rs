//! Article fetching from a MediaWiki API.
//!
//! ## Article pages
//!
//! One `GET api.php?action=parse&page=<title>&prop=text|categorieshtml…`.
//! The response is either
//!
//! ```json
//! {"parse": {"title": "Test Page", "text": {"*": "<p>…</p>"}, "categorieshtml": {"*": "…"}}}
//! ```
//!
//! or an error payload:
//!
//! ```json
//! {"error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}}
//! ```
//!
//! `categorieshtml` is absent for pages without categories.
//!
//! ## Category pages
//!
//! `action=parse` does not include the member listing MediaWiki generates
//! for category pages, so the body comes from `index.php?action=render`
//! instead and the API is only asked for `categorieshtml`.

use crate::config::WikiConfig;
use crate::types::{ApiError, ArticleQueryResult, PageKind, QueryOutcome};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid API response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed API response: {0}")]
    Malformed(String),
}

/// Anything that can answer a page query. Implemented by [`WikiClient`];
/// tests substitute canned responses.
pub trait ArticleSource {
    fn fetch(&self, title: &str, kind: PageKind) -> Result<QueryOutcome, FetchError>;
}

/// Query string for `api.php?action=parse`.
pub fn query_params(title: &str, kind: PageKind) -> Vec<(&'static str, String)> {
    let prop = match kind {
        PageKind::Article => "text|categorieshtml",
        PageKind::Category => "categorieshtml",
    };
    vec![
        ("action", "parse".to_string()),
        ("page", title.to_string()),
        ("prop", prop.to_string()),
        ("disablelimitreport", "true".to_string()),
        ("disableeditsection", "true".to_string()),
        ("format", "json".to_string()),
    ]
}

// Wire shapes. MediaWiki's legacy JSON format wraps HTML in {"*": "..."}.

#[derive(Debug, Deserialize)]
struct ApiResponse {
    parse: Option<ParsedSection>,
    error: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ParsedSection {
    title: String,
    text: Option<Star>,
    categorieshtml: Option<Star>,
}

#[derive(Debug, Deserialize)]
struct Star {
    #[serde(rename = "*")]
    content: String,
}

/// Parsed page whose body may still be missing (category queries).
struct PartialPage {
    title: String,
    body_html: Option<String>,
    categories_html: Option<String>,
}

enum PartialOutcome {
    Parsed(PartialPage),
    Failed(ApiError),
}

fn api_error(fields: BTreeMap<String, serde_json::Value>) -> ApiError {
    let diagnostics = fields
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect();
    ApiError { diagnostics }
}

fn decode(json: &str) -> Result<PartialOutcome, FetchError> {
    let response: ApiResponse = serde_json::from_str(json)?;
    if let Some(fields) = response.error {
        return Ok(PartialOutcome::Failed(api_error(fields)));
    }
    let parse = response
        .parse
        .ok_or_else(|| FetchError::Malformed("neither `parse` nor `error` present".into()))?;
    Ok(PartialOutcome::Parsed(PartialPage {
        title: parse.title,
        body_html: parse.text.map(|s| s.content),
        categories_html: parse.categorieshtml.map(|s| s.content),
    }))
}

/// Decode an `action=parse` response that was asked for `text`.
pub fn parse_response(json: &str) -> Result<QueryOutcome, FetchError> {
    match decode(json)? {
        PartialOutcome::Failed(err) => Ok(QueryOutcome::Failed(err)),
        PartialOutcome::Parsed(page) => {
            let body_html = page
                .body_html
                .ok_or_else(|| FetchError::Malformed("`parse.text` missing".into()))?;
            Ok(QueryOutcome::Parsed(ArticleQueryResult {
                title: page.title,
                body_html,
                categories_html: page.categories_html,
            }))
        }
    }
}

/// Blocking MediaWiki client.
pub struct WikiClient {
    http: reqwest::blocking::Client,
    api_url: String,
    index_url: String,
}

impl WikiClient {
    pub fn new(config: &WikiConfig) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            index_url: config.index_url.clone(),
        })
    }

    fn get_text(&self, url: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let response = self.http.get(url).query(params).send()?;
        debug!(url = %response.url(), status = %response.status(), "wiki request");
        Ok(response.error_for_status()?.text()?)
    }

    fn fetch_article(&self, title: &str) -> Result<QueryOutcome, FetchError> {
        let body = self.get_text(&self.api_url, &query_params(title, PageKind::Article))?;
        parse_response(&body)
    }

    fn fetch_category(&self, title: &str) -> Result<QueryOutcome, FetchError> {
        let body = self.get_text(&self.api_url, &query_params(title, PageKind::Category))?;
        let page = match decode(&body)? {
            PartialOutcome::Failed(err) => return Ok(QueryOutcome::Failed(err)),
            PartialOutcome::Parsed(page) => page,
        };

        let render_params = [
            ("action", "render".to_string()),
            ("title", title.to_string()),
        ];
        let body_html = self.get_text(&self.index_url, &render_params)?;

        Ok(QueryOutcome::Parsed(ArticleQueryResult {
            title: page.title,
            body_html,
            categories_html: page.categories_html,
        }))
    }
}

impl ArticleSource for WikiClient {
    fn fetch(&self, title: &str, kind: PageKind) -> Result<QueryOutcome, FetchError> {
        match kind {
            PageKind::Article => self.fetch_article(title),
            PageKind::Category => self.fetch_category(title),
        }
    }
}
