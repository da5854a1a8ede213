//! Wiki link rewriting.
//!
//! MediaWiki renders internal links against its own script path
//! (`/wiki/index.php/Article`, `/wiki/index.php?title=Missing&action=edit&redlink=1`).
//! None of those resolve once the page is served as a static file, so each
//! shape is rewritten to a path inside the static tree:
//!
//! | Pass | Matches | Becomes |
//! |------|---------|---------|
//! | 1. redlink | `<a href="…index.php?…redlink=1…">Label</a>` | `Label` |
//! | 2. extant | `…/index.php/Article_Path` | `/Article_Path.html` |
//! | 3. generic | `…/index.php/Title` or `…/index.php?title=Title[&amp;action=edit&amp;redlink=1]` | `/Title.html` |
//!
//! `…` is whatever precedes `/index.php` inside the attribute value (scheme,
//! host, script directory) and is consumed by the match.
//!
//! The HTML is treated as flat text. Each pass is a single regex substitution
//! and leaves non-matching text byte-for-byte untouched.
//!
//! ## Pass composition
//!
//! [`LinkPipeline::Legacy`] applies only pass 3, to the untouched input,
//! which leaves redlinks pointing at pages that are never generated.
//! [`LinkPipeline::Cumulative`] (the default) feeds each pass into the next.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Anchor whose href is an `index.php?` edit link for a missing page. The
/// label runs to the first `</a>`, so inline markup inside it is kept.
static REDLINK_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a\s+href="[^"]*index\.php\?[^"]*redlink=1[^"]*"[^>]*>(.*?)</a>"#)
        .expect("REDLINK_ANCHOR should compile")
});

/// Path-style article URL, article path running to the closing quote.
static EXTANT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^"'\s<>]*?/index\.php/([^"]+)"#).expect("EXTANT_LINK should compile")
});

/// Path or `?title=` form, restricted to title-safe characters.
static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"[^"'\s<>]*?/index\.php(?:/|\?title=)([A-Za-z0-9%.:_\-()]+)(?:&amp;action=edit&amp;redlink=1)?"#,
    )
    .expect("WIKI_LINK should compile")
});

const STATIC_PATH: &str = "/${1}.html";

/// How the three passes are combined for article bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPipeline {
    /// Only the generic pass, applied to the original input.
    Legacy,
    /// Redlink, extant and generic passes in sequence.
    #[default]
    Cumulative,
}

/// Replace redlink anchors with their label.
pub fn strip_redlinks(html: &str) -> String {
    REDLINK_ANCHOR.replace_all(html, "${1}").into_owned()
}

/// Rewrite path-style article URLs, returning the new text and how many
/// URLs were rewritten.
pub fn rewrite_extant_links(html: &str) -> (String, usize) {
    let count = EXTANT_LINK.find_iter(html).count();
    if count == 0 {
        return (html.to_string(), 0);
    }
    (EXTANT_LINK.replace_all(html, STATIC_PATH).into_owned(), count)
}

/// Rewrite both URL forms of a wiki title to its static path.
pub fn normalize_wiki_links(html: &str) -> String {
    WIKI_LINK.replace_all(html, STATIC_PATH).into_owned()
}

/// Rewrite every wiki-internal link in an article body.
pub fn rewrite_article_links(html: &str, pipeline: LinkPipeline) -> String {
    match pipeline {
        LinkPipeline::Legacy => normalize_wiki_links(html),
        LinkPipeline::Cumulative => {
            let redlinks = REDLINK_ANCHOR.find_iter(html).count();
            let without_redlinks = strip_redlinks(html);
            let (rewritten, extant) = rewrite_extant_links(&without_redlinks);
            debug!(redlinks, extant, "rewrote article links");
            normalize_wiki_links(&rewritten)
        }
    }
}
