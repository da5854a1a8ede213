//! Category listing cleanup.
//!
//! The API's `categorieshtml` is a `div#catlinks` containing a link to
//! `Special:Categories`, the visible category links, and (for pages with
//! maintenance categories) a `div#mw-hidden-catlinks` block. Only the visible
//! links make sense on a static site.

use crate::rewrite::rewrite_extant_links;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

const HIDDEN_MARKER: &str = "mw-hidden";

static HIDDEN_CATLINKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div id="mw-hidden-catlinks.+?</div>"#).expect("HIDDEN_CATLINKS should compile")
});

static SPECIAL_CATEGORIES_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="[^"]*/index\.php/Special:Categories"[^>]*>(Category|Categories)</a>"#)
        .expect("SPECIAL_CATEGORIES_LINK should compile")
});

/// Remove the hidden-categories container, if the listing has one.
pub fn remove_hidden_categories(html: &str) -> String {
    if !html.contains(HIDDEN_MARKER) {
        return html.to_string();
    }
    HIDDEN_CATLINKS.replace_all(html, "").into_owned()
}

/// De-link the `Special:Categories` index anchor, keeping its label.
pub fn unlink_categories_index(html: &str) -> String {
    SPECIAL_CATEGORIES_LINK.replace_all(html, "${1}").into_owned()
}

/// Turn the raw category listing into static-safe markup.
///
/// Returns `""` when there is nothing worth rendering: no listing at all, or
/// a listing in which no category link was rewritten.
pub fn clean_categories(categories_html: Option<&str>) -> String {
    let Some(html) = categories_html else {
        return String::new();
    };

    let visible = remove_hidden_categories(html);
    let unlinked = unlink_categories_index(&visible);
    let (rewritten, links) = rewrite_extant_links(&unlinked);
    debug!(links, "rewrote category links");

    if links == 0 { String::new() } else { rewritten }
}
