//! Page assembly.
//!
//! The page template has three slots: title, article body, categories.
//! [`SiteTemplates`] fills them with [maud](https://maud.lambda.xyz/). The
//! title is escaped. Body and categories are already HTML and are inserted
//! verbatim. The categories section is omitted entirely when the cleaned
//! listing is empty.
//!
//! The stylesheet is embedded at compile time from `static/style.css`.

use crate::categories::clean_categories;
use crate::config::SiteConfig;
use crate::rewrite::{LinkPipeline, rewrite_article_links};
use crate::types::{ArticleQueryResult, PageKind, RenderedPage};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/style.css");

/// Values for the template's named slots.
#[derive(Debug, Clone, Copy)]
pub struct PageSlots<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub categories: &'a str,
}

/// A page template engine: fills the slots of the template for `kind`.
pub trait PageRenderer {
    fn render(&self, kind: PageKind, slots: &PageSlots<'_>) -> RenderedPage;
}

/// The site's built-in templates.
pub struct SiteTemplates {
    site_name: String,
    home: String,
}

impl SiteTemplates {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            site_name: site.name.clone(),
            home: site.home.clone(),
        }
    }

    fn document(&self, page_class: &str, slots: &PageSlots<'_>) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (slots.title) " - " (self.site_name) }
                    style { (PreEscaped(CSS)) }
                }
                body {
                    header.site-header {
                        a href=(self.home) { (self.site_name) }
                    }
                    main class=(page_class) {
                        h1 { (slots.title) }
                        div.page-body { (PreEscaped(slots.body)) }
                        @if !slots.categories.is_empty() {
                            div.catlinks { (PreEscaped(slots.categories)) }
                        }
                    }
                }
            }
        }
    }
}

impl PageRenderer for SiteTemplates {
    fn render(&self, kind: PageKind, slots: &PageSlots<'_>) -> RenderedPage {
        let page_class = match kind {
            PageKind::Article => "article-page",
            PageKind::Category => "category-page",
        };
        RenderedPage::new(self.document(page_class, slots).into_string())
    }
}

/// Rewrite, clean and render one fetched page.
pub fn assemble(
    article: &ArticleQueryResult,
    kind: PageKind,
    pipeline: LinkPipeline,
    renderer: &dyn PageRenderer,
) -> RenderedPage {
    let body = rewrite_article_links(&article.body_html, pipeline);
    let categories = clean_categories(article.categories_html.as_deref());
    renderer.render(
        kind,
        &PageSlots {
            title: &article.title,
            body: &body,
            categories: &categories,
        },
    )
}
