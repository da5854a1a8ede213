//! # page-from-wiki
//!
//! Publishes one MediaWiki article as a static HTML page. The wiki is the
//! authoring tool; the static site (an S3 bucket with website hosting, or a
//! local directory) is what readers see.
//!
//! # Pipeline
//!
//! ```text
//! 1. Fetch      api.php?action=parse   →  title, body HTML, category HTML
//! 2. Rewrite    body HTML              →  links point at /<Title>.html
//!    Clean      category HTML          →  visible categories only, or ""
//! 3. Assemble   title + body + cats    →  complete HTML document
//! 4. Publish    document               →  <Title>.html in the bucket
//! ```
//!
//! Every stage after fetching is a pure function of its input except the
//! final write, and each side-effecting collaborator sits behind a trait
//! ([`fetch::ArticleSource`], [`render::PageRenderer`],
//! [`publish::ObjectStore`]) so a run can be tested end to end in memory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fetch`] | MediaWiki API client and response decoding |
//! | [`rewrite`] | Redlink, extant and generic link rewriting for article bodies |
//! | [`categories`] | Category listing cleanup |
//! | [`render`] | Page template (maud) and assembly |
//! | [`publish`] | Object keys, S3 / directory / in-memory stores |
//! | [`pipeline`] | Orchestration of one run, unified error type |
//! | [`config`] | TOML configuration with stock defaults |
//! | [`types`] | Data passed between stages |
//! | [`output`] | CLI output formatting |
//!
//! # Text, Not Trees
//!
//! Link rewriting works on the HTML as flat text with a handful of regexes.
//! MediaWiki's output is regular enough for that to be reliable, and a real
//! parser would re-serialize the document and change attribute quoting,
//! entity encoding and whitespace in ways nobody asked for. Each pattern is
//! anchored on `index.php`, so text that is not a wiki link passes through
//! byte-for-byte.

pub mod categories;
pub mod config;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod rewrite;
pub mod types;
