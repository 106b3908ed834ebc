//! # blogsmith
//!
//! A batch pipeline for keyword-driven static blogs. A CSV ledger lists the
//! posts to publish; one content file per slug supplies each body. The
//! pipeline turns them into static HTML pages, indexes the whole site for
//! crawlers, and pings IndexNow so search engines pick up the changes.
//!
//! # Architecture: Filesystem-Coupled Stages
//!
//! Each stage is a subcommand that reads what the previous one wrote:
//!
//! ```text
//! 0. Draft      ledger → content/<slug>.json    (optional, Anthropic API)
//! 1. Generate   ledger + content → blog/*.html  (+ generated-urls.txt)
//! 2. Sitemap    site root → sitemap.xml, robots.txt
//! 3. IndexNow   generated-urls.txt → IndexNow endpoint
//! ```
//!
//! Inside the library, stages pass typed values: [`ledger::LedgerRecord`] →
//! [`types::ContentFragment`] → [`generate::BlogPage`] →
//! [`sitemap::SitemapEntry`]. Every entry point takes a [`config::Site`]
//! (root directory plus parsed `site.toml`), so there is no global state.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`ledger`] | Reads the keyword ledger CSV into records |
//! | [`content`] | Resolves a slug to body markup from `.json`, `.html` or `.md` |
//! | [`generate`] | Renders pages with Maud and writes the published-URL log |
//! | [`sitemap`] | Walks the site for pages and writes `sitemap.xml` and `robots.txt` |
//! | [`indexnow`] | Manages the IndexNow key and submits URL batches |
//! | [`draft`] | Drafts missing content through the Anthropic Messages API |
//! | [`config`] | `site.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Types shared between stages |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## Maud For Pages
//!
//! Pages are built with [Maud](https://maud.lambda.xyz/). Ledger text is
//! interpolated through an escaping wrapper that covers all five HTML special
//! characters, including inside attributes and the JSON-LD block. Content
//! bodies are trusted and inserted as pre-escaped markup.
//!
//! ## Nothing Fails Halfway
//!
//! Missing content, rejected IndexNow batches and failed drafts are reported,
//! not raised. Only missing inputs the whole run depends on (ledger, key,
//! API key, unknown `--single` slug, bad config) stop a stage.

pub mod config;
pub mod content;
pub mod draft;
pub mod generate;
pub mod indexnow;
pub mod ledger;
pub mod output;
pub mod sitemap;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
