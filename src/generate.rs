//! Blog page generation.
//!
//! Reads the keyword ledger, resolves each slug's content fragment and renders
//! one static page per slug into the output directory.
//!
//! ## Output
//!
//! ```text
//! site-root/
//! ├── blog/
//! │   ├── demo.html                  # <output_dir>/<slug>.html, overwritten every run
//! │   └── structured-guide.html
//! └── blog-scripts/
//!     └── generated-urls.txt         # Absolute URLs published by the last run
//! ```
//!
//! ## Escaping
//!
//! Ledger values are plain text and end up in attributes, element text and
//! the JSON-LD block. All of them go through [`escape_html`], which replaces
//! `& < > " '` with entities, regardless of destination. The body markup from
//! the content resolver is trusted and inserted as-is.
//!
//! ## Dates
//!
//! The page carries the render date as both `datePublished` and
//! `dateModified`; no first-publish date is stored. [`generate`] takes the
//! date as an option so output is reproducible for a fixed date.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for the page shell. Styles are
//! embedded at compile time from `static/blog.css`.

use crate::config::{Site, SiteConfig};
use crate::content::{self, ContentError};
use crate::ledger::{self, LedgerError, LedgerRecord};
use crate::types::{ContentFormat, ContentFragment};
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, Render, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("blog with slug \"{0}\" not found in the keyword ledger")]
    SlugNotFound(String),
}

const CSS: &str = include_str!("../static/blog.css");

/// Words per minute used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Word count assumed when neither the content nor the ledger gives one.
pub const FALLBACK_WORD_COUNT: usize = 1500;

// ============================================================================
// Escaping
// ============================================================================

/// Replace `& < > " '` with their entity equivalents.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn push_escaped(buffer: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => buffer.push_str("&amp;"),
            '<' => buffer.push_str("&lt;"),
            '>' => buffer.push_str("&gt;"),
            '"' => buffer.push_str("&quot;"),
            '\'' => buffer.push_str("&#039;"),
            _ => buffer.push(c),
        }
    }
}

/// Text rendered through [`escape_html`] when spliced into a maud template.
///
/// Maud's own escaping leaves `'` alone; ledger values always go through this
/// wrapper instead so every destination gets the same five replacements.
pub struct Escaped<'a>(pub &'a str);

impl Render for Escaped<'_> {
    fn render_to(&self, buffer: &mut String) {
        push_escaped(buffer, self.0);
    }
}

// ============================================================================
// Page data
// ============================================================================

/// Estimated read time: `ceil(words / 200)`, never less than one minute.
pub fn read_time_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Everything the renderer needs for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogPage {
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    pub primary_keyword: String,
    pub secondary_keywords: String,
    pub category: String,
    pub author: String,
    pub word_count: usize,
    pub body_html: String,
}

impl BlogPage {
    /// Merge a ledger record, its content and configured defaults.
    ///
    /// Word count: the content's own count, else the ledger target, else 1500.
    pub fn new(record: &LedgerRecord, fragment: &ContentFragment, config: &SiteConfig) -> Self {
        let or_default = |value: &str, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };
        let word_count = Some(fragment.word_count)
            .filter(|&n| n > 0)
            .or_else(|| record.target_words())
            .unwrap_or(FALLBACK_WORD_COUNT);

        Self {
            slug: record.slug.clone(),
            title: record.title.clone(),
            meta_description: record.meta_description.clone(),
            primary_keyword: record.primary_keyword.clone(),
            secondary_keywords: record.secondary_keywords.clone(),
            category: or_default(&record.category, &config.default_category),
            author: or_default(&record.author, &config.default_author),
            word_count,
            body_html: fragment.html.clone(),
        }
    }

    /// Keywords meta value: primary keyword, then the secondary list.
    pub fn keywords(&self) -> String {
        [self.primary_keyword.as_str(), self.secondary_keywords.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Schema.org Article block. Every interpolated value is escaped.
fn article_json_ld(site: &Site, page: &BlogPage, today: NaiveDate) -> String {
    let url = site.blog_url(&page.slug);
    let date = today.format("%Y-%m-%d").to_string();
    format!(
        r#"
    {{
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": "{headline}",
        "description": "{description}",
        "author": {{
            "@type": "Organization",
            "name": "{author}"
        }},
        "publisher": {{
            "@type": "Organization",
            "name": "{publisher}",
            "url": "{site_url}"
        }},
        "datePublished": "{date}",
        "dateModified": "{date}",
        "mainEntityOfPage": "{url}"
    }}
    "#,
        headline = escape_html(&page.title),
        description = escape_html(&page.meta_description),
        author = escape_html(&page.author),
        publisher = escape_html(&site.config.site_name),
        site_url = escape_html(&site.config.site_url),
        url = escape_html(&url),
    )
}

/// Render the complete page document.
pub fn render_page(site: &Site, page: &BlogPage, today: NaiveDate) -> Markup {
    let config = &site.config;
    let canonical = site.blog_url(&page.slug);
    let keywords = page.keywords();
    let date_display = today.format("%B %-d, %Y").to_string();
    let read_time = read_time_minutes(page.word_count);
    let year = today.format("%Y").to_string();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (Escaped(&page.title)) }
                meta name="description" content=(Escaped(&page.meta_description));
                meta name="keywords" content=(Escaped(&keywords));
                meta name="author" content=(Escaped(&page.author));
                link rel="canonical" href=(Escaped(&canonical));

                meta property="og:title" content=(Escaped(&page.title));
                meta property="og:description" content=(Escaped(&page.meta_description));
                meta property="og:type" content="article";
                meta property="og:url" content=(Escaped(&canonical));
                meta property="og:site_name" content=(Escaped(&config.site_name));

                meta name="twitter:card" content="summary_large_image";
                meta name="twitter:title" content=(Escaped(&page.title));
                meta name="twitter:description" content=(Escaped(&page.meta_description));

                script type="application/ld+json" {
                    (PreEscaped(article_json_ld(site, page, today)))
                }

                link rel="preconnect" href="https://fonts.googleapis.com";
                link href="https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@300;400;500;700&family=Inter:wght@300;400;600&display=swap" rel="stylesheet";
                link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css" referrerpolicy="no-referrer";
                style { (PreEscaped(CSS)) }
                @if !config.page.stylesheet.is_empty() {
                    link rel="stylesheet" href=(config.page.stylesheet);
                }
            }
            body {
                (site_nav(config))
                article.blog-container {
                    header.blog-header {
                        span.blog-category { (Escaped(&page.category)) }
                        h1.blog-title { (Escaped(&page.title)) }
                        div.blog-meta {
                            span { i.fa-regular.fa-calendar {} " " (date_display) }
                            span { i.fa-regular.fa-clock {} " " (read_time) " min read" }
                            span { i.fa-regular.fa-user {} " " (Escaped(&page.author)) }
                        }
                    }
                    div.blog-content {
                        (PreEscaped(&page.body_html))
                        div.cta-section {
                            h2 { (config.page.cta_heading) }
                            p { (config.page.cta_text) }
                            a.btn-cta.btn-cta-primary href=(config.page.cta_href) { (config.page.cta_label) }
                        }
                    }
                }
                footer.site-footer {
                    div.footer-bottom {
                        span { "© " (year) " " (config.site_name) ". All Rights Reserved." }
                    }
                }
            }
        }
    }
}

/// Fixed top navigation bar.
fn site_nav(config: &SiteConfig) -> Markup {
    let home = config
        .page
        .nav
        .first()
        .map(|link| link.href.as_str())
        .unwrap_or("/");
    html! {
        nav {
            a.logo href=(home) {
                span { (config.site_name.to_uppercase()) }
                span.logo-subtitle { (config.page.tagline) }
            }
            div.nav-links {
                @for link in &config.page.nav {
                    a.nav-item href=(link.href) { (link.label) }
                }
            }
            a.btn-cta href=(config.page.cta_href) { "Get Started" }
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Report what would be written without touching the output directory.
    pub dry_run: bool,
    /// Only process this slug.
    pub single: Option<String>,
    /// Date stamped into every page.
    pub today: NaiveDate,
}

/// What happened to one ledger row.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Generated {
        slug: String,
        path: PathBuf,
        url: String,
        format: ContentFormat,
    },
    DryRun {
        slug: String,
        path: PathBuf,
    },
    /// No content file for the slug; `expected` lists the files tried.
    Skipped {
        slug: String,
        expected: Vec<PathBuf>,
    },
    /// Empty or unsafe slug; the row (1-based, excluding the header) was ignored.
    InvalidSlug { row: usize, slug: String },
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub outcomes: Vec<PageOutcome>,
    /// Set when the ledger was seeded from its template this run.
    pub seeded_ledger: Option<PathBuf>,
    /// Set when the published-URL log was written.
    pub urls_log: Option<PathBuf>,
}

impl GenerateReport {
    /// Pages written, or that would have been written in a dry run.
    pub fn generated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PageOutcome::Generated { .. } | PageOutcome::DryRun { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.generated()
    }

    pub fn published_urls(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                PageOutcome::Generated { url, .. } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Copy `<stem>-template.csv` into place when the ledger itself is missing.
fn seed_ledger(ledger: &Path) -> Result<Option<PathBuf>, GenerateError> {
    if ledger.exists() {
        return Ok(None);
    }
    match ledger::template_path(ledger) {
        Some(template) if template.is_file() => {
            fs::copy(&template, ledger)?;
            Ok(Some(template))
        }
        _ => Ok(None),
    }
}

/// Run the generator over the whole ledger (or one slug).
pub fn generate(site: &Site, options: &GenerateOptions) -> Result<GenerateReport, GenerateError> {
    let content_dir = site.content_dir();
    let output_dir = site.output_dir();
    fs::create_dir_all(&content_dir)?;
    fs::create_dir_all(&output_dir)?;

    let ledger_path = site.ledger_path();
    let seeded_ledger = seed_ledger(&ledger_path)?;
    let mut records = ledger::read_ledger(&ledger_path)?;

    if let Some(slug) = &options.single {
        records.retain(|r| &r.slug == slug);
        if records.is_empty() {
            return Err(GenerateError::SlugNotFound(slug.clone()));
        }
    }

    let mut report = GenerateReport {
        seeded_ledger,
        ..GenerateReport::default()
    };

    for (idx, record) in records.iter().enumerate() {
        if !record.has_safe_slug() {
            report.outcomes.push(PageOutcome::InvalidSlug {
                row: idx + 1,
                slug: record.slug.clone(),
            });
            continue;
        }

        let Some(fragment) = content::resolve(&content_dir, &record.slug)? else {
            report.outcomes.push(PageOutcome::Skipped {
                slug: record.slug.clone(),
                expected: content::candidate_paths(&content_dir, &record.slug),
            });
            continue;
        };

        let path = output_dir.join(format!("{}.html", record.slug));
        if options.dry_run {
            report.outcomes.push(PageOutcome::DryRun {
                slug: record.slug.clone(),
                path,
            });
            continue;
        }

        let page = BlogPage::new(record, &fragment, &site.config);
        let markup = render_page(site, &page, options.today);
        fs::write(&path, markup.into_string())?;
        debug!(slug = %record.slug, path = %path.display(), "wrote page");

        report.outcomes.push(PageOutcome::Generated {
            slug: record.slug.clone(),
            path,
            url: site.blog_url(&record.slug),
            format: fragment.format,
        });
    }

    let urls = report.published_urls();
    if !options.dry_run && !urls.is_empty() {
        let log = site.urls_log();
        if let Some(parent) = log.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&log, urls.join("\n"))?;
        report.urls_log = Some(log);
    }

    Ok(report)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    fn sample_page() -> BlogPage {
        BlogPage {
            slug: "demo".to_string(),
            title: "Demo Post".to_string(),
            meta_description: "A demo".to_string(),
            primary_keyword: "demo".to_string(),
            secondary_keywords: "sample, example".to_string(),
            category: "Guides".to_string(),
            author: "Jo".to_string(),
            word_count: 450,
            body_html: "<p>Hello</p>".to_string(),
        }
    }

    fn fragment(html: &str, word_count: usize) -> ContentFragment {
        ContentFragment {
            html: html.to_string(),
            word_count,
            format: ContentFormat::RawMarkup,
            source_path: PathBuf::from("x.html"),
        }
    }

    // =========================================================================
    // Escaping
    // =========================================================================

    #[test]
    fn escape_replaces_all_five_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape_html("plain text"), "plain text");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn escaped_output_has_no_raw_specials() {
        let out = escape_html(r#"<script>alert("x")</script> & more"#);
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert!(!out.contains('"'));
        // Every ampersand starts an entity
        for (i, _) in out.match_indices('&') {
            let rest = &out[i..];
            assert!(
                ["&amp;", "&lt;", "&gt;", "&quot;", "&#039;"]
                    .iter()
                    .any(|e| rest.starts_with(e)),
                "bare ampersand at {i}: {out}"
            );
        }
    }

    #[test]
    fn escaped_renders_through_maud() {
        let markup = html! { meta content=(Escaped("it's \"quoted\"")); };
        assert_eq!(
            markup.into_string(),
            r#"<meta content="it&#039;s &quot;quoted&quot;">"#
        );
    }

    #[test]
    fn hostile_title_is_escaped_everywhere() {
        let site = test_site();
        let mut page = sample_page();
        page.title = r#"</script><script>alert("x")</script>"#.to_string();
        let html = render_page(&site, &page, date()).into_string();

        assert!(!html.contains("<script>alert"));
        assert!(!html.contains(r#"alert("x")"#));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)"));
        // Only the JSON-LD script element remains
        assert_eq!(html.matches("</script>").count(), 1);
    }

    // =========================================================================
    // Page data
    // =========================================================================

    #[test]
    fn read_time_rounds_up() {
        assert_eq!(read_time_minutes(1), 1);
        assert_eq!(read_time_minutes(200), 1);
        assert_eq!(read_time_minutes(201), 2);
        assert_eq!(read_time_minutes(1500), 8);
    }

    #[test]
    fn read_time_for_zero_words_is_one_minute() {
        assert_eq!(read_time_minutes(0), 1);
    }

    #[test]
    fn blog_page_applies_defaults() {
        let config = SiteConfig::default();
        let record = LedgerRecord {
            slug: "demo".to_string(),
            title: "Demo".to_string(),
            ..LedgerRecord::default()
        };
        let page = BlogPage::new(&record, &fragment("<p>a b</p>", 2), &config);
        assert_eq!(page.author, config.default_author);
        assert_eq!(page.category, config.default_category);
        assert_eq!(page.word_count, 2);
    }

    #[test]
    fn blog_page_word_count_falls_back_to_ledger_then_constant() {
        let config = SiteConfig::default();
        let mut record = LedgerRecord {
            target_word_count: "900".to_string(),
            ..LedgerRecord::default()
        };
        assert_eq!(BlogPage::new(&record, &fragment("", 0), &config).word_count, 900);

        record.target_word_count = String::new();
        assert_eq!(
            BlogPage::new(&record, &fragment("", 0), &config).word_count,
            FALLBACK_WORD_COUNT
        );
    }

    #[test]
    fn keywords_skip_empty_parts() {
        let mut page = sample_page();
        assert_eq!(page.keywords(), "demo, sample, example");
        page.secondary_keywords.clear();
        assert_eq!(page.keywords(), "demo");
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn render_includes_metadata_and_body() {
        let site = test_site();
        let html = render_page(&site, &sample_page(), date()).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Demo Post</title>"));
        assert!(html.contains(r#"<meta name="keywords" content="demo, sample, example">"#));
        assert!(html.contains(r#"<link rel="canonical" href="https://www.example.com/blog/demo">"#));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
        assert!(html.contains("<p>Hello</p>"));
        assert!(html.contains("3 min read"));
    }

    #[test]
    fn render_stamps_dates() {
        let site = test_site();
        let html = render_page(&site, &sample_page(), date()).into_string();
        assert!(html.contains(r#""datePublished": "2026-03-09""#));
        assert!(html.contains(r#""dateModified": "2026-03-09""#));
        assert!(html.contains("March 9, 2026"));
        assert!(html.contains("© 2026"));
    }

    #[test]
    fn render_json_ld_names_publisher() {
        let site = test_site();
        let html = render_page(&site, &sample_page(), date()).into_string();
        assert!(html.contains(r#"<script type="application/ld+json">"#));
        assert!(html.contains(r#""@type": "Article""#));
        assert!(html.contains(r#""mainEntityOfPage": "https://www.example.com/blog/demo""#));
    }

    #[test]
    fn render_is_deterministic_for_a_fixed_date() {
        let site = test_site();
        let a = render_page(&site, &sample_page(), date()).into_string();
        let b = render_page(&site, &sample_page(), date()).into_string();
        assert_eq!(a, b);

        let later = render_page(&site, &sample_page(), date().succ_opt().unwrap()).into_string();
        assert_ne!(a, later);
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    fn options() -> GenerateOptions {
        GenerateOptions {
            dry_run: false,
            single: None,
            today: date(),
        }
    }

    #[test]
    fn generate_writes_pages_and_skips_missing_content() {
        let (_tmp, site) = setup_site();
        let report = generate(&site, &options()).unwrap();

        let written = generated_slugs(&report);
        assert_eq!(written, vec!["demo", "structured-guide", "raw-notes", "tips-and-tricks"]);
        assert_eq!(skipped_slugs(&report), vec!["missing-post"]);
        assert_eq!(report.generated(), 4);
        assert_eq!(report.skipped(), 1);

        for slug in written {
            assert!(site.output_dir().join(format!("{slug}.html")).is_file());
        }
    }

    #[test]
    fn skipped_outcome_lists_expected_files() {
        let (_tmp, site) = setup_site();
        let report = generate(&site, &options()).unwrap();
        let expected = report
            .outcomes
            .iter()
            .find_map(|o| match o {
                PageOutcome::Skipped { expected, .. } => Some(expected.clone()),
                _ => None,
            })
            .unwrap();
        let names: Vec<String> = expected
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["missing-post.json", "missing-post.html", "missing-post.md"]);
    }

    #[test]
    fn generate_writes_url_log() {
        let (_tmp, site) = setup_site();
        let report = generate(&site, &options()).unwrap();

        let log = fs::read_to_string(site.urls_log()).unwrap();
        let urls: Vec<&str> = log.lines().collect();
        assert_eq!(urls.len(), 4);
        assert_eq!(urls[0], "https://www.example.com/blog/demo");
        assert_eq!(report.urls_log, Some(site.urls_log()));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (_tmp, site) = setup_site();
        let opts = GenerateOptions {
            dry_run: true,
            ..options()
        };
        let report = generate(&site, &opts).unwrap();

        assert_eq!(report.generated(), 4);
        assert!(report.urls_log.is_none());
        assert!(!site.output_dir().join("demo.html").exists());
        assert!(!site.urls_log().exists());
    }

    #[test]
    fn single_slug_filters_ledger() {
        let (_tmp, site) = setup_site();
        let opts = GenerateOptions {
            single: Some("demo".to_string()),
            ..options()
        };
        let report = generate(&site, &opts).unwrap();
        assert_eq!(generated_slugs(&report), vec!["demo"]);
        assert!(!site.output_dir().join("raw-notes.html").exists());
    }

    #[test]
    fn single_unknown_slug_is_fatal() {
        let (_tmp, site) = setup_site();
        let opts = GenerateOptions {
            single: Some("nope".to_string()),
            ..options()
        };
        assert!(matches!(
            generate(&site, &opts),
            Err(GenerateError::SlugNotFound(s)) if s == "nope"
        ));
    }

    #[test]
    fn missing_ledger_is_fatal() {
        let (_tmp, site) = setup_site();
        fs::remove_file(site.ledger_path()).unwrap();
        assert!(matches!(
            generate(&site, &options()),
            Err(GenerateError::Ledger(LedgerError::Missing(_)))
        ));
    }

    #[test]
    fn missing_ledger_is_seeded_from_template() {
        let (_tmp, site) = setup_site();
        let ledger = site.ledger_path();
        let template = ledger::template_path(&ledger).unwrap();
        fs::rename(&ledger, &template).unwrap();

        let report = generate(&site, &options()).unwrap();
        assert_eq!(report.seeded_ledger, Some(template));
        assert!(ledger.is_file());
        assert_eq!(report.generated(), 4);
    }

    #[test]
    fn regenerating_overwrites_identically() {
        let (_tmp, site) = setup_site();
        let path = site.output_dir().join("demo.html");

        generate(&site, &options()).unwrap();
        let first = fs::read(&path).unwrap();
        fs::write(&path, "stale").unwrap();
        generate(&site, &options()).unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn ledger_quotes_and_specials_are_escaped_in_output() {
        let (_tmp, site) = setup_site();
        generate(&site, &options()).unwrap();
        let html = fs::read_to_string(site.output_dir().join("tips-and-tricks.html")).unwrap();
        assert!(html.contains("<title>Tips, Tricks &amp; &lt;More&gt;</title>"));
    }

    #[test]
    fn invalid_slugs_are_reported_not_written() {
        let (_tmp, site) = setup_site();
        let mut ledger = fs::read_to_string(site.ledger_path()).unwrap();
        ledger.push_str("\n../escape,Escape Attempt\n");
        fs::write(site.ledger_path(), ledger).unwrap();

        let report = generate(&site, &options()).unwrap();
        assert!(report.outcomes.iter().any(|o| matches!(
            o,
            PageOutcome::InvalidSlug { slug, .. } if slug == "../escape"
        )));
    }
}
