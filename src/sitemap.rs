//! Sitemap and robots.txt generation.
//!
//! Walks the site root for `.html` pages, classifies each one by path, and
//! writes `sitemap.xml` plus `robots.txt` next to them.
//!
//! ## Discovery
//!
//! Dot-directories, `paths.scripts_dir` and the configured
//! `sitemap.exclude_dirs` (by default `node_modules`) are never entered.
//! Paths are kept relative to the site root with `/` separators, e.g.
//! `blog/demo.html`.
//!
//! ## Classification
//!
//! `sitemap.rules` is an ordered list of regex → (priority, changefreq). The
//! first matching rule wins, so `blog/demo.html` takes the `^blog/` rule (0.8)
//! even though the generic `\.html$` rule (0.6) also matches. Paths matching
//! nothing get `default_priority` / `default_changefreq`.
//!
//! ## Ordering and URLs
//!
//! `index.html` always comes first and maps to `<site_url>/`; everything else
//! is sorted by path and loses its `.html` extension: `blog/demo.html` →
//! `<site_url>/blog/demo`.

use crate::config::{ChangeFreq, Site, SitemapConfig};
use crate::generate::escape_html;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to walk site directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid sitemap rule pattern: {0}")]
    Pattern(#[from] regex::Error),
}

const HOME_PAGE: &str = "index.html";

/// Priority and change frequency assigned to a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub priority: f32,
    pub changefreq: ChangeFreq,
}

/// Compiled `sitemap.rules`.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<(Regex, Classification)>,
    fallback: Classification,
}

impl RuleSet {
    pub fn compile(config: &SitemapConfig) -> Result<Self, SitemapError> {
        let rules = config
            .rules
            .iter()
            .map(|rule| {
                Ok((
                    Regex::new(&rule.pattern)?,
                    Classification {
                        priority: rule.priority,
                        changefreq: rule.changefreq,
                    },
                ))
            })
            .collect::<Result<Vec<_>, SitemapError>>()?;
        Ok(Self {
            rules,
            fallback: Classification {
                priority: config.default_priority,
                changefreq: config.default_changefreq,
            },
        })
    }

    /// First matching rule, or the fallback.
    pub fn classify(&self, path: &str) -> Classification {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(path))
            .map(|(_, class)| *class)
            .unwrap_or(self.fallback)
    }
}

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Page path relative to the site root.
    pub path: String,
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// A page found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredPage {
    pub path: String,
    /// Modification date (UTC), when the filesystem reports one.
    pub modified: Option<NaiveDate>,
}

fn is_excluded(entry: &DirEntry, scripts_dir: &Path, exclude_dirs: &[String]) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || entry.path() == scripts_dir
        || exclude_dirs.iter().any(|d| *d == name)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn modified_date(entry: &DirEntry) -> Option<NaiveDate> {
    let modified = entry.metadata().ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified).date_naive())
}

/// Find every `.html` file under the site root, unsorted.
pub fn discover_pages(site: &Site) -> Result<Vec<DiscoveredPage>, SitemapError> {
    let scripts_dir = site.scripts_dir();
    let exclude_dirs = &site.config.sitemap.exclude_dirs;
    let mut pages = Vec::new();
    for entry in WalkDir::new(&site.root)
        .into_iter()
        .filter_entry(|e| !is_excluded(e, &scripts_dir, exclude_dirs))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_html = entry
            .path()
            .extension()
            .map(|e| e == "html")
            .unwrap_or(false);
        if is_html {
            pages.push(DiscoveredPage {
                path: relative_path(&site.root, entry.path()),
                modified: modified_date(&entry),
            });
        }
    }
    Ok(pages)
}

/// Home page first, then by path.
pub fn sort_pages(pages: &mut [DiscoveredPage]) {
    pages.sort_by(|a, b| {
        (a.path != HOME_PAGE)
            .cmp(&(b.path != HOME_PAGE))
            .then_with(|| a.path.cmp(&b.path))
    });
}

/// Public URL of a page path.
pub fn page_loc(site: &Site, path: &str) -> String {
    if path == HOME_PAGE {
        return format!("{}/", site.config.site_url);
    }
    let clean = path.strip_suffix(".html").unwrap_or(path);
    format!("{}/{}", site.config.site_url, clean)
}

/// Whether a path belongs to the blog: inside the output dir, or its index page.
pub fn is_blog_path(site: &Site, path: &str) -> bool {
    let blog_dir = site.config.paths.output_dir.trim_end_matches('/');
    path.starts_with(&format!("{blog_dir}/")) || path == format!("{blog_dir}.html")
}

#[derive(Debug, Clone)]
pub struct SitemapOptions {
    /// Only list blog pages.
    pub blogs_only: bool,
    /// Fallback `lastmod` and the robots.txt stamp.
    pub today: NaiveDate,
}

/// Discover, filter, sort and classify the site's pages.
pub fn build_entries(
    site: &Site,
    options: &SitemapOptions,
) -> Result<Vec<SitemapEntry>, SitemapError> {
    let rules = RuleSet::compile(&site.config.sitemap)?;
    let mut pages = discover_pages(site)?;
    if options.blogs_only {
        pages.retain(|p| is_blog_path(site, &p.path));
    }
    sort_pages(&mut pages);

    Ok(pages
        .into_iter()
        .map(|page| {
            let class = rules.classify(&page.path);
            SitemapEntry {
                loc: page_loc(site, &page.path),
                lastmod: page.modified.unwrap_or(options.today),
                changefreq: class.changefreq,
                priority: class.priority,
                path: page.path,
            }
        })
        .collect())
}

/// Render the sitemaps.org XML document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for entry in entries {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape_html(&entry.loc));
        let _ = writeln!(xml, "    <lastmod>{}</lastmod>", entry.lastmod.format("%Y-%m-%d"));
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq);
        let _ = writeln!(xml, "    <priority>{:.1}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Render the crawler policy.
pub fn robots_txt(site: &Site, today: NaiveDate) -> String {
    let config = &site.config;
    let robots = &config.robots;
    let mut out = String::new();
    let _ = writeln!(out, "# Robots.txt for {}", config.host());
    let _ = writeln!(out, "# Generated: {}", today.format("%Y-%m-%d"));
    out.push('\n');
    out.push_str("User-agent: *\nAllow: /\n\n");
    let _ = writeln!(out, "# Sitemap location\nSitemap: {}/sitemap.xml\n", config.site_url);
    out.push_str("# Disallow scripts and non-public directories\n");
    let scripts = format!("/{}/", config.paths.scripts_dir.trim_matches('/'));
    let _ = writeln!(out, "Disallow: {scripts}");
    for rule in robots.disallow.iter().filter(|r| **r != scripts) {
        let _ = writeln!(out, "Disallow: {rule}");
    }
    out.push('\n');
    let _ = writeln!(out, "# Crawl-delay\nCrawl-delay: {}", robots.crawl_delay);
    if !robots.allow_agents.is_empty() {
        out.push_str("\n# Specific bot rules\n");
        let blocks: Vec<String> = robots
            .allow_agents
            .iter()
            .map(|agent| format!("User-agent: {agent}\nAllow: /\n"))
            .collect();
        out.push_str(&blocks.join("\n"));
    }
    out
}

#[derive(Debug)]
pub struct SitemapReport {
    pub entries: Vec<SitemapEntry>,
    pub sitemap_path: PathBuf,
    pub robots_path: PathBuf,
}

/// Build and write `sitemap.xml` and `robots.txt` into the site root.
pub fn write_sitemap(site: &Site, options: &SitemapOptions) -> Result<SitemapReport, SitemapError> {
    let entries = build_entries(site, options)?;

    let sitemap_path = site.root.join("sitemap.xml");
    fs::write(&sitemap_path, render_sitemap(&entries))?;

    let robots_path = site.root.join("robots.txt");
    fs::write(&robots_path, robots_txt(site, options.today))?;

    Ok(SitemapReport {
        entries,
        sitemap_path,
        robots_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::test_helpers::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn options(blogs_only: bool) -> SitemapOptions {
        SitemapOptions {
            blogs_only,
            today: today(),
        }
    }

    fn rules() -> RuleSet {
        RuleSet::compile(&SiteConfig::default().sitemap).unwrap()
    }

    // =========================================================================
    // Classification
    // =========================================================================

    #[test]
    fn blog_rule_wins_over_generic_html_rule() {
        let class = rules().classify("blog/foo.html");
        assert_eq!(class.priority, 0.8);
        assert_eq!(class.changefreq, ChangeFreq::Monthly);
    }

    #[test]
    fn home_and_blog_index_rules() {
        let rules = rules();
        assert_eq!(rules.classify("index.html").priority, 1.0);
        assert_eq!(rules.classify("index.html").changefreq, ChangeFreq::Weekly);
        assert_eq!(rules.classify("blog.html").changefreq, ChangeFreq::Daily);
        assert_eq!(rules.classify("pricing/suite.html").changefreq, ChangeFreq::Weekly);
    }

    #[test]
    fn generic_html_rule_catches_other_pages() {
        assert_eq!(rules().classify("careers.html").priority, 0.6);
    }

    #[test]
    fn unmatched_path_gets_default() {
        let class = rules().classify("feed.htm");
        assert_eq!(class.priority, 0.5);
        assert_eq!(class.changefreq, ChangeFreq::Monthly);
    }

    #[test]
    fn invalid_pattern_fails_to_compile() {
        let mut config = SiteConfig::default().sitemap;
        config.rules[0].pattern = "[".to_string();
        assert!(matches!(RuleSet::compile(&config), Err(SitemapError::Pattern(_))));
    }

    // =========================================================================
    // Ordering and URLs
    // =========================================================================

    fn page(path: &str) -> DiscoveredPage {
        DiscoveredPage {
            path: path.to_string(),
            modified: None,
        }
    }

    #[test]
    fn home_page_sorts_first() {
        let mut pages = vec![page("about.html"), page("blog/a.html"), page("index.html")];
        sort_pages(&mut pages);
        let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["index.html", "about.html", "blog/a.html"]);
    }

    #[test]
    fn locs_drop_extension_and_map_home_to_root() {
        let site = test_site();
        assert_eq!(page_loc(&site, "index.html"), "https://www.example.com/");
        assert_eq!(page_loc(&site, "blog/demo.html"), "https://www.example.com/blog/demo");
    }

    #[test]
    fn blog_paths() {
        let site = test_site();
        assert!(is_blog_path(&site, "blog/demo.html"));
        assert!(is_blog_path(&site, "blog.html"));
        assert!(!is_blog_path(&site, "blogger.html"));
        assert!(!is_blog_path(&site, "platform/overview.html"));
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn discovery_skips_excluded_directories() {
        let (_tmp, site) = setup_site();
        let paths: Vec<String> = discover_pages(&site)
            .unwrap()
            .into_iter()
            .map(|p| p.path)
            .collect();

        assert!(paths.contains(&"index.html".to_string()));
        assert!(paths.contains(&"platform/overview.html".to_string()));
        assert!(paths.contains(&"blog/legacy-post.html".to_string()));
        assert!(!paths.iter().any(|p| p.starts_with("node_modules/")));
        assert!(!paths.iter().any(|p| p.starts_with("blog-scripts/")));
        assert!(!paths.iter().any(|p| p.starts_with(".drafts/")));
    }

    /// Move the fixture's scripts directory to `tools/` and point the config at it.
    fn site_with_tools_dir() -> (tempfile::TempDir, Site) {
        let (tmp, mut site) = setup_site();
        fs::rename(tmp.path().join("blog-scripts"), tmp.path().join("tools")).unwrap();
        let paths = &mut site.config.paths;
        paths.scripts_dir = "tools".to_string();
        paths.ledger = "tools/keywords.csv".to_string();
        paths.content_dir = "tools/content".to_string();
        paths.urls_log = "tools/generated-urls.txt".to_string();
        site.config.validate().unwrap();
        (tmp, site)
    }

    #[test]
    fn discovery_skips_renamed_scripts_dir() {
        let (_tmp, site) = site_with_tools_dir();
        let paths: Vec<String> = discover_pages(&site)
            .unwrap()
            .into_iter()
            .map(|p| p.path)
            .collect();

        assert!(paths.contains(&"index.html".to_string()));
        assert!(!paths.iter().any(|p| p.starts_with("tools/")), "{paths:?}");
    }

    #[test]
    fn robots_disallows_renamed_scripts_dir() {
        let (_tmp, site) = site_with_tools_dir();
        let robots = robots_txt(&site, today());
        assert!(robots.contains("Disallow: /tools/\nDisallow: /*.json$\n"));
        assert!(!robots.contains("blog-scripts"));
    }

    #[test]
    fn robots_lists_scripts_dir_once() {
        let mut site = test_site();
        site.config.robots.disallow = vec!["/blog-scripts/".to_string(), "/drafts/".to_string()];
        let robots = robots_txt(&site, today());
        assert_eq!(robots.matches("Disallow: /blog-scripts/").count(), 1);
        assert!(robots.contains("Disallow: /drafts/"));
    }

    #[test]
    fn discovery_reads_modification_dates() {
        let (_tmp, site) = setup_site();
        let pages = discover_pages(&site).unwrap();
        assert!(pages.iter().all(|p| p.modified.is_some()));
    }

    #[test]
    fn blogs_only_keeps_blog_pages() {
        let (_tmp, site) = setup_site();
        let entries = build_entries(&site, &options(true)).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["blog.html", "blog/legacy-post.html"]);
    }

    #[test]
    fn entries_start_with_home_page() {
        let (_tmp, site) = setup_site();
        let entries = build_entries(&site, &options(false)).unwrap();
        assert_eq!(entries[0].loc, "https://www.example.com/");
        assert_eq!(entries[0].priority, 1.0);
        let rest: Vec<&str> = entries[1..].iter().map(|e| e.path.as_str()).collect();
        let mut sorted = rest.clone();
        sorted.sort();
        assert_eq!(rest, sorted);
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn render_sitemap_entries() {
        let entries = vec![SitemapEntry {
            path: "blog/demo.html".to_string(),
            loc: "https://www.example.com/blog/demo".to_string(),
            lastmod: today(),
            changefreq: ChangeFreq::Monthly,
            priority: 0.8,
        }];
        let xml = render_sitemap(&entries);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<loc>https://www.example.com/blog/demo</loc>"));
        assert!(xml.contains("<lastmod>2026-01-15</lastmod>"));
        assert!(xml.contains("<changefreq>monthly</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn render_sitemap_escapes_locs() {
        let entries = vec![SitemapEntry {
            path: "a&b.html".to_string(),
            loc: "https://www.example.com/a&b".to_string(),
            lastmod: today(),
            changefreq: ChangeFreq::Monthly,
            priority: 0.6,
        }];
        assert!(render_sitemap(&entries).contains("<loc>https://www.example.com/a&amp;b</loc>"));
    }

    #[test]
    fn robots_policy() {
        let site = test_site();
        let robots = robots_txt(&site, today());
        assert!(robots.contains("# Generated: 2026-01-15"));
        assert!(robots.contains("User-agent: *\nAllow: /"));
        assert!(robots.contains("Sitemap: https://www.example.com/sitemap.xml"));
        assert!(robots.contains("Disallow: /blog-scripts/"));
        assert!(robots.contains("Disallow: /*.json$"));
        assert!(robots.contains("Crawl-delay: 1"));
        for agent in ["GPTBot", "Google-Extended", "CCBot"] {
            assert!(robots.contains(&format!("User-agent: {agent}\nAllow: /")));
        }
    }

    #[test]
    fn write_sitemap_creates_both_files() {
        let (_tmp, site) = setup_site();
        let report = write_sitemap(&site, &options(false)).unwrap();
        let xml = fs::read_to_string(&report.sitemap_path).unwrap();
        assert_eq!(xml.matches("<url>").count(), report.entries.len());
        assert!(report.robots_path.is_file());
    }
}
