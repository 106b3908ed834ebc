//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. The file lives at the
//! site root and is sparse: stock defaults are overridden by whatever keys the
//! user file sets. Every path in the config is relative to the site root.
//!
//! ## Config File Location
//!
//! ```text
//! site-root/
//! ├── site.toml                  # This file (optional)
//! ├── index.html                 # Hand-written pages, picked up by the sitemap
//! ├── blog/                      # Generated blog pages (paths.output_dir)
//! └── blog-scripts/              # paths.scripts_dir
//!     ├── keywords.csv           # paths.ledger
//!     ├── content/               # paths.content_dir
//!     └── generated-urls.txt     # paths.urls_log
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! site_url = "https://www.example.com"
//! site_name = "Example"
//! blog_path = "blog"               # URL segment for blog pages
//! default_author = "Editorial Team"
//! default_category = "Insights"
//!
//! [paths]
//! ledger = "blog-scripts/keywords.csv"
//!
//! [[sitemap.rules]]
//! pattern = "^blog/"
//! priority = 0.8
//! changefreq = "monthly"
//!
//! [indexnow]
//! batch_size = 10000
//! ```
//!
//! Run `blogsmith gen-config` for the full documented file. Unknown keys are
//! rejected to catch typos early.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the site root when `--config` is not given.
pub const CONFIG_FILENAME: &str = "site.toml";

/// Upper bound on URLs per IndexNow request, set by the protocol.
pub const INDEXNOW_MAX_BATCH: usize = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid sitemap rule pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute base URL, no trailing slash.
    pub site_url: String,
    /// Brand name used in the page shell and structured data.
    pub site_name: String,
    /// URL segment under which blog pages are published.
    pub blog_path: String,
    /// Author used when a ledger row leaves `author` empty.
    pub default_author: String,
    /// Category used when a ledger row leaves `category` empty.
    pub default_category: String,
    pub paths: PathsConfig,
    pub page: PageConfig,
    pub sitemap: SitemapConfig,
    pub robots: RobotsConfig,
    pub indexnow: IndexNowConfig,
    pub drafting: DraftingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: "https://www.example.com".to_string(),
            site_name: "Example".to_string(),
            blog_path: "blog".to_string(),
            default_author: "Editorial Team".to_string(),
            default_category: "Insights".to_string(),
            paths: PathsConfig::default(),
            page: PageConfig::default(),
            sitemap: SitemapConfig::default(),
            robots: RobotsConfig::default(),
            indexnow: IndexNowConfig::default(),
            drafting: DraftingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.site_url.starts_with("http://") && !self.site_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "site_url must be an absolute http(s) URL".into(),
            ));
        }
        if self.site_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "site_url must not end with a slash".into(),
            ));
        }
        if self.blog_path.is_empty() || self.blog_path.contains('/') {
            return Err(ConfigError::Validation(
                "blog_path must be a single non-empty URL segment".into(),
            ));
        }
        // Pages are served from the directory they are written to.
        if self.paths.output_dir.trim_end_matches('/') != self.blog_path {
            return Err(ConfigError::Validation(format!(
                "paths.output_dir '{}' must match blog_path '{}'; set both to the same name",
                self.paths.output_dir, self.blog_path
            )));
        }
        if self.paths.scripts_dir.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "paths.scripts_dir must not be empty".into(),
            ));
        }
        for rule in &self.sitemap.rules {
            if !is_sitemap_priority(rule.priority) {
                return Err(ConfigError::Validation(format!(
                    "sitemap rule '{}' priority must be 0.0-1.0 with one decimal place",
                    rule.pattern
                )));
            }
            Regex::new(&rule.pattern)?;
        }
        if !is_sitemap_priority(self.sitemap.default_priority) {
            return Err(ConfigError::Validation(
                "sitemap.default_priority must be 0.0-1.0 with one decimal place".into(),
            ));
        }
        if self.indexnow.batch_size == 0 || self.indexnow.batch_size > INDEXNOW_MAX_BATCH {
            return Err(ConfigError::Validation(format!(
                "indexnow.batch_size must be 1-{INDEXNOW_MAX_BATCH}"
            )));
        }
        if self.indexnow.key_length == 0 {
            return Err(ConfigError::Validation(
                "indexnow.key_length must be non-zero".into(),
            ));
        }
        if self.drafting.max_retries == 0 {
            return Err(ConfigError::Validation(
                "drafting.max_retries must be at least 1".into(),
            ));
        }
        if !self.drafting.models.contains_key(&self.drafting.default_model) {
            return Err(ConfigError::Validation(format!(
                "drafting.default_model '{}' is not listed in [drafting.models]",
                self.drafting.default_model
            )));
        }
        Ok(())
    }

    /// Host name portion of `site_url`, as IndexNow expects it.
    pub fn host(&self) -> String {
        reqwest::Url::parse(&self.site_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| {
                self.site_url
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .to_string()
            })
    }
}

/// Sitemap priorities are written with one decimal, so finer values would be
/// silently rounded.
fn is_sitemap_priority(priority: f32) -> bool {
    let tenths = priority * 10.0;
    (0.0..=1.0).contains(&priority) && (tenths - tenths.round()).abs() < 1e-4
}

/// Filesystem layout, relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding the pipeline's own inputs. Never listed in the
    /// sitemap and always disallowed in `robots.txt`.
    pub scripts_dir: String,
    /// Keyword ledger CSV.
    pub ledger: String,
    /// Per-slug content fragments (`<slug>.json|.html|.md`).
    pub content_dir: String,
    /// Where generated pages are written. Must equal `blog_path`.
    pub output_dir: String,
    /// Published-URL log written by `generate`, read by `indexnow`.
    pub urls_log: String,
    /// Persisted IndexNow key.
    pub key_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            scripts_dir: "blog-scripts".to_string(),
            ledger: "blog-scripts/keywords.csv".to_string(),
            content_dir: "blog-scripts/content".to_string(),
            output_dir: "blog".to_string(),
            urls_log: "blog-scripts/generated-urls.txt".to_string(),
            key_file: "indexnow-key.txt".to_string(),
        }
    }
}

/// A navigation link in the page shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Static copy of the blog page shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Small caps line under the logo.
    pub tagline: String,
    pub nav: Vec<NavLink>,
    pub cta_heading: String,
    pub cta_text: String,
    pub cta_label: String,
    pub cta_href: String,
    /// Extra stylesheet linked after the embedded styles (empty = none).
    pub stylesheet: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            tagline: "Field Notes".to_string(),
            nav: vec![
                NavLink {
                    label: "Home".to_string(),
                    href: "../index.html".to_string(),
                },
                NavLink {
                    label: "Blog".to_string(),
                    href: "../blog.html".to_string(),
                },
            ],
            cta_heading: "Want to see it in action?".to_string(),
            cta_text: "Talk to our team and get a walkthrough tailored to your operation."
                .to_string(),
            cta_label: "Schedule a Demo".to_string(),
            cta_href: "../index.html#get-started".to_string(),
            stylesheet: "../css/global.css".to_string(),
        }
    }
}

/// Sitemap change frequency, as defined by the sitemaps.org protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        };
        f.write_str(s)
    }
}

/// One `pattern → (priority, changefreq)` rule. Patterns are regexes matched
/// against the page path relative to the site root, with `/` separators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SitemapRule {
    pub pattern: String,
    pub priority: f32,
    pub changefreq: ChangeFreq,
}

impl SitemapRule {
    fn new(pattern: &str, priority: f32, changefreq: ChangeFreq) -> Self {
        Self {
            pattern: pattern.to_string(),
            priority,
            changefreq,
        }
    }
}

/// Sitemap discovery and classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    /// Directory names never descended into. Dot-directories and
    /// `paths.scripts_dir` are always skipped.
    pub exclude_dirs: Vec<String>,
    /// Ordered rules; the first matching pattern wins.
    pub rules: Vec<SitemapRule>,
    pub default_priority: f32,
    pub default_changefreq: ChangeFreq,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        use ChangeFreq::*;
        Self {
            exclude_dirs: vec!["node_modules".to_string()],
            rules: vec![
                SitemapRule::new(r"^index\.html$", 1.0, Weekly),
                SitemapRule::new(r"^blog\.html$", 0.9, Daily),
                SitemapRule::new(r"^blog/", 0.8, Monthly),
                SitemapRule::new(r"^platform/", 0.7, Monthly),
                SitemapRule::new(r"^applications/", 0.7, Monthly),
                SitemapRule::new(r"^pricing/", 0.7, Weekly),
                SitemapRule::new(r"^know-us/", 0.5, Monthly),
                SitemapRule::new(r"\.html$", 0.6, Monthly),
            ],
            default_priority: 0.5,
            default_changefreq: Monthly,
        }
    }
}

/// `robots.txt` policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobotsConfig {
    /// Extra `Disallow:` paths, written after `/<paths.scripts_dir>/`.
    pub disallow: Vec<String>,
    pub crawl_delay: u32,
    /// Crawlers that get an explicit `Allow: /` block.
    pub allow_agents: Vec<String>,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            disallow: vec!["/*.json$".to_string()],
            crawl_delay: 1,
            allow_agents: vec![
                "GPTBot".to_string(),
                "Google-Extended".to_string(),
                "CCBot".to_string(),
            ],
        }
    }
}

/// IndexNow submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexNowConfig {
    pub endpoint: String,
    pub batch_size: usize,
    pub key_length: usize,
    pub timeout_secs: u64,
}

impl Default for IndexNowConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.indexnow.org/indexnow".to_string(),
            batch_size: INDEXNOW_MAX_BATCH,
            key_length: 32,
            timeout_secs: 30,
        }
    }
}

/// Content drafting through the Anthropic Messages API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DraftingConfig {
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub endpoint: String,
    /// Short name → model id.
    pub models: BTreeMap<String, String>,
    pub default_model: String,
    pub max_tokens: u32,
    pub max_retries: u32,
    /// Pause between requests; retry `n` waits `n` times this long.
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for DraftingConfig {
    fn default() -> Self {
        let models = [
            ("haiku", "claude-3-5-haiku-20241022"),
            ("sonnet", "claude-sonnet-4-20250514"),
            ("opus", "claude-opus-4-20250514"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            models,
            default_model: "haiku".to_string(),
            max_tokens: 4096,
            max_retries: 3,
            request_delay_ms: 1000,
            timeout_secs: 120,
        }
    }
}

impl DraftingConfig {
    /// Resolve a short model name, falling back to the default model.
    pub fn model_id(&self, name: Option<&str>) -> (String, String) {
        let requested = name.unwrap_or(&self.default_model);
        match self.models.get(requested) {
            Some(id) => (requested.to_string(), id.clone()),
            None => {
                let id = self
                    .models
                    .get(&self.default_model)
                    .cloned()
                    .unwrap_or_default();
                (self.default_model.clone(), id)
            }
        }
    }
}

// =============================================================================
// Site: config plus the root it is resolved against
// =============================================================================

/// A loaded site: the root directory plus its configuration.
///
/// Every stage takes a `&Site`; there is no ambient configuration.
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl Site {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Load `site.toml` (or `config_path` when given) and validate it.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) => load_config_file(path)?,
            None => load_config(root)?,
        };
        Ok(Self::new(root, config))
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.scripts_dir)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.ledger)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.content_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.output_dir)
    }

    pub fn urls_log(&self) -> PathBuf {
        self.root.join(&self.config.paths.urls_log)
    }

    pub fn key_file(&self) -> PathBuf {
        self.root.join(&self.config.paths.key_file)
    }

    /// Canonical URL of a blog page.
    pub fn blog_url(&self, slug: &str) -> String {
        format!("{}/{}/{}", self.config.site_url, self.config.blog_path, slug)
    }

    /// Absolute URL for a site-relative path (`/blog/x` or `blog/x`).
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.config.site_url, path)
        } else {
            format!("{}/{}", self.config.site_url, path)
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `site.toml` from the site root, falling back to stock defaults when absent.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILENAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Load an explicitly named config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# blogsmith site configuration
# ============================
# All settings are optional; values shown are the defaults.
# Paths are relative to the site root (the directory holding this file).
# Unknown keys are rejected.

# Absolute base URL of the published site, without trailing slash.
site_url = "https://www.example.com"

# Brand name used in the page shell and the Article structured data.
site_name = "Example"

# URL segment under which blog pages live: <site_url>/<blog_path>/<slug>
# Must match paths.output_dir.
blog_path = "blog"

# Used when a ledger row leaves author / category empty.
default_author = "Editorial Team"
default_category = "Insights"

# ---------------------------------------------------------------------------
# Filesystem layout
# ---------------------------------------------------------------------------
[paths]
# Pipeline inputs. Never listed in the sitemap; always disallowed in robots.txt.
scripts_dir = "blog-scripts"
ledger = "blog-scripts/keywords.csv"
content_dir = "blog-scripts/content"
output_dir = "blog"
urls_log = "blog-scripts/generated-urls.txt"
key_file = "indexnow-key.txt"

# ---------------------------------------------------------------------------
# Page shell
# ---------------------------------------------------------------------------
[page]
tagline = "Field Notes"
cta_heading = "Want to see it in action?"
cta_text = "Talk to our team and get a walkthrough tailored to your operation."
cta_label = "Schedule a Demo"
cta_href = "../index.html#get-started"
# Linked after the embedded styles. Set to "" to omit.
stylesheet = "../css/global.css"

[[page.nav]]
label = "Home"
href = "../index.html"

[[page.nav]]
label = "Blog"
href = "../blog.html"

# ---------------------------------------------------------------------------
# Sitemap
# ---------------------------------------------------------------------------
[sitemap]
# Never descended into. Dot-directories and paths.scripts_dir are always skipped.
exclude_dirs = ["node_modules"]
# Applied when no rule matches. Priorities take one decimal place.
default_priority = 0.5
default_changefreq = "monthly"

# Rules are regexes over the page path relative to the site root.
# The first matching rule wins, so order matters.
[[sitemap.rules]]
pattern = '^index\.html$'
priority = 1.0
changefreq = "weekly"

[[sitemap.rules]]
pattern = '^blog\.html$'
priority = 0.9
changefreq = "daily"

[[sitemap.rules]]
pattern = '^blog/'
priority = 0.8
changefreq = "monthly"

[[sitemap.rules]]
pattern = '^platform/'
priority = 0.7
changefreq = "monthly"

[[sitemap.rules]]
pattern = '^applications/'
priority = 0.7
changefreq = "monthly"

[[sitemap.rules]]
pattern = '^pricing/'
priority = 0.7
changefreq = "weekly"

[[sitemap.rules]]
pattern = '^know-us/'
priority = 0.5
changefreq = "monthly"

[[sitemap.rules]]
pattern = '\.html$'
priority = 0.6
changefreq = "monthly"

# ---------------------------------------------------------------------------
# robots.txt
# ---------------------------------------------------------------------------
[robots]
# Written after "Disallow: /<paths.scripts_dir>/".
disallow = ["/*.json$"]
crawl_delay = 1
# Crawlers that get an explicit "Allow: /" block.
allow_agents = ["GPTBot", "Google-Extended", "CCBot"]

# ---------------------------------------------------------------------------
# IndexNow
# ---------------------------------------------------------------------------
[indexnow]
endpoint = "https://api.indexnow.org/indexnow"
# URLs per request (protocol maximum is 10000).
batch_size = 10000
key_length = 32
timeout_secs = 30

# ---------------------------------------------------------------------------
# Content drafting (Anthropic Messages API)
# ---------------------------------------------------------------------------
[drafting]
api_key_env = "ANTHROPIC_API_KEY"
endpoint = "https://api.anthropic.com/v1/messages"
default_model = "haiku"
max_tokens = 4096
max_retries = 3
request_delay_ms = 1000
timeout_secs = 120

[drafting.models]
haiku = "claude-3-5-haiku-20241022"
sonnet = "claude-sonnet-4-20250514"
opus = "claude-opus-4-20250514"
"##
}
