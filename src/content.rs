//! Content resolution: per-slug fragments to body markup.
//!
//! Each ledger slug is backed by one content file in the content directory.
//! Three formats are accepted and tried in a fixed order; the first file that
//! exists wins:
//!
//! 1. `<slug>.json`: a [`StructuredDocument`], flattened to markup
//! 2. `<slug>.html`: raw markup, used verbatim
//! 3. `<slug>.md`: lightweight markup, converted by [`markdown_to_html`]
//!
//! No file at all is not an error: [`resolve`] returns `Ok(None)` and the
//! caller skips the slug.
//!
//! ## Trusted input
//!
//! Content files are hand-authored (or drafted and reviewed) and are treated
//! as trusted markup. Nothing in this module escapes text: `<strong>` inside a
//! JSON introduction is meant to render. Do not feed arbitrary user input
//! through here.

use crate::types::{ContentFormat, ContentFragment};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid structured document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A structured blog document, as stored in `<slug>.json`.
///
/// Field names follow the camelCase JSON the drafting prompt asks for.
/// Unknown fields are ignored so drafted documents with extras still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructuredDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faqs: Vec<Faq>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_takeaways: Vec<ListItem>,
    /// Pre-rendered body. When present it replaces the flattened sections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub heading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<Subsection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<ListItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subsection {
    pub heading: String,
    pub content: String,
}

/// A `title: description` pair, used by section lists and key takeaways.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListItem {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

const P: &str = "            ";
const LI: &str = "                ";

impl StructuredDocument {
    /// Body markup for the page: `htmlContent` verbatim, or the flattened sections.
    pub fn body_html(&self) -> String {
        match &self.html_content {
            Some(html) if !html.trim().is_empty() => html.clone(),
            _ => self.flatten(),
        }
    }

    /// Flatten in the fixed order: introduction, sections, FAQs, key takeaways.
    pub fn flatten(&self) -> String {
        let mut html = String::new();

        if let Some(intro) = self.introduction.as_deref().filter(|s| !s.is_empty()) {
            let _ = write!(html, "{P}<p>{intro}</p>\n\n");
        }

        for section in &self.sections {
            let _ = write!(
                html,
                "{P}<h2 id=\"{}\">{}</h2>\n\n",
                slugify(&section.heading),
                section.heading
            );
            if let Some(content) = section.content.as_deref().filter(|s| !s.is_empty()) {
                let _ = write!(html, "{P}<p>{content}</p>\n\n");
            }
            for sub in &section.subsections {
                let _ = writeln!(html, "{P}<h3>{}</h3>", sub.heading);
                let _ = write!(html, "{P}<p>{}</p>\n\n", sub.content);
            }
            if !section.list.is_empty() {
                let _ = writeln!(html, "{P}<ul>");
                for item in &section.list {
                    let _ = writeln!(
                        html,
                        "{LI}<li><strong>{}</strong>: {}</li>",
                        item.title, item.description
                    );
                }
                let _ = write!(html, "{P}</ul>\n\n");
            }
        }

        if !self.faqs.is_empty() {
            let _ = write!(
                html,
                "{P}<h2 id=\"faqs\">Frequently Asked Questions</h2>\n\n"
            );
            for faq in &self.faqs {
                let _ = writeln!(html, "{P}<div class=\"faq-item\">");
                let _ = writeln!(html, "{LI}<h3>{}</h3>", faq.question);
                let _ = writeln!(html, "{LI}<p>{}</p>", faq.answer);
                let _ = write!(html, "{P}</div>\n\n");
            }
        }

        if !self.key_takeaways.is_empty() {
            let _ = writeln!(html, "{P}<div class=\"key-takeaways\">");
            let _ = writeln!(html, "{LI}<h2>Key Takeaways</h2>");
            let _ = writeln!(html, "{LI}<ul>");
            for item in &self.key_takeaways {
                let _ = writeln!(
                    html,
                    "{LI}    <li><strong>{}</strong>: {}</li>",
                    item.title, item.description
                );
            }
            let _ = writeln!(html, "{LI}</ul>");
            let _ = write!(html, "{P}</div>\n\n");
        }

        html
    }
}

// ============================================================================
// Lightweight markup
// ============================================================================

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));

/// One classified source line.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Heading(u8, &'a str),
    Item(&'a str),
    Raw(&'a str),
    Paragraph(&'a str),
    Blank,
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }
    let heading = [("### ", 3), ("## ", 2), ("# ", 2)]
        .into_iter()
        .find_map(|(prefix, level)| {
            line.strip_prefix(prefix)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| Line::Heading(level, t))
        });
    if let Some(h) = heading {
        return h;
    }
    if let Some(item) = line.strip_prefix("- ").filter(|t| !t.trim().is_empty()) {
        return Line::Item(item.trim());
    }
    if line.starts_with('<') {
        return Line::Raw(line);
    }
    Line::Paragraph(line.trim())
}

fn bold(text: &str) -> std::borrow::Cow<'_, str> {
    BOLD.replace_all(text, "<strong>$1</strong>")
}

/// Convert lightweight markup to body markup.
///
/// Line-oriented and minimal: `#`/`##` → `<h2>`, `###` → `<h3>`, `- ` →
/// `<li>`, `**x**` → `<strong>`, lines starting with `<` pass through, any
/// other non-blank line becomes a `<p>`. A second pass wraps each run of
/// consecutive list items in one `<ul>`. No nested lists, links or code.
pub fn markdown_to_html(md: &str) -> String {
    let lines: Vec<Line> = md.lines().map(classify).collect();

    let mut html = String::new();
    let mut in_list = false;
    for line in &lines {
        let is_item = matches!(line, Line::Item(_));
        if is_item && !in_list {
            let _ = writeln!(html, "{P}<ul>");
            in_list = true;
        } else if !is_item && in_list {
            let _ = writeln!(html, "{P}</ul>");
            in_list = false;
        }
        match line {
            Line::Heading(level, text) => {
                let _ = writeln!(html, "{P}<h{level}>{}</h{level}>", bold(text));
            }
            Line::Item(text) => {
                let _ = writeln!(html, "{LI}<li>{}</li>", bold(text));
            }
            Line::Raw(text) => {
                let _ = writeln!(html, "{}", bold(text));
            }
            Line::Paragraph(text) => {
                let _ = writeln!(html, "{P}<p>{}</p>", bold(text));
            }
            Line::Blank => html.push('\n'),
        }
    }
    if in_list {
        let _ = writeln!(html, "{P}</ul>");
    }
    html
}

// ============================================================================
// Text utilities
// ============================================================================

/// Strip HTML tags (simple angle-bracket stripping).
///
/// A `<` only opens a tag when followed by a letter, `/` or `!`, so prose
/// like `a < b` keeps its words.
pub fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut chars = html.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' if !in_tag && chars.peek().is_some_and(|&n| opens_tag(n)) => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

fn opens_tag(next: char) -> bool {
    next.is_ascii_alphabetic() || next == '/' || next == '!'
}

/// Count whitespace-separated words after stripping markup.
pub fn count_words(text: &str) -> usize {
    strip_tags(text).split_whitespace().count()
}

/// Heading anchor: lowercase, runs of anything outside `[a-z0-9]` become one
/// dash, leading and trailing dashes removed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

// ============================================================================
// Resolution
// ============================================================================

/// Path of the content file for `slug` in a given format.
pub fn content_path(content_dir: &Path, slug: &str, format: ContentFormat) -> PathBuf {
    content_dir.join(format!("{slug}.{}", format.extension()))
}

/// All candidate paths for `slug`, in resolution order.
pub fn candidate_paths(content_dir: &Path, slug: &str) -> Vec<PathBuf> {
    ContentFormat::PRECEDENCE
        .into_iter()
        .map(|f| content_path(content_dir, slug, f))
        .collect()
}

/// Whether any content file exists for `slug`.
pub fn content_exists(content_dir: &Path, slug: &str) -> bool {
    candidate_paths(content_dir, slug).iter().any(|p| p.is_file())
}

/// Resolve the content fragment for `slug`, or `None` when no file exists.
pub fn resolve(content_dir: &Path, slug: &str) -> Result<Option<ContentFragment>, ContentError> {
    for format in ContentFormat::PRECEDENCE {
        let path = content_path(content_dir, slug, format);
        if !path.is_file() {
            continue;
        }
        debug!(slug, path = %path.display(), %format, "resolved content");

        let text = fs::read_to_string(&path)?;
        let html = match format {
            ContentFormat::Structured => {
                let doc: StructuredDocument =
                    serde_json::from_str(&text).map_err(|source| ContentError::Json {
                        path: path.clone(),
                        source,
                    })?;
                doc.body_html()
            }
            ContentFormat::RawMarkup => text,
            ContentFormat::Markdown => markdown_to_html(&text),
        };
        let word_count = count_words(&html);

        return Ok(Some(ContentFragment {
            html,
            word_count,
            format,
            source_path: path,
        }));
    }
    Ok(None)
}
