//! Keyword ledger reader.
//!
//! The ledger is a comma-delimited file with a header row. Each later row
//! describes one blog post:
//!
//! ```text
//! slug,title,meta_description,primary_keyword,secondary_keywords,category,search_intent,target_word_count,author
//! demo,Demo Post,"A short, quoted description",demo keyword,"a, b, c",Guides,informational,1500,
//! ```
//!
//! The scanner is deliberately simple: a `"` toggles an "inside quotes" flag
//! and is dropped, commas split only outside quotes. Escaped interior quotes
//! (`""`) are not supported. Rows are never rejected: missing trailing values
//! become empty strings and surplus values are ignored.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("keyword ledger not found: {0}")]
    Missing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One ledger line as an ordered header → value mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    fields: Vec<(String, String)>,
}

impl LedgerRow {
    /// Value of a column, or `""` when the column does not exist.
    pub fn get(&self, column: &str) -> &str {
        self.fields
            .iter()
            .find(|(header, _)| header == column)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Columns in header order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

/// Typed view of a ledger row. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRecord {
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    pub primary_keyword: String,
    pub secondary_keywords: String,
    pub category: String,
    pub search_intent: String,
    /// Kept as text; parsed on use by [`LedgerRecord::target_words`].
    pub target_word_count: String,
    pub author: String,
}

impl LedgerRecord {
    pub fn from_row(row: &LedgerRow) -> Self {
        Self {
            slug: row.get("slug").to_string(),
            title: row.get("title").to_string(),
            meta_description: row.get("meta_description").to_string(),
            primary_keyword: row.get("primary_keyword").to_string(),
            secondary_keywords: row.get("secondary_keywords").to_string(),
            category: row.get("category").to_string(),
            search_intent: row.get("search_intent").to_string(),
            target_word_count: row.get("target_word_count").to_string(),
            author: row.get("author").to_string(),
        }
    }

    /// Whether the slug can be used as a file name and URL segment.
    pub fn has_safe_slug(&self) -> bool {
        is_safe_slug(&self.slug)
    }

    /// The target word count, if it parses as a positive integer.
    pub fn target_words(&self) -> Option<usize> {
        self.target_word_count
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
    }
}

/// Slugs become file names and URL segments: ASCII alphanumerics, `-` and
/// `_` only.
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Split one line into fields using the quote-toggling scanner.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
        .into_iter()
        .map(|f| {
            let f = f.strip_prefix('"').unwrap_or(&f);
            let f = f.strip_suffix('"').unwrap_or(f);
            f.to_string()
        })
        .collect()
}

/// Parse ledger text into rows, preserving input order.
///
/// The first non-empty line is the header. Blank lines are skipped.
pub fn parse_ledger(text: &str) -> Vec<LedgerRow> {
    let mut lines = text.trim().lines().filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = split_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    lines
        .map(|line| {
            let mut values = split_line(line).into_iter();
            let fields = headers
                .iter()
                .map(|h| {
                    let value = values.next().map(|v| v.trim().to_string());
                    (h.clone(), value.unwrap_or_default())
                })
                .collect();
            LedgerRow { fields }
        })
        .collect()
}

/// Read and parse the ledger file into typed records.
pub fn read_ledger(path: &Path) -> Result<Vec<LedgerRecord>, LedgerError> {
    if !path.exists() {
        return Err(LedgerError::Missing(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    Ok(parse_ledger(&text).iter().map(LedgerRecord::from_row).collect())
}

/// Sibling template used to seed a missing ledger: `keywords.csv` → `keywords-template.csv`.
pub fn template_path(ledger: &Path) -> Option<PathBuf> {
    let stem = ledger.file_stem()?.to_string_lossy();
    Some(ledger.with_file_name(format!("{stem}-template.csv")))
}
