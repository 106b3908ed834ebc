//! Shared types passed between pipeline stages.

use std::fmt;
use std::path::PathBuf;

/// Which of the accepted content formats a fragment was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// `<slug>.json`, a structured section document
    Structured,
    /// `<slug>.html`, used verbatim
    RawMarkup,
    /// `<slug>.md`, converted line by line
    Markdown,
}

impl ContentFormat {
    /// Resolution order: the first format whose file exists wins.
    pub const PRECEDENCE: [ContentFormat; 3] = [
        ContentFormat::Structured,
        ContentFormat::RawMarkup,
        ContentFormat::Markdown,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ContentFormat::Structured => "json",
            ContentFormat::RawMarkup => "html",
            ContentFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentFormat::Structured => "structured",
            ContentFormat::RawMarkup => "html",
            ContentFormat::Markdown => "markdown",
        };
        f.write_str(s)
    }
}

/// Resolved body content for one slug.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentFragment {
    /// Body markup, inserted into the page without escaping.
    pub html: String,
    /// Whitespace-separated tokens after stripping tags.
    pub word_count: usize,
    pub format: ContentFormat,
    pub source_path: PathBuf,
}
