//! Content drafting through the Anthropic Messages API.
//!
//! For every ledger row without a content file, build a prompt from the row,
//! ask the model for a [`StructuredDocument`] as JSON, check that the answer
//! parses, and save it as `<content_dir>/<slug>.json` for `generate` to pick
//! up. Requests go out one at a time with a pause between them.
//!
//! Each request is retried up to `drafting.max_retries` times in total; the
//! pause before retry `n` is `request_delay_ms * n`. A row that still fails
//! is recorded and the run continues with the next one.

use crate::config::{DraftingConfig, Site};
use crate::content::{self, StructuredDocument};
use crate::ledger::{self, LedgerError, LedgerRecord};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("{0} is not set; export it with your Anthropic API key")]
    ApiKeyMissing(String),
    #[error("invalid API key: {0}")]
    ApiKeyInvalid(#[from] reqwest::header::InvalidHeaderValue),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("slug \"{0}\" not found in the keyword ledger")]
    SlugNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("API response contained no text")]
    EmptyResponse,
    #[error("response is not a valid structured document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

/// Read the API key from the environment.
pub fn api_key_from_env(var: &str) -> Result<String, DraftError> {
    std::env::var(var)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| DraftError::ApiKeyMissing(var.to_string()))
}

/// Turns a prompt into model text.
pub trait Drafter {
    fn draft(&self, model: &str, prompt: &str) -> Result<String, DraftError>;
}

/// Blocking client for the Messages API.
pub struct AnthropicDrafter {
    api_key: String,
    endpoint: String,
    max_tokens: u32,
    client: reqwest::blocking::Client,
}

impl AnthropicDrafter {
    pub fn new(api_key: String, config: &DraftingConfig) -> Result<Self, DraftError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            api_key,
            endpoint: config.endpoint.clone(),
            max_tokens: config.max_tokens,
            client,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl Drafter for AnthropicDrafter {
    fn draft(&self, model: &str, prompt: &str) -> Result<String, DraftError> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(self.api_key.trim())?);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = MessagesRequest {
            model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(DraftError::Api { status, body });
        }

        let parsed: MessagesResponse = resp.json()?;
        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            return Err(DraftError::EmptyResponse);
        }
        Ok(text)
    }
}

// ============================================================================
// Prompt
// ============================================================================

const OUTPUT_SHAPE: &str = r#"{
    "introduction": "Opening paragraph with hook and primary keyword...",
    "sections": [
        {
            "heading": "What is {Primary Keyword}?",
            "content": "Definition paragraph...",
            "subsections": [
                {"heading": "Subsection Title", "content": "Content..."}
            ]
        },
        {
            "heading": "Benefits of {Primary Keyword}",
            "content": "Intro to benefits...",
            "list": [
                {"title": "Benefit Name", "description": "Explanation with specifics..."}
            ]
        }
    ],
    "faqs": [
        {"question": "Natural question about topic?", "answer": "Direct 2-3 sentence answer."}
    ],
    "keyTakeaways": [
        {"title": "Key Point", "description": "Brief actionable explanation"}
    ]
}"#;

/// Prompt for one ledger row.
pub fn build_prompt(record: &LedgerRecord, site_name: &str) -> String {
    format!(
        "You are an expert SEO content writer for {site_name}. \
Generate a comprehensive, SEO-optimized blog post.

## Input Details
- **Title**: {title}
- **Primary Keyword**: {primary}
- **Secondary Keywords**: {secondary}
- **Category**: {category}
- **Search Intent**: {intent}
- **Target Word Count**: {words} words

## Requirements
1. Use the primary keyword in the first 100 words and in at least one H2 heading.
2. Include the secondary keywords naturally throughout.
3. Structure: introduction, a definition section, how it works, benefits, a \
step-by-step implementation guide, common mistakes, 4-6 FAQs, 4-5 key takeaways.
4. Short paragraphs, active voice, specific numbers where possible.

## Output Format
Return ONLY valid JSON (no markdown code blocks, no explanation) in this exact structure:

{OUTPUT_SHAPE}",
        title = record.title,
        primary = record.primary_keyword,
        secondary = record.secondary_keywords,
        category = record.category,
        intent = record.search_intent,
        words = record.target_word_count,
    )
}

// ============================================================================
// Response handling
// ============================================================================

/// Drop a surrounding ```` ```json ```` fence if the model added one anyway.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Check that a response is a structured document and pretty-print it with
/// four-space indentation.
pub fn validate_document(text: &str) -> Result<String, DraftError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(text))?;
    serde_json::from_value::<StructuredDocument>(value.clone())?;

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

// ============================================================================
// Run
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DraftOptions {
    pub dry_run: bool,
    pub single: Option<String>,
    /// Short model name; unknown names fall back to the default model.
    pub model: Option<String>,
    /// Redraft slugs that already have content.
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftOutcome {
    Written { slug: String, path: PathBuf },
    DryRun { slug: String, path: PathBuf },
    /// Content already exists and `overwrite` is off.
    Skipped { slug: String },
    /// The slug cannot be used as a file name; nothing was drafted.
    InvalidSlug { row: usize, slug: String },
    Failed { slug: String, error: String },
}

#[derive(Debug, Clone, Default)]
pub struct DraftReport {
    pub model_name: String,
    pub model_id: String,
    pub outcomes: Vec<DraftOutcome>,
}

impl DraftReport {
    pub fn generated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DraftOutcome::Written { .. } | DraftOutcome::DryRun { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    DraftOutcome::Skipped { .. } | DraftOutcome::InvalidSlug { .. }
                )
            })
            .count()
    }

    pub fn errors(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DraftOutcome::Failed { .. }))
            .count()
    }
}

fn draft_with_retry(
    drafter: &dyn Drafter,
    config: &DraftingConfig,
    model: &str,
    prompt: &str,
) -> Result<String, DraftError> {
    let attempts = config.max_retries.max(1);
    let mut attempt = 1;
    loop {
        match drafter.draft(model, prompt).and_then(|text| validate_document(&text)) {
            Ok(doc) => return Ok(doc),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!(attempt, attempts, error = %e, "draft failed, retrying");
                thread::sleep(Duration::from_millis(
                    config.request_delay_ms * u64::from(attempt),
                ));
                attempt += 1;
            }
        }
    }
}

/// Draft content for every ledger row that lacks it.
pub fn draft_all(
    site: &Site,
    drafter: &dyn Drafter,
    options: &DraftOptions,
) -> Result<DraftReport, DraftError> {
    let config = &site.config.drafting;
    let content_dir = site.content_dir();
    fs::create_dir_all(&content_dir)?;

    let mut records = ledger::read_ledger(&site.ledger_path())?;
    if let Some(slug) = &options.single {
        records.retain(|r| &r.slug == slug);
        if records.is_empty() {
            return Err(DraftError::SlugNotFound(slug.clone()));
        }
    }

    let (model_name, model_id) = config.model_id(options.model.as_deref());
    let mut report = DraftReport {
        model_name,
        model_id,
        outcomes: Vec::new(),
    };

    let total = records.len();
    for (i, record) in records.iter().enumerate() {
        let slug = record.slug.clone();
        if !record.has_safe_slug() {
            report.outcomes.push(DraftOutcome::InvalidSlug { row: i + 1, slug });
            continue;
        }
        if !options.overwrite && content::content_exists(&content_dir, &slug) {
            report.outcomes.push(DraftOutcome::Skipped { slug });
            continue;
        }

        let path = content_dir.join(format!("{slug}.json"));
        if options.dry_run {
            report.outcomes.push(DraftOutcome::DryRun { slug, path });
            continue;
        }

        debug!(slug = %slug, model = %report.model_id, "drafting");
        let prompt = build_prompt(record, &site.config.site_name);
        let outcome = match draft_with_retry(drafter, config, &report.model_id, &prompt) {
            Ok(doc) => {
                fs::write(&path, doc)?;
                DraftOutcome::Written { slug, path }
            }
            Err(e) => DraftOutcome::Failed {
                slug,
                error: e.to_string(),
            },
        };
        report.outcomes.push(outcome);

        if i + 1 < total {
            thread::sleep(Duration::from_millis(config.request_delay_ms));
        }
    }

    Ok(report)
}
