//! IndexNow push-indexing.
//!
//! A site proves ownership of its URLs with a random key that is hosted at
//! `<site_url>/<key>.txt`. `setup` creates that key once; `submit` then POSTs
//! URL lists to the shared IndexNow endpoint in batches of at most 10 000.
//!
//! Batches are sent one after another and never retried. A rejected or
//! failed batch is recorded in the [`SubmitReport`] and the run moves on.

use crate::config::Site;
use rand::Rng;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum IndexNowError {
    #[error("IndexNow key not found at {0}; run `blogsmith indexnow --setup` first")]
    KeyMissing(PathBuf),
    #[error("IndexNow key file {0} is empty")]
    KeyEmpty(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random lowercase alphanumeric key.
pub fn generate_key(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}

/// Files written by [`setup`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeySetup {
    pub key: String,
    pub key_file: PathBuf,
    /// `<root>/<key>.txt`, served publicly for verification.
    pub verification_file: PathBuf,
    pub verification_url: String,
}

/// Generate a fresh key and write both the key file and the verification file.
///
/// An existing key is replaced.
pub fn setup(site: &Site) -> Result<KeySetup, IndexNowError> {
    let key = generate_key(site.config.indexnow.key_length);

    let key_file = site.key_file();
    if let Some(parent) = key_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&key_file, &key)?;

    let verification_file = site.root.join(format!("{key}.txt"));
    fs::write(&verification_file, &key)?;

    Ok(KeySetup {
        verification_url: key_location(site, &key),
        key,
        key_file,
        verification_file,
    })
}

/// Read the persisted key.
pub fn read_key(site: &Site) -> Result<String, IndexNowError> {
    let path = site.key_file();
    if !path.is_file() {
        return Err(IndexNowError::KeyMissing(path));
    }
    let key = fs::read_to_string(&path)?.trim().to_string();
    if key.is_empty() {
        return Err(IndexNowError::KeyEmpty(path));
    }
    Ok(key)
}

fn key_location(site: &Site, key: &str) -> String {
    format!("{}/{key}.txt", site.config.site_url)
}

// ============================================================================
// URL sources
// ============================================================================

/// URLs from the last generation run. A missing log yields nothing.
pub fn published_urls(site: &Site) -> Result<Vec<String>, IndexNowError> {
    let path = site.urls_log();
    if !path.is_file() {
        return Ok(Vec::new());
    }
    Ok(fs::read_to_string(&path)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// One URL per `.html` file in the blog output directory, sorted.
pub fn all_blog_urls(site: &Site) -> Result<Vec<String>, IndexNowError> {
    let dir = site.output_dir();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut slugs = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if let Some(slug) = name.strip_suffix(".html") {
            slugs.push(slug.to_string());
        }
    }
    slugs.sort();
    Ok(slugs.iter().map(|slug| site.blog_url(slug)).collect())
}

// ============================================================================
// Submission
// ============================================================================

/// Request body for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPayload {
    pub host: String,
    pub key: String,
    pub key_location: String,
    pub url_list: Vec<String>,
}

/// Sends one payload and returns the HTTP status code.
pub trait Transport {
    fn post(&self, endpoint: &str, payload: &SubmitPayload) -> Result<u16, IndexNowError>;
}

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, IndexNowError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, endpoint: &str, payload: &SubmitPayload) -> Result<u16, IndexNowError> {
        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=utf-8")
            .json(payload)
            .send()?;
        Ok(response.status().as_u16())
    }
}

/// How the endpoint answered one batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStatus {
    /// 200 or 202
    Accepted(u16),
    BadRequest,
    KeyInvalid,
    InvalidUrls,
    RateLimited,
    Unexpected(u16),
    /// The request never got a response.
    Failed(String),
}

impl SubmitStatus {
    pub fn from_code(code: u16) -> Self {
        match code {
            200 | 202 => SubmitStatus::Accepted(code),
            400 => SubmitStatus::BadRequest,
            403 => SubmitStatus::KeyInvalid,
            422 => SubmitStatus::InvalidUrls,
            429 => SubmitStatus::RateLimited,
            other => SubmitStatus::Unexpected(other),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitStatus::Accepted(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// 1-based.
    pub index: usize,
    pub size: usize,
    pub status: SubmitStatus,
}

#[derive(Debug, Clone, Default)]
pub struct SubmitReport {
    pub key: String,
    pub total_urls: usize,
    pub batches: Vec<BatchResult>,
}

impl SubmitReport {
    pub fn accepted_urls(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.status.is_accepted())
            .map(|b| b.size)
            .sum()
    }
}

/// Submit `urls` in sequential batches.
///
/// The key is read before anything else, so a missing key fails even when
/// there is nothing to submit.
pub fn submit(
    site: &Site,
    transport: &dyn Transport,
    urls: &[String],
) -> Result<SubmitReport, IndexNowError> {
    let key = read_key(site)?;
    let config = &site.config.indexnow;
    let mut report = SubmitReport {
        total_urls: urls.len(),
        ..Default::default()
    };

    for (i, batch) in urls.chunks(config.batch_size.max(1)).enumerate() {
        let payload = SubmitPayload {
            host: site.config.host(),
            key: key.clone(),
            key_location: key_location(site, &key),
            url_list: batch.to_vec(),
        };
        debug!(batch = i + 1, urls = batch.len(), endpoint = %config.endpoint, "submitting");
        let status = match transport.post(&config.endpoint, &payload) {
            Ok(code) => SubmitStatus::from_code(code),
            Err(e) => SubmitStatus::Failed(e.to_string()),
        };
        report.batches.push(BatchResult {
            index: i + 1,
            size: batch.len(),
            status,
        });
    }

    report.key = key;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records every payload and answers with a fixed script of codes.
    struct RecordingTransport {
        payloads: RefCell<Vec<SubmitPayload>>,
        codes: RefCell<Vec<Result<u16, String>>>,
    }

    impl RecordingTransport {
        fn answering(codes: Vec<Result<u16, String>>) -> Self {
            Self {
                payloads: RefCell::new(Vec::new()),
                codes: RefCell::new(codes),
            }
        }

        fn ok() -> Self {
            Self::answering(Vec::new())
        }
    }

    impl Transport for RecordingTransport {
        fn post(&self, _endpoint: &str, payload: &SubmitPayload) -> Result<u16, IndexNowError> {
            self.payloads.borrow_mut().push(payload.clone());
            let mut codes = self.codes.borrow_mut();
            if codes.is_empty() {
                return Ok(200);
            }
            codes.remove(0).map_err(|msg| {
                IndexNowError::Io(std::io::Error::new(std::io::ErrorKind::Other, msg))
            })
        }
    }

    fn site_with_key() -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), test_site().config);
        fs::write(site.key_file(), "abc123\n").unwrap();
        (tmp, site)
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://www.example.com/blog/p{i}")).collect()
    }

    #[test]
    fn generated_keys_are_lowercase_alphanumeric() {
        let key = generate_key(32);
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(key, generate_key(32));
    }

    #[test]
    fn setup_writes_key_and_verification_file() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), test_site().config);
        let setup = setup(&site).unwrap();

        assert_eq!(fs::read_to_string(&setup.key_file).unwrap(), setup.key);
        assert_eq!(setup.verification_file, tmp.path().join(format!("{}.txt", setup.key)));
        assert_eq!(fs::read_to_string(&setup.verification_file).unwrap(), setup.key);
        assert_eq!(
            setup.verification_url,
            format!("https://www.example.com/{}.txt", setup.key)
        );
        assert_eq!(read_key(&site).unwrap(), setup.key);
    }

    #[test]
    fn missing_key_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let site = Site::new(tmp.path(), test_site().config);
        let err = submit(&site, &RecordingTransport::ok(), &urls(1)).unwrap_err();
        assert!(matches!(err, IndexNowError::KeyMissing(_)));
        assert!(err.to_string().contains("indexnow --setup"));
    }

    #[test]
    fn payload_carries_host_key_and_location() {
        let (_tmp, site) = site_with_key();
        let transport = RecordingTransport::ok();
        submit(&site, &transport, &urls(2)).unwrap();

        let payloads = transport.payloads.borrow();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].host, "www.example.com");
        assert_eq!(payloads[0].key, "abc123");
        assert_eq!(payloads[0].key_location, "https://www.example.com/abc123.txt");
        assert_eq!(payloads[0].url_list.len(), 2);
    }

    #[test]
    fn payload_serializes_with_protocol_field_names() {
        let payload = SubmitPayload {
            host: "h".to_string(),
            key: "k".to_string(),
            key_location: "l".to_string(),
            url_list: vec!["u".to_string()],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["keyLocation"], "l");
        assert_eq!(json["urlList"][0], "u");
    }

    #[test]
    fn large_lists_are_split_into_batches() {
        let (_tmp, site) = site_with_key();
        let transport = RecordingTransport::ok();
        let report = submit(&site, &transport, &urls(25_000)).unwrap();

        let sizes: Vec<usize> = transport
            .payloads
            .borrow()
            .iter()
            .map(|p| p.url_list.len())
            .collect();
        assert_eq!(sizes, vec![10_000, 10_000, 5_000]);
        assert_eq!(report.accepted_urls(), 25_000);
        assert_eq!(report.batches[2].index, 3);
    }

    #[test]
    fn empty_list_sends_nothing() {
        let (_tmp, site) = site_with_key();
        let transport = RecordingTransport::ok();
        let report = submit(&site, &transport, &[]).unwrap();
        assert!(report.batches.is_empty());
        assert!(transport.payloads.borrow().is_empty());
    }

    #[test]
    fn failures_do_not_stop_later_batches() {
        let (_tmp, mut site) = site_with_key();
        site.config.indexnow.batch_size = 1;
        let transport = RecordingTransport::answering(vec![
            Ok(403),
            Err("connection reset".to_string()),
            Ok(202),
        ]);
        let report = submit(&site, &transport, &urls(3)).unwrap();

        assert_eq!(report.batches[0].status, SubmitStatus::KeyInvalid);
        assert!(matches!(&report.batches[1].status, SubmitStatus::Failed(m) if m.contains("connection reset")));
        assert_eq!(report.batches[2].status, SubmitStatus::Accepted(202));
        assert_eq!(report.accepted_urls(), 1);
    }

    #[test]
    fn status_codes_map_to_outcomes() {
        assert_eq!(SubmitStatus::from_code(200), SubmitStatus::Accepted(200));
        assert_eq!(SubmitStatus::from_code(400), SubmitStatus::BadRequest);
        assert_eq!(SubmitStatus::from_code(422), SubmitStatus::InvalidUrls);
        assert_eq!(SubmitStatus::from_code(429), SubmitStatus::RateLimited);
        assert_eq!(SubmitStatus::from_code(500), SubmitStatus::Unexpected(500));
    }

    #[test]
    fn published_urls_reads_log_lines() {
        let (_tmp, site) = site_with_key();
        fs::create_dir_all(site.urls_log().parent().unwrap()).unwrap();
        fs::write(site.urls_log(), "https://a\n\nhttps://b").unwrap();
        assert_eq!(published_urls(&site).unwrap(), vec!["https://a", "https://b"]);
    }

    #[test]
    fn published_urls_without_log_is_empty() {
        let (_tmp, site) = site_with_key();
        assert!(published_urls(&site).unwrap().is_empty());
    }

    #[test]
    fn all_blog_urls_lists_html_files() {
        let (_tmp, site) = site_with_key();
        let dir = site.output_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.html"), "").unwrap();
        fs::write(dir.join("a.html"), "").unwrap();
        fs::write(dir.join(".hidden.html"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        assert_eq!(
            all_blog_urls(&site).unwrap(),
            vec!["https://www.example.com/blog/a", "https://www.example.com/blog/b"]
        );
    }
}
