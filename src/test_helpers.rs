//! Shared test utilities for the blogsmith test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (_tmp, site) = setup_site();
//! let report = generate(&site, &options).unwrap();
//!
//! assert_eq!(generated_slugs(&report), vec!["demo", "structured-guide"]);
//! assert_eq!(skipped_slugs(&report), vec!["missing-post"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::config::{Site, SiteConfig};
use crate::generate::{GenerateReport, PageOutcome};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and load it with stock config.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_site() -> (TempDir, Site) {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    let site = Site::new(tmp.path(), SiteConfig::default());
    (tmp, site)
}

/// A site with stock config rooted nowhere in particular, for pure rendering tests.
pub fn test_site() -> Site {
    Site::new("/tmp/blogsmith-test-site", SiteConfig::default())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Report extractors
// =========================================================================

/// Slugs written (or that would be written in a dry run), in ledger order.
pub fn generated_slugs(report: &GenerateReport) -> Vec<&str> {
    report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            PageOutcome::Generated { slug, .. } | PageOutcome::DryRun { slug, .. } => {
                Some(slug.as_str())
            }
            _ => None,
        })
        .collect()
}

/// Slugs skipped for lack of content, in ledger order.
pub fn skipped_slugs(report: &GenerateReport) -> Vec<&str> {
    report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            PageOutcome::Skipped { slug, .. } => Some(slug.as_str()),
            _ => None,
        })
        .collect()
}
