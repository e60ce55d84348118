//! Content loader - loads records from the content directory

use anyhow::Result;
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use super::record::newest_first;
use super::ContentRecord;
use crate::error::{DocumentError, ValidationError};
use crate::Site;

/// Records that loaded, plus the documents that did not
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Valid records, most recent first
    pub records: Vec<ContentRecord>,
    pub errors: Vec<DocumentError>,
    /// Drafts left out because `include_drafts` is off
    pub skipped_drafts: usize,
}

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    ignore: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Result<Self> {
        let ignore = site.config.ignore_patterns()?;
        Ok(Self { site, ignore })
    }

    /// Load every document. A broken document is reported and skipped;
    /// it never stops the walk.
    pub fn load(&self) -> LoadReport {
        let mut report = LoadReport::default();
        let content_dir = &self.site.content_dir;

        if !content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", content_dir);
            return report;
        }

        let walker = WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to walk content directory: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let source = self.source_of(path);
            if self.ignore.iter().any(|p| p.matches(&source)) {
                tracing::debug!("Ignoring {}", source);
                continue;
            }

            match load_document(path) {
                Ok(record) => {
                    let record = record.with_source(source);
                    if record.draft && !self.site.config.include_drafts {
                        tracing::debug!("Skipping draft {}", record.source);
                        report.skipped_drafts += 1;
                        continue;
                    }
                    report.records.push(record);
                }
                Err(error) => {
                    tracing::warn!("Failed to load {}: {}", source, error);
                    report.errors.push(DocumentError {
                        document: source,
                        error,
                    });
                }
            }
        }

        report.records.sort_by(newest_first);
        tracing::debug!(
            "Loaded {} records, {} failed",
            report.records.len(),
            report.errors.len()
        );

        report
    }

    /// Document identity: path relative to the content directory, with `/`
    fn source_of(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Read and parse a single document
pub fn load_document(path: &Path) -> Result<ContentRecord, ValidationError> {
    let content = fs::read_to_string(path)?;
    ContentRecord::parse(&content)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Dot-files and `_`-prefixed entries are not content
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.') || (s.starts_with('_') && s != "_index.md"))
        .unwrap_or(false)
}
