//! postcheck: load and validate front-matter driven blog posts
//!
//! This crate parses Markdown documents that open with a YAML, TOML or JSON
//! front-matter block into typed content records, checks the invariants that
//! span the whole collection (unique aliases, resolvable cover images) and
//! hands the result to whatever renders the site.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use content::{parse, validate_collection, Collection, ContentRecord};
pub use error::{DocumentError, Severity, ValidationError};

/// A site: its configuration and where its content lives
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
        })
    }

    /// Load every document and build the collection from the ones that parse
    pub fn load(&self) -> Result<(Collection, Vec<DocumentError>)> {
        let report = content::ContentLoader::new(self)?.load();
        let collection = Collection::new(report.records, &self.config.permalink);
        Ok((collection, report.errors))
    }

    /// Asset lookup rooted at the content directory
    pub fn assets(&self) -> content::FsAssets {
        content::FsAssets::new(&self.content_dir)
    }
}
