//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    /// Author written into scaffolded posts
    pub author: String,

    // Directory
    pub content_dir: String,
    /// Directory under `content_dir` where `new` creates page bundles
    pub new_post_dir: String,
    /// Glob patterns (relative to `content_dir`) the loader skips
    #[serde(default)]
    pub ignore: Vec<String>,

    // URL
    pub permalink: String,

    // Writing
    pub include_drafts: bool,
    pub asset_policy: AssetPolicy,

    // Date / Time format
    pub date_format: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            author: String::new(),

            content_dir: "content".to_string(),
            new_post_dir: "posts".to_string(),
            ignore: Vec::new(),

            permalink: ":year/:month/:slug/".to_string(),

            include_drafts: false,
            asset_policy: AssetPolicy::Warn,

            date_format: "YYYY-MM-DD".to_string(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: SiteConfig =
            serde_yaml::from_str(&content).with_context(|| format!("invalid config {:?}", path))?;
        Ok(config)
    }

    /// Compile the configured ignore globs
    pub fn ignore_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.ignore
            .iter()
            .map(|p| {
                glob::Pattern::new(p).with_context(|| format!("invalid ignore pattern {:?}", p))
            })
            .collect()
    }
}

/// How a cover image that does not resolve is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetPolicy {
    /// Report it and carry on
    #[default]
    Warn,
    /// Fail the check
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.permalink, ":year/:month/:slug/");
        assert_eq!(config.asset_policy, AssetPolicy::Warn);
        assert!(!config.include_drafts);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Yuhao's Notes
author: yuhao
content_dir: src/content
asset_policy: error
ignore:
  - "**/*.draft.md"
theme: PaperMod
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Yuhao's Notes");
        assert_eq!(config.author, "yuhao");
        assert_eq!(config.content_dir, "src/content");
        assert_eq!(config.asset_policy, AssetPolicy::Error);
        assert_eq!(config.permalink, ":year/:month/:slug/");
        assert!(config.extra.contains_key("theme"));
        assert_eq!(config.ignore_patterns().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let config = SiteConfig {
            ignore: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(config.ignore_patterns().is_err());
    }
}
