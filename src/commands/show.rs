//! Show one record, looked up by route or alias

use anyhow::{anyhow, Result};

use crate::content::Collection;
use crate::Site;

/// Output format for `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Yaml,
    Json,
}

/// Render the metadata of the record at `path`
pub fn render(collection: &Collection, path: &str, format: Format) -> Result<String> {
    let record = collection
        .resolve(path)
        .ok_or_else(|| anyhow!("No record at {}", path))?;
    let metadata = record.metadata();

    Ok(match format {
        Format::Yaml => metadata.to_yaml()?,
        Format::Json => serde_json::to_string_pretty(&metadata)?,
    })
}

pub fn run(site: &Site, path: &str, format: Format) -> Result<()> {
    let (collection, errors) = site.load()?;
    if !errors.is_empty() {
        tracing::warn!("{} document(s) failed to load", errors.len());
    }

    let output = match render(&collection, path, format) {
        Err(e) if !errors.is_empty() => {
            return Err(e.context(format!(
                "{} document(s) failed to load and may include this one; run `check` for details",
                errors.len()
            )))
        }
        result => result?,
    };
    println!("{}", output);
    Ok(())
}
