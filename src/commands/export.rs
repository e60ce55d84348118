//! Export the collection as JSON for an external renderer

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::content::markdown::CodeBlock;
use crate::content::{Collection, ContentRecord};
use crate::Site;

#[derive(Serialize)]
struct ExportedRecord<'a> {
    route: &'a str,
    slug: String,
    languages: Vec<String>,
    code_blocks: Vec<CodeBlock>,
    words: usize,
    #[serde(flatten)]
    record: &'a ContentRecord,
}

/// Serialize every record, newest first, with its route
pub fn to_json(collection: &Collection) -> Result<String> {
    let records: Vec<ExportedRecord> = collection
        .entries()
        .map(|(record, route)| ExportedRecord {
            route,
            slug: record.slug(),
            languages: record.code_languages(),
            code_blocks: record.code_blocks(),
            words: record.word_count(),
            record,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn run(site: &Site, output: Option<&Path>) -> Result<()> {
    let (collection, errors) = site.load()?;
    if !errors.is_empty() {
        tracing::warn!("Exporting without {} document(s) that failed to load", errors.len());
    }

    let json = to_json(&collection)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            tracing::info!("Exported {} records to {:?}", collection.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
