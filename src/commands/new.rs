//! Create a new post as a page bundle

use anyhow::Result;
use chrono::{Local, NaiveDateTime, Timelike};
use std::fs;
use std::path::PathBuf;

use crate::content::{ContentRecord, FrontMatter};
use crate::helpers::front_matter_date;
use crate::Site;

/// Scaffold `<content_dir>/<new_post_dir>/<slug>/index.md` and return its path
pub fn create_post(
    site: &Site,
    title: &str,
    author: Option<&str>,
    date: NaiveDateTime,
) -> Result<PathBuf> {
    let author = author.unwrap_or(&site.config.author);
    if author.trim().is_empty() {
        anyhow::bail!("No author given and none configured in _config.yml");
    }

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from title {:?}", title);
    }

    let bundle = site
        .content_dir
        .join(&site.config.new_post_dir)
        .join(&slug);
    let file_path = bundle.join("index.md");

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = FrontMatter {
        author: Some(author.to_string()),
        title: Some(title.to_string()),
        date: Some(front_matter_date(&date)),
        draft: true,
        ..Default::default()
    };

    // Make sure what we write is something we would load
    let record = ContentRecord::from_front_matter(front_matter, "\n")?;
    let content = record.to_document()?;

    fs::create_dir_all(&bundle)?;
    fs::write(&file_path, content)?;

    tracing::info!("Created {:?}", file_path);
    Ok(file_path)
}

/// Run the new command
pub fn run(site: &Site, title: &str, author: Option<&str>) -> Result<()> {
    let now = Local::now().naive_local();
    let path = create_post(site, title, author, now.with_nanosecond(0).unwrap_or(now))?;
    println!("Created: {:?}", path);
    Ok(())
}
