//! Content record model

use chrono::{Datelike, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;

use super::frontmatter::{FrontMatter, Markup};
use super::markdown;
use crate::error::{RequiredField, ValidationError};
use crate::helpers::{front_matter_date, parse_date_string};

/// One document: validated metadata plus the untouched body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    /// Document identity, relative to the content directory
    pub source: String,

    pub author: String,
    pub title: String,
    pub date: NaiveDateTime,

    /// Last updated date (`updated` or `lastmod`)
    pub updated: Option<NaiveDateTime>,

    /// Optional summary
    pub description: Option<String>,

    pub tags: Vec<String>,

    /// Hierarchical grouping labels, outermost first
    pub categories: Vec<String>,

    /// Series this document belongs to, absent when the key is absent
    pub series: Option<Vec<String>>,

    /// Alternate routes that must resolve to this document
    pub aliases: Option<Vec<String>>,

    /// Cover image, relative to the document's directory
    pub image: Option<String>,

    /// Explicit slug override; exported through the derived `slug()` instead
    #[serde(skip_serializing)]
    pub slug: Option<String>,

    pub draft: bool,

    /// Unrecognized front-matter keys, in source order
    pub extra: IndexMap<String, serde_yaml::Value>,

    /// Raw markdown body
    pub body: String,
}

impl ContentRecord {
    /// Parse a whole document.
    ///
    /// Required fields are checked in the order author, title, date and the
    /// first one missing is reported.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let (fm, body) = FrontMatter::parse(text)?;
        Self::from_front_matter(fm, body)
    }

    /// Build a record from already decoded front-matter
    pub fn from_front_matter(fm: FrontMatter, body: &str) -> Result<Self, ValidationError> {
        let author = required(fm.author, RequiredField::Author)?;
        let title = required(fm.title, RequiredField::Title)?;
        let date_text = required(fm.date, RequiredField::Date)?;

        let date = parse_date_string(&date_text).ok_or(ValidationError::InvalidDate {
            field: "date",
            value: date_text,
        })?;

        let updated = match fm.updated {
            Some(text) if !text.trim().is_empty() => Some(parse_date_string(&text).ok_or(
                ValidationError::InvalidDate {
                    field: "updated",
                    value: text,
                },
            )?),
            _ => None,
        };

        Ok(Self {
            source: String::new(),
            author,
            title,
            date,
            updated,
            description: fm.description,
            tags: fm.tags,
            categories: fm.categories,
            series: fm.series,
            aliases: fm.aliases,
            image: fm.image.filter(|i| !i.trim().is_empty()),
            slug: fm.slug.filter(|s| !s.trim().is_empty()),
            draft: fm.draft,
            extra: fm.extra,
            body: body.to_string(),
        })
    }

    /// Set the document identity
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// The metadata as front-matter, ready to be written back out
    pub fn metadata(&self) -> FrontMatter {
        FrontMatter {
            author: Some(self.author.clone()),
            title: Some(self.title.clone()),
            date: Some(front_matter_date(&self.date)),
            updated: self.updated.as_ref().map(front_matter_date),
            description: self.description.clone(),
            tags: self.tags.clone(),
            categories: self.categories.clone(),
            series: self.series.clone(),
            aliases: self.aliases.clone(),
            image: self.image.clone(),
            slug: self.slug.clone(),
            draft: self.draft,
            extra: self.extra.clone(),
        }
    }

    /// Serialize the record back into a document with a YAML block
    pub fn to_document(&self) -> Result<String, serde_yaml::Error> {
        let delimiter = Markup::Yaml.delimiter();
        Ok(format!(
            "{}\n{}{}\n{}",
            delimiter,
            self.metadata().to_yaml()?,
            delimiter,
            self.body
        ))
    }

    pub fn aliases(&self) -> &[String] {
        self.aliases.as_deref().unwrap_or_default()
    }

    pub fn series(&self) -> &[String] {
        self.series.as_deref().unwrap_or_default()
    }

    /// Directory the document lives in, relative to the content directory
    pub fn dir(&self) -> &Path {
        Path::new(&self.source).parent().unwrap_or(Path::new(""))
    }

    /// URL-friendly name: the `slug` key, else the bundle directory for
    /// `index.md`, else the file stem, else the slugified title
    pub fn slug(&self) -> String {
        if let Some(slug) = &self.slug {
            return slug.clone();
        }

        let path = Path::new(&self.source);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let name = if stem == "index" || stem == "_index" {
            path.parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .unwrap_or("")
        } else {
            stem
        };

        if name.is_empty() {
            slug::slugify(&self.title)
        } else {
            name.to_string()
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// The description, else the excerpt before `<!-- more -->`
    pub fn summary(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or_else(|| markdown::split_excerpt(&self.body))
    }

    pub fn code_blocks(&self) -> Vec<markdown::CodeBlock> {
        markdown::code_blocks(&self.body)
    }

    pub fn code_languages(&self) -> Vec<String> {
        markdown::code_languages(&self.body)
    }

    pub fn word_count(&self) -> usize {
        markdown::word_count(&self.body)
    }
}

fn required(value: Option<String>, field: RequiredField) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingRequiredField(field)),
    }
}

/// Most recent first; ties broken by source path so the order is stable
pub fn newest_first(a: &ContentRecord, b: &ContentRecord) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.source.cmp(&b.source))
}
