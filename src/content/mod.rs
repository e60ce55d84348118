//! Content module - parses, loads and validates content records

pub mod collection;
mod frontmatter;
pub mod loader;
pub mod markdown;
mod record;
pub mod validate;

pub use collection::{Collection, Count};
pub use frontmatter::{split, FrontMatter, Markup};
pub use loader::{ContentLoader, LoadReport};
pub use record::{newest_first, ContentRecord};
pub use validate::{validate_collection, AssetLookup, FsAssets};

use crate::error::ValidationError;

/// Parse one document into a record
pub fn parse(text: &str) -> Result<ContentRecord, ValidationError> {
    ContentRecord::parse(text)
}
