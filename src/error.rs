//! Validation errors for documents and collections

use std::fmt;
use thiserror::Error;

use crate::config::AssetPolicy;

/// Metadata fields every document must carry, in checking order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Author,
    Title,
    Date,
}

impl RequiredField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Title => "title",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How bad a validation error is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Everything that can be wrong with a document or a collection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed metadata: {reason}")]
    MalformedMetadata { reason: String },

    #[error("missing required field `{0}`")]
    MissingRequiredField(RequiredField),

    #[error("`{field}` is not a valid date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("alias {alias:?} is declared by both {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("{document}: image {image:?} does not resolve to an existing asset")]
    DanglingAssetReference { document: String, image: String },

    #[error("{document}: alias {alias:?} is already the route of {owner}")]
    AliasShadowsRoute {
        document: String,
        alias: String,
        owner: String,
    },

    #[error("cannot read document: {0}")]
    Io(String),
}

impl ValidationError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMetadata {
            reason: reason.into(),
        }
    }

    /// Severity under the configured asset policy
    pub fn severity(&self, policy: AssetPolicy) -> Severity {
        match (self, policy) {
            (Self::DanglingAssetReference { .. }, AssetPolicy::Warn) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl From<std::io::Error> for ValidationError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// A per-document failure, tagged with the document it came from
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{document}: {error}")]
pub struct DocumentError {
    pub document: String,
    pub error: ValidationError,
}
