//! Front-matter parsing

use indexmap::IndexMap;
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;

use crate::error::ValidationError;

/// Metadata markup, recognized by the delimiter line that opens the block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// `---`
    Yaml,
    /// `+++`
    Toml,
    /// `;;;`
    Json,
}

impl Markup {
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
            Self::Json => ";;;",
        }
    }

    fn detect(line: &str) -> Option<Self> {
        [Self::Yaml, Self::Toml, Self::Json]
            .into_iter()
            .find(|m| line.trim_end() == m.delimiter())
    }

    /// Decode a block into key-value pairs
    fn decode(self, block: &str) -> Result<Mapping, ValidationError> {
        if block.trim().is_empty() {
            return Ok(Mapping::new());
        }

        let value = match self {
            Self::Yaml => serde_yaml::from_str::<Value>(block)
                .map_err(|e| ValidationError::malformed(format!("YAML: {}", e)))?,
            Self::Toml => {
                let table = block
                    .parse::<toml::Table>()
                    .map_err(|e| ValidationError::malformed(format!("TOML: {}", e)))?;
                toml_to_yaml(toml::Value::Table(table))
            }
            Self::Json => {
                let json = serde_json::from_str::<serde_json::Value>(block)
                    .map_err(|e| ValidationError::malformed(format!("JSON: {}", e)))?;
                serde_yaml::to_value(json)
                    .map_err(|e| ValidationError::malformed(format!("JSON: {}", e)))?
            }
        };

        match value {
            Value::Mapping(mapping) => Ok(mapping),
            Value::Null => Ok(Mapping::new()),
            _ => Err(ValidationError::malformed(
                "front-matter is not a key-value mapping",
            )),
        }
    }
}

fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (Value::String(k), toml_to_yaml(v)))
                .collect(),
        ),
    }
}

/// Split a document into its markup, raw metadata block and body.
///
/// The body is everything after the closing delimiter line, untouched.
pub fn split(content: &str) -> Result<(Markup, &str, &str), ValidationError> {
    let text = content.trim_start_matches('\u{feff}').trim_start();

    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    let markup = Markup::detect(first).ok_or_else(|| {
        ValidationError::malformed("document does not start with a front-matter delimiter")
    })?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == markup.delimiter() {
            return Ok((markup, &rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(ValidationError::malformed(format!(
        "missing closing `{}` delimiter",
        markup.delimiter()
    )))
}

struct StringOrVec;

impl<'de> Visitor<'de> for StringOrVec {
    type Value = Vec<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar or a list of scalars")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(vec![value.to_string()])
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(vec![value])
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(vec![value.to_string()])
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(vec![value.to_string()])
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(vec![value.to_string()])
    }

    fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(vec![value.to_string()])
    }

    fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
    where
        S: SeqAccess<'de>,
    {
        let mut vec = Vec::new();
        while let Some(item) = seq.next_element::<Scalar>()? {
            vec.push(item.0);
        }
        Ok(vec)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }
}

/// Handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StringOrVec)
}

/// Like `string_or_vec`, but keeps an explicit key apart from an absent one
fn option_string_or_vec<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StringOrVec).map(Some)
}

/// A scalar rendered as text, so `title: 2048` is a title and not an error
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Scalar, E> {
                Ok(Scalar(value))
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| s.0))
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Front-matter data from a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub author: Option<String>,
    #[serde(
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(
        alias = "lastmod",
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<String>,
    #[serde(
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_vec", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "string_or_vec", skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(
        deserialize_with = "option_string_or_vec",
        skip_serializing_if = "Option::is_none"
    )]
    pub series: Option<Vec<String>>,
    #[serde(
        deserialize_with = "option_string_or_vec",
        skip_serializing_if = "Option::is_none"
    )]
    pub aliases: Option<Vec<String>>,
    #[serde(
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    #[serde(
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub draft: bool,

    /// Unrecognized keys, in source order
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> Result<(Self, &str), ValidationError> {
        let (markup, block, body) = split(content)?;
        let mapping = markup.decode(block)?;
        let fm = Self::from_mapping(mapping)?;
        tracing::trace!("decoded {:?} front-matter with {} extra keys", markup, fm.extra.len());
        Ok((fm, body))
    }

    /// Map decoded key-value pairs onto the known fields
    pub fn from_mapping(mapping: Mapping) -> Result<Self, ValidationError> {
        serde_yaml::from_value(Value::Mapping(mapping))
            .map_err(|e| ValidationError::malformed(e.to_string()))
    }

    /// Serialize back into a YAML block (without delimiters)
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
