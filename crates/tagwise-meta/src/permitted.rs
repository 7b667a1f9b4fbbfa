//! Permitted-content entries.
//!
//! Content models are lists of OR-alternatives. Each alternative is one of:
//!
//! - `"tag"`, `"tag?"`, `"tag*"`: an element name, optionally with a
//!   cardinality qualifier (the qualifier only matters for occurrence counts)
//! - `"@category"`: any element in a content category
//! - `[a, b, ...]`: an AND-group, every member must match
//! - `{"exclude": x}`: matches when none of `x` matches
//!
//! so `[["@flow", {"exclude": "@interactive"}]]` reads "flow content that is
//! not interactive", while `["@flow", {"exclude": "@interactive"}]` accepts
//! anything that is flow content or not interactive.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::{Category, MetaError};

/// Cardinality suffix on a tag entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// `?`: at most once.
    Optional,
    /// `*`: any number of times.
    Any,
}

/// One entry of a permitted-content, permitted-order or transparent list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermittedEntry {
    /// Element name with optional qualifier.
    Tag {
        /// Lowercased element name.
        name: String,
        /// Cardinality qualifier.
        qualifier: Option<Qualifier>,
    },
    /// Content category reference.
    Category(Category),
    /// All members must match.
    Group(Vec<PermittedEntry>),
    /// None of the members may match.
    Exclude(Vec<PermittedEntry>),
}

impl PermittedEntry {
    /// Parse a JSON content-model entry.
    pub fn from_value(value: &Value) -> Result<Self, MetaError> {
        match value {
            Value::String(token) => token.parse(),
            Value::Array(items) => items.iter().map(Self::from_value).collect::<Result<_, _>>().map(Self::Group),
            Value::Object(map) => {
                if let Some(property) = map.keys().find(|key| key.as_str() != "exclude") {
                    return Err(MetaError::UnknownPermittedProperty {
                        rule: value.to_string(),
                        property: property.clone(),
                    });
                }
                let excluded = match map.get("exclude") {
                    None => Vec::new(),
                    Some(Value::Array(items)) => items.iter().map(Self::from_value).collect::<Result<_, _>>()?,
                    Some(single) => vec![Self::from_value(single)?],
                };
                Ok(Self::Exclude(excluded))
            }
            _ => Err(MetaError::InvalidPermittedRule(value.to_string())),
        }
    }

    /// Parse a whole content-model list.
    pub fn list_from_values(values: &[Value]) -> Result<Vec<Self>, MetaError> {
        values.iter().map(Self::from_value).collect()
    }

    /// Parse a list of plain string references (`permittedOrder`, transparent lists).
    pub fn list_from_strings(values: &[String]) -> Result<Vec<Self>, MetaError> {
        values.iter().map(|token| token.parse()).collect()
    }

    /// Cardinality qualifier, for tag entries.
    #[must_use]
    pub const fn qualifier(&self) -> Option<Qualifier> {
        match self {
            Self::Tag { qualifier, .. } => *qualifier,
            _ => None,
        }
    }
}

impl FromStr for PermittedEntry {
    type Err = MetaError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.starts_with('@') {
            return Category::from_reference(token)
                .map(Self::Category)
                .ok_or_else(|| MetaError::InvalidCategory(token.to_string()));
        }
        let (name, qualifier) = if let Some(name) = token.strip_suffix('?') {
            (name, Some(Qualifier::Optional))
        } else if let Some(name) = token.strip_suffix('*') {
            (name, Some(Qualifier::Any))
        } else {
            (token, None)
        };
        Ok(Self::Tag {
            name: name.to_ascii_lowercase(),
            qualifier,
        })
    }
}

impl fmt::Display for PermittedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag { name, qualifier } => {
                write!(f, "{name}")?;
                match qualifier {
                    Some(Qualifier::Optional) => write!(f, "?"),
                    Some(Qualifier::Any) => write!(f, "*"),
                    None => Ok(()),
                }
            }
            Self::Category(category) => write!(f, "{}", category.reference()),
            Self::Group(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Exclude(items) => {
                write!(f, "{{exclude: [")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]}}")
            }
        }
    }
}
