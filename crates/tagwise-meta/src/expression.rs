//! Dynamic content-category expressions.
//!
//! Some categories depend on the element instance rather than its name: an
//! `<img>` is interactive only with `usemap`, an `<input>` only when its type
//! is not `hidden`. Metadata writes these as `[functionName, options]` pairs
//! which are resolved against a closed set of functions when the table is
//! built. Evaluation happens later, per node, through [`ExpressionTarget`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::MetaError;

/// Comparison used by `matchAttribute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOperator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
}

/// A resolved dynamic property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyExpression {
    /// `isDescendant(tagName)`: some ancestor has the given tag name.
    IsDescendant(String),
    /// `hasAttribute(name)`: the element carries the attribute.
    HasAttribute(String),
    /// `matchAttribute([name, op, value])`: case-insensitive comparison of an
    /// attribute value. A missing attribute compares as the empty string.
    MatchAttribute {
        /// Attribute name, lowercased.
        key: String,
        /// Comparison operator.
        op: MatchOperator,
        /// Expected value, lowercased.
        value: String,
    },
}

/// What an expression needs to know about the element it is evaluated on.
pub trait ExpressionTarget {
    /// Whether the element has an attribute with this (case-insensitive) name.
    fn has_attribute(&self, key: &str) -> bool;

    /// Static value of the attribute, if present and not dynamic.
    fn attribute_value(&self, key: &str) -> Option<&str>;

    /// Whether any ancestor element has this tag name.
    fn has_ancestor(&self, tag_name: &str) -> bool;
}

impl PropertyExpression {
    /// Resolve `function` with its `options` into an expression.
    ///
    /// Unknown function names and malformed options are rejected here so a
    /// table never holds an expression that cannot be evaluated.
    pub fn resolve(function: &str, options: &Value) -> Result<Self, MetaError> {
        let invalid = |message: &str| MetaError::InvalidOptions {
            function: function.to_string(),
            message: message.to_string(),
        };

        match function {
            "isDescendant" => options
                .as_str()
                .map(|tag| Self::IsDescendant(tag.to_ascii_lowercase()))
                .ok_or_else(|| invalid("expected a tag name")),
            "hasAttribute" => options
                .as_str()
                .map(|key| Self::HasAttribute(key.to_ascii_lowercase()))
                .ok_or_else(|| invalid("expected an attribute name")),
            "matchAttribute" => {
                let parts: Option<Vec<&str>> = options
                    .as_array()
                    .map(|items| items.iter().filter_map(Value::as_str).collect());
                let Some([key, op, value]) = parts.as_deref() else {
                    return Err(invalid("expected [key, op, value]"));
                };
                let op = match *op {
                    "=" => MatchOperator::Equal,
                    "!=" => MatchOperator::NotEqual,
                    other => return Err(invalid(&format!("unknown operator \"{other}\""))),
                };
                Ok(Self::MatchAttribute {
                    key: key.to_ascii_lowercase(),
                    op,
                    value: value.to_ascii_lowercase(),
                })
            }
            _ => Err(MetaError::UnknownFunction(function.to_string())),
        }
    }

    /// Evaluate against an element.
    pub fn evaluate(&self, target: &impl ExpressionTarget) -> bool {
        match self {
            Self::IsDescendant(tag) => target.has_ancestor(tag),
            Self::HasAttribute(key) => target.has_attribute(key),
            Self::MatchAttribute { key, op, value } => {
                let actual = target.attribute_value(key).unwrap_or_default().to_ascii_lowercase();
                match op {
                    MatchOperator::Equal => actual == *value,
                    MatchOperator::NotEqual => actual != *value,
                }
            }
        }
    }
}

/// A content-category flag as written in metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawProperty {
    /// `true` / `false`
    Literal(bool),
    /// `["functionName", options]`
    Expression(String, Value),
}

/// A resolved content-category flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyValue {
    /// Known without looking at the element.
    Static(bool),
    /// Evaluated per element.
    Dynamic(PropertyExpression),
    /// Not specified; behaves like `Static(false)`.
    #[default]
    Unset,
}

impl PropertyValue {
    /// Resolve a raw metadata flag.
    pub fn resolve(raw: Option<&RawProperty>) -> Result<Self, MetaError> {
        match raw {
            None => Ok(Self::Unset),
            Some(RawProperty::Literal(value)) => Ok(Self::Static(*value)),
            Some(RawProperty::Expression(function, options)) => {
                PropertyExpression::resolve(function, options).map(Self::Dynamic)
            }
        }
    }

    /// Whether the flag is statically true.
    #[must_use]
    pub const fn is_static_true(&self) -> bool {
        matches!(self, Self::Static(true))
    }
}
