//! Element descriptors.
//!
//! [`MetaData`] is the schema as written in JSON; every field is optional so
//! entries can be merged (`inherit`, the `*` wildcard). [`MetaElement`] is the
//! resolved, immutable descriptor attached to nodes.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::EnumCount;

use crate::expression::{PropertyValue, RawProperty};
use crate::{Category, MetaError, PermittedEntry};

/// `deprecated` as written: a flag or a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDeprecated {
    /// `true` / `false`
    Flag(bool),
    /// Deprecation message.
    Message(String),
}

/// `transparent` as written: a flag or a list of tag/category references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTransparent {
    /// `true` / `false`
    Flag(bool),
    /// Only children matching these references are transparent.
    Only(Vec<String>),
}

/// One element entry in a metadata source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetaData {
    /// Name of an already loaded element to copy fields from.
    pub inherit: Option<String>,

    /// `@meta` membership.
    pub metadata: Option<RawProperty>,
    /// `@flow` membership.
    pub flow: Option<RawProperty>,
    /// `@sectioning` membership.
    pub sectioning: Option<RawProperty>,
    /// `@heading` membership.
    pub heading: Option<RawProperty>,
    /// `@phrasing` membership.
    pub phrasing: Option<RawProperty>,
    /// `@embedded` membership.
    pub embedded: Option<RawProperty>,
    /// `@interactive` membership.
    pub interactive: Option<RawProperty>,
    /// `@script` membership.
    pub script_supporting: Option<RawProperty>,
    /// `@form` membership.
    pub form: Option<RawProperty>,

    /// `true` or a message naming the replacement.
    pub deprecated: Option<RawDeprecated>,
    /// Root of a foreign (SVG, MathML) subtree.
    pub foreign: Option<bool>,
    /// Never has children or an end tag.
    pub void: Option<bool>,
    /// `true`, or the entries whose children fall through to the parent's model.
    pub transparent: Option<RawTransparent>,

    /// Tags whose start tag closes this element.
    pub implicit_closed: Option<Vec<String>>,
    /// Attributes that should no longer be used.
    pub deprecated_attributes: Option<Vec<String>>,
    /// Attributes that must be present.
    pub required_attributes: Option<Vec<String>>,
    /// Allowed values per attribute. `/.../` entries are regular expressions.
    pub attributes: Option<BTreeMap<String, Vec<String>>>,

    /// Allowed children, see [`PermittedEntry`].
    pub permitted_content: Option<Vec<Value>>,
    /// Allowed descendants at any depth.
    pub permitted_descendants: Option<Vec<Value>>,
    /// Order children must appear in.
    pub permitted_order: Option<Vec<String>>,
    /// Tag names or selectors one of which must match an ancestor.
    pub required_ancestors: Option<Vec<String>>,
    /// Tags that must appear somewhere inside.
    pub required_content: Option<Vec<String>>,
}

macro_rules! overlay_fields {
    ($base:expr, $entry:expr, $($field:ident),+ $(,)?) => {
        MetaData {
            inherit: None,
            $($field: $entry.$field.or($base.$field),)+
        }
    };
}

/// Concatenate two optional lists, keeping `None` only when both are absent.
fn concat<T>(own: Option<Vec<T>>, defaults: Option<Vec<T>>) -> Option<Vec<T>> {
    match (own, defaults) {
        (None, None) => None,
        (Some(list), None) | (None, Some(list)) => Some(list),
        (Some(mut list), Some(extra)) => {
            list.extend(extra);
            Some(list)
        }
    }
}

impl MetaData {
    /// Shallow merge for `inherit`: fields set on `entry` win over `self`.
    #[must_use]
    pub fn overlay(self, entry: Self) -> Self {
        overlay_fields!(
            self,
            entry,
            metadata,
            flow,
            sectioning,
            heading,
            phrasing,
            embedded,
            interactive,
            script_supporting,
            form,
            deprecated,
            foreign,
            void,
            transparent,
            implicit_closed,
            deprecated_attributes,
            required_attributes,
            attributes,
            permitted_content,
            permitted_descendants,
            permitted_order,
            required_ancestors,
            required_content,
        )
    }

    /// Additive merge of the `*` wildcard entry.
    ///
    /// Scalar fields already set on `self` are kept, lists are concatenated
    /// and attribute maps unioned. `void` is never taken from the wildcard.
    #[must_use]
    pub fn with_defaults(self, defaults: &Self) -> Self {
        let defaults = defaults.clone();
        let attributes = match (self.attributes, defaults.attributes) {
            (None, None) => None,
            (Some(map), None) | (None, Some(map)) => Some(map),
            (Some(mut own), Some(extra)) => {
                for (key, values) in extra {
                    own.entry(key).or_default().extend(values);
                }
                Some(own)
            }
        };
        Self {
            inherit: None,
            metadata: self.metadata.or(defaults.metadata),
            flow: self.flow.or(defaults.flow),
            sectioning: self.sectioning.or(defaults.sectioning),
            heading: self.heading.or(defaults.heading),
            phrasing: self.phrasing.or(defaults.phrasing),
            embedded: self.embedded.or(defaults.embedded),
            interactive: self.interactive.or(defaults.interactive),
            script_supporting: self.script_supporting.or(defaults.script_supporting),
            form: self.form.or(defaults.form),
            deprecated: self.deprecated.or(defaults.deprecated),
            foreign: self.foreign.or(defaults.foreign),
            void: self.void,
            transparent: self.transparent.or(defaults.transparent),
            implicit_closed: concat(self.implicit_closed, defaults.implicit_closed),
            deprecated_attributes: concat(self.deprecated_attributes, defaults.deprecated_attributes),
            required_attributes: concat(self.required_attributes, defaults.required_attributes),
            attributes,
            permitted_content: concat(self.permitted_content, defaults.permitted_content),
            permitted_descendants: concat(self.permitted_descendants, defaults.permitted_descendants),
            permitted_order: concat(self.permitted_order, defaults.permitted_order),
            required_ancestors: concat(self.required_ancestors, defaults.required_ancestors),
            required_content: concat(self.required_content, defaults.required_content),
        }
    }

    fn raw_category(&self, category: Category) -> Option<&RawProperty> {
        match category {
            Category::Metadata => self.metadata.as_ref(),
            Category::Flow => self.flow.as_ref(),
            Category::Sectioning => self.sectioning.as_ref(),
            Category::Heading => self.heading.as_ref(),
            Category::Phrasing => self.phrasing.as_ref(),
            Category::Embedded => self.embedded.as_ref(),
            Category::Interactive => self.interactive.as_ref(),
            Category::ScriptSupporting => self.script_supporting.as_ref(),
            Category::Form => self.form.as_ref(),
        }
    }
}

/// One allowed value for an attribute.
#[derive(Debug, Clone)]
pub enum AttributeRule {
    /// Exact, case-sensitive value. `""` also accepts a value-less attribute.
    Literal(String),
    /// Written as `/pattern/` in metadata.
    Pattern(Regex),
}

impl AttributeRule {
    /// Parse a metadata string, compiling `/.../` forms.
    pub fn parse(raw: &str) -> Result<Self, MetaError> {
        match raw.strip_prefix('/').and_then(|rest| rest.strip_suffix('/')) {
            Some(pattern) => Regex::new(pattern)
                .map(Self::Pattern)
                .map_err(|source| MetaError::Regex {
                    pattern: raw.to_string(),
                    source,
                }),
            _ => Ok(Self::Literal(raw.to_string())),
        }
    }

    /// Whether `value` satisfies this rule. `None` is an attribute without a value.
    #[must_use]
    pub fn accepts(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (Self::Pattern(regex), Some(value)) => regex.is_match(value),
            (Self::Pattern(_), None) => false,
            (Self::Literal(expected), Some(value)) => expected == value,
            (Self::Literal(expected), None) => expected.is_empty(),
        }
    }
}

/// Deprecation marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    /// Optional explanation or replacement hint.
    pub message: Option<String>,
}

/// Whether an element is transparent to its parent's content model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transparent {
    /// Children are validated against this element's own model.
    #[default]
    No,
    /// All children are validated against the parent's model.
    All,
    /// Only children matching these entries are.
    Only(Vec<PermittedEntry>),
}

/// A resolved element descriptor.
#[derive(Debug, Clone)]
pub struct MetaElement {
    /// Lowercased element name.
    pub tag_name: String,
    categories: [PropertyValue; Category::COUNT],
    /// Set when the element should no longer be used.
    pub deprecated: Option<Deprecation>,
    /// Root of a foreign (SVG, MathML) subtree.
    pub foreign: bool,
    /// Void elements never have children or end tags.
    pub void: bool,
    /// Whether children are validated against the parent's model.
    pub transparent: Transparent,
    /// Start tags of these elements implicitly close this one.
    pub implicit_closed: Vec<String>,
    /// Lowercased attributes that should no longer be used.
    pub deprecated_attributes: Vec<String>,
    /// Lowercased attributes that must be present.
    pub required_attributes: Vec<String>,
    /// Attribute name to allowed values. An empty list marks a boolean attribute.
    pub attributes: BTreeMap<String, Vec<AttributeRule>>,
    /// Allowed children. `None` allows anything.
    pub permitted_content: Option<Vec<PermittedEntry>>,
    /// Allowed descendants at any depth.
    pub permitted_descendants: Option<Vec<PermittedEntry>>,
    /// Order children must appear in.
    pub permitted_order: Option<Vec<PermittedEntry>>,
    /// Tag names or selectors one of which must match an ancestor.
    pub required_ancestors: Option<Vec<String>>,
    /// Lowercased tags that must appear somewhere inside.
    pub required_content: Option<Vec<String>>,
}

impl MetaElement {
    /// Resolve a fully merged entry.
    pub fn resolve(tag_name: &str, data: &MetaData) -> Result<Self, MetaError> {
        let mut categories: [PropertyValue; Category::COUNT] = Default::default();
        for category in <Category as strum::IntoEnumIterator>::iter() {
            categories[category.index()] = PropertyValue::resolve(data.raw_category(category))?;
        }

        let deprecated = match &data.deprecated {
            None | Some(RawDeprecated::Flag(false)) => None,
            Some(RawDeprecated::Flag(true)) => Some(Deprecation { message: None }),
            Some(RawDeprecated::Message(message)) => Some(Deprecation {
                message: Some(message.clone()),
            }),
        };

        let transparent = match &data.transparent {
            None | Some(RawTransparent::Flag(false)) => Transparent::No,
            Some(RawTransparent::Flag(true)) => Transparent::All,
            Some(RawTransparent::Only(list)) => Transparent::Only(PermittedEntry::list_from_strings(list)?),
        };

        let mut attributes = BTreeMap::new();
        for (key, values) in data.attributes.iter().flatten() {
            let rules = values.iter().map(|raw| AttributeRule::parse(raw)).collect::<Result<Vec<_>, _>>()?;
            let _ = attributes.insert(key.to_ascii_lowercase(), rules);
        }

        let lowercase = |list: &Option<Vec<String>>| -> Option<Vec<String>> {
            list.as_ref()
                .map(|items| items.iter().map(|item| item.to_ascii_lowercase()).collect())
        };

        Ok(Self {
            tag_name: tag_name.to_ascii_lowercase(),
            categories,
            deprecated,
            foreign: data.foreign.unwrap_or(false),
            void: data.void.unwrap_or(false),
            transparent,
            implicit_closed: lowercase(&data.implicit_closed).unwrap_or_default(),
            deprecated_attributes: lowercase(&data.deprecated_attributes).unwrap_or_default(),
            required_attributes: lowercase(&data.required_attributes).unwrap_or_default(),
            attributes,
            permitted_content: data
                .permitted_content
                .as_deref()
                .map(PermittedEntry::list_from_values)
                .transpose()?,
            permitted_descendants: data
                .permitted_descendants
                .as_deref()
                .map(PermittedEntry::list_from_values)
                .transpose()?,
            permitted_order: data
                .permitted_order
                .as_deref()
                .map(PermittedEntry::list_from_strings)
                .transpose()?,
            required_ancestors: data.required_ancestors.clone(),
            required_content: lowercase(&data.required_content),
        })
    }

    /// The flag for a content category.
    #[must_use]
    pub const fn category(&self, category: Category) -> &PropertyValue {
        &self.categories[category.index()]
    }

    /// Whether the element statically belongs to `category`.
    #[must_use]
    pub const fn has_static_category(&self, category: Category) -> bool {
        self.category(category).is_static_true()
    }

    /// Whether `tag_name` implicitly closes this element.
    #[must_use]
    pub fn is_implicitly_closed_by(&self, tag_name: &str) -> bool {
        self.implicit_closed.iter().any(|tag| tag.eq_ignore_ascii_case(tag_name))
    }

    /// Whether the end tag may be left out: some start tag closes the element implicitly.
    #[must_use]
    pub fn has_optional_end_tag(&self) -> bool {
        !self.implicit_closed.is_empty()
    }

    /// Whether `key` is listed as deprecated.
    #[must_use]
    pub fn is_deprecated_attribute(&self, key: &str) -> bool {
        self.deprecated_attributes.iter().any(|attr| attr.eq_ignore_ascii_case(key))
    }
}
