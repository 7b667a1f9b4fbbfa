//! Element data: attributes, closed-state, metadata and rule suppression.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use strum::EnumCount;
use tagwise_common::Location;
use tagwise_meta::{Category, MetaElement};

/// How an element's end was determined.
///
/// Transitions are one-way: once an element leaves [`NodeClosed::Open`] it
/// never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeClosed {
    /// Still open, or left open at end of input.
    Open,
    /// Closed by an end tag, by an ancestor's end tag or implicitly by a sibling.
    EndTag,
    /// Void element written without `/>`.
    VoidOmitted,
    /// Written as `<tag/>`.
    VoidSelfClosed,
}

/// Value produced by a templating engine rather than written literally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicValue {
    /// The expression as written.
    pub expr: String,
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Literal text.
    Static(String),
    /// Only known at runtime.
    Dynamic(DynamicValue),
}

/// An attribute as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Attribute name as written.
    pub key: String,
    /// `None` for boolean attributes written without `=`.
    pub value: Option<AttributeValue>,
    /// Location of the name.
    pub key_location: Location,
    /// Location of the value, without `=` and quotes.
    pub value_location: Option<Location>,
    /// Quote character around the value, if any.
    pub quote: Option<char>,
    /// Key of the attribute this one was derived from by a source hook.
    pub original_attribute: Option<String>,
}

impl Attribute {
    /// A literal attribute.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Option<String>, key_location: Location, value_location: Option<Location>) -> Self {
        Self {
            key: key.into(),
            value: value.map(AttributeValue::Static),
            key_location,
            value_location,
            quote: None,
            original_attribute: None,
        }
    }

    /// Static value, `None` when absent or dynamic.
    #[must_use]
    pub fn value_str(&self) -> Option<&str> {
        match &self.value {
            Some(AttributeValue::Static(value)) => Some(value),
            _ => None,
        }
    }

    /// Whether the value is only known at runtime.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self.value, Some(AttributeValue::Dynamic(_)))
    }

    /// Case-insensitive key comparison.
    #[must_use]
    pub fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

/// Element-specific data.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name as written.
    pub tag_name: String,
    /// Namespace prefix inherited from a foreign ancestor (`svg`, `math`).
    pub namespace: Option<String>,
    /// Attributes in source order, duplicates included.
    pub attrs: Vec<Attribute>,
    /// Resolved metadata, `None` for unknown elements.
    pub meta: Option<Arc<MetaElement>>,
    closed: NodeClosed,
    rules: HashMap<String, bool>,
    categories: [OnceLock<bool>; Category::COUNT],
}

impl ElementData {
    /// A new open element.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, attrs: Vec<Attribute>, meta: Option<Arc<MetaElement>>) -> Self {
        Self {
            tag_name: tag_name.into(),
            namespace: None,
            attrs,
            meta,
            closed: NodeClosed::Open,
            rules: HashMap::new(),
            categories: Default::default(),
        }
    }

    /// Tag name with the foreign namespace prefix, used for metadata lookup.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{}", self.tag_name),
            None => self.tag_name.clone(),
        }
    }

    /// Whether this element matches `tag_name` (`*` matches anything).
    #[must_use]
    pub fn is(&self, tag_name: &str) -> bool {
        tag_name == "*" || self.tag_name.eq_ignore_ascii_case(tag_name)
    }

    /// How the element was closed.
    #[must_use]
    pub const fn closed(&self) -> NodeClosed {
        self.closed
    }

    /// Move out of [`NodeClosed::Open`]. Has no effect on an already closed element.
    pub fn close(&mut self, state: NodeClosed) {
        if self.closed == NodeClosed::Open {
            self.closed = state;
        }
    }

    /// Whether metadata marks the element void.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.meta.as_ref().is_some_and(|meta| meta.void)
    }

    /// `<tag>` annotation used in messages.
    #[must_use]
    pub fn annotated_name(&self) -> String {
        format!("<{}>", self.tag_name)
    }

    /// First attribute with this key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.is(key))
    }

    /// All attributes with this key.
    pub fn attributes<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.attrs.iter().filter(move |attr| attr.is(key))
    }

    /// Whether any attribute has this key.
    #[must_use]
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    /// Static value of the first attribute with this key.
    #[must_use]
    pub fn attribute_value(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Attribute::value_str)
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute_value("id")
    }

    /// Class names from every `class` attribute, in order, empty tokens removed.
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.attributes("class")
            .filter_map(Attribute::value_str)
            .flat_map(str::split_ascii_whitespace)
            .collect()
    }

    /// Suppress `rule` on this element.
    pub fn disable_rule(&mut self, rule: &str) {
        let _ = self.rules.insert(rule.to_string(), false);
    }

    /// Lift a suppression of `rule` on this element.
    pub fn enable_rule(&mut self, rule: &str) {
        let _ = self.rules.insert(rule.to_string(), true);
    }

    /// Suppress several rules.
    pub fn disable_rules<S: AsRef<str>>(&mut self, rules: &[S]) {
        for rule in rules {
            self.disable_rule(rule.as_ref());
        }
    }

    /// Whether `rule` may report on this element. Defaults to `true`.
    #[must_use]
    pub fn rule_enabled(&self, rule: &str) -> bool {
        self.rules.get(rule).copied().unwrap_or(true)
    }

    /// Cached result of a dynamic category, if it has been evaluated.
    #[must_use]
    pub fn cached_category(&self, category: Category) -> Option<bool> {
        self.categories[category.index()].get().copied()
    }

    pub(crate) fn category_cell(&self, category: Category) -> &OnceLock<bool> {
        &self.categories[category.index()]
    }
}
