//! Bundled rules and the registry rules are created from.

mod attribute_allowed_values;
mod close_order;
mod deprecated;
mod element_permitted_content;
mod element_permitted_occurrences;
mod element_permitted_order;
mod element_required_ancestor;
mod element_required_attributes;
mod element_required_content;
mod no_deprecated_attr;
mod no_dup_attr;
mod no_dup_class;
mod no_inline_style;
mod no_unknown_elements;
mod void_style;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

pub use attribute_allowed_values::AttributeAllowedValues;
pub use close_order::CloseOrder;
pub use deprecated::Deprecated;
pub use element_permitted_content::ElementPermittedContent;
pub use element_permitted_occurrences::ElementPermittedOccurrences;
pub use element_permitted_order::ElementPermittedOrder;
pub use element_required_ancestor::ElementRequiredAncestor;
pub use element_required_attributes::ElementRequiredAttributes;
pub use element_required_content::ElementRequiredContent;
pub use no_deprecated_attr::NoDeprecatedAttr;
pub use no_dup_attr::NoDupAttr;
pub use no_dup_class::NoDupClass;
pub use no_inline_style::NoInlineStyle;
pub use no_unknown_elements::NoUnknownElements;
pub use void_style::{VoidStyle, VoidStyleKind};

use crate::ConfigError;
use crate::rule::Rule;

/// Builds a rule from its configured options.
pub type RuleFactory = Arc<dyn Fn(&Value) -> Result<Arc<dyn Rule>, ConfigError> + Send + Sync>;

/// Rule name to factory.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    factories: BTreeMap<String, RuleFactory>,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

fn without_options<R: Rule + Default + 'static>() -> impl Fn(&Value) -> Result<Arc<dyn Rule>, ConfigError> + Send + Sync {
    |_| Ok(Arc::new(R::default()))
}

impl RuleRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every bundled rule.
    #[must_use]
    pub fn bundled() -> Self {
        let mut registry = Self::new();
        registry.register("attribute-allowed-values", without_options::<AttributeAllowedValues>());
        registry.register("close-order", without_options::<CloseOrder>());
        registry.register("deprecated", without_options::<Deprecated>());
        registry.register("element-permitted-content", without_options::<ElementPermittedContent>());
        registry.register("element-permitted-occurrences", without_options::<ElementPermittedOccurrences>());
        registry.register("element-permitted-order", without_options::<ElementPermittedOrder>());
        registry.register("element-required-ancestor", without_options::<ElementRequiredAncestor>());
        registry.register("element-required-attributes", without_options::<ElementRequiredAttributes>());
        registry.register("element-required-content", without_options::<ElementRequiredContent>());
        registry.register("no-deprecated-attr", without_options::<NoDeprecatedAttr>());
        registry.register("no-dup-attr", without_options::<NoDupAttr>());
        registry.register("no-dup-class", without_options::<NoDupClass>());
        registry.register("no-inline-style", without_options::<NoInlineStyle>());
        registry.register("no-unknown-elements", without_options::<NoUnknownElements>());
        registry.register("void-style", VoidStyle::from_options);
        registry
    }

    /// Add or replace a rule definition.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&Value) -> Result<Arc<dyn Rule>, ConfigError> + Send + Sync + 'static,
    ) {
        let _ = self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Whether a rule called `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Names of every defined rule, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the rule called `name`. `Ok(None)` when no such rule is defined.
    pub fn create(&self, name: &str, options: &Value) -> Result<Option<Arc<dyn Rule>>, ConfigError> {
        self.factories.get(name).map(|factory| factory(options)).transpose()
    }
}

/// `a`, `a or b`, `a, b or c`.
pub(crate) fn natural_join(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}
