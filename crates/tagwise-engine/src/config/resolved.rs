use std::fmt;
use std::sync::Arc;

use tagwise_html::ParserOptions;
use tagwise_meta::MetaTable;

use super::Severity;
use crate::plugin::Plugin;
use crate::rule::Rule;

/// A rule instance with the severity it was configured at.
#[derive(Clone)]
pub struct ConfiguredRule {
    /// Name the rule was configured under.
    pub name: String,
    /// Configured severity.
    pub severity: Severity,
    /// The rule, built with its options.
    pub rule: Arc<dyn Rule>,
}

impl fmt::Debug for ConfiguredRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredRule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

/// Configuration ready to lint with.
#[derive(Clone)]
pub struct ResolvedConfig {
    meta: Arc<MetaTable>,
    rules: Vec<ConfiguredRule>,
    plugins: Vec<Arc<dyn Plugin>>,
    parser_options: ParserOptions,
}

impl ResolvedConfig {
    pub(crate) fn new(
        meta: Arc<MetaTable>,
        rules: Vec<ConfiguredRule>,
        plugins: Vec<Arc<dyn Plugin>>,
        parser_options: ParserOptions,
    ) -> Self {
        Self {
            meta,
            rules,
            plugins,
            parser_options,
        }
    }

    /// The element metadata table.
    #[must_use]
    pub const fn meta(&self) -> &Arc<MetaTable> {
        &self.meta
    }

    /// Configured rules, sorted by name.
    #[must_use]
    pub fn rules(&self) -> &[ConfiguredRule] {
        &self.rules
    }

    /// The rule configured under `name`.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&ConfiguredRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Enabled plugins, in configuration order.
    #[must_use]
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Options for the tree builder.
    #[must_use]
    pub const fn parser_options(&self) -> ParserOptions {
        self.parser_options
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("elements", &self.meta.len())
            .field("rules", &self.rules)
            .field("plugins", &self.plugins.iter().map(|plugin| plugin.name()).collect::<Vec<_>>())
            .field("parser_options", &self.parser_options)
            .finish()
    }
}
