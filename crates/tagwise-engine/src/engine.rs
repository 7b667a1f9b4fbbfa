//! Runs the configured rules over sources.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;
use tagwise_html::{Parser, Source};

use crate::ConfigError;
use crate::config::{Config, ResolvedConfig, Severity};
use crate::directive;
use crate::reporter::{Report, Reporter};
use crate::rule::{RuleContext, RuleDocumentation};

/// The linter.
///
/// Holds a resolved configuration; every call to [`lint`](Self::lint) builds
/// a fresh parser and fresh rule contexts per source, so one engine can lint
/// any number of batches.
#[derive(Debug, Clone)]
pub struct Engine {
    config: ResolvedConfig,
}

impl Engine {
    /// Create an engine for an already resolved configuration.
    #[must_use]
    pub const fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }

    /// Resolve `config` (without plugins) and create an engine for it.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.resolve()?))
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// A parser bound to the configured metadata and parser options.
    #[must_use]
    pub fn instantiate_parser(&self) -> Parser {
        Parser::new(Arc::clone(self.config.meta()), self.config.parser_options())
    }

    /// Lint every source and collect the findings.
    ///
    /// A source that fails to parse gets a single `parser-error` message and
    /// linting continues with the next one.
    #[must_use]
    pub fn lint(&self, sources: &[Source]) -> Report {
        let reporter = Rc::new(RefCell::new(Reporter::new()));
        for source in sources {
            self.lint_source(source, &reporter);
        }
        reporter.borrow().save(sources)
    }

    fn lint_source(&self, source: &Source, reporter: &Rc<RefCell<Reporter>>) {
        log::debug!(target: "tagwise::engine", "linting {}", source.filename);
        reporter.borrow_mut().add_file(&source.filename);

        let parser = self.instantiate_parser();
        let events = parser.events();
        for plugin in self.config.plugins() {
            plugin.setup(source, events);
        }

        let contexts: Vec<RuleContext> = self
            .config
            .rules()
            .iter()
            .map(|configured| {
                RuleContext::new(
                    configured.name.clone(),
                    configured.severity,
                    events,
                    Rc::clone(reporter),
                    Arc::clone(self.config.meta()),
                )
            })
            .collect();

        directive::install(events, &contexts, reporter);
        for (configured, ctx) in self.config.rules().iter().zip(&contexts) {
            configured.rule.setup(ctx);
        }

        if let Err(err) = parser.parse(source) {
            log::debug!(target: "tagwise::engine", "{}: {err}", source.filename);
            reporter
                .borrow_mut()
                .add("parser-error", Severity::Error, err.to_string(), err.location(), None);
        }
    }

    /// Documentation for a configured rule, optionally for a specific
    /// message's `context`. `None` if the rule is not configured.
    #[must_use]
    pub fn get_rule_documentation(&self, rule_id: &str, context: Option<&Value>) -> Option<RuleDocumentation> {
        self.config
            .rule(rule_id)
            .map(|configured| configured.rule.documentation(context))
    }
}
