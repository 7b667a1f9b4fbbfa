//! The rule interface and the per-source context rules run in.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tagwise_common::Location;
use tagwise_dom::{DomTree, NodeId};
use tagwise_html::{Event, EventHandler, WeakEventHandler};
use tagwise_meta::MetaTable;

use crate::ConfigError;
use crate::config::Severity;
use crate::reporter::Reporter;

/// Help text for a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDocumentation {
    /// What the rule checks, or what is wrong with a specific finding.
    pub description: String,
}

impl RuleDocumentation {
    /// Documentation with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A check run against every source.
///
/// Rules are built once per configuration and shared between sources, so
/// per-source state belongs in the closures registered from [`setup`](Self::setup).
pub trait Rule: Send + Sync {
    /// Help text. `context` is the context attached to one of the rule's
    /// messages, when documenting that specific message.
    fn documentation(&self, context: Option<&Value>) -> RuleDocumentation;

    /// Subscribe to the events the rule needs.
    fn setup(&self, ctx: &RuleContext);
}

/// Deserialize rule options, using `T::default()` for a missing value.
pub fn parse_options<T: DeserializeOwned + Default>(rule: &str, options: &Value) -> Result<T, ConfigError> {
    if options.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(options.clone()).map_err(|err| ConfigError::InvalidRuleOptions {
        rule: rule.to_string(),
        message: err.to_string(),
    })
}

struct RuleState {
    name: String,
    enabled: Cell<bool>,
    severity: Cell<Severity>,
    event_location: RefCell<Option<Location>>,
}

/// A rule's view of the source being linted.
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct RuleContext {
    state: Rc<RuleState>,
    events: WeakEventHandler,
    reporter: Rc<RefCell<Reporter>>,
    meta: Arc<MetaTable>,
}

impl RuleContext {
    /// Create the context for one rule and one source.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        severity: Severity,
        events: &EventHandler,
        reporter: Rc<RefCell<Reporter>>,
        meta: Arc<MetaTable>,
    ) -> Self {
        Self {
            state: Rc::new(RuleState {
                name: name.into(),
                enabled: Cell::new(true),
                severity: Cell::new(severity),
                event_location: RefCell::new(None),
            }),
            events: events.downgrade(),
            reporter,
            meta,
        }
    }

    /// The rule's configured name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Current severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.state.severity.get()
    }

    /// Change the severity, e.g. when a directive enables an `off` rule.
    pub fn set_severity(&self, severity: Severity) {
        self.state.severity.set(severity);
    }

    /// Turn delivery of events to this rule on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.state.enabled.set(enabled);
    }

    /// Whether the rule currently receives events.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.enabled.get() && self.severity() >= Severity::Warn
    }

    /// Element metadata for the source.
    #[must_use]
    pub fn meta(&self) -> &MetaTable {
        &self.meta
    }

    /// Subscribe to events. Deliveries are skipped while the rule is disabled.
    pub fn on(&self, names: &str, mut callback: impl FnMut(&Self, &Event, &DomTree) + 'static) {
        let Some(events) = self.events.upgrade() else {
            return;
        };
        let ctx = self.clone();
        let _ = events.on(names, move |_, event, tree| {
            if !ctx.is_enabled() {
                return;
            }
            // Findings from a whole-tree walk are located at their element.
            *ctx.state.event_location.borrow_mut() = match event {
                Event::DomReady { .. } => None,
                _ => Some(event.location().clone()),
            };
            callback(&ctx, event, &*tree);
        });
    }

    /// Report a finding at the location of the event being handled.
    pub fn report(&self, tree: &DomTree, node: Option<NodeId>, message: impl Into<String>) {
        self.emit(tree, node, message.into(), None, None);
    }

    /// Report a finding at an explicit location.
    pub fn report_at(&self, tree: &DomTree, node: Option<NodeId>, message: impl Into<String>, location: &Location) {
        self.emit(tree, node, message.into(), Some(location), None);
    }

    /// Report a finding with context for [`Rule::documentation`].
    pub fn report_with_context(
        &self,
        tree: &DomTree,
        node: Option<NodeId>,
        message: impl Into<String>,
        location: Option<&Location>,
        context: Value,
    ) {
        self.emit(tree, node, message.into(), location, Some(context));
    }

    fn emit(&self, tree: &DomTree, node: Option<NodeId>, message: String, location: Option<&Location>, context: Option<Value>) {
        if !self.is_enabled() {
            return;
        }
        let suppressed = node
            .and_then(|node| tree.as_element(node))
            .is_some_and(|element| !element.rule_enabled(self.name()));
        if suppressed {
            return;
        }

        let location = location
            .cloned()
            .or_else(|| self.state.event_location.borrow().clone())
            .or_else(|| node.and_then(|node| tree.location(node)).cloned())
            .or_else(|| tree.location(tree.root()).cloned());
        let Some(location) = location else {
            log::warn!(target: "tagwise::rule", "{}: dropping message without location: {message}", self.name());
            return;
        };
        self.reporter
            .borrow_mut()
            .add(self.name(), self.severity(), message, &location, context);
    }
}

/// Stand-in for a configured rule without a definition.
///
/// Reports once per source instead of failing the run.
#[derive(Debug, Clone)]
pub struct MissingRule {
    name: String,
}

impl MissingRule {
    /// A stand-in for the rule called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Rule for MissingRule {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new(format!("Rule '{}' was not found", self.name))
    }

    fn setup(&self, ctx: &RuleContext) {
        let message = format!("Definition for rule '{}' was not found", self.name);
        ctx.on("dom-load", move |ctx, _, tree| ctx.report(tree, None, message.clone()));
    }
}
