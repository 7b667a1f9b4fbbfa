//! Inline `[html-validate-*]` directives.
//!
//! Directives change which rules run for the part of the document that
//! follows them. Each one acts at two levels:
//!
//! - the rule's own enabled flag, which gates event delivery
//! - the suppression set of every element opened afterwards, which is what
//!   whole-tree checks at `dom-ready` consult
//!
//! `disable-block` scopes are kept on an explicit stack and popped when the
//! element that contained the directive is closed.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tagwise_common::warning::Warnings;
use tagwise_dom::{ElementData, NodeId};
use tagwise_html::{Event, EventHandler};

use crate::config::Severity;
use crate::reporter::Reporter;
use crate::rule::RuleContext;

/// A `disable-block` scope.
#[derive(Debug)]
struct Block {
    /// Element the directive appeared in; the block ends when it closes.
    parent: NodeId,
    rules: Vec<String>,
}

struct DirectiveState {
    rules: HashMap<String, RuleContext>,
    /// Persistent `enable`/`disable` state applied to every new element.
    overrides: HashMap<String, bool>,
    disabled: HashSet<String>,
    blocks: Vec<Block>,
    /// Rules disabled by `disable-next` until the next tag or attribute event.
    next: Vec<String>,
    warnings: Warnings,
}

impl DirectiveState {
    fn new(rules: &[RuleContext]) -> Self {
        Self {
            rules: rules.iter().map(|ctx| (ctx.name().to_string(), ctx.clone())).collect(),
            overrides: HashMap::new(),
            disabled: HashSet::new(),
            blocks: Vec::new(),
            next: Vec::new(),
            warnings: Warnings::new(),
        }
    }

    /// Keep configured rule names, warn about the rest.
    fn resolve(&mut self, names: Vec<String>) -> Vec<String> {
        let (known, unknown): (Vec<String>, Vec<String>) =
            names.into_iter().partition(|name| self.rules.contains_key(name));
        for name in unknown {
            let _ = self
                .warnings
                .warn_once("directive", &format!("directive references unknown rule '{name}'"));
        }
        known
    }

    fn set_enabled(&self, names: &[String], enabled: bool) {
        for name in names {
            if let Some(ctx) = self.rules.get(name) {
                ctx.set_enabled(enabled);
            }
        }
    }

    fn enable(&mut self, names: &[String]) {
        for name in names {
            if let Some(ctx) = self.rules.get(name) {
                ctx.set_enabled(true);
                if ctx.severity() == Severity::Off {
                    ctx.set_severity(Severity::Error);
                }
            }
            let _ = self.disabled.remove(name);
            let _ = self.overrides.insert(name.clone(), true);
        }
    }

    fn disable(&mut self, names: &[String]) {
        self.set_enabled(names, false);
        for name in names {
            let _ = self.disabled.insert(name.clone());
            let _ = self.overrides.insert(name.clone(), false);
        }
    }

    fn disable_block(&mut self, parent: NodeId, names: Vec<String>) {
        self.set_enabled(&names, false);
        self.blocks.push(Block { parent, rules: names });
    }

    fn disable_next(&mut self, names: Vec<String>) {
        self.set_enabled(&names, false);
        self.next.extend(names);
    }

    /// Re-enable `names` unless something else still keeps them disabled.
    fn restore(&self, names: &[String]) {
        for name in names {
            let blocked = self.blocks.iter().any(|block| block.rules.contains(name));
            if !blocked
                && !self.disabled.contains(name)
                && let Some(ctx) = self.rules.get(name)
            {
                ctx.set_enabled(true);
            }
        }
    }

    fn element_opened(&self, element: &mut ElementData) {
        for (name, enabled) in &self.overrides {
            if *enabled {
                element.enable_rule(name);
            } else {
                element.disable_rule(name);
            }
        }
        for block in &self.blocks {
            element.disable_rules(&block.rules);
        }
        element.disable_rules(&self.next);
    }

    fn element_closed(&mut self, target: NodeId) {
        while self.blocks.last().is_some_and(|block| block.parent == target) {
            if let Some(block) = self.blocks.pop() {
                log::debug!(target: "tagwise::directive", "disable-block for {:?} ends", block.rules);
                self.restore(&block.rules);
            }
        }
    }
}

/// Rule names in a directive's data: comma-separated, with an optional
/// `-- comment` at the end.
pub(crate) fn parse_rule_list(data: &str) -> Vec<String> {
    let list = data.split_once("--").map_or(data, |(list, _)| list);
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Once the next tag or attribute event has been delivered, lift the
/// pending `disable-next` rules.
fn schedule_next_reset(events: &EventHandler, state: &Rc<RefCell<DirectiveState>>) {
    let state = Rc::clone(state);
    let handle = events.downgrade();
    let _ = events.once("tag-start, tag-end, attr", move |_, _, _| {
        let names = std::mem::take(&mut state.borrow_mut().next);
        let Some(events) = handle.upgrade() else {
            return;
        };
        let state = Rc::clone(&state);
        events.defer(move |_| state.borrow().restore(&names));
    });
}

/// Subscribe directive handling to `events`.
///
/// Must run before rules subscribe, so that elements carry their
/// suppression sets by the time rules see them.
pub(crate) fn install(events: &EventHandler, rules: &[RuleContext], reporter: &Rc<RefCell<Reporter>>) {
    let state = Rc::new(RefCell::new(DirectiveState::new(rules)));

    let opened = Rc::clone(&state);
    let _ = events.on("tag-start", move |_, event, tree| {
        if let Some(element) = event.target().and_then(|target| tree.as_element_mut(target)) {
            opened.borrow().element_opened(element);
        }
    });

    let closed = Rc::clone(&state);
    let _ = events.on("tag-end", move |_, event, _| {
        if let Event::TagEnd {
            target: Some(target), ..
        } = event
        {
            closed.borrow_mut().element_closed(*target);
        }
    });

    let handle = events.downgrade();
    let reporter = Rc::clone(reporter);
    let _ = events.on("directive", move |_, event, _| {
        let Event::Directive {
            action,
            data,
            parent,
            location,
            ..
        } = event
        else {
            return;
        };
        log::debug!(target: "tagwise::directive", "{action} {data}");

        let names = state.borrow_mut().resolve(parse_rule_list(data));
        match action.as_str() {
            "enable" => state.borrow_mut().enable(&names),
            "disable" => state.borrow_mut().disable(&names),
            "disable-block" => state.borrow_mut().disable_block(*parent, names),
            "disable-next" => {
                state.borrow_mut().disable_next(names);
                if let Some(events) = handle.upgrade() {
                    schedule_next_reset(&events, &state);
                }
            }
            _ => reporter.borrow_mut().add(
                "parser-error",
                Severity::Error,
                format!("Unknown directive \"{action}\""),
                location,
                None,
            ),
        }
    });
}
