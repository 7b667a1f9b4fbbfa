//! Tree construction.
//!
//! The [`Parser`] pulls tokens from the tokenizer one at a time, maintains
//! the stack of open elements and publishes an [`Event`](crate::Event) for
//! every structural step.

mod core;
mod error;

use std::sync::Arc;

use tagwise_dom::DomTree;
use tagwise_meta::MetaTable;

pub use error::ParseError;

use crate::event::{Event, EventHandler, Subscription};
use crate::source::Source;

/// Tree builder options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Fail when an element is still open at the end of the input.
    pub strict_close: bool,
}

/// Builds trees from sources and publishes parse events.
///
/// A parser can be reused for any number of sources; listeners registered on
/// [`events`](Self::events) see the events of every parse.
#[derive(Debug)]
pub struct Parser {
    meta: Arc<MetaTable>,
    options: ParserOptions,
    events: EventHandler,
}

impl Parser {
    /// Create a parser that resolves element metadata from `meta`.
    #[must_use]
    pub fn new(meta: Arc<MetaTable>, options: ParserOptions) -> Self {
        Self {
            meta,
            options,
            events: EventHandler::new(),
        }
    }

    /// The metadata table elements are resolved against.
    #[must_use]
    pub fn meta(&self) -> &MetaTable {
        &self.meta
    }

    /// The event hub.
    #[must_use]
    pub const fn events(&self) -> &EventHandler {
        &self.events
    }

    /// Shorthand for `self.events().on(names, callback)`.
    pub fn on(
        &self,
        names: &str,
        callback: impl FnMut(&str, &Event, &mut DomTree) + 'static,
    ) -> Subscription {
        self.events.on(names, callback)
    }

    /// Parse `source` into a tree, publishing events along the way.
    pub fn parse(&self, source: &Source) -> Result<DomTree, ParseError> {
        core::TreeBuilder::new(&self.meta, self.options, &self.events, source).run()
    }
}
