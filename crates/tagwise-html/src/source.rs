//! Input documents and the hooks that let templating integrations rewrite
//! them while the tree is built.

use std::fmt;
use std::sync::Arc;

use tagwise_common::Location;
use tagwise_dom::{Attribute, DomTree, NodeId};
use tagwise_meta::MetaTable;

/// Expands one parsed attribute into zero or more attributes.
///
/// Derived attributes should set [`Attribute::original_attribute`] to the key
/// they came from.
pub type ProcessAttribute = Arc<dyn Fn(Attribute) -> Vec<Attribute> + Send + Sync>;

/// Called for every element after it has been created and before its
/// `tag-start` event.
pub type ProcessElement = Arc<dyn Fn(&mut DomTree, NodeId, &MetaTable) + Send + Sync>;

/// Optional per-source transformations.
#[derive(Clone, Default)]
pub struct SourceHooks {
    /// Rewrites attributes as they are parsed.
    pub process_attribute: Option<ProcessAttribute>,
    /// Post-processes elements as they are created.
    pub process_element: Option<ProcessElement>,
}

impl fmt::Debug for SourceHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHooks")
            .field("process_attribute", &self.process_attribute.is_some())
            .field("process_element", &self.process_element.is_some())
            .finish()
    }
}

/// A chunk of markup to lint.
///
/// The markup may be embedded in a larger file (a template, a component), so
/// the source records where it starts; every location reported for it is
/// relative to that position.
#[derive(Debug, Clone)]
pub struct Source {
    /// Markup text.
    pub data: String,
    /// File the markup belongs to.
    pub filename: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
    /// 0-based byte offset of the first character within the file.
    pub offset: usize,
    /// The untransformed file contents, when `data` was extracted from it.
    pub original_data: Option<String>,
    /// Transformations applied while building the tree.
    pub hooks: SourceHooks,
}

impl Source {
    /// Markup that makes up a whole file.
    #[must_use]
    pub fn new(data: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
            line: 1,
            column: 1,
            offset: 0,
            original_data: None,
            hooks: SourceHooks::default(),
        }
    }

    /// Markup without a backing file, reported as `inline`.
    #[must_use]
    pub fn inline(data: impl Into<String>) -> Self {
        Self::new(data, "inline")
    }

    /// Place the markup at a position inside its file.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize, offset: usize) -> Self {
        self.line = line;
        self.column = column;
        self.offset = offset;
        self
    }

    /// Attach hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: SourceHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Location of the first character, spanning `size` bytes.
    #[must_use]
    pub fn start_location(&self, size: usize) -> Location {
        Location::new(self.filename.clone(), self.line, self.column, self.offset, size)
    }
}
