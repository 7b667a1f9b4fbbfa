//! Events published while a document is parsed.
//!
//! The tree builder announces everything it does through an
//! [`EventHandler`]; checks subscribe to the events they care about instead
//! of walking the tree themselves.

mod handler;

pub use handler::{EventHandler, Subscription, WeakEventHandler};

use serde::Serialize;
use strum_macros::Display;
use tagwise_common::Location;
use tagwise_dom::{AttributeValue, NodeId};

/// Why an element stopped being the active element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CloseKind {
    /// Its own end tag.
    EndTag,
    /// A following start tag listed in its `implicitClosed` metadata, or an
    /// ancestor's end tag when the element's own end tag is optional.
    Implicit,
    /// The end tag of an ancestor, for an element whose end tag is required.
    Ancestor,
    /// It is a void element.
    Void,
    /// It was written as `<tag/>`.
    SelfClosed,
    /// The input ended while it was open.
    EndOfDocument,
    /// An end tag matched no open element; nothing was closed.
    Unmatched,
}

/// An event and its payload.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Event {
    /// Parsing is about to start.
    DomLoad {
        /// Start of the source.
        location: Location,
    },
    /// The tree is complete.
    DomReady {
        /// End of the source.
        location: Location,
    },
    /// `<!DOCTYPE ...>`
    Doctype {
        /// The keyword as written.
        tag: String,
        /// The doctype value, e.g. `html`.
        value: String,
        /// Location of the value.
        value_location: Location,
        /// Location of the opening `<!DOCTYPE`.
        location: Location,
    },
    /// An element was created and appended to its parent.
    TagStart {
        /// The new element.
        target: NodeId,
        /// Its parent.
        parent: NodeId,
        /// Location of `<tag`.
        location: Location,
    },
    /// One attribute of the element announced by the preceding `tag-start`.
    Attr {
        /// Owning element.
        target: NodeId,
        /// Attribute name as written.
        key: String,
        /// Value, absent for boolean attributes.
        value: Option<AttributeValue>,
        /// Quote character around the value.
        quote: Option<char>,
        /// Key of the attribute this one was derived from.
        original_attribute: Option<String>,
        /// Location of the name.
        key_location: Location,
        /// Location of the value.
        value_location: Option<Location>,
        /// Location of the name.
        location: Location,
    },
    /// All `attr` events of an element have been published.
    TagReady {
        /// The element.
        target: NodeId,
        /// Location of `<tag`.
        location: Location,
    },
    /// An element was closed, or an end tag matched nothing.
    TagEnd {
        /// The element that was closed, `None` for an unmatched end tag.
        target: Option<NodeId>,
        /// The element that is active afterwards.
        previous: NodeId,
        /// Name written in the end tag, if the close came from one.
        tag_name: Option<String>,
        /// How the element was closed.
        kind: CloseKind,
        /// Location of the end tag, the start tag's `>` or the end of input.
        location: Location,
    },
    /// An element and its whole subtree are complete.
    ElementReady {
        /// The element.
        target: NodeId,
        /// Location of `<tag`.
        location: Location,
    },
    /// Whitespace-only character data.
    Whitespace {
        /// The whitespace.
        text: String,
        /// Its location.
        location: Location,
    },
    /// A conditional comment.
    Conditional {
        /// The condition, e.g. `if IE`.
        condition: String,
        /// Element the comment appears in.
        parent: NodeId,
        /// Location of the comment.
        location: Location,
    },
    /// A `[html-validate-...]` directive comment.
    Directive {
        /// The action, e.g. `disable-next`.
        action: String,
        /// Everything after the action.
        data: String,
        /// The directive text between the brackets.
        comment: String,
        /// Element the comment appears in.
        parent: NodeId,
        /// Location of the comment.
        location: Location,
    },
}

impl Event {
    /// The name listeners subscribe to.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DomLoad { .. } => "dom-load",
            Self::DomReady { .. } => "dom-ready",
            Self::Doctype { .. } => "doctype",
            Self::TagStart { .. } => "tag-start",
            Self::Attr { .. } => "attr",
            Self::TagReady { .. } => "tag-ready",
            Self::TagEnd { .. } => "tag-end",
            Self::ElementReady { .. } => "element-ready",
            Self::Whitespace { .. } => "whitespace",
            Self::Conditional { .. } => "conditional",
            Self::Directive { .. } => "directive",
        }
    }

    /// Where the event happened.
    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::DomLoad { location }
            | Self::DomReady { location }
            | Self::Doctype { location, .. }
            | Self::TagStart { location, .. }
            | Self::Attr { location, .. }
            | Self::TagReady { location, .. }
            | Self::TagEnd { location, .. }
            | Self::ElementReady { location, .. }
            | Self::Whitespace { location, .. }
            | Self::Conditional { location, .. }
            | Self::Directive { location, .. } => location,
        }
    }

    /// The element the event is about, if any.
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        match self {
            Self::TagStart { target, .. }
            | Self::Attr { target, .. }
            | Self::TagReady { target, .. }
            | Self::ElementReady { target, .. } => Some(*target),
            Self::TagEnd { target, .. } => *target,
            _ => None,
        }
    }
}
