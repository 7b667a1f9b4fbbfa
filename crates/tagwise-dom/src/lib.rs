//! Document tree for the tagwise linter.
//!
//! This crate provides an arena-based tree of the parsed document: a
//! document root, elements and text. Elements carry everything the checks
//! need (attributes with their locations, how the element was closed, the
//! resolved [`MetaElement`](tagwise_meta::MetaElement) and per-node rule
//! suppression).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. The
//! tree is append-only while it is built and read-only afterwards, so a
//! finished tree can be shared between threads.

pub mod category;
pub mod dump;
pub mod element;
pub mod selector;

use std::sync::atomic::{AtomicU64, Ordering};

use tagwise_common::Location;

pub use dump::dump_tree;
pub use element::{Attribute, AttributeValue, DynamicValue, ElementData, NodeClosed};
pub use selector::{Selector, SelectorError};

/// Source of unique node identifiers, shared by every tree in the process.
static NEXT_UNIQUE: AtomicU64 = AtomicU64::new(1);

fn next_unique() -> u64 {
    NEXT_UNIQUE.fetch_add(1, Ordering::Relaxed)
}

/// A type-safe index into the tree.
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A node with its relationships.
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is.
    pub node_type: NodeType,

    /// Parent node; `None` only for the document root.
    pub parent: Option<NodeId>,

    /// Children in document order.
    pub children: Vec<NodeId>,

    /// The node immediately following this one in its parent's children.
    pub next_sibling: Option<NodeId>,

    /// The node immediately preceding this one in its parent's children.
    pub prev_sibling: Option<NodeId>,

    /// Where the node starts in the source. For elements this is the start tag.
    pub location: Location,

    /// Identifier that strictly increases across every node created in this process.
    pub unique: u64,
}

/// Node variants.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document root. Never closed, never void.
    Document,
    /// An element.
    Element(ElementData),
    /// Character data between tags.
    Text(String),
}

/// Arena-based document tree with O(1) node access and traversal.
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. This provides:
/// - O(1) access to any node by NodeId
/// - O(1) parent/sibling traversal
/// - No borrowing issues (indices instead of references)
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by NodeId.
    /// The Document node is always at index 0 (NodeId::ROOT).
    nodes: Vec<Node>,

    /// Value of the `<!doctype ...>` declaration, if one was seen.
    doctype: Option<String>,
}

impl DomTree {
    /// Create a new tree with just the Document node, located at `location`.
    #[must_use]
    pub fn new(location: Location) -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            location,
            unique: next_unique(),
        };
        Self {
            nodes: vec![document],
            doctype: None,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The `<!doctype>` value, if any.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Record the `<!doctype>` value.
    pub fn set_doctype(&mut self, value: impl Into<String>) {
        self.doctype = Some(value.into());
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType, location: Location) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            location,
            unique: next_unique(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`, updating all relationships.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        // Get the current last child of parent (if any) to set up sibling links
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// Append text to `parent`, merging it into a trailing text node if there is one.
    pub fn append_text(&mut self, parent: NodeId, text: &str, location: Location) -> NodeId {
        if let Some(last) = self.last_child(parent)
            && let Some(node) = self.nodes.get_mut(last.0)
            && let NodeType::Text(existing) = &mut node.node_type
        {
            existing.push_str(text);
            node.location.extend_to(&location);
            return last;
        }
        let id = self.alloc(NodeType::Text(text.to_string()), location);
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Child nodes that are elements.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.as_element(child).is_some())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// The closest following sibling that is an element.
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.following_siblings(id).find(|&sibling| self.as_element(sibling).is_some())
    }

    /// The closest preceding sibling that is an element.
    #[must_use]
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.preceding_siblings(id).find(|&sibling| self.as_element(sibling).is_some())
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
            forward: false,
        }
    }

    /// Iterate over following siblings (from immediately after to last child).
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.next_sibling(id),
            forward: true,
        }
    }

    /// Element descendants of `id` in depth-first (document) order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        DescendantIterator { tree: self, stack }
    }

    /// First element (depth-first from the root) satisfying `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(NodeId, &ElementData) -> bool) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .find(|&id| self.as_element(id).is_some_and(|element| predicate(id, element)))
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of all text descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for &child in self.children(id) {
            if let Some(s) = self.as_text(child) {
                text.push_str(s);
            } else if self.as_element(child).is_some() {
                text.push_str(&self.text_content(child));
            }
        }
        text
    }

    /// Location of a node.
    #[must_use]
    pub fn location(&self, id: NodeId) -> Option<&Location> {
        self.get(id).map(|n| &n.location)
    }

    /// Unique identifier of a node.
    #[must_use]
    pub fn unique(&self, id: NodeId) -> Option<u64> {
        self.get(id).map(|n| n.unique)
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over the siblings of a node in one direction.
pub struct SiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
    forward: bool,
}

impl Iterator for SiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = if self.forward {
            self.tree.next_sibling(id)
        } else {
            self.tree.prev_sibling(id)
        };
        Some(id)
    }
}

/// Depth-first iterator over element descendants.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if self.tree.as_element(id).is_none() {
                continue;
            }
            self.stack.extend(self.tree.children(id).iter().rev().copied());
            return Some(id);
        }
        None
    }
}
