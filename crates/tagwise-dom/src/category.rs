//! Content-category evaluation.
//!
//! Static flags are read straight from metadata. Dynamic flags are evaluated
//! the first time they are read and the result is cached on the element, so
//! later reads see the same answer even if the tree has grown since.

use tagwise_meta::{Category, ExpressionTarget, PropertyValue};

use crate::{DomTree, NodeId};

/// An element viewed in the context of its tree.
struct ElementRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl ExpressionTarget for ElementRef<'_> {
    fn has_attribute(&self, key: &str) -> bool {
        self.tree.as_element(self.id).is_some_and(|e| e.has_attribute(key))
    }

    fn attribute_value(&self, key: &str) -> Option<&str> {
        self.tree.as_element(self.id).and_then(|e| e.attribute_value(key))
    }

    fn has_ancestor(&self, tag_name: &str) -> bool {
        self.tree
            .ancestors(self.id)
            .any(|ancestor| self.tree.as_element(ancestor).is_some_and(|e| e.is(tag_name)))
    }
}

impl DomTree {
    /// Whether the element belongs to `category`.
    ///
    /// Elements without metadata, text and the document root belong to no
    /// category.
    #[must_use]
    pub fn is_category(&self, id: NodeId, category: Category) -> bool {
        let Some(element) = self.as_element(id) else {
            return false;
        };
        let Some(meta) = &element.meta else {
            return false;
        };
        match meta.category(category) {
            PropertyValue::Static(value) => *value,
            PropertyValue::Unset => false,
            PropertyValue::Dynamic(expr) => *element
                .category_cell(category)
                .get_or_init(|| expr.evaluate(&ElementRef { tree: self, id })),
        }
    }
}
