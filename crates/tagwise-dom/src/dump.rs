//! ASCII tree dump.

use crate::{DomTree, NodeId};

/// Render the element structure of a tree, one line per element.
///
/// ```text
/// (root)
/// └─┬ div#foo
///   └── p.bar
/// ```
#[must_use]
pub fn dump_tree(tree: &DomTree) -> Vec<String> {
    let mut lines = vec!["(root)".to_string()];
    write_children(tree, NodeId::ROOT, 1, &mut lines);
    lines
}

fn write_children(tree: &DomTree, parent: NodeId, level: usize, lines: &mut Vec<String>) {
    let children: Vec<NodeId> = tree.child_elements(parent).collect();
    let count = children.len();
    for (index, child) in children.into_iter().enumerate() {
        let Some(element) = tree.as_element(child) else {
            continue;
        };
        let indent = "  ".repeat(level - 1);
        let branch = if index + 1 < count { '├' } else { '└' };
        let fork = if tree.child_elements(child).next().is_some() { '┬' } else { '─' };

        let mut name = element.tag_name.clone();
        if let Some(id) = element.id() {
            name.push('#');
            name.push_str(id);
        }
        for class in element.classes() {
            name.push('.');
            name.push_str(class);
        }

        lines.push(format!("{indent}{branch}─{fork} {name}"));
        write_children(tree, child, level + 1, lines);
    }
}
