use serde_json::Value;

use crate::rule::{Rule, RuleContext, RuleDocumentation};
use crate::validator::validate_occurrences;

/// Elements marked `tag?` in their parent's content model may appear once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementPermittedOccurrences;

impl Rule for ElementPermittedOccurrences {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("Some elements may only be used a fixed number of times in given context.")
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("dom-ready", |ctx, _, tree| {
            for node in tree.descendants(tree.root()) {
                let Some(element) = tree.as_element(node) else {
                    continue;
                };
                let Some(parent) = tree.parent(node) else {
                    continue;
                };
                let Some(parent_element) = tree.as_element(parent) else {
                    continue;
                };
                let Some(meta) = &parent_element.meta else {
                    continue;
                };

                let siblings: Vec<_> = tree
                    .child_elements(parent)
                    .filter(|&sibling| tree.as_element(sibling).is_some_and(|e| e.is(&element.tag_name)))
                    .collect();
                // The first occurrence is always fine, later ones carry the finding.
                if siblings.len() <= 1 || siblings.first() == Some(&node) {
                    continue;
                }
                if !validate_occurrences(tree, node, meta.permitted_content.as_deref(), siblings.len()) {
                    ctx.report(
                        tree,
                        Some(node),
                        format!(
                            "Element <{}> can only appear once under {}",
                            element.tag_name,
                            parent_element.annotated_name()
                        ),
                    );
                }
            }
        });
    }
}
