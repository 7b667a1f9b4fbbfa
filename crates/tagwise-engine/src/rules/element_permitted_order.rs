use serde_json::Value;

use crate::rule::{Rule, RuleContext, RuleDocumentation};
use crate::validator::validate_order;

/// Children must follow their parent's `permittedOrder`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementPermittedOrder;

impl Rule for ElementPermittedOrder {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("Some elements has a specific order the children must use.")
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("dom-ready", |ctx, _, tree| {
            for node in tree.descendants(tree.root()) {
                let Some(rules) = tree
                    .as_element(node)
                    .and_then(|e| e.meta.as_ref())
                    .and_then(|meta| meta.permitted_order.as_deref())
                else {
                    continue;
                };
                let children: Vec<_> = tree.child_elements(node).collect();
                let _ = validate_order(tree, &children, Some(rules), |child, previous| {
                    let name = |id| tree.as_element(id).map_or("", |e| e.tag_name.as_str());
                    let previous = previous.map(name).unwrap_or_default();
                    ctx.report(
                        tree,
                        Some(child),
                        format!("Element <{}> must be used before <{previous}> in this context", name(child)),
                    );
                });
            }
        });
    }
}
