use serde_json::{Value, json};
use tagwise_dom::{DomTree, NodeId};
use tagwise_meta::{PermittedEntry, Transparent};

use crate::rule::{Rule, RuleContext, RuleDocumentation};
use crate::validator::{transparent_children, validate_permitted};

/// Children must be permitted by their parent's `permittedContent` and by
/// the `permittedDescendants` of every ancestor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementPermittedContent;

fn tag(tree: &DomTree, node: NodeId) -> String {
    tree.as_element(node).map(|e| e.annotated_name()).unwrap_or_default()
}

/// Check `node` against `rules`; transparent elements also get their
/// children checked as if they were direct children of `parent`.
fn check_content(ctx: &RuleContext, tree: &DomTree, node: NodeId, parent: NodeId, rules: Option<&[PermittedEntry]>) -> bool {
    if !validate_permitted(tree, node, rules) {
        let child = tag(tree, node);
        let parent = tag(tree, parent);
        let context = json!({ "kind": "content", "parent": parent, "child": child });
        ctx.report_with_context(
            tree,
            Some(node),
            format!("{child} element is not permitted as content under {parent}"),
            None,
            context,
        );
        return true;
    }

    let transparent = tree
        .as_element(node)
        .and_then(|e| e.meta.as_ref())
        .map_or(&Transparent::No, |meta| &meta.transparent);
    transparent_children(tree, node, transparent)
        .into_iter()
        .map(|child| check_content(ctx, tree, child, parent, rules))
        .fold(false, |found, reported| found || reported)
}

fn check_descendant(ctx: &RuleContext, tree: &DomTree, node: NodeId) -> bool {
    for ancestor in tree.ancestors(node).take_while(|&id| id != NodeId::ROOT) {
        let Some(rules) = tree
            .as_element(ancestor)
            .and_then(|e| e.meta.as_ref())
            .and_then(|meta| meta.permitted_descendants.as_deref())
        else {
            continue;
        };
        if validate_permitted(tree, node, Some(rules)) {
            continue;
        }
        let child = tag(tree, node);
        let ancestor = tag(tree, ancestor);
        let context = json!({ "kind": "descendant", "ancestor": ancestor, "child": child });
        ctx.report_with_context(
            tree,
            Some(node),
            format!("{child} element is not permitted as a descendant of {ancestor}"),
            None,
            context,
        );
        return true;
    }
    false
}

impl Rule for ElementPermittedContent {
    fn documentation(&self, context: Option<&Value>) -> RuleDocumentation {
        let child = context.and_then(|c| c["child"].as_str()).unwrap_or_default();
        match context.and_then(|c| c["kind"].as_str()) {
            Some("content") => RuleDocumentation::new(format!(
                "The `{child}` element is not permitted as content under the parent `{}` element.",
                context.and_then(|c| c["parent"].as_str()).unwrap_or_default()
            )),
            Some("descendant") => RuleDocumentation::new(format!(
                "The `{child}` element is not permitted as a descendant of the `{}` element.",
                context.and_then(|c| c["ancestor"].as_str()).unwrap_or_default()
            )),
            _ => RuleDocumentation::new(
                "Some elements has restrictions on what content is allowed.\nThis can include both direct children or descendant elements.",
            ),
        }
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("dom-ready", |ctx, _, tree| {
            for node in tree.descendants(tree.root()) {
                let Some(parent) = tree.parent(node) else {
                    continue;
                };
                // Stop at the first finding so one misplaced element gets one message.
                let parent_rules = tree
                    .as_element(parent)
                    .and_then(|e| e.meta.as_ref())
                    .map(|meta| meta.permitted_content.as_deref());
                if let Some(rules) = parent_rules
                    && check_content(ctx, tree, node, parent, rules)
                {
                    continue;
                }
                let _ = check_descendant(ctx, tree, node);
            }
        });
    }
}
