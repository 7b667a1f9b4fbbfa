use serde_json::{Value, json};

use crate::rule::{Rule, RuleContext, RuleDocumentation};
use crate::validator::validate_required_content;

/// Elements with `requiredContent` must contain those elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementRequiredContent;

impl Rule for ElementRequiredContent {
    fn documentation(&self, context: Option<&Value>) -> RuleDocumentation {
        match context {
            Some(context) => RuleDocumentation::new(format!(
                "The `<{}>` element requires a `<{}>` to be present as content.",
                context["element"].as_str().unwrap_or_default(),
                context["missing"].as_str().unwrap_or_default()
            )),
            None => RuleDocumentation::new("Some elements has requirements on content that must be present."),
        }
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("dom-ready", |ctx, _, tree| {
            for node in tree.descendants(tree.root()) {
                let Some(element) = tree.as_element(node) else {
                    continue;
                };
                let Some(meta) = &element.meta else {
                    continue;
                };
                for missing in validate_required_content(tree, node, meta.required_content.as_deref()) {
                    let context = json!({ "element": element.tag_name, "missing": missing });
                    ctx.report_with_context(
                        tree,
                        Some(node),
                        format!("{} element must have <{missing}> as content", element.annotated_name()),
                        None,
                        context,
                    );
                }
            }
        });
    }
}
