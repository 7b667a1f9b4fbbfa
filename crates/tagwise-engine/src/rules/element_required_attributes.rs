use serde_json::{Value, json};
use tagwise_html::Event;

use crate::rule::{Rule, RuleContext, RuleDocumentation};

/// Elements must carry the attributes listed in `requiredAttributes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementRequiredAttributes;

impl Rule for ElementRequiredAttributes {
    fn documentation(&self, context: Option<&Value>) -> RuleDocumentation {
        match context {
            Some(context) => RuleDocumentation::new(format!(
                "The <{}> element is required to have a \"{}\" attribute.",
                context["element"].as_str().unwrap_or_default(),
                context["attribute"].as_str().unwrap_or_default()
            )),
            None => RuleDocumentation::new("Element is missing a required attribute"),
        }
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("tag-ready", |ctx, event, tree| {
            let Event::TagReady { target, .. } = event else {
                return;
            };
            let Some(element) = tree.as_element(*target) else {
                return;
            };
            let Some(meta) = &element.meta else {
                return;
            };
            for attribute in &meta.required_attributes {
                if element.has_attribute(attribute) {
                    continue;
                }
                let context = json!({ "element": element.tag_name, "attribute": attribute });
                ctx.report_with_context(
                    tree,
                    Some(*target),
                    format!("{} is missing required \"{attribute}\" attribute", element.annotated_name()),
                    None,
                    context,
                );
            }
        });
    }
}
