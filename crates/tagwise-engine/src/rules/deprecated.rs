use serde_json::{Value, json};
use tagwise_html::Event;

use crate::rule::{Rule, RuleContext, RuleDocumentation};

/// Flags elements whose metadata marks them deprecated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deprecated;

impl Rule for Deprecated {
    fn documentation(&self, context: Option<&Value>) -> RuleDocumentation {
        let Some(context) = context else {
            return RuleDocumentation::new("This element is deprecated and should not be used in new code.");
        };
        let element = context["element"].as_str().unwrap_or_default();
        let mut text = format!("The <{element}> element is deprecated and should not be used in new code.");
        if let Some(message) = context["message"].as_str() {
            text.push_str("\n\n");
            text.push_str(message);
        }
        RuleDocumentation::new(text)
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("tag-start", |ctx, event, tree| {
            let Event::TagStart { target, .. } = event else {
                return;
            };
            let Some(element) = tree.as_element(*target) else {
                return;
            };
            let Some(deprecation) = element.meta.as_ref().and_then(|meta| meta.deprecated.as_ref()) else {
                return;
            };

            let mut message = format!("<{}> is deprecated", element.tag_name);
            if let Some(reason) = &deprecation.message {
                message.push_str(": ");
                message.push_str(reason);
            }
            let context = json!({
                "element": element.tag_name,
                "message": deprecation.message,
            });
            ctx.report_with_context(tree, Some(*target), message, None, context);
        });
    }
}
