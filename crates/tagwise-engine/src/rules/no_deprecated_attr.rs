use serde_json::Value;
use tagwise_html::Event;

use crate::rule::{Rule, RuleContext, RuleDocumentation};

/// Flags attributes listed in an element's `deprecatedAttributes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeprecatedAttr;

impl Rule for NoDeprecatedAttr {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("HTML5 deprecated many old attributes.")
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("attr", |ctx, event, tree| {
            let Event::Attr { target, key, .. } = event else {
                return;
            };
            let Some(element) = tree.as_element(*target) else {
                return;
            };
            if element.meta.as_ref().is_some_and(|meta| meta.is_deprecated_attribute(key)) {
                ctx.report(
                    tree,
                    Some(*target),
                    format!(
                        "Attribute \"{}\" is deprecated on {} element",
                        key.to_ascii_lowercase(),
                        element.annotated_name()
                    ),
                );
            }
        });
    }
}
