use serde_json::Value;
use tagwise_html::Event;

use crate::rule::{Rule, RuleContext, RuleDocumentation};

/// Flags elements the metadata table knows nothing about.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUnknownElements;

impl Rule for NoUnknownElements {
    fn documentation(&self, context: Option<&Value>) -> RuleDocumentation {
        let element = context
            .and_then(Value::as_str)
            .map(|name| format!(" <{name}>"))
            .unwrap_or_default();
        RuleDocumentation::new(format!(
            "An unknown element{element} was used. If this is a custom element you need to supply element metadata for it."
        ))
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("tag-start", |ctx, event, tree| {
            let Event::TagStart { target, .. } = event else {
                return;
            };
            let Some(element) = tree.as_element(*target) else {
                return;
            };
            if element.meta.is_none() {
                let name = element.qualified_name();
                ctx.report_with_context(
                    tree,
                    Some(*target),
                    format!("Unknown element <{name}>"),
                    None,
                    Value::String(name),
                );
            }
        });
    }
}
