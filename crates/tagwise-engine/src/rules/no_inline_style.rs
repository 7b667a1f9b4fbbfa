use serde_json::Value;
use tagwise_html::Event;

use crate::rule::{Rule, RuleContext, RuleDocumentation};

/// Disallows the `style` attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInlineStyle;

impl Rule for NoInlineStyle {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("Inline style is a sign of unstructured CSS. Use class or ID with a separate stylesheet.")
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("attr", |ctx, event, tree| {
            if let Event::Attr { target, key, .. } = event
                && key.eq_ignore_ascii_case("style")
            {
                ctx.report(tree, Some(*target), "Inline style is not allowed");
            }
        });
    }
}
