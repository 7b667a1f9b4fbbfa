use serde_json::Value;
use tagwise_html::{CloseKind, Event};

use crate::rule::{Rule, RuleContext, RuleDocumentation};

/// Elements must be closed in the order they were opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloseOrder;

impl Rule for CloseOrder {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("HTML requires elements to be closed in the same order as they were opened.")
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("tag-end", |ctx, event, tree| {
            let Event::TagEnd {
                target, tag_name, kind, ..
            } = event
            else {
                return;
            };

            match kind {
                CloseKind::Unmatched => {
                    // </br> and friends are left to void-style.
                    let is_void = tag_name
                        .as_deref()
                        .and_then(|name| ctx.meta().get_meta_for(name))
                        .is_some_and(|meta| meta.void);
                    if !is_void {
                        ctx.report(tree, None, "Unexpected close-tag, expected opening tag.");
                    }
                }
                CloseKind::EndOfDocument => {
                    let Some(element) = target.and_then(|id| tree.as_element(id)) else {
                        return;
                    };
                    let message = format!(
                        "Missing close-tag, expected '</{}>' but document ended before it was found.",
                        element.tag_name
                    );
                    match target.and_then(|id| tree.location(id)) {
                        Some(location) => ctx.report_at(tree, *target, message, location),
                        None => ctx.report(tree, *target, message),
                    }
                }
                CloseKind::Ancestor => {
                    let Some(element) = target.and_then(|id| tree.as_element(id)) else {
                        return;
                    };
                    let found = tag_name.as_deref().unwrap_or_default();
                    ctx.report(
                        tree,
                        *target,
                        format!(
                            "Mismatched close-tag, expected '</{}>' but found '</{found}>'.",
                            element.tag_name
                        ),
                    );
                }
                CloseKind::EndTag | CloseKind::Implicit | CloseKind::Void | CloseKind::SelfClosed => {}
            }
        });
    }
}
