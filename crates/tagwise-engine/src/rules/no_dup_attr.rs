use std::collections::HashSet;

use serde_json::Value;
use tagwise_html::Event;

use crate::rule::{Rule, RuleContext, RuleDocumentation};

/// An attribute may only be given once per element.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDupAttr;

impl Rule for NoDupAttr {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("HTML disallows two or more attributes with the same (case-insensitive) name.")
    }

    fn setup(&self, ctx: &RuleContext) {
        let mut seen: HashSet<String> = HashSet::new();
        ctx.on("tag-start, attr", move |ctx, event, tree| match event {
            Event::TagStart { .. } => seen.clear(),
            Event::Attr {
                target,
                key,
                original_attribute,
                ..
            } => {
                // Attributes derived by a source hook may legitimately repeat.
                if original_attribute.is_some() {
                    return;
                }
                let name = key.to_ascii_lowercase();
                if seen.contains(&name) {
                    ctx.report(tree, Some(*target), format!("Attribute \"{name}\" duplicated"));
                } else {
                    let _ = seen.insert(name);
                }
            }
            _ => {}
        });
    }
}
