use std::collections::HashSet;

use serde_json::Value;
use tagwise_common::Location;
use tagwise_dom::AttributeValue;
use tagwise_html::Event;

use crate::rule::{Rule, RuleContext, RuleDocumentation};

/// A class name may only appear once in a `class` attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDupClass;

/// Location of the class starting at byte `index` of a single-line value.
fn class_location(value: &str, value_location: &Location, index: usize, len: usize) -> Location {
    let columns = value[..index].chars().count();
    Location::new(
        value_location.filename.clone(),
        value_location.line,
        value_location.column + columns,
        value_location.offset + index,
        len,
    )
}

impl Rule for NoDupClass {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("Prevents unnecessary duplication of class names.")
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("attr", |ctx, event, tree| {
            let Event::Attr {
                target,
                key,
                value,
                value_location,
                ..
            } = event
            else {
                return;
            };
            if !key.eq_ignore_ascii_case("class") {
                return;
            }
            let Some(AttributeValue::Static(text)) = value else {
                return;
            };

            let mut unique = HashSet::new();
            let mut index = 0;
            for class in text.split_ascii_whitespace() {
                let start = text[index..].find(class).map_or(index, |found| index + found);
                index = start + class.len();
                if unique.insert(class) {
                    continue;
                }
                let message = format!("Class \"{class}\" duplicated");
                match value_location {
                    Some(location) if !text.contains('\n') => {
                        let location = class_location(text, location, start, class.len());
                        ctx.report_at(tree, Some(*target), message, &location);
                    }
                    _ => ctx.report(tree, Some(*target), message),
                }
            }
        });
    }
}
