use serde_json::{Value, json};
use tagwise_meta::AttributeRule;

use crate::rule::{Rule, RuleContext, RuleDocumentation};
use crate::validator::validate_attribute;

/// Attribute values must match the element's `attributes` metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeAllowedValues;

fn describe(rule: &AttributeRule) -> String {
    match rule {
        AttributeRule::Literal(value) => value.clone(),
        AttributeRule::Pattern(regex) => format!("/{}/", regex.as_str()),
    }
}

impl Rule for AttributeAllowedValues {
    fn documentation(&self, context: Option<&Value>) -> RuleDocumentation {
        let Some(context) = context else {
            return RuleDocumentation::new("Attribute has invalid value.");
        };
        let element = context["element"].as_str().unwrap_or_default();
        let attribute = context["attribute"].as_str().unwrap_or_default();
        let allowed: Vec<&str> = context["allowed"]
            .as_array()
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if allowed.is_empty() {
            return RuleDocumentation::new(format!(
                "Element <{element}> attribute `{attribute}` must be a boolean attribute, e.g. `<{element} {attribute}>`"
            ));
        }
        let value = context["value"].as_str().unwrap_or_default();
        let list: Vec<String> = allowed.iter().map(|value| format!("- `{value}`")).collect();
        RuleDocumentation::new(format!(
            "Element <{element}> does not allow attribute `{attribute}` to have the value `\"{value}\"`, it must match one of the following:\n\n{}",
            list.join("\n")
        ))
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
                for attribute in &element.attrs {
                    if validate_attribute(attribute, &meta.attributes) {
                        continue;
                    }
                    let value = attribute.value_str();
                    let message = match value {
                        Some(value) => format!("Attribute \"{}\" has invalid value \"{value}\"", attribute.key),
                        None => format!("Attribute \"{}\" is missing value", attribute.key),
                    };
                    let location = match (value, &attribute.value_location) {
                        (Some(_), Some(location)) => location,
                        _ => &attribute.key_location,
                    };
                    let allowed: Vec<String> = meta
                        .attributes
                        .get(&attribute.key.to_ascii_lowercase())
                        .map(|rules| rules.iter().map(describe).collect())
                        .unwrap_or_default();
                    let context = json!({
                        "element": element.tag_name,
                        "attribute": attribute.key,
                        "value": value.unwrap_or_default(),
                        "allowed": allowed,
                    });
                    ctx.report_with_context(tree, Some(node), message, Some(location), context);
                }
            }
        });
    }
}
