use serde_json::{Value, json};

use super::natural_join;
use crate::rule::{Rule, RuleContext, RuleDocumentation};
use crate::validator::validate_ancestors;

/// Elements with `requiredAncestors` must be placed inside one of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementRequiredAncestor;

fn is_tag_name_only(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl Rule for ElementRequiredAncestor {
    fn documentation(&self, context: Option<&Value>) -> RuleDocumentation {
        let Some(context) = context else {
            return RuleDocumentation::new("Some elements must be placed inside specific ancestors.");
        };
        let child = context["child"].as_str().unwrap_or_default();
        let ancestors: Vec<String> = context["ancestor"]
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).map(|it| format!("`{it}`")).collect())
            .unwrap_or_default();
        RuleDocumentation::new(format!(
            "The `{child}` element requires a {} ancestor.",
            natural_join(&ancestors)
        ))
    }

    fn setup(&self, ctx: &RuleContext) {
        ctx.on("dom-ready", |ctx, _, tree| {
            for node in tree.descendants(tree.root()) {
                let Some(element) = tree.as_element(node) else {
                    continue;
                };
                let Some(rules) = element.meta.as_ref().and_then(|meta| meta.required_ancestors.as_deref()) else {
                    continue;
                };
                match validate_ancestors(tree, node, Some(rules)) {
                    Ok(true) => {}
                    Ok(false) => {
                        let ancestors: Vec<String> = rules
                            .iter()
                            .map(|rule| {
                                if is_tag_name_only(rule) {
                                    format!("<{rule}>")
                                } else {
                                    format!("\"{rule}\"")
                                }
                            })
                            .collect();
                        let child = element.annotated_name();
                        let message = format!("{child} element requires a {} ancestor", natural_join(&ancestors));
                        let context = json!({ "kind": "ancestor", "ancestor": ancestors, "child": child });
                        ctx.report_with_context(tree, Some(node), message, None, context);
                    }
                    Err(err) => {
                        log::warn!(target: "tagwise::rules", "invalid requiredAncestors for <{}>: {err}", element.tag_name);
                    }
                }
            }
        });
    }
}
