use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tagwise_dom::NodeClosed;
use tagwise_html::{CloseKind, Event};

use crate::ConfigError;
use crate::rule::{Rule, RuleContext, RuleDocumentation, parse_options};

/// How void elements should be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoidStyleKind {
    /// Both `<br>` and `<br/>` are fine.
    Any,
    /// `<br>`
    #[default]
    Omit,
    /// `<br/>`
    #[serde(alias = "selfclosing")]
    Selfclose,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Options {
    style: VoidStyleKind,
}

/// Void elements take no end tag, and only void elements may omit it.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidStyle {
    style: VoidStyleKind,
}

impl VoidStyle {
    /// The rule enforcing `style`.
    #[must_use]
    pub const fn new(style: VoidStyleKind) -> Self {
        Self { style }
    }

    /// Build from `{"style": "omit" | "selfclose" | "selfclosing" | "any"}`.
    pub fn from_options(options: &Value) -> Result<Arc<dyn Rule>, ConfigError> {
        let options: Options = parse_options("void-style", options)?;
        Ok(Arc::new(Self::new(options.style)))
    }
}

impl Rule for VoidStyle {
    fn documentation(&self, _context: Option<&Value>) -> RuleDocumentation {
        RuleDocumentation::new("HTML void elements cannot have any content and must not have an end tag.")
    }

    fn setup(&self, ctx: &RuleContext) {
        let style = self.style;
        ctx.on("tag-end", move |ctx, event, tree| {
            let Event::TagEnd {
                target, tag_name, kind, ..
            } = event
            else {
                return;
            };

            if *kind == CloseKind::Unmatched {
                let is_void = tag_name
                    .as_deref()
                    .and_then(|name| ctx.meta().get_meta_for(name))
                    .is_some_and(|meta| meta.void);
                if let (true, Some(name)) = (is_void, tag_name) {
                    ctx.report(tree, None, format!("End tag for <{name}> must be omitted"));
                }
                return;
            }

            let Some(element) = target.and_then(|id| tree.as_element(id)) else {
                return;
            };
            let Some(meta) = &element.meta else {
                return;
            };
            // Foreign elements may be written either way.
            if meta.foreign {
                return;
            }

            let name = &element.tag_name;
            match (meta.void, element.closed()) {
                (true, NodeClosed::VoidSelfClosed) if style == VoidStyleKind::Omit => ctx.report(
                    tree,
                    *target,
                    format!("Expected omitted end tag <{name}> instead of self-closing element <{name}/>"),
                ),
                (true, NodeClosed::VoidOmitted) if style == VoidStyleKind::Selfclose => ctx.report(
                    tree,
                    *target,
                    format!("Expected self-closing element <{name}/> instead of omitted end-tag <{name}>"),
                ),
                (false, NodeClosed::VoidSelfClosed | NodeClosed::VoidOmitted) => {
                    ctx.report(tree, *target, format!("End tag for <{name}> must not be omitted"));
                }
                _ => {}
            }
        });
    }
}
