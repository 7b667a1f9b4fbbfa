//! Debug output of the intermediate stages: tokens, events and trees.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tagwise_html::{Source, Tokenizer};

use crate::EngineError;
use crate::engine::Engine;

/// One token, as printed by `--dump-tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDump {
    /// Token type, e.g. `TAG_OPEN`.
    pub token: String,
    /// Raw text, `None` for the end-of-input token.
    pub data: Option<String>,
    /// `file:line:column`.
    pub location: String,
}

/// One event, as printed by `--dump-events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDump {
    /// Event name.
    pub event: String,
    /// Serialized payload.
    pub data: Value,
}

impl Engine {
    /// Tokenize every source.
    pub fn dump_tokens(&self, sources: &[Source]) -> Result<Vec<TokenDump>, EngineError> {
        let mut lines = Vec::new();
        for source in sources {
            for token in Tokenizer::new(source) {
                let token = token?;
                lines.push(TokenDump {
                    token: token.token_type().to_string(),
                    data: (!token.is_eof()).then(|| token.raw.clone()),
                    location: token.location.to_string(),
                });
            }
        }
        Ok(lines)
    }

    /// Parse every source and record each event in delivery order.
    pub fn dump_events(&self, sources: &[Source]) -> Result<Vec<EventDump>, EngineError> {
        let parser = self.instantiate_parser();
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let _ = parser.on("*", move |name, event, _| {
            sink.borrow_mut().push(EventDump {
                event: name.to_string(),
                data: serde_json::to_value(event).unwrap_or(Value::Null),
            });
        });
        for source in sources {
            let _ = parser.parse(source)?;
        }
        Ok(lines.borrow().clone())
    }

    /// Parse `source` and render its element tree.
    pub fn dump_tree(&self, source: &Source) -> Result<Vec<String>, EngineError> {
        let tree = self.instantiate_parser().parse(source)?;
        Ok(tagwise_dom::dump_tree(&tree))
    }
}
