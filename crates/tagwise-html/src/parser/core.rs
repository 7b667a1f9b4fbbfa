use tagwise_common::Location;
use tagwise_dom::{Attribute, AttributeValue, DomTree, ElementData, NodeClosed, NodeId, NodeType};
use tagwise_meta::MetaTable;

use super::{ParseError, ParserOptions};
use crate::event::{CloseKind, Event, EventHandler};
use crate::source::Source;
use crate::tokenizer::{Token, TokenKind, Tokenizer};

/// A start or end tag with its attributes, read up to the closing `>`.
struct TagToken {
    name: String,
    location: Location,
    attrs: Vec<Attribute>,
    self_closing: bool,
    close_location: Location,
}

/// State for one parse.
pub(super) struct TreeBuilder<'a> {
    meta: &'a MetaTable,
    options: ParserOptions,
    events: &'a EventHandler,
    source: &'a Source,
    tokens: Tokenizer<'a>,
    tree: DomTree,

    /// Open elements, innermost last. The document root is always at the bottom.
    stack_of_open_elements: Vec<NodeId>,

    /// Location of the last token read.
    last_location: Location,
}

impl<'a> TreeBuilder<'a> {
    pub(super) fn new(meta: &'a MetaTable, options: ParserOptions, events: &'a EventHandler, source: &'a Source) -> Self {
        Self {
            meta,
            options,
            events,
            source,
            tokens: Tokenizer::new(source),
            tree: DomTree::new(source.start_location(source.data.len())),
            stack_of_open_elements: vec![NodeId::ROOT],
            last_location: source.start_location(0),
        }
    }

    /// Consume the token stream and return the finished tree.
    pub(super) fn run(mut self) -> Result<DomTree, ParseError> {
        self.trigger(Event::DomLoad {
            location: self.source.start_location(0),
        });

        while let Some(token) = self.next_token()? {
            match token.kind {
                TokenKind::UnicodeBom | TokenKind::Comment { .. } => {}
                TokenKind::Whitespace => {
                    self.insert_text(&token);
                    self.trigger(Event::Whitespace {
                        text: token.raw,
                        location: token.location,
                    });
                }
                TokenKind::Text | TokenKind::Script | TokenKind::Style => self.insert_text(&token),
                TokenKind::DoctypeOpen { tag } => self.process_doctype(tag, token.location)?,
                TokenKind::TagOpen { name, is_end: false } => {
                    let tag = self.read_tag(name, token.location)?;
                    self.process_start_tag(tag);
                }
                TokenKind::TagOpen { name, is_end: true } => {
                    let tag = self.read_tag(name, token.location)?;
                    self.process_end_tag(tag);
                }
                TokenKind::Conditional { condition } => {
                    let parent = self.current_node();
                    self.trigger(Event::Conditional {
                        condition,
                        parent,
                        location: token.location,
                    });
                }
                TokenKind::Directive { action, data, text } => {
                    let parent = self.current_node();
                    self.trigger(Event::Directive {
                        action,
                        data,
                        comment: text,
                        parent,
                        location: token.location,
                    });
                }
                TokenKind::Eof => return self.finish(token.location),
                // Only produced inside tags and doctypes, which read their own tokens.
                TokenKind::AttrName { .. }
                | TokenKind::AttrValue { .. }
                | TokenKind::TagClose { .. }
                | TokenKind::DoctypeValue { .. }
                | TokenKind::DoctypeClose => {}
            }
        }

        Err(ParseError::TruncatedInput {
            location: self.last_location.clone(),
        })
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        match self.tokens.next() {
            Some(Ok(token)) => {
                self.last_location = token.location.clone();
                Ok(Some(token))
            }
            Some(Err(err)) => Err(err.into()),
            None => Ok(None),
        }
    }

    fn trigger(&mut self, event: Event) {
        self.events.trigger(&event, &mut self.tree);
    }

    /// The innermost open element, or the document root.
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn insert_text(&mut self, token: &Token) {
        let parent = self.current_node();
        let _ = self.tree.append_text(parent, &token.raw, token.location.clone());
    }

    /// Read the attributes and closing `>` of a tag.
    fn read_tag(&mut self, name: String, location: Location) -> Result<TagToken, ParseError> {
        let mut attrs: Vec<Attribute> = Vec::new();
        while let Some(token) = self.next_token()? {
            match token.kind {
                TokenKind::AttrName { name } => attrs.push(Attribute::new(name, None, token.location, None)),
                TokenKind::AttrValue {
                    value,
                    quote,
                    value_location,
                } => {
                    if let Some(attr) = attrs.last_mut() {
                        attr.value = Some(AttributeValue::Static(value));
                        attr.quote = quote;
                        attr.value_location = Some(value_location);
                    }
                }
                TokenKind::TagClose { self_closing } => {
                    return Ok(TagToken {
                        name,
                        location,
                        attrs,
                        self_closing,
                        close_location: token.location,
                    });
                }
                _ => {}
            }
        }
        Err(ParseError::TruncatedInput {
            location: self.last_location.clone(),
        })
    }

    fn process_doctype(&mut self, tag: String, location: Location) -> Result<(), ParseError> {
        let mut value = String::new();
        let mut value_location = location.with_size(0);
        while let Some(token) = self.next_token()? {
            match token.kind {
                TokenKind::DoctypeValue { value: v } => {
                    value = v;
                    value_location = token.location;
                }
                TokenKind::DoctypeClose => {
                    self.tree.set_doctype(value.clone());
                    self.trigger(Event::Doctype {
                        tag,
                        value,
                        value_location,
                        location,
                    });
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(ParseError::TruncatedInput {
            location: self.last_location.clone(),
        })
    }

    /// Namespace for a child of `parent`: inherited from a foreign ancestor,
    /// or the name of `parent` itself when it is a foreign root.
    fn namespace_for_child_of(&self, parent: NodeId) -> Option<String> {
        let element = self.tree.as_element(parent)?;
        if let Some(namespace) = &element.namespace {
            return Some(namespace.clone());
        }
        element
            .meta
            .as_ref()
            .filter(|meta| meta.foreign)
            .map(|_| element.tag_name.to_ascii_lowercase())
    }

    fn process_start_tag(&mut self, tag: TagToken) {
        let TagToken {
            name,
            location,
            attrs,
            self_closing,
            close_location,
        } = tag;

        let source = self.source;

        // STEP 1: Let the source rewrite attributes.
        let attrs = match &source.hooks.process_attribute {
            Some(hook) => attrs.into_iter().flat_map(|attr| hook(attr)).collect(),
            None => attrs,
        };

        // STEP 2: Close open elements that this start tag implicitly ends.
        loop {
            let current = self.current_node();
            let closes = self
                .tree
                .as_element(current)
                .and_then(|element| element.meta.as_ref())
                .is_some_and(|meta| meta.is_implicitly_closed_by(&name));
            if !closes {
                break;
            }
            log::debug!(target: "tagwise::parser", "<{name}> implicitly closes node {}", current.0);
            let _ = self.stack_of_open_elements.pop();
            self.close_node(current, Some(NodeClosed::EndTag), CloseKind::Implicit, None, location.clone());
        }

        // STEP 3: Resolve metadata, using the namespace-qualified name inside foreign content.
        let parent = self.current_node();
        let namespace = self.namespace_for_child_of(parent);
        let mut element = ElementData::new(name, attrs, None);
        element.namespace = namespace;
        element.meta = self.meta.get_meta_for(&element.qualified_name());

        // STEP 4: Append the element.
        let id = self.tree.alloc(NodeType::Element(element), location.clone());
        self.tree.append_child(parent, id);

        if let Some(hook) = &source.hooks.process_element {
            hook(&mut self.tree, id, self.meta);
        }

        // STEP 5: Announce it, attribute by attribute.
        self.trigger(Event::TagStart {
            target: id,
            parent,
            location: location.clone(),
        });
        let attrs = self.tree.as_element(id).map(|e| e.attrs.clone()).unwrap_or_default();
        for attr in attrs {
            self.trigger(Event::Attr {
                target: id,
                location: attr.key_location.clone(),
                key: attr.key,
                value: attr.value,
                quote: attr.quote,
                original_attribute: attr.original_attribute,
                key_location: attr.key_location,
                value_location: attr.value_location,
            });
        }
        self.trigger(Event::TagReady {
            target: id,
            location,
        });

        // STEP 6: Void and self-closed elements end right away, everything else becomes current.
        let is_void = self.tree.as_element(id).is_some_and(ElementData::is_void);
        if self_closing {
            self.close_node(id, Some(NodeClosed::VoidSelfClosed), CloseKind::SelfClosed, None, close_location);
        } else if is_void {
            self.close_node(id, Some(NodeClosed::VoidOmitted), CloseKind::Void, None, close_location);
        } else {
            self.stack_of_open_elements.push(id);
        }
    }

    fn process_end_tag(&mut self, tag: TagToken) {
        let position = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.tree.as_element(id).is_some_and(|element| element.is(&tag.name)));

        let Some(index) = position else {
            log::debug!(target: "tagwise::parser", "</{}> matches no open element", tag.name);
            let previous = self.current_node();
            self.trigger(Event::TagEnd {
                target: None,
                previous,
                tag_name: Some(tag.name),
                kind: CloseKind::Unmatched,
                location: tag.location,
            });
            return;
        };

        // Elements above the match are closed by the ancestor's end tag. Those
        // whose own end tag may be omitted are closed implicitly.
        while self.stack_of_open_elements.len() > index + 1 {
            let Some(id) = self.stack_of_open_elements.pop() else {
                break;
            };
            let optional_end = self
                .tree
                .as_element(id)
                .and_then(|element| element.meta.as_ref())
                .is_some_and(|meta| meta.has_optional_end_tag());
            let kind = if optional_end {
                CloseKind::Implicit
            } else {
                CloseKind::Ancestor
            };
            self.close_node(id, Some(NodeClosed::EndTag), kind, Some(tag.name.clone()), tag.location.clone());
        }

        if let Some(id) = self.stack_of_open_elements.pop() {
            self.close_node(id, Some(NodeClosed::EndTag), CloseKind::EndTag, Some(tag.name), tag.location);
        }
    }

    /// Record how `id` was closed and announce it. `id` must already be off the stack.
    fn close_node(
        &mut self,
        id: NodeId,
        state: Option<NodeClosed>,
        kind: CloseKind,
        tag_name: Option<String>,
        location: Location,
    ) {
        if let Some(state) = state
            && let Some(element) = self.tree.as_element_mut(id)
        {
            element.close(state);
        }
        let previous = self.current_node();
        self.trigger(Event::TagEnd {
            target: Some(id),
            previous,
            tag_name,
            kind,
            location,
        });
        let location = self.tree.location(id).cloned().unwrap_or_else(|| self.last_location.clone());
        self.trigger(Event::ElementReady { target: id, location });
    }

    fn finish(mut self, location: Location) -> Result<DomTree, ParseError> {
        let current = self.current_node();
        if self.options.strict_close
            && let Some(element) = self.tree.as_element(current)
        {
            return Err(ParseError::UnclosedElement {
                tag: element.tag_name.clone(),
                location: self.tree.location(current).cloned().unwrap_or(location),
            });
        }

        while self.stack_of_open_elements.len() > 1 {
            let Some(id) = self.stack_of_open_elements.pop() else {
                break;
            };
            self.close_node(id, None, CloseKind::EndOfDocument, None, location.clone());
        }

        self.trigger(Event::DomReady { location });
        Ok(self.tree)
    }
}
