use strum_macros::Display;

use super::error::TokenizerError;
use super::helpers::{
    Cursor, conditional_at, find_end_tag, is_markup_start, is_tag_name_char, is_whitespace_char, parse_directive,
    tag_open_at,
};
use super::token::{RawTextKind, Token, TokenKind};
use crate::source::Source;

/// The tokenizer state machine.
///
/// Each state reads one token from the front of the remaining input (or
/// switches state without producing one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Start of input, where a byte-order mark may appear.
    Initial,
    /// Character data between tags.
    Data,
    /// Inside a tag, before an attribute name or the end of the tag.
    BeforeAttributeName,
    /// Right after an attribute name, where `=value` may follow.
    AfterAttributeName,
    /// Inside `<!DOCTYPE ...>`.
    Doctype,
    /// Content of `<script>` or `<style>`, up to the matching end tag.
    RawText(RawTextKind),
    /// The end-of-input token has been emitted, or an error was raised.
    Done,
}

/// The tag currently being tokenized.
#[derive(Debug, Clone)]
pub(super) struct OpenTag {
    pub(super) name: String,
    pub(super) is_end: bool,
    pub(super) location: tagwise_common::Location,
}

/// Lazy tokenizer over a [`Source`].
///
/// Yields tokens one at a time; the last item is either an [`TokenKind::Eof`]
/// token or an error, after which the iterator is exhausted.
pub struct Tokenizer<'a> {
    pub(super) state: TokenizerState,
    pub(super) input: &'a str,
    pub(super) filename: &'a str,
    /// Byte index into `input` of the next unconsumed character.
    pub(super) pos: usize,
    pub(super) cursor: Cursor,
    pub(super) current_tag: Option<OpenTag>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer positioned at the start of `source`.
    #[must_use]
    pub fn new(source: &'a Source) -> Self {
        Self {
            state: TokenizerState::Initial,
            input: &source.data,
            filename: &source.filename,
            pos: 0,
            cursor: Cursor {
                offset: source.offset,
                line: source.line,
                column: source.column,
            },
            current_tag: None,
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    fn step(&mut self) -> Result<Option<Token>, TokenizerError> {
        match self.state {
            TokenizerState::Initial => Ok(self.handle_initial_state()),
            TokenizerState::Data => self.handle_data_state().map(Some),
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state().map(Some),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::Doctype => self.handle_doctype_state().map(Some),
            TokenizerState::RawText(kind) => self.handle_raw_text_state(kind),
            TokenizerState::Done => Ok(None),
        }
    }

    fn handle_initial_state(&mut self) -> Option<Token> {
        self.switch_to(TokenizerState::Data);
        if self.rest().starts_with('\u{FEFF}') {
            return Some(self.emit(TokenKind::UnicodeBom, '\u{FEFF}'.len_utf8()));
        }
        None
    }

    fn handle_data_state(&mut self) -> Result<Token, TokenizerError> {
        let rest = self.rest();

        if rest.is_empty() {
            self.switch_to(TokenizerState::Done);
            return Ok(self.emit(TokenKind::Eof, 0));
        }

        if let Some((len, condition)) = conditional_at(rest) {
            let condition = condition.trim().to_string();
            return Ok(self.emit(TokenKind::Conditional { condition }, len));
        }

        if rest.starts_with("<!--") {
            return self.consume_comment();
        }

        if self.starts_with_ignore_case("<!doctype") {
            return Ok(self.consume_doctype_open());
        }

        if let Some(is_end) = tag_open_at(rest) {
            return Ok(self.consume_tag_open(is_end));
        }

        Ok(self.consume_text())
    }

    fn consume_comment(&mut self) -> Result<Token, TokenizerError> {
        let rest = self.rest();
        let Some(end) = rest[4..].find("-->") else {
            return Err(TokenizerError::UnterminatedComment {
                location: self.location(4),
            });
        };
        let text = &rest[4..4 + end];
        let kind = match parse_directive(text) {
            Some((action, data, text)) => TokenKind::Directive {
                action: action.to_string(),
                data: data.to_string(),
                text: text.to_string(),
            },
            None => TokenKind::Comment { text: text.to_string() },
        };
        Ok(self.emit(kind, 4 + end + 3))
    }

    fn consume_doctype_open(&mut self) -> Token {
        let keyword = "<!doctype".len();
        let rest = self.rest();
        let tag = rest[2..keyword].to_string();
        let len = keyword + rest[keyword..].chars().next().filter(|&c| is_whitespace_char(c)).map_or(0, char::len_utf8);
        self.switch_to(TokenizerState::Doctype);
        self.emit(TokenKind::DoctypeOpen { tag }, len)
    }

    fn consume_tag_open(&mut self, is_end: bool) -> Token {
        let prefix = if is_end { 2 } else { 1 };
        let len = prefix + self.scan_while(prefix, is_tag_name_char);
        let name = self.rest()[prefix..len].to_string();
        self.current_tag = Some(OpenTag {
            name: name.clone(),
            is_end,
            location: self.location(len),
        });
        self.switch_to(TokenizerState::BeforeAttributeName);
        self.emit(TokenKind::TagOpen { name, is_end }, len)
    }

    fn consume_text(&mut self) -> Token {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .skip(1)
            .find(|&(i, c)| c == '<' && is_markup_start(&rest[i..]))
            .map_or(rest.len(), |(i, _)| i);
        let kind = if rest[..len].chars().all(is_whitespace_char) {
            TokenKind::Whitespace
        } else {
            TokenKind::Text
        };
        self.emit(kind, len)
    }

    fn handle_doctype_state(&mut self) -> Result<Token, TokenizerError> {
        let rest = self.rest();
        match rest.chars().next() {
            None => Err(TokenizerError::UnterminatedDoctype {
                location: self.location(0),
            }),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                Ok(self.emit(TokenKind::DoctypeClose, 1))
            }
            Some(c) if is_whitespace_char(c) => {
                let len = self.scan_while(0, is_whitespace_char);
                Ok(self.emit(TokenKind::Whitespace, len))
            }
            Some(_) => {
                let Some(len) = rest.find('>') else {
                    return Err(TokenizerError::UnterminatedDoctype {
                        location: self.location(rest.len()),
                    });
                };
                let value = rest[..len].trim().to_string();
                Ok(self.emit(TokenKind::DoctypeValue { value }, len))
            }
        }
    }

    fn handle_before_attribute_name_state(&mut self) -> Result<Token, TokenizerError> {
        let rest = self.rest();
        let Some(c) = rest.chars().next() else {
            return Err(self.unterminated_tag());
        };

        if is_whitespace_char(c) {
            let len = self.scan_while(0, is_whitespace_char);
            return Ok(self.emit(TokenKind::Whitespace, len));
        }

        if rest.starts_with("/>") {
            return Ok(self.close_tag(true));
        }
        if c == '>' {
            return Ok(self.close_tag(false));
        }
        if matches!(c, '"' | '\'' | '=' | '/') {
            return Err(self.unexpected());
        }

        let len = self.scan_while(0, |c| !is_whitespace_char(c) && !matches!(c, '/' | '>' | '"' | '\'' | '='));
        let name = rest[..len].to_string();
        self.switch_to(TokenizerState::AfterAttributeName);
        Ok(self.emit(TokenKind::AttrName { name }, len))
    }

    fn close_tag(&mut self, self_closing: bool) -> Token {
        let next = match self.current_tag.take() {
            Some(tag) if !tag.is_end && !self_closing => {
                RawTextKind::for_tag(&tag.name).map_or(TokenizerState::Data, TokenizerState::RawText)
            }
            _ => TokenizerState::Data,
        };
        self.switch_to(next);
        self.emit(TokenKind::TagClose { self_closing }, if self_closing { 2 } else { 1 })
    }

    fn handle_after_attribute_name_state(&mut self) -> Result<Option<Token>, TokenizerError> {
        let rest = self.rest();
        let mut len = self.scan_while(0, is_whitespace_char);
        if !rest[len..].starts_with('=') {
            self.switch_to(TokenizerState::BeforeAttributeName);
            return Ok(None);
        }
        len += 1;
        len += self.scan_while(len, is_whitespace_char);

        let after = &rest[len..];
        let (value, quote, value_start, token_len) = match after.chars().next() {
            None => return Err(self.unterminated_tag()),
            Some(quote @ ('"' | '\'')) => {
                let Some(close) = after[1..].find(quote) else {
                    return Err(TokenizerError::UnterminatedQuote {
                        quote,
                        location: self.location_at(len, 1),
                    });
                };
                (&after[1..=close], Some(quote), len + 1, len + close + 2)
            }
            Some(_) => {
                let size = self.scan_while(len, |c| !is_whitespace_char(c) && !matches!(c, '>' | '<' | '"' | '\''));
                (&after[..size], None, len, len + size)
            }
        };

        let kind = TokenKind::AttrValue {
            value: value.to_string(),
            quote,
            value_location: self.location_at(value_start, value.len()),
        };
        self.switch_to(TokenizerState::BeforeAttributeName);
        Ok(Some(self.emit(kind, token_len)))
    }

    fn handle_raw_text_state(&mut self, kind: RawTextKind) -> Result<Option<Token>, TokenizerError> {
        let rest = self.rest();
        let Some(len) = find_end_tag(rest, kind.end_tag()) else {
            return Err(TokenizerError::UnterminatedRawText {
                tag: kind.to_string(),
                location: self.location(rest.len()),
            });
        };
        self.switch_to(TokenizerState::Data);
        if len == 0 {
            return Ok(None);
        }
        let token = match kind {
            RawTextKind::Script => TokenKind::Script,
            RawTextKind::Style => TokenKind::Style,
        };
        Ok(Some(self.emit(token, len)))
    }

    fn unterminated_tag(&self) -> TokenizerError {
        match &self.current_tag {
            Some(tag) => TokenizerError::UnterminatedTag {
                tag: tag.name.clone(),
                location: tag.location.clone(),
            },
            None => self.unexpected(),
        }
    }

    fn unexpected(&self) -> TokenizerError {
        TokenizerError::Unexpected {
            context: self.rest().chars().take(20).collect(),
            state: self.state,
            location: self.location(1),
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.state != TokenizerState::Done {
            match self.step() {
                Ok(Some(token)) => {
                    log::trace!(target: "tagwise::tokenizer", "{} at {}", token.token_type(), token.location);
                    return Some(Ok(token));
                }
                Ok(None) => {}
                Err(err) => {
                    log::debug!(target: "tagwise::tokenizer", "{err} at {}", err.location());
                    self.switch_to(TokenizerState::Done);
                    return Some(Err(err));
                }
            }
        }
        None
    }
}
