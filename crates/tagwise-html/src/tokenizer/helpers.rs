//! Helper functions for the tokenizer.
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions
//! - Position tracking and token emission
//! - Character classes and lookahead for markup constructs

use tagwise_common::Location;

use super::core::{Tokenizer, TokenizerState};
use super::token::{Token, TokenKind};

// =============================================================================
// Position Tracking
// =============================================================================

/// Position of the next unconsumed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Absolute byte offset.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

impl Cursor {
    /// Move past `text`.
    pub fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += text.len();
    }
}

// =============================================================================
// State Transition Helpers
// =============================================================================

impl<'a> Tokenizer<'a> {
    /// Transition to a new state. The next step reads from the new state.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// The unconsumed input.
    pub(super) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Whether the unconsumed input starts with `prefix`, ignoring ASCII case.
    pub(super) fn starts_with_ignore_case(&self, prefix: &str) -> bool {
        self.rest()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    /// Byte length of the run of characters matching `predicate`, starting
    /// `from` bytes into the unconsumed input.
    pub(super) fn scan_while(&self, from: usize, predicate: impl Fn(char) -> bool) -> usize {
        self.rest()[from..]
            .char_indices()
            .find(|&(_, c)| !predicate(c))
            .map_or(self.rest().len() - from, |(i, _)| i)
    }
}

// =============================================================================
// Token Emission
// =============================================================================

impl Tokenizer<'_> {
    /// Location of the next `size` bytes.
    pub(super) fn location(&self, size: usize) -> Location {
        Location::new(self.filename, self.cursor.line, self.cursor.column, self.cursor.offset, size)
    }

    /// Location of `size` bytes starting `skip` bytes into the unconsumed input.
    pub(super) fn location_at(&self, skip: usize, size: usize) -> Location {
        let mut cursor = self.cursor;
        cursor.advance(&self.rest()[..skip]);
        Location::new(self.filename, cursor.line, cursor.column, cursor.offset, size)
    }

    /// Consume `len` bytes as a token of `kind`.
    pub(super) fn emit(&mut self, kind: TokenKind, len: usize) -> Token {
        let raw = &self.rest()[..len];
        let token = Token {
            kind,
            raw: raw.to_string(),
            location: self.location(len),
        };
        self.cursor.advance(raw);
        self.pos += len;
        token
    }
}

// =============================================================================
// Character Classes and Lookahead
// =============================================================================

/// Whitespace as far as markup is concerned: tab, line feed, form feed,
/// carriage return and space.
#[must_use]
pub const fn is_whitespace_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r')
}

/// Characters allowed in a tag name after the leading letter.
#[must_use]
pub const fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

/// `Some(false)` for `<x`, `Some(true)` for `</x`, where `x` is an ASCII letter.
#[must_use]
pub fn tag_open_at(input: &str) -> Option<bool> {
    let mut chars = input.chars();
    if chars.next() != Some('<') {
        return None;
    }
    match chars.next()? {
        c if c.is_ascii_alphabetic() => Some(false),
        '/' => chars.next().filter(char::is_ascii_alphabetic).map(|_| true),
        _ => None,
    }
}

/// Whether `input` starts with something other than character data.
#[must_use]
pub fn is_markup_start(input: &str) -> bool {
    input.starts_with("<!--")
        || conditional_at(input).is_some()
        || input.get(..9).is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"))
        || tag_open_at(input).is_some()
}

/// Byte offset of the first `needle` in `haystack`, ignoring ASCII case.
/// `needle` must start with `</`.
#[must_use]
pub fn find_end_tag(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices("</").map(|(start, _)| start).find(|&start| {
        haystack.as_bytes()[start..]
            .get(..needle.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(needle.as_bytes()))
    })
}

/// Conditional comment at the start of `input`: `<!--[cond]>`, `<![cond]>`
/// or `<![cond]-->`. Returns the byte length and the condition.
#[must_use]
pub fn conditional_at(input: &str) -> Option<(usize, &str)> {
    let (open, body) = if let Some(body) = input.strip_prefix("<!--[") {
        (5, body)
    } else {
        (3, input.strip_prefix("<![")?)
    };
    let close = body.find(']')?;
    let condition = &body[..close];
    let after = &body[close + 1..];
    let tail = if after.starts_with('>') {
        1
    } else if open == 3 && after.starts_with("-->") {
        3
    } else {
        return None;
    };
    Some((open + close + 1 + tail, condition))
}

/// Split a comment body of the form ` [html-validate-ACTION DATA] ` into
/// `(action, data, text)`, where `text` is everything between the brackets.
#[must_use]
pub fn parse_directive(comment: &str) -> Option<(&str, &str, &str)> {
    let text = comment.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
    if text.contains(['[', ']']) {
        return None;
    }
    let body = text.strip_prefix("html-validate-")?;
    let (action, data) = body.split_once(is_whitespace_char).unwrap_or((body, ""));
    if action.is_empty() {
        return None;
    }
    Some((action, data.trim(), text))
}
