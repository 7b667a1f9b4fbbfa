//! Markup tokenizer and tree builder for the tagwise linter.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([`Tokenizer`]): a lazy, location-exact token stream over a [`Source`]
//!   - Tags, attributes (quoted, unquoted, boolean), text and whitespace
//!   - Doctype, comments, conditional comments and `[html-validate-*]` directives
//!   - Verbatim `<script>`/`<style>` content
//!
//! - **Event dispatch** ([`EventHandler`]): synchronous publish/subscribe with
//!   wildcard and one-shot listeners and a deferred queue
//!
//! - **Tree builder** ([`Parser`]): stack of open elements, implicit closing from
//!   metadata, void and self-closed elements, foreign namespaces and recovery from
//!   mismatched end tags
//!
//! # Not Implemented
//!
//! - Character reference decoding
//! - The WHATWG insertion modes (tables, formatting elements, foster parenting)

/// Parse events and their dispatcher.
pub mod event;
/// Tree construction.
pub mod parser;
/// Input documents and hooks.
pub mod source;
/// Tokenizer for converting input into tokens.
pub mod tokenizer;

pub use event::{CloseKind, Event, EventHandler, Subscription, WeakEventHandler};
pub use parser::{ParseError, Parser, ParserOptions};
pub use source::{ProcessAttribute, ProcessElement, Source, SourceHooks};
pub use tokenizer::{Token, TokenKind, TokenType, Tokenizer, TokenizerError};
