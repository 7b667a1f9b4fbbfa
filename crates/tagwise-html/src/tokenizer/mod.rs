//! Markup tokenizer.
//!
//! Turns a [`Source`](crate::Source) into a lazy sequence of [`Token`]s. Every
//! byte of the input belongs to exactly one token, so the locations of
//! consecutive tokens are contiguous.

/// The tokenizer state machine.
pub mod core;
/// Tokenizer errors.
pub mod error;
/// Position tracking, emission and lookahead helpers.
pub mod helpers;
/// Token types produced by the tokenizer.
pub mod token;

pub use core::{Tokenizer, TokenizerState};
pub use error::TokenizerError;
pub use token::{RawTextKind, Token, TokenKind, TokenType};
