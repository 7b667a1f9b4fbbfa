use tagwise_common::Location;
use thiserror::Error;

use super::core::TokenizerState;

/// Errors that stop tokenization of a source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizerError {
    /// Input ended inside a tag.
    #[error("Unterminated tag <{tag}>: end of input reached before \">\"")]
    UnterminatedTag {
        /// Name of the tag being read.
        tag: String,
        /// Where the tag starts.
        location: Location,
    },

    /// A quoted attribute value without its closing quote.
    #[error("Unterminated attribute value: missing closing {quote}")]
    UnterminatedQuote {
        /// The opening quote.
        quote: char,
        /// Location of the opening quote.
        location: Location,
    },

    /// `<!--` without `-->`.
    #[error("Unterminated comment: end of input reached before \"-->\"")]
    UnterminatedComment {
        /// Where the comment starts.
        location: Location,
    },

    /// `<!DOCTYPE` without `>`.
    #[error("Unterminated doctype: end of input reached before \">\"")]
    UnterminatedDoctype {
        /// Where the doctype value starts.
        location: Location,
    },

    /// `<script>` or `<style>` without the matching end tag.
    #[error("Unterminated <{tag}>: end of input reached before \"</{tag}>\"")]
    UnterminatedRawText {
        /// `script` or `style`.
        tag: String,
        /// Where the content starts.
        location: Location,
    },

    /// A character that cannot appear in the current state.
    #[error("Failed to tokenize \"{context}\", unhandled character in {state} state")]
    Unexpected {
        /// Input from the offending character onwards, truncated.
        context: String,
        /// State the tokenizer was in.
        state: TokenizerState,
        /// Location of the character.
        location: Location,
    },
}

impl TokenizerError {
    /// Where the error was detected.
    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::UnterminatedTag { location, .. }
            | Self::UnterminatedQuote { location, .. }
            | Self::UnterminatedComment { location }
            | Self::UnterminatedDoctype { location }
            | Self::UnterminatedRawText { location, .. }
            | Self::Unexpected { location, .. } => location,
        }
    }
}
