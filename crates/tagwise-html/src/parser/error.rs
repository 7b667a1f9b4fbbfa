use tagwise_common::Location;
use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Errors that abort parsing of a source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The tokenizer could not make sense of the input.
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// With strict closing, an element was still open at the end of input.
    #[error("Missing end tag for <{tag}>: document ended while the element was still open")]
    UnclosedElement {
        /// Tag name of the innermost open element.
        tag: String,
        /// Location of its start tag.
        location: Location,
    },

    /// The token stream ended without an end-of-input token.
    #[error("Unexpected end of token stream")]
    TruncatedInput {
        /// End of the input.
        location: Location,
    },
}

impl ParseError {
    /// Where the error was detected.
    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::Tokenizer(err) => err.location(),
            Self::UnclosedElement { location, .. } | Self::TruncatedInput { location } => location,
        }
    }
}
