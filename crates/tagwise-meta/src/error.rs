//! Metadata loading errors.
//!
//! All of these are configuration-level failures: they are raised while a
//! table is being built, before any document is parsed.

use thiserror::Error;

/// Error raised while loading or resolving element metadata.
#[derive(Debug, Error)]
pub enum MetaError {
    /// An entry does not conform to the metadata schema.
    #[error("Element metadata is not valid: {source_name}: <{tag}>: {message}")]
    Schema {
        /// File name or description of the metadata source.
        source_name: String,
        /// Element the offending entry describes.
        tag: String,
        /// What was wrong.
        message: String,
    },

    /// The top level of a metadata source is not an object.
    #[error("Element metadata is not valid: {0}: expected an object of elements")]
    NotAnObject(String),

    /// `inherit` names an element that has not been loaded.
    #[error("Element <{tag}> cannot inherit from <{parent}>: no such element")]
    UnknownInherit {
        /// Element declaring `inherit`.
        tag: String,
        /// Name it tried to inherit from.
        parent: String,
    },

    /// A property expression names a function outside the registry.
    #[error("Unknown property expression \"{0}\"")]
    UnknownFunction(String),

    /// A property expression has options the function cannot use.
    #[error("Property expression \"{function}\" has invalid options: {message}")]
    InvalidOptions {
        /// Function name.
        function: String,
        /// What was wrong with the options.
        message: String,
    },

    /// `@something` that is not a known content category.
    #[error("Invalid content category \"{0}\"")]
    InvalidCategory(String),

    /// A permitted-content object has keys other than `exclude`.
    #[error("Permitted rule \"{rule}\" contains unknown property \"{property}\"")]
    UnknownPermittedProperty {
        /// The offending rule, serialized back to JSON.
        rule: String,
        /// First unknown key.
        property: String,
    },

    /// A permitted-content entry of the wrong JSON type.
    #[error("Permitted rule \"{0}\" is not valid")]
    InvalidPermittedRule(String),

    /// An attribute rule written as `/.../` is not a valid regular expression.
    #[error("Invalid regular expression {pattern}: {source}")]
    Regex {
        /// The pattern as written.
        pattern: String,
        /// Underlying compile error.
        source: regex::Error,
    },

    /// [`crate::MetaTableBuilder::load_bundled`] was given an unknown name.
    #[error("No bundled element table named \"{0}\"")]
    UnknownBundle(String),

    /// A metadata file could not be read.
    #[error("Failed to read element metadata from {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A metadata source is not valid JSON.
    #[error("Failed to parse element metadata from {source_name}: {source}")]
    Json {
        /// File name or description of the metadata source.
        source_name: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}
