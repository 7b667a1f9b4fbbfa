use tagwise_html::{ParseError, TokenizerError};
use tagwise_meta::MetaError;
use thiserror::Error;

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A severity that is not `off`/`warn`/`error` or `0`/`1`/`2`.
    #[error("Invalid severity {0}, expected \"off\", \"warn\", \"error\", 0, 1 or 2")]
    InvalidSeverity(String),

    /// A rule entry that is neither a severity nor `[severity, options]`.
    #[error("Invalid rule setting {0}, expected a severity or [severity, options]")]
    InvalidRuleSetting(String),

    /// `extends` names a `tagwise:` preset that does not exist.
    #[error("Unknown preset \"{0}\"")]
    UnknownPreset(String),

    /// `extends` eventually includes itself.
    #[error("Configuration extends itself through \"{0}\"")]
    CircularExtends(String),

    /// `plugins` names a plugin the host did not provide.
    #[error("Failed to load plugin \"{0}\": no plugin with that name was provided")]
    UnknownPlugin(String),

    /// A rule rejected its options.
    #[error("Invalid options for rule \"{rule}\": {message}")]
    InvalidRuleOptions {
        /// Rule name.
        rule: String,
        /// What was wrong.
        message: String,
    },

    /// A configuration file could not be read.
    #[error("Failed to read configuration \"{path}\": {source}")]
    Io {
        /// The file.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON or has the wrong shape.
    #[error("Failed to parse configuration \"{source_name}\": {source}")]
    Json {
        /// File name, or `inline`.
        source_name: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Element metadata failed to load.
    #[error(transparent)]
    Meta(#[from] MetaError),
}

/// Errors from the engine's debugging entry points.
///
/// Linting itself never fails: parse errors become diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Tokenizing failed.
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// Tree construction failed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
