//! Rule engine for the tagwise linter.
//!
//! # Scope
//!
//! This crate implements:
//! - **Configuration** ([`Config`]): presets, rule severities and options,
//!   metadata sources and plugins, resolved once into a [`ResolvedConfig`]
//!
//! - **Structural validation** ([`validator`]): content-model checks
//!   (permitted content, occurrences, order, ancestors, required content,
//!   attribute values)
//!
//! - **Rules** ([`rules`]): bundled checks subscribed to parse events, plus a
//!   [`RuleRegistry`] and [`Plugin`] trait for adding more
//!
//! - **Engine** ([`Engine`]): per-source parsing, rule setup, inline
//!   `[html-validate-*]` directives and reporting
//!
//! # Example
//!
//! ```
//! use tagwise_engine::{Config, Engine};
//! use tagwise_html::Source;
//!
//! let engine = Engine::from_config(&Config::default_config()).unwrap();
//! let report = engine.lint(&[Source::inline("<p>lorem</i>")]);
//! assert!(!report.valid);
//! ```

/// Linter configuration.
pub mod config;
mod directive;
mod dump;
mod engine;
mod error;
/// Host-provided extensions.
pub mod plugin;
/// Diagnostics and reports.
pub mod reporter;
/// The rule interface.
pub mod rule;
/// Bundled rules.
pub mod rules;
/// Content-model checks.
pub mod validator;

pub use config::{Config, ConfiguredRule, ElementSource, ResolvedConfig, RuleSetting, Severity};
pub use dump::{EventDump, TokenDump};
pub use engine::Engine;
pub use error::{ConfigError, EngineError};
pub use plugin::Plugin;
pub use reporter::{FileResult, Message, Report, Reporter};
pub use rule::{MissingRule, Rule, RuleContext, RuleDocumentation, parse_options};
pub use rules::{RuleFactory, RuleRegistry};
