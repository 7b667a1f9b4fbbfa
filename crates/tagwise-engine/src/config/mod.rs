//! Linter configuration.
//!
//! A [`Config`] is what the user writes: presets to extend, rule severities
//! and options, element metadata sources, plugin names. [`Config::resolve`]
//! turns it into a [`ResolvedConfig`]: the metadata table is built once and
//! every configured rule is instantiated with its options, so a resolved
//! configuration can lint any number of sources.

pub mod presets;
mod resolved;
mod severity;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tagwise_html::ParserOptions;
use tagwise_meta::MetaTableBuilder;

pub use resolved::{ConfiguredRule, ResolvedConfig};
pub use severity::Severity;

use crate::plugin::Plugin;
use crate::rule::MissingRule;
use crate::rules::RuleRegistry;
use crate::ConfigError;

/// Severity and options for one rule.
///
/// Written as a bare severity (`"error"`, `2`) or as `[severity, options]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct RuleSetting {
    /// How findings are reported.
    pub severity: Severity,
    /// Rule-specific options, an empty object when none were given.
    pub options: Value,
}

impl RuleSetting {
    /// A setting without options.
    #[must_use]
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            options: Value::Object(Map::new()),
        }
    }
}

impl TryFrom<Value> for RuleSetting {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Array(items) = value else {
            return Ok(Self::new(Severity::try_from(value)?));
        };
        if items.is_empty() || items.len() > 2 {
            return Err(ConfigError::InvalidRuleSetting(Value::Array(items).to_string()));
        }
        let mut items = items.into_iter();
        let severity = Severity::try_from(items.next().unwrap_or(Value::Null))?;
        let options = items.next().unwrap_or_else(|| Value::Object(Map::new()));
        Ok(Self { severity, options })
    }
}

/// Where element metadata comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ElementSource {
    /// A bundled table name (`html5`) or the path of a JSON file.
    Name(String),
    /// Element entries written inline.
    Inline(Map<String, Value>),
}

/// Unresolved configuration, as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Presets (`tagwise:recommended`) or configuration files to build on.
    #[serde(default)]
    pub extends: Vec<String>,
    /// Rule name to severity and options.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,
    /// Metadata sources, loaded in order. Defaults to the bundled `html5` table.
    #[serde(default)]
    pub elements: Option<Vec<ElementSource>>,
    /// Names of plugins to enable.
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Report elements left open at the end of a document as parse errors.
    #[serde(default)]
    pub strict_close: Option<bool>,
}

impl Config {
    /// A configuration with nothing enabled.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The configuration used when the user supplies none: the recommended preset.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            extends: vec![format!("{}recommended", presets::PRESET_PREFIX)],
            ..Self::default()
        }
    }

    /// Parse configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Json {
            source_name: "inline".to_string(),
            source,
        })
    }

    /// Build configuration from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|source| ConfigError::Json {
            source_name: "inline".to_string(),
            source,
        })
    }

    /// Load a configuration file, or a preset when `path` names one.
    ///
    /// Relative paths in `extends` and `elements` that start with `.` are
    /// taken relative to the file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if let Some(preset) = path.to_str().and_then(presets::preset) {
            return Ok(preset);
        }

        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            source_name: display,
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for entry in &mut config.extends {
            *entry = expand_relative(entry, base);
        }
        for source in config.elements.iter_mut().flatten() {
            if let ElementSource::Name(name) = source {
                *name = expand_relative(name, base);
            }
        }
        Ok(config)
    }

    /// Merge `overlay` on top of this configuration.
    ///
    /// Rules are merged by name with `overlay` winning, plugin lists are
    /// concatenated, and `elements`/`strictClose` are replaced when `overlay`
    /// sets them.
    #[must_use]
    pub fn merge(&self, overlay: &Self) -> Self {
        let mut rules = self.rules.clone();
        rules.extend(overlay.rules.iter().map(|(name, setting)| (name.clone(), setting.clone())));

        let mut plugins = self.plugins.clone();
        for plugin in &overlay.plugins {
            if !plugins.contains(plugin) {
                plugins.push(plugin.clone());
            }
        }

        let mut extends = self.extends.clone();
        extends.extend(overlay.extends.iter().cloned());

        Self {
            extends,
            rules,
            elements: overlay.elements.clone().or_else(|| self.elements.clone()),
            plugins,
            strict_close: overlay.strict_close.or(self.strict_close),
        }
    }

    /// This configuration with every `extends` entry loaded and merged underneath it.
    pub fn flatten(&self) -> Result<Self, ConfigError> {
        self.flatten_with(&mut Vec::new())
    }

    fn flatten_with(&self, seen: &mut Vec<String>) -> Result<Self, ConfigError> {
        let mut base = Self::empty();
        for entry in &self.extends {
            let is_preset = entry.starts_with(presets::PRESET_PREFIX);
            // The same file can be reached through different relative spellings.
            let key = if is_preset {
                entry.clone()
            } else {
                std::fs::canonicalize(entry).map_or_else(|_| entry.clone(), |path| path.display().to_string())
            };
            if seen.contains(&key) {
                return Err(ConfigError::CircularExtends(entry.clone()));
            }
            let extended = if is_preset {
                presets::preset(entry).ok_or_else(|| ConfigError::UnknownPreset(entry.clone()))?
            } else {
                Self::from_file(Path::new(entry))?
            };
            seen.push(key);
            base = base.merge(&extended.flatten_with(seen)?);
            let _ = seen.pop();
        }
        let own = Self {
            extends: Vec::new(),
            ..self.clone()
        };
        Ok(base.merge(&own))
    }

    /// Resolve without plugins.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        self.resolve_with_plugins(&[])
    }

    /// Resolve against the plugins the host application provides.
    ///
    /// Every name in `plugins` must match the [`Plugin::name`] of one of
    /// `available`.
    pub fn resolve_with_plugins(&self, available: &[Arc<dyn Plugin>]) -> Result<ResolvedConfig, ConfigError> {
        let config = self.flatten()?;

        let mut builder = MetaTableBuilder::new();
        let default_sources = [ElementSource::Name("html5".to_string())];
        for source in config.elements.as_deref().unwrap_or(&default_sources) {
            match source {
                ElementSource::Name(name) if Path::new(name).is_file() => {
                    let _ = builder.load_from_file(Path::new(name))?;
                }
                ElementSource::Name(name) => {
                    let _ = builder.load_bundled(name)?;
                }
                ElementSource::Inline(entries) => {
                    let _ = builder.load_from_value(&Value::Object(entries.clone()), "inline")?;
                }
            }
        }
        let meta = Arc::new(builder.init()?);

        let plugins = config
            .plugins
            .iter()
            .map(|name| {
                available
                    .iter()
                    .find(|plugin| plugin.name() == name)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownPlugin(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut registry = RuleRegistry::bundled();
        for plugin in &plugins {
            plugin.register_rules(&mut registry);
        }

        let mut rules = Vec::with_capacity(config.rules.len());
        for (name, setting) in &config.rules {
            let rule = match registry.create(name, &setting.options)? {
                Some(rule) => rule,
                None => {
                    log::debug!(target: "tagwise::config", "no definition for rule '{name}'");
                    Arc::new(MissingRule::new(name))
                }
            };
            rules.push(ConfiguredRule {
                name: name.clone(),
                severity: setting.severity,
                rule,
            });
        }

        let parser_options = ParserOptions {
            strict_close: config.strict_close.unwrap_or(false),
        };
        Ok(ResolvedConfig::new(meta, rules, plugins, parser_options))
    }
}

fn expand_relative(entry: &str, base: &Path) -> String {
    if entry.starts_with('.') {
        base.join(entry).display().to_string()
    } else {
        entry.to_string()
    }
}
