//! Configuration presets usable in `extends`.

use std::collections::BTreeMap;

use super::{Config, RuleSetting, Severity};

/// Prefix shared by every bundled preset name.
pub const PRESET_PREFIX: &str = "tagwise:";

/// Every bundled rule, at error severity.
const ALL: &[&str] = &[
    "attribute-allowed-values",
    "close-order",
    "deprecated",
    "element-permitted-content",
    "element-permitted-occurrences",
    "element-permitted-order",
    "element-required-ancestor",
    "element-required-attributes",
    "element-required-content",
    "no-deprecated-attr",
    "no-dup-attr",
    "no-dup-class",
    "no-inline-style",
    "no-unknown-elements",
    "void-style",
];

/// Rules left out of the recommended preset.
const RECOMMENDED_EXCLUDED: &[&str] = &["no-unknown-elements"];

/// Rules that only warn in the recommended preset.
const RECOMMENDED_WARNINGS: &[&str] = &["deprecated", "no-deprecated-attr", "void-style"];

/// The preset called `name`, if there is one.
#[must_use]
pub fn preset(name: &str) -> Option<Config> {
    let rules: BTreeMap<String, RuleSetting> = match name.strip_prefix(PRESET_PREFIX)? {
        "recommended" => ALL
            .iter()
            .filter(|rule| !RECOMMENDED_EXCLUDED.contains(rule))
            .map(|rule| {
                let severity = if RECOMMENDED_WARNINGS.contains(rule) {
                    Severity::Warn
                } else {
                    Severity::Error
                };
                ((*rule).to_string(), RuleSetting::new(severity))
            })
            .collect(),
        "all" => ALL
            .iter()
            .map(|rule| ((*rule).to_string(), RuleSetting::new(Severity::Error)))
            .collect(),
        _ => return None,
    };
    Some(Config {
        rules,
        ..Config::empty()
    })
}

/// Names of every bundled preset.
#[must_use]
pub fn preset_names() -> Vec<String> {
    ["recommended", "all"]
        .iter()
        .map(|name| format!("{PRESET_PREFIX}{name}"))
        .collect()
}
