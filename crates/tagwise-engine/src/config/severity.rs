use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use crate::ConfigError;

/// How a rule's findings are reported.
///
/// Written in configuration as `"off"`, `"warn"`, `"error"` or `0`, `1`, `2`;
/// serialized in reports as the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(try_from = "Value")]
pub enum Severity {
    /// The rule does not run.
    Off = 0,
    /// Findings are warnings and do not make the report invalid.
    Warn = 1,
    /// Findings are errors.
    Error = 2,
}

impl Severity {
    /// Numeric level used in reports.
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

impl TryFrom<Value> for Severity {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, ConfigError> {
        match &value {
            Value::Number(level) => match level.as_u64() {
                Some(0) => Ok(Self::Off),
                Some(1) => Ok(Self::Warn),
                Some(2) => Ok(Self::Error),
                _ => Err(ConfigError::InvalidSeverity(value.to_string())),
            },
            Value::String(name) => name.parse().map_err(|_| ConfigError::InvalidSeverity(value.to_string())),
            _ => Err(ConfigError::InvalidSeverity(value.to_string())),
        }
    }
}
