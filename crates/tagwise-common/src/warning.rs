//! Deduplicated linter warnings.
//!
//! Some conditions are worth telling the user about but are not diagnostics
//! on the document itself (a directive naming a rule that is not configured,
//! for instance). They are logged through the `log` facade, once per unique
//! message for as long as the owning [`Warnings`] lives.

use std::collections::HashSet;

/// Warnings already logged by one owner.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    seen: HashSet<String>,
}

impl Warnings {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning once per unique `(component, message)` pair.
    ///
    /// Returns `true` when the warning was emitted and `false` when it had
    /// already been seen.
    ///
    /// # Example
    /// ```
    /// use tagwise_common::warning::Warnings;
    /// let mut warnings = Warnings::new();
    /// let first = warnings.warn_once("engine", "directive references unknown rule 'foo'");
    /// let second = warnings.warn_once("engine", "directive references unknown rule 'foo'");
    /// assert!(first && !second);
    /// ```
    pub fn warn_once(&mut self, component: &str, message: &str) -> bool {
        let is_new = self.seen.insert(format!("[{component}] {message}"));
        if is_new {
            log::warn!(target: "tagwise", "[{component}] {message}");
        }
        is_new
    }

    /// Number of distinct warnings logged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
