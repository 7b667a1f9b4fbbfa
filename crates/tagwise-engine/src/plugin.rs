//! Extension point for host applications.

use tagwise_html::{EventHandler, Source};

use crate::rules::RuleRegistry;

/// A bundle of extra rules and per-source setup.
///
/// Plugins are provided by the host and enabled by name in the configuration.
pub trait Plugin: Send + Sync {
    /// Name used in the `plugins` configuration list.
    fn name(&self) -> &str;

    /// Add rule definitions. Called once when the configuration is resolved.
    fn register_rules(&self, registry: &mut RuleRegistry) {
        let _ = registry;
    }

    /// Called for each source before rules are set up, with the event hub
    /// that will parse it.
    fn setup(&self, source: &Source, events: &EventHandler) {
        let _ = (source, events);
    }
}
