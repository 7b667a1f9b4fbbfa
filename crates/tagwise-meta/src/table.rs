//! The element metadata table.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::{Category, MetaData, MetaElement, MetaError};

/// Name of the wildcard entry merged into every other element.
const GLOBAL_ENTRY: &str = "*";

/// Bundled tables, by name.
const BUNDLED: &[(&str, &str)] = &[("html5", include_str!("../elements/html5.json"))];

/// Accumulates metadata sources until [`init`](Self::init) resolves them.
///
/// Sources are applied in load order; a later definition of the same element
/// replaces the earlier one. `inherit` is resolved at load time against the
/// entries loaded so far.
#[derive(Debug, Default, Clone)]
pub struct MetaTableBuilder {
    entries: BTreeMap<String, MetaData>,
}

impl MetaTableBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one of the tables shipped with the crate (currently `html5`).
    pub fn load_bundled(&mut self, name: &str) -> Result<&mut Self, MetaError> {
        let (_, json) = BUNDLED
            .iter()
            .find(|(bundle, _)| *bundle == name)
            .ok_or_else(|| MetaError::UnknownBundle(name.to_string()))?;
        self.load_from_str(json, name)
    }

    /// Load a JSON file.
    pub fn load_from_file(&mut self, path: &Path) -> Result<&mut Self, MetaError> {
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| MetaError::Io {
            path: display.clone(),
            source,
        })?;
        self.load_from_str(&json, &display)
    }

    /// Load JSON text. `source_name` is only used in error messages.
    pub fn load_from_str(&mut self, json: &str, source_name: &str) -> Result<&mut Self, MetaError> {
        let value: Value = serde_json::from_str(json).map_err(|source| MetaError::Json {
            source_name: source_name.to_string(),
            source,
        })?;
        self.load_from_value(&value, source_name)
    }

    /// Load an already parsed JSON object of `tagName -> entry`.
    pub fn load_from_value(&mut self, value: &Value, source_name: &str) -> Result<&mut Self, MetaError> {
        let Value::Object(elements) = value else {
            return Err(MetaError::NotAnObject(source_name.to_string()));
        };
        for (tag, entry) in elements {
            let data: MetaData =
                serde_json::from_value(entry.clone()).map_err(|err| MetaError::Schema {
                    source_name: source_name.to_string(),
                    tag: tag.clone(),
                    message: err.to_string(),
                })?;
            self.add_entry(tag, data)?;
        }
        log::debug!(target: "tagwise::meta", "loaded {} element(s) from {source_name}", elements.len());
        Ok(self)
    }

    /// Add a single entry, resolving its `inherit`.
    pub fn add_entry(&mut self, tag: &str, data: MetaData) -> Result<(), MetaError> {
        let key = if tag == GLOBAL_ENTRY {
            tag.to_string()
        } else {
            tag.to_ascii_lowercase()
        };
        let merged = match data.inherit.clone() {
            Some(parent) => {
                let base = self
                    .entries
                    .get(&parent.to_ascii_lowercase())
                    .cloned()
                    .ok_or_else(|| MetaError::UnknownInherit {
                        tag: key.clone(),
                        parent,
                    })?;
                base.overlay(data)
            }
            None => data,
        };
        let _ = self.entries.insert(key, merged);
        Ok(())
    }

    /// Merge the wildcard entry, resolve every descriptor and freeze the table.
    pub fn init(&self) -> Result<MetaTable, MetaError> {
        let mut entries = self.entries.clone();
        let global = entries.remove(GLOBAL_ENTRY);

        let mut elements = HashMap::with_capacity(entries.len());
        for (tag, data) in entries {
            let data = match &global {
                Some(defaults) => data.with_defaults(defaults),
                None => data,
            };
            let element = MetaElement::resolve(&tag, &data)?;
            let _ = elements.insert(tag, Arc::new(element));
        }
        Ok(MetaTable { elements })
    }
}

/// Resolved, immutable element metadata.
///
/// Descriptors are shared through [`Arc`] so a single table can back any
/// number of parses, on any number of threads.
#[derive(Debug, Default, Clone)]
pub struct MetaTable {
    elements: HashMap<String, Arc<MetaElement>>,
}

impl MetaTable {
    /// Shorthand for a table with only the bundled `html5` elements.
    pub fn html5() -> Result<Self, MetaError> {
        MetaTableBuilder::new().load_bundled("html5")?.init()
    }

    /// Descriptor for an element, by case-insensitive name.
    #[must_use]
    pub fn get_meta_for(&self, tag_name: &str) -> Option<Arc<MetaElement>> {
        self.elements.get(&tag_name.to_ascii_lowercase()).cloned()
    }

    /// Names of all elements statically marked with `category`, sorted.
    #[must_use]
    pub fn get_tags_with_property(&self, category: Category) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .elements
            .values()
            .filter(|meta| meta.has_static_category(category))
            .map(|meta| meta.tag_name.as_str())
            .collect();
        tags.sort_unstable();
        tags
    }

    /// Number of elements described.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element is described.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
