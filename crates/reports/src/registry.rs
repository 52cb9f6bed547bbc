//! Process-wide report lookup.
//!
//! The registry is an explicit struct passed by handle, not a module-level
//! global. `builtin()` exposes the shared instance populated once from the
//! compiled-in catalog on first use; the `OnceLock` guard makes concurrent
//! first-use idempotent. Append-only: no removal for the process lifetime.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use stocklens_core::{Category, ReportError, ReportResult};

use crate::catalog;
use crate::definition::ReportDefinition;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("report id already registered: {0}")]
    Duplicate(String),
}

#[derive(Debug, Default)]
pub struct ReportRegistry {
    definitions: BTreeMap<&'static str, Arc<ReportDefinition>>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, failing if the id is already taken.
    pub fn register(&mut self, definition: ReportDefinition) -> Result<(), RegistryError> {
        let id = definition.id;
        if self.definitions.contains_key(id) {
            return Err(RegistryError::Duplicate(id.to_string()));
        }
        self.definitions.insert(id, Arc::new(definition));
        Ok(())
    }

    pub fn get(&self, id: &str) -> ReportResult<Arc<ReportDefinition>> {
        self.definitions
            .get(id)
            .cloned()
            .ok_or_else(|| ReportError::not_found(id))
    }

    pub fn list_by_category(&self, category: Category) -> Vec<Arc<ReportDefinition>> {
        self.definitions
            .values()
            .filter(|d| d.category == category)
            .cloned()
            .collect()
    }

    /// Categories with at least one registered report, sorted.
    pub fn categories(&self) -> Vec<Category> {
        let mut cats: Vec<Category> = self.definitions.values().map(|d| d.category).collect();
        cats.sort();
        cats.dedup();
        cats
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The shared registry holding the compiled-in catalog. Populated once
    /// on first call; subsequent (and concurrent) calls get the same
    /// instance.
    pub fn builtin() -> &'static ReportRegistry {
        static BUILTIN: OnceLock<ReportRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = ReportRegistry::new();
            for definition in catalog::definitions() {
                registry
                    .register(definition)
                    .expect("catalog report ids are unique");
            }
            registry
        })
    }
}
