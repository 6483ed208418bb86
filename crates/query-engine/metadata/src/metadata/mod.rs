//! Metadata information regarding the resources we serve.

pub mod database;

// re-export without modules
pub use database::*;

use std::collections::BTreeMap;
use std::sync::Arc;

/// Metadata information.
///
/// Each schema is shared by every request for its resource, so they are kept behind an `Arc`.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Metadata {
    pub resources: BTreeMap<String, Arc<ResourceSchema>>,
}

impl Metadata {
    pub fn empty() -> Self {
        Metadata {
            resources: BTreeMap::new(),
        }
    }

    /// Register a resource. Registering the same name twice replaces the earlier schema.
    pub fn register(&mut self, schema: ResourceSchema) {
        self.resources
            .insert(schema.name().to_string(), Arc::new(schema));
    }

    /// Look up the schema of a resource by its name.
    pub fn lookup_resource(&self, name: &str) -> Option<&Arc<ResourceSchema>> {
        self.resources.get(name)
    }
}
