//! Descriptor registry.
//!
//! Maps entity names to their [`EntityDescriptor`]s. Entries are added once,
//! at registration, and never changed afterward. The [`Store`](crate::Store)
//! owns its registry and only hands out shared references, so after startup
//! every CRUD call reads it without synchronization.

use std::collections::BTreeMap;

use crate::descriptor::EntityDescriptor;
use crate::error::{Result, StoreError};

/// Registered entity descriptors, keyed by entity name.
#[derive(Debug, Default)]
pub struct Registry {
    descriptors: BTreeMap<String, EntityDescriptor>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEntity`] if the name is taken.
    pub(crate) fn insert(&mut self, descriptor: EntityDescriptor) -> Result<&EntityDescriptor> {
        let name = descriptor.name().to_string();
        if self.descriptors.contains_key(&name) {
            return Err(StoreError::DuplicateEntity(name));
        }
        Ok(self.descriptors.entry(name).or_insert(descriptor))
    }

    /// Looks up a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEntity`] if the entity was never registered.
    pub fn get(&self, name: &str) -> Result<&EntityDescriptor> {
        self.descriptors
            .get(name)
            .ok_or_else(|| StoreError::UnknownEntity(name.to_string()))
    }

    /// Returns `true` if an entity with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Registered entity names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
