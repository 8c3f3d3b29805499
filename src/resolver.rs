//! Interface-to-implementation resolution.

use std::collections::HashMap;

use crate::descriptor::ComponentDescriptor;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

/// Table mapping abstract-or-concrete types to one concrete implementor.
///
/// Every registered component maps to itself; each declared supertype and
/// directly implemented capability maps to the most-recently-registered
/// implementor. The last registrant for a given key wins silently, so
/// registration order is the override mechanism — no priority annotations.
pub struct TypeResolver {
    implementations: HashMap<TypeKey, TypeKey>,
}

impl TypeResolver {
    pub fn new() -> Self {
        TypeResolver {
            implementations: HashMap::new(),
        }
    }

    /// Records the descriptor's concrete type, its declared supertype chain,
    /// and its capability traits as resolving to the concrete type.
    pub fn register(&mut self, descriptor: &ComponentDescriptor) {
        let concrete = descriptor.type_key();
        self.implementations.insert(concrete, concrete);
        for provided in descriptor.supertypes.iter().chain(&descriptor.capabilities) {
            log::debug!("{} provides {}", concrete, provided.key);
            self.implementations.insert(provided.key, concrete);
        }
    }

    /// Drops a replaced descriptor's provided-type entries, leaving keys
    /// another component has since claimed untouched.
    pub(crate) fn unregister(&mut self, descriptor: &ComponentDescriptor) {
        let concrete = descriptor.type_key();
        for provided in descriptor.supertypes.iter().chain(&descriptor.capabilities) {
            if self.implementations.get(&provided.key) == Some(&concrete) {
                self.implementations.remove(&provided.key);
            }
        }
    }

    /// Maps a requested type to its concrete implementor.
    ///
    /// Only types never registered as (or provided by) a component can fail
    /// here, e.g. a bare trait no component implements.
    pub fn resolve(&self, requested: TypeKey) -> DiResult<TypeKey> {
        self.implementations
            .get(&requested)
            .copied()
            .ok_or(DiError::MissingImplementation(requested.name()))
    }

    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}
