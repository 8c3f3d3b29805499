//! Bean storage keyed by (concrete type, qualifier).

use std::collections::HashMap;

use crate::descriptor::AnyArc;
use crate::key::BeanKey;

/// The sole long-lived owner of instantiated beans.
///
/// Append-only during a scan; there is no eviction and no scope below
/// singleton. Construction plans and the type resolver are transient by
/// comparison — once a scan completes, the registry is what application code
/// queries.
pub struct BeanRegistry {
    beans: HashMap<BeanKey, AnyArc>,
}

impl BeanRegistry {
    pub fn new() -> Self {
        BeanRegistry {
            beans: HashMap::new(),
        }
    }

    pub fn has(&self, key: &BeanKey) -> bool {
        self.beans.contains_key(key)
    }

    /// Returns the bean under `key`, still type-erased.
    pub fn get(&self, key: &BeanKey) -> Option<AnyArc> {
        self.beans.get(key).cloned()
    }

    pub(crate) fn insert(&mut self, key: BeanKey, value: AnyArc) {
        log::debug!("registered bean {}", key);
        self.beans.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new()
    }
}
