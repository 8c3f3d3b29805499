//! Identity types for the type resolver and the bean registry.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key identifying a component type, concrete or abstract.
///
/// Works for structs and trait objects alike: `TypeKey::of::<Engine>()` and
/// `TypeKey::of::<dyn Vehicle>()` both produce stable keys. The type name
/// rides along for diagnostics; equality and hashing use only the `TypeId`.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully-qualified type name, used in error messages and as the
    /// default qualifier.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Registry identity: a concrete component type plus its qualifier.
///
/// The qualifier defaults to the type's fully-qualified name, so unqualified
/// requests for the same type collapse to a single bean, while two different
/// qualifiers for the same concrete type stay distinct beans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeanKey {
    type_key: TypeKey,
    qualifier: String,
}

impl BeanKey {
    pub fn new(type_key: TypeKey, qualifier: impl Into<String>) -> Self {
        BeanKey {
            type_key,
            qualifier: qualifier.into(),
        }
    }

    /// Identity under the default qualifier (the type's own name).
    pub fn unqualified(type_key: TypeKey) -> Self {
        BeanKey {
            qualifier: type_key.name().to_owned(),
            type_key,
        }
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl fmt::Display for BeanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.qualifier == self.type_key.name() {
            f.write_str(self.type_key.name())
        } else {
            write!(f, "{} ({})", self.type_key.name(), self.qualifier)
        }
    }
}
