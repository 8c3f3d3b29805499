//! Construction plans: resolved, not-yet-instantiated dependency trees.
//!
//! A plan is built exactly once per injection site, before any object is
//! created. Cycle detection happens here, structurally, by checking the
//! in-progress resolution path — never by a runtime deadline. Instantiation
//! is a separate, memoized step: the registry is consulted first, so an
//! identity referenced from many plan nodes is constructed at most once.

use std::collections::HashMap;

use crate::descriptor::{AnyArc, CastFn, ComponentDescriptor, Constructor, CtorArgs};
use crate::error::{DiError, DiResult};
use crate::key::{BeanKey, TypeKey};
use crate::registry::BeanRegistry;
use crate::resolver::TypeResolver;

/// Chain of in-progress identities from the root request down to the current
/// node. Copied per branch: two sibling subtrees may each depend on the same
/// type without tripping cycle detection on each other.
pub(crate) type ResolutionPath = Vec<BeanKey>;

/// The resolved dependency tree for one injection request.
///
/// Holds the concrete identity, the selected constructor, and one child plan
/// per constructor parameter, in parameter order. Plan nodes are not shared
/// across sites even when they resolve to the same identity; deduplication
/// happens at instantiation time through the registry.
pub struct ConstructionPlan {
    key: BeanKey,
    /// Upcast applied when handing the instance to the requester, present
    /// only when the request was for an abstract type.
    adapt: Option<CastFn>,
    ctor: Constructor,
    children: Vec<ConstructionPlan>,
}

impl ConstructionPlan {
    /// The concrete identity this plan constructs.
    pub fn key(&self) -> &BeanKey {
        &self.key
    }

    /// Child plans, one per constructor parameter.
    pub fn children(&self) -> &[ConstructionPlan] {
        &self.children
    }

    /// Constructs the bean, memoized through the registry.
    ///
    /// If a bean already exists under this plan's identity it is returned
    /// as-is. Otherwise children are instantiated depth-first in parameter
    /// order, the constructor is invoked, and the new instance is registered.
    /// Registration is the only mutation; a factory failure propagates as
    /// [`DiError::Instantiation`] without retry.
    pub(crate) fn instantiate(&self, registry: &mut BeanRegistry) -> DiResult<AnyArc> {
        let value = match registry.get(&self.key) {
            Some(existing) => existing,
            None => {
                let mut args = Vec::with_capacity(self.children.len());
                for child in &self.children {
                    args.push(child.instantiate(registry)?);
                }
                let value = (self.ctor.factory)(&CtorArgs::new(&args)).map_err(|source| {
                    DiError::Instantiation {
                        type_name: self.key.type_key().name(),
                        source,
                    }
                })?;
                registry.insert(self.key.clone(), value.clone());
                value
            }
        };
        match &self.adapt {
            Some(cast) => cast(value),
            None => Ok(value),
        }
    }
}

/// Recursively builds a plan for `requested`, carrying the active resolution
/// path for cycle detection.
pub(crate) fn build(
    requested: TypeKey,
    qualifier_override: Option<&str>,
    resolver: &TypeResolver,
    descriptors: &HashMap<TypeKey, ComponentDescriptor>,
    path: &ResolutionPath,
) -> DiResult<ConstructionPlan> {
    let concrete = resolver.resolve(requested)?;
    let descriptor = descriptors
        .get(&concrete)
        .ok_or(DiError::MissingImplementation(concrete.name()))?;

    let qualifier = match qualifier_override {
        Some(given) => given.to_owned(),
        None => descriptor
            .qualifier
            .clone()
            .unwrap_or_else(|| concrete.name().to_owned()),
    };
    let key = BeanKey::new(concrete, qualifier);

    // Checked before recursing into parameters so cycles fail with a
    // path-identifying error instead of unbounded recursion.
    if path.contains(&key) {
        let mut cycle: Vec<String> = path.iter().map(BeanKey::to_string).collect();
        cycle.push(key.to_string());
        return Err(DiError::CircularDependency {
            type_name: concrete.name(),
            path: cycle,
        });
    }
    let mut branch = path.clone();
    branch.push(key.clone());

    let ctor = select_constructor(descriptor)?;
    let mut children = Vec::with_capacity(ctor.params.len());
    for param in &ctor.params {
        children.push(build(
            param.type_key,
            param.qualifier.as_deref(),
            resolver,
            descriptors,
            &branch,
        )?);
    }

    let adapt = if requested == concrete {
        None
    } else {
        Some(
            descriptor
                .caster(&requested)
                .cloned()
                .ok_or(DiError::TypeMismatch(requested.name()))?,
        )
    };

    Ok(ConstructionPlan {
        key,
        adapt,
        ctor: ctor.clone(),
        children,
    })
}

fn select_constructor(descriptor: &ComponentDescriptor) -> DiResult<&Constructor> {
    let first = descriptor
        .constructors
        .first()
        .ok_or(DiError::NoConstructor(descriptor.type_key().name()))?;
    if descriptor.constructors.len() > 1 {
        if let Some(marked) = descriptor.constructors.iter().find(|ctor| ctor.autowired) {
            return Ok(marked);
        }
    }
    Ok(first)
}
