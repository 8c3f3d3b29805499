//! The container: one object owning the resolver, the registry, and the
//! registered component descriptors.
//!
//! A container is built per application or per scan and passed by reference
//! to all resolution calls; there is no hidden process-wide state. Execution
//! is single-threaded and synchronous — concurrent wiring or injection calls
//! are unsupported and must be externally serialized.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{AnyArc, ComponentDescriptor};
use crate::error::{DiError, DiResult};
use crate::key::{BeanKey, TypeKey};
use crate::plan::{self, ConstructionPlan};
use crate::registry::BeanRegistry;
use crate::resolver::TypeResolver;

/// Dependency injection container with qualified singleton beans.
///
/// # Examples
///
/// ```
/// use rivet_di::{ComponentDescriptor, ConstructorSpec, Container};
/// use std::sync::Arc;
///
/// struct Engine { cylinders: u32 }
/// struct Car { engine: Arc<Engine> }
///
/// let mut container = Container::new();
/// container.register(
///     ComponentDescriptor::of::<Engine>()
///         .constructor(ConstructorSpec::<Engine>::new(|_| Ok(Engine { cylinders: 4 })))
///         .build(),
/// );
/// container.register(
///     ComponentDescriptor::of::<Car>()
///         .constructor(
///             ConstructorSpec::<Car>::new(|args| Ok(Car { engine: args.get::<Engine>(0)? }))
///                 .param::<Engine>(),
///         )
///         .build(),
/// );
/// container.wire()?;
///
/// let car = container.get::<Car>(None)?;
/// assert_eq!(car.engine.cylinders, 4);
/// # Ok::<(), rivet_di::DiError>(())
/// ```
pub struct Container {
    resolver: TypeResolver,
    registry: BeanRegistry,
    descriptors: HashMap<TypeKey, ComponentDescriptor>,
    discovery_order: Vec<TypeKey>,
}

impl Container {
    pub fn new() -> Self {
        Container {
            resolver: TypeResolver::new(),
            registry: BeanRegistry::new(),
            descriptors: HashMap::new(),
            discovery_order: Vec::new(),
        }
    }

    /// Registers a candidate component.
    ///
    /// Discovery order is the order of `register` calls; it drives both the
    /// [`wire`](Container::wire) pass and the last-write-wins policy for
    /// abstract type resolution. Re-registering the same concrete type
    /// replaces its descriptor without changing its discovery position;
    /// provided types the replacement no longer declares are withdrawn from
    /// the resolver.
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> &mut Self {
        log::debug!("registering component {}", descriptor.type_key());
        let key = descriptor.type_key();
        if let Some(previous) = self.descriptors.get(&key) {
            self.resolver.unregister(previous);
        }
        self.resolver.register(&descriptor);
        if self.descriptors.insert(key, descriptor).is_none() {
            self.discovery_order.push(key);
        }
        self
    }

    /// Registers a pre-supplied root instance under its default identity.
    ///
    /// The instance enters the registry directly, without a descriptor, and
    /// is honored by memoization: components depending on `T` receive it
    /// instead of triggering a construction.
    pub fn register_instance<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        let key = BeanKey::unqualified(TypeKey::of::<T>());
        self.registry.insert(key, Arc::new(value));
        self
    }

    /// Registers a pre-supplied root instance under an explicit qualifier.
    pub fn register_named_instance<T: Send + Sync + 'static>(
        &mut self,
        qualifier: &str,
        value: T,
    ) -> &mut Self {
        let key = BeanKey::new(TypeKey::of::<T>(), qualifier);
        self.registry.insert(key, Arc::new(value));
        self
    }

    /// Maps a requested type to its concrete implementor.
    pub fn resolve<T: ?Sized + 'static>(&self) -> DiResult<TypeKey> {
        self.resolver.resolve(TypeKey::of::<T>())
    }

    /// Builds a construction plan for `T`, performing cycle detection.
    ///
    /// Independently invocable for any (type, qualifier) pair, before or
    /// after [`wire`](Container::wire); instantiating the plan honors the
    /// already-populated registry.
    pub fn build_plan<T: ?Sized + 'static>(
        &self,
        qualifier: Option<&str>,
    ) -> DiResult<ConstructionPlan> {
        plan::build(
            TypeKey::of::<T>(),
            qualifier,
            &self.resolver,
            &self.descriptors,
            &Vec::new(),
        )
    }

    /// Instantiates a plan, memoized through the registry.
    pub fn instantiate(&mut self, plan: &ConstructionPlan) -> DiResult<AnyArc> {
        plan.instantiate(&mut self.registry)
    }

    /// Full scan-order pass.
    ///
    /// Builds a plan for every registered component in discovery order (all
    /// cycle detection happens up front), then instantiates the plans in that
    /// order; after each bean is constructed, its autowired fields are
    /// resolved and assigned and its post-construct hooks run. A failed plan
    /// or instantiation aborts the pass.
    pub fn wire(&mut self) -> DiResult<()> {
        let mut plans = Vec::with_capacity(self.discovery_order.len());
        for key in &self.discovery_order {
            plans.push(plan::build(
                *key,
                None,
                &self.resolver,
                &self.descriptors,
                &Vec::new(),
            )?);
        }
        for plan in &plans {
            log::debug!("wiring {}", plan.key());
            let bean = plan.instantiate(&mut self.registry)?;
            Self::apply_lifecycle(
                &self.descriptors,
                &self.resolver,
                &mut self.registry,
                plan.key().type_key(),
                &bean,
            )?;
        }
        Ok(())
    }

    /// Whether a bean exists under (T, qualifier).
    pub fn contains<T: ?Sized + 'static>(&self, qualifier: Option<&str>) -> bool {
        let type_key = TypeKey::of::<T>();
        let key = BeanKey::new(type_key, self.effective_qualifier(type_key, qualifier));
        self.registry.has(&key)
    }

    /// Fetches a bean by its concrete type.
    ///
    /// With no qualifier given, the component's declared qualifier applies,
    /// falling back to the type's fully-qualified name.
    pub fn get<T: Send + Sync + 'static>(&self, qualifier: Option<&str>) -> DiResult<Arc<T>> {
        let type_key = TypeKey::of::<T>();
        let key = BeanKey::new(type_key, self.effective_qualifier(type_key, qualifier));
        self.registry
            .get(&key)
            .ok_or_else(|| DiError::BeanNotFound(key.to_string()))?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(type_key.name()))
    }

    /// Fetches a fully-wired bean by an abstract type it provides.
    ///
    /// Resolves `T` to its concrete implementor, looks the bean up under the
    /// concrete identity, and upcasts through the component's declared cast.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: Option<&str>,
    ) -> DiResult<Arc<T>> {
        let requested = TypeKey::of::<T>();
        let concrete = self.resolver.resolve(requested)?;
        let key = BeanKey::new(concrete, self.effective_qualifier(concrete, qualifier));
        let value = self
            .registry
            .get(&key)
            .ok_or_else(|| DiError::BeanNotFound(key.to_string()))?;
        let descriptor = self
            .descriptors
            .get(&concrete)
            .ok_or(DiError::MissingImplementation(concrete.name()))?;
        let cast = descriptor
            .caster(&requested)
            .ok_or(DiError::TypeMismatch(requested.name()))?;
        cast(value)?
            .downcast::<Arc<T>>()
            .map(|outer| (*outer).clone())
            .map_err(|_| DiError::TypeMismatch(requested.name()))
    }

    /// Direct access to the bean registry.
    pub fn registry(&self) -> &BeanRegistry {
        &self.registry
    }

    fn effective_qualifier(&self, type_key: TypeKey, qualifier: Option<&str>) -> String {
        match qualifier {
            Some(given) => given.to_owned(),
            None => self
                .descriptors
                .get(&type_key)
                .and_then(|descriptor| descriptor.qualifier.clone())
                .unwrap_or_else(|| type_key.name().to_owned()),
        }
    }

    fn apply_lifecycle(
        descriptors: &HashMap<TypeKey, ComponentDescriptor>,
        resolver: &TypeResolver,
        registry: &mut BeanRegistry,
        type_key: TypeKey,
        bean: &AnyArc,
    ) -> DiResult<()> {
        let Some(descriptor) = descriptors.get(&type_key) else {
            return Ok(());
        };
        for field in &descriptor.fields {
            let plan = plan::build(
                field.type_key,
                field.qualifier.as_deref(),
                resolver,
                descriptors,
                &Vec::new(),
            )?;
            let value = plan.instantiate(registry)?;
            (field.assign)(bean, value)?;
        }
        for hook in &descriptor.hooks {
            if hook.param_count > 0 {
                // Authoring mistake: reported, siblings still complete.
                log::error!(
                    "post-construct hook {} on {} must not take parameters; skipping",
                    hook.name,
                    type_key
                );
                continue;
            }
            (hook.invoke)(bean).map_err(|source| DiError::PostConstruct {
                type_name: type_key.name(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
