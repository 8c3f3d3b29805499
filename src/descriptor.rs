//! Component descriptors: declarative metadata driving resolution.
//!
//! A [`ComponentDescriptor`] is the component's self-description — its
//! declared qualifier, the supertypes and capability traits it provides,
//! its constructors with per-parameter qualifier metadata, its injectable
//! fields, and its post-construct hooks. Authors build one through the
//! typed [`ComponentBuilder`] and hand it to the container; the container
//! never inspects the component type itself.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult};
use crate::key::TypeKey;

/// Type-erased, shared component instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Upcast from a concrete instance to one of its provided abstract types.
///
/// Produces a double-wrapped value (`Arc<Arc<T>>` stored as `AnyArc`) so the
/// trait object survives erasure and can be recovered with a single downcast.
pub(crate) type CastFn = Arc<dyn Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync>;

type FactoryFn = Arc<dyn for<'a> Fn(&CtorArgs<'a>) -> Result<AnyArc, BoxError> + Send + Sync>;
type AssignFn = Arc<dyn Fn(&AnyArc, AnyArc) -> DiResult<()> + Send + Sync>;
type HookFn = Arc<dyn Fn(&AnyArc) -> Result<(), BoxError> + Send + Sync>;

/// Resolved constructor arguments, in declared parameter order.
pub struct CtorArgs<'a> {
    values: &'a [AnyArc],
}

impl<'a> CtorArgs<'a> {
    pub(crate) fn new(values: &'a [AnyArc]) -> Self {
        CtorArgs { values }
    }

    /// Takes the parameter at `index` as a concrete type.
    ///
    /// Use for parameters declared with [`ConstructorSpec::param`] naming the
    /// dependency's own concrete type.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; the plan builder guarantees one
    /// argument per declared parameter.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.values[index]
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Takes the parameter at `index` as an abstract type (trait object or
    /// declared supertype).
    ///
    /// Use for parameters declared against a type the dependency provides via
    /// [`ComponentBuilder::implements`] or [`ComponentBuilder::extends`].
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range; the plan builder guarantees one
    /// argument per declared parameter.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.values[index]
            .clone()
            .downcast::<Arc<T>>()
            .map(|outer| (*outer).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One constructor parameter: its declared type and optional qualifier
/// override from the injection site.
#[derive(Clone)]
pub(crate) struct ParamSpec {
    pub(crate) type_key: TypeKey,
    pub(crate) qualifier: Option<String>,
}

/// Erased constructor: autowire mark, parameter list, and factory closure.
#[derive(Clone)]
pub(crate) struct Constructor {
    pub(crate) autowired: bool,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) factory: FactoryFn,
}

/// Declaration of one constructor for component type `C`.
///
/// The factory receives its dependencies already resolved, in the order the
/// parameters were declared.
///
/// # Examples
///
/// ```
/// use rivet_di::{ConstructorSpec, CtorArgs};
/// use std::sync::Arc;
///
/// struct Engine;
/// struct Car { engine: Arc<Engine> }
///
/// let spec = ConstructorSpec::<Car>::new(|args| {
///     Ok(Car { engine: args.get::<Engine>(0)? })
/// })
/// .param::<Engine>();
/// ```
pub struct ConstructorSpec<C> {
    autowired: bool,
    params: Vec<ParamSpec>,
    factory: Arc<dyn for<'a> Fn(&CtorArgs<'a>) -> Result<C, BoxError> + Send + Sync>,
}

impl<C: Send + Sync + 'static> ConstructorSpec<C> {
    pub fn new<F>(factory: F) -> Self
    where
        F: for<'a> Fn(&CtorArgs<'a>) -> Result<C, BoxError> + Send + Sync + 'static,
    {
        ConstructorSpec {
            autowired: false,
            params: Vec::new(),
            factory: Arc::new(factory),
        }
    }

    /// Marks this constructor as the autowire-eligible one. When a component
    /// declares several constructors, the first marked one is selected
    /// regardless of declaration order.
    pub fn autowired(mut self) -> Self {
        self.autowired = true;
        self
    }

    /// Declares the next parameter with no qualifier override.
    pub fn param<T: ?Sized + 'static>(mut self) -> Self {
        self.params.push(ParamSpec {
            type_key: TypeKey::of::<T>(),
            qualifier: None,
        });
        self
    }

    /// Declares the next parameter with a qualifier override for the
    /// injection site.
    pub fn qualified_param<T: ?Sized + 'static>(mut self, qualifier: &str) -> Self {
        self.params.push(ParamSpec {
            type_key: TypeKey::of::<T>(),
            qualifier: Some(qualifier.to_owned()),
        });
        self
    }

    fn erase(self) -> Constructor {
        let factory = self.factory;
        Constructor {
            autowired: self.autowired,
            params: self.params,
            factory: Arc::new(move |args: &CtorArgs<'_>| {
                factory(args).map(|value| Arc::new(value) as AnyArc)
            }),
        }
    }
}

/// An abstract type a component provides, with the upcast to reach it.
pub(crate) struct ProvidedType {
    pub(crate) key: TypeKey,
    pub(crate) cast: CastFn,
}

/// An injectable field: declared type, optional qualifier, assignment.
pub(crate) struct FieldSpec {
    pub(crate) type_key: TypeKey,
    pub(crate) qualifier: Option<String>,
    pub(crate) assign: AssignFn,
}

/// A post-construct hook. Hooks extracted with a nonzero parameter count are
/// authoring mistakes; the wire pass reports and skips them.
pub(crate) struct HookSpec {
    pub(crate) name: &'static str,
    pub(crate) param_count: usize,
    pub(crate) invoke: HookFn,
}

/// Self-description of a component type.
///
/// Start from [`ComponentDescriptor::of`] and finish with
/// [`ComponentBuilder::build`].
pub struct ComponentDescriptor {
    pub(crate) type_key: TypeKey,
    pub(crate) qualifier: Option<String>,
    pub(crate) supertypes: Vec<ProvidedType>,
    pub(crate) capabilities: Vec<ProvidedType>,
    pub(crate) constructors: Vec<Constructor>,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) hooks: Vec<HookSpec>,
}

impl ComponentDescriptor {
    /// Starts describing component type `C`.
    pub fn of<C: Send + Sync + 'static>() -> ComponentBuilder<C> {
        ComponentBuilder {
            inner: ComponentDescriptor {
                type_key: TypeKey::of::<C>(),
                qualifier: None,
                supertypes: Vec::new(),
                capabilities: Vec::new(),
                constructors: Vec::new(),
                fields: Vec::new(),
                hooks: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Looks up the upcast for a provided abstract type.
    pub(crate) fn caster(&self, key: &TypeKey) -> Option<&CastFn> {
        self.supertypes
            .iter()
            .chain(&self.capabilities)
            .find(|provided| provided.key == *key)
            .map(|provided| &provided.cast)
    }
}

/// Typed builder for [`ComponentDescriptor`].
pub struct ComponentBuilder<C> {
    inner: ComponentDescriptor,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Send + Sync + 'static> ComponentBuilder<C> {
    /// Declares an explicit qualifier for this component, replacing the
    /// default (the type's fully-qualified name).
    pub fn qualifier(mut self, name: &str) -> Self {
        self.inner.qualifier = Some(name.to_owned());
        self
    }

    /// Declares an ancestor type this component satisfies. List the chain
    /// explicitly, nearest first; every listed entry is registered with the
    /// type resolver.
    pub fn extends<T: ?Sized + Send + Sync + 'static>(mut self, cast: fn(Arc<C>) -> Arc<T>) -> Self {
        self.inner.supertypes.push(provided::<C, T>(cast));
        self
    }

    /// Declares a directly implemented capability trait. Not transitive:
    /// supertraits of `T` are not registered unless listed themselves.
    pub fn implements<T: ?Sized + Send + Sync + 'static>(
        mut self,
        cast: fn(Arc<C>) -> Arc<T>,
    ) -> Self {
        self.inner.capabilities.push(provided::<C, T>(cast));
        self
    }

    /// Declares a constructor. A single declared constructor is always used;
    /// with several, the first autowire-marked one wins, else the first
    /// declared (an indeterminate policy callers should not rely on).
    pub fn constructor(mut self, spec: ConstructorSpec<C>) -> Self {
        self.inner.constructors.push(spec.erase());
        self
    }

    /// Declares an autowired field of a concrete type. The assignment closure
    /// runs during the wire pass, after this component is constructed; the
    /// component is expected to hold a settable cell for the field.
    pub fn inject_field<T, F>(mut self, qualifier: Option<&str>, assign: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&C, Arc<T>) + Send + Sync + 'static,
    {
        self.inner.fields.push(FieldSpec {
            type_key: TypeKey::of::<T>(),
            qualifier: qualifier.map(str::to_owned),
            assign: Arc::new(move |bean: &AnyArc, value: AnyArc| {
                let bean = downcast_bean::<C>(bean)?;
                let value = value
                    .downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
                assign(bean, value);
                Ok(())
            }),
        });
        self
    }

    /// Declares an autowired field of an abstract type (trait object or
    /// declared supertype).
    pub fn inject_trait_field<T, F>(mut self, qualifier: Option<&str>, assign: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&C, Arc<T>) + Send + Sync + 'static,
    {
        self.inner.fields.push(FieldSpec {
            type_key: TypeKey::of::<T>(),
            qualifier: qualifier.map(str::to_owned),
            assign: Arc::new(move |bean: &AnyArc, value: AnyArc| {
                let bean = downcast_bean::<C>(bean)?;
                let value = value
                    .downcast::<Arc<T>>()
                    .map(|outer| (*outer).clone())
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
                assign(bean, value);
                Ok(())
            }),
        });
        self
    }

    /// Declares a zero-argument post-construct hook, invoked during the wire
    /// pass after construction and field injection.
    pub fn post_construct<F>(mut self, name: &'static str, hook: F) -> Self
    where
        F: Fn(&C) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.inner.hooks.push(HookSpec {
            name,
            param_count: 0,
            invoke: Arc::new(move |bean: &AnyArc| hook(downcast_bean::<C>(bean)?)),
        });
        self
    }

    /// Records a post-construct hook that was extracted with a nonzero
    /// parameter count. Such hooks cannot be invoked; the wire pass reports
    /// them and continues with the component's siblings.
    pub fn post_construct_with_params(mut self, name: &'static str, param_count: usize) -> Self {
        self.inner.hooks.push(HookSpec {
            name,
            param_count,
            invoke: Arc::new(|_: &AnyArc| Ok(())),
        });
        self
    }

    pub fn build(self) -> ComponentDescriptor {
        self.inner
    }
}

fn provided<C, T>(cast: fn(Arc<C>) -> Arc<T>) -> ProvidedType
where
    C: Send + Sync + 'static,
    T: ?Sized + Send + Sync + 'static,
{
    ProvidedType {
        key: TypeKey::of::<T>(),
        cast: Arc::new(move |any: AnyArc| {
            let concrete = any
                .downcast::<C>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<C>()))?;
            Ok(Arc::new(cast(concrete)) as AnyArc)
        }),
    }
}

fn downcast_bean<C: Send + Sync + 'static>(bean: &AnyArc) -> DiResult<&C> {
    bean.downcast_ref::<C>()
        .ok_or(DiError::TypeMismatch(std::any::type_name::<C>()))
}
