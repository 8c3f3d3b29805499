//! # rivet-di
//!
//! Qualified singleton dependency injection with plan-based construction and
//! structural cycle detection.
//!
//! Components self-describe through [`ComponentDescriptor`]s — declared
//! qualifier, provided traits, constructors with per-parameter qualifier
//! metadata, injectable fields, post-construct hooks. The [`Container`]
//! resolves abstract types to concrete implementors (last registrant wins),
//! builds a [`ConstructionPlan`] per component with an explicit resolution
//! path for cycle detection, then instantiates the plans in discovery order.
//! Beans are memoized by (concrete type, qualifier) identity: however many
//! injection sites reference an identity, it is constructed at most once.
//!
//! ## Quick start
//!
//! ```rust
//! use rivet_di::{ComponentDescriptor, ConstructorSpec, Container};
//! use std::sync::Arc;
//!
//! struct Engine { cylinders: u32 }
//! struct Car { engine: Arc<Engine> }
//!
//! let mut container = Container::new();
//! container.register(
//!     ComponentDescriptor::of::<Engine>()
//!         .constructor(ConstructorSpec::<Engine>::new(|_| Ok(Engine { cylinders: 6 })))
//!         .build(),
//! );
//! container.register(
//!     ComponentDescriptor::of::<Car>()
//!         .constructor(
//!             ConstructorSpec::<Car>::new(|args| Ok(Car { engine: args.get::<Engine>(0)? }))
//!                 .param::<Engine>(),
//!         )
//!         .build(),
//! );
//! container.wire().unwrap();
//!
//! let car = container.get::<Car>(None).unwrap();
//! let engine = container.get::<Engine>(None).unwrap();
//! assert_eq!(car.engine.cylinders, 6);
//! assert!(Arc::ptr_eq(&car.engine, &engine)); // one bean per identity
//! ```
//!
//! ## Abstract types
//!
//! A component declares the traits it provides; requests for the trait
//! resolve to the most-recently-registered implementor.
//!
//! ```rust
//! use rivet_di::{ComponentDescriptor, ConstructorSpec, Container};
//!
//! trait Notifier: Send + Sync {
//!     fn channel(&self) -> &'static str;
//! }
//!
//! struct EmailNotifier;
//! impl Notifier for EmailNotifier {
//!     fn channel(&self) -> &'static str { "email" }
//! }
//!
//! let mut container = Container::new();
//! container.register(
//!     ComponentDescriptor::of::<EmailNotifier>()
//!         .implements::<dyn Notifier>(|n| n)
//!         .constructor(ConstructorSpec::<EmailNotifier>::new(|_| Ok(EmailNotifier)))
//!         .build(),
//! );
//! container.wire().unwrap();
//!
//! let notifier = container.get_trait::<dyn Notifier>(None).unwrap();
//! assert_eq!(notifier.channel(), "email");
//! ```
//!
//! ## Limitations
//!
//! Singleton is the only scope. The container is single-threaded and
//! synchronous; concurrent wiring or injection calls must be externally
//! serialized. Cycles are rejected structurally at plan-build time, so the
//! container never blocks or recurses unboundedly on a cyclic graph.

pub mod container;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod plan;
pub mod registry;
pub mod resolver;

pub use container::Container;
pub use descriptor::{AnyArc, ComponentBuilder, ComponentDescriptor, ConstructorSpec, CtorArgs};
pub use error::{BoxError, DiError, DiResult};
pub use key::{BeanKey, TypeKey};
pub use plan::ConstructionPlan;
pub use registry::BeanRegistry;
pub use resolver::TypeResolver;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Leaf;

    #[test]
    fn instantiate_is_memoized_across_plans() {
        let mut container = Container::new();
        container.register(
            ComponentDescriptor::of::<Leaf>()
                .constructor(ConstructorSpec::<Leaf>::new(|_| Ok(Leaf)))
                .build(),
        );

        let first_plan = container.build_plan::<Leaf>(None).unwrap();
        let second_plan = container.build_plan::<Leaf>(None).unwrap();

        let a = container.instantiate(&first_plan).unwrap();
        let b = container.instantiate(&first_plan).unwrap();
        let c = container.instantiate(&second_plan).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(container.registry().len(), 1);
    }

    #[test]
    fn pre_supplied_instance_short_circuits_construction() {
        let mut container = Container::new();
        container.register_instance(Leaf);
        container.register(
            ComponentDescriptor::of::<Leaf>()
                .constructor(ConstructorSpec::<Leaf>::new(|_| {
                    Err("factory must not run".into())
                }))
                .build(),
        );

        let plan = container.build_plan::<Leaf>(None).unwrap();
        assert!(container.instantiate(&plan).is_ok());
    }
}
