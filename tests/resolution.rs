use rivet_di::{ComponentDescriptor, ConstructorSpec, Container, DiError, TypeKey};
use std::sync::Arc;

trait Database: Send + Sync {
    fn name(&self) -> &'static str;
}

struct Sqlite;
impl Database for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }
}

struct Postgres;
impl Database for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }
}

fn database_component<T>(value: fn() -> T) -> ComponentDescriptor
where
    T: Database + Send + Sync + 'static,
{
    ComponentDescriptor::of::<T>()
        .implements::<dyn Database>(|db| db)
        .constructor(ConstructorSpec::<T>::new(move |_| Ok(value())))
        .build()
}

#[test]
fn unimplemented_trait_is_a_missing_implementation() {
    trait Orphan: Send + Sync {}

    let container = Container::new();
    match container.resolve::<dyn Orphan>() {
        Err(DiError::MissingImplementation(name)) => assert!(name.contains("Orphan")),
        other => panic!("expected missing implementation, got {:?}", other),
    }
    assert!(matches!(
        container.build_plan::<dyn Orphan>(None).map(|_| ()),
        Err(DiError::MissingImplementation(_))
    ));
}

#[test]
fn last_registered_implementor_wins() {
    let mut container = Container::new();
    container.register(database_component::<Sqlite>(|| Sqlite));
    container.register(database_component::<Postgres>(|| Postgres));
    container.wire().unwrap();

    assert_eq!(
        container.resolve::<dyn Database>().unwrap(),
        TypeKey::of::<Postgres>()
    );
    let db = container.get_trait::<dyn Database>(None).unwrap();
    assert_eq!(db.name(), "postgres");

    // Registration order decides, not type names: flip it and Sqlite wins.
    let mut container = Container::new();
    container.register(database_component::<Postgres>(|| Postgres));
    container.register(database_component::<Sqlite>(|| Sqlite));
    container.wire().unwrap();
    assert_eq!(
        container.get_trait::<dyn Database>(None).unwrap().name(),
        "sqlite"
    );
}

#[test]
fn components_resolve_to_themselves() {
    let mut container = Container::new();
    container.register(database_component::<Sqlite>(|| Sqlite));
    assert_eq!(
        container.resolve::<Sqlite>().unwrap(),
        TypeKey::of::<Sqlite>()
    );
}

#[test]
fn declared_supertypes_resolve_to_the_implementor() {
    trait Vehicle: Send + Sync {
        fn wheels(&self) -> u32;
    }
    trait Machine: Send + Sync {
        fn powered(&self) -> bool;
    }

    struct Truck;
    impl Vehicle for Truck {
        fn wheels(&self) -> u32 {
            6
        }
    }
    impl Machine for Truck {
        fn powered(&self) -> bool {
            true
        }
    }

    let mut container = Container::new();
    container.register(
        ComponentDescriptor::of::<Truck>()
            .extends::<dyn Vehicle>(|truck| truck)
            .extends::<dyn Machine>(|truck| truck)
            .constructor(ConstructorSpec::<Truck>::new(|_| Ok(Truck)))
            .build(),
    );
    container.wire().unwrap();

    // Every enumerated ancestor maps to the implementor.
    assert_eq!(
        container.resolve::<dyn Vehicle>().unwrap(),
        TypeKey::of::<Truck>()
    );
    assert_eq!(
        container.resolve::<dyn Machine>().unwrap(),
        TypeKey::of::<Truck>()
    );

    let vehicle = container.get_trait::<dyn Vehicle>(None).unwrap();
    assert_eq!(vehicle.wheels(), 6);
    assert!(container.get_trait::<dyn Machine>(None).unwrap().powered());

    // The ancestor lookup reaches the one concrete bean.
    let truck = container.get::<Truck>(None).unwrap();
    assert_eq!(container.registry().len(), 1);
    assert_eq!(truck.wheels(), vehicle.wheels());
}

#[test]
fn re_registration_withdraws_dropped_provided_types() {
    let mut container = Container::new();
    container.register(database_component::<Sqlite>(|| Sqlite));

    // Replace the descriptor with one that no longer provides the trait.
    container.register(
        ComponentDescriptor::of::<Sqlite>()
            .constructor(ConstructorSpec::<Sqlite>::new(|_| Ok(Sqlite)))
            .build(),
    );

    match container.resolve::<dyn Database>() {
        Err(DiError::MissingImplementation(name)) => assert!(name.contains("Database")),
        other => panic!("expected missing implementation, got {:?}", other),
    }

    // The concrete component itself still resolves and wires.
    container.wire().unwrap();
    assert!(container.get::<Sqlite>(None).is_ok());

    // A key claimed by a later implementor survives the earlier
    // component's re-registration.
    let mut container = Container::new();
    container.register(database_component::<Sqlite>(|| Sqlite));
    container.register(database_component::<Postgres>(|| Postgres));
    container.register(
        ComponentDescriptor::of::<Sqlite>()
            .constructor(ConstructorSpec::<Sqlite>::new(|_| Ok(Sqlite)))
            .build(),
    );
    container.wire().unwrap();
    assert_eq!(
        container.get_trait::<dyn Database>(None).unwrap().name(),
        "postgres"
    );
}

#[test]
fn trait_typed_parameter_receives_winning_implementor() {
    struct Repository {
        db: Arc<dyn Database>,
    }

    let mut container = Container::new();
    container.register(database_component::<Sqlite>(|| Sqlite));
    container.register(database_component::<Postgres>(|| Postgres));
    container.register(
        ComponentDescriptor::of::<Repository>()
            .constructor(
                ConstructorSpec::<Repository>::new(|args| {
                    Ok(Repository {
                        db: args.get_trait::<dyn Database>(0)?,
                    })
                })
                .param::<dyn Database>(),
            )
            .build(),
    );
    container.wire().unwrap();

    let repo = container.get::<Repository>(None).unwrap();
    assert_eq!(repo.db.name(), "postgres");

    // Same underlying bean as a direct trait lookup.
    let db = container.get_trait::<dyn Database>(None).unwrap();
    assert!(Arc::ptr_eq(&repo.db, &db));
}

#[test]
fn qualified_parameters_produce_distinct_beans() {
    struct Engine;
    struct Hauler {
        front: Arc<Engine>,
        spare: Arc<Engine>,
    }

    let mut container = Container::new();
    container.register(
        ComponentDescriptor::of::<Engine>()
            .constructor(ConstructorSpec::<Engine>::new(|_| Ok(Engine)))
            .build(),
    );
    container.register(
        ComponentDescriptor::of::<Hauler>()
            .constructor(
                ConstructorSpec::<Hauler>::new(|args| {
                    Ok(Hauler {
                        front: args.get::<Engine>(0)?,
                        spare: args.get::<Engine>(1)?,
                    })
                })
                .param::<Engine>()
                .qualified_param::<Engine>("spare"),
            )
            .build(),
    );
    container.wire().unwrap();

    let hauler = container.get::<Hauler>(None).unwrap();
    // Two qualifiers for the same concrete type are two beans.
    assert!(!Arc::ptr_eq(&hauler.front, &hauler.spare));

    let spare = container.get::<Engine>(Some("spare")).unwrap();
    assert!(Arc::ptr_eq(&spare, &hauler.spare));
}

#[test]
fn declared_qualifier_replaces_the_default() {
    struct Cache;

    let mut container = Container::new();
    container.register(
        ComponentDescriptor::of::<Cache>()
            .qualifier("l2")
            .constructor(ConstructorSpec::<Cache>::new(|_| Ok(Cache)))
            .build(),
    );
    container.wire().unwrap();

    // Unqualified lookups fall back to the declared qualifier.
    assert!(container.get::<Cache>(None).is_ok());
    assert!(container.get::<Cache>(Some("l2")).is_ok());
    match container.get::<Cache>(Some("l1")) {
        Err(DiError::BeanNotFound(key)) => assert!(key.contains("l1")),
        other => panic!("expected bean-not-found, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn get_before_wire_reports_bean_not_found() {
    let mut container = Container::new();
    container.register(database_component::<Sqlite>(|| Sqlite));

    assert!(matches!(
        container.get::<Sqlite>(None).map(|_| ()),
        Err(DiError::BeanNotFound(_))
    ));
}
