//! Error types for the dependency injection container.

use thiserror::Error;

/// Boxed error returned by component factories and lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Dependency injection errors.
///
/// All failures surface synchronously from the call that triggered them; the
/// container performs no retries and no partial-result salvage.
#[derive(Debug, Error)]
pub enum DiError {
    /// The requested type was never registered as a component, directly or
    /// through a supertype/capability declaration.
    #[error("no implementation found for {0}")]
    MissingImplementation(&'static str),

    /// A (concrete type, qualifier) identity reappeared in the active
    /// resolution path. Detected at plan-build time, before any
    /// instantiation; the path lists each identity down to the repeat.
    #[error("circular dependency detected when loading {type_name}: {}", path.join(" -> "))]
    CircularDependency {
        type_name: &'static str,
        path: Vec<String>,
    },

    /// A component declares no constructor at all.
    #[error("no constructor declared for {0}")]
    NoConstructor(&'static str),

    /// The component's factory failed while constructing the instance.
    #[error("failed to construct {type_name}")]
    Instantiation {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },

    /// A downcast at a type-erased seam failed.
    #[error("type mismatch for {0}")]
    TypeMismatch(&'static str),

    /// No bean is registered under the requested identity.
    #[error("no bean registered for {0}")]
    BeanNotFound(String),

    /// A post-construct hook failed; this aborts the wire pass.
    #[error("post-construct hook failed for {type_name}")]
    PostConstruct {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
}

/// Result type for container operations.
pub type DiResult<T> = Result<T, DiError>;
