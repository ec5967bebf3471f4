//! Error types for the dependency injection container.

use std::fmt;

/// Dependency injection errors.
///
/// Covers every failure surface of registration, validation, resolution,
/// and disposal.
///
/// # Examples
///
/// ```rust
/// use keelwork_di::{DiError, ServiceCollection, Resolver};
///
/// let provider = ServiceCollection::new().build().unwrap();
/// match provider.get::<String>() {
///     Err(DiError::NotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// Malformed constructor, illegal option combination, or invalid tag.
    Registration(String),
    /// Graph cycle, lifetime conflict, or missing required dependency found at `build()`.
    Validation(String),
    /// Service not registered.
    NotFound(&'static str),
    /// Type downcast failed (registry corruption or mismatched `AsTypes` alias).
    TypeMismatch(&'static str),
    /// Runtime circular dependency detected during resolution (includes the type chain).
    Circular(Vec<&'static str>),
    /// Maximum resolution-stack depth exceeded.
    DepthExceeded(usize),
    /// Invalid lifetime resolution, e.g. resolving a scoped service from the root provider.
    WrongLifetime(&'static str),
    /// Constructor or decorator failed; wraps the cause and names the failing key.
    Resolution {
        key: &'static str,
        source: Box<DiError>,
    },
    /// Operation invoked on a disposed Provider or Scope.
    Disposed(&'static str),
    /// Accumulated failures from disposing multiple resources.
    Composite(Vec<DiError>),
}

impl DiError {
    /// Wraps `self` as the cause of a resolution failure for `key`.
    pub fn wrap_resolution(self, key: &'static str) -> DiError {
        DiError::Resolution {
            key,
            source: Box::new(self),
        }
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::Registration(msg) => write!(f, "registration error: {}", msg),
            DiError::Validation(msg) => write!(f, "validation error: {}", msg),
            DiError::NotFound(name) => write!(f, "service not found: {}", name),
            DiError::TypeMismatch(name) => write!(f, "type mismatch for: {}", name),
            DiError::Circular(path) => write!(f, "circular dependency: {}", path.join(" -> ")),
            DiError::DepthExceeded(depth) => write!(f, "max resolution depth {} exceeded", depth),
            DiError::WrongLifetime(msg) => write!(f, "lifetime error: {}", msg),
            DiError::Resolution { key, source } => {
                write!(f, "failed to resolve {}: {}", key, source)
            }
            DiError::Disposed(name) => write!(f, "{} is disposed", name),
            DiError::Composite(errors) => {
                write!(f, "{} error(s) during disposal: ", errors.len())?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for DiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiError::Resolution { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
