//! Service descriptors: normalized registration records.

use std::any::TypeId;

use crate::key::Key;
use crate::lifetime::Lifetime;

/// One edge from a descriptor to a dependency it needs resolved before it
/// can be constructed.
///
/// `optional` dependencies do not contribute an edge to the dependency graph
/// and are tolerated as missing at validation time.
#[derive(Debug, Clone)]
pub struct DependencyRef {
    /// The key the dependency resolves through.
    pub key: Key,
    /// Whether a missing registration for `key` is tolerated.
    pub optional: bool,
}

impl DependencyRef {
    /// A required dependency on `key`.
    pub fn required(key: Key) -> Self {
        Self {
            key,
            optional: false,
        }
    }

    /// An optional dependency on `key`.
    pub fn optional(key: Key) -> Self {
        Self {
            key,
            optional: true,
        }
    }
}

/// Normalized registration record for introspection, diagnostics, and
/// dependency-graph construction.
///
/// # Examples
///
/// ```rust
/// use keelwork_di::{ServiceCollection, Lifetime};
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(42u32);
/// services.add_named_singleton("database_port", 5432u32);
///
/// let descriptors = services.get_service_descriptors();
/// let named = descriptors.iter().find(|d| d.is_named()).unwrap();
/// assert_eq!(named.service_name(), Some("database_port"));
/// assert_eq!(named.lifetime, Lifetime::Singleton);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// The key this descriptor is registered under.
    pub key: Key,
    /// Service lifetime.
    pub lifetime: Lifetime,
    /// Implementation type ID, when the backing concrete type is known.
    pub impl_type_id: Option<TypeId>,
    /// Implementation type name, when known.
    pub impl_type_name: Option<&'static str>,
    /// Dependencies this descriptor's constructor declared.
    pub dependencies: Vec<DependencyRef>,
    /// Additional keys this descriptor is also reachable under (`AsTypes`).
    /// Aliases share the constructor and cache slot of the primary key —
    /// resolving an alias never re-invokes the constructor.
    pub as_types: Vec<Key>,
}

impl ServiceDescriptor {
    /// The discriminator name for named services, or `None`.
    pub fn service_name(&self) -> Option<&'static str> {
        self.key.service_name()
    }

    /// The group name for grouped services, or `None`.
    pub fn group_name(&self) -> Option<&'static str> {
        self.key.group_name()
    }

    /// Human-readable type or trait name.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// Whether this descriptor carries a discriminator name.
    pub fn is_named(&self) -> bool {
        self.service_name().is_some()
    }

    /// Whether this descriptor belongs to a group.
    pub fn is_grouped(&self) -> bool {
        self.group_name().is_some()
    }
}
