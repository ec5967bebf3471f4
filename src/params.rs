//! Parameter objects: grouping several dependencies into one constructor input.
//!
//! A type implementing [`ParamsObject`] declares, once, both the dependency
//! list a registration needs for the graph (`dependencies()`) and how to
//! build itself from a live resolver (`resolve()`). [`ParamsBuilder`] is the
//! ergonomic helper constructors use inside `resolve()` to pull each field.

use std::sync::Arc;

use crate::descriptors::DependencyRef;
use crate::error::{DiError, DiResult};
use crate::key::{key_of_group, key_of_named, key_of_type};
use crate::traits::ResolverCore;

/// A struct grouping several constructor dependencies into one input value.
///
/// Implementers list their fields twice, deliberately: once in
/// `dependencies()` (consulted by the registration DSL to build the
/// dependency graph before any resolver exists) and once in `resolve()`
/// (run inside the factory, against a live resolver). Keeping the two in
/// sync is the caller's responsibility, the same way `.depends_on::<T>()`
/// calls must match what a factory actually resolves.
pub trait ParamsObject: Sized + Send + Sync + 'static {
    /// The dependencies this parameter object will resolve, for the
    /// dependency graph and validator.
    fn dependencies() -> Vec<DependencyRef>;

    /// Builds `Self` by resolving each declared field from `resolver`.
    fn resolve(resolver: &dyn ResolverCore) -> DiResult<Self>;
}

/// Resolves individual fields of a [`ParamsObject`] against a live resolver.
pub struct ParamsBuilder<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ParamsBuilder<'a> {
    pub fn new(resolver: &'a dyn ResolverCore) -> Self {
        Self { resolver }
    }

    /// Resolves `T` by its unkeyed, ungrouped registration.
    pub fn field<T: 'static>(&self) -> DiResult<Arc<T>> {
        let any = self.resolver.resolve_any(&key_of_type::<T>())?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves `T` registered under the discriminator `name`.
    pub fn keyed_field<T: 'static>(&self, name: &'static str) -> DiResult<Arc<T>> {
        let any = self.resolver.resolve_any(&key_of_named::<T>(name))?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves every `T` registered into `group`, in registration order.
    pub fn group_field<T: 'static>(&self, group: &'static str) -> DiResult<Vec<Arc<T>>> {
        let values = self.resolver.resolve_many(&key_of_group::<T>(group))?;
        values
            .into_iter()
            .map(|v| {
                v.downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
            })
            .collect()
    }

    /// Resolves `T`, falling back to `T::default()` if it is not registered.
    /// A registered-but-failing `T` still propagates its error.
    pub fn optional_field<T: Default + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        match self.field::<T>() {
            Ok(value) => Ok(value),
            Err(DiError::NotFound(_)) => Ok(Arc::new(T::default())),
            Err(e) => Err(e),
        }
    }
}
