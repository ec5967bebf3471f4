//! Resolution traits: the object-safe core and the generic convenience layer.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::registration::AnyArc;

/// Object-safe resolution surface implemented by `ServiceProvider` and `Scope`.
///
/// This is the interface factory closures see through [`ResolverContext`](crate::provider::ResolverContext);
/// the generic, typed [`Resolver`] trait below is a thin layer over it.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single value for `key`.
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;

    /// Resolves every member of the group identified by `key` (a `TypeGroup`/`TraitGroup` key),
    /// in registration order. An unregistered group resolves to an empty vector.
    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>>;

    /// Registers a synchronous disposal hook on the scope backing this resolver.
    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>);

    /// Registers an asynchronous disposal hook on the scope backing this resolver.
    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> crate::internal::BoxFutureUnit + Send>);
}

/// A `Sized`, `'static` wrapper letting a trait object ride inside `Arc<dyn Any>`.
///
/// `Arc<dyn Trait>` cannot itself be the target of `Any::downcast` because the
/// erased value must be `Sized`; wrapping it in a single-field newtype gives
/// `downcast::<TraitCell<dyn Trait>>()` a concrete, sized type to match on.
pub(crate) struct TraitCell<T: ?Sized>(pub Arc<T>);

/// Generic, ergonomic resolution API built on top of [`ResolverCore`].
///
/// Implemented for every `T: ResolverCore` via a blanket impl, so it is
/// available on `ServiceProvider`, `Scope`, and `ResolverContext` alike.
pub trait Resolver: ResolverCore {
    /// Resolves `T` by its unkeyed, ungrouped registration.
    fn get<T: 'static>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&crate::key::key_of_type::<T>())?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Like [`get`](Resolver::get), panicking with a descriptive message on failure.
    fn get_required<T: 'static>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves `T` registered under the discriminator `name`.
    fn get_named<T: 'static>(&self, name: &'static str) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&crate::key::key_of_named::<T>(name))?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Like [`get_named`](Resolver::get_named), panicking on failure.
    fn get_named_required<T: 'static>(&self, name: &'static str) -> Arc<T> {
        self.get_named::<T>(name).unwrap_or_else(|e| {
            panic!(
                "failed to resolve {}/{}: {}",
                std::any::type_name::<T>(),
                name,
                e
            )
        })
    }

    /// Resolves every `T` registered into `group`, in registration order.
    /// An unregistered or empty group yields an empty vector, not an error.
    fn get_group<T: 'static>(&self, group: &'static str) -> DiResult<Vec<Arc<T>>> {
        let values = self.resolve_many(&crate::key::key_of_group::<T>(group))?;
        values
            .into_iter()
            .map(|v| {
                v.downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
            })
            .collect()
    }

    /// Resolves a trait object `dyn Trait` by its unkeyed registration.
    fn get_trait<T: ?Sized + Any + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&Key::Trait(std::any::type_name::<T>()))?;
        any.downcast::<TraitCell<T>>()
            .map(|cell| cell.0.clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Like [`get_trait`](Resolver::get_trait), panicking on failure.
    fn get_required_trait<T: ?Sized + Any + Send + Sync + 'static>(&self) -> Arc<T> {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Registers `service`'s synchronous disposal with the current scope.
    fn register_disposer<T>(&self, service: Arc<T>)
    where
        T: crate::traits::Dispose + 'static,
    {
        self.push_sync_disposer(Box::new(move || service.dispose()));
    }

    /// Registers `service`'s asynchronous disposal with the current scope.
    #[cfg(feature = "async")]
    fn register_async_disposer<T>(&self, service: Arc<T>)
    where
        T: crate::traits::AsyncDispose + 'static,
    {
        self.push_async_disposer(Box::new(move || {
            let service = service.clone();
            Box::pin(async move { service.dispose().await })
        }));
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
