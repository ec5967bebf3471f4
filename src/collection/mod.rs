//! `ServiceCollection`: the mutable registration builder that becomes a
//! [`ServiceProvider`](crate::provider::ServiceProvider) once [`build`](ServiceCollection::build) runs.
//!
//! Rust constructors cannot be introspected the way a reflection-based
//! container inspects a constructor's parameter list, so a registration's
//! dependency edges are instead declared up front by the caller, through
//! [`RegistrationBuilder`]'s `.depends_on*` family (or implicitly, by a
//! [`ParamsObject`] or [`ResultObject`]). Those declared edges are what the
//! dependency graph, cycle detector, and lifetime-conflict validator see —
//! a factory that resolves a dependency it never declared still works, but
//! that edge is invisible to `build()`-time validation.

use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::decoration::{DecorationPipeline, ServiceDecorator, TraitDecorator};
use crate::descriptors::{DependencyRef, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::key::{key_of_group, key_of_named, key_of_type, validate_discriminator, Key};
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::params::ParamsObject;
use crate::provider::{ResolverContext, ServiceProvider};
use crate::registration::{AnyArc, Registration, Registry};
use crate::result_object::ResultObject;
use crate::traits::{ResolverCore, TraitCell};

/// Where a registration lands once finalized: the type's unkeyed slot, a
/// named discriminator slot, or a member of a named group. `named` and
/// `grouped` are mutually exclusive; calling both on the same builder is a
/// registration error, surfaced at [`build`](ServiceCollection::build).
enum Placement {
    Primary,
    Named(&'static str),
    Group(&'static str),
}

/// Builder for one constructor-backed registration of a concrete type `T`.
///
/// Produced by [`ServiceCollection::register`]; consumed by [`factory`](RegistrationBuilder::factory)
/// or [`instance`](RegistrationBuilder::instance), which insert the finished
/// registration and hand back the collection for further chaining.
pub struct RegistrationBuilder<'c, T> {
    collection: &'c mut ServiceCollection,
    lifetime: Lifetime,
    dependencies: Vec<DependencyRef>,
    as_types: Vec<Key>,
    placement: Placement,
    pending_error: Option<DiError>,
    _marker: PhantomData<fn() -> T>,
}

impl<'c, T: 'static + Send + Sync> RegistrationBuilder<'c, T> {
    fn new(collection: &'c mut ServiceCollection, lifetime: Lifetime) -> Self {
        Self {
            collection,
            lifetime,
            dependencies: Vec::new(),
            as_types: Vec::new(),
            placement: Placement::Primary,
            pending_error: None,
            _marker: PhantomData,
        }
    }

    /// Declares a required dependency on `D`'s unkeyed registration.
    pub fn depends_on<D: 'static>(mut self) -> Self {
        self.dependencies.push(DependencyRef::required(key_of_type::<D>()));
        self
    }

    /// Declares a required dependency on `D` registered under `name`.
    pub fn depends_on_keyed<D: 'static>(mut self, name: &'static str) -> Self {
        self.dependencies
            .push(DependencyRef::required(key_of_named::<D>(name)));
        self
    }

    /// Declares a required dependency on every `D` registered into `group`.
    pub fn depends_on_group<D: 'static>(mut self, group: &'static str) -> Self {
        self.dependencies
            .push(DependencyRef::required(key_of_group::<D>(group)));
        self
    }

    /// Declares an optional dependency on `D`'s unkeyed registration; a
    /// missing `D` does not fail validation.
    pub fn depends_on_optional<D: 'static>(mut self) -> Self {
        self.dependencies.push(DependencyRef::optional(key_of_type::<D>()));
        self
    }

    /// Also registers the produced value under `Trait`'s key, sharing this
    /// registration's constructor and cache slot.
    pub fn also_as<Trait: ?Sized + 'static>(mut self) -> Self {
        self.as_types.push(Key::Trait(std::any::type_name::<Trait>()));
        self
    }

    /// Places this registration under the discriminator `name` instead of
    /// `T`'s unkeyed slot.
    ///
    /// Errors (surfaced at [`build`](ServiceCollection::build)) if `name`
    /// contains a backtick, or if [`grouped`](RegistrationBuilder::grouped)
    /// was already called on this builder.
    pub fn named(mut self, name: &'static str) -> Self {
        if let Err(e) = self.check_placement("name", name) {
            self.pending_error.get_or_insert(e);
            return self;
        }
        self.placement = Placement::Named(name);
        self
    }

    /// Places this registration into `group` instead of `T`'s unkeyed slot.
    ///
    /// Errors (surfaced at [`build`](ServiceCollection::build)) if `group`
    /// contains a backtick, or if [`named`](RegistrationBuilder::named) was
    /// already called on this builder.
    pub fn grouped(mut self, group: &'static str) -> Self {
        if let Err(e) = self.check_placement("group", group) {
            self.pending_error.get_or_insert(e);
            return self;
        }
        self.placement = Placement::Group(group);
        self
    }

    fn check_placement(&self, kind: &'static str, value: &'static str) -> DiResult<()> {
        validate_discriminator(kind, value)?;
        if !matches!(self.placement, Placement::Primary) {
            return Err(DiError::Registration(
                "name and group are mutually exclusive on one registration".to_string(),
            ));
        }
        Ok(())
    }

    /// Finalizes the registration with a constructor that may fail.
    pub fn try_factory<F>(self, factory: F) -> &'c mut ServiceCollection
    where
        F: Fn(&ResolverContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.insert(move |ctx| factory(ctx).map(|v| Arc::new(v) as AnyArc))
    }

    /// Finalizes the registration with an infallible constructor.
    pub fn factory<F>(self, factory: F) -> &'c mut ServiceCollection
    where
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.try_factory(move |ctx| Ok(factory(ctx)))
    }

    /// Finalizes the registration as a fixed `value`, shared across every resolution.
    pub fn instance(self, value: T) -> &'c mut ServiceCollection {
        let value = Arc::new(value);
        self.insert(move |_ctx| Ok(value.clone() as AnyArc))
    }

    fn insert(
        self,
        ctor: impl for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync + 'static,
    ) -> &'c mut ServiceCollection {
        let RegistrationBuilder {
            collection,
            lifetime,
            dependencies,
            as_types,
            placement,
            pending_error,
            ..
        } = self;

        if let Some(e) = pending_error {
            collection.errors.push(e);
            return collection;
        }

        let mut registration = Registration::new(lifetime, Arc::new(ctor), dependencies);
        registration.impl_type_id = Some(TypeId::of::<T>());
        registration.impl_type_name = Some(std::any::type_name::<T>());
        registration.as_types = as_types;

        match placement {
            Placement::Primary => collection.registry.insert(key_of_type::<T>(), registration),
            Placement::Named(name) => collection
                .registry
                .insert(key_of_named::<T>(name), registration),
            Placement::Group(group) => collection
                .registry
                .insert_group_member(key_of_group::<T>(group), registration),
        }
        collection
    }
}

/// Builder for one constructor-backed registration of a trait object `dyn Trait`.
///
/// Mirrors [`RegistrationBuilder`], but the produced value rides inside a
/// `TraitCell` since `Arc<dyn Any>` cannot downcast to an unsized type directly.
pub struct TraitRegistrationBuilder<'c, T: ?Sized> {
    collection: &'c mut ServiceCollection,
    lifetime: Lifetime,
    dependencies: Vec<DependencyRef>,
    placement: Placement,
    pending_error: Option<DiError>,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<'c, T: ?Sized + 'static + Send + Sync> TraitRegistrationBuilder<'c, T> {
    fn new(collection: &'c mut ServiceCollection, lifetime: Lifetime) -> Self {
        Self {
            collection,
            lifetime,
            dependencies: Vec::new(),
            placement: Placement::Primary,
            pending_error: None,
            _marker: PhantomData,
        }
    }

    /// Declares a required dependency on `D`'s unkeyed registration.
    pub fn depends_on<D: 'static>(mut self) -> Self {
        self.dependencies.push(DependencyRef::required(key_of_type::<D>()));
        self
    }

    /// Declares a required dependency on `D` registered under `name`.
    pub fn depends_on_keyed<D: 'static>(mut self, name: &'static str) -> Self {
        self.dependencies
            .push(DependencyRef::required(key_of_named::<D>(name)));
        self
    }

    /// Declares a required dependency on every `D` registered into `group`.
    pub fn depends_on_group<D: 'static>(mut self, group: &'static str) -> Self {
        self.dependencies
            .push(DependencyRef::required(key_of_group::<D>(group)));
        self
    }

    /// Declares an optional dependency on `D`'s unkeyed registration.
    pub fn depends_on_optional<D: 'static>(mut self) -> Self {
        self.dependencies.push(DependencyRef::optional(key_of_type::<D>()));
        self
    }

    /// Places this registration under the discriminator `name` instead of
    /// `T`'s unkeyed slot.
    ///
    /// Errors (surfaced at [`build`](ServiceCollection::build)) if `name`
    /// contains a backtick, or if [`grouped`](TraitRegistrationBuilder::grouped)
    /// was already called on this builder.
    pub fn named(mut self, name: &'static str) -> Self {
        if let Err(e) = self.check_placement("name", name) {
            self.pending_error.get_or_insert(e);
            return self;
        }
        self.placement = Placement::Named(name);
        self
    }

    /// Places this registration into `group` instead of `T`'s unkeyed slot.
    ///
    /// Errors (surfaced at [`build`](ServiceCollection::build)) if `group`
    /// contains a backtick, or if [`named`](TraitRegistrationBuilder::named)
    /// was already called on this builder.
    pub fn grouped(mut self, group: &'static str) -> Self {
        if let Err(e) = self.check_placement("group", group) {
            self.pending_error.get_or_insert(e);
            return self;
        }
        self.placement = Placement::Group(group);
        self
    }

    fn check_placement(&self, kind: &'static str, value: &'static str) -> DiResult<()> {
        validate_discriminator(kind, value)?;
        if !matches!(self.placement, Placement::Primary) {
            return Err(DiError::Registration(
                "name and group are mutually exclusive on one registration".to_string(),
            ));
        }
        Ok(())
    }

    /// Finalizes the registration with a constructor that may fail.
    pub fn try_factory<F>(self, factory: F) -> &'c mut ServiceCollection
    where
        F: Fn(&ResolverContext) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.insert(move |ctx| factory(ctx).map(|v| Arc::new(TraitCell(v)) as AnyArc))
    }

    /// Finalizes the registration with an infallible constructor.
    pub fn factory<F>(self, factory: F) -> &'c mut ServiceCollection
    where
        F: Fn(&ResolverContext) -> Arc<T> + Send + Sync + 'static,
    {
        self.try_factory(move |ctx| Ok(factory(ctx)))
    }

    /// Finalizes the registration as a fixed `value`, shared across every resolution.
    pub fn value(self, value: Arc<T>) -> &'c mut ServiceCollection {
        self.factory(move |_ctx| value.clone())
    }

    fn insert(
        self,
        ctor: impl for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync + 'static,
    ) -> &'c mut ServiceCollection {
        let TraitRegistrationBuilder {
            collection,
            lifetime,
            dependencies,
            placement,
            pending_error,
            ..
        } = self;

        if let Some(e) = pending_error {
            collection.errors.push(e);
            return collection;
        }

        let registration = Registration::new(lifetime, Arc::new(ctor), dependencies);
        let name = std::any::type_name::<T>();

        match placement {
            Placement::Primary => collection.registry.insert(Key::Trait(name), registration),
            Placement::Named(named) => collection
                .registry
                .insert(Key::TraitNamed(name, named), registration),
            Placement::Group(group) => collection
                .registry
                .insert_group_member(Key::TraitGroup(name, group), registration),
        }
        collection
    }
}

/// The mutable registration builder for a dependency injection container.
///
/// # Examples
///
/// ```
/// use keelwork_di::{ServiceCollection, Resolver};
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(42u32);
///
/// let provider = services.build().unwrap();
/// assert_eq!(*provider.get_required::<u32>(), 42);
/// ```
pub struct ServiceCollection {
    registry: Registry,
    decorations: DecorationPipeline,
    observers: Observers,
    /// Registration errors detected while building the collection (invalid
    /// discriminators, conflicting placement), deferred and surfaced at
    /// [`build`](ServiceCollection::build) since the consuming builder chains
    /// have no earlier fallible exit point.
    errors: Vec<DiError>,
}

impl ServiceCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            decorations: DecorationPipeline::new(),
            observers: Observers::new(),
            errors: Vec::new(),
        }
    }

    /// Begins a registration of `T`'s constructor for `lifetime`, with an
    /// explicit dependency list built through `.depends_on*`.
    pub fn register<T: 'static + Send + Sync>(&mut self, lifetime: Lifetime) -> RegistrationBuilder<T> {
        RegistrationBuilder::new(self, lifetime)
    }

    /// Begins a registration of `dyn Trait`'s constructor for `lifetime`.
    pub fn register_trait<T: ?Sized + 'static + Send + Sync>(
        &mut self,
        lifetime: Lifetime,
    ) -> TraitRegistrationBuilder<T> {
        TraitRegistrationBuilder::new(self, lifetime)
    }

    // ---- concrete-type convenience registrations ----

    /// Registers a fixed `value` as a Singleton.
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.register::<T>(Lifetime::Singleton).instance(value)
    }

    /// Registers `value` as a Singleton under the discriminator `name`.
    pub fn add_named_singleton<T: 'static + Send + Sync>(
        &mut self,
        name: &'static str,
        value: T,
    ) -> &mut Self {
        self.register::<T>(Lifetime::Singleton).named(name).instance(value)
    }

    /// Registers `value` as a Singleton member of `group`.
    pub fn add_singleton_to_group<T: 'static + Send + Sync>(
        &mut self,
        group: &'static str,
        value: T,
    ) -> &mut Self {
        self.register::<T>(Lifetime::Singleton).grouped(group).instance(value)
    }

    /// Registers `factory` as `T`'s Singleton constructor, run once and shared
    /// across the whole process.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.register::<T>(Lifetime::Singleton).factory(factory)
    }

    /// Registers `factory` as `T`'s Scoped constructor, run once per [`Scope`](crate::provider::Scope).
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.register::<T>(Lifetime::Scoped).factory(factory)
    }

    /// Registers `factory` as `T`'s Transient constructor, run on every resolution.
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.register::<T>(Lifetime::Transient).factory(factory)
    }

    /// Registers `factory` as a member of `T`'s `group`, for `lifetime`.
    pub fn add_to_group<T, F>(&mut self, group: &'static str, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.register::<T>(lifetime).grouped(group).factory(factory)
    }

    // ---- trait registrations ----

    /// Registers `value` as `dyn Trait`'s Singleton implementation.
    pub fn add_singleton_trait<T: ?Sized + 'static + Send + Sync>(&mut self, value: Arc<T>) -> &mut Self {
        self.register_trait::<T>(Lifetime::Singleton).value(value)
    }

    /// Registers `factory` as `dyn Trait`'s Singleton constructor.
    pub fn add_singleton_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<T> + Send + Sync + 'static,
    {
        self.register_trait::<T>(Lifetime::Singleton).factory(factory)
    }

    /// Registers `factory` as `dyn Trait`'s Scoped constructor.
    pub fn add_scoped_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<T> + Send + Sync + 'static,
    {
        self.register_trait::<T>(Lifetime::Scoped).factory(factory)
    }

    /// Registers `factory` as `dyn Trait`'s Transient constructor.
    pub fn add_transient_trait_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<T> + Send + Sync + 'static,
    {
        self.register_trait::<T>(Lifetime::Transient).factory(factory)
    }

    /// Registers `value` as a `dyn Trait` member of `group`, resolved together
    /// through [`Resolver::get_group`](crate::traits::Resolver::get_group).
    pub fn add_trait_to_group<T: ?Sized + 'static + Send + Sync>(
        &mut self,
        group: &'static str,
        lifetime: Lifetime,
        value: Arc<T>,
    ) -> &mut Self {
        self.register_trait::<T>(lifetime).grouped(group).value(value)
    }

    // ---- result-object and params-object entry points ----

    /// Registers a [`ResultObject`] constructor: `ctor` runs once per
    /// `lifetime` tier, and each field `R` declares in [`ResultObject::fields`]
    /// becomes its own independently resolvable registration, projected out
    /// of the same constructed `R`.
    pub fn register_result<R, F>(&mut self, lifetime: Lifetime, ctor: F) -> &mut Self
    where
        R: ResultObject,
        F: Fn(&ResolverContext) -> R + Send + Sync + 'static,
    {
        self.register::<R>(lifetime).factory(ctor);

        for field in R::fields() {
            let extract = field.extract;
            let dependencies = vec![DependencyRef::required(key_of_type::<R>())];
            let ctor: Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync> =
                Arc::new(move |ctx: &ResolverContext| {
                    let result_any = ctx.resolve_any(&key_of_type::<R>())?;
                    let result = result_any
                        .downcast::<R>()
                        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<R>()))?;
                    Ok((extract)(&result))
                });
            self.registry
                .insert(field.key, Registration::new(lifetime, ctor, dependencies));
        }
        self
    }

    /// Registers `T`'s constructor built from a [`ParamsObject`] `P`: `P`'s
    /// declared dependencies become `T`'s registration's dependency list, and
    /// `P` is resolved fresh before `build` runs on every invocation.
    pub fn register_from_params<T, P, F>(&mut self, lifetime: Lifetime, build: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        P: ParamsObject,
        F: Fn(P) -> T + Send + Sync + 'static,
    {
        let mut builder = self.register::<T>(lifetime);
        builder.dependencies = P::dependencies();
        builder.try_factory(move |ctx| {
            let params = P::resolve(ctx)?;
            Ok(build(params))
        })
    }

    // ---- decoration ----

    /// Registers `decorator` to run on every resolution of `T`, in
    /// registration order, innermost decorator applied first.
    ///
    /// `key`, when `Some`, scopes the decorator to the registration named
    /// `key` — it does not run for `T`'s unkeyed registration, other names,
    /// or group members. `None` registers it as the fallback applied to
    /// every resolution of `T` that has no more specific decorator of its own.
    pub fn decorate_with<T, D>(&mut self, key: Option<&'static str>, decorator: D) -> &mut Self
    where
        T: Send + Sync + 'static,
        D: ServiceDecorator<T> + 'static,
    {
        self.decorations.add_service_decorator::<T>(key, decorator);
        self
    }

    /// Registers `decorator` to run on every resolution of `dyn Trait`, scoped
    /// the same way as [`decorate_with`](ServiceCollection::decorate_with).
    pub fn decorate_trait_with<T, D>(&mut self, key: Option<&'static str>, decorator: D) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        D: TraitDecorator<T> + 'static,
    {
        self.decorations.add_trait_decorator::<T>(key, decorator);
        self
    }

    // ---- diagnostics ----

    /// Registers `observer` to receive resolution events for every Provider
    /// built from this collection.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Snapshots every registration as a [`ServiceDescriptor`], for
    /// introspection and diagnostics.
    pub fn get_service_descriptors(&self) -> Vec<ServiceDescriptor> {
        let mut descriptors: Vec<ServiceDescriptor> = self
            .registry
            .iter()
            .map(|(key, reg)| ServiceDescriptor {
                key: key.clone(),
                lifetime: reg.lifetime,
                impl_type_id: reg.impl_type_id,
                impl_type_name: reg.impl_type_name,
                dependencies: reg.dependencies.clone(),
                as_types: reg.as_types.clone(),
            })
            .collect();

        for (group_key, reg) in self.registry.group_entries() {
            descriptors.push(ServiceDescriptor {
                key: group_key.clone(),
                lifetime: reg.lifetime,
                impl_type_id: reg.impl_type_id,
                impl_type_name: reg.impl_type_name,
                dependencies: reg.dependencies.clone(),
                as_types: reg.as_types.clone(),
            });
        }
        descriptors
    }

    /// Finalizes the registry: validates it (cycle detection, missing
    /// dependencies, lifetime conflicts) and eagerly constructs every
    /// Singleton in dependency order.
    ///
    /// Fails with the first registration error recorded by `named`/`grouped`
    /// (invalid discriminator or conflicting placement) before running any
    /// graph validation.
    pub fn build(self) -> DiResult<ServiceProvider> {
        if let Some(e) = self.errors.into_iter().next() {
            return Err(e);
        }
        ServiceProvider::build(self.registry, self.decorations, self.observers)
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Resolver;

    struct Database {
        url: String,
    }

    struct Repository {
        db: Arc<Database>,
    }

    trait Logger: Send + Sync {
        fn log(&self, message: &str) -> String;
    }

    struct ConsoleLogger;
    impl Logger for ConsoleLogger {
        fn log(&self, message: &str) -> String {
            format!("[log] {message}")
        }
    }

    #[test]
    fn add_singleton_shares_one_instance_across_resolutions() {
        let mut services = ServiceCollection::new();
        services.add_singleton(Database {
            url: "postgres://localhost".to_string(),
        });
        let provider = services.build().unwrap();
        let a = provider.get_required::<Database>();
        let b = provider.get_required::<Database>();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn factory_with_declared_dependency_resolves() {
        let mut services = ServiceCollection::new();
        services.add_singleton(Database {
            url: "postgres://localhost".to_string(),
        });
        services
            .register::<Repository>(Lifetime::Scoped)
            .depends_on::<Database>()
            .factory(|r| Repository {
                db: r.get_required::<Database>(),
            });

        let provider = services.build().unwrap();
        let scope = provider.create_scope();
        let repo = scope.get_required::<Repository>();
        assert_eq!(repo.db.url, "postgres://localhost");
    }

    #[test]
    fn named_registration_is_independent_of_the_unkeyed_one() {
        let mut services = ServiceCollection::new();
        services.add_singleton(1u32);
        services.add_named_singleton("port", 8080u32);

        let provider = services.build().unwrap();
        assert_eq!(*provider.get_required::<u32>(), 1);
        assert_eq!(*provider.get_named_required::<u32>("port"), 8080);
    }

    #[test]
    fn group_members_resolve_in_registration_order() {
        let mut services = ServiceCollection::new();
        services.add_singleton_to_group("plugins", 1u32);
        services.add_singleton_to_group("plugins", 2u32);
        services.add_singleton_to_group("plugins", 3u32);

        let provider = services.build().unwrap();
        let members = provider.get_group::<u32>("plugins").unwrap();
        assert_eq!(members.iter().map(|v| **v).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn trait_group_members_resolve_together() {
        struct LoudLogger;
        impl Logger for LoudLogger {
            fn log(&self, message: &str) -> String {
                message.to_uppercase()
            }
        }

        let mut services = ServiceCollection::new();
        services.add_trait_to_group::<dyn Logger>("loggers", Lifetime::Singleton, Arc::new(ConsoleLogger));
        services.add_trait_to_group::<dyn Logger>("loggers", Lifetime::Singleton, Arc::new(LoudLogger));

        let provider = services.build().unwrap();
        let loggers = provider.get_group::<dyn Logger>("loggers").unwrap();
        assert_eq!(loggers.len(), 2);
        assert_eq!(loggers[1].log("hi"), "HI");
    }

    #[test]
    fn also_as_shares_the_primary_instance_and_constructor() {
        let mut services = ServiceCollection::new();
        services
            .register::<ConsoleLogger>(Lifetime::Singleton)
            .also_as::<dyn Logger>()
            .instance(ConsoleLogger);

        let provider = services.build().unwrap();
        let concrete = provider.get_required::<ConsoleLogger>();
        let as_trait = provider.get_required_trait::<dyn Logger>();
        assert_eq!(as_trait.log("hi"), "[log] hi");
        assert!(Arc::strong_count(&concrete) > 0);
    }

    #[test]
    fn named_registration_rejects_a_backtick_in_the_name() {
        let mut services = ServiceCollection::new();
        services.register::<Database>(Lifetime::Singleton).named("db`1").instance(Database {
            url: "x".to_string(),
        });

        let err = services.build().unwrap_err();
        assert!(matches!(err, DiError::Registration(_)));
    }

    #[test]
    fn grouped_registration_rejects_a_backtick_in_the_group() {
        let mut services = ServiceCollection::new();
        services
            .register::<Database>(Lifetime::Singleton)
            .grouped("plugins`evil")
            .instance(Database {
                url: "x".to_string(),
            });

        let err = services.build().unwrap_err();
        assert!(matches!(err, DiError::Registration(_)));
    }

    #[test]
    fn named_and_grouped_together_is_a_registration_error() {
        let mut services = ServiceCollection::new();
        services
            .register::<Database>(Lifetime::Singleton)
            .named("primary")
            .grouped("plugins")
            .instance(Database {
                url: "x".to_string(),
            });

        let err = services.build().unwrap_err();
        assert!(matches!(err, DiError::Registration(_)));
    }

    #[test]
    fn get_service_descriptors_reports_declared_dependencies() {
        let mut services = ServiceCollection::new();
        services.add_singleton(Database { url: "x".to_string() });
        services
            .register::<Repository>(Lifetime::Scoped)
            .depends_on::<Database>()
            .factory(|r| Repository {
                db: r.get_required::<Database>(),
            });

        let descriptors = services.get_service_descriptors();
        let repo = descriptors
            .iter()
            .find(|d| d.type_name() == std::any::type_name::<Repository>())
            .unwrap();
        assert_eq!(repo.dependencies.len(), 1);
        assert_eq!(
            repo.dependencies[0].key.display_name(),
            std::any::type_name::<Database>()
        );
    }
}
