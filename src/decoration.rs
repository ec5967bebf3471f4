//! Decoration pipeline: wrap or replace a resolved instance before it is cached.
//!
//! Decorators are keyed by `(TypeId, Option<name>)` and applied in
//! registration order, once per construction, before the value is written
//! into its lifetime tier's cache — a decorator registered for a specific
//! named registration only runs for that name; everything else (the unkeyed
//! registration, other names, and group members) falls back to whatever
//! decorator set was registered with no name at all.

use std::sync::Arc;
use std::any::TypeId;
use std::collections::HashMap;
use crate::error::DiResult;
use crate::traits::ResolverCore;

/// A decorator that can intercept and modify service resolution.
///
/// Wraps, modifies, or replaces the resolved instance; useful for
/// cross-cutting concerns like logging, caching, or metrics. Returning `Err`
/// invalidates the resolution: the error propagates to the caller and the
/// underlying constructed value is never written to its cache slot.
///
/// # Examples
///
/// ```
/// use keelwork_di::{ServiceCollection, ServiceDecorator, Resolver, DiResult};
/// use std::sync::Arc;
///
/// struct DatabaseService {
///     connection_string: String,
/// }
///
/// struct MetricsDecorator;
///
/// impl ServiceDecorator<DatabaseService> for MetricsDecorator {
///     fn decorate(&self, original: Arc<DatabaseService>, _resolver: &dyn keelwork_di::traits::ResolverCore) -> DiResult<Arc<DatabaseService>> {
///         println!("Database service accessed: {}", original.connection_string);
///         Ok(original) // Return original service, but we logged the access
///     }
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut services = ServiceCollection::new();
/// services.add_singleton(DatabaseService {
///     connection_string: "postgres://localhost".to_string(),
/// });
///
/// // Add decoration
/// services.decorate_with::<DatabaseService, _>(None, MetricsDecorator);
///
/// let provider = services.build().unwrap();
/// let db = provider.get_required::<DatabaseService>(); // Logs access
/// # Ok(())
/// # }
/// ```
pub trait ServiceDecorator<T: Send + Sync + 'static>: Send + Sync {
    /// Decorates the service during resolution.
    ///
    /// Can wrap, modify, or completely replace the original service.
    /// The resolver can be used to access other services needed for decoration.
    /// An `Err` invalidates the resolution instead of caching a value.
    fn decorate(&self, original: Arc<T>, resolver: &dyn ResolverCore) -> DiResult<Arc<T>>;
}

/// A trait decorator that can intercept and modify trait object resolution.
///
/// Similar to ServiceDecorator but works with trait objects for maximum flexibility.
///
/// # Examples
///
/// ```
/// use keelwork_di::{ServiceCollection, TraitDecorator, Resolver, DiResult};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, message: &str) {
///         println!("LOG: {}", message);
///     }
/// }
///
/// struct TimestampDecorator;
///
/// impl TraitDecorator<dyn Logger> for TimestampDecorator {
///     fn decorate(&self, original: Arc<dyn Logger>, _resolver: &dyn keelwork_di::traits::ResolverCore) -> DiResult<Arc<dyn Logger>> {
///         struct TimestampLogger {
///             inner: Arc<dyn Logger>,
///         }
///         impl Logger for TimestampLogger {
///             fn log(&self, message: &str) {
///                 self.inner.log(&format!("[2024-01-01T00:00:00Z] {}", message));
///             }
///         }
///         Ok(Arc::new(TimestampLogger { inner: original }))
///     }
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut services = ServiceCollection::new();
/// services.add_singleton_trait::<dyn Logger>(Arc::new(ConsoleLogger));
///
/// // Add decoration to trait
/// services.decorate_trait_with::<dyn Logger, _>(None, TimestampDecorator);
///
/// let provider = services.build().unwrap();
/// let logger = provider.get_required_trait::<dyn Logger>();
/// logger.log("Hello"); // Outputs: "[2024-01-01T12:00:00Z] LOG: Hello"
/// # Ok(())
/// # }
/// ```
pub trait TraitDecorator<T: ?Sized + Send + Sync + 'static>: Send + Sync {
    /// Decorates the trait object during resolution. An `Err` invalidates
    /// the resolution instead of caching a value.
    fn decorate(&self, original: Arc<T>, resolver: &dyn ResolverCore) -> DiResult<Arc<T>>;
}

/// Internal decorator wrapper for type erasure.
pub(crate) struct DecorationWrapper<T> {
    decorator: Box<dyn ServiceDecorator<T>>,
}

impl<T: Send + Sync + 'static> DecorationWrapper<T> {
    pub fn new(decorator: impl ServiceDecorator<T> + 'static) -> Self {
        Self {
            decorator: Box::new(decorator),
        }
    }

    pub fn decorate(&self, original: Arc<T>, resolver: &dyn ResolverCore) -> DiResult<Arc<T>> {
        self.decorator.decorate(original, resolver)
    }
}

/// Internal trait decorator wrapper for type erasure.
pub(crate) struct TraitDecorationWrapper<T: ?Sized> {
    decorator: Box<dyn TraitDecorator<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> TraitDecorationWrapper<T> {
    pub fn new(decorator: impl TraitDecorator<T> + 'static) -> Self {
        Self {
            decorator: Box::new(decorator),
        }
    }

    pub fn decorate(&self, original: Arc<T>, resolver: &dyn ResolverCore) -> DiResult<Arc<T>> {
        self.decorator.decorate(original, resolver)
    }
}

/// Decoration pipeline for managing multiple decorators per service.
///
/// # Examples
///
/// ```
/// use keelwork_di::{ServiceCollection, DecorationPipeline, ServiceDecorator, Resolver, DiResult};
/// use std::sync::Arc;
///
/// struct ApiService {
///     name: String,
/// }
///
/// struct LoggingDecorator;
/// impl ServiceDecorator<ApiService> for LoggingDecorator {
///     fn decorate(&self, original: Arc<ApiService>, _resolver: &dyn keelwork_di::traits::ResolverCore) -> DiResult<Arc<ApiService>> {
///         println!("Accessing API service: {}", original.name);
///         Ok(original)
///     }
/// }
///
/// struct MetricsDecorator;
/// impl ServiceDecorator<ApiService> for MetricsDecorator {
///     fn decorate(&self, original: Arc<ApiService>, _resolver: &dyn keelwork_di::traits::ResolverCore) -> DiResult<Arc<ApiService>> {
///         // Record metrics
///         Ok(original)
///     }
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut services = ServiceCollection::new();
/// services.add_singleton(ApiService { name: "UserAPI".to_string() });
///
/// // Add multiple decorators - they execute in order
/// services.decorate_with::<ApiService, _>(None, LoggingDecorator);
/// services.decorate_with::<ApiService, _>(None, MetricsDecorator);
///
/// let provider = services.build().unwrap();
/// let api = provider.get_required::<ApiService>(); // Logs then records metrics
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DecorationPipeline {
    /// Service decorators by `(TypeId, Option<name>)`.
    service_decorators: HashMap<(TypeId, Option<&'static str>), Vec<Box<dyn DecorationAny>>>,
    /// Trait decorators by `(TypeId, Option<name>)`.
    trait_decorators: HashMap<(TypeId, Option<&'static str>), Vec<Box<dyn TraitDecorationAny>>>,
}

/// Type-erased decoration for internal pipeline management.
trait DecorationAny: Send + Sync {
    fn decorate_any(&self, original: crate::registration::AnyArc, resolver: &dyn ResolverCore) -> DiResult<crate::registration::AnyArc>;
}

impl<T: Send + Sync + 'static> DecorationAny for DecorationWrapper<T> {
    fn decorate_any(&self, original: crate::registration::AnyArc, resolver: &dyn ResolverCore) -> DiResult<crate::registration::AnyArc> {
        let typed = original.downcast::<T>().expect("Type mismatch in decoration");
        let decorated = self.decorate(typed, resolver)?;
        Ok(decorated as crate::registration::AnyArc)
    }
}

/// Type-erased trait decoration for internal pipeline management.
pub(crate) trait TraitDecorationAny: Send + Sync {
    fn decorate_trait_any(&self, original: crate::registration::AnyArc, resolver: &dyn ResolverCore) -> DiResult<crate::registration::AnyArc>;
}

impl<T: ?Sized + Send + Sync + 'static> TraitDecorationAny for TraitDecorationWrapper<T> {
    fn decorate_trait_any(&self, original: crate::registration::AnyArc, resolver: &dyn ResolverCore) -> DiResult<crate::registration::AnyArc> {
        // Trait values ride inside `Any` as `TraitCell<T>` (see traits::resolver),
        // since `Arc<dyn Trait>` itself has no concrete `TypeId` to downcast to.
        match original.downcast::<crate::traits::TraitCell<T>>() {
            Ok(cell) => {
                let decorated = self.decorator.decorate(cell.0.clone(), resolver)?;
                Ok(Arc::new(crate::traits::TraitCell(decorated)) as crate::registration::AnyArc)
            }
            Err(original) => Ok(original),
        }
    }
}

impl DecorationPipeline {
    /// Creates a new decoration pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service decorator to the pipeline. `key`, when set, scopes the
    /// decorator to the registration named `key`; `None` registers it as the
    /// fallback applied whenever no decorator is registered for the specific
    /// name being resolved.
    pub fn add_service_decorator<T: Send + Sync + 'static>(
        &mut self,
        key: Option<&'static str>,
        decorator: impl ServiceDecorator<T> + 'static,
    ) {
        let type_id = TypeId::of::<T>();
        let wrapper = DecorationWrapper::new(decorator);

        self.service_decorators
            .entry((type_id, key))
            .or_insert_with(Vec::new)
            .push(Box::new(wrapper));
    }

    /// Adds a trait decorator to the pipeline, scoped the same way as
    /// [`add_service_decorator`](DecorationPipeline::add_service_decorator).
    pub fn add_trait_decorator<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        key: Option<&'static str>,
        decorator: impl TraitDecorator<T> + 'static,
    ) {
        let type_id = TypeId::of::<T>();
        let wrapper = TraitDecorationWrapper::new(decorator);

        self.trait_decorators
            .entry((type_id, key))
            .or_insert_with(Vec::new)
            .push(Box::new(wrapper));
    }

    /// Applies all decorators registered for `T` at `key`, falling back to
    /// the unkeyed set when `key` has nothing registered for it.
    pub fn decorate_service<T: Send + Sync + 'static>(
        &self,
        service: Arc<T>,
        resolver: &dyn ResolverCore,
        key: Option<&'static str>,
    ) -> DiResult<Arc<T>> {
        let type_id = TypeId::of::<T>();
        let mut service = service;

        if let Some(decorators) = self.lookup_service(type_id, key) {
            for decorator in decorators {
                let any_service = service.clone() as crate::registration::AnyArc;
                let decorated_any = decorator.decorate_any(any_service, resolver)?;
                service = decorated_any.downcast::<T>().expect("Type mismatch in decoration pipeline");
            }
        }

        Ok(service)
    }

    /// Applies all decorators registered for `dyn Trait` at `key`, with the
    /// same unkeyed fallback as [`decorate_service`](DecorationPipeline::decorate_service).
    pub fn decorate_trait<T: ?Sized + Send + Sync + 'static>(
        &self,
        service: Arc<T>,
        resolver: &dyn ResolverCore,
        key: Option<&'static str>,
    ) -> DiResult<Arc<T>> {
        let type_id = TypeId::of::<T>();
        let mut service = service;

        if let Some(decorators) = self.lookup_trait(type_id, key) {
            for decorator in decorators {
                let any_service =
                    Arc::new(crate::traits::TraitCell(service.clone())) as crate::registration::AnyArc;
                let decorated_any = decorator.decorate_trait_any(any_service, resolver)?;
                service = decorated_any
                    .downcast::<crate::traits::TraitCell<T>>()
                    .expect("type mismatch in trait decoration pipeline")
                    .0
                    .clone();
            }
        }

        Ok(service)
    }

    /// Applies any service decorators registered for `type_id` at `key`,
    /// without requiring the caller to know the concrete type statically.
    /// Used by the resolution path, which only has a type-erased value in
    /// hand. Traits (no `TypeId`) and types with no decorators pass through
    /// unchanged.
    pub(crate) fn decorate_erased(
        &self,
        type_id: TypeId,
        key: Option<&'static str>,
        original: crate::registration::AnyArc,
        resolver: &dyn ResolverCore,
    ) -> DiResult<crate::registration::AnyArc> {
        let mut value = original;
        if let Some(decorators) = self.lookup_service(type_id, key) {
            for decorator in decorators {
                value = decorator.decorate_any(value, resolver)?;
            }
        }
        Ok(value)
    }

    fn lookup_service(&self, type_id: TypeId, key: Option<&'static str>) -> Option<&Vec<Box<dyn DecorationAny>>> {
        if key.is_some() {
            if let Some(v) = self.service_decorators.get(&(type_id, key)) {
                return Some(v);
            }
        }
        self.service_decorators.get(&(type_id, None))
    }

    fn lookup_trait(&self, type_id: TypeId, key: Option<&'static str>) -> Option<&Vec<Box<dyn TraitDecorationAny>>> {
        if key.is_some() {
            if let Some(v) = self.trait_decorators.get(&(type_id, key)) {
                return Some(v);
            }
        }
        self.trait_decorators.get(&(type_id, None))
    }

    /// Returns true if there are decorators for the given service type, at any key.
    pub fn has_service_decorators<T: Send + Sync + 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.service_decorators.keys().any(|(id, _)| *id == type_id)
    }

    /// Returns true if there are decorators for the given trait type, at any key.
    pub fn has_trait_decorators<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.trait_decorators.keys().any(|(id, _)| *id == type_id)
    }

    /// Returns the number of service decorators.
    pub fn service_decorator_count(&self) -> usize {
        self.service_decorators.values().map(|v| v.len()).sum()
    }

    /// Returns the number of trait decorators.
    pub fn trait_decorator_count(&self) -> usize {
        self.trait_decorators.values().map(|v| v.len()).sum()
    }

    /// Clears all decorators.
    pub fn clear(&mut self) {
        self.service_decorators.clear();
        self.trait_decorators.clear();
    }
}

/// Helper macro for creating simple function-based decorators.
///
/// # Examples
///
/// ```
/// use keelwork_di::{ServiceCollection, ServiceDecorator, Resolver};
/// use std::sync::Arc;
///
/// struct UserService {
///     name: String,
/// }
///
/// struct SimpleDecorator;
/// impl ServiceDecorator<UserService> for SimpleDecorator {
///     fn decorate(&self, original: Arc<UserService>, _resolver: &dyn keelwork_di::traits::ResolverCore) -> keelwork_di::DiResult<Arc<UserService>> {
///         println!("Accessing user: {}", original.name);
///         Ok(original)
///     }
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut services = ServiceCollection::new();
/// services.add_singleton(UserService { name: "John".to_string() });
/// services.decorate_with::<UserService, _>(None, SimpleDecorator);
///
/// let provider = services.build().unwrap();
/// let user = provider.get_required::<UserService>(); // Logs access
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! decorate {
    (|$service:ident, $resolver:ident| $body:expr) => {
        struct FunctionDecorator<F>(F);

        impl<T, F> $crate::ServiceDecorator<T> for FunctionDecorator<F>
        where
            T: Send + Sync + 'static,
            F: Fn(std::sync::Arc<T>, &dyn $crate::traits::ResolverCore) -> std::sync::Arc<T> + Send + Sync,
        {
            fn decorate(&self, $service: std::sync::Arc<T>, $resolver: &dyn $crate::traits::ResolverCore) -> $crate::DiResult<std::sync::Arc<T>> {
                Ok((self.0)($service, $resolver))
            }
        }

        FunctionDecorator(move |$service: std::sync::Arc<_>, $resolver: &dyn $crate::traits::ResolverCore| $body)
    };
}

/// Convenience functions for common decoration patterns.
pub mod decorators {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Instant, Duration};

    /// A decorator that logs service access.
    ///
    /// # Examples
    ///
    /// ```
    /// use keelwork_di::{ServiceCollection, decorators::LoggingDecorator, Resolver};
    ///
    /// struct UserService;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(UserService);
    /// services.decorate_with::<UserService, _>(None, LoggingDecorator::new("UserService"));
    ///
    /// let provider = services.build().unwrap();
    /// let user = provider.get_required::<UserService>(); // Logs: "Accessing service: UserService"
    /// # Ok(())
    /// # }
    /// ```
    pub struct LoggingDecorator {
        service_name: &'static str,
    }

    impl LoggingDecorator {
        pub fn new(service_name: &'static str) -> Self {
            Self { service_name }
        }
    }

    impl<T: Send + Sync + 'static> ServiceDecorator<T> for LoggingDecorator {
        fn decorate(&self, original: Arc<T>, _resolver: &dyn ResolverCore) -> DiResult<Arc<T>> {
            tracing::debug!(service = self.service_name, "accessing service");
            Ok(original)
        }
    }

    /// A decorator that counts service access.
    ///
    /// # Examples
    ///
    /// ```
    /// use keelwork_di::{ServiceCollection, decorators::CountingDecorator, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct UserService;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let counter = CountingDecorator::new();
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(UserService);
    /// services.decorate_with::<UserService, _>(None, counter);
    ///
    /// let provider = services.build().unwrap();
    /// let _user1 = provider.get_required::<UserService>();
    /// let _user2 = provider.get_required::<UserService>();
    /// # Ok(())
    /// # }
    /// ```
    pub struct CountingDecorator {
        count: AtomicU64,
    }

    impl CountingDecorator {
        pub fn new() -> Self {
            Self {
                count: AtomicU64::new(0),
            }
        }

        pub fn count(&self) -> u64 {
            self.count.load(Ordering::Relaxed)
        }
    }

    impl Default for CountingDecorator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T: Send + Sync + 'static> ServiceDecorator<T> for CountingDecorator {
        fn decorate(&self, original: Arc<T>, _resolver: &dyn ResolverCore) -> DiResult<Arc<T>> {
            self.count.fetch_add(1, Ordering::Relaxed);
            Ok(original)
        }
    }

    /// A decorator that measures service resolution time.
    ///
    /// # Examples
    ///
    /// ```
    /// use keelwork_di::{ServiceCollection, decorators::TimingDecorator, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct UserService;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let timer = TimingDecorator::new("UserService");
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(UserService);
    /// services.decorate_with::<UserService, _>(None, timer);
    ///
    /// let provider = services.build().unwrap();
    /// let _user = provider.get_required::<UserService>();
    /// # Ok(())
    /// # }
    /// ```
    pub struct TimingDecorator {
        service_name: &'static str,
        total_time: AtomicU64,
        count: AtomicU64,
    }

    impl TimingDecorator {
        pub fn new(service_name: &'static str) -> Self {
            Self {
                service_name,
                total_time: AtomicU64::new(0),
                count: AtomicU64::new(0),
            }
        }

        pub fn average_time(&self) -> Duration {
            let total = self.total_time.load(Ordering::Relaxed);
            let count = self.count.load(Ordering::Relaxed);
            if count == 0 {
                Duration::ZERO
            } else {
                Duration::from_nanos(total / count)
            }
        }

        pub fn total_time(&self) -> Duration {
            Duration::from_nanos(self.total_time.load(Ordering::Relaxed))
        }

        pub fn access_count(&self) -> u64 {
            self.count.load(Ordering::Relaxed)
        }
    }

    impl<T: Send + Sync + 'static> ServiceDecorator<T> for TimingDecorator {
        fn decorate(&self, original: Arc<T>, _resolver: &dyn ResolverCore) -> DiResult<Arc<T>> {
            let start = Instant::now();
            let result = original; // In real use, this might involve actual work
            let elapsed = start.elapsed();

            self.total_time.fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
            self.count.fetch_add(1, Ordering::Relaxed);

            tracing::debug!(service = self.service_name, ?elapsed, "service resolved");
            Ok(result)
        }
    }
}
