//! The built container: `ServiceProvider` and the `Scope` it roots.
//!
//! `build()` on a `ServiceCollection` produces a `ServiceProvider` after
//! running validation (cycle detection, missing-dependency checks,
//! lifetime-conflict checks) and eagerly constructing every Singleton in
//! dependency order. From then on, resolution is serviced either directly by
//! the provider (which forwards to its root scope) or by a child `Scope`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::decoration::DecorationPipeline;
use crate::error::DiResult;
use crate::graph::DependencyGraph;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::observer::Observers;
use crate::registration::{AnyArc, Registry};
use crate::traits::ResolverCore;
use crate::validator;
use crate::CancellationToken;

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub use scope::Scope;

pub(crate) struct ProviderInner {
    pub(crate) registry: Registry,
    pub(crate) decorations: DecorationPipeline,
    pub(crate) observers: Observers,
    pub(crate) disposed: AtomicBool,
}

/// The resolved dependency injection container.
///
/// Cheap to clone (an `Arc` handle). Owns the registry, decoration pipeline,
/// and observers, plus a root [`Scope`] used to service Singleton and
/// unscoped resolution. `create_scope` derives child scopes for Scoped
/// resolution; `close`/`close_async` dispose the root scope (and, through
/// it, every Singleton constructed with a registered disposer).
///
/// # Examples
///
/// ```
/// use keelwork_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(Database { url: "postgres://localhost".to_string() });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     UserService { db: resolver.get_required::<Database>() }
/// });
///
/// let provider = collection.build().unwrap();
/// let user_service = provider.get_required::<UserService>();
/// assert_eq!(user_service.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
    root: Scope,
}

impl ServiceProvider {
    /// Validates the registry, eagerly constructs every Singleton in
    /// dependency order, and returns the resulting provider. Singleton
    /// construction failures abort the build and dispose of whichever
    /// singletons had already been constructed, in reverse order.
    pub(crate) fn build(
        mut registry: Registry,
        decorations: DecorationPipeline,
        observers: Observers,
    ) -> DiResult<Self> {
        registry.finalize();
        let graph = DependencyGraph::build(&registry);
        validator::validate(&registry, &graph)?;
        let order = graph.topological_sort()?;

        let inner = Arc::new(ProviderInner {
            registry,
            decorations,
            observers,
            disposed: AtomicBool::new(false),
        });
        let root = Scope::new_root(inner.clone(), CancellationToken::new());

        let mut groups_done = std::collections::HashSet::new();
        for node in &order {
            let Some(reg) = inner.registry.node_registration(node) else {
                continue;
            };
            if reg.lifetime != Lifetime::Singleton {
                continue;
            }
            match node {
                crate::registration::Node::Single(key) => {
                    if let Err(e) = root.resolve_any(key) {
                        root.close().ok();
                        return Err(e.wrap_resolution(key.display_name()));
                    }
                }
                crate::registration::Node::GroupMember(group_key, _) => {
                    if !groups_done.insert(group_key.clone()) {
                        continue;
                    }
                    if let Err(e) = root.resolve_many(group_key) {
                        root.close().ok();
                        return Err(e.wrap_resolution(group_key.display_name()));
                    }
                }
            }
        }

        Ok(Self { inner, root })
    }

    /// Creates a child scope rooted at this provider, inheriting a fresh
    /// child of the provider's top-level cancellation token.
    pub fn create_scope(&self) -> Scope {
        self.root.create_scope()
    }

    /// Like [`create_scope`](ServiceProvider::create_scope), with an explicit cancellation token.
    pub fn create_scope_with(&self, cancellation: CancellationToken) -> Scope {
        self.root.create_scope_with(cancellation)
    }

    /// Idempotently closes the provider: disposes the root scope (and every
    /// Singleton constructed with a registered synchronous disposer) in
    /// reverse construction order.
    pub fn close(&self) -> DiResult<()> {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.root.close()
    }

    /// Async counterpart of [`close`](ServiceProvider::close).
    ///
    /// # Examples
    ///
    /// ```
    /// use keelwork_di::{ServiceCollection, Dispose, AsyncDispose, Resolver};
    /// use async_trait::async_trait;
    /// use std::sync::Arc;
    ///
    /// struct Cache;
    /// impl Dispose for Cache {
    ///     fn dispose(&self) {}
    /// }
    ///
    /// struct Client;
    /// #[async_trait]
    /// impl AsyncDispose for Client {
    ///     async fn dispose(&self) {}
    /// }
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_factory::<Cache, _>(|r| {
    ///     let cache = Arc::new(Cache);
    ///     r.register_disposer(cache.clone());
    ///     Cache
    /// });
    /// services.add_singleton_factory::<Client, _>(|r| {
    ///     let client = Arc::new(Client);
    ///     r.register_async_disposer(client.clone());
    ///     Client
    /// });
    ///
    /// let provider = services.build()?;
    /// provider.close_async().await?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "async")]
    pub async fn close_async(&self) -> DiResult<()> {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.root.close_async().await
    }
}

impl Drop for ServiceProvider {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 && !self.inner.disposed.load(Ordering::Acquire) {
            tracing::warn!(
                target: "keelwork_di",
                "ServiceProvider dropped without calling close(); disposables did not run"
            );
        }
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.root.resolve_any(key)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.root.resolve_many(key)
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.root.push_sync_disposer(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> crate::internal::BoxFutureUnit + Send>) {
        self.root.push_async_disposer(f);
    }
}
