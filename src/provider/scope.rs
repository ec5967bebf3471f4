//! Scope: the per-request/per-unit-of-work resolution and disposal tier.
//!
//! A `Scope` backs Scoped-lifetime resolution with its own cache, accumulates
//! its own disposables, and hands Singleton resolution off to the ultimate
//! root scope so every process construction of a Singleton shares one cache
//! slot no matter which scope first asked for it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[cfg(feature = "once-cell")]
use once_cell::sync::OnceCell;

use crate::error::{DiError, DiResult};
use crate::internal::{with_circular_catch, DisposeBag};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ProviderInner;
use crate::provider::ResolverContext;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;
use crate::CancellationToken;

/// Per-slot memoized cache backing Scoped resolution within one `Scope`.
///
/// Each slot is locked independently, so a resolution in progress for one
/// scoped service never blocks resolution of another; within a slot, the
/// lock held across construction gives single-flight behavior regardless
/// of whether the `once-cell` feature is enabled.
struct ScopedCache {
    #[cfg(feature = "once-cell")]
    slots: Box<[OnceCell<AnyArc>]>,
    #[cfg(not(feature = "once-cell"))]
    slots: Box<[Mutex<Option<AnyArc>>]>,
}

impl ScopedCache {
    fn new(count: usize) -> Self {
        #[cfg(feature = "once-cell")]
        {
            Self {
                slots: (0..count).map(|_| OnceCell::new()).collect(),
            }
        }
        #[cfg(not(feature = "once-cell"))]
        {
            Self {
                slots: (0..count).map(|_| Mutex::new(None)).collect(),
            }
        }
    }

    fn get_or_create(
        &self,
        slot: usize,
        f: impl FnOnce() -> DiResult<AnyArc>,
    ) -> DiResult<AnyArc> {
        #[cfg(feature = "once-cell")]
        {
            self.slots[slot].get_or_try_init(f).cloned()
        }
        #[cfg(not(feature = "once-cell"))]
        {
            let mut guard = self.slots[slot].lock().unwrap();
            if let Some(existing) = guard.as_ref() {
                return Ok(existing.clone());
            }
            let value = f()?;
            *guard = Some(value.clone());
            Ok(value)
        }
    }
}

struct ScopeState {
    inner: Arc<ProviderInner>,
    /// `None` when this state is itself the root scope; `Some(root)` otherwise.
    root: Option<Scope>,
    scoped: ScopedCache,
    disposables: Mutex<DisposeBag>,
    disposed: AtomicBool,
    cancellation: CancellationToken,
}

/// An isolated, disposable resolution context.
///
/// Cheap to clone (an `Arc` handle around shared state). Singleton resolution
/// performed through any `Scope` is serviced by the ultimate root scope's
/// cache; Scoped resolution is serviced by this scope's own cache. Closing a
/// scope drains its disposables in reverse construction order and cancels
/// its `CancellationToken`.
#[derive(Clone)]
pub struct Scope(Arc<ScopeState>);

impl Scope {
    pub(crate) fn new_root(inner: Arc<ProviderInner>, cancellation: CancellationToken) -> Self {
        let count = inner.registry.scoped_count;
        Self(Arc::new(ScopeState {
            inner,
            root: None,
            scoped: ScopedCache::new(count),
            disposables: Mutex::new(DisposeBag::default()),
            disposed: AtomicBool::new(false),
            cancellation,
        }))
    }

    /// Creates a child scope. Its Singleton resolution is serviced by this
    /// scope's own root (itself, if this scope is already the root).
    pub fn create_scope(&self) -> Scope {
        self.create_scope_with(self.0.cancellation.child_token())
    }

    /// Like [`create_scope`](Scope::create_scope), with an explicit cancellation token.
    pub fn create_scope_with(&self, cancellation: CancellationToken) -> Scope {
        let count = self.0.inner.registry.scoped_count;
        Scope(Arc::new(ScopeState {
            inner: self.0.inner.clone(),
            root: Some(self.root_scope().clone()),
            scoped: ScopedCache::new(count),
            disposables: Mutex::new(DisposeBag::default()),
            disposed: AtomicBool::new(false),
            cancellation,
        }))
    }

    fn root_scope(&self) -> &Scope {
        match &self.0.root {
            Some(root) => root,
            None => self,
        }
    }

    fn is_disposed(&self) -> bool {
        self.0.inner.disposed.load(Ordering::Acquire) || self.0.disposed.load(Ordering::Acquire)
    }

    /// This scope's cancellation token.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.0.cancellation
    }

    /// Idempotently closes the scope: drains its disposables in reverse
    /// construction order and cancels its token. Subsequent resolution
    /// attempts through this scope return [`DiError::Disposed`].
    pub fn close(&self) -> DiResult<()> {
        if self.0.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.0.cancellation.cancel();
        let mut bag = self.0.disposables.lock().unwrap();
        bag.drain_sync()
    }

    /// Async counterpart of [`close`](Scope::close): drains async disposables too.
    #[cfg(feature = "async")]
    pub async fn close_async(&self) -> DiResult<()> {
        if self.0.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.0.cancellation.cancel();
        {
            let mut bag = self.0.disposables.lock().unwrap();
            bag.drain_async().await?;
        }
        let mut bag = self.0.disposables.lock().unwrap();
        bag.drain_sync()
    }

    fn resolve_one(&self, key: &Key) -> DiResult<AnyArc> {
        if self.is_disposed() {
            return Err(DiError::Disposed(key.display_name()));
        }

        let reg = self
            .0
            .inner
            .registry
            .get(key)
            .ok_or_else(|| DiError::NotFound(key.display_name()))?;

        let name = key.display_name();
        let decoration_key = key.service_name();
        self.0.inner.observers.resolving(key);
        let started = Instant::now();

        // Decoration runs inside the cache-populating closure for Singleton
        // and Scoped so a decorator failure never writes to the cache slot:
        // the whole construction+decoration step is atomic from the cache's
        // point of view. Decorators always see the calling scope, even when
        // constructing a Singleton through the root.
        let decorate_ctx = ResolverContext::new(self);
        let construct_and_decorate = |ctor_ctx: &ResolverContext| -> DiResult<AnyArc> {
            let raw = (reg.ctor)(ctor_ctx)?;
            match key.type_id() {
                Some(type_id) => {
                    self.0
                        .inner
                        .decorations
                        .decorate_erased(type_id, decoration_key, raw, &decorate_ctx)
                }
                None => Ok(raw),
            }
        };

        let outcome = match reg.lifetime {
            Lifetime::Singleton => {
                let root = self.root_scope();
                let ctx = ResolverContext::new(root);
                with_circular_catch(name, || {
                    reg.get_or_init_singleton(|| construct_and_decorate(&ctx))
                })
            }
            Lifetime::Scoped => {
                let slot = reg
                    .scoped_slot
                    .expect("scoped registration missing slot; registry not finalized");
                let ctx = ResolverContext::new(self);
                with_circular_catch(name, || {
                    self.0
                        .scoped
                        .get_or_create(slot, || construct_and_decorate(&ctx))
                })
            }
            Lifetime::Transient => {
                let ctx = ResolverContext::new(self);
                with_circular_catch(name, || construct_and_decorate(&ctx))
            }
        };

        match outcome {
            Ok(decorated) => {
                self.0.inner.observers.resolved(key, started.elapsed());
                Ok(decorated)
            }
            Err(DiError::Circular(path)) => {
                self.0
                    .inner
                    .observers
                    .factory_panic(key, "circular dependency detected");
                Err(DiError::Circular(path))
            }
            Err(e) => Err(e),
        }
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolve_one(key)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        let group_key = key
            .group_key()
            .expect("resolve_many called with a non-group key");
        if self.is_disposed() {
            return Err(DiError::Disposed(group_key.display_name()));
        }
        let Some(members) = self.0.inner.registry.get_group(&group_key) else {
            return Ok(Vec::new());
        };

        let name = group_key.display_name();
        // Group members have no discriminator name of their own, so group
        // decoration always resolves against the unkeyed decorator set.
        let decoration_key = group_key.service_name();
        let mut results = Vec::with_capacity(members.len());
        for reg in members.iter() {
            self.0.inner.observers.resolving(&group_key);
            let started = Instant::now();

            let decorate_ctx = ResolverContext::new(self);
            let construct_and_decorate = |ctor_ctx: &ResolverContext| -> DiResult<AnyArc> {
                let raw = (reg.ctor)(ctor_ctx)?;
                match group_key.type_id() {
                    Some(type_id) => self.0.inner.decorations.decorate_erased(
                        type_id,
                        decoration_key,
                        raw,
                        &decorate_ctx,
                    ),
                    None => Ok(raw),
                }
            };

            let outcome = match reg.lifetime {
                Lifetime::Singleton => {
                    let root = self.root_scope();
                    let ctx = ResolverContext::new(root);
                    with_circular_catch(name, || {
                        reg.get_or_init_singleton(|| construct_and_decorate(&ctx))
                    })
                }
                Lifetime::Scoped => {
                    let slot = reg.scoped_slot.unwrap_or_else(|| {
                        panic!("scoped group member missing slot; registry not finalized")
                    });
                    let ctx = ResolverContext::new(self);
                    with_circular_catch(name, || {
                        self.0
                            .scoped
                            .get_or_create(slot, || construct_and_decorate(&ctx))
                    })
                }
                Lifetime::Transient => {
                    let ctx = ResolverContext::new(self);
                    with_circular_catch(name, || construct_and_decorate(&ctx))
                }
            };

            let decorated = outcome.map_err(|e| e.wrap_resolution(name))?;
            self.0.inner.observers.resolved(&group_key, started.elapsed());
            results.push(decorated);
        }
        Ok(results)
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.0.disposables.lock().unwrap().push_sync(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> crate::internal::BoxFutureUnit + Send>) {
        #[cfg(feature = "async")]
        {
            self.0.disposables.lock().unwrap().push_async(move || f());
        }
        #[cfg(not(feature = "async"))]
        {
            let _ = f;
        }
    }
}
