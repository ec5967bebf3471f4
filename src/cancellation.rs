//! Cancellation handle shared by a Provider's scopes.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A handle that signals cancellation to whoever is holding it.
///
/// Each [`Scope`](crate::provider::Scope) is created with a `CancellationToken`
/// (or inherits the root's, via [`ServiceProvider::create_scope`](crate::provider::ServiceProvider::create_scope)).
/// `close()` on the owning scope cancels it. The core never inspects the
/// token during construction — it exists purely for constructors to take
/// as an explicit dependency and check cooperatively.
///
/// # Examples
///
/// ```
/// use keelwork_di::CancellationToken;
///
/// let parent = CancellationToken::new();
/// let child = parent.child_token();
///
/// parent.cancel();
/// assert!(child.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    parent: Option<CancellationToken>,
}

impl CancellationToken {
    /// Creates a new, unlinked token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                parent: None,
            }),
        }
    }

    /// Creates a child token that reports cancelled once either it or `self`
    /// has been cancelled.
    pub fn child_token(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` if this token or any ancestor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return true;
        }
        match &self.inner.parent {
            Some(parent) => parent.is_cancelled(),
            None => false,
        }
    }

    /// Resolves once the token becomes cancelled.
    ///
    /// Intended for use with `tokio::select!` to race against a constructor's
    /// own work.
    #[cfg(feature = "async")]
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
