//! Diagnostic observers for dependency injection resolution events.

use std::sync::Arc;
use std::time::Duration;

use crate::Key;

/// Observer hook for resolution events.
///
/// Implementations receive structured callbacks around each resolution;
/// the core logs through [`tracing`] by default via [`LoggingObserver`],
/// but callers may plug in their own sink.
///
/// # Examples
///
/// ```
/// use keelwork_di::{DiObserver, ServiceCollection, Key};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct CountingObserver(std::sync::atomic::AtomicU64);
///
/// impl DiObserver for CountingObserver {
///     fn resolving(&self, _key: &Key) {}
///     fn resolved(&self, _key: &Key, _duration: Duration) {
///         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///     }
///     fn factory_panic(&self, _key: &Key, _message: &str) {}
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(CountingObserver(Default::default())));
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a factory is invoked for `key`.
    fn resolving(&self, key: &Key);

    /// Called after `key` resolves successfully.
    fn resolved(&self, key: &Key, duration: Duration);

    /// Called when a factory panics while resolving `key`. The panic still propagates.
    fn factory_panic(&self, key: &Key, message: &str);
}

/// Holds the registered observers for a Provider.
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn factory_panic(&self, key: &Key, message: &str) {
        for observer in &self.observers {
            observer.factory_panic(key, message);
        }
    }
}

/// Observer that forwards resolution events to [`tracing`].
///
/// # Examples
///
/// ```
/// use keelwork_di::{ServiceCollection, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    target: &'static str,
}

impl LoggingObserver {
    /// Creates an observer logging under the default `keelwork_di` target.
    pub fn new() -> Self {
        Self {
            target: "keelwork_di",
        }
    }

    /// Creates an observer logging under a custom tracing target.
    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &Key) {
        tracing::debug!(target: self.target, service = key.display_name(), "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(
            target: self.target,
            service = key.display_name(),
            ?duration,
            "resolved"
        );
    }

    fn factory_panic(&self, key: &Key, message: &str) {
        tracing::warn!(
            target: self.target,
            service = key.display_name(),
            message,
            "factory panicked"
        );
    }
}
