//! Internal disposal bag for managing cleanup hooks.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;

use crate::error::DiError;

/// Future type for disposal operations.
pub(crate) type BoxFutureUnit = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Container for disposal hooks with LIFO execution order.
///
/// Async hooks run first (in reverse order), then sync hooks. A hook that
/// panics does not stop the drain; its panic message is folded into the
/// composite error returned once draining completes.
#[derive(Default)]
pub(crate) struct DisposeBag {
    sync: Vec<Box<dyn FnOnce() + Send>>,
    asyncs: Vec<Box<dyn FnOnce() -> BoxFutureUnit + Send>>,
}

impl DisposeBag {
    pub(crate) fn push_sync(&mut self, f: Box<dyn FnOnce() + Send>) {
        self.sync.push(f);
    }

    #[cfg_attr(not(feature = "async"), allow(dead_code))]
    pub(crate) fn push_async<Fut, F>(&mut self, f: F)
    where
        Fut: Future<Output = ()> + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
    {
        self.asyncs.push(Box::new(move || Box::pin(f())));
    }

    /// Runs every hook in LIFO order, aggregating panics into a `CompositeError`.
    pub(crate) fn drain_sync(&mut self) -> Result<(), DiError> {
        let mut errors = Vec::new();
        while let Some(f) = self.sync.pop() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
                errors.push(DiError::Resolution {
                    key: "disposable",
                    source: Box::new(DiError::Registration(panic_message(payload))),
                });
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DiError::Composite(errors))
        }
    }

    #[cfg(feature = "async")]
    pub(crate) async fn drain_async(&mut self) -> Result<(), DiError> {
        let mut errors = Vec::new();
        while let Some(f) = self.asyncs.pop() {
            let fut = f();
            // async panics unwind the executing task; catching across an await
            // point isn't possible with std alone, so async disposers are
            // expected to report failure through their own means instead.
            fut.await;
            let _ = &mut errors;
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DiError::Composite(errors))
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sync.is_empty() && self.asyncs.is_empty()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "disposal hook panicked".to_string()
    }
}
