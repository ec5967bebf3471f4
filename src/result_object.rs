//! Result objects: one constructor call emitting several registrations.
//!
//! A type implementing [`ResultObject`] bundles the output of a single
//! factory call into multiple independently resolvable services. The
//! underlying factory runs (and caches) once per its lifetime tier, under an
//! internal registration for the result type itself; each declared field
//! gets its own registration that depends on the result type and projects
//! one value out of it.

use std::sync::Arc;

use crate::key::{key_of_group, key_of_named, key_of_type, Key};
use crate::registration::AnyArc;

/// One field's registration, declared against a concrete [`ResultObject`] type `R`.
pub struct ResultFieldDecl<R> {
    pub(crate) key: Key,
    pub(crate) extract: Box<dyn Fn(&R) -> AnyArc + Send + Sync>,
}

/// A struct whose fields are each registered as independent services from a
/// single constructor invocation.
///
/// Result objects may not carry a top-level `Key`/`Group`/`AsTypes` — that
/// metadata is instead expressed per field, through [`ResultBuilder`].
pub trait ResultObject: Send + Sync + Sized + 'static {
    /// Declares each field this result object emits as its own registration.
    fn fields() -> Vec<ResultFieldDecl<Self>>;
}

/// Builds the field declarations for a [`ResultObject`].
pub struct ResultBuilder<R> {
    fields: Vec<ResultFieldDecl<R>>,
}

impl<R: ResultObject> ResultBuilder<R> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Emits `T`, unkeyed and ungrouped, projected out of `R` by `extract`.
    pub fn field<T: Send + Sync + 'static>(
        mut self,
        extract: impl Fn(&R) -> Arc<T> + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(ResultFieldDecl {
            key: key_of_type::<T>(),
            extract: Box::new(move |r| extract(r) as AnyArc),
        });
        self
    }

    /// Emits `T` under the discriminator `name`.
    pub fn named_field<T: Send + Sync + 'static>(
        mut self,
        name: &'static str,
        extract: impl Fn(&R) -> Arc<T> + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(ResultFieldDecl {
            key: key_of_named::<T>(name),
            extract: Box::new(move |r| extract(r) as AnyArc),
        });
        self
    }

    /// Emits `T` into `group`.
    pub fn group_field<T: Send + Sync + 'static>(
        mut self,
        group: &'static str,
        extract: impl Fn(&R) -> Arc<T> + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(ResultFieldDecl {
            key: key_of_group::<T>(group),
            extract: Box::new(move |r| extract(r) as AnyArc),
        });
        self
    }

    pub fn build(self) -> Vec<ResultFieldDecl<R>> {
        self.fields
    }
}

impl<R: ResultObject> Default for ResultBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
