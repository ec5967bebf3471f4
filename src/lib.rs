//! # keelwork-di
//!
//! A small, explicit dependency injection container: constructors declare
//! their dependencies up front, a static graph is validated at `build()`
//! time (no cycles, no missing registrations, no Singleton depending on
//! Scoped), and resolution honors three lifetimes — Singleton, Scoped, and
//! Transient — with concurrent-safe memoization per tier.
//!
//! ## Quick Start
//!
//! ```rust
//! use keelwork_di::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! services.add_transient_factory::<UserService, _>(|resolver| {
//!     UserService {
//!         db: resolver.get_required::<Database>(),
//!     }
//! });
//!
//! let provider = services.build().unwrap();
//! let user_service = provider.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: constructed once, eagerly, at `build()` time, in
//!   dependency order; shared across the whole process.
//! - **Scoped**: constructed once per [`Scope`]; ideal for request-scoped
//!   state such as a transaction or a per-request context.
//! - **Transient**: constructed fresh on every resolution.
//!
//! ## Trait Resolution
//!
//! ```rust
//! use keelwork_di::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) {
//!         println!("[LOG] {}", message);
//!     }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton_trait::<dyn Logger>(Arc::new(ConsoleLogger));
//!
//! let provider = services.build().unwrap();
//! let logger = provider.get_required_trait::<dyn Logger>();
//! logger.log("Hello, World!");
//! ```
//!
//! ## Scoped Services
//!
//! ```rust
//! use keelwork_di::{ServiceCollection, Resolver};
//! use std::sync::{Arc, Mutex};
//!
//! struct RequestId(String);
//!
//! let mut services = ServiceCollection::new();
//! let counter = Arc::new(Mutex::new(0));
//! let counter_clone = counter.clone();
//!
//! services.add_scoped_factory::<RequestId, _>(move |_| {
//!     let mut c = counter_clone.lock().unwrap();
//!     *c += 1;
//!     RequestId(format!("req-{}", *c))
//! });
//!
//! let provider = services.build().unwrap();
//! let scope1 = provider.create_scope();
//! let scope2 = provider.create_scope();
//!
//! let req1 = scope1.get_required::<RequestId>();
//! let req2 = scope2.get_required::<RequestId>();
//! // Different scopes get different instances
//! assert_ne!(req1.0, req2.0);
//! ```

pub mod cancellation;
pub mod collection;
pub mod decoration;
pub mod descriptors;
pub mod error;
pub(crate) mod graph;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod params;
pub mod provider;
pub mod result_object;
pub mod traits;
pub(crate) mod validator;

// Internal modules
mod internal;
mod registration;

pub use cancellation::CancellationToken;
pub use collection::{RegistrationBuilder, ServiceCollection, TraitRegistrationBuilder};
pub use decoration::{decorators, DecorationPipeline, ServiceDecorator, TraitDecorator};
pub use descriptors::{DependencyRef, ServiceDescriptor};
pub use error::{DiError, DiResult};
pub use internal::CircularPanic;
pub use key::{key_of_group, key_of_named, key_of_type, Key};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver};
pub use params::{ParamsBuilder, ParamsObject};
pub use provider::{ResolverContext, Scope, ServiceProvider};
pub use result_object::{ResultBuilder, ResultObject};
pub use traits::{AsyncDispose, Dispose, Resolver, ResolverCore};
