//! # Fibre Context
//!
//! An async, context-scoped Inversion of Control (IoC) container for Rust.
//!
//! Components are registered by name with a [`Recipe`]: a create operation
//! (sync or async), the names of the components it is built from, an optional
//! dispose operation and a [`Lifetime`]. Resolving a name builds the
//! dependency graph on demand, creating each cached component at most once
//! even under concurrent resolution.
//!
//! ## Core Concepts
//!
//! - **Context**: a node in a tree of scopes. It owns registrations and the
//!   instances cached in it, and sees every registration of its ancestors.
//! - **Lifetime**: `Singleton` instances live in the declaring context and are
//!   shared by all descendants, `Context` instances live in each resolving
//!   context, `Transient` instances are created on every resolution.
//! - **Destruction**: [`Context::destroy`] disposes a context's instances and
//!   its children's, never disposing a component before the components built
//!   from it.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_context::{Context, Lifetime, Recipe};
//! use std::convert::Infallible;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), fibre_context::Error> {
//!   let root = Context::new("app");
//!
//!   root.register(
//!     Recipe::new("name")
//!       .lifetime(Lifetime::Context)
//!       .create_sync(|_, _, _| Ok::<_, Infallible>(String::from("world"))),
//!   )?;
//!
//!   root.register(
//!     Recipe::new("greet")
//!       .lifetime(Lifetime::Context)
//!       .depends_on(["name"])
//!       .create(|_ctx, deps, _args| async move {
//!         let name = deps.get::<String>("name")?;
//!         Ok::<_, fibre_context::Error>(format!("Hello, {}!", name))
//!       })
//!       .dispose(|_ctx, greeting: Arc<String>| async move {
//!         println!("dropping {}", greeting);
//!         Ok::<_, Infallible>(())
//!       }),
//!   )?;
//!
//!   let request = root.child_context(Some("request"));
//!   let greeting = request.resolve::<String>("greet").await?;
//!   assert_eq!(*greeting, "Hello, world!");
//!
//!   root.destroy().await
//! }
//! ```

mod context;
mod disposal;
mod error;
mod global;
mod instantiation;
mod lifetime;
mod macros;
mod registration;
mod resolver;

pub use context::Context;
pub use error::{BoxError, Error, Result, SharedError};
pub use global::global;
pub use lifetime::Lifetime;
pub use registration::{Args, Dependencies, Instance, Recipe};
