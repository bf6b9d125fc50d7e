//! The process-wide root context.

use crate::context::Context;
use once_cell::sync::Lazy;

// Created on first access.
static GLOBAL_CONTEXT: Lazy<Context> = Lazy::new(|| Context::new("global"));

/// Provides the process-wide root context.
///
/// Components registered here are visible to every context created from it
/// with [`Context::child_context`].
///
/// # Examples
///
/// ```
/// use fibre_context::{global, Lifetime, Recipe};
///
/// global()
///   .register(
///     Recipe::new("app_name")
///       .lifetime(Lifetime::Singleton)
///       .create_sync(|_, _, _| Ok::<_, std::convert::Infallible>(String::from("fibre"))),
///   )
///   .unwrap();
///
/// let request = global().child_context(Some("request"));
/// assert!(request.is_registered("app_name"));
/// ```
pub fn global() -> &'static Context {
  &GLOBAL_CONTEXT
}
