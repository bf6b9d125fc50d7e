//! Errors raised while registering, resolving and disposing components.

use std::sync::Arc;
use thiserror::Error;

/// The error type user-supplied create and dispose operations may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A user error after it has been captured by the container.
///
/// Creation results are shared by every caller waiting on the same cache slot,
/// so the underlying error is reference counted rather than boxed.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for `fibre_context`.
#[derive(Debug, Clone, Error)]
pub enum Error {
  #[error("invalid registration '{name}': {reason}")]
  InvalidRegistration { name: String, reason: String },

  #[error("unknown lifetime '{0}' (expected singleton, context or transient)")]
  UnknownLifetime(String),

  #[error("component '{name}' is not registered (looked up from '{path}')")]
  NotFound { name: String, path: String },

  #[error("failed to create component '{name}': {source}")]
  Create { name: String, source: SharedError },

  #[error("failed to dispose component '{name}': {source}")]
  Dispose { name: String, source: SharedError },

  #[error("component '{name}' is not a {expected}")]
  TypeMismatch { name: String, expected: &'static str },

  #[error("component '{name}' was not declared as a dependency")]
  UndeclaredDependency { name: String },

  #[error("dependency cycle detected while creating component '{name}'")]
  Cycle { name: String },

  #[error("the context owning component '{name}' was dropped before it could be created")]
  ContextDropped { name: String },
}

impl Error {
  pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
    Error::InvalidRegistration {
      name: name.to_owned(),
      reason: reason.into(),
    }
  }

  pub(crate) fn create(name: &str, source: BoxError) -> Self {
    Error::Create {
      name: name.to_owned(),
      source: Arc::from(source),
    }
  }

  pub(crate) fn dispose(name: &str, source: BoxError) -> Self {
    Error::Dispose {
      name: name.to_owned(),
      source: Arc::from(source),
    }
  }
}

/// A specialized `Result` type for `fibre_context` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
