//! Resolution: choosing the cache slot, reusing or creating instantiations,
//! and running the creation protocol.

use crate::context::{Context, WeakContext};
use crate::error::{Error, Result};
use crate::instantiation::Instantiation;
use crate::lifetime::Lifetime;
use crate::registration::{downcast, Args, Dependencies, Instance, Registration};
use futures_util::future::try_join_all;
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

impl Context {
  /// Resolves `name` and downcasts the instance to `T`.
  ///
  /// # Errors
  ///
  /// - `Error::NotFound` if no context in this one's ancestry declares `name`.
  /// - The error of the failing create operation, this component's own or a
  ///   dependency's.
  /// - `Error::TypeMismatch` if the instance is not a `T`.
  pub async fn resolve<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.resolve_with(name, Args::new()).await
  }

  /// Resolves `name`, handing `args` to the create operation if this call
  /// ends up creating the instance.
  pub async fn resolve_with<T: Any + Send + Sync>(&self, name: &str, args: Args) -> Result<Arc<T>> {
    let instance = self.resolve_instance(name, args).await?;
    downcast(name, instance)
  }

  /// Resolves `name` without downcasting.
  pub async fn resolve_instance(&self, name: &str, args: Args) -> Result<Instance> {
    // The cache slot is claimed here, before the first await.
    let instantiation = self.instantiate(name, args)?;
    instantiation.value().await
  }

  /// Returns the instantiation serving `name` for this context, creating and
  /// caching a new one on a miss.
  pub(crate) fn instantiate(&self, name: &str, args: Args) -> Result<Arc<Instantiation>> {
    let (declaring, registration) = self.lookup(name)?;
    let owner = match registration.lifetime {
      Lifetime::Singleton => declaring,
      Lifetime::Context | Lifetime::Transient => self.clone(),
    };

    if !registration.lifetime.is_cached() {
      return Ok(Instantiation::new(registration, &owner, args));
    }

    let mut created = false;
    let instantiation = owner
      .inner
      .instances
      .entry(name.to_owned())
      .or_insert_with(|| {
        created = true;
        Instantiation::new(registration.clone(), &owner, args)
      })
      .clone();

    if created {
      trace!(context = %owner.path(), component = name, lifetime = %registration.lifetime, "cache miss");
    } else {
      trace!(context = %owner.path(), component = name, "cache hit");
    }
    Ok(instantiation)
  }
}

/// The creation protocol of one instantiation. Runs on first poll.
pub(crate) async fn create(
  this: Weak<Instantiation>,
  registration: Arc<Registration>,
  owner: WeakContext,
  args: Args,
) -> Result<Instance> {
  let name = registration.name.as_str();
  let owner = owner.upgrade().ok_or_else(|| Error::ContextDropped {
    name: name.to_owned(),
  })?;

  // Dependencies resolve against the owning context, not the requester.
  let dependencies = registration
    .dependencies
    .iter()
    .map(|dependency| owner.instantiate(dependency, Args::new()))
    .collect::<Result<Vec<_>>>()?;

  match this.upgrade() {
    Some(this) => this.record_dependencies(dependencies.clone())?,
    None => {
      return Err(Error::ContextDropped {
        name: name.to_owned(),
      })
    }
  }

  debug!(
    context = %owner.path(),
    component = name,
    lifetime = %registration.lifetime,
    "creating component"
  );

  // The first failure is reported at once. Siblings still pending keep their
  // cache slots and resume on the next poll.
  let settled = try_join_all(dependencies.iter().map(|d| d.value())).await?;
  let values = dependencies
    .iter()
    .map(|dependency| dependency.name().to_owned())
    .zip(settled)
    .collect();

  match (registration.create)(owner.clone(), Dependencies::new(values), args).await {
    Ok(instance) => {
      debug!(context = %owner.path(), component = name, "created component");
      Ok(instance)
    }
    Err(source) => {
      warn!(context = %owner.path(), component = name, error = %source, "failed to create component");
      Err(Error::create(name, source))
    }
  }
}
