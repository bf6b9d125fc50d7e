//! Tearing down contexts: children first-and-concurrently, then instances in
//! reverse dependency order.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::instantiation::{Disposal, Instantiation};
use futures_util::future::{join, join_all, BoxFuture, FutureExt};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

impl Context {
  /// Disposes every instance cached in this context and in all of its
  /// descendants.
  ///
  /// Child contexts are destroyed concurrently with this context's own
  /// instances. Within a context, an instance is disposed only after every
  /// cached instance built from it has finished disposing.
  ///
  /// Each dispose operation runs at most once: calling `destroy` again does
  /// not redo disposals that already completed. If any dispose operation
  /// fails, every branch already underway still runs to completion and the
  /// first failure is returned.
  ///
  /// A context destroyed without failures is detached from its parent, so a
  /// later `destroy` of the parent no longer visits it.
  pub async fn destroy(&self) -> Result<()> {
    self.destroy_tree().await?;
    if let Some(parent) = self.parent() {
      parent.detach(self);
    }
    Ok(())
  }

  fn destroy_tree(&self) -> BoxFuture<'_, Result<()>> {
    async move {
      let children = self.children();
      let instances = self.cached();
      debug!(
        context = %self.path(),
        children = children.len(),
        instances = instances.len(),
        "destroying context"
      );

      let (children_settled, instances_settled) = join(
        join_all(children.iter().map(Context::destroy_tree)),
        join_all(instances.iter().map(Instantiation::dispose)),
      )
      .await;

      // Children destroyed cleanly are released; failed ones stay reachable.
      for (child, settled) in children.iter().zip(&children_settled) {
        if settled.is_ok() {
          self.detach(child);
        }
      }

      let result = children_settled
        .into_iter()
        .chain(instances_settled)
        .collect::<Result<Vec<()>>>()
        .map(|_| ());
      match &result {
        Ok(()) => debug!(context = %self.path(), "destroyed context"),
        Err(err) => warn!(context = %self.path(), error = %err, "context destroyed with failures"),
      }
      result
    }
    .boxed()
  }

  /// The cached instantiations built from `target`.
  fn dependents_of(&self, target: &Instantiation) -> Vec<Arc<Instantiation>> {
    self
      .inner
      .instances
      .iter()
      .filter(|entry| entry.value().consumes(target))
      .map(|entry| entry.value().clone())
      .collect()
  }
}

impl Instantiation {
  /// Disposes this instantiation once its dependents are disposed.
  ///
  /// Memoized: every call returns a handle on the same disposal.
  pub(crate) fn dispose(self: &Arc<Self>) -> Disposal {
    self
      .disposal
      .get_or_init(|| run_disposal(Arc::downgrade(self)).boxed().shared())
      .clone()
  }
}

async fn run_disposal(this: Weak<Instantiation>) -> Result<()> {
  let Some(this) = this.upgrade() else {
    return Ok(());
  };
  let Some(owner) = this.owner.upgrade() else {
    return Ok(());
  };
  let dependents = owner.dependents_of(&this);
  let name = this.name().to_owned();
  let dispose = this.registration.dispose.clone();
  let creation = this.value();
  drop(this);

  // Dependents dispose concurrently; a failure among them leaves this
  // instance undisposed.
  join_all(dependents.iter().map(Instantiation::dispose))
    .await
    .into_iter()
    .collect::<Result<Vec<()>>>()?;

  let Some(dispose) = dispose else {
    return Ok(());
  };
  let instance = match creation.await {
    Ok(instance) => instance,
    Err(err) => {
      debug!(context = %owner.path(), component = %name, error = %err, "skipping disposal of a failed creation");
      return Ok(());
    }
  };

  debug!(context = %owner.path(), component = %name, "disposing component");
  match dispose(owner.clone(), instance).await {
    Ok(()) => {
      debug!(context = %owner.path(), component = %name, "disposed component");
      Ok(())
    }
    Err(source) => {
      warn!(context = %owner.path(), component = %name, error = %source, "failed to dispose component");
      Err(Error::dispose(&name, source))
    }
  }
}
