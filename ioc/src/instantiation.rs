//! Core, non-public runtime records for created components.

use crate::context::{Context, WeakContext};
use crate::error::{Error, Result};
use crate::registration::{Args, Instance, Registration};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub(crate) type Creation = Shared<BoxFuture<'static, Result<Instance>>>;
pub(crate) type Disposal = Shared<BoxFuture<'static, Result<()>>>;

/// One concrete creation (and, eventually, disposal) of a component.
///
/// The creation future is built eagerly but runs lazily: it starts on the
/// first poll and is then shared by every caller resolving the same slot.
pub(crate) struct Instantiation {
  pub(crate) registration: Arc<Registration>,
  pub(crate) owner: WeakContext,
  /// Set exactly once, when creation starts. Disposal derives dependents
  /// from these edges alone.
  dependencies: OnceCell<Vec<Arc<Instantiation>>>,
  creation: Creation,
  pub(crate) disposal: OnceCell<Disposal>,
}

impl Instantiation {
  pub(crate) fn new(registration: Arc<Registration>, owner: &Context, args: Args) -> Arc<Self> {
    Arc::new_cyclic(|me| {
      let creation = crate::resolver::create(me.clone(), registration.clone(), owner.downgrade(), args)
        .boxed()
        .shared();
      Self {
        registration,
        owner: owner.downgrade(),
        dependencies: OnceCell::new(),
        creation,
        disposal: OnceCell::new(),
      }
    })
  }

  pub(crate) fn name(&self) -> &str {
    &self.registration.name
  }

  /// A handle on the shared creation result.
  pub(crate) fn value(&self) -> Creation {
    self.creation.clone()
  }

  pub(crate) fn dependencies(&self) -> &[Arc<Instantiation>] {
    self.dependencies.get().map(Vec::as_slice).unwrap_or_default()
  }

  /// Records the instantiations this one is built from.
  ///
  /// Fails with `Error::Cycle` when the recorded graph leads back here, which
  /// would otherwise leave the shared creation waiting on itself forever.
  pub(crate) fn record_dependencies(&self, dependencies: Vec<Arc<Instantiation>>) -> Result<()> {
    if reaches(&dependencies, self) {
      return Err(Error::Cycle {
        name: self.name().to_owned(),
      });
    }
    // Only the creation future writes this, and it runs once.
    let _ = self.dependencies.set(dependencies);
    Ok(())
  }

  /// Whether `target` is a direct dependency, or is reached through a chain
  /// of transient dependencies (which are never cached, so the scan over a
  /// context's cache would not see them).
  pub(crate) fn consumes(&self, target: &Instantiation) -> bool {
    let mut seen = HashSet::new();
    let mut stack: Vec<&Instantiation> = vec![self];
    while let Some(current) = stack.pop() {
      for dependency in current.dependencies() {
        if std::ptr::eq(Arc::as_ptr(dependency), target) {
          return true;
        }
        if !dependency.registration.lifetime.is_cached() && seen.insert(Arc::as_ptr(dependency)) {
          stack.push(dependency);
        }
      }
    }
    false
  }
}

fn reaches(from: &[Arc<Instantiation>], target: &Instantiation) -> bool {
  let mut seen = HashSet::new();
  let mut stack: Vec<&Arc<Instantiation>> = from.iter().collect();
  while let Some(current) = stack.pop() {
    if std::ptr::eq(Arc::as_ptr(current), target) {
      return true;
    }
    if seen.insert(Arc::as_ptr(current)) {
      stack.extend(current.dependencies());
    }
  }
  false
}

impl fmt::Debug for Instantiation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Instantiation")
      .field("name", &self.registration.name)
      .field("lifetime", &self.registration.lifetime)
      .field(
        "dependencies",
        &self.dependencies().iter().map(|d| d.name()).collect::<Vec<_>>(),
      )
      .field("created", &self.creation.peek().is_some())
      .field("disposed", &self.disposal.get().and_then(|d| d.peek()).is_some())
      .finish()
  }
}
