//! The `Context` tree: registration stores, instance caches and scoping.

use crate::error::{Error, Result};
use crate::instantiation::Instantiation;
use crate::registration::{Recipe, Registration};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

pub(crate) struct ContextInner {
  name: String,
  path: String,
  parent: Option<Context>,
  children: Mutex<Vec<Context>>,
  next_child: AtomicUsize,
  pub(crate) registrations: DashMap<String, Arc<Registration>>,
  pub(crate) instances: DashMap<String, Arc<Instantiation>>,
}

/// A scoping node of the container.
///
/// Each context owns its registrations and the instances cached in it. A
/// context sees its own registrations and those of all its ancestors, the
/// nearest declaration winning. `Context` is a cheap handle: clones refer to
/// the same node.
///
/// Parents and children hold each other alive: a child created by
/// `child_context` stays attached to its parent, and reachable by the
/// parent's `destroy`, even after every handle to it is dropped. Destroying a
/// context detaches it from its parent.
#[derive(Clone)]
pub struct Context {
  pub(crate) inner: Arc<ContextInner>,
}

#[derive(Clone)]
pub(crate) struct WeakContext(Weak<ContextInner>);

impl WeakContext {
  pub(crate) fn upgrade(&self) -> Option<Context> {
    self.0.upgrade().map(|inner| Context { inner })
  }
}

impl Context {
  /// Creates a new root context.
  pub fn new(name: impl Into<String>) -> Self {
    let name = name.into();
    Self::with_parent(name.clone(), name, None)
  }

  fn with_parent(name: String, path: String, parent: Option<Context>) -> Self {
    Self {
      inner: Arc::new(ContextInner {
        name,
        path,
        parent,
        children: Mutex::new(Vec::new()),
        next_child: AtomicUsize::new(0),
        registrations: DashMap::new(),
        instances: DashMap::new(),
      }),
    }
  }

  pub fn name(&self) -> &str {
    &self.inner.name
  }

  /// The `/`-separated names from the root down to this context.
  pub fn path(&self) -> &str {
    &self.inner.path
  }

  pub fn parent(&self) -> Option<&Context> {
    self.inner.parent.as_ref()
  }

  /// Creates a child context. Unnamed children are named `child-<n>`.
  pub fn child_context(&self, name: Option<&str>) -> Context {
    let name = match name {
      Some(name) => name.to_owned(),
      None => format!(
        "child-{}",
        self.inner.next_child.fetch_add(1, Ordering::Relaxed)
      ),
    };
    let path = format!("{}/{}", self.inner.path, name);
    let child = Self::with_parent(name, path, Some(self.clone()));

    self.inner.children.lock().push(child.clone());

    trace!(context = %child.path(), "created child context");
    child
  }

  /// The child contexts created by this one and not yet destroyed.
  pub fn children(&self) -> Vec<Context> {
    self.inner.children.lock().clone()
  }

  /// Drops `child` from this context's child list.
  pub(crate) fn detach(&self, child: &Context) {
    self.inner.children.lock().retain(|c| !c.ptr_eq(child));
  }

  /// Registers a component in this context.
  ///
  /// Replaces any registration of the same name made earlier in this same
  /// context. Instances already cached from the old registration stay cached.
  pub fn register(&self, recipe: Recipe) -> Result<()> {
    let registration = recipe.into_registration()?;
    debug!(
      context = %self.path(),
      component = %registration.name,
      lifetime = %registration.lifetime,
      dependencies = ?registration.dependencies,
      "registered component"
    );
    self
      .inner
      .registrations
      .insert(registration.name.clone(), Arc::new(registration));
    Ok(())
  }

  /// Whether `name` is visible from this context, declared here or by an
  /// ancestor.
  pub fn is_registered(&self, name: &str) -> bool {
    self.lookup(name).is_ok()
  }

  /// Whether this context's own cache holds an instance of `name`.
  pub fn is_cached(&self, name: &str) -> bool {
    self.inner.instances.contains_key(name)
  }

  /// Returns `true` if both handles refer to the same context.
  pub fn ptr_eq(&self, other: &Context) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }

  pub(crate) fn downgrade(&self) -> WeakContext {
    WeakContext(Arc::downgrade(&self.inner))
  }

  /// Finds the nearest declaration of `name`, returning the declaring context
  /// alongside the registration.
  pub(crate) fn lookup(&self, name: &str) -> Result<(Context, Arc<Registration>)> {
    let mut current = Some(self);
    while let Some(context) = current {
      if let Some(registration) = context.inner.registrations.get(name) {
        return Ok((context.clone(), registration.value().clone()));
      }
      current = context.parent();
    }
    Err(Error::NotFound {
      name: name.to_owned(),
      path: self.path().to_owned(),
    })
  }

  pub(crate) fn cached(&self) -> Vec<Arc<Instantiation>> {
    self
      .inner
      .instances
      .iter()
      .map(|entry| entry.value().clone())
      .collect()
  }
}

impl Default for Context {
  fn default() -> Self {
    Self::new("root")
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Context")
      .field("path", &self.inner.path)
      .field("registrations", &self.inner.registrations.len())
      .field("instances", &self.inner.instances.len())
      .finish()
  }
}
