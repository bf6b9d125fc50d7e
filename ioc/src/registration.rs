//! Component recipes and the validated registrations stored in a context.

use crate::context::Context;
use crate::error::{BoxError, Error, Result};
use crate::lifetime::Lifetime;
use futures_util::future::{self, BoxFuture, FutureExt};
use std::any::{type_name, Any};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A type-erased component instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type CreateFn =
  Arc<dyn Fn(Context, Dependencies, Args) -> BoxFuture<'static, Result<Instance, BoxError>> + Send + Sync>;

pub(crate) type DisposeFn =
  Arc<dyn Fn(Context, Instance) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

pub(crate) fn downcast<T: Any + Send + Sync>(name: &str, instance: Instance) -> Result<Arc<T>> {
  instance.downcast::<T>().map_err(|_| Error::TypeMismatch {
    name: name.to_owned(),
    expected: type_name::<T>(),
  })
}

/// Call-time arguments passed through `resolve_with` to a create operation.
///
/// Arguments only reach the create operation on the resolution that actually
/// creates the instance. Cache hits ignore them.
#[derive(Clone, Default)]
pub struct Args {
  values: Vec<Instance>,
}

impl Args {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends an argument, builder style.
  pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.push(value);
    self
  }

  pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
    self.values.push(Arc::new(value));
  }

  /// Returns the argument at `index` if present and of type `T`.
  pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
    self.values.get(index)?.clone().downcast::<T>().ok()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl fmt::Debug for Args {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Args").field("len", &self.values.len()).finish()
  }
}

/// The resolved dependency values handed to a create operation, in the order
/// they were declared.
#[derive(Clone, Default)]
pub struct Dependencies {
  entries: Vec<(String, Instance)>,
}

impl Dependencies {
  pub(crate) fn new(entries: Vec<(String, Instance)>) -> Self {
    Self { entries }
  }

  /// Returns the dependency declared under `name`, downcast to `T`.
  pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    let instance = self
      .instance(name)
      .ok_or_else(|| Error::UndeclaredDependency {
        name: name.to_owned(),
      })?;
    downcast(name, instance.clone())
  }

  /// Returns the dependency at declaration position `index`, downcast to `T`.
  pub fn at<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
    let (_, instance) = self.entries.get(index)?;
    instance.clone().downcast::<T>().ok()
  }

  pub fn instance(&self, name: &str) -> Option<&Instance> {
    self
      .entries
      .iter()
      .find(|(declared, _)| declared == name)
      .map(|(_, instance)| instance)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(name, _)| name.as_str())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl fmt::Debug for Dependencies {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.names()).finish()
  }
}

/// Describes how to build, cache and tear down one named component.
///
/// A recipe is validated when it is handed to [`Context::register`].
///
/// ```
/// use fibre_context::{Context, Lifetime, Recipe};
///
/// let root = Context::new("root");
/// root
///   .register(
///     Recipe::new("greeting")
///       .lifetime(Lifetime::Singleton)
///       .create_sync(|_ctx, _deps, _args| Ok::<_, std::convert::Infallible>(String::from("hi"))),
///   )
///   .unwrap();
/// assert!(root.is_registered("greeting"));
/// ```
pub struct Recipe {
  name: String,
  lifetime: std::result::Result<Lifetime, String>,
  dependencies: Vec<String>,
  create: Option<CreateFn>,
  dispose: Option<DisposeFn>,
}

impl Recipe {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      lifetime: Ok(Lifetime::default()),
      dependencies: Vec::new(),
      create: None,
      dispose: None,
    }
  }

  pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
    self.lifetime = Ok(lifetime);
    self
  }

  /// Sets the lifetime from its textual name, e.g. a value read from an
  /// application's configuration. An unknown name fails at registration.
  pub fn lifetime_named(mut self, lifetime: &str) -> Self {
    self.lifetime = lifetime.parse::<Lifetime>().map_err(|_| lifetime.to_owned());
    self
  }

  /// Declares the components this one is built from, in the order their
  /// values are handed to the create operation.
  pub fn depends_on<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.dependencies.extend(names.into_iter().map(Into::into));
    self
  }

  /// Sets an asynchronous create operation.
  pub fn create<T, F, Fut, E>(mut self, create: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Context, Dependencies, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
  {
    let create: CreateFn = Arc::new(
      move |ctx: Context, deps: Dependencies, args: Args| -> BoxFuture<'static, Result<Instance, BoxError>> {
        let created = create(ctx, deps, args);
        async move {
          created
            .await
            .map(|value| Arc::new(value) as Instance)
            .map_err(Into::into)
        }
        .boxed()
      },
    );
    self.create = Some(create);
    self
  }

  /// Sets a synchronous create operation.
  pub fn create_sync<T, F, E>(self, create: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Context, Dependencies, Args) -> std::result::Result<T, E> + Send + Sync + 'static,
    E: Into<BoxError> + Send + 'static,
  {
    self.create(move |ctx, deps, args| future::ready(create(ctx, deps, args)))
  }

  /// Sets an asynchronous dispose operation. `T` must match the type produced
  /// by the create operation; a mismatch surfaces as a disposal failure.
  pub fn dispose<T, F, Fut, E>(mut self, dispose: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Context, Arc<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
    E: Into<BoxError> + 'static,
  {
    let name = self.name.clone();
    let dispose: DisposeFn = Arc::new(
      move |ctx: Context, instance: Instance| -> BoxFuture<'static, Result<(), BoxError>> {
        match downcast::<T>(&name, instance) {
          Ok(value) => {
            let disposed = dispose(ctx, value);
            async move { disposed.await.map_err(Into::into) }.boxed()
          }
          Err(err) => future::ready(Err(err.into())).boxed(),
        }
      },
    );
    self.dispose = Some(dispose);
    self
  }

  /// Sets a synchronous dispose operation.
  pub fn dispose_sync<T, F, E>(self, dispose: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(Context, Arc<T>) -> std::result::Result<(), E> + Send + Sync + 'static,
    E: Into<BoxError> + Send + 'static,
  {
    self.dispose(move |ctx, value: Arc<T>| future::ready(dispose(ctx, value)))
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn into_registration(self) -> Result<Registration> {
    if self.name.is_empty() {
      return Err(Error::invalid(&self.name, "name must not be empty"));
    }
    let lifetime = self.lifetime.map_err(Error::UnknownLifetime)?;
    let create = self
      .create
      .ok_or_else(|| Error::invalid(&self.name, "a create operation is required"))?;
    if lifetime == Lifetime::Transient && self.dispose.is_some() {
      return Err(Error::invalid(
        &self.name,
        "transient components are never cached and cannot be disposed",
      ));
    }

    Ok(Registration {
      name: self.name,
      lifetime,
      dependencies: self.dependencies,
      create,
      dispose: self.dispose,
    })
  }
}

impl fmt::Debug for Recipe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Recipe")
      .field("name", &self.name)
      .field("lifetime", &self.lifetime)
      .field("dependencies", &self.dependencies)
      .field("create", &self.create.is_some())
      .field("dispose", &self.dispose.is_some())
      .finish()
  }
}

/// A validated recipe, as held by a context's registration store.
pub(crate) struct Registration {
  pub(crate) name: String,
  pub(crate) lifetime: Lifetime,
  pub(crate) dependencies: Vec<String>,
  pub(crate) create: CreateFn,
  pub(crate) dispose: Option<DisposeFn>,
}

impl fmt::Debug for Registration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registration")
      .field("name", &self.name)
      .field("lifetime", &self.lifetime)
      .field("dependencies", &self.dependencies)
      .field("dispose", &self.dispose.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::convert::Infallible;

  fn constant(name: &str) -> Recipe {
    Recipe::new(name).create_sync(|_, _, _| Ok::<_, Infallible>(1_u32))
  }

  #[test]
  fn defaults_to_transient_without_dependencies() {
    let registration = constant("answer").into_registration().unwrap();
    assert_eq!(registration.lifetime, Lifetime::Transient);
    assert!(registration.dependencies.is_empty());
    assert!(registration.dispose.is_none());
  }

  #[test]
  fn rejects_empty_name() {
    let err = constant("").into_registration().unwrap_err();
    assert!(matches!(err, Error::InvalidRegistration { .. }));
  }

  #[test]
  fn rejects_missing_create() {
    let err = Recipe::new("nothing").into_registration().unwrap_err();
    assert!(matches!(err, Error::InvalidRegistration { ref name, .. } if name == "nothing"));
  }

  #[test]
  fn rejects_unknown_lifetime_name() {
    let err = constant("answer")
      .lifetime_named("forever")
      .into_registration()
      .unwrap_err();
    assert!(matches!(err, Error::UnknownLifetime(ref s) if s == "forever"));
  }

  #[test]
  fn rejects_transient_with_dispose() {
    let err = constant("answer")
      .dispose_sync(|_, _: Arc<u32>| Ok::<_, Infallible>(()))
      .into_registration()
      .unwrap_err();
    assert!(matches!(err, Error::InvalidRegistration { .. }));
  }

  #[test]
  fn accepts_cached_lifetime_with_dispose() {
    let registration = constant("answer")
      .lifetime_named("context")
      .depends_on(["a", "b"])
      .dispose_sync(|_, _: Arc<u32>| Ok::<_, Infallible>(()))
      .into_registration()
      .unwrap();
    assert_eq!(registration.lifetime, Lifetime::Context);
    assert_eq!(registration.dependencies, vec!["a", "b"]);
    assert!(registration.dispose.is_some());
  }

  #[test]
  fn args_and_dependencies_downcast_by_position_and_name() {
    let args = Args::new().with(7_i64).with(String::from("x"));
    assert_eq!(args.len(), 2);
    assert_eq!(*args.get::<i64>(0).unwrap(), 7);
    assert!(args.get::<i64>(1).is_none());
    assert!(args.get::<i64>(2).is_none());

    let deps = Dependencies::new(vec![
      ("port".to_owned(), Arc::new(8080_u16) as Instance),
      ("host".to_owned(), Arc::new("localhost") as Instance),
    ]);
    assert_eq!(*deps.get::<u16>("port").unwrap(), 8080);
    assert_eq!(*deps.at::<&'static str>(1).unwrap(), "localhost");
    assert!(matches!(
      deps.get::<String>("port"),
      Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
      deps.get::<u16>("missing"),
      Err(Error::UndeclaredDependency { .. })
    ));
    assert_eq!(deps.names().collect::<Vec<_>>(), vec!["port", "host"]);
  }
}
