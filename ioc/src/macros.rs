//! Public macros for ergonomic component resolution.

/// Resolves a component and panics if resolution fails.
///
/// Must be used inside an `async` block or function. Without `in`, the
/// component is resolved from the [`global`](crate::global) context.
///
/// # Panics
///
/// Panics if the component is not registered, if its creation (or a
/// dependency's) fails, or if it is not of the requested type. For a
/// non-panicking version, use [`Context::resolve`](crate::Context::resolve).
///
/// # Examples
///
/// ```
/// use fibre_context::{resolve, Context, Lifetime, Recipe};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let root = Context::new("root");
/// root
///   .register(
///     Recipe::new("port")
///       .lifetime(Lifetime::Singleton)
///       .create_sync(|_, _, _| Ok::<_, std::convert::Infallible>(8080_u16)),
///   )
///   .unwrap();
///
/// let port = resolve!(in root, u16, "port");
/// assert_eq!(*port, 8080);
/// # }
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for resolving from an explicit context: resolve!(in ctx, MyType, "name")
  (in $ctx:expr, $type:ty, $name:expr) => {{
    let name: &str = $name;
    match $ctx.resolve::<$type>(name).await {
      Ok(component) => component,
      Err(err) => panic!(
        "Failed to resolve required component '{}' as {}: {}",
        name,
        std::any::type_name::<$type>(),
        err
      ),
    }
  }};

  // Arm for resolving from the global context: resolve!(MyType, "name")
  ($type:ty, $name:expr) => {
    $crate::resolve!(in $crate::global(), $type, $name)
  };
}
