//! Tests for the `resolve!` macro against the global and explicit contexts.

use fibre_context::{global, resolve, Context, Lifetime, Recipe};
use std::convert::Infallible;
use std::sync::Arc;

struct MacroTestService {
  value: i32,
}

fn service(name: &str, value: i32) -> Recipe {
  Recipe::new(name)
    .lifetime(Lifetime::Singleton)
    .create_sync(move |_, _, _| Ok::<_, Infallible>(MacroTestService { value }))
}

#[tokio::test]
async fn test_resolve_global() {
  global().register(service("macro_global_service", 42)).unwrap();

  let first = resolve!(MacroTestService, "macro_global_service");
  let second = resolve!(MacroTestService, "macro_global_service");

  assert_eq!(first.value, 42);
  assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_resolve_global_from_child_context() {
  global().register(service("macro_inherited_service", 7)).unwrap();
  let request = global().child_context(Some("macro_request"));

  let from_child = resolve!(in request, MacroTestService, "macro_inherited_service");
  let from_global = resolve!(MacroTestService, "macro_inherited_service");

  assert!(Arc::ptr_eq(&from_child, &from_global));
}

#[tokio::test]
async fn test_resolve_in_local_context() {
  let local = Context::new("local");
  local.register(service("local_service", 100)).unwrap();

  let resolved = resolve!(in local, MacroTestService, "local_service");
  assert_eq!(resolved.value, 100);

  // The local context is isolated from the global one.
  assert!(!global().is_registered("local_service"));
}

#[tokio::test]
#[should_panic(expected = "Failed to resolve required component 'macro_missing'")]
async fn test_resolve_panics_on_missing_component() {
  resolve!(MacroTestService, "macro_missing");
}

#[tokio::test]
#[should_panic(expected = "Failed to resolve required component 'macro_wrong_type'")]
async fn test_resolve_panics_on_type_mismatch() {
  let local = Context::new("local");
  local.register(service("macro_wrong_type", 1)).unwrap();
  resolve!(in local, String, "macro_wrong_type");
}
