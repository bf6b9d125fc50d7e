use fibre_context::{Context, Error};

#[tokio::main(flavor = "current_thread")]
async fn main() {
  let root = Context::new("root");
  let request = root.child_context(Some("request"));

  println!("Attempting to resolve a component that was never registered...");
  match request.resolve::<String>("database").await {
    Ok(_) => unreachable!("nothing was registered"),
    Err(err @ Error::NotFound { .. }) => println!("Resolution failed as expected: {}", err),
    Err(other) => panic!("unexpected error: {}", other),
  }
}
