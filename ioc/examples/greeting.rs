use fibre_context::{Context, Error, Lifetime, Recipe};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
  let root = Context::new("app");

  root.register(
    Recipe::new("name")
      .lifetime(Lifetime::Context)
      .create_sync(|_, _, _| Ok::<_, Infallible>(String::from("world")))
      .dispose(|ctx, name: Arc<String>| async move {
        println!("[{}] disposing name '{}'", ctx.path(), name);
        Ok::<_, Infallible>(())
      }),
  )?;

  root.register(
    Recipe::new("greet")
      .lifetime(Lifetime::Context)
      .depends_on(["name"])
      .create(|_, deps, _| async move {
        let name = deps.get::<String>("name")?;
        Ok::<_, Error>(format!("Hello, {}!", name))
      })
      .dispose(|ctx, greeting: Arc<String>| async move {
        println!("[{}] disposing '{}'...", ctx.path(), greeting);
        // Even a slow dispose finishes before "name" is touched.
        sleep(Duration::from_millis(50)).await;
        println!("[{}] ...done", ctx.path());
        Ok::<_, Infallible>(())
      }),
  )?;

  let greeting = root.resolve::<String>("greet").await?;
  println!("{}", greeting);

  root.destroy().await
}
