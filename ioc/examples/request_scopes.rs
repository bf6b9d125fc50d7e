use fibre_context::{Context, Error, Lifetime, Recipe};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// A pool shared by the whole application.
struct Pool {
  id: usize,
}

// A connection handed out once per request.
struct Connection {
  id: usize,
  pool: Arc<Pool>,
}

static IDS: AtomicUsize = AtomicUsize::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
  let app = Context::new("app");

  app.register(
    Recipe::new("pool")
      .lifetime(Lifetime::Singleton)
      .create_sync(|_, _, _| {
        println!("Creating SINGLETON pool...");
        Ok::<_, Infallible>(Pool {
          id: IDS.fetch_add(1, Ordering::SeqCst),
        })
      })
      .dispose_sync(|_, pool: Arc<Pool>| {
        println!("Closing pool {}", pool.id);
        Ok::<_, Infallible>(())
      }),
  )?;

  app.register(
    Recipe::new("connection")
      .lifetime(Lifetime::Context)
      .depends_on(["pool"])
      .create_sync(|ctx, deps, _| {
        println!("Creating CONTEXT connection for {}...", ctx.path());
        Ok::<_, Error>(Connection {
          id: IDS.fetch_add(1, Ordering::SeqCst),
          pool: deps.get::<Pool>("pool")?,
        })
      })
      .dispose_sync(|ctx, conn: Arc<Connection>| {
        println!("Releasing connection {} of {}", conn.id, ctx.path());
        Ok::<_, Infallible>(())
      }),
  )?;

  let first = app.child_context(Some("request-1"));
  let second = app.child_context(Some("request-2"));

  let (a, b) = tokio::join!(
    first.resolve::<Connection>("connection"),
    second.resolve::<Connection>("connection"),
  );
  let (a, b) = (a?, b?);
  let again = first.resolve::<Connection>("connection").await?;

  println!("request-1 connection {}, request-2 connection {}", a.id, b.id);
  assert!(Arc::ptr_eq(&a, &again), "one connection per request");
  assert!(!Arc::ptr_eq(&a, &b), "requests do not share connections");
  assert!(Arc::ptr_eq(&a.pool, &b.pool), "the pool is shared");

  // Requests end independently of the application.
  first.destroy().await?;
  second.destroy().await?;
  app.destroy().await
}
