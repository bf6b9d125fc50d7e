#![allow(dead_code)]

use fibre_context::{Lifetime, Recipe};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// An ordered record of create/dispose events, shared between components.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
  pub fn push(&self, event: impl Into<String>) {
    self.0.lock().push(event.into());
  }

  pub fn events(&self) -> Vec<String> {
    self.0.lock().clone()
  }

  /// Index of `event` in the log. Panics if it was never recorded.
  pub fn position(&self, event: &str) -> usize {
    self
      .0
      .lock()
      .iter()
      .position(|e| e == event)
      .unwrap_or_else(|| panic!("event '{}' was not recorded", event))
  }

  pub fn contains(&self, event: &str) -> bool {
    self.0.lock().iter().any(|e| e == event)
  }

  pub fn count(&self, event: &str) -> usize {
    self.0.lock().iter().filter(|e| *e == event).count()
  }
}

/// A component whose value is its own name and whose create operation bumps
/// `counter`.
pub fn counted(name: &str, lifetime: Lifetime, counter: &Arc<AtomicUsize>) -> Recipe {
  let counter = counter.clone();
  let value = name.to_owned();
  Recipe::new(name).lifetime(lifetime).create_sync(move |_, _, _| {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok::<_, Infallible>(value.clone())
  })
}

/// A context-scoped component whose value is its own name. Its dispose
/// operation records `dispose:start:<name>`, waits `delay_ms`, then records
/// `dispose:end:<name>`.
pub fn logged(name: &str, dependencies: &[&str], delay_ms: u64, log: &EventLog) -> Recipe {
  logged_with(name, Lifetime::Context, dependencies, delay_ms, log)
}

pub fn logged_with(
  name: &str,
  lifetime: Lifetime,
  dependencies: &[&str],
  delay_ms: u64,
  log: &EventLog,
) -> Recipe {
  let value = name.to_owned();
  let log = log.clone();
  Recipe::new(name)
    .lifetime(lifetime)
    .depends_on(dependencies.iter().copied())
    .create_sync(move |_, _, _| Ok::<_, Infallible>(value.clone()))
    .dispose(move |_, value: Arc<String>| {
      let log = log.clone();
      async move {
        log.push(format!("dispose:start:{}", value));
        sleep(Duration::from_millis(delay_ms)).await;
        log.push(format!("dispose:end:{}", value));
        Ok::<_, Infallible>(())
      }
    })
}
