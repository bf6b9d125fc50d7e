//! Caching policies for registered components.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Controls where, and whether, a component's instance is cached.
///
/// - `Singleton`: one instance per *declaring* context, shared by every
///   descendant that resolves the name.
/// - `Context`: one instance per *resolving* context. Sibling contexts each
///   get their own.
/// - `Transient`: a fresh instance on every resolution. Never cached and
///   therefore never disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
  Singleton,
  Context,
  #[default]
  Transient,
}

impl Lifetime {
  pub fn as_str(&self) -> &'static str {
    match self {
      Lifetime::Singleton => "singleton",
      Lifetime::Context => "context",
      Lifetime::Transient => "transient",
    }
  }

  /// Whether instances with this lifetime occupy a cache slot.
  pub fn is_cached(&self) -> bool {
    !matches!(self, Lifetime::Transient)
  }
}

impl fmt::Display for Lifetime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Lifetime {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    [Lifetime::Singleton, Lifetime::Context, Lifetime::Transient]
      .into_iter()
      .find(|lifetime| lifetime.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::UnknownLifetime(s.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_known_lifetimes_case_insensitively() {
    assert_eq!("singleton".parse::<Lifetime>().unwrap(), Lifetime::Singleton);
    assert_eq!(" Context ".parse::<Lifetime>().unwrap(), Lifetime::Context);
    assert_eq!("TRANSIENT".parse::<Lifetime>().unwrap(), Lifetime::Transient);
  }

  #[test]
  fn rejects_unknown_lifetime() {
    let err = "scoped".parse::<Lifetime>().unwrap_err();
    assert!(matches!(err, Error::UnknownLifetime(ref s) if s == "scoped"));
  }

  #[test]
  fn default_is_transient_and_uncached() {
    assert_eq!(Lifetime::default(), Lifetime::Transient);
    assert!(!Lifetime::default().is_cached());
    assert!(Lifetime::Singleton.is_cached());
    assert!(Lifetime::Context.is_cached());
  }

  #[test]
  fn display_round_trips_through_from_str() {
    for lifetime in [Lifetime::Singleton, Lifetime::Context, Lifetime::Transient] {
      assert_eq!(lifetime.to_string().parse::<Lifetime>().unwrap(), lifetime);
    }
  }
}
