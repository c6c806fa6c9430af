//! Resolution of an arbitrary identifier string to an active school.
//!
//! Old URLs carry legacy numeric ids, newer ones UUIDs or slugs, and some
//! schools have no stored slug at all. Strategies run in a fixed order and
//! stop at the first hit; a store error aborts the chain.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  school::{School, Scope},
  slug::slugify,
  store::SchoolStore,
};

/// One way of matching an identifier, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LookupStrategy {
  /// Canonical UUID against `id`.
  ByPrimaryKey,
  ByLegacyId,
  /// Stored `slug` column.
  BySlugColumn,
  /// `slugify(name)` over every active school.
  ByComputedSlug,
}

impl LookupStrategy {
  pub const ORDER: [LookupStrategy; 4] = [
    LookupStrategy::ByPrimaryKey,
    LookupStrategy::ByLegacyId,
    LookupStrategy::BySlugColumn,
    LookupStrategy::ByComputedSlug,
  ];

  async fn attempt<S: SchoolStore>(
    self,
    store: &S,
    ident: &str,
  ) -> Result<Option<School>, S::Error> {
    match self {
      Self::ByPrimaryKey => match parse_uuid_shape(ident) {
        Some(id) => store.get_school(id, Scope::Active).await,
        None => Ok(None),
      },
      Self::ByLegacyId => store.find_by_legacy_id(ident, Scope::Active).await,
      Self::BySlugColumn => store.find_by_slug(ident, Scope::Active).await,
      Self::ByComputedSlug => Ok(
        store
          .all_schools(Scope::Active)
          .await?
          .into_iter()
          .find(|s| slugify(&s.draft.name) == ident),
      ),
    }
  }
}

/// A successful lookup and the strategy that produced it.
#[derive(Debug, Clone)]
pub struct Resolution {
  pub school:   School,
  pub strategy: LookupStrategy,
}

/// Parse `s` only if it has the canonical hyphenated 8-4-4-4-12 shape.
pub fn parse_uuid_shape(s: &str) -> Option<Uuid> {
  let bytes = s.as_bytes();
  if bytes.len() != 36 {
    return None;
  }
  let shaped = bytes.iter().enumerate().all(|(i, b)| match i {
    8 | 13 | 18 | 23 => *b == b'-',
    _ => b.is_ascii_hexdigit(),
  });
  if !shaped {
    return None;
  }
  Uuid::parse_str(s).ok()
}

/// Resolve `ident` to an active school.
///
/// An empty identifier issues no query and yields `None`.
pub async fn resolve_school<S: SchoolStore>(
  store: &S,
  ident: &str,
) -> Result<Option<Resolution>, S::Error> {
  if ident.trim().is_empty() {
    return Ok(None);
  }
  for strategy in LookupStrategy::ORDER {
    if let Some(school) = strategy.attempt(store, ident).await? {
      return Ok(Some(Resolution { school, strategy }));
    }
  }
  Ok(None)
}
