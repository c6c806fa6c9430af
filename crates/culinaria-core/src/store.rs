//! The `SchoolStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `culinaria-store-sqlite`). Higher layers depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  image::{NewSchoolImage, SchoolImage},
  profile::{NewProfile, Profile, Role},
  school::{School, SchoolDraft, SchoolKey, Scope},
};

// ─── Query types ─────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Parameters for [`SchoolStore::list_schools`].
#[derive(Debug, Clone, Default)]
pub struct SchoolQuery {
  pub scope:     Scope,
  /// Case-insensitive substring over name, city and country.
  pub search:    Option<String>,
  /// 1-based page number.
  pub page:      Option<usize>,
  pub page_size: Option<usize>,
}

impl SchoolQuery {
  pub fn page(&self) -> usize { self.page.unwrap_or(1).max(1) }

  pub fn page_size(&self) -> usize {
    self
      .page_size
      .unwrap_or(DEFAULT_PAGE_SIZE)
      .clamp(1, MAX_PAGE_SIZE)
  }

  /// Rows before the requested page; saturates for absurd page numbers.
  pub fn offset(&self) -> usize { (self.page() - 1).saturating_mul(self.page_size()) }
}

/// One page of a school listing.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolPage {
  pub items:     Vec<School>,
  /// Number of matching schools across all pages.
  pub total:     usize,
  pub page:      usize,
  pub page_size: usize,
}

/// Whether an upsert created or replaced a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upsert {
  Inserted,
  Updated,
}

/// Completion record of an operator-invoked data migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRecord {
  pub name:       String,
  pub applied_at: DateTime<Utc>,
  pub summary:    serde_json::Value,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Coarse classification of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The input broke a domain invariant.
  Invalid,
  /// A uniqueness constraint rejected the write.
  Conflict,
  Internal,
}

/// Backend errors expose a [`ErrorKind`] so HTTP layers can pick a status
/// without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind { ErrorKind::Internal }
}

impl StoreError for std::convert::Infallible {}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Culinaria store backend.
///
/// Every write is a single independent operation; there are no multi-call
/// transactions and concurrent edits are last-write-wins.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SchoolStore: Send + Sync {
  type Error: StoreError;

  // ── Schools: reads ────────────────────────────────────────────────────

  /// Retrieve a school by primary key.
  fn get_school(
    &self,
    id: Uuid,
    scope: Scope,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + '_;

  fn find_by_legacy_id<'a>(
    &'a self,
    legacy_id: &'a str,
    scope: Scope,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + 'a;

  fn find_by_slug<'a>(
    &'a self,
    slug: &'a str,
    scope: Scope,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + 'a;

  /// Retrieve a school by UUID or legacy id.
  fn find_by_key<'a>(
    &'a self,
    key: &'a SchoolKey,
    scope: Scope,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + 'a {
    async move {
      match key {
        SchoolKey::Id(id) => self.get_school(*id, scope).await,
        SchoolKey::LegacyId(legacy) => self.find_by_legacy_id(legacy, scope).await,
      }
    }
  }

  /// Every school in `scope`, ordered by name.
  fn all_schools(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<School>, Self::Error>> + Send + '_;

  /// One page of schools, ordered by name.
  fn list_schools<'a>(
    &'a self,
    query: &'a SchoolQuery,
  ) -> impl Future<Output = Result<SchoolPage, Self::Error>> + Send + 'a;

  // ── Schools: writes ───────────────────────────────────────────────────

  /// Validate and persist a new school. The store assigns `id` and
  /// timestamps.
  fn insert_school(
    &self,
    draft: SchoolDraft,
  ) -> impl Future<Output = Result<School, Self::Error>> + Send + '_;

  /// Replace every editable field of an existing school. Returns `None` if
  /// no school matches `key`.
  fn update_school<'a>(
    &'a self,
    key: &'a SchoolKey,
    draft: SchoolDraft,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + 'a;

  /// Insert, or replace the school with the same `legacy_id`.
  /// Drafts without a legacy id are always inserted.
  fn upsert_school(
    &self,
    draft: SchoolDraft,
  ) -> impl Future<Output = Result<(School, Upsert), Self::Error>> + Send + '_;

  /// Flip `is_active`. Returns `None` if no school matches `key`.
  fn toggle_active<'a>(
    &'a self,
    key: &'a SchoolKey,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + 'a;

  /// Hard delete. Image rows are left in place. Returns `false` if nothing
  /// matched.
  fn delete_school<'a>(
    &'a self,
    key: &'a SchoolKey,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Images ────────────────────────────────────────────────────────────

  fn add_image(
    &self,
    image: NewSchoolImage,
  ) -> impl Future<Output = Result<SchoolImage, Self::Error>> + Send + '_;

  /// All image rows whose `school_id` is one of `school_keys`, ordered by
  /// `display_order`.
  fn images_for<'a>(
    &'a self,
    school_keys: &'a [String],
  ) -> impl Future<Output = Result<Vec<SchoolImage>, Self::Error>> + Send + 'a;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Returns an error if the username is taken.
  fn add_profile(
    &self,
    profile: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  fn find_profile<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  fn count_profiles(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Migrations ────────────────────────────────────────────────────────

  fn migration<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<MigrationRecord>, Self::Error>> + Send + 'a;

  /// Record (or re-record) the completion of a migration.
  fn record_migration<'a>(
    &'a self,
    name: &'a str,
    summary: serde_json::Value,
  ) -> impl Future<Output = Result<MigrationRecord, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn query_paging_defaults_and_clamps() {
    let q = SchoolQuery::default();
    assert_eq!((q.page(), q.page_size(), q.offset()), (1, DEFAULT_PAGE_SIZE, 0));

    let q = SchoolQuery { page: Some(3), page_size: Some(500), ..Default::default() };
    assert_eq!(q.page_size(), MAX_PAGE_SIZE);
    assert_eq!(q.offset(), 2 * MAX_PAGE_SIZE);

    let q = SchoolQuery { page: Some(0), page_size: Some(0), ..Default::default() };
    assert_eq!((q.page(), q.page_size()), (1, 1));
  }
}
