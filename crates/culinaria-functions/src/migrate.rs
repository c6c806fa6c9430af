//! `migrate-static-schools`: load the bundled dataset into the store.
//!
//! Upserts by legacy id, persists name-derived slugs and records completion
//! in the `migrations` table. Once recorded, further runs do nothing unless
//! forced. A forced run keeps translations and toggles made since.

use chrono::{DateTime, Utc};
use culinaria_core::{
  school::{ListField, SchoolDraft, Scope},
  seed,
  slug::slugify,
  store::{SchoolStore, Upsert},
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::{
  Functions,
  error::{Error, Result},
  summary::{BatchSummary, Item},
};

pub const MIGRATION_NAME: &str = "migrate-static-schools";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MigrateRequest {
  /// Run even if the migration is already recorded.
  pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
  /// `true` when nothing ran because the migration was already recorded.
  pub already_applied: bool,
  /// When the recorded run completed; `None` if this run had failures.
  pub applied_at:      Option<DateTime<Utc>>,
  pub inserted:        usize,
  pub updated:         usize,
  #[serde(flatten)]
  pub batch:           BatchSummary,
}

/// Keep what was added to a seeded school after it was first loaded.
fn carry_over(existing: &SchoolDraft, seed: &mut SchoolDraft) {
  if seed.description_en.is_none() {
    seed.description_en = existing.description_en.clone();
  }
  for field in ListField::iter() {
    if field.english(seed).is_none()
      && let Some(en) = field.english(existing)
    {
      field.set_english(seed, en.to_vec());
    }
  }
  if existing.slug.is_some() {
    seed.slug = existing.slug.clone();
  }
  seed.is_active = existing.is_active;
}

impl<S: SchoolStore> Functions<S> {
  pub async fn migrate_static_schools(&self, req: MigrateRequest) -> Result<MigrationReport> {
    if !req.force
      && let Some(rec) = self.store.migration(MIGRATION_NAME).await.map_err(Error::store)?
    {
      tracing::info!(applied_at = %rec.applied_at, "static schools already migrated");
      return Ok(MigrationReport {
        already_applied: true,
        applied_at:      Some(rec.applied_at),
        inserted:        0,
        updated:         0,
        batch:           BatchSummary::default(),
      });
    }

    let drafts = seed::static_schools();
    let mut batch = BatchSummary::new(drafts.len());
    let (mut inserted, mut updated) = (0, 0);

    for mut draft in drafts {
      draft.slug.get_or_insert_with(|| slugify(&draft.name));
      match self.upsert_seed(draft).await {
        Ok((school, outcome)) => {
          let label = match outcome {
            Upsert::Inserted => {
              inserted += 1;
              "inserted"
            }
            Upsert::Updated => {
              updated += 1;
              "updated"
            }
          };
          batch.processed(Item::of(&school), Some(label.to_owned()));
        }
        Err((name, e)) => batch.failed(Item::unresolved(&name), &e),
      }
    }

    let applied_at = if batch.errors == 0 {
      let summary = serde_json::json!({
        "inserted": inserted,
        "updated": updated,
        "total": batch.total,
      });
      let rec = self
        .store
        .record_migration(MIGRATION_NAME, summary)
        .await
        .map_err(Error::store)?;
      Some(rec.applied_at)
    } else {
      tracing::warn!(errors = batch.errors, "static school migration incomplete; not recorded");
      None
    };

    batch.log(MIGRATION_NAME);
    Ok(MigrationReport { already_applied: false, applied_at, inserted, updated, batch })
  }

  async fn upsert_seed(
    &self,
    mut draft: SchoolDraft,
  ) -> Result<(culinaria_core::school::School, Upsert), (String, Error)> {
    let legacy_id = draft.legacy_id.clone().unwrap_or_default();
    let existing = self
      .store
      .find_by_legacy_id(&legacy_id, Scope::All)
      .await
      .map_err(|e| (legacy_id.clone(), Error::store(e)))?;
    if let Some(existing) = existing {
      carry_over(&existing.draft, &mut draft);
    }
    self
      .store
      .upsert_school(draft)
      .await
      .map_err(|e| (legacy_id, Error::store(e)))
  }
}

#[cfg(test)]
mod tests {
  use culinaria_core::school::SchoolType;

  use super::*;

  #[test]
  fn carry_over_keeps_translations_and_state() {
    let mut existing = SchoolDraft::new("Alma", SchoolType::Academy, "italy", "Colorno");
    existing.description_en = Some("An Italian school".into());
    existing.specialties_en = Some(vec!["Italian cooking".into()]);
    existing.slug = Some("alma-colorno".into());
    existing.is_active = false;

    let mut seed = SchoolDraft::new("Alma", SchoolType::Academy, "italy", "Colorno");
    seed.slug = Some("alma".into());
    carry_over(&existing, &mut seed);

    assert_eq!(seed.description_en.as_deref(), Some("An Italian school"));
    assert_eq!(seed.specialties_en, Some(vec!["Italian cooking".to_string()]));
    assert_eq!(seed.slug.as_deref(), Some("alma-colorno"));
    assert!(!seed.is_active);
  }
}
