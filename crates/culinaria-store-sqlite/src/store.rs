//! [`SqliteStore`]: the SQLite implementation of [`SchoolStore`].

use std::path::Path;

use chrono::Utc;
use culinaria_core::{
  image::{NewSchoolImage, SchoolImage},
  profile::{NewProfile, Profile, Role},
  school::{School, SchoolDraft, SchoolKey, Scope},
  store::{MigrationRecord, SchoolPage, SchoolQuery, SchoolStore, Upsert},
};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    IMAGE_COLUMNS, RawImage, RawMigration, RawProfile, RawSchool, encode_dt, encode_uuid,
    insert_school_sql, select_schools, update_school_sql,
  },
  schema::SCHEMA,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Map a uniqueness violation to [`Error::Conflict`]; anything else stays a
/// database error.
fn constraint(err: rusqlite::Error) -> Error {
  match &err {
    rusqlite::Error::SqliteFailure(e, msg)
      if e.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Error::Conflict(msg.clone().unwrap_or_else(|| "constraint violation".into()))
    }
    _ => Error::Sqlite(err),
  }
}

fn scope_condition(scope: Scope) -> Option<&'static str> {
  match scope {
    Scope::Active => Some("is_active = 1"),
    Scope::All => None,
  }
}

/// Escape `LIKE` wildcards so a search matches them literally.
fn escape_like(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

fn sql_int(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

fn where_clause(conds: &[&str]) -> String {
  if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Culinaria store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `SELECT <school columns> ... <suffix>` and decode every row.
  async fn query_schools(&self, suffix: String, params: Vec<Value>) -> Result<Vec<School>> {
    let sql = format!("{}{suffix}", select_schools());

    let raws: Vec<RawSchool> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawSchool::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSchool::into_school).collect()
  }

  /// The first school matching `cond` (which binds `?1` to `value`).
  async fn school_where(
    &self,
    cond: &'static str,
    value: String,
    scope: Scope,
  ) -> Result<Option<School>> {
    let mut conds = vec![cond];
    conds.extend(scope_condition(scope));

    let mut found = self
      .query_schools(format!("{} LIMIT 1", where_clause(&conds)), vec![Value::Text(value)])
      .await?;
    Ok(found.pop())
  }

  /// Persist a freshly built school row.
  async fn insert_row(&self, school: &School) -> Result<()> {
    let raw = RawSchool::from_school(school)?;
    let sql = insert_school_sql();

    self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, raw.params().as_slice())))
      .await?
      .map_err(constraint)?;
    Ok(())
  }

  /// Overwrite the row with `school.id`.
  async fn update_row(&self, school: &School) -> Result<()> {
    let raw = RawSchool::from_school(school)?;
    let sql = update_school_sql();

    self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, raw.params().as_slice())))
      .await?
      .map_err(constraint)?;
    Ok(())
  }

  /// Replace every editable field of `existing` with `draft`.
  async fn replace(&self, existing: School, mut draft: SchoolDraft) -> Result<School> {
    draft.validate()?;
    if draft.legacy_id.is_none() {
      draft.legacy_id = existing.draft.legacy_id;
    }
    let school = School {
      id: existing.id,
      draft,
      created_at: existing.created_at,
      updated_at: Utc::now(),
    };
    self.update_row(&school).await?;

    self
      .get_school(school.id, Scope::All)
      .await?
      .ok_or_else(|| Error::Conflict(format!("school {} vanished during update", school.id)))
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run arbitrary SQL, for tests that need to corrupt a row.
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    Ok(self.conn.call(move |conn| Ok(conn.execute(sql, [])?)).await?)
  }
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = Error;

  // ── Schools: reads ────────────────────────────────────────────────────────

  async fn get_school(&self, id: Uuid, scope: Scope) -> Result<Option<School>> {
    self.school_where("id = ?1", encode_uuid(id), scope).await
  }

  async fn find_by_legacy_id(&self, legacy_id: &str, scope: Scope) -> Result<Option<School>> {
    self.school_where("legacy_id = ?1", legacy_id.to_owned(), scope).await
  }

  async fn find_by_slug(&self, slug: &str, scope: Scope) -> Result<Option<School>> {
    self.school_where("slug = ?1", slug.to_owned(), scope).await
  }

  async fn all_schools(&self, scope: Scope) -> Result<Vec<School>> {
    let conds: Vec<&str> = scope_condition(scope).into_iter().collect();
    self
      .query_schools(format!("{} ORDER BY name", where_clause(&conds)), Vec::new())
      .await
  }

  async fn list_schools(&self, query: &SchoolQuery) -> Result<SchoolPage> {
    let mut conds: Vec<&str> = scope_condition(query.scope).into_iter().collect();
    let mut params: Vec<Value> = Vec::new();
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
      conds.push(
        "(lower(name) LIKE ?1 ESCAPE '\\' OR lower(city) LIKE ?1 ESCAPE '\\' \
         OR lower(country) LIKE ?1 ESCAPE '\\')",
      );
      params.push(Value::Text(format!("%{}%", escape_like(&search.to_lowercase()))));
    }
    let filter = where_clause(&conds);

    let count_sql = format!("SELECT COUNT(*) FROM schools{filter}");
    let count_params = params.clone();
    let total: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&count_sql, rusqlite::params_from_iter(count_params), |r| {
          r.get(0)
        })?)
      })
      .await?;

    let (page, page_size) = (query.page(), query.page_size());
    let n = params.len();
    params.push(Value::Integer(sql_int(page_size)));
    params.push(Value::Integer(sql_int(query.offset())));
    let items = self
      .query_schools(
        format!("{filter} ORDER BY name LIMIT ?{} OFFSET ?{}", n + 1, n + 2),
        params,
      )
      .await?;

    Ok(SchoolPage { items, total: total as usize, page, page_size })
  }

  // ── Schools: writes ───────────────────────────────────────────────────────

  async fn insert_school(&self, draft: SchoolDraft) -> Result<School> {
    draft.validate()?;
    let now = Utc::now();
    let school = School { id: Uuid::new_v4(), draft, created_at: now, updated_at: now };
    self.insert_row(&school).await?;
    tracing::debug!(id = %school.id, name = %school.draft.name, "school inserted");
    Ok(school)
  }

  async fn update_school(&self, key: &SchoolKey, draft: SchoolDraft) -> Result<Option<School>> {
    let Some(existing) = self.find_by_key(key, Scope::All).await? else {
      return Ok(None);
    };
    let school = self.replace(existing, draft).await?;
    tracing::debug!(id = %school.id, "school updated");
    Ok(Some(school))
  }

  async fn upsert_school(&self, draft: SchoolDraft) -> Result<(School, Upsert)> {
    let existing = match draft.legacy_id.as_deref() {
      Some(legacy) => self.find_by_legacy_id(legacy, Scope::All).await?,
      None => None,
    };
    match existing {
      Some(existing) => Ok((self.replace(existing, draft).await?, Upsert::Updated)),
      None => Ok((self.insert_school(draft).await?, Upsert::Inserted)),
    }
  }

  async fn toggle_active(&self, key: &SchoolKey) -> Result<Option<School>> {
    let Some(existing) = self.find_by_key(key, Scope::All).await? else {
      return Ok(None);
    };
    let id_str = encode_uuid(existing.id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE schools SET is_active = NOT is_active, updated_at = ?2 WHERE id = ?1",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    self.get_school(existing.id, Scope::All).await
  }

  async fn delete_school(&self, key: &SchoolKey) -> Result<bool> {
    let Some(existing) = self.find_by_key(key, Scope::All).await? else {
      return Ok(false);
    };
    let id_str = encode_uuid(existing.id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM schools WHERE id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    tracing::debug!(id = %existing.id, "school deleted");
    Ok(changed > 0)
  }

  // ── Images ────────────────────────────────────────────────────────────────

  async fn add_image(&self, image: NewSchoolImage) -> Result<SchoolImage> {
    let now = Utc::now();
    let image = SchoolImage {
      image_id:      Uuid::new_v4(),
      school_id:     image.school_id,
      image_url:     image.image_url,
      image_type:    image.image_type,
      category:      image.category,
      display_order: image.display_order,
      alt_text:      image.alt_text,
      created_at:    now,
      updated_at:    now,
    };

    let id_str    = encode_uuid(image.image_id);
    let school_id = image.school_id.clone();
    let url       = image.image_url.clone();
    let kind      = image.image_type.to_string();
    let category  = image.category.clone();
    let order     = image.display_order;
    let alt       = image.alt_text.clone();
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO school_images ({IMAGE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)"
          ),
          rusqlite::params![id_str, school_id, url, kind, category, order, alt, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(image)
  }

  async fn images_for(&self, school_keys: &[String]) -> Result<Vec<SchoolImage>> {
    if school_keys.is_empty() {
      return Ok(Vec::new());
    }
    let placeholders: Vec<String> =
      (1..=school_keys.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
      "SELECT {IMAGE_COLUMNS} FROM school_images
       WHERE school_id IN ({})
       ORDER BY display_order, created_at",
      placeholders.join(", ")
    );
    let keys = school_keys.to_vec();

    let raws: Vec<RawImage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(keys), RawImage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawImage::into_image).collect()
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn add_profile(&self, profile: NewProfile) -> Result<Profile> {
    let profile = Profile {
      profile_id:    Uuid::new_v4(),
      username:      profile.username,
      password_hash: profile.password_hash,
      role:          profile.role,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(profile.profile_id);
    let username = profile.username.clone();
    let hash     = profile.password_hash.clone();
    let role     = profile.role.to_string();
    let at_str   = encode_dt(profile.created_at);

    self
      .conn
      .call(move |conn| {
        let mut write = || -> rusqlite::Result<()> {
          let tx = conn.transaction()?;
          tx.execute(
            "INSERT INTO profiles (profile_id, username, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id_str, username, hash, at_str],
          )?;
          tx.execute(
            "INSERT INTO user_roles (profile_id, role) VALUES (?1, ?2)",
            rusqlite::params![id_str, role],
          )?;
          tx.commit()
        };
        Ok(write())
      })
      .await?
      .map_err(constraint)?;

    tracing::info!(username = %profile.username, role = %profile.role, "profile created");
    Ok(profile)
  }

  async fn find_profile(&self, username: &str) -> Result<Option<Profile>> {
    let username = username.to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT p.profile_id, p.username, p.password_hash,
                    COALESCE(r.role, 'user'), p.created_at
             FROM profiles p
             LEFT JOIN user_roles r ON r.profile_id = p.profile_id
             WHERE p.username = ?1",
            rusqlite::params![username],
            |row| {
              Ok(RawProfile {
                profile_id:    row.get(0)?,
                username:      row.get(1)?,
                password_hash: row.get(2)?,
                role:          row.get(3)?,
                created_at:    row.get(4)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn count_profiles(&self, role: Role) -> Result<usize> {
    let role = role.to_string();
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM user_roles WHERE role = ?1",
          rusqlite::params![role],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n as usize)
  }

  // ── Migrations ────────────────────────────────────────────────────────────

  async fn migration(&self, name: &str) -> Result<Option<MigrationRecord>> {
    let name = name.to_owned();

    let raw: Option<RawMigration> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT name, applied_at, summary FROM migrations WHERE name = ?1",
            rusqlite::params![name],
            |row| {
              Ok(RawMigration {
                name:       row.get(0)?,
                applied_at: row.get(1)?,
                summary:    row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMigration::into_record).transpose()
  }

  async fn record_migration(
    &self,
    name: &str,
    summary: serde_json::Value,
  ) -> Result<MigrationRecord> {
    let record = MigrationRecord {
      name: name.to_owned(),
      applied_at: Utc::now(),
      summary,
    };

    let name_str    = record.name.clone();
    let at_str      = encode_dt(record.applied_at);
    let summary_str = record.summary.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO migrations (name, applied_at, summary) VALUES (?1, ?2, ?3)
           ON CONFLICT(name) DO UPDATE
             SET applied_at = excluded.applied_at, summary = excluded.summary",
          rusqlite::params![name_str, at_str, summary_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }
}
