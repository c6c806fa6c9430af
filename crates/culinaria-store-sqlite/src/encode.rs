//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings and
//! list-valued attributes compact JSON arrays.

use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use culinaria_core::{
  image::{ImageType, SchoolImage},
  profile::{Profile, Role},
  school::{Coordinates, School, SchoolDraft, SchoolType, Tuition},
  store::MigrationRecord,
};
use rusqlite::{Row, ToSql};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Lists ───────────────────────────────────────────────────────────────────

pub fn encode_list(values: &[String]) -> Result<String> {
  Ok(serde_json::to_string(values)?)
}

pub fn decode_list(column: &'static str, s: &str) -> Result<Vec<String>> {
  serde_json::from_str(s).map_err(|source| Error::MalformedList { column, source })
}

fn encode_opt_list(values: Option<&Vec<String>>) -> Result<Option<String>> {
  values.map(|v| encode_list(v)).transpose()
}

fn decode_opt_list(column: &'static str, s: Option<String>) -> Result<Option<Vec<String>>> {
  s.map(|s| decode_list(column, &s)).transpose()
}

fn count(n: Option<i64>) -> Option<u32> { n.and_then(|n| u32::try_from(n).ok()) }

// ─── Schools ─────────────────────────────────────────────────────────────────

/// Column order shared by every `schools` read and write. `id` comes first
/// and `updated_at` last so updates can reuse the insert parameters.
pub const SCHOOL_COLUMNS: [&str; 37] = [
  "id",
  "legacy_id",
  "slug",
  "name",
  "description",
  "description_en",
  "type",
  "country",
  "city",
  "address",
  "phone",
  "email",
  "website",
  "image",
  "specialties",
  "specialties_en",
  "languages",
  "languages_en",
  "accreditation",
  "accreditation_en",
  "features",
  "features_en",
  "programs",
  "programs_en",
  "gallery",
  "founded_year",
  "student_count",
  "program_count",
  "rating",
  "tuition_min",
  "tuition_max",
  "tuition_currency",
  "latitude",
  "longitude",
  "is_active",
  "created_at",
  "updated_at",
];

/// `SELECT <columns> FROM schools` without a WHERE clause.
pub fn select_schools() -> String {
  format!("SELECT {} FROM schools", SCHOOL_COLUMNS.join(", "))
}

pub fn insert_school_sql() -> String {
  let placeholders: Vec<String> =
    (1..=SCHOOL_COLUMNS.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO schools ({}) VALUES ({})",
    SCHOOL_COLUMNS.join(", "),
    placeholders.join(", ")
  )
}

/// Rewrites every column except `id` and `created_at` of the row `?1`.
pub fn update_school_sql() -> String {
  let sets: Vec<String> = SCHOOL_COLUMNS
    .iter()
    .enumerate()
    .filter(|(_, c)| !matches!(**c, "id" | "created_at"))
    .map(|(i, c)| format!("{c} = ?{}", i + 1))
    .collect();
  format!("UPDATE schools SET {} WHERE id = ?1", sets.join(", "))
}

/// Raw values of a `schools` row.
pub struct RawSchool {
  pub id:               String,
  pub legacy_id:        Option<String>,
  pub slug:             Option<String>,
  pub name:             String,
  pub description:      String,
  pub description_en:   Option<String>,
  pub school_type:      String,
  pub country:          String,
  pub city:             String,
  pub address:          Option<String>,
  pub phone:            Option<String>,
  pub email:            Option<String>,
  pub website:          Option<String>,
  pub image:            Option<String>,
  pub specialties:      String,
  pub specialties_en:   Option<String>,
  pub languages:        String,
  pub languages_en:     Option<String>,
  pub accreditation:    String,
  pub accreditation_en: Option<String>,
  pub features:         String,
  pub features_en:      Option<String>,
  pub programs:         String,
  pub programs_en:      Option<String>,
  pub gallery:          String,
  pub founded_year:     Option<i64>,
  pub student_count:    Option<i64>,
  pub program_count:    Option<i64>,
  pub rating:           f64,
  pub tuition_min:      Option<f64>,
  pub tuition_max:      Option<f64>,
  pub tuition_currency: Option<String>,
  pub latitude:         Option<f64>,
  pub longitude:        Option<f64>,
  pub is_active:        bool,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawSchool {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get("id")?,
      legacy_id:        row.get("legacy_id")?,
      slug:             row.get("slug")?,
      name:             row.get("name")?,
      description:      row.get("description")?,
      description_en:   row.get("description_en")?,
      school_type:      row.get("type")?,
      country:          row.get("country")?,
      city:             row.get("city")?,
      address:          row.get("address")?,
      phone:            row.get("phone")?,
      email:            row.get("email")?,
      website:          row.get("website")?,
      image:            row.get("image")?,
      specialties:      row.get("specialties")?,
      specialties_en:   row.get("specialties_en")?,
      languages:        row.get("languages")?,
      languages_en:     row.get("languages_en")?,
      accreditation:    row.get("accreditation")?,
      accreditation_en: row.get("accreditation_en")?,
      features:         row.get("features")?,
      features_en:      row.get("features_en")?,
      programs:         row.get("programs")?,
      programs_en:      row.get("programs_en")?,
      gallery:          row.get("gallery")?,
      founded_year:     row.get("founded_year")?,
      student_count:    row.get("student_count")?,
      program_count:    row.get("program_count")?,
      rating:           row.get("rating")?,
      tuition_min:      row.get("tuition_min")?,
      tuition_max:      row.get("tuition_max")?,
      tuition_currency: row.get("tuition_currency")?,
      latitude:         row.get("latitude")?,
      longitude:        row.get("longitude")?,
      is_active:        row.get("is_active")?,
      created_at:       row.get("created_at")?,
      updated_at:       row.get("updated_at")?,
    })
  }

  /// Bind values in [`SCHOOL_COLUMNS`] order.
  pub fn params(&self) -> [&dyn ToSql; 37] {
    [
      &self.id,
      &self.legacy_id,
      &self.slug,
      &self.name,
      &self.description,
      &self.description_en,
      &self.school_type,
      &self.country,
      &self.city,
      &self.address,
      &self.phone,
      &self.email,
      &self.website,
      &self.image,
      &self.specialties,
      &self.specialties_en,
      &self.languages,
      &self.languages_en,
      &self.accreditation,
      &self.accreditation_en,
      &self.features,
      &self.features_en,
      &self.programs,
      &self.programs_en,
      &self.gallery,
      &self.founded_year,
      &self.student_count,
      &self.program_count,
      &self.rating,
      &self.tuition_min,
      &self.tuition_max,
      &self.tuition_currency,
      &self.latitude,
      &self.longitude,
      &self.is_active,
      &self.created_at,
      &self.updated_at,
    ]
  }

  pub fn from_school(school: &School) -> Result<Self> {
    let d = &school.draft;
    Ok(Self {
      id:               encode_uuid(school.id),
      legacy_id:        d.legacy_id.clone(),
      slug:             d.slug.clone().filter(|s| !s.is_empty()),
      name:             d.name.clone(),
      description:      d.description.clone(),
      description_en:   d.description_en.clone(),
      school_type:      d.school_type.to_string(),
      country:          d.country.clone(),
      city:             d.city.clone(),
      address:          d.address.clone(),
      phone:            d.phone.clone(),
      email:            d.email.clone(),
      website:          d.website.clone(),
      image:            d.image.clone(),
      specialties:      encode_list(&d.specialties)?,
      specialties_en:   encode_opt_list(d.specialties_en.as_ref())?,
      languages:        encode_list(&d.languages)?,
      languages_en:     encode_opt_list(d.languages_en.as_ref())?,
      accreditation:    encode_list(&d.accreditation)?,
      accreditation_en: encode_opt_list(d.accreditation_en.as_ref())?,
      features:         encode_list(&d.features)?,
      features_en:      encode_opt_list(d.features_en.as_ref())?,
      programs:         encode_list(&d.programs)?,
      programs_en:      encode_opt_list(d.programs_en.as_ref())?,
      gallery:          encode_list(&d.gallery)?,
      founded_year:     d.founded_year.map(i64::from),
      student_count:    d.student_count.map(i64::from),
      program_count:    d.program_count.map(i64::from),
      rating:           d.rating,
      tuition_min:      d.tuition.as_ref().map(|t| t.min),
      tuition_max:      d.tuition.as_ref().map(|t| t.max),
      tuition_currency: d.tuition.as_ref().map(|t| t.currency.clone()),
      latitude:         d.coordinates.map(|c| c.lat),
      longitude:        d.coordinates.map(|c| c.lng),
      is_active:        d.is_active,
      created_at:       encode_dt(school.created_at),
      updated_at:       encode_dt(school.updated_at),
    })
  }

  pub fn into_school(self) -> Result<School> {
    let school_type = SchoolType::from_str(&self.school_type)
      .map_err(|_| culinaria_core::Error::UnknownSchoolType(self.school_type.clone()))?;

    let tuition = match (self.tuition_min, self.tuition_max, self.tuition_currency) {
      (Some(min), Some(max), Some(currency)) => Some(Tuition { min, max, currency }),
      _ => None,
    };
    let coordinates = match (self.latitude, self.longitude) {
      (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
      _ => None,
    };

    let draft = SchoolDraft {
      legacy_id: self.legacy_id,
      slug: self.slug,
      name: self.name,
      description: self.description,
      description_en: self.description_en,
      school_type,
      country: self.country,
      city: self.city,
      address: self.address,
      phone: self.phone,
      email: self.email,
      website: self.website,
      image: self.image,
      specialties: decode_list("specialties", &self.specialties)?,
      specialties_en: decode_opt_list("specialties_en", self.specialties_en)?,
      languages: decode_list("languages", &self.languages)?,
      languages_en: decode_opt_list("languages_en", self.languages_en)?,
      accreditation: decode_list("accreditation", &self.accreditation)?,
      accreditation_en: decode_opt_list("accreditation_en", self.accreditation_en)?,
      features: decode_list("features", &self.features)?,
      features_en: decode_opt_list("features_en", self.features_en)?,
      programs: decode_list("programs", &self.programs)?,
      programs_en: decode_opt_list("programs_en", self.programs_en)?,
      gallery: decode_list("gallery", &self.gallery)?,
      founded_year: self.founded_year.and_then(|y| i32::try_from(y).ok()),
      student_count: count(self.student_count),
      program_count: count(self.program_count),
      rating: self.rating,
      tuition,
      coordinates,
      is_active: self.is_active,
    };

    Ok(School {
      id: decode_uuid(&self.id)?,
      draft,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Images ──────────────────────────────────────────────────────────────────

pub const IMAGE_COLUMNS: &str = "image_id, school_id, image_url, image_type, category, \
                                 display_order, alt_text, created_at, updated_at";

pub struct RawImage {
  pub image_id:      String,
  pub school_id:     String,
  pub image_url:     String,
  pub image_type:    String,
  pub category:      Option<String>,
  pub display_order: i32,
  pub alt_text:      Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawImage {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      image_id:      row.get(0)?,
      school_id:     row.get(1)?,
      image_url:     row.get(2)?,
      image_type:    row.get(3)?,
      category:      row.get(4)?,
      display_order: row.get(5)?,
      alt_text:      row.get(6)?,
      created_at:    row.get(7)?,
      updated_at:    row.get(8)?,
    })
  }

  pub fn into_image(self) -> Result<SchoolImage> {
    let image_type = ImageType::from_str(&self.image_type)
      .map_err(|_| culinaria_core::Error::UnknownImageType(self.image_type.clone()))?;
    Ok(SchoolImage {
      image_id: decode_uuid(&self.image_id)?,
      school_id: self.school_id,
      image_url: self.image_url,
      image_type,
      category: self.category,
      display_order: self.display_order,
      alt_text: self.alt_text,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// A `profiles` row joined with its role.
pub struct RawProfile {
  pub profile_id:    String,
  pub username:      String,
  pub password_hash: String,
  pub role:          String,
  pub created_at:    String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    let role = Role::from_str(&self.role)
      .map_err(|_| culinaria_core::Error::UnknownRole(self.role.clone()))?;
    Ok(Profile {
      profile_id: decode_uuid(&self.profile_id)?,
      username: self.username,
      password_hash: self.password_hash,
      role,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── Migrations ──────────────────────────────────────────────────────────────

pub struct RawMigration {
  pub name:       String,
  pub applied_at: String,
  pub summary:    String,
}

impl RawMigration {
  pub fn into_record(self) -> Result<MigrationRecord> {
    Ok(MigrationRecord {
      name:       self.name,
      applied_at: decode_dt(&self.applied_at)?,
      summary:    serde_json::from_str(&self.summary)?,
    })
  }
}
