//! School records, the central entity of the directory.
//!
//! [`School`] is the in-memory shape every layer works with. It is produced
//! from the wide persisted row by the storage backend and turned into a
//! locale-specific [`SchoolView`] for public display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, i18n::Locale, slug::slugify};

// ─── Classification ──────────────────────────────────────────────────────────

/// The kind of institution a school is.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SchoolType {
  University,
  Institute,
  Academy,
  College,
}

// ─── Nested value types ──────────────────────────────────────────────────────

/// Yearly tuition range in a single currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuition {
  pub min:      f64,
  pub max:      f64,
  /// ISO 4217 code, e.g. `EUR`.
  pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

// ─── List fields ─────────────────────────────────────────────────────────────

/// The translatable list-valued attributes of a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ListField {
  Specialties,
  Languages,
  Accreditation,
  Features,
  Programs,
}

impl ListField {
  /// The Spanish (canonical) values.
  pub fn values<'a>(&self, draft: &'a SchoolDraft) -> &'a [String] {
    match self {
      Self::Specialties => &draft.specialties,
      Self::Languages => &draft.languages,
      Self::Accreditation => &draft.accreditation,
      Self::Features => &draft.features,
      Self::Programs => &draft.programs,
    }
  }

  /// The English counterpart, if one has been recorded.
  pub fn english<'a>(&self, draft: &'a SchoolDraft) -> Option<&'a [String]> {
    let en = match self {
      Self::Specialties => &draft.specialties_en,
      Self::Languages => &draft.languages_en,
      Self::Accreditation => &draft.accreditation_en,
      Self::Features => &draft.features_en,
      Self::Programs => &draft.programs_en,
    };
    en.as_deref()
  }

  pub fn set_english(&self, draft: &mut SchoolDraft, values: Vec<String>) {
    let slot = match self {
      Self::Specialties => &mut draft.specialties_en,
      Self::Languages => &mut draft.languages_en,
      Self::Accreditation => &mut draft.accreditation_en,
      Self::Features => &mut draft.features_en,
      Self::Programs => &mut draft.programs_en,
    };
    *slot = Some(values);
  }

  /// `true` when there are Spanish values but no English counterpart yet.
  pub fn needs_english(&self, draft: &SchoolDraft) -> bool {
    !self.values(draft).is_empty()
      && self.english(draft).is_none_or(|en| en.is_empty())
  }
}

// ─── SchoolDraft ─────────────────────────────────────────────────────────────

/// Every editable field of a school. Input to create, update and upsert.
///
/// `id`, `created_at` and `updated_at` are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolDraft {
  /// Identifier from the original static dataset, kept for old URLs.
  #[serde(default)]
  pub legacy_id:        Option<String>,
  #[serde(default)]
  pub slug:             Option<String>,
  pub name:             String,
  #[serde(default)]
  pub description:      String,
  #[serde(default)]
  pub description_en:   Option<String>,
  #[serde(rename = "type")]
  pub school_type:      SchoolType,
  pub country:          String,
  pub city:             String,
  #[serde(default)]
  pub address:          Option<String>,
  #[serde(default)]
  pub phone:            Option<String>,
  #[serde(default)]
  pub email:            Option<String>,
  #[serde(default)]
  pub website:          Option<String>,
  #[serde(default)]
  pub image:            Option<String>,
  #[serde(default)]
  pub specialties:      Vec<String>,
  #[serde(default)]
  pub specialties_en:   Option<Vec<String>>,
  #[serde(default)]
  pub languages:        Vec<String>,
  #[serde(default)]
  pub languages_en:     Option<Vec<String>>,
  #[serde(default)]
  pub accreditation:    Vec<String>,
  #[serde(default)]
  pub accreditation_en: Option<Vec<String>>,
  #[serde(default)]
  pub features:         Vec<String>,
  #[serde(default)]
  pub features_en:      Option<Vec<String>>,
  #[serde(default)]
  pub programs:         Vec<String>,
  #[serde(default)]
  pub programs_en:      Option<Vec<String>>,
  #[serde(default)]
  pub gallery:          Vec<String>,
  #[serde(default)]
  pub founded_year:     Option<i32>,
  #[serde(default)]
  pub student_count:    Option<u32>,
  #[serde(default)]
  pub program_count:    Option<u32>,
  #[serde(default)]
  pub rating:           f64,
  #[serde(default)]
  pub tuition:          Option<Tuition>,
  #[serde(default)]
  pub coordinates:      Option<Coordinates>,
  #[serde(default = "default_active")]
  pub is_active:        bool,
}

fn default_active() -> bool { true }

impl SchoolDraft {
  /// Convenience constructor with every optional field empty.
  pub fn new(
    name: impl Into<String>,
    school_type: SchoolType,
    country: impl Into<String>,
    city: impl Into<String>,
  ) -> Self {
    Self {
      legacy_id: None,
      slug: None,
      name: name.into(),
      description: String::new(),
      description_en: None,
      school_type,
      country: country.into(),
      city: city.into(),
      address: None,
      phone: None,
      email: None,
      website: None,
      image: None,
      specialties: Vec::new(),
      specialties_en: None,
      languages: Vec::new(),
      languages_en: None,
      accreditation: Vec::new(),
      accreditation_en: None,
      features: Vec::new(),
      features_en: None,
      programs: Vec::new(),
      programs_en: None,
      gallery: Vec::new(),
      founded_year: None,
      student_count: None,
      program_count: None,
      rating: 0.0,
      tuition: None,
      coordinates: None,
      is_active: true,
    }
  }

  /// Check the invariants enforced on every write.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName);
    }
    if !(0.0..=5.0).contains(&self.rating) {
      return Err(Error::InvalidRating(self.rating));
    }
    if let Some(t) = &self.tuition
      && t.min > t.max
    {
      return Err(Error::InvalidTuition { min: t.min, max: t.max });
    }
    Ok(())
  }

  pub fn has_english_description(&self) -> bool {
    self
      .description_en
      .as_deref()
      .is_some_and(|d| !d.trim().is_empty())
  }
}

// ─── School ──────────────────────────────────────────────────────────────────

/// A persisted school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
  /// Durable primary key.
  pub id:         Uuid,
  #[serde(flatten)]
  pub draft:      SchoolDraft,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl School {
  /// The identifier shown in public URLs: the legacy id when one exists,
  /// otherwise the UUID.
  pub fn public_id(&self) -> String {
    match &self.draft.legacy_id {
      Some(legacy) => legacy.clone(),
      None => self.id.to_string(),
    }
  }

  /// The stored slug, or one derived from the name.
  pub fn effective_slug(&self) -> String {
    match self.draft.slug.as_deref() {
      Some(s) if !s.is_empty() => s.to_owned(),
      _ => slugify(&self.draft.name),
    }
  }

  /// Values the `school_images.school_id` column may hold for this school.
  /// Older rows reference the slug (stored or computed); newer ones the UUID.
  pub fn image_keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let candidates = [
      self.draft.slug.clone().filter(|s| !s.is_empty()),
      Some(slugify(&self.draft.name)),
      Some(self.id.to_string()),
      self.draft.legacy_id.clone(),
    ];
    for key in candidates.into_iter().flatten() {
      if !keys.contains(&key) {
        keys.push(key);
      }
    }
    keys
  }

  pub fn name(&self) -> &str { &self.draft.name }
}

// ─── Keys and scopes ─────────────────────────────────────────────────────────

/// How admin operations address a school: by UUID or by legacy id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchoolKey {
  Id(Uuid),
  LegacyId(String),
}

impl SchoolKey {
  /// A canonical UUID string becomes [`SchoolKey::Id`]; anything else is
  /// treated as a legacy id.
  pub fn parse(raw: &str) -> Self {
    match crate::lookup::parse_uuid_shape(raw) {
      Some(id) => Self::Id(id),
      None => Self::LegacyId(raw.to_owned()),
    }
  }
}

impl std::fmt::Display for SchoolKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Id(id) => write!(f, "{id}"),
      Self::LegacyId(legacy) => write!(f, "legacy:{legacy}"),
    }
  }
}

/// Whether a read should see inactive schools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
  #[default]
  Active,
  All,
}

// ─── Public view ─────────────────────────────────────────────────────────────

/// The display shape of a school for one locale.
///
/// English fields fall back to the Spanish originals when no translation
/// exists.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolView {
  pub id:            String,
  pub uuid:          Uuid,
  pub slug:          String,
  pub name:          String,
  pub description:   String,
  #[serde(rename = "type")]
  pub school_type:   SchoolType,
  pub type_label:    String,
  pub country:       String,
  pub country_label: String,
  pub city:          String,
  pub address:       Option<String>,
  pub phone:         Option<String>,
  pub email:         Option<String>,
  pub website:       Option<String>,
  pub specialties:   Vec<String>,
  pub languages:     Vec<String>,
  pub accreditation: Vec<String>,
  pub features:      Vec<String>,
  pub programs:      Vec<String>,
  pub gallery:       Vec<String>,
  pub founded_year:  Option<i32>,
  pub student_count: Option<u32>,
  pub program_count: Option<u32>,
  pub rating:        f64,
  pub tuition:       Option<Tuition>,
  pub coordinates:   Option<Coordinates>,
}

impl SchoolView {
  pub fn new(school: &School, locale: Locale) -> Self {
    let d = &school.draft;
    let pick = |field: ListField| -> Vec<String> {
      match locale {
        Locale::En => field
          .english(d)
          .filter(|en| !en.is_empty())
          .unwrap_or(field.values(d))
          .to_vec(),
        Locale::Es => field.values(d).to_vec(),
      }
    };
    let description = match locale {
      Locale::En if d.has_english_description() => {
        d.description_en.clone().unwrap_or_default()
      }
      _ => d.description.clone(),
    };

    Self {
      id: school.public_id(),
      uuid: school.id,
      slug: school.effective_slug(),
      name: d.name.clone(),
      description,
      school_type: d.school_type,
      type_label: locale.t(&format!("type.{}", d.school_type)).to_owned(),
      country: d.country.clone(),
      country_label: locale.t(&format!("country.{}", d.country)).to_owned(),
      city: d.city.clone(),
      address: d.address.clone(),
      phone: d.phone.clone(),
      email: d.email.clone(),
      website: d.website.clone(),
      specialties: pick(ListField::Specialties),
      languages: pick(ListField::Languages),
      accreditation: pick(ListField::Accreditation),
      features: pick(ListField::Features),
      programs: pick(ListField::Programs),
      gallery: d.gallery.clone(),
      founded_year: d.founded_year,
      student_count: d.student_count,
      program_count: d.program_count,
      rating: d.rating,
      tuition: d.tuition.clone(),
      coordinates: d.coordinates,
    }
  }
}
