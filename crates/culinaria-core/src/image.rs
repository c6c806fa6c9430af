//! School image records and the display-image fallback chain.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::school::School;

/// Category tag of the single featured image of a school.
pub const MAIN_CATEGORY: &str = "main";

/// Gallery categories generated for every school.
pub const GALLERY_CATEGORIES: [&str; 4] = ["kitchen", "classroom", "dining", "campus"];

/// Literal value of the `image` field meaning "no image".
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

// ─── Records ─────────────────────────────────────────────────────────────────

/// Where an image came from.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageType {
  #[default]
  Real,
  AiGenerated,
}

/// A row of the `school_images` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolImage {
  pub image_id:      Uuid,
  /// The owning school's slug (older rows) or UUID (newer rows).
  pub school_id:     String,
  pub image_url:     String,
  pub image_type:    ImageType,
  /// `main` or a gallery category; `None` for uncategorised uploads.
  pub category:      Option<String>,
  pub display_order: i32,
  pub alt_text:      Option<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl SchoolImage {
  pub fn is_main(&self) -> bool { self.category.as_deref() == Some(MAIN_CATEGORY) }
}

/// Input to [`crate::store::SchoolStore::add_image`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchoolImage {
  pub school_id:     String,
  pub image_url:     String,
  #[serde(default)]
  pub image_type:    ImageType,
  #[serde(default)]
  pub category:      Option<String>,
  #[serde(default)]
  pub display_order: i32,
  #[serde(default)]
  pub alt_text:      Option<String>,
}

// ─── Bundled images ──────────────────────────────────────────────────────────

/// Images bundled with the frontend, keyed by public school id.
#[derive(Debug, Clone, Default)]
pub struct BundledImages(HashMap<String, String>);

impl BundledImages {
  pub fn get(&self, public_id: &str) -> Option<&str> {
    self.0.get(public_id).map(String::as_str)
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BundledImages {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

// ─── Fallback chain ──────────────────────────────────────────────────────────

/// The deterministic pseudo-photo used when nothing else is available.
///
/// Seeded by the numeric legacy id when there is one, else by the slug.
pub fn placeholder_url(school: &School) -> String {
  let seed = match school.draft.legacy_id.as_deref() {
    Some(legacy) if legacy.parse::<u32>().is_ok() => format!("school-{legacy}"),
    _ => school.effective_slug(),
  };
  format!("https://picsum.photos/seed/{seed}/800/600")
}

/// Every candidate display URL for `school`, best first.
///
/// `images` may contain rows for any school; only main images belonging to
/// this one are considered. The placeholder is always the last entry.
pub fn image_candidates(
  school: &School,
  images: &[SchoolImage],
  bundled: &BundledImages,
) -> Vec<String> {
  let keys = school.image_keys();
  let mut out: Vec<String> = Vec::new();
  let mut push = |url: &str| {
    if !url.is_empty() && !out.iter().any(|u| u == url) {
      out.push(url.to_owned());
    }
  };

  let mut mains: Vec<&SchoolImage> = images
    .iter()
    .filter(|img| img.is_main() && keys.contains(&img.school_id))
    .collect();
  mains.sort_by_key(|img| img.display_order);
  if let Some(main) = mains.first() {
    push(&main.image_url);
  }

  if let Some(local) = bundled.get(&school.public_id()) {
    push(local);
  }

  if let Some(own) = school.draft.image.as_deref()
    && own != PLACEHOLDER_IMAGE
  {
    push(own);
  }

  push(&placeholder_url(school));
  out
}

/// The URL a page should display first.
pub fn display_image(
  school: &School,
  images: &[SchoolImage],
  bundled: &BundledImages,
) -> String {
  image_candidates(school, images, bundled)
    .into_iter()
    .next()
    .unwrap_or_else(|| placeholder_url(school))
}

/// The candidate to try after `failed` could not be loaded.
///
/// An unknown URL restarts from the first candidate; running off the end
/// yields the placeholder.
pub fn next_image(failed: &str, candidates: &[String], placeholder: &str) -> String {
  let next = match candidates.iter().position(|c| c == failed) {
    Some(idx) => candidates.get(idx + 1),
    None => candidates.first(),
  };
  match next {
    Some(url) if url != failed => url.clone(),
    _ => placeholder.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::school::{SchoolDraft, SchoolType};

  fn school(legacy_id: Option<&str>, image: Option<&str>) -> School {
    let mut draft =
      SchoolDraft::new("Le Cordon Bleu Paris", SchoolType::Institute, "france", "París");
    draft.legacy_id = legacy_id.map(str::to_owned);
    draft.image = image.map(str::to_owned);
    let ts = Utc.timestamp_opt(0, 0).unwrap();
    School { id: Uuid::new_v4(), draft, created_at: ts, updated_at: ts }
  }

  fn row(school_id: &str, url: &str, category: Option<&str>) -> SchoolImage {
    let ts = Utc.timestamp_opt(0, 0).unwrap();
    SchoolImage {
      image_id:      Uuid::new_v4(),
      school_id:     school_id.into(),
      image_url:     url.into(),
      image_type:    ImageType::Real,
      category:      category.map(str::to_owned),
      display_order: 0,
      alt_text:      None,
      created_at:    ts,
      updated_at:    ts,
    }
  }

  #[test]
  fn full_chain_order() {
    let s = school(Some("6"), Some("https://cdn.example/own.jpg"));
    let images = vec![
      row("le-cordon-bleu-paris", "https://bucket/gallery.jpg", Some("kitchen")),
      row("le-cordon-bleu-paris", "https://bucket/main.jpg", Some("main")),
      row("other-school", "https://bucket/other.jpg", Some("main")),
    ];
    let bundled = BundledImages::from_iter([("6", "/images/lcb.jpg")]);

    let c = image_candidates(&s, &images, &bundled);
    assert_eq!(c, vec![
      "https://bucket/main.jpg".to_string(),
      "/images/lcb.jpg".to_string(),
      "https://cdn.example/own.jpg".to_string(),
      "https://picsum.photos/seed/school-6/800/600".to_string(),
    ]);
    assert_eq!(display_image(&s, &images, &bundled), "https://bucket/main.jpg");
  }

  #[test]
  fn main_image_matched_by_uuid() {
    let s = school(None, None);
    let images = vec![row(&s.id.to_string(), "https://bucket/uuid.jpg", Some("main"))];
    let c = image_candidates(&s, &images, &BundledImages::default());
    assert_eq!(c[0], "https://bucket/uuid.jpg");
  }

  #[test]
  fn main_image_matched_by_computed_slug_despite_stored_slug() {
    let mut s = school(None, None);
    s.draft.slug = Some("lcb-paris".into());
    let images = vec![row("le-cordon-bleu-paris", "https://bucket/old.jpg", Some("main"))];
    let c = image_candidates(&s, &images, &BundledImages::default());
    assert_eq!(c[0], "https://bucket/old.jpg");
  }

  #[test]
  fn literal_placeholder_field_is_skipped() {
    let s = school(None, Some(PLACEHOLDER_IMAGE));
    let c = image_candidates(&s, &[], &BundledImages::default());
    assert_eq!(c, vec![
      "https://picsum.photos/seed/le-cordon-bleu-paris/800/600".to_string()
    ]);
  }

  #[test]
  fn next_image_walks_the_list() {
    let candidates: Vec<String> =
      ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    assert_eq!(next_image("a", &candidates, "p"), "b");
    assert_eq!(next_image("b", &candidates, "p"), "c");
    assert_eq!(next_image("c", &candidates, "p"), "p");
    assert_eq!(next_image("zzz", &candidates, "p"), "a");
    assert_eq!(next_image("a", &[], "p"), "p");
  }
}
