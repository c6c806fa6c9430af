//! In-memory filtering of a school list.
//!
//! Pure and cheap enough to rerun on every keystroke; there is no
//! pagination and no index.

use serde::{Deserialize, Serialize};

use crate::school::School;

/// Filter criteria. `None` and the empty string both mean "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolFilter {
  #[serde(default)]
  pub country:     Option<String>,
  #[serde(default, rename = "type")]
  pub school_type: Option<String>,
  #[serde(default)]
  pub specialty:   Option<String>,
  /// Case-insensitive substring over name, city, country and description.
  #[serde(default)]
  pub search:      Option<String>,
}

fn set(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.trim().is_empty())
}

impl SchoolFilter {
  pub fn is_empty(&self) -> bool {
    set(&self.country).is_none()
      && set(&self.school_type).is_none()
      && set(&self.specialty).is_none()
      && set(&self.search).is_none()
  }

  /// `true` if `school` satisfies every active predicate.
  pub fn matches(&self, school: &School) -> bool {
    let d = &school.draft;

    if let Some(country) = set(&self.country)
      && d.country != country
    {
      return false;
    }
    if let Some(kind) = set(&self.school_type)
      && d.school_type.as_ref() != kind
    {
      return false;
    }
    if let Some(specialty) = set(&self.specialty)
      && !d.specialties.iter().any(|s| s == specialty)
    {
      return false;
    }
    if let Some(search) = set(&self.search) {
      let needle = search.to_lowercase();
      let hit = [
        Some(d.name.as_str()),
        Some(d.city.as_str()),
        Some(d.country.as_str()),
        Some(d.description.as_str()),
        d.description_en.as_deref(),
      ]
      .into_iter()
      .flatten()
      .any(|hay| hay.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }
    true
  }
}

/// The subsequence of `schools` matching `filter`, order preserved.
pub fn filter_schools(schools: &[School], filter: &SchoolFilter) -> Vec<School> {
  schools
    .iter()
    .filter(|s| filter.matches(s))
    .cloned()
    .collect()
}
