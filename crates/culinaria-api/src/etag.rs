//! ETag computation for school detail responses.
//!
//! The tag covers the record version, the response locale and the image
//! candidates, since a new image row does not touch the school's
//! `updated_at`.

use axum::http::{HeaderMap, header};
use culinaria_core::{i18n::Locale, school::School};
use sha2::{Digest, Sha256};

/// Compute a strong ETag for `school` rendered in `locale`.
pub fn school_etag(school: &School, locale: Locale, candidates: &[String]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(school.id.as_bytes());
  hasher.update(school.updated_at.timestamp_micros().to_le_bytes());
  hasher.update(locale.as_ref().as_bytes());
  for url in candidates {
    hasher.update(url.as_bytes());
    hasher.update([0u8]);
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// `true` if the request's `If-None-Match` lists `etag` (or `*`).
///
/// Weak validators compare equal to their strong form.
pub fn not_modified(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(|tag| tag.trim())
    .any(|tag| tag == "*" || tag.strip_prefix("W/").unwrap_or(tag) == etag)
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;
  use chrono::{Duration, TimeZone, Utc};
  use culinaria_core::school::{SchoolDraft, SchoolType};
  use uuid::Uuid;

  use super::*;

  fn school() -> School {
    let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    School {
      id:         Uuid::new_v4(),
      draft:      SchoolDraft::new("Le Cordon Bleu Paris", SchoolType::Institute, "france", "París"),
      created_at: ts,
      updated_at: ts,
    }
  }

  #[test]
  fn etag_changes_with_version_locale_and_images() {
    let mut s = school();
    let base = school_etag(&s, Locale::Es, &[]);
    assert_eq!(base, school_etag(&s, Locale::Es, &[]));
    assert_ne!(base, school_etag(&s, Locale::En, &[]));
    assert_ne!(base, school_etag(&s, Locale::Es, &["https://x/a.jpg".into()]));

    s.updated_at += Duration::seconds(1);
    assert_ne!(base, school_etag(&s, Locale::Es, &[]));
  }

  #[test]
  fn if_none_match_parsing() {
    let etag = "\"abc\"";
    let mut headers = HeaderMap::new();
    assert!(!not_modified(&headers, etag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"zzz\", W/\"abc\""));
    assert!(not_modified(&headers, etag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
    assert!(not_modified(&headers, etag));
  }
}
