//! Error types for `culinaria-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("school name must not be empty")]
  EmptyName,

  #[error("rating {0} is outside the range 0..=5")]
  InvalidRating(f64),

  #[error("tuition minimum {min} exceeds maximum {max}")]
  InvalidTuition { min: f64, max: f64 },

  #[error("unknown school type: {0:?}")]
  UnknownSchoolType(String),

  #[error("unknown image type: {0:?}")]
  UnknownImageType(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("unknown locale: {0:?}")]
  UnknownLocale(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
