//! Error type for `culinaria-store-sqlite`.

use culinaria_core::store::{ErrorKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] culinaria_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A list column held text that is not a JSON array of strings.
  #[error("malformed list in column {column}: {source}")]
  MalformedList {
    column: &'static str,
    source: serde_json::Error,
  },

  /// A uniqueness constraint rejected the write (slug, legacy id or
  /// username already taken).
  #[error("conflict: {0}")]
  Conflict(String),
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(_) => ErrorKind::Invalid,
      Error::Conflict(_) => ErrorKind::Conflict,
      _ => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
