//! Error type for `culinaria-functions`.

use culinaria_core::store::{ErrorKind, StoreError};
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown function: {0}")]
  UnknownFunction(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("provider error: {0}")]
  Provider(#[from] ProviderError),

  #[error("storage error: {0}")]
  Storage(#[from] std::io::Error),

  #[error("sitemap error: {0}")]
  Sitemap(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Map a backend error by its [`ErrorKind`].
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.kind() {
      ErrorKind::Invalid => Error::BadRequest(err.to_string()),
      ErrorKind::Conflict => Error::Conflict(err.to_string()),
      ErrorKind::Internal => Error::Store(Box::new(err)),
    }
  }
}

impl From<culinaria_core::Error> for Error {
  fn from(err: culinaria_core::Error) -> Self { Error::BadRequest(err.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
