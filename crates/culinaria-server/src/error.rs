//! Errors of the server-only routes.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use culinaria_api::ApiError;
use culinaria_functions::Error as FunctionError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Api(#[from] ApiError),

  #[error(transparent)]
  Function(#[from] FunctionError),
}

fn status_of(err: &FunctionError) -> StatusCode {
  match err {
    FunctionError::UnknownFunction(_) | FunctionError::NotFound(_) => StatusCode::NOT_FOUND,
    FunctionError::BadRequest(_) => StatusCode::BAD_REQUEST,
    FunctionError::Forbidden(_) => StatusCode::FORBIDDEN,
    FunctionError::Conflict(_) => StatusCode::CONFLICT,
    FunctionError::Provider(_) => StatusCode::BAD_GATEWAY,
    FunctionError::Storage(_)
    | FunctionError::Sitemap(_)
    | FunctionError::Json(_)
    | FunctionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Api(e) => e.into_response(),
      Error::Function(e) => {
        let status = status_of(&e);
        if status.is_server_error() {
          tracing::error!(error = %e, "function failed");
        }
        (status, Json(json!({ "error": e.to_string() }))).into_response()
      }
    }
  }
}
