//! HTTP Basic authentication against stored admin profiles.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use culinaria_core::{
  profile::{Profile, Role},
  store::SchoolStore,
};
use rand_core::OsRng;

use crate::{ApiState, error::ApiError};

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Decode `Authorization: Basic ...` into `(username, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((username.to_owned(), password.to_owned()))
}

/// Verify the request's credentials and return the matching profile.
pub async fn authenticate<S: SchoolStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Profile, ApiError> {
  let (username, password) = basic_credentials(headers)?;

  let profile = store
    .find_profile(&username)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&profile.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(profile)
}

/// Like [`authenticate`], but only admin roles pass.
pub async fn require_admin<S: SchoolStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Profile, ApiError> {
  let profile = authenticate(headers, store).await?;
  if !profile.role.is_admin() {
    tracing::warn!(username = %profile.username, "non-admin attempted an admin action");
    return Err(ApiError::Forbidden(format!("{} is not an admin", profile.username)));
  }
  Ok(profile)
}

/// Present in a handler means the caller is an admin or super admin.
pub struct Admin(pub Profile);

/// Present in a handler means the caller is a super admin.
pub struct SuperAdmin(pub Profile);

impl<S: SchoolStore + 'static> FromRequestParts<ApiState<S>> for Admin {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(Admin(require_admin(&parts.headers, &*state.store).await?))
  }
}

impl<S: SchoolStore + 'static> FromRequestParts<ApiState<S>> for SuperAdmin {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let profile = authenticate(&parts.headers, &*state.store).await?;
    if profile.role != Role::SuperAdmin {
      return Err(ApiError::Forbidden("super admin required".into()));
    }
    Ok(SuperAdmin(profile))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = format!("Basic {}", B64.encode(format!("{user}:{pass}")));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
    headers
  }

  #[test]
  fn credentials_are_decoded() {
    let (u, p) = basic_credentials(&basic("chef", "pa:ss")).unwrap();
    assert_eq!((u.as_str(), p.as_str()), ("chef", "pa:ss"));
  }

  #[test]
  fn missing_or_garbled_header_is_unauthorized() {
    assert!(matches!(basic_credentials(&HeaderMap::new()), Err(ApiError::Unauthorized)));

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic !!!not-base64!!!"));
    assert!(matches!(basic_credentials(&headers), Err(ApiError::Unauthorized)));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
    assert!(matches!(basic_credentials(&headers), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn hashes_verify() {
    let hash = hash_password("secret").unwrap();
    let parsed = PasswordHash::new(&hash).unwrap();
    assert!(Argon2::default().verify_password(b"secret", &parsed).is_ok());
    assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
  }
}
