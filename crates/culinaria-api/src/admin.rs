//! Handlers for `/admin` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/setup` | `{"needs_setup": bool}`; unauthenticated |
//! | `POST` | `/admin/setup` | First super admin; 409 once one exists |
//! | `POST` | `/admin/profiles` | Super admin only |
//! | `GET`  | `/admin/schools` | `?page&page_size&search&include_inactive` |
//! | `POST` | `/admin/schools` | Body: school draft |
//! | `GET`  | `/admin/schools/:id` | UUID or legacy id, inactive included |
//! | `PUT`  | `/admin/schools/:id` | Replaces every editable field |
//! | `DELETE` | `/admin/schools/:id` | Hard delete; images stay |
//! | `POST` | `/admin/schools/:id/toggle` | Flip `is_active` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use culinaria_core::{
  profile::{NewProfile, Profile, Role},
  school::{School, SchoolDraft, SchoolKey, Scope},
  store::{SchoolPage, SchoolQuery, SchoolStore},
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  auth::{Admin, SuperAdmin, hash_password},
  error::ApiError,
};

const MIN_PASSWORD_LEN: usize = 8;

fn not_found(id: &str) -> ApiError { ApiError::NotFound(format!("school {id:?} not found")) }

// ─── Setup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SetupStatus {
  pub needs_setup: bool,
}

/// `GET /admin/setup`
pub async fn setup_status<S: SchoolStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<SetupStatus>, ApiError> {
  let supers = state
    .store
    .count_profiles(Role::SuperAdmin)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(SetupStatus { needs_setup: supers == 0 }))
}

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
  pub username: String,
  pub password: String,
  #[serde(default)]
  pub role:     Option<Role>,
}

async fn register<S: SchoolStore>(
  store: &S,
  body: ProfileBody,
  role: Role,
) -> Result<Profile, ApiError> {
  let username = body.username.trim();
  if username.is_empty() {
    return Err(ApiError::BadRequest("username must not be empty".into()));
  }
  if body.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  let password_hash = hash_password(&body.password)
    .map_err(|e| ApiError::Store(format!("argon2 error: {e}").into()))?;

  store
    .add_profile(NewProfile { username: username.to_owned(), password_hash, role })
    .await
    .map_err(ApiError::store)
}

/// `POST /admin/setup`, body: `{"username":..., "password":...}`
pub async fn setup<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<ProfileBody>,
) -> Result<impl IntoResponse, ApiError> {
  let supers = state
    .store
    .count_profiles(Role::SuperAdmin)
    .await
    .map_err(ApiError::store)?;
  if supers > 0 {
    return Err(ApiError::Conflict("setup already completed".into()));
  }
  let profile = register(&*state.store, body, Role::SuperAdmin).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `POST /admin/profiles`, body: `{"username":..., "password":..., "role":"admin"}`
pub async fn create_profile<S: SchoolStore + 'static>(
  State(state): State<ApiState<S>>,
  SuperAdmin(_caller): SuperAdmin,
  Json(body): Json<ProfileBody>,
) -> Result<impl IntoResponse, ApiError> {
  let role = body.role.unwrap_or(Role::Admin);
  let profile = register(&*state.store, body, role).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Schools ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub page:             Option<usize>,
  pub page_size:        Option<usize>,
  pub search:           Option<String>,
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /admin/schools`
pub async fn list<S: SchoolStore + 'static>(
  State(state): State<ApiState<S>>,
  _admin: Admin,
  Query(params): Query<ListParams>,
) -> Result<Json<SchoolPage>, ApiError> {
  let query = SchoolQuery {
    scope:     if params.include_inactive { Scope::All } else { Scope::Active },
    search:    params.search,
    page:      params.page,
    page_size: params.page_size,
  };
  let page = state.store.list_schools(&query).await.map_err(ApiError::store)?;
  Ok(Json(page))
}

/// `POST /admin/schools`
pub async fn create_school<S: SchoolStore + 'static>(
  State(state): State<ApiState<S>>,
  Admin(caller): Admin,
  Json(draft): Json<SchoolDraft>,
) -> Result<impl IntoResponse, ApiError> {
  draft.validate()?;
  let school = state.store.insert_school(draft).await.map_err(ApiError::store)?;
  tracing::info!(id = %school.id, by = %caller.username, "school created");
  Ok((StatusCode::CREATED, Json(school)))
}

/// `GET /admin/schools/:id`
pub async fn get_one<S: SchoolStore + 'static>(
  State(state): State<ApiState<S>>,
  _admin: Admin,
  Path(id): Path<String>,
) -> Result<Json<School>, ApiError> {
  let school = state
    .store
    .find_by_key(&SchoolKey::parse(&id), Scope::All)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(&id))?;
  Ok(Json(school))
}

/// `PUT /admin/schools/:id`
pub async fn update<S: SchoolStore + 'static>(
  State(state): State<ApiState<S>>,
  Admin(caller): Admin,
  Path(id): Path<String>,
  Json(draft): Json<SchoolDraft>,
) -> Result<Json<School>, ApiError> {
  draft.validate()?;
  let school = state
    .store
    .update_school(&SchoolKey::parse(&id), draft)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(&id))?;
  tracing::info!(id = %school.id, by = %caller.username, "school updated");
  Ok(Json(school))
}

/// `DELETE /admin/schools/:id`
pub async fn delete<S: SchoolStore + 'static>(
  State(state): State<ApiState<S>>,
  Admin(caller): Admin,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  let deleted = state
    .store
    .delete_school(&SchoolKey::parse(&id))
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(not_found(&id));
  }
  tracing::info!(%id, by = %caller.username, "school deleted");
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/schools/:id/toggle`
pub async fn toggle<S: SchoolStore + 'static>(
  State(state): State<ApiState<S>>,
  _admin: Admin,
  Path(id): Path<String>,
) -> Result<Json<School>, ApiError> {
  let school = state
    .store
    .toggle_active(&SchoolKey::parse(&id))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(&id))?;
  Ok(Json(school))
}
