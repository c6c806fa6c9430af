//! Public handlers for `/schools` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/schools` | `?country&type&specialty&search&locale` |
//! | `GET`  | `/schools/:ident` | UUID, legacy id or slug; honours `If-None-Match` |
//! | `GET`  | `/schools/:ident/image` | Display image; `?failed=<url>` for the next candidate |
//! | `GET`  | `/schools/:ident/images` | Raw image records |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use culinaria_core::{
  filter::{SchoolFilter, filter_schools},
  i18n::Locale,
  image::{SchoolImage, display_image, image_candidates, next_image, placeholder_url},
  lookup::{LookupStrategy, Resolution, resolve_school},
  school::{School, SchoolView, Scope},
  store::SchoolStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  error::ApiError,
  etag::{not_modified, school_etag},
};

/// Resolve `ident` or fail with 404.
pub(crate) async fn resolve<S: SchoolStore>(store: &S, ident: &str) -> Result<Resolution, ApiError> {
  resolve_school(store, ident)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("school {ident:?} not found")))
}

async fn images_of<S: SchoolStore>(store: &S, school: &School) -> Result<Vec<SchoolImage>, ApiError> {
  store
    .images_for(&school.image_keys())
    .await
    .map_err(ApiError::store)
}

#[derive(Debug, Default, Deserialize)]
pub struct LocaleParam {
  #[serde(default)]
  pub locale: Option<Locale>,
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub country:   Option<String>,
  #[serde(rename = "type")]
  pub kind:      Option<String>,
  pub specialty: Option<String>,
  pub search:    Option<String>,
  pub locale:    Option<Locale>,
}

impl ListParams {
  fn filter(&self) -> SchoolFilter {
    SchoolFilter {
      country:     self.country.clone(),
      school_type: self.kind.clone(),
      specialty:   self.specialty.clone(),
      search:      self.search.clone(),
    }
  }
}

/// One entry of the public listing.
#[derive(Debug, Serialize)]
pub struct ListedSchool {
  #[serde(flatten)]
  pub view:  SchoolView,
  pub image: String,
}

/// `GET /schools[?country&type&specialty&search&locale]`
pub async fn list<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ListedSchool>>, ApiError> {
  let all = state
    .store
    .all_schools(Scope::Active)
    .await
    .map_err(ApiError::store)?;
  let matched = filter_schools(&all, &params.filter());

  let keys: Vec<String> = matched.iter().flat_map(School::image_keys).collect();
  let images = state.store.images_for(&keys).await.map_err(ApiError::store)?;

  let locale = params.locale.unwrap_or_default();
  let listed = matched
    .iter()
    .map(|school| ListedSchool {
      view:  SchoolView::new(school, locale),
      image: display_image(school, &images, &state.bundled),
    })
    .collect();
  Ok(Json(listed))
}

// ─── Detail ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SchoolDetail {
  #[serde(flatten)]
  pub view:       SchoolView,
  pub image:      String,
  /// Display candidates, best first.
  pub images:     Vec<String>,
  pub matched_by: LookupStrategy,
}

/// `GET /schools/:ident[?locale]`
pub async fn get_one<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Path(ident): Path<String>,
  Query(params): Query<LocaleParam>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  let Resolution { school, strategy } = resolve(&*state.store, &ident).await?;
  let images = images_of(&*state.store, &school).await?;
  let candidates = image_candidates(&school, &images, &state.bundled);

  let locale = params.locale.unwrap_or_default();
  let etag = school_etag(&school, locale, &candidates);
  if not_modified(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  let detail = SchoolDetail {
    view:       SchoolView::new(&school, locale),
    image:      candidates.first().cloned().unwrap_or_else(|| placeholder_url(&school)),
    images:     candidates,
    matched_by: strategy,
  };
  Ok(([(header::ETAG, etag)], Json(detail)).into_response())
}

// ─── Image fallback ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
  /// A URL the client failed to load.
  pub failed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageChoice {
  pub url:        String,
  pub candidates: Vec<String>,
}

/// `GET /schools/:ident/image[?failed=<url>]`
pub async fn image<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Path(ident): Path<String>,
  Query(params): Query<ImageParams>,
) -> Result<Json<ImageChoice>, ApiError> {
  let Resolution { school, .. } = resolve(&*state.store, &ident).await?;
  let images = images_of(&*state.store, &school).await?;
  let candidates = image_candidates(&school, &images, &state.bundled);
  let placeholder = placeholder_url(&school);

  let url = match params.failed.as_deref().filter(|f| !f.is_empty()) {
    Some(failed) => next_image(failed, &candidates, &placeholder),
    None => candidates.first().cloned().unwrap_or(placeholder),
  };
  Ok(Json(ImageChoice { url, candidates }))
}

/// `GET /schools/:ident/images`
pub async fn images<S: SchoolStore>(
  State(state): State<ApiState<S>>,
  Path(ident): Path<String>,
) -> Result<Json<Vec<SchoolImage>>, ApiError> {
  let Resolution { school, .. } = resolve(&*state.store, &ident).await?;
  Ok(Json(images_of(&*state.store, &school).await?))
}
