//! JSON REST API for Culinaria.
//!
//! Exposes an axum [`Router`] backed by any
//! [`culinaria_core::store::SchoolStore`]. Admin routes authenticate with
//! HTTP Basic credentials checked against stored profiles; TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", culinaria_api::api_router(store.clone(), bundled))
//! ```

pub mod admin;
pub mod auth;
pub mod error;
pub mod etag;
pub mod i18n;
pub mod schools;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use culinaria_core::{image::BundledImages, store::SchoolStore};

pub use error::ApiError;

/// Shared state of the API handlers.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  /// Images shipped with the frontend, second step of the fallback chain.
  pub bundled: Arc<BundledImages>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), bundled: self.bundled.clone() }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, bundled: BundledImages) -> Router<()>
where
  S: SchoolStore + 'static,
{
  let state = ApiState { store, bundled: Arc::new(bundled) };

  Router::new()
    // Public
    .route("/schools", get(schools::list::<S>))
    .route("/schools/{ident}", get(schools::get_one::<S>))
    .route("/schools/{ident}/image", get(schools::image::<S>))
    .route("/schools/{ident}/images", get(schools::images::<S>))
    .route("/i18n/{locale}", get(i18n::translations))
    .route("/routes/{locale}", get(i18n::routes))
    // Admin
    .route("/admin/setup", get(admin::setup_status::<S>).post(admin::setup::<S>))
    .route("/admin/profiles", post(admin::create_profile::<S>))
    .route("/admin/schools", get(admin::list::<S>).post(admin::create_school::<S>))
    .route(
      "/admin/schools/{id}",
      get(admin::get_one::<S>)
        .put(admin::update::<S>)
        .delete(admin::delete::<S>),
    )
    .route("/admin/schools/{id}/toggle", post(admin::toggle::<S>))
    .with_state(state)
}
