//! The Culinaria HTTP server.
//!
//! Composes the JSON API, the admin-only function endpoint, the sitemap and
//! the object bucket into one axum [`Router`].
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | any    | `/api/...` | See `culinaria-api` |
//! | `POST` | `/functions/{name}` | Admin only; JSON body, JSON result |
//! | `GET`  | `/sitemap.xml` | Active schools with `hreflang` alternates |
//! | `GET`  | `/storage/{*key}` | Bucket objects |

pub mod error;

pub use error::Error;

use std::{collections::BTreeMap, path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Json, Router,
  body::Bytes,
  extract::{Path, State},
  http::{HeaderMap, header},
  response::IntoResponse,
  routing::{get, post},
};
use culinaria_api::auth::require_admin;
use culinaria_core::{seed, store::SchoolStore};
use culinaria_functions::{
  FunctionSettings, Functions, Providers,
  provider::{Endpoint, HttpFetcher, OpenAiChat, OpenAiImages, ProviderError, http_client},
  storage::FsBucket,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::{services::ServeDir, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CULINARIA_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  /// Public origin of the site, used in the sitemap.
  #[serde(default = "default_site_url")]
  pub site_url:       String,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  #[serde(default)]
  pub bucket:         BucketConfig,
  #[serde(default)]
  pub functions:      FunctionsConfig,
  #[serde(default)]
  pub secrets:        BTreeMap<String, String>,
  /// Secret names `get-secret` may return.
  #[serde(default)]
  pub public_secrets: Vec<String>,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct BucketConfig {
  pub dir:        PathBuf,
  /// URL prefix objects are served under.
  pub public_url: String,
}

impl Default for BucketConfig {
  fn default() -> Self {
    Self { dir: PathBuf::from("storage"), public_url: "/storage".into() }
  }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct FunctionsConfig {
  pub batch_delay_ms: u64,
  pub timeout_secs:   u64,
  pub text:           EndpointConfig,
  pub images:         EndpointConfig,
}

impl Default for FunctionsConfig {
  fn default() -> Self {
    Self {
      batch_delay_ms: 1000,
      timeout_secs:   60,
      text:           EndpointConfig::default(),
      images:         EndpointConfig::default(),
    }
  }
}

/// An OpenAI-compatible endpoint; unset keys fall back one by one.
#[derive(Deserialize, Clone, Default)]
#[serde(default)]
pub struct EndpointConfig {
  pub base_url: Option<String>,
  pub api_key:  String,
  pub model:    Option<String>,
}

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";

impl EndpointConfig {
  pub fn endpoint(&self, default_model: &str) -> Endpoint {
    Endpoint {
      base_url: self.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.into()),
      api_key:  self.api_key.clone(),
      model:    self.model.clone().unwrap_or_else(|| default_model.into()),
    }
  }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_site_url() -> String { "http://localhost:8080".into() }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/culinaria/culinaria.db") }

/// `CULINARIA_*` environment variables; nested keys use a double
/// underscore, e.g. `CULINARIA_FUNCTIONS__TEXT__API_KEY`.
pub fn environment() -> config::Environment {
  config::Environment::with_prefix("CULINARIA")
    .prefix_separator("_")
    .separator("__")
}

impl ServerConfig {
  pub fn function_settings(&self) -> FunctionSettings {
    FunctionSettings {
      batch_delay:    Duration::from_millis(self.functions.batch_delay_ms),
      site_url:       self.site_url.clone(),
      secrets:        self.secrets.clone(),
      public_secrets: self.public_secrets.clone(),
    }
  }
}

/// HTTP-backed providers and the filesystem bucket from `config`.
pub fn providers(config: &ServerConfig) -> Result<Providers, ProviderError> {
  let client = http_client(Duration::from_secs(config.functions.timeout_secs))?;
  Ok(Providers {
    text:    Arc::new(OpenAiChat::new(
      client.clone(),
      config.functions.text.endpoint(DEFAULT_TEXT_MODEL),
    )),
    images:  Arc::new(OpenAiImages::new(
      client.clone(),
      config.functions.images.endpoint(DEFAULT_IMAGE_MODEL),
    )),
    fetcher: Arc::new(HttpFetcher::new(client)),
    bucket:  Arc::new(FsBucket::new(&config.bucket.dir, &config.bucket.public_url)),
  })
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the server-only handlers.
pub struct AppState<S> {
  pub store:      Arc<S>,
  pub functions:  Functions<S>,
  pub bucket_dir: PathBuf,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      self.store.clone(),
      functions:  self.functions.clone(),
      bucket_dir: self.bucket_dir.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SchoolStore + 'static,
{
  let api = culinaria_api::api_router(state.store.clone(), seed::bundled_images());
  let bucket = ServeDir::new(&state.bucket_dir);

  Router::new()
    .route("/functions/{name}", post(invoke_function::<S>))
    .route("/sitemap.xml", get(sitemap::<S>))
    .with_state(state)
    .nest("/api", api)
    .nest_service("/storage", bucket)
    .layer(TraceLayer::new_for_http())
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /functions/{name}`; an empty body is passed as `null`.
async fn invoke_function<S: SchoolStore + 'static>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Value>, Error> {
  let caller = require_admin(&headers, &*state.store).await?;

  let input = if body.iter().all(u8::is_ascii_whitespace) {
    Value::Null
  } else {
    serde_json::from_slice(&body)
      .map_err(|e| culinaria_functions::Error::BadRequest(format!("invalid JSON body: {e}")))?
  };

  tracing::info!(function = %name, by = %caller.username, "function invoked");
  let output = state.functions.invoke_by_name(&name, input).await?;
  Ok(Json(output))
}

/// `GET /sitemap.xml`
async fn sitemap<S: SchoolStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, Error> {
  let xml = state.functions.sitemap().await?;
  Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}
