//! Outbound AI and HTTP providers used by the maintenance functions.
//!
//! Each capability sits behind an `async_trait` object so functions can be
//! driven by in-process fakes in tests. The HTTP implementations speak the
//! OpenAI-compatible `chat/completions` and `images/generations` APIs.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("{0} is not configured")]
  NotConfigured(&'static str),
  #[error("http error: {0}")]
  Http(String),
  #[error("unauthorized")]
  Unauthorized,
  #[error("rate limited")]
  RateLimited,
  #[error("invalid response: {0}")]
  InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
  fn from(err: reqwest::Error) -> Self { ProviderError::Http(err.to_string()) }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// A single-turn prompt for a text model.
#[derive(Debug, Clone)]
pub struct Prompt {
  pub system:      String,
  pub user:        String,
  pub temperature: f32,
  pub max_tokens:  u32,
}

impl Prompt {
  pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
    Self {
      system:      system.into(),
      user:        user.into(),
      temperature: 0.3,
      max_tokens:  1024,
    }
  }
}

/// Raw image bytes plus their MIME type.
#[derive(Debug, Clone)]
pub struct ImageData {
  pub bytes:        Bytes,
  pub content_type: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
  /// The model's reply, trimmed.
  async fn complete(&self, prompt: Prompt) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<ImageData, ProviderError>;
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
  /// Download a remote image.
  async fn fetch(&self, url: &str) -> Result<ImageData, ProviderError>;
}

// ─── HTTP client ─────────────────────────────────────────────────────────────

/// Shared `reqwest` client with a request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
  reqwest::Client::builder()
    .timeout(timeout)
    .user_agent(concat!("culinaria/", env!("CARGO_PKG_VERSION")))
    .build()
    .map_err(ProviderError::from)
}

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
  pub base_url: String,
  #[serde(default)]
  pub api_key:  String,
  pub model:    String,
}

impl Endpoint {
  fn url(&self, path: &str) -> String {
    format!("{}/{path}", self.base_url.trim_end_matches('/'))
  }
}

async fn post_json(
  client: &reqwest::Client,
  endpoint: &Endpoint,
  what: &'static str,
  path: &str,
  body: &Value,
) -> Result<Value, ProviderError> {
  if endpoint.api_key.is_empty() {
    return Err(ProviderError::NotConfigured(what));
  }
  let resp = client
    .post(endpoint.url(path))
    .bearer_auth(&endpoint.api_key)
    .json(body)
    .send()
    .await?;

  match resp.status() {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(ProviderError::Unauthorized),
    StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
    _ => {}
  }
  let status = resp.status();
  let raw = resp.text().await?;
  if !status.is_success() {
    return Err(ProviderError::Http(format!("{} {raw}", status.as_u16())));
  }
  serde_json::from_str(&raw)
    .map_err(|e| ProviderError::InvalidResponse(format!("json parse failed: {e}")))
}

// ─── Chat completions ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct OpenAiChat {
  client:   reqwest::Client,
  endpoint: Endpoint,
}

impl OpenAiChat {
  pub fn new(client: reqwest::Client, endpoint: Endpoint) -> Self { Self { client, endpoint } }
}

#[async_trait]
impl TextGenerator for OpenAiChat {
  async fn complete(&self, prompt: Prompt) -> Result<String, ProviderError> {
    let body = serde_json::json!({
      "model": self.endpoint.model,
      "temperature": prompt.temperature,
      "max_tokens": prompt.max_tokens,
      "messages": [
        {"role": "system", "content": prompt.system},
        {"role": "user", "content": prompt.user}
      ]
    });
    let v = post_json(&self.client, &self.endpoint, "text provider", "chat/completions", &body)
      .await?;

    let text = v
      .pointer("/choices/0/message/content")
      .and_then(Value::as_str)
      .ok_or_else(|| ProviderError::InvalidResponse("missing choices[0].message.content".into()))?;
    Ok(text.trim().to_owned())
  }
}

// ─── Image generation ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct OpenAiImages {
  client:   reqwest::Client,
  endpoint: Endpoint,
  size:     String,
}

impl OpenAiImages {
  pub fn new(client: reqwest::Client, endpoint: Endpoint) -> Self {
    Self { client, endpoint, size: "1024x1024".into() }
  }
}

#[async_trait]
impl ImageGenerator for OpenAiImages {
  async fn generate(&self, prompt: &str) -> Result<ImageData, ProviderError> {
    let body = serde_json::json!({
      "model": self.endpoint.model,
      "prompt": prompt,
      "n": 1,
      "size": self.size,
      "response_format": "b64_json"
    });
    let v = post_json(&self.client, &self.endpoint, "image provider", "images/generations", &body)
      .await?;

    let b64 = v
      .pointer("/data/0/b64_json")
      .and_then(Value::as_str)
      .ok_or_else(|| ProviderError::InvalidResponse("missing data[0].b64_json".into()))?;
    let bytes = base64::engine::general_purpose::STANDARD
      .decode(b64)
      .map_err(|e| ProviderError::InvalidResponse(format!("bad base64: {e}")))?;
    Ok(ImageData { bytes: Bytes::from(bytes), content_type: "image/png".into() })
  }
}

// ─── Plain downloads ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new(client: reqwest::Client) -> Self { Self { client } }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
  async fn fetch(&self, url: &str) -> Result<ImageData, ProviderError> {
    let resp = self.client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(ProviderError::Http(format!("{} fetching {url}", status.as_u16())));
    }
    let content_type = resp
      .headers()
      .get(reqwest::header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(|v| v.split(';').next().unwrap_or(v).trim().to_owned())
      .unwrap_or_else(|| "image/jpeg".into());
    if !content_type.starts_with("image/") {
      return Err(ProviderError::InvalidResponse(format!(
        "{url} is {content_type}, not an image"
      )));
    }
    let bytes = resp.bytes().await?;
    Ok(ImageData { bytes, content_type })
  }
}

/// Decode a base64 payload, with or without a `data:` URL prefix.
pub fn decode_base64_image(
  payload: &str,
  content_type: Option<&str>,
) -> Result<ImageData, ProviderError> {
  let (mime, data) = match payload.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
    Some((meta, data)) => (meta.trim_end_matches(";base64").to_owned(), data),
    None => (content_type.unwrap_or("image/jpeg").to_owned(), payload),
  };
  let bytes = base64::engine::general_purpose::STANDARD
    .decode(data.trim())
    .map_err(|e| ProviderError::InvalidResponse(format!("bad base64: {e}")))?;
  Ok(ImageData { bytes: Bytes::from(bytes), content_type: mime })
}
