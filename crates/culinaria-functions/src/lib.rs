//! Maintenance functions for Culinaria.
//!
//! Each function is a stateless, independent invocation taking a JSON body
//! and returning JSON. Batch functions walk their schools strictly in
//! sequence with a fixed delay between outbound calls, count per-item
//! failures without aborting and report a [`BatchSummary`].
//!
//! | Name | Body |
//! |------|------|
//! | `generate-english-descriptions` | `{school_id?, limit?}` |
//! | `generate-english-fields` | `{school_id?, limit?}` |
//! | `generate-school-descriptions` | `{action, language, school_id?}` |
//! | `generate-ai-school-images` | `{school_id?, limit?}` |
//! | `generate-gallery-images` | `{school_id?, categories?, limit?}` |
//! | `real-migration-to-storage` | `{school_id?, limit?}` |
//! | `upload-school-image` | one upload |
//! | `upload-school-images` / `upload-new-school-images` / `upload-ai-school-images` | `{images: [...]}` |
//! | `get-school-images` | `{school_id}` |
//! | `get-secret` | `{name}` |
//! | `migrate-static-schools` | `{force?}` |
//! | `regenerate-sitemap` | none |

pub mod error;
mod media;
mod migrate;
pub mod prompts;
pub mod provider;
pub mod sitemap;
pub mod storage;
pub mod summary;
mod translate;

use std::{collections::BTreeMap, str::FromStr, sync::Arc, time::Duration};

use culinaria_core::{
  lookup::resolve_school,
  school::{School, SchoolDraft, SchoolKey, Scope},
  store::SchoolStore,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

pub use error::{Error, Result};
pub use media::{GalleryRequest, UploadBatch, UploadRequest};
pub use migrate::{MIGRATION_NAME, MigrateRequest, MigrationReport};
pub use summary::BatchSummary;
pub use translate::{DescriptionAction, DescriptionRequest};

use crate::{
  provider::{ImageFetcher, ImageGenerator, TextGenerator},
  storage::Bucket,
  summary::Throttle,
};

// ─── Names ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum FunctionName {
  GenerateEnglishDescriptions,
  GenerateEnglishFields,
  GenerateSchoolDescriptions,
  GenerateAiSchoolImages,
  GenerateGalleryImages,
  RealMigrationToStorage,
  UploadSchoolImage,
  UploadSchoolImages,
  UploadNewSchoolImages,
  UploadAiSchoolImages,
  GetSchoolImages,
  GetSecret,
  MigrateStaticSchools,
  RegenerateSitemap,
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FunctionSettings {
  /// Pause between outbound calls inside one batch.
  pub batch_delay:    Duration,
  /// Absolute origin used for sitemap URLs.
  pub site_url:       String,
  pub secrets:        BTreeMap<String, String>,
  /// Names `get-secret` is allowed to return.
  pub public_secrets: Vec<String>,
}

impl Default for FunctionSettings {
  fn default() -> Self {
    Self {
      batch_delay:    Duration::from_secs(1),
      site_url:       "http://localhost:8080".into(),
      secrets:        BTreeMap::new(),
      public_secrets: Vec::new(),
    }
  }
}

/// The outbound services a [`Functions`] instance talks to.
#[derive(Clone)]
pub struct Providers {
  pub text:    Arc<dyn TextGenerator>,
  pub images:  Arc<dyn ImageGenerator>,
  pub fetcher: Arc<dyn ImageFetcher>,
  pub bucket:  Arc<dyn Bucket>,
}

// ─── Request bodies ──────────────────────────────────────────────────────────

/// Body shared by the batch functions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchRequest {
  /// Restrict the batch to one school (any identifier).
  pub school_id: Option<String>,
  pub limit:     Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchoolRequest {
  pub school_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecretRequest {
  pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Secret {
  pub name:  String,
  pub value: String,
}

/// Parse an optional body; `null` means all defaults.
fn body_or_default<T: DeserializeOwned + Default>(body: Value) -> Result<T> {
  if body.is_null() {
    return Ok(T::default());
  }
  serde_json::from_value(body).map_err(|e| Error::BadRequest(e.to_string()))
}

fn required<T: DeserializeOwned>(body: Value) -> Result<T> {
  serde_json::from_value(body).map_err(|e| Error::BadRequest(e.to_string()))
}

// ─── Functions ───────────────────────────────────────────────────────────────

pub struct Functions<S> {
  store:    Arc<S>,
  text:     Arc<dyn TextGenerator>,
  images:   Arc<dyn ImageGenerator>,
  fetcher:  Arc<dyn ImageFetcher>,
  bucket:   Arc<dyn Bucket>,
  settings: FunctionSettings,
}

impl<S> Clone for Functions<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      text:     self.text.clone(),
      images:   self.images.clone(),
      fetcher:  self.fetcher.clone(),
      bucket:   self.bucket.clone(),
      settings: self.settings.clone(),
    }
  }
}

impl<S: SchoolStore> Functions<S> {
  pub fn new(store: Arc<S>, providers: Providers, settings: FunctionSettings) -> Self {
    Self {
      store,
      text: providers.text,
      images: providers.images,
      fetcher: providers.fetcher,
      bucket: providers.bucket,
      settings,
    }
  }

  pub fn settings(&self) -> &FunctionSettings { &self.settings }

  /// Run the function called `name`.
  pub async fn invoke_by_name(&self, name: &str, body: Value) -> Result<Value> {
    let name =
      FunctionName::from_str(name).map_err(|_| Error::UnknownFunction(name.to_owned()))?;
    self.invoke(name, body).await
  }

  pub async fn invoke(&self, name: FunctionName, body: Value) -> Result<Value> {
    use culinaria_core::image::ImageType;

    tracing::info!(function = %name, "invoking function");
    match name {
      FunctionName::GenerateEnglishDescriptions => {
        to_json(self.generate_english_descriptions(body_or_default(body)?).await?)
      }
      FunctionName::GenerateEnglishFields => {
        to_json(self.generate_english_fields(body_or_default(body)?).await?)
      }
      FunctionName::GenerateSchoolDescriptions => {
        to_json(self.generate_school_descriptions(body_or_default(body)?).await?)
      }
      FunctionName::GenerateAiSchoolImages => {
        to_json(self.generate_ai_school_images(body_or_default(body)?).await?)
      }
      FunctionName::GenerateGalleryImages => {
        to_json(self.generate_gallery_images(body_or_default(body)?).await?)
      }
      FunctionName::RealMigrationToStorage => {
        to_json(self.real_migration_to_storage(body_or_default(body)?).await?)
      }
      FunctionName::UploadSchoolImage => {
        to_json(self.upload_school_image(required(body)?, ImageType::Real).await?)
      }
      FunctionName::UploadSchoolImages => {
        to_json(self.upload_school_images(required(body)?, ImageType::Real, false).await?)
      }
      FunctionName::UploadNewSchoolImages => {
        to_json(self.upload_school_images(required(body)?, ImageType::Real, true).await?)
      }
      FunctionName::UploadAiSchoolImages => to_json(
        self
          .upload_school_images(required(body)?, ImageType::AiGenerated, false)
          .await?,
      ),
      FunctionName::GetSchoolImages => {
        to_json(self.get_school_images(required(body)?).await?)
      }
      FunctionName::GetSecret => to_json(self.get_secret(required(body)?)?),
      FunctionName::MigrateStaticSchools => {
        to_json(self.migrate_static_schools(body_or_default(body)?).await?)
      }
      FunctionName::RegenerateSitemap => Ok(Value::String(self.sitemap().await?)),
    }
  }

  // ── Simple functions ──────────────────────────────────────────────────

  pub async fn get_school_images(
    &self,
    req: SchoolRequest,
  ) -> Result<Vec<culinaria_core::image::SchoolImage>> {
    let school = self.resolve(&req.school_id).await?;
    self
      .store
      .images_for(&school.image_keys())
      .await
      .map_err(Error::store)
  }

  /// Serve a configured secret, but only one on the allow-list.
  pub fn get_secret(&self, req: SecretRequest) -> Result<Secret> {
    if !self.settings.public_secrets.iter().any(|n| *n == req.name) {
      tracing::warn!(name = %req.name, "refused secret outside the allow-list");
      return Err(Error::Forbidden(format!("secret {:?} is not public", req.name)));
    }
    let value = self
      .settings
      .secrets
      .get(&req.name)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("secret {:?}", req.name)))?;
    Ok(Secret { name: req.name, value })
  }

  /// The XML sitemap over every active school.
  pub async fn sitemap(&self) -> Result<String> {
    let schools = self
      .store
      .all_schools(Scope::Active)
      .await
      .map_err(Error::store)?;
    sitemap::build_sitemap(&self.settings.site_url, &schools)
  }

  // ── Shared helpers ────────────────────────────────────────────────────

  async fn resolve(&self, ident: &str) -> Result<School> {
    resolve_school(&*self.store, ident)
      .await
      .map_err(Error::store)?
      .map(|hit| hit.school)
      .ok_or_else(|| Error::NotFound(format!("school {ident:?}")))
  }

  /// The schools a batch request targets.
  ///
  /// `limit` is not applied here: batches claim it only for schools that
  /// still need work, so repeated limited runs advance.
  async fn targets(&self, req: &BatchRequest) -> Result<Vec<School>> {
    let schools = match req.school_id.as_deref() {
      Some(ident) => vec![self.resolve(ident).await?],
      None => self
        .store
        .all_schools(Scope::Active)
        .await
        .map_err(Error::store)?,
    };
    Ok(schools)
  }

  /// Persist new editable fields for `school`.
  async fn save(&self, school: &School, draft: SchoolDraft) -> Result<School> {
    self
      .store
      .update_school(&SchoolKey::Id(school.id), draft)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("school {}", school.id)))
  }

  fn throttle(&self) -> Throttle { Throttle::new(self.settings.batch_delay) }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> { Ok(serde_json::to_value(value)?) }

#[cfg(test)]
mod tests;
