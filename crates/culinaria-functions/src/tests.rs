//! Function tests against an in-memory store and in-process providers.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use culinaria_core::{
  image::{ImageType, display_image},
  school::{SchoolKey, Scope},
  seed,
  store::SchoolStore,
};
use culinaria_store_sqlite::SqliteStore;
use serde_json::json;

use crate::{
  BatchRequest, DescriptionAction, DescriptionRequest, Error, FunctionSettings, Functions,
  GalleryRequest, MigrateRequest, Providers, SecretRequest, UploadBatch, UploadRequest,
  provider::{ImageData, ImageFetcher, ImageGenerator, Prompt, ProviderError, TextGenerator},
  storage::Bucket,
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

/// Echoes prompts back; list prompts get each item suffixed with ` (en)`.
#[derive(Default)]
struct FakeText {
  calls:   AtomicUsize,
  fail_on: Option<&'static str>,
}

#[async_trait]
impl TextGenerator for FakeText {
  async fn complete(&self, prompt: Prompt) -> Result<String, ProviderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_on.is_some_and(|needle| prompt.user.contains(needle)) {
      return Err(ProviderError::RateLimited);
    }
    if prompt.user.contains("JSON array") {
      let json = prompt.user.rsplit('\n').next().unwrap_or("[]");
      let values: Vec<String> = serde_json::from_str(json).unwrap();
      let out: Vec<String> = values.iter().map(|v| format!("{v} (en)")).collect();
      return Ok(format!("```json\n{}\n```", serde_json::to_string(&out).unwrap()));
    }
    Ok(format!("EN: {}", prompt.user.lines().next().unwrap_or_default()))
  }
}

#[derive(Default)]
struct FakeImages {
  calls: AtomicUsize,
}

#[async_trait]
impl ImageGenerator for FakeImages {
  async fn generate(&self, _prompt: &str) -> Result<ImageData, ProviderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(ImageData { bytes: Bytes::from_static(b"\x89PNG"), content_type: "image/png".into() })
  }
}

#[derive(Default)]
struct FakeFetcher {
  calls: AtomicUsize,
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
  async fn fetch(&self, url: &str) -> Result<ImageData, ProviderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if url.contains("broken") {
      return Err(ProviderError::Http(format!("404 fetching {url}")));
    }
    Ok(ImageData { bytes: Bytes::from_static(b"jpeg"), content_type: "image/jpeg".into() })
  }
}

#[derive(Default)]
struct MemoryBucket {
  keys: Mutex<Vec<String>>,
}

#[async_trait]
impl Bucket for MemoryBucket {
  async fn put(&self, key: &str, _bytes: Bytes, _content_type: &str) -> std::io::Result<String> {
    self.keys.lock().unwrap().push(key.to_owned());
    Ok(self.public_url(key))
  }

  fn public_url(&self, key: &str) -> String { format!("https://bucket.test/{key}") }
}

struct Harness {
  functions: Functions<SqliteStore>,
  store:     Arc<SqliteStore>,
  text:      Arc<FakeText>,
  images:    Arc<FakeImages>,
  fetcher:   Arc<FakeFetcher>,
  bucket:    Arc<MemoryBucket>,
}

impl Harness {
  fn text_calls(&self) -> usize { self.text.calls.load(Ordering::SeqCst) }

  fn keys(&self) -> Vec<String> { self.bucket.keys.lock().unwrap().clone() }
}

async fn harness_with(text: FakeText) -> Harness {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let text = Arc::new(text);
  let images = Arc::new(FakeImages::default());
  let fetcher = Arc::new(FakeFetcher::default());
  let bucket = Arc::new(MemoryBucket::default());

  let providers = Providers {
    text:    text.clone(),
    images:  images.clone(),
    fetcher: fetcher.clone(),
    bucket:  bucket.clone(),
  };
  let settings = FunctionSettings {
    batch_delay: std::time::Duration::ZERO,
    site_url: "https://culinaria.example".into(),
    secrets: [("maps_key", "abc123"), ("db_password", "hunter2")]
      .into_iter()
      .map(|(k, v)| (k.to_owned(), v.to_owned()))
      .collect(),
    public_secrets: vec!["maps_key".into(), "analytics_id".into()],
  };
  let functions = Functions::new(store.clone(), providers, settings);
  functions.migrate_static_schools(MigrateRequest::default()).await.unwrap();

  Harness { functions, store, text, images, fetcher, bucket }
}

async fn harness() -> Harness { harness_with(FakeText::default()).await }

// ─── Dispatch ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_function_name_is_rejected() {
  let h = harness().await;
  let err = h.functions.invoke_by_name("drop-everything", json!({})).await.unwrap_err();
  assert!(matches!(err, Error::UnknownFunction(_)));
}

#[tokio::test]
async fn invoke_parses_bodies_and_reports_bad_ones() {
  let h = harness().await;
  let err = h
    .functions
    .invoke_by_name("get-school-images", json!({ "wrong": 1 }))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::BadRequest(_)));

  let out = h
    .functions
    .invoke_by_name("get-school-images", json!({ "school_id": "6" }))
    .await
    .unwrap();
  assert_eq!(out, json!([]));
}

// ─── Text functions ──────────────────────────────────────────────────────────

#[tokio::test]
async fn english_descriptions_second_run_makes_no_calls() {
  let h = harness().await;

  let first = h.functions.generate_english_descriptions(BatchRequest::default()).await.unwrap();
  assert_eq!(first.processed, 6);
  assert_eq!(first.total, 6);
  assert_eq!(h.text_calls(), 6);

  let second = h
    .functions
    .invoke_by_name("generate-english-descriptions", serde_json::Value::Null)
    .await
    .unwrap();
  assert_eq!(second["processed"], 0);
  assert_eq!(second["skipped"], 6);
  assert_eq!(h.text_calls(), 6);

  let lcb = h.store.find_by_legacy_id("6", Scope::All).await.unwrap().unwrap();
  assert!(lcb.draft.description_en.unwrap().starts_with("EN: "));
}

#[tokio::test]
async fn limited_runs_advance_past_finished_schools() {
  let h = harness().await;
  let req = BatchRequest { school_id: None, limit: Some(2) };

  let first = h.functions.generate_english_descriptions(req.clone()).await.unwrap();
  assert_eq!(first.processed, 2);
  assert_eq!(first.skipped, 0);

  let second = h.functions.generate_english_descriptions(req).await.unwrap();
  assert_eq!(second.processed, 2);
  assert_eq!(second.skipped, 2);
  assert_eq!(h.text_calls(), 4);

  let rest = h.functions.generate_english_descriptions(BatchRequest::default()).await.unwrap();
  assert_eq!(rest.processed, 2);
  assert_eq!(rest.skipped, 4);
}

#[tokio::test]
async fn english_fields_failure_is_counted_and_batch_continues() {
  let h = harness_with(FakeText { fail_on: Some("Catalán"), ..Default::default() }).await;

  let summary = h.functions.generate_english_fields(BatchRequest::default()).await.unwrap();
  assert_eq!(summary.total, 6);
  assert_eq!(summary.errors, 1);
  assert_eq!(summary.processed, 5);

  let hofmann = h.store.find_by_legacy_id("5", Scope::All).await.unwrap().unwrap();
  assert_eq!(
    hofmann.draft.specialties_en,
    Some(vec!["Cocina mediterránea (en)".to_string(), "Pastelería (en)".to_string()])
  );
  assert!(hofmann.draft.languages_en.is_none());

  let lcb = h.store.find_by_legacy_id("6", Scope::All).await.unwrap().unwrap();
  assert_eq!(lcb.draft.programs_en.unwrap()[0], "Grand Diplôme (en)");
}

#[tokio::test]
async fn school_descriptions_generate_fills_only_empty_ones() {
  let h = harness().await;

  let req = DescriptionRequest { language: culinaria_core::i18n::Locale::Es, ..Default::default() };
  let summary = h.functions.generate_school_descriptions(req).await.unwrap();
  assert_eq!(summary.skipped, 6);
  assert_eq!(h.text_calls(), 0);

  let req = DescriptionRequest {
    action: DescriptionAction::Regenerate,
    language: culinaria_core::i18n::Locale::Es,
    school_id: Some("6".into()),
    limit: None,
  };
  let summary = h.functions.generate_school_descriptions(req).await.unwrap();
  assert_eq!(summary.processed, 1);
  let lcb = h.store.find_by_legacy_id("6", Scope::All).await.unwrap().unwrap();
  assert!(lcb.draft.description.starts_with("EN: Write a two or three sentence description"));

  let summary = h
    .functions
    .invoke_by_name("generate-school-descriptions", json!({ "action": "generate", "language": "en" }))
    .await
    .unwrap();
  assert_eq!(summary["processed"], 6);
}

// ─── Image functions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn ai_main_images_are_generated_once() {
  let h = harness().await;

  let summary = h.functions.generate_ai_school_images(BatchRequest::default()).await.unwrap();
  assert_eq!(summary.processed, 6);
  assert!(h.keys().contains(&"le-cordon-bleu-paris.png".to_string()));

  let lcb = h.store.find_by_legacy_id("6", Scope::All).await.unwrap().unwrap();
  let images = h.store.images_for(&lcb.image_keys()).await.unwrap();
  assert_eq!(images.len(), 1);
  assert_eq!(images[0].image_type, ImageType::AiGenerated);
  assert_eq!(images[0].school_id, lcb.id.to_string());
  assert_eq!(
    display_image(&lcb, &images, &seed::bundled_images()),
    "https://bucket.test/le-cordon-bleu-paris.png"
  );

  let again = h.functions.generate_ai_school_images(BatchRequest::default()).await.unwrap();
  assert_eq!(again.skipped, 6);
  assert_eq!(h.images.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn gallery_generates_missing_categories_only() {
  let h = harness().await;

  let req = GalleryRequest {
    school_id:  Some("6".into()),
    categories: Some(vec!["kitchen".into(), "dining".into()]),
    limit:      None,
  };
  let first = h.functions.generate_gallery_images(req).await.unwrap();
  assert_eq!(first.processed, 2);
  assert!(h.keys().contains(&"gallery/le-cordon-bleu-paris-kitchen.png".to_string()));

  let req = GalleryRequest { school_id: Some("6".into()), ..Default::default() };
  let second = h.functions.generate_gallery_images(req).await.unwrap();
  assert_eq!(second.total, 4);
  assert_eq!(second.skipped, 2);
  assert_eq!(second.processed, 2);

  let req = GalleryRequest { categories: Some(vec!["bathroom".into()]), ..Default::default() };
  let err = h.functions.generate_gallery_images(req).await.unwrap_err();
  assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn remote_images_are_copied_into_the_bucket() {
  let h = harness().await;

  let summary = h.functions.real_migration_to_storage(BatchRequest::default()).await.unwrap();
  // Basque Culinary Center, CIA and Hofmann carry remote URLs.
  assert_eq!(summary.processed, 3);
  assert_eq!(summary.skipped, 3);
  assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 3);
  assert!(h.keys().contains(&"basque-culinary-center.jpg".to_string()));

  let again = h.functions.real_migration_to_storage(BatchRequest::default()).await.unwrap();
  assert_eq!(again.processed, 0);
  assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn upload_new_images_skips_existing_categories() {
  let h = harness().await;
  let upload = |school_id: &str| UploadRequest {
    school_id:     school_id.into(),
    image_url:     None,
    image_base64:  Some("aGVsbG8=".into()),
    content_type:  Some("image/webp".into()),
    category:      None,
    image_type:    None,
    alt_text:      None,
    display_order: None,
  };

  let batch = UploadBatch { images: vec![upload("6"), upload("no-such-school")] };
  let summary = h
    .functions
    .upload_school_images(batch, ImageType::Real, true)
    .await
    .unwrap();
  assert_eq!(summary.processed, 1);
  assert_eq!(summary.errors, 1);
  assert_eq!(h.keys(), vec!["le-cordon-bleu-paris.webp".to_string()]);

  let batch = UploadBatch { images: vec![upload("6")] };
  let summary = h
    .functions
    .upload_school_images(batch, ImageType::Real, true)
    .await
    .unwrap();
  assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn ai_upload_defaults_the_image_type() {
  let h = harness().await;
  let out = h
    .functions
    .invoke_by_name(
      "upload-ai-school-images",
      json!({ "images": [
        { "school_id": "le-cordon-bleu-paris", "image_url": "https://cdn.test/a.jpg", "category": "campus" },
        { "school_id": "6", "image_url": "https://cdn.test/broken.jpg", "category": "dining" }
      ]}),
    )
    .await
    .unwrap();
  assert_eq!(out["processed"], 1);
  assert_eq!(out["errors"], 1);

  let images = h
    .functions
    .invoke_by_name("get-school-images", json!({ "school_id": "6" }))
    .await
    .unwrap();
  assert_eq!(images[0]["image_type"], "ai_generated");
  assert_eq!(images[0]["category"], "campus");
  assert_eq!(images[0]["display_order"], 4);
}

#[tokio::test]
async fn single_upload_requires_a_source() {
  let h = harness().await;
  let err = h
    .functions
    .invoke_by_name("upload-school-image", json!({ "school_id": "6" }))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::BadRequest(_)));
}

// ─── Secrets, sitemap, migration ─────────────────────────────────────────────

#[tokio::test]
async fn secrets_are_served_from_the_allow_list_only() {
  let h = harness().await;
  let secret = h.functions.get_secret(SecretRequest { name: "maps_key".into() }).unwrap();
  assert_eq!(secret.value, "abc123");

  let err = h.functions.get_secret(SecretRequest { name: "db_password".into() }).unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  let err = h.functions.get_secret(SecretRequest { name: "analytics_id".into() }).unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn sitemap_lists_active_schools() {
  let h = harness().await;
  h.store.toggle_active(&SchoolKey::LegacyId("4".into())).await.unwrap();

  let xml = h.functions.invoke_by_name("regenerate-sitemap", json!(null)).await.unwrap();
  let xml = xml.as_str().unwrap();
  assert!(xml.contains("<loc>https://culinaria.example/escuela/6</loc>"));
  assert!(xml.contains(r#"hreflang="en" href="https://culinaria.example/school/6""#));
  assert!(!xml.contains("/escuela/4<"));
}

#[tokio::test]
async fn static_migration_is_idempotent() {
  let h = harness().await;
  let ids: Vec<_> = h.store.all_schools(Scope::All).await.unwrap().iter().map(|s| s.id).collect();
  assert_eq!(ids.len(), 6);

  let lcb = h.store.find_by_legacy_id("6", Scope::All).await.unwrap().unwrap();
  assert_eq!(lcb.draft.slug.as_deref(), Some("le-cordon-bleu-paris"));

  let again = h.functions.migrate_static_schools(MigrateRequest::default()).await.unwrap();
  assert!(again.already_applied);
  assert_eq!(again.batch.processed, 0);

  h.functions.generate_english_descriptions(BatchRequest::default()).await.unwrap();
  let forced = h.functions.migrate_static_schools(MigrateRequest { force: true }).await.unwrap();
  assert!(!forced.already_applied);
  assert_eq!(forced.updated, 6);
  assert_eq!(forced.inserted, 0);

  let after: Vec<_> =
    h.store.all_schools(Scope::All).await.unwrap().iter().map(|s| s.id).collect();
  assert_eq!(ids, after);
  let lcb = h.store.find_by_legacy_id("6", Scope::All).await.unwrap().unwrap();
  assert!(lcb.draft.has_english_description());
}
