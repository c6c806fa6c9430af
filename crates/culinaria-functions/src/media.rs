//! Image functions: AI generation, copying remote images into the bucket
//! and caller-supplied uploads.

use std::collections::HashSet;

use culinaria_core::{
  image::{GALLERY_CATEGORIES, ImageType, MAIN_CATEGORY, NewSchoolImage, SchoolImage},
  school::School,
  store::SchoolStore,
};
use serde::Deserialize;

use crate::{
  BatchRequest, Functions,
  error::{Error, Result},
  prompts,
  provider::{ImageData, decode_base64_image},
  storage::{extension_for, gallery_key, main_key},
  summary::{BatchSummary, Item},
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryRequest {
  pub school_id:  Option<String>,
  /// Subset of the gallery categories; all of them when absent.
  pub categories: Option<Vec<String>>,
  pub limit:      Option<usize>,
}

/// One caller-supplied image. Exactly one of `image_url` and
/// `image_base64` is used, the payload winning when both are present.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
  pub school_id:     String,
  #[serde(default)]
  pub image_url:     Option<String>,
  #[serde(default)]
  pub image_base64:  Option<String>,
  #[serde(default)]
  pub content_type:  Option<String>,
  /// `main` unless given.
  #[serde(default)]
  pub category:      Option<String>,
  #[serde(default)]
  pub image_type:    Option<ImageType>,
  #[serde(default)]
  pub alt_text:      Option<String>,
  #[serde(default)]
  pub display_order: Option<i32>,
}

impl UploadRequest {
  fn category(&self) -> &str { self.category.as_deref().unwrap_or(MAIN_CATEGORY) }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadBatch {
  pub images: Vec<UploadRequest>,
}

/// Gallery position of `category`; gallery images follow the main one.
fn gallery_order(category: &str) -> i32 {
  GALLERY_CATEGORIES
    .iter()
    .position(|c| *c == category)
    .map_or(0, |i| i as i32 + 1)
}

fn has_category(images: &[SchoolImage], category: &str) -> bool {
  images.iter().any(|img| img.category.as_deref() == Some(category))
}

impl<S: SchoolStore> Functions<S> {
  async fn images_of(&self, school: &School) -> Result<Vec<SchoolImage>> {
    self
      .store
      .images_for(&school.image_keys())
      .await
      .map_err(Error::store)
  }

  /// Upload `data` under `key` and record it against `school`.
  async fn store_image(
    &self,
    school: &School,
    key: String,
    data: ImageData,
    record: NewSchoolImage,
  ) -> Result<SchoolImage> {
    let url = self.bucket.put(&key, data.bytes, &data.content_type).await?;
    let image = self
      .store
      .add_image(NewSchoolImage { image_url: url, ..record })
      .await
      .map_err(Error::store)?;
    tracing::debug!(school = %school.id, %key, "image recorded");
    Ok(image)
  }

  fn record(school: &School, image_type: ImageType, category: &str, order: i32) -> NewSchoolImage {
    NewSchoolImage {
      school_id: school.id.to_string(),
      image_url: String::new(),
      image_type,
      category: Some(category.to_owned()),
      display_order: order,
      alt_text: Some(school.name().to_owned()),
    }
  }

  // ── generate-ai-school-images ─────────────────────────────────────────

  pub async fn generate_ai_school_images(&self, req: BatchRequest) -> Result<BatchSummary> {
    let schools = self.targets(&req).await?;
    let mut summary = BatchSummary::new(schools.len()).with_limit(req.limit);
    let mut throttle = self.throttle();

    for school in schools {
      let images = match self.images_of(&school).await {
        Ok(images) => images,
        Err(e) => {
          summary.failed(Item::of(&school), &e);
          continue;
        }
      };
      if has_category(&images, MAIN_CATEGORY) {
        summary.skipped(Item::of(&school), "already has a main image");
        continue;
      }
      if !summary.claim() {
        break;
      }
      throttle.wait().await;
      match self.generate_main(&school).await {
        Ok(img) => summary.processed(Item::of(&school), Some(img.image_url)),
        Err(e) => summary.failed(Item::of(&school), &e),
      }
    }

    summary.log("generate-ai-school-images");
    Ok(summary)
  }

  async fn generate_main(&self, school: &School) -> Result<SchoolImage> {
    let data = self.images.generate(&prompts::main_image(&school.draft)).await?;
    let key = main_key(&school.effective_slug(), extension_for(&data.content_type));
    let record = Self::record(school, ImageType::AiGenerated, MAIN_CATEGORY, 0);
    self.store_image(school, key, data, record).await
  }

  // ── generate-gallery-images ───────────────────────────────────────────

  pub async fn generate_gallery_images(&self, req: GalleryRequest) -> Result<BatchSummary> {
    let categories: Vec<String> = match req.categories {
      Some(list) => {
        if let Some(bad) = list.iter().find(|c| !GALLERY_CATEGORIES.contains(&c.as_str())) {
          return Err(Error::BadRequest(format!("unknown gallery category {bad:?}")));
        }
        list
      }
      None => GALLERY_CATEGORIES.iter().map(|c| (*c).to_owned()).collect(),
    };
    let batch = BatchRequest { school_id: req.school_id, limit: req.limit };
    let schools = self.targets(&batch).await?;
    let mut summary =
      BatchSummary::new(schools.len() * categories.len()).with_limit(batch.limit);
    let mut throttle = self.throttle();

    for school in schools {
      let existing: HashSet<String> = match self.images_of(&school).await {
        Ok(images) => images.into_iter().filter_map(|img| img.category).collect(),
        Err(e) => {
          for category in &categories {
            summary.failed(Item::of(&school).category(category), &e);
          }
          continue;
        }
      };

      // The limit counts schools with at least one missing category.
      if categories.iter().any(|c| !existing.contains(c)) && !summary.claim() {
        break;
      }
      for category in &categories {
        let item = Item::of(&school).category(category);
        if existing.contains(category) {
          summary.skipped(item, "category already present");
          continue;
        }
        throttle.wait().await;
        match self.generate_gallery(&school, category).await {
          Ok(img) => summary.processed(item, Some(img.image_url)),
          Err(e) => summary.failed(item, &e),
        }
      }
    }

    summary.log("generate-gallery-images");
    Ok(summary)
  }

  async fn generate_gallery(&self, school: &School, category: &str) -> Result<SchoolImage> {
    let data = self
      .images
      .generate(&prompts::gallery_image(&school.draft, category))
      .await?;
    let key = gallery_key(
      &school.effective_slug(),
      category,
      extension_for(&data.content_type),
    );
    let record = Self::record(school, ImageType::AiGenerated, category, gallery_order(category));
    self.store_image(school, key, data, record).await
  }

  // ── real-migration-to-storage ─────────────────────────────────────────

  /// Copy each school's remote `image` into the bucket as its main image.
  pub async fn real_migration_to_storage(&self, req: BatchRequest) -> Result<BatchSummary> {
    let schools = self.targets(&req).await?;
    let mut summary = BatchSummary::new(schools.len()).with_limit(req.limit);
    let mut throttle = self.throttle();

    for school in schools {
      let Some(remote) = school
        .draft
        .image
        .clone()
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
      else {
        summary.skipped(Item::of(&school), "no remote image");
        continue;
      };
      match self.images_of(&school).await {
        Ok(images) if has_category(&images, MAIN_CATEGORY) => {
          summary.skipped(Item::of(&school), "already has a main image");
          continue;
        }
        Ok(_) => {}
        Err(e) => {
          summary.failed(Item::of(&school), &e);
          continue;
        }
      }
      if !summary.claim() {
        break;
      }

      throttle.wait().await;
      match self.copy_remote(&school, &remote).await {
        Ok(img) => summary.processed(Item::of(&school), Some(img.image_url)),
        Err(e) => summary.failed(Item::of(&school), &e),
      }
    }

    summary.log("real-migration-to-storage");
    Ok(summary)
  }

  async fn copy_remote(&self, school: &School, url: &str) -> Result<SchoolImage> {
    let data = self.fetcher.fetch(url).await?;
    let key = main_key(&school.effective_slug(), extension_for(&data.content_type));
    let record = Self::record(school, ImageType::Real, MAIN_CATEGORY, 0);
    self.store_image(school, key, data, record).await
  }

  // ── uploads ───────────────────────────────────────────────────────────

  /// `upload-school-image`
  pub async fn upload_school_image(
    &self,
    req: UploadRequest,
    default_type: ImageType,
  ) -> Result<SchoolImage> {
    let school = self.resolve(&req.school_id).await?;
    self.upload(&school, req, default_type).await
  }

  /// `upload-school-images`, `upload-new-school-images` (`only_new`) and
  /// `upload-ai-school-images`.
  pub async fn upload_school_images(
    &self,
    batch: UploadBatch,
    default_type: ImageType,
    only_new: bool,
  ) -> Result<BatchSummary> {
    let mut summary = BatchSummary::new(batch.images.len());
    let mut throttle = self.throttle();

    for req in batch.images {
      let category = req.category().to_owned();
      let school = match self.resolve(&req.school_id).await {
        Ok(school) => school,
        Err(e) => {
          summary.failed(Item::unresolved(&req.school_id).category(&category), &e);
          continue;
        }
      };
      let item = Item::of(&school).category(&category);
      if only_new {
        match self.images_of(&school).await {
          Ok(images) if has_category(&images, &category) => {
            summary.skipped(item, "category already present");
            continue;
          }
          Ok(_) => {}
          Err(e) => {
            summary.failed(item, &e);
            continue;
          }
        }
      }

      throttle.wait().await;
      match self.upload(&school, req, default_type).await {
        Ok(img) => summary.processed(item, Some(img.image_url)),
        Err(e) => summary.failed(item, &e),
      }
    }

    summary.log(if only_new { "upload-new-school-images" } else { "upload-school-images" });
    Ok(summary)
  }

  async fn upload(
    &self,
    school: &School,
    req: UploadRequest,
    default_type: ImageType,
  ) -> Result<SchoolImage> {
    let data = match (req.image_base64.as_deref(), req.image_url.as_deref()) {
      (Some(payload), _) => decode_base64_image(payload, req.content_type.as_deref())?,
      (None, Some(url)) => self.fetcher.fetch(url).await?,
      (None, None) => {
        return Err(Error::BadRequest("one of image_url or image_base64 is required".into()));
      }
    };

    let slug = school.effective_slug();
    let ext = extension_for(&data.content_type);
    let category = req.category();
    let (key, order) = if category == MAIN_CATEGORY {
      (main_key(&slug, ext), 0)
    } else if GALLERY_CATEGORIES.contains(&category) {
      (gallery_key(&slug, category, ext), gallery_order(category))
    } else {
      (format!("uploads/{slug}-{}.{ext}", uuid::Uuid::new_v4()), 0)
    };

    let mut record = Self::record(school, req.image_type.unwrap_or(default_type), category, order);
    if let Some(order) = req.display_order {
      record.display_order = order;
    }
    if req.alt_text.is_some() {
      record.alt_text = req.alt_text.clone();
    }
    self.store_image(school, key, data, record).await
  }
}
