//! The object bucket images are uploaded to.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

/// Key of a school's main image.
pub fn main_key(slug: &str, ext: &str) -> String { format!("{slug}.{ext}") }

/// Key of a gallery image.
pub fn gallery_key(slug: &str, category: &str, ext: &str) -> String {
  format!("gallery/{slug}-{category}.{ext}")
}

/// File extension for an image MIME type.
pub fn extension_for(content_type: &str) -> &'static str {
  match content_type {
    "image/png" => "png",
    "image/webp" => "webp",
    "image/gif" => "gif",
    "image/svg+xml" => "svg",
    "image/avif" => "avif",
    _ => "jpg",
  }
}

#[async_trait]
pub trait Bucket: Send + Sync {
  /// Store `bytes` under `key`, overwriting, and return the public URL.
  async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> std::io::Result<String>;

  fn public_url(&self, key: &str) -> String;
}

/// A bucket backed by a local directory, served by the server under a
/// public URL prefix.
#[derive(Debug, Clone)]
pub struct FsBucket {
  root:       PathBuf,
  public_url: String,
}

impl FsBucket {
  pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
    Self { root: root.into(), public_url: public_url.into() }
  }

  pub fn root(&self) -> &Path { &self.root }

  fn path_for(&self, key: &str) -> std::io::Result<PathBuf> {
    let rel = Path::new(key);
    let clean = !key.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
    if !clean {
      return Err(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("invalid object key {key:?}"),
      ));
    }
    Ok(self.root.join(rel))
  }
}

#[async_trait]
impl Bucket for FsBucket {
  async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> std::io::Result<String> {
    let path = self.path_for(key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &bytes).await?;
    tracing::debug!(%key, %content_type, size = bytes.len(), "object stored");
    Ok(self.public_url(key))
  }

  fn public_url(&self, key: &str) -> String {
    format!("{}/{key}", self.public_url.trim_end_matches('/'))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scratch() -> FsBucket {
    let dir = std::env::temp_dir().join(format!("culinaria-bucket-{}", uuid::Uuid::new_v4()));
    FsBucket::new(dir, "http://localhost:8080/storage/")
  }

  #[test]
  fn keys_follow_the_layout() {
    assert_eq!(main_key("le-cordon-bleu-paris", "png"), "le-cordon-bleu-paris.png");
    assert_eq!(gallery_key("alma", "kitchen", "jpg"), "gallery/alma-kitchen.jpg");
    assert_eq!(extension_for("image/webp"), "webp");
    assert_eq!(extension_for("application/octet-stream"), "jpg");
  }

  #[tokio::test]
  async fn put_writes_nested_keys_and_returns_public_url() {
    let bucket = scratch();
    let url = bucket
      .put("gallery/alma-kitchen.png", Bytes::from_static(b"png"), "image/png")
      .await
      .unwrap();
    assert_eq!(url, "http://localhost:8080/storage/gallery/alma-kitchen.png");

    let written = tokio::fs::read(bucket.root().join("gallery/alma-kitchen.png")).await.unwrap();
    assert_eq!(written, b"png");
    tokio::fs::remove_dir_all(bucket.root()).await.unwrap();
  }

  #[tokio::test]
  async fn traversal_keys_are_rejected() {
    let bucket = scratch();
    for key in ["../escape.png", "/etc/passwd", ""] {
      let err = bucket.put(key, Bytes::new(), "image/png").await.unwrap_err();
      assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput, "{key}");
    }
  }
}
