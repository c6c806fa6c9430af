//! Text functions: English translations and generated descriptions.

use culinaria_core::{
  i18n::Locale,
  school::{ListField, School},
  store::SchoolStore,
};
use serde::Deserialize;
use strum::IntoEnumIterator as _;

use crate::{
  BatchRequest, Functions,
  error::{Error, Result},
  prompts,
  provider::ProviderError,
  summary::{BatchSummary, Item},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionAction {
  /// Only fill empty descriptions.
  #[default]
  Generate,
  /// Overwrite whatever is there.
  Regenerate,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DescriptionRequest {
  pub action:    DescriptionAction,
  pub language:  Locale,
  pub school_id: Option<String>,
  pub limit:     Option<usize>,
}

fn empty_reply() -> Error { ProviderError::InvalidResponse("empty reply".into()).into() }

impl<S: SchoolStore> Functions<S> {
  // ── generate-english-descriptions ─────────────────────────────────────

  pub async fn generate_english_descriptions(&self, req: BatchRequest) -> Result<BatchSummary> {
    let schools = self.targets(&req).await?;
    let mut summary = BatchSummary::new(schools.len()).with_limit(req.limit);
    let mut throttle = self.throttle();

    for school in schools {
      if school.draft.has_english_description() {
        summary.skipped(Item::of(&school), "already has an English description");
        continue;
      }
      if school.draft.description.trim().is_empty() {
        summary.skipped(Item::of(&school), "no Spanish description to translate");
        continue;
      }
      if !summary.claim() {
        break;
      }
      throttle.wait().await;
      match self.translate_description(&school).await {
        Ok(()) => summary.processed(Item::of(&school), None),
        Err(e) => summary.failed(Item::of(&school), &e),
      }
    }

    summary.log("generate-english-descriptions");
    Ok(summary)
  }

  async fn translate_description(&self, school: &School) -> Result<()> {
    let english = self
      .text
      .complete(prompts::translate_description(&school.draft.description))
      .await?;
    if english.is_empty() {
      return Err(empty_reply());
    }
    let mut draft = school.draft.clone();
    draft.description_en = Some(english);
    self.save(school, draft).await?;
    Ok(())
  }

  // ── generate-english-fields ───────────────────────────────────────────

  /// Translate every list field that has Spanish values but no English
  /// counterpart. Fields translated before a failure are still saved.
  pub async fn generate_english_fields(&self, req: BatchRequest) -> Result<BatchSummary> {
    let schools = self.targets(&req).await?;
    let mut summary = BatchSummary::new(schools.len()).with_limit(req.limit);
    let mut throttle = self.throttle();

    for school in schools {
      let pending: Vec<ListField> =
        ListField::iter().filter(|f| f.needs_english(&school.draft)).collect();
      if pending.is_empty() {
        summary.skipped(Item::of(&school), "every list field already translated");
        continue;
      }
      if !summary.claim() {
        break;
      }

      let mut draft = school.draft.clone();
      let mut done: Vec<String> = Vec::new();
      let mut failure: Option<Error> = None;
      for field in pending {
        throttle.wait().await;
        match self.translate_list(field, field.values(&draft).to_vec()).await {
          Ok(values) => {
            field.set_english(&mut draft, values);
            done.push(field.as_ref().to_owned());
          }
          Err(e) => {
            failure = Some(e);
            break;
          }
        }
      }

      let saved = if done.is_empty() {
        Ok(())
      } else {
        self.save(&school, draft).await.map(|_| ())
      };
      match failure.map_or(saved, Err) {
        Ok(()) => summary.processed(Item::of(&school), Some(done.join(", "))),
        Err(e) => summary.failed(Item::of(&school), &e),
      }
    }

    summary.log("generate-english-fields");
    Ok(summary)
  }

  async fn translate_list(&self, field: ListField, values: Vec<String>) -> Result<Vec<String>> {
    let reply = self.text.complete(prompts::translate_list(field, &values)).await?;
    let english = prompts::parse_string_array(&reply).ok_or_else(|| {
      Error::from(ProviderError::InvalidResponse(format!(
        "{} reply is not a JSON array of strings",
        field.as_ref()
      )))
    })?;
    if english.len() != values.len() {
      return Err(
        ProviderError::InvalidResponse(format!(
          "{}: expected {} items, got {}",
          field.as_ref(),
          values.len(),
          english.len()
        ))
        .into(),
      );
    }
    Ok(english)
  }

  // ── generate-school-descriptions ──────────────────────────────────────

  pub async fn generate_school_descriptions(
    &self,
    req: DescriptionRequest,
  ) -> Result<BatchSummary> {
    let batch = BatchRequest { school_id: req.school_id.clone(), limit: req.limit };
    let schools = self.targets(&batch).await?;
    let mut summary = BatchSummary::new(schools.len()).with_limit(req.limit);
    let mut throttle = self.throttle();

    for school in schools {
      let current = match req.language {
        Locale::Es => Some(school.draft.description.as_str()),
        Locale::En => school.draft.description_en.as_deref(),
      };
      let filled = current.is_some_and(|d| !d.trim().is_empty());
      if req.action == DescriptionAction::Generate && filled {
        summary.skipped(Item::of(&school), "description already present");
        continue;
      }
      if !summary.claim() {
        break;
      }
      throttle.wait().await;
      match self.write_description(&school, req.language).await {
        Ok(()) => summary.processed(Item::of(&school), Some(req.language.to_string())),
        Err(e) => summary.failed(Item::of(&school), &e),
      }
    }

    summary.log("generate-school-descriptions");
    Ok(summary)
  }

  async fn write_description(&self, school: &School, language: Locale) -> Result<()> {
    let text = self
      .text
      .complete(prompts::describe_school(&school.draft, language))
      .await?;
    if text.is_empty() {
      return Err(empty_reply());
    }
    let mut draft = school.draft.clone();
    match language {
      Locale::Es => draft.description = text,
      Locale::En => draft.description_en = Some(text),
    }
    self.save(school, draft).await?;
    Ok(())
  }
}
