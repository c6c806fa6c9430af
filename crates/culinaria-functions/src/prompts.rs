//! Prompts sent to the text and image models, and parsing of their replies.

use culinaria_core::{
  i18n::Locale,
  school::{ListField, SchoolDraft},
};

use crate::provider::Prompt;

const TRANSLATOR: &str = "You are a professional translator specialised in culinary education. \
  Translate from Spanish to English. Keep proper names, brand names and diploma titles unchanged. \
  Reply with the translation only.";

const WRITER: &str = "You write concise, factual descriptions of culinary schools for a \
  school directory. Never invent statistics, rankings or prices. Reply with the description only.";

pub fn translate_description(spanish: &str) -> Prompt { Prompt::new(TRANSLATOR, spanish) }

pub fn translate_list(field: ListField, values: &[String]) -> Prompt {
  let json = serde_json::to_string(values).unwrap_or_default();
  let user = format!(
    "Translate each item of this JSON array of school {} into English. Reply with a JSON array \
     of strings of exactly the same length and order, and nothing else.\n{json}",
    field.as_ref()
  );
  Prompt::new(TRANSLATOR, user)
}

pub fn describe_school(draft: &SchoolDraft, language: Locale) -> Prompt {
  let mut facts = vec![
    format!("Name: {}", draft.name),
    format!("Type: {}", draft.school_type),
    format!("Location: {}, {}", draft.city, Locale::En.t(&format!("country.{}", draft.country))),
  ];
  if let Some(year) = draft.founded_year {
    facts.push(format!("Founded: {year}"));
  }
  for field in [ListField::Specialties, ListField::Programs, ListField::Features] {
    let values = field.values(draft);
    if !values.is_empty() {
      facts.push(format!("{}: {}", field.as_ref(), values.join(", ")));
    }
  }
  let language = match language {
    Locale::Es => "Spanish",
    Locale::En => "English",
  };
  let user = format!(
    "Write a two or three sentence description in {language} of this school.\n{}",
    facts.join("\n")
  );
  let mut prompt = Prompt::new(WRITER, user);
  prompt.temperature = 0.7;
  prompt
}

pub fn main_image(draft: &SchoolDraft) -> String {
  format!(
    "Professional architectural photograph of the main building of {}, a culinary {} in {}. \
     Natural daylight, no text, no people in the foreground.",
    draft.name, draft.school_type, draft.city
  )
}

pub fn gallery_image(draft: &SchoolDraft, category: &str) -> String {
  let scene = match category {
    "kitchen" => "a professional teaching kitchen with stainless steel stations",
    "classroom" => "a culinary classroom during a demonstration lesson",
    "dining" => "the school's training restaurant dining room, tables set for service",
    _ => "the campus grounds and exterior",
  };
  format!(
    "Realistic photograph of {scene} at {}, a culinary school in {}. No text, no logos.",
    draft.name, draft.city
  )
}

/// Extract a JSON array of strings from a model reply, tolerating code
/// fences and surrounding prose.
pub fn parse_string_array(reply: &str) -> Option<Vec<String>> {
  let start = reply.find('[')?;
  let end = reply.rfind(']')?;
  if end < start {
    return None;
  }
  let values: Vec<String> = serde_json::from_str(&reply[start..=end]).ok()?;
  Some(values.into_iter().map(|v| v.trim().to_owned()).collect())
}

#[cfg(test)]
mod tests {
  use culinaria_core::school::SchoolType;

  use super::*;

  #[test]
  fn parses_fenced_arrays() {
    let reply = "Sure:\n```json\n[\"Pastry\", \" Baking \"]\n```";
    assert_eq!(parse_string_array(reply), Some(vec!["Pastry".into(), "Baking".into()]));
    assert_eq!(parse_string_array("no array here"), None);
    assert_eq!(parse_string_array("] backwards ["), None);
    assert_eq!(parse_string_array("[1, 2]"), None);
  }

  #[test]
  fn description_prompt_carries_known_facts_only() {
    let mut d = SchoolDraft::new("Hofmann", SchoolType::Academy, "spain", "Barcelona");
    d.founded_year = Some(1983);
    d.specialties = vec!["Pastelería".into()];
    let p = describe_school(&d, Locale::En);
    assert!(p.user.contains("in English"));
    assert!(p.user.contains("Barcelona, Spain"));
    assert!(p.user.contains("Founded: 1983"));
    assert!(p.user.contains("specialties: Pastelería"));
    assert!(!p.user.contains("programs"));
  }
}
