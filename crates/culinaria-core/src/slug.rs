//! URL slugs derived from school names.
//!
//! This is the only slug implementation in the workspace. The migration
//! persists its output and the lookup matches against it, so both must agree
//! byte for byte.

use unicode_normalization::UnicodeNormalization as _;

/// Combining diacritical marks stripped after canonical decomposition.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Lowercase, strip accents, collapse every run of characters outside
/// `[a-z0-9]` into a single hyphen and trim hyphens from both ends.
pub fn slugify(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut pending_hyphen = false;

  for c in input
    .to_lowercase()
    .nfd()
    .filter(|c| !COMBINING_MARKS.contains(c))
  {
    if c.is_ascii_lowercase() || c.is_ascii_digit() {
      if pending_hyphen && !out.is_empty() {
        out.push('-');
      }
      pending_hyphen = false;
      out.push(c);
    } else {
      pending_hyphen = true;
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seed;

  #[test]
  fn basic_names() {
    assert_eq!(slugify("Le Cordon Bleu Paris"), "le-cordon-bleu-paris");
    assert_eq!(slugify("Institut Paul Bocuse"), "institut-paul-bocuse");
  }

  #[test]
  fn strips_accents() {
    assert_eq!(
      slugify("Escuela de Hostelería Hofmann"),
      "escuela-de-hosteleria-hofmann"
    );
    assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
    assert_eq!(slugify("ÑANDÚ"), "nandu");
  }

  #[test]
  fn collapses_and_trims_separators() {
    assert_eq!(slugify("  --ALMA -- La Scuola!!  "), "alma-la-scuola");
    assert_eq!(slugify("a&&&b"), "a-b");
    assert_eq!(slugify("!!!"), "");
    assert_eq!(slugify(""), "");
  }

  #[test]
  fn characters_without_decomposition_become_separators() {
    assert_eq!(slugify("Straße"), "stra-e");
    assert_eq!(slugify("Smørrebrød 2024"), "sm-rrebr-d-2024");
  }

  #[test]
  fn idempotent_and_stable() {
    for name in [
      "Le Cordon Bleu Paris",
      "Escuela de Hostelería Hofmann",
      "  weird -- name ",
      "Straße",
    ] {
      let once = slugify(name);
      assert_eq!(slugify(&once), once);
      assert_eq!(slugify(name), once);
    }
  }

  #[test]
  fn seed_names_produce_expected_slugs() {
    let slugs: Vec<String> = seed::static_schools()
      .iter()
      .map(|d| slugify(&d.name))
      .collect();
    assert_eq!(slugs, [
      "basque-culinary-center",
      "culinary-institute-of-america",
      "institut-paul-bocuse",
      "alma-la-scuola-internazionale-di-cucina-italiana",
      "escuela-de-hosteleria-hofmann",
      "le-cordon-bleu-paris",
    ]);
  }
}
