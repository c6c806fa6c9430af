//! Static translation tables for the two supported locales.
//!
//! Lookups never fail: an unknown key is returned verbatim, so a missing
//! translation shows up as its key instead of an empty string.

use std::{collections::BTreeMap, sync::LazyLock};

use serde::{Deserialize, Serialize};

/// A supported display language.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Locale {
  #[default]
  Es,
  En,
}

impl Locale {
  /// Translate `key` into this locale, falling back to the key itself.
  pub fn t<'a>(&self, key: &'a str) -> &'a str {
    let table: &BTreeMap<&'static str, &'static str> = match self {
      Locale::Es => &ES,
      Locale::En => &EN,
    };
    table.get(key).copied().unwrap_or(key)
  }

  /// The whole table for this locale.
  pub fn table(&self) -> &'static BTreeMap<&'static str, &'static str> {
    match self {
      Locale::Es => &ES,
      Locale::En => &EN,
    }
  }

  /// The locale that is not `self`.
  pub fn other(&self) -> Self {
    match self {
      Locale::Es => Locale::En,
      Locale::En => Locale::Es,
    }
  }
}

static ES: LazyLock<BTreeMap<&'static str, &'static str>> =
  LazyLock::new(|| ES_ENTRIES.iter().copied().collect());

static EN: LazyLock<BTreeMap<&'static str, &'static str>> =
  LazyLock::new(|| EN_ENTRIES.iter().copied().collect());

const ES_ENTRIES: &[(&str, &str)] = &[
  ("site.title", "Escuelas de Cocina"),
  ("site.tagline", "Encuentra la mejor escuela culinaria del mundo"),
  ("nav.home", "Inicio"),
  ("nav.about", "Sobre nosotros"),
  ("nav.contact", "Contacto"),
  ("nav.login", "Iniciar sesión"),
  ("nav.admin", "Administración"),
  ("search.placeholder", "Buscar por nombre, ciudad o país"),
  ("search.results", "Resultados"),
  ("search.empty", "No se encontraron escuelas"),
  ("filter.country", "País"),
  ("filter.type", "Tipo"),
  ("filter.specialty", "Especialidad"),
  ("filter.all", "Todos"),
  ("filter.clear", "Limpiar filtros"),
  ("school.founded", "Fundada en"),
  ("school.students", "Estudiantes"),
  ("school.programs", "Programas"),
  ("school.rating", "Valoración"),
  ("school.tuition", "Matrícula"),
  ("school.contact", "Contacto"),
  ("school.website", "Sitio web"),
  ("school.accreditation", "Acreditaciones"),
  ("school.languages", "Idiomas"),
  ("school.features", "Características"),
  ("school.gallery", "Galería"),
  ("school.not_found", "Escuela no encontrada"),
  ("type.university", "Universidad"),
  ("type.institute", "Instituto"),
  ("type.academy", "Academia"),
  ("type.college", "Escuela superior"),
  ("country.spain", "España"),
  ("country.france", "Francia"),
  ("country.italy", "Italia"),
  ("country.usa", "Estados Unidos"),
  ("country.peru", "Perú"),
  ("country.mexico", "México"),
  ("legal.privacy", "Política de privacidad"),
  ("legal.terms", "Términos y condiciones"),
  ("legal.cookies", "Política de cookies"),
  ("error.generic", "Ha ocurrido un error"),
];

const EN_ENTRIES: &[(&str, &str)] = &[
  ("site.title", "Culinary Schools"),
  ("site.tagline", "Find the best culinary school in the world"),
  ("nav.home", "Home"),
  ("nav.about", "About us"),
  ("nav.contact", "Contact"),
  ("nav.login", "Log in"),
  ("nav.admin", "Admin"),
  ("search.placeholder", "Search by name, city or country"),
  ("search.results", "Results"),
  ("search.empty", "No schools found"),
  ("filter.country", "Country"),
  ("filter.type", "Type"),
  ("filter.specialty", "Specialty"),
  ("filter.all", "All"),
  ("filter.clear", "Clear filters"),
  ("school.founded", "Founded in"),
  ("school.students", "Students"),
  ("school.programs", "Programs"),
  ("school.rating", "Rating"),
  ("school.tuition", "Tuition"),
  ("school.contact", "Contact"),
  ("school.website", "Website"),
  ("school.accreditation", "Accreditations"),
  ("school.languages", "Languages"),
  ("school.features", "Features"),
  ("school.gallery", "Gallery"),
  ("school.not_found", "School not found"),
  ("type.university", "University"),
  ("type.institute", "Institute"),
  ("type.academy", "Academy"),
  ("type.college", "College"),
  ("country.spain", "Spain"),
  ("country.france", "France"),
  ("country.italy", "Italy"),
  ("country.usa", "United States"),
  ("country.peru", "Peru"),
  ("country.mexico", "Mexico"),
  ("legal.privacy", "Privacy policy"),
  ("legal.terms", "Terms and conditions"),
  ("legal.cookies", "Cookie policy"),
  ("error.generic", "Something went wrong"),
];

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn known_keys_translate() {
    assert_eq!(Locale::Es.t("nav.home"), "Inicio");
    assert_eq!(Locale::En.t("nav.home"), "Home");
  }

  #[test]
  fn unknown_key_falls_back_to_key() {
    assert_eq!(Locale::En.t("no.such.key"), "no.such.key");
  }

  #[test]
  fn tables_have_the_same_keys() {
    let es: Vec<_> = Locale::Es.table().keys().collect();
    let en: Vec<_> = Locale::En.table().keys().collect();
    assert_eq!(es, en);
  }

  #[test]
  fn locale_parses_from_lowercase() {
    assert_eq!(Locale::from_str("en").unwrap(), Locale::En);
    assert!(Locale::from_str("fr").is_err());
    assert_eq!(Locale::Es.other(), Locale::En);
  }
}
