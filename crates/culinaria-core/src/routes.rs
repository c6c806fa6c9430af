//! The bilingual client route table.
//!
//! Every public page exists once per locale under a translated path. This
//! table drives sitemap alternates and the language switcher.

use serde::Serialize;

use crate::i18n::Locale;

/// A client page, independent of locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
  Home,
  /// Detail page addressed by public id.
  School(String),
  /// Detail page addressed by slug.
  SchoolSlug(String),
  About,
  Contact,
  Privacy,
  Terms,
  Cookies,
  Login,
  Admin,
  AdminSetup,
  AdminSchools,
  AdminSchoolEdit(String),
  ImageManager,
}

/// (page, es segment, en segment) for pages without parameters.
const STATIC_PAGES: &[(&str, &str, &str)] = &[
  ("about", "/sobre-nosotros", "/about-us"),
  ("contact", "/contacto", "/contact"),
  ("privacy", "/privacidad", "/privacy"),
  ("terms", "/terminos", "/terms"),
  ("cookies", "/politica-cookies", "/cookie-policy"),
  ("login", "/auth", "/login"),
];

fn static_path(key: &str, locale: Locale) -> &'static str {
  STATIC_PAGES
    .iter()
    .find(|(k, _, _)| *k == key)
    .map(|(_, es, en)| match locale {
      Locale::Es => *es,
      Locale::En => *en,
    })
    .unwrap_or("/")
}

fn school_segment(locale: Locale) -> &'static str {
  match locale {
    Locale::Es => "/escuela",
    Locale::En => "/school",
  }
}

impl Page {
  /// The path of this page in `locale`.
  pub fn path(&self, locale: Locale) -> String {
    match self {
      Page::Home => "/".to_owned(),
      Page::School(id) => format!("{}/{id}", school_segment(locale)),
      Page::SchoolSlug(slug) => format!("{}/slug/{slug}", school_segment(locale)),
      Page::About => static_path("about", locale).to_owned(),
      Page::Contact => static_path("contact", locale).to_owned(),
      Page::Privacy => static_path("privacy", locale).to_owned(),
      Page::Terms => static_path("terms", locale).to_owned(),
      Page::Cookies => static_path("cookies", locale).to_owned(),
      Page::Login => static_path("login", locale).to_owned(),
      Page::Admin => "/admin".to_owned(),
      Page::AdminSetup => "/admin/setup".to_owned(),
      Page::AdminSchools => "/admin/schools".to_owned(),
      Page::AdminSchoolEdit(id) => format!("/admin/schools/edit/{id}"),
      Page::ImageManager => "/image-manager".to_owned(),
    }
  }

  /// Recognise a client path. Locale-neutral pages report [`Locale::Es`].
  /// Unknown paths return `None` (the client renders its 404 page).
  pub fn parse(path: &str) -> Option<(Page, Locale)> {
    let path = match path.trim_end_matches('/') {
      "" => "/",
      p => p,
    };

    if path == "/" {
      return Some((Page::Home, Locale::Es));
    }
    for (key, es, en) in STATIC_PAGES {
      let locale = if path == *es {
        Locale::Es
      } else if path == *en {
        Locale::En
      } else {
        continue;
      };
      let page = match *key {
        "about" => Page::About,
        "contact" => Page::Contact,
        "privacy" => Page::Privacy,
        "terms" => Page::Terms,
        "cookies" => Page::Cookies,
        _ => Page::Login,
      };
      return Some((page, locale));
    }
    for locale in [Locale::Es, Locale::En] {
      if let Some(rest) = path.strip_prefix(school_segment(locale)).and_then(|r| r.strip_prefix('/')) {
        if let Some(slug) = rest.strip_prefix("slug/") {
          return (!slug.is_empty() && !slug.contains('/'))
            .then(|| (Page::SchoolSlug(slug.to_owned()), locale));
        }
        return (!rest.is_empty() && !rest.contains('/'))
          .then(|| (Page::School(rest.to_owned()), locale));
      }
    }
    let page = match path {
      "/admin" => Page::Admin,
      "/admin/setup" => Page::AdminSetup,
      "/admin/schools" => Page::AdminSchools,
      "/image-manager" => Page::ImageManager,
      other => {
        let id = other.strip_prefix("/admin/schools/edit/")?;
        if id.is_empty() || id.contains('/') {
          return None;
        }
        Page::AdminSchoolEdit(id.to_owned())
      }
    };
    Some((page, Locale::Es))
  }

  /// Pages listed in the sitemap (everything public without parameters).
  pub fn public_static() -> [Page; 7] {
    [
      Page::Home,
      Page::About,
      Page::Contact,
      Page::Privacy,
      Page::Terms,
      Page::Cookies,
      Page::Login,
    ]
  }
}

/// Translate a client path into the other language, if it is known.
pub fn switch_locale(path: &str, to: Locale) -> Option<String> {
  Page::parse(path).map(|(page, _)| page.path(to))
}

/// One row of the exported route table.
#[derive(Debug, Clone, Serialize)]
pub struct RouteEntry {
  pub page:      &'static str,
  pub path:      String,
  pub alternate: String,
}

/// The parameterless routes for `locale`, each with its translation.
pub fn route_table(locale: Locale) -> Vec<RouteEntry> {
  let names = ["home", "about", "contact", "privacy", "terms", "cookies", "login"];
  Page::public_static()
    .into_iter()
    .zip(names)
    .map(|(page, name)| RouteEntry {
      page:      name,
      path:      page.path(locale),
      alternate: page.path(locale.other()),
    })
    .collect()
}
