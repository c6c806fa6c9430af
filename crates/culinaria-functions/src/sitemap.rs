//! XML sitemap with `hreflang` alternates.
//!
//! Every public page is listed once per locale; each `<url>` links to both
//! language versions plus an `x-default` pointing at the Spanish one.

use std::io::Cursor;

use culinaria_core::{i18n::Locale, routes::Page, school::School};
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::{Error, Result};

const NS_SITEMAP: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const NS_XHTML: &str = "http://www.w3.org/1999/xhtml";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Render the sitemap for `schools` (callers pass active schools only).
pub fn build_sitemap(site_url: &str, schools: &[School]) -> Result<String> {
  let base = site_url.trim_end_matches('/');
  let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

  emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
  let mut urlset = BytesStart::new("urlset");
  urlset.push_attribute(("xmlns", NS_SITEMAP));
  urlset.push_attribute(("xmlns:xhtml", NS_XHTML));
  emit(&mut w, Event::Start(urlset))?;

  for page in Page::public_static() {
    let priority = if page == Page::Home { "1.0" } else { "0.5" };
    write_page(&mut w, base, &page, None, priority)?;
  }
  for school in schools {
    let lastmod = school.updated_at.format("%Y-%m-%d").to_string();
    write_page(&mut w, base, &Page::School(school.public_id()), Some(&lastmod), "0.8")?;
  }

  write_end(&mut w, "urlset")?;
  String::from_utf8(w.into_inner().into_inner()).map_err(|e| Error::Sitemap(e.to_string()))
}

/// One `<url>` per locale, each carrying the full set of alternates.
fn write_page(
  w: &mut XmlWriter,
  base: &str,
  page: &Page,
  lastmod: Option<&str>,
  priority: &str,
) -> Result<()> {
  let href = |locale: Locale| format!("{base}{}", page.path(locale));
  for locale in [Locale::Es, Locale::En] {
    write_start(w, "url")?;
    write_text_elem(w, "loc", &href(locale))?;
    if let Some(lastmod) = lastmod {
      write_text_elem(w, "lastmod", lastmod)?;
    }
    write_text_elem(w, "priority", priority)?;
    for alt in [Locale::Es, Locale::En] {
      write_alternate(w, alt.as_ref(), &href(alt))?;
    }
    write_alternate(w, "x-default", &href(Locale::Es))?;
    write_end(w, "url")?;
  }
  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn emit(w: &mut XmlWriter, event: Event<'_>) -> Result<()> {
  w.write_event(event).map_err(|e| Error::Sitemap(e.to_string()))
}

fn write_start(w: &mut XmlWriter, tag: &str) -> Result<()> {
  emit(w, Event::Start(BytesStart::new(tag)))
}

fn write_end(w: &mut XmlWriter, tag: &str) -> Result<()> {
  emit(w, Event::End(BytesEnd::new(tag)))
}

fn write_text_elem(w: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
  write_start(w, tag)?;
  emit(w, Event::Text(BytesText::new(text)))?;
  write_end(w, tag)
}

fn write_alternate(w: &mut XmlWriter, hreflang: &str, href: &str) -> Result<()> {
  let mut el = BytesStart::new("xhtml:link");
  el.push_attribute(("rel", "alternate"));
  el.push_attribute(("hreflang", hreflang));
  el.push_attribute(("href", href));
  emit(w, Event::Empty(el))
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use culinaria_core::school::{SchoolDraft, SchoolType};
  use uuid::Uuid;

  use super::*;

  fn school(legacy_id: &str, name: &str) -> School {
    let mut draft = SchoolDraft::new(name, SchoolType::Institute, "france", "Paris");
    draft.legacy_id = Some(legacy_id.into());
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    School { id: Uuid::new_v4(), draft, created_at: ts, updated_at: ts }
  }

  #[test]
  fn every_school_has_both_hreflang_alternates() {
    let xml = build_sitemap("https://culinaria.example/", &[school("6", "Le Cordon Bleu Paris")])
      .unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<loc>https://culinaria.example/escuela/6</loc>"));
    assert!(xml.contains("<loc>https://culinaria.example/school/6</loc>"));
    assert!(xml.contains(
      r#"<xhtml:link rel="alternate" hreflang="es" href="https://culinaria.example/escuela/6"/>"#
    ));
    assert!(xml.contains(
      r#"<xhtml:link rel="alternate" hreflang="en" href="https://culinaria.example/school/6"/>"#
    ));
    assert!(xml.contains("<lastmod>2024-05-01</lastmod>"));
  }

  #[test]
  fn static_pages_are_listed_in_both_languages() {
    let xml = build_sitemap("https://culinaria.example", &[]).unwrap();
    assert!(xml.contains("<loc>https://culinaria.example/sobre-nosotros</loc>"));
    assert!(xml.contains("<loc>https://culinaria.example/about-us</loc>"));
    assert!(xml.contains(
      r#"hreflang="x-default" href="https://culinaria.example/politica-cookies""#
    ));
    assert_eq!(xml.matches("<url>").count(), Page::public_static().len() * 2);
  }
}
