//! The static school dataset.
//!
//! Before the persisted store existed this list was the source of truth.
//! It now seeds the store through the `migrate-static-schools` function and
//! serves as demo data in tests.

use crate::{
  image::BundledImages,
  school::{Coordinates, SchoolDraft, SchoolType, Tuition},
};

fn strings(values: &[&str]) -> Vec<String> {
  values.iter().map(|v| (*v).to_owned()).collect()
}

fn tuition(min: f64, max: f64, currency: &str) -> Option<Tuition> {
  Some(Tuition { min, max, currency: currency.to_owned() })
}

/// The six schools of the original dataset, in legacy-id order.
pub fn static_schools() -> Vec<SchoolDraft> {
  let mut basque = SchoolDraft::new(
    "Basque Culinary Center",
    SchoolType::University,
    "spain",
    "San Sebastián",
  );
  basque.legacy_id = Some("1".into());
  basque.description = "Facultad de Ciencias Gastronómicas vinculada a la \
    Universidad de Mondragón, referente en innovación culinaria."
    .into();
  basque.address = Some("Paseo Juan Avelino Barriola 101, 20009 Donostia".into());
  basque.phone = Some("+34 943 574 500".into());
  basque.email = Some("info@bculinary.com".into());
  basque.website = Some("https://www.bculinary.com".into());
  basque.image =
    Some("https://images.unsplash.com/photo-1556910103-1c02745aae4d".into());
  basque.specialties = strings(&["Cocina de vanguardia", "Gastronomía vasca", "Innovación"]);
  basque.languages = strings(&["Español", "Inglés", "Euskera"]);
  basque.accreditation = strings(&["ANECA", "Universidad de Mondragón"]);
  basque.features = strings(&["Laboratorio de I+D", "Restaurante escuela"]);
  basque.programs = strings(&["Grado en Gastronomía y Artes Culinarias", "Máster en Innovación"]);
  basque.founded_year = Some(2009);
  basque.student_count = Some(1200);
  basque.program_count = Some(12);
  basque.rating = 4.8;
  basque.tuition = tuition(10_000.0, 18_000.0, "EUR");
  basque.coordinates = Some(Coordinates { lat: 43.3095, lng: -2.0155 });

  let mut cia = SchoolDraft::new(
    "Culinary Institute of America",
    SchoolType::College,
    "usa",
    "Hyde Park",
  );
  cia.legacy_id = Some("2".into());
  cia.description = "Institución privada de referencia en Estados Unidos, \
    con programas de grado en artes culinarias y repostería."
    .into();
  cia.address = Some("1946 Campus Drive, Hyde Park, NY 12538".into());
  cia.phone = Some("+1 845 452 9600".into());
  cia.website = Some("https://www.ciachef.edu".into());
  cia.image =
    Some("https://images.unsplash.com/photo-1577219491135-ce391730fb2c".into());
  cia.specialties = strings(&["Artes culinarias", "Pastelería", "Gestión de restaurantes"]);
  cia.languages = strings(&["Inglés"]);
  cia.accreditation = strings(&["MSCHE"]);
  cia.features = strings(&["Restaurantes abiertos al público", "Bodega"]);
  cia.programs = strings(&["Bachelor in Culinary Arts", "Associate in Baking"]);
  cia.founded_year = Some(1946);
  cia.student_count = Some(3000);
  cia.program_count = Some(9);
  cia.rating = 4.7;
  cia.tuition = tuition(35_000.0, 40_000.0, "USD");
  cia.coordinates = Some(Coordinates { lat: 41.7456, lng: -73.9332 });

  let mut bocuse = SchoolDraft::new(
    "Institut Paul Bocuse",
    SchoolType::Institute,
    "france",
    "Lyon",
  );
  bocuse.legacy_id = Some("3".into());
  bocuse.description = "Escuela fundada por el chef Paul Bocuse, dedicada \
    a la excelencia en cocina, hostelería y artes de la mesa."
    .into();
  bocuse.address = Some("Château du Vivier, 69130 Écully".into());
  bocuse.website = Some("https://www.institutpaulbocuse.com".into());
  bocuse.image = Some("/placeholder.svg".into());
  bocuse.specialties = strings(&["Cocina francesa", "Hostelería", "Pastelería"]);
  bocuse.languages = strings(&["Francés", "Inglés"]);
  bocuse.accreditation = strings(&["RNCP"]);
  bocuse.features = strings(&["Château histórico", "Restaurante gastronómico"]);
  bocuse.programs = strings(&["Bachelor en Artes Culinarias", "MSc en Hospitality"]);
  bocuse.founded_year = Some(1990);
  bocuse.student_count = Some(1000);
  bocuse.program_count = Some(8);
  bocuse.rating = 4.9;
  bocuse.tuition = tuition(15_000.0, 25_000.0, "EUR");
  bocuse.coordinates = Some(Coordinates { lat: 45.7797, lng: 4.7697 });

  let mut alma = SchoolDraft::new(
    "ALMA - La Scuola Internazionale di Cucina Italiana",
    SchoolType::Academy,
    "italy",
    "Colorno",
  );
  alma.legacy_id = Some("4".into());
  alma.description = "Centro de formación de cocina italiana situado en el \
    Palacio Ducal de Colorno."
    .into();
  alma.website = Some("https://www.alma.scuolacucina.it".into());
  alma.specialties = strings(&["Cocina italiana", "Pastelería", "Sumillería"]);
  alma.languages = strings(&["Italiano", "Inglés"]);
  alma.features = strings(&["Palacio Ducal", "Prácticas en restaurantes"]);
  alma.programs = strings(&["Corso Superiore di Cucina Italiana"]);
  alma.founded_year = Some(2004);
  alma.student_count = Some(800);
  alma.program_count = Some(6);
  alma.rating = 4.6;
  alma.tuition = tuition(12_000.0, 20_000.0, "EUR");
  alma.coordinates = Some(Coordinates { lat: 44.9295, lng: 10.3766 });

  let mut hofmann = SchoolDraft::new(
    "Escuela de Hostelería Hofmann",
    SchoolType::Academy,
    "spain",
    "Barcelona",
  );
  hofmann.legacy_id = Some("5".into());
  hofmann.description = "Escuela fundada por Mey Hofmann con restaurante \
    galardonado y formación profesional en cocina y pastelería."
    .into();
  hofmann.address = Some("Carrer de l'Argenteria 74, 08003 Barcelona".into());
  hofmann.website = Some("https://www.hofmann-bcn.com".into());
  hofmann.image =
    Some("https://images.unsplash.com/photo-1528712306091-ed0763094c98".into());
  hofmann.specialties = strings(&["Cocina mediterránea", "Pastelería"]);
  hofmann.languages = strings(&["Español", "Catalán"]);
  hofmann.features = strings(&["Restaurante con estrella Michelin"]);
  hofmann.programs = strings(&["Curso de cocina profesional"]);
  hofmann.founded_year = Some(1983);
  hofmann.student_count = Some(400);
  hofmann.program_count = Some(5);
  hofmann.rating = 4.5;
  hofmann.tuition = tuition(8_000.0, 14_000.0, "EUR");
  hofmann.coordinates = Some(Coordinates { lat: 41.3841, lng: 2.1815 });

  let mut cordon = SchoolDraft::new(
    "Le Cordon Bleu Paris",
    SchoolType::Institute,
    "france",
    "París",
  );
  cordon.legacy_id = Some("6".into());
  cordon.description = "La escuela de cocina y pastelería francesa más \
    conocida del mundo, fundada en 1895."
    .into();
  cordon.address = Some("13-15 Quai André Citroën, 75015 Paris".into());
  cordon.phone = Some("+33 1 85 65 15 00".into());
  cordon.website = Some("https://www.cordonbleu.edu/paris".into());
  cordon.specialties = strings(&["Cocina francesa", "Pastelería", "Panadería"]);
  cordon.languages = strings(&["Francés", "Inglés"]);
  cordon.accreditation = strings(&["Ministerio de Educación de Francia"]);
  cordon.features = strings(&["Vista al Sena", "Cocinas profesionales"]);
  cordon.programs = strings(&["Grand Diplôme", "Diplôme de Pâtisserie"]);
  cordon.founded_year = Some(1895);
  cordon.student_count = Some(2000);
  cordon.program_count = Some(10);
  cordon.rating = 4.8;
  cordon.tuition = tuition(20_000.0, 50_000.0, "EUR");
  cordon.coordinates = Some(Coordinates { lat: 48.8466, lng: 2.2768 });

  vec![basque, cia, bocuse, alma, hofmann, cordon]
}

/// Images shipped with the frontend, keyed by legacy id.
pub fn bundled_images() -> BundledImages {
  BundledImages::from_iter([
    ("1", "/images/schools/basque-culinary-center.jpg"),
    ("2", "/images/schools/culinary-institute-of-america.jpg"),
    ("6", "/images/schools/le-cordon-bleu-paris.jpg"),
  ])
}
