//! Integration tests for `SqliteStore` against an in-memory database.

use culinaria_core::{
  image::{ImageType, NewSchoolImage},
  lookup::{LookupStrategy, resolve_school},
  profile::{NewProfile, Role},
  school::{SchoolDraft, SchoolKey, SchoolType, Scope},
  seed,
  store::{SchoolQuery, SchoolStore, Upsert},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seeded() -> SqliteStore {
  let s = store().await;
  for draft in seed::static_schools() {
    s.upsert_school(draft).await.unwrap();
  }
  s
}

fn draft(name: &str) -> SchoolDraft {
  SchoolDraft::new(name, SchoolType::Academy, "spain", "Madrid")
}

// ─── Schools ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_school() {
  let s = store().await;
  let mut d = draft("Escuela Madrid");
  d.specialties = vec!["Cocina".into()];
  d.specialties_en = Some(vec!["Cooking".into()]);

  let school = s.insert_school(d.clone()).await.unwrap();
  let fetched = s.get_school(school.id, Scope::Active).await.unwrap().unwrap();
  assert_eq!(fetched.draft, d);
  assert_eq!(fetched.created_at, school.created_at);
}

#[tokio::test]
async fn get_school_missing_returns_none() {
  let s = store().await;
  assert!(s.get_school(Uuid::new_v4(), Scope::All).await.unwrap().is_none());
}

#[tokio::test]
async fn insert_rejects_invalid_draft() {
  let s = store().await;
  let mut d = draft("Escuela");
  d.rating = 7.0;
  assert!(matches!(s.insert_school(d).await, Err(Error::Core(_))));
  assert!(matches!(s.insert_school(draft("  ")).await, Err(Error::Core(_))));
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
  let s = store().await;
  let mut a = draft("A");
  a.slug = Some("same".into());
  let mut b = draft("B");
  b.slug = Some("same".into());

  s.insert_school(a).await.unwrap();
  let err = s.insert_school(b).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn inactive_schools_are_hidden_from_active_reads() {
  let s = store().await;
  let mut d = draft("Oculta");
  d.is_active = false;
  d.legacy_id = Some("99".into());
  let school = s.insert_school(d).await.unwrap();

  assert!(s.get_school(school.id, Scope::Active).await.unwrap().is_none());
  assert!(s.find_by_legacy_id("99", Scope::Active).await.unwrap().is_none());
  assert!(s.get_school(school.id, Scope::All).await.unwrap().is_some());
  assert!(s.all_schools(Scope::Active).await.unwrap().is_empty());
  assert_eq!(s.all_schools(Scope::All).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_identity() {
  let s = seeded().await;
  let key = SchoolKey::LegacyId("6".into());
  let before = s.find_by_key(&key, Scope::All).await.unwrap().unwrap();

  let mut d = before.draft.clone();
  d.legacy_id = None;
  d.city = "Paris".into();
  d.rating = 4.9;
  let after = s.update_school(&key, d).await.unwrap().unwrap();

  assert_eq!(after.id, before.id);
  assert_eq!(after.created_at, before.created_at);
  assert!(after.updated_at >= before.updated_at);
  assert_eq!(after.draft.city, "Paris");
  assert_eq!(after.draft.legacy_id.as_deref(), Some("6"));
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let key = SchoolKey::Id(Uuid::new_v4());
  assert!(s.update_school(&key, draft("X")).await.unwrap().is_none());
}

#[tokio::test]
async fn toggle_and_delete() {
  let s = seeded().await;
  let key = SchoolKey::LegacyId("3".into());

  let off = s.toggle_active(&key).await.unwrap().unwrap();
  assert!(!off.draft.is_active);
  assert_eq!(s.all_schools(Scope::Active).await.unwrap().len(), 5);

  let on = s.toggle_active(&key).await.unwrap().unwrap();
  assert!(on.draft.is_active);

  assert!(s.delete_school(&key).await.unwrap());
  assert!(!s.delete_school(&key).await.unwrap());
  assert_eq!(s.all_schools(Scope::All).await.unwrap().len(), 5);
}

#[tokio::test]
async fn upsert_by_legacy_id_is_idempotent() {
  let s = store().await;
  for draft in seed::static_schools() {
    let (_, outcome) = s.upsert_school(draft).await.unwrap();
    assert_eq!(outcome, Upsert::Inserted);
  }
  let first: Vec<Uuid> =
    s.all_schools(Scope::All).await.unwrap().iter().map(|x| x.id).collect();

  for draft in seed::static_schools() {
    let (_, outcome) = s.upsert_school(draft).await.unwrap();
    assert_eq!(outcome, Upsert::Updated);
  }
  let second: Vec<Uuid> =
    s.all_schools(Scope::All).await.unwrap().iter().map(|x| x.id).collect();

  assert_eq!(first.len(), 6);
  assert_eq!(first, second);
}

#[tokio::test]
async fn list_schools_pages_and_searches() {
  let s = seeded().await;

  let q = SchoolQuery { page: Some(1), page_size: Some(4), ..Default::default() };
  let page = s.list_schools(&q).await.unwrap();
  assert_eq!(page.total, 6);
  assert_eq!(page.items.len(), 4);
  assert_eq!(page.items[0].name(), "ALMA - La Scuola Internazionale di Cucina Italiana");

  let q = SchoolQuery { page: Some(2), page_size: Some(4), ..Default::default() };
  assert_eq!(s.list_schools(&q).await.unwrap().items.len(), 2);

  let q = SchoolQuery { search: Some("FRANCE".into()), ..Default::default() };
  let page = s.list_schools(&q).await.unwrap();
  assert_eq!(page.total, 2);
}

#[tokio::test]
async fn list_schools_past_the_end_is_empty() {
  let s = seeded().await;
  let q = SchoolQuery { page: Some(usize::MAX), page_size: Some(100), ..Default::default() };
  let page = s.list_schools(&q).await.unwrap();
  assert_eq!(page.total, 6);
  assert!(page.items.is_empty());
  assert_eq!(page.page, usize::MAX);
}

#[tokio::test]
async fn search_wildcards_match_literally() {
  let s = seeded().await;
  s.insert_school(draft("100% Cocina")).await.unwrap();

  let q = SchoolQuery { search: Some("%".into()), ..Default::default() };
  let page = s.list_schools(&q).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].name(), "100% Cocina");

  let q = SchoolQuery { search: Some("_".into()), ..Default::default() };
  assert_eq!(s.list_schools(&q).await.unwrap().total, 0);
}

#[tokio::test]
async fn malformed_list_column_is_reported() {
  let s = seeded().await;
  s.execute_raw("UPDATE schools SET languages = 'Inglés, Francés' WHERE legacy_id = '6'")
    .await
    .unwrap();

  let err = s.find_by_legacy_id("6", Scope::All).await.unwrap_err();
  assert!(
    matches!(err, Error::MalformedList { column: "languages", .. }),
    "{err:?}"
  );
}

// ─── Lookup against the real backend ─────────────────────────────────────────

#[tokio::test]
async fn legacy_id_six_resolves_to_le_cordon_bleu() {
  let s = seeded().await;
  let hit = resolve_school(&s, "6").await.unwrap().unwrap();
  assert_eq!(hit.school.name(), "Le Cordon Bleu Paris");
  assert_eq!(hit.strategy, LookupStrategy::ByLegacyId);
}

#[tokio::test]
async fn slug_without_stored_slug_resolves_by_name() {
  let s = seeded().await;
  let hit = resolve_school(&s, "le-cordon-bleu-paris").await.unwrap().unwrap();
  assert_eq!(hit.school.draft.legacy_id.as_deref(), Some("6"));
  assert_eq!(hit.strategy, LookupStrategy::ByComputedSlug);
}

#[tokio::test]
async fn stored_slug_and_uuid_resolve() {
  let s = seeded().await;
  let key = SchoolKey::LegacyId("3".into());
  let mut d = s.find_by_key(&key, Scope::All).await.unwrap().unwrap().draft;
  d.slug = Some("paul-bocuse".into());
  let school = s.update_school(&key, d).await.unwrap().unwrap();

  let hit = resolve_school(&s, "paul-bocuse").await.unwrap().unwrap();
  assert_eq!(hit.strategy, LookupStrategy::BySlugColumn);

  let hit = resolve_school(&s, &school.id.to_string()).await.unwrap().unwrap();
  assert_eq!(hit.strategy, LookupStrategy::ByPrimaryKey);

  assert!(resolve_school(&s, "no-such-school").await.unwrap().is_none());
}

// ─── Images ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn images_are_matched_by_any_key_and_ordered() {
  let s = store().await;
  let image = |school_id: &str, order: i32| NewSchoolImage {
    school_id:     school_id.into(),
    image_url:     format!("https://bucket/{school_id}-{order}.jpg"),
    image_type:    ImageType::AiGenerated,
    category:      Some("main".into()),
    display_order: order,
    alt_text:      None,
  };
  s.add_image(image("le-cordon-bleu-paris", 2)).await.unwrap();
  s.add_image(image("6", 1)).await.unwrap();
  s.add_image(image("other", 0)).await.unwrap();

  let keys = vec!["le-cordon-bleu-paris".to_string(), "6".to_string()];
  let rows = s.images_for(&keys).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].school_id, "6");
  assert_eq!(rows[1].image_type, ImageType::AiGenerated);

  assert!(s.images_for(&[]).await.unwrap().is_empty());
}

// ─── Profiles and migrations ─────────────────────────────────────────────────

#[tokio::test]
async fn profiles_roundtrip_and_count() {
  let s = store().await;
  assert_eq!(s.count_profiles(Role::SuperAdmin).await.unwrap(), 0);

  let p = s
    .add_profile(NewProfile {
      username:      "chef".into(),
      password_hash: "$argon2id$fake".into(),
      role:          Role::SuperAdmin,
    })
    .await
    .unwrap();

  let found = s.find_profile("chef").await.unwrap().unwrap();
  assert_eq!(found.profile_id, p.profile_id);
  assert_eq!(found.role, Role::SuperAdmin);
  assert_eq!(s.count_profiles(Role::SuperAdmin).await.unwrap(), 1);
  assert!(s.find_profile("nobody").await.unwrap().is_none());

  let dup = s
    .add_profile(NewProfile {
      username:      "chef".into(),
      password_hash: "x".into(),
      role:          Role::Admin,
    })
    .await;
  assert!(matches!(dup, Err(Error::Conflict(_))));
  assert_eq!(s.count_profiles(Role::Admin).await.unwrap(), 0);
}

#[tokio::test]
async fn migrations_are_recorded() {
  let s = store().await;
  assert!(s.migration("migrate-static-schools").await.unwrap().is_none());

  s.record_migration("migrate-static-schools", serde_json::json!({ "processed": 6 }))
    .await
    .unwrap();
  let rec = s.migration("migrate-static-schools").await.unwrap().unwrap();
  assert_eq!(rec.summary["processed"], 6);
}
