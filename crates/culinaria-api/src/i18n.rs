//! Handlers for `/i18n` and `/routes`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/i18n/:locale` | Whole translation table, `es` or `en` |
//! | `GET`  | `/routes/:locale` | Route table with the alternate-language path |

use std::collections::BTreeMap;

use axum::{Json, extract::Path};
use culinaria_core::{
  i18n::Locale,
  routes::{RouteEntry, route_table},
};

/// `GET /i18n/:locale`
pub async fn translations(
  Path(locale): Path<Locale>,
) -> Json<&'static BTreeMap<&'static str, &'static str>> {
  Json(locale.table())
}

/// `GET /routes/:locale`
pub async fn routes(Path(locale): Path<Locale>) -> Json<Vec<RouteEntry>> {
  Json(route_table(locale))
}
