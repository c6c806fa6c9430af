//! Admin profiles and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  SuperAdmin,
  Admin,
  User,
}

impl Role {
  /// May use the admin panel and maintenance functions.
  pub fn is_admin(&self) -> bool { matches!(self, Role::SuperAdmin | Role::Admin) }
}

/// A row of `profiles` joined with its `user_roles` entry.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
  pub profile_id:    Uuid,
  pub username:      String,
  /// argon2 PHC string; never serialised.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role:          Role,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::SchoolStore::add_profile`].
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub username:      String,
  pub password_hash: String,
  pub role:          Role,
}
