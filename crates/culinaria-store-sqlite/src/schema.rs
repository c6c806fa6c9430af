//! SQL schema for the Culinaria SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One wide row per school. List columns hold JSON arrays of strings;
-- the *_en list columns are NULL until a translation exists.
CREATE TABLE IF NOT EXISTS schools (
    id               TEXT PRIMARY KEY,
    legacy_id        TEXT,
    slug             TEXT,
    name             TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    description_en   TEXT,
    type             TEXT NOT NULL,   -- 'university' | 'institute' | 'academy' | 'college'
    country          TEXT NOT NULL,
    city             TEXT NOT NULL,
    address          TEXT,
    phone            TEXT,
    email            TEXT,
    website          TEXT,
    image            TEXT,
    specialties      TEXT NOT NULL DEFAULT '[]',
    specialties_en   TEXT,
    languages        TEXT NOT NULL DEFAULT '[]',
    languages_en     TEXT,
    accreditation    TEXT NOT NULL DEFAULT '[]',
    accreditation_en TEXT,
    features         TEXT NOT NULL DEFAULT '[]',
    features_en      TEXT,
    programs         TEXT NOT NULL DEFAULT '[]',
    programs_en      TEXT,
    gallery          TEXT NOT NULL DEFAULT '[]',
    founded_year     INTEGER,
    student_count    INTEGER,
    program_count    INTEGER,
    rating           REAL NOT NULL DEFAULT 0 CHECK (rating >= 0 AND rating <= 5),
    tuition_min      REAL,
    tuition_max      REAL,
    tuition_currency TEXT,
    latitude         REAL,
    longitude        REAL,
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at       TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS schools_slug_idx
    ON schools(slug) WHERE slug IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS schools_legacy_idx
    ON schools(legacy_id) WHERE legacy_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS schools_name_idx ON schools(name);

-- school_id holds a slug (older rows) or a UUID (newer rows); there is no
-- foreign key and deleting a school leaves its images behind.
CREATE TABLE IF NOT EXISTS school_images (
    image_id      TEXT PRIMARY KEY,
    school_id     TEXT NOT NULL,
    image_url     TEXT NOT NULL,
    image_type    TEXT NOT NULL DEFAULT 'real',   -- 'real' | 'ai_generated'
    category      TEXT,
    display_order INTEGER NOT NULL DEFAULT 0,
    alt_text      TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS school_images_school_idx ON school_images(school_id);

CREATE TABLE IF NOT EXISTS profiles (
    profile_id    TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_roles (
    profile_id TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    role       TEXT NOT NULL,   -- 'super_admin' | 'admin' | 'user'
    UNIQUE (profile_id)
);

CREATE TABLE IF NOT EXISTS migrations (
    name       TEXT PRIMARY KEY,
    applied_at TEXT NOT NULL,
    summary    TEXT NOT NULL DEFAULT '{}'
);

PRAGMA user_version = 1;
";
