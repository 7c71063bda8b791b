//! SQL schema for the Somni SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- One row per directed follower -> followed pair. The UNIQUE constraint is
-- the source of truth for deduplication; service-level existence checks are
-- advisory only.
CREATE TABLE IF NOT EXISTS follows (
    edge_id          TEXT PRIMARY KEY,
    follower_id      TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    followed_user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at       TEXT NOT NULL,
    UNIQUE (follower_id, followed_user_id),
    CHECK  (follower_id != followed_user_id)
);

-- Records are write-once. No UPDATE is ever issued against this table;
-- rows leave only when the owning user does.
CREATE TABLE IF NOT EXISTS sleep_records (
    record_id        TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    bedtime          TEXT NOT NULL,   -- ISO 8601 UTC
    wake_time        TEXT NOT NULL,   -- ISO 8601 UTC
    duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
    created_at       TEXT NOT NULL    -- server-assigned
);

CREATE INDEX IF NOT EXISTS follows_followed_idx        ON follows(followed_user_id);
CREATE INDEX IF NOT EXISTS sleep_records_owner_idx     ON sleep_records(user_id, bedtime);
CREATE INDEX IF NOT EXISTS sleep_records_bedtime_idx   ON sleep_records(bedtime);
CREATE INDEX IF NOT EXISTS sleep_records_duration_idx  ON sleep_records(duration_minutes);

PRAGMA user_version = 1;
";
