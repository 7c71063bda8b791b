//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings, which compare
//! lexicographically in timestamp order — the window query's range scan on
//! `bedtime` relies on that. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use somni_core::{
  Error, Result,
  follow::FollowEdge,
  record::SleepRecord,
  user::User,
};
use uuid::Uuid;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::Decode(format!("uuid {s:?}: {e}")))
}

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `follows` row.
pub struct RawFollowEdge {
  pub edge_id:          String,
  pub follower_id:      String,
  pub followed_user_id: String,
  pub created_at:       String,
}

impl RawFollowEdge {
  pub fn into_edge(self) -> Result<FollowEdge> {
    Ok(FollowEdge {
      edge_id:          decode_uuid(&self.edge_id)?,
      follower_id:      decode_uuid(&self.follower_id)?,
      followed_user_id: decode_uuid(&self.followed_user_id)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `sleep_records` row.
pub struct RawSleepRecord {
  pub record_id:        String,
  pub user_id:          String,
  pub bedtime:          String,
  pub wake_time:        String,
  pub duration_minutes: i64,
  pub created_at:       String,
}

impl RawSleepRecord {
  pub fn into_record(self) -> Result<SleepRecord> {
    Ok(SleepRecord {
      record_id:        decode_uuid(&self.record_id)?,
      user_id:          decode_uuid(&self.user_id)?,
      bedtime:          decode_dt(&self.bedtime)?,
      wake_time:        decode_dt(&self.wake_time)?,
      duration_minutes: self.duration_minutes,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}
