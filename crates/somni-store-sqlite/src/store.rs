//! [`SqliteStore`] — the SQLite implementation of [`SleepStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use somni_core::{
  Error, Result,
  follow::FollowEdge,
  record::{NewSleepRecord, SleepRecord},
  store::SleepStore,
  user::User,
  week::WeekWindow,
};

use crate::{
  encode::{RawFollowEdge, RawSleepRecord, RawUser, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Error helpers ───────────────────────────────────────────────────────────

fn db_err(e: tokio_rusqlite::Error) -> Error { Error::Store(Box::new(e)) }

/// The message of a SQLite constraint violation, if that is what `e` is.
fn constraint_message(e: &tokio_rusqlite::Error) -> Option<&str> {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, Some(msg))) = e
    && f.code == rusqlite::ErrorCode::ConstraintViolation
  {
    Some(msg.as_str())
  } else {
    None
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Somni sleep store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(db_err)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(db_err)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(db_err)
  }

  /// Run a user query with a fixed WHERE/ORDER tail and one id parameter.
  async fn query_users(&self, sql: &'static str, id: Uuid) -> Result<Vec<User>> {
    let id_str = encode_uuid(id);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawUser {
              user_id:    row.get(0)?,
              name:       row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn count_follows(&self, column: &'static str, id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM follows WHERE {column} = ?1");
        Ok(conn.query_row(&sql, rusqlite::params![id_str], |row| row.get(0))?)
      })
      .await
      .map_err(db_err)?;

    Ok(count as u64)
  }
}

// ─── SleepStore impl ─────────────────────────────────────────────────────────

impl SleepStore for SqliteStore {
  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, name: String) -> Result<User> {
    let user = User {
      user_id: Uuid::new_v4(),
      name,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let name_str = user.name.clone();
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, created_at FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  name:       row.get(1)?,
                  created_at: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(db_err)?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, name, created_at FROM users
           ORDER BY created_at ASC, user_id ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawUser {
              user_id:    row.get(0)?,
              name:       row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn users_by_ids(&self, ids: Vec<Uuid>) -> Result<Vec<User>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let id_strs: Vec<String> = ids.into_iter().map(encode_uuid).collect();

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; id_strs.len()].join(", ");
        let sql = format!(
          "SELECT user_id, name, created_at FROM users WHERE user_id IN ({placeholders})"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(id_strs), |row| {
            Ok(RawUser {
              user_id:    row.get(0)?,
              name:       row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Follow edges ──────────────────────────────────────────────────────────

  async fn find_follow(
    &self,
    follower_id: Uuid,
    followed_user_id: Uuid,
  ) -> Result<Option<FollowEdge>> {
    let follower_str = encode_uuid(follower_id);
    let followed_str = encode_uuid(followed_user_id);

    let raw: Option<RawFollowEdge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT edge_id, follower_id, followed_user_id, created_at
               FROM follows WHERE follower_id = ?1 AND followed_user_id = ?2",
              rusqlite::params![follower_str, followed_str],
              |row| {
                Ok(RawFollowEdge {
                  edge_id:          row.get(0)?,
                  follower_id:      row.get(1)?,
                  followed_user_id: row.get(2)?,
                  created_at:       row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(db_err)?;

    raw.map(RawFollowEdge::into_edge).transpose()
  }

  async fn insert_follow(
    &self,
    follower_id: Uuid,
    followed_user_id: Uuid,
  ) -> Result<FollowEdge> {
    let edge = FollowEdge {
      edge_id: Uuid::new_v4(),
      follower_id,
      followed_user_id,
      created_at: Utc::now(),
    };

    let edge_id_str  = encode_uuid(edge.edge_id);
    let follower_str = encode_uuid(follower_id);
    let followed_str = encode_uuid(followed_user_id);
    let at_str       = encode_dt(edge.created_at);

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO follows (edge_id, follower_id, followed_user_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![edge_id_str, follower_str, followed_str, at_str],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(edge),
      // The UNIQUE (follower_id, followed_user_id) constraint is the source
      // of truth for deduplication; losing the insert race is a business
      // outcome, not an internal failure.
      Err(e) => match constraint_message(&e) {
        Some(msg) if msg.starts_with("UNIQUE constraint failed: follows.") => {
          Err(Error::AlreadyFollowing)
        }
        _ => Err(db_err(e)),
      },
    }
  }

  async fn remove_follow(
    &self,
    follower_id: Uuid,
    followed_user_id: Uuid,
  ) -> Result<Option<FollowEdge>> {
    let follower_str = encode_uuid(follower_id);
    let followed_str = encode_uuid(followed_user_id);

    let raw: Option<RawFollowEdge> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT edge_id, follower_id, followed_user_id, created_at
             FROM follows WHERE follower_id = ?1 AND followed_user_id = ?2",
            rusqlite::params![follower_str, followed_str],
            |row| {
              Ok(RawFollowEdge {
                edge_id:          row.get(0)?,
                follower_id:      row.get(1)?,
                followed_user_id: row.get(2)?,
                created_at:       row.get(3)?,
              })
            },
          )
          .optional()?;

        if let Some(edge) = &raw {
          conn.execute(
            "DELETE FROM follows WHERE edge_id = ?1",
            rusqlite::params![edge.edge_id],
          )?;
        }
        Ok(raw)
      })
      .await
      .map_err(db_err)?;

    raw.map(RawFollowEdge::into_edge).transpose()
  }

  async fn following(&self, user_id: Uuid) -> Result<Vec<User>> {
    self
      .query_users(
        "SELECT u.user_id, u.name, u.created_at
         FROM follows f
         JOIN users u ON u.user_id = f.followed_user_id
         WHERE f.follower_id = ?1
         ORDER BY f.created_at ASC, f.edge_id ASC",
        user_id,
      )
      .await
  }

  async fn followers(&self, user_id: Uuid) -> Result<Vec<User>> {
    self
      .query_users(
        "SELECT u.user_id, u.name, u.created_at
         FROM follows f
         JOIN users u ON u.user_id = f.follower_id
         WHERE f.followed_user_id = ?1
         ORDER BY f.created_at ASC, f.edge_id ASC",
        user_id,
      )
      .await
  }

  async fn following_count(&self, user_id: Uuid) -> Result<u64> {
    self.count_follows("follower_id", user_id).await
  }

  async fn followers_count(&self, user_id: Uuid) -> Result<u64> {
    self.count_follows("followed_user_id", user_id).await
  }

  // ── Sleep records ─────────────────────────────────────────────────────────

  async fn insert_sleep_record(&self, input: NewSleepRecord) -> Result<SleepRecord> {
    let record = SleepRecord {
      record_id:        Uuid::new_v4(),
      user_id:          input.user_id,
      bedtime:          input.bedtime,
      wake_time:        input.wake_time,
      duration_minutes: input.duration_minutes,
      created_at:       Utc::now(),
    };

    let record_id_str = encode_uuid(record.record_id);
    let user_id_str   = encode_uuid(record.user_id);
    let bedtime_str   = encode_dt(record.bedtime);
    let wake_str      = encode_dt(record.wake_time);
    let duration      = record.duration_minutes;
    let at_str        = encode_dt(record.created_at);

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sleep_records
             (record_id, user_id, bedtime, wake_time, duration_minutes, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            record_id_str,
            user_id_str,
            bedtime_str,
            wake_str,
            duration,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(record),
      Err(e) => match constraint_message(&e) {
        Some(msg) if msg.contains("CHECK constraint failed") => {
          Err(Error::RecordInvalid {
            errors: vec!["duration_minutes must be greater than 0".to_owned()],
          })
        }
        _ => Err(db_err(e)),
      },
    }
  }

  async fn sleep_records_for(&self, user_id: Uuid) -> Result<Vec<SleepRecord>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawSleepRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, user_id, bedtime, wake_time, duration_minutes, created_at
           FROM sleep_records
           WHERE user_id = ?1
           ORDER BY created_at DESC, record_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawSleepRecord {
              record_id:        row.get(0)?,
              user_id:          row.get(1)?,
              bedtime:          row.get(2)?,
              wake_time:        row.get(3)?,
              duration_minutes: row.get(4)?,
              created_at:       row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawSleepRecord::into_record).collect()
  }

  async fn sleep_records_in_window(
    &self,
    owner_ids: Vec<Uuid>,
    window: WeekWindow,
  ) -> Result<Vec<SleepRecord>> {
    if owner_ids.is_empty() {
      return Ok(Vec::new());
    }

    // Range scan + owner filter only; the caller imposes the total order.
    let mut params: Vec<String> = Vec::with_capacity(owner_ids.len() + 2);
    params.push(encode_dt(window.start));
    params.push(encode_dt(window.end));
    params.extend(owner_ids.into_iter().map(encode_uuid));
    let owner_count = params.len() - 2;

    let raws: Vec<RawSleepRecord> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; owner_count].join(", ");
        let sql = format!(
          "SELECT record_id, user_id, bedtime, wake_time, duration_minutes, created_at
           FROM sleep_records
           WHERE bedtime >= ? AND bedtime < ? AND user_id IN ({placeholders})"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawSleepRecord {
              record_id:        row.get(0)?,
              user_id:          row.get(1)?,
              bedtime:          row.get(2)?,
              wake_time:        row.get(3)?,
              duration_minutes: row.get(4)?,
              created_at:       row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawSleepRecord::into_record).collect()
  }
}
