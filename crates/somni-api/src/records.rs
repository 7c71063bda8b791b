//! Handlers for sleep-record endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/:id/sleep_records` | Paginated, newest first |
//! | `POST` | `/users/:id/sleep_records` | Body: `{"bedtime":"...","wake_time":"..."}` |
//! | `GET`  | `/users/:id/following_sleep_records` | Previous calendar week, longest sleep first |

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use somni_core::{
  page,
  record::{self, SleepRecord, SleepRecordParams},
  store::SleepStore,
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  pagination::{PageParams, Paginated},
  users::load_user,
};

// ─── Response shape ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SleepRecordResponse {
  pub id:               Uuid,
  pub user_id:          Uuid,
  pub user_name:        String,
  pub bedtime:          DateTime<Utc>,
  pub wake_time:        DateTime<Utc>,
  pub duration_minutes: i64,
  /// `duration_minutes / 60`, rounded to two decimals.
  pub duration_hours:   f64,
  pub created_at:       DateTime<Utc>,
}

impl SleepRecordResponse {
  fn new(record: SleepRecord, user_name: String) -> Self {
    let duration_hours = (record.duration_minutes as f64 / 60.0 * 100.0).round() / 100.0;
    Self {
      id: record.record_id,
      user_id: record.user_id,
      user_name,
      bedtime: record.bedtime,
      wake_time: record.wake_time,
      duration_minutes: record.duration_minutes,
      duration_hours,
      created_at: record.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct RecordListMeta {
  pub user_id:   Uuid,
  pub user_name: String,
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users/:id/sleep_records[?page=N&per_page=N]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Paginated<SleepRecordResponse, RecordListMeta>>, ApiError>
where
  S: SleepStore,
{
  let user = load_user(store.as_ref(), id).await?;
  let records = store.sleep_records_for(user.user_id).await?;

  let record_page = page::paginate(records, params.request());
  let data: Vec<SleepRecordResponse> = record_page
    .items
    .into_iter()
    .map(|r| SleepRecordResponse::new(r, user.name.clone()))
    .collect();

  Ok(Json(Paginated::new(
    page::Page {
      items: data,
      info:  record_page.info,
    },
    RecordListMeta {
      user_id:   user.user_id,
      user_name: user.name,
    },
  )))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /users/:id/sleep_records` — body:
/// `{"bedtime":"2024-01-01T22:00:00Z","wake_time":"2024-01-02T06:00:00Z"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SleepRecordParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SleepStore,
{
  let user = load_user(store.as_ref(), id).await?;

  // The reference instant is read once here so the engine stays
  // deterministic over its inputs.
  let record = record::create(store.as_ref(), user.user_id, &body, Utc::now()).await?;
  Ok((
    StatusCode::CREATED,
    Json(SleepRecordResponse::new(record, user.name)),
  ))
}

// ─── Previous-week aggregate ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FollowedRecordsMeta {
  pub user_id:         Uuid,
  pub user_name:       String,
  pub following_count: u64,
}

/// `GET /users/:id/following_sleep_records[?page=N&per_page=N]`
///
/// Sleep records of everyone the user follows, from the previous calendar
/// week, longest sleep first. An empty page is success, not an error.
pub async fn following_sleep_records<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Paginated<SleepRecordResponse, FollowedRecordsMeta>>, ApiError>
where
  S: SleepStore,
{
  let user = load_user(store.as_ref(), id).await?;
  let records = record::followed_previous_week(store.as_ref(), user.user_id, Utc::now()).await?;
  let following_count = store.following_count(user.user_id).await?;

  let record_page = page::paginate(records, params.request());

  // Resolve owner names for the page being rendered only.
  let mut owner_ids: Vec<Uuid> = record_page.items.iter().map(|r| r.user_id).collect();
  owner_ids.sort_unstable();
  owner_ids.dedup();
  let names: HashMap<Uuid, String> = store
    .users_by_ids(owner_ids)
    .await?
    .into_iter()
    .map(|u| (u.user_id, u.name))
    .collect();

  let data: Vec<SleepRecordResponse> = record_page
    .items
    .into_iter()
    .map(|r| {
      let name = names.get(&r.user_id).cloned().unwrap_or_default();
      SleepRecordResponse::new(r, name)
    })
    .collect();

  Ok(Json(Paginated::new(
    page::Page {
      items: data,
      info:  record_page.info,
    },
    FollowedRecordsMeta {
      user_id:   user.user_id,
      user_name: user.name,
      following_count,
    },
  )))
}
