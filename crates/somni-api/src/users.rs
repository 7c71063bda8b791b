//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/users` | Paginated, with follow counts |
//! | `POST`   | `/users` | Body: `{"name":"Alice"}` |
//! | `GET`    | `/users/:id` | 404 if not found |
//! | `POST`   | `/users/:id/follow` | Body: `{"target_user_id":"<uuid>"}` |
//! | `DELETE` | `/users/:id/unfollow` | `?target_user_id=<uuid>` |
//! | `GET`    | `/users/:id/following` | Paginated |
//! | `GET`    | `/users/:id/followers` | Paginated |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use somni_core::{follow, page, store::SleepStore, user, user::User};
use uuid::Uuid;

use crate::{
  error::ApiError,
  pagination::{NoMeta, PageParams, Paginated},
};

// ─── Response shapes ──────────────────────────────────────────────────────────

/// Just enough of a user to identify them in a follow payload.
#[derive(Debug, Serialize)]
pub struct UserBrief {
  pub id:   Uuid,
  pub name: String,
}

impl From<&User> for UserBrief {
  fn from(u: &User) -> Self {
    Self {
      id:   u.user_id,
      name: u.name.clone(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
  pub id:         Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
  fn from(u: User) -> Self {
    Self {
      id:         u.user_id,
      name:       u.name,
      created_at: u.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
  pub id:              Uuid,
  pub name:            String,
  pub created_at:      DateTime<Utc>,
  pub following_count: u64,
  pub followers_count: u64,
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

/// Resolve a path id to a stored user, or 404.
pub(crate) async fn load_user<S: SleepStore>(store: &S, id: Uuid) -> Result<User, ApiError> {
  store
    .get_user(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))
}

async fn with_counts<S: SleepStore>(store: &S, user: User) -> Result<UserDetailResponse, ApiError> {
  let following_count = store.following_count(user.user_id).await?;
  let followers_count = store.followers_count(user.user_id).await?;
  Ok(UserDetailResponse {
    id: user.user_id,
    name: user.name,
    created_at: user.created_at,
    following_count,
    followers_count,
  })
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users[?page=N&per_page=N]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Paginated<UserDetailResponse, NoMeta>>, ApiError>
where
  S: SleepStore,
{
  let users = store.list_users().await?;
  let user_page = page::paginate(users, params.request());

  let mut data = Vec::with_capacity(user_page.items.len());
  for user in user_page.items {
    data.push(with_counts(store.as_ref(), user).await?);
  }

  Ok(Json(Paginated::new(
    page::Page {
      items: data,
      info:  user_page.info,
    },
    NoMeta {},
  )))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /users` — body: `{"name":"Alice"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SleepStore,
{
  let user = user::create(store.as_ref(), body.name).await?;
  Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<UserDetailResponse>, ApiError>
where
  S: SleepStore,
{
  let user = load_user(store.as_ref(), id).await?;
  Ok(Json(with_counts(store.as_ref(), user).await?))
}

// ─── Follow ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FollowBody {
  pub target_user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
  pub message:         String,
  pub follower:        UserBrief,
  pub followed_user:   UserBrief,
  pub following_count: u64,
  pub created_at:      DateTime<Utc>,
}

/// `POST /users/:id/follow` — body: `{"target_user_id":"<uuid>"}`
pub async fn follow<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<FollowBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SleepStore,
{
  let follower = load_user(store.as_ref(), id).await?;
  let target = load_user(store.as_ref(), body.target_user_id).await?;

  let edge = follow::follow(store.as_ref(), follower.user_id, target.user_id).await?;
  let following_count = store.following_count(follower.user_id).await?;

  Ok((
    StatusCode::CREATED,
    Json(FollowResponse {
      message:         format!("Successfully followed {}", target.name),
      follower:        UserBrief::from(&follower),
      followed_user:   UserBrief::from(&target),
      following_count,
      created_at:      edge.created_at,
    }),
  ))
}

// ─── Unfollow ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UnfollowParams {
  pub target_user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UnfollowResponse {
  pub message:         String,
  pub follower:        UserBrief,
  pub unfollowed_user: UserBrief,
  pub following_count: u64,
}

/// `DELETE /users/:id/unfollow?target_user_id=<uuid>`
pub async fn unfollow<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<UnfollowParams>,
) -> Result<Json<UnfollowResponse>, ApiError>
where
  S: SleepStore,
{
  let follower = load_user(store.as_ref(), id).await?;
  let target = load_user(store.as_ref(), params.target_user_id).await?;

  follow::unfollow(store.as_ref(), follower.user_id, target.user_id).await?;
  let following_count = store.following_count(follower.user_id).await?;

  Ok(Json(UnfollowResponse {
    message:         format!("Successfully unfollowed {}", target.name),
    follower:        UserBrief::from(&follower),
    unfollowed_user: UserBrief::from(&target),
    following_count,
  }))
}

// ─── Following / followers ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FollowingMeta {
  pub user_id:         Uuid,
  pub user_name:       String,
  pub following_count: u64,
}

/// `GET /users/:id/following[?page=N&per_page=N]`
pub async fn following<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Paginated<UserResponse, FollowingMeta>>, ApiError>
where
  S: SleepStore,
{
  let user = load_user(store.as_ref(), id).await?;
  let followed = store.following(user.user_id).await?;
  let following_count = followed.len() as u64;

  let page = page::paginate(
    followed.into_iter().map(UserResponse::from).collect(),
    params.request(),
  );
  Ok(Json(Paginated::new(page, FollowingMeta {
    user_id:   user.user_id,
    user_name: user.name,
    following_count,
  })))
}

#[derive(Debug, Serialize)]
pub struct FollowersMeta {
  pub user_id:         Uuid,
  pub user_name:       String,
  pub followers_count: u64,
}

/// `GET /users/:id/followers[?page=N&per_page=N]`
pub async fn followers<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Paginated<UserResponse, FollowersMeta>>, ApiError>
where
  S: SleepStore,
{
  let user = load_user(store.as_ref(), id).await?;
  let follower_users = store.followers(user.user_id).await?;
  let followers_count = follower_users.len() as u64;

  let page = page::paginate(
    follower_users.into_iter().map(UserResponse::from).collect(),
    params.request(),
  );
  Ok(Json(Paginated::new(page, FollowersMeta {
    user_id:   user.user_id,
    user_name: user.name,
    followers_count,
  })))
}
