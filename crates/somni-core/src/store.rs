//! The `SleepStore` trait.
//!
//! Implemented by storage backends (e.g. `somni-store-sqlite`). Higher
//! layers (`somni-api`, the mutation services in this crate) depend on this
//! abstraction, not on any concrete backend. Ids and `created_at` timestamps
//! are always assigned by the store.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  follow::FollowEdge,
  record::{NewSleepRecord, SleepRecord},
  user::User,
  week::WeekWindow,
};

pub trait SleepStore: Send + Sync {
  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user with the given (already validated) name.
  fn add_user(
    &self,
    name: String,
  ) -> impl Future<Output = Result<User>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>>> + Send + '_;

  /// List all users in creation order.
  fn list_users(&self) -> impl Future<Output = Result<Vec<User>>> + Send + '_;

  /// Fetch the users for a set of ids, in no particular order. Unknown ids
  /// are silently absent from the result.
  fn users_by_ids(
    &self,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<User>>> + Send + '_;

  // ── Follow edges ──────────────────────────────────────────────────────

  /// Look up the edge for the exact ordered pair.
  fn find_follow(
    &self,
    follower_id: Uuid,
    followed_user_id: Uuid,
  ) -> impl Future<Output = Result<Option<FollowEdge>>> + Send + '_;

  /// Insert an edge for the ordered pair.
  ///
  /// The pair is covered by a uniqueness constraint; a violation MUST be
  /// surfaced as [`crate::Error::AlreadyFollowing`], never as an internal
  /// error — under concurrency this constraint, not the callers' pre-check,
  /// is what guarantees at most one edge per pair.
  fn insert_follow(
    &self,
    follower_id: Uuid,
    followed_user_id: Uuid,
  ) -> impl Future<Output = Result<FollowEdge>> + Send + '_;

  /// Delete the edge for the exact ordered pair, returning it, or `None` if
  /// no such edge existed.
  fn remove_follow(
    &self,
    follower_id: Uuid,
    followed_user_id: Uuid,
  ) -> impl Future<Output = Result<Option<FollowEdge>>> + Send + '_;

  /// Users the given user follows, in edge-creation order.
  fn following(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<User>>> + Send + '_;

  /// Users following the given user, in edge-creation order.
  fn followers(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<User>>> + Send + '_;

  fn following_count(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64>> + Send + '_;

  fn followers_count(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64>> + Send + '_;

  // ── Sleep records ─────────────────────────────────────────────────────

  /// Persist a new sleep record and return it.
  fn insert_sleep_record(
    &self,
    input: NewSleepRecord,
  ) -> impl Future<Output = Result<SleepRecord>> + Send + '_;

  /// All records owned by a user, newest first.
  fn sleep_records_for(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SleepRecord>>> + Send + '_;

  /// Records whose owner is in `owner_ids` and whose bedtime falls inside
  /// `window`. No order is guaranteed — the aggregate in
  /// [`crate::record::followed_previous_week`] imposes the total order.
  fn sleep_records_in_window(
    &self,
    owner_ids: Vec<Uuid>,
    window: WeekWindow,
  ) -> impl Future<Output = Result<Vec<SleepRecord>>> + Send + '_;
}
