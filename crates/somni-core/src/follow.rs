//! Follow edges and the relationship-graph mutations.
//!
//! An edge is a directed, deduplicated relationship record from one user to
//! another. Edges are created by [`follow`], destroyed by [`unfollow`], and
//! never mutated in place. "Following" and "followers" are pure views over
//! the edge set, served by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::SleepStore};

/// A directed follow relationship. The `(follower_id, followed_user_id)`
/// pair is unique; the store's constraint enforces that under concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowEdge {
  pub edge_id:          Uuid,
  pub follower_id:      Uuid,
  pub followed_user_id: Uuid,
  pub created_at:       DateTime<Utc>,
}

/// Create a follow edge from `follower_id` to `followed_user_id`.
///
/// Preconditions, checked in order: the two ids differ
/// ([`Error::SelfFollow`]), and no edge exists for the pair
/// ([`Error::AlreadyFollowing`]). The existence check is an optimisation
/// only — two concurrent calls for the same pair can both pass it, and the
/// store resolves the race by mapping its uniqueness-constraint violation to
/// the same [`Error::AlreadyFollowing`]. On failure nothing is written.
pub async fn follow<S: SleepStore>(
  store: &S,
  follower_id: Uuid,
  followed_user_id: Uuid,
) -> Result<FollowEdge> {
  if follower_id == followed_user_id {
    return Err(Error::SelfFollow);
  }
  if store
    .find_follow(follower_id, followed_user_id)
    .await?
    .is_some()
  {
    return Err(Error::AlreadyFollowing);
  }
  store.insert_follow(follower_id, followed_user_id).await
}

/// Delete the follow edge from `follower_id` to `followed_user_id` and
/// return it, so callers can report what was removed.
///
/// Fails with [`Error::NotFollowing`] if no edge exists for the exact
/// ordered pair; a reversed edge does not count. Not a no-op on retry.
pub async fn unfollow<S: SleepStore>(
  store: &S,
  follower_id: Uuid,
  followed_user_id: Uuid,
) -> Result<FollowEdge> {
  store
    .remove_follow(follower_id, followed_user_id)
    .await?
    .ok_or(Error::NotFollowing)
}
