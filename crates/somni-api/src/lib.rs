//! JSON REST API for Somni.
//!
//! Exposes an axum [`Router`] backed by any [`somni_core::store::SleepStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/v1", somni_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod pagination;
pub mod records;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use somni_core::store::SleepStore;

pub use error::ApiError;

/// Runtime server configuration, deserialised from `config.toml` or the
/// `SOMNI_*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SleepStore + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    // Follow graph
    .route("/users/{id}/follow", post(users::follow::<S>))
    .route("/users/{id}/unfollow", delete(users::unfollow::<S>))
    .route("/users/{id}/following", get(users::following::<S>))
    .route("/users/{id}/followers", get(users::followers::<S>))
    // Sleep records
    .route(
      "/users/{id}/sleep_records",
      get(records::list::<S>).post(records::create::<S>),
    )
    .route(
      "/users/{id}/following_sleep_records",
      get(records::following_sleep_records::<S>),
    )
    .with_state(store)
}
