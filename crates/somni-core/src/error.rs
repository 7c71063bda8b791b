//! Error types for `somni-core`.
//!
//! Every variant is an expected, caller-correctable business error except
//! [`Error::Store`] and [`Error::Decode`], which cover unanticipated backend
//! failures. [`Error::code`] is the stable machine-checkable discriminator
//! the presentation layer maps to an HTTP status.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("you cannot follow yourself")]
  SelfFollow,

  #[error("already following this user")]
  AlreadyFollowing,

  #[error("you are not following this user")]
  NotFollowing,

  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("invalid date/time format for {field}: {value:?}")]
  InvalidTimestamp { field: &'static str, value: String },

  #[error("{0} cannot be in the future")]
  TimestampInFuture(&'static str),

  #[error("wake_time must be after bedtime")]
  WakeNotAfterBedtime,

  #[error("name {0}")]
  InvalidName(&'static str),

  /// The record failed persistence-level validation. Carries one message per
  /// offending field so callers can render structured error data.
  #[error("failed to create sleep record")]
  RecordInvalid { errors: Vec<String> },

  /// A stored value could not be decoded back into its domain type.
  #[error("malformed stored value: {0}")]
  Decode(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Stable error code for the presentation layer. `NOT_FOUND` maps to 404,
  /// `UNPROCESSABLE_ENTITY` to 422, everything else to 500.
  pub fn code(&self) -> &'static str {
    match self {
      Self::UserNotFound(_) => "NOT_FOUND",
      Self::Decode(_) | Self::Store(_) => "INTERNAL_SERVER_ERROR",
      _ => "UNPROCESSABLE_ENTITY",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
