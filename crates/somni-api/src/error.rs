//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure renders as `{ "error": { "code", "message", "data" } }`.
//! The code is the stable discriminator from
//! [`somni_core::Error::code`]: `NOT_FOUND` maps to 404,
//! `UNPROCESSABLE_ENTITY` to 422, anything unanticipated to 500.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("{message}")]
  Unprocessable {
    message: String,
    /// Structured per-field error data, when the failure carries any.
    data:    Option<serde_json::Value>,
  },

  #[error("store error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<somni_core::Error> for ApiError {
  fn from(e: somni_core::Error) -> Self {
    match e.code() {
      "NOT_FOUND" => Self::NotFound(e.to_string()),
      "INTERNAL_SERVER_ERROR" => Self::Internal(Box::new(e)),
      _ => {
        let message = e.to_string();
        let data = match e {
          somni_core::Error::RecordInvalid { errors } => {
            Some(json!({ "errors": errors }))
          }
          _ => None,
        };
        Self::Unprocessable { message, data }
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code, message, data) = match self {
      Self::NotFound(m) => (StatusCode::NOT_FOUND, "NOT_FOUND", m, None),
      Self::Unprocessable { message, data } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        "UNPROCESSABLE_ENTITY",
        message,
        data,
      ),
      Self::Internal(e) => {
        tracing::error!(error = %e, "internal error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "INTERNAL_SERVER_ERROR",
          e.to_string(),
          None,
        )
      }
    };

    let body = json!({
      "error": {
        "code": code,
        "message": message,
        "data": data.unwrap_or(serde_json::Value::Null),
      }
    });
    (status, Json(body)).into_response()
  }
}
