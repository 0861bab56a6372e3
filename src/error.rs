//! Error taxonomy for the sync pipeline.
//!
//! Every failure is scoped to one request; nothing here terminates the
//! process. The variants map onto distinct recovery paths: `NeedsReauth`
//! redirects to login, `Auth` requires the user to re-authenticate, `Fetch`
//! aborts the current operation, `Batch` reports partial progress so the
//! caller can resynchronize, and `Create` is safe to retry as-is because
//! nothing was persisted.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No session exists; the caller must go through the login flow first.
    #[error("no authenticated session")]
    NeedsReauth,

    /// The provider rejected an authorization code or refresh token.
    #[error("authentication rejected by provider (HTTP {status}): {body}")]
    Auth { status: u16, body: String },

    /// A listing/page request returned a non-2xx status.
    #[error("failed to fetch data (HTTP {status}): {body}")]
    Fetch { status: u16, body: String },

    /// A chunked playlist mutation failed mid-sequence. `chunk` is the index
    /// of the failed chunk; `applied` counts the IDs successfully applied by
    /// the preceding chunks. Not retried automatically: partial remote state
    /// exists and a blind retry could duplicate entries.
    #[error("batch mutation failed at chunk {chunk} after {applied} tracks (HTTP {status}): {body}")]
    Batch {
        chunk: usize,
        applied: usize,
        status: u16,
        body: String,
    },

    /// Playlist creation returned a non-2xx status. No record was persisted,
    /// so re-invoking create is safe.
    #[error("failed to create playlist (HTTP {status}): {body}")]
    Create { status: u16, body: String },

    /// Transport-level failure (connection, timeout, malformed body).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NeedsReauth => Redirect::temporary("/login").into_response(),
            Error::Auth { .. } => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": self.to_string() })))
                    .into_response()
            }
            Error::Fetch { .. }
            | Error::Batch { .. }
            | Error::Create { .. }
            | Error::Http(_) => {
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": self.to_string() })))
                    .into_response()
            }
            Error::Io(_) | Error::Serde(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
        }
    }
}
