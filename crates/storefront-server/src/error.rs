//! HTTP error mapping.
//!
//! [`AppError`] renders as plain text for the AJAX cart routes.
//! [`JsonError`] renders the same failure as a JSON body for the JSON APIs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_core::CommerceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Backend rejected a cart or catalog operation. Always a server error at
    /// this boundary, whatever the backend's own classification.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Commerce(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The backend's own status for commerce failures.
    pub fn commerce_status(&self) -> Option<u16> {
        match self {
            Self::Commerce(e) => Some(e.http_status()),
            Self::BadRequest(_) => None,
        }
    }

    fn log(&self) {
        match self {
            Self::Commerce(e) => {
                tracing::error!(commerce_status = e.http_status(), "Commerce failure: {}", e)
            }
            Self::BadRequest(msg) => tracing::debug!("Rejected request: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), self.to_string()).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commerce_status: Option<u16>,
}

/// [`AppError`] with a JSON body.
#[derive(Debug)]
pub struct JsonError(pub AppError);

impl From<AppError> for JsonError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl From<CommerceError> for JsonError {
    fn from(e: CommerceError) -> Self {
        Self(AppError::Commerce(e))
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let Self(err) = self;
        err.log();
        let body = ErrorResponse {
            error: err.to_string(),
            commerce_status: err.commerce_status(),
        };
        (err.status(), Json(body)).into_response()
    }
}
