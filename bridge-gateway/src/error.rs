//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bridge_referrals::{ReferralError, StoreError};
use serde_json::json;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// A batch-level referral error: the whole request was refused.
    #[error(transparent)]
    Referral(#[from] ReferralError),

    /// An error propagated from the document store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request path or body contains invalid values.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Startup configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        let code = match self {
            GatewayError::Referral(e) => e.code(),
            GatewayError::Store(e) => e.code(),
            GatewayError::InvalidRequest(_) => 400,
            GatewayError::Config(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
