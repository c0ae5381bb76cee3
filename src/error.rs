// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::providers::gatefi::RampError;

/// Client-facing error: always rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Provider failures keep the provider's status when it is an error status.
fn provider_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|status| status.is_client_error() || status.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<RampError> for ApiError {
    fn from(error: RampError) -> Self {
        match error {
            RampError::Validation(message) => Self::bad_request(message),
            RampError::Provider { message, status } => {
                Self::new(provider_status(status), message)
            }
            RampError::Internal { message, detail } => {
                error!(detail = %detail, "ramp operation failed");
                Self::internal(message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let internal = ApiError::internal("oops");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.message, "oops");
    }

    #[test]
    fn validation_maps_to_400() {
        let error = ApiError::from(RampError::validation("metadata must be valid JSON."));
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "metadata must be valid JSON.");
    }

    #[test]
    fn provider_status_is_propagated() {
        let error = ApiError::from(RampError::Provider {
            message: "bad input".to_string(),
            status: 422,
        });
        assert_eq!(error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.message, "bad input");
    }

    #[test]
    fn non_error_provider_status_becomes_500() {
        let redirect = ApiError::from(RampError::Provider {
            message: "moved".to_string(),
            status: 302,
        });
        assert_eq!(redirect.status, StatusCode::INTERNAL_SERVER_ERROR);

        let nonsense = ApiError::from(RampError::Provider {
            message: "weird".to_string(),
            status: 1000,
        });
        assert_eq!(nonsense.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_hides_detail() {
        let error = ApiError::from(RampError::internal(
            "Failed to create quote",
            "dns error: api-sandbox.gatefi.com",
        ));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Failed to create quote");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
