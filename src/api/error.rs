// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error responses returned by the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service::{DeviceError, ValidationFailure};

/// Error codes for API responses
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const DEVICE_NOT_FOUND: &str = "DEVICE_NOT_FOUND";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// API error response structure
///
/// Only the message is serialized: `{"error": "<message>"}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code, used to pick the HTTP status
    #[serde(skip)]
    pub code: &'static str,
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            error: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        status_from_code(self.code)
    }

    /// Convert to a specific status code
    pub fn with_status(self) -> (StatusCode, axum::Json<Self>) {
        (self.status(), axum::Json(self))
    }
}

/// Convert an error code to an HTTP status code
fn status_from_code(code: &str) -> StatusCode {
    match code {
        error_codes::DEVICE_NOT_FOUND => StatusCode::NOT_FOUND,
        error_codes::INVALID_REQUEST => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ValidationFailure> for ErrorResponse {
    fn from(failure: ValidationFailure) -> Self {
        match &failure {
            ValidationFailure::MissingRequiredFields(missing) => {
                warn!("Rejected request, missing fields: {}", missing.join(", "));
            }
            other => warn!("Rejected request: {other}"),
        }
        ErrorResponse::new(error_codes::INVALID_REQUEST, failure.to_string())
    }
}

/// Convert DeviceError to ErrorResponse. Storage causes are logged, not exposed.
impl From<DeviceError> for ErrorResponse {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Validation(failure) => failure.into(),
            DeviceError::NotFound { id } => {
                warn!("Device not found: {id}");
                ErrorResponse::new(error_codes::DEVICE_NOT_FOUND, "Device not found")
            }
            DeviceError::Storage { operation, source } => {
                error!("Device {operation} failed: {source}");
                ErrorResponse::new(error_codes::INTERNAL_ERROR, format!("{operation} failed"))
            }
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        self.with_status().into_response()
    }
}
