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

//! HTTP handlers for the device API.
//!
//! Handlers only translate between HTTP and [`DeviceService`]; all validation
//! ordering lives in the service.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::Json,
};
use log::info;
use serde_json::Value;
use std::sync::Arc;

use super::error::ErrorResponse;
use super::models::{DeleteResponse, DevicePayload, DeviceResponse, HealthResponse};
use crate::models::{DeviceInput, RecordId};
use crate::service::{DeviceService, ValidationFailure};

type ApiResult<T> = Result<Json<T>, ErrorResponse>;

fn parse_body(body: Result<Json<Value>, JsonRejection>) -> Result<DeviceInput, ErrorResponse> {
    let Json(value) = body
        .map_err(|rejection| ValidationFailure::InvalidBody(rejection.body_text()))?;
    Ok(DevicePayload::from_json(value)?.into())
}

fn parse_id(raw: &str) -> Result<RecordId, ErrorResponse> {
    raw.parse::<RecordId>()
        .map_err(|_| ErrorResponse::from(ValidationFailure::InvalidId(raw.to_string())))
}

/// Liveness text
#[utoipa::path(
    get,
    path = "/",
    responses(
        (
            status = 200,
            description = "Server is running",
            body = String,
            content_type = "text/plain"
        ),
    ),
    tag = "Health"
)]
pub async fn root() -> &'static str {
    "Server is running!"
}

/// Check server health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// List all devices
#[utoipa::path(
    get,
    path = "/devices/",
    responses(
        (status = 200, description = "All devices ordered by id", body = [DeviceResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "Devices"
)]
pub async fn list_devices(
    Extension(service): Extension<Arc<DeviceService>>,
) -> ApiResult<Vec<DeviceResponse>> {
    info!("Listing devices");
    let devices = service.list().await?;
    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

/// Create a device
#[utoipa::path(
    post,
    path = "/devices/",
    request_body = DevicePayload,
    responses(
        (status = 200, description = "Device created", body = DeviceResponse),
        (status = 400, description = "Missing fields or invalid reference", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "Devices"
)]
pub async fn create_device(
    Extension(service): Extension<Arc<DeviceService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<DeviceResponse> {
    info!("Received create device request");
    let input = parse_body(body)?;
    let device = service.create(input).await?;
    Ok(Json(device.into()))
}

/// Get a device by id
#[utoipa::path(
    get,
    path = "/devices/{id}/",
    params(
        ("id" = i64, Path, description = "Device id")
    ),
    responses(
        (status = 200, description = "Device found", body = DeviceResponse),
        (status = 400, description = "Invalid device id", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
    ),
    tag = "Devices"
)]
pub async fn get_device(
    Extension(service): Extension<Arc<DeviceService>>,
    Path(id): Path<String>,
) -> ApiResult<DeviceResponse> {
    let id = parse_id(&id)?;
    info!("Received get device request: {id}");
    let device = service.get(id).await?;
    Ok(Json(device.into()))
}

/// Replace all fields of a device
#[utoipa::path(
    put,
    path = "/devices/{id}/",
    params(
        ("id" = i64, Path, description = "Device id")
    ),
    request_body = DevicePayload,
    responses(
        (status = 200, description = "Device updated", body = DeviceResponse),
        (status = 400, description = "Missing fields or invalid reference", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "Devices"
)]
pub async fn replace_device(
    Extension(service): Extension<Arc<DeviceService>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<DeviceResponse> {
    let id = parse_id(&id)?;
    info!("Received update device request: {id}");
    let input = parse_body(body)?;
    let device = service.replace(id, input).await?;
    Ok(Json(device.into()))
}

/// Update only the supplied fields of a device
#[utoipa::path(
    patch,
    path = "/devices/{id}/",
    params(
        ("id" = i64, Path, description = "Device id")
    ),
    request_body = DevicePayload,
    responses(
        (status = 200, description = "Device patched", body = DeviceResponse),
        (status = 400, description = "No fields or invalid reference", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "Devices"
)]
pub async fn patch_device(
    Extension(service): Extension<Arc<DeviceService>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<DeviceResponse> {
    let id = parse_id(&id)?;
    info!("Received patch device request: {id}");
    let input = parse_body(body)?;
    let device = service.partial_update(id, input).await?;
    Ok(Json(device.into()))
}

/// Delete a device
#[utoipa::path(
    delete,
    path = "/devices/{id}/",
    params(
        ("id" = i64, Path, description = "Device id")
    ),
    responses(
        (status = 200, description = "Device deleted", body = DeleteResponse),
        (status = 400, description = "Invalid device id", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "Devices"
)]
pub async fn delete_device(
    Extension(service): Extension<Arc<DeviceService>>,
    Path(id): Path<String>,
) -> ApiResult<DeleteResponse> {
    let id = parse_id(&id)?;
    info!("Received delete device request: {id}");
    let id = service.delete(id).await?;
    Ok(Json(DeleteResponse::new(id)))
}
