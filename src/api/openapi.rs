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

//! OpenAPI documentation for the device API.
//!
//! The document is served at `/openapi.json` and the Swagger UI at `/docs/`.

use utoipa::OpenApi;

use super::error::ErrorResponse;
use super::models::{DeleteResponse, DevicePayload, DeviceResponse, HealthResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::root,
        super::handlers::health_check,
        super::handlers::list_devices,
        super::handlers::create_device,
        super::handlers::get_device,
        super::handlers::replace_device,
        super::handlers::patch_device,
        super::handlers::delete_device,
    ),
    components(
        schemas(
            HealthResponse,
            DevicePayload,
            DeviceResponse,
            DeleteResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Devices", description = "Device management"),
    ),
    info(
        title = "Device Registry API",
        version = "1.0.0",
        description = "CRUD API for devices. Each device belongs to a location and an API user.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    )
)]
pub struct ApiDoc;
