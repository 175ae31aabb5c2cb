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

//! Route definitions for the device API.

use axum::{extract::Extension, routing::get, Router};
use std::sync::Arc;

use super::handlers;
use crate::service::DeviceService;

/// Build the API router.
///
/// Device routes are registered with and without the trailing slash.
pub fn build_router(service: Arc<DeviceService>) -> Router {
    let collection = get(handlers::list_devices).post(handlers::create_device);
    let item = get(handlers::get_device)
        .put(handlers::replace_device)
        .patch(handlers::patch_device)
        .delete(handlers::delete_device);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/devices/", collection.clone())
        .route("/devices", collection)
        .route("/devices/:id/", item.clone())
        .route("/devices/:id", item)
        .layer(Extension(service))
}
