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

use anyhow::Result;
use axum::Router;
use log::{debug, error, info};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::config::DeviceRegistryConfig;
use crate::service::DeviceService;
use crate::store::{self, DeviceStore};

/// Build the full HTTP application: device routes, OpenAPI document and
/// Swagger UI.
pub fn build_app(service: Arc<DeviceService>) -> Router {
    api::build_router(service)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", api::ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub struct DeviceRegistryServer {
    config: DeviceRegistryConfig,
}

impl DeviceRegistryServer {
    pub fn new(config: DeviceRegistryConfig) -> Self {
        Self { config }
    }

    /// Connect storage, make sure the schema exists and serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        info!("Starting device registry");
        debug!("Database settings: {:?}", self.config.database);

        let store = store::connect(&self.config.database).await?;
        store.ensure_schema().await?;
        info!("Database schema ready");

        let service = Arc::new(DeviceService::new(store.clone()));
        let app = build_app(service);

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Starting web API on {addr}");
        info!("Swagger UI available at http://{addr}/docs/");

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        info!("Shutting down device registry");
        store.close().await;

        if let Err(e) = &served {
            error!("Web API server error: {e}");
        }
        Ok(served?)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
