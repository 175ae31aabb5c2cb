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

//! Storage access for devices, locations and API users.
//!
//! The [`DeviceStore`] trait is the only way the rest of the crate touches
//! persisted state. Two backends are provided:
//!
//! - [`PostgresDeviceStore`] - the production backend, built on a `sqlx` pool
//! - [`MemoryDeviceStore`] - an in-process backend for local development and tests
//!
//! Use [`connect`] to build the backend selected by the configuration.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::config::{DatabaseSettings, StorageBackend};
use crate::models::{ApiUser, Device, DeviceChanges, Location, NewApiUser, NewDevice, RecordId};

pub use memory::MemoryDeviceStore;
pub use postgres::PostgresDeviceStore;

/// Errors returned by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations needed by the device service.
///
/// Every call is a single round trip against the backend; implementations do
/// not cache rows between calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Create the `api_user`, `location` and `device` tables if they are missing.
    async fn ensure_schema(&self) -> StoreResult<()>;

    async fn location_exists(&self, id: RecordId) -> StoreResult<bool>;

    async fn api_user_exists(&self, id: RecordId) -> StoreResult<bool>;

    /// Insert a device and return the stored row with its generated id.
    async fn insert_device(&self, device: NewDevice) -> StoreResult<Device>;

    /// Apply `changes` to the device with `id`.
    ///
    /// Returns the number of rows matched (0 or 1).
    async fn update_device(&self, id: RecordId, changes: DeviceChanges) -> StoreResult<u64>;

    async fn get_device(&self, id: RecordId) -> StoreResult<Option<Device>>;

    /// All devices in insertion order.
    async fn list_devices(&self) -> StoreResult<Vec<Device>>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete_device(&self, id: RecordId) -> StoreResult<u64>;

    async fn insert_location(&self, name: String) -> StoreResult<Location>;

    async fn insert_api_user(&self, user: NewApiUser) -> StoreResult<ApiUser>;

    /// Release any pooled connections.
    async fn close(&self);
}

/// Build the storage backend selected by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Arc<dyn DeviceStore>> {
    match settings.backend {
        StorageBackend::Postgres => {
            info!(
                "Connecting to PostgreSQL database '{}' at {}:{}",
                settings.name, settings.host, settings.port
            );
            let store = PostgresDeviceStore::connect(settings).await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage backend; data will not survive a restart");
            Ok(Arc::new(MemoryDeviceStore::new()))
        }
    }
}
