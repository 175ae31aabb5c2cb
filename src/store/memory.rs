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

//! In-process storage backend.
//!
//! Mirrors the PostgreSQL backend's observable behavior: ids are generated
//! from per-table sequences starting at 1, `api_user.email` is unique, and
//! rows are listed in insertion order. Foreign keys are not enforced here;
//! the device service checks references before every write.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{DeviceStore, StoreError, StoreResult};
use crate::models::{ApiUser, Device, DeviceChanges, Location, NewApiUser, NewDevice, RecordId};

struct Table<T> {
    rows: IndexMap<RecordId, T>,
    last_id: RecordId,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: IndexMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> RecordId {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    api_users: Table<ApiUser>,
    locations: Table<Location>,
    devices: Table<Device>,
}

/// Thread-safe in-memory [`DeviceStore`].
#[derive(Clone, Default)]
pub struct MemoryDeviceStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored devices.
    pub async fn device_count(&self) -> usize {
        self.tables.read().await.devices.rows.len()
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn location_exists(&self, id: RecordId) -> StoreResult<bool> {
        Ok(self.tables.read().await.locations.rows.contains_key(&id))
    }

    async fn api_user_exists(&self, id: RecordId) -> StoreResult<bool> {
        Ok(self.tables.read().await.api_users.rows.contains_key(&id))
    }

    async fn insert_device(&self, device: NewDevice) -> StoreResult<Device> {
        let mut tables = self.tables.write().await;
        let id = tables.devices.next_id();
        let device = device.into_device(id);
        tables.devices.rows.insert(id, device.clone());
        Ok(device)
    }

    async fn update_device(&self, id: RecordId, changes: DeviceChanges) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        match tables.devices.rows.get_mut(&id) {
            Some(device) => {
                changes.apply_to(device);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_device(&self, id: RecordId) -> StoreResult<Option<Device>> {
        Ok(self.tables.read().await.devices.rows.get(&id).cloned())
    }

    async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        Ok(self.tables.read().await.devices.rows.values().cloned().collect())
    }

    async fn delete_device(&self, id: RecordId) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        // shift_remove keeps the remaining rows in insertion order
        Ok(tables.devices.rows.shift_remove(&id).map_or(0, |_| 1))
    }

    async fn insert_location(&self, name: String) -> StoreResult<Location> {
        let mut tables = self.tables.write().await;
        let id = tables.locations.next_id();
        let location = Location { id, name };
        tables.locations.rows.insert(id, location.clone());
        Ok(location)
    }

    async fn insert_api_user(&self, user: NewApiUser) -> StoreResult<ApiUser> {
        let mut tables = self.tables.write().await;
        if tables
            .api_users
            .rows
            .values()
            .any(|existing| existing.email == user.email)
        {
            return Err(StoreError::Conflict(format!(
                "api_user with email '{}' already exists",
                user.email
            )));
        }

        let id = tables.api_users.next_id();
        let api_user = ApiUser {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
        };
        tables.api_users.rows.insert(id, api_user.clone());
        Ok(api_user)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn new_device(location_id: RecordId, api_user_id: RecordId) -> NewDevice {
        NewDevice {
            name: "cam1".to_string(),
            device_type: "camera".to_string(),
            login: "admin".to_string(),
            password: "p".to_string(),
            location_id,
            api_user_id,
        }
    }

    #[tokio::test]
    async fn test_ids_are_generated_per_table() {
        let store = MemoryDeviceStore::new();
        let location = store.insert_location("Lab".to_string()).await.unwrap();
        let second = store.insert_location("Office".to_string()).await.unwrap();
        let device = store.insert_device(new_device(1, 1)).await.unwrap();

        assert_eq!(location.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(device.id, 1);
        assert!(store.location_exists(2).await.unwrap());
        assert!(!store.location_exists(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let store = MemoryDeviceStore::new();
        let user = NewApiUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
        };

        store.insert_api_user(user.clone()).await.unwrap();
        let result = store.insert_api_user(user).await;

        assert_matches!(result, Err(StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_report_rows_matched() {
        let store = MemoryDeviceStore::new();
        let device = store.insert_device(new_device(1, 1)).await.unwrap();

        let changes = DeviceChanges {
            name: Some("cam2".to_string()),
            ..Default::default()
        };
        assert_eq!(store.update_device(device.id, changes.clone()).await.unwrap(), 1);
        assert_eq!(store.update_device(99, changes).await.unwrap(), 0);

        let stored = store.get_device(device.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "cam2");

        assert_eq!(store.delete_device(99).await.unwrap(), 0);
        assert_eq!(store.delete_device(device.id).await.unwrap(), 1);
        assert_eq!(store.device_count().await, 0);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_after_delete() {
        let store = MemoryDeviceStore::new();
        for _ in 0..3 {
            store.insert_device(new_device(1, 1)).await.unwrap();
        }
        store.delete_device(2).await.unwrap();

        let ids: Vec<RecordId> = store
            .list_devices()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
