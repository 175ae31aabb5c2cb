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

//! PostgreSQL backend tests.
//!
//! These start a PostgreSQL container and are ignored by default. Run with
//! `cargo test --test postgres_store_test -- --ignored` when Docker is available.

#![allow(clippy::unwrap_used)]

use device_registry::{
    DatabaseSettings, DeviceChanges, DeviceStore, NewApiUser, NewDevice, PostgresDeviceStore,
    StoreError,
};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

async fn start_store() -> (ContainerAsync<Postgres>, PostgresDeviceStore) {
    let container = Postgres::default().start().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    let settings = DatabaseSettings {
        name: "postgres".to_string(),
        user: "postgres".to_string(),
        password: "postgres".to_string(),
        host: "127.0.0.1".to_string(),
        port,
        ..Default::default()
    };
    let store = PostgresDeviceStore::connect(&settings).await.unwrap();
    store.ensure_schema().await.unwrap();
    (container, store)
}

async fn seed(store: &PostgresDeviceStore) -> (i64, i64) {
    let location = store.insert_location("HQ".to_string()).await.unwrap();
    let user = store
        .insert_api_user(NewApiUser {
            name: "ops".to_string(),
            email: "ops@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    (location.id, user.id)
}

fn new_device(location_id: i64, api_user_id: i64) -> NewDevice {
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
#[ignore = "requires Docker"]
async fn test_device_lifecycle() {
    let (_container, store) = start_store().await;
    let (location_id, api_user_id) = seed(&store).await;

    assert!(store.location_exists(location_id).await.unwrap());
    assert!(!store.api_user_exists(999).await.unwrap());

    let device = store
        .insert_device(new_device(location_id, api_user_id))
        .await
        .unwrap();
    assert_eq!(store.get_device(device.id).await.unwrap(), Some(device.clone()));

    let changes = DeviceChanges {
        login: Some("newlogin".to_string()),
        ..Default::default()
    };
    assert_eq!(store.update_device(device.id, changes).await.unwrap(), 1);
    let updated = store.get_device(device.id).await.unwrap().unwrap();
    assert_eq!(updated.login, "newlogin");
    assert_eq!(updated.name, device.name);

    assert_eq!(store.list_devices().await.unwrap().len(), 1);
    assert_eq!(store.delete_device(device.id).await.unwrap(), 1);
    assert_eq!(store.delete_device(device.id).await.unwrap(), 0);
    assert!(store.get_device(device.id).await.unwrap().is_none());

    store.close().await;
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_missing_row_matches_nothing() {
    let (_container, store) = start_store().await;

    let changes = DeviceChanges {
        name: Some("x".to_string()),
        ..Default::default()
    };
    assert_eq!(store.update_device(999, changes).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_schema_is_idempotent_and_email_unique() {
    let (_container, store) = start_store().await;
    store.ensure_schema().await.unwrap();
    seed(&store).await;

    let duplicate = store
        .insert_api_user(NewApiUser {
            name: "other".to_string(),
            email: "ops@example.com".to_string(),
            password: "x".to_string(),
        })
        .await;

    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
}
