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

//! PostgreSQL storage backend.

use async_trait::async_trait;
use log::{debug, info};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;

use super::{DeviceStore, StoreError, StoreResult};
use crate::config::DatabaseSettings;
use crate::models::{ApiUser, Device, DeviceChanges, Location, NewApiUser, NewDevice, RecordId};

const SCHEMA_STATEMENTS: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS api_user (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        password VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS location (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS device (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        device_type VARCHAR(255) NOT NULL,
        login VARCHAR(255) NOT NULL,
        password VARCHAR(255) NOT NULL,
        location_id BIGINT NOT NULL REFERENCES location (id),
        api_user_id BIGINT NOT NULL REFERENCES api_user (id)
    )
    "#,
];

const DEVICE_COLUMNS: &str = "id, name, device_type, login, password, location_id, api_user_id";

/// [`DeviceStore`] backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresDeviceStore {
    pool: PgPool,
}

impl PostgresDeviceStore {
    /// Open a pool using the discrete connection settings.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.name);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }
}

/// Map unique violations to [`StoreError::Conflict`].
fn map_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(db_err.message().to_string())
        }
        _ => StoreError::Database(err),
    }
}

/// `UPDATE device SET ... WHERE id = $N` covering only the fields in `changes`.
fn update_statement(id: RecordId, changes: DeviceChanges) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE device SET ");
    {
        let mut assignments = builder.separated(", ");
        if let Some(name) = changes.name {
            assignments.push("name = ").push_bind_unseparated(name);
        }
        if let Some(device_type) = changes.device_type {
            assignments
                .push("device_type = ")
                .push_bind_unseparated(device_type);
        }
        if let Some(login) = changes.login {
            assignments.push("login = ").push_bind_unseparated(login);
        }
        if let Some(password) = changes.password {
            assignments.push("password = ").push_bind_unseparated(password);
        }
        if let Some(location_id) = changes.location_id {
            assignments
                .push("location_id = ")
                .push_bind_unseparated(location_id);
        }
        if let Some(api_user_id) = changes.api_user_id {
            assignments
                .push("api_user_id = ")
                .push_bind_unseparated(api_user_id);
        }
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder
}

#[async_trait]
impl DeviceStore for PostgresDeviceStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is ready");
        Ok(())
    }

    async fn location_exists(&self, id: RecordId) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM location WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn api_user_exists(&self, id: RecordId) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM api_user WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_device(&self, device: NewDevice) -> StoreResult<Device> {
        let sql = format!(
            "INSERT INTO device (name, device_type, login, password, location_id, api_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {DEVICE_COLUMNS}"
        );
        let stored: Device = sqlx::query_as(&sql)
            .bind(&device.name)
            .bind(&device.device_type)
            .bind(&device.login)
            .bind(&device.password)
            .bind(device.location_id)
            .bind(device.api_user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(stored)
    }

    async fn update_device(&self, id: RecordId, changes: DeviceChanges) -> StoreResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut builder = update_statement(id, changes);
        debug!("Executing device update: {}", builder.sql());
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(result.rows_affected())
    }

    async fn get_device(&self, id: RecordId) -> StoreResult<Option<Device>> {
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM device WHERE id = $1");
        let device: Option<Device> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(device)
    }

    async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM device ORDER BY id");
        let devices: Vec<Device> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(devices)
    }

    async fn delete_device(&self, id: RecordId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM device WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_location(&self, name: String) -> StoreResult<Location> {
        let location: Location =
            sqlx::query_as("INSERT INTO location (name) VALUES ($1) RETURNING id, name")
                .bind(name)
                .fetch_one(&self.pool)
                .await
                .map_err(map_write_error)?;
        Ok(location)
    }

    async fn insert_api_user(&self, user: NewApiUser) -> StoreResult<ApiUser> {
        let api_user: ApiUser = sqlx::query_as(
            r#"
            INSERT INTO api_user (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password
            "#,
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(api_user)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_statement_covers_only_sent_fields() {
        let changes = DeviceChanges {
            login: Some("newlogin".to_string()),
            ..Default::default()
        };

        let builder = update_statement(5, changes);

        assert_eq!(builder.sql(), "UPDATE device SET login = $1 WHERE id = $2");
    }

    #[test]
    fn test_update_statement_full_mask() {
        let changes = DeviceChanges::from(NewDevice {
            name: "cam1".to_string(),
            device_type: "camera".to_string(),
            login: "admin".to_string(),
            password: "p".to_string(),
            location_id: 1,
            api_user_id: 2,
        });

        let builder = update_statement(5, changes);

        assert_eq!(
            builder.sql(),
            "UPDATE device SET name = $1, device_type = $2, login = $3, password = $4, \
             location_id = $5, api_user_id = $6 WHERE id = $7"
        );
    }
}
