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

//! Validated create/replace/patch/delete for devices.
//!
//! Every mutating operation validates its input before touching storage:
//! required fields first, then the location reference, then the API user
//! reference, and only then the write itself. A write that matches no row is
//! reported as [`DeviceError::NotFound`].


use log::{debug, info, warn};
use std::sync::Arc;

use super::error::{DeviceError, DeviceResult, Operation, ValidationFailure};
use crate::models::{Device, DeviceChanges, DeviceInput, NewDevice, RecordId};
use crate::store::DeviceStore;

const DEVICE_FIELDS: [&str; 6] = [
    "name",
    "device_type",
    "login",
    "password",
    "location_id",
    "api_user_id",
];

/// List the keys missing from a create or replace body.
fn require_all_fields(input: &DeviceInput) -> Result<(), ValidationFailure> {
    let present = input.field_names();
    let missing: Vec<&'static str> = DEVICE_FIELDS
        .into_iter()
        .filter(|field| !present.contains(field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::MissingRequiredFields(missing))
    }
}

/// Turn checked changes into a complete device.
fn into_new_device(changes: DeviceChanges) -> Result<NewDevice, ValidationFailure> {
    match changes {
        DeviceChanges {
            name: Some(name),
            device_type: Some(device_type),
            login: Some(login),
            password: Some(password),
            location_id: Some(location_id),
            api_user_id: Some(api_user_id),
        } => Ok(NewDevice {
            name,
            device_type,
            login,
            password,
            location_id,
            api_user_id,
        }),
        partial => {
            let present = partial.field_names();
            let missing = DEVICE_FIELDS
                .into_iter()
                .filter(|field| !present.contains(field))
                .collect();
            Err(ValidationFailure::MissingRequiredFields(missing))
        }
    }
}

/// The device mutation pipeline. Handlers call into this.
pub struct DeviceService {
    store: Arc<dyn DeviceStore>,
}

impl DeviceService {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    /// Create a device. All six fields are required.
    pub async fn create(&self, input: DeviceInput) -> DeviceResult<Device> {
        let operation = Operation::Create;
        require_all_fields(&input)?;
        self.check_references(input.location_id, input.api_user_id, operation)
            .await?;
        let new_device = into_new_device(input.into_changes())?;

        let device = self
            .store
            .insert_device(new_device)
            .await
            .map_err(DeviceError::storage(operation))?;

        info!("Device created successfully: {}", device.id);
        Ok(device)
    }

    /// Overwrite all fields of device `id`.
    pub async fn replace(&self, id: RecordId, input: DeviceInput) -> DeviceResult<Device> {
        let operation = Operation::Replace;
        require_all_fields(&input)?;
        self.check_references(input.location_id, input.api_user_id, operation)
            .await?;
        let new_device = into_new_device(input.into_changes())?;

        let device = self
            .apply_changes(id, DeviceChanges::from(new_device), operation)
            .await?;
        info!("Device updated successfully: {id}");
        Ok(device)
    }

    /// Overwrite only the fields present in `input`.
    pub async fn partial_update(&self, id: RecordId, input: DeviceInput) -> DeviceResult<Device> {
        let operation = Operation::Patch;
        if input.field_names().is_empty() {
            return Err(ValidationFailure::NoFieldsToUpdate.into());
        }
        self.check_references(input.location_id, input.api_user_id, operation)
            .await?;

        let changes = input.into_changes();
        debug!("Patching device {id}: fields {:?}", changes.field_names());
        let device = self.apply_changes(id, changes, operation).await?;
        info!("Device patched successfully: {id}");
        Ok(device)
    }

    /// Delete device `id`, returning the deleted id.
    pub async fn delete(&self, id: RecordId) -> DeviceResult<RecordId> {
        let removed = self
            .store
            .delete_device(id)
            .await
            .map_err(DeviceError::storage(Operation::Delete))?;

        if removed == 0 {
            return Err(DeviceError::NotFound { id });
        }
        info!("Device deleted successfully: {id}");
        Ok(id)
    }

    pub async fn get(&self, id: RecordId) -> DeviceResult<Device> {
        self.store
            .get_device(id)
            .await
            .map_err(DeviceError::storage(Operation::Get))?
            .ok_or(DeviceError::NotFound { id })
    }

    pub async fn list(&self) -> DeviceResult<Vec<Device>> {
        let devices = self
            .store
            .list_devices()
            .await
            .map_err(DeviceError::storage(Operation::List))?;
        debug!("Retrieved {} devices", devices.len());
        Ok(devices)
    }

    /// Check each sent reference. A `null` one fails without a lookup.
    async fn check_references(
        &self,
        location_id: Option<Option<RecordId>>,
        api_user_id: Option<Option<RecordId>>,
        operation: Operation,
    ) -> DeviceResult<()> {
        if let Some(location_id) = location_id {
            let exists = match location_id {
                Some(id) => self
                    .store
                    .location_exists(id)
                    .await
                    .map_err(DeviceError::storage(operation))?,
                None => false,
            };
            if !exists {
                return Err(ValidationFailure::InvalidLocation(location_id).into());
            }
        }

        if let Some(api_user_id) = api_user_id {
            let exists = match api_user_id {
                Some(id) => self
                    .store
                    .api_user_exists(id)
                    .await
                    .map_err(DeviceError::storage(operation))?,
                None => false,
            };
            if !exists {
                return Err(ValidationFailure::InvalidApiUser(api_user_id).into());
            }
        }

        Ok(())
    }

    /// Conditional update followed by a re-read of the row.
    async fn apply_changes(
        &self,
        id: RecordId,
        changes: DeviceChanges,
        operation: Operation,
    ) -> DeviceResult<Device> {
        let matched = self
            .store
            .update_device(id, changes)
            .await
            .map_err(DeviceError::storage(operation))?;

        if matched == 0 {
            warn!("Device not found for {operation}: {id}");
            return Err(DeviceError::NotFound { id });
        }

        // The row can disappear between the update and the re-read.
        self.store
            .get_device(id)
            .await
            .map_err(DeviceError::storage(operation))?
            .ok_or(DeviceError::NotFound { id })
    }
}
