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

//! Domain records shared by the storage backends and the device service.
//!
//! Foreign keys are kept as plain ids; nothing in this crate traverses the
//! relationships beyond checking that the referenced row exists.

/// Identifier type used by all three tables.
pub type RecordId = i64;

/// An API user that owns devices. Insert-only.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ApiUser {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Fields required to insert an [`ApiUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A location devices are installed at. Insert-only.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Location {
    pub id: RecordId,
    pub name: String,
}

/// A stored device row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Device {
    pub id: RecordId,
    pub name: String,
    pub device_type: String,
    pub login: String,
    pub password: String,
    pub location_id: RecordId,
    pub api_user_id: RecordId,
}

/// A fully specified device, used by create and replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub name: String,
    pub device_type: String,
    pub login: String,
    pub password: String,
    pub location_id: RecordId,
    pub api_user_id: RecordId,
}

impl NewDevice {
    pub fn into_device(self, id: RecordId) -> Device {
        Device {
            id,
            name: self.name,
            device_type: self.device_type,
            login: self.login,
            password: self.password,
            location_id: self.location_id,
            api_user_id: self.api_user_id,
        }
    }
}

/// Device fields as submitted by a client, before validation.
///
/// For the reference ids the outer `Option` records whether the key was sent
/// and the inner one whether it was `null`; a `null` reference never matches a
/// row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInput {
    pub name: Option<String>,
    pub device_type: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub location_id: Option<Option<RecordId>>,
    pub api_user_id: Option<Option<RecordId>>,
}

impl DeviceInput {
    /// Names of the keys that were sent, `null` references included.
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("device_type", self.device_type.is_some()),
            ("login", self.login.is_some()),
            ("password", self.password.is_some()),
            ("location_id", self.location_id.is_some()),
            ("api_user_id", self.api_user_id.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Drop the key/`null` distinction once the references have been checked.
    pub fn into_changes(self) -> DeviceChanges {
        DeviceChanges {
            name: self.name,
            device_type: self.device_type,
            login: self.login,
            password: self.password,
            location_id: self.location_id.flatten(),
            api_user_id: self.api_user_id.flatten(),
        }
    }
}

/// Update mask for a device: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub device_type: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub location_id: Option<RecordId>,
    pub api_user_id: Option<RecordId>,
}

impl DeviceChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.device_type.is_none()
            && self.login.is_none()
            && self.password.is_none()
            && self.location_id.is_none()
            && self.api_user_id.is_none()
    }

    /// Merge the mask into an existing row.
    pub fn apply_to(&self, device: &mut Device) {
        if let Some(name) = &self.name {
            device.name = name.clone();
        }
        if let Some(device_type) = &self.device_type {
            device.device_type = device_type.clone();
        }
        if let Some(login) = &self.login {
            device.login = login.clone();
        }
        if let Some(password) = &self.password {
            device.password = password.clone();
        }
        if let Some(location_id) = self.location_id {
            device.location_id = location_id;
        }
        if let Some(api_user_id) = self.api_user_id {
            device.api_user_id = api_user_id;
        }
    }

    /// Names of the fields present in the mask, for logging.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.name.is_some() {
            names.push("name");
        }
        if self.device_type.is_some() {
            names.push("device_type");
        }
        if self.login.is_some() {
            names.push("login");
        }
        if self.password.is_some() {
            names.push("password");
        }
        if self.location_id.is_some() {
            names.push("location_id");
        }
        if self.api_user_id.is_some() {
            names.push("api_user_id");
        }
        names
    }
}

impl From<NewDevice> for DeviceChanges {
    fn from(device: NewDevice) -> Self {
        Self {
            name: Some(device.name),
            device_type: Some(device.device_type),
            login: Some(device.login),
            password: Some(device.password),
            location_id: Some(device.location_id),
            api_user_id: Some(device.api_user_id),
        }
    }
}
