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

//! Data Transfer Objects for the device API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::{Device, DeviceInput, RecordId};
use crate::service::ValidationFailure;

/// Accept a key only when its value is not `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Keep an explicit `null` apart from an absent key.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Device fields accepted by POST, PUT and PATCH.
///
/// Every key is optional at this level; which ones are required depends on
/// the operation. Text fields may not be `null`. A `null` reference id is
/// kept so the service can reject it as an invalid reference. Unknown keys
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct DevicePayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub device_type: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub login: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub location_id: Option<Option<RecordId>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>)]
    pub api_user_id: Option<Option<RecordId>>,
}

impl DevicePayload {
    /// Interpret a request body. Only JSON objects are accepted.
    pub fn from_json(body: Value) -> Result<Self, ValidationFailure> {
        if !body.is_object() {
            return Err(ValidationFailure::InvalidBody(
                "expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(body).map_err(|e| ValidationFailure::InvalidBody(e.to_string()))
    }
}

impl From<DevicePayload> for DeviceInput {
    fn from(payload: DevicePayload) -> Self {
        DeviceInput {
            name: payload.name,
            device_type: payload.device_type,
            login: payload.login,
            password: payload.password,
            location_id: payload.location_id,
            api_user_id: payload.api_user_id,
        }
    }
}

/// Device representation returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeviceResponse {
    pub id: RecordId,
    pub name: String,
    pub device_type: String,
    pub login: String,
    pub password: String,
    pub location_id: RecordId,
    pub api_user_id: RecordId,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            id: device.id,
            name: device.name,
            device_type: device.device_type,
            login: device.login,
            password: device.password,
            location_id: device.location_id,
            api_user_id: device.api_user_id,
        }
    }
}

/// Confirmation returned by DELETE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub id: RecordId,
}

impl DeleteResponse {
    pub fn new(id: RecordId) -> Self {
        Self {
            message: format!("Device with id {id} was successfully deleted"),
            id,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Health status of the server
    pub status: String,
    /// Current server timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_payload_unknown_keys_ignored() {
        let payload = DevicePayload::from_json(json!({
            "name": "cam1",
            "color": "red"
        }))
        .unwrap();

        let input = DeviceInput::from(payload);
        assert_eq!(input.name.as_deref(), Some("cam1"));
        assert_eq!(input.field_names(), vec!["name"]);
    }

    #[test]
    fn test_payload_null_text_field_is_rejected() {
        let result = DevicePayload::from_json(json!({ "name": "cam1", "login": null }));
        assert_matches!(
            result,
            Err(ValidationFailure::InvalidBody(msg)) if msg.contains("invalid type: null")
        );
    }

    #[test]
    fn test_payload_null_reference_is_kept() {
        let payload = DevicePayload::from_json(json!({
            "location_id": null,
            "api_user_id": 4
        }))
        .unwrap();

        assert_eq!(payload.location_id, Some(None));
        assert_eq!(payload.api_user_id, Some(Some(4)));
        assert_eq!(
            DeviceInput::from(payload).field_names(),
            vec!["location_id", "api_user_id"]
        );
    }

    #[test]
    fn test_payload_rejects_non_object() {
        assert_matches!(
            DevicePayload::from_json(json!(["cam1", "camera"])),
            Err(ValidationFailure::InvalidBody(_))
        );
        assert_matches!(
            DevicePayload::from_json(json!("cam1")),
            Err(ValidationFailure::InvalidBody(_))
        );
    }

    #[test]
    fn test_payload_rejects_wrong_type() {
        let result = DevicePayload::from_json(json!({ "location_id": "one" }));
        assert_matches!(
            result,
            Err(ValidationFailure::InvalidBody(msg)) if msg.contains("invalid type")
        );
    }

    #[test]
    fn test_delete_message() {
        let body = serde_json::to_value(DeleteResponse::new(5)).unwrap();
        assert_eq!(
            body,
            json!({ "message": "Device with id 5 was successfully deleted", "id": 5 })
        );
    }
}
