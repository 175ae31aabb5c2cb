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

use std::fmt;

use crate::models::RecordId;
use crate::store::StoreError;

/// The device operation that was being performed when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Replace,
    Patch,
    Delete,
    Get,
    List,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Replace => "update",
            Operation::Patch => "patch",
            Operation::Delete => "delete",
            Operation::Get => "read",
            Operation::List => "list",
        };
        f.write_str(name)
    }
}

/// Caller-supplied data that failed a precondition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// One or more of the six device fields were absent.
    #[error("missing required fields")]
    MissingRequiredFields(Vec<&'static str>),

    /// The location id matched no row, or was `null`.
    #[error("invalid location reference")]
    InvalidLocation(Option<RecordId>),

    /// The api_user id matched no row, or was `null`.
    #[error("invalid api_user reference")]
    InvalidApiUser(Option<RecordId>),

    #[error("no fields to update")]
    NoFieldsToUpdate,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid device id")]
    InvalidId(String),
}

/// Outcome of a failed device operation.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Device not found")]
    NotFound { id: RecordId },

    #[error("{operation} failed: {source}")]
    Storage {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl DeviceError {
    pub(crate) fn storage(operation: Operation) -> impl FnOnce(StoreError) -> DeviceError {
        move |source| DeviceError::Storage { operation, source }
    }
}

pub type DeviceResult<T> = Result<T, DeviceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationFailure::MissingRequiredFields(vec!["name"]).to_string(),
            "missing required fields"
        );
        assert_eq!(
            ValidationFailure::InvalidLocation(Some(3)).to_string(),
            "invalid location reference"
        );
        assert_eq!(
            ValidationFailure::InvalidApiUser(None).to_string(),
            "invalid api_user reference"
        );
        assert_eq!(
            ValidationFailure::NoFieldsToUpdate.to_string(),
            "no fields to update"
        );
    }

    #[test]
    fn test_device_error_display() {
        let not_found = DeviceError::NotFound { id: 999 };
        assert_eq!(not_found.to_string(), "Device not found");

        let validation: DeviceError = ValidationFailure::NoFieldsToUpdate.into();
        assert_eq!(validation.to_string(), "no fields to update");

        let storage = DeviceError::storage(Operation::Create)(StoreError::Database(
            sqlx::Error::PoolTimedOut,
        ));
        assert!(storage.to_string().starts_with("create failed: "));
    }
}
