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

//! Configuration for the device registry server.
//!
//! Configuration comes from a YAML (or JSON) file with environment variable
//! interpolation, or, when no file exists, straight from the environment.
//!
//! ```yaml
//! server:
//!   host: "${SERVER_HOST:-127.0.0.1}"
//!   port: 8080
//!   log_level: info
//!
//! database:
//!   backend: postgres
//!   name: "${DB_NAME}"
//!   user: "${DB_USER}"
//!   password: "${DB_PASSWORD}"
//!   host: "${DB_HOST:-localhost}"
//!   port: ${DB_PORT:-5432}
//!   max_connections: 10
//! ```

pub mod env_interpolation;
pub mod loader;
pub mod types;

pub use loader::{load_config_file, load_or_env, parse_config_str, ConfigError};
pub use types::{DatabaseSettings, DeviceRegistryConfig, ServerSettings, StorageBackend};
