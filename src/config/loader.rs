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

//! Loading the server configuration from disk.

use super::env_interpolation;
use super::types::DeviceRegistryConfig;
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable interpolation failed: {0}")]
    InterpolationError(#[from] env_interpolation::InterpolationError),

    #[error("Failed to parse config file '{path}': YAML error: {yaml_err}, JSON error: {json_err}")]
    ParseError {
        path: String,
        yaml_err: String,
        json_err: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(#[from] anyhow::Error),
}

/// Parse configuration text, YAML first and JSON as a fallback.
///
/// Environment variables are interpolated before parsing. The result is not
/// validated.
pub fn parse_config_str(content: &str, origin: &str) -> Result<DeviceRegistryConfig, ConfigError> {
    let interpolated = env_interpolation::interpolate(content)?;

    match serde_yaml::from_str::<DeviceRegistryConfig>(&interpolated) {
        Ok(config) => Ok(config),
        Err(yaml_err) => match serde_json::from_str::<DeviceRegistryConfig>(&interpolated) {
            Ok(config) => Ok(config),
            Err(json_err) => Err(ConfigError::ParseError {
                path: origin.to_string(),
                yaml_err: yaml_err.to_string(),
                json_err: json_err.to_string(),
            }),
        },
    }
}

/// Load and validate the configuration file at `path`.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<DeviceRegistryConfig, ConfigError> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref)?;
    let config = parse_config_str(&content, &path_ref.display().to_string())?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, otherwise build the configuration from the
/// environment (`DB_NAME`, `DB_USER`, ...). Either way the result is validated.
pub fn load_or_env<P: AsRef<Path>>(path: P) -> Result<DeviceRegistryConfig, ConfigError> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        info!("Loading configuration from {}", path_ref.display());
        return load_config_file(path_ref);
    }

    warn!(
        "Config file '{}' not found. Using environment variables.",
        path_ref.display()
    );
    let config = DeviceRegistryConfig::from_env()?;
    config.validate()?;
    Ok(config)
}
