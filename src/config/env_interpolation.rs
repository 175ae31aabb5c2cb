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

//! `${VAR}` / `${VAR:-default}` substitution for configuration text.
//!
//! ```
//! use device_registry::config::env_interpolation::interpolate;
//!
//! std::env::set_var("DOC_DB_HOST", "db.internal");
//! let text = interpolate("host: ${DOC_DB_HOST}\nport: ${DOC_DB_PORT:-5432}").unwrap();
//! assert_eq!(text, "host: db.internal\nport: 5432");
//! ```

use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Regex};
use std::env;

/// Upper bound on the interpolated document size.
const MAX_INTERPOLATED_LENGTH: usize = 1_000_000;

lazy_static! {
    // 1: variable name, 2: default value (without the `:-`)
    static ref VARIABLE_REFERENCE: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("variable reference pattern is valid");
}

#[derive(Debug, thiserror::Error)]
pub enum InterpolationError {
    #[error("Environment variable '{name}' is not set and has no default value")]
    MissingVariable { name: String },

    #[error("Environment variable '{name}' is not valid unicode")]
    NotUnicode { name: String },

    #[error("Interpolated configuration exceeds {} bytes", MAX_INTERPOLATED_LENGTH)]
    ResultTooLarge,
}

fn resolve(caps: &Captures<'_>) -> Result<String, InterpolationError> {
    let name = &caps[1];
    let default = caps.get(2).map(|m| m.as_str());

    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) | Err(env::VarError::NotPresent) => {
            default
                .map(str::to_string)
                .ok_or_else(|| InterpolationError::MissingVariable {
                    name: name.to_string(),
                })
        }
        Err(env::VarError::NotUnicode(_)) => Err(InterpolationError::NotUnicode {
            name: name.to_string(),
        }),
    }
}

/// Replace every variable reference in `input`.
///
/// An empty variable is treated like an unset one, so `${VAR:-x}` yields `x`
/// for both. References without a default fail when the variable is unset.
/// Substitution is single-pass: values are never expanded again.
pub fn interpolate(input: &str) -> Result<String, InterpolationError> {
    let mut output = String::with_capacity(input.len());
    let mut cursor = 0;
    let mut substituted = Vec::new();

    for caps in VARIABLE_REFERENCE.captures_iter(input) {
        let Some(reference) = caps.get(0) else {
            continue;
        };
        output.push_str(&input[cursor..reference.start()]);
        output.push_str(&resolve(&caps)?);
        cursor = reference.end();
        substituted.push(caps[1].to_string());

        if output.len() > MAX_INTERPOLATED_LENGTH {
            return Err(InterpolationError::ResultTooLarge);
        }
    }
    output.push_str(&input[cursor..]);

    if !substituted.is_empty() {
        debug!("Interpolated environment variables: {}", substituted.join(", "));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_substitutes_set_variables() {
        env::set_var("INTERP_TEST_USER", "registry");
        env::set_var("INTERP_TEST_NAME", "devices");

        let result = interpolate("user: ${INTERP_TEST_USER}\nname: ${INTERP_TEST_NAME}").unwrap();

        assert_eq!(result, "user: registry\nname: devices");
    }

    #[test]
    #[serial]
    fn test_default_used_for_unset_and_empty() {
        env::remove_var("INTERP_TEST_UNSET");
        env::set_var("INTERP_TEST_EMPTY", "");

        let result =
            interpolate("a: ${INTERP_TEST_UNSET:-5432}, b: ${INTERP_TEST_EMPTY:-x}").unwrap();

        assert_eq!(result, "a: 5432, b: x");
    }

    #[test]
    #[serial]
    fn test_empty_default_is_allowed() {
        env::remove_var("INTERP_TEST_UNSET");

        assert_eq!(interpolate("pw: '${INTERP_TEST_UNSET:-}'").unwrap(), "pw: ''");
    }

    #[test]
    #[serial]
    fn test_missing_variable_without_default_fails() {
        env::remove_var("INTERP_TEST_REQUIRED");

        let result = interpolate("host: ${INTERP_TEST_REQUIRED}");

        assert_matches!(
            result,
            Err(InterpolationError::MissingVariable { name }) if name == "INTERP_TEST_REQUIRED"
        );
    }

    #[test]
    #[serial]
    fn test_values_are_not_expanded_twice() {
        env::set_var("INTERP_TEST_NESTED", "${INTERP_TEST_OTHER}");

        assert_eq!(interpolate("${INTERP_TEST_NESTED}").unwrap(), "${INTERP_TEST_OTHER}");
    }

    #[test]
    fn test_text_without_references_is_unchanged() {
        let text = "server:\n  port: 8080\n  note: $HOME {not a ref}";
        assert_eq!(interpolate(text).unwrap(), text);
    }
}
