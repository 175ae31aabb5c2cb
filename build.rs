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

use std::process::Command;

fn main() {
    // Surfaced by `device-registry --version` together with the sqlx version
    let rustc_version = Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .unwrap_or_else(|| "unknown".into());
    println!(
        "cargo:rustc-env=DEVICE_REGISTRY_RUSTC_VERSION={}",
        rustc_version.trim()
    );

    let sqlx_version = read_dep_version("sqlx").unwrap_or_else(|| "unknown".into());
    println!("cargo:rustc-env=DEVICE_REGISTRY_SQLX_VERSION={sqlx_version}");
    println!("cargo:rerun-if-changed=Cargo.lock");
}

fn read_dep_version(crate_name: &str) -> Option<String> {
    let lock_contents = std::fs::read_to_string("Cargo.lock").ok()?;
    let name_line = format!("name = \"{crate_name}\"");
    let mut lines = lock_contents.lines();
    while let Some(line) = lines.next() {
        if line.trim() == name_line {
            let version = lines.next()?;
            return version
                .strip_prefix("version = ")
                .map(|v| v.trim_matches('"').to_string());
        }
    }
    None
}
