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

// Allow println! in main.rs for CLI user-facing output (validate, add-* commands)
#![allow(clippy::print_stdout)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use device_registry::store;
use device_registry::{
    load_or_env, DeviceRegistryConfig, DeviceRegistryServer, DeviceStore, NewApiUser,
    StorageBackend,
};

#[derive(Parser)]
#[command(name = "device-registry")]
#[command(about = "HTTP API for managing devices, their locations and API users")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nrustc: ",
    env!("DEVICE_REGISTRY_RUSTC_VERSION"),
    "\nsqlx: ",
    env!("DEVICE_REGISTRY_SQLX_VERSION"),
))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file
    #[arg(
        short,
        long,
        default_value = "config/server.yaml",
        env = "DEVICE_REGISTRY_CONFIG",
        global = true
    )]
    config: PathBuf,

    /// Override the server port
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server (default if no subcommand specified)
    Run,

    /// Validate the configuration (file or environment) without starting the server
    Validate {
        /// Show resolved configuration with environment variables expanded
        #[arg(long)]
        show_resolved: bool,
    },

    /// Create the database tables and exit
    InitDb,

    /// Insert a location and print its id
    AddLocation {
        #[arg(long)]
        name: String,
    },

    /// Insert an API user and print its id
    AddUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    load_env_files(&cli.config);

    match cli.command {
        Some(Commands::Validate { show_resolved }) => validate_config(&cli.config, show_resolved),
        Some(Commands::InitDb) => init_db(&cli.config).await,
        Some(Commands::AddLocation { name }) => add_location(&cli.config, name).await,
        Some(Commands::AddUser {
            name,
            email,
            password,
        }) => {
            add_user(
                &cli.config,
                NewApiUser {
                    name,
                    email,
                    password,
                },
            )
            .await
        }
        // Default behavior: run the server
        Some(Commands::Run) | None => run_server(&cli.config, cli.port).await,
    }
}

/// Load `.env` from the working directory and from the config file's directory.
fn load_env_files(config_path: &Path) {
    let _ = dotenvy::dotenv();

    if let Some(config_dir) = config_path.parent() {
        let env_file = config_dir.join(".env");
        if env_file.exists() {
            if let Err(e) = dotenvy::from_path(&env_file) {
                eprintln!("Warning: Failed to load .env file: {e}");
            }
        }
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_runtime_config(
    config_path: &Path,
    port_override: Option<u16>,
) -> Result<DeviceRegistryConfig> {
    let mut config = load_or_env(config_path)?;
    if let Some(port) = port_override {
        config.server.port = port;
    }
    init_logging(&config.server.log_level);
    Ok(config)
}

async fn run_server(config_path: &Path, port_override: Option<u16>) -> Result<()> {
    let config = load_runtime_config(config_path, port_override)?;
    info!("Config file: {}", config_path.display());
    info!("Port: {}", config.server.port);

    DeviceRegistryServer::new(config).run().await
}

/// Validate the configuration the server would start with.
fn validate_config(config_path: &Path, show_resolved: bool) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let source = if config_path.exists() {
        format!("file {}", config_path.display())
    } else {
        "environment variables (config file not found)".to_string()
    };

    match load_or_env(config_path) {
        Ok(config) => {
            println!("[OK] Configuration is valid");
            println!("  Source: {source}");
            println!();

            println!("Summary:");
            println!("  Listen: {}:{}", config.server.host, config.server.port);
            let backend = match config.database.backend {
                StorageBackend::Postgres => "postgres",
                StorageBackend::Memory => "memory",
            };
            println!("  Storage backend: {backend}");

            if show_resolved {
                println!();
                println!("Resolved settings:");
                println!("  Log Level: {}", config.server.log_level);
                if config.database.backend == StorageBackend::Postgres {
                    let db = &config.database;
                    println!("  Database: {}", db.name);
                    println!("  Database User: {}", db.user);
                    println!("  Database Password: ***");
                    println!("  Database Host: {}:{}", db.host, db.port);
                    println!("  Max Connections: {}", db.max_connections);
                }
            }

            Ok(())
        }
        Err(e) => {
            println!("[ERROR] Configuration is invalid:");
            println!("  Source: {source}");
            println!("  {e}");
            std::process::exit(1);
        }
    }
}

async fn init_db(config_path: &Path) -> Result<()> {
    let config = load_runtime_config(config_path, None)?;
    let store = store::connect(&config.database).await?;

    let result = store.ensure_schema().await;
    store.close().await;
    result?;

    println!("[OK] Database schema is ready");
    Ok(())
}

async fn add_location(config_path: &Path, name: String) -> Result<()> {
    let config = load_runtime_config(config_path, None)?;
    let store = store::connect(&config.database).await?;

    let result = match store.ensure_schema().await {
        Ok(()) => store.insert_location(name).await,
        Err(e) => Err(e),
    };
    store.close().await;

    let location = result?;
    println!("Created location '{}' with id {}", location.name, location.id);
    Ok(())
}

async fn add_user(config_path: &Path, user: NewApiUser) -> Result<()> {
    let config = load_runtime_config(config_path, None)?;
    let store = store::connect(&config.database).await?;

    let result = match store.ensure_schema().await {
        Ok(()) => store.insert_api_user(user).await,
        Err(e) => Err(e),
    };
    store.close().await;

    let user = result?;
    println!("Created API user '{}' <{}> with id {}", user.name, user.email, user.id);
    Ok(())
}
