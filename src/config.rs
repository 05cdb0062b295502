//! Configuration management for the schoollibrary server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. Without it the catalog lives in memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// External executables used for authentication and the borrower roster.
///
/// Each hook has a local and a system-wide path; the local one wins when it exists.
#[derive(Debug, Deserialize, Clone)]
pub struct HooksConfig {
    pub auth_local: PathBuf,
    pub auth_system: PathBuf,
    pub users_local: PathBuf,
    pub users_system: PathBuf,
    pub timeout_secs: u64,
}

/// Group names reported by the auth hook that grant library capabilities
#[derive(Debug, Deserialize, Clone)]
pub struct GroupsConfig {
    pub admin: String,
    pub modify: String,
    pub delete: String,
    pub lend: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CsrfConfig {
    pub rotation_hours: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LendingConfig {
    pub default_days: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub groups: GroupsConfig,
    #[serde(default)]
    pub csrf: CsrfConfig,
    #[serde(default)]
    pub lending: LendingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix SCHOOLLIBRARY_)
            .add_source(
                Environment::with_prefix("SCHOOLLIBRARY")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option(
                "server.port",
                env::var("PORT").ok().and_then(|port| port.parse::<i64>().ok()),
            )?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            auth_local: PathBuf::from("./hooks/auth.sh"),
            auth_system: PathBuf::from("/usr/share/schoollibrary/auth-iserv.php"),
            users_local: PathBuf::from("./hooks/users.sh"),
            users_system: PathBuf::from("/usr/share/schoollibrary/users-iserv.php"),
            timeout_secs: 10,
        }
    }
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            admin: "library_admin".to_string(),
            modify: "library_modify".to_string(),
            delete: "library_delete".to_string(),
            lend: "library_lend".to_string(),
        }
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self { rotation_hours: 24 }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self { default_days: 14 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
