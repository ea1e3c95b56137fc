use anyhow::{Context, Result, anyhow};
use protocol::serde::{Deserialize, Serialize};
use protocol::toml;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use super::constants::{DEFAULT_DATABASE_PATH, DEFAULT_HOST, DEFAULT_POOL_SIZE, DEFAULT_PORT};

/// Root configuration container for TOML deserialization
///
/// This struct wraps the server configuration to match the structure
/// of the TOML configuration file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RootConfig {
    pub server_config: ServerConfig,
}

/// Configuration for the web process
///
/// Contains the listen address and the database settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP server to listen on
    pub addr: SocketAddr,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file; parent directories are created on startup
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Maximum number of pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            pool_size: default_pool_size(),
        }
    }
}

impl ServerConfig {
    /// Creates a new configuration builder with default values
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Builder seeded with this configuration, for applying overrides
    pub fn to_builder(&self) -> ServerConfigBuilder {
        ServerConfigBuilder::default()
            .host(self.addr.ip().to_string())
            .port(self.addr.port())
            .database_path(self.database.path.clone())
            .pool_size(self.database.pool_size)
    }

    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Result<Self>` - Loaded configuration or error
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let root_config: RootConfig =
            toml::from_str(content).with_context(|| "Failed to parse TOML config")?;
        Ok(root_config.server_config)
    }

    /// Generates an example TOML configuration based on the default values
    /// and prints it to the terminal.
    pub fn print_example_toml() {
        let root_config = match Self::builder().build() {
            Ok(server_config) => RootConfig { server_config },
            Err(e) => {
                eprintln!("Error building default configuration: {}", e);
                return;
            }
        };

        match toml::to_string_pretty(&root_config) {
            Ok(toml_str) => {
                println!("# Example Server Configuration");
                println!("{}", toml_str);
            }
            Err(e) => {
                eprintln!("Error generating example TOML: {}", e);
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            database: DatabaseConfig::default(),
        }
    }
}

/// Builder for creating ServerConfig instances
///
/// Provides a fluent interface for setting configuration parameters
/// with reasonable defaults.
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    database_path: Option<PathBuf>,
    pool_size: Option<u32>,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            database_path: Some(default_database_path()),
            pool_size: Some(DEFAULT_POOL_SIZE),
        }
    }
}

impl ServerConfigBuilder {
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    /// Builds a ServerConfig from the builder
    ///
    /// # Returns
    /// * `Result<ServerConfig>` - Built configuration or error
    pub fn build(self) -> Result<ServerConfig> {
        let host = self.host.ok_or_else(|| anyhow!("Host is required"))?;
        let port = self.port.ok_or_else(|| anyhow!("Port is required"))?;
        let ip: IpAddr = host
            .parse()
            .with_context(|| format!("Invalid IP address: {}", host))?;
        let addr = SocketAddr::new(ip, port);

        let pool_size = self.pool_size.unwrap_or(DEFAULT_POOL_SIZE);
        if pool_size == 0 {
            return Err(anyhow!("Pool size must be at least 1"));
        }

        Ok(ServerConfig {
            addr,
            database: DatabaseConfig {
                path: self.database_path.unwrap_or_else(default_database_path),
                pool_size,
            },
        })
    }
}
