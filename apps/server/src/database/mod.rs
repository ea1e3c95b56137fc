use anyhow::{Context, Result};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use std::fs;
use std::sync::OnceLock;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::config::constants::BUSY_TIMEOUT_MS;

mod schema_init;
pub mod schema;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Per-connection SQLite settings
///
/// Foreign keys are off by default in SQLite; cascading deletes of
/// subcommands depend on them.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub struct Database {
    pool: DbPool,
    schema_ready: OnceLock<()>,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let database_url = config.path.to_string_lossy().into_owned();
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout_ms: BUSY_TIMEOUT_MS,
            }))
            .build(manager)
            .context("Failed to create database connection pool")?;

        info!("Database connection pool created for {}", config.path.display());

        Ok(Self {
            pool,
            schema_ready: OnceLock::new(),
        })
    }

    pub fn get_pool(&self) -> &DbPool {
        &self.pool
    }

    /// Creates tables and indexes if they are absent
    ///
    /// Meant to run once at startup. Later calls on the same instance
    /// return immediately.
    pub fn initialize_schema(&self) -> Result<()> {
        if self.schema_ready.get().is_some() {
            return Ok(());
        }
        schema_init::initialize_schema(&self.pool)?;
        let _ = self.schema_ready.set(());
        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Opens an initialized database in a scratch directory
    ///
    /// The directory must outlive the database, so both are returned.
    pub fn temp_database() -> (TempDir, Database) {
        let dir = TempDir::new().expect("create temp dir");
        let config = DatabaseConfig {
            path: dir.path().join("test.db"),
            pool_size: 4,
        };
        let database = Database::new(&config).expect("open database");
        database.initialize_schema().expect("initialize schema");
        (dir, database)
    }
}
