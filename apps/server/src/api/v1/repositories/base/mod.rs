use anyhow::{Context, Result};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;

use crate::database::DbPool;

pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

// Generic repository trait that provides common database functionality
pub trait Repository {
    fn get_pool(&self) -> &DbPool;

    // Helper method to get a database connection from the pool
    fn get_connection(&self) -> Result<DbConnection> {
        self.get_pool()
            .get()
            .context("Failed to get database connection")
    }
}

// Base repository struct that implements the Repository trait
pub struct BaseRepository {
    pool: DbPool,
}

impl BaseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Repository for BaseRepository {
    fn get_pool(&self) -> &DbPool {
        &self.pool
    }
}
