use anyhow::{Context, Result, anyhow};
use diesel::Connection;
use diesel::RunQueryDsl;
use diesel::sql_query;
use tracing::{debug, info};

use super::DbPool;

/// Schema statements, all safe to run against an already initialized database
pub(super) const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS commands (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        command VARCHAR(200) NOT NULL,
        description TEXT,
        tags VARCHAR(100),
        created_at TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS ix_commands_command ON commands (command)",
    "CREATE INDEX IF NOT EXISTS ix_commands_tags ON commands (tags)",
    "CREATE INDEX IF NOT EXISTS ix_commands_created_at ON commands (created_at)",
    "CREATE TABLE IF NOT EXISTS subcommands (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        command_id INTEGER NOT NULL REFERENCES commands (id) ON DELETE CASCADE,
        command VARCHAR(200) NOT NULL,
        description VARCHAR(300)
    )",
    "CREATE INDEX IF NOT EXISTS ix_subcommands_command_id ON subcommands (command_id)",
];

pub fn initialize_schema(pool: &DbPool) -> Result<()> {
    info!("Initializing database schema");

    let mut conn = pool.get().context("Failed to get database connection")?;

    conn.transaction(|conn| {
        for statement in STATEMENTS {
            debug!("Executing schema statement: {}", statement);
            sql_query(*statement).execute(conn)?;
        }
        Ok::<_, diesel::result::Error>(())
    })
    .map_err(|e| anyhow!("Schema initialization failed: {}", e))?;

    info!("Database schema ready");
    Ok(())
}
