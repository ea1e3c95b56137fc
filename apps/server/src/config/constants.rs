pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_PATH: &str = "instance/app.db";
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Page size used when none (or a non-positive one) is requested
pub const DEFAULT_PER_PAGE: i64 = 5;
pub const MAX_PER_PAGE: i64 = 500;

pub const MAX_COMMAND_LEN: u64 = 200;
pub const MAX_SUBCOMMAND_DESCRIPTION_LEN: u64 = 300;

/// Milliseconds a connection waits on a locked database before failing
pub const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Request body limit, sized for import uploads
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
