pub mod constants;
pub mod server_config;

// Re-export commonly used items
pub use constants::{DEFAULT_PER_PAGE, MAX_COMMAND_LEN, MAX_PER_PAGE, MAX_SUBCOMMAND_DESCRIPTION_LEN};
pub use server_config::{DatabaseConfig, ServerConfig};
