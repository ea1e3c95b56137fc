// Import and re-export services from submodules
mod command;
mod error;

pub use command::CommandService;
pub use error::ServiceError;
