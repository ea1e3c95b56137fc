// Import and re-export repositories from submodules
pub mod base;
pub mod command;

pub use command::CommandRepository;
