// Import and re-export controllers from submodules
pub mod command;
pub mod root;
pub mod web;

pub use command::CommandController;
pub use root::RootController;
pub use web::WebController;
