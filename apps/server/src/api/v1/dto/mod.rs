// Import and re-export DTOs from submodules
pub mod command;

pub use command::{CommandFormDto, CommandRequestDto, IndexQueryDto, SearchQueryDto};
