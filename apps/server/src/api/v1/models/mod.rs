mod command;
mod listing;

pub use command::{Command, CommandDraft, CommandWithSubcommands, Subcommand};
pub use listing::{CommandPage, ListParams, SortDirection, SortField};
