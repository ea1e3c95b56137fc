use chrono::NaiveDateTime;
use diesel::prelude::*;
use protocol::text::trimmed_or_none;
use protocol::{CommandRecord, SubcommandRecord};
use validator::Validate;

use crate::config::{MAX_COMMAND_LEN, MAX_SUBCOMMAND_DESCRIPTION_LEN};
use crate::database::schema::{commands, subcommands};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = commands)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Command {
    pub id: i32,
    pub command: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    /// Stored without offset; always UTC
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Command, foreign_key = command_id))]
#[diesel(table_name = subcommands)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Subcommand {
    pub id: i32,
    pub command_id: i32,
    pub command: String,
    pub description: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = commands)]
pub struct NewCommand<'a> {
    pub command: &'a str,
    pub description: Option<&'a str>,
    pub tags: Option<&'a str>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = subcommands)]
pub struct NewSubcommand<'a> {
    pub command_id: i32,
    pub command: &'a str,
    pub description: Option<&'a str>,
}

/// A command loaded together with its subcommands, ordered by id
#[derive(Debug, Clone, PartialEq)]
pub struct CommandWithSubcommands {
    pub command: Command,
    pub subcommands: Vec<Subcommand>,
}

impl From<CommandWithSubcommands> for CommandRecord {
    fn from(value: CommandWithSubcommands) -> Self {
        let CommandWithSubcommands {
            command,
            subcommands,
        } = value;

        CommandRecord {
            id: command.id,
            command: command.command,
            description: command.description,
            tags: command.tags,
            created_at: command.created_at.map(|ts| ts.and_utc()),
            subcommands: subcommands
                .into_iter()
                .map(|sub| SubcommandRecord {
                    command: sub.command,
                    description: sub.description,
                })
                .collect(),
        }
    }
}

/// Normalized field values for a create, update or import
///
/// Construct with [`CommandDraft::normalized`] and call `validate()`
/// before handing it to the repository.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CommandDraft {
    #[validate(length(
        min = 1,
        max = MAX_COMMAND_LEN,
        message = "Command must be between 1 and 200 characters"
    ))]
    pub command: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    #[validate(nested)]
    pub subcommands: Vec<SubcommandDraft>,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SubcommandDraft {
    #[validate(length(
        min = 1,
        max = MAX_COMMAND_LEN,
        message = "Subcommand must be between 1 and 200 characters"
    ))]
    pub command: String,
    #[validate(length(
        max = MAX_SUBCOMMAND_DESCRIPTION_LEN,
        message = "Subcommand description must be at most 300 characters"
    ))]
    pub description: Option<String>,
}

impl CommandDraft {
    /// Trims every field. Blank optional fields become `None` and
    /// subcommands whose command is blank are dropped.
    pub fn normalized<'a, I>(
        command: &str,
        description: Option<&str>,
        tags: Option<&str>,
        subcommands: I,
    ) -> Self
    where
        I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
    {
        Self {
            command: command.trim().to_string(),
            description: trimmed_or_none(description),
            tags: trimmed_or_none(tags),
            subcommands: subcommands
                .into_iter()
                .filter_map(|(command, description)| {
                    trimmed_or_none(command).map(|command| SubcommandDraft {
                        command,
                        description: trimmed_or_none(description),
                    })
                })
                .collect(),
        }
    }

    pub fn as_new_command(&self, created_at: NaiveDateTime) -> NewCommand<'_> {
        NewCommand {
            command: &self.command,
            description: self.description.as_deref(),
            tags: self.tags.as_deref(),
            created_at: Some(created_at),
        }
    }

    pub fn new_subcommands(&self, command_id: i32) -> Vec<NewSubcommand<'_>> {
        self.subcommands
            .iter()
            .map(|sub| NewSubcommand {
                command_id,
                command: &sub.command,
                description: sub.description.as_deref(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_and_drops_blank_subcommands() {
        let draft = CommandDraft::normalized(
            "  docker ps  ",
            Some("   "),
            Some(" containers "),
            vec![
                (Some(" -a "), Some("  all  ")),
                (Some("   "), Some("ignored")),
                (None, None),
                (Some("-q"), Some("")),
            ],
        );

        assert_eq!(draft.command, "docker ps");
        assert_eq!(draft.description, None);
        assert_eq!(draft.tags.as_deref(), Some("containers"));
        assert_eq!(
            draft.subcommands,
            vec![
                SubcommandDraft {
                    command: "-a".to_string(),
                    description: Some("all".to_string()),
                },
                SubcommandDraft {
                    command: "-q".to_string(),
                    description: None,
                },
            ]
        );
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn blank_command_fails_validation() {
        let draft = CommandDraft::normalized("   ", None, None, Vec::new());
        assert!(draft.validate().is_err());
    }

    #[test]
    fn length_limits_count_characters() {
        let at_limit = "é".repeat(200);
        let draft = CommandDraft::normalized(&at_limit, None, None, Vec::new());
        assert!(draft.validate().is_ok());

        let over = "x".repeat(201);
        let draft = CommandDraft::normalized(&over, None, None, Vec::new());
        assert!(draft.validate().is_err());
    }

    #[test]
    fn long_subcommand_description_fails_validation() {
        let description = "d".repeat(301);
        let draft = CommandDraft::normalized(
            "git",
            None,
            None,
            vec![(Some("log"), Some(description.as_str()))],
        );
        assert!(draft.validate().is_err());
    }
}
