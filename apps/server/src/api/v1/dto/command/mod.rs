use serde::{Deserialize, Serialize};

/// Body of `POST /api/commands` and `PUT /api/commands/{id}`
///
/// Every field is optional at the serde level so that a missing
/// `command` is reported as a validation error instead of a parse error.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CommandRequestDto {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub subcommands: Option<Vec<SubcommandRequestDto>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SubcommandRequestDto {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQueryDto {
    pub search: Option<String>,
}

/// Query string of the index page
///
/// Numbers stay strings here; values that do not parse fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQueryDto {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl IndexQueryDto {
    pub fn page(&self) -> Option<i64> {
        self.page.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn per_page(&self) -> Option<i64> {
        self.per_page.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// Fields of the add/edit form
///
/// Subcommands arrive as two parallel arrays, `subcmd_command[]` and
/// `subcmd_description[]`, paired up by position.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommandFormDto {
    pub command: String,
    pub description: String,
    pub tags: String,
    pub subcmd_commands: Vec<String>,
    pub subcmd_descriptions: Vec<String>,
}

impl CommandFormDto {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "command" => form.command = value,
                "description" => form.description = value,
                "tags" => form.tags = value,
                "subcmd_command[]" => form.subcmd_commands.push(value),
                "subcmd_description[]" => form.subcmd_descriptions.push(value),
                _ => {}
            }
        }
        form
    }

    pub fn into_request(self) -> CommandRequestDto {
        let mut descriptions = self.subcmd_descriptions.into_iter();
        let subcommands = self
            .subcmd_commands
            .into_iter()
            .map(|command| SubcommandRequestDto {
                command: Some(command),
                description: descriptions.next(),
            })
            .collect();

        CommandRequestDto {
            command: Some(self.command),
            description: Some(self.description),
            tags: Some(self.tags),
            subcommands: Some(subcommands),
        }
    }
}
