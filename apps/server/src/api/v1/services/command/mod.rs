use anyhow::Context;
use protocol::serde_json::{self, Value};
use protocol::{CommandRecord, CreatedCommand, ImportSummary, tags};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::api::v1::dto::CommandRequestDto;
use crate::api::v1::models::{CommandDraft, CommandPage, ListParams};
use crate::api::v1::repositories::CommandRepository;
use crate::api::v1::services::ServiceError;

type ServiceResult<T> = Result<T, ServiceError>;

// Command service for handling command-related business logic
pub struct CommandService {
    repository: Arc<CommandRepository>,
}

impl CommandService {
    pub fn new(repository: CommandRepository) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Runs blocking repository work off the async executor
    async fn run<T, F>(&self, work: F) -> ServiceResult<T>
    where
        F: FnOnce(&CommandRepository) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        let result = tokio::task::spawn_blocking(move || work(&repository))
            .await
            .context("Database task failed")?;
        Ok(result?)
    }

    // Create a command together with its subcommands
    pub async fn create(&self, request: CommandRequestDto) -> ServiceResult<CreatedCommand> {
        let draft = draft_from_request(request)?;

        let command = self.run(move |repo| repo.insert(&draft)).await?;
        info!("Command created: {} ({})", command.id, command.command);

        Ok(CreatedCommand {
            id: command.id,
            command: command.command,
        })
    }

    /// One page of the listing; the tag set always spans the whole table
    pub async fn list(&self, params: ListParams) -> ServiceResult<CommandPage> {
        self.run(move |repo| {
            let (commands, total) = repo.list(&params)?;
            let tag_values = repo.all_tag_values()?;

            Ok(CommandPage {
                commands: commands.into_iter().map(CommandRecord::from).collect(),
                total,
                tags: tags::collect(tag_values.iter().map(String::as_str)),
                page: params.page,
                per_page: params.per_page,
            })
        })
        .await
    }

    /// Every command matching the search, newest first, without paging
    pub async fn search(&self, search: Option<String>) -> ServiceResult<Vec<CommandRecord>> {
        let params = ListParams::new(search.as_deref(), None, None, None, None);
        self.run(move |repo| {
            let found = repo.search(params.search.as_deref())?;
            Ok(found.into_iter().map(CommandRecord::from).collect())
        })
        .await
    }

    pub async fn get(&self, id: i32) -> ServiceResult<CommandRecord> {
        self.run(move |repo| repo.find_by_id(id))
            .await?
            .map(CommandRecord::from)
            .ok_or(ServiceError::NotFound(id))
    }

    /// Replaces the fields of a command and its whole subcommand set
    pub async fn update(&self, id: i32, request: CommandRequestDto) -> ServiceResult<CommandRecord> {
        let draft = draft_from_request(request)?;

        let updated = self
            .run(move |repo| {
                if repo.update(id, &draft)? {
                    repo.find_by_id(id)
                } else {
                    Ok(None)
                }
            })
            .await?;

        let record = updated.map(CommandRecord::from).ok_or(ServiceError::NotFound(id))?;
        info!("Command updated: {}", id);
        Ok(record)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        if !self.run(move |repo| repo.delete(id)).await? {
            return Err(ServiceError::NotFound(id));
        }
        info!("Command deleted: {}", id);
        Ok(())
    }

    /// Every command, newest first, in the export file format
    pub async fn export_all(&self) -> ServiceResult<Vec<CommandRecord>> {
        let records = self.search(None).await?;
        info!("Exported {} commands", records.len());
        Ok(records)
    }

    /// Parses an uploaded export file and imports it
    pub async fn import_json(&self, bytes: &[u8]) -> ServiceResult<ImportSummary> {
        let payload: Value = serde_json::from_slice(bytes).map_err(|e| {
            warn!("Rejected import file: {}", e);
            ServiceError::Format("Invalid JSON file. Please check the file format.".to_string())
        })?;
        self.import_batch(payload).await
    }

    /// Imports a list of records, skipping invalid entries and commands
    /// whose text is already stored
    pub async fn import_batch(&self, payload: Value) -> ServiceResult<ImportSummary> {
        let Value::Array(items) = payload else {
            return Err(ServiceError::Format(
                "Invalid JSON format. Expected a list of commands.".to_string(),
            ));
        };

        let total = items.len();
        let drafts: Vec<CommandDraft> = items.iter().filter_map(draft_from_value).collect();
        let invalid = total - drafts.len();

        let outcome = self
            .run(move |repo| repo.import(&drafts))
            .await
            .map_err(|e| match e {
                ServiceError::Internal(e) => ServiceError::Import(format!("{:#}", e)),
                other => other,
            })?;

        let summary = ImportSummary {
            imported: outcome.imported,
            skipped: invalid + outcome.duplicates,
        };
        info!(
            "Import finished: {} imported, {} skipped",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }
}

fn draft_from_request(request: CommandRequestDto) -> ServiceResult<CommandDraft> {
    let command = request
        .command
        .ok_or_else(|| ServiceError::Validation("Missing required field 'command'".to_string()))?;

    let subcommands = request.subcommands.unwrap_or_default();
    let draft = CommandDraft::normalized(
        &command,
        request.description.as_deref(),
        request.tags.as_deref(),
        subcommands
            .iter()
            .map(|sub| (sub.command.as_deref(), sub.description.as_deref())),
    );
    draft.validate()?;
    Ok(draft)
}

/// Builds a draft from one element of an import file
///
/// Returns `None` for anything that cannot be imported: non-objects,
/// records without a textual `command`, and values that fail validation.
fn draft_from_value(item: &Value) -> Option<CommandDraft> {
    let record = item.as_object()?;
    let command = record.get("command")?.as_str()?;

    let subcommands: Vec<(Option<&str>, Option<&str>)> = record
        .get("subcommands")
        .and_then(Value::as_array)
        .map(|subs| {
            subs.iter()
                .filter_map(Value::as_object)
                .map(|sub| (text_field(sub.get("command")), text_field(sub.get("description"))))
                .collect()
        })
        .unwrap_or_default();

    let draft = CommandDraft::normalized(
        command,
        text_field(record.get("description")),
        text_field(record.get("tags")),
        subcommands,
    );
    draft.validate().ok().map(|_| draft)
}

fn text_field(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}
