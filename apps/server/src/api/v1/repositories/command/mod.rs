use anyhow::{Context, Result};
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use tracing::{debug, info};

use crate::api::v1::models::{
    Command, CommandDraft, CommandWithSubcommands, ListParams, SortDirection, SortField,
    Subcommand,
};
use crate::api::v1::repositories::base::{BaseRepository, Repository};
use crate::database::DbPool;
use crate::database::schema::{commands, subcommands};

type BoxedCommands = commands::BoxedQuery<'static, Sqlite>;

/// Counts reported by [`CommandRepository::import`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub duplicates: usize,
}

pub struct CommandRepository {
    base: BaseRepository,
}

impl CommandRepository {
    pub fn new(pool: DbPool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// Inserts a command and its subcommands in one transaction
    pub fn insert(&self, draft: &CommandDraft) -> Result<Command> {
        let mut conn = Repository::get_connection(self)?;

        let command = conn
            .immediate_transaction(|conn| {
                let id = insert_draft(conn, draft)?;
                commands::table
                    .find(id)
                    .select(Command::as_select())
                    .first(conn)
            })
            .context("Failed to insert command into database")?;

        info!("Command saved to database: {}", command.id);
        Ok(command)
    }

    pub fn find_by_id(&self, id: i32) -> Result<Option<CommandWithSubcommands>> {
        let mut conn = Repository::get_connection(self)?;

        let command = commands::table
            .find(id)
            .select(Command::as_select())
            .first(&mut conn)
            .optional()
            .context("Failed to query command from database")?;

        match command {
            Some(command) => {
                let mut loaded = with_subcommands(&mut conn, vec![command])
                    .context("Failed to query subcommands from database")?;
                Ok(loaded.pop())
            }
            None => Ok(None),
        }
    }

    /// Returns the requested page and the number of rows matching the search
    pub fn list(&self, params: &ListParams) -> Result<(Vec<CommandWithSubcommands>, i64)> {
        let mut conn = Repository::get_connection(self)?;
        let search = params.search.as_deref();

        let total = filtered(search)
            .count()
            .get_result::<i64>(&mut conn)
            .context("Failed to count commands")?;

        let rows = ordered(filtered(search), params.sort, params.direction)
            .limit(params.per_page)
            .offset(params.offset())
            .select(Command::as_select())
            .load(&mut conn)
            .context("Failed to query commands from database")?;

        debug!(
            "Listed {} of {} commands (page {}, {} per page)",
            rows.len(),
            total,
            params.page,
            params.per_page
        );

        let page = with_subcommands(&mut conn, rows)
            .context("Failed to query subcommands from database")?;
        Ok((page, total))
    }

    /// Every command matching the search, newest first
    pub fn search(&self, search: Option<&str>) -> Result<Vec<CommandWithSubcommands>> {
        let mut conn = Repository::get_connection(self)?;

        let rows = ordered(filtered(search), None, SortDirection::Desc)
            .select(Command::as_select())
            .load(&mut conn)
            .context("Failed to query commands from database")?;

        with_subcommands(&mut conn, rows).context("Failed to query subcommands from database")
    }

    /// Raw tags values of every command that has any
    pub fn all_tag_values(&self) -> Result<Vec<String>> {
        let mut conn = Repository::get_connection(self)?;

        let values = commands::table
            .select(commands::tags)
            .filter(commands::tags.is_not_null())
            .load::<Option<String>>(&mut conn)
            .context("Failed to query tags from database")?;

        Ok(values.into_iter().flatten().collect())
    }

    /// Replaces the scalar fields and the whole subcommand set
    ///
    /// Returns `false` when no command has this id.
    pub fn update(&self, id: i32, draft: &CommandDraft) -> Result<bool> {
        let mut conn = Repository::get_connection(self)?;

        let updated = conn
            .immediate_transaction(|conn| {
                let affected = diesel::update(commands::table.find(id))
                    .set((
                        commands::command.eq(&draft.command),
                        commands::description.eq(draft.description.as_deref()),
                        commands::tags.eq(draft.tags.as_deref()),
                    ))
                    .execute(conn)?;
                if affected == 0 {
                    return Ok(false);
                }

                diesel::delete(subcommands::table.filter(subcommands::command_id.eq(id)))
                    .execute(conn)?;
                insert_subcommands(conn, draft, id)?;
                Ok::<_, diesel::result::Error>(true)
            })
            .with_context(|| format!("Failed to update command {}", id))?;

        if updated {
            info!("Command updated in database: {}", id);
        }
        Ok(updated)
    }

    /// Deletes a command; its subcommands go with it through the foreign key
    ///
    /// Returns `false` when no command has this id.
    pub fn delete(&self, id: i32) -> Result<bool> {
        let mut conn = Repository::get_connection(self)?;

        let affected = diesel::delete(commands::table.find(id))
            .execute(&mut conn)
            .with_context(|| format!("Failed to delete command {}", id))?;

        if affected > 0 {
            info!("Command deleted from database: {}", id);
        }
        Ok(affected > 0)
    }

    /// Inserts every draft whose command text is not already stored
    ///
    /// Runs in a single write transaction, so drafts earlier in the batch
    /// count as stored for later ones. Any failure rolls back the whole batch.
    pub fn import(&self, drafts: &[CommandDraft]) -> Result<ImportOutcome> {
        let mut conn = Repository::get_connection(self)?;

        let outcome = conn
            .immediate_transaction(|conn| {
                let mut outcome = ImportOutcome::default();
                for draft in drafts {
                    let duplicate = diesel::select(exists(
                        commands::table.filter(commands::command.eq(&draft.command)),
                    ))
                    .get_result::<bool>(conn)?;

                    if duplicate {
                        debug!("Skipping duplicate command: {}", draft.command);
                        outcome.duplicates += 1;
                        continue;
                    }

                    insert_draft(conn, draft)?;
                    outcome.imported += 1;
                }
                Ok::<_, diesel::result::Error>(outcome)
            })
            .context("Failed to import commands")?;

        info!(
            "Imported {} commands, {} duplicates skipped",
            outcome.imported, outcome.duplicates
        );
        Ok(outcome)
    }
}

// Implement Repository trait for CommandRepository by delegating to the base repository
impl Repository for CommandRepository {
    fn get_pool(&self) -> &DbPool {
        self.base.get_pool()
    }
}

fn insert_draft(conn: &mut SqliteConnection, draft: &CommandDraft) -> QueryResult<i32> {
    let id = diesel::insert_into(commands::table)
        .values(draft.as_new_command(Utc::now().naive_utc()))
        .returning(commands::id)
        .get_result::<i32>(conn)?;
    insert_subcommands(conn, draft, id)?;
    Ok(id)
}

fn insert_subcommands(
    conn: &mut SqliteConnection,
    draft: &CommandDraft,
    command_id: i32,
) -> QueryResult<()> {
    let rows = draft.new_subcommands(command_id);
    if !rows.is_empty() {
        diesel::insert_into(subcommands::table)
            .values(&rows)
            .execute(conn)?;
    }
    Ok(())
}

fn with_subcommands(
    conn: &mut SqliteConnection,
    rows: Vec<Command>,
) -> QueryResult<Vec<CommandWithSubcommands>> {
    let subs = Subcommand::belonging_to(&rows)
        .select(Subcommand::as_select())
        .order(subcommands::id.asc())
        .load(conn)?;

    Ok(subs
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(subcommands, command)| CommandWithSubcommands {
            command,
            subcommands,
        })
        .collect())
}

/// Case-insensitive substring match on command, description or tags
fn filtered(search: Option<&str>) -> BoxedCommands {
    let mut query = commands::table.into_boxed();
    if let Some(search) = search {
        let pattern = format!("%{}%", escape_like(search));
        query = query.filter(
            commands::command
                .like(pattern.clone())
                .escape('\\')
                .or(commands::description.like(pattern.clone()).escape('\\'))
                .or(commands::tags.like(pattern).escape('\\')),
        );
    }
    query
}

/// Applies the listing order; ties fall back to id in the same direction
fn ordered(query: BoxedCommands, sort: Option<SortField>, direction: SortDirection) -> BoxedCommands {
    use SortDirection::{Asc, Desc};

    match (sort, direction) {
        (Some(SortField::Command), Asc) => query.order((commands::command.asc(), commands::id.asc())),
        (Some(SortField::Command), Desc) => {
            query.order((commands::command.desc(), commands::id.desc()))
        }
        (Some(SortField::Description), Asc) => {
            query.order((commands::description.asc(), commands::id.asc()))
        }
        (Some(SortField::Description), Desc) => {
            query.order((commands::description.desc(), commands::id.desc()))
        }
        (Some(SortField::Tags), Asc) => query.order((commands::tags.asc(), commands::id.asc())),
        (Some(SortField::Tags), Desc) => query.order((commands::tags.desc(), commands::id.desc())),
        (Some(SortField::CreatedAt), Asc) => {
            query.order((commands::created_at.asc(), commands::id.asc()))
        }
        (Some(SortField::CreatedAt), Desc) | (None, _) => {
            query.order((commands::created_at.desc(), commands::id.desc()))
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::temp_database;

    fn draft(command: &str, subs: &[&str]) -> CommandDraft {
        CommandDraft::normalized(command, None, None, subs.iter().map(|s| (Some(*s), None)))
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn wildcards_in_search_match_literally() {
        let (_dir, database) = temp_database();
        let repo = CommandRepository::new(database.get_pool().clone());
        repo.insert(&draft("df -h | grep 100%", &[])).unwrap();
        repo.insert(&draft("df -h", &[])).unwrap();

        let found = repo.search(Some("100%")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].command.command, "df -h | grep 100%");

        assert!(repo.search(Some("_")).unwrap().is_empty());
    }

    #[test]
    fn subcommands_keep_insertion_order() {
        let (_dir, database) = temp_database();
        let repo = CommandRepository::new(database.get_pool().clone());
        let command = repo.insert(&draft("git", &["status", "log", "diff"])).unwrap();

        let loaded = repo.find_by_id(command.id).unwrap().unwrap();
        let names: Vec<_> = loaded.subcommands.iter().map(|s| s.command.as_str()).collect();
        assert_eq!(names, vec!["status", "log", "diff"]);
        assert!(loaded.subcommands.iter().all(|s| s.command_id == command.id));
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let (_dir, database) = temp_database();
        let repo = CommandRepository::new(database.get_pool().clone());

        assert!(!repo.update(404, &draft("ls", &[])).unwrap());
        assert!(!repo.delete(404).unwrap());
    }

    #[test]
    fn import_skips_duplicates_within_batch() {
        let (_dir, database) = temp_database();
        let repo = CommandRepository::new(database.get_pool().clone());
        repo.insert(&draft("uptime", &[])).unwrap();

        let outcome = repo
            .import(&[draft("uptime", &[]), draft("whoami", &[]), draft("whoami", &[])])
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome {
                imported: 1,
                duplicates: 2
            }
        );
        assert_eq!(repo.search(None).unwrap().len(), 2);
    }

    #[test]
    fn concurrent_imports_wait_for_the_write_lock() {
        let (_dir, database) = temp_database();
        let repo = std::sync::Arc::new(CommandRepository::new(database.get_pool().clone()));

        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let repo = std::sync::Arc::clone(&repo);
                std::thread::spawn(move || {
                    let drafts: Vec<_> = (0..25)
                        .map(|n| draft(&format!("echo {}-{}", worker, n), &["-n"]))
                        .collect();
                    repo.import(&drafts)
                })
            })
            .collect();

        for worker in workers {
            let outcome = worker.join().unwrap().unwrap();
            assert_eq!(outcome.imported, 25);
        }
        assert_eq!(repo.search(None).unwrap().len(), 100);
    }
}
