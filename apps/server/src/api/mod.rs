pub mod v1;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Internal imports
use self::v1::controllers::{CommandController, RootController, WebController};
use self::v1::repositories::CommandRepository;
use self::v1::services::CommandService;
use crate::config::constants::MAX_BODY_BYTES;
use crate::database::{Database, DbPool};

/// API builder for creating the application router
///
/// This struct is responsible for constructing the routes and
/// connecting them with the appropriate services and repositories.
pub struct ApiBuilder {
    /// Database connection pool for data access
    db_pool: DbPool,
}

impl ApiBuilder {
    /// Creates a new API builder
    ///
    /// # Arguments
    /// * `database` - Database instance to get connection pool from
    pub fn new(database: &Database) -> Self {
        Self {
            db_pool: database.get_pool().clone(),
        }
    }

    /// Builds the router serving both the JSON API and the web pages
    ///
    /// # Returns
    /// * `Router` - Configured Axum router with all routes
    pub fn build(&self) -> Router {
        // Create repositories
        let command_repo = CommandRepository::new(self.db_pool.clone());

        // Create services
        let command_service = Arc::new(CommandService::new(command_repo));

        let api_router = Router::new()
            .route(
                "/commands",
                get(CommandController::list_commands).post(CommandController::create_command),
            )
            .route(
                "/commands/{id}",
                get(CommandController::get_command)
                    .put(CommandController::update_command)
                    .delete(CommandController::delete_command),
            );

        let web_router = Router::new()
            .route("/", get(WebController::index))
            .route("/add", get(WebController::add_form).post(WebController::add))
            .route(
                "/edit/{id}",
                get(WebController::edit_form).post(WebController::edit),
            )
            .route("/delete/{id}", post(WebController::delete))
            .route("/export-json", get(WebController::export_json))
            .route(
                "/import-json",
                get(WebController::import_form).post(WebController::import_json),
            );

        Router::new()
            .nest("/api", api_router)
            .merge(web_router)
            .with_state(command_service)
            .fallback(RootController::fallback)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
    }
}
