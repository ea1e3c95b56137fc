use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::v1::common::response_helpers;
use crate::api::v1::dto::{CommandRequestDto, SearchQueryDto};
use crate::api::v1::services::CommandService;

// Command controller for the JSON API
pub struct CommandController;

impl CommandController {
    // Handler for creating a command
    pub async fn create_command(
        State(service): State<Arc<CommandService>>,
        payload: Result<Json<CommandRequestDto>, JsonRejection>,
    ) -> Response {
        let Json(request) = match payload {
            Ok(payload) => payload,
            Err(rejection) => {
                error!("Invalid command request: {}", rejection.body_text());
                return response_helpers::bad_request(rejection.body_text()).into_response();
            }
        };

        match service.create(request).await {
            Ok(created) => {
                info!("Command created via API: {}", created.id);
                (StatusCode::CREATED, Json(created)).into_response()
            }
            Err(e) => {
                error!("Failed to create command: {}", e);
                response_helpers::service_error(e)
            }
        }
    }

    // Handler for listing commands, optionally filtered
    pub async fn list_commands(
        State(service): State<Arc<CommandService>>,
        Query(query): Query<SearchQueryDto>,
    ) -> Response {
        match service.search(query.search).await {
            Ok(records) => Json(records).into_response(),
            Err(e) => {
                error!("Failed to list commands: {}", e);
                response_helpers::service_error(e)
            }
        }
    }

    // Handler for getting a command by ID
    pub async fn get_command(
        State(service): State<Arc<CommandService>>,
        path: Result<Path<i32>, PathRejection>,
    ) -> Response {
        let command_id = match Self::command_id(path) {
            Ok(id) => id,
            Err(response) => return response,
        };

        match service.get(command_id).await {
            Ok(record) => Json(record).into_response(),
            Err(e) => {
                info!("Command lookup failed for {}: {}", command_id, e);
                response_helpers::service_error(e)
            }
        }
    }

    // Handler for replacing a command and its subcommands
    pub async fn update_command(
        State(service): State<Arc<CommandService>>,
        path: Result<Path<i32>, PathRejection>,
        payload: Result<Json<CommandRequestDto>, JsonRejection>,
    ) -> Response {
        let command_id = match Self::command_id(path) {
            Ok(id) => id,
            Err(response) => return response,
        };

        let Json(request) = match payload {
            Ok(payload) => payload,
            Err(rejection) => {
                error!("Invalid command request: {}", rejection.body_text());
                return response_helpers::bad_request(rejection.body_text()).into_response();
            }
        };

        match service.update(command_id, request).await {
            Ok(record) => Json(record).into_response(),
            Err(e) => {
                error!("Failed to update command {}: {}", command_id, e);
                response_helpers::service_error(e)
            }
        }
    }

    pub async fn delete_command(
        State(service): State<Arc<CommandService>>,
        path: Result<Path<i32>, PathRejection>,
    ) -> Response {
        let command_id = match Self::command_id(path) {
            Ok(id) => id,
            Err(response) => return response,
        };

        match service.delete(command_id).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(e) => {
                error!("Failed to delete command {}: {}", command_id, e);
                response_helpers::service_error(e)
            }
        }
    }
}

impl CommandController {
    fn command_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, Response> {
        path.map(|Path(id)| id).map_err(|rejection| {
            info!("Invalid command id: {}", rejection.body_text());
            response_helpers::bad_request(rejection.body_text()).into_response()
        })
    }
}
