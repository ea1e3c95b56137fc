use axum::{
    Form, Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use protocol::EXPORT_FILENAME;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::v1::common::response_helpers;
use crate::api::v1::dto::{CommandFormDto, CommandRequestDto, IndexQueryDto};
use crate::api::v1::models::ListParams;
use crate::api::v1::services::{CommandService, ServiceError};
use crate::api::v1::views::{self, FormValues};

// Web controller for the browser pages
pub struct WebController;

impl WebController {
    pub async fn index(
        State(service): State<Arc<CommandService>>,
        Query(query): Query<IndexQueryDto>,
    ) -> Response {
        let params = ListParams::new(
            query.search.as_deref(),
            query.sort_by.as_deref(),
            query.sort_dir.as_deref(),
            query.page(),
            query.per_page(),
        );

        match service.list(params.clone()).await {
            Ok(page) => Html(views::index_page(&page, &params)).into_response(),
            Err(e) => {
                error!("Failed to list commands: {}", e);
                response_helpers::page_error(e)
            }
        }
    }

    pub async fn add_form() -> Html<String> {
        Html(views::command_form(
            "Add command",
            "/add",
            &FormValues::default(),
            None,
        ))
    }

    pub async fn add(
        State(service): State<Arc<CommandService>>,
        Form(fields): Form<Vec<(String, String)>>,
    ) -> Response {
        let request = CommandFormDto::from_pairs(fields).into_request();
        let values = FormValues::from(&request);

        match service.create(request).await {
            Ok(created) => {
                info!("Command added: {}", created.id);
                Redirect::to("/").into_response()
            }
            Err(ServiceError::Validation(message)) => {
                Self::invalid_form("Add command", "/add", &values, &message)
            }
            Err(e) => {
                error!("Failed to add command: {}", e);
                response_helpers::page_error(e)
            }
        }
    }

    pub async fn edit_form(
        State(service): State<Arc<CommandService>>,
        Path(command_id): Path<i32>,
    ) -> Response {
        match service.get(command_id).await {
            Ok(record) => Html(views::command_form(
                "Edit command",
                &format!("/edit/{}", command_id),
                &FormValues::from(&record),
                None,
            ))
            .into_response(),
            Err(e) => response_helpers::page_error(e),
        }
    }

    pub async fn edit(
        State(service): State<Arc<CommandService>>,
        Path(command_id): Path<i32>,
        Form(fields): Form<Vec<(String, String)>>,
    ) -> Response {
        let request: CommandRequestDto = CommandFormDto::from_pairs(fields).into_request();
        let values = FormValues::from(&request);

        match service.update(command_id, request).await {
            Ok(_) => {
                info!("Command edited: {}", command_id);
                Redirect::to("/").into_response()
            }
            Err(ServiceError::Validation(message)) => Self::invalid_form(
                "Edit command",
                &format!("/edit/{}", command_id),
                &values,
                &message,
            ),
            Err(e) => {
                error!("Failed to edit command {}: {}", command_id, e);
                response_helpers::page_error(e)
            }
        }
    }

    pub async fn delete(
        State(service): State<Arc<CommandService>>,
        Path(command_id): Path<i32>,
    ) -> Response {
        match service.delete(command_id).await {
            Ok(()) => Redirect::to("/").into_response(),
            Err(e) => {
                warn!("Failed to delete command {}: {}", command_id, e);
                response_helpers::page_error(e)
            }
        }
    }

    /// Downloads every command as a JSON array
    pub async fn export_json(State(service): State<Arc<CommandService>>) -> Response {
        match service.export_all().await {
            Ok(records) => (
                [(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", EXPORT_FILENAME),
                )],
                Json(records),
            )
                .into_response(),
            Err(e) => {
                error!("Failed to export commands: {}", e);
                response_helpers::page_error(e)
            }
        }
    }

    pub async fn import_form() -> Html<String> {
        Html(views::import_page(None))
    }

    /// Imports an uploaded export file from the multipart field `file`
    pub async fn import_json(
        State(service): State<Arc<CommandService>>,
        mut multipart: Multipart,
    ) -> Response {
        let upload = loop {
            match multipart.next_field().await {
                Ok(Some(field)) if field.name() == Some("file") => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    match field.bytes().await {
                        Ok(bytes) => break Some((file_name, bytes)),
                        Err(e) => {
                            warn!("Failed to read uploaded file: {}", e);
                            return Self::import_rejected("Could not read the uploaded file.");
                        }
                    }
                }
                Ok(Some(_)) => continue,
                Ok(None) => break None,
                Err(e) => {
                    warn!("Malformed upload: {}", e);
                    return Self::import_rejected("Could not read the uploaded file.");
                }
            }
        };

        let Some((file_name, bytes)) = upload.filter(|(name, _)| !name.is_empty()) else {
            return Self::import_rejected("No file selected.");
        };
        if !file_name.ends_with(".json") {
            return Self::import_rejected("Please upload a JSON file.");
        }

        match service.import_json(&bytes).await {
            Ok(summary) => {
                info!("Imported {} from {}", summary.imported, file_name);
                Html(views::import_page(Some(&format!(
                    "Successfully imported {} commands. Skipped {} (duplicates or invalid).",
                    summary.imported, summary.skipped
                ))))
                .into_response()
            }
            Err(ServiceError::Format(message)) => Self::import_rejected(&message),
            Err(e) => {
                error!("Import of {} failed: {}", file_name, e);
                let status = response_helpers::status_for(&e);
                (status, Html(views::import_page(Some(&e.to_string())))).into_response()
            }
        }
    }
}

impl WebController {
    fn invalid_form(title: &str, action: &str, values: &FormValues, message: &str) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Html(views::command_form(title, action, values, Some(message))),
        )
            .into_response()
    }

    fn import_rejected(message: &str) -> Response {
        (StatusCode::BAD_REQUEST, Html(views::import_page(Some(message)))).into_response()
    }
}
