//! Minimal server-rendered pages for the browser surface.
//!
//! Markup is deliberately plain; every interpolated value goes through
//! [`escape`].

use axum::http::StatusCode;
use protocol::CommandRecord;
use std::fmt::Write;

use crate::api::v1::dto::CommandRequestDto;
use crate::api::v1::models::{CommandPage, ListParams, SortDirection, SortField};
use crate::config::MAX_PER_PAGE;

/// Values shown in the add/edit form
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormValues {
    pub command: String,
    pub description: String,
    pub tags: String,
    pub subcommands: Vec<(String, String)>,
}

impl From<&CommandRecord> for FormValues {
    fn from(record: &CommandRecord) -> Self {
        Self {
            command: record.command.clone(),
            description: record.description.clone().unwrap_or_default(),
            tags: record.tags.clone().unwrap_or_default(),
            subcommands: record
                .subcommands
                .iter()
                .map(|sub| (sub.command.clone(), sub.description.clone().unwrap_or_default()))
                .collect(),
        }
    }
}

impl From<&CommandRequestDto> for FormValues {
    fn from(request: &CommandRequestDto) -> Self {
        Self {
            command: request.command.clone().unwrap_or_default(),
            description: request.description.clone().unwrap_or_default(),
            tags: request.tags.clone().unwrap_or_default(),
            subcommands: request
                .subcommands
                .iter()
                .flatten()
                .map(|sub| {
                    (
                        sub.command.clone().unwrap_or_default(),
                        sub.description.clone().unwrap_or_default(),
                    )
                })
                .collect(),
        }
    }
}

/// Escapes text for use in element content and quoted attributes
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n\
         <nav><a href=\"/\">Commands</a> | <a href=\"/add\">Add</a> | \
         <a href=\"/import-json\">Import</a> | <a href=\"/export-json\">Export</a></nav>\n\
         <h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(title),
        body = body,
    )
}

fn hidden(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
        escape(name),
        escape(value)
    )
}

/// Paging and sorting controls are GET forms so the browser encodes the query
fn page_link(label: &str, params: &ListParams, page: i64) -> String {
    let mut form = String::from("<form method=\"get\" action=\"/\" style=\"display:inline\">");
    form.push_str(&hidden("page", &page.to_string()));
    form.push_str(&hidden("per_page", &params.per_page.to_string()));
    if let Some(search) = &params.search {
        form.push_str(&hidden("search", search));
    }
    if let Some(sort) = params.sort {
        form.push_str(&hidden("sort_by", sort.as_str()));
        form.push_str(&hidden("sort_dir", params.direction.as_str()));
    }
    let _ = write!(form, "<button type=\"submit\">{}</button></form>", escape(label));
    form
}

fn sort_header(label: &str, field: SortField, params: &ListParams) -> String {
    let direction = match (params.sort, params.direction) {
        (Some(current), SortDirection::Asc) if current == field => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    let mut form = String::from("<form method=\"get\" action=\"/\">");
    form.push_str(&hidden("per_page", &params.per_page.to_string()));
    if let Some(search) = &params.search {
        form.push_str(&hidden("search", search));
    }
    form.push_str(&hidden("sort_by", field.as_str()));
    form.push_str(&hidden("sort_dir", direction.as_str()));
    let _ = write!(form, "<button type=\"submit\">{}</button></form>", escape(label));
    form
}

pub fn index_page(page: &CommandPage, params: &ListParams) -> String {
    let mut body = String::new();

    body.push_str("<form method=\"get\" action=\"/\">");
    let _ = write!(
        body,
        "<input type=\"search\" name=\"search\" value=\"{}\" placeholder=\"Search\">",
        escape(params.search.as_deref().unwrap_or_default())
    );
    let _ = write!(
        body,
        "<input type=\"number\" name=\"per_page\" min=\"1\" max=\"{}\" value=\"{}\">",
        MAX_PER_PAGE, params.per_page
    );
    body.push_str("<button type=\"submit\">Search</button></form>\n");

    let _ = writeln!(
        body,
        "<p>{} command(s), {} distinct tag(s)</p>",
        page.total,
        page.tags.len()
    );
    if !page.tags.is_empty() {
        body.push_str("<p>Tags: ");
        let tags: Vec<String> = page.tags.iter().map(|tag| escape(tag)).collect();
        body.push_str(&tags.join(", "));
        body.push_str("</p>\n");
    }

    body.push_str("<table>\n<thead><tr>");
    for (label, field) in [
        ("Command", SortField::Command),
        ("Description", SortField::Description),
        ("Tags", SortField::Tags),
        ("Created", SortField::CreatedAt),
    ] {
        let _ = write!(body, "<th>{}</th>", sort_header(label, field, params));
    }
    body.push_str("<th></th></tr></thead>\n<tbody>\n");

    for record in &page.commands {
        body.push_str("<tr>");
        let _ = write!(body, "<td><code>{}</code>", escape(&record.command));
        if !record.subcommands.is_empty() {
            body.push_str("<ul>");
            for sub in &record.subcommands {
                let _ = write!(body, "<li><code>{}</code>", escape(&sub.command));
                if let Some(description) = &sub.description {
                    let _ = write!(body, " {}", escape(description));
                }
                body.push_str("</li>");
            }
            body.push_str("</ul>");
        }
        body.push_str("</td>");
        let _ = write!(
            body,
            "<td>{}</td><td>{}</td><td>{}</td>",
            escape(record.description.as_deref().unwrap_or_default()),
            escape(record.tags.as_deref().unwrap_or_default()),
            record
                .created_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        );
        let _ = write!(
            body,
            "<td><a href=\"/edit/{id}\">Edit</a> \
             <form method=\"post\" action=\"/delete/{id}\" style=\"display:inline\">\
             <button type=\"submit\">Delete</button></form></td>",
            id = record.id
        );
        body.push_str("</tr>\n");
    }
    body.push_str("</tbody>\n</table>\n");

    let total_pages = page.total_pages();
    body.push_str("<p>");
    if page.page > 1 {
        body.push_str(&page_link("Previous", params, page.page - 1));
    }
    let _ = write!(body, " Page {} of {} ", page.page, total_pages.max(1));
    if page.page < total_pages {
        body.push_str(&page_link("Next", params, page.page + 1));
    }
    body.push_str("</p>\n");

    layout("Commands", &body)
}

pub fn command_form(title: &str, action: &str, values: &FormValues, error: Option<&str>) -> String {
    let mut body = String::new();

    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
    }

    let _ = writeln!(body, "<form method=\"post\" action=\"{}\">", escape(action));
    let _ = writeln!(
        body,
        "<p><label>Shell Command <input name=\"command\" value=\"{}\" required></label></p>",
        escape(&values.command)
    );
    let _ = writeln!(
        body,
        "<p><label>Description (optional) <textarea name=\"description\">{}</textarea></label></p>",
        escape(&values.description)
    );
    let _ = writeln!(
        body,
        "<p><label>Tags (comma-separated) <input name=\"tags\" value=\"{}\"></label></p>",
        escape(&values.tags)
    );

    body.push_str("<fieldset><legend>Subcommands</legend>\n");
    // One blank row so a new subcommand can always be added.
    let blank = (String::new(), String::new());
    for (command, description) in values.subcommands.iter().chain(std::iter::once(&blank)) {
        let _ = writeln!(
            body,
            "<p><input name=\"subcmd_command[]\" value=\"{}\" placeholder=\"Subcommand\"> \
             <input name=\"subcmd_description[]\" value=\"{}\" placeholder=\"Description\"></p>",
            escape(command),
            escape(description)
        );
    }
    body.push_str("</fieldset>\n<p><button type=\"submit\">Save</button></p>\n</form>\n");

    layout(title, &body)
}

pub fn import_page(message: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(message) = message {
        let _ = writeln!(body, "<p class=\"message\">{}</p>", escape(message));
    }
    body.push_str(
        "<form method=\"post\" action=\"/import-json\" enctype=\"multipart/form-data\">\n\
         <p><input type=\"file\" name=\"file\" accept=\".json\"></p>\n\
         <p><button type=\"submit\">Import</button></p>\n</form>\n",
    );
    layout("Import commands", &body)
}

pub fn message_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(title, &format!("<p>{}</p>\n", escape(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn index_escapes_stored_text() {
        let page = CommandPage {
            commands: vec![CommandRecord {
                id: 1,
                command: "echo <b>".to_string(),
                description: Some("\"quoted\"".to_string()),
                tags: None,
                created_at: None,
                subcommands: vec![],
            }],
            total: 1,
            tags: BTreeSet::new(),
            page: 1,
            per_page: 5,
        };

        let html = index_page(&page, &ListParams::default());
        assert!(html.contains("echo &lt;b&gt;"));
        assert!(html.contains("&quot;quoted&quot;"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("action=\"/delete/1\""));
    }

    #[test]
    fn form_renders_existing_subcommands_and_a_blank_row() {
        let values = FormValues {
            command: "git".to_string(),
            subcommands: vec![("log".to_string(), "history".to_string())],
            ..Default::default()
        };
        let html = command_form("Edit command", "/edit/3", &values, Some("Command is required"));
        assert_eq!(html.matches("name=\"subcmd_command[]\"").count(), 2);
        assert!(html.contains("value=\"log\""));
        assert!(html.contains("Command is required"));
    }
}
