//! CLI command handlers.

pub mod api;
pub mod auth;
pub mod config;
pub mod resources;

use anyhow::Result;
use comfy_table::{ContentArrangement, Table};
use rxdesk_core::{ApiError, ApiErrorKind};
use serde_json::Value;

/// Converts a client error into a user-facing anyhow error.
///
/// Validation bodies from 4xx responses are shown since they are the only
/// explanation the backend gives.
pub(crate) fn report(err: ApiError) -> anyhow::Error {
    let hint = match err.kind {
        ApiErrorKind::NoSession => Some("Not logged in. Run `rxdesk login` first."),
        _ if err.is_unauthorized() => Some("Not authorized. Log in again with `rxdesk login`."),
        _ => None,
    };

    let body = match (err.kind, err.status, err.details.as_deref()) {
        (ApiErrorKind::HttpStatus, Some(400 | 402..=499), Some(details)) => Some(details.to_string()),
        _ => None,
    };

    let mut out = anyhow::Error::new(err);
    if let Some(body) = body {
        out = out.context(body);
    }
    if let Some(hint) = hint {
        out = out.context(hint);
    }
    out
}

/// Prints a JSON payload, as a table when asked and the shape allows it.
pub(crate) fn print_value(value: &Value, table: bool) -> Result<()> {
    if table && let Some(rendered) = render_table(value) {
        println!("{rendered}");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Renders an array of objects as a table. Columns follow first-seen key
/// order; nested values are shown as compact JSON.
fn render_table(value: &Value) -> Option<Table> {
    let rows = value.as_array()?;
    let records: Vec<_> = rows.iter().map(Value::as_object).collect::<Option<_>>()?;

    let mut columns: Vec<&str> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(columns.iter().copied());
    for record in &records {
        table.add_row(columns.iter().map(|column| match record.get(*column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }));
    }
    Some(table)
}
