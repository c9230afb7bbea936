use std::path::PathBuf;

use log::{info, warn};
use sanitize_filename::sanitize;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::mailer::{Mailer, OutgoingEmail};
use crate::db::AppState;
use crate::error::KioskResult;
use crate::export::spreadsheet::{CellValue, Sheet};

pub const EMAIL_COLUMN: &str = "Email";
pub const STATUS_COLUMN: &str = "Email_send";
const DEFAULT_OUTPUT_NAME: &str = "notification_results.xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "Sent",
            DeliveryStatus::Failed => "Failed",
        }
    }
}

/// Replaces every `{column}` placeholder with that column's value in `row`.
pub fn render_template(template: &str, sheet: &Sheet, row: usize) -> String {
    let mut rendered = template.to_string();
    for (column, header) in sheet.headers.iter().enumerate() {
        let placeholder = format!("{{{}}}", header);
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, &sheet.cell(row, column).to_string());
        }
    }
    rendered
}

/// Sends one message per row. A failing row is recorded and skipped; it
/// never stops the remaining rows.
pub async fn dispatch_rows(
    mailer: &dyn Mailer,
    sheet: &Sheet,
    subject: &str,
    template: &str,
) -> KioskResult<Vec<DeliveryStatus>> {
    let email_column = sheet.require_column(EMAIL_COLUMN)?;

    let mut statuses = Vec::with_capacity(sheet.rows.len());
    for row in 0..sheet.rows.len() {
        let recipient = sheet.cell(row, email_column).to_string();
        if recipient.trim().is_empty() {
            warn!("Row {} has no email address, marking as failed", row + 1);
            statuses.push(DeliveryStatus::Failed);
            continue;
        }

        let email = OutgoingEmail {
            to: recipient.trim().to_string(),
            subject: subject.to_string(),
            body: render_template(template, sheet, row),
        };
        match mailer.send(&email).await {
            Ok(()) => statuses.push(DeliveryStatus::Sent),
            Err(e) => {
                warn!("Failed to send email to {}: {}", email.to, e);
                statuses.push(DeliveryStatus::Failed);
            }
        }
    }
    Ok(statuses)
}

/// Copy of `sheet` with the status column filled in, replacing an existing
/// status column rather than adding a second one.
pub fn with_status_column(sheet: &Sheet, statuses: &[DeliveryStatus]) -> Sheet {
    let mut output = sheet.clone();
    let column = match output.column_index(STATUS_COLUMN) {
        Some(column) => column,
        None => {
            output.headers.push(STATUS_COLUMN.to_string());
            output.headers.len() - 1
        }
    };

    for (index, row) in output.rows.iter_mut().enumerate() {
        if row.len() <= column {
            row.resize(column + 1, CellValue::Empty);
        }
        let status = statuses.get(index).copied().unwrap_or(DeliveryStatus::Failed);
        row[column] = CellValue::from(status.as_str());
    }
    output
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationReport {
    #[schema(value_type = String, example = "exports/customers.xlsx")]
    pub file_path: PathBuf,
    pub sent: usize,
    pub failed: usize,
}

pub fn output_file_name(upload_name: &str) -> String {
    let safe = sanitize(upload_name);
    if safe.is_empty() {
        DEFAULT_OUTPUT_NAME.to_string()
    } else {
        safe
    }
}

pub async fn send_notifications(
    state: &AppState,
    upload_name: &str,
    upload: Vec<u8>,
    subject: &str,
    template: &str,
) -> KioskResult<NotificationReport> {
    let sheet = tokio::task::spawn_blocking(move || Sheet::read_xlsx(&upload)).await??;
    let statuses = dispatch_rows(state.mailer.as_ref(), &sheet, subject, template).await?;
    let output = with_status_column(&sheet, &statuses);

    let export_dir = state.config.export_dir.clone();
    tokio::fs::create_dir_all(&export_dir).await?;
    let path = export_dir.join(output_file_name(upload_name));
    let target = path.clone();
    tokio::task::spawn_blocking(move || output.write_xlsx(&target)).await??;

    let sent = statuses.iter().filter(|s| **s == DeliveryStatus::Sent).count();
    let failed = statuses.len() - sent;
    info!(
        "Notification run finished: {} sent, {} failed, results in {}",
        sent,
        failed,
        path.display()
    );
    Ok(NotificationReport {
        file_path: path,
        sent,
        failed,
    })
}
