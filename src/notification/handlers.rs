use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dispatch::send_notifications;
use crate::error::KioskError;
use crate::multipart_parser::MultipartParser;
use crate::{db::AppState, ErrorResponse};

/// Multipart body of the notification endpoint, for the OpenAPI document.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendNotificationsRequest {
    /// Spreadsheet with an `Email` column.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    #[schema(example = "Your print order is ready")]
    pub subject: String,
    /// Body template; `{Column}` placeholders are filled from each row.
    #[schema(example = "Hello {Name}, your order is ready at {Location}.")]
    pub email_message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendNotificationsResponse {
    #[schema(example = "Emails sent successfully!")]
    pub message: String,
    #[schema(example = "exports/customers.xlsx")]
    pub file_path: String,
    pub sent: usize,
    pub failed: usize,
}

#[utoipa::path(
    context_path = "/api",
    tag = "Notification Service",
    post,
    path = "/notifications/email",
    request_body(content = inline(SendNotificationsRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Every row processed, results written", body = SendNotificationsResponse),
        (status = 400, description = "Missing upload, subject or Email column", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn send_email_notifications(
    payload: Multipart,
    data: web::Data<AppState>,
) -> impl Responder {
    info!("Executing send_email_notifications handler");
    let mut form = match MultipartParser::parse_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            error!("Failed to parse notification upload: {}", e);
            return HttpResponse::from(KioskError::from(e));
        }
    };

    let Some(upload) = form.take_file("file") else {
        return HttpResponse::from(KioskError::Validation("No file uploaded.".to_string()));
    };
    let subject = form.text("subject").unwrap_or_default().trim().to_string();
    let template = form.text("email_message").unwrap_or_default().to_string();
    if subject.is_empty() {
        return HttpResponse::from(KioskError::Validation(
            "subject cannot be empty".to_string(),
        ));
    }

    match send_notifications(&data, &upload.filename, upload.data, &subject, &template).await {
        Ok(report) => HttpResponse::Ok().json(SendNotificationsResponse {
            message: "Emails sent successfully!".to_string(),
            file_path: report.file_path.to_string_lossy().into_owned(),
            sent: report.sent,
            failed: report.failed,
        }),
        Err(e) => {
            error!("Notification run failed: {}", e);
            e.into()
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/notifications/email").route(web::post().to(send_email_notifications)),
    );
}
