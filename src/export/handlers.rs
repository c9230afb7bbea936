use std::path::Path;

use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use log::{error, info, warn};
use serde::Deserialize;
use utoipa::ToSchema;

use super::report::{cleanup_printed, clear_printed_files, export_unprinted};
use super::split::split_upload;
use crate::error::KioskError;
use crate::multipart_parser::MultipartParser;
use crate::order::models::MaintenanceResponse;
use crate::{db::AppState, ErrorResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SplitUploadRequest {
    /// Spreadsheet with a `Location` column.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

async fn attachment(req: &HttpRequest, path: &Path, filename: &str) -> HttpResponse {
    match NamedFile::open_async(path).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename.to_string())],
            })
            .into_response(req),
        Err(e) => {
            error!("Generated file {} could not be opened: {}", path.display(), e);
            KioskError::Io(e).into()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Export Service",
    get,
    path = "/orders/export",
    responses(
        (status = 200, description = "Spreadsheet of every unprinted order; those orders are now printed"),
        (status = 404, description = "No unprinted records found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn export_orders(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    info!("Executing export_orders handler");
    match export_unprinted(&data).await {
        Ok(outcome) => attachment(&req, &outcome.path, &outcome.filename).await,
        Err(e @ KioskError::NotFound(_)) => {
            warn!("{}", e);
            e.into()
        }
        Err(e) => {
            error!("Export failed: {}", e);
            e.into()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Export Service",
    put,
    path = "/orders/cleanup",
    responses(
        (status = 200, description = "Embedded file contents removed from printed orders", body = MaintenanceResponse),
        (status = 404, description = "No printed records found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn cleanup_orders(data: web::Data<AppState>) -> HttpResponse {
    info!("Executing cleanup_orders handler");
    match cleanup_printed(&data).await {
        Ok(count) => HttpResponse::Ok().json(MaintenanceResponse {
            message: format!("Cleaned up {} printed records.", count),
            count,
        }),
        Err(e) => {
            if !e.is_client_error() {
                error!("Cleanup failed: {}", e);
            }
            e.into()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Export Service",
    delete,
    path = "/orders/files",
    responses(
        (status = 200, description = "Stored files of printed orders deleted", body = MaintenanceResponse),
        (status = 404, description = "No printed records found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn clear_order_files(data: web::Data<AppState>) -> HttpResponse {
    info!("Executing clear_order_files handler");
    match clear_printed_files(&data).await {
        Ok(count) => HttpResponse::Ok().json(MaintenanceResponse {
            message: format!("Deleted {} stored files of printed orders.", count),
            count,
        }),
        Err(e) => {
            if !e.is_client_error() {
                error!("Clearing stored files failed: {}", e);
            }
            e.into()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Export Service",
    post,
    path = "/reports/split-by-location",
    request_body(content = inline(SplitUploadRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Zip with one spreadsheet per location"),
        (status = 400, description = "No file or no Location column", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn split_by_location(
    req: HttpRequest,
    payload: Multipart,
    data: web::Data<AppState>,
) -> HttpResponse {
    info!("Executing split_by_location handler");
    let mut form = match MultipartParser::parse_form(payload).await {
        Ok(form) => form,
        Err(e) => return KioskError::from(e).into(),
    };
    let Some(upload) = form.take_file("file") else {
        return KioskError::Validation("No file uploaded.".to_string()).into();
    };

    match split_upload(&data, upload.data).await {
        Ok(archive) => attachment(&req, &archive.path, &archive.filename).await,
        Err(e) => {
            if !e.is_client_error() {
                error!("Splitting by location failed: {}", e);
            }
            e.into()
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/orders/export").route(web::get().to(export_orders)))
        .service(web::resource("/orders/cleanup").route(web::put().to(cleanup_orders)))
        .service(web::resource("/orders/files").route(web::delete().to(clear_order_files)))
        .service(
            web::resource("/reports/split-by-location").route(web::post().to(split_by_location)),
        );
}
