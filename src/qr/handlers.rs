use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{db::AppState, ErrorResponse};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct GenerateQrRequest {
    #[schema(example = "https://kiosk.example.com/pay?location=Library")]
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateQrResponse {
    #[schema(example = "QR Code generated successfully!")]
    pub message: String,
    #[schema(example = "exports/QR/Kiosk_QR(4).png")]
    pub qr_file: String,
    #[schema(example = 4)]
    pub serial: u64,
}

#[utoipa::path(
    context_path = "/api",
    tag = "QR Service",
    post,
    path = "/qr",
    request_body(content = GenerateQrRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "QR code image written", body = GenerateQrResponse),
        (status = 400, description = "Empty data", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn generate_qr(
    form: web::Form<GenerateQrRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    info!("Executing generate_qr handler");
    match data.qr_issuer.issue(&form.data).await {
        Ok(issued) => HttpResponse::Created().json(GenerateQrResponse {
            message: "QR Code generated successfully!".to_string(),
            qr_file: issued.path.to_string_lossy().into_owned(),
            serial: issued.serial,
        }),
        Err(e) => {
            error!("Failed to generate QR code: {}", e);
            e.into()
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/qr").route(web::post().to(generate_qr)));
}
