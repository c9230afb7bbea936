use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};

use super::intake::submit_order;
use super::models::{SubmitOrderRequest, SubmitOrderResponse};
use crate::error::KioskError;
use crate::multipart_parser::MultipartParser;
use crate::{db::AppState, ErrorResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Order Service",
    post,
    path = "/orders",
    request_body(content = inline(SubmitOrderRequest), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Order priced and saved", body = SubmitOrderResponse),
        (status = 400, description = "Missing fields, no files, or unknown printing/binding type", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn create_order(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing create_order handler");
    let submission = match MultipartParser::parse_order_multipart(payload).await {
        Ok(submission) => submission,
        Err(e) => {
            warn!("Rejected order upload: {}", e);
            return HttpResponse::from(KioskError::from(e));
        }
    };
    debug!(
        "Order submission from '{}' with {} files",
        submission.name,
        submission.files.len()
    );

    match submit_order(&data, submission).await {
        Ok(order) => HttpResponse::Created().json(SubmitOrderResponse {
            message: "User data saved successfully.".to_string(),
            order_id: order.id,
            serial_number: order.serial_number,
            total_cost: order.total_cost,
        }),
        Err(e) => {
            if e.is_client_error() {
                warn!("Order rejected: {}", e);
            } else {
                error!("Failed to save order: {}", e);
            }
            e.into()
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/orders").route(web::post().to(create_order)));
}
