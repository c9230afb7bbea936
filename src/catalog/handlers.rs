use actix_web::{
    web::{self, Json, Path, Query},
    HttpResponse, Responder,
};
use log::{debug, error, info};
use uuid::Uuid;

use super::models::{CatalogEntry, CatalogItemRequest, CatalogMessageResponse, CatalogQuery};
use crate::{db::AppState, ErrorResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Catalog Service",
    get,
    path = "/catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Catalog entries", body = [CatalogEntry]),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn list_catalog(query: Query<CatalogQuery>, data: web::Data<AppState>) -> impl Responder {
    info!("Executing list_catalog handler");
    match data.catalog.list(query.field_name.as_deref()).await {
        Ok(entries) => {
            debug!("Returning {} catalog entries", entries.len());
            HttpResponse::Ok().json(entries)
        }
        Err(e) => {
            error!("Failed to list catalog: {}", e);
            e.into()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Catalog Service",
    post,
    path = "/catalog",
    request_body = CatalogItemRequest,
    responses(
        (status = 201, description = "Catalog item added", body = CatalogMessageResponse),
        (status = 400, description = "Invalid or duplicate item", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn create_catalog_item(
    body: Json<CatalogItemRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    info!("Executing create_catalog_item handler");
    match data.catalog.create(&body).await {
        Ok(entry) => HttpResponse::Created().json(CatalogMessageResponse {
            message: "Item added successfully".to_string(),
            entry,
        }),
        Err(e) => {
            error!("Failed to add catalog item: {}", e);
            e.into()
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Catalog Service",
    put,
    path = "/catalog/{id}",
    request_body = CatalogItemRequest,
    params(("id" = Uuid, Path, description = "Catalog entry id")),
    responses(
        (status = 200, description = "Catalog item updated", body = CatalogMessageResponse),
        (status = 400, description = "Invalid item", body = ErrorResponse),
        (status = 404, description = "Catalog item not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn update_catalog_item(
    path: Path<Uuid>,
    body: Json<CatalogItemRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Executing update_catalog_item handler for id: {}", id);
    match data.catalog.update(&id, &body).await {
        Ok(entry) => HttpResponse::Ok().json(CatalogMessageResponse {
            message: "Item updated successfully".to_string(),
            entry,
        }),
        Err(e) => {
            error!("Failed to update catalog item {}: {}", id, e);
            e.into()
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/catalog")
            .route(web::get().to(list_catalog))
            .route(web::post().to(create_catalog_item)),
    )
    .service(web::resource("/catalog/{id}").route(web::put().to(update_catalog_item)));
}
