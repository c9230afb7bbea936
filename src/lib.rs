use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod multipart_parser;
pub mod notification;
pub mod order;
pub mod qr;
pub mod storage;

pub use crate::config::KioskConfig;
pub use crate::db::AppState;
pub use crate::error::{KioskError, KioskResult};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::catalog::handlers::list_catalog,
        crate::catalog::handlers::create_catalog_item,
        crate::catalog::handlers::update_catalog_item,
        crate::order::handlers::create_order,
        crate::export::handlers::export_orders,
        crate::export::handlers::cleanup_orders,
        crate::export::handlers::clear_order_files,
        crate::export::handlers::split_by_location,
        crate::notification::handlers::send_email_notifications,
        crate::qr::handlers::generate_qr
    ),
    components(
        schemas(
            catalog::models::CatalogEntry,
            catalog::models::CatalogItemRequest,
            catalog::models::CatalogMessageResponse,
            order::models::Order,
            order::models::SubmitOrderRequest,
            order::models::SubmitOrderResponse,
            order::models::MaintenanceResponse,
            export::handlers::SplitUploadRequest,
            notification::handlers::SendNotificationsRequest,
            notification::handlers::SendNotificationsResponse,
            qr::handlers::GenerateQrRequest,
            qr::handlers::GenerateQrResponse,
            storage::FolderContent,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Catalog Service", description = "Printing, binding and location options."),
        (name = "Order Service", description = "Order intake and costing."),
        (name = "Export Service", description = "Spreadsheet export and printed-record maintenance."),
        (name = "Notification Service", description = "Bulk email from a spreadsheet."),
        (name = "QR Service", description = "Serial-numbered QR code images.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost")
    )
)]
pub struct ApiDoc;

/// Mounts every API route. Callers wrap it in the `/api` scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(catalog::handlers::config)
        .configure(order::handlers::config)
        .configure(export::handlers::config)
        .configure(notification::handlers::config)
        .configure(qr::handlers::config);
}

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match KioskConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let bind_address = config.bind_address.clone();
    let allowed_origins = config.cors_allowed_origins.clone();

    let app_state = match AppState::new_with_config(config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to initialise application state. Check SUPABASE_DATABASE_URL and storage settings in .env. Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let prometheus = match PrometheusMetricsBuilder::new("kiosk_print_server")
        .endpoint("/metrics")
        .build()
    {
        Ok(prometheus) => prometheus,
        Err(e) => {
            log::error!("Failed to create Prometheus metrics middleware: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(web::scope("/api").configure(configure_routes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind_address)?
    .run()
    .await
}
