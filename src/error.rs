use actix_web::HttpResponse;

use crate::ErrorResponse;

pub type KioskResult<T> = Result<T, KioskError>;

#[derive(Debug, thiserror::Error)]
pub enum KioskError {
    /// Bad or missing option, malformed upload, missing required column.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Database, remote storage or mail transport failure.
    #[error("Dependency failure: {0}")]
    Dependency(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("QR code error: {0}")]
    Qr(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KioskError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, KioskError::Validation(_) | KioskError::NotFound(_))
    }
}

impl From<sqlx::Error> for KioskError {
    fn from(error: sqlx::Error) -> Self {
        KioskError::Dependency(format!("database: {}", error))
    }
}

impl From<reqwest::Error> for KioskError {
    fn from(error: reqwest::Error) -> Self {
        KioskError::Dependency(format!("remote storage: {}", error))
    }
}

impl From<rust_xlsxwriter::XlsxError> for KioskError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        KioskError::Spreadsheet(error.to_string())
    }
}

impl From<tokio::task::JoinError> for KioskError {
    fn from(error: tokio::task::JoinError) -> Self {
        KioskError::Internal(format!("blocking task failed: {}", error))
    }
}

impl From<actix_web::error::BlockingError> for KioskError {
    fn from(error: actix_web::error::BlockingError) -> Self {
        KioskError::Internal(error.to_string())
    }
}

impl From<KioskError> for HttpResponse {
    fn from(error: KioskError) -> Self {
        match error {
            KioskError::Validation(message) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
            }
            KioskError::NotFound(message) => {
                HttpResponse::NotFound().json(ErrorResponse::not_found(&message))
            }
            other => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&other.to_string())),
        }
    }
}
