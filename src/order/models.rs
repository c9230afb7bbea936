use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{KioskError, KioskResult};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A persisted print job.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow, PartialEq)]
pub struct Order {
    pub id: Uuid,
    /// Sequential number used for file naming; 0 once exported with serial reuse.
    #[schema(example = 12)]
    pub serial_number: i64,
    #[schema(value_type = String, example = "2025-01-31T10:15:00")]
    pub time_stamp: NaiveDateTime,
    #[schema(example = "Rahim Uddin")]
    pub name: String,
    #[schema(example = "01700000000")]
    pub phone: String,
    #[schema(example = "rahim@example.com")]
    pub email: String,
    pub description: String,
    #[schema(example = "TXN-20250131-001")]
    pub transaction_id: String,
    pub total_pdfs: i32,
    pub total_pages: i32,
    #[schema(example = "Black & White")]
    pub printing_type: String,
    pub printing_cost_per_page: f64,
    #[schema(example = "Library")]
    pub location: String,
    #[schema(example = "Spiral Binding")]
    pub binding_and_finishing: String,
    pub binding_cost: f64,
    pub total_cost: f64,
    pub copy_num: i32,
    /// Folder (relative to the file sink root) holding this order's files.
    pub storage_folder: String,
    /// Stored file references: local paths or remote URLs.
    pub files: Vec<String>,
    /// Base64 file contents, kept only until cleanup strips them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_contents: Option<Vec<String>>,
    pub is_printed: bool,
}

impl Order {
    pub fn formatted_timestamp(&self) -> String {
        self.time_stamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Everything a customer submits for one order.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub description: String,
    pub transaction_id: String,
    pub location: String,
    pub printing_type: String,
    pub binding_type: String,
    pub copy_num: Option<i32>,
    pub files: Vec<UploadedFile>,
}

impl OrderSubmission {
    pub fn copies(&self) -> i32 {
        self.copy_num.unwrap_or(1)
    }

    pub fn validate(&self) -> KioskResult<()> {
        if self.files.is_empty() {
            return Err(KioskError::Validation(
                "At least one PDF file is required".to_string(),
            ));
        }
        if self.copies() < 1 {
            return Err(KioskError::Validation(
                "copy_num must be at least 1".to_string(),
            ));
        }
        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("transaction_id", &self.transaction_id),
            ("location", &self.location),
            ("printing_type", &self.printing_type),
            ("binding_type", &self.binding_type),
        ] {
            if value.trim().is_empty() {
                return Err(KioskError::Validation(format!("{} cannot be empty", field)));
            }
        }
        if !self.email.contains('@') {
            return Err(KioskError::Validation(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }
}

/// Multipart body of `POST /api/orders`, for the OpenAPI document.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitOrderRequest {
    #[allow(unused)]
    pub name: String,
    #[allow(unused)]
    pub phone: String,
    #[allow(unused)]
    pub email: String,
    #[allow(unused)]
    pub description: String,
    #[allow(unused)]
    pub transaction_id: String,
    #[allow(unused)]
    pub location: String,
    #[allow(unused)]
    pub printing_type: String,
    #[allow(unused)]
    pub binding_type: String,
    #[allow(unused)]
    pub copy_num: Option<i32>,
    #[allow(unused)]
    #[schema(value_type = Vec<String>, format = Binary)]
    pub pdf_files: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitOrderResponse {
    #[schema(example = "User data saved successfully.")]
    pub message: String,
    pub order_id: Uuid,
    #[schema(example = 12)]
    pub serial_number: i64,
    #[schema(example = 140.0)]
    pub total_cost: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceResponse {
    pub message: String,
    pub count: usize,
}
