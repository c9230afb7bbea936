use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use futures::StreamExt;
use log::debug;
use sanitize_filename::sanitize;

use crate::error::KioskError;
use crate::order::models::{OrderSubmission, UploadedFile};

const ORDER_FILE_FIELD: &str = "pdf_files";
const REQUIRED_ORDER_FIELDS: [&str; 7] = [
    "name",
    "phone",
    "email",
    "transaction_id",
    "location",
    "printing_type",
    "binding_type",
];

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("Invalid metadata: {0}")]
    MetadataError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
}

impl From<MultipartParseError> for KioskError {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::IoError(_) => KioskError::Internal(error.to_string()),
            _ => KioskError::Validation(error.to_string()),
        }
    }
}

/// A multipart form split into its text fields and uploaded files.
#[derive(Debug, Default)]
pub struct ParsedForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<(String, UploadedFile)>,
}

impl ParsedForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn required_text(&self, name: &str) -> Result<String, MultipartParseError> {
        self.text(name)
            .map(str::to_string)
            .ok_or_else(|| MultipartParseError::MetadataError(format!("Missing required field: {}", name)))
    }

    pub fn take_file(&mut self, field_name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|(name, _)| name == field_name)?;
        Some(self.files.remove(index).1)
    }
}

async fn read_field(field: &mut Field) -> Result<Vec<u8>, MultipartParseError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
        buffer.extend_from_slice(&data);
    }
    Ok(buffer)
}

pub struct MultipartParser;

impl MultipartParser {
    /// Collects every field. Parts carrying a filename are files, the rest
    /// are UTF-8 text.
    pub async fn parse_form(mut multipart: Multipart) -> Result<ParsedForm, MultipartParseError> {
        let mut form = ParsedForm::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| MultipartParseError::FieldError("Content disposition not found".to_string()))?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let filename = content_disposition.get_filename().map(|s| s.to_string());

            let bytes = read_field(&mut field).await?;
            match filename {
                Some(original) => {
                    let mut safe = sanitize(&original);
                    if safe.is_empty() {
                        safe = format!("file_{}.pdf", form.files.len() + 1);
                    }
                    debug!("Received file field '{}' ({} bytes) as '{}'", name, bytes.len(), safe);
                    form.files.push((
                        name,
                        UploadedFile {
                            filename: safe,
                            data: bytes,
                        },
                    ));
                }
                None => {
                    let value = String::from_utf8(bytes)
                        .map_err(|e| MultipartParseError::Utf8Error(e.to_string()))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub async fn parse_order_multipart(
        multipart: Multipart,
    ) -> Result<OrderSubmission, MultipartParseError> {
        let form = Self::parse_form(multipart).await?;
        for field in REQUIRED_ORDER_FIELDS {
            form.required_text(field)?;
        }

        let copy_num = match form.text("copy_num").map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                MultipartParseError::MetadataError(format!("copy_num '{}' is not a whole number", raw))
            })?),
        };

        let files = form
            .files
            .iter()
            .filter(|(name, _)| name == ORDER_FILE_FIELD)
            .map(|(_, file)| file.clone())
            .collect();

        Ok(OrderSubmission {
            name: form.required_text("name")?,
            phone: form.required_text("phone")?,
            email: form.required_text("email")?,
            description: form.text("description").unwrap_or_default().to_string(),
            transaction_id: form.required_text("transaction_id")?,
            location: form.required_text("location")?,
            printing_type: form.required_text("printing_type")?,
            binding_type: form.required_text("binding_type")?,
            copy_num,
            files,
        })
    }
}
