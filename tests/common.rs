#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object, Stream};
use parking_lot::Mutex;

use kiosk_print_server::catalog::models::{
    CatalogItemRequest, BINDING_AND_FINISHING, LOCATION, PRINTING_TYPE,
};
use kiosk_print_server::notification::{Mailer, OutgoingEmail};
use kiosk_print_server::order::{OrderSubmission, UploadedFile};
use kiosk_print_server::storage::{FileSink, FolderContent};
use kiosk_print_server::{AppState, KioskConfig, KioskError, KioskResult};

/// A valid PDF with `pages` empty A4 pages.
pub fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("Failed to serialize test PDF");
    buffer
}

pub fn test_config(dir: &Path) -> KioskConfig {
    KioskConfig {
        output_dir: dir.join("output"),
        export_dir: dir.join("exports"),
        ..KioskConfig::default()
    }
}

/// In-memory state rooted in `dir`, with the standard catalog loaded.
pub async fn test_state(dir: &Path) -> AppState {
    test_state_with(test_config(dir)).await
}

pub async fn test_state_with(config: KioskConfig) -> AppState {
    let state = AppState::in_memory(config);
    seed_catalog(&state).await;
    state
}

pub async fn seed_catalog(state: &AppState) {
    let items = [
        (PRINTING_TYPE, "Black & White", 2.0),
        (PRINTING_TYPE, "Color", 5.0),
        (BINDING_AND_FINISHING, "None", 0.0),
        (BINDING_AND_FINISHING, "Spiral Binding", 30.0),
        (LOCATION, "Library", 0.0),
    ];
    for (field_name, name, cost) in items {
        state
            .catalog
            .create(&CatalogItemRequest {
                field_name: field_name.to_string(),
                name: name.to_string(),
                cost,
            })
            .await
            .expect("Failed to seed catalog");
    }
}

pub fn pdf_upload(filename: &str, pages: usize) -> UploadedFile {
    UploadedFile {
        filename: filename.to_string(),
        data: blank_pdf(pages),
    }
}

pub fn submission(files: Vec<UploadedFile>) -> OrderSubmission {
    OrderSubmission {
        name: "Rahim Uddin".to_string(),
        phone: "01700000000".to_string(),
        email: "rahim@example.com".to_string(),
        description: "Thesis draft".to_string(),
        transaction_id: "TXN-001".to_string(),
        location: "Library".to_string(),
        printing_type: "Black & White".to_string(),
        binding_type: "Spiral Binding".to_string(),
        copy_num: None,
        files,
    }
}

/// Records every message; fails for the listed recipients.
#[derive(Default)]
pub struct RecordingMailer {
    pub failing: Vec<String>,
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            failing: recipients.iter().map(|r| r.to_string()).collect(),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> KioskResult<()> {
        if self.failing.contains(&email.to) {
            return Err(KioskError::Dependency(format!("rejected {}", email.to)));
        }
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

/// Mock implementation of FileSink for testing
pub struct MockFileSink {
    files: Arc<tokio::sync::Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockFileSink {
    pub fn new() -> Self {
        Self {
            files: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
        }
    }

    pub async fn has_file(&self, key: &str) -> bool {
        self.files.lock().await.contains_key(key)
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

#[async_trait]
impl FileSink for MockFileSink {
    async fn create_folder(&self, _folder: &str) -> KioskResult<()> {
        Ok(())
    }

    async fn store_file(&self, folder: &str, filename: &str, data: &[u8]) -> KioskResult<String> {
        let key = format!("{}/{}", folder, filename);
        self.files.lock().await.insert(key.clone(), data.to_vec());
        Ok(format!("http://storage.test/{}", key))
    }

    async fn list_folder_contents(&self, prefix: &str) -> KioskResult<Vec<FolderContent>> {
        let prefix = format!("{}/", prefix);
        Ok(self
            .files
            .lock()
            .await
            .iter()
            .filter_map(|(key, data)| {
                key.strip_prefix(&prefix).map(|name| FolderContent {
                    name: name.to_string(),
                    is_file: true,
                    size: Some(data.len() as u64),
                })
            })
            .collect())
    }

    async fn delete_prefix(&self, prefix: &str) -> KioskResult<usize> {
        let prefix = format!("{}/", prefix);
        let mut files = self.files.lock().await;
        let before = files.len();
        files.retain(|key, _| !key.starts_with(&prefix));
        Ok(before - files.len())
    }
}

/// Builds a `multipart/form-data` body. Returns the content type header value
/// and the body bytes.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "----kiosk-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, filename, data) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
