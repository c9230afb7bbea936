use async_trait::async_trait;
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::json;

use super::{FileSink, FolderContent};
use crate::config::ConfigError;
use crate::error::{KioskError, KioskResult};

const DEFAULT_BUCKET_NAME: &str = "kiosk-print-files";
const LIST_PAGE_LIMIT: usize = 1000;
const FOLDER_PLACEHOLDER: &str = ".emptyFolderPlaceholder";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub bucket_name: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            supabase_url: lookup("SUPABASE_URL")
                .ok_or_else(|| ConfigError::Missing("SUPABASE_URL".to_string()))?,
            supabase_anon_key: lookup("SUPABASE_ANON_KEY")
                .ok_or_else(|| ConfigError::Missing("SUPABASE_ANON_KEY".to_string()))?,
            bucket_name: lookup("BUCKET_NAME").unwrap_or_else(|| DEFAULT_BUCKET_NAME.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StorageObject {
    name: String,
    id: Option<String>,
    metadata: Option<StorageObjectMetadata>,
}

#[derive(Debug, Deserialize)]
struct StorageObjectMetadata {
    size: Option<u64>,
}

/// Supabase Storage REST client. Uploads return the object's public URL.
pub struct SupabaseStorage {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// `{SUPABASE_URL}/storage/v1/object/{route..}/{bucket}/{path}` with every
    /// segment percent-encoded.
    pub fn object_url(&self, route: &[&str], path: &str) -> KioskResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.config.supabase_url)
            .map_err(|e| KioskError::Dependency(format!("invalid SUPABASE_URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| KioskError::Dependency("SUPABASE_URL cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["storage", "v1", "object"])
            .extend(route.iter().copied())
            .push(&self.config.bucket_name)
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    pub fn public_url(&self, path: &str) -> KioskResult<String> {
        Ok(self.object_url(&["public"], path)?.to_string())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.config.supabase_anon_key)
            .header("apikey", &self.config.supabase_anon_key)
    }

    async fn upload(&self, path: &str, data: &[u8]) -> KioskResult<()> {
        let content_type = mime_guess::from_path(path).first_or_octet_stream();
        let response = self
            .authorized(self.client.post(self.object_url(&[], path)?))
            .header("Content-Type", content_type.as_ref())
            .header("x-upsert", "true")
            .body(data.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Supabase upload of '{}' failed with {}: {}", path, status, body);
            return Err(KioskError::Dependency(format!(
                "upload of '{}' failed with status {}",
                path, status
            )));
        }
        Ok(())
    }

    async fn list_page(&self, prefix: &str, offset: usize) -> KioskResult<Vec<StorageObject>> {
        let response = self
            .authorized(self.client.post(self.object_url(&["list"], "")?))
            .json(&json!({
                "prefix": prefix,
                "limit": LIST_PAGE_LIMIT,
                "offset": offset,
                "sortBy": { "column": "name", "order": "asc" }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KioskError::Dependency(format!(
                "listing '{}' failed with status {}",
                prefix,
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Lists every object under `prefix`, a page at a time until a short page.
    async fn list_all(&self, prefix: &str) -> KioskResult<Vec<StorageObject>> {
        let mut objects = Vec::new();
        loop {
            let page = self.list_page(prefix, objects.len()).await?;
            let last_page = page.len() < LIST_PAGE_LIMIT;
            objects.extend(page);
            if last_page {
                return Ok(objects);
            }
        }
    }

    async fn delete_objects(&self, paths: &[String]) -> KioskResult<()> {
        for batch in paths.chunks(LIST_PAGE_LIMIT) {
            let response = self
                .authorized(self.client.delete(self.object_url(&[], "")?))
                .json(&json!({ "prefixes": batch }))
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(KioskError::Dependency(format!(
                    "bulk delete of {} objects failed with status {}",
                    batch.len(),
                    response.status()
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FileSink for SupabaseStorage {
    async fn create_folder(&self, folder: &str) -> KioskResult<()> {
        let placeholder = format!("{}/{}", folder.trim_matches('/'), FOLDER_PLACEHOLDER);
        self.upload(&placeholder, &[]).await
    }

    async fn store_file(&self, folder: &str, filename: &str, data: &[u8]) -> KioskResult<String> {
        let path = format!("{}/{}", folder.trim_matches('/'), filename);
        debug!("Uploading {} bytes to Supabase object '{}'", data.len(), path);
        self.upload(&path, data).await?;
        let url = self.public_url(&path)?;
        info!("Uploaded '{}' to {}", path, url);
        Ok(url)
    }

    async fn list_folder_contents(&self, prefix: &str) -> KioskResult<Vec<FolderContent>> {
        let objects = self.list_all(prefix.trim_matches('/')).await?;
        Ok(objects
            .into_iter()
            .map(|object| FolderContent {
                is_file: object.id.is_some(),
                size: object.metadata.and_then(|m| m.size),
                name: object.name,
            })
            .collect())
    }

    async fn delete_prefix(&self, prefix: &str) -> KioskResult<usize> {
        let mut pending = vec![prefix.trim_matches('/').to_string()];
        let mut files = Vec::new();

        while let Some(folder) = pending.pop() {
            for entry in self.list_folder_contents(&folder).await? {
                let path = if folder.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{}/{}", folder, entry.name)
                };
                if entry.is_file {
                    files.push(path);
                } else {
                    pending.push(path);
                }
            }
        }

        if files.is_empty() {
            return Ok(0);
        }

        self.delete_objects(&files).await?;

        let removed = files
            .iter()
            .filter(|path| !path.ends_with(FOLDER_PLACEHOLDER))
            .count();
        info!("Deleted {} objects under '{}'", files.len(), prefix);
        Ok(removed)
    }
}
