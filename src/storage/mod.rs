//! File storage for uploaded order files.
//!
//! Intake writes every file through a [`FileSink`]; which implementation is
//! used is decided by `STORAGE_BACKEND`:
//! - `local` - [`LocalFileSink`], folders under `OUTPUT_DIR`
//! - `supabase` - [`SupabaseStorage`], objects in a Supabase Storage bucket

mod local;
mod supabase;


use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::KioskResult;

pub use local::LocalFileSink;
pub use supabase::{SupabaseConfig, SupabaseStorage};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FolderContent {
    pub name: String,
    pub is_file: bool,
    pub size: Option<u64>,
}

#[async_trait]
pub trait FileSink: Send + Sync {
    async fn create_folder(&self, folder: &str) -> KioskResult<()>;

    /// Stores `data` as `folder/filename` and returns the durable reference
    /// (a filesystem path or a public URL) recorded on the order.
    async fn store_file(&self, folder: &str, filename: &str, data: &[u8]) -> KioskResult<String>;

    async fn list_folder_contents(&self, prefix: &str) -> KioskResult<Vec<FolderContent>>;

    /// Deletes every stored file under `prefix` and returns how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> KioskResult<usize>;
}
