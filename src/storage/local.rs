use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;

use super::{FileSink, FolderContent};
use crate::error::KioskResult;

/// Stores order files in per-order folders under a root directory.
#[derive(Debug, Clone)]
pub struct LocalFileSink {
    root: PathBuf,
}

impl LocalFileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, prefix: &str) -> PathBuf {
        let trimmed = prefix.trim_matches('/');
        if trimmed.is_empty() {
            self.root.clone()
        } else {
            self.root.join(trimmed)
        }
    }
}

#[async_trait]
impl FileSink for LocalFileSink {
    async fn create_folder(&self, folder: &str) -> KioskResult<()> {
        let path = self.resolve(folder);
        debug!("Creating local folder {}", path.display());
        tokio::fs::create_dir_all(&path).await?;
        Ok(())
    }

    async fn store_file(&self, folder: &str, filename: &str, data: &[u8]) -> KioskResult<String> {
        let dir = self.resolve(folder);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(filename);
        tokio::fs::write(&path, data).await?;
        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn list_folder_contents(&self, prefix: &str) -> KioskResult<Vec<FolderContent>> {
        let dir = self.resolve(prefix);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut contents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            contents.push(FolderContent {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_file: metadata.is_file(),
                size: metadata.is_file().then(|| metadata.len()),
            });
        }
        contents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(contents)
    }

    async fn delete_prefix(&self, prefix: &str) -> KioskResult<usize> {
        let target = self.resolve(prefix);
        let keep_root = target == self.root;
        let removed = tokio::task::spawn_blocking(move || remove_tree(&target, keep_root)).await??;
        Ok(removed)
    }
}

/// Removes everything below `path`, counting files. The directory itself is
/// kept when `keep_dir` is set.
fn remove_tree(path: &Path, keep_dir: bool) -> io::Result<usize> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    if metadata.is_file() {
        fs::remove_file(path)?;
        return Ok(1);
    }

    let mut removed = 0;
    for entry in fs::read_dir(path)? {
        removed += remove_tree(&entry?.path(), false)?;
    }
    if !keep_dir {
        fs::remove_dir(path)?;
    }
    Ok(removed)
}
