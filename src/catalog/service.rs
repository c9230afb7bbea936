use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use moka::future::Cache;
use uuid::Uuid;

use super::models::{CatalogEntry, CatalogItemRequest};
use crate::db::CatalogRepository;
use crate::error::{KioskError, KioskResult};

type CatalogKey = (String, String);

/// Pricing catalog with a read-through cache in front of the repository.
///
/// Every write bumps `generation` before clearing the cache. A lookup that
/// saw a different generation when it started drops what it just cached, so
/// a read racing an update never leaves the old price behind.
#[derive(Clone)]
pub struct Catalog {
    repository: Arc<dyn CatalogRepository>,
    cache: Cache<CatalogKey, CatalogEntry>,
    generation: Arc<AtomicU64>,
}

impl Catalog {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(10 * 60))
            .max_capacity(500)
            .build();
        Self {
            repository,
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Resolves an option by category and name. Absence is `Ok(None)`; the
    /// caller decides how to report it.
    pub async fn find_option(&self, field_name: &str, name: &str) -> KioskResult<Option<CatalogEntry>> {
        let key = (field_name.to_string(), name.to_string());
        if let Some(entry) = self.cache.get(&key).await {
            debug!("Catalog cache hit for {:?}", key);
            return Ok(Some(entry));
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let entry = self.repository.find_by_key(field_name, name).await?;
        if let Some(entry) = &entry {
            self.cache.insert(key.clone(), entry.clone()).await;
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("Catalog changed during lookup of {:?}, not caching", key);
                self.cache.invalidate(&key).await;
            }
        }
        Ok(entry)
    }

    pub async fn list(&self, field_name: Option<&str>) -> KioskResult<Vec<CatalogEntry>> {
        self.repository.list(field_name).await
    }

    pub async fn create(&self, request: &CatalogItemRequest) -> KioskResult<CatalogEntry> {
        request.validate()?;
        let entry = CatalogEntry::new(request.field_name.trim(), request.name.trim(), request.cost);
        self.repository.insert(&entry).await?;
        self.invalidate();
        Ok(entry)
    }

    pub async fn update(&self, id: &Uuid, request: &CatalogItemRequest) -> KioskResult<CatalogEntry> {
        request.validate()?;
        let entry = CatalogEntry {
            id: *id,
            field_name: request.field_name.trim().to_string(),
            name: request.name.trim().to_string(),
            cost: request.cost,
        };
        if !self.repository.update(&entry).await? {
            return Err(KioskError::NotFound(format!("Catalog item {} not found", id)));
        }
        self.invalidate();
        Ok(entry)
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }
}
