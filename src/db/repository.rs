//! Storage-agnostic interfaces used by the services.

use async_trait::async_trait;
use uuid::Uuid;

use crate::catalog::models::CatalogEntry;
use crate::error::KioskResult;
use crate::order::models::Order;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_by_key(&self, field_name: &str, name: &str) -> KioskResult<Option<CatalogEntry>>;

    async fn find_by_id(&self, id: &Uuid) -> KioskResult<Option<CatalogEntry>>;

    async fn list(&self, field_name: Option<&str>) -> KioskResult<Vec<CatalogEntry>>;

    /// Fails with a validation error when `(field_name, name)` already exists.
    async fn insert(&self, entry: &CatalogEntry) -> KioskResult<()>;

    /// Returns `false` when no entry has `entry.id`.
    async fn update(&self, entry: &CatalogEntry) -> KioskResult<bool>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> KioskResult<()>;

    async fn find_by_id(&self, id: &Uuid) -> KioskResult<Option<Order>>;

    /// Orders with the given printed flag, by serial number then timestamp.
    async fn find_by_printed(&self, is_printed: bool) -> KioskResult<Vec<Order>>;

    /// Flags the given unprinted orders as printed, zeroing their serial when
    /// `reset_serial` is set. Returns the number of orders changed.
    async fn mark_printed(&self, ids: &[Uuid], reset_serial: bool) -> KioskResult<u64>;

    /// Drops `file_contents` while keeping `files`. Returns `false` when there
    /// was nothing to strip.
    async fn strip_file_contents(&self, id: &Uuid) -> KioskResult<bool>;
}

/// Hands out order serial numbers. Implementations must never give the same
/// number twice between resets, however many callers race.
#[async_trait]
pub trait SerialCounter: Send + Sync {
    async fn next_serial(&self) -> KioskResult<i64>;

    async fn reset(&self) -> KioskResult<()>;
}
