//! In-process repositories, used with `DATABASE_BACKEND=memory` and in tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::repository::{CatalogRepository, OrderRepository};
use crate::catalog::models::CatalogEntry;
use crate::error::{KioskError, KioskResult};
use crate::order::models::Order;

#[derive(Debug, Default)]
pub struct MemoryCatalogRepository {
    entries: RwLock<Vec<CatalogEntry>>,
}

impl MemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_unique(entries: &[CatalogEntry], entry: &CatalogEntry) -> KioskResult<()> {
        let taken = entries.iter().any(|existing| {
            existing.id != entry.id
                && existing.field_name == entry.field_name
                && existing.name == entry.name
        });
        if taken {
            return Err(KioskError::Validation(format!(
                "Catalog item '{}' already exists in '{}'",
                entry.name, entry.field_name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn find_by_key(&self, field_name: &str, name: &str) -> KioskResult<Option<CatalogEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .find(|e| e.field_name == field_name && e.name == name)
            .cloned())
    }

    async fn find_by_id(&self, id: &Uuid) -> KioskResult<Option<CatalogEntry>> {
        Ok(self.entries.read().iter().find(|e| e.id == *id).cloned())
    }

    async fn list(&self, field_name: Option<&str>) -> KioskResult<Vec<CatalogEntry>> {
        let mut entries: Vec<CatalogEntry> = self
            .entries
            .read()
            .iter()
            .filter(|e| field_name.map_or(true, |f| e.field_name == f))
            .cloned()
            .collect();
        entries.sort_by(|a, b| (&a.field_name, &a.name).cmp(&(&b.field_name, &b.name)));
        Ok(entries)
    }

    async fn insert(&self, entry: &CatalogEntry) -> KioskResult<()> {
        let mut entries = self.entries.write();
        Self::ensure_unique(&entries, entry)?;
        entries.push(entry.clone());
        Ok(())
    }

    async fn update(&self, entry: &CatalogEntry) -> KioskResult<bool> {
        let mut entries = self.entries.write();
        Self::ensure_unique(&entries, entry)?;
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                *existing = entry.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn insert(&self, order: &Order) -> KioskResult<()> {
        self.orders.write().push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> KioskResult<Option<Order>> {
        Ok(self.orders.read().iter().find(|o| o.id == *id).cloned())
    }

    async fn find_by_printed(&self, is_printed: bool) -> KioskResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .iter()
            .filter(|o| o.is_printed == is_printed)
            .cloned()
            .collect();
        orders.sort_by(|a, b| {
            a.serial_number
                .cmp(&b.serial_number)
                .then(a.time_stamp.cmp(&b.time_stamp))
        });
        Ok(orders)
    }

    async fn mark_printed(&self, ids: &[Uuid], reset_serial: bool) -> KioskResult<u64> {
        let mut changed = 0;
        for order in self.orders.write().iter_mut() {
            if !order.is_printed && ids.contains(&order.id) {
                order.is_printed = true;
                if reset_serial {
                    order.serial_number = 0;
                }
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn strip_file_contents(&self, id: &Uuid) -> KioskResult<bool> {
        let mut orders = self.orders.write();
        Ok(orders
            .iter_mut()
            .find(|o| o.id == *id)
            .and_then(|o| o.file_contents.take())
            .is_some())
    }
}
