//! Catalog database operations

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repository::CatalogRepository;
use crate::catalog::models::CatalogEntry;
use crate::error::{KioskError, KioskResult};

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn duplicate_entry(error: sqlx::Error, entry: &CatalogEntry) -> KioskError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => KioskError::Validation(format!(
            "Catalog item '{}' already exists in '{}'",
            entry.name, entry.field_name
        )),
        _ => error.into(),
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn find_by_key(&self, field_name: &str, name: &str) -> KioskResult<Option<CatalogEntry>> {
        let entry = sqlx::query_as::<_, CatalogEntry>(
            "SELECT id, field_name, name, cost FROM catalog_entries WHERE field_name = $1 AND name = $2",
        )
        .bind(field_name)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn find_by_id(&self, id: &Uuid) -> KioskResult<Option<CatalogEntry>> {
        let entry = sqlx::query_as::<_, CatalogEntry>(
            "SELECT id, field_name, name, cost FROM catalog_entries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn list(&self, field_name: Option<&str>) -> KioskResult<Vec<CatalogEntry>> {
        let entries = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT id, field_name, name, cost FROM catalog_entries
            WHERE $1::TEXT IS NULL OR field_name = $1
            ORDER BY field_name, name
            "#,
        )
        .bind(field_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn insert(&self, entry: &CatalogEntry) -> KioskResult<()> {
        sqlx::query(
            "INSERT INTO catalog_entries (id, field_name, name, cost) VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.id)
        .bind(&entry.field_name)
        .bind(&entry.name)
        .bind(entry.cost)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_entry(e, entry))?;
        Ok(())
    }

    async fn update(&self, entry: &CatalogEntry) -> KioskResult<bool> {
        let result = sqlx::query(
            "UPDATE catalog_entries SET field_name = $2, name = $3, cost = $4 WHERE id = $1",
        )
        .bind(entry.id)
        .bind(&entry.field_name)
        .bind(&entry.name)
        .bind(entry.cost)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_entry(e, entry))?;
        Ok(result.rows_affected() > 0)
    }
}
