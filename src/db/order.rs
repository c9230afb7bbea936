//! Order database operations

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repository::OrderRepository;
use crate::error::KioskResult;
use crate::order::models::Order;

const ORDER_COLUMNS: &str = "id, serial_number, time_stamp, name, phone, email, description, \
    transaction_id, total_pdfs, total_pages, printing_type, printing_cost_per_page, location, \
    binding_and_finishing, binding_cost, total_cost, copy_num, storage_folder, files, \
    file_contents, is_printed";

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: &Order) -> KioskResult<()> {
        sqlx::query(&format!(
            "INSERT INTO orders ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)",
            ORDER_COLUMNS
        ))
        .bind(order.id)
        .bind(order.serial_number)
        .bind(order.time_stamp)
        .bind(&order.name)
        .bind(&order.phone)
        .bind(&order.email)
        .bind(&order.description)
        .bind(&order.transaction_id)
        .bind(order.total_pdfs)
        .bind(order.total_pages)
        .bind(&order.printing_type)
        .bind(order.printing_cost_per_page)
        .bind(&order.location)
        .bind(&order.binding_and_finishing)
        .bind(order.binding_cost)
        .bind(order.total_cost)
        .bind(order.copy_num)
        .bind(&order.storage_folder)
        .bind(&order.files)
        .bind(&order.file_contents)
        .bind(order.is_printed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> KioskResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    async fn find_by_printed(&self, is_printed: bool) -> KioskResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE is_printed = $1 ORDER BY serial_number, time_stamp",
            ORDER_COLUMNS
        ))
        .bind(is_printed)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn mark_printed(&self, ids: &[Uuid], reset_serial: bool) -> KioskResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET is_printed = TRUE,
                serial_number = CASE WHEN $2 THEN 0 ELSE serial_number END
            WHERE id = ANY($1) AND is_printed = FALSE
            "#,
        )
        .bind(ids)
        .bind(reset_serial)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn strip_file_contents(&self, id: &Uuid) -> KioskResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET file_contents = NULL WHERE id = $1 AND file_contents IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
