//! Order serial counters

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use sqlx::PgPool;

use super::repository::SerialCounter;
use crate::error::KioskResult;

const ORDER_COUNTER: &str = "orders";

/// Counter row incremented by a single upsert, so concurrent submissions
/// can never read the same value.
pub struct PgSerialCounter {
    pool: PgPool,
}

impl PgSerialCounter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SerialCounter for PgSerialCounter {
    async fn next_serial(&self) -> KioskResult<i64> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO serial_counters (name, value) VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET value = serial_counters.value + 1
            RETURNING value
            "#,
        )
        .bind(ORDER_COUNTER)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }

    async fn reset(&self) -> KioskResult<()> {
        sqlx::query(
            r#"
            INSERT INTO serial_counters (name, value) VALUES ($1, 0)
            ON CONFLICT (name) DO UPDATE SET value = 0
            "#,
        )
        .bind(ORDER_COUNTER)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySerialCounter {
    current: AtomicI64,
}

impl MemorySerialCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(current: i64) -> Self {
        Self {
            current: AtomicI64::new(current),
        }
    }
}

#[async_trait]
impl SerialCounter for MemorySerialCounter {
    async fn next_serial(&self) -> KioskResult<i64> {
        Ok(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn reset(&self) -> KioskResult<()> {
        self.current.store(0, Ordering::SeqCst);
        Ok(())
    }
}
