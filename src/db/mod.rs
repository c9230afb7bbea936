//! Database module - AppState and the repositories behind it
//!
//! - `repository` - storage-agnostic traits
//! - `catalog`, `order`, `serial` - Postgres implementations
//! - `memory` - in-process implementations

pub mod catalog;
pub mod memory;
pub mod order;
pub mod repository;
pub mod serial;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};

pub use self::repository::{CatalogRepository, OrderRepository, SerialCounter};

use crate::catalog::Catalog;
use crate::config::{DatabaseBackend, KioskConfig, StorageBackend};
use crate::notification::{DisabledMailer, Mailer, SmtpMailer};
use crate::qr::QrIssuer;
use crate::storage::{FileSink, LocalFileSink, SupabaseStorage};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<KioskConfig>,
    pub catalog: Catalog,
    pub orders: Arc<dyn OrderRepository>,
    pub serials: Arc<dyn SerialCounter>,
    pub files: Arc<dyn FileSink>,
    pub mailer: Arc<dyn Mailer>,
    pub qr_issuer: Arc<QrIssuer>,
}

impl AppState {
    pub async fn new_with_config(config: KioskConfig) -> anyhow::Result<Self> {
        let (catalog_repo, orders, serials): (
            Arc<dyn CatalogRepository>,
            Arc<dyn OrderRepository>,
            Arc<dyn SerialCounter>,
        ) = match config.database_backend {
            DatabaseBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("SUPABASE_DATABASE_URL must be set")?;
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(20)
                    .min_connections(2)
                    .acquire_timeout(Duration::from_secs(30))
                    .idle_timeout(Duration::from_secs(900))
                    .max_lifetime(Duration::from_secs(1800))
                    .connect(database_url)
                    .await
                    .context("connecting to Postgres")?;
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("running migrations")?;
                info!("Connected to Postgres, migrations applied");
                (
                    Arc::new(catalog::PgCatalogRepository::new(pool.clone())),
                    Arc::new(order::PgOrderRepository::new(pool.clone())),
                    Arc::new(serial::PgSerialCounter::new(pool)),
                )
            }
            DatabaseBackend::Memory => {
                warn!("Using in-memory repositories; data is lost on restart");
                (
                    Arc::new(memory::MemoryCatalogRepository::new()),
                    Arc::new(memory::MemoryOrderRepository::new()),
                    Arc::new(serial::MemorySerialCounter::new()),
                )
            }
        };

        let files: Arc<dyn FileSink> = match (config.storage_backend, &config.supabase) {
            (StorageBackend::Supabase, Some(supabase)) => {
                let http_client = reqwest::Client::builder()
                    .pool_idle_timeout(Duration::from_secs(900))
                    .user_agent("kiosk-print-server/1.0")
                    .build()
                    .context("building HTTP client")?;
                Arc::new(SupabaseStorage::new(supabase.clone(), http_client))
            }
            (StorageBackend::Supabase, None) => {
                anyhow::bail!("STORAGE_BACKEND=supabase requires SUPABASE_URL and SUPABASE_ANON_KEY")
            }
            (StorageBackend::Local, _) => Arc::new(LocalFileSink::new(config.output_dir.clone())),
        };

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
            None => {
                warn!("SMTP_SERVER is not set; email notifications will fail");
                Arc::new(DisabledMailer)
            }
        };

        Ok(Self::assemble(config, catalog_repo, orders, serials, files, mailer))
    }

    /// In-process state with local file storage and no mail transport.
    pub fn in_memory(config: KioskConfig) -> Self {
        let files: Arc<dyn FileSink> = Arc::new(LocalFileSink::new(config.output_dir.clone()));
        Self::assemble(
            config,
            Arc::new(memory::MemoryCatalogRepository::new()),
            Arc::new(memory::MemoryOrderRepository::new()),
            Arc::new(serial::MemorySerialCounter::new()),
            files,
            Arc::new(DisabledMailer),
        )
    }

    fn assemble(
        config: KioskConfig,
        catalog_repo: Arc<dyn CatalogRepository>,
        orders: Arc<dyn OrderRepository>,
        serials: Arc<dyn SerialCounter>,
        files: Arc<dyn FileSink>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let qr_issuer = Arc::new(QrIssuer::new(config.qr_dir()));
        Self {
            config: Arc::new(config),
            catalog: Catalog::new(catalog_repo),
            orders,
            serials,
            files,
            mailer,
            qr_issuer,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn with_file_sink(mut self, files: Arc<dyn FileSink>) -> Self {
        self.files = files;
        self
    }

    pub fn with_serial_counter(mut self, serials: Arc<dyn SerialCounter>) -> Self {
        self.serials = serials;
        self
    }
}
