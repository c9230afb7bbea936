//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::path::PathBuf;

use crate::storage::SupabaseConfig;

const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_EXPORT_DIR: &str = "exports";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173,http://127.0.0.1:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),
    #[error("Invalid value '{value}' for {key}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    Supabase,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub database_backend: DatabaseBackend,
    pub database_url: Option<String>,
    pub storage_backend: StorageBackend,
    pub supabase: Option<SupabaseConfig>,
    pub output_dir: PathBuf,
    pub export_dir: PathBuf,
    /// Exported orders get serial 0 and the counter restarts at 1.
    pub reset_serial_on_export: bool,
    pub embed_file_contents: bool,
    pub smtp: Option<SmtpConfig>,
    pub bind_address: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            database_backend: DatabaseBackend::Memory,
            database_url: None,
            storage_backend: StorageBackend::Local,
            supabase: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            reset_serial_on_export: true,
            embed_file_contents: false,
            smtp: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            cors_allowed_origins: split_list(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl KioskConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so it can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_backend = match lookup("DATABASE_BACKEND").as_deref() {
            None | Some("postgres") => DatabaseBackend::Postgres,
            Some("memory") => DatabaseBackend::Memory,
            Some(other) => return Err(invalid("DATABASE_BACKEND", other)),
        };
        let database_url = lookup("SUPABASE_DATABASE_URL");
        if database_backend == DatabaseBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("SUPABASE_DATABASE_URL".to_string()));
        }

        let storage_backend = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("local") => StorageBackend::Local,
            Some("supabase") => StorageBackend::Supabase,
            Some(other) => return Err(invalid("STORAGE_BACKEND", other)),
        };
        let supabase = match storage_backend {
            StorageBackend::Supabase => Some(SupabaseConfig::from_lookup(&lookup)?),
            StorageBackend::Local => None,
        };

        let smtp = match lookup("SMTP_SERVER") {
            Some(server) => {
                let port = match lookup("SMTP_PORT") {
                    Some(raw) => raw.parse().map_err(|_| invalid("SMTP_PORT", &raw))?,
                    None => DEFAULT_SMTP_PORT,
                };
                Some(SmtpConfig {
                    server,
                    port,
                    username: lookup("USERNAME").ok_or_else(|| ConfigError::Missing("USERNAME".to_string()))?,
                    password: lookup("PASSWORD").ok_or_else(|| ConfigError::Missing("PASSWORD".to_string()))?,
                })
            }
            None => None,
        };

        Ok(Self {
            database_backend,
            database_url,
            storage_backend,
            supabase,
            output_dir: lookup("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            export_dir: lookup("EXPORT_DIR").map(PathBuf::from).unwrap_or(defaults.export_dir),
            reset_serial_on_export: parse_bool(&lookup, "KIOSK_RESET_SERIAL_ON_EXPORT", true)?,
            embed_file_contents: parse_bool(&lookup, "KIOSK_EMBED_FILE_CONTENTS", false)?,
            smtp,
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.cors_allowed_origins),
        })
    }

    pub fn qr_dir(&self) -> PathBuf {
        self.export_dir.join("QR")
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(key, &raw)),
        },
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}
