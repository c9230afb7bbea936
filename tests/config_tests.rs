use std::collections::HashMap;
use std::path::PathBuf;

use kiosk_print_server::config::{ConfigError, DatabaseBackend, StorageBackend};
use kiosk_print_server::KioskConfig;

fn config_from(pairs: &[(&str, &str)]) -> Result<KioskConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    KioskConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_postgres_requires_database_url() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing(ref key) if key == "SUPABASE_DATABASE_URL"));

    let config = config_from(&[("SUPABASE_DATABASE_URL", "postgres://localhost/kiosk")]).unwrap();
    assert_eq!(config.database_backend, DatabaseBackend::Postgres);
    assert_eq!(config.storage_backend, StorageBackend::Local);
}

#[test]
fn test_memory_backend_defaults() {
    let config = config_from(&[("DATABASE_BACKEND", "memory")]).unwrap();
    assert_eq!(config.database_backend, DatabaseBackend::Memory);
    assert_eq!(config.output_dir, PathBuf::from("output"));
    assert_eq!(config.export_dir, PathBuf::from("exports"));
    assert_eq!(config.qr_dir(), PathBuf::from("exports").join("QR"));
    assert!(config.reset_serial_on_export);
    assert!(!config.embed_file_contents);
    assert!(config.smtp.is_none());
    assert_eq!(config.bind_address, "0.0.0.0:8080");
}

#[test]
fn test_flags_and_directories_are_read() {
    let config = config_from(&[
        ("DATABASE_BACKEND", "memory"),
        ("OUTPUT_DIR", "/srv/kiosk/output"),
        ("EXPORT_DIR", "/srv/kiosk/exports"),
        ("KIOSK_RESET_SERIAL_ON_EXPORT", "false"),
        ("KIOSK_EMBED_FILE_CONTENTS", "yes"),
        ("CORS_ALLOWED_ORIGINS", "https://kiosk.example.com, http://localhost:3000"),
    ])
    .unwrap();
    assert_eq!(config.output_dir, PathBuf::from("/srv/kiosk/output"));
    assert_eq!(config.export_dir, PathBuf::from("/srv/kiosk/exports"));
    assert!(!config.reset_serial_on_export);
    assert!(config.embed_file_contents);
    assert_eq!(
        config.cors_allowed_origins,
        vec!["https://kiosk.example.com", "http://localhost:3000"]
    );
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(matches!(
        config_from(&[("DATABASE_BACKEND", "sqlite")]),
        Err(ConfigError::Invalid { .. })
    ));
    assert!(config_from(&[("DATABASE_BACKEND", "memory"), ("KIOSK_EMBED_FILE_CONTENTS", "maybe")]).is_err());
    assert!(config_from(&[("DATABASE_BACKEND", "memory"), ("STORAGE_BACKEND", "s3")]).is_err());
}

#[test]
fn test_smtp_settings() {
    let config = config_from(&[
        ("DATABASE_BACKEND", "memory"),
        ("SMTP_SERVER", "smtp.example.com"),
        ("USERNAME", "kiosk@example.com"),
        ("PASSWORD", "secret"),
    ])
    .unwrap();
    let smtp = config.smtp.unwrap();
    assert_eq!(smtp.server, "smtp.example.com");
    assert_eq!(smtp.port, 465);
    assert_eq!(smtp.username, "kiosk@example.com");

    let err = config_from(&[
        ("DATABASE_BACKEND", "memory"),
        ("SMTP_SERVER", "smtp.example.com"),
        ("SMTP_PORT", "not-a-port"),
        ("USERNAME", "kiosk@example.com"),
        ("PASSWORD", "secret"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "SMTP_PORT"));

    let err = config_from(&[("DATABASE_BACKEND", "memory"), ("SMTP_SERVER", "smtp.example.com")])
        .unwrap_err();
    assert!(matches!(err, ConfigError::Missing(_)));
}

#[test]
fn test_supabase_storage_needs_credentials() {
    let err = config_from(&[("DATABASE_BACKEND", "memory"), ("STORAGE_BACKEND", "supabase")])
        .unwrap_err();
    assert!(matches!(err, ConfigError::Missing(_)));

    let config = config_from(&[
        ("DATABASE_BACKEND", "memory"),
        ("STORAGE_BACKEND", "supabase"),
        ("SUPABASE_URL", "https://project.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
    ])
    .unwrap();
    assert_eq!(config.storage_backend, StorageBackend::Supabase);
    assert_eq!(config.supabase.unwrap().bucket_name, "kiosk-print-files");
}
