//! Export, cleanup and stored-file maintenance over in-memory state.

mod common;

use std::sync::Arc;

use kiosk_print_server::export::report::EXPORT_COLUMNS;
use kiosk_print_server::export::{cleanup_printed, clear_printed_files, export_unprinted, Sheet};
use kiosk_print_server::order::submit_order;
use kiosk_print_server::KioskError;

use common::{pdf_upload, submission, test_config, test_state, test_state_with, MockFileSink};

#[tokio::test]
async fn test_export_marks_orders_printed_and_repeat_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    for name in ["a.pdf", "b.pdf"] {
        submit_order(&state, submission(vec![pdf_upload(name, 2)]))
            .await
            .unwrap();
    }

    let outcome = export_unprinted(&state).await.unwrap();
    assert_eq!(outcome.exported, 2);
    assert!(outcome.filename.starts_with("unprinted_records_"));
    assert!(outcome.filename.ends_with(".xlsx"));
    assert_eq!(outcome.path, dir.path().join("exports").join(&outcome.filename));

    let sheet = Sheet::read_xlsx(&std::fs::read(&outcome.path).unwrap()).unwrap();
    assert_eq!(sheet.headers, EXPORT_COLUMNS.to_vec());
    assert_eq!(sheet.rows.len(), 2);
    assert_eq!(sheet.cell(0, 0).to_string(), "1");
    assert_eq!(sheet.cell(1, 0).to_string(), "2");

    assert!(state.orders.find_by_printed(false).await.unwrap().is_empty());
    assert_eq!(state.orders.find_by_printed(true).await.unwrap().len(), 2);

    let err = export_unprinted(&state).await.unwrap_err();
    assert!(matches!(err, KioskError::NotFound(_)));
}

#[tokio::test]
async fn test_export_with_nothing_unprinted_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;

    let err = export_unprinted(&state).await.unwrap_err();
    assert_eq!(err.to_string(), "No unprinted records found.");
}

#[tokio::test]
async fn test_export_resets_serials_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    submit_order(&state, submission(vec![pdf_upload("a.pdf", 1)]))
        .await
        .unwrap();
    submit_order(&state, submission(vec![pdf_upload("b.pdf", 1)]))
        .await
        .unwrap();

    export_unprinted(&state).await.unwrap();
    let printed = state.orders.find_by_printed(true).await.unwrap();
    assert!(printed.iter().all(|order| order.serial_number == 0));

    let next = submit_order(&state, submission(vec![pdf_upload("c.pdf", 1)]))
        .await
        .unwrap();
    assert_eq!(next.serial_number, 1);
    // Reused serial, distinct folder.
    assert_ne!(next.storage_folder, printed[0].storage_folder);
}

#[tokio::test]
async fn test_export_keeps_serials_when_reuse_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.reset_serial_on_export = false;
    let state = test_state_with(config).await;
    submit_order(&state, submission(vec![pdf_upload("a.pdf", 1)]))
        .await
        .unwrap();

    export_unprinted(&state).await.unwrap();
    let printed = state.orders.find_by_printed(true).await.unwrap();
    assert_eq!(printed[0].serial_number, 1);

    let next = submit_order(&state, submission(vec![pdf_upload("b.pdf", 1)]))
        .await
        .unwrap();
    assert_eq!(next.serial_number, 2);
}

#[tokio::test]
async fn test_orders_after_export_wait_for_the_next_export() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    submit_order(&state, submission(vec![pdf_upload("a.pdf", 1)]))
        .await
        .unwrap();
    export_unprinted(&state).await.unwrap();

    let late = submit_order(&state, submission(vec![pdf_upload("b.pdf", 1)]))
        .await
        .unwrap();
    let unprinted = state.orders.find_by_printed(false).await.unwrap();
    assert_eq!(unprinted.len(), 1);
    assert_eq!(unprinted[0].id, late.id);
}

#[tokio::test]
async fn test_cleanup_strips_contents_but_keeps_references() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.embed_file_contents = true;
    let state = test_state_with(config).await;
    let saved = submit_order(&state, submission(vec![pdf_upload("a.pdf", 1)]))
        .await
        .unwrap();

    let err = cleanup_printed(&state).await.unwrap_err();
    assert_eq!(err.to_string(), "No printed records found for cleanup.");

    export_unprinted(&state).await.unwrap();
    assert_eq!(cleanup_printed(&state).await.unwrap(), 1);

    let stored = state.orders.find_by_id(&saved.id).await.unwrap().unwrap();
    assert_eq!(stored.file_contents, None);
    assert_eq!(stored.files, saved.files);

    // Nothing left to strip.
    assert_eq!(cleanup_printed(&state).await.unwrap(), 0);
}

#[tokio::test]
async fn test_clear_files_removes_only_printed_orders() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MockFileSink::new());
    let state = test_state(dir.path()).await.with_file_sink(sink.clone());

    submit_order(
        &state,
        submission(vec![pdf_upload("a.pdf", 1), pdf_upload("b.pdf", 1)]),
    )
    .await
    .unwrap();
    export_unprinted(&state).await.unwrap();
    let pending = submit_order(&state, submission(vec![pdf_upload("c.pdf", 1)]))
        .await
        .unwrap();
    assert_eq!(sink.file_count().await, 3);

    assert_eq!(clear_printed_files(&state).await.unwrap(), 2);
    assert_eq!(sink.file_count().await, 1);
    assert!(
        sink.has_file(&format!("{}/1.1 c.pdf", pending.storage_folder))
            .await
    );
}

#[tokio::test]
async fn test_clear_files_on_local_disk() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    let saved = submit_order(&state, submission(vec![pdf_upload("a.pdf", 1)]))
        .await
        .unwrap();
    export_unprinted(&state).await.unwrap();

    assert_eq!(clear_printed_files(&state).await.unwrap(), 1);
    assert!(!dir
        .path()
        .join("output")
        .join(&saved.storage_folder)
        .exists());
}
