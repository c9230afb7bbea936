//! Unprinted-order export plus the printed-record maintenance operations.

use std::path::PathBuf;

use chrono::Local;
use log::{debug, info};

use super::spreadsheet::{CellValue, Sheet};
use crate::db::AppState;
use crate::error::{KioskError, KioskResult};
use crate::order::models::Order;

pub const EXPORT_COLUMNS: [&str; 17] = [
    "SL_No",
    "Timestamp",
    "Name",
    "Phone",
    "Email",
    "Description",
    "Transaction_ID",
    "Total_PDFs",
    "Total_Pages",
    "Printing_Type",
    "Printing_Cost_Per_Page",
    "Location",
    "Binding_and_Finishing",
    "Binding_Cost",
    "Copies",
    "Total_Cost",
    "Files",
];

pub fn order_row(order: &Order) -> Vec<CellValue> {
    vec![
        order.serial_number.into(),
        order.formatted_timestamp().into(),
        order.name.as_str().into(),
        order.phone.as_str().into(),
        order.email.as_str().into(),
        order.description.as_str().into(),
        order.transaction_id.as_str().into(),
        order.total_pdfs.into(),
        order.total_pages.into(),
        order.printing_type.as_str().into(),
        order.printing_cost_per_page.into(),
        order.location.as_str().into(),
        order.binding_and_finishing.as_str().into(),
        order.binding_cost.into(),
        order.copy_num.into(),
        order.total_cost.into(),
        order.files.join(", ").into(),
    ]
}

pub fn orders_to_sheet(orders: &[Order]) -> Sheet {
    let mut sheet = Sheet::new(EXPORT_COLUMNS);
    for order in orders {
        sheet.push_row(order_row(order));
    }
    sheet
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub filename: String,
    pub path: PathBuf,
    pub exported: usize,
}

/// Writes every unprinted order to a new spreadsheet, then flags exactly
/// those orders as printed.
pub async fn export_unprinted(state: &AppState) -> KioskResult<ExportOutcome> {
    let orders = state.orders.find_by_printed(false).await?;
    if orders.is_empty() {
        return Err(KioskError::NotFound("No unprinted records found.".to_string()));
    }
    debug!("Exporting {} unprinted orders", orders.len());

    let export_dir = state.config.export_dir.clone();
    tokio::fs::create_dir_all(&export_dir).await?;
    let filename = format!(
        "unprinted_records_{}.xlsx",
        Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = export_dir.join(&filename);

    let sheet = orders_to_sheet(&orders);
    let target = path.clone();
    tokio::task::spawn_blocking(move || sheet.write_xlsx(&target)).await??;

    let ids: Vec<_> = orders.iter().map(|order| order.id).collect();
    let reset = state.config.reset_serial_on_export;
    let changed = state.orders.mark_printed(&ids, reset).await?;
    if reset {
        state.serials.reset().await?;
        debug!("Order serial counter reset after export");
    }

    info!("Exported {} orders to {}", changed, path.display());
    Ok(ExportOutcome {
        filename,
        path,
        exported: orders.len(),
    })
}

/// Strips embedded file contents from printed orders; file references stay.
pub async fn cleanup_printed(state: &AppState) -> KioskResult<usize> {
    let printed = state.orders.find_by_printed(true).await?;
    if printed.is_empty() {
        return Err(KioskError::NotFound(
            "No printed records found for cleanup.".to_string(),
        ));
    }
    info!("Found {} printed records for cleanup.", printed.len());

    let mut updated = 0;
    for order in printed.iter().filter(|order| order.file_contents.is_some()) {
        if state.orders.strip_file_contents(&order.id).await? {
            updated += 1;
        }
    }
    Ok(updated)
}

/// Deletes the stored files of every printed order.
pub async fn clear_printed_files(state: &AppState) -> KioskResult<usize> {
    let printed = state.orders.find_by_printed(true).await?;
    if printed.is_empty() {
        return Err(KioskError::NotFound(
            "No printed records found to clear files for.".to_string(),
        ));
    }

    let mut removed = 0;
    for order in printed.iter().filter(|order| !order.storage_folder.is_empty()) {
        removed += state.files.delete_prefix(&order.storage_folder).await?;
    }
    info!("Removed {} stored files of {} printed orders", removed, printed.len());
    Ok(removed)
}
