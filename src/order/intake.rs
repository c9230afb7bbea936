use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;
use log::{debug, info};
use sanitize_filename::sanitize;
use uuid::Uuid;

use super::costing::{compute_total_cost, count_pdf_pages};
use super::models::{Order, OrderSubmission};
use crate::catalog::models::{BINDING_AND_FINISHING, PRINTING_TYPE};
use crate::db::AppState;
use crate::error::{KioskError, KioskResult};

/// `{serial}.{index} {filename}`, index starting at 1.
pub fn stored_file_name(serial: i64, index: usize, filename: &str) -> String {
    let safe = sanitize(filename);
    let safe = if safe.is_empty() {
        "file.pdf".to_string()
    } else {
        safe
    };
    format!("{}.{} {}", serial, index, safe)
}

pub fn order_folder(serial: i64, id: &Uuid) -> String {
    format!("{}-{}", serial, id)
}

/// Validates, prices, stores and persists one order.
///
/// The serial is drawn only after every validation has passed, so a
/// rejected submission never consumes one.
pub async fn submit_order(state: &AppState, submission: OrderSubmission) -> KioskResult<Order> {
    submission.validate()?;

    let printing = state
        .catalog
        .find_option(PRINTING_TYPE, submission.printing_type.trim())
        .await?;
    let binding = state
        .catalog
        .find_option(BINDING_AND_FINISHING, submission.binding_type.trim())
        .await?;
    let (printing, binding) = match (printing, binding) {
        (Some(printing), Some(binding)) => (printing, binding),
        _ => {
            return Err(KioskError::Validation(
                "Invalid printing or binding type".to_string(),
            ))
        }
    };

    let OrderSubmission {
        name,
        phone,
        email,
        description,
        transaction_id,
        location,
        copy_num,
        files,
        ..
    } = submission;
    let copies = copy_num.unwrap_or(1);

    let (files, page_counts) = tokio::task::spawn_blocking(move || {
        let counts: Vec<u32> = files
            .iter()
            .map(|file| count_pdf_pages(&file.filename, &file.data))
            .collect();
        (files, counts)
    })
    .await?;
    let total_pages: u32 = page_counts.iter().sum();
    let total_pdfs = files.len() as u32;
    let cost = compute_total_cost(
        total_pages,
        printing.cost,
        binding.cost,
        total_pdfs,
        copies as u32,
    );
    debug!(
        "Order priced: {} pages over {} files, printing {:.2}, binding {:.2}, {} copies",
        total_pages, total_pdfs, cost.printing, cost.binding, copies
    );

    let serial = state.serials.next_serial().await?;
    let id = Uuid::new_v4();
    let folder = order_folder(serial, &id);
    state.files.create_folder(&folder).await?;

    let mut references = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let stored_name = stored_file_name(serial, index + 1, &file.filename);
        references.push(state.files.store_file(&folder, &stored_name, &file.data).await?);
    }

    let file_contents = state
        .config
        .embed_file_contents
        .then(|| files.iter().map(|file| BASE64.encode(&file.data)).collect());

    let order = Order {
        id,
        serial_number: serial,
        time_stamp: Local::now().naive_local(),
        name: name.trim().to_string(),
        phone: phone.trim().to_string(),
        email: email.trim().to_string(),
        description,
        transaction_id: transaction_id.trim().to_string(),
        total_pdfs: total_pdfs as i32,
        total_pages: total_pages as i32,
        printing_type: printing.name,
        printing_cost_per_page: printing.cost,
        location: location.trim().to_string(),
        binding_and_finishing: binding.name,
        binding_cost: binding.cost,
        total_cost: cost.total,
        copy_num: copies,
        storage_folder: folder,
        files: references,
        file_contents,
        is_printed: false,
    };
    state.orders.insert(&order).await?;

    info!(
        "Order {} saved with serial {} and total cost {:.2}",
        order.id, order.serial_number, order.total_cost
    );
    Ok(order)
}
