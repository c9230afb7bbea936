pub mod handlers;
pub mod report;
pub mod split;
pub mod spreadsheet;


pub use report::{cleanup_printed, clear_printed_files, export_unprinted, ExportOutcome};
pub use spreadsheet::{CellValue, Sheet};
