pub mod costing;
pub mod handlers;
pub mod intake;
pub mod models;

#[cfg(test)]
mod mod_tests;

pub use intake::submit_order;
pub use models::{Order, OrderSubmission, UploadedFile};
