pub mod handlers;
pub mod models;
pub mod service;


pub use models::CatalogEntry;
pub use service::Catalog;
