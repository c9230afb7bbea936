pub mod handlers;
pub mod issuer;


pub use issuer::{IssuedQr, QrIssuer};
