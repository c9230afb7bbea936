pub mod dispatch;
pub mod handlers;
pub mod mailer;

#[cfg(test)]
mod mod_tests;

pub use mailer::{DisabledMailer, Mailer, OutgoingEmail, SmtpMailer};
