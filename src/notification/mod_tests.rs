use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{KioskError, KioskResult};
use crate::export::spreadsheet::{CellValue, Sheet};
use crate::notification::dispatch::{
    dispatch_rows, output_file_name, render_template, with_status_column, DeliveryStatus,
    STATUS_COLUMN,
};
use crate::notification::{DisabledMailer, Mailer, OutgoingEmail};

/// Records every message and fails for the listed recipients.
#[derive(Default)]
struct ScriptedMailer {
    failing: Vec<String>,
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for ScriptedMailer {
    async fn send(&self, email: &OutgoingEmail) -> KioskResult<()> {
        if self.failing.contains(&email.to) {
            return Err(KioskError::Dependency("mailbox unavailable".to_string()));
        }
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

fn customers() -> Sheet {
    let mut sheet = Sheet::new(["Name", "Email", "Location"]);
    sheet.push_row(vec!["Ana".into(), "ana@example.com".into(), "Library".into()]);
    sheet.push_row(vec!["Ben".into(), "ben@example.com".into(), "Hall B".into()]);
    sheet.push_row(vec!["Cy".into(), "cy@example.com".into(), "Library".into()]);
    sheet
}

#[test]
fn test_render_template_fills_placeholders() {
    let sheet = customers();
    let body = render_template("Hi {Name}, pick up at {Location}. {Unknown}", &sheet, 1);
    assert_eq!(body, "Hi Ben, pick up at Hall B. {Unknown}");
}

#[test]
fn test_render_template_prints_whole_numbers_without_decimals() {
    let mut sheet = Sheet::new(["Email", "SL_No"]);
    sheet.push_row(vec!["a@example.com".into(), CellValue::Number(7.0)]);
    assert_eq!(render_template("Order #{SL_No}", &sheet, 0), "Order #7");
}

#[tokio::test]
async fn test_failed_row_does_not_stop_the_rest() {
    let mailer = ScriptedMailer {
        failing: vec!["ben@example.com".to_string()],
        ..Default::default()
    };
    let statuses = dispatch_rows(&mailer, &customers(), "Ready", "Hello {Name}")
        .await
        .unwrap();

    assert_eq!(
        statuses,
        vec![DeliveryStatus::Sent, DeliveryStatus::Failed, DeliveryStatus::Sent]
    );
    let sent = mailer.sent.lock();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].body, "Hello Ana");
    assert_eq!(sent[1].to, "cy@example.com");
    assert_eq!(sent[1].subject, "Ready");
}

#[tokio::test]
async fn test_blank_email_is_marked_failed() {
    let mut sheet = Sheet::new(["Name", "Email"]);
    sheet.push_row(vec!["Ana".into(), CellValue::Empty]);
    let mailer = ScriptedMailer::default();

    let statuses = dispatch_rows(&mailer, &sheet, "s", "b").await.unwrap();
    assert_eq!(statuses, vec![DeliveryStatus::Failed]);
    assert!(mailer.sent.lock().is_empty());
}

#[tokio::test]
async fn test_missing_email_column_is_rejected() {
    let sheet = Sheet::new(["Name", "Location"]);
    let err = dispatch_rows(&ScriptedMailer::default(), &sheet, "s", "b")
        .await
        .unwrap_err();
    assert!(matches!(err, KioskError::Validation(_)));
    assert!(err.to_string().contains("'Email' column not found"));
}

#[tokio::test]
async fn test_disabled_mailer_marks_every_row_failed() {
    let statuses = dispatch_rows(&DisabledMailer, &customers(), "s", "b")
        .await
        .unwrap();
    assert!(statuses.iter().all(|s| *s == DeliveryStatus::Failed));
}

#[test]
fn test_status_column_is_appended_once() {
    let sheet = customers();
    let statuses = [DeliveryStatus::Sent, DeliveryStatus::Failed, DeliveryStatus::Sent];

    let first = with_status_column(&sheet, &statuses);
    assert_eq!(first.headers.last().map(String::as_str), Some(STATUS_COLUMN));
    assert_eq!(first.cell(1, 3), &CellValue::from("Failed"));

    let rerun = with_status_column(&first, &[DeliveryStatus::Sent; 3]);
    assert_eq!(rerun.headers.len(), first.headers.len());
    assert_eq!(rerun.cell(1, 3), &CellValue::from("Sent"));
}

#[test]
fn test_output_file_name_is_sanitized() {
    assert_eq!(output_file_name("customers.xlsx"), "customers.xlsx");
    assert_eq!(output_file_name("reports/customers.xlsx"), "reportscustomers.xlsx");
    assert_eq!(output_file_name(""), "notification_results.xlsx");
}
