use lopdf::{dictionary, Document, Object, Stream};
use uuid::Uuid;

use crate::error::KioskError;
use crate::order::costing::{compute_total_cost, count_pdf_pages};
use crate::order::intake::{order_folder, stored_file_name};
use crate::order::models::{OrderSubmission, UploadedFile};

fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn submission() -> OrderSubmission {
    OrderSubmission {
        name: "Ana".to_string(),
        phone: "555-0100".to_string(),
        email: "ana@example.com".to_string(),
        description: String::new(),
        transaction_id: "TX-1".to_string(),
        location: "Library".to_string(),
        printing_type: "Black & White".to_string(),
        binding_type: "Spiral Binding".to_string(),
        copy_num: None,
        files: vec![UploadedFile {
            filename: "a.pdf".to_string(),
            data: blank_pdf(1),
        }],
    }
}

#[test]
fn test_count_pdf_pages() {
    assert_eq!(count_pdf_pages("three.pdf", &blank_pdf(3)), 3);
    assert_eq!(count_pdf_pages("one.pdf", &blank_pdf(1)), 1);
}

#[test]
fn test_corrupt_pdf_counts_zero_pages() {
    assert_eq!(count_pdf_pages("broken.pdf", b"%PDF-1.4 definitely not a pdf"), 0);
    assert_eq!(count_pdf_pages("empty.pdf", b""), 0);
}

#[test]
fn test_total_cost_formula() {
    // 3 + 7 pages at 2.0 with spiral binding at 30.0 per file, two copies.
    let cost = compute_total_cost(10, 2.0, 30.0, 2, 2);
    assert_eq!(cost.printing, 20.0);
    assert_eq!(cost.binding, 60.0);
    assert_eq!(cost.total, 160.0);
}

#[test]
fn test_zero_pages_still_pays_for_binding() {
    let cost = compute_total_cost(0, 2.0, 15.0, 1, 1);
    assert_eq!(cost.total, 15.0);
}

#[test]
fn test_stored_file_name() {
    assert_eq!(stored_file_name(12, 1, "thesis.pdf"), "12.1 thesis.pdf");
    assert_eq!(stored_file_name(12, 2, "ch/2.pdf"), "12.2 ch2.pdf");
    assert_eq!(stored_file_name(3, 1, ""), "3.1 file.pdf");
}

#[test]
fn test_order_folder_includes_id() {
    let id = Uuid::nil();
    assert_eq!(
        order_folder(0, &id),
        "0-00000000-0000-0000-0000-000000000000"
    );
}

#[test]
fn test_submission_validation() {
    assert!(submission().validate().is_ok());
    assert_eq!(submission().copies(), 1);

    let mut no_files = submission();
    no_files.files.clear();
    assert!(matches!(no_files.validate(), Err(KioskError::Validation(_))));

    let mut zero_copies = submission();
    zero_copies.copy_num = Some(0);
    assert!(zero_copies.validate().is_err());

    let mut blank_name = submission();
    blank_name.name = "  ".to_string();
    assert!(blank_name
        .validate()
        .unwrap_err()
        .to_string()
        .contains("name cannot be empty"));

    let mut bad_email = submission();
    bad_email.email = "ana.example.com".to_string();
    assert!(bad_email.validate().is_err());
}
