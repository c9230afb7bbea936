use log::warn;
use lopdf::Document;

/// Page count of a PDF. Unreadable or corrupt files count as zero pages.
pub fn count_pdf_pages(filename: &str, data: &[u8]) -> u32 {
    match Document::load_mem(data) {
        Ok(document) => document.get_pages().len() as u32,
        Err(e) => {
            warn!("Could not read '{}' as a PDF, counting 0 pages: {}", filename, e);
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    /// Per copy: pages times the printing unit price.
    pub printing: f64,
    /// Per copy: the binding unit price times the number of files.
    pub binding: f64,
    pub total: f64,
}

pub fn compute_total_cost(
    total_pages: u32,
    printing_cost_per_page: f64,
    binding_cost: f64,
    total_pdfs: u32,
    copies: u32,
) -> CostBreakdown {
    let printing = f64::from(total_pages) * printing_cost_per_page;
    let binding = binding_cost * f64::from(total_pdfs);
    CostBreakdown {
        printing,
        binding,
        total: (printing + binding) * f64::from(copies),
    }
}
