//! PDF input plugin — reads the lead pages of an ECG report with lopdf.

mod document;

use std::path::Path;

use ecg_core::error::Result;
use ecg_core::plugin::{ReportPages, ReportReader};

pub use document::{DirectContents, IndirectContents, ReportDocument};

pub struct PdfReportReader;

impl ReportReader for PdfReportReader {
    fn name(&self) -> &str {
        "PDF Input"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn read_pages(&self, input_path: &Path) -> Result<ReportPages> {
        log::info!("Reading PDF: {}", input_path.display());
        ReportDocument::load(input_path)?.read_pages()
    }
}
