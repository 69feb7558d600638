//! Page content access for the two report layouts.
//!
//! The standard generator writes each page's `/Contents` as a single stream.
//! The alternate generator wraps it in an array whose first element is a
//! reference to the stream. Both are tried in that order.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use ecg_core::error::{ExtractionError, Result};
use ecg_core::plugin::{read_report_pages, FallbackSource, PageContentSource, ReportPages};
use ecg_core::record::RawPage;

/// A loaded report and its page objects in page order.
pub struct ReportDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl ReportDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let doc = Document::load(path)
            .map_err(|e| ExtractionError::PageAccess(format!("Failed to load PDF: {}", e)))?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        // get_pages is keyed by 1-based page number
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Read the limb and precordial pages, falling back to the alternate layout.
    pub fn read_pages(&self) -> Result<ReportPages> {
        let source = FallbackSource::new(DirectContents::new(self), IndirectContents::new(self));
        read_report_pages(&source)
    }

    /// The page's `/Contents` entry, dereferenced once.
    fn contents(&self, index: usize) -> Result<&Object> {
        let page_id = self.pages.get(index).ok_or_else(|| {
            ExtractionError::PageAccess(format!(
                "page {} out of range ({} pages)",
                index,
                self.pages.len()
            ))
        })?;
        let page = self
            .doc
            .get_dictionary(*page_id)
            .map_err(|e| ExtractionError::PageAccess(format!("page {}: {}", index, e)))?;
        let contents = page
            .get(b"Contents")
            .map_err(|e| ExtractionError::PageAccess(format!("page {} has no /Contents: {}", index, e)))?;
        self.resolve(contents)
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(|e| ExtractionError::PageAccess(format!("broken reference {:?}: {}", id, e))),
            other => Ok(other),
        }
    }
}

/// Stream bytes, decoded through the stream's `/Filter` when it declares one.
fn stream_bytes(obj: &Object) -> Result<RawPage> {
    let stream = obj
        .as_stream()
        .map_err(|e| ExtractionError::PageAccess(format!("contents is not a stream: {}", e)))?;
    if !stream.dict.has(b"Filter") {
        return Ok(RawPage::new(stream.content.clone()));
    }

    let bytes = stream
        .decompressed_content()
        .map_err(|e| ExtractionError::PageAccess(format!("content stream decode failed: {}", e)))?;
    // lopdf logs and drops zlib errors, leaving nothing decoded
    if bytes.is_empty() && !stream.content.is_empty() {
        return Err(ExtractionError::PageAccess(
            "content stream decode failed: filter produced no data".to_string(),
        ));
    }
    Ok(RawPage::new(bytes))
}

/// Standard layout: `/Contents` is one stream.
pub struct DirectContents<'a> {
    report: &'a ReportDocument,
}

impl<'a> DirectContents<'a> {
    pub fn new(report: &'a ReportDocument) -> Self {
        Self { report }
    }
}

impl PageContentSource for DirectContents<'_> {
    fn name(&self) -> &str {
        "standard"
    }

    fn page_count(&self) -> usize {
        self.report.page_count()
    }

    fn page_content(&self, index: usize) -> Result<RawPage> {
        stream_bytes(self.report.contents(index)?)
    }
}

/// Alternate layout: `/Contents` is an array whose first element refers to the stream.
pub struct IndirectContents<'a> {
    report: &'a ReportDocument,
}

impl<'a> IndirectContents<'a> {
    pub fn new(report: &'a ReportDocument) -> Self {
        Self { report }
    }
}

impl PageContentSource for IndirectContents<'_> {
    fn name(&self) -> &str {
        "alternate"
    }

    fn page_count(&self) -> usize {
        self.report.page_count()
    }

    fn page_content(&self, index: usize) -> Result<RawPage> {
        let contents = self.report.contents(index)?;
        let first = contents
            .as_array()
            .map_err(|e| ExtractionError::PageAccess(format!("contents is not an array: {}", e)))?
            .first()
            .ok_or_else(|| ExtractionError::PageAccess("contents array is empty".to_string()))?;
        stream_bytes(self.report.resolve(first)?)
    }
}
