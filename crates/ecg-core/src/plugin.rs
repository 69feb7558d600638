//! Plugin traits for page access, lead extraction and record output.

use std::path::Path;

use crate::error::{ExtractionError, Result};
use crate::record::{EcgRecord, RawPage};

/// Progress reporter callback type.
pub type ProgressReporter = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Access to the decoded content stream of each page of one report.
pub trait PageContentSource {
    /// Human-readable name of this content layout.
    fn name(&self) -> &str;

    /// Number of pages in the report.
    fn page_count(&self) -> usize;

    /// Decoded content-stream bytes of the page at a 0-based index.
    fn page_content(&self, index: usize) -> Result<RawPage>;
}

/// Tries `primary` first and switches to `secondary` when it cannot read a page.
pub struct FallbackSource<A, B> {
    primary: A,
    secondary: B,
}

impl<A: PageContentSource, B: PageContentSource> FallbackSource<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: PageContentSource, B: PageContentSource> PageContentSource for FallbackSource<A, B> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn page_count(&self) -> usize {
        self.primary.page_count()
    }

    fn page_content(&self, index: usize) -> Result<RawPage> {
        match self.primary.page_content(index) {
            Ok(page) => Ok(page),
            Err(e) => {
                log::warn!(
                    "{} layout failed on page {} ({}), switching to {} layout",
                    self.primary.name(),
                    index,
                    e,
                    self.secondary.name()
                );
                self.secondary.page_content(index).map_err(|e2| {
                    ExtractionError::PageAccess(format!(
                        "page {}: {} layout: {}; {} layout: {}",
                        index,
                        self.primary.name(),
                        e,
                        self.secondary.name(),
                        e2
                    ))
                })
            }
        }
    }
}

/// The two report pages carrying the limb and the precordial leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPages {
    pub limb: RawPage,
    pub precordial: RawPage,
}

/// 0-based indices of the limb and precordial pages for a report with
/// `page_count` pages. Five-page reports carry the leads on pages 3 and 4.
pub fn select_report_pages(page_count: usize) -> Result<(usize, usize)> {
    if page_count < 2 {
        return Err(ExtractionError::PageAccess(format!(
            "report has {} page(s), at least 2 are required",
            page_count
        )));
    }
    if page_count == 5 {
        Ok((2, 3))
    } else {
        Ok((0, 1))
    }
}

/// Read both lead pages of a report from `source`.
pub fn read_report_pages(source: &dyn PageContentSource) -> Result<ReportPages> {
    let page_count = source.page_count();
    log::info!("Number of pages: {}", page_count);
    let (limb_idx, precordial_idx) = select_report_pages(page_count)?;
    let pages = ReportPages {
        limb: source.page_content(limb_idx)?,
        precordial: source.page_content(precordial_idx)?,
    };
    log::debug!(
        "Lead pages {} and {}: {} and {} bytes",
        limb_idx,
        precordial_idx,
        pages.limb.len(),
        pages.precordial.len()
    );
    Ok(pages)
}

/// Input plugin: reads the two lead pages of a report file.
pub trait ReportReader: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// File extensions this plugin handles, lowercase without the dot.
    fn supported_extensions(&self) -> &[&str];

    /// Read the lead pages of a report file.
    fn read_pages(&self, input_path: &Path) -> Result<ReportPages>;
}

/// Turns two lead pages into a complete twelve-lead record.
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, pages: &ReportPages) -> Result<EcgRecord>;
}

/// Output plugin: writes a record next to the other extracted records.
pub trait RecordSink: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// Extension of the files this plugin writes.
    fn extension(&self) -> &str;

    /// Write `record` to `output_path`.
    fn write(&self, record: &EcgRecord, output_path: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        name: &'static str,
        pages: Vec<Option<&'static str>>,
    }

    impl PageContentSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_content(&self, index: usize) -> Result<RawPage> {
            self.pages
                .get(index)
                .copied()
                .flatten()
                .map(RawPage::from)
                .ok_or_else(|| ExtractionError::PageAccess(format!("no page {}", index)))
        }
    }

    #[test]
    fn test_select_report_pages() {
        assert_eq!(select_report_pages(5).unwrap(), (2, 3));
        assert_eq!(select_report_pages(2).unwrap(), (0, 1));
        assert_eq!(select_report_pages(4).unwrap(), (0, 1));
        assert_eq!(select_report_pages(6).unwrap(), (0, 1));
        assert!(select_report_pages(1).is_err());
        assert!(select_report_pages(0).is_err());
    }

    #[test]
    fn test_fallback_prefers_primary() {
        let source = FallbackSource::new(
            FixedSource {
                name: "direct",
                pages: vec![Some("a"), Some("b")],
            },
            FixedSource {
                name: "indirect",
                pages: vec![Some("x"), Some("y")],
            },
        );
        assert_eq!(source.page_content(1).unwrap(), RawPage::from("b"));
        assert_eq!(source.name(), "direct");
    }

    #[test]
    fn test_fallback_switches_on_failure() {
        let source = FallbackSource::new(
            FixedSource {
                name: "direct",
                pages: vec![None, None],
            },
            FixedSource {
                name: "indirect",
                pages: vec![Some("x"), Some("y")],
            },
        );
        assert_eq!(source.page_content(0).unwrap(), RawPage::from("x"));
    }

    #[test]
    fn test_fallback_reports_both_errors() {
        let source = FallbackSource::new(
            FixedSource {
                name: "direct",
                pages: vec![None],
            },
            FixedSource {
                name: "indirect",
                pages: vec![None],
            },
        );
        match source.page_content(0) {
            Err(ExtractionError::PageAccess(msg)) => {
                assert!(msg.contains("direct layout: "), "{}", msg);
                assert!(msg.contains("indirect layout: "), "{}", msg);
            }
            other => panic!("expected PageAccess, got {:?}", other),
        }
    }

    #[test]
    fn test_read_report_pages_five_page_layout() {
        let source = FixedSource {
            name: "direct",
            pages: vec![Some("p1"), Some("p2"), Some("p3"), Some("p4"), Some("p5")],
        };
        let pages = read_report_pages(&source).unwrap();
        assert_eq!(pages.limb, RawPage::from("p3"));
        assert_eq!(pages.precordial, RawPage::from("p4"));
    }

    #[test]
    fn test_read_report_pages_two_page_layout() {
        let source = FixedSource {
            name: "direct",
            pages: vec![Some("p1"), Some("p2")],
        };
        let pages = read_report_pages(&source).unwrap();
        assert_eq!(pages.limb, RawPage::from("p1"));
        assert_eq!(pages.precordial, RawPage::from("p2"));
    }
}
