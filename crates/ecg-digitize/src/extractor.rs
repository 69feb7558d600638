//! Record extraction: drives all stages for the two lead pages of a report.

use ecg_core::error::{ExtractionError, Result};
use ecg_core::options::ExtractionOptions;
use ecg_core::plugin::{RecordExtractor, ReportPages};
use ecg_core::record::{EcgRecord, Lead, LeadName, RawPage};

use crate::baseline::BaselineAligner;
use crate::geometry::GeometryNormalizer;
use crate::normalize::{decode_content, normalize_content};
use crate::points::parse_points;
use crate::resample::resample;
use crate::segment::{LeadBlock, LeadSegmenter};

/// Extracts twelve-lead records with a fixed set of options.
#[derive(Debug, Clone)]
pub struct LeadExtractor {
    options: ExtractionOptions,
    geometry: GeometryNormalizer,
    aligner: BaselineAligner,
}

impl LeadExtractor {
    /// Validates `options` once; extraction itself never re-reads them mutably.
    pub fn new(options: ExtractionOptions) -> Result<Self> {
        options.validate()?;
        let geometry = GeometryNormalizer::from_options(&options)?;
        let aligner = BaselineAligner::from_options(&options);
        Ok(Self {
            options,
            geometry,
            aligner,
        })
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Extract the record from the limb-lead page and the precordial-lead page.
    ///
    /// Fails as a whole on the first failing lead; no partial record is built.
    pub fn extract_record(&self, limb_page: &RawPage, precordial_page: &RawPage) -> Result<EcgRecord> {
        let mut leads = Vec::with_capacity(LeadName::ALL.len());
        leads.extend(self.extract_page(limb_page, &LeadName::LIMB)?);
        leads.extend(self.extract_page(precordial_page, &LeadName::PRECORDIAL)?);

        self.aligner.align(&mut leads);
        EcgRecord::new(leads, self.options.number_of_points)
    }

    fn extract_page(&self, page: &RawPage, names: &[LeadName]) -> Result<Vec<Lead>> {
        if page.is_empty() {
            return Err(ExtractionError::PageAccess(format!(
                "content of the page carrying lead {} is empty",
                names[0]
            )));
        }
        let content = normalize_content(&decode_content(page.as_bytes()));
        let segmentation = LeadSegmenter::new(&self.options.span_detection).segment(&content, names)?;

        segmentation
            .blocks
            .into_iter()
            .map(|block| self.extract_lead(block))
            .collect()
    }

    fn extract_lead(&self, block: LeadBlock<'_>) -> Result<Lead> {
        let lead = block.lead;
        let points = match block.span {
            Some(span) => {
                log::debug!("Lead {}: {} raw tokens", lead, span.len());
                parse_points(span.tokens())
            }
            None => {
                let err = ExtractionError::NoCalibrationSpanFound { lead };
                if self.options.strict_span_detection {
                    return Err(err);
                }
                log::warn!("{}, treating lead as empty", err);
                Vec::new()
            }
        };
        log::debug!("Lead {}: {} points", lead, points.len());

        let normalized = self.geometry.apply(points);
        let samples = resample(normalized, self.options.number_of_points, lead)?;
        Ok(Lead::new(lead, samples))
    }
}

impl RecordExtractor for LeadExtractor {
    fn extract(&self, pages: &ReportPages) -> Result<EcgRecord> {
        self.extract_record(&pages.limb, &pages.precordial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{synthetic_page, SYNTHETIC_AMPLITUDE};

    fn extractor(k: usize) -> LeadExtractor {
        let mut opts = ExtractionOptions::default();
        opts.number_of_points = k;
        LeadExtractor::new(opts).unwrap()
    }

    fn pages(points: usize) -> (RawPage, RawPage) {
        (
            RawPage::from(synthetic_page(&LeadName::LIMB, points)),
            RawPage::from(synthetic_page(&LeadName::PRECORDIAL, points)),
        )
    }

    fn span(samples: &[f64]) -> (f64, f64) {
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    #[test]
    fn test_end_to_end_sinusoid_record() {
        let (limb, precordial) = pages(50);
        let record = extractor(500).extract_record(&limb, &precordial).unwrap();

        assert_eq!(record.leads().len(), 12);
        assert_eq!(record.header(), LeadName::ALL.iter().map(|l| l.as_str()).collect::<Vec<_>>());
        for lead in record.leads() {
            assert_eq!(lead.samples.len(), 500);
            let (min, max) = span(&lead.samples);
            assert!(min >= -2.0 * SYNTHETIC_AMPLITUDE && max <= 2.0 * SYNTHETIC_AMPLITUDE);
            assert!(max - min > SYNTHETIC_AMPLITUDE, "lead {} is flat", lead.name);
        }
    }

    #[test]
    fn test_calibration_scales_amplitude() {
        let (limb, precordial) = pages(50);
        let plain = extractor(200).extract_record(&limb, &precordial).unwrap();

        let mut opts = ExtractionOptions::default();
        opts.number_of_points = 200;
        opts.measured_calibration_height = 500.0;
        let doubled = LeadExtractor::new(opts)
            .unwrap()
            .extract_record(&limb, &precordial)
            .unwrap();

        let (min, max) = span(&plain.lead(LeadName::II).unwrap().samples);
        let (dmin, dmax) = span(&doubled.lead(LeadName::II).unwrap().samples);
        assert!(((dmax - dmin) - 2.0 * (max - min)).abs() < 1e-6);
    }

    #[test]
    fn test_baseline_is_median_aligned_by_default() {
        let (limb, precordial) = pages(50);
        let record = extractor(301).extract_record(&limb, &precordial).unwrap();
        for lead in record.leads() {
            let mut sorted = lead.samples.clone();
            sorted.sort_by(|a, b| a.total_cmp(b));
            assert!(sorted[150].abs() < 1e-9, "lead {} median {}", lead.name, sorted[150]);
        }
    }

    #[test]
    fn test_missing_v3_marker_fails_record() {
        let limb = RawPage::from(synthetic_page(&LeadName::LIMB, 50));
        let precordial = RawPage::from(
            synthetic_page(&LeadName::PRECORDIAL, 50).replace("Td (V3)", "Td (--)"),
        );
        let err = extractor(500).extract_record(&limb, &precordial).unwrap_err();
        assert!(matches!(err, ExtractionError::MarkerNotFound { lead: LeadName::V3 }));
        assert_eq!(err.lead(), Some(LeadName::V3));
    }

    #[test]
    fn test_missing_calibration_span_means_empty_lead() {
        // Only lead I's calibration pulse loses its code.
        let limb = RawPage::from(synthetic_page(&LeadName::LIMB, 50).replacen("1050", "1200", 2));
        let (_, precordial) = pages(50);
        let err = extractor(100).extract_record(&limb, &precordial).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InsufficientPoints { lead: LeadName::I, found: 0 }
        ));
    }

    #[test]
    fn test_strict_span_detection_reports_missing_span() {
        let limb = RawPage::from(synthetic_page(&LeadName::LIMB, 50).replace("1050", "1200"));
        let (_, precordial) = pages(50);

        let mut opts = ExtractionOptions::default();
        opts.number_of_points = 100;
        opts.strict_span_detection = true;
        let err = LeadExtractor::new(opts)
            .unwrap()
            .extract_record(&limb, &precordial)
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::NoCalibrationSpanFound { lead: LeadName::I }
        ));
    }

    #[test]
    fn test_empty_page_is_an_access_error() {
        let (limb, _) = pages(50);
        let err = extractor(100)
            .extract_record(&limb, &RawPage::new(Vec::new()))
            .unwrap_err();
        assert!(
            matches!(&err, ExtractionError::PageAccess(msg) if msg.contains("V1")),
            "{}",
            err
        );
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let mut opts = ExtractionOptions::default();
        opts.number_of_points = 0;
        assert!(matches!(
            LeadExtractor::new(opts),
            Err(ExtractionError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_record_extractor_trait() {
        let (limb, precordial) = pages(50);
        let extractor: Box<dyn RecordExtractor> = Box::new(extractor(64));
        let record = extractor
            .extract(&ReportPages { limb, precordial })
            .unwrap();
        assert_eq!(record.samples_per_lead(), 64);
    }
}
