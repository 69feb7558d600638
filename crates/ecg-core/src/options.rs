//! Extraction options shared across the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result};
use crate::record::CalibrationFactor;

/// All options controlling lead extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    // -- General --
    pub verbose: u8,

    // -- Resampling --
    /// Samples per lead in the output record.
    pub number_of_points: usize,

    // -- Calibration --
    /// Reference height of the calibration pulse in physical units.
    pub calibration_reference_height: f64,
    /// Height of the calibration pulse as drawn on the report, in page units.
    pub measured_calibration_height: f64,

    // -- Geometry --
    /// Rotation about the page origin, in radians.
    pub rotation_angle: f64,

    // -- Baseline --
    pub baseline_method: BaselineMethod,
    /// Level every lead baseline is moved to.
    pub baseline_reference: f64,
    /// Bin width used by `BaselineMethod::Mode`.
    pub mode_resolution: f64,

    // -- Segmentation --
    /// Fail the record when a lead has no calibration span instead of
    /// treating the lead as empty.
    pub strict_span_detection: bool,
    pub span_detection: SpanDetectionPolicy,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            number_of_points: 5000,
            calibration_reference_height: 1000.0,
            measured_calibration_height: 1000.0,
            rotation_angle: 0.0,
            baseline_method: BaselineMethod::Median,
            baseline_reference: 0.0,
            mode_resolution: 0.01,
            strict_span_detection: false,
            span_detection: SpanDetectionPolicy::default(),
        }
    }
}

impl ExtractionOptions {
    /// Check the values an extraction run cannot work without.
    pub fn validate(&self) -> Result<()> {
        if self.number_of_points == 0 {
            return Err(ExtractionError::InvalidOptions(
                "number_of_points must be at least 1".to_string(),
            ));
        }
        if !self.rotation_angle.is_finite() {
            return Err(ExtractionError::InvalidOptions(
                "rotation_angle must be finite".to_string(),
            ));
        }
        if self.baseline_method == BaselineMethod::Mode
            && (!self.mode_resolution.is_finite() || self.mode_resolution <= 0.0)
        {
            return Err(ExtractionError::InvalidOptions(
                "mode_resolution must be positive".to_string(),
            ));
        }
        self.span_detection.validate()?;
        self.gamma().map(|_| ())
    }

    /// The calibration factor for this run.
    pub fn gamma(&self) -> Result<CalibrationFactor> {
        CalibrationFactor::from_heights(
            self.calibration_reference_height,
            self.measured_calibration_height,
        )
    }
}

/// Literal tokens the report generator uses around each lead's curve.
///
/// Defaults match the generator's output: curves are stroked with `S`, the
/// calibration pulse is drawn from `1050 1913` with amplitude code `1050`,
/// and lead labels close with `Tj ET`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanDetectionPolicy {
    pub calibration_code: String,
    pub min_span_len: usize,
    pub stroke_operator: char,
    pub text_terminator: String,
    pub trace_end_marker: String,
}

impl Default for SpanDetectionPolicy {
    fn default() -> Self {
        Self {
            calibration_code: "1050".to_string(),
            min_span_len: 100,
            stroke_operator: 'S',
            text_terminator: "Tj ET".to_string(),
            trace_end_marker: "1050 1913".to_string(),
        }
    }
}

impl SpanDetectionPolicy {
    /// Whether a stroke-delimited piece of a lead block holds the curve.
    pub fn accepts(&self, piece: &str) -> bool {
        piece.len() > self.min_span_len && piece.contains(self.calibration_code.as_str())
    }

    fn validate(&self) -> Result<()> {
        if self.calibration_code.is_empty() {
            return Err(ExtractionError::InvalidOptions(
                "span_detection.calibration_code must not be empty".to_string(),
            ));
        }
        if self.trace_end_marker.is_empty() {
            return Err(ExtractionError::InvalidOptions(
                "span_detection.trace_end_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Statistic used as a lead's resting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineMethod {
    /// Median of all samples.
    #[default]
    Median,
    /// Value of the first sample.
    FirstSample,
    /// Most frequent value after rounding to `mode_resolution`.
    Mode,
}

impl BaselineMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "median" => Some(Self::Median),
            "first-sample" | "first" => Some(Self::FirstSample),
            "mode" => Some(Self::Mode),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let opts = ExtractionOptions::default();
        opts.validate().unwrap();
        assert_eq!(opts.number_of_points, 5000);
        assert_eq!(opts.gamma().unwrap().value(), 1.0);
        assert_eq!(opts.baseline_method, BaselineMethod::Median);
    }

    #[test]
    fn test_toml_partial_config() {
        let toml_str = r#"
number_of_points = 500
measured_calibration_height = 500.0
baseline_method = "first-sample"
"#;
        let opts: ExtractionOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.number_of_points, 500);
        assert_eq!(opts.gamma().unwrap().value(), 2.0);
        assert_eq!(opts.baseline_method, BaselineMethod::FirstSample);
        // Defaults filled in
        assert_eq!(opts.rotation_angle, 0.0);
        assert_eq!(opts.span_detection, SpanDetectionPolicy::default());
    }

    #[test]
    fn test_toml_span_detection_table() {
        let toml_str = r#"
[span_detection]
calibration_code = "2100"
min_span_len = 40
"#;
        let opts: ExtractionOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.span_detection.calibration_code, "2100");
        assert_eq!(opts.span_detection.min_span_len, 40);
        assert_eq!(opts.span_detection.stroke_operator, 'S');
    }

    #[test]
    fn test_toml_round_trip() {
        let mut opts = ExtractionOptions::default();
        opts.number_of_points = 1200;
        opts.baseline_method = BaselineMethod::Mode;
        opts.strict_span_detection = true;

        let serialized = toml::to_string_pretty(&opts).unwrap();
        let parsed: ExtractionOptions = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.number_of_points, 1200);
        assert_eq!(parsed.baseline_method, BaselineMethod::Mode);
        assert!(parsed.strict_span_detection);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut opts = ExtractionOptions::default();
        opts.number_of_points = 0;
        assert!(opts.validate().is_err());

        let mut opts = ExtractionOptions::default();
        opts.measured_calibration_height = -3.0;
        assert!(opts.validate().is_err());

        let mut opts = ExtractionOptions::default();
        opts.span_detection.calibration_code.clear();
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_span_policy_needs_code_and_length() {
        let policy = SpanDetectionPolicy::default();
        let long_with_code = format!("1050 {}", "0 ".repeat(60));
        let long_without_code = "0 ".repeat(60);
        assert!(policy.accepts(&long_with_code));
        assert!(!policy.accepts(&long_without_code));
        assert!(!policy.accepts("1050 1913"));
    }

    #[test]
    fn test_baseline_method_names() {
        assert_eq!(BaselineMethod::from_name("median"), Some(BaselineMethod::Median));
        assert_eq!(
            BaselineMethod::from_name("first-sample"),
            Some(BaselineMethod::FirstSample)
        );
        assert_eq!(BaselineMethod::from_name("mode"), Some(BaselineMethod::Mode));
        assert_eq!(BaselineMethod::from_name("mean"), None);
    }
}
