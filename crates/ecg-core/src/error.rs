use thiserror::Error;

use crate::record::LeadName;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lead marker for {lead} not found in page content")]
    MarkerNotFound { lead: LeadName },

    #[error("No calibration span found for lead {lead}")]
    NoCalibrationSpanFound { lead: LeadName },

    #[error("Lead {lead} has {found} usable points, at least 2 are required")]
    InsufficientPoints { lead: LeadName, found: usize },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Page access error: {0}")]
    PageAccess(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Extraction failed for {file}: {source}")]
    ExtractionFailed {
        file: String,
        source: Box<ExtractionError>,
    },
}

impl ExtractionError {
    /// Wrap this error with the identifier of the file being extracted.
    pub fn for_file(self, file: impl Into<String>) -> Self {
        ExtractionError::ExtractionFailed {
            file: file.into(),
            source: Box::new(self),
        }
    }

    /// The lead that caused the failure, looking through per-file wrappers.
    pub fn lead(&self) -> Option<LeadName> {
        match self {
            ExtractionError::MarkerNotFound { lead }
            | ExtractionError::NoCalibrationSpanFound { lead }
            | ExtractionError::InsufficientPoints { lead, .. } => Some(*lead),
            ExtractionError::ExtractionFailed { source, .. } => source.lead(),
            _ => None,
        }
    }

    /// The innermost error, with per-file wrappers removed.
    pub fn root_cause(&self) -> &ExtractionError {
        match self {
            ExtractionError::ExtractionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractionError>;
