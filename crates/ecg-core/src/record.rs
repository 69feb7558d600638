//! Twelve-lead record model.
//!
//! A report passes through the extractor as: RawPage → points per lead →
//! resampled Lead → EcgRecord. Only a complete EcgRecord leaves the core.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result};

// ---------------------------------------------------------------------------
// Lead names
// ---------------------------------------------------------------------------

/// The twelve standard ECG leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadName {
    I,
    II,
    III,
    #[serde(rename = "aVR")]
    AVR,
    #[serde(rename = "aVL")]
    AVL,
    #[serde(rename = "aVF")]
    AVF,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl LeadName {
    /// Limb leads, in the order they are printed on the first report page.
    pub const LIMB: [LeadName; 6] = [
        LeadName::I,
        LeadName::II,
        LeadName::III,
        LeadName::AVR,
        LeadName::AVL,
        LeadName::AVF,
    ];

    /// Precordial leads, in the order they are printed on the second report page.
    pub const PRECORDIAL: [LeadName; 6] = [
        LeadName::V1,
        LeadName::V2,
        LeadName::V3,
        LeadName::V4,
        LeadName::V5,
        LeadName::V6,
    ];

    /// All leads in canonical record order.
    pub const ALL: [LeadName; 12] = [
        LeadName::I,
        LeadName::II,
        LeadName::III,
        LeadName::AVR,
        LeadName::AVL,
        LeadName::AVF,
        LeadName::V1,
        LeadName::V2,
        LeadName::V3,
        LeadName::V4,
        LeadName::V5,
        LeadName::V6,
    ];

    /// The label as printed on the report.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::AVR => "aVR",
            Self::AVL => "aVL",
            Self::AVF => "aVF",
            Self::V1 => "V1",
            Self::V2 => "V2",
            Self::V3 => "V3",
            Self::V4 => "V4",
            Self::V5 => "V5",
            Self::V6 => "V6",
        }
    }
}

impl std::fmt::Display for LeadName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadName {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self> {
        LeadName::ALL
            .iter()
            .copied()
            .find(|lead| lead.as_str() == s)
            .ok_or_else(|| ExtractionError::InvalidOptions(format!("Unknown lead name: {}", s)))
    }
}

// ---------------------------------------------------------------------------
// Page content and points
// ---------------------------------------------------------------------------

/// Decoded content-stream bytes of one report page, as handed over by the
/// PDF access layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    bytes: Vec<u8>,
}

impl RawPage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&str> for RawPage {
    fn from(s: &str) -> Self {
        RawPage::new(s.as_bytes())
    }
}

impl From<String> for RawPage {
    fn from(s: String) -> Self {
        RawPage::new(s.into_bytes())
    }
}

/// A drawing point in page-content units (or physical units after calibration).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

/// Ratio between the reference calibration pulse height and the height the
/// pulse has in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationFactor(f64);

impl CalibrationFactor {
    pub fn new(gamma: f64) -> Self {
        Self(gamma)
    }

    /// `reference / measured`. Both heights must be finite and positive.
    pub fn from_heights(reference: f64, measured: f64) -> Result<Self> {
        if !reference.is_finite() || reference <= 0.0 {
            return Err(ExtractionError::InvalidOptions(format!(
                "calibration_reference_height must be positive, got {}",
                reference
            )));
        }
        if !measured.is_finite() || measured <= 0.0 {
            return Err(ExtractionError::InvalidOptions(format!(
                "measured_calibration_height must be positive, got {}",
                measured
            )));
        }
        Ok(Self(reference / measured))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for CalibrationFactor {
    fn default() -> Self {
        Self(1.0)
    }
}

// ---------------------------------------------------------------------------
// Leads and records
// ---------------------------------------------------------------------------

/// One resampled lead.
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub name: LeadName,
    pub samples: Vec<f64>,
}

impl Lead {
    pub fn new(name: LeadName, samples: Vec<f64>) -> Self {
        Self { name, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// All twelve leads of one report, each resampled to the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct EcgRecord {
    leads: Vec<Lead>,
    samples_per_lead: usize,
}

impl EcgRecord {
    /// Build a record, rejecting anything but 12 leads in canonical order
    /// with exactly `samples_per_lead` samples each.
    pub fn new(leads: Vec<Lead>, samples_per_lead: usize) -> Result<Self> {
        if leads.len() != LeadName::ALL.len() {
            return Err(ExtractionError::MalformedRecord(format!(
                "expected {} leads, got {}",
                LeadName::ALL.len(),
                leads.len()
            )));
        }

        for (lead, expected) in leads.iter().zip(LeadName::ALL.iter()) {
            if lead.name != *expected {
                return Err(ExtractionError::MalformedRecord(format!(
                    "expected lead {} at this position, got {}",
                    expected, lead.name
                )));
            }
            if lead.samples.len() != samples_per_lead {
                return Err(ExtractionError::MalformedRecord(format!(
                    "lead {} has {} samples, expected {}",
                    lead.name,
                    lead.samples.len(),
                    samples_per_lead
                )));
            }
        }

        Ok(Self {
            leads,
            samples_per_lead,
        })
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn lead(&self, name: LeadName) -> Option<&Lead> {
        self.leads.iter().find(|l| l.name == name)
    }

    pub fn samples_per_lead(&self) -> usize {
        self.samples_per_lead
    }

    /// Column headers for tabular output.
    pub fn header(&self) -> Vec<&'static str> {
        self.leads.iter().map(|l| l.name.as_str()).collect()
    }

    /// Rows of the record, one per sample index, columns in lead order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.samples_per_lead).map(move |i| self.leads.iter().map(|l| l.samples[i]).collect())
    }
}
