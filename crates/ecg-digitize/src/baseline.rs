//! Baseline alignment: moves each lead's resting level to a common reference.

use std::collections::BTreeMap;

use ecg_core::options::{BaselineMethod, ExtractionOptions};
use ecg_core::record::Lead;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineAligner {
    pub method: BaselineMethod,
    /// Level each baseline ends up at.
    pub reference: f64,
    /// Bin width for `BaselineMethod::Mode`.
    pub mode_resolution: f64,
}

impl BaselineAligner {
    pub fn new(method: BaselineMethod, reference: f64) -> Self {
        Self {
            method,
            reference,
            mode_resolution: ExtractionOptions::default().mode_resolution,
        }
    }

    pub fn from_options(options: &ExtractionOptions) -> Self {
        Self {
            method: options.baseline_method,
            reference: options.baseline_reference,
            mode_resolution: options.mode_resolution,
        }
    }

    /// Baseline of a sample series, `None` when it is empty.
    pub fn baseline(&self, samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        match self.method {
            BaselineMethod::Median => Some(median(samples)),
            BaselineMethod::FirstSample => Some(samples[0]),
            BaselineMethod::Mode => {
                let bin = mode_bin(samples, self.reference, self.mode_resolution);
                Some(self.reference + bin as f64 * self.mode_resolution)
            }
        }
    }

    /// Amount to subtract from every sample so the baseline lands on `reference`.
    fn offset(&self, samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        match self.method {
            // whole bins, so the shifted samples keep their bin
            BaselineMethod::Mode => {
                Some(mode_bin(samples, self.reference, self.mode_resolution) as f64 * self.mode_resolution)
            }
            _ => self.baseline(samples).map(|b| b - self.reference),
        }
    }

    /// Shift every lead independently so its baseline equals `reference`.
    pub fn align(&self, leads: &mut [Lead]) {
        for lead in leads.iter_mut() {
            if let Some(offset) = self.offset(&lead.samples) {
                for s in lead.samples.iter_mut() {
                    *s -= offset;
                }
                log::debug!("Lead {}: shifted by {:.4} to baseline {}", lead.name, -offset, self.reference);
            }
        }
    }
}

fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Slack, in bins, below a bin edge that still counts as the upper bin.
/// Absorbs float residue left by shifting a sample by whole bins.
const EDGE_TOLERANCE: f64 = 1e-9;

/// Index of the most populated bin of width `resolution`; ties go to the lowest.
///
/// Bin `n` is centred on `reference + n * resolution` and is half-open,
/// `[centre - resolution / 2, centre + resolution / 2)`.
fn mode_bin(samples: &[f64], reference: f64, resolution: f64) -> i64 {
    let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
    for s in samples {
        let bin = ((s - reference) / resolution + 0.5 + EDGE_TOLERANCE).floor() as i64;
        *bins.entry(bin).or_default() += 1;
    }

    let mut best = (0i64, 0usize);
    for (&bin, &count) in &bins {
        if count > best.1 {
            best = (bin, count);
        }
    }
    best.0
}
