//! Lead segmentation: locates each lead's curve in normalized page content.
//!
//! The report generator prints every lead as its curve followed by the lead
//! label (`... Td (<lead>) Tj ET`), so the text before a lead's label marker
//! is that lead's block. Inside a block the curve is the stroke-delimited
//! piece that carries the calibration pulse code; it starts after the previous
//! label's `Tj ET` and ends where the calibration pulse is drawn.
//!
//! Scanning runs as a small state machine per lead:
//! `SeekMarker → SeekCalibration → InSpan → CollectTokens → Done`.

use ecg_core::error::{ExtractionError, Result};
use ecg_core::options::SpanDetectionPolicy;
use ecg_core::record::LeadName;

/// Marker token that closes a lead's block.
pub fn marker_for(lead: LeadName) -> String {
    format!("Td ({})", lead)
}

/// Coordinate tokens of one lead's curve, before numeric parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLeadSpan<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> RawLeadSpan<'a> {
    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// The content preceding one lead's marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadBlock<'a> {
    pub lead: LeadName,
    /// Everything between the previous marker and this lead's marker.
    pub raw: &'a str,
    /// The curve span, or `None` when no piece passed span detection.
    pub span: Option<RawLeadSpan<'a>>,
}

/// Ordered, non-overlapping partition of a page by lead markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation<'a> {
    pub blocks: Vec<LeadBlock<'a>>,
    /// Content after the last marker.
    pub tail: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekMarker,
    SeekCalibration,
    InSpan,
    CollectTokens,
    Done,
}

/// Splits page content into per-lead blocks and curve spans.
pub struct LeadSegmenter<'p> {
    policy: &'p SpanDetectionPolicy,
}

impl<'p> LeadSegmenter<'p> {
    pub fn new(policy: &'p SpanDetectionPolicy) -> Self {
        Self { policy }
    }

    /// Segment `content` for `leads`, which must appear in this order.
    ///
    /// A missing marker fails the whole page with `MarkerNotFound`.
    pub fn segment<'a>(&self, content: &'a str, leads: &[LeadName]) -> Result<Segmentation<'a>> {
        let mut remaining = content;
        let mut blocks = Vec::with_capacity(leads.len());

        for &lead in leads {
            let (block, rest) = self.scan_lead(remaining, lead)?;
            blocks.push(block);
            remaining = rest;
        }

        Ok(Segmentation {
            blocks,
            tail: remaining,
        })
    }

    fn scan_lead<'a>(&self, remaining: &'a str, lead: LeadName) -> Result<(LeadBlock<'a>, &'a str)> {
        let mut state = ScanState::SeekMarker;
        let mut raw = "";
        let mut rest = remaining;
        let mut piece = "";
        let mut span = None;

        while state != ScanState::Done {
            state = match state {
                ScanState::SeekMarker => {
                    let marker = marker_for(lead);
                    let (before, after) = remaining
                        .split_once(marker.as_str())
                        .ok_or(ExtractionError::MarkerNotFound { lead })?;
                    raw = before;
                    rest = after;
                    ScanState::SeekCalibration
                }
                ScanState::SeekCalibration => {
                    match raw
                        .split(self.policy.stroke_operator)
                        .find(|p| self.policy.accepts(p))
                    {
                        Some(found) => {
                            piece = found;
                            ScanState::InSpan
                        }
                        None => {
                            log::debug!("Lead {}: no piece carries calibration code {}", lead, self.policy.calibration_code);
                            ScanState::Done
                        }
                    }
                }
                ScanState::InSpan => {
                    if piece.contains(self.policy.text_terminator.as_str()) {
                        piece = piece
                            .split(self.policy.text_terminator.as_str())
                            .nth(1)
                            .unwrap_or("");
                    }
                    if let Some((trace, _)) = piece.split_once(self.policy.trace_end_marker.as_str()) {
                        piece = trace;
                    }
                    ScanState::CollectTokens
                }
                ScanState::CollectTokens => {
                    span = Some(RawLeadSpan {
                        tokens: piece.split('\n').collect(),
                    });
                    ScanState::Done
                }
                ScanState::Done => ScanState::Done,
            };
        }

        Ok((LeadBlock { lead, raw, span }, rest))
    }
}
