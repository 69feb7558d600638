//! Lead digitization — turns report page content into a twelve-lead record.
//!
//! Stages, in execution order:
//!  1. normalize  (decode bytes, collapse whitespace, cut non-drawing lines)
//!  2. segment    (split a page into per-lead blocks and curve spans)
//!  3. points     (parse coordinate tokens)
//!  4. geometry   (rotate, translate to origin, calibration-scale)
//!  5. resample   (fixed number of evenly spaced samples)
//!  6. baseline   (move each lead's resting level to the reference)

pub mod baseline;
pub mod extractor;
pub mod geometry;
pub mod normalize;
pub mod points;
pub mod resample;
pub mod segment;

#[cfg(test)]
mod testing;

pub use extractor::LeadExtractor;
