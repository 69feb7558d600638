//! Resampling of an unevenly spaced trace onto a fixed number of samples.

use ecg_core::error::{ExtractionError, Result};
use ecg_core::record::{LeadName, Point2D};

/// Linearly interpolate `points` at `k` evenly spaced x-positions spanning
/// their x-range, both ends included.
///
/// Points are ordered by x first; for duplicate x-values the first occurrence
/// in the input wins. Fails with `InsufficientPoints` below two points.
pub fn resample(points: Vec<Point2D>, k: usize, lead: LeadName) -> Result<Vec<f64>> {
    if points.len() < 2 {
        return Err(ExtractionError::InsufficientPoints {
            lead,
            found: points.len(),
        });
    }
    if k == 0 {
        return Err(ExtractionError::InvalidOptions(
            "number_of_points must be at least 1".to_string(),
        ));
    }

    let mut pts = points;
    // sort_by is stable, so equal x-values keep input order for dedup
    pts.sort_by(|a, b| a.x.total_cmp(&b.x));
    pts.dedup_by(|later, earlier| later.x == earlier.x);

    let n = pts.len();
    let min_x = pts[0].x;
    let max_x = pts[n - 1].x;

    if n == 1 {
        return Ok(vec![pts[0].y; k]);
    }

    let step = if k > 1 {
        (max_x - min_x) / (k - 1) as f64
    } else {
        0.0
    };

    let mut samples = Vec::with_capacity(k);
    let mut j = 0;
    for i in 0..k {
        let x = if i + 1 == k && k > 1 {
            max_x
        } else {
            min_x + step * i as f64
        };

        while j + 2 < n && pts[j + 1].x < x {
            j += 1;
        }

        let (p0, p1) = (pts[j], pts[j + 1]);
        let t = (x - p0.x) / (p1.x - p0.x);
        samples.push(p0.y + t * (p1.y - p0.y));
    }

    Ok(samples)
}
