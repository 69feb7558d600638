//! Geometry normalization of a lead trace.

use ecg_core::options::ExtractionOptions;
use ecg_core::error::Result;
use ecg_core::record::{CalibrationFactor, Point2D};

/// Rotation, translation to the origin and calibration scaling, in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryNormalizer {
    /// Rotation about the page origin, in radians.
    pub angle: f64,
    pub gamma: CalibrationFactor,
}

impl GeometryNormalizer {
    pub fn new(angle: f64, gamma: CalibrationFactor) -> Self {
        Self { angle, gamma }
    }

    pub fn from_options(options: &ExtractionOptions) -> Result<Self> {
        Ok(Self::new(options.rotation_angle, options.gamma()?))
    }

    /// Normalize a trace. Point count and order are preserved.
    pub fn apply(&self, points: Vec<Point2D>) -> Vec<Point2D> {
        let rotated = rotate_about_origin(points, self.angle);
        let translated = translate_to_origin(rotated);
        scale(translated, self.gamma)
    }
}

/// Rotate every point about `(0, 0)` by `angle` radians.
pub fn rotate_about_origin(mut points: Vec<Point2D>, angle: f64) -> Vec<Point2D> {
    if angle == 0.0 {
        return points;
    }
    let (sin, cos) = angle.sin_cos();
    for p in points.iter_mut() {
        let (x, y) = (p.x, p.y);
        p.x = x * cos + y * sin;
        p.y = -x * sin + y * cos;
    }
    points
}

/// Shift the trace so its first point lies at the origin.
pub fn translate_to_origin(mut points: Vec<Point2D>) -> Vec<Point2D> {
    let Some(&anchor) = points.first() else {
        return points;
    };
    for p in points.iter_mut() {
        p.x -= anchor.x;
        p.y -= anchor.y;
    }
    points
}

/// Multiply both coordinates by the calibration factor.
pub fn scale(mut points: Vec<Point2D>, gamma: CalibrationFactor) -> Vec<Point2D> {
    let g = gamma.value();
    for p in points.iter_mut() {
        p.x *= g;
        p.y *= g;
    }
    points
}
