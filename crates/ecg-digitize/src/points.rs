//! Coordinate token parsing.

use ecg_core::record::Point2D;

/// Parse `"x y"` tokens into points, in order.
///
/// Tokens that do not split into exactly two numeric fields are skipped;
/// the content stream interleaves operators and label text with the trace.
pub fn parse_points(tokens: &[&str]) -> Vec<Point2D> {
    let points: Vec<Point2D> = tokens.iter().filter_map(|token| parse_point(token)).collect();

    let rejected = tokens.len() - points.len();
    if rejected > 0 {
        log::debug!("Skipped {} of {} coordinate tokens", rejected, tokens.len());
    }
    points
}

fn parse_point(token: &str) -> Option<Point2D> {
    let mut fields = token.split_whitespace();
    let x = fields.next()?.parse::<f64>().ok()?;
    let y = fields.next()?.parse::<f64>().ok()?;
    if fields.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point2D::new(x, y))
}
