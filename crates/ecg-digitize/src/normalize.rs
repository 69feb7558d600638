//! Content normalization: reduces a page content stream to the drawing
//! commands the segmenter searches.

/// Operators the report generator uses for curves and lead labels.
const DRAWING_OPERATORS: &[&str] = &[
    "m", "l", "c", "v", "y", "h", "re", "S", "s", "f", "F", "B", "b", "n", "w", "J", "j", "d",
    "Td", "TD", "Tm", "Tj", "TJ", "Tf", "BT", "ET",
];

/// Decode raw content-stream bytes.
/// Streams are ASCII in practice; anything that is not valid UTF-8 is read
/// as Windows-1252 so label strings never abort decoding.
pub fn decode_content(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            result.into_owned()
        }
    }
}

/// Normalize decoded page content.
///
/// Unifies line endings, collapses whitespace runs, drops blank lines and
/// cuts the leading and trailing lines that carry no drawing operator.
/// Idempotent. Content without any drawing line is returned unchanged.
pub fn normalize_content(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<String> = unified
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();

    let first = lines.iter().position(|l| is_drawing_line(l));
    let last = lines.iter().rposition(|l| is_drawing_line(l));

    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => text.to_string(),
    }
}

/// A line ending in a drawing operator, or a bare coordinate pair.
fn is_drawing_line(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.last() {
        None => false,
        Some(op) if DRAWING_OPERATORS.contains(op) => true,
        Some(_) => tokens.len() == 2 && tokens.iter().all(|t| t.parse::<f64>().is_ok()),
    }
}
