//! Synthetic report pages shaped like the report generator's output.

use ecg_core::record::LeadName;

/// Peak amplitude of the synthetic sinusoid, in page units.
pub(crate) const SYNTHETIC_AMPLITUDE: f64 = 60.0;

/// A page drawing one sinusoid trace per lead, each followed by the
/// calibration pulse and the lead label.
pub(crate) fn synthetic_page(leads: &[LeadName], points: usize) -> String {
    let mut page = String::from("q\r\n1 0 0 1 0 0 cm\r\n0.5 w\r\n");
    for (row, lead) in leads.iter().enumerate() {
        let y0 = 540.0 + row as f64 * 0.5;
        for i in 0..points {
            let phase = 2.0 * std::f64::consts::PI * i as f64 / 25.0;
            page.push_str(&format!(
                "{:.2} {:.2}\r\n",
                120.0 + 4.0 * i as f64,
                y0 + SYNTHETIC_AMPLITUDE * phase.sin()
            ));
        }
        page.push_str("1050 1913 m\r\n1050 2113 l\r\n1100 2113 l\r\n1100 1913 l\r\nS\r\n");
        page.push_str(&format!("BT /F1 9 Tf 30 1950 Td ({}) Tj ET\r\n", lead));
    }
    page.push_str("Q\r\n");
    page
}
