//! CSV output plugin: one column per lead, one row per sample.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use ecg_core::error::{ExtractionError, Result};
use ecg_core::plugin::RecordSink;
use ecg_core::record::EcgRecord;

pub struct CsvRecordSink;

impl CsvRecordSink {
    /// Write `record` as CSV into any writer.
    pub fn write_to<W: Write>(&self, record: &EcgRecord, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(record.header()).map_err(csv_error)?;
        for row in record.rows() {
            wtr.write_record(row.iter().map(|s| s.to_string()))
                .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl RecordSink for CsvRecordSink {
    fn name(&self) -> &str {
        "CSV Output"
    }

    fn extension(&self) -> &str {
        "csv"
    }

    fn write(&self, record: &EcgRecord, output_path: &Path) -> Result<()> {
        log::info!("Writing CSV: {}", output_path.display());
        let file = File::create(output_path)?;
        self.write_to(record, file)?;
        log::debug!(
            "Wrote {} rows x {} leads",
            record.samples_per_lead(),
            record.leads().len()
        );
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> ExtractionError {
    ExtractionError::Output(format!("CSV write failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::record::{Lead, LeadName};

    fn record() -> EcgRecord {
        let leads = LeadName::ALL
            .iter()
            .enumerate()
            .map(|(i, &name)| Lead::new(name, vec![i as f64, i as f64 + 0.5, -(i as f64)]))
            .collect();
        EcgRecord::new(leads, 3).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let mut buf = Vec::new();
        CsvRecordSink.write_to(&record(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "I,II,III,aVR,aVL,aVF,V1,V2,V3,V4,V5,V6");
        assert_eq!(lines[1], "0,1,2,3,4,5,6,7,8,9,10,11");
        assert!(lines[2].starts_with("0.5,1.5,2.5,"));
        assert!(lines[3].starts_with("-0,-1,-2,"));
    }

    #[test]
    fn test_csv_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        CsvRecordSink.write(&record(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 12);
        assert_eq!(&headers[3], "aVR");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][11].parse::<f64>().unwrap(), 11.5);
    }

    #[test]
    fn test_csv_sink_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.csv");
        assert!(matches!(
            CsvRecordSink.write(&record(), &path),
            Err(ExtractionError::Io(_))
        ));
    }

    #[test]
    fn test_sink_metadata() {
        assert_eq!(CsvRecordSink.name(), "CSV Output");
        assert_eq!(CsvRecordSink.extension(), "csv");
    }
}
