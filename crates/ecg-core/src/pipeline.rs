//! Pipeline orchestrator: runs report files through read, extract and write.
//!
//! Every file is independent: `run_batch` processes files in parallel and
//! folds the outcomes into a `BatchReport`. A failing file is logged and
//! recorded, never retried, and never stops the remaining files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{info, warn};
use rayon::prelude::*;

use crate::error::{ExtractionError, Result};
use crate::plugin::{ProgressReporter, RecordExtractor, RecordSink, ReportReader};

/// Outcome of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// `(input, written output)` for every extracted file.
    pub succeeded: Vec<(PathBuf, PathBuf)>,
    /// `(input, error)` for every failed file.
    pub failed: Vec<(PathBuf, ExtractionError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

/// The extraction pipeline orchestrator.
pub struct Pipeline {
    reader: Box<dyn ReportReader>,
    extractor: Box<dyn RecordExtractor>,
    sink: Box<dyn RecordSink>,
    progress_reporter: Option<ProgressReporter>,
}

impl Pipeline {
    pub fn new(
        reader: Box<dyn ReportReader>,
        extractor: Box<dyn RecordExtractor>,
        sink: Box<dyn RecordSink>,
    ) -> Self {
        Self {
            reader,
            extractor,
            sink,
            progress_reporter: None,
        }
    }

    /// Set a progress reporter callback.
    pub fn set_progress_reporter(&mut self, reporter: ProgressReporter) {
        self.progress_reporter = Some(reporter);
    }

    /// Extract one report file and write its record into `output_dir`.
    ///
    /// Any failure is wrapped in `ExtractionError::ExtractionFailed` naming the file.
    pub fn run_file(&self, input_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        let file_id = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input_path.display().to_string());

        self.process(input_path, output_dir)
            .map_err(|e| e.for_file(file_id))
    }

    fn process(&self, input_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        info!("Converting \"{}\"", input_path.display());

        let pages = self.reader.read_pages(input_path)?;
        let record = self.extractor.extract(&pages)?;
        info!(
            "Extracted {} leads of {} samples",
            record.leads().len(),
            record.samples_per_lead()
        );

        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "record".to_string());
        let output_path = output_dir.join(format!("{}.{}", stem, self.sink.extension()));
        self.sink.write(&record, &output_path)?;
        Ok(output_path)
    }

    /// Run every input file, in parallel, and collect the outcomes.
    pub fn run_batch(&self, inputs: &[PathBuf], output_dir: &Path) -> BatchReport {
        self.report_progress(0.0, "Starting extraction...");
        let done = AtomicUsize::new(0);
        let total = inputs.len().max(1);

        let outcomes: Vec<(PathBuf, Result<PathBuf>)> = inputs
            .par_iter()
            .map(|input| {
                let outcome = self.run_file(input, output_dir);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.report_progress(
                    finished as f64 / total as f64,
                    &format!("Processed {}", input.display()),
                );
                (input.clone(), outcome)
            })
            .collect();

        let report = outcomes.into_iter().fold(
            BatchReport::default(),
            |mut report, (input, outcome)| {
                match outcome {
                    Ok(output) => report.succeeded.push((input, output)),
                    Err(e) => {
                        warn!("Exception: {}", e);
                        warn!("Failed to extract {}", input.display());
                        report.failed.push((input, e));
                    }
                }
                report
            },
        );

        info!(
            "Extracted {} of {} files with {} ({} failed)",
            report.succeeded.len(),
            report.total(),
            self.reader.name(),
            report.failed.len()
        );
        report
    }

    /// Report files under `dir` that the reader supports, sorted by path.
    pub fn collect_inputs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let extensions = self.reader.supported_extensions();
        let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| extensions.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        inputs.sort();
        Ok(inputs)
    }

    fn report_progress(&self, fraction: f64, message: &str) {
        if let Some(ref reporter) = self.progress_reporter {
            reporter(fraction, message);
        }
    }
}

/// Builder for constructing a pipeline.
pub struct PipelineBuilder {
    reader: Option<Box<dyn ReportReader>>,
    extractor: Option<Box<dyn RecordExtractor>>,
    sink: Option<Box<dyn RecordSink>>,
    progress_reporter: Option<ProgressReporter>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            reader: None,
            extractor: None,
            sink: None,
            progress_reporter: None,
        }
    }

    pub fn reader(mut self, reader: Box<dyn ReportReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn extractor(mut self, extractor: Box<dyn RecordExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn sink(mut self, sink: Box<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let reader = self
            .reader
            .ok_or_else(|| ExtractionError::InvalidOptions("No report reader specified".to_string()))?;
        let extractor = self
            .extractor
            .ok_or_else(|| ExtractionError::InvalidOptions("No extractor specified".to_string()))?;
        let sink = self
            .sink
            .ok_or_else(|| ExtractionError::InvalidOptions("No record sink specified".to_string()))?;

        let mut pipeline = Pipeline::new(reader, extractor, sink);
        if let Some(reporter) = self.progress_reporter {
            pipeline.set_progress_reporter(reporter);
        }
        Ok(pipeline)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
