// src/lib.rs
//! Extract significant internal repeats from HHrepID reports.
//!
//! Each report names one sequence database entry (`sp|<id>|...`) and lists
//! repeats with their p-values and the ranges of every copy. Repeats whose
//! p-value is at most the threshold are cut out of the matching A3M record
//! and returned as `<header>|<repeat id>` labeled subsequences.
//!
//! ```no_run
//! use hhrepid_rs::{extract_repeats, Config};
//!
//! let config = Config::default();
//! let results = extract_repeats(
//!     &config.report_source(),
//!     &config.record_source(),
//!     config.threshold,
//! ).unwrap();
//! print!("{}", results.fasta_text());
//! ```

pub mod error;
pub mod harvest;
pub mod input;
pub mod record;
pub mod report;
pub mod slice;
pub mod sources;
pub mod types;

use std::io::Write;
use std::path::PathBuf;

use log::{info, warn};
use rayon::prelude::*;

pub use crate::error::{Error, Result};
pub use crate::record::{DirRecordSource, MemoryRecordSource, RecordSource};
pub use crate::report::{
    parse_report, parse_report_file, parse_report_reader, translate_range, ReportParser,
    DEFAULT_THRESHOLD,
};
pub use crate::slice::{slice_from_source, slice_repeats};
pub use crate::sources::{DirReportSource, MemoryReportSource, ReportSource};
pub use crate::types::{
    AcceptedRepeats, CoordinateRange, LabeledSubsequence, RepeatReport, SequenceRecord,
};

/// Locations and settings for a batch run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for HHrepID reports.
    pub reports_dir: PathBuf,
    /// Directory holding one `<id>.<record_extension>` file per sequence.
    pub records_dir: PathBuf,
    /// Where the extracted repeats are written; `None` means stdout.
    pub output_path: Option<PathBuf>,
    pub threshold: f64,
    pub report_suffix: String,
    pub record_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("../data/phylogeny/repeats/"),
            records_dir: PathBuf::from("../data/phylogeny/repeats/done/"),
            output_path: None,
            threshold: DEFAULT_THRESHOLD,
            report_suffix: sources::DEFAULT_REPORT_SUFFIX.to_string(),
            record_extension: record::DEFAULT_RECORD_EXTENSION.to_string(),
        }
    }
}

impl Config {
    pub fn report_source(&self) -> DirReportSource {
        DirReportSource::new(&self.reports_dir).with_suffix(&self.report_suffix)
    }

    pub fn record_source(&self) -> DirRecordSource {
        DirRecordSource::new(&self.records_dir).with_extension(&self.record_extension)
    }
}

/// A report that could not be turned into subsequences.
#[derive(Debug)]
pub struct ReportFailure {
    pub name: String,
    pub error: Error,
}

/// Output of a batch run, in report enumeration order.
#[derive(Debug, Default)]
pub struct BatchResults {
    pub subsequences: Vec<LabeledSubsequence>,
    /// Reports with no repeat under the threshold.
    pub skipped: Vec<String>,
    pub failures: Vec<ReportFailure>,
}

impl BatchResults {
    /// Label line followed by sequence line for every extracted repeat.
    pub fn fasta_text(&self) -> String {
        let mut output = String::new();
        for sub in &self.subsequences {
            output.push_str(&sub.label);
            output.push('\n');
            output.push_str(&sub.seq);
            output.push('\n');
        }
        output
    }

    pub fn write_fasta<W: Write>(&self, writer: &mut W) -> Result<()> {
        for sub in &self.subsequences {
            writeln!(writer, "{sub}")?;
        }
        Ok(())
    }
}

/// Parse one report and slice its accepted repeats out of the record.
pub fn extract_report<R: RecordSource + ?Sized>(
    reports: &dyn ReportSource,
    records: &R,
    name: &str,
    threshold: f64,
) -> Result<Vec<LabeledSubsequence>> {
    let run = || -> Result<Vec<LabeledSubsequence>> {
        let report = parse_report_reader(reports.open_report(name)?, threshold)?;
        slice_from_source(records, &report.sequence_id, &report.repeats)
    };
    run().map_err(|e| e.in_report(name))
}

/// Process every report from `reports`, one rayon task per report.
///
/// A failing report never stops the batch; it ends up in
/// [`BatchResults::failures`] (or [`BatchResults::skipped`] when it simply
/// had nothing significant).
pub fn extract_repeats<R: RecordSource>(
    reports: &dyn ReportSource,
    records: &R,
    threshold: f64,
) -> Result<BatchResults> {
    // validate once up front rather than failing every report
    ReportParser::new(threshold)?;

    let names: Vec<String> = reports.report_names()?.collect();
    info!("Processing {} report(s) at threshold {threshold:e}", names.len());

    let outcomes: Vec<(String, Result<Vec<LabeledSubsequence>>)> = names
        .into_par_iter()
        .map(|name| {
            let outcome = extract_report(reports, records, &name, threshold);
            (name, outcome)
        })
        .collect();

    let mut results = BatchResults::default();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(subs) => results.subsequences.extend(subs),
            Err(e) if matches!(e.root(), Error::NoAcceptedRepeats) => {
                info!("{name}: no repeat at or below {threshold:e}, skipped");
                results.skipped.push(name);
            }
            Err(error) => {
                warn!("skipping {error}");
                results.failures.push(ReportFailure { name, error });
            }
        }
    }

    info!(
        "Extracted {} repeat(s); {} report(s) skipped, {} failed",
        results.subsequences.len(),
        results.skipped.len(),
        results.failures.len()
    );
    Ok(results)
}
