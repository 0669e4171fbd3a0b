//! Where reports come from.
//!
//! The batch driver only needs the names of candidate reports and a way to
//! open each one, so a directory scan and an in-memory fixture look the same.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::input::open_text;

/// File-name suffix that marks an HHrepID report.
pub const DEFAULT_REPORT_SUFFIX: &str = "hhrepid";

pub trait ReportSource: Sync {
    /// Names of the candidate reports, in processing order.
    fn report_names(&self) -> Result<Box<dyn Iterator<Item = String> + '_>>;

    /// Open one report for reading.
    fn open_report(&self, name: &str) -> Result<Box<dyn BufRead + Send + '_>>;
}

/// Every regular file in `dir` whose name ends with `suffix` (a trailing
/// `.gz` is allowed) and has something in front of it.
#[derive(Debug, Clone)]
pub struct DirReportSource {
    pub dir: PathBuf,
    pub suffix: String,
}

impl DirReportSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            suffix: DEFAULT_REPORT_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    fn is_report(&self, name: &str) -> bool {
        let stem = name.strip_suffix(".gz").unwrap_or(name);
        stem.len() > self.suffix.len() && stem.ends_with(&self.suffix)
    }
}

impl ReportSource for DirReportSource {
    fn report_names(&self) -> Result<Box<dyn Iterator<Item = String> + '_>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.is_report(&name) {
                names.push(name);
            }
        }
        // read_dir order is platform dependent
        names.sort();
        Ok(Box::new(names.into_iter()))
    }

    fn open_report(&self, name: &str) -> Result<Box<dyn BufRead + Send + '_>> {
        Ok(open_text(self.dir.join(name))?)
    }
}

/// Reports held in memory as `(name, text)` pairs.
#[derive(Debug, Clone, Default)]
pub struct MemoryReportSource {
    reports: Vec<(String, String)>,
}

impl MemoryReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, text: &str) {
        self.reports.push((name.to_string(), text.to_string()));
    }
}

impl ReportSource for MemoryReportSource {
    fn report_names(&self) -> Result<Box<dyn Iterator<Item = String> + '_>> {
        Ok(Box::new(self.reports.iter().map(|(name, _)| name.clone())))
    }

    fn open_report(&self, name: &str) -> Result<Box<dyn BufRead + Send + '_>> {
        self.reports
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, text)| Box::new(text.as_bytes()) as Box<dyn BufRead + Send + '_>)
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no report named {name}"),
                ))
            })
    }
}
