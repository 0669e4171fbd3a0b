use std::io::{BufRead, ErrorKind};
use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::error::{Error, Result};
use crate::input::open_text;
use crate::types::SequenceRecord;

/// Default file extension of the per-sequence alignment records.
pub const DEFAULT_RECORD_EXTENSION: &str = "a3m";

impl SequenceRecord {
    /// Read a single-entry record: the first whitespace field of line one is
    /// the header, line two is the sequence. Anything after that is ignored.
    pub fn from_reader<R: BufRead>(id: &str, mut reader: R) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedRecord {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let mut line = String::new();
        reader.read_line(&mut line)?;
        let header = line
            .split_whitespace()
            .next()
            .ok_or_else(|| malformed("missing header line"))?
            .to_string();

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(malformed("missing sequence line"));
        }
        let seq = line.trim().to_string();

        Ok(SequenceRecord { header, seq })
    }
}

/// Resolves a sequence database id to its record.
pub trait RecordSource: Sync {
    fn load(&self, id: &str) -> Result<SequenceRecord>;
}

/// Records stored one per file as `<dir>/<id>.<extension>` (optionally `.gz`).
#[derive(Debug, Clone)]
pub struct DirRecordSource {
    pub dir: PathBuf,
    pub extension: String,
}

impl DirRecordSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            extension: DEFAULT_RECORD_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// The first existing candidate path for `id`.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let plain = self.dir.join(format!("{id}.{}", self.extension));
        let gz = self.dir.join(format!("{id}.{}.gz", self.extension));
        [plain, gz].into_iter().find(|p| p.is_file())
    }
}

impl RecordSource for DirRecordSource {
    fn load(&self, id: &str) -> Result<SequenceRecord> {
        let path = self
            .path_for(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        let reader = match open_text(&path) {
            Ok(r) => r,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::RecordNotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        SequenceRecord::from_reader(id, reader)
    }
}

/// In-memory records, keyed by sequence id.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    records: AHashMap<String, SequenceRecord>,
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, record: SequenceRecord) {
        self.records.insert(id.to_string(), record);
    }
}

impl RecordSource for MemoryRecordSource {
    fn load(&self, id: &str) -> Result<SequenceRecord> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))
    }
}
