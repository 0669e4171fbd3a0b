//src/error.rs

use std::io;

/// A type alias for `Result<T, hhrepid_rs::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while parsing a report or slicing a record.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// The significance threshold must be finite and non-negative.
    #[error("invalid significance threshold: {0}")]
    InvalidThreshold(f64),

    /// A matched line carried a field that could not be interpreted.
    #[error("format error at line {line}: {reason} (`{text}`)")]
    Format {
        line: usize,
        reason: String,
        text: String,
    },

    /// The report had no segment line that passed the threshold, so no
    /// sequence identifier was ever assigned.
    #[error("no accepted repeats in report")]
    NoAcceptedRepeats,

    /// A segment line referenced a repeat before its score line.
    #[error("line {line}: repeat {repeat} has no preceding score line")]
    MissingScore { line: usize, repeat: String },

    /// A sequence record file did not have a header and a sequence line.
    #[error("malformed sequence record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("sequence record {0} not found")]
    RecordNotFound(String),

    #[error(
        "repeat {repeat} range {start}..{end} is out of bounds for {record} (length {len})"
    )]
    RangeOutOfBounds {
        record: String,
        repeat: String,
        start: usize,
        end: usize,
        len: usize,
    },

    /// Wraps any of the above with the name of the report it came from.
    #[error("report {name}: {source}")]
    Report {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn format(line: usize, reason: impl Into<String>, text: &str) -> Self {
        Error::Format {
            line,
            reason: reason.into(),
            text: text.to_string(),
        }
    }

    /// Attach the report name to an error.
    pub fn in_report(self, name: &str) -> Self {
        Error::Report {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with any report context stripped.
    pub fn root(&self) -> &Error {
        match self {
            Error::Report { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for the kinds that mean the input text itself is malformed.
    pub fn is_format(&self) -> bool {
        matches!(
            self.root(),
            Error::Format { .. } | Error::NoAcceptedRepeats | Error::MalformedRecord { .. }
        )
    }
}
