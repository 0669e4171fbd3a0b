//! Parser for HHrepID internal-repeat reports.
//!
//! A report is read line by line. Two kinds of line matter:
//!
//! ```text
//! A1  0.998  1.2E-12  ...                  score line: repeat id, probability, p-value
//! A1  sp|P12345|NAME_HUMAN  10-48  +9 ...  segment line: one copy of the repeat
//! ```
//!
//! The score line of a repeat must come before any of its segment lines. This
//! is how HHrepID writes its output and the parser relies on it: a segment
//! line whose repeat has no score yet is an error, not something to resolve
//! by looking ahead.

use std::io::BufRead;
use std::path::Path;

use ahash::AHashMap;
use log::{debug, warn};
use regex::Regex;

use crate::error::{Error, Result};
use crate::input::open_text;
use crate::types::{AcceptedRepeats, CoordinateRange, RepeatReport};

/// Default p-value cutoff for a repeat to count as significant.
pub const DEFAULT_THRESHOLD: f64 = 1e-3;

const SCORE_PATTERN: &str = r"^(\w+)\s+[\d.]+\s+([\d.\w-]+)";
const SEGMENT_PATTERN: &str = r"^(\w+)\s+(sp[\w|]+)+\s+([\d-]+)\s+\+\d+\s(.+)";

/// Translate a 1-based inclusive range into a 0-based half-open one.
///
/// # Panics
///
/// `start` must be at least 1; a 0 start has no 0-based counterpart and
/// panics on underflow. Report parsing rejects such ranges before calling
/// this.
pub fn translate_range(start: usize, end: usize) -> CoordinateRange {
    CoordinateRange {
        start: start - 1,
        end,
    }
}

/// Streaming, single-pass report parser.
///
/// Feed it every line of one report in file order, then call
/// [`ReportParser::finish`].
pub struct ReportParser {
    threshold: f64,
    score_re: Regex,
    segment_re: Regex,
    scores: AHashMap<String, f64>,
    repeats: AcceptedRepeats,
    sequence_id: Option<String>,
    line: usize,
}

impl ReportParser {
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            score_re: Regex::new(SCORE_PATTERN)?,
            segment_re: Regex::new(SEGMENT_PATTERN)?,
            scores: AHashMap::new(),
            repeats: AcceptedRepeats::new(),
            sequence_id: None,
            line: 0,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Repeats accepted so far.
    pub fn accepted(&self) -> &AcceptedRepeats {
        &self.repeats
    }

    /// Sequence id of the most recent accepted segment line, if any.
    pub fn sequence_id(&self) -> Option<&str> {
        self.sequence_id.as_deref()
    }

    /// Process the next line of the report.
    pub fn feed_line(&mut self, raw: &str) -> Result<()> {
        self.line += 1;
        let line = raw.trim_end_matches(['\n', '\r']);

        // A line can be both a score line and a segment line; the score is
        // recorded first.
        if let Some(caps) = self.score_re.captures(line) {
            let repeat = &caps[1];
            let score = parse_confidence(&caps[2]).ok_or_else(|| {
                Error::format(self.line, format!("invalid confidence `{}`", &caps[2]), line)
            })?;
            if let Some(old) = self.scores.insert(repeat.to_string(), score) {
                debug!("line {}: score of {repeat} replaced ({old} -> {score})", self.line);
            }
        }

        let Some(caps) = self.segment_re.captures(line) else {
            return Ok(());
        };
        let repeat = &caps[1];

        let score = *self.scores.get(repeat).ok_or_else(|| Error::MissingScore {
            line: self.line,
            repeat: repeat.to_string(),
        })?;
        if score > self.threshold {
            return Ok(());
        }

        let sequence_id = caps[2]
            .split('|')
            .nth(1)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::format(
                    self.line,
                    format!("no accession in sequence token `{}`", &caps[2]),
                    line,
                )
            })?;
        let range = parse_range(&caps[3]).ok_or_else(|| {
            Error::format(self.line, format!("invalid range `{}`", &caps[3]), line)
        })?;

        match self.sequence_id.as_deref() {
            Some(prev) if prev != sequence_id => warn!(
                "line {}: sequence id changed from {prev} to {sequence_id}, keeping the latter",
                self.line
            ),
            _ => {}
        }
        self.sequence_id = Some(sequence_id.to_string());

        if let Some(prev) = self.repeats.insert(repeat.to_string(), range) {
            warn!(
                "line {}: repeat {repeat} seen again, range {}..{} replaced by {}..{}",
                self.line, prev.start, prev.end, range.start, range.end
            );
        }
        Ok(())
    }

    /// Finish the report, failing if no repeat was accepted.
    pub fn finish(self) -> Result<RepeatReport> {
        match self.sequence_id {
            Some(sequence_id) => Ok(RepeatReport {
                sequence_id,
                repeats: self.repeats,
            }),
            None => Err(Error::NoAcceptedRepeats),
        }
    }
}

/// Confidence values are non-negative reals; HHrepID writes them like `1.2E-12`.
fn parse_confidence(field: &str) -> Option<f64> {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan() && *v >= 0.0)
}

/// Parse `start-end` (1-based, inclusive) into a half-open range.
fn parse_range(field: &str) -> Option<CoordinateRange> {
    let (start, end) = field.split_once('-')?;
    let start: usize = start.parse().ok()?;
    let end: usize = end.parse().ok()?;
    if start == 0 || start > end {
        return None;
    }
    Some(translate_range(start, end))
}

/// Parse a whole report held in memory.
pub fn parse_report(text: &str, threshold: f64) -> Result<RepeatReport> {
    let mut parser = ReportParser::new(threshold)?;
    for line in text.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}

/// Parse a report from any buffered reader.
pub fn parse_report_reader<R: BufRead>(mut reader: R, threshold: f64) -> Result<RepeatReport> {
    let mut parser = ReportParser::new(threshold)?;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        parser.feed_line(&line)?;
    }
    parser.finish()
}

/// Parse a report file, plain or gzipped.
pub fn parse_report_file<P: AsRef<Path>>(path: P, threshold: f64) -> Result<RepeatReport> {
    let path = path.as_ref();
    parse_report_reader(open_text(path)?, threshold)
        .map_err(|e| e.in_report(&path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Results for repeats type A:

Number of repeats:                    2
P-value of repeats:             1.7E-10

ID  Prob   P-value  Offset
A1  0.998  1.2E-12  +0
A2  0.500  2.0E-02  +0

A1  sp|P12345|NAME_HUMAN  10-48  +9 DKKLVAL
A1  sp|P12345|NAME_HUMAN  60-97  +9 DRRLIAL
A2  sp|P12345|NAME_HUMAN  120-130  +2 WWW
";

    #[test]
    fn accepts_significant_repeat() {
        let text = "R1 0.001 1e-5 x\nR1 sp|P12345|FOO_HUMAN 10-20 +1 ACDE\n";
        let report = parse_report(text, 1e-3).unwrap();
        assert_eq!(report.sequence_id, "P12345");
        assert_eq!(report.repeats.len(), 1);
        assert_eq!(report.repeats["R1"], CoordinateRange { start: 9, end: 20 });
    }

    #[test]
    fn discards_repeat_above_threshold() {
        let text = "R1 0.001 1e-5 x\nR1 sp|P12345|FOO_HUMAN 10-20 +1 ACDE\n";
        let mut parser = ReportParser::new(1e-6).unwrap();
        for line in text.lines() {
            parser.feed_line(line).unwrap();
        }
        assert!(parser.accepted().is_empty());
        assert!(parser.sequence_id().is_none());
        assert!(matches!(parser.finish(), Err(Error::NoAcceptedRepeats)));
    }

    #[test]
    fn segment_without_prior_score_is_an_error() {
        let text = "R1 0.001 1e-5 x\nR2 sp|P12345|FOO_HUMAN 10-20 +1 ACDE\n";
        match parse_report(text, 1e-3) {
            Err(Error::MissingScore { line, repeat }) => {
                assert_eq!(line, 2);
                assert_eq!(repeat, "R2");
            }
            other => panic!("expected MissingScore, got {other:?}"),
        }
    }

    #[test]
    fn score_after_segment_does_not_count() {
        let text = "R1 sp|P12345|FOO_HUMAN 10-20 +1 ACDE\nR1 0.001 1e-5 x\n";
        assert!(matches!(
            parse_report(text, 1e-3),
            Err(Error::MissingScore { line: 1, .. })
        ));
    }

    #[test]
    fn full_report_keeps_last_segment_per_repeat() {
        let report = parse_report(REPORT, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(report.sequence_id, "P12345");
        assert_eq!(report.repeats.len(), 1);
        assert_eq!(report.repeats["A1"], CoordinateRange { start: 59, end: 97 });
    }

    #[test]
    fn later_score_line_overwrites_earlier() {
        let text = "\
R1 0.9 1e-5 x
R1 0.9 5e-1 x
R1 sp|P1|A 1-5 +1 ACDEF
";
        assert!(matches!(
            parse_report(text, 1e-3),
            Err(Error::NoAcceptedRepeats)
        ));
    }

    #[test]
    fn last_sequence_id_wins() {
        let text = "\
R1 0.9 1e-5 x
R2 0.9 1e-5 x
R1 sp|P1|A 1-5 +1 ACDEF
R2 sp|Q2|B 3-4 +1 CD
";
        let report = parse_report(text, 1e-3).unwrap();
        assert_eq!(report.sequence_id, "Q2");
        assert_eq!(report.repeats.len(), 2);
    }

    #[test]
    fn non_numeric_confidence_is_a_format_error() {
        let err = parse_report("Results 1.0 for repeats\n", 1e-3).unwrap_err();
        assert!(err.is_format());
        assert!(matches!(err, Error::Format { line: 1, .. }));
    }

    #[test]
    fn negative_confidence_is_a_format_error() {
        let err = parse_report("R1 0.1 -5\n", 1e-3).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn malformed_ranges_are_format_errors() {
        for range in ["0-5", "9-3", "1-2-3", "12"] {
            let text = format!("R1 0.9 1e-5 x\nR1 sp|P1|A {range} +1 ACDEF\n");
            let err = parse_report(&text, 1e-3).unwrap_err();
            assert!(
                matches!(err, Error::Format { line: 2, .. }),
                "{range}: {err:?}"
            );
        }
    }

    #[test]
    fn sequence_token_without_accession_is_a_format_error() {
        let text = "R1 0.9 1e-5 x\nR1 spam 1-5 +1 ACDEF\n";
        assert!(matches!(
            parse_report(text, 1e-3),
            Err(Error::Format { line: 2, .. })
        ));
    }

    #[test]
    fn rejected_segment_is_not_validated() {
        // Filtering happens before the range is looked at.
        let text = "R1 0.9 0.5 x\nR1 sp|P1|A 9-3 +1 ACDEF\nR2 0.9 1e-9 x\nR2 sp|P1|A 2-3 +1 CD\n";
        let report = parse_report(text, 1e-3).unwrap();
        assert_eq!(report.repeats.keys().collect::<Vec<_>>(), ["R2"]);
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        let text = "\n# header\nP-value of repeats: 1e-5\nR1 0.9 1e-5 x\nR1 sp|P1|A 1-5 +1 ACDEF\n";
        assert_eq!(parse_report(text, 1e-3).unwrap().repeats.len(), 1);
    }

    #[test]
    fn threshold_is_monotonic() {
        let text = "\
R1 0.9 1e-8 x
R2 0.9 1e-4 x
R3 0.9 1e-2 x
R1 sp|P1|A 1-5 +1 ACDEF
R2 sp|P1|A 6-9 +1 ACDE
R3 sp|P1|A 10-12 +1 ACD
";
        let mut previous: Vec<String> = Vec::new();
        for threshold in [1e-9, 1e-8, 1e-5, 1e-4, 1e-3, 1e-2, 1.0] {
            let accepted: Vec<String> = match parse_report(text, threshold) {
                Ok(report) => report.repeats.into_keys().collect(),
                Err(Error::NoAcceptedRepeats) => Vec::new(),
                Err(e) => panic!("{e}"),
            };
            assert!(previous.iter().all(|id| accepted.contains(id)));
            previous = accepted;
        }
        assert_eq!(previous, ["R1", "R2", "R3"]);
    }

    #[test]
    fn parsing_is_idempotent() {
        let a = parse_report(REPORT, DEFAULT_THRESHOLD).unwrap();
        let b = parse_report(REPORT, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn reader_and_text_agree() {
        let from_text = parse_report(REPORT, DEFAULT_THRESHOLD).unwrap();
        let from_reader = parse_report_reader(REPORT.as_bytes(), DEFAULT_THRESHOLD).unwrap();
        assert_eq!(from_text, from_reader);
    }

    #[test]
    fn translation_yields_half_open_range() {
        for (s, e) in [(1, 1), (1, 10), (10, 20), (99, 100)] {
            let r = translate_range(s, e);
            assert_eq!((r.start, r.end), (s - 1, e));
            assert!(r.start < r.end);
            assert_eq!(r.len(), e - s + 1);
        }
    }

    #[test]
    #[should_panic]
    fn translation_requires_one_based_start() {
        translate_range(0, 3);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        for t in [f64::NAN, -1.0, f64::INFINITY] {
            assert!(matches!(
                ReportParser::new(t),
                Err(Error::InvalidThreshold(_))
            ));
        }
    }

    #[test]
    fn file_errors_name_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("P1.hhrepid");
        std::fs::write(&path, "R1 sp|P1|A 1-5 +1 ACDEF\n").unwrap();
        let err = parse_report_file(&path, 1e-3).unwrap_err();
        assert!(err.to_string().contains("P1.hhrepid"));
        assert!(matches!(err.root(), Error::MissingScore { .. }));
    }
}
