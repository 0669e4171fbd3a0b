//src/slice.rs

use crate::error::{Error, Result};
use crate::record::RecordSource;
use crate::types::{AcceptedRepeats, LabeledSubsequence, SequenceRecord};

/// Cut every accepted repeat out of `record`, in repeat id order.
///
/// Slicing is by character, so the subsequence of a range always has
/// exactly `end - start` residues.
pub fn slice_repeats(
    record: &SequenceRecord,
    repeats: &AcceptedRepeats,
) -> Result<Vec<LabeledSubsequence>> {
    let residues: Vec<char> = record.seq.chars().collect();

    let mut out = Vec::with_capacity(repeats.len());
    for (repeat, range) in repeats {
        if range.end > residues.len() || range.start >= range.end {
            return Err(Error::RangeOutOfBounds {
                record: record.header.clone(),
                repeat: repeat.clone(),
                start: range.start,
                end: range.end,
                len: residues.len(),
            });
        }
        out.push(LabeledSubsequence {
            label: format!("{}|{}", record.header, repeat),
            seq: residues[range.start..range.end].iter().collect(),
        });
    }
    Ok(out)
}

/// Load the record for `sequence_id` and slice out its repeats.
pub fn slice_from_source<S: RecordSource + ?Sized>(
    source: &S,
    sequence_id: &str,
    repeats: &AcceptedRepeats,
) -> Result<Vec<LabeledSubsequence>> {
    let record = source.load(sequence_id)?;
    slice_repeats(&record, repeats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MemoryRecordSource;
    use crate::report::translate_range;

    fn record(seq: &str) -> SequenceRecord {
        SequenceRecord {
            header: ">sp|P12345|FOO_HUMAN".into(),
            seq: seq.into(),
        }
    }

    #[test]
    fn slices_and_labels_each_repeat() {
        let mut repeats = AcceptedRepeats::new();
        repeats.insert("A1".into(), translate_range(1, 3));
        repeats.insert("A2".into(), translate_range(10, 20));
        let rec = record("ABCDEFGHIJKLMNOPQRSTUVWXYZ");

        let out = slice_repeats(&rec, &repeats).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, ">sp|P12345|FOO_HUMAN|A1");
        assert_eq!(out[0].seq, "ABC");
        assert_eq!(out[1].label, ">sp|P12345|FOO_HUMAN|A2");
        assert_eq!(out[1].seq, "JKLMNOPQRST");
        assert_eq!(out[1].seq.len(), 11);
        assert_eq!(out[0].to_string(), ">sp|P12345|FOO_HUMAN|A1\nABC");
    }

    #[test]
    fn range_past_sequence_end_fails() {
        let mut repeats = AcceptedRepeats::new();
        repeats.insert("R1".into(), translate_range(10, 20));
        let err = slice_repeats(&record("ACDEFGHIKLMNPQR"), &repeats).unwrap_err();
        match err {
            Error::RangeOutOfBounds { start, end, len, repeat, .. } => {
                assert_eq!((start, end, len), (9, 20, 15));
                assert_eq!(repeat, "R1");
            }
            other => panic!("expected RangeOutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn range_ending_at_sequence_end_is_fine() {
        let mut repeats = AcceptedRepeats::new();
        repeats.insert("R1".into(), translate_range(11, 15));
        let out = slice_repeats(&record("ACDEFGHIKLMNPQR"), &repeats).unwrap();
        assert_eq!(out[0].seq, "MNPQR");
    }

    #[test]
    fn unknown_record_is_reported() {
        let source = MemoryRecordSource::new();
        let repeats = AcceptedRepeats::new();
        assert!(matches!(
            slice_from_source(&source, "P12345", &repeats),
            Err(Error::RecordNotFound(_))
        ));
    }
}
