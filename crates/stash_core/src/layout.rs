use serde::Serialize;

use crate::error::DecodeError;

/// Bytes of padding that follow every item payload in the body.
pub const RECORD_PADDING: usize = 12;
/// Marker word plus length word.
pub const RECORD_PREFIX: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Where one body record sits within the decoded body bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordLayout {
    pub marker: u32,
    pub prefix: ByteRange,
    pub payload: ByteRange,
    pub padding: ByteRange,
}

impl RecordLayout {
    pub fn at(start: usize, marker: u32, payload_len: usize) -> Self {
        let payload_start = start + RECORD_PREFIX;
        let padding_start = payload_start + payload_len;
        Self {
            marker,
            prefix: ByteRange {
                start,
                end: payload_start,
            },
            payload: ByteRange {
                start: payload_start,
                end: padding_start,
            },
            padding: ByteRange {
                start: padding_start,
                end: padding_start + RECORD_PADDING,
            },
        }
    }

    pub fn range(&self) -> ByteRange {
        ByteRange {
            start: self.prefix.start,
            end: self.padding.end,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BodyLayout {
    pub body_len: usize,
    pub records: Vec<RecordLayout>,
}

impl BodyLayout {
    /// Checks that records are contiguous, start at byte 0, have the fixed
    /// prefix and padding widths, and cover the whole body.
    pub fn validate(&self) -> Result<(), DecodeError> {
        let mut expected = 0usize;
        for (index, record) in self.records.iter().enumerate() {
            let range = record.range();
            if range.start != expected {
                return Err(DecodeError::Layout(format!(
                    "record {index}: expected start {expected}, got {}",
                    range.start
                )));
            }
            if record.prefix.len() != RECORD_PREFIX
                || record.padding.len() != RECORD_PADDING
                || record.payload.start != record.prefix.end
                || record.padding.start != record.payload.end
            {
                return Err(DecodeError::Layout(format!(
                    "record {index}: malformed ranges {record:?}"
                )));
            }
            expected = range.end;
        }

        if expected != self.body_len {
            return Err(DecodeError::Layout(format!(
                "records end at {expected}, body length {}",
                self.body_len
            )));
        }

        Ok(())
    }
}
