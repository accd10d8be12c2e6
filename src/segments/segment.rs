use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_START: &str = "00:00:00";
pub const DEFAULT_END: &str = "00:00:10";

const BULK_ID_PREFIX: &str = "bulk_";

/// One time range to cut from the source video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub start: String,
    pub end: String,
}

/// Which of the two range bounds an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentField {
    Start,
    End,
}

impl Segment {
    /// Segment created by hand, with a random id.
    pub fn manual(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Segment produced by the bulk parser; `ordinal` is its 1-based line position.
    pub fn bulk(ordinal: usize, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: format!("{}{}", BULK_ID_PREFIX, ordinal),
            start: start.into(),
            end: end.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_bulk(&self) -> bool {
        self.id.starts_with(BULK_ID_PREFIX)
    }

    pub fn set(&mut self, field: SegmentField, value: impl Into<String>) {
        match field {
            SegmentField::Start => self.start = value.into(),
            SegmentField::End => self.end = value.into(),
        }
    }
}

impl Default for Segment {
    fn default() -> Self {
        Self::manual(DEFAULT_START, DEFAULT_END)
    }
}
