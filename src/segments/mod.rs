use std::collections::HashSet;

pub mod parser;
pub mod segment;

pub use segment::{Segment, SegmentField};

const INITIAL_START: &str = "00:00:10";
const INITIAL_END: &str = "00:00:30";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("No valid timestamps found. Use format: {}", parser::FORMAT_HINT)]
    NoTimestamps,

    #[error("Segment list cannot be empty")]
    Empty,

    #[error("Duplicate segment id: {0}")]
    DuplicateId(String),
}

/// Ordered list of clip ranges that drives the processing request.
///
/// Never empty and never holds two segments with the same id.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    /// Store seeded with one 10s–30s clip.
    pub fn new() -> Self {
        Self {
            segments: vec![Segment::manual(INITIAL_START, INITIAL_END)],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn add(&mut self) -> &[Segment] {
        let mut segment = Segment::default();
        while self.contains_id(&segment.id) {
            segment = Segment::default();
        }
        self.segments.push(segment);
        &self.segments
    }

    /// Removes the segment at `index`. The last remaining segment is kept.
    pub fn remove(&mut self, index: usize) -> &[Segment] {
        if self.segments.len() > 1 && index < self.segments.len() {
            self.segments.remove(index);
        } else {
            tracing::debug!(
                "Ignoring remove at {} (len={})",
                index,
                self.segments.len()
            );
        }
        &self.segments
    }

    pub fn update(&mut self, index: usize, field: SegmentField, value: &str) -> &[Segment] {
        if let Some(segment) = self.segments.get_mut(index) {
            segment.set(field, value);
        }
        &self.segments
    }

    pub fn replace_all(&mut self, segments: Vec<Segment>) -> Result<&[Segment], SegmentError> {
        if segments.is_empty() {
            return Err(SegmentError::Empty);
        }

        {
            let mut seen = HashSet::with_capacity(segments.len());
            for segment in &segments {
                if !seen.insert(segment.id.as_str()) {
                    return Err(SegmentError::DuplicateId(segment.id.clone()));
                }
            }
        }

        self.segments = segments;
        Ok(&self.segments)
    }

    /// Parses `text` and replaces the whole list with the result.
    ///
    /// Returns the number of segments applied. When nothing parses the store
    /// is left as it was.
    pub fn apply_bulk(&mut self, text: &str) -> Result<usize, SegmentError> {
        let parsed = parser::parse(text);
        if parsed.is_empty() {
            return Err(SegmentError::NoTimestamps);
        }

        let count = parsed.len();
        self.replace_all(parsed)?;
        tracing::info!("Applied {} bulk segment(s)", count);
        Ok(count)
    }

    fn contains_id(&self, id: &str) -> bool {
        self.segments.iter().any(|s| s.id == id)
    }
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}
