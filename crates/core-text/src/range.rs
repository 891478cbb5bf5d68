//! Character ranges and the selection sentinel.
//!
//! All offsets in this crate count Unicode scalar values (what `ropey` calls
//! chars). An attachment occupies exactly one of these slots.

use std::ops::Range;

/// Sentinel location meaning "no selection". Any mutation driven by a range
/// carrying this location is suppressed by the engine.
pub const NOT_FOUND: usize = usize::MAX;

/// A `(location, length)` pair over document character indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub location: usize,
    pub length: usize,
}

impl TextRange {
    pub const fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// Zero-length range (a caret) at `location`.
    pub const fn caret(location: usize) -> Self {
        Self {
            location,
            length: 0,
        }
    }

    pub const fn not_found() -> Self {
        Self {
            location: NOT_FOUND,
            length: 0,
        }
    }

    pub fn from_bounds(start: usize, end: usize) -> Self {
        if end <= start {
            Self::caret(start)
        } else {
            Self::new(start, end - start)
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.location == NOT_FOUND
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.location.saturating_add(self.length)
    }

    /// True when `index` lies inside `[location, end)`.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.location && index < self.end()
    }

    /// Clamp to a document of `len` characters: the location is pinned to
    /// `len` and the length shrinks so that `end() <= len`.
    pub fn clamp_to(&self, len: usize) -> Self {
        let location = self.location.min(len);
        let length = self.length.min(len - location);
        Self { location, length }
    }

    pub fn fits(&self, len: usize) -> bool {
        !self.is_not_found() && self.location <= len && self.end() <= len
    }

    pub fn as_range(&self) -> Range<usize> {
        self.location..self.end()
    }
}

impl From<Range<usize>> for TextRange {
    fn from(r: Range<usize>) -> Self {
        Self::from_bounds(r.start, r.end)
    }
}
