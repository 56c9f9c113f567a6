use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Half-open address range `[start, end)`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl Range {
    pub fn new(start: usize, size: usize) -> Self {
        Self {
            start,
            end: start + size,
        }
    }

    pub fn length(&self) -> usize {
        self.end - self.start
    }

    /// Check whether `other` lies completely inside of this range
    pub fn contains(&self, other: &Range) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}
