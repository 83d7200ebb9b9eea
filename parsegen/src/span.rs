use std::fmt::{self, Display};

use serde::Serialize;

use crate::position::Position;

/// A region over the input, as byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Both positions must be over the same input, `start` first.
    pub fn from_positions(start: &Position<'_>, end: &Position<'_>) -> Self {
        debug_assert!(start.idx <= end.idx);
        Span {
            start: start.idx,
            end: end.idx,
        }
    }

    pub fn as_str<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
