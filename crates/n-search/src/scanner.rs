//! Match scanner — find the next occurrence of a compiled pattern.
//!
//! Scans the buffer line by line from a start offset, forward (`/`, `n`) or
//! backward (`?`, `N`). The first step never returns a match starting at the
//! start offset itself, so repeating a search always moves. With `wrapscan`
//! the scan continues from the other end of the buffer, through the start
//! offset, which means a lone match under the cursor is found again after a
//! full cycle.
//!
//! Anchors are evaluated per line: `^` holds at every line start, `$` at
//! every line's end (just before its terminator, or at the end of a buffer
//! without a trailing newline).

use crate::buffer::{first_line, last_line, line_at, next_line, prev_line, BufferAccessor};
use crate::pattern::Pattern;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// The command-line prefix (`/` for forward, `?` for backward).
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '?',
        }
    }

    /// The direction a command-line prefix stands for.
    #[must_use]
    pub const fn from_prefix(ch: char) -> Option<Self> {
        match ch {
            '/' => Some(Self::Forward),
            '?' => Some(Self::Backward),
            _ => None,
        }
    }

    /// The message Vim shows when a search in this direction wraps.
    #[must_use]
    pub const fn wrap_message(self) -> &'static str {
        match self {
            Self::Forward => "search hit BOTTOM, continuing at TOP",
            Self::Backward => "search hit TOP, continuing at BOTTOM",
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of a search. Not finding anything is a normal result.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchResult {
    /// Char offset of the match start (after any offset modifier).
    Found(usize),
    NotFound,
}

impl SearchResult {
    /// The found offset, if any.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> Option<usize> {
        match self {
            Self::Found(offset) => Some(offset),
            Self::NotFound => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// A match located by the scanner: `[start, end)` in char offsets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hit {
    pub start: usize,
    pub end: usize,
    /// The scan went past the end (or start) of the buffer to find it.
    pub wrapped: bool,
}

impl Hit {
    /// True for zero-width matches such as `$` or `\<`.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ---------------------------------------------------------------------------
// Search functions
// ---------------------------------------------------------------------------

/// Find the `count`-th match from `start` in `direction`.
///
/// Each step starts at the previous match's start. A `count` of 0 is
/// treated as 1. Returns [`SearchResult::NotFound`] when any step fails.
#[must_use]
pub fn find<B: BufferAccessor + ?Sized>(
    pattern: &Pattern,
    buf: &B,
    start: usize,
    direction: SearchDirection,
    count: usize,
    wrapscan: bool,
) -> SearchResult {
    find_hit(pattern, buf, start, direction, count, wrapscan)
        .map_or(SearchResult::NotFound, |hit| SearchResult::Found(hit.start))
}

/// Like [`find`], but returns the whole match and whether any step wrapped.
#[must_use]
pub fn find_hit<B: BufferAccessor + ?Sized>(
    pattern: &Pattern,
    buf: &B,
    start: usize,
    direction: SearchDirection,
    count: usize,
    wrapscan: bool,
) -> Option<Hit> {
    let mut from = start.min(buf.len());
    let mut wrapped = false;
    let mut last = None;

    for _ in 0..count.max(1) {
        let hit = match direction {
            SearchDirection::Forward => step_forward(pattern, buf, from, wrapscan),
            SearchDirection::Backward => step_backward(pattern, buf, from, wrapscan),
        }?;
        wrapped |= hit.wrapped;
        from = hit.start;
        last = Some(hit);
    }

    last.map(|hit| Hit { wrapped, ..hit })
}

/// All non-overlapping matches in one line's content, as `(start, end)`
/// columns. A zero-width match advances the scan by one column.
pub(crate) fn line_matches(pattern: &Pattern, line: &[char]) -> Vec<(usize, usize)> {
    let mut matches = Vec::new();
    let mut col = 0;
    while col <= line.len() {
        match pattern.match_at(line, col) {
            Some(end) => {
                matches.push((col, end));
                col = if end > col { end } else { col + 1 };
            }
            None => col += 1,
        }
    }
    matches
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// First match strictly after `from`, wrapping to the top when allowed.
fn step_forward<B: BufferAccessor + ?Sized>(
    pattern: &Pattern,
    buf: &B,
    from: usize,
    wrapscan: bool,
) -> Option<Hit> {
    let mut line = Some(line_at(buf, from));
    while let Some(bounds) = line {
        let chars = buf.chars_in(bounds.start..bounds.end);
        let first_col = (from + 1).saturating_sub(bounds.start);
        for col in first_col..=chars.len() {
            if let Some(end) = pattern.match_at(&chars, col) {
                return Some(hit(bounds.start, col, end, false));
            }
        }
        line = next_line(buf, bounds);
    }

    if !wrapscan {
        return None;
    }

    let mut line = Some(first_line(buf));
    while let Some(bounds) = line {
        if bounds.start > from {
            break;
        }
        let chars = buf.chars_in(bounds.start..bounds.end);
        let last_col = (from - bounds.start).min(chars.len());
        for col in 0..=last_col {
            if let Some(end) = pattern.match_at(&chars, col) {
                return Some(hit(bounds.start, col, end, true));
            }
        }
        line = next_line(buf, bounds);
    }
    None
}

/// Last match strictly before `from`, wrapping to the bottom when allowed.
fn step_backward<B: BufferAccessor + ?Sized>(
    pattern: &Pattern,
    buf: &B,
    from: usize,
    wrapscan: bool,
) -> Option<Hit> {
    let mut line = Some(line_at(buf, from));
    while let Some(bounds) = line {
        if from > bounds.start {
            let chars = buf.chars_in(bounds.start..bounds.end);
            let last_col = (from - bounds.start - 1).min(chars.len());
            for col in (0..=last_col).rev() {
                if let Some(end) = pattern.match_at(&chars, col) {
                    return Some(hit(bounds.start, col, end, false));
                }
            }
        }
        line = prev_line(buf, bounds);
    }

    if !wrapscan {
        return None;
    }

    let mut line = Some(last_line(buf));
    while let Some(bounds) = line {
        if bounds.end < from {
            break;
        }
        let chars = buf.chars_in(bounds.start..bounds.end);
        let first_col = from.saturating_sub(bounds.start);
        for col in (first_col..=chars.len()).rev() {
            if let Some(end) = pattern.match_at(&chars, col) {
                return Some(hit(bounds.start, col, end, true));
            }
        }
        line = prev_line(buf, bounds);
    }
    None
}

const fn hit(line_start: usize, col: usize, end_col: usize, wrapped: bool) -> Hit {
    Hit {
        start: line_start + col,
        end: line_start + end_col,
        wrapped,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
