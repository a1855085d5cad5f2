//! Match highlighting — every match of the current pattern (`hlsearch`).
//!
//! [`HighlightIndex`] holds all match ranges of one pattern in one buffer
//! snapshot, sorted and non-overlapping, for the renderer to paint.
//!
//! # Architecture
//!
//! 1. After a search (or when `hlsearch` is turned on), call
//!    [`HighlightIndex::rebuild`].
//! 2. A rebuild is skipped when the pattern, its case mode and the buffer
//!    revision are all unchanged. Buffers that report no revision must call
//!    [`HighlightIndex::mark_dirty`] on every edit.
//! 3. Before painting, ask for the visible window with
//!    [`HighlightIndex::ranges_in`].

use log::trace;

use crate::buffer::{first_line, next_line, BufferAccessor};
use crate::options::SearchOptions;
use crate::pattern::Pattern;
use crate::scanner::line_matches;

// ---------------------------------------------------------------------------
// MatchRange
// ---------------------------------------------------------------------------

/// A half-open match range in char offsets. Zero-width matches (like `$`)
/// have `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

impl MatchRange {
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` is highlighted by this range. A zero-width range
    /// covers its own position so the renderer can still mark it.
    #[must_use]
    pub const fn covers(&self, offset: usize) -> bool {
        if self.is_empty() {
            offset == self.start
        } else {
            self.start <= offset && offset < self.end
        }
    }
}

// ---------------------------------------------------------------------------
// HighlightIndex
// ---------------------------------------------------------------------------

/// What the current ranges were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    source: String,
    ignore_case: bool,
    revision: Option<u64>,
}

/// All match ranges for the active pattern.
#[derive(Debug, Default)]
pub struct HighlightIndex {
    ranges: Vec<MatchRange>,
    key: Option<CacheKey>,
    /// Set by [`Self::mark_dirty`]; forces the next rebuild.
    dirty: bool,
}

impl HighlightIndex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ranges: Vec::new(),
            key: None,
            dirty: false,
        }
    }

    /// Recompute the ranges of `pattern` over the whole buffer.
    ///
    /// Returns nothing, and drops any old ranges, when `hlsearch` is off.
    pub fn rebuild<B: BufferAccessor + ?Sized>(
        &mut self,
        pattern: &Pattern,
        buf: &B,
        options: &SearchOptions,
    ) -> &[MatchRange] {
        if !options.hlsearch {
            self.clear();
            return &self.ranges;
        }

        let key = CacheKey {
            source: pattern.source().to_string(),
            ignore_case: pattern.ignore_case(),
            revision: buf.revision(),
        };
        if !self.dirty && self.key.as_ref() == Some(&key) {
            trace!("highlight cache hit for {:?}", key.source);
            return &self.ranges;
        }

        self.ranges.clear();
        let mut line = Some(first_line(buf));
        while let Some(bounds) = line {
            let chars = buf.chars_in(bounds.start..bounds.end);
            self.ranges.extend(
                line_matches(pattern, &chars)
                    .into_iter()
                    .map(|(start, end)| MatchRange {
                        start: bounds.start + start,
                        end: bounds.start + end,
                    }),
            );
            line = next_line(buf, bounds);
        }

        trace!(
            "highlight rebuilt: {} ranges for {:?}",
            self.ranges.len(),
            key.source
        );
        self.key = Some(key);
        self.dirty = false;
        &self.ranges
    }

    /// Force the next [`Self::rebuild`] to rescan.
    pub const fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Drop all ranges (`:nohlsearch`, `hlsearch` turned off).
    pub fn clear(&mut self) {
        self.ranges.clear();
        self.key = None;
        self.dirty = false;
    }

    /// All ranges, sorted by start.
    #[inline]
    #[must_use]
    pub fn ranges(&self) -> &[MatchRange] {
        &self.ranges
    }

    /// The ranges touching `[start, end)`, for painting the visible part of
    /// the buffer. Zero-width ranges at `start` are included.
    #[must_use]
    pub fn ranges_in(&self, start: usize, end: usize) -> &[MatchRange] {
        let lo = self
            .ranges
            .partition_point(|r| r.end < start || (r.end == start && !r.is_empty()));
        let hi = self.ranges.partition_point(|r| r.start < end).max(lo);
        &self.ranges[lo..hi]
    }

    /// Whether `offset` falls inside any range.
    #[must_use]
    pub fn covers(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.start <= offset);
        idx > 0 && self.ranges[idx - 1].covers(offset)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Buffer, LineBounds};
    use crate::pattern::compile;
    use pretty_assertions::assert_eq;

    fn on() -> SearchOptions {
        SearchOptions {
            hlsearch: true,
            ..SearchOptions::default()
        }
    }

    fn pat(raw: &str) -> Pattern {
        compile(raw, &on()).unwrap()
    }

    fn range(start: usize, end: usize) -> MatchRange {
        MatchRange { start, end }
    }

    // -- MatchRange -----------------------------------------------------------

    #[test]
    fn range_covers() {
        assert!(range(2, 4).covers(2));
        assert!(range(2, 4).covers(3));
        assert!(!range(2, 4).covers(4));
        assert!(range(3, 3).covers(3));
        assert!(!range(3, 3).covers(2));
    }

    // -- Rebuild --------------------------------------------------------------

    #[test]
    fn all_matches_in_order() {
        let buf = Buffer::from_text("foo bar\nfoo\nbaz foo");
        let mut index = HighlightIndex::new();
        let ranges = index.rebuild(&pat("foo"), &buf, &on()).to_vec();
        assert_eq!(ranges, vec![range(0, 3), range(8, 11), range(16, 19)]);
    }

    #[test]
    fn dollar_is_zero_width_per_line() {
        let buf = Buffer::from_text("one\ntwo\n");
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("$"), &buf, &on());
        assert_eq!(index.ranges(), &[range(3, 3), range(7, 7)]);
        assert!(index.covers(3));
        assert!(!index.covers(2));
    }

    #[test]
    fn off_means_empty() {
        let buf = Buffer::from_text("foo foo");
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("foo"), &buf, &on());
        assert_eq!(index.len(), 2);

        let ranges = index.rebuild(&pat("foo"), &buf, &SearchOptions::default());
        assert!(ranges.is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn sorted_and_non_overlapping() {
        let buf = Buffer::from_text("aaaa\naa\n\na");
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("a*"), &buf, &on());
        for pair in index.ranges().windows(2) {
            assert!(pair[0].end <= pair[1].start, "{pair:?}");
            assert!(pair[0].start < pair[1].start, "{pair:?}");
        }
        assert!(index.covers(0));
        assert!(index.covers(6));
    }

    #[test]
    fn edit_invalidates_cache() {
        let mut buf = Buffer::from_text("foo");
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("foo"), &buf, &on());
        assert_eq!(index.len(), 1);

        buf.insert(3, " foo");
        index.rebuild(&pat("foo"), &buf, &on());
        assert_eq!(index.ranges(), &[range(0, 3), range(4, 7)]);
    }

    #[test]
    fn case_mode_is_part_of_the_key() {
        let buf = Buffer::from_text("Foo foo");
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("foo"), &buf, &on());
        assert_eq!(index.len(), 1);

        index.rebuild(&pat("foo\\c"), &buf, &on());
        assert_eq!(index.len(), 2);
    }

    /// A buffer that never reports a revision.
    struct Plain(Vec<char>);

    impl BufferAccessor for Plain {
        fn len(&self) -> usize {
            self.0.len()
        }

        fn char_at(&self, offset: usize) -> Option<char> {
            self.0.get(offset).copied()
        }

        fn line_bounds(&self, offset: usize) -> LineBounds {
            let start = self.0[..offset].iter().rposition(|&c| c == '\n').map_or(0, |i| i + 1);
            let end = self.0[offset..]
                .iter()
                .position(|&c| c == '\n')
                .map_or(self.0.len(), |i| offset + i);
            let terminator_len = usize::from(end < self.0.len());
            LineBounds {
                start,
                end,
                terminator_len,
            }
        }
    }

    #[test]
    fn unrevisioned_buffer_needs_mark_dirty() {
        let mut buf = Plain("ab\nab".chars().collect());
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("ab"), &buf, &on());
        assert_eq!(index.len(), 2);

        buf.0.truncate(2);
        index.rebuild(&pat("ab"), &buf, &on());
        assert_eq!(index.len(), 2, "cached until marked dirty");

        index.mark_dirty();
        index.rebuild(&pat("ab"), &buf, &on());
        assert_eq!(index.ranges(), &[range(0, 2)]);
    }

    // -- Windows --------------------------------------------------------------

    #[test]
    fn ranges_in_window() {
        let buf = Buffer::from_text("ab ab ab ab");
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("ab"), &buf, &on());
        assert_eq!(index.ranges_in(4, 7), &[range(3, 5), range(6, 8)]);
        assert_eq!(index.ranges_in(5, 6), &[] as &[MatchRange]);
        assert_eq!(index.ranges_in(0, 100).len(), 4);
    }

    #[test]
    fn ranges_in_keeps_zero_width_at_start() {
        let buf = Buffer::from_text("one\ntwo\n");
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("$"), &buf, &on());
        assert_eq!(index.ranges_in(3, 4), &[range(3, 3)]);
        assert_eq!(index.ranges_in(4, 7), &[] as &[MatchRange]);
    }

    #[test]
    fn clear_drops_everything() {
        let buf = Buffer::from_text("x");
        let mut index = HighlightIndex::new();
        index.rebuild(&pat("x"), &buf, &on());
        index.clear();
        assert!(index.is_empty());
        assert!(!index.covers(0));
    }
}
