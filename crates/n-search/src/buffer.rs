//! Text buffers as the search engine sees them.
//!
//! The engine never owns or mutates text. It reads through the
//! [`BufferAccessor`] capability: a length, random access by char offset, and
//! line-boundary queries. [`Buffer`] is the rope-backed implementation used by
//! n-nvim and by the tests.
//!
//! # Coordinates
//!
//! - **Offsets are char offsets**, not byte offsets. Offset 3 of `"café"` is
//!   `'é'`. The offset equal to [`len`](BufferAccessor::len) is a valid
//!   position (just past the last char) but references no character.
//!
//! - **Lines end at `\n`, `\r\n` or `\r`.** A trailing terminator does not
//!   open an extra line: `"one\ntwo\n"` has two lines, matching how Vim
//!   counts them. Only a final line *without* a terminator (or an empty
//!   buffer) has a line ending at `len`.

use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use ropey::{Rope, RopeSlice};

// ---------------------------------------------------------------------------
// LineBounds
// ---------------------------------------------------------------------------

/// The extent of one line: `[start, end)` is the line content, followed by
/// `terminator_len` chars of line ending.
///
/// `end` is the offset a `$` anchor matches: the terminator offset when one
/// exists, otherwise the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineBounds {
    /// Offset of the first char of the line.
    pub start: usize,
    /// Offset just past the last content char (excludes the terminator).
    pub end: usize,
    /// Length of the line terminator in chars: 0, 1 (`\n`, `\r`) or 2 (`\r\n`).
    pub terminator_len: usize,
}

impl LineBounds {
    /// Number of content chars.
    #[inline]
    #[must_use]
    pub const fn content_len(&self) -> usize {
        self.end - self.start
    }

    /// Offset where the following line would start.
    #[inline]
    #[must_use]
    pub const fn next_start(&self) -> usize {
        self.end + self.terminator_len
    }

    /// True when `offset` lies on this line, terminator included.
    #[inline]
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end + self.terminator_len
    }
}

// ---------------------------------------------------------------------------
// BufferAccessor
// ---------------------------------------------------------------------------

/// Read access to a text snapshot.
///
/// Implementations must stay stable for the duration of one engine call. The
/// engine only ever borrows the accessor shared, so a `&Buffer` held across a
/// call is already a point-in-time snapshot.
pub trait BufferAccessor {
    /// Total number of chars.
    fn len(&self) -> usize;

    /// The char at `offset`, or `None` when `offset >= len()`.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Bounds of the line containing `offset`. Offsets past the end are
    /// clamped to `len()`.
    fn line_bounds(&self, offset: usize) -> LineBounds;

    /// True when the buffer holds no text.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A counter that changes whenever the content changes. `None` means the
    /// accessor cannot tell, and cached results must be recomputed.
    fn revision(&self) -> Option<u64> {
        None
    }

    /// Collect the chars in `range` (clamped to the buffer).
    fn chars_in(&self, range: Range<usize>) -> Vec<char> {
        let end = range.end.min(self.len());
        (range.start.min(end)..end)
            .filter_map(|offset| self.char_at(offset))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Line navigation
// ---------------------------------------------------------------------------

/// The line containing `offset`, clamped to the buffer.
pub(crate) fn line_at<B: BufferAccessor + ?Sized>(buf: &B, offset: usize) -> LineBounds {
    buf.line_bounds(offset.min(buf.len()))
}

/// The first line of the buffer.
pub(crate) fn first_line<B: BufferAccessor + ?Sized>(buf: &B) -> LineBounds {
    buf.line_bounds(0)
}

/// The last real line of the buffer. An empty line starting at `len` after a
/// terminator is not a line in Vim's model.
pub(crate) fn last_line<B: BufferAccessor + ?Sized>(buf: &B) -> LineBounds {
    let len = buf.len();
    let bounds = buf.line_bounds(len);
    if bounds.start == len && len > 0 {
        buf.line_bounds(len - 1)
    } else {
        bounds
    }
}

/// The line after `line`, if any.
pub(crate) fn next_line<B: BufferAccessor + ?Sized>(buf: &B, line: LineBounds) -> Option<LineBounds> {
    if line.terminator_len == 0 {
        return None;
    }
    let start = line.next_start();
    if start >= buf.len() {
        return None;
    }
    Some(buf.line_bounds(start))
}

/// The line before `line`, if any.
pub(crate) fn prev_line<B: BufferAccessor + ?Sized>(buf: &B, line: LineBounds) -> Option<LineBounds> {
    if line.start == 0 {
        return None;
    }
    Some(buf.line_bounds(line.start - 1))
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// Source of buffer revisions. Revisions are unique across all buffers, so a
/// cache keyed on one can never confuse two different buffers.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// A text buffer backed by a rope.
///
/// Each edit takes a fresh revision so that derived data (the hlsearch
/// index) can tell a changed buffer from an unchanged one without comparing
/// text. Cloning is O(1) thanks to the rope's structural sharing, which makes
/// [`snapshot`](Self::snapshot) cheap enough to take before every search when
/// another thread keeps editing.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    revision: u64,
}

impl Buffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            revision: next_revision(),
        }
    }

    /// Create a buffer from a string.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            revision: next_revision(),
        }
    }

    /// Wrap an existing rope.
    #[must_use]
    pub fn from_rope(rope: Rope) -> Self {
        Self {
            rope,
            revision: next_revision(),
        }
    }

    /// The underlying rope.
    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// An independent copy of the current content and revision.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Number of lines, counted the Vim way (no phantom line after a trailing
    /// terminator). An empty buffer has one line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        let lines = self.rope.len_lines();
        let len = self.rope.len_chars();
        if len > 0 && self.rope.line_to_char(lines - 1) == len {
            lines - 1
        } else {
            lines
        }
    }

    /// Collect all text into a `String`.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    // -- Editing ------------------------------------------------------------

    /// Insert text at a char offset.
    ///
    /// # Panics
    ///
    /// Panics if `offset > len()`.
    pub fn insert(&mut self, offset: usize, text: &str) {
        self.rope.insert(offset, text);
        self.revision = next_revision();
    }

    /// Delete the chars in `range`. An empty range is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn delete(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        self.rope.remove(range);
        self.revision = next_revision();
    }

    /// Replace the chars in `range` with `text` as one revision.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let start = range.start;
        self.rope.remove(range);
        self.rope.insert(start, text);
        self.revision = next_revision();
    }
}

impl BufferAccessor for Buffer {
    #[inline]
    fn len(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    fn line_bounds(&self, offset: usize) -> LineBounds {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        let start = self.rope.line_to_char(line);
        let slice = self.rope.line(line);
        let terminator_len = terminator_len(slice);
        LineBounds {
            start,
            end: start + slice.len_chars() - terminator_len,
            terminator_len,
        }
    }

    #[inline]
    fn revision(&self) -> Option<u64> {
        Some(self.revision)
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.rope.len_chars())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

/// Length of the line ending at the end of a rope line.
fn terminator_len(line: RopeSlice<'_>) -> usize {
    let total = line.len_chars();
    if total == 0 {
        return 0;
    }
    match line.char(total - 1) {
        '\n' if total >= 2 && line.char(total - 2) == '\r' => 2,
        '\n' | '\r' => 1,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
