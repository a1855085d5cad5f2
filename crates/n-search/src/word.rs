//! Word classification and the word-under-cursor lookup behind `*` and `#`.
//!
//! A **word** is a run of keyword characters (letters, digits, underscore) or
//! a run of other non-blank characters (punctuation). The same
//! classification drives the `\<` and `\>` pattern anchors.

use crate::buffer::{line_at, BufferAccessor};

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters (operators, brackets, etc.).
    Punctuation,
    /// Whitespace within a line (space, tab).
    Blank,
    /// Line ending (`\n`, `\r`).
    Newline,
}

/// Classify a character.
pub(crate) fn classify(ch: char) -> CharClass {
    if ch == '\n' || ch == '\r' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if is_keyword(ch) {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// True for keyword characters, the ones `\<`, `\>` and `\w`-style words are
/// made of.
#[inline]
pub(crate) fn is_keyword(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

// ---------------------------------------------------------------------------
// Word under cursor
// ---------------------------------------------------------------------------

/// A word found in the buffer: `[start, end)` plus its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// True when the word is made of keyword characters, false for a run of
    /// punctuation.
    pub is_keyword: bool,
}

/// The word under the cursor, or the first one after it on the same line.
///
/// Keyword runs win over punctuation runs: when the cursor sits on
/// punctuation and a keyword follows later on the line, the keyword is
/// returned. Punctuation is only used when no keyword follows. Returns `None`
/// for blank lines and lines with nothing but whitespace after the cursor.
#[must_use]
pub fn word_under_cursor<B: BufferAccessor + ?Sized>(buf: &B, cursor: usize) -> Option<Word> {
    let line = line_at(buf, cursor);
    let chars = buf.chars_in(line.start..line.end);
    let col = cursor.saturating_sub(line.start).min(chars.len());

    let rest = chars.get(col..)?;
    let found = rest
        .iter()
        .position(|&ch| classify(ch) == CharClass::Word)
        .or_else(|| {
            rest.iter()
                .position(|&ch| classify(ch) == CharClass::Punctuation)
        })?;

    let anchor = col + found;
    let class = classify(chars[anchor]);
    let mut start = anchor;
    while start > 0 && classify(chars[start - 1]) == class {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < chars.len() && classify(chars[end]) == class {
        end += 1;
    }

    Some(Word {
        start: line.start + start,
        end: line.start + end,
        text: chars[start..end].iter().collect(),
        is_keyword: class == CharClass::Word,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
