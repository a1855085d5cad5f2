//! Search offsets — where the cursor lands relative to a match.
//!
//! Vim lets a search command carry an offset after the closing delimiter:
//!
//! | Offset       | Lands on                                   |
//! |--------------|--------------------------------------------|
//! | (none)       | match start                                |
//! | `[+-]N`, `+` | first column, N lines below / above        |
//! | `e[+-N]`     | last char of the match, N chars right/left |
//! | `s[+-N]`, `b[+-N]` | match start, N chars right/left      |

use std::fmt;
use std::str::FromStr;

use crate::buffer::{line_at, next_line, prev_line, BufferAccessor};
use crate::error::SearchError;
use crate::scanner::Hit;

/// A parsed search offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOffset {
    #[default]
    None,
    /// Whole lines below (positive) or above (negative) the match.
    Lines(i64),
    /// Chars relative to the match start.
    Start(i64),
    /// Chars relative to the last char of the match.
    End(i64),
}

impl SearchOffset {
    /// Parse Vim offset syntax. An empty string is [`SearchOffset::None`].
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidOffset`] for anything else that is not an
    /// offset.
    pub fn parse(text: &str) -> Result<Self, SearchError> {
        let invalid = || SearchError::InvalidOffset(text.to_string());

        let Some(first) = text.chars().next() else {
            return Ok(Self::None);
        };
        let (kind, rest): (fn(i64) -> Self, &str) = match first {
            'e' => (Self::End, &text[1..]),
            's' | 'b' => (Self::Start, &text[1..]),
            '+' | '-' | '0'..='9' => (Self::Lines, text),
            _ => return Err(invalid()),
        };

        // A bare `e` or `s` is that kind with an amount of 0.
        let amount = parse_signed(rest).ok_or_else(invalid)?;
        Ok(kind(amount))
    }

    /// True when the offset leaves the cursor on the match start.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None | Self::Start(0))
    }

    /// The landing offset for `hit`, clamped to `0..=buf.len()`.
    #[must_use]
    pub fn apply<B: BufferAccessor + ?Sized>(self, hit: &Hit, buf: &B) -> usize {
        let len = buf.len();
        match self {
            Self::None => hit.start.min(len),
            Self::Start(n) => shift(hit.start, n, len),
            Self::End(n) => {
                let last = if hit.is_empty() { hit.start } else { hit.end - 1 };
                shift(last, n, len)
            }
            Self::Lines(n) => move_lines(buf, hit.start, n),
        }
    }
}

impl FromStr for SearchOffset {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SearchOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::None => Ok(()),
            Self::Lines(n) => write!(f, "{n:+}"),
            Self::Start(0) => f.write_str("s"),
            Self::Start(n) => write!(f, "s{n:+}"),
            Self::End(0) => f.write_str("e"),
            Self::End(n) => write!(f, "e{n:+}"),
        }
    }
}

/// `""` is 0, `+` / `-` alone are ±1, otherwise an optionally signed integer.
fn parse_signed(text: &str) -> Option<i64> {
    match text {
        "" => Some(0),
        "+" => Some(1),
        "-" => Some(-1),
        _ => {
            let digits = text.strip_prefix('+').unwrap_or(text);
            if digits.starts_with('+') {
                return None;
            }
            digits.parse().ok()
        }
    }
}

fn shift(offset: usize, by: i64, len: usize) -> usize {
    let moved = if by.is_negative() {
        offset.saturating_sub(usize::try_from(by.unsigned_abs()).unwrap_or(usize::MAX))
    } else {
        offset.saturating_add(usize::try_from(by).unwrap_or(usize::MAX))
    };
    moved.min(len)
}

/// Start of the line `n` lines away from the one containing `offset`,
/// stopping at the first or last line.
fn move_lines<B: BufferAccessor + ?Sized>(buf: &B, offset: usize, n: i64) -> usize {
    let mut line = line_at(buf, offset);
    for _ in 0..n.unsigned_abs() {
        let step = if n > 0 {
            next_line(buf, line)
        } else {
            prev_line(buf, line)
        };
        match step {
            Some(next) => line = next,
            None => break,
        }
    }
    line.start
}
