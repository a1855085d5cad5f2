//! Error types.
//!
//! Two layers: [`PatternError`] for malformed patterns (reported by the
//! compiler before any scanning happens) and [`SearchError`] for everything a
//! search command can fail with. "Pattern not found" is not an error at all;
//! it is [`SearchResult::NotFound`](crate::scanner::SearchResult::NotFound).
//!
//! Messages follow Vim's wording and `E` numbers where Vim has one, so a host
//! can show them in the status line as-is.

use thiserror::Error;

/// A specialized `Result` for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// A pattern that failed to compile. `position` fields are char indices into
/// the raw pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern string was empty. Callers may fall back to the last used
    /// pattern for this kind only.
    #[error("E35: No previous regular expression")]
    Empty,

    /// A `[` without its closing `]`.
    #[error("E769: Missing ] after [ at position {position}")]
    UnmatchedBracket { position: usize },

    /// A `[z-a]` style range.
    #[error("E944: Reverse range in character class at position {position}")]
    ReverseRange { position: usize },

    /// A `\(` without its closing `\)`.
    #[error("E54: Unmatched \\(")]
    UnmatchedOpenGroup,

    /// A `\)` without an opening `\(`.
    #[error("E55: Unmatched \\)")]
    UnmatchedCloseGroup,

    /// The pattern ends in a lone backslash.
    #[error("E10: \\ should be followed by /, ? or &")]
    TrailingBackslash,

    /// A quantifier directly after another quantifier, e.g. `a**`.
    #[error("E61: Nested quantifier at position {position}")]
    NestedQuantifier { position: usize },

    /// A quantifier with nothing to repeat, e.g. `\+abc`.
    #[error("E64: Quantifier follows nothing at position {position}")]
    QuantifierFollowsNothing { position: usize },

    /// A malformed `\{n,m}` interval.
    #[error("E554: Syntax error in \\{{...}} at position {position}")]
    InvalidInterval { position: usize },

    /// A valid Vim item this engine does not implement.
    #[error("E867: Unsupported pattern item {item} at position {position}")]
    Unsupported { item: String, position: usize },
}

impl PatternError {
    /// True for the empty-pattern kind, the only one that allows falling back
    /// to the last used pattern.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Everything a search command can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The pattern did not compile. No state was recorded.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// `n`, `N` or an empty pattern with no successful search before it.
    #[error("E35: No previous regular expression")]
    NoPreviousSearch,

    /// A search offset that is not `[+-]N`, `e`, `s` or `b` with an optional
    /// signed count.
    #[error("E474: Invalid search offset: {0}")]
    InvalidOffset(String),

    /// A `:set` name that is not a search option.
    #[error("E518: Unknown option: {0}")]
    UnknownOption(String),

    /// A value assigned to a boolean option, e.g. `:set hlsearch=1`.
    #[error("E474: Invalid argument: {name}={value}")]
    InvalidOptionValue { name: String, value: String },

    /// `*` or `#` with no word on or after the cursor.
    #[error("E348: No string under cursor")]
    NoStringUnderCursor,
}
