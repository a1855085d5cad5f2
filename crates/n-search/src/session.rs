//! Search session — the entry point a host editor talks to.
//!
//! A [`SearchSession`] ties the pieces together for one editor window:
//! options, the remembered search, and the highlight index.
//!
//! # Search flow
//!
//! 1. User types `/pattern/e` → [`SearchSession::search_command`]
//!    (or [`SearchSession::search`] with the parts already split)
//! 2. The pattern is compiled; a compile error is returned and nothing is
//!    recorded
//! 3. The scanner finds the match, the offset picks the landing point
//! 4. On success the search is recorded for `n` / `N` and, with `hlsearch`,
//!    the highlight index is rebuilt
//!
//! While the user is still typing, [`SearchSession::preview`] gives the
//! `incsearch` match without touching any state.
//!
//! Every call borrows the buffer for its whole duration, so the buffer it
//! sees cannot change underneath it. Hosts that edit from another thread
//! pass a [`Buffer::snapshot`](crate::buffer::Buffer::snapshot).

use log::debug;

use crate::buffer::BufferAccessor;
use crate::error::{Result, SearchError};
use crate::highlight::{HighlightIndex, MatchRange};
use crate::offset::SearchOffset;
use crate::options::{parse_set, SearchOptions, SetDirective};
use crate::pattern::{compile, Pattern};
use crate::scanner::{find_hit, Hit, SearchDirection, SearchResult};
use crate::state::{RepeatDirection, SearchRequest, SearchState};
use crate::word::word_under_cursor;

/// Chars escaped when a word under the cursor becomes a pattern.
const WORD_ESCAPES: &[char] = &['\\', '/', '.', '*', '$', '^', '~', '['];

/// Per-window search engine state.
#[derive(Debug, Default)]
pub struct SearchSession {
    options: SearchOptions,
    state: SearchState,
    highlight: HighlightIndex,
    /// The pattern being highlighted: the last one that found something.
    current: Option<Pattern>,
    /// Set by `:nohlsearch` until the next search.
    suppressed: bool,
    last_wrapped: bool,
}

impl SearchSession {
    #[must_use]
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    // -- Searching ------------------------------------------------------------

    /// Search for `pattern` from `cursor`.
    ///
    /// An empty `pattern` repeats the last pattern with the given direction
    /// and offset.
    ///
    /// # Errors
    ///
    /// [`SearchError::Pattern`] when the pattern does not compile,
    /// [`SearchError::NoPreviousSearch`] for an empty pattern with nothing to
    /// fall back on. Not finding a match is `Ok(SearchResult::NotFound)`.
    pub fn search<B: BufferAccessor + ?Sized>(
        &mut self,
        buf: &B,
        pattern: &str,
        count: usize,
        direction: SearchDirection,
        offset: SearchOffset,
        cursor: usize,
    ) -> Result<SearchResult> {
        let raw = if pattern.is_empty() {
            self.state
                .last_pattern()
                .ok_or(SearchError::NoPreviousSearch)?
                .to_string()
        } else {
            pattern.to_string()
        };

        let compiled = self.compile(&raw)?;
        let request = SearchRequest::new(raw, direction, cursor)
            .with_count(count)
            .with_offset(offset);
        Ok(self.execute(buf, &request, compiled, false))
    }

    /// Run a command-line search: `/pat`, `/pat/e+1`, `?pat?-2`, `//`, `/`.
    ///
    /// The pattern ends at the first unescaped delimiter. In a `?` search,
    /// `\?` stands for a literal question mark. Without a closing delimiter
    /// there is no offset, except for a lone `/` or `?`, which reuses the
    /// last offset as well as the last pattern. A command without a prefix is
    /// taken as a forward pattern.
    ///
    /// # Errors
    ///
    /// As [`Self::search`], plus [`SearchError::InvalidOffset`].
    pub fn search_command<B: BufferAccessor + ?Sized>(
        &mut self,
        buf: &B,
        command: &str,
        count: usize,
        cursor: usize,
    ) -> Result<SearchResult> {
        let mut chars = command.chars();
        let (direction, body) = match chars.next().and_then(SearchDirection::from_prefix) {
            Some(direction) => (direction, chars.as_str()),
            None => (SearchDirection::Forward, command),
        };

        let (pattern, offset_text) = split_command(body, direction.prefix());
        let offset = match offset_text {
            None if pattern.is_empty() => self.state.last_offset().unwrap_or_default(),
            None => SearchOffset::None,
            Some(text) => SearchOffset::parse(text)?,
        };
        self.search(buf, &pattern, count, direction, offset, cursor)
    }

    /// Repeat the last search (`n` with [`RepeatDirection::SameAsLast`], `N`
    /// with [`RepeatDirection::Reversed`]).
    ///
    /// When the cursor is still where the last search put it, the scan starts
    /// from the base match, so an offset never finds the same match twice.
    /// After the cursor moved, it starts from the cursor.
    ///
    /// # Errors
    ///
    /// [`SearchError::NoPreviousSearch`] when nothing was searched yet.
    pub fn repeat<B: BufferAccessor + ?Sized>(
        &mut self,
        buf: &B,
        direction: RepeatDirection,
        count: usize,
        cursor: usize,
    ) -> Result<SearchResult> {
        let mut request = self.state.repeat_last(direction)?.with_count(count);
        if self.state.last().is_some_and(|last| last.landed != cursor) {
            request = request.with_start(cursor);
        }
        let compiled = self.compile(&request.pattern)?;
        Ok(self.execute(buf, &request, compiled, true))
    }

    /// Search for the word under (or after) the cursor: `*` / `#` with
    /// `whole_word`, `g*` / `g#` without.
    ///
    /// The word is searched literally; `smartcase` does not apply.
    ///
    /// # Errors
    ///
    /// [`SearchError::NoStringUnderCursor`] when the line has no word at or
    /// after the cursor.
    pub fn search_word<B: BufferAccessor + ?Sized>(
        &mut self,
        buf: &B,
        cursor: usize,
        direction: SearchDirection,
        whole_word: bool,
        count: usize,
    ) -> Result<SearchResult> {
        let word = word_under_cursor(buf, cursor).ok_or(SearchError::NoStringUnderCursor)?;

        let mut pattern = escape_literal(&word.text);
        if whole_word && word.is_keyword {
            pattern = format!("\\<{pattern}\\>");
        }
        // `\c` keeps an uppercase word case-insensitive, here and for `n`.
        if self.options.ignorecase && self.options.smartcase && word.text.chars().any(char::is_uppercase) {
            pattern.push_str("\\c");
        }

        self.search(buf, &pattern, count, direction, SearchOffset::None, word.start)
    }

    /// The match an `incsearch` prompt shows while `pattern` is being typed.
    ///
    /// Records nothing. Returns `None` when `incsearch` is off, the pattern is
    /// empty or does not compile yet, or there is no match.
    #[must_use]
    pub fn preview<B: BufferAccessor + ?Sized>(
        &self,
        buf: &B,
        pattern: &str,
        direction: SearchDirection,
        cursor: usize,
    ) -> Option<Hit> {
        if !self.options.incsearch || pattern.is_empty() {
            return None;
        }
        let compiled = compile(pattern, &self.options).ok()?;
        find_hit(&compiled, buf, cursor, direction, 1, self.options.wrapscan)
    }

    // -- Options and highlighting -----------------------------------------------

    /// Apply one `:set` directive. Turning `hlsearch` on highlights the
    /// current pattern again; turning it off clears the highlights. Changing
    /// `ignorecase` or `smartcase` re-resolves the highlighted pattern.
    ///
    /// # Errors
    ///
    /// As [`SearchOptions::apply`].
    pub fn set_option<B: BufferAccessor + ?Sized>(
        &mut self,
        directive: &SetDirective,
        buf: &B,
    ) -> Result<Option<String>> {
        let before = self.options;
        let message = self.options.apply(directive)?;
        if before == self.options {
            return Ok(message);
        }
        debug!("search options changed by {directive:?}");

        let case_changed =
            before.ignorecase != self.options.ignorecase || before.smartcase != self.options.smartcase;
        if case_changed {
            if let Some(current) = &self.current {
                // The source compiled before, so it compiles again.
                if let Ok(recompiled) = compile(current.source(), &self.options) {
                    self.current = Some(recompiled);
                }
            }
        }

        if self.options.hlsearch && !before.hlsearch {
            self.suppressed = false;
        }
        self.refresh(buf);
        Ok(message)
    }

    /// Apply a whole `:set` argument string, stopping at the first error.
    /// Returns the messages of directives that display something.
    ///
    /// # Errors
    ///
    /// As [`Self::set_option`].
    pub fn set<B: BufferAccessor + ?Sized>(&mut self, args: &str, buf: &B) -> Result<Vec<String>> {
        let mut messages = Vec::new();
        for directive in parse_set(args) {
            if let Some(message) = self.set_option(&directive, buf)? {
                messages.push(message);
            }
        }
        Ok(messages)
    }

    /// Tell the session the buffer was edited.
    pub fn buffer_changed<B: BufferAccessor + ?Sized>(&mut self, buf: &B) {
        self.highlight.mark_dirty();
        self.refresh(buf);
    }

    /// `:nohlsearch` — hide the highlights until the next search.
    pub fn no_highlight(&mut self) {
        self.suppressed = true;
        self.highlight.clear();
    }

    /// The ranges to paint. Empty when `hlsearch` is off or after
    /// [`Self::no_highlight`].
    #[must_use]
    pub fn highlights(&self) -> &[MatchRange] {
        if self.options.hlsearch && !self.suppressed {
            self.highlight.ranges()
        } else {
            &[]
        }
    }

    /// The full highlight index, for windowed queries.
    #[inline]
    #[must_use]
    pub const fn highlight_index(&self) -> &HighlightIndex {
        &self.highlight
    }

    /// Whether the last successful search wrapped around the buffer. Hosts
    /// show [`SearchDirection::wrap_message`] when it did.
    #[inline]
    #[must_use]
    pub const fn last_wrapped(&self) -> bool {
        self.last_wrapped
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &SearchOptions {
        &self.options
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    // -- Internals --------------------------------------------------------------

    fn compile(&self, raw: &str) -> Result<Pattern> {
        compile(raw, &self.options).map_err(|err| {
            debug!("pattern {raw:?} rejected: {err}");
            SearchError::from(err)
        })
    }

    fn execute<B: BufferAccessor + ?Sized>(
        &mut self,
        buf: &B,
        request: &SearchRequest,
        pattern: Pattern,
        repeat: bool,
    ) -> SearchResult {
        let found = find_hit(
            &pattern,
            buf,
            request.start_offset,
            request.direction,
            request.count,
            self.options.wrapscan,
        );
        let Some(hit) = found else {
            debug!("pattern not found: {:?}", request.pattern);
            return SearchResult::NotFound;
        };

        let landed = request.offset.apply(&hit, buf);
        if repeat {
            self.state.record_repeat(hit, landed);
        } else {
            self.state.record(request, hit, landed);
        }
        self.last_wrapped = hit.wrapped;
        debug!(
            "{}{} matched {}..{}, cursor to {landed}{}",
            request.direction.prefix(),
            request.pattern,
            hit.start,
            hit.end,
            if hit.wrapped { " (wrapped)" } else { "" }
        );

        self.suppressed = false;
        self.highlight.rebuild(&pattern, buf, &self.options);
        self.current = Some(pattern);
        SearchResult::Found(landed)
    }

    /// Bring the highlight index in line with the options and buffer.
    fn refresh<B: BufferAccessor + ?Sized>(&mut self, buf: &B) {
        match &self.current {
            Some(pattern) if self.options.hlsearch && !self.suppressed => {
                self.highlight.rebuild(pattern, buf, &self.options);
            }
            _ => self.highlight.clear(),
        }
    }
}

/// Split a command body at the first unescaped `delimiter` into the pattern
/// and, when the delimiter is present, the offset text after it.
fn split_command(body: &str, delimiter: char) -> (String, Option<&str>) {
    let mut pattern = String::new();
    let mut chars = body.char_indices();
    while let Some((idx, ch)) = chars.next() {
        if ch == delimiter {
            return (pattern, Some(&body[idx + ch.len_utf8()..]));
        }
        if ch == '\\' {
            match chars.next() {
                // `\?` in a `?` search is a plain `?`.
                Some((_, '?')) if delimiter == '?' => pattern.push('?'),
                Some((_, next)) => {
                    pattern.push('\\');
                    pattern.push(next);
                }
                None => pattern.push('\\'),
            }
            continue;
        }
        pattern.push(ch);
    }
    (pattern, None)
}

/// Escape `text` so it matches literally.
fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if WORD_ESCAPES.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
