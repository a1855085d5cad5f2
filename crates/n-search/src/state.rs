//! Search state — what `n` and `N` repeat.
//!
//! Every successful search is recorded: its pattern, direction, offset and
//! where it matched. A failed search records nothing, so `n` still repeats
//! the last search that worked.

use crate::error::SearchError;
use crate::offset::SearchOffset;
use crate::scanner::{Hit, SearchDirection};

// ---------------------------------------------------------------------------
// SearchRequest
// ---------------------------------------------------------------------------

/// One search invocation, built per call and never stored as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub pattern: String,
    pub direction: SearchDirection,
    /// Number of matches to step over; 0 behaves as 1.
    pub count: usize,
    /// Char offset the scan starts from (usually the cursor).
    pub start_offset: usize,
    pub offset: SearchOffset,
}

impl SearchRequest {
    /// A single-step request without an offset.
    #[must_use]
    pub fn new(pattern: impl Into<String>, direction: SearchDirection, start_offset: usize) -> Self {
        Self {
            pattern: pattern.into(),
            direction,
            count: 1,
            start_offset,
            offset: SearchOffset::None,
        }
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: SearchOffset) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_start(mut self, start_offset: usize) -> Self {
        self.start_offset = start_offset;
        self
    }
}

/// Which way `n` / `N` goes relative to the last search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatDirection {
    /// `n`
    SameAsLast,
    /// `N`
    Reversed,
}

// ---------------------------------------------------------------------------
// SearchState
// ---------------------------------------------------------------------------

/// The remembered search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastSearch {
    pub pattern: String,
    pub direction: SearchDirection,
    pub offset: SearchOffset,
    pub count: usize,
    /// The base match, before the offset was applied.
    pub hit: Hit,
    /// Where the cursor was put.
    pub landed: usize,
}

/// Per-session search memory.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    last: Option<LastSearch>,
}

impl SearchState {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Remember a successful search.
    pub fn record(&mut self, request: &SearchRequest, hit: Hit, landed: usize) {
        self.last = Some(LastSearch {
            pattern: request.pattern.clone(),
            direction: request.direction,
            offset: request.offset,
            count: request.count,
            hit,
            landed,
        });
    }

    /// Remember where a repeat (`n` / `N`) went. Pattern, direction and
    /// offset stay as they were: `N` does not flip the remembered direction.
    pub fn record_repeat(&mut self, hit: Hit, landed: usize) {
        if let Some(last) = &mut self.last {
            last.hit = hit;
            last.landed = landed;
        }
    }

    /// The request that repeats the last search.
    ///
    /// It starts at the last base match, not at the offset landing point, so
    /// an offset like `e` does not find the same match again.
    ///
    /// # Errors
    ///
    /// [`SearchError::NoPreviousSearch`] when nothing was recorded.
    pub fn repeat_last(&self, direction: RepeatDirection) -> Result<SearchRequest, SearchError> {
        let last = self.last.as_ref().ok_or(SearchError::NoPreviousSearch)?;
        let direction = match direction {
            RepeatDirection::SameAsLast => last.direction,
            RepeatDirection::Reversed => last.direction.opposite(),
        };
        Ok(SearchRequest::new(last.pattern.clone(), direction, last.hit.start).with_offset(last.offset))
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.last = None;
    }

    #[inline]
    #[must_use]
    pub const fn last(&self) -> Option<&LastSearch> {
        self.last.as_ref()
    }

    /// The last successful pattern.
    #[must_use]
    pub fn last_pattern(&self) -> Option<&str> {
        self.last.as_ref().map(|last| last.pattern.as_str())
    }

    #[must_use]
    pub fn last_direction(&self) -> Option<SearchDirection> {
        self.last.as_ref().map(|last| last.direction)
    }

    #[must_use]
    pub fn last_offset(&self) -> Option<SearchOffset> {
        self.last.as_ref().map(|last| last.offset)
    }

    #[inline]
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.last.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hit(start: usize, end: usize) -> Hit {
        Hit {
            start,
            end,
            wrapped: false,
        }
    }

    #[test]
    fn empty_state_has_nothing_to_repeat() {
        let state = SearchState::new();
        assert!(!state.has_previous());
        assert_eq!(
            state.repeat_last(RepeatDirection::SameAsLast),
            Err(SearchError::NoPreviousSearch)
        );
    }

    #[test]
    fn repeat_uses_recorded_search() {
        let mut state = SearchState::new();
        let request = SearchRequest::new("foo", SearchDirection::Backward, 9)
            .with_count(3)
            .with_offset(SearchOffset::End(1));
        state.record(&request, hit(4, 7), 7);

        let repeat = state.repeat_last(RepeatDirection::SameAsLast).unwrap();
        assert_eq!(
            repeat,
            SearchRequest {
                pattern: "foo".into(),
                direction: SearchDirection::Backward,
                count: 1,
                start_offset: 4,
                offset: SearchOffset::End(1),
            }
        );
        assert_eq!(state.last().map(|l| l.count), Some(3));
    }

    #[test]
    fn reversed_flips_only_the_request() {
        let mut state = SearchState::new();
        state.record(&SearchRequest::new("x", SearchDirection::Forward, 0), hit(2, 3), 2);

        let repeat = state.repeat_last(RepeatDirection::Reversed).unwrap();
        assert_eq!(repeat.direction, SearchDirection::Backward);

        state.record_repeat(hit(0, 1), 0);
        assert_eq!(state.last_direction(), Some(SearchDirection::Forward));
        assert_eq!(state.repeat_last(RepeatDirection::SameAsLast).unwrap().start_offset, 0);
    }

    #[test]
    fn record_replaces_previous() {
        let mut state = SearchState::new();
        state.record(&SearchRequest::new("a", SearchDirection::Forward, 0), hit(1, 2), 1);
        state.record(&SearchRequest::new("b", SearchDirection::Backward, 0), hit(5, 6), 5);
        assert_eq!(state.last_pattern(), Some("b"));
        assert_eq!(state.last_offset(), Some(SearchOffset::None));
    }

    #[test]
    fn record_repeat_without_search_is_ignored() {
        let mut state = SearchState::new();
        state.record_repeat(hit(1, 2), 1);
        assert!(state.last().is_none());
    }

    #[test]
    fn clear_forgets() {
        let mut state = SearchState::new();
        state.record(&SearchRequest::new("a", SearchDirection::Forward, 0), hit(1, 2), 1);
        state.clear();
        assert!(state.last_pattern().is_none());
    }
}
