//! # n-search — Search engine for n-nvim
//!
//! Vim-compatible `/` and `?` search over a rope buffer:
//!
//! - **[`buffer`]** — `BufferAccessor`, the read-only view the engine scans, and the rope-backed `Buffer`
//! - **[`pattern`]** — compiler from Vim "magic" patterns to an immutable node tree
//! - **`matcher`** — backtracking matcher that runs a pattern on one line
//! - **[`scanner`]** — `find` / `find_hit`: next match from an offset, with count and wraparound
//! - **[`offset`]** — search offsets (`/pat/e+1`, `/pat/+2`)
//! - **[`state`]** — the remembered search that `n` and `N` repeat
//! - **[`highlight`]** — every match of the current pattern for `hlsearch`
//! - **[`session`]** — `SearchSession`, the entry point tying it all together
//! - **[`options`]** — `ignorecase`, `smartcase`, `hlsearch`, `incsearch`, `wrapscan` and `:set`
//! - **[`word`]** — word under the cursor for `*` and `#`
//! - **[`error`]** — `PatternError` and `SearchError`
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod buffer;
pub mod error;
pub mod highlight;
mod matcher;
pub mod offset;
pub mod options;
pub mod pattern;
pub mod scanner;
pub mod session;
pub mod state;
pub mod word;

pub use buffer::{Buffer, BufferAccessor, LineBounds};
pub use error::{PatternError, Result, SearchError};
pub use highlight::{HighlightIndex, MatchRange};
pub use offset::SearchOffset;
pub use options::{SearchOptions, SetDirective};
pub use pattern::{compile, Pattern};
pub use scanner::{find, find_hit, Hit, SearchDirection, SearchResult};
pub use session::SearchSession;
pub use state::{RepeatDirection, SearchRequest, SearchState};
