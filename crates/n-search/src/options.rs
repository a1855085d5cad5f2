//! Search options and the `:set` grammar for them.
//!
//! [`SearchOptions`] is the small configuration structure passed explicitly
//! into compile and scan calls; nothing in the engine looks options up
//! globally. Hosts either deserialize it from their settings file or change it
//! at runtime through `:set` directives parsed by [`parse_set`].
//!
//! # Supported syntax
//!
//! | Syntax           | Effect               |
//! |------------------|----------------------|
//! | `:set option`    | Enable               |
//! | `:set nooption`  | Disable              |
//! | `:set option!`   | Toggle               |
//! | `:set invoption` | Toggle               |
//! | `:set option&`   | Reset to default     |
//! | `:set option?`   | Query current value  |
//! | `:set`           | Show changed options |
//! | `:set all`       | Show all options     |
//!
//! # Option names
//!
//! | Full name    | Abbrev | Default |
//! |--------------|--------|---------|
//! | `ignorecase` | `ic`   | false   |
//! | `smartcase`  | `scs`  | false   |
//! | `hlsearch`   | `hls`  | false   |
//! | `incsearch`  | `is`   | true    |
//! | `wrapscan`   | `ws`   | true    |

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

// ---------------------------------------------------------------------------
// SearchOptions
// ---------------------------------------------------------------------------

/// Toggles that shape compiling, scanning and highlighting.
///
/// Read once at the start of each engine call; changes made while a call is
/// running are not observed (the call holds `&SearchOptions`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Match letters regardless of case.
    pub ignorecase: bool,
    /// With `ignorecase`, match case again when the pattern has an uppercase
    /// letter.
    pub smartcase: bool,
    /// Highlight every match of the last search pattern.
    pub hlsearch: bool,
    /// Show the match while the pattern is being typed (see
    /// [`SearchSession::preview`](crate::session::SearchSession::preview)).
    pub incsearch: bool,
    /// Continue past the end (or start) of the buffer.
    pub wrapscan: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignorecase: false,
            smartcase: false,
            hlsearch: false,
            incsearch: true,
            wrapscan: true,
        }
    }
}

/// All options in display order, by full name.
const OPTION_NAMES: [&str; 5] = ["hlsearch", "ignorecase", "incsearch", "smartcase", "wrapscan"];

impl SearchOptions {
    /// Whether a pattern should match case-insensitively under these options.
    ///
    /// `ignorecase` turns case folding on; `smartcase` turns it back off for
    /// patterns that contain an uppercase letter. Explicit `\c` / `\C` in the
    /// pattern take precedence over both and are handled by the compiler.
    #[inline]
    #[must_use]
    pub const fn ignores_case(&self, pattern_has_upper: bool) -> bool {
        self.ignorecase && !(self.smartcase && pattern_has_upper)
    }

    /// Current value of an option, by full name or abbreviation.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        let value = match canonical_name(name)? {
            "ignorecase" => self.ignorecase,
            "smartcase" => self.smartcase,
            "hlsearch" => self.hlsearch,
            "incsearch" => self.incsearch,
            _ => self.wrapscan,
        };
        Some(value)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut bool> {
        let slot = match canonical_name(name)? {
            "ignorecase" => &mut self.ignorecase,
            "smartcase" => &mut self.smartcase,
            "hlsearch" => &mut self.hlsearch,
            "incsearch" => &mut self.incsearch,
            _ => &mut self.wrapscan,
        };
        Some(slot)
    }

    /// Apply one directive.
    ///
    /// Returns the text to show the user for directives that display
    /// something (`?`, bare `:set`, `:set all`), `None` otherwise.
    ///
    /// # Errors
    ///
    /// [`SearchError::UnknownOption`] for names that are not search options,
    /// [`SearchError::InvalidOptionValue`] for `name=value` assignments.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, SearchError> {
        let defaults = Self::default();
        match directive {
            SetDirective::On(name) => *self.require(name)? = true,
            SetDirective::Off(name) => *self.require(name)? = false,
            SetDirective::Toggle(name) => {
                let slot = self.require(name)?;
                *slot = !*slot;
            }
            SetDirective::Reset(name) => {
                let default = defaults
                    .get(name)
                    .ok_or_else(|| SearchError::UnknownOption(name.clone()))?;
                *self.require(name)? = default;
            }
            SetDirective::Query(name) => {
                let full = canonical_name(name)
                    .ok_or_else(|| SearchError::UnknownOption(name.clone()))?;
                return Ok(Some(format_bool(full, self.get(full).unwrap_or_default())));
            }
            SetDirective::Assign(name, value) => {
                return Err(if canonical_name(name).is_some() {
                    SearchError::InvalidOptionValue {
                        name: name.clone(),
                        value: value.clone(),
                    }
                } else {
                    SearchError::UnknownOption(name.clone())
                });
            }
            SetDirective::ShowChanged => {
                let changed: Vec<String> = OPTION_NAMES
                    .iter()
                    .filter_map(|name| {
                        let value = self.get(name)?;
                        (defaults.get(name) != Some(value)).then(|| format_bool(name, value))
                    })
                    .collect();
                return Ok(Some(changed.join("  ")));
            }
            SetDirective::ShowAll => {
                let all: Vec<String> = OPTION_NAMES
                    .iter()
                    .filter_map(|name| self.get(name).map(|value| format_bool(name, value)))
                    .collect();
                return Ok(Some(all.join("  ")));
            }
        }
        Ok(None)
    }

    fn require(&mut self, name: &str) -> Result<&mut bool, SearchError> {
        self.slot_mut(name)
            .ok_or_else(|| SearchError::UnknownOption(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Option names
// ---------------------------------------------------------------------------

/// Map a full name or abbreviation to the full option name.
#[must_use]
pub fn canonical_name(name: &str) -> Option<&'static str> {
    match name {
        "ignorecase" | "ic" => Some("ignorecase"),
        "smartcase" | "scs" => Some("smartcase"),
        "hlsearch" | "hls" => Some("hlsearch"),
        "incsearch" | "is" => Some("incsearch"),
        "wrapscan" | "ws" => Some("wrapscan"),
        _ => None,
    }
}

/// Returns `true` if `name` is a search option (full name or abbreviation).
#[must_use]
pub fn is_search_option(name: &str) -> bool {
    canonical_name(name).is_some()
}

// ---------------------------------------------------------------------------
// :set parsing
// ---------------------------------------------------------------------------

/// A parsed `:set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `:set option` — enable.
    On(String),

    /// `:set nooption` — disable.
    Off(String),

    /// `:set option!` or `:set invoption` — toggle.
    Toggle(String),

    /// `:set option&` — back to the default value.
    Reset(String),

    /// `:set option?` — query the current value.
    Query(String),

    /// `:set option=value` — only meaningful for non-boolean options, so
    /// always rejected when applied to search options.
    Assign(String, String),

    /// `:set` with no arguments — show changed options.
    ShowChanged,

    /// `:set all` — show all options.
    ShowAll,
}

/// Parse the full `:set` arguments string into directives.
///
/// Multiple space-separated arguments are supported
/// (e.g. `:set hlsearch noignorecase`). An empty argument string produces
/// [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `:set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('&') {
        return SetDirective::Reset(name.to_string());
    }

    // `no` / `inv` prefixes only count when the remainder is a known option,
    // so a future option that happens to start with "no" still parses.
    if let Some(name) = arg.strip_prefix("no") {
        if is_search_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    if let Some(name) = arg.strip_prefix("inv") {
        if is_search_option(name) {
            return SetDirective::Toggle(name.to_string());
        }
    }

    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display: `"name"` when on, `"noname"` when
/// off.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Defaults ─────────────────────────────────────────────────────────

    #[test]
    fn vim_defaults() {
        let opts = SearchOptions::default();
        assert!(!opts.ignorecase);
        assert!(!opts.smartcase);
        assert!(!opts.hlsearch);
        assert!(opts.incsearch);
        assert!(opts.wrapscan);
    }

    // ── Case rules ───────────────────────────────────────────────────────

    #[test]
    fn ignores_case_rules() {
        let mut opts = SearchOptions::default();
        assert!(!opts.ignores_case(false));

        opts.ignorecase = true;
        assert!(opts.ignores_case(false));
        assert!(opts.ignores_case(true));

        opts.smartcase = true;
        assert!(opts.ignores_case(false));
        assert!(!opts.ignores_case(true));
    }

    #[test]
    fn smartcase_alone_does_nothing() {
        let opts = SearchOptions {
            smartcase: true,
            ..SearchOptions::default()
        };
        assert!(!opts.ignores_case(false));
    }

    // ── parse_set_arg ────────────────────────────────────────────────────

    #[test]
    fn parse_on_off_toggle() {
        assert_eq!(parse_set_arg("hlsearch"), SetDirective::On("hlsearch".into()));
        assert_eq!(parse_set_arg("nohls"), SetDirective::Off("hls".into()));
        assert_eq!(parse_set_arg("ic!"), SetDirective::Toggle("ic".into()));
        assert_eq!(parse_set_arg("invws"), SetDirective::Toggle("ws".into()));
        assert_eq!(parse_set_arg("scs&"), SetDirective::Reset("scs".into()));
    }

    #[test]
    fn parse_query_and_assign() {
        assert_eq!(parse_set_arg("ws?"), SetDirective::Query("ws".into()));
        assert_eq!(
            parse_set_arg("hls=1"),
            SetDirective::Assign("hls".into(), "1".into())
        );
        assert_eq!(parse_set_arg("all"), SetDirective::ShowAll);
    }

    #[test]
    fn parse_nois_disables_incsearch() {
        assert_eq!(parse_set_arg("nois"), SetDirective::Off("is".into()));
    }

    #[test]
    fn parse_unknown_no_prefix_stays_on() {
        assert_eq!(parse_set_arg("nofoo"), SetDirective::On("nofoo".into()));
    }

    #[test]
    fn parse_multiple_args() {
        let result = parse_set("hls noic  ws!");
        assert_eq!(
            result,
            vec![
                SetDirective::On("hls".into()),
                SetDirective::Off("ic".into()),
                SetDirective::Toggle("ws".into()),
            ]
        );
        assert_eq!(parse_set("   "), vec![SetDirective::ShowChanged]);
    }

    // ── apply ────────────────────────────────────────────────────────────

    #[test]
    fn apply_changes_values() {
        let mut opts = SearchOptions::default();
        for directive in parse_set("hls ic nows") {
            assert_eq!(opts.apply(&directive), Ok(None));
        }
        assert!(opts.hlsearch);
        assert!(opts.ignorecase);
        assert!(!opts.wrapscan);

        opts.apply(&SetDirective::Toggle("hlsearch".into())).unwrap();
        assert!(!opts.hlsearch);
        opts.apply(&SetDirective::Reset("ws".into())).unwrap();
        assert!(opts.wrapscan);
    }

    #[test]
    fn apply_query_uses_full_name() {
        let mut opts = SearchOptions::default();
        assert_eq!(
            opts.apply(&SetDirective::Query("hls".into())),
            Ok(Some("nohlsearch".into()))
        );
        assert_eq!(
            opts.apply(&SetDirective::Query("ws".into())),
            Ok(Some("wrapscan".into()))
        );
    }

    #[test]
    fn apply_show_changed_and_all() {
        let mut opts = SearchOptions::default();
        assert_eq!(opts.apply(&SetDirective::ShowChanged), Ok(Some(String::new())));
        opts.hlsearch = true;
        opts.wrapscan = false;
        assert_eq!(
            opts.apply(&SetDirective::ShowChanged),
            Ok(Some("hlsearch  nowrapscan".into()))
        );
        assert_eq!(
            opts.apply(&SetDirective::ShowAll),
            Ok(Some("hlsearch  noignorecase  incsearch  nosmartcase  nowrapscan".into()))
        );
    }

    #[test]
    fn apply_rejects_unknown_and_assignments() {
        let mut opts = SearchOptions::default();
        assert_eq!(
            opts.apply(&SetDirective::On("number".into())),
            Err(SearchError::UnknownOption("number".into()))
        );
        assert_eq!(
            opts.apply(&SetDirective::Assign("hls".into(), "1".into())),
            Err(SearchError::InvalidOptionValue {
                name: "hls".into(),
                value: "1".into(),
            })
        );
        assert_eq!(
            opts.apply(&SetDirective::Assign("so".into(), "5".into())),
            Err(SearchError::UnknownOption("so".into()))
        );
        assert_eq!(opts, SearchOptions::default());
    }

    // ── format_bool / names ──────────────────────────────────────────────

    #[test]
    fn format_bool_on_off() {
        assert_eq!(format_bool("hlsearch", true), "hlsearch");
        assert_eq!(format_bool("hlsearch", false), "nohlsearch");
    }

    #[test]
    fn abbreviations() {
        for (abbrev, full) in [
            ("ic", "ignorecase"),
            ("scs", "smartcase"),
            ("hls", "hlsearch"),
            ("is", "incsearch"),
            ("ws", "wrapscan"),
        ] {
            assert_eq!(canonical_name(abbrev), Some(full));
            assert_eq!(canonical_name(full), Some(full));
        }
        assert!(!is_search_option("number"));
    }

    // ── serde ────────────────────────────────────────────────────────────

    #[test]
    fn deserialize_fills_defaults() {
        let opts: SearchOptions = serde_json::from_str(r#"{ "hlsearch": true }"#).unwrap();
        assert_eq!(
            opts,
            SearchOptions {
                hlsearch: true,
                ..SearchOptions::default()
            }
        );
    }

    #[test]
    fn serialize_uses_vim_names() {
        let json = serde_json::to_string(&SearchOptions::default()).unwrap();
        assert!(json.contains(r#""wrapscan":true"#));
        assert!(json.contains(r#""ignorecase":false"#));
    }
}
