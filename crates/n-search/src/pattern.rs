//! Pattern compiler — Vim "magic" syntax to a typed node tree.
//!
//! [`compile`] parses a raw search pattern into a [`Pattern`]: an immutable
//! tree of [`Node`]s plus the resolved case sensitivity. The tree is lowered
//! once into the `matcher` module's program, which does the matching; this
//! module only deals with syntax.
//!
//! # Supported syntax
//!
//! | Item                         | Meaning                                   |
//! |------------------------------|-------------------------------------------|
//! | `x`                          | literal char                              |
//! | `.`                          | any char                                  |
//! | `[abc]` `[^a-z]` `[[:alpha:]]` | bracket class                           |
//! | `^` / `$`                    | line start / line end (position anchors)  |
//! | `\<` / `\>`                  | start / end of word                       |
//! | `*` `\+` `\=` `\?`           | 0+, 1+, 0 or 1                            |
//! | `\{n,m}` `\{-n,m}`           | counted, greedy / lazy                    |
//! | `\(…\)` `\%(…\)` `\|`        | groups and alternation                    |
//! | `\s \d \w \a \l \u \x \o \h` | classes (uppercase escape negates)        |
//! | `\t \e \r`                   | tab, escape, carriage return              |
//! | `\c` / `\C`                  | ignore / match case, anywhere in pattern  |
//!
//! `^` is only an anchor at the start of a branch and `$` only at the end of
//! one; elsewhere they are literal, as in Vim. `*` at the start of a branch is
//! literal too. `~` is literal (there is no substitute string to insert).

use crate::error::PatternError;
use crate::matcher::Program;
use crate::options::SearchOptions;

// ---------------------------------------------------------------------------
// Node tree
// ---------------------------------------------------------------------------

/// One element of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single literal char.
    Literal(char),
    /// `.` — any char on the line.
    AnyChar,
    /// A bracket class or class escape.
    Class(CharClass),
    /// `^` — the position at the start of a line.
    LineStart,
    /// `$` — the position at the end of a line's content.
    LineEnd,
    /// `\<` — the position before the first char of a word.
    WordStart,
    /// `\>` — the position after the last char of a word.
    WordEnd,
    /// `\(…\)` or `\%(…\)`.
    Group(Box<Node>),
    /// Nodes matched one after the other.
    Concat(Vec<Node>),
    /// `a\|b` — the first branch that leads to a match wins.
    Alternation(Vec<Node>),
    /// A quantified node. `max: None` is unbounded.
    Repeat {
        node: Box<Node>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
}

/// A set of chars: `[…]` or an escape like `\d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    pub negated: bool,
    pub items: Vec<ClassItem>,
}

/// One member of a [`CharClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
    Named(NamedClass),
}

/// Predefined classes. The escape forms follow Vim and are ASCII-only; the
/// `[:name:]` forms map onto the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedClass {
    /// `\s`, `[:blank:]` — space or tab.
    Blank,
    /// `[:space:]` — any whitespace.
    Space,
    /// `\d`, `[:digit:]`.
    Digit,
    /// `\x`, `[:xdigit:]`.
    HexDigit,
    /// `\o`.
    OctDigit,
    /// `\w` — `[0-9A-Za-z_]`.
    Word,
    /// `\h` — `[A-Za-z_]`.
    WordHead,
    /// `\a`, `[:alpha:]`.
    Alpha,
    /// `[:alnum:]`.
    Alnum,
    /// `\l`, `[:lower:]`.
    Lower,
    /// `\u`, `[:upper:]`.
    Upper,
    /// `[:punct:]`.
    Punct,
    /// `[:cntrl:]`.
    Cntrl,
    /// `[:graph:]`.
    Graph,
    /// `[:print:]`.
    Print,
}

impl NamedClass {
    /// Whether `ch` belongs to the class.
    #[must_use]
    pub fn contains(self, ch: char) -> bool {
        match self {
            Self::Blank => matches!(ch, ' ' | '\t'),
            Self::Space => ch.is_whitespace(),
            Self::Digit => ch.is_ascii_digit(),
            Self::HexDigit => ch.is_ascii_hexdigit(),
            Self::OctDigit => matches!(ch, '0'..='7'),
            Self::Word => ch.is_ascii_alphanumeric() || ch == '_',
            Self::WordHead => ch.is_ascii_alphabetic() || ch == '_',
            Self::Alpha => ch.is_ascii_alphabetic(),
            Self::Alnum => ch.is_ascii_alphanumeric(),
            Self::Lower => ch.is_ascii_lowercase(),
            Self::Upper => ch.is_ascii_uppercase(),
            Self::Punct => ch.is_ascii_punctuation(),
            Self::Cntrl => ch.is_control(),
            Self::Graph => ch.is_ascii_graphic(),
            Self::Print => ch == ' ' || ch.is_ascii_graphic(),
        }
    }

    fn from_posix(name: &str) -> Option<Self> {
        let class = match name {
            "alpha" => Self::Alpha,
            "alnum" => Self::Alnum,
            "blank" => Self::Blank,
            "cntrl" => Self::Cntrl,
            "digit" => Self::Digit,
            "graph" => Self::Graph,
            "lower" => Self::Lower,
            "print" => Self::Print,
            "punct" => Self::Punct,
            "space" => Self::Space,
            "upper" => Self::Upper,
            "xdigit" => Self::HexDigit,
            _ => return None,
        };
        Some(class)
    }
}

impl ClassItem {
    fn contains(self, ch: char) -> bool {
        match self {
            Self::Char(c) => c == ch,
            Self::Range(lo, hi) => (lo..=hi).contains(&ch),
            Self::Named(class) => class.contains(ch),
        }
    }
}

impl CharClass {
    fn named(class: NamedClass, negated: bool) -> Self {
        Self {
            negated,
            items: vec![ClassItem::Named(class)],
        }
    }

    /// Whether `ch` is in the class. With `ignore_case`, any case variant of
    /// `ch` being a member is enough.
    #[must_use]
    pub fn matches(&self, ch: char, ignore_case: bool) -> bool {
        let member = |c: char| self.items.iter().any(|item| item.contains(c));
        let hit = if ignore_case {
            std::iter::once(ch)
                .chain(ch.to_lowercase())
                .chain(ch.to_uppercase())
                .any(member)
        } else {
            member(ch)
        };
        hit != self.negated
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A compiled search pattern. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    root: Node,
    program: Program,
    ignore_case: bool,
}

impl Pattern {
    /// The raw pattern this was compiled from.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The root of the node tree.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Whether letters match regardless of case.
    #[inline]
    #[must_use]
    pub const fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Try to match at `pos` within one line's content.
    ///
    /// `line` excludes the terminator; `pos` may equal `line.len()` (the
    /// end-of-line position). Returns the end of the match, which equals
    /// `pos` for zero-width matches like `$`. An attempt that backtracks too
    /// often is abandoned and reports no match.
    #[must_use]
    pub fn match_at(&self, line: &[char], pos: usize) -> Option<usize> {
        self.program.match_at(line, pos, self.ignore_case)
    }
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

/// Compile a raw Vim pattern.
///
/// Pure: the result depends only on `raw` and the `ignorecase` / `smartcase`
/// values in `options`.
///
/// # Errors
///
/// [`PatternError::Empty`] for an empty string, another [`PatternError`] kind
/// for malformed syntax.
pub fn compile(raw: &str, options: &SearchOptions) -> Result<Pattern, PatternError> {
    if raw.is_empty() {
        return Err(PatternError::Empty);
    }

    let mut parser = Parser::new(raw);
    let root = parser.parse_alternation()?;
    if parser.pos < parser.chars.len() {
        // Only a stray `\)` stops the top-level alternation early.
        return Err(PatternError::UnmatchedCloseGroup);
    }

    let ignore_case = parser
        .case_override
        .unwrap_or_else(|| options.ignores_case(parser.has_upper));

    Ok(Pattern {
        source: raw.to_string(),
        program: Program::new(&root),
        root,
        ignore_case,
    })
}

/// Recursive-descent parser over the pattern's chars.
struct Parser {
    chars: Vec<char>,
    pos: usize,
    /// Open `\(` groups around the current position.
    depth: usize,
    /// `Some(true)` after `\c`, `Some(false)` after `\C`.
    case_override: Option<bool>,
    /// An uppercase letter appeared as a literal (drives smartcase).
    has_upper: bool,
}

/// A parsed quantifier.
struct Quantifier {
    min: u32,
    max: Option<u32>,
    greedy: bool,
}

impl Parser {
    fn new(raw: &str) -> Self {
        Self {
            chars: raw.chars().collect(),
            pos: 0,
            depth: 0,
            case_override: None,
            has_upper: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// True when the input at `pos` is `\` followed by `ch`.
    fn at_escape(&self, pos: usize, ch: char) -> bool {
        self.chars.get(pos) == Some(&'\\') && self.chars.get(pos + 1) == Some(&ch)
    }

    /// True when a branch ends at `pos`: end of input, `\|` or `\)`.
    fn branch_ends_at(&self, pos: usize) -> bool {
        pos >= self.chars.len() || self.at_escape(pos, '|') || self.at_escape(pos, ')')
    }

    fn literal(&mut self, ch: char) -> Node {
        if ch.is_uppercase() {
            self.has_upper = true;
        }
        Node::Literal(ch)
    }

    // -- Structure ----------------------------------------------------------

    fn parse_alternation(&mut self) -> Result<Node, PatternError> {
        let mut branches = vec![self.parse_branch()?];
        while self.at_escape(self.pos, '|') {
            self.pos += 2;
            branches.push(self.parse_branch()?);
        }
        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            Node::Alternation(branches)
        })
    }

    fn parse_branch(&mut self) -> Result<Node, PatternError> {
        let mut items: Vec<Node> = Vec::new();
        loop {
            if self.pos >= self.chars.len() || self.at_escape(self.pos, '|') {
                break;
            }
            if self.at_escape(self.pos, ')') {
                if self.depth == 0 {
                    return Err(PatternError::UnmatchedCloseGroup);
                }
                break;
            }

            let at_start = items.is_empty() || items == [Node::LineStart];
            let Some(atom) = self.parse_atom(at_start, items.is_empty())? else {
                continue;
            };
            // A leading `^` never takes a quantifier; `^*` is a literal star.
            let atom = if atom == Node::LineStart {
                atom
            } else {
                self.parse_quantified(atom)?
            };
            items.push(atom);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Node::Concat(items)
        })
    }

    // -- Atoms --------------------------------------------------------------

    /// Parse one atom. `None` for items that only set flags (`\c`, `\C`,
    /// `\m`).
    fn parse_atom(&mut self, at_start: bool, first: bool) -> Result<Option<Node>, PatternError> {
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        self.pos += 1;

        let node = match ch {
            '^' if first => Node::LineStart,
            '$' if self.branch_ends_at(self.pos) => Node::LineEnd,
            '.' => Node::AnyChar,
            '[' => self.parse_bracket(start)?,
            '*' if at_start => Node::Literal('*'),
            '*' => return Err(PatternError::QuantifierFollowsNothing { position: start }),
            '\\' => return self.parse_escape(start),
            c => self.literal(c),
        };
        Ok(Some(node))
    }

    fn parse_escape(&mut self, start: usize) -> Result<Option<Node>, PatternError> {
        let Some(ch) = self.peek() else {
            return Err(PatternError::TrailingBackslash);
        };
        self.pos += 1;

        let class = |named: NamedClass, negated: bool| -> Result<Option<Node>, PatternError> {
            Ok(Some(Node::Class(CharClass::named(named, negated))))
        };
        match ch {
            '(' => self.parse_group(),
            '%' if self.peek() == Some('(') => {
                self.pos += 1;
                self.parse_group()
            }
            '<' => Ok(Some(Node::WordStart)),
            '>' => Ok(Some(Node::WordEnd)),
            'c' => {
                self.case_override = Some(true);
                Ok(None)
            }
            'C' => {
                self.case_override = Some(false);
                Ok(None)
            }
            'm' => Ok(None),
            's' => class(NamedClass::Blank, false),
            'S' => class(NamedClass::Blank, true),
            'd' => class(NamedClass::Digit, false),
            'D' => class(NamedClass::Digit, true),
            'w' => class(NamedClass::Word, false),
            'W' => class(NamedClass::Word, true),
            'a' => class(NamedClass::Alpha, false),
            'A' => class(NamedClass::Alpha, true),
            'l' => class(NamedClass::Lower, false),
            'L' => class(NamedClass::Lower, true),
            'u' => class(NamedClass::Upper, false),
            'U' => class(NamedClass::Upper, true),
            'x' => class(NamedClass::HexDigit, false),
            'X' => class(NamedClass::HexDigit, true),
            'o' => class(NamedClass::OctDigit, false),
            'O' => class(NamedClass::OctDigit, true),
            'h' => class(NamedClass::WordHead, false),
            'H' => class(NamedClass::WordHead, true),
            't' => Ok(Some(Node::Literal('\t'))),
            'e' => Ok(Some(Node::Literal('\u{1b}'))),
            'r' => Ok(Some(Node::Literal('\r'))),
            '+' | '=' | '?' | '{' => Err(PatternError::QuantifierFollowsNothing { position: start }),
            'n' | 'v' | 'V' | 'M' | 'z' | '_' | '%' | '@' | '&' | '1'..='9' | 'b' | 'f' | 'F'
            | 'i' | 'I' | 'k' | 'K' | 'p' | 'P' => {
                Err(PatternError::Unsupported {
                    item: format!("\\{ch}"),
                    position: start,
                })
            }
            c => Ok(Some(self.literal(c))),
        }
    }

    /// Parse the inside of a group; the opening `\(` is already consumed.
    fn parse_group(&mut self) -> Result<Option<Node>, PatternError> {
        self.depth += 1;
        let inner = self.parse_alternation()?;
        if !self.at_escape(self.pos, ')') {
            return Err(PatternError::UnmatchedOpenGroup);
        }
        self.pos += 2;
        self.depth -= 1;
        Ok(Some(Node::Group(Box::new(inner))))
    }

    /// Parse a bracket class; `start` is the position of the `[`.
    fn parse_bracket(&mut self, start: usize) -> Result<Node, PatternError> {
        let unmatched = PatternError::UnmatchedBracket { position: start };
        let mut class = CharClass {
            negated: false,
            items: Vec::new(),
        };

        if self.peek() == Some('^') {
            class.negated = true;
            self.pos += 1;
        }
        // A `]` right after the opening (or after `^`) is a literal member.
        if self.peek() == Some(']') {
            class.items.push(ClassItem::Char(']'));
            self.pos += 1;
        }

        loop {
            let item_start = self.pos;
            let ch = self.peek().ok_or_else(|| unmatched.clone())?;
            self.pos += 1;

            let lo = match ch {
                ']' => break,
                '[' if self.peek() == Some(':') => {
                    if let Some(named) = self.parse_posix_class() {
                        class.items.push(ClassItem::Named(named));
                        continue;
                    }
                    '['
                }
                '\\' => self.bracket_escape(),
                c => c,
            };

            // `a-z`, unless the `-` is the last member.
            if self.peek() == Some('-') && self.peek_at(1).is_some_and(|c| c != ']') {
                self.pos += 1;
                let hi = match self.peek().ok_or_else(|| unmatched.clone())? {
                    '\\' => {
                        self.pos += 1;
                        self.bracket_escape()
                    }
                    c => {
                        self.pos += 1;
                        c
                    }
                };
                if lo > hi {
                    return Err(PatternError::ReverseRange {
                        position: item_start,
                    });
                }
                if hi.is_uppercase() || lo.is_uppercase() {
                    self.has_upper = true;
                }
                class.items.push(ClassItem::Range(lo, hi));
            } else {
                if lo.is_uppercase() {
                    self.has_upper = true;
                }
                class.items.push(ClassItem::Char(lo));
            }
        }

        Ok(Node::Class(class))
    }

    /// The char after a `\` inside brackets. Unknown escapes keep the
    /// backslash itself as a member, as Vim does.
    fn bracket_escape(&mut self) -> char {
        let mapped = match self.peek() {
            Some('e') => '\u{1b}',
            Some('t') => '\t',
            Some('r') => '\r',
            Some(c @ ('\\' | ']' | '^' | '-')) => c,
            _ => return '\\',
        };
        self.pos += 1;
        mapped
    }

    /// Parse `[:name:]` with the leading `[` consumed and `pos` on the `:`.
    /// Leaves `pos` untouched when the text is not a known class.
    fn parse_posix_class(&mut self) -> Option<NamedClass> {
        let rest = &self.chars[self.pos + 1..];
        let close = rest.windows(2).position(|w| w == [':', ']'])?;
        let name: String = rest[..close].iter().collect();
        let named = NamedClass::from_posix(&name)?;
        self.pos += 1 + close + 2;
        Some(named)
    }

    // -- Quantifiers --------------------------------------------------------

    fn parse_quantified(&mut self, atom: Node) -> Result<Node, PatternError> {
        let Some(quantifier) = self.parse_quantifier()? else {
            return Ok(atom);
        };
        let position = self.pos;
        if self.parse_quantifier()?.is_some() {
            return Err(PatternError::NestedQuantifier { position });
        }
        Ok(Node::Repeat {
            node: Box::new(atom),
            min: quantifier.min,
            max: quantifier.max,
            greedy: quantifier.greedy,
        })
    }

    fn parse_quantifier(&mut self) -> Result<Option<Quantifier>, PatternError> {
        let (min, max) = match (self.peek(), self.peek_at(1)) {
            (Some('*'), _) => {
                self.pos += 1;
                (0, None)
            }
            (Some('\\'), Some('+')) => {
                self.pos += 2;
                (1, None)
            }
            (Some('\\'), Some('=' | '?')) => {
                self.pos += 2;
                (0, Some(1))
            }
            (Some('\\'), Some('{')) => {
                self.pos += 2;
                return self.parse_interval().map(Some);
            }
            _ => return Ok(None),
        };
        Ok(Some(Quantifier {
            min,
            max,
            greedy: true,
        }))
    }

    /// Parse the body of `\{…}` after the opening `\{`.
    fn parse_interval(&mut self) -> Result<Quantifier, PatternError> {
        let position = self.pos - 2;
        let invalid = PatternError::InvalidInterval { position };

        let greedy = if self.peek() == Some('-') {
            self.pos += 1;
            false
        } else {
            true
        };
        let first = self.parse_number(&invalid)?;
        let (min, max) = if self.peek() == Some(',') {
            self.pos += 1;
            let second = self.parse_number(&invalid)?;
            (first.unwrap_or(0), second)
        } else {
            // `\{n}` is exactly n; `\{}` is the same as `*`.
            (first.unwrap_or(0), first)
        };

        // Vim accepts `}` and `\}` as the closing brace.
        if self.peek() == Some('\\') {
            self.pos += 1;
        }
        if self.peek() != Some('}') {
            return Err(invalid);
        }
        self.pos += 1;

        let (min, max) = match max {
            Some(max) if max < min => (max, Some(min)),
            other => (min, other),
        };
        Ok(Quantifier { min, max, greedy })
    }

    fn parse_number(&mut self, invalid: &PatternError) -> Result<Option<u32>, PatternError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Ok(None);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().map(Some).map_err(|_| invalid.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root(raw: &str) -> Node {
        compile(raw, &SearchOptions::default()).unwrap().root
    }

    fn err(raw: &str) -> PatternError {
        compile(raw, &SearchOptions::default()).unwrap_err()
    }

    fn lits(s: &str) -> Vec<Node> {
        s.chars().map(Node::Literal).collect()
    }

    // -- Literals and anchors -----------------------------------------------

    #[test]
    fn single_literal() {
        assert_eq!(root("w"), Node::Literal('w'));
    }

    #[test]
    fn literal_run() {
        assert_eq!(root("abc"), Node::Concat(lits("abc")));
    }

    #[test]
    fn dollar_alone_is_anchor() {
        assert_eq!(root("$"), Node::LineEnd);
    }

    #[test]
    fn dollar_in_middle_is_literal() {
        assert_eq!(root("a$b"), Node::Concat(lits("a$b")));
    }

    #[test]
    fn dollar_before_alternation_is_anchor() {
        assert_eq!(
            root("a$\\|b"),
            Node::Alternation(vec![
                Node::Concat(vec![Node::Literal('a'), Node::LineEnd]),
                Node::Literal('b'),
            ])
        );
    }

    #[test]
    fn caret_at_start_is_anchor() {
        assert_eq!(
            root("^ab"),
            Node::Concat(vec![Node::LineStart, Node::Literal('a'), Node::Literal('b')])
        );
    }

    #[test]
    fn caret_in_middle_is_literal() {
        assert_eq!(root("a^"), Node::Concat(lits("a^")));
    }

    #[test]
    fn caret_after_group_open_is_anchor() {
        assert_eq!(root("\\(^a\\)"), Node::Group(Box::new(Node::Concat(vec![
            Node::LineStart,
            Node::Literal('a'),
        ]))));
    }

    #[test]
    fn escaped_specials_are_literal() {
        assert_eq!(root("\\.\\*\\$\\^\\[\\/\\\\"), Node::Concat(lits(".*$^[/\\")));
    }

    #[test]
    fn tilde_is_literal() {
        assert_eq!(root("~"), Node::Literal('~'));
    }

    #[test]
    fn word_boundaries() {
        assert_eq!(
            root("\\<a\\>"),
            Node::Concat(vec![Node::WordStart, Node::Literal('a'), Node::WordEnd])
        );
    }

    // -- Quantifiers ----------------------------------------------------------

    #[test]
    fn star() {
        assert_eq!(
            root("a*"),
            Node::Repeat {
                node: Box::new(Node::Literal('a')),
                min: 0,
                max: None,
                greedy: true,
            }
        );
    }

    #[test]
    fn leading_star_is_literal() {
        assert_eq!(root("*a"), Node::Concat(lits("*a")));
        assert_eq!(
            root("^*"),
            Node::Concat(vec![Node::LineStart, Node::Literal('*')])
        );
    }

    #[test]
    fn plus_and_optional() {
        let Node::Repeat { min, max, .. } = root("a\\+") else {
            panic!("expected repeat");
        };
        assert_eq!((min, max), (1, None));
        let Node::Repeat { min, max, .. } = root("a\\=") else {
            panic!("expected repeat");
        };
        assert_eq!((min, max), (0, Some(1)));
        let Node::Repeat { min, max, .. } = root("a\\?") else {
            panic!("expected repeat");
        };
        assert_eq!((min, max), (0, Some(1)));
    }

    #[test]
    fn intervals() {
        let cases = [
            ("a\\{2,3}", 2, Some(3), true),
            ("a\\{2}", 2, Some(2), true),
            ("a\\{2,}", 2, None, true),
            ("a\\{,4}", 0, Some(4), true),
            ("a\\{}", 0, None, true),
            ("a\\{-1,}", 1, None, false),
            ("a\\{-}", 0, None, false),
            ("a\\{3,1\\}", 1, Some(3), true),
        ];
        for (raw, want_min, want_max, want_greedy) in cases {
            let Node::Repeat { min, max, greedy, .. } = root(raw) else {
                panic!("expected repeat for {raw}");
            };
            assert_eq!((min, max, greedy), (want_min, want_max, want_greedy), "{raw}");
        }
    }

    #[test]
    fn invalid_interval() {
        assert_eq!(err("a\\{x}"), PatternError::InvalidInterval { position: 1 });
        assert_eq!(err("a\\{1"), PatternError::InvalidInterval { position: 1 });
    }

    #[test]
    fn nested_quantifier() {
        assert!(matches!(err("a**"), PatternError::NestedQuantifier { .. }));
        assert!(matches!(err("a*\\+"), PatternError::NestedQuantifier { .. }));
    }

    #[test]
    fn quantifier_follows_nothing() {
        assert_eq!(
            err("\\+a"),
            PatternError::QuantifierFollowsNothing { position: 0 }
        );
        assert_eq!(
            err("a\\|\\{2}"),
            PatternError::QuantifierFollowsNothing { position: 3 }
        );
    }

    // -- Groups -------------------------------------------------------------

    #[test]
    fn group_with_alternation() {
        assert_eq!(
            root("\\(ab\\|c\\)d"),
            Node::Concat(vec![
                Node::Group(Box::new(Node::Alternation(vec![
                    Node::Concat(lits("ab")),
                    Node::Literal('c'),
                ]))),
                Node::Literal('d'),
            ])
        );
    }

    #[test]
    fn non_capturing_group() {
        assert_eq!(root("\\%(a\\)"), Node::Group(Box::new(Node::Literal('a'))));
    }

    #[test]
    fn unmatched_groups() {
        assert_eq!(err("\\(ab"), PatternError::UnmatchedOpenGroup);
        assert_eq!(err("ab\\)"), PatternError::UnmatchedCloseGroup);
    }

    // -- Brackets -------------------------------------------------------------

    #[test]
    fn bracket_members() {
        assert_eq!(
            root("[a-c_]"),
            Node::Class(CharClass {
                negated: false,
                items: vec![ClassItem::Range('a', 'c'), ClassItem::Char('_')],
            })
        );
    }

    #[test]
    fn bracket_negated_with_literal_close() {
        assert_eq!(
            root("[^]x]"),
            Node::Class(CharClass {
                negated: true,
                items: vec![ClassItem::Char(']'), ClassItem::Char('x')],
            })
        );
    }

    #[test]
    fn bracket_trailing_dash() {
        assert_eq!(
            root("[a-]"),
            Node::Class(CharClass {
                negated: false,
                items: vec![ClassItem::Char('a'), ClassItem::Char('-')],
            })
        );
    }

    #[test]
    fn bracket_posix_class() {
        assert_eq!(
            root("[[:digit:]x]"),
            Node::Class(CharClass {
                negated: false,
                items: vec![
                    ClassItem::Named(NamedClass::Digit),
                    ClassItem::Char('x'),
                ],
            })
        );
    }

    #[test]
    fn bracket_escapes() {
        assert_eq!(
            root("[\\]\\t]"),
            Node::Class(CharClass {
                negated: false,
                items: vec![ClassItem::Char(']'), ClassItem::Char('\t')],
            })
        );
    }

    #[test]
    fn unbalanced_bracket() {
        assert_eq!(err("ab[cd"), PatternError::UnmatchedBracket { position: 2 });
        assert_eq!(err("["), PatternError::UnmatchedBracket { position: 0 });
    }

    #[test]
    fn lone_close_bracket_is_literal() {
        assert_eq!(root("a]"), Node::Concat(lits("a]")));
    }

    #[test]
    fn reverse_range() {
        assert_eq!(err("[z-a]"), PatternError::ReverseRange { position: 1 });
    }

    // -- Errors and flags -----------------------------------------------------

    #[test]
    fn empty_is_its_own_kind() {
        assert_eq!(err(""), PatternError::Empty);
    }

    #[test]
    fn trailing_backslash() {
        assert_eq!(err("ab\\"), PatternError::TrailingBackslash);
    }

    #[test]
    fn unsupported_items() {
        assert_eq!(
            err("a\\nb"),
            PatternError::Unsupported {
                item: "\\n".into(),
                position: 1,
            }
        );
        assert!(matches!(err("\\vfoo"), PatternError::Unsupported { .. }));
        assert!(matches!(err("\\(a\\)\\1"), PatternError::Unsupported { .. }));
    }

    #[test]
    fn case_flags_produce_no_node() {
        assert_eq!(root("\\ca"), Node::Literal('a'));
        assert_eq!(root("a\\mb"), Node::Concat(lits("ab")));
    }

    // -- Case resolution ------------------------------------------------------

    #[test]
    fn case_resolution() {
        let plain = SearchOptions::default();
        let ic = SearchOptions {
            ignorecase: true,
            ..plain
        };
        let scs = SearchOptions {
            ignorecase: true,
            smartcase: true,
            ..plain
        };

        assert!(!compile("foo", &plain).unwrap().ignore_case());
        assert!(compile("foo", &ic).unwrap().ignore_case());
        assert!(compile("Foo", &ic).unwrap().ignore_case());
        assert!(compile("foo", &scs).unwrap().ignore_case());
        assert!(!compile("Foo", &scs).unwrap().ignore_case());
    }

    #[test]
    fn case_flags_override_options() {
        let plain = SearchOptions::default();
        let scs = SearchOptions {
            ignorecase: true,
            smartcase: true,
            ..plain
        };
        assert!(compile("foo\\c", &plain).unwrap().ignore_case());
        assert!(compile("Foo\\c", &scs).unwrap().ignore_case());
        assert!(!compile("\\Cfoo", &scs).unwrap().ignore_case());
    }

    #[test]
    fn escape_letters_do_not_trigger_smartcase() {
        let scs = SearchOptions {
            ignorecase: true,
            smartcase: true,
            ..SearchOptions::default()
        };
        assert!(compile("\\S\\+", &scs).unwrap().ignore_case());
        assert!(!compile("[A-Z]", &scs).unwrap().ignore_case());
    }

    #[test]
    fn source_is_kept() {
        let p = compile("a\\|b", &SearchOptions::default()).unwrap();
        assert_eq!(p.source(), "a\\|b");
    }
}
