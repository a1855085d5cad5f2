//! Backtracking matcher for compiled patterns.
//!
//! A [`Node`] tree is lowered once into a flat [`Program`]. Matching runs the
//! program over one line's chars with an explicit failure stack, so a long
//! repeat costs heap entries rather than native stack frames; a match can
//! never include a line terminator. Trying the preferred path first and
//! resuming from the most recent failure point gives Vim's leftmost,
//! first-alternative-wins semantics with greedy and lazy repeats.
//!
//! Each attempt has a backtrack budget: [`MAX_FAILURES`], raised to
//! [`FAILURES_PER_CHAR`] per char on long lines. Once it is spent the attempt
//! reports no match at that column. That bounds nested quantifiers like
//! `\(a*\)*b`, which would otherwise backtrack exponentially.

use log::trace;

use crate::pattern::{CharClass, Node};
use crate::word::is_keyword;

/// Backtracks allowed per attempt before giving up on the column.
const MAX_FAILURES: usize = 40_000;

/// Backtracks allowed per char of the line when that exceeds
/// [`MAX_FAILURES`].
const FAILURES_PER_CHAR: usize = 4;

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

/// A node that consumes exactly one char.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Single {
    Char(char),
    Any,
    Class(CharClass),
}

/// A zero-width position test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    LineStart,
    LineEnd,
    WordStart,
    WordEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Inst {
    /// Consume one char.
    One(Single),
    /// Repeat of a one-char node: measure the run once, then try lengths.
    Run {
        item: Single,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    },
    Assert(Anchor),
    /// Continue with the next instruction; on failure resume at `alt`.
    Split { alt: usize },
    Jump(usize),
    /// Zero the iteration counter of a general repeat.
    Reset { counter: usize },
    /// Head of a general repeat: run the body at `pc + 1` or leave to `exit`.
    Loop {
        counter: usize,
        mark: usize,
        min: usize,
        max: Option<usize>,
        greedy: bool,
        exit: usize,
    },
    /// End of a repeat body: count the iteration and go back to `head`.
    Next {
        counter: usize,
        mark: usize,
        min: usize,
        head: usize,
    },
    Match,
}

/// A pattern lowered to instructions for the backtracking machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Program {
    insts: Vec<Inst>,
    /// Counter and mark slots used by general repeats.
    slots: usize,
}

impl Program {
    pub(crate) fn new(root: &Node) -> Self {
        let mut lowering = Lowering::default();
        lowering.node(root);
        lowering.push(Inst::Match);
        Self {
            insts: lowering.insts,
            slots: lowering.slots,
        }
    }

    /// Match at `pos` in `line`. Returns the end of the match.
    pub(crate) fn match_at(&self, line: &[char], pos: usize, ignore_case: bool) -> Option<usize> {
        if pos > line.len() {
            return None;
        }
        Machine {
            program: self,
            line,
            ignore_case,
            slots: vec![0; self.slots],
            stack: Vec::new(),
            budget: MAX_FAILURES.max(line.len().saturating_mul(FAILURES_PER_CHAR)),
        }
        .run(pos)
    }
}

#[derive(Default)]
struct Lowering {
    insts: Vec<Inst>,
    slots: usize,
}

impl Lowering {
    fn push(&mut self, inst: Inst) -> usize {
        self.insts.push(inst);
        self.insts.len() - 1
    }

    fn slot(&mut self) -> usize {
        self.slots += 1;
        self.slots - 1
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Literal(_) | Node::AnyChar | Node::Class(_) => {
                if let Some(item) = single(node) {
                    self.push(Inst::One(item));
                }
            }
            Node::LineStart => {
                self.push(Inst::Assert(Anchor::LineStart));
            }
            Node::LineEnd => {
                self.push(Inst::Assert(Anchor::LineEnd));
            }
            Node::WordStart => {
                self.push(Inst::Assert(Anchor::WordStart));
            }
            Node::WordEnd => {
                self.push(Inst::Assert(Anchor::WordEnd));
            }
            Node::Group(inner) => self.node(inner),
            Node::Concat(items) => items.iter().for_each(|item| self.node(item)),
            Node::Alternation(branches) => self.alternation(branches),
            Node::Repeat {
                node,
                min,
                max,
                greedy,
            } => self.repeat(node, *min as usize, max.map(|max| max as usize), *greedy),
        }
    }

    fn alternation(&mut self, branches: &[Node]) {
        let Some((last, rest)) = branches.split_last() else {
            return;
        };
        let mut jumps = Vec::with_capacity(rest.len());
        for branch in rest {
            let split = self.push(Inst::Split { alt: 0 });
            self.node(branch);
            jumps.push(self.push(Inst::Jump(0)));
            let alt = self.insts.len();
            self.insts[split] = Inst::Split { alt };
        }
        self.node(last);
        let end = self.insts.len();
        for jump in jumps {
            self.insts[jump] = Inst::Jump(end);
        }
    }

    fn repeat(&mut self, node: &Node, min: usize, max: Option<usize>, greedy: bool) {
        if let Some(item) = single(node) {
            self.push(Inst::Run {
                item,
                min,
                max,
                greedy,
            });
            return;
        }

        let counter = self.slot();
        let mark = self.slot();
        self.push(Inst::Reset { counter });
        let head = self.push(Inst::Loop {
            counter,
            mark,
            min,
            max,
            greedy,
            exit: 0,
        });
        self.node(node);
        self.push(Inst::Next {
            counter,
            mark,
            min,
            head,
        });
        let end = self.insts.len();
        if let Inst::Loop { exit, .. } = &mut self.insts[head] {
            *exit = end;
        }
    }
}

fn single(node: &Node) -> Option<Single> {
    match node {
        Node::Literal(ch) => Some(Single::Char(*ch)),
        Node::AnyChar => Some(Single::Any),
        Node::Class(class) => Some(Single::Class(class.clone())),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// An entry on the failure stack.
enum Frame {
    /// Resume at `pc` with the input at `pos`.
    Resume { pc: usize, pos: usize },
    /// Untried run lengths `lo..=hi` of a [`Inst::Run`] starting at `base`;
    /// `pc` follows the run.
    Run {
        pc: usize,
        base: usize,
        lo: usize,
        hi: usize,
        greedy: bool,
    },
    /// Undo a slot write.
    Restore { slot: usize, value: usize },
}

struct Machine<'a> {
    program: &'a Program,
    line: &'a [char],
    ignore_case: bool,
    slots: Vec<usize>,
    stack: Vec<Frame>,
    /// Backtracks left.
    budget: usize,
}

impl Machine<'_> {
    fn run(&mut self, start: usize) -> Option<usize> {
        let program = self.program;
        let mut pc = 0;
        let mut pos = start;

        loop {
            let advanced = match &program.insts[pc] {
                Inst::Match => return Some(pos),
                Inst::One(item) => self.single(item, pos).map(|end| (pc + 1, end)),
                Inst::Run {
                    item,
                    min,
                    max,
                    greedy,
                } => self.start_run(item, *min, *max, *greedy, pc + 1, pos),
                Inst::Assert(anchor) => self.holds(*anchor, pos).then_some((pc + 1, pos)),
                Inst::Split { alt } => {
                    self.stack.push(Frame::Resume { pc: *alt, pos });
                    Some((pc + 1, pos))
                }
                Inst::Jump(target) => Some((*target, pos)),
                Inst::Reset { counter } => {
                    self.set(*counter, 0);
                    Some((pc + 1, pos))
                }
                Inst::Loop {
                    counter,
                    mark,
                    min,
                    max,
                    greedy,
                    exit,
                } => {
                    let count = self.slots[*counter];
                    let can_stop = count >= *min;
                    let can_continue = max.is_none_or(|max| count < max);
                    match (can_continue, can_stop) {
                        (false, false) => None,
                        (false, true) => Some((*exit, pos)),
                        (true, false) => {
                            self.set(*mark, pos);
                            Some((pc + 1, pos))
                        }
                        (true, true) if *greedy => {
                            self.stack.push(Frame::Resume { pc: *exit, pos });
                            self.set(*mark, pos);
                            Some((pc + 1, pos))
                        }
                        (true, true) => {
                            self.set(*mark, pos);
                            self.stack.push(Frame::Resume { pc: pc + 1, pos });
                            Some((*exit, pos))
                        }
                    }
                }
                Inst::Next {
                    counter,
                    mark,
                    min,
                    head,
                } => {
                    let count = self.slots[*counter];
                    // An empty iteration past the minimum would loop forever.
                    if pos == self.slots[*mark] && count >= *min {
                        None
                    } else {
                        self.set(*counter, count + 1);
                        Some((*head, pos))
                    }
                }
            };

            (pc, pos) = match advanced {
                Some(next) => next,
                None => self.backtrack()?,
            };
        }
    }

    /// Measure the run at `pos` and take the preferred length, leaving the
    /// others on the failure stack.
    fn start_run(
        &mut self,
        item: &Single,
        min: usize,
        max: Option<usize>,
        greedy: bool,
        pc: usize,
        pos: usize,
    ) -> Option<(usize, usize)> {
        let limit = max.unwrap_or(usize::MAX);
        let mut run = 0;
        while run < limit && self.single(item, pos + run).is_some() {
            run += 1;
        }
        if run < min {
            return None;
        }

        let taken = if greedy { run } else { min };
        if run > min {
            let (lo, hi) = if greedy { (min, run - 1) } else { (min + 1, run) };
            self.stack.push(Frame::Run {
                pc,
                base: pos,
                lo,
                hi,
                greedy,
            });
        }
        Some((pc, pos + taken))
    }

    /// Pop to the most recent failure point, undoing slot writes on the way.
    /// `None` when there is none left or the budget is spent.
    fn backtrack(&mut self) -> Option<(usize, usize)> {
        loop {
            match self.stack.pop()? {
                Frame::Restore { slot, value } => self.slots[slot] = value,
                Frame::Resume { pc, pos } => {
                    self.spend()?;
                    return Some((pc, pos));
                }
                Frame::Run {
                    pc,
                    base,
                    lo,
                    hi,
                    greedy,
                } => {
                    self.spend()?;
                    let taken = if greedy { hi } else { lo };
                    if lo < hi {
                        let (lo, hi) = if greedy { (lo, hi - 1) } else { (lo + 1, hi) };
                        self.stack.push(Frame::Run {
                            pc,
                            base,
                            lo,
                            hi,
                            greedy,
                        });
                    }
                    return Some((pc, base + taken));
                }
            }
        }
    }

    fn spend(&mut self) -> Option<()> {
        if self.budget == 0 {
            trace!("match abandoned: backtrack budget spent");
            self.stack.clear();
            return None;
        }
        self.budget -= 1;
        Some(())
    }

    fn set(&mut self, slot: usize, value: usize) {
        let old = std::mem::replace(&mut self.slots[slot], value);
        self.stack.push(Frame::Restore { slot, value: old });
    }

    fn single(&self, item: &Single, pos: usize) -> Option<usize> {
        let &ch = self.line.get(pos)?;
        let matched = match item {
            Single::Char(want) => *want == ch || (self.ignore_case && fold(*want) == fold(ch)),
            Single::Any => true,
            Single::Class(class) => class.matches(ch, self.ignore_case),
        };
        matched.then_some(pos + 1)
    }

    fn holds(&self, anchor: Anchor, pos: usize) -> bool {
        match anchor {
            Anchor::LineStart => pos == 0,
            Anchor::LineEnd => pos == self.line.len(),
            Anchor::WordStart => {
                self.is_keyword_at(pos) && (pos == 0 || !self.is_keyword_at(pos - 1))
            }
            Anchor::WordEnd => {
                pos > 0 && self.is_keyword_at(pos - 1) && !self.is_keyword_at(pos)
            }
        }
    }

    fn is_keyword_at(&self, pos: usize) -> bool {
        self.line.get(pos).is_some_and(|&ch| is_keyword(ch))
    }
}

/// Simple case fold: the first char of the lowercase mapping.
fn fold(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
