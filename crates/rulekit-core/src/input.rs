//! Immutable cursor over the source text.
//!
//! An [`Input`] is a `Copy` value: advancing produces a new input and
//! leaves the original untouched, so any combinator can rewind simply by
//! reusing the input it was handed.

use std::cell::{Cell, RefCell};
use std::fmt;

use memchr::{memchr_iter, memrchr};

use crate::config::Limits;
use crate::error::{Fault, MatchFailure};
use crate::span::Span;

/// Human-facing location of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

impl Position {
    /// Resolve `offset` against `source`.
    ///
    /// Uses `memchr` for newline scanning. `offset` must sit on a char
    /// boundary, which every match boundary does.
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source.as_bytes()[..offset];
        let line = memchr_iter(b'\n', before).count() + 1;
        let line_start = memrchr(b'\n', before).map_or(0, |i| i + 1);
        let column = source[line_start..offset].chars().count() + 1;
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Per-parse bookkeeping: depth and step accounting, plus the furthest
/// failure seen so far.
///
/// Lives on the stack of the top-level invocation and is reached through
/// every [`Input`] derived from it. Never shared between parses.
#[derive(Debug)]
pub struct Budget {
    limits: Limits,
    depth: Cell<usize>,
    steps: Cell<usize>,
    furthest: RefCell<Option<MatchFailure>>,
}

impl Budget {
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            depth: Cell::new(0),
            steps: Cell::new(0),
            furthest: RefCell::new(None),
        }
    }

    /// The failure that got furthest into the input, even if some
    /// enclosing `many` or `optional` recovered from it.
    pub fn furthest_failure(&self) -> Option<MatchFailure> {
        self.furthest.borrow().clone()
    }

    pub(crate) fn record_failure(&self, failure: &MatchFailure) {
        let mut furthest = self.furthest.borrow_mut();
        match furthest.as_ref() {
            Some(current) if current.offset > failure.offset => {}
            Some(current) if current.offset == failure.offset => {
                let merged = current.clone().merge(failure.clone());
                *furthest = Some(merged);
            }
            _ => *furthest = Some(failure.clone()),
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Rule applications made so far.
    pub fn steps(&self) -> usize {
        self.steps.get()
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Charge one rule application. The returned guard releases the depth
    /// slot when dropped.
    pub(crate) fn enter(&self, offset: usize) -> Result<DepthGuard<'_>, Fault> {
        let steps = self.steps.get() + 1;
        if let Some(max) = self.limits.max_steps {
            if steps > max {
                return Err(Fault::step_limit(max, offset));
            }
        }
        self.steps.set(steps);

        let depth = self.depth.get() + 1;
        if let Some(max) = self.limits.max_depth {
            if depth > max {
                return Err(Fault::depth_limit(max, offset));
            }
        }
        self.depth.set(depth);
        Ok(DepthGuard { budget: self })
    }
}

pub(crate) struct DepthGuard<'b> {
    budget: &'b Budget,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.budget.depth.set(self.budget.depth.get() - 1);
    }
}

/// A position in the source text handed to a rule.
#[derive(Clone, Copy)]
pub struct Input<'a> {
    source: &'a str,
    offset: usize,
    budget: &'a Budget,
}

impl<'a> Input<'a> {
    /// Create an input positioned at the start of `source`.
    pub fn new(source: &'a str, budget: &'a Budget) -> Self {
        Self {
            source,
            offset: 0,
            budget,
        }
    }

    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The complete source text, independent of the cursor.
    #[inline(always)]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Text from the cursor to the end of the source.
    #[inline(always)]
    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// A new input `len` bytes further along. `self` is unchanged.
    #[inline]
    pub fn advance(self, len: usize) -> Self {
        Self {
            offset: (self.offset + len).min(self.source.len()),
            ..self
        }
    }

    /// Span from this input's cursor to `later`'s.
    #[inline]
    pub fn span_to(&self, later: &Input<'_>) -> Span {
        Span::new(self.offset, later.offset.max(self.offset))
    }

    pub fn position(&self) -> Position {
        Position::locate(self.source, self.offset)
    }

    pub fn budget(&self) -> &'a Budget {
        self.budget
    }
}

impl fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("offset", &self.offset)
            .field("rest", &self.rest())
            .finish()
    }
}

impl PartialEq for Input<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.source, other.source) && self.offset == other.offset
    }
}
