use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::input::Position;

/// What a failed rule was looking for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expected {
    /// A literal string.
    Literal(String),
    /// A regular expression, by its source text.
    Pattern(String),
    /// A name attached with [`label`](crate::label).
    Label(String),
    EndOfInput,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(s) => write!(f, "`{}`", s.escape_debug()),
            Expected::Pattern(p) => write!(f, "pattern /{}/", p),
            Expected::Label(name) => f.write_str(name),
            Expected::EndOfInput => f.write_str("end of input"),
        }
    }
}

/// The ordinary outcome of a rule that did not match.
///
/// Carries the offset where matching stopped and what would have been
/// accepted there. Not an error: `any`, `many`, `list` and `optional`
/// inspect it to backtrack or stop repeating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFailure {
    pub offset: usize,
    pub expected: Vec<Expected>,
}

impl MatchFailure {
    pub fn new(offset: usize, expected: Expected) -> Self {
        Self {
            offset,
            expected: vec![expected],
        }
    }

    /// A failure with no expectation attached.
    pub fn at(offset: usize) -> Self {
        Self {
            offset,
            expected: Vec::new(),
        }
    }

    /// Combine two failures, keeping the one that got further.
    ///
    /// Failures at the same offset pool their expectations.
    pub fn merge(mut self, other: MatchFailure) -> MatchFailure {
        if other.offset > self.offset {
            return other;
        }
        if other.offset == self.offset {
            for expected in other.expected {
                if !self.expected.contains(&expected) {
                    self.expected.push(expected);
                }
            }
        }
        self
    }

    /// Pool the expectations of `other` into this failure, keeping this
    /// failure's offset.
    pub fn absorb(&mut self, other: MatchFailure) {
        for expected in other.expected {
            if !self.expected.contains(&expected) {
                self.expected.push(expected);
            }
        }
    }
}

impl fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expected(f, &self.expected)?;
        write!(f, " at byte {}", self.offset)
    }
}

fn write_expected(f: &mut fmt::Formatter<'_>, expected: &[Expected]) -> fmt::Result {
    match expected {
        [] => f.write_str("no match"),
        [only] => write!(f, "expected {}", only),
        [init @ .., last] => {
            f.write_str("expected ")?;
            for (i, e) in init.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", e)?;
            }
            write!(f, " or {}", last)
        }
    }
}

/// Categories of [`Fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// A `process` transform returned an error.
    Transform,
    /// A named reference was invoked with nothing bound to it.
    UnboundRule,
    /// Nesting went deeper than [`Limits::max_depth`](crate::Limits).
    DepthLimit,
    /// The parse made more rule applications than
    /// [`Limits::max_steps`](crate::Limits).
    StepLimit,
}

/// A condition that aborts the parse outright.
///
/// Faults travel on the `Err` side of a [`Step`](crate::Step) and pass
/// through every combinator untouched. A transform fault in particular is
/// a defect in the grammar, not unmatched input, so `any` never treats it
/// as a reason to try the next alternative.
#[derive(Debug, Clone)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
    /// Byte offset where the faulting rule started.
    pub offset: usize,
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            offset,
            source: None,
        }
    }

    /// A transform failure wrapping the transform's own error.
    pub fn transform(error: Box<dyn Error + Send + Sync>, offset: usize) -> Self {
        Self {
            kind: FaultKind::Transform,
            message: format!("transform failed: {}", error),
            offset,
            source: Some(Arc::from(error)),
        }
    }

    pub fn unbound(name: &str, offset: usize) -> Self {
        Self::new(
            FaultKind::UnboundRule,
            format!("rule `{}` is not defined", name),
            offset,
        )
    }

    pub fn depth_limit(max: usize, offset: usize) -> Self {
        Self::new(
            FaultKind::DepthLimit,
            format!("nesting depth limit of {} exceeded", max),
            offset,
        )
    }

    pub fn step_limit(max: usize, offset: usize) -> Self {
        Self::new(
            FaultKind::StepLimit,
            format!("step limit of {} exceeded", max),
            offset,
        )
    }

    /// True for faults caused by the grammar author's code.
    pub fn is_grammar_fault(&self) -> bool {
        matches!(self.kind, FaultKind::Transform | FaultKind::UnboundRule)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

/// Why a top-level parse did not produce a value.
#[derive(Debug, Clone)]
pub enum ParseError {
    /// The grammar did not match the input.
    Mismatch {
        position: Position,
        expected: Vec<Expected>,
        /// A short excerpt of the text at `position`, `None` at end of input.
        found: Option<String>,
    },
    /// The grammar matched a prefix but input remained.
    Incomplete { position: Position },
    /// The parse was aborted.
    Fault { position: Position, fault: Fault },
}

impl ParseError {
    const EXCERPT_CHARS: usize = 16;

    /// Report a failure that reached the top of the parse.
    pub fn mismatch(source: &str, failure: MatchFailure) -> Self {
        let position = Position::locate(source, failure.offset);
        let found = excerpt(&source[position.offset..], Self::EXCERPT_CHARS);
        ParseError::Mismatch {
            position,
            expected: failure.expected,
            found,
        }
    }

    pub fn incomplete(source: &str, offset: usize) -> Self {
        ParseError::Incomplete {
            position: Position::locate(source, offset),
        }
    }

    pub fn fault(source: &str, fault: Fault) -> Self {
        ParseError::Fault {
            position: Position::locate(source, fault.offset),
            fault,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::Mismatch { position, .. }
            | ParseError::Incomplete { position }
            | ParseError::Fault { position, .. } => *position,
        }
    }

    /// The fault behind this error, if the parse was aborted.
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            ParseError::Fault { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

fn excerpt(rest: &str, max_chars: usize) -> Option<String> {
    if rest.is_empty() {
        return None;
    }
    let line = rest.split('\n').next().unwrap_or(rest);
    let mut out: String = line.chars().take(max_chars).collect();
    if out.len() < line.len() {
        out.push_str("...");
    }
    if out.is_empty() {
        out.push_str("\\n");
    }
    Some(out)
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Mismatch {
                position,
                expected,
                found,
            } => {
                write_expected(f, expected)?;
                match found {
                    Some(text) => write!(f, ", found `{}`", text)?,
                    None => f.write_str(", found end of input")?,
                }
                write!(f, " at {}", position)
            }
            ParseError::Incomplete { position } => {
                write!(f, "unconsumed input at {}", position)
            }
            ParseError::Fault { position, fault } => {
                write!(f, "{} at {}", fault.message, position)
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Fault { fault, .. } => Some(fault),
            _ => None,
        }
    }
}
