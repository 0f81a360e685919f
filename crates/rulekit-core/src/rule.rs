//! The rule contract shared by every operator.

use std::fmt;
use std::sync::Arc;

use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input as Haystack};

use crate::config::Limits;
use crate::error::{Expected, Fault, MatchFailure, ParseError};
use crate::input::{Budget, Input};
use crate::span::Span;
use crate::value::Value;

/// A successful match.
#[derive(Debug, Clone)]
pub struct Match<'a> {
    pub value: Value,
    /// The text consumed, as a byte range of the source.
    pub span: Span,
    /// Input positioned just past the match.
    pub rest: Input<'a>,
}

/// Result of applying a rule that was not aborted.
#[derive(Debug, Clone)]
pub enum Outcome<'a> {
    Success(Match<'a>),
    Failure(MatchFailure),
}

impl<'a> Outcome<'a> {
    /// A success that consumed everything between `from` and `to`.
    #[inline]
    pub fn success(value: Value, from: Input<'a>, to: Input<'a>) -> Self {
        Outcome::Success(Match {
            value,
            span: from.span_to(&to),
            rest: to,
        })
    }

    #[inline]
    pub fn failure(offset: usize, expected: Expected) -> Self {
        Outcome::Failure(MatchFailure::new(offset, expected))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn into_match(self) -> Option<Match<'a>> {
        match self {
            Outcome::Success(m) => Some(m),
            Outcome::Failure(_) => None,
        }
    }
}

/// What every rule returns: an outcome, or a fault that aborts the parse.
pub type Step<'a> = Result<Outcome<'a>, Fault>;

type RuleFn = dyn for<'a> Fn(Input<'a>) -> Step<'a> + Send + Sync;

/// A parsing function from an [`Input`] to a [`Step`].
///
/// Rules are immutable values, cheap to clone, and safe to share between
/// threads. Operators take rules and return new ones.
#[derive(Clone)]
pub struct Rule {
    inner: Arc<RuleFn>,
}

impl Rule {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(Input<'a>) -> Step<'a> + Send + Sync + 'static,
    {
        Rule { inner: Arc::new(f) }
    }

    /// Apply this rule at `input`, charging the parse budget.
    ///
    /// Operators invoke sub-rules through here so that depth and step
    /// limits see every application.
    #[inline]
    pub fn apply<'a>(&self, input: Input<'a>) -> Step<'a> {
        let _depth = input.budget().enter(input.offset())?;
        let step = (self.inner)(input);
        if let Ok(Outcome::Failure(failure)) = &step {
            input.budget().record_failure(failure);
        }
        step
    }

    /// Parse a prefix of `text` with default [`Limits`].
    ///
    /// Returns the value and the unconsumed remainder.
    pub fn parse<'t>(&self, text: &'t str) -> Result<(Value, &'t str), ParseError> {
        self.parse_with(text, &Limits::default())
    }

    pub fn parse_with<'t>(
        &self,
        text: &'t str,
        limits: &Limits,
    ) -> Result<(Value, &'t str), ParseError> {
        let (value, offset, _) = self.run(text, limits)?;
        Ok((value, &text[offset..]))
    }

    /// Parse all of `text`. Leftover input is an error.
    pub fn parse_all(&self, text: &str) -> Result<Value, ParseError> {
        self.parse_all_with(text, &Limits::default())
    }

    pub fn parse_all_with(&self, text: &str, limits: &Limits) -> Result<Value, ParseError> {
        let (value, offset, furthest) = self.run(text, limits)?;
        if offset == text.len() {
            return Ok(value);
        }
        // Whatever stopped the match from going on explains the leftovers.
        match furthest {
            Some(failure) if failure.offset >= offset => Err(ParseError::mismatch(text, failure)),
            _ => Err(ParseError::incomplete(text, offset)),
        }
    }

    fn run(
        &self,
        text: &str,
        limits: &Limits,
    ) -> Result<(Value, usize, Option<MatchFailure>), ParseError> {
        let budget = Budget::new(*limits);
        let step = self.apply(Input::new(text, &budget));
        let furthest = budget.furthest_failure();
        match step {
            Ok(Outcome::Success(m)) => Ok((m.value, m.rest.offset(), furthest)),
            Ok(Outcome::Failure(failure)) => {
                let failure = match furthest {
                    Some(deeper) if deeper.offset > failure.offset => deeper,
                    _ => failure,
                };
                Err(ParseError::mismatch(text, failure))
            }
            Err(fault) => Err(ParseError::fault(text, fault)),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({:p})", Arc::as_ptr(&self.inner))
    }
}

/// A bare string stands for a literal token, e.g. as a delimiter.
impl From<&str> for Rule {
    fn from(literal: &str) -> Self {
        crate::combinators::token(literal)
    }
}

impl From<String> for Rule {
    fn from(literal: String) -> Self {
        crate::combinators::token(literal)
    }
}

impl From<Pattern> for Rule {
    fn from(pattern: Pattern) -> Self {
        crate::combinators::token(pattern)
    }
}

/// Error from compiling a [`Pattern::regex`].
pub type PatternError = regex_automata::meta::BuildError;

/// What [`token`](crate::token) matches.
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    /// Anchored at the cursor. Build with [`Pattern::regex`].
    ///
    /// The search sees the whole source, so look-behind assertions such as
    /// `\b` take the text before the cursor into account.
    Regex { source: String, regex: Regex },
}

impl Pattern {
    /// Compile a regular expression matched at the cursor.
    ///
    /// The caller writes the pattern without a leading anchor.
    pub fn regex(source: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(source)?;
        Ok(Pattern::Regex {
            source: source.to_string(),
            regex,
        })
    }

    /// Length in bytes of the match starting exactly at `offset` in `source`.
    #[inline]
    pub fn match_len(&self, source: &str, offset: usize) -> Option<usize> {
        match self {
            Pattern::Literal(lit) => source[offset..]
                .starts_with(lit.as_str())
                .then_some(lit.len()),
            Pattern::Regex { regex, .. } => {
                let search = Haystack::new(source)
                    .range(offset..)
                    .anchored(Anchored::Yes);
                regex.search(&search).map(|m| m.end() - offset)
            }
        }
    }

    pub fn expected(&self) -> Expected {
        match self {
            Pattern::Literal(lit) => Expected::Literal(lit.clone()),
            Pattern::Regex { source, .. } => Expected::Pattern(source.clone()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(literal: &str) -> Self {
        Pattern::Literal(literal.to_string())
    }
}

impl From<String> for Pattern {
    fn from(literal: String) -> Self {
        Pattern::Literal(literal)
    }
}
