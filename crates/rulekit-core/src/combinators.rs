//! The operator set.
//!
//! Every function here takes rules (and plain configuration) and returns a
//! new [`Rule`]. Operators only ever see each other through the rule
//! contract: an [`Outcome`] on success or mismatch, a [`Fault`] to abort.
//!
//! Rewinding is free. An [`Input`](crate::Input) is a `Copy` value, so an
//! operator that wants to retry just reuses the input it was given; a failed
//! sub-rule cannot have consumed anything the caller can observe.

use std::error::Error;

use crate::error::{Expected, Fault, MatchFailure};
use crate::rule::{Outcome, Pattern, PatternError, Rule};
use crate::value::Value;

/// Delimiter used by [`list`] and [`pair`].
pub const DEFAULT_DELIMITER: &str = ",";

/// Collected sequences leave out `Unit` so ignored content disappears.
#[inline]
fn collect(values: &mut Vec<Value>, value: Value) {
    if !value.is_unit() {
        values.push(value);
    }
}

/// Match a literal or pattern at the cursor.
///
/// Yields the matched text. Zero-length matches are allowed.
pub fn token(pattern: impl Into<Pattern>) -> Rule {
    let pattern = pattern.into();
    Rule::new(move |input| {
        match pattern.match_len(input.source(), input.offset()) {
            Some(len) => Ok(Outcome::success(
                Value::Text(input.rest()[..len].to_string()),
                input,
                input.advance(len),
            )),
            None => Ok(Outcome::failure(input.offset(), pattern.expected())),
        }
    })
}

/// [`token`] for a regular expression, anchored at the cursor.
pub fn regex(pattern: &str) -> Result<Rule, PatternError> {
    Ok(token(Pattern::regex(pattern)?))
}

/// Ordered choice: the first alternative that matches wins.
///
/// Each alternative starts from the same input. When all of them fail, the
/// failure sits at that input and expects whatever any alternative
/// expected. Deeper failures still reach the top-level diagnostic through
/// the parse budget.
pub fn any<I>(rules: I) -> Rule
where
    I: IntoIterator<Item = Rule>,
{
    let rules: Vec<Rule> = rules.into_iter().collect();
    Rule::new(move |input| {
        let mut failure = MatchFailure::at(input.offset());
        for rule in &rules {
            match rule.apply(input)? {
                Outcome::Success(m) => return Ok(Outcome::Success(m)),
                Outcome::Failure(f) => failure.absorb(f),
            }
        }
        Ok(Outcome::Failure(failure))
    })
}

/// Match rules one after another, collecting their values in order.
///
/// All or nothing: if any rule fails the whole sequence fails and the
/// caller's input is untouched.
///
/// `Unit` values are left out, and that includes an [`optional`] that did
/// not match. Later values then sit one slot earlier, so translators should
/// match on the shape of the list rather than on fixed indices.
pub fn each<I>(rules: I) -> Rule
where
    I: IntoIterator<Item = Rule>,
{
    let rules: Vec<Rule> = rules.into_iter().collect();
    Rule::new(move |input| {
        let mut values = Vec::with_capacity(rules.len());
        let mut cursor = input;
        for rule in &rules {
            match rule.apply(cursor)? {
                Outcome::Success(m) => {
                    collect(&mut values, m.value);
                    cursor = m.rest;
                }
                Outcome::Failure(f) => return Ok(Outcome::Failure(f)),
            }
        }
        Ok(Outcome::success(Value::List(values), input, cursor))
    })
}

/// Greedy repetition, zero or more times. Never fails.
///
/// Stops at the first iteration that fails or consumes nothing; a
/// zero-width match is not part of the result.
pub fn many(rule: Rule) -> Rule {
    Rule::new(move |input| {
        let mut values = Vec::new();
        let mut cursor = input;
        while let Outcome::Success(m) = rule.apply(cursor)? {
            if m.rest.offset() <= cursor.offset() {
                break;
            }
            collect(&mut values, m.value);
            cursor = m.rest;
        }
        Ok(Outcome::success(Value::List(values), input, cursor))
    })
}

/// `rule ("," rule)*`, no trailing delimiter.
pub fn list(rule: Rule) -> Rule {
    list_with(rule, DEFAULT_DELIMITER, false)
}

/// `rule (delimiter rule)* delimiter?`, yielding only the `rule` values.
///
/// Fails only when the first element is missing. A delimiter with no
/// element after it is consumed when `trailing_allowed`, otherwise it is
/// left for the caller.
pub fn list_with(rule: Rule, delimiter: impl Into<Rule>, trailing_allowed: bool) -> Rule {
    let delimiter = delimiter.into();
    Rule::new(move |input| {
        let first = match rule.apply(input)? {
            Outcome::Success(m) => m,
            Outcome::Failure(f) => return Ok(Outcome::Failure(f)),
        };
        let mut values = Vec::new();
        collect(&mut values, first.value);
        let mut cursor = first.rest;

        loop {
            let after_delimiter = match delimiter.apply(cursor)? {
                Outcome::Success(m) => m.rest,
                Outcome::Failure(_) => break,
            };
            match rule.apply(after_delimiter)? {
                Outcome::Success(m) => {
                    if m.rest.offset() <= cursor.offset() {
                        break;
                    }
                    collect(&mut values, m.value);
                    cursor = m.rest;
                }
                Outcome::Failure(_) => {
                    if trailing_allowed {
                        cursor = after_delimiter;
                    }
                    break;
                }
            }
        }
        Ok(Outcome::success(Value::List(values), input, cursor))
    })
}

/// `left rule right`, yielding only `rule`'s value.
pub fn between(left: impl Into<Rule>, rule: Rule, right: impl Into<Rule>) -> Rule {
    let left = left.into();
    let right = right.into();
    Rule::new(move |input| {
        let opened = match left.apply(input)? {
            Outcome::Success(m) => m.rest,
            Outcome::Failure(f) => return Ok(Outcome::Failure(f)),
        };
        let inner = match rule.apply(opened)? {
            Outcome::Success(m) => m,
            Outcome::Failure(f) => return Ok(Outcome::Failure(f)),
        };
        match right.apply(inner.rest)? {
            Outcome::Success(m) => Ok(Outcome::success(inner.value, input, m.rest)),
            Outcome::Failure(f) => Ok(Outcome::Failure(f)),
        }
    })
}

/// `first "," second`, yielding `[first, second]`.
pub fn pair(first: Rule, second: Rule) -> Rule {
    pair_with(first, second, DEFAULT_DELIMITER)
}

pub fn pair_with(first: Rule, second: Rule, delimiter: impl Into<Rule>) -> Rule {
    let delimiter = delimiter.into();
    Rule::new(move |input| {
        let a = match first.apply(input)? {
            Outcome::Success(m) => m,
            Outcome::Failure(f) => return Ok(Outcome::Failure(f)),
        };
        let after_delimiter = match delimiter.apply(a.rest)? {
            Outcome::Success(m) => m.rest,
            Outcome::Failure(f) => return Ok(Outcome::Failure(f)),
        };
        match second.apply(after_delimiter)? {
            Outcome::Success(b) => Ok(Outcome::success(
                Value::List(vec![a.value, b.value]),
                input,
                b.rest,
            )),
            Outcome::Failure(f) => Ok(Outcome::Failure(f)),
        }
    })
}

/// Pass a successful match's value through `transform`.
///
/// An `Err` from the transform is a defect in the grammar, not a mismatch:
/// it raises a [`Fault`] of kind
/// [`Transform`](crate::FaultKind::Transform) that no operator backtracks
/// over.
pub fn process<F, E>(rule: Rule, transform: F) -> Rule
where
    F: Fn(Value) -> Result<Value, E> + Send + Sync + 'static,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    Rule::new(move |input| match rule.apply(input)? {
        Outcome::Success(mut m) => {
            m.value = transform(m.value).map_err(|e| Fault::transform(e.into(), m.span.start))?;
            Ok(Outcome::Success(m))
        }
        failure => Ok(failure),
    })
}

/// Match `rule` for its consumption only, yielding `Unit`.
pub fn ignore(rule: Rule) -> Rule {
    Rule::new(move |input| match rule.apply(input)? {
        Outcome::Success(mut m) => {
            m.value = Value::Unit;
            Ok(Outcome::Success(m))
        }
        failure => Ok(failure),
    })
}

/// Zero or one `rule`. A mismatch yields `Unit` without consuming.
///
/// Inside [`each`], [`many`] and [`list`] that `Unit` is dropped like any
/// other, so a missing optional leaves no slot behind.
pub fn optional(rule: Rule) -> Rule {
    Rule::new(move |input| match rule.apply(input)? {
        Outcome::Success(m) => Ok(Outcome::Success(m)),
        Outcome::Failure(_) => Ok(Outcome::success(Value::Unit, input, input)),
    })
}

/// Report a failure of `rule` at its start as expecting `name`.
///
/// Failures deeper inside the rule keep their own, more precise
/// expectations.
pub fn label(rule: Rule, name: impl Into<String>) -> Rule {
    let name = name.into();
    Rule::new(move |input| match rule.apply(input)? {
        Outcome::Failure(f) if f.offset == input.offset() => Ok(Outcome::failure(
            input.offset(),
            Expected::Label(name.clone()),
        )),
        outcome => Ok(outcome),
    })
}

/// Match only at end of input.
pub fn end() -> Rule {
    Rule::new(|input| {
        if input.is_eof() {
            Ok(Outcome::success(Value::Unit, input, input))
        } else {
            Ok(Outcome::failure(input.offset(), Expected::EndOfInput))
        }
    })
}
