//! # rulekit core
//!
//! Backtracking parser combinators for assembling LL(k) grammars at runtime,
//! with no code generation step.
//!
//! A [`Rule`] is a pure function from an [`Input`] to an [`Outcome`]. The
//! operators build rules out of other rules:
//!
//! | operator | matches | yields |
//! |----------|---------|--------|
//! | [`token`] | a literal or anchored pattern | the matched text |
//! | [`any`] | the first alternative that matches | that alternative's value |
//! | [`each`] | every rule in sequence | a list of their values |
//! | [`many`] | a rule zero or more times | a list |
//! | [`list`] | `rule (delimiter rule)*` | a list of the `rule` values |
//! | [`between`] | `left rule right` | `rule`'s value |
//! | [`pair`] | `first delimiter second` | `[first, second]` |
//! | [`process`] | a rule | its value passed through a transform |
//! | [`ignore`] | a rule | `Unit` |
//!
//! ## Quick Start
//!
//! ```rust
//! use rulekit_core::{between, list, process, regex, Value};
//!
//! let number = process(regex("[0-9]+").unwrap(), |v| {
//!     v.as_text().unwrap_or_default().parse::<i64>().map(Value::Int)
//! });
//! let array = between("[", list(number), "]");
//!
//! let value = array.parse_all("[1,2,3]").unwrap();
//! assert_eq!(value, Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
//! ```
//!
//! ## Failure and faults
//!
//! A rule that does not match returns [`Outcome::Failure`], an ordinary
//! value that `any`, `many`, `list` and `optional` use to backtrack. A
//! failure never consumes input. A [`Fault`] travels on the `Err` side
//! instead and aborts the whole parse: transform errors, references to
//! undefined rules, and exceeded [`Limits`].
//!
//! ## Recursion
//!
//! Recursive grammars are built with [`recursive`] or a named [`Grammar`].

pub mod combinators;
pub mod config;
pub mod error;
pub mod grammar;
pub mod input;
pub mod rule;
pub mod span;
pub mod value;

pub use combinators::{
    any, between, each, end, ignore, label, list, list_with, many, optional, pair, pair_with,
    process, regex, token,
};
pub use config::Limits;
pub use error::{Expected, Fault, FaultKind, MatchFailure, ParseError};
pub use grammar::{recursive, Grammar};
pub use input::{Budget, Input, Position};
pub use rule::{Match, Outcome, Pattern, PatternError, Rule, Step};
pub use value::Value;
