//! Late binding for recursive grammars.
//!
//! A rule that refers to itself, or to a partner defined later, cannot be
//! built eagerly. Both helpers here hand out a rule that looks its target
//! up when invoked. Back-references are weak, so a cyclic grammar is freed
//! once its owner is dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, Weak};

use crate::config::Limits;
use crate::error::{Fault, ParseError};
use crate::rule::Rule;
use crate::value::Value;

/// Build a rule that can refer to itself.
///
/// `build` receives a handle standing for the finished rule.
///
/// ```rust
/// use rulekit_core::{between, many, recursive};
///
/// // nested = "(" nested* ")"
/// let nested = recursive(|nested| between("(", many(nested), ")"));
/// assert!(nested.parse_all("(()(()))").is_ok());
/// ```
pub fn recursive<F>(build: F) -> Rule
where
    F: FnOnce(Rule) -> Rule,
{
    let cell: Arc<OnceLock<Rule>> = Arc::new(OnceLock::new());
    let weak: Weak<OnceLock<Rule>> = Arc::downgrade(&cell);
    let handle = Rule::new(move |input| {
        let resolved = weak.upgrade().and_then(|cell| cell.get().cloned());
        match resolved {
            Some(rule) => rule.apply(input),
            None => Err(Fault::unbound("<recursive>", input.offset())),
        }
    });

    let rule = build(handle);
    // The cell is fresh, nothing else can have filled it.
    let _ = cell.set(rule);

    Rule::new(move |input| match cell.get() {
        Some(rule) => rule.apply(input),
        None => Err(Fault::unbound("<recursive>", input.offset())),
    })
}

type RuleTable = RwLock<BTreeMap<String, Rule>>;

/// A registry of named rules.
///
/// [`Grammar::reference`] returns a rule that resolves its name at
/// invocation time, so rules may refer to each other in any order.
/// Cloning a grammar shares the registry.
#[derive(Clone, Default)]
pub struct Grammar {
    rules: Arc<RuleTable>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule that invokes whatever is bound to `name` when it runs.
    ///
    /// Invoking it before `name` is defined raises an
    /// [`UnboundRule`](crate::FaultKind::UnboundRule) fault. The reference
    /// only holds the registry weakly, so it raises the same fault once
    /// every handle to the grammar is gone. Use [`Grammar::get`] for a rule
    /// that outlives the grammar.
    pub fn reference(&self, name: impl Into<String>) -> Rule {
        let name = name.into();
        let table: Weak<RuleTable> = Arc::downgrade(&self.rules);
        Rule::new(move |input| {
            let resolved = table.upgrade().and_then(|table| {
                let rules = table.read().unwrap_or_else(PoisonError::into_inner);
                rules.get(&name).cloned()
            });
            match resolved {
                Some(rule) => rule.apply(input),
                None => Err(Fault::unbound(&name, input.offset())),
            }
        })
    }

    /// Bind `rule` to `name`, returning the rule previously bound.
    pub fn define(&self, name: impl Into<String>, rule: Rule) -> Option<Rule> {
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), rule)
    }

    /// The rule bound to `name`.
    ///
    /// The returned rule keeps the registry alive, so references inside it
    /// keep resolving after the grammar itself is dropped. Define names in
    /// terms of [`Grammar::reference`] rather than this rule, or the
    /// registry ends up owning itself.
    pub fn get(&self, name: &str) -> Option<Rule> {
        let rule = self
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()?;
        let table = Arc::clone(&self.rules);
        Some(Rule::new(move |input| {
            let _registry = &table;
            rule.apply(input)
        }))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Defined names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a prefix of `text` starting from the rule named `start`.
    pub fn parse<'t>(&self, start: &str, text: &'t str) -> Result<(Value, &'t str), ParseError> {
        self.parse_with(start, text, &Limits::default())
    }

    pub fn parse_with<'t>(
        &self,
        start: &str,
        text: &'t str,
        limits: &Limits,
    ) -> Result<(Value, &'t str), ParseError> {
        self.start(start, text)?.parse_with(text, limits)
    }

    /// Parse all of `text` starting from the rule named `start`.
    pub fn parse_all(&self, start: &str, text: &str) -> Result<Value, ParseError> {
        self.parse_all_with(start, text, &Limits::default())
    }

    pub fn parse_all_with(
        &self,
        start: &str,
        text: &str,
        limits: &Limits,
    ) -> Result<Value, ParseError> {
        self.start(start, text)?.parse_all_with(text, limits)
    }

    fn start(&self, name: &str, text: &str) -> Result<Rule, ParseError> {
        self.get(name)
            .ok_or_else(|| ParseError::fault(text, Fault::unbound(name, 0)))
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("rules", &self.names())
            .finish()
    }
}
