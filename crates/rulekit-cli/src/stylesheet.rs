//! A stylesheet grammar assembled from the rulekit operators.
//!
//! Grammar (comments `/* ... */` may appear wherever whitespace can):
//!
//! ```text
//! stylesheet  = rule*
//! rule        = selector ("," selector)* "{" declarations "}"
//! declarations= (declaration (";" declaration)* ";"?)?
//! declaration = property ":" value ("!important")?
//! ```
//!
//! Translators reshape the raw parse into maps:
//! `{selectors, declarations}` per rule and
//! `{property, value, important}` per declaration.

use std::convert::Infallible;

use rulekit_core::{
    any, between, each, end, ignore, label, list_with, many, optional, process, regex, token,
    Limits, ParseError, PatternError, Rule, Value,
};
use serde::Serialize;

/// Parses stylesheets into [`Value`] maps.
#[derive(Debug, Clone)]
pub struct StylesheetParser {
    grammar: Rule,
    limits: Limits,
}

impl StylesheetParser {
    pub fn new() -> Result<Self, PatternError> {
        Ok(Self {
            grammar: stylesheet()?,
            limits: Limits::default(),
        })
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Parse a complete stylesheet.
    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        self.grammar.parse_all_with(input, &self.limits)
    }
}

fn stylesheet() -> Result<Rule, PatternError> {
    let comment = regex(r"/\*[\s\S]*?\*/")?;
    let skip = ignore(many(any([regex(r"\s+")?, comment])));
    let lexeme = |rule: Rule| between(skip.clone(), rule, skip.clone());

    let selector = trimmed(regex(r"[^\s{},;/][^{},;/]*")?);
    let selectors = label(list_with(lexeme(selector), ",", false), "selector");

    let property = label(regex(r"-?[_a-zA-Z][_a-zA-Z0-9-]*")?, "property");
    let value = label(trimmed(regex(r"(?:[^;{}!/]|/[^*])+")?), "value");
    let important = regex(r"!\s*important")?;
    let declaration = process(
        each([
            lexeme(property),
            token(":"),
            lexeme(value),
            optional(lexeme(important)),
        ]),
        declaration_map,
    );

    let declarations = process(
        optional(list_with(declaration, lexeme(token(";")), true)),
        |v| Ok::<_, Infallible>(Value::List(v.into_list())),
    );
    let block = between(lexeme(token("{")), declarations, lexeme(token("}")));
    let style_rule = process(each([selectors, block]), rule_map);

    Ok(between(skip.clone(), many(style_rule), end()))
}

fn trimmed(rule: Rule) -> Rule {
    process(rule, |v| {
        let text = v.as_text().unwrap_or_default().trim().to_string();
        Ok::<_, Infallible>(Value::Text(text))
    })
}

/// `[property, ":", value, "!important"?]` into a declaration map.
fn declaration_map(raw: Value) -> Result<Value, String> {
    let parts = raw.into_list();
    match parts.as_slice() {
        [Value::Text(property), _, Value::Text(value), rest @ ..] => Ok(Value::Map(vec![
            ("property".to_string(), Value::text(property.to_ascii_lowercase())),
            ("value".to_string(), Value::text(value.as_str())),
            ("important".to_string(), Value::Bool(!rest.is_empty())),
        ])),
        _ => Err(format!("malformed declaration with {} parts", parts.len())),
    }
}

/// `[[selector, ...], [declaration, ...]]` into a rule map.
fn rule_map(raw: Value) -> Result<Value, String> {
    let mut parts = raw.into_list().into_iter();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(selectors @ Value::List(_)), Some(declarations @ Value::List(_)), None) => {
            Ok(Value::Map(vec![
                ("selectors".to_string(), selectors),
                ("declarations".to_string(), declarations),
            ]))
        }
        (selectors, declarations, _) => Err(format!(
            "malformed rule: selectors {:?}, declarations {:?}",
            selectors, declarations
        )),
    }
}

/// Counts over a parsed stylesheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StylesheetStats {
    pub rules: usize,
    pub selectors: usize,
    pub declarations: usize,
    pub important: usize,
}

impl StylesheetStats {
    pub fn from_value(sheet: &Value) -> Self {
        let mut stats = Self::default();
        for rule in sheet.as_list().unwrap_or_default() {
            stats.rules += 1;
            stats.selectors += list_len(rule.get("selectors"));
            for decl in rule
                .get("declarations")
                .and_then(Value::as_list)
                .unwrap_or_default()
            {
                stats.declarations += 1;
                if decl.get("important").and_then(Value::as_bool) == Some(true) {
                    stats.important += 1;
                }
            }
        }
        stats
    }
}

fn list_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_list).map_or(0, <[Value]>::len)
}
