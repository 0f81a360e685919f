//! Recursive grammars, named registries and parse limits

use std::convert::Infallible;

use rulekit_core::{
    any, between, each, ignore, list, many, optional, process, recursive, regex, token, FaultKind,
    Grammar, Limits, ParseError, Rule, Value,
};

fn ws() -> Rule {
    ignore(regex(r"\s*").unwrap())
}

fn int(value: &Value) -> Result<i64, String> {
    value
        .as_int()
        .ok_or_else(|| format!("expected an integer, got {}", value))
}

/// Fold `[first, [[op, operand], ...]]` left to right.
fn fold_binary(value: Value) -> Result<Value, String> {
    let mut parts = value.into_list().into_iter();
    let first = parts.next().ok_or("missing left operand")?;
    let mut acc = int(&first)?;
    for step in parts.flat_map(Value::into_list) {
        let step = step.into_list();
        let (op, rhs) = match step.as_slice() {
            [op, rhs] => (op.as_text().unwrap_or_default(), int(rhs)?),
            _ => return Err(format!("malformed operation: {:?}", step)),
        };
        acc = match op {
            "+" => acc + rhs,
            "-" => acc - rhs,
            "*" => acc * rhs,
            "/" if rhs == 0 => return Err("division by zero".to_string()),
            "/" => acc / rhs,
            other => return Err(format!("unknown operator {}", other)),
        };
    }
    Ok(Value::Int(acc))
}

fn calculator() -> Grammar {
    let g = Grammar::new();

    let number = process(regex("[0-9]+").unwrap(), |v| {
        v.as_text().unwrap_or_default().parse::<i64>().map(Value::Int)
    });
    let parens = between(each([token("("), ws()]), g.reference("expr"), each([ws(), token(")")]));
    g.define("factor", any([number, parens]));

    let mul_op = between(ws(), any([token("*"), token("/")]), ws());
    g.define(
        "term",
        process(
            each([g.reference("factor"), many(each([mul_op, g.reference("factor")]))]),
            fold_binary,
        ),
    );

    let add_op = between(ws(), any([token("+"), token("-")]), ws());
    g.define(
        "expr",
        process(
            each([g.reference("term"), many(each([add_op, g.reference("term")]))]),
            fold_binary,
        ),
    );
    g
}

// ============================================================================
// Named grammars
// ============================================================================

#[test]
fn test_mutually_recursive_grammar() {
    let g = calculator();
    assert_eq!(g.parse_all("expr", "1 + 2 * 3").unwrap(), Value::Int(7));
    assert_eq!(g.parse_all("expr", "(1 + 2) * 3").unwrap(), Value::Int(9));
    assert_eq!(g.parse_all("expr", "((4))-10/( 2 )").unwrap(), Value::Int(-1));
}

#[test]
fn test_grammar_partial_parse_returns_rest() {
    let g = calculator();
    let (value, rest) = g.parse("expr", "2*2 ;").unwrap();
    assert_eq!(value, Value::Int(4));
    assert_eq!(rest, " ;");
}

#[test]
fn test_grammar_transform_error_surfaces_as_fault() {
    let g = calculator();
    let err = g.parse_all("expr", "1 / 0").unwrap_err();
    let fault = err.as_fault().expect("fault");
    assert_eq!(fault.kind, FaultKind::Transform);
    assert!(fault.message.contains("division by zero"));
}

#[test]
fn test_grammar_names_and_lookup() {
    let g = calculator();
    assert_eq!(g.names(), vec!["expr", "factor", "term"]);
    assert_eq!(g.len(), 3);
    assert!(g.contains("term"));
    assert!(g.get("missing").is_none());
}

#[test]
fn test_reference_before_definition() {
    let g = Grammar::new();
    let greeting = each([g.reference("hello"), token("!")]);
    g.define("hello", token("hi"));
    assert_eq!(greeting.parse_all("hi!").unwrap().text_content(), "hi!");
}

#[test]
fn test_redefinition_replaces_rule() {
    let g = Grammar::new();
    let word = g.reference("word");
    assert!(g.define("word", token("a")).is_none());
    assert!(g.define("word", token("b")).is_some());
    assert!(word.parse_all("b").is_ok());
    assert!(word.parse_all("a").is_err());
}

#[test]
fn test_unbound_reference_is_a_fault() {
    let g = Grammar::new();
    let rule = any([g.reference("missing"), token("x")]);
    let err = rule.parse("x").unwrap_err();
    let fault = err.as_fault().expect("fault");
    assert_eq!(fault.kind, FaultKind::UnboundRule);
    assert!(fault.is_grammar_fault());
}

#[test]
fn test_unknown_start_rule() {
    let g = Grammar::new();
    let err = g.parse("start", "abc").unwrap_err();
    assert_eq!(err.as_fault().map(|f| f.kind), Some(FaultKind::UnboundRule));
}

#[test]
fn test_reference_outliving_grammar() {
    let rule = {
        let g = Grammar::new();
        g.define("a", token("a"));
        g.reference("a")
    };
    let err = rule.parse("a").unwrap_err();
    assert_eq!(err.as_fault().map(|f| f.kind), Some(FaultKind::UnboundRule));
}

#[test]
fn test_get_keeps_grammar_alive() {
    let start = {
        let g = Grammar::new();
        g.define("pair", each([g.reference("item"), token(","), g.reference("item")]));
        g.define("item", token("a"));
        g.get("pair").unwrap()
    };
    let value = start.parse_all("a,a").unwrap();
    assert_eq!(value.to_string(), r#"["a", ",", "a"]"#);
}

#[test]
fn test_grammar_clone_shares_rules() {
    let g = Grammar::new();
    let shared = g.clone();
    shared.define("x", token("x"));
    assert!(g.parse_all("x", "x").is_ok());
}

// ============================================================================
// recursive
// ============================================================================

#[test]
fn test_recursive_nested_brackets() {
    let nested = recursive(|nested| between("[", many(nested), "]"));
    let value = nested.parse_all("[[][[]]]").unwrap();
    assert_eq!(
        value,
        Value::List(vec![
            Value::List(vec![]),
            Value::List(vec![Value::List(vec![])]),
        ])
    );
    assert!(nested.parse_all("[[]").is_err());
}

#[test]
fn test_recursive_json_like_values() {
    let value = recursive(|value| {
        let scalar = regex("[a-z0-9]+").unwrap();
        // An empty array would otherwise be `Unit` and vanish from its parent
        let items = process(optional(list(between(ws(), value, ws()))), |v| {
            Ok::<_, Infallible>(Value::List(v.into_list()))
        });
        any([scalar, between("[", items, "]")])
    });
    let parsed = value.parse_all("[a, [b, c], []]").unwrap();
    assert_eq!(parsed.to_string(), r#"["a", ["b", "c"], []]"#);
}

#[test]
fn test_recursive_rule_survives_clone_and_drop() {
    let cloned = {
        let nested = recursive(|nested| between("(", optional(nested), ")"));
        nested.clone()
    };
    assert!(cloned.parse_all("((()))").is_ok());
}

// ============================================================================
// Limits
// ============================================================================

#[test]
fn test_depth_limit_stops_deep_nesting() {
    let nested = recursive(|nested| between("(", optional(nested), ")"));
    let deep = format!("{}{}", "(".repeat(80), ")".repeat(80));

    let limits = Limits::default().with_max_depth(64);
    let err = nested.parse_all_with(&deep, &limits).unwrap_err();
    assert_eq!(err.as_fault().map(|f| f.kind), Some(FaultKind::DepthLimit));

    assert!(nested.parse_all_with("((()))", &limits).is_ok());
    assert!(nested.parse_all_with(&deep, &Limits::unbounded()).is_ok());
}

#[test]
fn test_alias_cycle_hits_depth_limit() {
    let g = Grammar::new();
    g.define("a", g.reference("b"));
    g.define("b", g.reference("a"));

    let err = g.parse("a", "x").unwrap_err();
    assert_eq!(err.as_fault().map(|f| f.kind), Some(FaultKind::DepthLimit));
}

#[test]
fn test_self_alias_hits_depth_limit() {
    let this = recursive(|this| this);
    let err = this.parse("x").unwrap_err();
    assert_eq!(err.as_fault().map(|f| f.kind), Some(FaultKind::DepthLimit));

    let err = this
        .parse_with("x", &Limits::default().with_max_depth(8))
        .unwrap_err();
    assert_eq!(err.as_fault().map(|f| f.kind), Some(FaultKind::DepthLimit));
}

#[test]
fn test_step_limit_bounds_work() {
    let rule = many(token("a"));
    let input = "a".repeat(100);

    let err = rule
        .parse_with(&input, &Limits::default().with_max_steps(10))
        .unwrap_err();
    match err {
        ParseError::Fault { fault, position } => {
            assert_eq!(fault.kind, FaultKind::StepLimit);
            assert!(position.offset < 10);
        }
        other => panic!("expected a fault, got {:?}", other),
    }

    assert!(rule.parse_with(&input, &Limits::default()).is_ok());
}

#[test]
fn test_default_limits() {
    let limits = Limits::default();
    assert_eq!(limits.max_depth, Some(Limits::DEFAULT_MAX_DEPTH));
    assert_eq!(limits.max_steps, None);
    assert_eq!(Limits::unbounded().max_depth, None);
}
