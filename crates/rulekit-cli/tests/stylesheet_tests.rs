//! Tests for the stylesheet grammar driven by rkcli

use rulekit_cli::{to_json, StylesheetParser, StylesheetStats};
use rulekit_core::{FaultKind, Limits, ParseError, Value};

const SAMPLE: &str = r#"
/* layout */
body, html {
    margin: 0;
    font: 12px/1.5 sans-serif;
}

a:hover { color: red !important; text-decoration: underline }

.empty {}
"#;

fn parser() -> StylesheetParser {
    StylesheetParser::new().unwrap()
}

fn declaration(rule: &Value, index: usize) -> &Value {
    &rule.get("declarations").and_then(Value::as_list).unwrap()[index]
}

#[test]
fn test_parse_sample_rules() {
    let sheet = parser().parse(SAMPLE).unwrap();
    let rules = sheet.as_list().unwrap();
    assert_eq!(rules.len(), 3);

    let selectors = rules[0].get("selectors").unwrap();
    assert_eq!(
        selectors,
        &Value::List(vec![Value::text("body"), Value::text("html")])
    );

    let font = declaration(&rules[0], 1);
    assert_eq!(font.get("property"), Some(&Value::text("font")));
    assert_eq!(font.get("value"), Some(&Value::text("12px/1.5 sans-serif")));
    assert_eq!(font.get("important"), Some(&Value::Bool(false)));
}

#[test]
fn test_parse_important_and_missing_trailing_semicolon() {
    let sheet = parser().parse(SAMPLE).unwrap();
    let hover = &sheet.as_list().unwrap()[1];

    let color = declaration(hover, 0);
    assert_eq!(color.get("value"), Some(&Value::text("red")));
    assert_eq!(color.get("important"), Some(&Value::Bool(true)));

    let deco = declaration(hover, 1);
    assert_eq!(deco.get("property"), Some(&Value::text("text-decoration")));
}

#[test]
fn test_empty_block_has_no_declarations() {
    let sheet = parser().parse(SAMPLE).unwrap();
    let empty = &sheet.as_list().unwrap()[2];
    assert_eq!(empty.get("declarations"), Some(&Value::List(Vec::new())));
}

#[test]
fn test_property_names_are_lowercased() {
    let sheet = parser().parse("p { COLOR: Blue }").unwrap();
    let decl = declaration(&sheet.as_list().unwrap()[0], 0);
    assert_eq!(decl.get("property"), Some(&Value::text("color")));
    assert_eq!(decl.get("value"), Some(&Value::text("Blue")));
}

#[test]
fn test_empty_stylesheet() {
    assert_eq!(parser().parse("").unwrap(), Value::List(Vec::new()));
    assert_eq!(
        parser().parse("  /* nothing */  ").unwrap(),
        Value::List(Vec::new())
    );
}

#[test]
fn test_missing_colon_reports_position() {
    let err = parser().parse("p {\n  color red;\n}").unwrap_err();
    match &err {
        ParseError::Mismatch { position, .. } => {
            assert_eq!(position.line, 2);
            assert_eq!(position.column, 9);
        }
        other => panic!("expected a mismatch, got {:?}", other),
    }
    assert!(err.to_string().contains("`:`"));
}

#[test]
fn test_unclosed_block_is_an_error() {
    let err = parser().parse("p { color: red;").unwrap_err();
    assert!(matches!(err, ParseError::Mismatch { .. }));
}

#[test]
fn test_step_limit_is_applied() {
    let parser = parser().with_limits(Limits::default().with_max_steps(20));
    let err = parser.parse(SAMPLE).unwrap_err();
    assert_eq!(err.as_fault().map(|f| f.kind), Some(FaultKind::StepLimit));
}

#[test]
fn test_stats() {
    let sheet = parser().parse(SAMPLE).unwrap();
    let stats = StylesheetStats::from_value(&sheet);
    assert_eq!(
        stats,
        StylesheetStats {
            rules: 3,
            selectors: 4,
            declarations: 4,
            important: 1,
        }
    );
}

#[test]
fn test_json_conversion() {
    let sheet = parser().parse("a { b: c }").unwrap();
    let json = to_json(&sheet);
    assert_eq!(
        json,
        serde_json::json!([{
            "selectors": ["a"],
            "declarations": [{"property": "b", "value": "c", "important": false}]
        }])
    );
}
