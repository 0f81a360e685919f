//! rkcli - Parse and inspect stylesheets with a rulekit grammar
//!
//! Usage:
//!   rkcli [OPTIONS] <FILE>
//!
//! Commands:
//!   parse     Parse and display the rule structure (default)
//!   validate  Check the stylesheet for errors
//!   stats     Show rule and declaration counts

use std::env;
use std::fs;
use std::process;

use rulekit_cli::{to_json, StylesheetParser, StylesheetStats};
use rulekit_core::{Limits, ParseError, Value};
use serde::Serialize;

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;

    let input = fs::read_to_string(&config.file)
        .map_err(|e| format!("failed to read '{}': {}", config.file, e))?;

    let parser = StylesheetParser::new()
        .map_err(|e| format!("failed to build grammar: {}", e))?
        .with_limits(config.limits);

    match config.command {
        Command::Parse => cmd_parse(&parser, &input, &config),
        Command::Validate => cmd_validate(&parser, &input, &config),
        Command::Stats => cmd_stats(&parser, &input, &config),
    }
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    verbose: bool,
    limits: Limits,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Parse,
    Validate,
    Stats,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Parse;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut limits = Limits::default();
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("rkcli {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "--max-depth" => {
                i += 1;
                limits = limits.with_max_depth(parse_count(arg, args.get(i))?);
            }
            "--max-steps" => {
                i += 1;
                limits = limits.with_max_steps(parse_count(arg, args.get(i))?);
            }
            "parse" => command = Command::Parse,
            "validate" => command = Command::Validate,
            "stats" => command = Command::Stats,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        format,
        verbose,
        limits,
    })
}

fn parse_count(option: &str, value: Option<&String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{} requires a value", option))?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {}: {}", option, value))
}

fn print_help() {
    eprintln!(
        r#"rkcli - stylesheet parser built on rulekit

USAGE:
    rkcli [OPTIONS] [COMMAND] <FILE>

COMMANDS:
    parse       Parse and display rule structure (default)
    validate    Check stylesheet for errors without output
    stats       Show stylesheet statistics

OPTIONS:
    -v, --verbose        Show every declaration
    -j, --json           Output in JSON format
        --max-depth N    Abort when rules nest deeper than N
        --max-steps N    Abort after N rule applications
    -h, --help           Print help information
    -V, --version        Print version information

EXAMPLES:
    rkcli site.css              Parse a stylesheet
    rkcli -v site.css           Parse with verbose output
    rkcli -j site.css           Output rules as JSON
    rkcli validate site.css     Validate without output
    rkcli stats site.css        Show stylesheet statistics
"#
    );
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(parser: &StylesheetParser, input: &str, config: &Config) -> Result<(), String> {
    let sheet = parser.parse(input).map_err(|e| e.to_string())?;

    match config.format {
        OutputFormat::Json => print_json(&to_json(&sheet))?,
        OutputFormat::Text => print_sheet(&sheet, config.verbose),
    }

    Ok(())
}

// =============================================================================
// Validate Command
// =============================================================================

#[derive(Serialize)]
struct JsonReport {
    valid: bool,
    errors: Vec<JsonError>,
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    line: usize,
    column: usize,
    offset: usize,
    fault: bool,
}

impl JsonError {
    fn from_parse_error(error: &ParseError) -> Self {
        let position = error.position();
        Self {
            message: error.to_string(),
            line: position.line,
            column: position.column,
            offset: position.offset,
            fault: error.as_fault().is_some(),
        }
    }
}

fn cmd_validate(parser: &StylesheetParser, input: &str, config: &Config) -> Result<(), String> {
    let result = parser.parse(input);

    match (&result, config.format) {
        (Ok(_), OutputFormat::Json) => print_json(&JsonReport {
            valid: true,
            errors: Vec::new(),
        })?,
        (Ok(_), OutputFormat::Text) => println!("Valid: no errors found"),
        (Err(e), OutputFormat::Json) => print_json(&JsonReport {
            valid: false,
            errors: vec![JsonError::from_parse_error(e)],
        })?,
        (Err(e), OutputFormat::Text) => {
            eprintln!("Invalid: {}", e);
            if let Some(line) = input.lines().nth(e.position().line.saturating_sub(1)) {
                eprintln!("  | {}", line);
                eprintln!("  | {}^", " ".repeat(e.position().column.saturating_sub(1)));
            }
        }
    }

    result.map(|_| ()).map_err(|_| "stylesheet is invalid".to_string())
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(parser: &StylesheetParser, input: &str, config: &Config) -> Result<(), String> {
    let sheet = parser.parse(input).map_err(|e| e.to_string())?;
    let stats = StylesheetStats::from_value(&sheet);

    if matches!(config.format, OutputFormat::Json) {
        return print_json(&stats);
    }

    println!("Stylesheet Statistics");
    println!("---------------------");
    println!("Rules:          {}", stats.rules);
    println!("Selectors:      {}", stats.selectors);
    println!("Declarations:   {}", stats.declarations);
    println!("  !important:   {}", stats.important);
    println!();
    println!("Size:");
    println!("  Characters:   {}", input.chars().count());
    println!("  Lines:        {}", input.lines().count());

    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

fn print_sheet(sheet: &Value, verbose: bool) {
    let rules = sheet.as_list().unwrap_or_default();
    println!("Rules: {}", rules.len());

    for (i, rule) in rules.iter().enumerate() {
        let selectors = texts(rule.get("selectors"));
        let declarations = rule
            .get("declarations")
            .and_then(Value::as_list)
            .unwrap_or_default();
        println!(
            "  [{}] {} ({} declarations)",
            i + 1,
            selectors.join(", "),
            declarations.len()
        );

        if verbose {
            for decl in declarations {
                let important = match decl.get("important").and_then(Value::as_bool) {
                    Some(true) => " !important",
                    _ => "",
                };
                println!(
                    "      {}: {}{}",
                    decl.get("property").and_then(Value::as_text).unwrap_or("?"),
                    decl.get("value").and_then(Value::as_text).unwrap_or("?"),
                    important
                );
            }
        }
    }
}

fn texts(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_text)
        .collect()
}
