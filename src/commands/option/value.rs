//! Turning command-line text into option values

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tokio::process::Command;

use crate::cli::commands::ValueArgs;

/// How the VALUE argument is construed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// Stored as a string
    Literal,
    /// Strict JSON
    Json,
    /// JSON plus `True`/`False`/`None`, single-quoted strings and tuples
    Eval,
    /// Run a program, store its trimmed stdout
    Execute,
}

impl ValueMode {
    pub fn from_args(args: &ValueArgs) -> Self {
        if args.json {
            ValueMode::Json
        } else if args.eval {
            ValueMode::Eval
        } else if args.execute {
            ValueMode::Execute
        } else {
            ValueMode::Literal
        }
    }
}

/// Read the value from the command line. Returns the value and a short note
/// on how it was obtained, empty for literals.
pub async fn read_value(args: &ValueArgs) -> Result<(Value, String)> {
    if !args.args.is_empty() && ValueMode::from_args(args) != ValueMode::Execute {
        bail!("Extra arguments {:?} are only accepted with --execute", args.args);
    }

    match ValueMode::from_args(args) {
        ValueMode::Literal => Ok((Value::String(args.value.clone()), String::new())),
        ValueMode::Json => {
            let value = parse_json(&args.value)?;
            Ok((value, format!("json > {}", args.value)))
        }
        ValueMode::Eval => {
            let value = eval_literal(&args.value)?;
            Ok((value, format!("evaluated from \"{}\"", args.value)))
        }
        ValueMode::Execute => {
            let value = execute(&args.value, &args.args).await?;
            Ok((value, format!("executed from \"{}\"", args.value)))
        }
    }
}

pub fn parse_json(input: &str) -> Result<Value> {
    serde_json::from_str(input).with_context(|| format!("Invalid JSON value: {}", input))
}

/// Evaluate a literal written in the relaxed syntax accepted by `--eval`.
pub fn eval_literal(input: &str) -> Result<Value> {
    let input = input.trim();
    if let Ok(value) = serde_json::from_str(input) {
        return Ok(value);
    }

    let json = literal_to_json(input)?;
    serde_json::from_str(&json).with_context(|| format!("Cannot evaluate '{}' as a literal", input))
}

fn literal_to_json(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                let mut text = String::new();
                loop {
                    match chars.next() {
                        None => bail!("Unterminated string in '{}'", input),
                        Some('\\') => match chars.next() {
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            Some('r') => text.push('\r'),
                            Some(escaped) => text.push(escaped),
                            None => bail!("Unterminated string in '{}'", input),
                        },
                        Some(ch) if ch == c => break,
                        Some(ch) => text.push(ch),
                    }
                }
                out.push_str(&serde_json::to_string(&text)?);
            }
            c if c.is_ascii_digit() => {
                out.push(c);
                while let Some(&next) = chars.peek() {
                    let exponent_sign = matches!(next, '+' | '-') && out.ends_with(['e', 'E']);
                    if next == '_' {
                        chars.next();
                    } else if next.is_ascii_alphanumeric() || next == '.' || exponent_sign {
                        out.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(match word.as_str() {
                    "True" | "true" => "true",
                    "False" | "false" => "false",
                    "None" | "null" => "null",
                    _ => bail!("Unknown name '{}' in literal '{}'", word, input),
                });
            }
            '(' => out.push('['),
            ')' => out.push(']'),
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Run `program` with `args` and take its trimmed stdout as the value:
/// JSON when it parses, a string otherwise.
pub async fn execute(program: &str, args: &[String]) -> Result<Value> {
    log::info!("Executing {} {:?} to produce an option value", program, args);

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Cannot run program '{}'", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "Program '{}' failed with {}: {}",
            program,
            output.status,
            stderr.trim()
        );
    }

    let stdout = String::from_utf8(output.stdout)
        .with_context(|| format!("Program '{}' did not print UTF-8", program))?;
    let stdout = stdout.trim();

    Ok(serde_json::from_str(stdout).unwrap_or_else(|_| Value::String(stdout.to_string())))
}
