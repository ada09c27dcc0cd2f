//! Rendering of command results.
//!
//! `--json` prints one envelope per invocation on stdout:
//! `{schema_version, command, status, data | error, warnings?, next_steps?}`.
//! Otherwise commands print a [`HumanOutput`] block and errors go to stderr as
//! `error:` / `hint:` lines.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "todoshare.v1";

/// Command groups whose subcommand is part of the reported command name.
const GROUPED_COMMANDS: &[&str] = &["user", "actor", "task", "category", "share"];

/// Global flags whose value is a separate argument.
const VALUE_FLAGS: &[&str] = &["--data-dir", "--user"];

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human-readable result: a header line followed by optional titled sections.
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, line: impl Into<String>) {
        self.details.push(line.into());
    }

    pub fn push_warning(&mut self, line: impl Into<String>) {
        self.warnings.push(line.into());
    }

    pub fn push_next_step(&mut self, command: impl Into<String>) {
        self.next_steps.push(command.into());
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;

        let summary: Vec<String> = self
            .summary
            .iter()
            .map(|(key, value)| match value.as_str() {
                "" => key.clone(),
                value => format!("{key}: {value}"),
            })
            .collect();
        let sections = [
            ("Summary", &summary),
            ("Details", &self.details),
            ("Warnings", &self.warnings),
            ("Next steps", &self.next_steps),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            write!(f, "\n\n{title}:")?;
            for item in items.iter() {
                write!(f, "\n- {item}")?;
            }
        }
        Ok(())
    }
}

pub fn format_human(output: &HumanOutput) -> String {
    output.to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome<'a, T: Serialize> {
    Data(&'a T),
    Error(ErrorBody),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(flatten)]
    outcome: Outcome<'a, T>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    next_steps: &'a [String],
}

impl<T: Serialize> Envelope<'_, T> {
    fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let (warnings, next_steps) = human
            .map(|h| (h.warnings.as_slice(), h.next_steps.as_slice()))
            .unwrap_or_default();
        return Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            outcome: Outcome::Data(data),
            warnings,
            next_steps,
        }
        .print();
    }

    match human {
        Some(human) if !options.quiet => println!("{human}"),
        _ => {}
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if !json {
        eprintln!("error: {err}");
        if let Some(hint) = hint {
            eprintln!("hint: {hint}");
        }
        return Ok(());
    }

    let next_steps: Vec<String> = hint.into_iter().collect();
    Envelope::<()> {
        schema_version: SCHEMA_VERSION,
        command,
        status: "error",
        outcome: Outcome::Error(ErrorBody {
            message: err.to_string(),
            code: err.exit_code(),
            kind: err.kind().as_str(),
            details: err.details(),
        }),
        warnings: &[],
        next_steps: &next_steps,
    }
    .print()
}

pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

/// Command name for the envelope, e.g. `task new` or `board`.
pub fn infer_command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut positional = Vec::with_capacity(2);
    let mut args = args.into_iter();
    while positional.len() < 2 {
        let Some(arg) = args.next() else { break };
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
        } else if !arg.starts_with('-') {
            positional.push(arg);
        }
    }

    match positional.as_slice() {
        [] => "todoshare".to_string(),
        [group, sub] if GROUPED_COMMANDS.contains(&group.as_str()) => format!("{group} {sub}"),
        [command, ..] => command.clone(),
    }
}

fn error_hint(err: &Error) -> Option<String> {
    let hint = match err {
        Error::UserNotFound(_) => "todoshare user list".to_string(),
        Error::CategoryNotFound(_) | Error::Forbidden(_) => "todoshare category list".to_string(),
        Error::CategoryForbidden(id) | Error::NoWritePermission(id) => {
            format!("todoshare category perm {id}")
        }
        Error::ShareNotFound { category_id, .. } | Error::ShareAlreadyExists { category_id, .. } => {
            format!("todoshare share list {category_id}")
        }
        Error::CategoryRequired => "todoshare task new <title> --category <name>".to_string(),
        Error::InvalidConfig(_) => "fix config.toml in the data directory then retry".to_string(),
        Error::Timeout { .. } | Error::LockFailed(_) => {
            "retry, or raise [operations] timeout_ms in config.toml".to_string()
        }
        _ => return None,
    };
    Some(hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_name_includes_group_subcommand() {
        assert_eq!(infer_command_name(args(&["--json", "task", "new", "x"])), "task new");
        assert_eq!(infer_command_name(args(&["board"])), "board");
        assert_eq!(
            infer_command_name(args(&["--data-dir", "/tmp/x", "--user", "a@b.c", "share", "rm"])),
            "share rm"
        );
        assert_eq!(infer_command_name(args(&["--user=a@b.c", "board"])), "board");
        assert_eq!(infer_command_name(args(&["share"])), "share");
        assert_eq!(infer_command_name(args(&[])), "todoshare");
    }

    #[test]
    fn human_output_sections() {
        let mut out = HumanOutput::new("todoshare task new: created #1");
        out.push_summary("category", "Work");
        out.push_summary("archived", "");
        out.push_next_step("todoshare task show 1");
        let text = format_human(&out);
        assert!(text.starts_with("todoshare task new: created #1\n\nSummary:"));
        assert!(text.contains("Summary:\n- category: Work\n- archived"));
        assert!(text.ends_with("Next steps:\n- todoshare task show 1"));
    }

    #[test]
    fn envelope_flattens_data_and_error() {
        let data = serde_json::json!({ "id": 3 });
        let success = Envelope {
            schema_version: SCHEMA_VERSION,
            command: "task show",
            status: "success",
            outcome: Outcome::Data(&data),
            warnings: &[],
            next_steps: &[],
        };
        let value = serde_json::to_value(&success).unwrap();
        assert_eq!(value["data"]["id"], 3);
        assert!(value.get("error").is_none());
        assert!(value.get("warnings").is_none());

        let err = Error::CategoryForbidden(4);
        let failure = Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command: "share add",
            status: "error",
            outcome: Outcome::Error(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: err.kind().as_str(),
                details: err.details(),
            }),
            warnings: &[],
            next_steps: &[error_hint(&err).unwrap()],
        };
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["error"]["kind"], "forbidden");
        assert_eq!(value["error"]["details"]["category_id"], 4);
        assert_eq!(value["next_steps"][0], "todoshare category perm 4");
        assert!(value.get("data").is_none());
    }
}
