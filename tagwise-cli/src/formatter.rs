//! Report output.

use std::fmt::Write as _;

use clap::ValueEnum;
use owo_colors::OwoColorize;
use tagwise_engine::{FileResult, Message, Report, Severity};

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Grouped per file, one line per message.
    #[default]
    Text,
    /// The report as JSON.
    Json,
}

impl Format {
    /// Render `report`. Colours are only used for text output with `color` set.
    pub fn render(self, report: &Report, color: bool) -> anyhow::Result<String> {
        match self {
            Self::Text => Ok(text(report, color)),
            Self::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }
}

fn severity_label(severity: Severity, color: bool) -> String {
    let label = match severity {
        Severity::Error => "error",
        Severity::Warn => "warning",
        Severity::Off => "off",
    };
    match (color, severity) {
        (true, Severity::Error) => label.red().to_string(),
        (true, Severity::Warn) => label.yellow().to_string(),
        _ => label.to_string(),
    }
}

fn message_line(message: &Message, color: bool) -> String {
    let position = format!("{}:{}", message.line, message.column);
    let rule = if color {
        message.rule_id.dimmed().to_string()
    } else {
        message.rule_id.clone()
    };
    format!(
        "  {position:<8} {:<7}  {}  {rule}",
        severity_label(message.severity, color),
        message.message
    )
}

fn file_block(out: &mut String, result: &FileResult, color: bool) {
    if color {
        let _ = writeln!(out, "{}", result.file_path.underline());
    } else {
        let _ = writeln!(out, "{}", result.file_path);
    }
    for message in &result.messages {
        let _ = writeln!(out, "{}", message_line(message, color));
    }
    out.push('\n');
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn text(report: &Report, color: bool) -> String {
    let mut out = String::new();
    for result in report.results.iter().filter(|r| !r.messages.is_empty()) {
        file_block(&mut out, result, color);
    }

    let errors = report.error_count();
    let warnings = report.warning_count();
    if errors + warnings == 0 {
        return out;
    }
    let summary = format!(
        "{} ({}, {})",
        plural(errors + warnings, "problem"),
        plural(errors, "error"),
        plural(warnings, "warning")
    );
    match (color, errors > 0) {
        (true, true) => {
            let _ = writeln!(out, "{}", summary.red().bold());
        }
        (true, false) => {
            let _ = writeln!(out, "{}", summary.yellow().bold());
        }
        (false, _) => {
            let _ = writeln!(out, "{summary}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use tagwise_engine::{Config, Engine};
    use tagwise_html::Source;

    use super::*;

    fn report(markup: &str) -> Report {
        Engine::from_config(&Config::default_config())
            .unwrap()
            .lint(&[Source::new(markup, "page.html")])
    }

    #[test]
    fn test_text_clean_report_is_empty() {
        assert_eq!(Format::Text.render(&report("<p>lorem</p>"), false).unwrap(), "");
    }

    #[test]
    fn test_text_lists_messages() {
        let output = Format::Text.render(&report("<div></div></p>"), false).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "page.html");
        assert!(lines[1].contains("1:12"));
        assert!(lines[1].contains("error"));
        assert!(lines[1].ends_with("close-order"));
        assert_eq!(lines.last(), Some(&"1 problem (1 error, 0 warnings)"));
    }

    #[test]
    fn test_json_output() {
        let output = Format::Json.render(&report("<p>lorem</p>"), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["valid"], serde_json::json!(true));
        assert_eq!(value["results"][0]["filePath"], serde_json::json!("page.html"));
    }
}
