//! Diagnostic collection.

use serde::Serialize;
use serde_json::Value;
use tagwise_common::Location;
use tagwise_html::Source;

use crate::config::Severity;

/// One diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Rule that produced the message, or `parser-error`.
    pub rule_id: String,
    /// Severity the rule was configured at.
    pub severity: Severity,
    /// Human readable text.
    pub message: String,
    /// 0-based byte offset.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// Length of the offending span.
    pub size: usize,
    /// Rule-specific data for [`Engine::get_rule_documentation`](crate::Engine::get_rule_documentation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl Message {
    /// A message located at `location`.
    #[must_use]
    pub fn new(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>, location: &Location) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            offset: location.offset,
            line: location.line,
            column: location.column,
            size: location.size,
            context: None,
        }
    }

    /// Attach rule-specific context.
    #[must_use]
    pub fn with_context(mut self, context: Option<Value>) -> Self {
        self.context = context;
        self
    }
}

/// Messages for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    /// The file name.
    pub file_path: String,
    /// Messages sorted by line, then column.
    pub messages: Vec<Message>,
    /// Number of error messages.
    pub error_count: usize,
    /// Number of warning messages.
    pub warning_count: usize,
    /// Source text, for formatters that show excerpts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl FileResult {
    fn new(file_path: String, mut messages: Vec<Message>, source: Option<String>) -> Self {
        messages.sort_by_key(|message| (message.line, message.column));
        let error_count = messages.iter().filter(|m| m.severity == Severity::Error).count();
        let warning_count = messages.iter().filter(|m| m.severity == Severity::Warn).count();
        Self {
            file_path,
            messages,
            error_count,
            warning_count,
            source,
        }
    }
}

/// The outcome of linting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// `true` when no file has an error.
    pub valid: bool,
    /// One entry per linted file, in lint order.
    pub results: Vec<FileResult>,
}

impl Report {
    /// Combine reports. Results for the same file are concatenated and re-sorted.
    #[must_use]
    pub fn merge(reports: impl IntoIterator<Item = Self>) -> Self {
        let mut results: Vec<FileResult> = Vec::new();
        for report in reports {
            for result in report.results {
                match results.iter_mut().find(|r| r.file_path == result.file_path) {
                    Some(existing) => {
                        let mut messages = std::mem::take(&mut existing.messages);
                        messages.extend(result.messages);
                        let source = existing.source.take().or(result.source);
                        *existing = FileResult::new(result.file_path, messages, source);
                    }
                    None => results.push(result),
                }
            }
        }
        Self {
            valid: results.iter().all(|r| r.error_count == 0),
            results,
        }
    }

    /// Total number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.results.iter().map(|r| r.error_count).sum()
    }

    /// Total number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.results.iter().map(|r| r.warning_count).sum()
    }
}

/// Collects messages per file while linting.
#[derive(Debug, Default)]
pub struct Reporter {
    files: Vec<(String, Vec<Message>)>,
}

impl Reporter {
    /// An empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, filename: &str) -> &mut Vec<Message> {
        let index = match self.files.iter().position(|(name, _)| name == filename) {
            Some(index) => index,
            None => {
                self.files.push((filename.to_string(), Vec::new()));
                self.files.len() - 1
            }
        };
        &mut self.files[index].1
    }

    /// Make sure `filename` gets a result even if nothing is reported for it.
    pub fn add_file(&mut self, filename: &str) {
        let _ = self.entry(filename);
    }

    /// Record a message at `location`, filed under the location's file.
    pub fn add(
        &mut self,
        rule_id: &str,
        severity: Severity,
        message: impl Into<String>,
        location: &Location,
        context: Option<Value>,
    ) {
        let message = Message::new(rule_id, severity, message, location).with_context(context);
        self.entry(&location.filename).push(message);
    }

    /// Record a prepared message.
    pub fn add_manual(&mut self, filename: &str, message: Message) {
        self.entry(filename).push(message);
    }

    /// Whether any recorded message is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.files
            .iter()
            .any(|(_, messages)| messages.iter().any(|m| m.severity == Severity::Error))
    }

    /// Build the report. Source text is attached from `sources` by file name.
    #[must_use]
    pub fn save(&self, sources: &[Source]) -> Report {
        let results: Vec<FileResult> = self
            .files
            .iter()
            .map(|(filename, messages)| {
                let source = sources
                    .iter()
                    .find(|source| &source.filename == filename)
                    .map(|source| source.original_data.clone().unwrap_or_else(|| source.data.clone()));
                FileResult::new(filename.clone(), messages.clone(), source)
            })
            .collect();
        Report {
            valid: results.iter().all(|r| r.error_count == 0),
            results,
        }
    }
}
