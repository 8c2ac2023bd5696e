use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Stable identifier for a class of reported issue.
///
/// Codes are part of the public contract: tooling filters and baselines key off them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueCode(&'static str);

impl IssueCode {
    pub const PARSE_ERROR: IssueCode = IssueCode("parse-error");
    pub const INVALID_FORMAT: IssueCode = IssueCode("invalid-format");
    pub const DUPLICATE_CLASS: IssueCode = IssueCode("duplicate-class");
    pub const UNRESOLVED_CLASS: IssueCode = IssueCode("unresolved-class");
    pub const IO_ERROR: IssueCode = IssueCode("io-error");
    pub const INVALID_DESCRIPTOR: IssueCode = IssueCode("invalid-descriptor");

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A file position, 1-based line. `line == 0` means "somewhere in the file".
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: Option<PathBuf>,
    pub line: u32,
}

impl Location {
    pub fn new(path: Option<&Path>, line: u32) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            line,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            line: 0,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        if self.line == 0 {
            write!(f, "{path}")
        } else {
            write!(f, "{path}:{}", self.line)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn error(code: IssueCode, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            location,
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location,
        }
    }

    pub fn info(code: IssueCode, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{}: {} [{}]", self.severity, self.message, self.code)
    }
}

/// Sink for diagnostics produced while loading, merging or writing a codebase.
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Keeps every diagnostic in memory, in report order.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Forwards diagnostics to `tracing`, mapping severities onto log levels.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        let location = diagnostic
            .location
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        match diagnostic.severity {
            Severity::Error => tracing::error!(
                target: "apimodel.report",
                code = %diagnostic.code,
                location = %location,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => tracing::warn!(
                target: "apimodel.report",
                code = %diagnostic.code,
                location = %location,
                "{}",
                diagnostic.message
            ),
            Severity::Info => tracing::info!(
                target: "apimodel.report",
                code = %diagnostic.code,
                location = %location,
                "{}",
                diagnostic.message
            ),
        }
    }
}
