use std::path::Path;

use apimodel_core::{Diagnostic, IssueCode, Location, Reporter};
use apimodel_model::{Codebase, ModelError, ProviderId};

use crate::{parse_signature, FileFormat, SignatureFile};

/// Accumulates signature files into one codebase.
///
/// A file that fails to parse is reported and contributes nothing; a class declared twice
/// keeps its first declaration and the later one is reported.
pub struct SignatureCodebaseBuilder {
    codebase: Codebase,
    default_format: FileFormat,
    format: Option<FileFormat>,
}

impl SignatureCodebaseBuilder {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            codebase: Codebase::new(description, ProviderId::SIGNATURE),
            default_format: FileFormat::default(),
            format: None,
        }
    }

    /// Format assumed for files without a header.
    pub fn with_default_format(mut self, format: FileFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Format of the first file that parsed, if any.
    pub fn format(&self) -> Option<FileFormat> {
        self.format
    }

    /// Returns whether the file parsed.
    pub fn add_text(&mut self, text: &str, path: Option<&Path>, reporter: &mut dyn Reporter) -> bool {
        match parse_signature(text, self.default_format) {
            Ok(file) => {
                self.add_file(file, path, reporter);
                true
            }
            Err(err) => {
                tracing::warn!(
                    target: "apimodel.signature",
                    path = ?path,
                    line = err.line(),
                    error = %err,
                    "skipping unreadable signature file"
                );
                reporter.report(err.to_diagnostic(path));
                false
            }
        }
    }

    pub fn add_file(&mut self, file: SignatureFile, path: Option<&Path>, reporter: &mut dyn Reporter) {
        self.format.get_or_insert(file.format);
        for class in file.classes {
            match self.codebase.define_class(&class.name, class.data) {
                Ok(_) => {}
                Err(ModelError::DuplicateClass(name)) => {
                    tracing::warn!(
                        target: "apimodel.signature",
                        class = %name,
                        line = class.line,
                        "ignoring duplicate class declaration"
                    );
                    reporter.report(Diagnostic::warning(
                        IssueCode::DUPLICATE_CLASS,
                        format!("class `{name}` is already declared; keeping the first declaration"),
                        Some(Location::new(path, class.line)),
                    ));
                }
                Err(err) => reporter.report(Diagnostic::error(
                    IssueCode::PARSE_ERROR,
                    err.to_string(),
                    Some(Location::new(path, class.line)),
                )),
            }
        }
    }

    pub fn build(self) -> Codebase {
        tracing::debug!(
            target: "apimodel.signature",
            packages = self.codebase.size(),
            classes = self.codebase.class_count(),
            "built signature codebase"
        );
        self.codebase
    }
}
