use std::path::Path;

use apimodel_core::{Diagnostic, IssueCode, Location};
use apimodel_types::TypeParseError;
use thiserror::Error;

/// A problem that makes a signature file unreadable. Lines are 1-based.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("{message}")]
    InvalidFormat { line: u32, message: String },
    #[error("{message}")]
    Syntax { line: u32, message: String },
    #[error("{source}")]
    Type {
        line: u32,
        #[source]
        source: TypeParseError,
    },
}

impl SignatureError {
    pub fn line(&self) -> u32 {
        match self {
            SignatureError::InvalidFormat { line, .. }
            | SignatureError::Syntax { line, .. }
            | SignatureError::Type { line, .. } => *line,
        }
    }

    pub fn code(&self) -> IssueCode {
        match self {
            SignatureError::InvalidFormat { .. } => IssueCode::INVALID_FORMAT,
            SignatureError::Syntax { .. } | SignatureError::Type { .. } => IssueCode::PARSE_ERROR,
        }
    }

    pub fn to_diagnostic(&self, path: Option<&Path>) -> Diagnostic {
        Diagnostic::error(
            self.code(),
            self.to_string(),
            Some(Location::new(path, self.line())),
        )
    }
}
