//! Core shared types for the API model crates.
//!
//! This crate is intentionally small: diagnostics and reporting, plus the
//! naming rules (packages, qualified class names) every provider agrees on.

mod diagnostics;
mod names;

pub use diagnostics::{
    CollectingReporter, Diagnostic, IssueCode, Location, Reporter, Severity, TracingReporter,
};
pub use names::{
    compare_package_names, split_qualified_name, PackageName, QualifiedName, JAVA_LANG_PACKAGE,
    JAVA_LANG_OBJECT,
};
