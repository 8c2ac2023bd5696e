use apimodel_core::{Diagnostic, IssueCode, Location, Reporter};
use apimodel_model::{Codebase, CodebaseProvider, InputFormat, ProviderId, ProviderInput};

use crate::ClasspathIndex;

/// Builds a codebase of `emit == false` classes from JSON classpath indexes.
///
/// All inputs are merged into one index first; a later input's stub replaces an earlier
/// one with the same binary name.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClasspathProvider;

impl ClasspathProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn index(&self, inputs: &[ProviderInput], reporter: &mut dyn Reporter) -> ClasspathIndex {
        let mut index = ClasspathIndex::new();
        for input in inputs {
            if input.format != InputFormat::ClasspathIndex {
                reporter.report(Diagnostic::warning(
                    IssueCode::INVALID_FORMAT,
                    format!("classpath provider cannot read {} input", input.format.as_str()),
                    input.path().map(Location::file),
                ));
                continue;
            }
            match ClasspathIndex::from_json_str(&input.text) {
                Ok(loaded) => index.extend(loaded),
                Err(err) => {
                    tracing::warn!(
                        target: "apimodel.classpath",
                        path = ?input.path(),
                        error = %err,
                        "skipping unreadable classpath index"
                    );
                    reporter.report(Diagnostic::error(
                        IssueCode::INVALID_FORMAT,
                        err.to_string(),
                        input.path().map(Location::file),
                    ));
                }
            }
        }
        index
    }
}

impl CodebaseProvider for ClasspathProvider {
    fn id(&self) -> ProviderId {
        ProviderId::CLASSPATH
    }

    fn supports(&self, format: InputFormat) -> bool {
        format == InputFormat::ClasspathIndex
    }

    fn load(&self, inputs: &[ProviderInput], reporter: &mut dyn Reporter) -> Codebase {
        self.index(inputs, reporter).to_codebase(reporter)
    }
}
