use apimodel_core::{Diagnostic, IssueCode, Location, Reporter};
use apimodel_model::{Codebase, CodebaseProvider, InputFormat, ProviderId, ProviderInput};

use crate::lower::lower_units;
use crate::tree::SourceTree;

/// Builds a codebase from parsed source trees.
///
/// Every input is a JSON [`SourceTree`]. Units from all inputs are lowered together so that
/// a name in one input can resolve to a class declared in another.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceProvider;

impl SourceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CodebaseProvider for SourceProvider {
    fn id(&self) -> ProviderId {
        ProviderId::SOURCE
    }

    fn supports(&self, format: InputFormat) -> bool {
        format == InputFormat::SourceTree
    }

    fn load(&self, inputs: &[ProviderInput], reporter: &mut dyn Reporter) -> Codebase {
        let mut units = Vec::new();
        for input in inputs {
            let location = input.path().map(Location::file);
            if !self.supports(input.format) {
                reporter.report(Diagnostic::warning(
                    IssueCode::INVALID_FORMAT,
                    format!("source provider cannot read {} input", input.format.as_str()),
                    location,
                ));
                continue;
            }
            match SourceTree::from_json_str(&input.text) {
                Ok(tree) => units.extend(tree.units),
                Err(err) => {
                    tracing::warn!(target: "apimodel.source", error = %err, "skipping source input");
                    reporter.report(Diagnostic::error(IssueCode::INVALID_FORMAT, err.to_string(), location));
                }
            }
        }
        lower_units(&units, reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimodel_core::CollectingReporter;
    use pretty_assertions::assert_eq;

    #[test]
    fn bad_json_is_reported_with_its_path() {
        let inputs = vec![
            ProviderInput::from_text(InputFormat::SourceTree, "{\"units\": [").with_path("broken.json"),
            ProviderInput::from_text(
                InputFormat::SourceTree,
                r#"{"units":[{"package":"a","types":[{"name":"A"}]}]}"#,
            ),
        ];
        let mut reporter = CollectingReporter::new();
        let codebase = SourceProvider::new().load(&inputs, &mut reporter);

        let errors: Vec<_> = reporter.with_code(IssueCode::INVALID_FORMAT).collect();
        assert_eq!(errors.len(), 1);
        let location = errors[0].location.as_ref().unwrap();
        assert_eq!(location.path.as_deref(), Some(std::path::Path::new("broken.json")));
        assert!(codebase.find_class("a.A").unwrap().is_resolved());
        assert_eq!(codebase.origin(), ProviderId::SOURCE);
    }

    #[test]
    fn signature_inputs_are_skipped() {
        let inputs = vec![ProviderInput::from_text(InputFormat::SignatureText, "package a {\n}\n")];
        let mut reporter = CollectingReporter::new();
        let codebase = SourceProvider::new().load(&inputs, &mut reporter);
        assert_eq!(codebase.class_count(), 0);
        assert_eq!(reporter.with_code(IssueCode::INVALID_FORMAT).count(), 1);
    }
}
