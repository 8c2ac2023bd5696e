use apimodel_core::{Diagnostic, IssueCode, Location, Reporter};
use apimodel_model::{Codebase, CodebaseProvider, InputFormat, ProviderId, ProviderInput};

use crate::{FileFormat, SignatureCodebaseBuilder};

/// Builds a codebase from signature text files.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignatureProvider {
    default_format: FileFormat,
}

impl SignatureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format assumed for inputs without a header.
    pub fn with_default_format(mut self, format: FileFormat) -> Self {
        self.default_format = format;
        self
    }
}

impl CodebaseProvider for SignatureProvider {
    fn id(&self) -> ProviderId {
        ProviderId::SIGNATURE
    }

    fn supports(&self, format: InputFormat) -> bool {
        format == InputFormat::SignatureText
    }

    fn load(&self, inputs: &[ProviderInput], reporter: &mut dyn Reporter) -> Codebase {
        let description = describe(inputs);
        let mut builder =
            SignatureCodebaseBuilder::new(description).with_default_format(self.default_format);
        for input in inputs {
            if !self.supports(input.format) {
                reporter.report(Diagnostic::warning(
                    IssueCode::INVALID_FORMAT,
                    format!("signature provider cannot read {} input", input.format.as_str()),
                    input.path().map(Location::file),
                ));
                continue;
            }
            builder.add_text(&input.text, input.path(), reporter);
        }
        builder.build()
    }
}

fn describe(inputs: &[ProviderInput]) -> String {
    let paths: Vec<String> = inputs
        .iter()
        .filter_map(|input| input.path())
        .map(|path| path.display().to_string())
        .collect();
    if paths.is_empty() {
        "signature text".to_string()
    } else {
        format!("signature files {}", paths.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimodel_core::CollectingReporter;
    use pretty_assertions::assert_eq;

    #[test]
    fn loads_every_signature_input() {
        let inputs = vec![
            ProviderInput::from_text(
                InputFormat::SignatureText,
                "package a {\n  public class A {\n  }\n}\n",
            ),
            ProviderInput::from_text(
                InputFormat::SignatureText,
                "package b {\n  public class B extends a.A {\n  }\n}\n",
            ),
        ];
        let mut reporter = CollectingReporter::new();
        let codebase = SignatureProvider::new().load(&inputs, &mut reporter);

        assert!(reporter.diagnostics().is_empty());
        assert_eq!(codebase.origin(), ProviderId::SIGNATURE);
        let b = codebase.find_class("b.B").unwrap();
        assert_eq!(b.super_class().unwrap().qualified_name(), "a.A");
        assert!(b.super_class().unwrap().is_resolved());
    }

    #[test]
    fn foreign_inputs_are_reported_and_skipped() {
        let inputs = vec![ProviderInput::from_text(InputFormat::ClasspathIndex, "{}")];
        let mut reporter = CollectingReporter::new();
        let codebase = SignatureProvider::new().load(&inputs, &mut reporter);

        assert_eq!(codebase.class_count(), 0);
        assert_eq!(reporter.with_code(IssueCode::INVALID_FORMAT).count(), 1);
    }
}
