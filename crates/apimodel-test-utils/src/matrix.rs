use std::panic::{self, AssertUnwindSafe};

use apimodel_classpath::ClasspathProvider;
use apimodel_core::{CollectingReporter, Diagnostic};
use apimodel_model::{Codebase, InputFormat, ProviderId, ProviderRegistry};
use apimodel_signature::SignatureProvider;
use apimodel_source::SourceProvider;

use crate::ApiFixture;

/// A registry with the signature, source and classpath providers.
pub fn default_registry() -> ProviderRegistry {
    ProviderRegistry::new()
        .with(SignatureProvider::new())
        .with(SourceProvider::new())
        .with(ClasspathProvider::new())
}

/// One loaded `(provider, format)` combination.
#[derive(Debug)]
pub struct ProviderCase {
    pub provider: ProviderId,
    pub format: InputFormat,
    pub codebase: Codebase,
    pub diagnostics: Vec<Diagnostic>,
}

impl ProviderCase {
    pub fn label(&self) -> String {
        format!("{}/{}", self.provider, self.format)
    }
}

/// Runs a test body once per `(ProviderId, InputFormat)` pair.
pub struct ProviderMatrix<'r> {
    registry: &'r ProviderRegistry,
}

impl<'r> ProviderMatrix<'r> {
    pub fn new(registry: &'r ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Loads `fixture` with every supported pair it has inputs for and calls `body` on each.
    ///
    /// All pairs run even when one fails; the panic raised afterwards names every failing
    /// pair. Returns the number of pairs run. A fixture that matches no pair panics.
    pub fn run(&self, fixture: &ApiFixture, mut body: impl FnMut(&ProviderCase)) -> usize {
        let mut failures = Vec::new();
        let mut runs = 0;
        for (id, format) in self.registry.supported_pairs() {
            let inputs = fixture.inputs_for(format);
            if inputs.is_empty() {
                continue;
            }
            let Some(provider) = self.registry.get(id) else {
                continue;
            };
            let mut reporter = CollectingReporter::new();
            let codebase = provider.load(&inputs, &mut reporter);
            let case = ProviderCase {
                provider: id,
                format,
                codebase,
                diagnostics: reporter.into_diagnostics(),
            };
            tracing::debug!(target: "apimodel.test", fixture = %fixture.name, case = %case.label(), "running case");
            runs += 1;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| body(&case))) {
                failures.push(format!("[{}] {}", case.label(), panic_message(payload.as_ref())));
            }
        }
        assert!(runs > 0, "fixture `{}` has no inputs any provider accepts", fixture.name);
        if !failures.is_empty() {
            panic!(
                "fixture `{}` failed for {} of {runs} cases:\n{}",
                fixture.name,
                failures.len(),
                failures.join("\n")
            );
        }
        runs
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
