//! Explicit provider registry.
//!
//! Providers are registered once by the embedding application and passed around by
//! reference; nothing is discovered implicitly.

use std::fmt;
use std::path::{Path, PathBuf};

use apimodel_core::Reporter;

use crate::Codebase;

/// Stable name of a codebase provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(&'static str);

impl ProviderId {
    pub const SIGNATURE: ProviderId = ProviderId("signature");
    pub const SOURCE: ProviderId = ProviderId("source");
    pub const CLASSPATH: ProviderId = ProviderId("classpath");
    /// Codebases produced by merging two others.
    pub const MERGED: ProviderId = ProviderId("merged");

    pub const fn new(name: &'static str) -> Self {
        ProviderId(name)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputFormat {
    /// `// Signature format: N.N` text files.
    SignatureText,
    /// A serialized declaration tree from a source front end.
    SourceTree,
    /// A JSON index of compiled class stubs.
    ClasspathIndex,
}

impl InputFormat {
    pub const ALL: [InputFormat; 3] = [
        InputFormat::SignatureText,
        InputFormat::SourceTree,
        InputFormat::ClasspathIndex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InputFormat::SignatureText => "signature-text",
            InputFormat::SourceTree => "source-tree",
            InputFormat::ClasspathIndex => "classpath-index",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input file's contents, already read into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderInput {
    pub format: InputFormat,
    /// Where the text came from, for diagnostics.
    pub path: Option<PathBuf>,
    pub text: String,
}

impl ProviderInput {
    pub fn from_text(format: InputFormat, text: impl Into<String>) -> Self {
        Self {
            format,
            path: None,
            text: text.into(),
        }
    }

    pub fn read(format: InputFormat, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Ok(Self {
            format,
            path: Some(path.to_path_buf()),
            text,
        })
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Builds a [`Codebase`] from inputs of the formats it supports.
///
/// Problems with individual inputs are reported and the input skipped; loading itself never
/// fails.
pub trait CodebaseProvider {
    fn id(&self) -> ProviderId;

    fn supports(&self, format: InputFormat) -> bool;

    fn load(&self, inputs: &[ProviderInput], reporter: &mut dyn Reporter) -> Codebase;
}

#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn CodebaseProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider. A later provider with the same id replaces the earlier one.
    pub fn register(&mut self, provider: Box<dyn CodebaseProvider>) -> &mut Self {
        let id = provider.id();
        self.providers.retain(|p| p.id() != id);
        tracing::debug!(target: "apimodel.model", provider = %id, "registered codebase provider");
        self.providers.push(provider);
        self
    }

    pub fn with(mut self, provider: impl CodebaseProvider + 'static) -> Self {
        self.register(Box::new(provider));
        self
    }

    pub fn get(&self, id: ProviderId) -> Option<&dyn CodebaseProvider> {
        self.providers
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.as_ref())
    }

    pub fn providers(&self) -> impl Iterator<Item = &dyn CodebaseProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    /// Every `(provider, format)` combination the registered providers accept, in
    /// registration order.
    pub fn supported_pairs(&self) -> Vec<(ProviderId, InputFormat)> {
        self.providers
            .iter()
            .flat_map(|p| {
                InputFormat::ALL
                    .into_iter()
                    .filter(|format| p.supports(*format))
                    .map(move |format| (p.id(), format))
            })
            .collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimodel_core::CollectingReporter;
    use pretty_assertions::assert_eq;

    struct Fixed(ProviderId, InputFormat);

    impl CodebaseProvider for Fixed {
        fn id(&self) -> ProviderId {
            self.0
        }

        fn supports(&self, format: InputFormat) -> bool {
            format == self.1
        }

        fn load(&self, inputs: &[ProviderInput], _reporter: &mut dyn Reporter) -> Codebase {
            Codebase::new(format!("{} inputs", inputs.len()), self.0)
        }
    }

    #[test]
    fn registry_lists_supported_pairs_in_order() {
        let registry = ProviderRegistry::new()
            .with(Fixed(ProviderId::SOURCE, InputFormat::SourceTree))
            .with(Fixed(ProviderId::SIGNATURE, InputFormat::SignatureText));
        assert_eq!(
            registry.supported_pairs(),
            vec![
                (ProviderId::SOURCE, InputFormat::SourceTree),
                (ProviderId::SIGNATURE, InputFormat::SignatureText),
            ]
        );

        let provider = registry.get(ProviderId::SIGNATURE).unwrap();
        let mut reporter = CollectingReporter::new();
        let codebase = provider.load(
            &[ProviderInput::from_text(InputFormat::SignatureText, "")],
            &mut reporter,
        );
        assert_eq!(codebase.origin(), ProviderId::SIGNATURE);
        assert_eq!(codebase.description(), "1 inputs");
        assert!(registry.get(ProviderId::CLASSPATH).is_none());
    }

    #[test]
    fn re_registering_replaces_the_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(Fixed(ProviderId::SIGNATURE, InputFormat::SignatureText)));
        registry.register(Box::new(Fixed(ProviderId::SIGNATURE, InputFormat::SourceTree)));
        assert_eq!(
            registry.supported_pairs(),
            vec![(ProviderId::SIGNATURE, InputFormat::SourceTree)]
        );
    }
}
