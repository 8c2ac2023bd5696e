use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

use apimodel_core::{compare_package_names, Diagnostic, IssueCode, Reporter};
use apimodel_model::{Codebase, ModelError, ProviderId};
use serde::{Deserialize, Serialize};

use crate::error::ClasspathError;
use crate::stub::ClassStub;

/// On-disk form of an index: a flat list of class stubs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    classes: Vec<ClassStub>,
}

/// Class stubs keyed by binary name, with sorted name and package listings.
#[derive(Clone, Debug, Default)]
pub struct ClasspathIndex {
    stubs_by_binary: HashMap<String, ClassStub>,
    binary_names_sorted: Vec<String>,
    packages_sorted: Vec<String>,
}

impl ClasspathIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stubs(stubs: impl IntoIterator<Item = ClassStub>) -> Self {
        let mut index = Self::new();
        for stub in stubs {
            index.insert(stub);
        }
        index
    }

    /// Parses a JSON index (`{ "classes": [ ... ] }`).
    pub fn from_json_str(text: &str) -> Result<Self, ClasspathError> {
        let file: IndexFile = serde_json::from_str(text)?;
        Ok(Self::from_stubs(file.classes))
    }

    pub fn load_json(path: &Path) -> Result<Self, ClasspathError> {
        let text = std::fs::read_to_string(path).map_err(|source| ClasspathError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Loads every `*.json` index below `dir`, in path order. Later indexes replace classes
    /// already loaded.
    pub fn load_dir(dir: &Path) -> Result<Self, ClasspathError> {
        let mut paths = Vec::new();
        for entry in walkdir::WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|err| ClasspathError::Io {
                path: err.path().unwrap_or(dir).to_path_buf(),
                source: err.into(),
            })?;
            if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new("json")) {
                paths.push(entry.into_path());
            }
        }
        paths.sort();

        let mut index = Self::new();
        for path in paths {
            index.extend(Self::load_json(&path)?);
        }
        Ok(index)
    }

    /// Adds a stub, replacing any earlier stub with the same binary name.
    pub fn insert(&mut self, stub: ClassStub) -> Option<ClassStub> {
        let name = stub.binary_name.clone();
        let package = stub.package().to_string();
        let previous = self.stubs_by_binary.insert(name.clone(), stub);
        if previous.is_none() {
            let pos = self.binary_names_sorted.partition_point(|n| *n < name);
            self.binary_names_sorted.insert(pos, name);
            if let Err(pos) = self.packages_sorted.binary_search(&package) {
                self.packages_sorted.insert(pos, package);
            }
        }
        previous
    }

    pub fn extend(&mut self, other: ClasspathIndex) {
        for (_, stub) in other.stubs_by_binary {
            self.insert(stub);
        }
    }

    pub fn len(&self) -> usize {
        self.stubs_by_binary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs_by_binary.is_empty()
    }

    pub fn lookup_binary(&self, binary_name: &str) -> Option<&ClassStub> {
        self.stubs_by_binary.get(binary_name)
    }

    /// Stubs in binary-name order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassStub> {
        self.binary_names_sorted
            .iter()
            .filter_map(|name| self.stubs_by_binary.get(name))
    }

    pub fn packages(&self) -> &[String] {
        &self.packages_sorted
    }

    pub fn package_exists(&self, package: &str) -> bool {
        self.packages_sorted.binary_search_by(|p| p.as_str().cmp(package)).is_ok()
    }

    /// Binary names of the classes declared directly in `package`, sorted.
    pub fn classes_in_package(&self, package: &str) -> Vec<&str> {
        let prefix = if package.is_empty() {
            String::new()
        } else {
            format!("{package}.")
        };
        self.binary_names_sorted
            .iter()
            .filter(|name| {
                name.strip_prefix(prefix.as_str())
                    .is_some_and(|rest| !rest.contains('.'))
            })
            .map(String::as_str)
            .collect()
    }

    pub fn class_names_with_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = normalize_binary_prefix(prefix);
        let names = &self.binary_names_sorted;
        let start = names.partition_point(|name| name.as_str() < prefix.as_ref());
        names[start..]
            .iter()
            .take_while(|name| name.starts_with(prefix.as_ref()))
            .cloned()
            .collect()
    }

    /// Builds a codebase holding every indexed class with `emit == false`.
    ///
    /// Stubs whose descriptors or signatures do not parse are reported as
    /// `invalid-descriptor` and left out.
    pub fn to_codebase(&self, reporter: &mut dyn Reporter) -> Codebase {
        let mut codebase = Codebase::new("classpath index", ProviderId::CLASSPATH);
        let mut ordered: Vec<&ClassStub> = self.iter().collect();
        ordered.sort_by(|a, b| {
            compare_package_names(a.package(), b.package()).then_with(|| a.binary_name.cmp(&b.binary_name))
        });

        for stub in ordered {
            let data = match stub.to_class_data() {
                Ok(data) => data,
                Err(source) => {
                    let err = ClasspathError::Descriptor {
                        class: stub.binary_name.clone(),
                        source,
                    };
                    tracing::warn!(target: "apimodel.classpath", error = %err, "skipping class stub");
                    reporter.report(Diagnostic::warning(IssueCode::INVALID_DESCRIPTOR, err.to_string(), None));
                    continue;
                }
            };
            match codebase.define_class(&stub.qualified_name(), data) {
                Ok(_) => {}
                Err(ModelError::DuplicateClass(name)) => {
                    reporter.report(Diagnostic::warning(
                        IssueCode::DUPLICATE_CLASS,
                        format!("class `{name}` is indexed twice"),
                        None,
                    ));
                }
                Err(err) => reporter.report(Diagnostic::error(IssueCode::INVALID_FORMAT, err.to_string(), None)),
            }
        }

        tracing::debug!(
            target: "apimodel.classpath",
            classes = self.len(),
            packages = self.packages_sorted.len(),
            "built classpath codebase"
        );
        codebase
    }
}

fn normalize_binary_prefix(prefix: &str) -> Cow<'_, str> {
    if prefix.contains('/') {
        Cow::Owned(prefix.replace('/', "."))
    } else {
        Cow::Borrowed(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{ACC_PUBLIC, ACC_STATIC};
    use apimodel_core::CollectingReporter;
    use apimodel_model::SelectableItem;
    use pretty_assertions::assert_eq;

    fn index() -> ClasspathIndex {
        ClasspathIndex::from_stubs([
            ClassStub::new("java.util.Map", ACC_PUBLIC),
            ClassStub::new("java.util.Map$Entry", ACC_PUBLIC | ACC_STATIC),
            ClassStub::new("java.lang.Object", ACC_PUBLIC),
            ClassStub::new("java.util.concurrent.Future", ACC_PUBLIC),
        ])
    }

    #[test]
    fn listings_are_sorted() {
        let index = index();
        assert_eq!(index.len(), 4);
        assert_eq!(
            index.packages(),
            &["java.lang".to_string(), "java.util".into(), "java.util.concurrent".into()]
        );
        assert_eq!(index.classes_in_package("java.util"), vec!["java.util.Map", "java.util.Map$Entry"]);
        assert_eq!(
            index.class_names_with_prefix("java/util/Map"),
            vec!["java.util.Map".to_string(), "java.util.Map$Entry".into()]
        );
        assert!(index.package_exists("java.lang"));
        assert!(!index.package_exists("java"));
    }

    #[test]
    fn insert_replaces_by_binary_name() {
        let mut index = index();
        let previous = index.insert(ClassStub::new("java.util.Map", ACC_PUBLIC | ACC_STATIC));
        assert!(previous.is_some());
        assert_eq!(index.len(), 4);
        assert_eq!(index.iter().count(), 4);
    }

    #[test]
    fn codebase_classes_are_not_emitted() {
        let mut reporter = CollectingReporter::new();
        let codebase = index().to_codebase(&mut reporter);
        assert!(reporter.diagnostics().is_empty());
        assert_eq!(codebase.origin(), ProviderId::CLASSPATH);

        let entry = codebase.find_class("java.util.Map.Entry").unwrap();
        assert!(entry.is_resolved());
        assert!(!entry.emit());
        assert_eq!(entry.containing_class().unwrap().qualified_name(), "java.util.Map");
        assert_eq!(codebase.declared_classes().count(), 0);
    }
}
