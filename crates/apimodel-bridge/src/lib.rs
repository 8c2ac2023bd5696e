//! Classpath-resolution bridge: completes a text codebase with classes from a classpath
//! codebase.
//!
//! Classes the text input declares always win. Stubs the text input only references are
//! bound in place to a copy of the classpath declaration, so every id and key taken before the
//! merge still names the same class afterwards. Classes the classpath knows about and the text
//! does not are copied over. Everything that came from the classpath keeps `emit == false`.

#![forbid(unsafe_code)]

use std::collections::HashSet;

use apimodel_core::{Diagnostic, IssueCode, QualifiedName, Reporter};
use apimodel_model::{ClassData, ClassId, ClassItem, Codebase, ModelError, ProviderId};

/// Counters describing one merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Stubs bound to a classpath declaration.
    pub resolved: usize,
    /// Stubs left empty because the classpath does not have them either.
    pub unresolved: usize,
    /// Classpath classes added without having been referenced first.
    pub copied: usize,
    /// Classpath packages the text codebase did not have.
    pub unique_packages: usize,
}

pub struct ClasspathBridge<'cp> {
    merged: Codebase,
    classpath: &'cp Codebase,
    text_packages: HashSet<String>,
    in_progress: HashSet<String>,
    loaded: HashSet<String>,
    stats: MergeStats,
}

impl<'cp> ClasspathBridge<'cp> {
    /// A bridge that resolves nothing up front; classes are pulled in by
    /// [`ClasspathBridge::ensure_class`].
    pub fn new(text: &Codebase, classpath: &'cp Codebase) -> Self {
        let text_packages = text
            .packages()
            .iter()
            .filter(|package| package.classes().iter().any(ClassItem::is_resolved))
            .map(|package| package.name().to_string())
            .collect();
        let mut merged = text.clone();
        merged.relabel(
            format!("{} + {}", text.description(), classpath.description()),
            ProviderId::MERGED,
        );
        Self {
            merged,
            classpath,
            text_packages,
            in_progress: HashSet::new(),
            loaded: HashSet::new(),
            stats: MergeStats::default(),
        }
    }

    /// Resolves every stub the classpath can answer for, then copies the remaining classpath
    /// classes over.
    pub fn merge(text: &Codebase, classpath: &'cp Codebase) -> Self {
        let mut bridge = Self::new(text, classpath);
        bridge.resolve_stubs();
        bridge.copy_packages();
        // Copied classes can reference classes nobody asked for yet.
        bridge.resolve_stubs();
        tracing::debug!(
            target: "apimodel.bridge",
            resolved = bridge.stats.resolved,
            copied = bridge.stats.copied,
            unique_packages = bridge.stats.unique_packages,
            unresolved = bridge.unresolved_count(),
            "merged classpath into text codebase"
        );
        bridge
    }

    pub fn codebase(&self) -> &Codebase {
        &self.merged
    }

    pub fn into_codebase(self) -> Codebase {
        self.merged
    }

    pub fn stats(&self) -> MergeStats {
        MergeStats {
            unresolved: self.unresolved_count(),
            ..self.stats
        }
    }

    fn unresolved_count(&self) -> usize {
        self.merged.stub_classes().count()
    }

    /// Qualified names of the stubs neither side could resolve, sorted.
    pub fn unresolved_classes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.merged.stub_classes().map(|c| c.qualified_name()).collect();
        names.sort_unstable();
        names
    }

    /// Reports each unresolved stub as an informational `unresolved-class` diagnostic.
    pub fn report_unresolved(&self, reporter: &mut dyn Reporter) {
        for name in self.unresolved_classes() {
            reporter.report(Diagnostic::info(
                IssueCode::UNRESOLVED_CLASS,
                format!("class `{name}` is referenced but not found on the classpath"),
                None,
            ));
        }
    }

    /// Text first, classpath second.
    pub fn find_class(&self, qualified_name: &str) -> Option<ClassItem<'_>> {
        let text = self.merged.find_class(qualified_name);
        match text {
            Some(class) if class.is_resolved() => Some(class),
            _ => self
                .classpath
                .find_class(qualified_name)
                .filter(ClassItem::is_resolved)
                .or(text),
        }
    }

    /// Makes sure `qualified_name` is bound in the merged codebase, loading it and its
    /// supertypes from the classpath when needed.
    ///
    /// Returns the class id, which for a stub is the id it had before. Classes the text input
    /// declares are never replaced. Calling this again for the same class is a no-op.
    pub fn ensure_class(&mut self, qualified_name: &str) -> Option<ClassId> {
        if self.loaded.contains(qualified_name) || self.in_progress.contains(qualified_name) {
            return self.merged.find_class_id(qualified_name);
        }

        let existing = self.merged.find_class_id(qualified_name);
        if existing.is_some_and(|id| self.merged.is_resolved(id)) {
            self.loaded.insert(qualified_name.to_string());
            return existing;
        }
        let Some((name, data)) = self.classpath_declaration(qualified_name) else {
            tracing::trace!(target: "apimodel.bridge", class = %qualified_name, "not on classpath");
            return existing;
        };

        self.in_progress.insert(qualified_name.to_string());
        let supertypes: Vec<String> = data
            .super_class_type
            .iter()
            .chain(&data.interface_types)
            .filter_map(|ty| ty.as_class())
            .map(|class| class.qualified_name.clone())
            .collect();

        let id = match self.merged.define_class(&name, data) {
            Ok(id) => {
                if existing.is_some() {
                    self.stats.resolved += 1;
                    tracing::trace!(target: "apimodel.bridge", class = %qualified_name, "resolved stub");
                } else {
                    self.stats.copied += 1;
                }
                Some(id)
            }
            Err(ModelError::DuplicateClass(_)) | Err(ModelError::NotAStub(_)) => existing,
        };
        for supertype in supertypes {
            self.ensure_class(&supertype);
        }

        self.in_progress.remove(qualified_name);
        self.loaded.insert(qualified_name.to_string());
        id
    }

    /// The classpath's declaration of `qualified_name`, copied for the merged codebase.
    fn classpath_declaration(&self, qualified_name: &str) -> Option<(QualifiedName, ClassData)> {
        let class = self.classpath.find_class(qualified_name)?;
        let mut data = class.data()?.clone();
        data.emit = false;
        let name = QualifiedName::new(class.package().package_name().clone(), class.full_name());
        Some((name, data))
    }

    /// Binds every stub the classpath declares. Newly bound classes may reference further
    /// stubs, so this runs until nothing changes.
    fn resolve_stubs(&mut self) {
        loop {
            let pending: Vec<String> = self
                .merged
                .stub_classes()
                .map(|class| class.qualified_name().to_string())
                .filter(|name| !self.loaded.contains(name))
                .collect();
            if pending.is_empty() {
                break;
            }
            for name in &pending {
                self.ensure_class(name);
                self.loaded.insert(name.clone());
            }
        }
    }

    /// Adds the classpath classes the text codebase does not have, package by package in
    /// canonical order.
    fn copy_packages(&mut self) {
        let classpath = self.classpath;
        for package in classpath.packages() {
            let classes = package.all_classes();
            if !classes.iter().any(ClassItem::is_resolved) {
                continue;
            }
            if !self.text_packages.contains(package.name()) {
                self.stats.unique_packages += 1;
                tracing::trace!(target: "apimodel.bridge", package = %package.name(), "adding classpath package");
            }
            for class in classes {
                if class.is_resolved() && self.merged.find_class(class.qualified_name()).is_none() {
                    self.ensure_class(class.qualified_name());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimodel_core::PackageName;
    use apimodel_model::ClassKind;
    use apimodel_types::TypeItem;

    fn declare(codebase: &mut Codebase, package: &str, class_path: &str, super_class: Option<&str>) {
        let mut data = ClassData::new(ClassKind::Class);
        data.super_class_type = super_class.map(|name| TypeItem::class(name, Vec::new()));
        codebase
            .define_class(&QualifiedName::new(PackageName::new(package), class_path), data)
            .unwrap();
    }

    #[test]
    fn cyclic_hierarchies_terminate() {
        let mut classpath = Codebase::new("classpath", ProviderId::CLASSPATH);
        declare(&mut classpath, "a", "A", Some("a.B"));
        declare(&mut classpath, "a", "B", Some("a.A"));
        let mut text = Codebase::new("text", ProviderId::SIGNATURE);
        declare(&mut text, "t", "T", Some("a.A"));

        let mut bridge = ClasspathBridge::new(&text, &classpath);
        let id = bridge.ensure_class("a.A");
        assert!(id.is_some());
        assert!(bridge.codebase().find_class("a.B").unwrap().is_resolved());
        assert_eq!(bridge.ensure_class("a.A"), id);
        assert_eq!(bridge.stats().resolved, 2);
    }
}
