use std::collections::{HashMap, HashSet};

use apimodel_core::JAVA_LANG_PACKAGE;
use apimodel_types::{AnnotationItem, ClassTypeItem, TypeItem, WildcardBound};

use crate::tree::CompilationUnit;

/// Top-level `java.lang` classes a source file can name without an import.
const JAVA_LANG_CLASSES: &[&str] = &[
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassCastException",
    "CloneNotSupportedException",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "Object",
    "Override",
    "Record",
    "Runnable",
    "RuntimeException",
    "SafeVarargs",
    "Short",
    "String",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

/// Resolves names written in one compilation unit.
///
/// A leading simple name is looked up in member types of the enclosing classes (innermost
/// first), single-type imports, the unit's package, on-demand imports and `java.lang`, in
/// that order. Type variables never reach the resolver; the type parser already knows them.
pub(crate) struct NameResolver<'a> {
    known: &'a HashSet<String>,
    package: &'a str,
    single_imports: HashMap<&'a str, &'a str>,
    wildcard_imports: Vec<&'a str>,
}

impl<'a> NameResolver<'a> {
    pub(crate) fn new(unit: &'a CompilationUnit, known: &'a HashSet<String>) -> Self {
        let mut single_imports = HashMap::new();
        let mut wildcard_imports = Vec::new();
        for import in &unit.imports {
            let import = import.trim();
            if let Some(package) = import.strip_suffix(".*") {
                wildcard_imports.push(package);
            } else if let Some((_, simple)) = import.rsplit_once('.') {
                single_imports.insert(simple, import);
            }
        }
        Self {
            known,
            package: &unit.package,
            single_imports,
            wildcard_imports,
        }
    }

    fn qualify_in(package: &str, name: &str) -> String {
        if package.is_empty() {
            name.to_string()
        } else {
            format!("{package}.{name}")
        }
    }

    /// `enclosing` lists the qualified names of the classes around the use, innermost first.
    pub(crate) fn resolve(&self, name: &str, enclosing: &[String]) -> String {
        let (first, rest) = match name.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        let join = |head: String| match rest {
            Some(rest) => format!("{head}.{rest}"),
            None => head,
        };

        for outer in enclosing {
            let candidate = format!("{outer}.{first}");
            if self.known.contains(&candidate) {
                return join(candidate);
            }
        }
        if let Some(imported) = self.single_imports.get(first) {
            return join(imported.to_string());
        }
        let same_package = Self::qualify_in(self.package, first);
        if self.known.contains(&same_package) {
            return join(same_package);
        }
        for package in &self.wildcard_imports {
            let candidate = Self::qualify_in(package, first);
            if self.known.contains(&candidate) {
                return join(candidate);
            }
        }
        if JAVA_LANG_CLASSES.contains(&first) {
            return join(format!("{JAVA_LANG_PACKAGE}.{first}"));
        }
        if rest.is_some() && first.starts_with(|c: char| c.is_ascii_lowercase()) {
            // Already qualified.
            return name.to_string();
        }
        join(same_package)
    }

    pub(crate) fn resolve_annotation(&self, annotation: &mut AnnotationItem, enclosing: &[String]) {
        annotation.qualified_name = self.resolve(&annotation.qualified_name, enclosing);
    }

    /// Rewrites every class name in `ty` to its qualified form.
    pub(crate) fn resolve_type(&self, ty: &mut TypeItem, enclosing: &[String]) {
        match ty {
            TypeItem::Primitive(p) => self.resolve_annotations(&mut p.annotations, enclosing),
            TypeItem::Class(class) => self.resolve_class(class, enclosing),
            TypeItem::Array(array) => {
                self.resolve_annotations(&mut array.modifiers.annotations, enclosing);
                self.resolve_type(&mut array.component, enclosing);
            }
            TypeItem::Wildcard(wildcard) => {
                self.resolve_annotations(&mut wildcard.annotations, enclosing);
                match &mut wildcard.bound {
                    Some(WildcardBound::Extends(bound)) | Some(WildcardBound::Super(bound)) => {
                        self.resolve_type(bound, enclosing)
                    }
                    None => {}
                }
            }
            TypeItem::Variable(variable) => {
                self.resolve_annotations(&mut variable.modifiers.annotations, enclosing)
            }
        }
    }

    fn resolve_annotations(&self, annotations: &mut [AnnotationItem], enclosing: &[String]) {
        for annotation in annotations {
            self.resolve_annotation(annotation, enclosing);
        }
    }

    fn resolve_class(&self, class: &mut ClassTypeItem, enclosing: &[String]) {
        self.resolve_annotations(&mut class.modifiers.annotations, enclosing);
        for argument in &mut class.arguments {
            self.resolve_type(argument, enclosing);
        }
        match &mut class.outer {
            Some(outer) => {
                let segment = class.qualified_name
                    .strip_prefix(outer.qualified_name.as_str())
                    .and_then(|rest| rest.strip_prefix('.'))
                    .unwrap_or(&class.qualified_name)
                    .to_string();
                self.resolve_class(outer, enclosing);
                class.qualified_name = format!("{}.{segment}", outer.qualified_name);
            }
            None => class.qualified_name = self.resolve(&class.qualified_name, enclosing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimodel_types::{parse_type, TypeParseContext, TypeStringConfig};
    use pretty_assertions::assert_eq;

    fn unit() -> CompilationUnit {
        CompilationUnit {
            package: "test.pkg".into(),
            imports: vec!["java.util.List".into(), "other.*".into()],
            ..CompilationUnit::default()
        }
    }

    fn known() -> HashSet<String> {
        ["test.pkg.Outer", "test.pkg.Outer.Inner", "test.pkg.Sibling", "other.Helper"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn lookup_order() {
        let unit = unit();
        let known = known();
        let resolver = NameResolver::new(&unit, &known);
        let enclosing = vec!["test.pkg.Outer".to_string()];

        assert_eq!(resolver.resolve("Inner", &enclosing), "test.pkg.Outer.Inner");
        assert_eq!(resolver.resolve("List", &enclosing), "java.util.List");
        assert_eq!(resolver.resolve("Sibling", &enclosing), "test.pkg.Sibling");
        assert_eq!(resolver.resolve("Helper", &enclosing), "other.Helper");
        assert_eq!(resolver.resolve("String", &enclosing), "java.lang.String");
        assert_eq!(resolver.resolve("java.util.Map.Entry", &enclosing), "java.util.Map.Entry");
        assert_eq!(resolver.resolve("Outer.Inner", &[]), "test.pkg.Outer.Inner");
        assert_eq!(resolver.resolve("Unknown", &[]), "test.pkg.Unknown");
    }

    #[test]
    fn resolves_nested_type_arguments() {
        let unit = unit();
        let known = known();
        let resolver = NameResolver::new(&unit, &known);
        let ctx = TypeParseContext::new(false, false).with_type_parameters(["T"]);
        let mut ty = parse_type("List<? extends Sibling>[]", &ctx).unwrap();
        resolver.resolve_type(&mut ty, &[]);
        assert_eq!(
            ty.to_type_string(&TypeStringConfig::default()),
            "java.util.List<? extends test.pkg.Sibling>[]"
        );

        let mut ty = parse_type("Outer<T>.Inner", &ctx).unwrap();
        resolver.resolve_type(&mut ty, &[]);
        assert_eq!(ty.as_class().unwrap().qualified_name, "test.pkg.Outer.Inner");
    }
}
