use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const JAVA_LANG_PACKAGE: &str = "java.lang";
pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// A dotted package name. The empty name is the root (default) package.
///
/// The parent relation is computed from the name; it is never stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PackageName(String);

impl PackageName {
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// `None` only for the root package. Top-level packages have the root as parent.
    pub fn parent(&self) -> Option<PackageName> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind('.') {
            Some(idx) => PackageName(self.0[..idx].to_string()),
            None => PackageName::root(),
        })
    }

    /// Like [`PackageName::parent`], but treats asking the root for its parent as a bug.
    pub fn expect_parent(&self) -> PackageName {
        self.parent()
            .unwrap_or_else(|| panic!("the root package has no parent package"))
    }

    pub fn child(&self, segment: &str) -> PackageName {
        assert!(
            !segment.is_empty() && !segment.contains('.'),
            "invalid package segment `{segment}`"
        );
        if self.is_root() {
            PackageName(segment.to_string())
        } else {
            PackageName(format!("{}.{segment}", self.0))
        }
    }

    /// Qualifies a (possibly nested, dot separated) class name with this package.
    pub fn qualify(&self, class_name: &str) -> String {
        if self.is_root() {
            class_name.to_string()
        } else {
            format!("{}.{class_name}", self.0)
        }
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl PartialOrd for PackageName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageName {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_package_names(&self.0, &other.0)
    }
}

/// Canonical package order: segment-wise lexicographic, so a package sorts directly before
/// its subpackages (`a.b` < `a.b.c` < `a.bc`) and the root package sorts first.
pub fn compare_package_names(a: &str, b: &str) -> Ordering {
    let a_segments = a.split('.').filter(|s| !s.is_empty());
    let b_segments = b.split('.').filter(|s| !s.is_empty());
    a_segments.cmp(b_segments)
}

/// A fully qualified class name split into its package and dotted class path
/// (`java.util.Map.Entry` -> `java.util` + `Map.Entry`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub package: PackageName,
    pub class_path: String,
}

impl QualifiedName {
    pub fn new(package: PackageName, class_path: impl Into<String>) -> Self {
        Self {
            package,
            class_path: class_path.into(),
        }
    }

    pub fn qualified(&self) -> String {
        self.package.qualify(&self.class_path)
    }

    pub fn simple_name(&self) -> &str {
        self.class_path
            .rsplit('.')
            .next()
            .unwrap_or(&self.class_path)
    }

    /// The qualified name of the enclosing class, for nested class paths.
    pub fn outer(&self) -> Option<QualifiedName> {
        let idx = self.class_path.rfind('.')?;
        Some(QualifiedName {
            package: self.package.clone(),
            class_path: self.class_path[..idx].to_string(),
        })
    }
}

/// Best-effort split of a qualified name whose package boundary is unknown.
///
/// Java naming conventions are used: the first segment starting with an upper-case letter
/// begins the class path. Names with no such segment treat the last segment as the class.
/// Declarations always carry their real package; this is only used for names that are
/// referenced before (or without) being declared.
pub fn split_qualified_name(name: &str) -> QualifiedName {
    let segments: Vec<&str> = name.split('.').collect();
    let class_start = segments
        .iter()
        .position(|s| s.chars().next().is_some_and(char::is_uppercase))
        .unwrap_or(segments.len().saturating_sub(1));
    QualifiedName {
        package: PackageName(segments[..class_start].join(".")),
        class_path: segments[class_start..].join("."),
    }
}
