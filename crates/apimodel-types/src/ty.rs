use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AnnotationItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Void,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Double,
        PrimitiveKind::Float,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Short,
        PrimitiveKind::Void,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Void => "void",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Nullability of a reference type, independent of the type's variant.
///
/// `Platform` means "no information"; it is the default for anything not explicitly marked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nullability {
    #[default]
    Platform,
    Nullable,
    NonNull,
}

impl Nullability {
    /// Kotlin-style suffix: `?`, `!` or nothing.
    pub fn suffix(self) -> &'static str {
        match self {
            Nullability::Platform => "!",
            Nullability::Nullable => "?",
            Nullability::NonNull => "",
        }
    }
}

/// Nullability plus type-use annotations, carried by every non-primitive type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TypeModifiers {
    pub nullability: Nullability,
    pub annotations: Vec<AnnotationItem>,
}

impl TypeModifiers {
    pub fn new(nullability: Nullability) -> Self {
        Self {
            nullability,
            annotations: Vec::new(),
        }
    }

    /// Builds modifiers from annotations, deriving nullability from any nullness annotation.
    pub fn from_annotations(annotations: Vec<AnnotationItem>) -> Self {
        let nullability = annotations
            .iter()
            .find_map(AnnotationItem::nullability)
            .unwrap_or_default();
        Self {
            nullability,
            annotations,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimitiveTypeItem {
    pub kind: PrimitiveKind,
    pub annotations: Vec<AnnotationItem>,
}

/// A reference to a class or interface, e.g. `java.util.List<java.lang.String>`.
///
/// `outer` is only present for a non-static inner class of a generic outer class
/// (`Outer<T>.Inner`); `qualified_name` always names the inner class completely, so dropping
/// `outer` never loses the qualifying prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassTypeItem {
    pub qualified_name: String,
    pub arguments: Vec<TypeItem>,
    pub outer: Option<Box<ClassTypeItem>>,
    pub modifiers: TypeModifiers,
}

impl ClassTypeItem {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            arguments: Vec::new(),
            outer: None,
            modifiers: TypeModifiers::default(),
        }
    }

    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// The part of `qualified_name` not covered by the outer type (`Inner` for `Outer<T>.Inner`).
    pub fn segment_name(&self) -> &str {
        match &self.outer {
            Some(outer) => self
                .qualified_name
                .strip_prefix(outer.qualified_name.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or_else(|| self.simple_name()),
            None => &self.qualified_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayTypeItem {
    pub component: Box<TypeItem>,
    /// A varargs parameter type (`T...`); always the outermost dimension.
    pub varargs: bool,
    pub modifiers: TypeModifiers,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Extends(Box<TypeItem>),
    Super(Box<TypeItem>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WildcardTypeItem {
    pub bound: Option<WildcardBound>,
    pub annotations: Vec<AnnotationItem>,
}

/// A use of a type parameter, resolved by name through a [`TypeParameterScope`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableTypeItem {
    pub name: String,
    pub modifiers: TypeModifiers,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeItem {
    Primitive(PrimitiveTypeItem),
    Class(ClassTypeItem),
    Array(ArrayTypeItem),
    Wildcard(WildcardTypeItem),
    Variable(VariableTypeItem),
}

impl TypeItem {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeItem::Primitive(PrimitiveTypeItem {
            kind,
            annotations: Vec::new(),
        })
    }

    pub fn void() -> Self {
        Self::primitive(PrimitiveKind::Void)
    }

    pub fn class(qualified_name: impl Into<String>, arguments: Vec<TypeItem>) -> Self {
        let mut ty = ClassTypeItem::new(qualified_name);
        ty.arguments = arguments;
        TypeItem::Class(ty)
    }

    pub fn array(component: TypeItem) -> Self {
        TypeItem::Array(ArrayTypeItem {
            component: Box::new(component),
            varargs: false,
            modifiers: TypeModifiers::default(),
        })
    }

    pub fn varargs(component: TypeItem) -> Self {
        TypeItem::Array(ArrayTypeItem {
            component: Box::new(component),
            varargs: true,
            modifiers: TypeModifiers::new(Nullability::NonNull),
        })
    }

    pub fn variable(name: impl Into<String>) -> Self {
        TypeItem::Variable(VariableTypeItem {
            name: name.into(),
            modifiers: TypeModifiers::default(),
        })
    }

    pub fn wildcard(bound: Option<WildcardBound>) -> Self {
        TypeItem::Wildcard(WildcardTypeItem {
            bound,
            annotations: Vec::new(),
        })
    }

    pub fn object() -> Self {
        Self::class(apimodel_core::JAVA_LANG_OBJECT, Vec::new())
    }

    /// Returns this type with `nullability` applied. Primitives and wildcards are unchanged.
    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        if let Some(modifiers) = self.modifiers_mut() {
            modifiers.nullability = nullability;
        }
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationItem) -> Self {
        match &mut self {
            TypeItem::Primitive(p) => p.annotations.push(annotation),
            TypeItem::Wildcard(w) => w.annotations.push(annotation),
            _ => {
                if let Some(modifiers) = self.modifiers_mut() {
                    if let Some(n) = annotation.nullability() {
                        modifiers.nullability = n;
                    }
                    modifiers.annotations.push(annotation);
                }
            }
        }
        self
    }

    pub fn modifiers(&self) -> Option<&TypeModifiers> {
        match self {
            TypeItem::Class(c) => Some(&c.modifiers),
            TypeItem::Array(a) => Some(&a.modifiers),
            TypeItem::Variable(v) => Some(&v.modifiers),
            TypeItem::Primitive(_) | TypeItem::Wildcard(_) => None,
        }
    }

    pub fn modifiers_mut(&mut self) -> Option<&mut TypeModifiers> {
        match self {
            TypeItem::Class(c) => Some(&mut c.modifiers),
            TypeItem::Array(a) => Some(&mut a.modifiers),
            TypeItem::Variable(v) => Some(&mut v.modifiers),
            TypeItem::Primitive(_) | TypeItem::Wildcard(_) => None,
        }
    }

    /// Primitives are never null; wildcards defer to their use site and report `Platform`.
    pub fn nullability(&self) -> Nullability {
        match self {
            TypeItem::Primitive(_) => Nullability::NonNull,
            TypeItem::Wildcard(_) => Nullability::Platform,
            _ => self
                .modifiers()
                .map(|m| m.nullability)
                .unwrap_or_default(),
        }
    }

    pub fn annotations(&self) -> &[AnnotationItem] {
        match self {
            TypeItem::Primitive(p) => &p.annotations,
            TypeItem::Wildcard(w) => &w.annotations,
            TypeItem::Class(c) => &c.modifiers.annotations,
            TypeItem::Array(a) => &a.modifiers.annotations,
            TypeItem::Variable(v) => &v.modifiers.annotations,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeItem::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(
            self,
            TypeItem::Primitive(PrimitiveTypeItem {
                kind: PrimitiveKind::Void,
                ..
            })
        )
    }

    pub fn is_varargs(&self) -> bool {
        matches!(self, TypeItem::Array(ArrayTypeItem { varargs: true, .. }))
    }

    pub fn as_class(&self) -> Option<&ClassTypeItem> {
        match self {
            TypeItem::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Number of array dimensions (0 for non-arrays).
    pub fn dimensions(&self) -> usize {
        let mut dims = 0;
        let mut current = self;
        while let TypeItem::Array(array) = current {
            dims += 1;
            current = &array.component;
        }
        dims
    }

    /// Replaces type variables named in `bindings` (used when viewing a member of a generic
    /// supertype from a subtype, e.g. `List<E>.add(E)` as `add(String)`).
    pub fn substitute(&self, bindings: &HashMap<String, TypeItem>) -> TypeItem {
        if bindings.is_empty() {
            return self.clone();
        }
        match self {
            TypeItem::Variable(v) => match bindings.get(&v.name) {
                Some(replacement) => replacement.clone(),
                None => self.clone(),
            },
            TypeItem::Primitive(_) => self.clone(),
            TypeItem::Class(c) => TypeItem::Class(substitute_class(c, bindings)),
            TypeItem::Array(a) => TypeItem::Array(ArrayTypeItem {
                component: Box::new(a.component.substitute(bindings)),
                varargs: a.varargs,
                modifiers: a.modifiers.clone(),
            }),
            TypeItem::Wildcard(w) => TypeItem::Wildcard(WildcardTypeItem {
                bound: w.bound.as_ref().map(|bound| match bound {
                    WildcardBound::Extends(t) => WildcardBound::Extends(Box::new(t.substitute(bindings))),
                    WildcardBound::Super(t) => WildcardBound::Super(Box::new(t.substitute(bindings))),
                }),
                annotations: w.annotations.clone(),
            }),
        }
    }

    /// Erased qualified names of every class this type mentions, in first-seen order.
    pub fn referenced_classes(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_referenced_classes(&mut out);
        out
    }

    fn collect_referenced_classes(&self, out: &mut Vec<String>) {
        match self {
            TypeItem::Primitive(_) | TypeItem::Variable(_) => {}
            TypeItem::Class(c) => {
                if let Some(outer) = &c.outer {
                    TypeItem::Class((**outer).clone()).collect_referenced_classes(out);
                }
                if !out.contains(&c.qualified_name) {
                    out.push(c.qualified_name.clone());
                }
                for arg in &c.arguments {
                    arg.collect_referenced_classes(out);
                }
            }
            TypeItem::Array(a) => a.component.collect_referenced_classes(out),
            TypeItem::Wildcard(w) => match &w.bound {
                Some(WildcardBound::Extends(t)) | Some(WildcardBound::Super(t)) => {
                    t.collect_referenced_classes(out)
                }
                None => {}
            },
        }
    }
}

fn substitute_class(c: &ClassTypeItem, bindings: &HashMap<String, TypeItem>) -> ClassTypeItem {
    ClassTypeItem {
        qualified_name: c.qualified_name.clone(),
        arguments: c.arguments.iter().map(|a| a.substitute(bindings)).collect(),
        outer: c
            .outer
            .as_ref()
            .map(|outer| Box::new(substitute_class(outer, bindings))),
        modifiers: c.modifiers.clone(),
    }
}

/// A type parameter declaration (`T extends Number & Comparable<T>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    pub name: String,
    pub bounds: Vec<TypeItem>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>, bounds: Vec<TypeItem>) -> Self {
        Self {
            name: name.into(),
            bounds,
        }
    }

    pub fn unbounded(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Resolves type variable names to their declared bounds.
pub trait TypeParameterScope {
    fn bounds_of(&self, name: &str) -> Option<&[TypeItem]>;
}

impl TypeParameterScope for [TypeParameter] {
    fn bounds_of(&self, name: &str) -> Option<&[TypeItem]> {
        self.iter()
            .find(|tp| tp.name == name)
            .map(|tp| tp.bounds.as_slice())
    }
}

impl TypeParameterScope for Vec<TypeParameter> {
    fn bounds_of(&self, name: &str) -> Option<&[TypeItem]> {
        self.as_slice().bounds_of(name)
    }
}

/// A scope with nothing in it; every variable erases to `java.lang.Object`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScope;

impl TypeParameterScope for EmptyScope {
    fn bounds_of(&self, _name: &str) -> Option<&[TypeItem]> {
        None
    }
}

/// Inner declarations shadow outer ones (method type parameters over class type parameters).
pub struct NestedScope<'a> {
    scopes: Vec<&'a [TypeParameter]>,
}

impl<'a> NestedScope<'a> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Adds an enclosing scope, searched after every scope pushed before it.
    pub fn push_outer(mut self, params: &'a [TypeParameter]) -> Self {
        self.scopes.push(params);
        self
    }

    /// Appends every scope of `outer`, searched after the scopes already present.
    pub fn push_scope(mut self, outer: NestedScope<'a>) -> Self {
        self.scopes.extend(outer.scopes);
        self
    }
}

impl Default for NestedScope<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeParameterScope for NestedScope<'_> {
    fn bounds_of(&self, name: &str) -> Option<&[TypeItem]> {
        self.scopes.iter().find_map(|scope| scope.bounds_of(name))
    }
}
