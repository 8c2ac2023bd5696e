use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use apimodel_core::{JAVA_LANG_OBJECT, JAVA_LANG_PACKAGE};

use crate::{
    AnnotationItem, ArrayTypeItem, ClassTypeItem, Nullability, TypeItem, TypeParameter,
    TypeParameterScope, WildcardBound,
};

pub type AnnotationFilter = Arc<dyn Fn(&AnnotationItem) -> bool + Send + Sync>;

/// Rendering policy for type strings.
///
/// The toggles are independent; every combination produces text that [`crate::parse_type`]
/// reads back (given a matching [`crate::TypeParseContext`]).
#[derive(Clone, Default)]
pub struct TypeStringConfig {
    /// Render type-use annotations in source position.
    pub annotations: bool,
    /// Render nullability as a `?`/`!` suffix; nullness annotations are then never rendered.
    pub kotlin_style_nulls: bool,
    /// Render top-level `java.lang` classes by simple name.
    pub omit_common_packages: bool,
    /// Per-annotation predicate applied on top of `annotations`.
    pub filter: Option<AnnotationFilter>,
}

impl TypeStringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotations(mut self, annotations: bool) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_kotlin_style_nulls(mut self, kotlin_style_nulls: bool) -> Self {
        self.kotlin_style_nulls = kotlin_style_nulls;
        self
    }

    pub fn with_omit_common_packages(mut self, omit: bool) -> Self {
        self.omit_common_packages = omit;
        self
    }

    pub fn with_filter(
        mut self,
        filter: impl Fn(&AnnotationItem) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    fn includes(&self, annotation: &AnnotationItem) -> bool {
        if !self.annotations {
            return false;
        }
        if self.kotlin_style_nulls && annotation.is_nullness() {
            return false;
        }
        self.filter.as_ref().map_or(true, |filter| filter(annotation))
    }

    fn suffix(&self, nullability: Nullability) -> &'static str {
        if self.kotlin_style_nulls {
            nullability.suffix()
        } else {
            ""
        }
    }

    /// Display form of a qualified class name under this configuration.
    pub fn class_name<'a>(&self, qualified_name: &'a str) -> &'a str {
        if self.omit_common_packages {
            if let Some(rest) = qualified_name
                .strip_prefix(JAVA_LANG_PACKAGE)
                .and_then(|rest| rest.strip_prefix('.'))
            {
                if !rest.contains('.') {
                    return rest;
                }
            }
        }
        qualified_name
    }
}

impl fmt::Debug for TypeStringConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeStringConfig")
            .field("annotations", &self.annotations)
            .field("kotlin_style_nulls", &self.kotlin_style_nulls)
            .field("omit_common_packages", &self.omit_common_packages)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl TypeItem {
    pub fn to_type_string(&self, config: &TypeStringConfig) -> String {
        let mut out = String::new();
        write_type(&mut out, self, config);
        out
    }

    /// The lookup key form: no generics, annotations or nullability; type variables are
    /// replaced by the erasure of their first bound, or `java.lang.Object` when unbounded.
    pub fn erased_type_string(&self, scope: &dyn TypeParameterScope) -> String {
        let mut visiting = HashSet::new();
        erase(self, scope, &mut visiting)
    }
}

impl fmt::Display for TypeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_type_string(&TypeStringConfig::default()))
    }
}

fn write_annotations(out: &mut String, annotations: &[AnnotationItem], config: &TypeStringConfig) {
    for annotation in annotations.iter().filter(|a| config.includes(a)) {
        out.push_str(&annotation.to_source());
        out.push(' ');
    }
}

fn write_type(out: &mut String, ty: &TypeItem, config: &TypeStringConfig) {
    match ty {
        TypeItem::Primitive(p) => {
            write_annotations(out, &p.annotations, config);
            out.push_str(p.kind.keyword());
        }
        TypeItem::Class(c) => {
            write_class(out, c, config);
            out.push_str(config.suffix(c.modifiers.nullability));
        }
        TypeItem::Array(a) => write_array(out, a, config),
        TypeItem::Wildcard(w) => {
            write_annotations(out, &w.annotations, config);
            out.push('?');
            match &w.bound {
                Some(WildcardBound::Extends(bound)) => {
                    out.push_str(" extends ");
                    write_type(out, bound, config);
                }
                Some(WildcardBound::Super(bound)) => {
                    out.push_str(" super ");
                    write_type(out, bound, config);
                }
                None => {}
            }
        }
        TypeItem::Variable(v) => {
            write_annotations(out, &v.modifiers.annotations, config);
            out.push_str(&v.name);
            out.push_str(config.suffix(v.modifiers.nullability));
        }
    }
}

/// Writes the class name and arguments, without this segment's nullability suffix.
fn write_class(out: &mut String, class: &ClassTypeItem, config: &TypeStringConfig) {
    match &class.outer {
        Some(outer) => {
            write_class(out, outer, config);
            out.push_str(config.suffix(outer.modifiers.nullability));
            out.push('.');
            write_annotations(out, &class.modifiers.annotations, config);
            out.push_str(class.segment_name());
        }
        None => {
            let name = config.class_name(&class.qualified_name);
            let has_annotations = class
                .modifiers
                .annotations
                .iter()
                .any(|a| config.includes(a));
            match name.rfind('.') {
                Some(idx) if has_annotations => {
                    out.push_str(&name[..=idx]);
                    write_annotations(out, &class.modifiers.annotations, config);
                    out.push_str(&name[idx + 1..]);
                }
                _ => {
                    write_annotations(out, &class.modifiers.annotations, config);
                    out.push_str(name);
                }
            }
        }
    }
    if !class.arguments.is_empty() {
        out.push('<');
        for (idx, arg) in class.arguments.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            write_type(out, arg, config);
        }
        out.push('>');
    }
}

/// Writes an array in source position: the innermost component, then one level per
/// dimension from outermost to innermost. A varargs level is outermost but written last.
fn write_array(out: &mut String, array: &ArrayTypeItem, config: &TypeStringConfig) {
    let mut levels = vec![array];
    let mut component = array.component.as_ref();
    while let TypeItem::Array(inner) = component {
        levels.push(inner);
        component = inner.component.as_ref();
    }
    write_type(out, component, config);
    for level in levels.iter().filter(|level| !level.varargs) {
        write_array_level(out, level, config);
    }
    for level in levels.iter().filter(|level| level.varargs) {
        write_array_level(out, level, config);
    }
}

fn write_array_level(out: &mut String, level: &ArrayTypeItem, config: &TypeStringConfig) {
    let mut annotations = String::new();
    write_annotations(&mut annotations, &level.modifiers.annotations, config);
    if !annotations.is_empty() {
        out.push(' ');
        out.push_str(&annotations);
    }
    if level.varargs {
        out.push_str("...");
    } else {
        out.push_str("[]");
        out.push_str(config.suffix(level.modifiers.nullability));
    }
}

fn erase(ty: &TypeItem, scope: &dyn TypeParameterScope, visiting: &mut HashSet<String>) -> String {
    match ty {
        TypeItem::Primitive(p) => p.kind.keyword().to_string(),
        TypeItem::Class(c) => c.qualified_name.clone(),
        TypeItem::Array(a) => format!("{}[]", erase(&a.component, scope, visiting)),
        TypeItem::Wildcard(w) => match &w.bound {
            Some(WildcardBound::Extends(bound)) => erase(bound, scope, visiting),
            _ => JAVA_LANG_OBJECT.to_string(),
        },
        TypeItem::Variable(v) => {
            // `T extends Comparable<T>` style cycles only recurse through arguments, which
            // erasure drops; the guard covers `<T extends U, U extends T>`.
            if !visiting.insert(v.name.clone()) {
                return JAVA_LANG_OBJECT.to_string();
            }
            let erased = scope
                .bounds_of(&v.name)
                .and_then(|bounds| bounds.first())
                .map(|bound| erase(bound, scope, visiting))
                .unwrap_or_else(|| JAVA_LANG_OBJECT.to_string());
            visiting.remove(&v.name);
            erased
        }
    }
}

/// Renders a type parameter list (`<T extends java.lang.Number, U>`); empty for no parameters.
///
/// A sole `java.lang.Object` bound is implied and not written.
pub fn type_parameter_list_string(params: &[TypeParameter], config: &TypeStringConfig) -> String {
    if params.is_empty() {
        return String::new();
    }
    let mut out = String::from("<");
    for (idx, param) in params.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(&param.name);
        let implicit = matches!(
            param.bounds.as_slice(),
            [TypeItem::Class(c)] if c.qualified_name == JAVA_LANG_OBJECT && c.arguments.is_empty()
        );
        if !param.bounds.is_empty() && !implicit {
            out.push_str(" extends ");
            for (bound_idx, bound) in param.bounds.iter().enumerate() {
                if bound_idx > 0 {
                    out.push_str(" & ");
                }
                write_type(&mut out, bound, config);
            }
        }
    }
    out.push('>');
    out
}
