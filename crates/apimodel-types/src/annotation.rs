use std::fmt;
use std::hash::{Hash, Hasher};

use crate::Nullability;

const NULLABLE_ANNOTATIONS: &[&str] = &[
    "androidx.annotation.Nullable",
    "androidx.annotation.RecentlyNullable",
    "android.annotation.Nullable",
    "android.support.annotation.Nullable",
    "org.jetbrains.annotations.Nullable",
    "javax.annotation.Nullable",
    "org.jspecify.annotations.Nullable",
];

const NON_NULL_ANNOTATIONS: &[&str] = &[
    "androidx.annotation.NonNull",
    "androidx.annotation.RecentlyNonNull",
    "android.annotation.NonNull",
    "android.support.annotation.NonNull",
    "org.jetbrains.annotations.NotNull",
    "javax.annotation.Nonnull",
    "org.jspecify.annotations.NonNull",
];

/// A single `name=value` pair. The value is kept as source text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationAttribute {
    pub name: String,
    pub value: String,
}

impl AnnotationAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An annotation instance, used both as a declaration annotation (in modifier lists) and as a
/// type-use annotation (on [`crate::TypeItem`]s).
///
/// Equality is structural: same qualified name and the same attributes, in any order.
#[derive(Clone, Debug)]
pub struct AnnotationItem {
    pub qualified_name: String,
    pub attributes: Vec<AnnotationAttribute>,
}

impl AnnotationItem {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(AnnotationAttribute::new(name, value));
        self
    }

    pub fn nullable() -> Self {
        Self::new("androidx.annotation.Nullable")
    }

    pub fn non_null() -> Self {
        Self::new("androidx.annotation.NonNull")
    }

    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn is_nullable(&self) -> bool {
        NULLABLE_ANNOTATIONS.contains(&self.qualified_name.as_str())
    }

    pub fn is_non_null(&self) -> bool {
        NON_NULL_ANNOTATIONS.contains(&self.qualified_name.as_str())
    }

    pub fn is_nullness(&self) -> bool {
        self.is_nullable() || self.is_non_null()
    }

    /// The nullability this annotation expresses, if it is a nullness annotation.
    pub fn nullability(&self) -> Option<Nullability> {
        if self.is_nullable() {
            Some(Nullability::Nullable)
        } else if self.is_non_null() {
            Some(Nullability::NonNull)
        } else {
            None
        }
    }

    /// Source form: `@a.b.Name`, `@a.b.Name(value)` or `@a.b.Name(x=1, y=2)`.
    pub fn to_source(&self) -> String {
        self.to_string()
    }

    fn sorted_attributes(&self) -> Vec<&AnnotationAttribute> {
        let mut attrs: Vec<&AnnotationAttribute> = self.attributes.iter().collect();
        attrs.sort();
        attrs
    }
}

impl PartialEq for AnnotationItem {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name == other.qualified_name
            && self.sorted_attributes() == other.sorted_attributes()
    }
}

impl Eq for AnnotationItem {}

impl Hash for AnnotationItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified_name.hash(state);
        self.sorted_attributes().hash(state);
    }
}

impl fmt::Display for AnnotationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.qualified_name)?;
        match self.attributes.as_slice() {
            [] => Ok(()),
            [only] if only.name == "value" => write!(f, "({})", only.value),
            attrs => {
                f.write_str("(")?;
                for (idx, attr) in attrs.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", attr.name, attr.value)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Parses the text between the parentheses of an annotation into attributes.
///
/// A single unnamed value becomes the `value` attribute.
pub fn parse_annotation_arguments(args: &str) -> Vec<AnnotationAttribute> {
    split_top_level(args, ',')
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match split_top_level(part, '=').as_slice() {
            [name, value] if is_identifier(name.trim()) => {
                AnnotationAttribute::new(name.trim(), value.trim())
            }
            _ => AnnotationAttribute::new("value", part),
        })
        .collect()
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Splits on `sep` outside of strings, chars and nested brackets.
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => in_string = Some(ch),
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equality_ignores_attribute_order() {
        let a = AnnotationItem::new("androidx.annotation.IntRange")
            .with_attribute("from", "0")
            .with_attribute("to", "10");
        let b = AnnotationItem::new("androidx.annotation.IntRange")
            .with_attribute("to", "10")
            .with_attribute("from", "0");
        assert_eq!(a, b);
        assert_eq!(a.to_source(), "@androidx.annotation.IntRange(from=0, to=10)");
    }

    #[test]
    fn single_value_attribute_renders_without_name() {
        let ann = AnnotationItem::new("androidx.annotation.RequiresPermission")
            .with_attribute("value", "\"a,b\"");
        assert_eq!(ann.to_source(), "@androidx.annotation.RequiresPermission(\"a,b\")");
    }

    #[test]
    fn parses_arguments_respecting_strings_and_nesting() {
        let attrs = parse_annotation_arguments("from=0, to=f(1, 2), label=\"x=y, z\"");
        assert_eq!(
            attrs,
            vec![
                AnnotationAttribute::new("from", "0"),
                AnnotationAttribute::new("to", "f(1, 2)"),
                AnnotationAttribute::new("label", "\"x=y, z\""),
            ]
        );
        assert_eq!(
            parse_annotation_arguments("{\"a\", \"b\"}"),
            vec![AnnotationAttribute::new("value", "{\"a\", \"b\"}")]
        );
    }

    #[test]
    fn recognises_nullness_families() {
        assert_eq!(
            AnnotationItem::new("org.jetbrains.annotations.NotNull").nullability(),
            Some(Nullability::NonNull)
        );
        assert_eq!(
            AnnotationItem::new("javax.annotation.Nullable").nullability(),
            Some(Nullability::Nullable)
        );
        assert_eq!(AnnotationItem::new("androidx.annotation.IntRange").nullability(), None);
    }
}
