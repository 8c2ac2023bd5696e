use apimodel_core::JAVA_LANG_PACKAGE;
use thiserror::Error;

use crate::{
    parse_annotation_arguments, AnnotationItem, ArrayTypeItem, ClassTypeItem, Nullability,
    PrimitiveKind, PrimitiveTypeItem, TypeItem, TypeModifiers, TypeParameter, VariableTypeItem,
    WildcardBound, WildcardTypeItem,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    #[error("unexpected end of type string `{input}`")]
    UnexpectedEnd { input: String },
    #[error("unexpected `{found}` at offset {offset} in type string `{input}`")]
    Unexpected {
        input: String,
        offset: usize,
        found: char,
    },
    #[error("trailing text `{rest}` after type `{input}`")]
    Trailing { input: String, rest: String },
}

/// What the parser needs to know about the text it reads.
#[derive(Clone, Debug, Default)]
pub struct TypeParseContext {
    /// `?`/`!` suffixes are present; a missing suffix means non-null.
    pub kotlin_style_nulls: bool,
    /// Bare names that are not type variables are `java.lang` classes.
    pub omit_common_packages: bool,
    /// Type variable names in scope.
    pub type_parameters: Vec<String>,
}

impl TypeParseContext {
    pub fn new(kotlin_style_nulls: bool, omit_common_packages: bool) -> Self {
        Self {
            kotlin_style_nulls,
            omit_common_packages,
            type_parameters: Vec::new(),
        }
    }

    /// A copy of this context with extra type variables in scope.
    pub fn with_type_parameters<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ctx = self.clone();
        for name in names {
            if !ctx.type_parameters.iter().any(|n| n == name) {
                ctx.type_parameters.push(name.to_string());
            }
        }
        ctx
    }

    fn is_type_parameter(&self, name: &str) -> bool {
        self.type_parameters.iter().any(|n| n == name)
    }
}

/// Parses a complete type string.
pub fn parse_type(text: &str, ctx: &TypeParseContext) -> Result<TypeItem, TypeParseError> {
    let (ty, consumed) = parse_type_prefix(text, ctx)?;
    let rest = text[consumed..].trim();
    if !rest.is_empty() {
        return Err(TypeParseError::Trailing {
            input: text.to_string(),
            rest: rest.to_string(),
        });
    }
    Ok(ty)
}

/// Parses the longest type at the start of `text`, returning it with the number of bytes
/// consumed. Trailing whitespace is not consumed.
pub fn parse_type_prefix(
    text: &str,
    ctx: &TypeParseContext,
) -> Result<(TypeItem, usize), TypeParseError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_ws();
    let ty = cursor.parse_type(ctx)?;
    Ok((ty, cursor.pos))
}

/// Parses a `<T extends A & B, U>` list at the start of `text`. Bounds may mention any
/// parameter of the same list.
pub fn parse_type_parameters_prefix(
    text: &str,
    ctx: &TypeParseContext,
) -> Result<(Vec<TypeParameter>, usize), TypeParseError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_ws();
    if !cursor.eat('<') {
        return Ok((Vec::new(), 0));
    }
    let ctx = ctx.with_type_parameters(declared_names(&text[cursor.pos..]));
    let mut params = Vec::new();
    loop {
        cursor.skip_ws();
        let name = cursor.ident()?;
        let mut bounds = Vec::new();
        cursor.skip_ws();
        if cursor.eat_word("extends") {
            loop {
                cursor.skip_ws();
                bounds.push(cursor.parse_type(&ctx)?);
                cursor.skip_ws();
                if !cursor.eat('&') {
                    break;
                }
            }
        }
        params.push(TypeParameter::new(name, bounds));
        cursor.skip_ws();
        if cursor.eat('>') {
            break;
        }
        cursor.expect(',')?;
    }
    Ok((params, cursor.pos))
}

/// Leading identifiers of each top-level entry in `T extends X<Y>, U>`.
fn declared_names(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut expecting_name = true;
    let mut idx = 0;
    let bytes = text.as_bytes();
    while idx < bytes.len() {
        let b = bytes[idx];
        if expecting_name && (b.is_ascii_alphabetic() || b == b'_' || b == b'$') {
            let start = idx;
            while idx < bytes.len()
                && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_' || bytes[idx] == b'$')
            {
                idx += 1;
            }
            names.push(&text[start..idx]);
            expecting_name = false;
            continue;
        }
        match b {
            b'<' => depth += 1,
            b'>' if depth == 0 => break,
            b'>' => depth -= 1,
            b',' if depth == 0 => expecting_name = true,
            _ => {}
        }
        idx += 1;
    }
    names
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Eats `word` only when it is not the prefix of a longer identifier.
    fn eat_word(&mut self, word: &str) -> bool {
        let rest = self.rest();
        if rest.starts_with(word)
            && !rest[word.len()..]
                .chars()
                .next()
                .is_some_and(is_ident_char)
        {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn error(&self) -> TypeParseError {
        match self.peek() {
            Some(found) => TypeParseError::Unexpected {
                input: self.text.to_string(),
                offset: self.pos,
                found,
            },
            None => TypeParseError::UnexpectedEnd {
                input: self.text.to_string(),
            },
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), TypeParseError> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn ident(&mut self) -> Result<&'a str, TypeParseError> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' || c == '$' => {}
            _ => return Err(self.error()),
        }
        let end = chars
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        self.pos += end;
        Ok(&rest[..end])
    }

    fn annotations(&mut self) -> Result<Vec<AnnotationItem>, TypeParseError> {
        let mut annotations = Vec::new();
        while self.peek() == Some('@') {
            self.pos += 1;
            let mut name = self.ident()?.to_string();
            while self.rest().starts_with('.')
                && self.rest()[1..].chars().next().is_some_and(is_ident_start)
            {
                self.pos += 1;
                name.push('.');
                name.push_str(self.ident()?);
            }
            let mut annotation = AnnotationItem::new(name);
            if self.peek() == Some('(') {
                let args = self.balanced_parens()?;
                annotation.attributes = parse_annotation_arguments(args);
            }
            annotations.push(annotation);
            self.skip_ws();
        }
        Ok(annotations)
    }

    /// Consumes `( ... )`, returning the text between the outer parentheses.
    fn balanced_parens(&mut self) -> Result<&'a str, TypeParseError> {
        let rest = self.rest();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;
        for (idx, ch) in rest.char_indices() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
                continue;
            }
            match ch {
                '"' | '\'' => quote = Some(ch),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += idx + 1;
                        return Ok(&rest[1..idx]);
                    }
                }
                _ => {}
            }
        }
        Err(TypeParseError::UnexpectedEnd {
            input: self.text.to_string(),
        })
    }

    fn nullability_suffix(&mut self, ctx: &TypeParseContext) -> Option<Nullability> {
        if !ctx.kotlin_style_nulls {
            return None;
        }
        if self.eat('?') {
            Some(Nullability::Nullable)
        } else if self.eat('!') {
            Some(Nullability::Platform)
        } else {
            Some(Nullability::NonNull)
        }
    }

    fn modifiers(
        &mut self,
        ctx: &TypeParseContext,
        annotations: Vec<AnnotationItem>,
        default: Nullability,
    ) -> TypeModifiers {
        let mut modifiers = TypeModifiers::from_annotations(annotations);
        let from_annotation = modifiers.annotations.iter().any(AnnotationItem::is_nullness);
        match self.nullability_suffix(ctx) {
            Some(nullability) => modifiers.nullability = nullability,
            None if !from_annotation => modifiers.nullability = default,
            None => {}
        }
        modifiers
    }

    fn parse_type(&mut self, ctx: &TypeParseContext) -> Result<TypeItem, TypeParseError> {
        let annotations = self.annotations()?;
        let base = if self.peek() == Some('?') {
            self.pos += 1;
            self.wildcard(ctx, annotations)?
        } else {
            self.named(ctx, annotations)?
        };
        self.dimensions(ctx, base)
    }

    fn wildcard(
        &mut self,
        ctx: &TypeParseContext,
        annotations: Vec<AnnotationItem>,
    ) -> Result<TypeItem, TypeParseError> {
        let save = self.pos;
        self.skip_ws();
        let bound = if self.eat_word("extends") {
            self.skip_ws();
            Some(WildcardBound::Extends(Box::new(self.parse_type(ctx)?)))
        } else if self.eat_word("super") {
            self.skip_ws();
            Some(WildcardBound::Super(Box::new(self.parse_type(ctx)?)))
        } else {
            self.pos = save;
            None
        };
        Ok(TypeItem::Wildcard(WildcardTypeItem { bound, annotations }))
    }

    fn named(
        &mut self,
        ctx: &TypeParseContext,
        leading: Vec<AnnotationItem>,
    ) -> Result<TypeItem, TypeParseError> {
        let first = self.ident()?;
        if !self.rest().starts_with('.') {
            if let Some(kind) = PrimitiveKind::from_keyword(first) {
                return Ok(TypeItem::Primitive(PrimitiveTypeItem {
                    kind,
                    annotations: leading,
                }));
            }
            if ctx.is_type_parameter(first) && !self.rest().starts_with('<') {
                let modifiers = self.modifiers(ctx, leading, Nullability::Platform);
                return Ok(TypeItem::Variable(VariableTypeItem {
                    name: first.to_string(),
                    modifiers,
                }));
            }
        }

        let mut name = first.to_string();
        let mut annotations = leading;
        let mut outer: Option<Box<ClassTypeItem>> = None;
        loop {
            let arguments = if self.eat('<') {
                self.arguments(ctx)?
            } else {
                Vec::new()
            };
            let continues = |c: &Cursor<'_>| {
                let rest = c.rest();
                let rest = rest
                    .strip_prefix('?')
                    .or_else(|| rest.strip_prefix('!'))
                    .filter(|_| ctx.kotlin_style_nulls)
                    .unwrap_or(rest);
                rest.starts_with('.') && !rest.starts_with("...")
            };
            if !continues(self) {
                let modifiers = self.modifiers(ctx, annotations, Nullability::Platform);
                let qualified_name = if outer.is_none() && !name.contains('.') {
                    qualify_bare_name(&name, ctx)
                } else {
                    name
                };
                return Ok(TypeItem::Class(ClassTypeItem {
                    qualified_name,
                    arguments,
                    outer,
                    modifiers,
                }));
            }
            if !arguments.is_empty() || outer.is_some() {
                let segment_annotations = std::mem::take(&mut annotations);
                let modifiers = self.modifiers(ctx, segment_annotations, Nullability::NonNull);
                let qualified_name = if outer.is_none() && !name.contains('.') {
                    qualify_bare_name(&name, ctx)
                } else {
                    name.clone()
                };
                name = qualified_name.clone();
                outer = Some(Box::new(ClassTypeItem {
                    qualified_name,
                    arguments,
                    outer: outer.take(),
                    modifiers,
                }));
            }
            self.expect('.')?;
            if self.peek() == Some('@') {
                let segment_annotations = self.annotations()?;
                annotations.extend(segment_annotations);
            }
            let segment = self.ident()?;
            name.push('.');
            name.push_str(segment);
        }
    }

    fn arguments(&mut self, ctx: &TypeParseContext) -> Result<Vec<TypeItem>, TypeParseError> {
        let mut arguments = Vec::new();
        loop {
            self.skip_ws();
            arguments.push(self.parse_type(ctx)?);
            self.skip_ws();
            if self.eat('>') {
                return Ok(arguments);
            }
            self.expect(',')?;
        }
    }

    /// Brackets are read in source order, so the first one is the outermost array. A
    /// trailing `...` is outermost of all.
    fn dimensions(
        &mut self,
        ctx: &TypeParseContext,
        component: TypeItem,
    ) -> Result<TypeItem, TypeParseError> {
        let mut levels = Vec::new();
        let mut varargs = None;
        loop {
            let save = self.pos;
            self.skip_ws();
            let annotations = self.annotations()?;
            if self.eat_str("[]") {
                levels.push(self.modifiers(ctx, annotations, Nullability::Platform));
            } else if self.eat_str("...") {
                let mut modifiers = TypeModifiers::from_annotations(annotations);
                if !modifiers.annotations.iter().any(AnnotationItem::is_nullness) {
                    modifiers.nullability = Nullability::NonNull;
                }
                varargs = Some(modifiers);
                break;
            } else {
                self.pos = save;
                break;
            }
        }

        let mut ty = component;
        for modifiers in levels.into_iter().rev() {
            ty = TypeItem::Array(ArrayTypeItem {
                component: Box::new(ty),
                varargs: false,
                modifiers,
            });
        }
        if let Some(modifiers) = varargs {
            ty = TypeItem::Array(ArrayTypeItem {
                component: Box::new(ty),
                varargs: true,
                modifiers,
            });
        }
        Ok(ty)
    }
}

fn qualify_bare_name(name: &str, ctx: &TypeParseContext) -> String {
    if ctx.omit_common_packages {
        format!("{JAVA_LANG_PACKAGE}.{name}")
    } else {
        name.to_string()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeStringConfig;
    use pretty_assertions::assert_eq;

    fn kotlin() -> TypeParseContext {
        TypeParseContext::new(true, false).with_type_parameters(["T"])
    }

    #[test]
    fn parses_generic_class_with_wildcard() {
        let ty = parse_type(
            "java.util.Map<java.lang.String,? extends java.lang.Number>",
            &TypeParseContext::default(),
        )
        .unwrap();
        let class = ty.as_class().unwrap();
        assert_eq!(class.qualified_name, "java.util.Map");
        assert_eq!(class.arguments.len(), 2);
        assert!(matches!(
            class.arguments[1],
            TypeItem::Wildcard(WildcardTypeItem {
                bound: Some(WildcardBound::Extends(_)),
                ..
            })
        ));
    }

    #[test]
    fn kotlin_suffixes_map_to_nullability() {
        let ctx = kotlin();
        assert_eq!(
            parse_type("java.lang.String?", &ctx).unwrap().nullability(),
            Nullability::Nullable
        );
        assert_eq!(
            parse_type("java.lang.String!", &ctx).unwrap().nullability(),
            Nullability::Platform
        );
        assert_eq!(
            parse_type("java.lang.String", &ctx).unwrap().nullability(),
            Nullability::NonNull
        );
    }

    #[test]
    fn first_bracket_is_the_outermost_array() {
        let ty = parse_type("T![]?[]", &kotlin()).unwrap();
        let TypeItem::Array(outer) = &ty else {
            panic!("expected array, got {ty:?}");
        };
        assert_eq!(outer.modifiers.nullability, Nullability::Nullable);
        let TypeItem::Array(inner) = outer.component.as_ref() else {
            panic!("expected nested array");
        };
        assert_eq!(inner.modifiers.nullability, Nullability::NonNull);
        assert_eq!(ty.dimensions(), 2);

        let ty = parse_type("java.lang.String @test.A [] @test.B []", &TypeParseContext::default())
            .unwrap();
        let TypeItem::Array(outer) = &ty else {
            panic!("expected array, got {ty:?}");
        };
        assert_eq!(outer.modifiers.annotations, vec![AnnotationItem::new("test.A")]);
        let TypeItem::Array(inner) = outer.component.as_ref() else {
            panic!("expected nested array");
        };
        assert_eq!(inner.modifiers.annotations, vec![AnnotationItem::new("test.B")]);
    }

    #[test]
    fn prefix_parse_stops_before_parameter_name() {
        let text = "java.lang.String... args";
        let (ty, consumed) = parse_type_prefix(text, &TypeParseContext::default()).unwrap();
        assert!(ty.is_varargs());
        assert_eq!(&text[consumed..], " args");
    }

    #[test]
    fn annotated_segments_and_outer_types() {
        let ctx = TypeParseContext::new(true, false).with_type_parameters(["T"]);
        let text = "test.pkg.Outer<T!>.@test.pkg.A Inner?";
        let ty = parse_type(text, &ctx).unwrap();
        let class = ty.as_class().unwrap();
        assert_eq!(class.qualified_name, "test.pkg.Outer.Inner");
        assert_eq!(class.segment_name(), "Inner");
        assert_eq!(class.modifiers.annotations, vec![AnnotationItem::new("test.pkg.A")]);
        let outer = class.outer.as_deref().unwrap();
        assert_eq!(outer.qualified_name, "test.pkg.Outer");
        assert_eq!(outer.modifiers.nullability, Nullability::NonNull);

        let config = TypeStringConfig::new()
            .with_annotations(true)
            .with_kotlin_style_nulls(true);
        assert_eq!(ty.to_type_string(&config), text);
    }

    #[test]
    fn bare_names_are_java_lang_when_common_packages_are_omitted() {
        let ctx = TypeParseContext::new(false, true).with_type_parameters(["E"]);
        let ty = parse_type("java.util.List<String>", &ctx).unwrap();
        assert_eq!(
            ty.as_class().unwrap().arguments[0],
            TypeItem::class("java.lang.String", vec![])
        );
        assert_eq!(parse_type("E", &ctx).unwrap(), TypeItem::variable("E"));
    }

    #[test]
    fn annotation_arguments_survive() {
        let ctx = TypeParseContext::default();
        let ty = parse_type(
            "java.lang.@androidx.annotation.IntRange(from=0, to=10) Integer",
            &ctx,
        )
        .unwrap();
        let annotation = &ty.annotations()[0];
        assert_eq!(annotation.attribute("to"), Some("10"));
    }

    #[test]
    fn type_parameter_lists_see_their_own_names() {
        let (params, consumed) = parse_type_parameters_prefix(
            "<T extends java.lang.Comparable<T>, U extends T> void",
            &TypeParseContext::default(),
        )
        .unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[1].bounds, vec![TypeItem::variable("T")]);
        assert_eq!(
            params[0].bounds[0].as_class().unwrap().arguments,
            vec![TypeItem::variable("T")]
        );
        assert_eq!(consumed, "<T extends java.lang.Comparable<T>, U extends T>".len());
    }

    #[test]
    fn reports_unbalanced_input() {
        let err = parse_type("java.util.List<java.lang.String", &TypeParseContext::default())
            .unwrap_err();
        assert!(matches!(err, TypeParseError::UnexpectedEnd { .. }));
        let err = parse_type("int int", &TypeParseContext::default()).unwrap_err();
        assert!(matches!(err, TypeParseError::Trailing { .. }));
    }
}
