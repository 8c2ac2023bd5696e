use std::collections::HashMap;

use apimodel_core::{PackageName, QualifiedName};
use apimodel_model::{
    CallableData, ClassData, ClassKind, FieldData, ModifierFlags, ModifierList, Modifiers,
    ParameterData,
};
use apimodel_types::{
    parse_annotation_arguments, parse_type_parameters_prefix, parse_type_prefix, AnnotationItem,
    TypeItem, TypeParameter, TypeParseContext,
};

use crate::format::read_header;
use crate::scanner::{Scanner, Statement, Terminator};
use crate::{FileFormat, SignatureError};

/// One class declaration read from a signature file, not yet added to a codebase.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedClass {
    pub name: QualifiedName,
    pub data: ClassData,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignatureFile {
    pub format: FileFormat,
    pub classes: Vec<ParsedClass>,
}

/// Parses a complete signature file. Files without a header are read as `default_format`.
pub fn parse_signature(text: &str, default_format: FileFormat) -> Result<SignatureFile, SignatureError> {
    let header = read_header(text, default_format)?;
    let format = header.format;
    let mut scanner = Scanner::new(&text[header.body_offset..], header.body_line);
    let mut classes = Vec::new();

    while let Some(stmt) = scanner.next_statement()? {
        let package = package_header(&stmt)?;
        let mut parser = PackageParser::new(package, format);
        loop {
            let Some(stmt) = scanner.next_statement()? else {
                return Err(syntax(stmt.line, "unterminated package"));
            };
            match stmt.terminator {
                Terminator::Close if stmt.text.is_empty() => break,
                Terminator::Open => {
                    let class = parser.class(&stmt, &mut scanner)?;
                    classes.push(class);
                }
                _ => return Err(syntax(stmt.line, "expected a class declaration")),
            }
        }
    }

    tracing::debug!(
        target: "apimodel.signature",
        version = %format.version,
        classes = classes.len(),
        "parsed signature file"
    );
    Ok(SignatureFile { format, classes })
}

fn syntax(line: u32, message: impl Into<String>) -> SignatureError {
    SignatureError::Syntax {
        line,
        message: message.into(),
    }
}

fn package_header(stmt: &Statement) -> Result<PackageName, SignatureError> {
    if stmt.terminator != Terminator::Open {
        return Err(syntax(stmt.line, "expected `package <name> {`"));
    }
    let mut decl = Decl::new(&stmt.text, stmt.line);
    if !decl.eat_word("package") {
        return Err(decl.error("expected `package`"));
    }
    decl.skip_ws();
    let name = decl.dotted_name()?;
    decl.finish()?;
    Ok(PackageName::new(name))
}

struct PackageParser {
    package: PackageName,
    format: FileFormat,
    /// Type parameter names of classes seen so far, for inner classes.
    type_parameters: HashMap<String, (Vec<String>, bool)>,
}

impl PackageParser {
    fn new(package: PackageName, format: FileFormat) -> Self {
        Self {
            package,
            format,
            type_parameters: HashMap::new(),
        }
    }

    /// Type variables visible in `class_path` from enclosing classes. A static class sees
    /// none of its enclosing classes' parameters.
    fn outer_context(&self, class_path: &str, is_static: bool) -> TypeParseContext {
        let mut ctx = self.format.type_parse_context();
        let mut current = class_path;
        let mut current_static = is_static;
        while let Some(idx) = current.rfind('.') {
            if current_static {
                break;
            }
            let outer = &current[..idx];
            let Some((names, outer_static)) = self.type_parameters.get(outer) else {
                break;
            };
            ctx = ctx.with_type_parameters(names.iter().map(String::as_str));
            current = outer;
            current_static = *outer_static;
        }
        ctx
    }

    fn class(&mut self, stmt: &Statement, scanner: &mut Scanner<'_>) -> Result<ParsedClass, SignatureError> {
        let mut decl = Decl::new(&stmt.text, stmt.line);
        let modifiers = decl.modifiers()?;
        decl.skip_ws();
        let kind = if decl.eat_word("class") {
            ClassKind::Class
        } else if decl.eat_word("interface") {
            ClassKind::Interface
        } else if decl.eat_word("enum") {
            ClassKind::Enum
        } else if decl.eat_word("@interface") {
            ClassKind::AnnotationType
        } else {
            return Err(decl.error("expected `class`, `interface`, `enum` or `@interface`"));
        };
        decl.skip_ws();
        let class_path = decl.dotted_name()?;

        let outer = self.outer_context(&class_path, modifiers.is_static());
        let type_parameters = decl.type_parameters(&outer)?;
        let ctx = outer.with_type_parameters(type_parameters.iter().map(|p| p.name.as_str()));
        self.type_parameters.insert(
            class_path.clone(),
            (
                type_parameters.iter().map(|p| p.name.clone()).collect(),
                modifiers.is_static(),
            ),
        );

        let mut data = ClassData::new(kind);
        data.modifiers = modifiers;
        data.type_parameters = type_parameters;
        loop {
            decl.skip_ws();
            if decl.at_end() {
                break;
            }
            if decl.eat_word("extends") {
                let types = decl.type_list(&ctx)?;
                if kind.is_interface() {
                    data.interface_types.extend(types);
                } else {
                    match <[TypeItem; 1]>::try_from(types) {
                        Ok([super_class]) => data.super_class_type = Some(super_class),
                        Err(_) => return Err(decl.error("a class extends exactly one type")),
                    }
                }
            } else if decl.eat_word("implements") {
                data.interface_types.extend(decl.type_list(&ctx)?);
            } else {
                return Err(decl.error("expected `extends`, `implements` or `{`"));
            }
        }

        let simple_name = class_path.rsplit('.').next().unwrap_or(&class_path).to_string();
        loop {
            let Some(member) = scanner.next_statement()? else {
                return Err(syntax(stmt.line, format!("unterminated class `{class_path}`")));
            };
            match member.terminator {
                Terminator::Close if member.text.is_empty() => break,
                Terminator::Semicolon => self.member(&member, &ctx, &simple_name, &mut data)?,
                Terminator::Close => return Err(syntax(member.line, "expected `;`")),
                Terminator::Open => {
                    return Err(syntax(
                        member.line,
                        "nested class bodies are not allowed; declare `Outer.Inner` at package level",
                    ))
                }
            }
        }

        Ok(ParsedClass {
            name: QualifiedName::new(self.package.clone(), class_path),
            data,
            line: stmt.line,
        })
    }

    fn member(
        &self,
        stmt: &Statement,
        ctx: &TypeParseContext,
        class_simple_name: &str,
        data: &mut ClassData,
    ) -> Result<(), SignatureError> {
        let mut decl = Decl::new(&stmt.text, stmt.line);
        if decl.eat_word("ctor") {
            let ctor = self.callable(&mut decl, ctx, true)?;
            if ctor.name != class_simple_name {
                return Err(decl.error(format!(
                    "constructor `{}` does not match class `{class_simple_name}`",
                    ctor.name
                )));
            }
            data.constructors.push(ctor);
        } else if decl.eat_word("method") {
            data.methods.push(self.callable(&mut decl, ctx, false)?);
        } else if decl.eat_word("field") {
            data.fields.push(self.field(&mut decl, ctx, false)?);
        } else if decl.eat_word("enum_constant") {
            data.fields.push(self.field(&mut decl, ctx, true)?);
        } else {
            return Err(decl.error("expected `ctor`, `method`, `field` or `enum_constant`"));
        }
        Ok(())
    }

    fn callable(
        &self,
        decl: &mut Decl<'_>,
        ctx: &TypeParseContext,
        is_constructor: bool,
    ) -> Result<CallableData, SignatureError> {
        let modifiers = decl.modifiers()?;
        decl.skip_ws();
        let type_parameters = decl.type_parameters(ctx)?;
        let ctx = ctx.with_type_parameters(type_parameters.iter().map(|p| p.name.as_str()));
        decl.skip_ws();
        let return_type = if is_constructor {
            TypeItem::void()
        } else {
            let ty = decl.ty(&ctx)?;
            decl.skip_ws();
            ty
        };
        let name = decl.ident()?.to_string();
        decl.skip_ws();
        decl.expect('(')?;
        let parameters = self.parameters(decl, &ctx)?;

        decl.skip_ws();
        let throws = if decl.eat_word("throws") {
            decl.type_list(&ctx)?
        } else {
            Vec::new()
        };
        decl.finish()?;

        let mut callable = CallableData::method(name, return_type).with_modifiers(modifiers);
        callable.type_parameters = type_parameters;
        callable.parameters = parameters;
        callable.throws = throws;
        Ok(callable)
    }

    fn parameters(
        &self,
        decl: &mut Decl<'_>,
        ctx: &TypeParseContext,
    ) -> Result<Vec<ParameterData>, SignatureError> {
        let mut parameters = Vec::new();
        decl.skip_ws();
        if decl.eat(')') {
            return Ok(parameters);
        }
        loop {
            let modifiers = decl.modifiers()?;
            decl.skip_ws();
            let (name, ty) = if self.format.kotlin_name_type_order && decl.at_named_parameter() {
                let name = decl.ident()?.to_string();
                decl.skip_ws();
                decl.expect(':')?;
                decl.skip_ws();
                (Some(name), decl.ty(ctx)?)
            } else {
                let ty = decl.ty(ctx)?;
                decl.skip_ws();
                let name = if decl.at_ident() {
                    Some(decl.ident()?.to_string())
                } else {
                    None
                };
                (name, ty)
            };
            parameters.push(ParameterData {
                name,
                ty,
                modifiers,
            });
            decl.skip_ws();
            if decl.eat(')') {
                return Ok(parameters);
            }
            decl.expect(',')?;
            decl.skip_ws();
        }
    }

    fn field(
        &self,
        decl: &mut Decl<'_>,
        ctx: &TypeParseContext,
        enum_constant: bool,
    ) -> Result<FieldData, SignatureError> {
        let modifiers = decl.modifiers()?;
        decl.skip_ws();
        let ty = decl.ty(ctx)?;
        decl.skip_ws();
        let name = decl.ident()?.to_string();
        decl.skip_ws();
        let value = if decl.eat('=') {
            let value = decl.rest().trim();
            if value.is_empty() {
                return Err(decl.error("missing value after `=`"));
            }
            Some(value.to_string())
        } else {
            decl.finish()?;
            None
        };
        let mut field = FieldData::new(name, ty);
        field.modifiers = modifiers;
        field.value = value;
        field.enum_constant = enum_constant;
        Ok(field)
    }
}

/// Cursor over one statement's text.
struct Decl<'a> {
    text: &'a str,
    pos: usize,
    line: u32,
}

impl<'a> Decl<'a> {
    fn new(text: &'a str, line: u32) -> Self {
        Self { text, pos: 0, line }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.rest().trim().is_empty()
    }

    fn error(&self, message: impl Into<String>) -> SignatureError {
        let message = message.into();
        let rest = self.rest().trim();
        let message = if rest.is_empty() {
            format!("{message} at end of `{}`", self.text)
        } else {
            format!("{message} at `{rest}`")
        };
        syntax(self.line, message)
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.rest().starts_with(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), SignatureError> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{ch}`")))
        }
    }

    fn at_word(&self, word: &str) -> bool {
        let rest = self.rest();
        rest.starts_with(word) && !rest[word.len()..].chars().next().is_some_and(is_ident_char)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn at_ident(&self) -> bool {
        self.rest().chars().next().is_some_and(is_ident_start)
    }

    fn ident(&mut self) -> Result<&'a str, SignatureError> {
        if !self.at_ident() {
            return Err(self.error("expected an identifier"));
        }
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        self.pos += end;
        Ok(&rest[..end])
    }

    fn dotted_name(&mut self) -> Result<String, SignatureError> {
        let mut name = self.ident()?.to_string();
        while self.rest().starts_with('.') && self.rest()[1..].chars().next().is_some_and(is_ident_start) {
            self.pos += 1;
            name.push('.');
            name.push_str(self.ident()?);
        }
        Ok(name)
    }

    /// `name:` ahead, as written for parameters in name-type order.
    fn at_named_parameter(&self) -> bool {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        end > 0 && rest[end..].trim_start().starts_with(':')
    }

    fn finish(&mut self) -> Result<(), SignatureError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("unexpected text"))
        }
    }

    fn annotation(&mut self) -> Result<AnnotationItem, SignatureError> {
        self.expect('@')?;
        let name = self.dotted_name()?;
        let mut annotation = AnnotationItem::new(name);
        if self.rest().starts_with('(') {
            let args = self.balanced_parens()?;
            annotation.attributes = parse_annotation_arguments(args);
        }
        Ok(annotation)
    }

    fn balanced_parens(&mut self) -> Result<&'a str, SignatureError> {
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
        Err(self.error("unbalanced parentheses"))
    }

    /// Declaration annotations and modifier keywords. Annotations after the first keyword
    /// belong to the type that follows.
    fn modifiers(&mut self) -> Result<Modifiers, SignatureError> {
        let mut flags = ModifierFlags::empty();
        let mut annotations = Vec::new();
        let mut seen_keyword = false;
        loop {
            self.skip_ws();
            if self.rest().starts_with('@') && !self.at_word("@interface") {
                if seen_keyword {
                    break;
                }
                annotations.push(self.annotation()?);
                continue;
            }
            let save = self.pos;
            let Ok(word) = self.ident() else {
                break;
            };
            match ModifierFlags::from_keyword(word) {
                Some(flag) => {
                    flags |= flag;
                    seen_keyword = true;
                }
                None => {
                    self.pos = save;
                    break;
                }
            }
        }
        Ok(Modifiers::new(flags, annotations))
    }

    fn ty(&mut self, ctx: &TypeParseContext) -> Result<TypeItem, SignatureError> {
        let (ty, consumed) =
            parse_type_prefix(self.rest(), ctx).map_err(|source| SignatureError::Type {
                line: self.line,
                source,
            })?;
        self.pos += consumed;
        Ok(ty)
    }

    fn type_list(&mut self, ctx: &TypeParseContext) -> Result<Vec<TypeItem>, SignatureError> {
        let mut types = Vec::new();
        loop {
            self.skip_ws();
            types.push(self.ty(ctx)?);
            self.skip_ws();
            self.eat(',');
            self.skip_ws();
            if self.at_end() || self.at_word("implements") || self.at_word("extends") {
                return Ok(types);
            }
        }
    }

    fn type_parameters(&mut self, ctx: &TypeParseContext) -> Result<Vec<TypeParameter>, SignatureError> {
        if !self.rest().starts_with('<') {
            return Ok(Vec::new());
        }
        let (params, consumed) =
            parse_type_parameters_prefix(self.rest(), ctx).map_err(|source| SignatureError::Type {
                line: self.line,
                source,
            })?;
        self.pos += consumed;
        Ok(params)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
