use std::collections::HashSet;
use std::path::Path;

use apimodel_core::{Diagnostic, IssueCode, Location, PackageName, QualifiedName, Reporter};
use apimodel_model::{
    CallableData, ClassData, ClassKind, Codebase, FieldData, ModelError, ModifierFlags, Modifiers,
    ParameterData, ProviderId, Visibility,
};
use apimodel_types::{
    parse_annotation_arguments, parse_type, AnnotationItem, TypeItem, TypeParameter, TypeParseContext,
};

use crate::resolve::NameResolver;
use crate::tree::{
    AnnotationUse, CompilationUnit, ConstructorDecl, DeclKind, FieldDecl, MethodDecl, ParamDecl,
    TypeDecl, TypeParamDecl,
};
use crate::SourceError;

/// Lowers compilation units into one codebase. Every declared class has `emit == true`.
///
/// Members whose types do not parse are reported and skipped; the rest of the class is kept.
pub fn lower_units(units: &[CompilationUnit], reporter: &mut dyn Reporter) -> Codebase {
    let mut known = HashSet::new();
    for unit in units {
        let package = PackageName::new(unit.package.clone());
        for decl in &unit.types {
            collect_names(&package, &decl.name, decl, &mut known);
        }
    }

    let mut codebase = Codebase::new("source tree", ProviderId::SOURCE);
    for unit in units {
        let mut lowering = UnitLowering {
            unit,
            resolver: NameResolver::new(unit, &known),
            package: PackageName::new(unit.package.clone()),
            reporter: &mut *reporter,
        };
        for decl in &unit.types {
            lowering.declare(&mut codebase, decl, &Scope::top_level());
        }
    }
    tracing::debug!(
        target: "apimodel.source",
        units = units.len(),
        classes = codebase.class_count(),
        "lowered source tree"
    );
    codebase
}

fn collect_names(package: &PackageName, class_path: &str, decl: &TypeDecl, out: &mut HashSet<String>) {
    out.insert(package.qualify(class_path));
    for member in &decl.member_types {
        collect_names(package, &format!("{class_path}.{}", member.name), member, out);
    }
}

/// What a declaration can see of its surroundings.
#[derive(Clone, Debug, Default)]
struct Scope {
    class_path: Option<String>,
    /// Qualified names of enclosing classes, innermost first.
    enclosing: Vec<String>,
    /// Type variables visible from enclosing declarations.
    type_variables: Vec<String>,
    in_interface: bool,
}

impl Scope {
    fn top_level() -> Self {
        Self::default()
    }
}

struct UnitLowering<'u, 'r> {
    unit: &'u CompilationUnit,
    resolver: NameResolver<'u>,
    package: PackageName,
    reporter: &'r mut dyn Reporter,
}

impl UnitLowering<'_, '_> {
    fn path(&self) -> Option<&Path> {
        self.unit.path.as_deref().map(Path::new)
    }

    fn report(&mut self, line: u32, err: SourceError) {
        tracing::warn!(target: "apimodel.source", line, error = %err, "skipping declaration");
        let location = Location::new(self.path(), line);
        self.reporter
            .report(Diagnostic::error(IssueCode::PARSE_ERROR, err.to_string(), Some(location)));
    }

    fn declare(&mut self, codebase: &mut Codebase, decl: &TypeDecl, scope: &Scope) {
        let class_path = match &scope.class_path {
            Some(outer) => format!("{outer}.{}", decl.name),
            None => decl.name.clone(),
        };
        let name = QualifiedName::new(self.package.clone(), class_path.clone());
        let qualified = name.qualified();
        let kind = match decl.kind {
            DeclKind::Class => ClassKind::Class,
            DeclKind::Interface => ClassKind::Interface,
            DeclKind::Enum => ClassKind::Enum,
            DeclKind::Annotation => ClassKind::AnnotationType,
        };
        let nested = scope.class_path.is_some();

        let mut flags = self.flags(&decl.modifiers, decl.line);
        if nested && (kind != ClassKind::Class || scope.in_interface) {
            flags.insert(ModifierFlags::STATIC);
        }
        if scope.in_interface && flags.visibility() == Visibility::PackagePrivate {
            flags = flags.with_visibility(Visibility::Public);
        }
        if kind.is_interface() {
            flags.remove(ModifierFlags::ABSTRACT);
        }

        let mut enclosing = vec![qualified.clone()];
        enclosing.extend(scope.enclosing.iter().cloned());
        let mut type_variables: Vec<String> = decl.type_parameters.iter().map(|tp| tp.name.clone()).collect();
        if !flags.contains(ModifierFlags::STATIC) {
            type_variables.extend(scope.type_variables.iter().cloned());
        }
        let inner_scope = Scope {
            class_path: Some(class_path),
            enclosing,
            type_variables,
            in_interface: kind.is_interface(),
        };

        let mut data = ClassData::new(kind);
        data.modifiers = Modifiers::new(flags, self.annotations(&decl.annotations, &inner_scope));
        data.docs = decl.docs.clone();
        match self.type_parameters(&decl.type_parameters, &inner_scope) {
            Ok(params) => data.type_parameters = params,
            Err(err) => self.report(decl.line, err),
        }

        let (super_class, interfaces): (&[String], &[String]) = match kind {
            ClassKind::Interface | ClassKind::AnnotationType => (&[], decl.extends.as_slice()),
            ClassKind::Class | ClassKind::Enum => (decl.extends.as_slice(), decl.implements.as_slice()),
        };
        if super_class.len() > 1 {
            self.report(decl.line, SourceError::Declaration(format!("class `{qualified}` extends more than one class")));
        }
        if let Some(text) = super_class.first() {
            match self.ty(text, &inner_scope) {
                Ok(ty) => data.super_class_type = Some(ty),
                Err(err) => self.report(decl.line, err),
            }
        }
        for text in interfaces {
            match self.ty(text, &inner_scope) {
                Ok(ty) => data.interface_types.push(ty),
                Err(err) => self.report(decl.line, err),
            }
        }

        for constant in &decl.enum_constants {
            let mut field = FieldData::new(constant.clone(), TypeItem::class(qualified.clone(), Vec::new()));
            field.modifiers = Modifiers::new(
                ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL,
                Vec::new(),
            );
            field.enum_constant = true;
            data.fields.push(field);
        }
        for field in &decl.fields {
            match self.field(field, &inner_scope) {
                Ok(field) => data.fields.push(field),
                Err(err) => self.report(field.line, err),
            }
        }

        for ctor in &decl.constructors {
            match self.constructor(ctor, kind, &decl.name, &inner_scope) {
                Ok(ctor) => data.constructors.push(ctor),
                Err(err) => self.report(ctor.line, err),
            }
        }
        if decl.constructors.is_empty() && kind == ClassKind::Class {
            // The implicit default constructor has the class's access.
            let mut ctor = CallableData::constructor(decl.name.clone());
            ctor.modifiers = Modifiers::new(ModifierFlags::empty().with_visibility(flags.visibility()), Vec::new());
            ctor.super_call_arity = Some(0);
            data.constructors.push(ctor);
        }

        for method in &decl.methods {
            match self.method(method, kind, &inner_scope) {
                Ok(method) => data.methods.push(method),
                Err(err) => self.report(method.line, err),
            }
        }

        match codebase.define_class(&name, data) {
            Ok(_) => {}
            Err(ModelError::DuplicateClass(name)) => {
                tracing::warn!(target: "apimodel.source", class = %name, "ignoring duplicate class declaration");
                let location = Location::new(self.path(), decl.line);
                self.reporter.report(Diagnostic::warning(
                    IssueCode::DUPLICATE_CLASS,
                    format!("class `{name}` is already declared; keeping the first declaration"),
                    Some(location),
                ));
                return;
            }
            Err(err) => {
                self.report(decl.line, SourceError::Declaration(err.to_string()));
                return;
            }
        }

        for member in &decl.member_types {
            self.declare(codebase, member, &inner_scope);
        }
    }

    fn flags(&mut self, keywords: &[String], line: u32) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        for keyword in keywords {
            match ModifierFlags::from_keyword(keyword) {
                Some(flag) => flags |= flag,
                None => {
                    let location = Location::new(self.path(), line);
                    self.reporter.report(Diagnostic::warning(
                        IssueCode::INVALID_FORMAT,
                        format!("ignoring unknown modifier `{keyword}`"),
                        Some(location),
                    ));
                }
            }
        }
        flags
    }

    fn annotations(&self, uses: &[AnnotationUse], scope: &Scope) -> Vec<AnnotationItem> {
        uses.iter()
            .map(|annotation| {
                let name = annotation.name.trim_start_matches('@');
                let mut item = AnnotationItem::new(self.resolver.resolve(name, &scope.enclosing));
                if let Some(arguments) = &annotation.arguments {
                    item.attributes = parse_annotation_arguments(arguments);
                }
                item
            })
            .collect()
    }

    fn context(&self, scope: &Scope, extra: &[TypeParamDecl]) -> TypeParseContext {
        TypeParseContext::new(false, false)
            .with_type_parameters(scope.type_variables.iter().map(String::as_str))
            .with_type_parameters(extra.iter().map(|tp| tp.name.as_str()))
    }

    fn parse(&self, text: &str, ctx: &TypeParseContext, scope: &Scope) -> Result<TypeItem, SourceError> {
        let mut ty = parse_type(text, ctx).map_err(|source| SourceError::Type {
            text: text.to_string(),
            source,
        })?;
        self.resolver.resolve_type(&mut ty, &scope.enclosing);
        Ok(ty)
    }

    fn ty(&self, text: &str, scope: &Scope) -> Result<TypeItem, SourceError> {
        self.parse(text, &self.context(scope, &[]), scope)
    }

    fn type_parameters(&self, decls: &[TypeParamDecl], scope: &Scope) -> Result<Vec<TypeParameter>, SourceError> {
        let ctx = self.context(scope, decls);
        decls
            .iter()
            .map(|tp| {
                let bounds = tp
                    .bounds
                    .iter()
                    .map(|bound| self.parse(bound, &ctx, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypeParameter::new(tp.name.clone(), bounds))
            })
            .collect()
    }

    fn field(&mut self, decl: &FieldDecl, scope: &Scope) -> Result<FieldData, SourceError> {
        let mut flags = self.flags(&decl.modifiers, decl.line);
        if scope.in_interface {
            flags = flags.with_visibility(Visibility::Public);
            flags.insert(ModifierFlags::STATIC | ModifierFlags::FINAL);
        }
        let annotations = self.annotations(&decl.annotations, scope);
        let ty = with_declared_nullness(self.ty(&decl.ty, scope)?, &annotations);
        let mut field = FieldData::new(decl.name.clone(), ty);
        field.modifiers = Modifiers::new(flags, annotations);
        field.value = decl.value.clone();
        field.docs = decl.docs.clone();
        Ok(field)
    }

    fn parameters(&mut self, decls: &[ParamDecl], ctx: &TypeParseContext, scope: &Scope) -> Result<Vec<ParameterData>, SourceError> {
        decls
            .iter()
            .map(|decl| {
                let annotations = self.annotations(&decl.annotations, scope);
                let ty = with_declared_nullness(self.parse(&decl.ty, ctx, scope)?, &annotations);
                let mut flags = self.flags(&decl.modifiers, 0);
                if ty.is_varargs() {
                    flags.insert(ModifierFlags::VARARGS);
                }
                let mut parameter = ParameterData::new(Some(decl.name.clone()), ty);
                parameter.modifiers = Modifiers::new(flags, annotations);
                Ok(parameter)
            })
            .collect()
    }

    fn constructor(
        &mut self,
        decl: &ConstructorDecl,
        kind: ClassKind,
        simple_name: &str,
        scope: &Scope,
    ) -> Result<CallableData, SourceError> {
        let ctx = self.context(scope, &decl.type_parameters);
        let mut ctor = CallableData::constructor(simple_name);
        ctor.modifiers = Modifiers::new(
            self.flags(&decl.modifiers, decl.line),
            self.annotations(&decl.annotations, scope),
        );
        ctor.type_parameters = self.type_parameters(&decl.type_parameters, scope)?;
        ctor.parameters = self.parameters(&decl.parameters, &ctx, scope)?;
        ctor.throws = self.throws(&decl.throws, &ctx, scope)?;
        // Without an explicit call, a class constructor calls `super()`.
        ctor.super_call_arity = match (decl.super_call_args, kind) {
            (Some(args), _) => Some(args),
            (None, ClassKind::Class) => Some(0),
            (None, _) => None,
        };
        ctor.docs = decl.docs.clone();
        Ok(ctor)
    }

    fn method(&mut self, decl: &MethodDecl, kind: ClassKind, scope: &Scope) -> Result<CallableData, SourceError> {
        let ctx = self.context(scope, &decl.type_parameters);
        let mut flags = self.flags(&decl.modifiers, decl.line);
        if kind.is_interface() {
            if flags.visibility() == Visibility::PackagePrivate {
                flags = flags.with_visibility(Visibility::Public);
            }
            let has_body = flags.contains(ModifierFlags::DEFAULT)
                || flags.contains(ModifierFlags::STATIC)
                || flags.contains(ModifierFlags::PRIVATE);
            if !has_body {
                flags.insert(ModifierFlags::ABSTRACT);
            }
        }
        let annotations = self.annotations(&decl.annotations, scope);
        let return_type = with_declared_nullness(self.parse(&decl.return_type, &ctx, scope)?, &annotations);

        let mut method = CallableData::method(decl.name.clone(), return_type);
        method.modifiers = Modifiers::new(flags, annotations);
        method.type_parameters = self.type_parameters(&decl.type_parameters, scope)?;
        method.parameters = self.parameters(&decl.parameters, &ctx, scope)?;
        method.throws = self.throws(&decl.throws, &ctx, scope)?;
        method.docs = decl.docs.clone();
        Ok(method)
    }

    fn throws(&self, texts: &[String], ctx: &TypeParseContext, scope: &Scope) -> Result<Vec<TypeItem>, SourceError> {
        texts.iter().map(|text| self.parse(text, ctx, scope)).collect()
    }
}

/// A nullness declaration annotation decides the nullability of the declared type.
fn with_declared_nullness(ty: TypeItem, annotations: &[AnnotationItem]) -> TypeItem {
    match annotations.iter().find_map(AnnotationItem::nullability) {
        Some(nullability) if !ty.is_primitive() && !ty.is_varargs() => ty.with_nullability(nullability),
        _ => ty,
    }
}
