use std::path::{Path, PathBuf};

use apimodel_core::{Diagnostic, IssueCode, Location, Reporter, JAVA_LANG_OBJECT};
use apimodel_model::{
    CallableItem, ClassItem, ClassKind, Codebase, FieldItem, ModifiedItem, ModifierList,
    PackageItem, ParameterItem, SelectableItem,
};
use apimodel_types::{type_parameter_list_string, TypeItem, TypeStringConfig};

use crate::FileFormat;

/// Writes every emitted class of `codebase` in canonical signature form: packages in
/// canonical order, classes by name, members grouped by kind in declaration order.
pub fn write_signature(codebase: &Codebase, format: &FileFormat) -> String {
    let writer = SignatureWriter::new(format);
    let mut out = format.header();
    for package in codebase.packages() {
        writer.write_package(&mut out, package);
    }
    out
}

/// Writes one `<package>.txt` signature file per package with emitted classes into `dir`.
///
/// A file that cannot be written is reported as `io-error`; the remaining packages are
/// still written. Returns the paths written.
pub fn write_package_artifacts(
    codebase: &Codebase,
    format: &FileFormat,
    dir: &Path,
    reporter: &mut dyn Reporter,
) -> Vec<PathBuf> {
    let writer = SignatureWriter::new(format);
    let mut written = Vec::new();
    for package in codebase.packages() {
        let mut body = String::new();
        if !writer.write_package(&mut body, package) {
            continue;
        }
        let path = dir.join(format!("{}.txt", package.name()));
        let text = format!("{}{body}", format.header());
        match std::fs::write(&path, text) {
            Ok(()) => written.push(path),
            Err(err) => {
                tracing::warn!(
                    target: "apimodel.signature",
                    path = %path.display(),
                    error = %err,
                    "failed to write package signature"
                );
                reporter.report(Diagnostic::error(
                    IssueCode::IO_ERROR,
                    format!("failed to write `{}`: {err}", path.display()),
                    Some(Location::file(path.clone())),
                ));
            }
        }
    }
    written
}

struct SignatureWriter {
    format: FileFormat,
    config: TypeStringConfig,
}

impl SignatureWriter {
    fn new(format: &FileFormat) -> Self {
        Self {
            format: *format,
            config: format.type_string_config(),
        }
    }

    fn ty(&self, ty: &TypeItem) -> String {
        ty.to_type_string(&self.config)
    }

    fn type_list(&self, types: &[TypeItem]) -> String {
        types.iter().map(|t| self.ty(t)).collect::<Vec<_>>().join(", ")
    }

    /// Returns whether the package had anything to write.
    fn write_package(&self, out: &mut String, package: PackageItem<'_>) -> bool {
        let mut classes: Vec<ClassItem<'_>> = package
            .all_classes()
            .into_iter()
            .filter(|c| c.emit())
            .collect();
        if classes.is_empty() {
            return false;
        }
        if package.is_root() {
            tracing::warn!(
                target: "apimodel.signature",
                classes = classes.len(),
                "classes in the root package cannot be written"
            );
            return false;
        }
        classes.sort_by(|a, b| a.full_name().cmp(b.full_name()));

        out.push_str(&format!("package {} {{\n\n", package.name()));
        for class in classes {
            self.write_class(out, class);
        }
        out.push_str("}\n\n");
        true
    }

    fn write_class(&self, out: &mut String, class: ClassItem<'_>) {
        let mut parts: Vec<String> = Vec::new();
        push_modifiers(&mut parts, class.modifiers());
        parts.push(class.kind().keyword().to_string());
        parts.push(format!(
            "{}{}",
            class.full_name(),
            type_parameter_list_string(class.type_parameter_list(), &self.config)
        ));

        let interfaces = class.interface_types();
        if class.kind().is_interface() {
            if !interfaces.is_empty() {
                parts.push(format!("extends {}", self.type_list(interfaces)));
            }
        } else {
            if let Some(super_class) = class
                .super_class_type()
                .filter(|ty| !is_implicit_super_class(class, ty))
            {
                parts.push(format!("extends {}", self.ty(super_class)));
            }
            if !interfaces.is_empty() {
                parts.push(format!("implements {}", self.type_list(interfaces)));
            }
        }
        out.push_str(&format!("  {} {{\n", parts.join(" ")));

        let fields = class.fields();
        for field in fields.iter().filter(|f| f.is_enum_constant()) {
            self.write_field(out, "enum_constant", *field);
        }
        for ctor in class.constructors() {
            self.write_callable(out, "ctor", ctor);
        }
        for method in class.methods() {
            self.write_callable(out, "method", method);
        }
        for field in fields.iter().filter(|f| !f.is_enum_constant()) {
            self.write_field(out, "field", *field);
        }
        out.push_str("  }\n\n");
    }

    fn write_callable(&self, out: &mut String, keyword: &str, callable: CallableItem<'_>) {
        let mut parts = vec![keyword.to_string()];
        push_modifiers(&mut parts, callable.modifiers());
        let type_parameters = type_parameter_list_string(callable.type_parameter_list(), &self.config);
        if !type_parameters.is_empty() {
            parts.push(type_parameters);
        }
        if !callable.is_constructor() {
            parts.push(self.ty(callable.return_type()));
        }
        let parameters: Vec<String> = callable
            .parameters()
            .into_iter()
            .map(|p| self.parameter(p))
            .collect();
        parts.push(format!("{}({})", callable.name(), parameters.join(", ")));
        if !callable.throws_types().is_empty() {
            parts.push(format!("throws {}", self.type_list(callable.throws_types())));
        }
        out.push_str(&format!("    {};\n", parts.join(" ")));
    }

    fn parameter(&self, parameter: ParameterItem<'_>) -> String {
        let mut parts = Vec::new();
        push_modifiers(&mut parts, parameter.modifiers());
        let ty = self.ty(parameter.ty());
        match parameter.name() {
            Some(name) if self.format.kotlin_name_type_order => parts.push(format!("{name}: {ty}")),
            Some(name) => {
                parts.push(ty);
                parts.push(name.to_string());
            }
            None => parts.push(ty),
        }
        parts.join(" ")
    }

    fn write_field(&self, out: &mut String, keyword: &str, field: FieldItem<'_>) {
        let mut parts = vec![keyword.to_string()];
        push_modifiers(&mut parts, field.modifiers());
        parts.push(self.ty(field.ty()));
        parts.push(field.name().to_string());
        if let Some(value) = field.initial_value() {
            parts.push(format!("= {value}"));
        }
        out.push_str(&format!("    {};\n", parts.join(" ")));
    }
}

fn push_modifiers(parts: &mut Vec<String>, modifiers: &dyn ModifierList) {
    let source = modifiers.to_source();
    if !source.is_empty() {
        parts.push(source);
    }
}

/// `extends java.lang.Object` on classes and `extends java.lang.Enum<Self>` on enums are
/// implied by the declaration kind.
fn is_implicit_super_class(class: ClassItem<'_>, ty: &TypeItem) -> bool {
    let Some(class_type) = ty.as_class() else {
        return false;
    };
    if !class_type.modifiers.annotations.is_empty() {
        return false;
    }
    match class.kind() {
        ClassKind::Enum => {
            class_type.qualified_name == "java.lang.Enum"
                && matches!(
                    class_type.arguments.as_slice(),
                    [arg] if arg.as_class().is_some_and(|a| a.qualified_name == class.qualified_name())
                )
        }
        _ => class_type.qualified_name == JAVA_LANG_OBJECT && class_type.arguments.is_empty(),
    }
}
