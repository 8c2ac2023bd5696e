use apimodel_core::{PackageName, QualifiedName};
use apimodel_model::{
    CallableData, ClassData, ClassKind, FieldData, ModifierFlags, Modifiers, ParameterData,
};
use apimodel_types::{AnnotationItem, Nullability, TypeItem};
use serde::{Deserialize, Serialize};

use crate::descriptor::{
    internal_to_qualified, parse_field_descriptor, parse_method_descriptor, FieldType,
};
use crate::error::{DescriptorError, Result};
use crate::signature::{parse_class_signature, parse_field_signature, parse_method_signature};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
pub const ACC_VOLATILE: u16 = 0x0040;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_TRANSIENT: u16 = 0x0080;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStub {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub signature: Option<String>,
    pub access_flags: u16,
    /// Binary names of declaration annotations.
    #[serde(default)]
    pub annotations: Vec<String>,
    /// `ConstantValue` in source form.
    #[serde(default)]
    pub constant_value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStub {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub signature: Option<String>,
    pub access_flags: u16,
    #[serde(default)]
    pub annotations: Vec<String>,
    /// Declaration annotations per parameter, in parameter order.
    #[serde(default)]
    pub parameter_annotations: Vec<Vec<String>>,
    /// Internal names from the `Exceptions` attribute.
    #[serde(default)]
    pub exceptions: Vec<String>,
}

/// What the index knows about one compiled class.
///
/// `access_flags` are the declared flags (for nested classes, those of the `InnerClasses`
/// entry, so `static` is visible).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStub {
    /// `java.util.Map$Entry`.
    pub binary_name: String,
    pub access_flags: u16,
    #[serde(default)]
    pub super_binary_name: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldStub>,
    #[serde(default)]
    pub methods: Vec<MethodStub>,
}

impl ClassStub {
    pub fn new(binary_name: impl Into<String>, access_flags: u16) -> Self {
        Self {
            binary_name: binary_name.into(),
            access_flags,
            super_binary_name: None,
            interfaces: Vec::new(),
            signature: None,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn package(&self) -> &str {
        self.binary_name
            .rsplit_once('.')
            .map_or("", |(package, _)| package)
    }

    /// `java.util.Map$Entry` -> package `java.util`, class path `Map.Entry`.
    pub fn qualified_name(&self) -> QualifiedName {
        binary_to_qualified_name(&self.binary_name)
    }

    pub fn kind(&self) -> ClassKind {
        if self.access_flags & ACC_ANNOTATION != 0 {
            ClassKind::AnnotationType
        } else if self.access_flags & ACC_INTERFACE != 0 {
            ClassKind::Interface
        } else if self.access_flags & ACC_ENUM != 0 {
            ClassKind::Enum
        } else {
            ClassKind::Class
        }
    }

    fn is_inner_class(&self) -> bool {
        self.qualified_name().outer().is_some() && self.access_flags & ACC_STATIC == 0
    }

    /// Converts the stub into a model declaration. Synthetic and bridge members and static
    /// initializers are dropped; the result has `emit == false`.
    pub fn to_class_data(&self) -> Result<ClassData> {
        let kind = self.kind();
        let name = self.qualified_name();
        let mut data = ClassData::new(kind);
        data.emit = false;

        let mut flags = class_flags(self.access_flags);
        if kind.is_interface() {
            flags.remove(ModifierFlags::ABSTRACT);
        }
        if kind == ClassKind::Enum {
            flags.remove(ModifierFlags::FINAL);
        }
        data.modifiers = Modifiers::new(flags, annotations(&self.annotations));

        match &self.signature {
            Some(sig) => {
                let sig = parse_class_signature(sig)?;
                data.type_parameters = sig.type_parameters;
                data.super_class_type = Some(sig.super_class);
                data.interface_types = sig.interfaces;
            }
            None => {
                data.super_class_type = self
                    .super_binary_name
                    .as_deref()
                    .map(|name| TypeItem::class(name.replace('$', "."), Vec::new()));
                data.interface_types = self
                    .interfaces
                    .iter()
                    .map(|name| TypeItem::class(name.replace('$', "."), Vec::new()))
                    .collect();
            }
        }
        if kind.is_interface() {
            // Interfaces name `java.lang.Object` as their superclass in class files.
            data.super_class_type = None;
        }

        for method in &self.methods {
            if method.access_flags & (ACC_SYNTHETIC | ACC_BRIDGE) != 0 || method.name == "<clinit>" {
                continue;
            }
            let callable = self.callable(method, kind, name.simple_name())?;
            if method.name == "<init>" {
                data.constructors.push(callable);
            } else {
                data.methods.push(callable);
            }
        }

        for field in &self.fields {
            if field.access_flags & ACC_SYNTHETIC != 0 {
                continue;
            }
            data.fields.push(field_data(field)?);
        }
        Ok(data)
    }

    fn callable(&self, method: &MethodStub, kind: ClassKind, simple_name: &str) -> Result<CallableData> {
        let is_constructor = method.name == "<init>";
        let descriptor = parse_method_descriptor(&method.descriptor)?;
        let (type_parameters, mut parameters, return_type, mut throws) = match &method.signature {
            Some(sig) => {
                let sig = parse_method_signature(sig)?;
                (sig.type_parameters, sig.parameters, sig.return_type, sig.throws)
            }
            None => {
                let mut params: Vec<TypeItem> =
                    descriptor.params.iter().map(FieldType::to_type_item).collect();
                // The outer instance is passed implicitly to inner class constructors.
                if is_constructor && self.is_inner_class() && !params.is_empty() {
                    params.remove(0);
                }
                (Vec::new(), params, descriptor.return_type.to_type_item(), Vec::new())
            }
        };
        if throws.is_empty() {
            throws = method
                .exceptions
                .iter()
                .map(|name| TypeItem::class(internal_to_qualified(name), Vec::new()))
                .collect();
        }

        if method.access_flags & ACC_VARARGS != 0 {
            if let Some(TypeItem::Array(last)) = parameters.pop() {
                parameters.push(TypeItem::varargs(*last.component));
            } else {
                return Err(DescriptorError::InvalidDescriptor(method.descriptor.clone()));
            }
        }

        let mut flags = member_flags(method.access_flags);
        if kind.is_interface()
            && method.access_flags & (ACC_ABSTRACT | ACC_STATIC | ACC_PRIVATE) == 0
            && !is_constructor
        {
            flags.insert(ModifierFlags::DEFAULT);
        }
        let method_annotations = annotations(&method.annotations);

        let mut callable = if is_constructor {
            CallableData::constructor(simple_name)
        } else {
            CallableData::method(
                method.name.clone(),
                with_declared_nullness(return_type, &method_annotations),
            )
        };
        callable.modifiers = Modifiers::new(flags, method_annotations);
        callable.type_parameters = type_parameters;
        callable.throws = throws;

        // Declaration order is kept; class files carry no parameter names.
        let offset = method.parameter_annotations.len().saturating_sub(parameters.len());
        for (idx, ty) in parameters.into_iter().enumerate() {
            let parameter_annotations = method
                .parameter_annotations
                .get(idx + offset)
                .map(|names| annotations(names))
                .unwrap_or_default();
            let mut parameter = ParameterData::new(None, with_declared_nullness(ty, &parameter_annotations));
            parameter.modifiers = Modifiers::new(ModifierFlags::empty(), parameter_annotations);
            callable.parameters.push(parameter);
        }
        Ok(callable)
    }
}

/// `java.util.Map$Entry` -> package `java.util`, class path `Map.Entry`.
pub fn binary_to_qualified_name(binary_name: &str) -> QualifiedName {
    match binary_name.rsplit_once('.') {
        Some((package, class)) => QualifiedName::new(PackageName::new(package), class.replace('$', ".")),
        None => QualifiedName::new(PackageName::root(), binary_name.replace('$', ".")),
    }
}

fn field_data(field: &FieldStub) -> Result<FieldData> {
    let ty = match &field.signature {
        Some(sig) => parse_field_signature(sig)?,
        None => parse_field_descriptor(&field.descriptor)?.to_type_item(),
    };
    let field_annotations = annotations(&field.annotations);
    let mut data = FieldData::new(field.name.clone(), with_declared_nullness(ty, &field_annotations));
    data.enum_constant = field.access_flags & ACC_ENUM != 0;
    data.modifiers = Modifiers::new(field_flags(field.access_flags), field_annotations);
    data.value = field.constant_value.clone();
    Ok(data)
}

fn annotations(names: &[String]) -> Vec<AnnotationItem> {
    names
        .iter()
        .map(|name| AnnotationItem::new(name.replace('$', ".")))
        .collect()
}

/// A nullness declaration annotation decides the nullability of the declared type.
fn with_declared_nullness(ty: TypeItem, annotations: &[AnnotationItem]) -> TypeItem {
    match annotations.iter().find_map(AnnotationItem::nullability) {
        Some(nullability) if !ty.is_primitive() => ty.with_nullability(nullability),
        _ if ty.is_varargs() => ty.with_nullability(Nullability::NonNull),
        _ => ty,
    }
}

fn visibility_flags(access_flags: u16) -> ModifierFlags {
    let mut flags = ModifierFlags::empty();
    flags.set(ModifierFlags::PUBLIC, access_flags & ACC_PUBLIC != 0);
    flags.set(ModifierFlags::PROTECTED, access_flags & ACC_PROTECTED != 0);
    flags.set(ModifierFlags::PRIVATE, access_flags & ACC_PRIVATE != 0);
    flags.set(ModifierFlags::STATIC, access_flags & ACC_STATIC != 0);
    flags.set(ModifierFlags::FINAL, access_flags & ACC_FINAL != 0);
    flags
}

fn class_flags(access_flags: u16) -> ModifierFlags {
    let mut flags = visibility_flags(access_flags);
    flags.set(ModifierFlags::ABSTRACT, access_flags & ACC_ABSTRACT != 0);
    flags
}

fn member_flags(access_flags: u16) -> ModifierFlags {
    let mut flags = class_flags(access_flags);
    flags.set(ModifierFlags::SYNCHRONIZED, access_flags & ACC_SYNCHRONIZED != 0);
    flags.set(ModifierFlags::NATIVE, access_flags & ACC_NATIVE != 0);
    flags.set(ModifierFlags::VARARGS, access_flags & ACC_VARARGS != 0);
    flags
}

fn field_flags(access_flags: u16) -> ModifierFlags {
    let mut flags = visibility_flags(access_flags);
    flags.set(ModifierFlags::VOLATILE, access_flags & ACC_VOLATILE != 0);
    flags.set(ModifierFlags::TRANSIENT, access_flags & ACC_TRANSIENT != 0);
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimodel_model::ModifierList;
    use apimodel_types::TypeStringConfig;
    use pretty_assertions::assert_eq;

    fn method(name: &str, descriptor: &str, access_flags: u16) -> MethodStub {
        MethodStub {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            access_flags,
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    #[test]
    fn binary_names_split_at_the_package() {
        let name = binary_to_qualified_name("java.util.Map$Entry");
        assert_eq!(name.package.as_str(), "java.util");
        assert_eq!(name.class_path, "Map.Entry");
        assert_eq!(binary_to_qualified_name("Top").qualified(), "Top");
    }

    #[test]
    fn converts_members_and_drops_synthetics() {
        let mut stub = ClassStub::new("test.Widget", ACC_PUBLIC | ACC_ABSTRACT);
        stub.super_binary_name = Some("test.Base".into());
        stub.methods = vec![
            method("<init>", "(I)V", ACC_PUBLIC),
            method("<clinit>", "()V", ACC_STATIC),
            method("format", "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;", ACC_PUBLIC | ACC_VARARGS),
            method("access$000", "()V", ACC_STATIC | ACC_SYNTHETIC),
        ];
        stub.methods[2].annotations = vec!["androidx.annotation.NonNull".into()];
        stub.fields = vec![FieldStub {
            name: "MAX".into(),
            descriptor: "J".into(),
            signature: None,
            access_flags: ACC_PUBLIC | ACC_STATIC | ACC_FINAL,
            annotations: Vec::new(),
            constant_value: Some("10L".into()),
        }];

        let data = stub.to_class_data().unwrap();
        assert!(!data.emit);
        assert!(data.modifiers.is_abstract());
        assert_eq!(data.super_class_type, Some(TypeItem::class("test.Base", Vec::new())));
        assert_eq!(data.constructors.len(), 1);
        assert_eq!(data.constructors[0].name, "Widget");
        assert_eq!(data.methods.len(), 1);

        let format = &data.methods[0];
        assert!(format.parameters[1].ty.is_varargs());
        assert_eq!(format.return_type.nullability(), Nullability::NonNull);
        assert_eq!(
            format.parameters[1].ty.to_type_string(&TypeStringConfig::default()),
            "java.lang.Object..."
        );
        assert_eq!(data.fields[0].value.as_deref(), Some("10L"));
        assert!(data.fields[0].modifiers.is_static());
    }

    #[test]
    fn interfaces_enums_and_inner_constructors() {
        let mut iface = ClassStub::new("test.Shape", ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT);
        iface.super_binary_name = Some("java.lang.Object".into());
        iface.methods = vec![
            method("area", "()D", ACC_PUBLIC | ACC_ABSTRACT),
            method("describe", "()Ljava/lang/String;", ACC_PUBLIC),
        ];
        let data = iface.to_class_data().unwrap();
        assert_eq!(data.kind, ClassKind::Interface);
        assert!(!data.modifiers.is_abstract());
        assert_eq!(data.super_class_type, None);
        assert!(!data.methods[0].modifiers.has(ModifierFlags::DEFAULT));
        assert!(data.methods[1].modifiers.has(ModifierFlags::DEFAULT));

        let mut color = ClassStub::new("test.Color", ACC_PUBLIC | ACC_FINAL | ACC_ENUM);
        color.fields = vec![FieldStub {
            name: "RED".into(),
            descriptor: "Ltest/Color;".into(),
            signature: None,
            access_flags: ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM,
            annotations: Vec::new(),
            constant_value: None,
        }];
        let data = color.to_class_data().unwrap();
        assert_eq!(data.kind, ClassKind::Enum);
        assert!(data.fields[0].enum_constant);

        let mut inner = ClassStub::new("test.Outer$Inner", ACC_PUBLIC);
        inner.methods = vec![method("<init>", "(Ltest/Outer;I)V", ACC_PUBLIC)];
        let data = inner.to_class_data().unwrap();
        assert_eq!(data.constructors[0].name, "Inner");
        assert_eq!(data.constructors[0].parameters.len(), 1);
    }

    #[test]
    fn bad_descriptors_are_errors() {
        let mut stub = ClassStub::new("test.Broken", ACC_PUBLIC);
        stub.methods = vec![method("f", "(Q)V", ACC_PUBLIC)];
        assert!(stub.to_class_data().is_err());
    }
}
