//! The declaration tree a Java front end hands over, one [`CompilationUnit`] per source file.
//!
//! Types are written as they appear in source (`List<String>`, `Map.Entry<K, V>`, `T...`);
//! names are resolved during lowering.

use serde::{Deserialize, Serialize};

use crate::SourceError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTree {
    pub units: Vec<CompilationUnit>,
}

impl SourceTree {
    pub fn from_json_str(text: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Path of the file the unit was read from, for diagnostics.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub package: String,
    /// `java.util.List` or `java.util.*`. Static imports are not listed.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUse {
    /// As written: `Nullable` or `androidx.annotation.Nullable`.
    pub name: String,
    /// Text between the parentheses, if any.
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDecl {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: DeclKind,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParamDecl>,
    /// Superclass for classes, superinterfaces for interfaces.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub enum_constants: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub member_types: Vec<TypeDecl>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub line: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    /// Constant initializer in source form.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub line: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParamDecl>,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    #[serde(default)]
    pub throws: Vec<String>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub line: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParamDecl>,
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    #[serde(default)]
    pub throws: Vec<String>,
    /// Argument count of an explicit `super(...)` call in the body.
    #[serde(default)]
    pub super_call_args: Option<usize>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub line: u32,
}
