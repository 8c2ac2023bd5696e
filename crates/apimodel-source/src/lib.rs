//! Source provider: lowers a parsed Java declaration tree into the API model.
//!
//! The tree comes from an external front end as JSON. Lowering resolves simple names against
//! imports and the declared classes, and applies the language's implicit modifiers and
//! constructors.

#![forbid(unsafe_code)]

mod error;
mod lower;
mod provider;
mod resolve;
mod tree;

pub use error::SourceError;
pub use lower::lower_units;
pub use provider::SourceProvider;
pub use tree::{
    AnnotationUse, CompilationUnit, ConstructorDecl, DeclKind, FieldDecl, MethodDecl, ParamDecl,
    SourceTree, TypeDecl, TypeParamDecl,
};
