//! Classpath provider: compiled class stubs and their conversion into the model.
//!
//! Stubs are read from JSON indexes produced by an external class-file reader. Each stub keeps
//! its JVM descriptors and optional generic signatures; both are parsed here.

#![forbid(unsafe_code)]

mod descriptor;
mod error;
mod index;
mod provider;
mod signature;
mod stub;

pub use descriptor::{
    internal_to_qualified, parse_field_descriptor, parse_method_descriptor, BaseType, FieldType,
    MethodDescriptor, ReturnType,
};
pub use error::{ClasspathError, DescriptorError};
pub use index::ClasspathIndex;
pub use provider::ClasspathProvider;
pub use signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    MethodSignature,
};
pub use stub::{
    binary_to_qualified_name, ClassStub, FieldStub, MethodStub, ACC_ABSTRACT, ACC_ANNOTATION,
    ACC_BRIDGE, ACC_ENUM, ACC_FINAL, ACC_INTERFACE, ACC_NATIVE, ACC_PRIVATE, ACC_PROTECTED,
    ACC_PUBLIC, ACC_STATIC, ACC_SYNCHRONIZED, ACC_SYNTHETIC, ACC_TRANSIENT, ACC_VARARGS,
    ACC_VOLATILE,
};
