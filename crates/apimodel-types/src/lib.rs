//! Provider-neutral type representation.
//!
//! [`TypeItem`] is a closed set of variants (primitive, class, array, wildcard, type variable),
//! each non-primitive variant carrying a [`Nullability`] and type-use annotations. Types render
//! to text under a [`TypeStringConfig`] and parse back with [`parse_type`]; the erased form is
//! the key used for overload matching.

mod annotation;
mod parse;
mod render;
mod ty;

pub use annotation::{parse_annotation_arguments, AnnotationAttribute, AnnotationItem};
pub use parse::{
    parse_type, parse_type_parameters_prefix, parse_type_prefix, TypeParseContext,
    TypeParseError,
};
pub use render::{type_parameter_list_string, AnnotationFilter, TypeStringConfig};
pub use ty::{
    ArrayTypeItem, ClassTypeItem, EmptyScope, NestedScope, Nullability, PrimitiveKind,
    PrimitiveTypeItem, TypeItem, TypeModifiers, TypeParameter, TypeParameterScope,
    VariableTypeItem, WildcardBound, WildcardTypeItem,
};
