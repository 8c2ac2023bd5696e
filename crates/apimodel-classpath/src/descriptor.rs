use apimodel_types::{PrimitiveKind, TypeItem};

use crate::error::{DescriptorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub(crate) fn from_char(c: char) -> Option<BaseType> {
        Some(match c {
            'B' => BaseType::Byte,
            'C' => BaseType::Char,
            'D' => BaseType::Double,
            'F' => BaseType::Float,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'S' => BaseType::Short,
            'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    pub fn primitive_kind(self) -> PrimitiveKind {
        match self {
            BaseType::Byte => PrimitiveKind::Byte,
            BaseType::Char => PrimitiveKind::Char,
            BaseType::Double => PrimitiveKind::Double,
            BaseType::Float => PrimitiveKind::Float,
            BaseType::Int => PrimitiveKind::Int,
            BaseType::Long => PrimitiveKind::Long,
            BaseType::Short => PrimitiveKind::Short,
            BaseType::Boolean => PrimitiveKind::Boolean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/util/Map$Entry`.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn to_type_item(&self) -> TypeItem {
        match self {
            FieldType::Base(base) => TypeItem::primitive(base.primitive_kind()),
            FieldType::Object(internal) => TypeItem::class(internal_to_qualified(internal), Vec::new()),
            FieldType::Array(component) => TypeItem::array(component.to_type_item()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

impl ReturnType {
    pub fn to_type_item(&self) -> TypeItem {
        match self {
            ReturnType::Void => TypeItem::void(),
            ReturnType::Type(ty) => ty.to_type_item(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

/// `java/util/Map$Entry` -> `java.util.Map.Entry`.
pub fn internal_to_qualified(internal: &str) -> String {
    internal.replace(['/', '$'], ".")
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(DescriptorError::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let invalid = || DescriptorError::InvalidDescriptor(desc.to_string());
    let mut rest = desc.strip_prefix('(').ok_or_else(invalid)?;

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(invalid());
        }
        let (param, after) = parse_field_type(rest)?;
        params.push(param);
        rest = after;
    }

    let (return_type, rest) = if let Some(rest) = rest.strip_prefix('V') {
        (ReturnType::Void, rest)
    } else {
        let (ty, rest) = parse_field_type(rest).map_err(|_| invalid())?;
        (ReturnType::Type(ty), rest)
    };

    if !rest.is_empty() {
        return Err(invalid());
    }

    Ok(MethodDescriptor { params, return_type })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let mut chars = input.chars();
    let Some(first) = chars.next() else {
        return Err(DescriptorError::InvalidDescriptor(input.to_string()));
    };
    if let Some(base) = BaseType::from_char(first) {
        return Ok((FieldType::Base(base), &input[1..]));
    }
    match first {
        'L' => match input.find(';') {
            Some(end) if end > 1 => Ok((FieldType::Object(input[1..end].to_string()), &input[end + 1..])),
            _ => Err(DescriptorError::InvalidDescriptor(input.to_string())),
        },
        '[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(DescriptorError::InvalidDescriptor(input.to_string())),
    }
}
