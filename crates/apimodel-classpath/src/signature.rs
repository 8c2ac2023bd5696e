//! JVM generic signatures (JVMS 4.7.9.1), parsed straight into model types.

use apimodel_types::{ClassTypeItem, TypeItem, TypeParameter, WildcardBound};

use crate::descriptor::{internal_to_qualified, BaseType};
use crate::error::{DescriptorError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: TypeItem,
    pub interfaces: Vec<TypeItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeItem>,
    pub return_type: TypeItem,
    pub throws: Vec<TypeItem>,
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut p = SigParser::new(sig);
    let type_parameters = p.type_parameters()?;
    let super_class = p.class_type()?;
    let mut interfaces = Vec::new();
    while !p.at_end() {
        interfaces.push(p.class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = SigParser::new(sig);
    let type_parameters = p.type_parameters()?;
    p.expect('(')?;
    let mut parameters = Vec::new();
    while !p.eat(')') {
        parameters.push(p.java_type()?);
    }
    let return_type = if p.eat('V') {
        TypeItem::void()
    } else {
        p.java_type()?
    };
    let mut throws = Vec::new();
    while p.eat('^') {
        throws.push(p.reference_type()?);
    }
    p.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<TypeItem> {
    let mut p = SigParser::new(sig);
    let ty = p.reference_type()?;
    p.finish()?;
    Ok(ty)
}

struct SigParser<'a> {
    sig: &'a str,
    pos: usize,
}

impl<'a> SigParser<'a> {
    fn new(sig: &'a str) -> Self {
        Self { sig, pos: 0 }
    }

    fn error(&self) -> DescriptorError {
        DescriptorError::InvalidSignature(self.sig.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.sig[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.sig.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// Reads up to (not including) the first of `stops`.
    fn ident(&mut self, stops: &[char]) -> Result<&'a str> {
        let rest = &self.sig[self.pos..];
        let end = rest.find(|c| stops.contains(&c)).unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error());
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut params = Vec::new();
        if !self.eat('<') {
            return Ok(params);
        }
        while !self.eat('>') {
            let name = self.ident(&[':', '>'])?.to_string();
            self.expect(':')?;
            let mut bounds = Vec::new();
            // The class bound may be empty (`T::Ljava/lang/Comparable;`).
            if matches!(self.peek(), Some('L' | 'T' | '[')) {
                bounds.push(self.reference_type()?);
            }
            while self.eat(':') {
                bounds.push(self.reference_type()?);
            }
            params.push(TypeParameter::new(name, bounds));
        }
        if params.is_empty() {
            return Err(self.error());
        }
        Ok(params)
    }

    fn java_type(&mut self) -> Result<TypeItem> {
        if let Some(base) = self.peek().and_then(BaseType::from_char) {
            self.pos += 1;
            return Ok(TypeItem::primitive(base.primitive_kind()));
        }
        self.reference_type()
    }

    fn reference_type(&mut self) -> Result<TypeItem> {
        match self.peek() {
            Some('L') => self.class_type(),
            Some('T') => {
                self.pos += 1;
                let name = self.ident(&[';'])?;
                self.expect(';')?;
                Ok(TypeItem::variable(name))
            }
            Some('[') => {
                self.pos += 1;
                Ok(TypeItem::array(self.java_type()?))
            }
            _ => Err(self.error()),
        }
    }

    fn class_type(&mut self) -> Result<TypeItem> {
        self.expect('L')?;
        let name = self.ident(&['<', '.', ';'])?;
        let mut current = ClassTypeItem::new(internal_to_qualified(name));
        current.arguments = self.type_arguments()?;
        while self.eat('.') {
            let segment = self.ident(&['<', '.', ';'])?;
            let mut inner = ClassTypeItem::new(format!("{}.{segment}", current.qualified_name));
            // Only a generic outer needs to stay attached; otherwise the name says it all.
            if !current.arguments.is_empty() || current.outer.is_some() {
                inner.outer = Some(Box::new(current));
            }
            inner.arguments = self.type_arguments()?;
            current = inner;
        }
        self.expect(';')?;
        Ok(TypeItem::Class(current))
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeItem>> {
        let mut args = Vec::new();
        if !self.eat('<') {
            return Ok(args);
        }
        while !self.eat('>') {
            let arg = if self.eat('*') {
                TypeItem::wildcard(None)
            } else if self.eat('+') {
                TypeItem::wildcard(Some(WildcardBound::Extends(Box::new(self.reference_type()?))))
            } else if self.eat('-') {
                TypeItem::wildcard(Some(WildcardBound::Super(Box::new(self.reference_type()?))))
            } else {
                self.reference_type()?
            };
            args.push(arg);
        }
        if args.is_empty() {
            return Err(self.error());
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimodel_types::{PrimitiveKind, TypeStringConfig};
    use pretty_assertions::assert_eq;

    fn render(ty: &TypeItem) -> String {
        ty.to_type_string(&TypeStringConfig::default())
    }

    #[test]
    fn class_signature_with_bounds() {
        let sig = parse_class_signature(
            "<K:Ljava/lang/Object;V::Ljava/lang/Comparable<TV;>;>Ljava/util/AbstractMap<TK;TV;>;Ljava/io/Serializable;",
        )
        .unwrap();
        assert_eq!(sig.type_parameters.len(), 2);
        assert_eq!(sig.type_parameters[1].name, "V");
        assert_eq!(
            render(&sig.type_parameters[1].bounds[0]),
            "java.lang.Comparable<V>"
        );
        assert_eq!(render(&sig.super_class), "java.util.AbstractMap<K,V>");
        assert_eq!(render(&sig.interfaces[0]), "java.io.Serializable");
    }

    #[test]
    fn method_signature_with_wildcards_and_throws() {
        let sig = parse_method_signature(
            "<T:Ljava/lang/Number;>(Ljava/util/List<+TT;>;[I)Ljava/util/Map<*-TT;>;^Ljava/io/IOException;",
        )
        .unwrap();
        assert_eq!(sig.type_parameters[0].name, "T");
        assert_eq!(render(&sig.parameters[0]), "java.util.List<? extends T>");
        assert_eq!(
            sig.parameters[1],
            TypeItem::array(TypeItem::primitive(PrimitiveKind::Int))
        );
        assert_eq!(render(&sig.return_type), "java.util.Map<?,? super T>");
        assert_eq!(render(&sig.throws[0]), "java.io.IOException");
    }

    #[test]
    fn inner_class_of_generic_outer_keeps_the_outer_type() {
        let ty = parse_field_signature("Ltest/Outer<Ljava/lang/String;>.Inner;").unwrap();
        let class = ty.as_class().unwrap();
        assert_eq!(class.qualified_name, "test.Outer.Inner");
        assert_eq!(class.outer.as_ref().unwrap().qualified_name, "test.Outer");

        let plain = parse_field_signature("Ljava/util/Map$Entry<TK;TV;>;").unwrap();
        assert_eq!(plain.as_class().unwrap().qualified_name, "java.util.Map.Entry");
        assert!(plain.as_class().unwrap().outer.is_none());
    }

    #[test]
    fn malformed_signatures_are_errors() {
        assert!(parse_field_signature("Ljava/util/List<>;").is_err());
        assert!(parse_method_signature("(I").is_err());
        assert!(parse_class_signature("<>Ljava/lang/Object;").is_err());
    }
}
