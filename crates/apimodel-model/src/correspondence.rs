//! Finding "the same" declaration in another, independently built codebase.

use crate::codebase::{CallableData, CallableKind, Codebase};
use crate::items::{CallableItem, ClassItem, FieldItem, Item, MemberItem, PackageItem, ParameterItem};
use crate::overrides::find_method_in_hierarchy;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorrespondenceOptions {
    /// When the corresponding class has no exact match, search its supertypes in the other
    /// codebase.
    pub super_methods: bool,
    /// When a match is found in a different class, synthesize a copy declared in the
    /// corresponding class instead.
    pub duplicate: bool,
}

impl CorrespondenceOptions {
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn with_super_methods() -> Self {
        Self {
            super_methods: true,
            duplicate: false,
        }
    }

    pub fn with_duplicates() -> Self {
        Self {
            super_methods: true,
            duplicate: true,
        }
    }
}

/// An inherited callable copied "as if declared" in a subclass. Owned, since the other
/// codebase does not contain it; [`Codebase::adopt`] materialises it there.
#[derive(Clone, Debug, PartialEq)]
pub struct DuplicatedCallable {
    /// Qualified name of the class the copy is declared in.
    pub target_class: String,
    /// Qualified name of the class the copied declaration came from.
    pub source_class: String,
    pub kind: CallableKind,
    pub erased_parameters: Vec<String>,
    pub callable: CallableData,
}

impl DuplicatedCallable {
    pub fn erased_signature(&self) -> String {
        format!("{}({})", self.callable.name, self.erased_parameters.join(","))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Corresponding<'o> {
    Found(Item<'o>),
    Duplicated(DuplicatedCallable),
}

impl<'o> Corresponding<'o> {
    pub fn item(&self) -> Option<Item<'o>> {
        match self {
            Corresponding::Found(item) => Some(*item),
            Corresponding::Duplicated(_) => None,
        }
    }

    /// Qualified name of the class containing the match, for members.
    pub fn containing_class_name(&self) -> Option<&str> {
        match self {
            Corresponding::Found(Item::Callable(c)) => Some(c.containing_class().qualified_name()),
            Corresponding::Found(Item::Field(f)) => Some(f.containing_class().qualified_name()),
            Corresponding::Found(Item::Parameter(p)) => Some(p.containing_class().qualified_name()),
            Corresponding::Found(_) => None,
            Corresponding::Duplicated(dup) => Some(&dup.target_class),
        }
    }
}

/// Locates the item of `other` that represents the same declaration as `item`.
///
/// Packages and classes match by qualified name, fields by name in the corresponding class,
/// callables by name and erased signature in the corresponding class, and parameters by name
/// (or position, when either side is unnamed) in the corresponding callable.
pub fn find_corresponding_item_in<'o>(
    item: Item<'_>,
    other: &'o Codebase,
    options: CorrespondenceOptions,
) -> Option<Corresponding<'o>> {
    match item {
        Item::Package(package) => corresponding_package(package, other)
            .map(|p| Corresponding::Found(Item::Package(p))),
        Item::Class(class) => {
            corresponding_class(class, other).map(|c| Corresponding::Found(Item::Class(c)))
        }
        Item::Field(field) => {
            corresponding_field(field, other).map(|f| Corresponding::Found(Item::Field(f)))
        }
        Item::Callable(callable) => corresponding_callable(callable, other, options),
        Item::Parameter(parameter) => corresponding_parameter(parameter, other, options)
            .map(|p| Corresponding::Found(Item::Parameter(p))),
    }
}

fn corresponding_package<'o>(package: PackageItem<'_>, other: &'o Codebase) -> Option<PackageItem<'o>> {
    other.find_package(package.name())
}

fn corresponding_class<'o>(class: ClassItem<'_>, other: &'o Codebase) -> Option<ClassItem<'o>> {
    other.find_class(class.qualified_name())
}

fn corresponding_field<'o>(field: FieldItem<'_>, other: &'o Codebase) -> Option<FieldItem<'o>> {
    corresponding_class(field.containing_class(), other)?.find_field(field.name())
}

fn same_callable_in<'o>(callable: CallableItem<'_>, class: ClassItem<'o>) -> Option<CallableItem<'o>> {
    let erased = callable.erased_parameter_types();
    if callable.is_constructor() {
        class.find_constructor(&erased)
    } else {
        class.find_method(callable.name(), &erased)
    }
}

fn corresponding_callable<'o>(
    callable: CallableItem<'_>,
    other: &'o Codebase,
    options: CorrespondenceOptions,
) -> Option<Corresponding<'o>> {
    let class = callable.containing_class();
    let other_class = corresponding_class(class, other)?;
    if let Some(found) = same_callable_in(callable, other_class) {
        return Some(Corresponding::Found(Item::Callable(found)));
    }
    if !options.super_methods || callable.is_constructor() {
        return None;
    }

    // The hierarchy searched is the other codebase's, which may differ from this one's.
    let found = find_method_in_hierarchy(
        other_class,
        callable.name(),
        &callable.erased_parameter_types(),
    )?;

    let found_in = found.containing_class().qualified_name();
    if options.duplicate && found_in != other_class.qualified_name() {
        tracing::debug!(
            target: "apimodel.correspondence",
            from = %found_in,
            to = %other_class.qualified_name(),
            method = %found.erased_signature(),
            "synthesizing inherited declaration"
        );
        return Some(Corresponding::Duplicated(DuplicatedCallable {
            target_class: other_class.qualified_name().to_string(),
            source_class: found_in.to_string(),
            kind: if found.is_constructor() {
                CallableKind::Constructor
            } else {
                CallableKind::Method
            },
            erased_parameters: found.erased_parameter_types(),
            callable: found.data().clone(),
        }));
    }
    Some(Corresponding::Found(Item::Callable(found)))
}

fn corresponding_parameter<'o>(
    parameter: ParameterItem<'_>,
    other: &'o Codebase,
    options: CorrespondenceOptions,
) -> Option<ParameterItem<'o>> {
    let options = CorrespondenceOptions {
        duplicate: false,
        ..options
    };
    let callable = match corresponding_callable(parameter.containing_callable(), other, options)? {
        Corresponding::Found(Item::Callable(callable)) => callable,
        _ => return None,
    };
    let parameters = callable.parameters();
    if let Some(name) = parameter.name() {
        if let Some(found) = parameters.iter().find(|p| p.name() == Some(name)) {
            return Some(*found);
        }
    }
    parameters.get(parameter.index()).copied()
}
