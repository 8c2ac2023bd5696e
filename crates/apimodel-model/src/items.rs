use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use apimodel_core::PackageName;
use apimodel_types::{NestedScope, TypeItem, TypeParameter};

use crate::codebase::{
    CallableData, CallableId, CallableKind, ClassData, ClassId, ClassKind, ClassSlot, Codebase,
    FieldData, FieldId, PackageData, PackageId, ParameterData, ParameterId,
};
use crate::modifiers::{ModifierList, Modifiers, EMPTY_MODIFIERS};

/// Items with a modifier list.
pub trait ModifiedItem {
    fn modifiers(&self) -> &Modifiers;
}

/// Items that may carry documentation text.
pub trait DocumentedItem {
    fn documentation(&self) -> Option<&str>;
}

/// Items that can be selected for emission. `emit == false` items only exist to make
/// references resolvable and must never be written out.
pub trait SelectableItem {
    fn emit(&self) -> bool;
}

/// Items declared inside a class.
pub trait MemberItem<'a> {
    fn containing_class(&self) -> ClassItem<'a>;

    fn containing_package(&self) -> PackageItem<'a> {
        self.containing_class().package()
    }
}

/// Stable map key for a class: its qualified name. Unaffected by rebinding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassKey(String);

impl ClassKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy)]
pub struct PackageItem<'a> {
    codebase: &'a Codebase,
    id: PackageId,
    data: &'a PackageData,
}

impl<'a> PackageItem<'a> {
    pub(crate) fn new(codebase: &'a Codebase, id: PackageId, data: &'a PackageData) -> Self {
        Self { codebase, id, data }
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    pub fn codebase(&self) -> &'a Codebase {
        self.codebase
    }

    pub fn name(&self) -> &'a str {
        self.data.name.as_str()
    }

    pub fn package_name(&self) -> &'a PackageName {
        &self.data.name
    }

    pub fn is_root(&self) -> bool {
        self.data.name.is_root()
    }

    /// The parent package, if this codebase contains it. The parent's name is always
    /// available through [`PackageName::parent`].
    pub fn containing_package(&self) -> Option<PackageItem<'a>> {
        let parent = self.data.name.parent()?;
        self.codebase.find_package(parent.as_str())
    }

    /// Top-level classes, in definition order.
    pub fn classes(&self) -> Vec<ClassItem<'a>> {
        self.data
            .classes
            .iter()
            .filter_map(|id| self.codebase.class(*id))
            .collect()
    }

    /// Top-level and nested classes, depth first.
    pub fn all_classes(&self) -> Vec<ClassItem<'a>> {
        fn visit<'a>(class: ClassItem<'a>, out: &mut Vec<ClassItem<'a>>) {
            out.push(class);
            for inner in class.inner_classes() {
                visit(inner, out);
            }
        }
        let mut out = Vec::new();
        for class in self.classes() {
            visit(class, &mut out);
        }
        out
    }
}

impl SelectableItem for PackageItem<'_> {
    fn emit(&self) -> bool {
        self.all_classes().iter().any(|c| c.emit())
    }
}

impl PartialEq for PackageItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.data.name == other.data.name
    }
}

impl Eq for PackageItem<'_> {}

impl Hash for PackageItem<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.name.hash(state);
    }
}

impl fmt::Debug for PackageItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageItem({})", self.name())
    }
}

/// A view of a class proxy. Reads go through the slot's current backing; a stub answers every
/// structural query with "nothing".
#[derive(Clone, Copy)]
pub struct ClassItem<'a> {
    codebase: &'a Codebase,
    id: ClassId,
    slot: &'a ClassSlot,
}

impl<'a> ClassItem<'a> {
    pub(crate) fn new(codebase: &'a Codebase, id: ClassId, slot: &'a ClassSlot) -> Self {
        Self { codebase, id, slot }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn codebase(&self) -> &'a Codebase {
        self.codebase
    }

    pub fn key(&self) -> ClassKey {
        ClassKey(self.slot.qualified_name.clone())
    }

    pub fn qualified_name(&self) -> &'a str {
        &self.slot.qualified_name
    }

    /// Name within the package, with enclosing classes: `Map.Entry`.
    pub fn full_name(&self) -> &'a str {
        &self.slot.class_path
    }

    pub fn simple_name(&self) -> &'a str {
        self.slot
            .class_path
            .rsplit('.')
            .next()
            .unwrap_or(&self.slot.class_path)
    }

    pub fn data(&self) -> Option<&'a ClassData> {
        self.slot.data()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.data().is_some()
    }

    pub fn kind(&self) -> ClassKind {
        self.data().map(|d| d.kind).unwrap_or_default()
    }

    pub fn is_interface(&self) -> bool {
        self.kind().is_interface()
    }

    pub fn package(&self) -> PackageItem<'a> {
        let data = &self.codebase.packages_data()[self.slot.package.index()];
        PackageItem::new(self.codebase, self.slot.package, data)
    }

    pub fn containing_class(&self) -> Option<ClassItem<'a>> {
        self.codebase.class(self.slot.containing_class?)
    }

    pub fn is_inner_class(&self) -> bool {
        self.slot.containing_class.is_some()
    }

    pub fn inner_classes(&self) -> Vec<ClassItem<'a>> {
        self.slot
            .inner_classes
            .iter()
            .filter_map(|id| self.codebase.class(*id))
            .collect()
    }

    pub fn type_parameter_list(&self) -> &'a [TypeParameter] {
        self.data()
            .map(|d| d.type_parameters.as_slice())
            .unwrap_or(&[])
    }

    /// Type parameters visible inside this class: its own, then those of enclosing classes
    /// (for non-static inner classes).
    pub fn type_parameter_scope(&self) -> NestedScope<'a> {
        let mut scope = NestedScope::new().push_outer(self.type_parameter_list());
        let mut current = *self;
        while !current.modifiers().is_static() {
            let Some(outer) = current.containing_class() else {
                break;
            };
            scope = scope.push_outer(outer.type_parameter_list());
            current = outer;
        }
        scope
    }

    pub fn super_class_type(&self) -> Option<&'a TypeItem> {
        self.data()?.super_class_type.as_ref()
    }

    /// The superclass slot. May be an unresolved stub; `None` for interfaces, stubs and
    /// `java.lang.Object`.
    pub fn super_class(&self) -> Option<ClassItem<'a>> {
        let ty = self.super_class_type()?;
        self.codebase.find_class(&ty.as_class()?.qualified_name)
    }

    pub fn interface_types(&self) -> &'a [TypeItem] {
        self.data()
            .map(|d| d.interface_types.as_slice())
            .unwrap_or(&[])
    }

    pub fn interfaces(&self) -> Vec<ClassItem<'a>> {
        self.interface_types()
            .iter()
            .filter_map(|ty| self.codebase.find_class(&ty.as_class()?.qualified_name))
            .collect()
    }

    /// Direct supertypes: superclass first, then interfaces in declaration order.
    pub fn super_types(&self) -> impl Iterator<Item = &'a TypeItem> {
        self.super_class_type()
            .into_iter()
            .chain(self.interface_types().iter())
    }

    /// Superclass chain, nearest first. Stops at the first unresolved class.
    pub fn all_superclasses(&self) -> Vec<ClassItem<'a>> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([self.id]);
        let mut current = self.super_class();
        while let Some(class) = current {
            if !seen.insert(class.id) {
                break;
            }
            out.push(class);
            current = class.super_class();
        }
        out
    }

    /// Every interface implemented directly or inherited, without duplicates. Interfaces of
    /// this class come first (each followed by its own superinterfaces), then those of each
    /// superclass in turn.
    pub fn all_interfaces(&self) -> Vec<ClassItem<'a>> {
        fn visit<'a>(iface: ClassItem<'a>, seen: &mut HashSet<ClassId>, out: &mut Vec<ClassItem<'a>>) {
            if !seen.insert(iface.id) {
                return;
            }
            out.push(iface);
            for parent in iface.interfaces() {
                visit(parent, seen, out);
            }
        }
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut chain = vec![*self];
        chain.extend(self.all_superclasses());
        for class in chain {
            for iface in class.interfaces() {
                visit(iface, &mut seen, &mut out);
            }
        }
        out
    }

    pub(crate) fn callable(&self, kind: CallableKind, index: usize) -> Option<CallableItem<'a>> {
        let data = self.data()?;
        let list = match kind {
            CallableKind::Method => &data.methods,
            CallableKind::Constructor => &data.constructors,
        };
        let callable = list.get(index)?;
        Some(CallableItem {
            class: *self,
            id: CallableId {
                class: self.id,
                kind,
                index: index as u32,
            },
            data: callable,
        })
    }

    fn callables(&self, kind: CallableKind) -> Vec<CallableItem<'a>> {
        let len = self.data().map_or(0, |d| match kind {
            CallableKind::Method => d.methods.len(),
            CallableKind::Constructor => d.constructors.len(),
        });
        (0..len).filter_map(|idx| self.callable(kind, idx)).collect()
    }

    pub fn methods(&self) -> Vec<CallableItem<'a>> {
        self.callables(CallableKind::Method)
    }

    pub fn constructors(&self) -> Vec<CallableItem<'a>> {
        self.callables(CallableKind::Constructor)
    }

    pub fn fields(&self) -> Vec<FieldItem<'a>> {
        let Some(data) = self.data() else {
            return Vec::new();
        };
        data.fields
            .iter()
            .enumerate()
            .map(|(idx, field)| FieldItem {
                class: *self,
                id: FieldId {
                    class: self.id,
                    index: idx as u32,
                },
                data: field,
            })
            .collect()
    }

    /// Declared method with this name and erased parameter types.
    pub fn find_method(&self, name: &str, erased_parameters: &[String]) -> Option<CallableItem<'a>> {
        self.methods()
            .into_iter()
            .find(|m| m.matches_signature(name, erased_parameters))
    }

    pub fn find_constructor(&self, erased_parameters: &[String]) -> Option<CallableItem<'a>> {
        self.constructors()
            .into_iter()
            .find(|c| c.erased_parameter_types() == erased_parameters)
    }

    pub fn find_field(&self, name: &str) -> Option<FieldItem<'a>> {
        self.fields().into_iter().find(|f| f.name() == name)
    }
}

impl ModifiedItem for ClassItem<'_> {
    fn modifiers(&self) -> &Modifiers {
        self.data().map_or(&EMPTY_MODIFIERS, |d| &d.modifiers)
    }
}

impl DocumentedItem for ClassItem<'_> {
    fn documentation(&self) -> Option<&str> {
        self.data()?.docs.as_deref()
    }
}

impl SelectableItem for ClassItem<'_> {
    fn emit(&self) -> bool {
        self.data().is_some_and(|d| d.emit)
    }
}

impl PartialEq for ClassItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.slot.qualified_name == other.slot.qualified_name
    }
}

impl Eq for ClassItem<'_> {}

impl Hash for ClassItem<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.qualified_name.hash(state);
    }
}

impl fmt::Debug for ClassItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassItem({})", self.qualified_name())
    }
}

/// A method or constructor view.
#[derive(Clone, Copy)]
pub struct CallableItem<'a> {
    class: ClassItem<'a>,
    id: CallableId,
    data: &'a CallableData,
}

impl<'a> CallableItem<'a> {
    pub fn id(&self) -> CallableId {
        self.id
    }

    pub fn data(&self) -> &'a CallableData {
        self.data
    }

    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    pub fn is_constructor(&self) -> bool {
        self.id.kind == CallableKind::Constructor
    }

    pub fn return_type(&self) -> &'a TypeItem {
        &self.data.return_type
    }

    pub fn type_parameter_list(&self) -> &'a [TypeParameter] {
        &self.data.type_parameters
    }

    pub fn throws_types(&self) -> &'a [TypeItem] {
        &self.data.throws
    }

    pub fn parameters(&self) -> Vec<ParameterItem<'a>> {
        self.data
            .parameters
            .iter()
            .enumerate()
            .map(|(idx, data)| ParameterItem {
                callable: *self,
                id: ParameterId {
                    callable: self.id,
                    index: idx as u32,
                },
                data,
            })
            .collect()
    }

    /// Method type parameters shadowing the class's.
    pub fn type_parameter_scope(&self) -> NestedScope<'a> {
        NestedScope::new()
            .push_outer(self.type_parameter_list())
            .push_scope(self.class.type_parameter_scope())
    }

    pub fn erased_parameter_types(&self) -> Vec<String> {
        let scope = self.type_parameter_scope();
        self.data
            .parameters
            .iter()
            .map(|p| p.ty.erased_type_string(&scope))
            .collect()
    }

    /// `name(erased,parameter,types)`: the overload key.
    pub fn erased_signature(&self) -> String {
        format!("{}({})", self.name(), self.erased_parameter_types().join(","))
    }

    pub fn matches_signature(&self, name: &str, erased_parameters: &[String]) -> bool {
        self.name() == name && self.erased_parameter_types() == erased_parameters
    }

    /// For constructors: the superclass constructor chained to, when the provider recorded
    /// the arity of the `super(...)` call. The first declared constructor of that arity wins.
    pub fn super_constructor(&self) -> Option<CallableItem<'a>> {
        if !self.is_constructor() {
            return None;
        }
        let arity = self.data.super_call_arity?;
        self.class
            .super_class()?
            .constructors()
            .into_iter()
            .find(|c| c.data.parameters.len() == arity)
    }
}

impl<'a> MemberItem<'a> for CallableItem<'a> {
    fn containing_class(&self) -> ClassItem<'a> {
        self.class
    }
}

impl ModifiedItem for CallableItem<'_> {
    fn modifiers(&self) -> &Modifiers {
        &self.data.modifiers
    }
}

impl DocumentedItem for CallableItem<'_> {
    fn documentation(&self) -> Option<&str> {
        self.data.docs.as_deref()
    }
}

impl SelectableItem for CallableItem<'_> {
    fn emit(&self) -> bool {
        self.class.emit()
    }
}

impl PartialEq for CallableItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.id.kind == other.id.kind
            && self.erased_signature() == other.erased_signature()
    }
}

impl Eq for CallableItem<'_> {}

impl Hash for CallableItem<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        self.id.kind.hash(state);
        self.erased_signature().hash(state);
    }
}

impl fmt::Debug for CallableItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CallableItem({}.{})",
            self.class.qualified_name(),
            self.erased_signature()
        )
    }
}

#[derive(Clone, Copy)]
pub struct FieldItem<'a> {
    class: ClassItem<'a>,
    id: FieldId,
    data: &'a FieldData,
}

impl<'a> FieldItem<'a> {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn data(&self) -> &'a FieldData {
        self.data
    }

    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    pub fn ty(&self) -> &'a TypeItem {
        &self.data.ty
    }

    pub fn initial_value(&self) -> Option<&'a str> {
        self.data.value.as_deref()
    }

    pub fn is_enum_constant(&self) -> bool {
        self.data.enum_constant
    }
}

impl<'a> MemberItem<'a> for FieldItem<'a> {
    fn containing_class(&self) -> ClassItem<'a> {
        self.class
    }
}

impl ModifiedItem for FieldItem<'_> {
    fn modifiers(&self) -> &Modifiers {
        &self.data.modifiers
    }
}

impl DocumentedItem for FieldItem<'_> {
    fn documentation(&self) -> Option<&str> {
        self.data.docs.as_deref()
    }
}

impl SelectableItem for FieldItem<'_> {
    fn emit(&self) -> bool {
        self.class.emit()
    }
}

impl PartialEq for FieldItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.data.name == other.data.name
    }
}

impl Eq for FieldItem<'_> {}

impl fmt::Debug for FieldItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldItem({}.{})", self.class.qualified_name(), self.name())
    }
}

#[derive(Clone, Copy)]
pub struct ParameterItem<'a> {
    callable: CallableItem<'a>,
    id: ParameterId,
    data: &'a ParameterData,
}

impl<'a> ParameterItem<'a> {
    pub fn id(&self) -> ParameterId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.id.index as usize
    }

    pub fn name(&self) -> Option<&'a str> {
        self.data.name.as_deref()
    }

    pub fn ty(&self) -> &'a TypeItem {
        &self.data.ty
    }

    pub fn containing_callable(&self) -> CallableItem<'a> {
        self.callable
    }
}

impl<'a> MemberItem<'a> for ParameterItem<'a> {
    fn containing_class(&self) -> ClassItem<'a> {
        self.callable.class
    }
}

impl ModifiedItem for ParameterItem<'_> {
    fn modifiers(&self) -> &Modifiers {
        &self.data.modifiers
    }
}

impl SelectableItem for ParameterItem<'_> {
    fn emit(&self) -> bool {
        self.callable.emit()
    }
}

impl PartialEq for ParameterItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.callable == other.callable && self.id.index == other.id.index
    }
}

impl Eq for ParameterItem<'_> {}

impl fmt::Debug for ParameterItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParameterItem(#{} of {:?})",
            self.id.index, self.callable
        )
    }
}

/// Any item of the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Item<'a> {
    Package(PackageItem<'a>),
    Class(ClassItem<'a>),
    Callable(CallableItem<'a>),
    Field(FieldItem<'a>),
    Parameter(ParameterItem<'a>),
}

impl<'a> Item<'a> {
    pub fn codebase(&self) -> &'a Codebase {
        match self {
            Item::Package(p) => p.codebase(),
            Item::Class(c) => c.codebase(),
            Item::Callable(c) => c.class.codebase(),
            Item::Field(f) => f.class.codebase(),
            Item::Parameter(p) => p.callable.class.codebase(),
        }
    }

    pub fn emit(&self) -> bool {
        match self {
            Item::Package(p) => p.emit(),
            Item::Class(c) => c.emit(),
            Item::Callable(c) => c.emit(),
            Item::Field(f) => f.emit(),
            Item::Parameter(p) => p.emit(),
        }
    }

    /// Packages have no modifier list.
    pub fn modifiers(&self) -> Option<&'a Modifiers> {
        match *self {
            Item::Package(_) => None,
            Item::Class(c) => Some(c.data().map_or(&EMPTY_MODIFIERS, |d| &d.modifiers)),
            Item::Callable(c) => Some(&c.data.modifiers),
            Item::Field(f) => Some(&f.data.modifiers),
            Item::Parameter(p) => Some(&p.data.modifiers),
        }
    }

    /// Human readable identification, e.g. `method test.pkg.Foo.foo(int)`.
    pub fn qualified_description(&self) -> String {
        match self {
            Item::Package(p) => format!("package {}", p.name()),
            Item::Class(c) => format!("class {}", c.qualified_name()),
            Item::Callable(c) => format!(
                "{} {}.{}",
                if c.is_constructor() { "constructor" } else { "method" },
                c.class.qualified_name(),
                c.erased_signature()
            ),
            Item::Field(f) => format!("field {}.{}", f.class.qualified_name(), f.name()),
            Item::Parameter(p) => format!(
                "parameter {} in {}.{}",
                p.name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", p.index())),
                p.callable.class.qualified_name(),
                p.callable.erased_signature()
            ),
        }
    }
}

impl<'a> From<PackageItem<'a>> for Item<'a> {
    fn from(value: PackageItem<'a>) -> Self {
        Item::Package(value)
    }
}

impl<'a> From<ClassItem<'a>> for Item<'a> {
    fn from(value: ClassItem<'a>) -> Self {
        Item::Class(value)
    }
}

impl<'a> From<CallableItem<'a>> for Item<'a> {
    fn from(value: CallableItem<'a>) -> Self {
        Item::Callable(value)
    }
}

impl<'a> From<FieldItem<'a>> for Item<'a> {
    fn from(value: FieldItem<'a>) -> Self {
        Item::Field(value)
    }
}

impl<'a> From<ParameterItem<'a>> for Item<'a> {
    fn from(value: ParameterItem<'a>) -> Self {
        Item::Parameter(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebase::ClassData;
    use crate::provider::ProviderId;
    use apimodel_core::QualifiedName;
    use pretty_assertions::assert_eq;

    fn define(codebase: &mut Codebase, name: &str, data: ClassData) -> ClassId {
        let name = apimodel_core::split_qualified_name(name);
        codebase.define_class(&name, data).unwrap()
    }

    fn iface(extends: &[&str]) -> ClassData {
        let mut data = ClassData::new(ClassKind::Interface);
        data.interface_types = extends
            .iter()
            .map(|name| TypeItem::class(*name, vec![]))
            .collect();
        data
    }

    #[test]
    fn stub_answers_empty() {
        let mut codebase = Codebase::new("test", ProviderId::SIGNATURE);
        let id = codebase.intern_class("test.pkg.Missing");
        let class = codebase.class(id).unwrap();
        assert!(!class.is_resolved());
        assert!(!class.emit());
        assert!(class.methods().is_empty());
        assert!(class.fields().is_empty());
        assert!(class.interface_types().is_empty());
        assert!(class.super_class().is_none());
        assert!(class.documentation().is_none());
        assert_eq!(class.modifiers().visibility(), crate::Visibility::PackagePrivate);
    }

    #[test]
    fn names_of_nested_classes() {
        let mut codebase = Codebase::new("test", ProviderId::SIGNATURE);
        let name = QualifiedName::new(PackageName::new("java.util"), "Map.Entry");
        let id = codebase
            .define_class(&name, ClassData::new(ClassKind::Interface))
            .unwrap();
        let entry = codebase.class(id).unwrap();
        assert_eq!(entry.qualified_name(), "java.util.Map.Entry");
        assert_eq!(entry.full_name(), "Map.Entry");
        assert_eq!(entry.simple_name(), "Entry");
        assert!(entry.is_inner_class());
        assert_eq!(entry.containing_class().unwrap().simple_name(), "Map");
        assert_eq!(entry.package().name(), "java.util");
        assert_eq!(
            Item::from(entry).qualified_description(),
            "class java.util.Map.Entry"
        );
    }

    #[test]
    fn all_interfaces_follow_declaration_order() {
        let mut codebase = Codebase::new("test", ProviderId::SIGNATURE);
        define(&mut codebase, "test.I1", iface(&[]));
        define(&mut codebase, "test.I2", iface(&["test.I1"]));
        define(&mut codebase, "test.I3", iface(&[]));
        let mut base = ClassData::new(ClassKind::Class);
        base.interface_types = vec![TypeItem::class("test.I3", vec![])];
        define(&mut codebase, "test.Base", base);
        let mut class = ClassData::new(ClassKind::Class);
        class.super_class_type = Some(TypeItem::class("test.Base", vec![]));
        class.interface_types = vec![
            TypeItem::class("test.I2", vec![]),
            TypeItem::class("test.I1", vec![]),
        ];
        define(&mut codebase, "test.C", class);

        let c = codebase.find_class("test.C").unwrap();
        let names: Vec<&str> = c.all_interfaces().iter().map(|i| i.qualified_name()).collect();
        assert_eq!(names, vec!["test.I2", "test.I1", "test.I3"]);
        let supers: Vec<&str> = c
            .all_superclasses()
            .iter()
            .map(|s| s.qualified_name())
            .collect();
        assert_eq!(supers, vec!["test.Base", "java.lang.Object"]);
    }

    #[test]
    fn erased_signature_uses_method_then_class_bounds() {
        let mut codebase = Codebase::new("test", ProviderId::SIGNATURE);
        let mut data = ClassData::new(ClassKind::Class);
        data.type_parameters = vec![TypeParameter::new(
            "T",
            vec![TypeItem::class("java.lang.Number", vec![])],
        )];
        let mut method = CallableData::method("put", TypeItem::void())
            .with_parameter(Some("key"), TypeItem::variable("K"))
            .with_parameter(Some("value"), TypeItem::variable("T"));
        method.type_parameters = vec![TypeParameter::unbounded("K")];
        data.methods.push(method);
        define(&mut codebase, "test.Box", data);

        let put = codebase.find_class("test.Box").unwrap().methods()[0];
        assert_eq!(put.erased_signature(), "put(java.lang.Object,java.lang.Number)");
        assert!(put.matches_signature(
            "put",
            &["java.lang.Object".to_string(), "java.lang.Number".to_string()]
        ));
    }

    #[test]
    fn super_constructor_follows_recorded_arity() {
        let mut codebase = Codebase::new("test", ProviderId::SOURCE);
        let mut base = ClassData::new(ClassKind::Class);
        base.constructors.push(CallableData::constructor("Base"));
        base.constructors.push(
            CallableData::constructor("Base")
                .with_parameter(Some("x"), TypeItem::primitive(apimodel_types::PrimitiveKind::Int)),
        );
        define(&mut codebase, "test.Base", base);
        let mut sub = ClassData::new(ClassKind::Class);
        sub.super_class_type = Some(TypeItem::class("test.Base", vec![]));
        let mut ctor = CallableData::constructor("Sub");
        ctor.super_call_arity = Some(1);
        sub.constructors.push(ctor);
        define(&mut codebase, "test.Sub", sub);

        let ctor = codebase.find_class("test.Sub").unwrap().constructors()[0];
        let target = ctor.super_constructor().unwrap();
        assert_eq!(target.containing_class().qualified_name(), "test.Base");
        assert_eq!(target.erased_signature(), "Base(int)");
    }
}
