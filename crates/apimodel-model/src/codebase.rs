use std::collections::HashMap;

use apimodel_core::{split_qualified_name, PackageName, QualifiedName, JAVA_LANG_OBJECT};
use apimodel_types::{TypeItem, TypeParameter};
use thiserror::Error;

use crate::correspondence::DuplicatedCallable;
use crate::items::{CallableItem, ClassItem, PackageItem, SelectableItem};
use crate::modifiers::{ModifierList, Modifiers};
use crate::provider::ProviderId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

impl PackageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena handle for a class slot. Stable for the lifetime of the codebase, across rebinding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallableKind {
    Constructor,
    Method,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableId {
    pub class: ClassId,
    pub kind: CallableKind,
    pub index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub class: ClassId,
    pub index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId {
    pub callable: CallableId,
    pub index: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    AnnotationType,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
            ClassKind::AnnotationType => "@interface",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<ClassKind> {
        match keyword {
            "class" => Some(ClassKind::Class),
            "interface" => Some(ClassKind::Interface),
            "enum" => Some(ClassKind::Enum),
            "@interface" => Some(ClassKind::AnnotationType),
            _ => None,
        }
    }

    pub fn is_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::AnnotationType)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterData {
    pub name: Option<String>,
    pub ty: TypeItem,
    pub modifiers: Modifiers,
}

impl ParameterData {
    pub fn new(name: Option<String>, ty: TypeItem) -> Self {
        Self {
            name,
            ty,
            modifiers: Modifiers::default(),
        }
    }
}

/// A method or constructor. Constructors have a `void` return type and the class's simple name.
#[derive(Clone, Debug, PartialEq)]
pub struct CallableData {
    pub name: String,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<TypeParameter>,
    pub return_type: TypeItem,
    pub parameters: Vec<ParameterData>,
    pub throws: Vec<TypeItem>,
    /// Argument count of the explicit or implicit `super(...)` call, for constructors whose
    /// provider knows it.
    pub super_call_arity: Option<usize>,
    pub docs: Option<String>,
}

impl CallableData {
    pub fn method(name: impl Into<String>, return_type: TypeItem) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::public(),
            type_parameters: Vec::new(),
            return_type,
            parameters: Vec::new(),
            throws: Vec::new(),
            super_call_arity: None,
            docs: None,
        }
    }

    pub fn constructor(class_simple_name: impl Into<String>) -> Self {
        Self::method(class_simple_name, TypeItem::void())
    }

    pub fn with_parameter(mut self, name: Option<&str>, ty: TypeItem) -> Self {
        self.parameters
            .push(ParameterData::new(name.map(str::to_string), ty));
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldData {
    pub name: String,
    pub ty: TypeItem,
    pub modifiers: Modifiers,
    /// Constant value as source text.
    pub value: Option<String>,
    pub enum_constant: bool,
    pub docs: Option<String>,
}

impl FieldData {
    pub fn new(name: impl Into<String>, ty: TypeItem) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::public(),
            value: None,
            enum_constant: false,
            docs: None,
        }
    }
}

/// Everything a provider knows about a class apart from where it lives.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassData {
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub type_parameters: Vec<TypeParameter>,
    pub super_class_type: Option<TypeItem>,
    pub interface_types: Vec<TypeItem>,
    pub constructors: Vec<CallableData>,
    pub methods: Vec<CallableData>,
    pub fields: Vec<FieldData>,
    /// Part of the API surface this codebase describes.
    pub emit: bool,
    pub docs: Option<String>,
}

impl ClassData {
    pub fn new(kind: ClassKind) -> Self {
        Self {
            kind,
            modifiers: Modifiers::public(),
            type_parameters: Vec::new(),
            super_class_type: None,
            interface_types: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            emit: true,
            docs: None,
        }
    }

    /// Fills in the implicit superclass: `java.lang.Object` for classes, `java.lang.Enum<E>`
    /// for enums. Interfaces and annotation types have none.
    fn apply_implicit_supertypes(&mut self, qualified_name: &str) {
        if self.super_class_type.is_some() {
            return;
        }
        self.super_class_type = match self.kind {
            ClassKind::Class if qualified_name != JAVA_LANG_OBJECT => Some(TypeItem::object()),
            ClassKind::Enum => Some(TypeItem::class(
                "java.lang.Enum",
                vec![TypeItem::class(qualified_name, Vec::new())],
            )),
            _ => None,
        };
    }

    /// Erased names of every class this declaration mentions, annotation types included.
    pub fn referenced_classes(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut types: Vec<&TypeItem> = Vec::new();
        let mut modifiers: Vec<&Modifiers> = vec![&self.modifiers];

        types.extend(self.super_class_type.iter().chain(&self.interface_types));
        types.extend(self.type_parameters.iter().flat_map(|tp| &tp.bounds));
        for callable in self.constructors.iter().chain(&self.methods) {
            modifiers.push(&callable.modifiers);
            modifiers.extend(callable.parameters.iter().map(|p| &p.modifiers));
            types.push(&callable.return_type);
            types.extend(callable.parameters.iter().map(|p| &p.ty));
            types.extend(&callable.throws);
            types.extend(callable.type_parameters.iter().flat_map(|tp| &tp.bounds));
        }
        for field in &self.fields {
            modifiers.push(&field.modifiers);
            types.push(&field.ty);
        }

        let annotation_names = modifiers
            .iter()
            .flat_map(|m| m.annotations())
            .map(|a| a.qualified_name.clone());
        let type_names = types.iter().flat_map(|ty| {
            ty.annotations()
                .iter()
                .map(|a| a.qualified_name.clone())
                .chain(ty.referenced_classes())
                .collect::<Vec<_>>()
        });
        for name in annotation_names.chain(type_names) {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

/// The swappable backing of a class proxy.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassBacking {
    Stub,
    Resolved(Box<ClassData>),
}

/// A class proxy: a stable identity (the qualified name) plus a backing that can be bound once.
#[derive(Clone, Debug)]
pub struct ClassSlot {
    pub(crate) qualified_name: String,
    pub(crate) class_path: String,
    pub(crate) package: PackageId,
    pub(crate) containing_class: Option<ClassId>,
    pub(crate) inner_classes: Vec<ClassId>,
    pub(crate) backing: ClassBacking,
}

impl ClassSlot {
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn backing(&self) -> &ClassBacking {
        &self.backing
    }

    pub fn data(&self) -> Option<&ClassData> {
        match &self.backing {
            ClassBacking::Resolved(data) => Some(data),
            ClassBacking::Stub => None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PackageData {
    pub(crate) name: PackageName,
    pub(crate) classes: Vec<ClassId>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("class `{0}` is already defined")]
    DuplicateClass(String),
    #[error("class `{0}` is not an unresolved stub")]
    NotAStub(String),
}

/// A package/class graph produced by one provider (or by merging two).
#[derive(Clone, Debug)]
pub struct Codebase {
    description: String,
    origin: ProviderId,
    packages: Vec<PackageData>,
    package_index: HashMap<PackageName, PackageId>,
    classes: Vec<ClassSlot>,
    class_index: HashMap<String, ClassId>,
}

impl Codebase {
    pub fn new(description: impl Into<String>, origin: ProviderId) -> Self {
        let mut codebase = Self {
            description: description.into(),
            origin,
            packages: Vec::new(),
            package_index: HashMap::new(),
            classes: Vec::new(),
            class_index: HashMap::new(),
        };
        codebase.ensure_package(&PackageName::root());
        codebase
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn origin(&self) -> ProviderId {
        self.origin
    }

    /// Renames a codebase derived from another one, e.g. a merge result.
    pub fn relabel(&mut self, description: impl Into<String>, origin: ProviderId) {
        self.description = description.into();
        self.origin = origin;
    }

    /// Number of packages, the root package included.
    pub fn size(&self) -> usize {
        self.packages.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn ensure_package(&mut self, name: &PackageName) -> PackageId {
        if let Some(id) = self.package_index.get(name) {
            return *id;
        }
        let id = PackageId(self.packages.len() as u32);
        self.packages.push(PackageData {
            name: name.clone(),
            classes: Vec::new(),
        });
        self.package_index.insert(name.clone(), id);
        id
    }

    pub fn find_package(&self, name: &str) -> Option<PackageItem<'_>> {
        let id = *self.package_index.get(&PackageName::new(name))?;
        self.package(id)
    }

    pub fn package(&self, id: PackageId) -> Option<PackageItem<'_>> {
        let data = self.packages.get(id.index())?;
        Some(PackageItem::new(self, id, data))
    }

    /// Packages in canonical name order.
    pub fn packages(&self) -> Vec<PackageItem<'_>> {
        let mut packages: Vec<PackageItem<'_>> = self
            .packages
            .iter()
            .enumerate()
            .map(|(idx, data)| PackageItem::new(self, PackageId(idx as u32), data))
            .collect();
        packages.sort_by(|a, b| a.package_name().cmp(b.package_name()));
        packages
    }

    /// Exact qualified-name lookup (nested classes use `.`).
    pub fn find_class(&self, qualified_name: &str) -> Option<ClassItem<'_>> {
        let id = *self.class_index.get(qualified_name)?;
        self.class(id)
    }

    pub fn find_class_id(&self, qualified_name: &str) -> Option<ClassId> {
        self.class_index.get(qualified_name).copied()
    }

    pub fn class(&self, id: ClassId) -> Option<ClassItem<'_>> {
        let slot = self.classes.get(id.index())?;
        Some(ClassItem::new(self, id, slot))
    }

    pub fn classes(&self) -> impl Iterator<Item = ClassItem<'_>> {
        self.classes
            .iter()
            .enumerate()
            .map(|(idx, slot)| ClassItem::new(self, ClassId(idx as u32), slot))
    }

    pub fn callable(&self, id: CallableId) -> Option<CallableItem<'_>> {
        self.class(id.class)?.callable(id.kind, id.index as usize)
    }

    pub fn is_resolved(&self, id: ClassId) -> bool {
        self.classes
            .get(id.index())
            .is_some_and(|slot| slot.data().is_some())
    }

    /// Classes still bound to an empty stub.
    pub fn stub_classes(&self) -> impl Iterator<Item = ClassItem<'_>> {
        self.classes().filter(|class| !class.is_resolved())
    }

    /// Classes declared by this codebase's own input.
    pub fn declared_classes(&self) -> impl Iterator<Item = ClassItem<'_>> {
        self.classes().filter(|class| class.emit())
    }

    /// Returns the class slot for `qualified_name`, creating an unbound stub if needed.
    ///
    /// The package boundary of a new stub is guessed from capitalisation; defining the class
    /// later moves it to its declared location.
    pub fn intern_class(&mut self, qualified_name: &str) -> ClassId {
        if let Some(id) = self.class_index.get(qualified_name) {
            return *id;
        }
        let name = split_qualified_name(qualified_name);
        self.create_slot(&name)
    }

    fn create_slot(&mut self, name: &QualifiedName) -> ClassId {
        let qualified_name = name.qualified();
        let containing_class = name.outer().map(|outer| {
            let outer_name = outer.qualified();
            match self.class_index.get(&outer_name) {
                Some(id) => *id,
                None => self.create_slot(&outer),
            }
        });
        let package = self.ensure_package(&name.package);
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassSlot {
            qualified_name: qualified_name.clone(),
            class_path: name.class_path.clone(),
            package,
            containing_class,
            inner_classes: Vec::new(),
            backing: ClassBacking::Stub,
        });
        self.class_index.insert(qualified_name, id);
        self.attach(id);
        tracing::trace!(target: "apimodel.model", class = %name.qualified(), "interned stub class");
        id
    }

    fn location(&self, id: ClassId) -> (Option<ClassId>, PackageId) {
        let slot = &self.classes[id.index()];
        (slot.containing_class, slot.package)
    }

    fn attach(&mut self, id: ClassId) {
        match self.location(id) {
            (Some(outer), _) => self.classes[outer.index()].inner_classes.push(id),
            (None, package) => self.packages[package.index()].classes.push(id),
        }
    }

    fn detach(&mut self, id: ClassId) {
        match self.location(id) {
            (Some(outer), _) => self.classes[outer.index()].inner_classes.retain(|c| *c != id),
            (None, package) => self.packages[package.index()].classes.retain(|c| *c != id),
        }
    }

    /// Binds the declaration of `name`. The first binding wins: a second definition of an
    /// already resolved class is rejected and leaves the codebase unchanged.
    ///
    /// Every class the declaration references is interned as a stub if not yet known.
    pub fn define_class(
        &mut self,
        name: &QualifiedName,
        mut data: ClassData,
    ) -> Result<ClassId, ModelError> {
        let qualified_name = name.qualified();
        let id = match self.class_index.get(&qualified_name).copied() {
            Some(id) if self.is_resolved(id) => {
                return Err(ModelError::DuplicateClass(qualified_name));
            }
            Some(id) => {
                self.relocate(id, name);
                id
            }
            None => self.create_slot(name),
        };
        data.apply_implicit_supertypes(&qualified_name);
        let references = data.referenced_classes();
        self.classes[id.index()].backing = ClassBacking::Resolved(Box::new(data));
        for reference in references {
            self.intern_class(&reference);
        }
        Ok(id)
    }

    /// Replaces the backing of an unbound stub. The slot keeps its identity and location.
    pub fn rebind_class(&mut self, id: ClassId, mut data: ClassData) -> Result<(), ModelError> {
        let slot = self
            .classes
            .get(id.index())
            .ok_or_else(|| ModelError::NotAStub(format!("#{}", id.index())))?;
        if slot.data().is_some() {
            return Err(ModelError::NotAStub(slot.qualified_name.clone()));
        }
        let qualified_name = slot.qualified_name.clone();
        data.apply_implicit_supertypes(&qualified_name);
        let references = data.referenced_classes();
        self.classes[id.index()].backing = ClassBacking::Resolved(Box::new(data));
        for reference in references {
            self.intern_class(&reference);
        }
        tracing::debug!(target: "apimodel.model", class = %qualified_name, "rebound stub class");
        Ok(())
    }

    /// Moves a stub whose package boundary was guessed to its declared location.
    fn relocate(&mut self, id: ClassId, name: &QualifiedName) {
        let slot = &self.classes[id.index()];
        let package = self.package_index.get(&name.package).copied();
        if Some(slot.package) == package && slot.class_path == name.class_path {
            return;
        }
        self.detach(id);
        let containing_class = name.outer().map(|outer| {
            let outer_name = outer.qualified();
            match self.class_index.get(&outer_name) {
                Some(id) => *id,
                None => self.create_slot(&outer),
            }
        });
        let package = self.ensure_package(&name.package);
        let slot = &mut self.classes[id.index()];
        slot.package = package;
        slot.class_path = name.class_path.clone();
        slot.containing_class = containing_class;
        self.attach(id);
    }

    pub(crate) fn class_data_mut(&mut self, id: ClassId) -> Option<&mut ClassData> {
        match &mut self.classes.get_mut(id.index())?.backing {
            ClassBacking::Resolved(data) => Some(data),
            ClassBacking::Stub => None,
        }
    }

    /// Materialises a synthesized override in this codebase's copy of its target class.
    ///
    /// Returns `None` when the target class is missing or unresolved here, or when a callable
    /// with the same erased signature already exists.
    pub fn adopt(&mut self, duplicate: &DuplicatedCallable) -> Option<CallableId> {
        let class = self.find_class(&duplicate.target_class)?;
        let class_id = class.id();
        let data = duplicate.callable.clone();
        let kind = duplicate.kind;
        let signature = duplicate.erased_parameters.clone();
        let exists = match kind {
            CallableKind::Method => class.find_method(&data.name, &signature).is_some(),
            CallableKind::Constructor => class.find_constructor(&signature).is_some(),
        };
        if exists {
            return None;
        }
        let target = self.class_data_mut(class_id)?;
        let list = match kind {
            CallableKind::Method => &mut target.methods,
            CallableKind::Constructor => &mut target.constructors,
        };
        list.push(data);
        Some(CallableId {
            class: class_id,
            kind,
            index: (list.len() - 1) as u32,
        })
    }

    pub(crate) fn packages_data(&self) -> &[PackageData] {
        &self.packages
    }
}
