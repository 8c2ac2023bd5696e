//! The provider-neutral API item graph.
//!
//! A [`Codebase`] owns packages and class proxy slots in arenas; the item types are cheap
//! `Copy` views borrowing it. A class slot referenced before it is declared starts out as an
//! empty stub and is bound at most once, keeping its identity (the qualified name) throughout.

#![forbid(unsafe_code)]

mod codebase;
mod correspondence;
mod items;
mod modifiers;
mod overrides;
mod provider;

pub use codebase::{
    CallableData, CallableId, CallableKind, ClassBacking, ClassData, ClassId, ClassKind,
    ClassSlot, Codebase, FieldData, FieldId, ModelError, PackageId, ParameterData, ParameterId,
};
pub use correspondence::{
    find_corresponding_item_in, CorrespondenceOptions, Corresponding, DuplicatedCallable,
};
pub use items::{
    CallableItem, ClassItem, ClassKey, DocumentedItem, FieldItem, Item, MemberItem,
    ModifiedItem, PackageItem, ParameterItem, SelectableItem,
};
pub use modifiers::{
    FrozenModifierList, ModifierFlags, ModifierList, Modifiers, MutableModifierList, Visibility,
};
pub use overrides::{all_super_methods, find_method_in_hierarchy, super_methods};
pub use provider::{CodebaseProvider, InputFormat, ProviderId, ProviderInput, ProviderRegistry};
