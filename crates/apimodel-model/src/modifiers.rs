use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use apimodel_types::{AnnotationItem, Nullability};

/// Declaration flags. Visibility is encoded in the same bitset; package-private is the absence
/// of every visibility bit.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierFlags(u32);

impl ModifierFlags {
    pub const PUBLIC: ModifierFlags = ModifierFlags(1 << 0);
    pub const PROTECTED: ModifierFlags = ModifierFlags(1 << 1);
    pub const PRIVATE: ModifierFlags = ModifierFlags(1 << 2);
    pub const STATIC: ModifierFlags = ModifierFlags(1 << 3);
    pub const FINAL: ModifierFlags = ModifierFlags(1 << 4);
    pub const ABSTRACT: ModifierFlags = ModifierFlags(1 << 5);
    pub const DEFAULT: ModifierFlags = ModifierFlags(1 << 6);
    pub const SYNCHRONIZED: ModifierFlags = ModifierFlags(1 << 7);
    pub const NATIVE: ModifierFlags = ModifierFlags(1 << 8);
    pub const TRANSIENT: ModifierFlags = ModifierFlags(1 << 9);
    pub const VOLATILE: ModifierFlags = ModifierFlags(1 << 10);
    pub const SEALED: ModifierFlags = ModifierFlags(1 << 11);
    pub const DEPRECATED: ModifierFlags = ModifierFlags(1 << 12);
    pub const VARARGS: ModifierFlags = ModifierFlags(1 << 13);

    const VISIBILITY_MASK: u32 = Self::PUBLIC.0 | Self::PROTECTED.0 | Self::PRIVATE.0;

    /// Keyword order used when writing modifiers. `varargs` has no keyword.
    const KEYWORDS: [(ModifierFlags, &'static str); 11] = [
        (Self::DEPRECATED, "deprecated"),
        (Self::SEALED, "sealed"),
        (Self::ABSTRACT, "abstract"),
        (Self::DEFAULT, "default"),
        (Self::STATIC, "static"),
        (Self::FINAL, "final"),
        (Self::SYNCHRONIZED, "synchronized"),
        (Self::NATIVE, "native"),
        (Self::TRANSIENT, "transient"),
        (Self::VOLATILE, "volatile"),
        (Self::VARARGS, ""),
    ];

    pub const fn empty() -> Self {
        ModifierFlags(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: ModifierFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ModifierFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ModifierFlags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: ModifierFlags, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub fn visibility(self) -> Visibility {
        if self.contains(Self::PUBLIC) {
            Visibility::Public
        } else if self.contains(Self::PROTECTED) {
            Visibility::Protected
        } else if self.contains(Self::PRIVATE) {
            Visibility::Private
        } else {
            Visibility::PackagePrivate
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.0 &= !Self::VISIBILITY_MASK;
        self.0 |= visibility.flag().0;
        self
    }

    /// Parses a modifier keyword (`public`, `static`, ...). Returns `None` for anything else.
    pub fn from_keyword(keyword: &str) -> Option<ModifierFlags> {
        match keyword {
            "public" => Some(Self::PUBLIC),
            "protected" => Some(Self::PROTECTED),
            "private" => Some(Self::PRIVATE),
            _ => Self::KEYWORDS
                .iter()
                .find(|(_, kw)| !kw.is_empty() && *kw == keyword)
                .map(|(flag, _)| *flag),
        }
    }

    /// Non-visibility keywords set in this bitset, in writing order.
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        Self::KEYWORDS
            .into_iter()
            .filter(move |(flag, kw)| !kw.is_empty() && self.contains(*flag))
            .map(|(_, kw)| kw)
    }
}

impl BitOr for ModifierFlags {
    type Output = ModifierFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        ModifierFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ModifierFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        list.entry(&self.visibility());
        for kw in self.keywords() {
            list.entry(&kw);
        }
        if self.contains(Self::VARARGS) {
            list.entry(&"varargs");
        }
        list.finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Private,
    PackagePrivate,
    Protected,
    Public,
}

impl Visibility {
    pub fn flag(self) -> ModifierFlags {
        match self {
            Visibility::Private => ModifierFlags::PRIVATE,
            Visibility::PackagePrivate => ModifierFlags::empty(),
            Visibility::Protected => ModifierFlags::PROTECTED,
            Visibility::Public => ModifierFlags::PUBLIC,
        }
    }

    /// Source keyword; package-private has none.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Private => Some("private"),
            Visibility::PackagePrivate => None,
            Visibility::Protected => Some("protected"),
            Visibility::Public => Some("public"),
        }
    }

    /// Visible outside the declaring package (`public` or `protected`).
    pub fn is_api(self) -> bool {
        self >= Visibility::Protected
    }
}

/// Read access shared by both modifier list representations.
pub trait ModifierList {
    fn flags(&self) -> ModifierFlags;

    fn annotations(&self) -> &[AnnotationItem];

    fn visibility(&self) -> Visibility {
        self.flags().visibility()
    }

    fn has(&self, flag: ModifierFlags) -> bool {
        self.flags().contains(flag)
    }

    fn is_static(&self) -> bool {
        self.has(ModifierFlags::STATIC)
    }

    fn is_final(&self) -> bool {
        self.has(ModifierFlags::FINAL)
    }

    fn is_abstract(&self) -> bool {
        self.has(ModifierFlags::ABSTRACT)
    }

    fn is_private(&self) -> bool {
        self.visibility() == Visibility::Private
    }

    fn is_deprecated(&self) -> bool {
        self.has(ModifierFlags::DEPRECATED)
    }

    fn find_annotation(&self, qualified_name: &str) -> Option<&AnnotationItem> {
        self.annotations()
            .iter()
            .find(|a| a.qualified_name == qualified_name)
    }

    fn nullability(&self) -> Nullability {
        self.annotations()
            .iter()
            .find_map(AnnotationItem::nullability)
            .unwrap_or_default()
    }

    /// Same flags (visibility included) and the same annotations, in any order.
    fn equivalent_to(&self, other: &dyn ModifierList) -> bool {
        if self.flags() != other.flags() {
            return false;
        }
        let mine = self.annotations();
        let theirs = other.annotations();
        mine.len() == theirs.len()
            && mine.iter().all(|a| {
                let count = |list: &[AnnotationItem]| list.iter().filter(|b| *b == a).count();
                count(mine) == count(theirs)
            })
    }

    /// Annotations then keywords, as written in signature files: `@A public static final`.
    fn to_source(&self) -> String {
        let mut parts: Vec<String> = self.annotations().iter().map(|a| a.to_source()).collect();
        if let Some(kw) = self.visibility().keyword() {
            parts.push(kw.to_string());
        }
        parts.extend(self.flags().keywords().map(str::to_string));
        parts.join(" ")
    }
}

/// An immutable modifier list, built once by a provider.
#[derive(Clone, Debug, Default)]
pub struct FrozenModifierList {
    flags: ModifierFlags,
    annotations: Vec<AnnotationItem>,
}

impl FrozenModifierList {
    pub const EMPTY: FrozenModifierList = FrozenModifierList {
        flags: ModifierFlags::empty(),
        annotations: Vec::new(),
    };

    pub fn new(flags: ModifierFlags, annotations: Vec<AnnotationItem>) -> Self {
        Self { flags, annotations }
    }

    pub fn to_mutable(&self) -> MutableModifierList {
        MutableModifierList {
            flags: self.flags,
            annotations: self.annotations.clone(),
        }
    }
}

impl ModifierList for FrozenModifierList {
    fn flags(&self) -> ModifierFlags {
        self.flags
    }

    fn annotations(&self) -> &[AnnotationItem] {
        &self.annotations
    }
}

impl PartialEq for FrozenModifierList {
    fn eq(&self, other: &Self) -> bool {
        self.equivalent_to(other)
    }
}

impl Eq for FrozenModifierList {}

/// A modifier list under construction or transformation.
///
/// Annotations keep insertion order. Removing an annotation removes its last structurally
/// equal occurrence, so add-then-remove restores the previous list exactly, even when the
/// annotation was already present. Reordering
/// operations keep [`ModifierList::equivalent_to`] but not [`ModifierList::to_source`].
#[derive(Clone, Debug, Default)]
pub struct MutableModifierList {
    flags: ModifierFlags,
    annotations: Vec<AnnotationItem>,
}

impl MutableModifierList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> &mut Self {
        self.flags = self.flags.with_visibility(visibility);
        self
    }

    pub fn set_flag(&mut self, flag: ModifierFlags, value: bool) -> &mut Self {
        self.flags.set(flag, value);
        self
    }

    pub fn add_annotation(&mut self, annotation: AnnotationItem) -> &mut Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns whether an annotation was removed.
    pub fn remove_annotation(&mut self, annotation: &AnnotationItem) -> bool {
        match self.annotations.iter().rposition(|a| a == annotation) {
            Some(idx) => {
                self.annotations.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn remove_annotations_named(&mut self, qualified_name: &str) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.qualified_name != qualified_name);
        before - self.annotations.len()
    }

    pub fn freeze(&self) -> FrozenModifierList {
        FrozenModifierList {
            flags: self.flags,
            annotations: self.annotations.clone(),
        }
    }
}

impl ModifierList for MutableModifierList {
    fn flags(&self) -> ModifierFlags {
        self.flags
    }

    fn annotations(&self) -> &[AnnotationItem] {
        &self.annotations
    }
}

impl PartialEq for MutableModifierList {
    fn eq(&self, other: &Self) -> bool {
        self.equivalent_to(other)
    }
}

impl Eq for MutableModifierList {}

/// The modifier list held by an item: frozen when loaded, mutable once transformed.
#[derive(Clone, Debug)]
pub enum Modifiers {
    Frozen(FrozenModifierList),
    Mutable(MutableModifierList),
}

impl Modifiers {
    pub const EMPTY: Modifiers = Modifiers::Frozen(FrozenModifierList::EMPTY);

    pub fn new(flags: ModifierFlags, annotations: Vec<AnnotationItem>) -> Self {
        Modifiers::Frozen(FrozenModifierList::new(flags, annotations))
    }

    pub fn public() -> Self {
        Self::new(ModifierFlags::PUBLIC, Vec::new())
    }

    /// Switches to the mutable representation (once) and returns it.
    pub fn to_mut(&mut self) -> &mut MutableModifierList {
        if let Modifiers::Frozen(frozen) = self {
            *self = Modifiers::Mutable(frozen.to_mutable());
        }
        match self {
            Modifiers::Mutable(list) => list,
            Modifiers::Frozen(_) => unreachable!("converted to mutable above"),
        }
    }

    fn as_list(&self) -> &dyn ModifierList {
        match self {
            Modifiers::Frozen(list) => list,
            Modifiers::Mutable(list) => list,
        }
    }
}

/// Shared empty list for items without a backing declaration.
pub(crate) static EMPTY_MODIFIERS: Modifiers = Modifiers::EMPTY;

impl Default for Modifiers {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl ModifierList for Modifiers {
    fn flags(&self) -> ModifierFlags {
        self.as_list().flags()
    }

    fn annotations(&self) -> &[AnnotationItem] {
        match self {
            Modifiers::Frozen(list) => list.annotations(),
            Modifiers::Mutable(list) => list.annotations(),
        }
    }
}

impl PartialEq for Modifiers {
    fn eq(&self, other: &Self) -> bool {
        self.equivalent_to(other)
    }
}

impl Eq for Modifiers {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn deprecated_annotation() -> AnnotationItem {
        AnnotationItem::new("java.lang.Deprecated")
    }

    #[test]
    fn visibility_is_ordered() {
        assert!(Visibility::Private < Visibility::PackagePrivate);
        assert!(Visibility::PackagePrivate < Visibility::Protected);
        assert!(Visibility::Protected < Visibility::Public);
        assert!(Visibility::Protected.is_api());
        assert!(!Visibility::PackagePrivate.is_api());
    }

    #[test]
    fn frozen_and_mutable_with_same_content_are_equivalent() {
        let frozen = FrozenModifierList::new(
            ModifierFlags::PUBLIC | ModifierFlags::STATIC,
            vec![AnnotationItem::nullable(), deprecated_annotation()],
        );
        let mut mutable = MutableModifierList::new();
        mutable
            .set_visibility(Visibility::Public)
            .set_flag(ModifierFlags::STATIC, true)
            .add_annotation(deprecated_annotation())
            .add_annotation(AnnotationItem::nullable());
        assert!(frozen.equivalent_to(&mutable));
        assert!(mutable.equivalent_to(&frozen));
    }

    #[test]
    fn add_then_remove_restores_the_static_form() {
        let statically_built = FrozenModifierList::new(ModifierFlags::PUBLIC, vec![]);
        let mut mutable = statically_built.to_mutable();
        mutable.add_annotation(AnnotationItem::non_null());
        assert!(!mutable.equivalent_to(&statically_built));
        assert!(mutable.remove_annotation(&AnnotationItem::non_null()));

        assert!(mutable.equivalent_to(&statically_built));
        assert_eq!(mutable.to_source(), statically_built.to_source());
        assert_eq!(mutable.freeze(), statically_built);

        let a = AnnotationItem::new("test.A");
        let b = AnnotationItem::new("test.B");
        let statically_built = FrozenModifierList::new(ModifierFlags::PUBLIC, vec![a.clone(), b]);
        let mut mutable = statically_built.to_mutable();
        mutable.add_annotation(a.clone());
        assert!(mutable.remove_annotation(&a));
        assert_eq!(mutable.to_source(), "@test.A @test.B public");
        assert_eq!(mutable.to_source(), statically_built.to_source());
    }

    #[test]
    fn reordering_is_equivalent_but_not_textually_identical() {
        let a = FrozenModifierList::new(
            ModifierFlags::PUBLIC,
            vec![AnnotationItem::nullable(), deprecated_annotation()],
        );
        let mut b = a.to_mutable();
        b.remove_annotation(&AnnotationItem::nullable());
        b.add_annotation(AnnotationItem::nullable());
        assert!(a.equivalent_to(&b));
        assert_eq!(
            a.to_source(),
            "@androidx.annotation.Nullable @java.lang.Deprecated public"
        );
        assert_eq!(
            b.to_source(),
            "@java.lang.Deprecated @androidx.annotation.Nullable public"
        );
    }

    #[test]
    fn visibility_change_breaks_equivalence() {
        let a = FrozenModifierList::new(ModifierFlags::PUBLIC, vec![]);
        let b = FrozenModifierList::new(ModifierFlags::PROTECTED, vec![]);
        assert!(!a.equivalent_to(&b));
    }

    #[test]
    fn keywords_round_trip() {
        let flags = ModifierFlags::PROTECTED
            | ModifierFlags::ABSTRACT
            | ModifierFlags::STATIC
            | ModifierFlags::VARARGS;
        let list = FrozenModifierList::new(flags, vec![]);
        assert_eq!(list.to_source(), "protected abstract static");
        let mut parsed = ModifierFlags::empty();
        for kw in list.to_source().split(' ') {
            parsed |= ModifierFlags::from_keyword(kw).unwrap();
        }
        assert_eq!(parsed | ModifierFlags::VARARGS, flags);
    }

    #[test]
    fn modifiers_switch_to_mutable_on_demand() {
        let mut modifiers = Modifiers::public();
        modifiers.to_mut().add_annotation(AnnotationItem::nullable());
        assert!(matches!(modifiers, Modifiers::Mutable(_)));
        assert_eq!(modifiers.nullability(), Nullability::Nullable);
        assert_eq!(modifiers.visibility(), Visibility::Public);
    }
}
