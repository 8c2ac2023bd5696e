//! Override relationships between callables.
//!
//! Matching is by name and erased parameter types, after substituting the type arguments a
//! subtype passes to a generic supertype (`Comparable<Foo>.compareTo(T)` matches
//! `compareTo(Foo)`).

use std::collections::{HashMap, HashSet, VecDeque};

use apimodel_types::{NestedScope, TypeItem};

use crate::items::{CallableItem, ClassItem, MemberItem, ModifiedItem};
use crate::modifiers::ModifierList;
use crate::Codebase;

fn can_override(method: &CallableItem<'_>) -> bool {
    !method.is_constructor() && !method.modifiers().is_static() && !method.modifiers().is_private()
}

/// Declarations directly overridden by `method`, one per direct supertype branch.
///
/// Direct supertypes are visited superclass first, then interfaces in declared order; in each
/// branch the nearest matching declaration is taken. A candidate that is itself overridden by
/// another candidate is dropped, so `I2.m` wins over `I1.m` when `I2 extends I1`.
pub fn super_methods<'a>(method: CallableItem<'a>) -> Vec<CallableItem<'a>> {
    if !can_override(&method) {
        return Vec::new();
    }
    let class = method.containing_class();
    let erased = method.erased_parameter_types();

    let mut candidates: Vec<CallableItem<'a>> = Vec::new();
    for super_type in class.super_types() {
        let mut visited = HashSet::from([class.qualified_name().to_string()]);
        if let Some(found) = find_in_type(
            class.codebase(),
            super_type,
            method.name(),
            &erased,
            &mut visited,
        ) {
            if !candidates.contains(&found) {
                candidates.push(found);
            }
        }
    }

    let shadowed: HashSet<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(idx, candidate)| {
            candidates
                .iter()
                .enumerate()
                .any(|(other_idx, other)| {
                    other_idx != *idx && all_super_methods(*other).contains(*candidate)
                })
        })
        .map(|(idx, _)| idx)
        .collect();

    candidates
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !shadowed.contains(idx))
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Transitive closure of [`super_methods`], breadth first, without duplicates.
pub fn all_super_methods<'a>(method: CallableItem<'a>) -> Vec<CallableItem<'a>> {
    let mut out: Vec<CallableItem<'a>> = Vec::new();
    let mut queue: VecDeque<CallableItem<'a>> = super_methods(method).into();
    while let Some(next) = queue.pop_front() {
        if out.contains(&next) || next == method {
            continue;
        }
        out.push(next);
        queue.extend(super_methods(next));
    }
    out
}

/// The nearest declaration of `name(erased_parameters)` visible from `class`: the class
/// itself first, then its supertypes depth first in declaration order.
pub fn find_method_in_hierarchy<'a>(
    class: ClassItem<'a>,
    name: &str,
    erased_parameters: &[String],
) -> Option<CallableItem<'a>> {
    let ty = TypeItem::class(class.qualified_name(), Vec::new());
    let mut visited = HashSet::new();
    find_in_type(class.codebase(), &ty, name, erased_parameters, &mut visited)
}

fn find_in_type<'a>(
    codebase: &'a Codebase,
    ty: &TypeItem,
    name: &str,
    erased_parameters: &[String],
    visited: &mut HashSet<String>,
) -> Option<CallableItem<'a>> {
    let class_type = ty.as_class()?;
    let class = codebase.find_class(&class_type.qualified_name)?;
    if !visited.insert(class.qualified_name().to_string()) {
        return None;
    }
    let bindings = type_argument_bindings(class, &class_type.arguments);

    for candidate in class.methods() {
        if candidate.name() != name || !can_override(&candidate) {
            continue;
        }
        if erased_as_seen_from(candidate, &bindings) == erased_parameters {
            tracing::trace!(
                target: "apimodel.overrides",
                method = %candidate.erased_signature(),
                class = %class.qualified_name(),
                "matched overridden declaration"
            );
            return Some(candidate);
        }
    }

    for super_type in class.super_types() {
        let super_type = super_type.substitute(&bindings);
        if let Some(found) = find_in_type(codebase, &super_type, name, erased_parameters, visited) {
            return Some(found);
        }
    }
    None
}

/// Maps the class's type parameters to the arguments of a parameterised use. Raw uses (no
/// arguments) bind nothing, so parameters erase to their bounds.
fn type_argument_bindings(class: ClassItem<'_>, arguments: &[TypeItem]) -> HashMap<String, TypeItem> {
    let params = class.type_parameter_list();
    if params.len() != arguments.len() {
        return HashMap::new();
    }
    params
        .iter()
        .map(|p| p.name.clone())
        .zip(arguments.iter().cloned())
        .collect()
}

/// Erased parameter types of `candidate` after substituting `bindings`. The candidate's own
/// method type parameters shadow class bindings of the same name.
fn erased_as_seen_from(candidate: CallableItem<'_>, bindings: &HashMap<String, TypeItem>) -> Vec<String> {
    let mut bindings = bindings.clone();
    for tp in candidate.type_parameter_list() {
        bindings.remove(&tp.name);
    }
    let scope: NestedScope<'_> = candidate.type_parameter_scope();
    candidate
        .parameters()
        .iter()
        .map(|p| p.ty().substitute(&bindings).erased_type_string(&scope))
        .collect()
}
