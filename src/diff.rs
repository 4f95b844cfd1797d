//! Structural diff between two surface snapshots.
//!
//! Entities are aligned strictly by qualified name; everything else is a
//! field-by-field comparison. The differ never mutates its inputs and its
//! output order depends only on the content of the two snapshots.

use crate::classify;
use crate::model::{
    ChangeKind, ChangePath, ChangeRecord, ClassSurface, DefaultValue, FunctionSurface, ParamKind,
    Parameter, Severity, Surface, TypeRef,
};
use std::collections::{BTreeMap, HashSet};

/// Diff two snapshots and aggregate the result to one severity.
pub fn compare_surfaces(old: &Surface, new: &Surface) -> (Vec<ChangeRecord>, Severity) {
    let changes = diff_surfaces(old, new);
    let severity = classify::aggregate(&changes);
    (changes, severity)
}

pub fn diff_surfaces(old: &Surface, new: &Surface) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();

    let old_functions: BTreeMap<String, &FunctionSurface> = old.functions().collect();
    let new_functions: BTreeMap<String, &FunctionSurface> = new.functions().collect();

    for (symbol, old_fn) in &old_functions {
        match new_functions.get(symbol) {
            None => changes.push(ChangeRecord::new(
                ChangeKind::FunctionRemoved,
                ChangePath::symbol(symbol.clone()),
                None,
                None,
            )),
            Some(new_fn) => diff_function(symbol, old_fn, new_fn, &mut changes),
        }
    }
    for symbol in new_functions.keys() {
        if !old_functions.contains_key(symbol) {
            changes.push(ChangeRecord::new(
                ChangeKind::FunctionAdded,
                ChangePath::symbol(symbol.clone()),
                None,
                None,
            ));
        }
    }

    let old_classes: BTreeMap<String, &ClassSurface> = old.classes().collect();
    let new_classes: BTreeMap<String, &ClassSurface> = new.classes().collect();

    for (symbol, old_class) in &old_classes {
        match new_classes.get(symbol) {
            None => changes.push(ChangeRecord::new(
                ChangeKind::ClassRemoved,
                ChangePath::symbol(symbol.clone()),
                None,
                None,
            )),
            Some(new_class) => diff_class(symbol, old_class, new_class, &mut changes),
        }
    }
    for symbol in new_classes.keys() {
        if !old_classes.contains_key(symbol) {
            changes.push(ChangeRecord::new(
                ChangeKind::ClassAdded,
                ChangePath::symbol(symbol.clone()),
                None,
                None,
            ));
        }
    }

    // Order by path then kind so output is independent of traversal order.
    changes.sort_by(|a, b| a.path.cmp(&b.path).then(a.kind.cmp(&b.kind)));
    changes
}

fn diff_function(
    symbol: &str,
    old: &FunctionSurface,
    new: &FunctionSurface,
    changes: &mut Vec<ChangeRecord>,
) {
    let old_params: BTreeMap<&str, &Parameter> =
        old.params.iter().map(|p| (p.name.as_str(), p)).collect();
    let new_params: BTreeMap<&str, &Parameter> =
        new.params.iter().map(|p| (p.name.as_str(), p)).collect();

    for (&name, &old_param) in &old_params {
        let Some(&new_param) = new_params.get(name) else {
            changes.push(ChangeRecord::new(
                ChangeKind::ParameterRemoved,
                ChangePath::member(symbol, name),
                Some(render_param(old_param)),
                None,
            ));
            continue;
        };

        if old_param.kind != new_param.kind {
            // A kind change can silently stop matching existing call sites,
            // so it counts as removal of the old parameter plus addition of
            // a new one.
            changes.push(ChangeRecord::new(
                ChangeKind::ParameterRemoved,
                ChangePath::member(symbol, name),
                Some(render_param(old_param)),
                None,
            ));
            changes.push(ChangeRecord::new(
                added_param_kind(new_param),
                ChangePath::member(symbol, name),
                None,
                Some(render_param(new_param)),
            ));
            continue;
        }

        diff_annotation(
            symbol,
            Some(name),
            &old_param.annotation,
            &new_param.annotation,
            ChangeKind::ParameterTypeChanged,
            changes,
        );
        diff_default(symbol, name, &old_param.default, &new_param.default, changes);
    }

    for (&name, &new_param) in &new_params {
        if !old_params.contains_key(name) {
            changes.push(ChangeRecord::new(
                added_param_kind(new_param),
                ChangePath::member(symbol, name),
                None,
                Some(render_param(new_param)),
            ));
        }
    }

    diff_positional_order(symbol, old, new, changes);

    diff_annotation(
        symbol,
        None,
        &old.returns,
        &new.returns,
        ChangeKind::ReturnTypeChanged,
        changes,
    );
}

/// Positional call sites bind by position, so a reordering of the shared
/// positional-capable parameters is a distinct breaking change even though
/// every name still exists.
fn diff_positional_order(
    symbol: &str,
    old: &FunctionSurface,
    new: &FunctionSurface,
    changes: &mut Vec<ChangeRecord>,
) {
    let old_names: HashSet<&str> = positional_names(old).collect();
    let new_names: HashSet<&str> = positional_names(new).collect();

    let old_order: Vec<&str> = positional_names(old)
        .filter(|name| new_names.contains(name))
        .collect();
    let new_order: Vec<&str> = positional_names(new)
        .filter(|name| old_names.contains(name))
        .collect();

    if old_order != new_order {
        changes.push(ChangeRecord::new(
            ChangeKind::ParametersReordered,
            ChangePath::symbol(symbol),
            Some(old_order.join(", ")),
            Some(new_order.join(", ")),
        ));
    }
}

fn positional_names(function: &FunctionSurface) -> impl Iterator<Item = &str> {
    function
        .params
        .iter()
        .filter(|p| p.is_positional())
        .map(|p| p.name.as_str())
}

fn diff_class(
    symbol: &str,
    old: &ClassSurface,
    new: &ClassSurface,
    changes: &mut Vec<ChangeRecord>,
) {
    let old_attrs: BTreeMap<&str, _> = old.attributes.iter().map(|a| (a.name.as_str(), a)).collect();
    let new_attrs: BTreeMap<&str, _> = new.attributes.iter().map(|a| (a.name.as_str(), a)).collect();

    for (&name, old_attr) in &old_attrs {
        let Some(new_attr) = new_attrs.get(name) else {
            changes.push(ChangeRecord::new(
                ChangeKind::AttributeRemoved,
                ChangePath::member(symbol, name),
                old_attr.annotation.as_ref().map(TypeRef::to_string),
                None,
            ));
            continue;
        };
        diff_annotation(
            symbol,
            Some(name),
            &old_attr.annotation,
            &new_attr.annotation,
            ChangeKind::AttributeTypeChanged,
            changes,
        );
        diff_default(symbol, name, &old_attr.default, &new_attr.default, changes);
    }
    for (&name, new_attr) in &new_attrs {
        if !old_attrs.contains_key(name) {
            changes.push(ChangeRecord::new(
                ChangeKind::AttributeAdded,
                ChangePath::member(symbol, name),
                None,
                new_attr.annotation.as_ref().map(TypeRef::to_string),
            ));
        }
    }

    let old_methods: BTreeMap<&str, &FunctionSurface> =
        old.methods.iter().map(|m| (m.name.as_str(), m)).collect();
    let new_methods: BTreeMap<&str, &FunctionSurface> =
        new.methods.iter().map(|m| (m.name.as_str(), m)).collect();

    for (name, old_method) in &old_methods {
        let qualified = format!("{}.{}", symbol, name);
        match new_methods.get(name) {
            None => changes.push(ChangeRecord::new(
                ChangeKind::MethodRemoved,
                ChangePath::symbol(qualified),
                None,
                None,
            )),
            Some(new_method) => diff_function(&qualified, old_method, new_method, changes),
        }
    }
    for name in new_methods.keys() {
        if !old_methods.contains_key(name) {
            changes.push(ChangeRecord::new(
                ChangeKind::MethodAdded,
                ChangePath::symbol(format!("{}.{}", symbol, name)),
                None,
                None,
            ));
        }
    }
}

fn diff_annotation(
    symbol: &str,
    member: Option<&str>,
    old: &Option<TypeRef>,
    new: &Option<TypeRef>,
    changed_kind: ChangeKind,
    changes: &mut Vec<ChangeRecord>,
) {
    let path = || match member {
        Some(m) => ChangePath::member(symbol, m),
        None => ChangePath::symbol(symbol),
    };
    match (old, new) {
        (Some(old_ty), Some(new_ty)) if old_ty != new_ty => changes.push(ChangeRecord::new(
            changed_kind,
            path(),
            Some(old_ty.to_string()),
            Some(new_ty.to_string()),
        )),
        (None, Some(new_ty)) => changes.push(ChangeRecord::new(
            ChangeKind::AnnotationAdded,
            path(),
            None,
            Some(new_ty.to_string()),
        )),
        (Some(old_ty), None) => changes.push(ChangeRecord::new(
            ChangeKind::AnnotationRemoved,
            path(),
            Some(old_ty.to_string()),
            None,
        )),
        _ => {}
    }
}

fn diff_default(
    symbol: &str,
    member: &str,
    old: &DefaultValue,
    new: &DefaultValue,
    changes: &mut Vec<ChangeRecord>,
) {
    match (old.is_present(), new.is_present()) {
        (true, false) => changes.push(ChangeRecord::new(
            ChangeKind::DefaultRemoved,
            ChangePath::member(symbol, member),
            old.render(),
            None,
        )),
        // Absent -> present is a default addition, never a type change.
        (false, true) => changes.push(ChangeRecord::new(
            ChangeKind::DefaultAdded,
            ChangePath::member(symbol, member),
            None,
            new.render(),
        )),
        (true, true) if old != new => changes.push(ChangeRecord::new(
            ChangeKind::DefaultChanged,
            ChangePath::member(symbol, member),
            old.render(),
            new.render(),
        )),
        _ => {}
    }
}

fn added_param_kind(param: &Parameter) -> ChangeKind {
    if param.is_optional() {
        ChangeKind::OptionalParameterAdded
    } else {
        ChangeKind::RequiredParameterAdded
    }
}

fn render_param(param: &Parameter) -> String {
    let mut text = match param.kind {
        ParamKind::VariadicPositional => format!("*{}", param.name),
        ParamKind::VariadicKeyword => format!("**{}", param.name),
        _ => param.name.clone(),
    };
    if let Some(annotation) = &param.annotation {
        text.push_str(": ");
        text.push_str(annotation.as_str());
    }
    if let Some(default) = param.default.render() {
        text.push_str(" = ");
        text.push_str(&default);
    }
    text
}
