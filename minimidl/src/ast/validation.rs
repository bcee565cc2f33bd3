//! Semantic validation.
//!
//! Validation runs a fixed sequence of passes over a freshly-lowered module,
//! attaching resolved type targets and constant values in place and
//! accumulating every semantic error it finds. An empty message list means
//! the module is validated and safe for type mapping and caching.

pub mod reporting;

pub use reporting::Message;

use std::collections::hash_map::Entry;

use fxhash::{FxHashMap, FxHashSet};
use levenshtein::levenshtein;

use crate::ast::eval::{self, Scope};
use crate::ast::{Item, Module, NamedKind, NamedTarget, Prim, Type};
use crate::source::ByteRange;

/// Longest edit distance still offered as a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SymKind {
    Interface,
    Enum,
    Typedef,
    Const,
}

impl SymKind {
    fn named(self) -> Option<NamedKind> {
        match self {
            SymKind::Interface => Some(NamedKind::Interface),
            SymKind::Enum => Some(NamedKind::Enum),
            SymKind::Typedef => Some(NamedKind::Typedef),
            SymKind::Const => None,
        }
    }
}

#[derive(Debug)]
struct Symbol {
    kind: SymKind,
    /// Indices of the defining item. `None` while only forward-declared.
    loc: Option<(usize, usize)>,
    range: ByteRange,
}

/// One symbol table per namespace name. Same-named namespace blocks in one
/// compilation unit share a scope.
type Table = FxHashMap<String, Symbol>;
type Tables = FxHashMap<String, Table>;

/// Validate `module`, attaching type targets and constant values in place.
///
/// Returns every semantic error found. Unlike parsing, validation never
/// stops at the first error.
pub fn validate(module: &mut Module) -> Vec<Message> {
    let mut messages = Vec::new();

    let tables = collect_symbols(module, &mut messages);
    check_forward_completion(module, &tables, &mut messages);
    resolve_types(module, &tables, &mut messages);
    check_typedef_cycles(module, &mut messages);
    check_shapes(module, &mut messages);
    check_members(module, &mut messages);
    eval_constants(module, &mut messages);

    messages
}

fn collect_symbols(module: &Module, messages: &mut Vec<Message>) -> Tables {
    let mut tables = Tables::default();

    for (ns_index, namespace) in module.namespaces.iter().enumerate() {
        let table = tables.entry(namespace.name.clone()).or_default();
        for (item_index, item) in namespace.items.iter().enumerate() {
            let kind = match item {
                Item::Forward(_) | Item::Interface(_) => SymKind::Interface,
                Item::Enum(_) => SymKind::Enum,
                Item::Typedef(_) => SymKind::Typedef,
                Item::Const(_) => SymKind::Const,
            };
            match table.entry(item.name().to_owned()) {
                Entry::Vacant(entry) => {
                    let loc = match item {
                        Item::Forward(_) => None,
                        _ => Some((ns_index, item_index)),
                    };
                    entry.insert(Symbol {
                        kind,
                        loc,
                        range: item.range(),
                    });
                }
                Entry::Occupied(mut entry) => {
                    let symbol = entry.get_mut();
                    // Forward declarations may repeat and may follow the
                    // definition they name. A full interface definition
                    // completes a pending forward declaration.
                    if symbol.kind == SymKind::Interface && matches!(item, Item::Forward(_)) {
                    } else if symbol.kind == SymKind::Interface
                        && symbol.loc.is_none()
                        && matches!(item, Item::Interface(_))
                    {
                        symbol.loc = Some((ns_index, item_index));
                        symbol.range = item.range();
                    } else {
                        messages.push(Message::DuplicateDefinition {
                            name: item.name().to_owned(),
                            original_range: symbol.range,
                            duplicate_range: item.range(),
                        });
                    }
                }
            }
        }
    }

    tables
}

fn check_forward_completion(module: &Module, tables: &Tables, messages: &mut Vec<Message>) {
    // Report at the first forward declaration of each dangling name, in
    // source order.
    let mut reported = FxHashSet::default();
    for namespace in &module.namespaces {
        let table = &tables[&namespace.name];
        for item in &namespace.items {
            if let Item::Forward(forward) = item {
                if table[&forward.name].loc.is_none()
                    && reported.insert((namespace.name.clone(), forward.name.clone()))
                {
                    messages.push(Message::UnresolvedForwardDeclaration {
                        name: forward.name.clone(),
                        range: forward.range,
                    });
                }
            }
        }
    }
}

fn resolve_types(module: &mut Module, tables: &Tables, messages: &mut Vec<Message>) {
    for ns_index in 0..module.namespaces.len() {
        let table = &tables[&module.namespaces[ns_index].name];
        for item in &mut module.namespaces[ns_index].items {
            match item {
                Item::Forward(_) | Item::Enum(_) | Item::Const(_) => {}
                Item::Typedef(typedef) => resolve_type(&mut typedef.r#type, table, messages),
                Item::Interface(interface) => {
                    for property in &mut interface.properties {
                        resolve_type(&mut property.r#type, table, messages);
                    }
                    for method in &mut interface.methods {
                        resolve_type(&mut method.return_type, table, messages);
                        for param in &mut method.params {
                            resolve_type(&mut param.r#type, table, messages);
                        }
                    }
                }
            }
        }
    }
}

fn resolve_type(r#type: &mut Type, table: &Table, messages: &mut Vec<Message>) {
    match r#type {
        Type::Prim { .. } | Type::String { .. } => {}
        Type::Named {
            range,
            name,
            target,
        } => match table.get(name) {
            Some(symbol) => match symbol.kind.named() {
                Some(kind) => {
                    // A dangling forward declaration has no location. It was
                    // already reported, so the target is just left empty.
                    if let Some((namespace, item)) = symbol.loc {
                        *target = Some(NamedTarget {
                            namespace,
                            item,
                            kind,
                        });
                    }
                }
                None => messages.push(Message::NotAType {
                    name: name.clone(),
                    kind: "a constant",
                    range: *range,
                }),
            },
            None => messages.push(Message::UnknownType {
                name: name.clone(),
                range: *range,
                suggestion: suggest(name, table),
            }),
        },
        Type::Array { element, .. } | Type::Set { element, .. } => {
            resolve_type(element, table, messages)
        }
        Type::Dict { key, value, .. } => {
            resolve_type(key, table, messages);
            resolve_type(value, table, messages);
        }
        Type::Nullable { inner, .. } => resolve_type(inner, table, messages),
    }
}

/// The closest type name within editing distance, preferring shorter
/// distances and breaking ties alphabetically so suggestions are stable.
fn suggest(name: &str, table: &Table) -> Option<String> {
    let mut best: Option<(usize, &str)> = None;
    for (candidate, symbol) in table {
        if symbol.kind.named().is_none() {
            continue;
        }
        let distance = levenshtein(name, candidate);
        if distance > MAX_SUGGESTION_DISTANCE {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_distance, best_name)) => {
                distance < best_distance
                    || (distance == best_distance && candidate.as_str() < best_name)
            }
        };
        if better {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, candidate)| candidate.to_owned())
}

/// Indices of the typedef that `r#type` aliases directly, if any.
fn alias_target(r#type: &Type) -> Option<(usize, usize)> {
    match r#type {
        Type::Named {
            target:
                Some(NamedTarget {
                    namespace,
                    item,
                    kind: NamedKind::Typedef,
                }),
            ..
        } => Some((*namespace, *item)),
        _ => None,
    }
}

fn check_typedef_cycles(module: &Module, messages: &mut Vec<Message>) {
    for (ns_index, namespace) in module.namespaces.iter().enumerate() {
        for (item_index, item) in namespace.items.iter().enumerate() {
            let typedef = match item {
                Item::Typedef(typedef) => typedef,
                _ => continue,
            };
            let start = (ns_index, item_index);
            let mut seen = FxHashSet::default();
            seen.insert(start);
            let mut current = typedef;
            loop {
                let next = match alias_target(&current.r#type) {
                    Some(next) => next,
                    None => break,
                };
                if next == start {
                    messages.push(Message::CyclicTypedef {
                        name: typedef.name.clone(),
                        range: typedef.range,
                    });
                    break;
                }
                // A chain that joins a cycle elsewhere is reported at the
                // cycle's own members.
                if !seen.insert(next) {
                    break;
                }
                current = match &module.namespaces[next.0].items[next.1] {
                    Item::Typedef(typedef) => typedef,
                    _ => break,
                };
            }
        }
    }
}

fn check_shapes(module: &Module, messages: &mut Vec<Message>) {
    for namespace in &module.namespaces {
        for item in &namespace.items {
            match item {
                Item::Forward(_) | Item::Enum(_) | Item::Const(_) => {}
                Item::Typedef(typedef) => check_type(module, &typedef.r#type, false, messages),
                Item::Interface(interface) => {
                    for property in &interface.properties {
                        check_type(module, &property.r#type, false, messages);
                    }
                    for method in &interface.methods {
                        check_type(module, &method.return_type, true, messages);
                        for param in &method.params {
                            check_type(module, &param.r#type, false, messages);
                        }
                    }
                }
            }
        }
    }
}

/// Shape rules for one type expression. `void_ok` is true only for the
/// outermost type of a method return.
fn check_type(module: &Module, r#type: &Type, void_ok: bool, messages: &mut Vec<Message>) {
    match r#type {
        Type::Prim {
            range,
            prim: Prim::Void,
        } => {
            if !void_ok {
                messages.push(Message::InvalidVoidType { range: *range });
            }
        }
        Type::Prim { .. } | Type::String { .. } | Type::Named { .. } => {}
        Type::Array { element, .. } | Type::Set { element, .. } => {
            check_type(module, element, false, messages)
        }
        Type::Dict { key, value, .. } => {
            if let Some(found) = invalid_key(module, key) {
                messages.push(Message::InvalidKeyType {
                    found,
                    range: key.range(),
                });
            } else {
                check_type(module, key, false, messages);
            }
            check_type(module, value, false, messages);
        }
        Type::Nullable { range, inner } => {
            if let Type::Nullable { .. } = module.resolve_alias(inner) {
                messages.push(Message::InvalidNullability { range: *range });
            }
            check_type(module, inner, false, messages);
        }
    }
}

/// A description of the key type if it cannot key a dictionary. Keys must
/// expand to a non-void primitive or a string.
fn invalid_key(module: &Module, key: &Type) -> Option<String> {
    match module.resolve_alias(key) {
        Type::Prim {
            prim: Prim::Void, ..
        } => Some("`void`".to_owned()),
        Type::Prim { .. } | Type::String { .. } => None,
        Type::Named { name, target, .. } => match target {
            Some(target) => Some(format!("{} `{}`", target.kind.description(), name)),
            // Unresolved names were already reported.
            None => None,
        },
        Type::Array { .. } => Some("an array".to_owned()),
        Type::Dict { .. } => Some("a dictionary".to_owned()),
        Type::Set { .. } => Some("a set".to_owned()),
        Type::Nullable { .. } => Some("a nullable type".to_owned()),
    }
}

fn check_members(module: &Module, messages: &mut Vec<Message>) {
    for namespace in &module.namespaces {
        for item in &namespace.items {
            let interface = match item {
                Item::Interface(interface) => interface,
                _ => continue,
            };

            // Properties and methods share one name scope. Members were
            // split by kind during lowering, so rebuild source order from
            // the spans before scanning for collisions.
            let mut members: Vec<(ByteRange, &str)> = Vec::new();
            members.extend(
                interface
                    .properties
                    .iter()
                    .map(|property| (property.range, property.name.as_str())),
            );
            members.extend(
                interface
                    .methods
                    .iter()
                    .map(|method| (method.range, method.name.as_str())),
            );
            members.sort_by_key(|(range, _)| range.start());

            let mut seen: FxHashMap<&str, ByteRange> = FxHashMap::default();
            for (range, name) in members {
                match seen.get(name) {
                    Some(original_range) => messages.push(Message::DuplicateMember {
                        interface: interface.name.clone(),
                        name: name.to_owned(),
                        original_range: *original_range,
                        duplicate_range: range,
                    }),
                    None => {
                        seen.insert(name, range);
                    }
                }
            }

            for method in &interface.methods {
                let mut seen: FxHashMap<&str, ByteRange> = FxHashMap::default();
                for param in &method.params {
                    match seen.get(param.name.as_str()) {
                        Some(original_range) => messages.push(Message::DuplicateParameter {
                            name: param.name.clone(),
                            original_range: *original_range,
                            duplicate_range: param.range,
                        }),
                        None => {
                            seen.insert(&param.name, param.range);
                        }
                    }
                }
            }
        }
    }
}

fn eval_constants(module: &mut Module, messages: &mut Vec<Message>) {
    // Names with no integer value are visible to every expression in the
    // namespace, so that referencing one reports a mismatch rather than a
    // missing name regardless of declaration order.
    let mut scopes: FxHashMap<String, Scope> = FxHashMap::default();
    for namespace in &module.namespaces {
        let scope = scopes.entry(namespace.name.clone()).or_default();
        for item in &namespace.items {
            let kind = match item {
                Item::Forward(_) | Item::Interface(_) => "an interface",
                Item::Enum(_) => "an enum",
                Item::Typedef(_) => "a typedef",
                Item::Const(_) => continue,
            };
            scope.define_kind(item.name(), kind);
        }
    }

    // Constants and enum members join the scope in declaration order, so an
    // expression sees exactly the values declared textually before it.
    for namespace in &mut module.namespaces {
        let scope = scopes
            .get_mut(&namespace.name)
            .unwrap_or_else(|| unreachable!("scope created above"));
        for item in &mut namespace.items {
            match item {
                Item::Const(r#const) => {
                    match eval::eval(&r#const.expr, r#const.backing, scope) {
                        Ok(value) => {
                            r#const.value = Some(value);
                            scope.define(&r#const.name, value);
                        }
                        Err(error) => messages.push(eval_error(error)),
                    }
                }
                Item::Enum(r#enum) => {
                    for member in &mut r#enum.members {
                        match eval::eval(&member.expr, r#enum.backing, scope) {
                            Ok(value) => {
                                member.value = Some(value);
                                scope.define(&member.name, value);
                            }
                            Err(error) => messages.push(eval_error(error)),
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn eval_error(error: eval::Error) -> Message {
    match error {
        eval::Error::Unresolved { range, name } => Message::UnresolvedReference { name, range },
        eval::Error::NotInteger { range, name, kind } => {
            Message::TypeMismatch { name, kind, range }
        }
        eval::Error::DivisionByZero { range } => Message::DivisionByZero { range },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[(&str, SymKind)]) -> Table {
        let range = ByteRange::new(crate::files::FileId::try_from(1).unwrap(), 0, 0);
        names
            .iter()
            .map(|(name, kind)| {
                (
                    (*name).to_owned(),
                    Symbol {
                        kind: *kind,
                        loc: Some((0, 0)),
                        range,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn suggestions_prefer_close_type_names() {
        let table = table(&[
            ("IUser", SymKind::Interface),
            ("IUsers", SymKind::Interface),
            ("USER_MAX", SymKind::Const),
        ]);
        assert_eq!(suggest("IUsr", &table), Some("IUser".to_owned()));
        assert_eq!(suggest("Unrelated", &table), None);
        // Constants are never suggested as types.
        assert_eq!(suggest("USER_MAY", &table), None);
    }

    #[test]
    fn suggestion_ties_break_alphabetically() {
        let table = table(&[("IFooA", SymKind::Interface), ("IFooB", SymKind::Enum)]);
        assert_eq!(suggest("IFoo", &table), Some("IFooA".to_owned()));
    }
}
