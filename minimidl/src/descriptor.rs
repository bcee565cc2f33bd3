//! Structural type descriptors for code generation.
//!
//! A [`TypeMap`] flattens every type mentioned by a validated module into an
//! interned table of [`TypeDescriptor`]s. Descriptors are structural: two
//! occurrences of `string_t[]?` anywhere in the module share one entry, and
//! composite descriptors reference their components by [`TypeId`] rather
//! than by nesting. Typedefs expand transparently and never appear in the
//! table.

use fxhash::FxHashMap;

use crate::ast::{Item, Module, NamedKind, Prim, Type};

/// Index of a descriptor in its [`TypeMap`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Void,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Enum(String),
    Interface(String),
    Array(TypeId),
    Dict(TypeId, TypeId),
    Set(TypeId),
}

/// How generated code holds a value of this type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Passed and stored by value.
    Value,
    /// Held through a reference-counted handle.
    RefCounted,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub kind: DescriptorKind,
    pub nullable: bool,
}

impl TypeDescriptor {
    /// Strings, interfaces, and containers are reference counted. Scalars
    /// and enums stay by-value even when nullable.
    pub fn ownership(&self) -> Ownership {
        match self.kind {
            DescriptorKind::Void
            | DescriptorKind::Bool
            | DescriptorKind::Int32
            | DescriptorKind::Int64
            | DescriptorKind::Float32
            | DescriptorKind::Float64
            | DescriptorKind::Enum(_) => Ownership::Value,
            DescriptorKind::String
            | DescriptorKind::Interface(_)
            | DescriptorKind::Array(_)
            | DescriptorKind::Dict(_, _)
            | DescriptorKind::Set(_) => Ownership::RefCounted,
        }
    }
}

/// Interned table of every type a validated module mentions.
#[derive(Debug, Default)]
pub struct TypeMap {
    entries: Vec<TypeDescriptor>,
    ids: FxHashMap<TypeDescriptor, TypeId>,
}

impl TypeMap {
    /// Build the table for a validated module.
    ///
    /// Walks typedef targets, property types, and method return and
    /// parameter types in declaration order, so the table layout is
    /// deterministic for a given module.
    pub fn of_module(module: &Module) -> TypeMap {
        let mut map = TypeMap::default();
        for namespace in &module.namespaces {
            for item in &namespace.items {
                match item {
                    Item::Forward(_) | Item::Enum(_) | Item::Const(_) => {}
                    Item::Typedef(typedef) => {
                        map.id_of(module, &typedef.r#type, false);
                    }
                    Item::Interface(interface) => {
                        for property in &interface.properties {
                            map.id_of(module, &property.r#type, false);
                        }
                        for method in &interface.methods {
                            map.id_of(module, &method.return_type, false);
                            for param in &method.params {
                                map.id_of(module, &param.r#type, false);
                            }
                        }
                    }
                }
            }
        }
        map
    }

    fn id_of(&mut self, module: &Module, r#type: &Type, nullable: bool) -> TypeId {
        let kind = match module.resolve_alias(r#type) {
            Type::Prim { prim, .. } => match prim {
                Prim::Void => DescriptorKind::Void,
                Prim::Bool => DescriptorKind::Bool,
                Prim::Int32 => DescriptorKind::Int32,
                Prim::Int64 => DescriptorKind::Int64,
                Prim::Float => DescriptorKind::Float32,
                Prim::Double => DescriptorKind::Float64,
            },
            Type::String { .. } => DescriptorKind::String,
            Type::Named { name, target, .. } => match target {
                Some(target) => match target.kind {
                    NamedKind::Enum => DescriptorKind::Enum(name.clone()),
                    NamedKind::Interface => DescriptorKind::Interface(name.clone()),
                    NamedKind::Typedef => {
                        unreachable!("typedefs are expanded before descriptor construction")
                    }
                },
                None => unreachable!("named types are resolved before descriptor construction"),
            },
            Type::Array { element, .. } => {
                DescriptorKind::Array(self.id_of(module, element, false))
            }
            Type::Dict { key, value, .. } => DescriptorKind::Dict(
                self.id_of(module, key, false),
                self.id_of(module, value, false),
            ),
            Type::Set { element, .. } => DescriptorKind::Set(self.id_of(module, element, false)),
            Type::Nullable { inner, .. } => return self.id_of(module, inner, true),
        };
        self.intern(TypeDescriptor { kind, nullable })
    }

    fn intern(&mut self, descriptor: TypeDescriptor) -> TypeId {
        match self.ids.get(&descriptor) {
            Some(id) => *id,
            None => {
                let id = TypeId(self.entries.len() as u32);
                self.entries.push(descriptor.clone());
                self.ids.insert(descriptor, id);
                id
            }
        }
    }

    pub fn get(&self, id: TypeId) -> &TypeDescriptor {
        &self.entries[id.to_usize()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeDescriptor)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, descriptor)| (TypeId(index as u32), descriptor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render a descriptor back to surface syntax, for the type table dump.
    pub fn name(&self, id: TypeId) -> String {
        let descriptor = self.get(id);
        let base = match &descriptor.kind {
            DescriptorKind::Void => "void".to_owned(),
            DescriptorKind::Bool => "bool".to_owned(),
            DescriptorKind::Int32 => "int32_t".to_owned(),
            DescriptorKind::Int64 => "int64_t".to_owned(),
            DescriptorKind::Float32 => "float".to_owned(),
            DescriptorKind::Float64 => "double".to_owned(),
            DescriptorKind::String => "string_t".to_owned(),
            DescriptorKind::Enum(name) | DescriptorKind::Interface(name) => name.clone(),
            DescriptorKind::Array(element) => format!("{}[]", self.name(*element)),
            DescriptorKind::Dict(key, value) => {
                format!("dict<{}, {}>", self.name(*key), self.name(*value))
            }
            DescriptorKind::Set(element) => format!("set<{}>", self.name(*element)),
        };
        if descriptor.nullable {
            format!("{}?", base)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{lower, validation};
    use crate::files::FileId;
    use crate::surface;

    fn type_map(source: &str) -> (Module, TypeMap) {
        let file_id = FileId::try_from(1).unwrap();
        let surface = surface::Module::parse(file_id, source).unwrap();
        let mut module = lower::module(&surface);
        let messages = validation::validate(&mut module);
        assert!(messages.is_empty(), "unexpected messages: {:?}", messages);
        let map = TypeMap::of_module(&module);
        (module, map)
    }

    #[test]
    fn ownership_classes() {
        let (_, map) = type_map(
            r#"
            namespace Test {
                enum Color : int32_t { Red = 1, }
                interface IThing {
                    bool Flag;
                    string_t Label;
                    Color Tint;
                    int32_t[] Sizes;
                    dict<string_t, IThing> Children;
                    set<int64_t> Ids;
                }
            }
            "#,
        );
        let ownerships: Vec<(String, Ownership)> = map
            .iter()
            .map(|(id, descriptor)| (map.name(id), descriptor.ownership()))
            .collect();
        let of = |name: &str| {
            ownerships
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, ownership)| *ownership)
        };
        assert_eq!(of("bool"), Some(Ownership::Value));
        assert_eq!(of("Color"), Some(Ownership::Value));
        assert_eq!(of("string_t"), Some(Ownership::RefCounted));
        assert_eq!(of("int32_t[]"), Some(Ownership::RefCounted));
        assert_eq!(of("dict<string_t, IThing>"), Some(Ownership::RefCounted));
        assert_eq!(of("set<int64_t>"), Some(Ownership::RefCounted));
    }

    #[test]
    fn structural_interning_deduplicates() {
        let (_, map) = type_map(
            r#"
            namespace Test {
                interface IThing {
                    string_t[] A;
                    string_t[] B;
                    string_t[] Copy();
                }
            }
            "#,
        );
        // One entry for `string_t`, one for `string_t[]`.
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn typedefs_expand_transparently() {
        let (_, map) = type_map(
            r#"
            namespace Test {
                typedef string_t[] StringList;
                interface IThing {
                    StringList Names;
                    string_t[] Extra;
                }
            }
            "#,
        );
        assert_eq!(map.len(), 2);
        let names: Vec<String> = map.iter().map(|(id, _)| map.name(id)).collect();
        assert!(names.contains(&"string_t[]".to_owned()));
        assert!(!names.iter().any(|name| name.contains("StringList")));
    }

    #[test]
    fn nullable_scalars_stay_by_value() {
        let (_, map) = type_map(
            r#"
            namespace Test {
                interface IThing {
                    int32_t? MaybeCount;
                    string_t? MaybeLabel;
                }
            }
            "#,
        );
        let of = |wanted: &str| {
            map.iter()
                .find(|(id, _)| map.name(*id) == wanted)
                .map(|(_, descriptor)| descriptor.ownership())
        };
        assert_eq!(of("int32_t?"), Some(Ownership::Value));
        assert_eq!(of("string_t?"), Some(Ownership::RefCounted));
    }
}
