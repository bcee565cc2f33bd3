//! Typed abstract syntax tree for MinimIDL compilation units.
//!
//! The AST is built once per compilation unit by [`lower`], mutated only by
//! [`validation`] (which attaches resolved type references and resolved
//! constant values in place), and is immutable afterwards. Every node derives
//! `Serialize`/`Deserialize` so that a validated tree can round-trip through
//! the [AST cache](crate::cache) without re-parsing or re-validating.
//!
//! Named types are lightweight handles: a [`Type::Named`] node stores the
//! written name plus an optional [`NamedTarget`] index into the module,
//! never an owned copy of the definition it points at. This is what lets two
//! interfaces reference each other through forward declarations without
//! creating an ownership cycle.

use serde::{Deserialize, Serialize};

use crate::source::ByteRange;

pub mod eval;
pub mod lower;
pub mod validation;

/// Root node for one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub namespaces: Vec<Namespace>,
}

/// A `namespace Name { ... }` block.
///
/// Members are kept in one ordered list: declaration order is significant
/// for constant evaluation, and backends rely on it for stable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub range: ByteRange,
    pub name: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Forward(ForwardDecl),
    Interface(Interface),
    Enum(Enum),
    Typedef(Typedef),
    Const(Const),
}

impl Item {
    /// The name this item introduces into its namespace.
    pub fn name(&self) -> &str {
        match self {
            Item::Forward(forward) => &forward.name,
            Item::Interface(interface) => &interface.name,
            Item::Enum(r#enum) => &r#enum.name,
            Item::Typedef(typedef) => &typedef.name,
            Item::Const(r#const) => &r#const.name,
        }
    }

    pub fn range(&self) -> ByteRange {
        match self {
            Item::Forward(forward) => forward.range,
            Item::Interface(interface) => interface.range,
            Item::Enum(r#enum) => r#enum.range,
            Item::Typedef(typedef) => typedef.range,
            Item::Const(r#const) => r#const.range,
        }
    }
}

/// A name-only `interface Name;` declaration, completed elsewhere in the
/// namespace by a full [`Interface`] definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardDecl {
    pub range: ByteRange,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub range: ByteRange,
    pub name: String,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub range: ByteRange,
    pub name: String,
    pub r#type: Type,
    /// Read-only properties generate only an accessor; writable properties
    /// generate an accessor and a mutator.
    pub writable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub range: ByteRange,
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub range: ByteRange,
    pub name: String,
    pub r#type: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
    pub range: ByteRange,
    pub name: String,
    pub backing: IntType,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub range: ByteRange,
    pub name: String,
    pub expr: Expr,
    /// Attached by validation. Repeated values are legal (bit-flag aliases).
    pub value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typedef {
    pub range: ByteRange,
    pub name: String,
    pub r#type: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Const {
    pub range: ByteRange,
    pub name: String,
    pub backing: IntType,
    pub expr: Expr,
    /// Attached by validation.
    pub value: Option<i64>,
}

/// Integer backing widths for enums and constants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntType {
    Int32,
    Int64,
}

impl IntType {
    pub fn name(&self) -> &'static str {
        match self {
            IntType::Int32 => "int32_t",
            IntType::Int64 => "int64_t",
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            IntType::Int32 => 32,
            IntType::Int64 => 64,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prim {
    Void,
    Bool,
    Int32,
    Int64,
    Float,
    Double,
}

impl Prim {
    pub fn name(&self) -> &'static str {
        match self {
            Prim::Void => "void",
            Prim::Bool => "bool",
            Prim::Int32 => "int32_t",
            Prim::Int64 => "int64_t",
            Prim::Float => "float",
            Prim::Double => "double",
        }
    }
}

/// The kind of namespace member a [`Type::Named`] resolved to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKind {
    Interface,
    Enum,
    Typedef,
}

impl NamedKind {
    pub fn description(&self) -> &'static str {
        match self {
            NamedKind::Interface => "an interface",
            NamedKind::Enum => "an enum",
            NamedKind::Typedef => "a typedef",
        }
    }
}

/// Back-reference from a [`Type::Named`] node to the namespace member it
/// resolved to: indices into `module.namespaces[..].items[..]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedTarget {
    pub namespace: usize,
    pub item: usize,
    pub kind: NamedKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Type {
    Prim {
        range: ByteRange,
        prim: Prim,
    },
    String {
        range: ByteRange,
    },
    /// Reference to an interface, enum, or typedef in the same namespace.
    /// `target` is attached during validation.
    Named {
        range: ByteRange,
        name: String,
        target: Option<NamedTarget>,
    },
    Array {
        range: ByteRange,
        element: Box<Type>,
    },
    Dict {
        range: ByteRange,
        key: Box<Type>,
        value: Box<Type>,
    },
    Set {
        range: ByteRange,
        element: Box<Type>,
    },
    Nullable {
        range: ByteRange,
        inner: Box<Type>,
    },
}

impl Type {
    pub fn range(&self) -> ByteRange {
        match self {
            Type::Prim { range, .. }
            | Type::String { range }
            | Type::Named { range, .. }
            | Type::Array { range, .. }
            | Type::Dict { range, .. }
            | Type::Set { range, .. }
            | Type::Nullable { range, .. } => *range,
        }
    }
}

/// How a number literal was written in the source, so that backends can
/// reproduce the spelling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntStyle {
    Decimal,
    Hex,
    Binary,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnOp {
    /// `+`
    Pos,
    /// `-`
    Neg,
    /// `~`
    BitNot,
}

impl UnOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnOp::Pos => "+",
            UnOp::Neg => "-",
            UnOp::BitNot => "~",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    BitOr,
    BitAnd,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::BitOr => "|",
            BinOp::BitAnd => "&",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }
}

/// Compile-time integer expressions, used by enum members and constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Number {
        range: ByteRange,
        value: i64,
        style: IntStyle,
    },
    /// Reference to a previously-declared constant or enum member.
    Name {
        range: ByteRange,
        name: String,
    },
    Unary {
        range: ByteRange,
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        range: ByteRange,
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn range(&self) -> ByteRange {
        match self {
            Expr::Number { range, .. }
            | Expr::Name { range, .. }
            | Expr::Unary { range, .. }
            | Expr::Binary { range, .. } => *range,
        }
    }
}

impl Module {
    /// Follow typedef aliases until a non-typedef type is reached.
    ///
    /// Expansion is transparent: a typedef is not a distinct nominal type.
    /// The fuel bound keeps this total on unvalidated trees; validation
    /// rejects typedef cycles, so on a validated module it never runs out.
    pub fn resolve_alias<'a>(&'a self, r#type: &'a Type) -> &'a Type {
        let mut current = r#type;
        let mut fuel: u32 = 256;
        while fuel > 0 {
            match current {
                Type::Named {
                    target:
                        Some(NamedTarget {
                            namespace,
                            item,
                            kind: NamedKind::Typedef,
                        }),
                    ..
                } => match &self.namespaces[*namespace].items[*item] {
                    Item::Typedef(typedef) => {
                        current = &typedef.r#type;
                        fuel -= 1;
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        current
    }
}
