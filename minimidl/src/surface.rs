//! Surface language: the concrete syntax tree produced by the parser.
//!
//! Surface nodes mirror the grammar as written, including parenthesized
//! expressions. [`crate::ast::lower`] turns this into the typed AST.

pub(crate) mod lexer;
mod parser;

pub use parser::Error;

use crate::ast::{BinOp, IntStyle, IntType, Prim, UnOp};
use crate::files::FileId;
use crate::source::ByteRange;

/// One compilation unit.
#[derive(Debug, Clone)]
pub struct Module {
    pub namespaces: Vec<Namespace>,
}

impl Module {
    /// Parse a compilation unit from the `source` string.
    ///
    /// Syntax errors are unrecoverable per unit: parsing stops at the first
    /// error and no partial tree is produced.
    pub fn parse(file_id: FileId, source: &str) -> Result<Module, Error> {
        parser::parse_module(file_id, source)
    }
}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub range: ByteRange,
    pub name: (ByteRange, String),
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub enum Item {
    /// `interface Name;`
    Forward {
        range: ByteRange,
        name: (ByteRange, String),
    },
    /// `interface Name { ... }`
    Interface {
        range: ByteRange,
        name: (ByteRange, String),
        members: Vec<Member>,
    },
    /// `enum Name : int32_t { ... }`
    Enum {
        range: ByteRange,
        name: (ByteRange, String),
        backing: IntType,
        members: Vec<EnumMember>,
    },
    /// `typedef Type Name;`
    Typedef {
        range: ByteRange,
        name: (ByteRange, String),
        r#type: Type,
    },
    /// `const int32_t NAME = expr;`
    Const {
        range: ByteRange,
        name: (ByteRange, String),
        backing: IntType,
        expr: Expr,
    },
}

#[derive(Debug, Clone)]
pub enum Member {
    Property {
        range: ByteRange,
        name: (ByteRange, String),
        r#type: Type,
        writable: bool,
    },
    Method {
        range: ByteRange,
        name: (ByteRange, String),
        return_type: Type,
        params: Vec<Param>,
    },
}

#[derive(Debug, Clone)]
pub struct Param {
    pub range: ByteRange,
    pub name: (ByteRange, String),
    pub r#type: Type,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub range: ByteRange,
    pub name: (ByteRange, String),
    pub expr: Expr,
}

/// Type expressions as written.
///
/// The grammar is deliberately permissive about type shapes: nested
/// nullables, dictionary keys of any type, and nested arrays all parse here
/// so that the validator can batch-report shape errors with good spans.
#[derive(Debug, Clone)]
pub enum Type {
    Prim(ByteRange, Prim),
    String(ByteRange),
    Named(ByteRange, String),
    Array(ByteRange, Box<Type>),
    Dict(ByteRange, Box<Type>, Box<Type>),
    Set(ByteRange, Box<Type>),
    Nullable(ByteRange, Box<Type>),
}

impl Type {
    pub fn range(&self) -> ByteRange {
        match self {
            Type::Prim(range, _)
            | Type::String(range)
            | Type::Named(range, _)
            | Type::Array(range, _)
            | Type::Dict(range, _, _)
            | Type::Set(range, _)
            | Type::Nullable(range, _) => *range,
        }
    }
}

/// Constant expressions as written.
#[derive(Debug, Clone)]
pub enum Expr {
    Number(ByteRange, i64, IntStyle),
    Name(ByteRange, String),
    Paren(ByteRange, Box<Expr>),
    Unary(ByteRange, UnOp, Box<Expr>),
    Binary(ByteRange, BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn range(&self) -> ByteRange {
        match self {
            Expr::Number(range, _, _)
            | Expr::Name(range, _)
            | Expr::Paren(range, _)
            | Expr::Unary(range, _, _)
            | Expr::Binary(range, _, _, _) => *range,
        }
    }
}
