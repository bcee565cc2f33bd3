//! Constant expression evaluation.
//!
//! Arithmetic follows two's-complement semantics at the declared backing
//! width: every intermediate result is truncated to the backing width before
//! the next operation, so `int32_t` constants wrap exactly like C `int32_t`
//! arithmetic would. Shift amounts are masked to the width, matching what
//! the generated code does on the target platforms.

use fxhash::FxHashMap;

use crate::ast::{BinOp, Expr, IntType, UnOp};
use crate::source::ByteRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The expression names something that is not in scope at this point in
    /// the compilation unit.
    Unresolved { range: ByteRange, name: String },
    /// The expression names a declaration that has no integer value.
    NotInteger {
        range: ByteRange,
        name: String,
        kind: &'static str,
    },
    DivisionByZero { range: ByteRange },
}

/// Names visible to a constant expression.
///
/// Evaluation scope is flat and ordered: constants and enum members enter
/// the scope as their declarations are validated, so an expression can only
/// see names declared textually before it. `kinds` remembers namespace
/// members that exist but carry no integer value, for better errors.
#[derive(Default)]
pub struct Scope {
    values: FxHashMap<String, i64>,
    kinds: FxHashMap<String, &'static str>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope::default()
    }

    /// Later definitions shadow earlier ones.
    pub fn define(&mut self, name: &str, value: i64) {
        self.values.insert(name.to_owned(), value);
    }

    /// Record a name that exists but is not an integer constant.
    pub fn define_kind(&mut self, name: &str, kind: &'static str) {
        self.kinds.insert(name.to_owned(), kind);
    }

    fn lookup(&self, range: ByteRange, name: &str) -> Result<i64, Error> {
        if let Some(value) = self.values.get(name) {
            return Ok(*value);
        }
        match self.kinds.get(name) {
            Some(kind) => Err(Error::NotInteger {
                range,
                name: name.to_owned(),
                kind,
            }),
            None => Err(Error::Unresolved {
                range,
                name: name.to_owned(),
            }),
        }
    }
}

fn truncate(value: i64, width: IntType) -> i64 {
    match width {
        IntType::Int32 => value as i32 as i64,
        IntType::Int64 => value,
    }
}

/// Evaluate `expr` at the given backing width.
pub fn eval(expr: &Expr, width: IntType, scope: &Scope) -> Result<i64, Error> {
    let value = match expr {
        Expr::Number { value, .. } => *value,
        Expr::Name { range, name } => scope.lookup(*range, name)?,
        Expr::Unary { op, operand, .. } => {
            let operand = eval(operand, width, scope)?;
            match op {
                UnOp::Pos => operand,
                UnOp::Neg => operand.wrapping_neg(),
                UnOp::BitNot => !operand,
            }
        }
        Expr::Binary {
            range,
            op,
            lhs,
            rhs,
        } => {
            let lhs = eval(lhs, width, scope)?;
            let rhs = eval(rhs, width, scope)?;
            match op {
                BinOp::BitOr => lhs | rhs,
                BinOp::BitAnd => lhs & rhs,
                BinOp::Shl => lhs << (rhs as u32 & (width.bits() - 1)),
                BinOp::Shr => lhs >> (rhs as u32 & (width.bits() - 1)),
                BinOp::Add => lhs.wrapping_add(rhs),
                BinOp::Sub => lhs.wrapping_sub(rhs),
                BinOp::Mul => lhs.wrapping_mul(rhs),
                BinOp::Div => {
                    if rhs == 0 {
                        return Err(Error::DivisionByZero { range: *range });
                    }
                    lhs.wrapping_div(rhs)
                }
                BinOp::Rem => {
                    if rhs == 0 {
                        return Err(Error::DivisionByZero { range: *range });
                    }
                    lhs.wrapping_rem(rhs)
                }
            }
        }
    };
    Ok(truncate(value, width))
}
