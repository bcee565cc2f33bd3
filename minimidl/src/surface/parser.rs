//! Recursive-descent parser for the IDL grammar.
//!
//! The grammar is LL(1) over the token stream, with two wrinkles:
//!
//! - a `>>` token may close two angle brackets (`dict<string_t,
//!   set<int32_t>>`), so the parser can split one into two `>`s;
//! - types and expressions carry an explicit depth budget, charged for
//!   written nesting and also for every suffix or binary operator applied,
//!   since flat chains like `1 | 1 | ...` build trees just as deep as
//!   parenthesized ones. Later passes (and `Drop`) recurse over the tree,
//!   so pathological input must fail here with a diagnostic instead of
//!   exhausting the call stack.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use itertools::Itertools;

use crate::ast::{BinOp, IntStyle, IntType, Prim, UnOp};
use crate::files::FileId;
use crate::source::{BytePos, ByteRange};
use crate::surface::lexer::{self, Token};
use crate::surface::{EnumMember, Expr, Item, Member, Module, Namespace, Param, Type};

const MAX_NESTING: u32 = 128;

#[derive(Clone, Debug)]
pub enum Error {
    UnexpectedCharacter {
        range: ByteRange,
    },
    UnexpectedToken {
        range: ByteRange,
        found: &'static str,
        expected: &'static [&'static str],
    },
    UnexpectedEof {
        range: ByteRange,
        expected: &'static [&'static str],
    },
    InvalidNumber {
        range: ByteRange,
        literal: String,
    },
    KeywordAsName {
        range: ByteRange,
        keyword: &'static str,
    },
    NestingTooDeep {
        range: ByteRange,
    },
}

impl From<lexer::Error> for Error {
    fn from(error: lexer::Error) -> Error {
        match error {
            lexer::Error::UnexpectedCharacter { range } => Error::UnexpectedCharacter { range },
        }
    }
}

impl Error {
    pub fn range(&self) -> ByteRange {
        match self {
            Error::UnexpectedCharacter { range }
            | Error::UnexpectedToken { range, .. }
            | Error::UnexpectedEof { range, .. }
            | Error::InvalidNumber { range, .. }
            | Error::KeywordAsName { range, .. }
            | Error::NestingTooDeep { range } => *range,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        let range = self.range();
        let label = Label::primary(range.file_id(), range);
        match self {
            Error::UnexpectedCharacter { .. } => Diagnostic::error()
                .with_message("unexpected character")
                .with_labels(vec![label]),
            Error::UnexpectedToken {
                found, expected, ..
            } => Diagnostic::error()
                .with_message(format!("unexpected token `{found}`"))
                .with_labels(vec![
                    label.with_message(format!("expected {}", expected.iter().format(" or ")))
                ]),
            Error::UnexpectedEof { expected, .. } => Diagnostic::error()
                .with_message("unexpected end of file")
                .with_labels(vec![
                    label.with_message(format!("expected {}", expected.iter().format(" or ")))
                ]),
            Error::InvalidNumber { literal, .. } => Diagnostic::error()
                .with_message(format!("invalid number literal `{literal}`"))
                .with_labels(vec![label])
                .with_notes(vec![
                    "number literals are decimal, hexadecimal (`0x`), or binary (`0b`)"
                        .to_owned(),
                ]),
            Error::KeywordAsName { keyword, .. } => Diagnostic::error()
                .with_message(format!("expected a name, found keyword `{keyword}`"))
                .with_labels(vec![label])
                .with_notes(vec![format!(
                    "`{keyword}` is reserved and cannot be used as a name"
                )]),
            Error::NestingTooDeep { .. } => Diagnostic::error()
                .with_message("nesting too deep")
                .with_labels(vec![label])
                .with_notes(vec![format!(
                    "types and constant expressions may nest at most {MAX_NESTING} levels"
                )]),
        }
    }
}

pub fn parse_module(file_id: FileId, source: &str) -> Result<Module, Error> {
    let mut tokens = Vec::new();
    for token in lexer::tokens(file_id, source) {
        tokens.push(token?);
    }
    Parser {
        file_id,
        tokens,
        pos: 0,
        eof: source.len() as BytePos,
        split_shift: false,
    }
    .module()
}

struct Parser<'source> {
    file_id: FileId,
    tokens: Vec<lexer::Spanned<Token<'source>>>,
    pos: usize,
    eof: BytePos,
    /// Set when the first half of a `>>` token has been consumed as a `>`.
    split_shift: bool,
}

impl<'source> Parser<'source> {
    fn peek(&self) -> Option<Token<'source>> {
        if self.split_shift {
            return Some(Token::Greater);
        }
        self.tokens.get(self.pos).map(|(_, token, _)| *token)
    }

    fn advance(&mut self) -> Option<(BytePos, Token<'source>, BytePos)> {
        if self.split_shift {
            self.split_shift = false;
            let (start, _, end) = self.tokens[self.pos];
            self.pos += 1;
            return Some((start + 1, Token::Greater, end));
        }
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn range(&self, start: BytePos, end: BytePos) -> ByteRange {
        ByteRange::new(self.file_id, start, end)
    }

    /// The range of the next token, or a zero-width range at end of file.
    fn next_range(&self) -> ByteRange {
        match self.tokens.get(self.pos) {
            Some((start, _, end)) if self.split_shift => self.range(*start + 1, *end),
            Some((start, _, end)) => self.range(*start, *end),
            None => self.range(self.eof, self.eof),
        }
    }

    fn error_expected(&self, expected: &'static [&'static str]) -> Error {
        match self.peek() {
            Some(token) => Error::UnexpectedToken {
                range: self.next_range(),
                found: token.description(),
                expected,
            },
            None => Error::UnexpectedEof {
                range: self.next_range(),
                expected,
            },
        }
    }

    fn eat(&mut self, token: Token<'source>) -> Option<ByteRange> {
        if self.peek() == Some(token) {
            let (start, _, end) = self.advance().unwrap();
            Some(self.range(start, end))
        } else {
            None
        }
    }

    fn expect(
        &mut self,
        token: Token<'source>,
        expected: &'static [&'static str],
    ) -> Result<ByteRange, Error> {
        self.eat(token).ok_or_else(|| self.error_expected(expected))
    }

    fn expect_name(&mut self) -> Result<(ByteRange, String), Error> {
        match self.peek() {
            Some(Token::Name(name)) => {
                let (start, _, end) = self.advance().unwrap();
                Ok((self.range(start, end), name.to_owned()))
            }
            Some(token) if lexer::is_keyword(token.description()) => Err(Error::KeywordAsName {
                range: self.next_range(),
                keyword: token.description(),
            }),
            _ => Err(self.error_expected(&["a name"])),
        }
    }

    /// Expect a `>`, splitting a `>>` token in half if necessary.
    fn expect_greater(&mut self) -> Result<ByteRange, Error> {
        match self.peek() {
            Some(Token::Greater) => {
                let (start, _, end) = self.advance().unwrap();
                Ok(self.range(start, end))
            }
            Some(Token::GreaterGreater) => {
                let (start, _, _) = self.tokens[self.pos];
                self.split_shift = true;
                Ok(self.range(start, start + 1))
            }
            _ => Err(self.error_expected(&["`>`"])),
        }
    }

    fn module(mut self) -> Result<Module, Error> {
        let mut namespaces = Vec::new();
        while self.peek().is_some() {
            namespaces.push(self.namespace()?);
        }
        Ok(Module { namespaces })
    }

    fn namespace(&mut self) -> Result<Namespace, Error> {
        let start = self.expect(Token::KeywordNamespace, &["`namespace`"])?;
        let name = self.expect_name()?;
        self.expect(Token::OpenBrace, &["`{`"])?;
        let mut items = Vec::new();
        let end = loop {
            if let Some(end) = self.eat(Token::CloseBrace) {
                break end;
            }
            items.push(self.item()?);
        };
        Ok(Namespace {
            range: start.merge(&end),
            name,
            items,
        })
    }

    fn item(&mut self) -> Result<Item, Error> {
        match self.peek() {
            Some(Token::KeywordInterface) => self.interface_or_forward(),
            Some(Token::KeywordEnum) => self.enum_decl(),
            Some(Token::KeywordTypedef) => self.typedef_decl(),
            Some(Token::KeywordConst) => self.const_decl(),
            _ => Err(self.error_expected(&[
                "`interface`",
                "`enum`",
                "`typedef`",
                "`const`",
                "`}`",
            ])),
        }
    }

    fn interface_or_forward(&mut self) -> Result<Item, Error> {
        let start = self.expect(Token::KeywordInterface, &["`interface`"])?;
        let name = self.expect_name()?;
        if let Some(end) = self.eat(Token::Semicolon) {
            return Ok(Item::Forward {
                range: start.merge(&end),
                name,
            });
        }
        self.expect(Token::OpenBrace, &["`{`", "`;`"])?;
        let mut members = Vec::new();
        let end = loop {
            if let Some(end) = self.eat(Token::CloseBrace) {
                break end;
            }
            members.push(self.member()?);
        };
        Ok(Item::Interface {
            range: start.merge(&end),
            name,
            members,
        })
    }

    /// Parse one interface member. Methods and properties both start with
    /// `type Name`, so the decision is made on the token that follows.
    fn member(&mut self) -> Result<Member, Error> {
        let r#type = self.r#type(0)?;
        let name = self.expect_name()?;
        if self.eat(Token::OpenParen).is_some() {
            let mut params = Vec::new();
            if self.peek() != Some(Token::CloseParen) {
                loop {
                    params.push(self.param()?);
                    if self.eat(Token::Comma).is_none() {
                        break;
                    }
                }
            }
            self.expect(Token::CloseParen, &["`)`", "`,`"])?;
            let end = self.expect(Token::Semicolon, &["`;`"])?;
            Ok(Member::Method {
                range: r#type.range().merge(&end),
                name,
                return_type: r#type,
                params,
            })
        } else {
            let writable = self.eat(Token::KeywordWritable).is_some();
            let end = match writable {
                true => self.expect(Token::Semicolon, &["`;`"])?,
                false => self.expect(Token::Semicolon, &["`;`", "`writable`", "`(`"])?,
            };
            Ok(Member::Property {
                range: r#type.range().merge(&end),
                name,
                r#type,
                writable,
            })
        }
    }

    fn param(&mut self) -> Result<Param, Error> {
        let r#type = self.r#type(0)?;
        let name = self.expect_name()?;
        Ok(Param {
            range: r#type.range().merge(&name.0),
            name,
            r#type,
        })
    }

    fn enum_decl(&mut self) -> Result<Item, Error> {
        let start = self.expect(Token::KeywordEnum, &["`enum`"])?;
        let name = self.expect_name()?;
        self.expect(Token::Colon, &["`:`"])?;
        let backing = self.backing_type()?;
        self.expect(Token::OpenBrace, &["`{`"])?;
        let mut members = Vec::new();
        let end = loop {
            if let Some(end) = self.eat(Token::CloseBrace) {
                break end;
            }
            let member_name = self.expect_name()?;
            self.expect(Token::Equals, &["`=`"])?;
            let expr = self.expr(0)?;
            members.push(EnumMember {
                range: member_name.0.merge(&expr.range()),
                name: member_name,
                expr,
            });
            if self.eat(Token::Comma).is_none() {
                break self.expect(Token::CloseBrace, &["`,`", "`}`"])?;
            }
        };
        Ok(Item::Enum {
            range: start.merge(&end),
            name,
            backing,
            members,
        })
    }

    fn typedef_decl(&mut self) -> Result<Item, Error> {
        let start = self.expect(Token::KeywordTypedef, &["`typedef`"])?;
        let r#type = self.r#type(0)?;
        let name = self.expect_name()?;
        let end = self.expect(Token::Semicolon, &["`;`"])?;
        Ok(Item::Typedef {
            range: start.merge(&end),
            name,
            r#type,
        })
    }

    fn const_decl(&mut self) -> Result<Item, Error> {
        let start = self.expect(Token::KeywordConst, &["`const`"])?;
        let backing = self.backing_type()?;
        let name = self.expect_name()?;
        self.expect(Token::Equals, &["`=`"])?;
        let expr = self.expr(0)?;
        let end = self.expect(Token::Semicolon, &["`;`"])?;
        Ok(Item::Const {
            range: start.merge(&end),
            name,
            backing,
            expr,
        })
    }

    /// Enums and constants are backed by 32- or 64-bit signed integers only.
    fn backing_type(&mut self) -> Result<IntType, Error> {
        match self.peek() {
            Some(Token::KeywordInt32) => {
                self.advance();
                Ok(IntType::Int32)
            }
            Some(Token::KeywordInt64) => {
                self.advance();
                Ok(IntType::Int64)
            }
            _ => Err(self.error_expected(&["`int32_t`", "`int64_t`"])),
        }
    }

    /// Charge one level of the nesting budget.
    fn deepen(&self, depth: u32) -> Result<u32, Error> {
        if depth >= MAX_NESTING {
            return Err(Error::NestingTooDeep {
                range: self.next_range(),
            });
        }
        Ok(depth + 1)
    }

    fn r#type(&mut self, mut depth: u32) -> Result<Type, Error> {
        if depth >= MAX_NESTING {
            return Err(Error::NestingTooDeep {
                range: self.next_range(),
            });
        }
        let mut r#type = self.base_type(depth)?;
        loop {
            if self.eat(Token::OpenBracket).is_some() {
                depth = self.deepen(depth)?;
                let end = self.expect(Token::CloseBracket, &["`]`"])?;
                r#type = Type::Array(r#type.range().merge(&end), Box::new(r#type));
            } else if let Some(end) = self.eat(Token::Question) {
                depth = self.deepen(depth)?;
                r#type = Type::Nullable(r#type.range().merge(&end), Box::new(r#type));
            } else {
                break;
            }
        }
        Ok(r#type)
    }

    fn base_type(&mut self, depth: u32) -> Result<Type, Error> {
        let prim = match self.peek() {
            Some(Token::KeywordVoid) => Some(Prim::Void),
            Some(Token::KeywordBool) => Some(Prim::Bool),
            Some(Token::KeywordInt32) => Some(Prim::Int32),
            Some(Token::KeywordInt64) => Some(Prim::Int64),
            Some(Token::KeywordFloat) => Some(Prim::Float),
            Some(Token::KeywordDouble) => Some(Prim::Double),
            _ => None,
        };
        if let Some(prim) = prim {
            let (start, _, end) = self.advance().unwrap();
            return Ok(Type::Prim(self.range(start, end), prim));
        }
        match self.peek() {
            Some(Token::KeywordString) => {
                let (start, _, end) = self.advance().unwrap();
                Ok(Type::String(self.range(start, end)))
            }
            Some(Token::Name(name)) => {
                let name = name.to_owned();
                let (start, _, end) = self.advance().unwrap();
                Ok(Type::Named(self.range(start, end), name))
            }
            Some(Token::KeywordDict) => {
                let start = self.eat(Token::KeywordDict).unwrap();
                self.expect(Token::Less, &["`<`"])?;
                let key = self.r#type(depth + 1)?;
                self.expect(Token::Comma, &["`,`"])?;
                let value = self.r#type(depth + 1)?;
                let end = self.expect_greater()?;
                Ok(Type::Dict(
                    start.merge(&end),
                    Box::new(key),
                    Box::new(value),
                ))
            }
            Some(Token::KeywordSet) => {
                let start = self.eat(Token::KeywordSet).unwrap();
                self.expect(Token::Less, &["`<`"])?;
                let element = self.r#type(depth + 1)?;
                let end = self.expect_greater()?;
                Ok(Type::Set(start.merge(&end), Box::new(element)))
            }
            _ => Err(self.error_expected(&["a type"])),
        }
    }

    fn expr(&mut self, depth: u32) -> Result<Expr, Error> {
        if depth >= MAX_NESTING {
            return Err(Error::NestingTooDeep {
                range: self.next_range(),
            });
        }
        self.or_expr(depth)
    }

    fn or_expr(&mut self, mut depth: u32) -> Result<Expr, Error> {
        let mut lhs = self.and_expr(depth)?;
        while self.eat(Token::Pipe).is_some() {
            depth = self.deepen(depth)?;
            let rhs = self.and_expr(depth)?;
            lhs = binary(BinOp::BitOr, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and_expr(&mut self, mut depth: u32) -> Result<Expr, Error> {
        let mut lhs = self.shift_expr(depth)?;
        while self.eat(Token::Amp).is_some() {
            depth = self.deepen(depth)?;
            let rhs = self.shift_expr(depth)?;
            lhs = binary(BinOp::BitAnd, lhs, rhs);
        }
        Ok(lhs)
    }

    fn shift_expr(&mut self, mut depth: u32) -> Result<Expr, Error> {
        let mut lhs = self.add_expr(depth)?;
        loop {
            let op = match self.peek() {
                Some(Token::LessLess) => BinOp::Shl,
                Some(Token::GreaterGreater) => BinOp::Shr,
                _ => break,
            };
            self.advance();
            depth = self.deepen(depth)?;
            let rhs = self.add_expr(depth)?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn add_expr(&mut self, mut depth: u32) -> Result<Expr, Error> {
        let mut lhs = self.mul_expr(depth)?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            depth = self.deepen(depth)?;
            let rhs = self.mul_expr(depth)?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn mul_expr(&mut self, mut depth: u32) -> Result<Expr, Error> {
        let mut lhs = self.unary_expr(depth)?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::ForwardSlash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => break,
            };
            self.advance();
            depth = self.deepen(depth)?;
            let rhs = self.unary_expr(depth)?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self, depth: u32) -> Result<Expr, Error> {
        if depth >= MAX_NESTING {
            return Err(Error::NestingTooDeep {
                range: self.next_range(),
            });
        }
        let op = match self.peek() {
            Some(Token::Plus) => Some(UnOp::Pos),
            Some(Token::Minus) => Some(UnOp::Neg),
            Some(Token::Tilde) => Some(UnOp::BitNot),
            _ => None,
        };
        match op {
            Some(op) => {
                let (start, _, end) = self.advance().unwrap();
                let operand = self.unary_expr(depth + 1)?;
                Ok(Expr::Unary(
                    self.range(start, end).merge(&operand.range()),
                    op,
                    Box::new(operand),
                ))
            }
            None => self.primary_expr(depth),
        }
    }

    fn primary_expr(&mut self, depth: u32) -> Result<Expr, Error> {
        match self.peek() {
            Some(Token::Number(literal)) => {
                let literal = literal.to_owned();
                let (start, _, end) = self.advance().unwrap();
                self.number(self.range(start, end), &literal)
            }
            Some(Token::Name(name)) => {
                let name = name.to_owned();
                let (start, _, end) = self.advance().unwrap();
                Ok(Expr::Name(self.range(start, end), name))
            }
            Some(Token::OpenParen) => {
                let start = self.eat(Token::OpenParen).unwrap();
                let expr = self.expr(depth + 1)?;
                let end = self.expect(Token::CloseParen, &["`)`"])?;
                Ok(Expr::Paren(start.merge(&end), Box::new(expr)))
            }
            _ => Err(self.error_expected(&["a number", "a name", "`(`"])),
        }
    }

    /// Decimal, `0x` hex, or `0b` binary; no octal, no floats. The value is
    /// stored as the two's-complement `i64` with the same bit pattern, and
    /// truncated to the backing width during evaluation.
    fn number(&self, range: ByteRange, literal: &str) -> Result<Expr, Error> {
        let (digits, radix, style) = if let Some(digits) =
            literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X"))
        {
            (digits, 16, IntStyle::Hex)
        } else if let Some(digits) =
            literal.strip_prefix("0b").or_else(|| literal.strip_prefix("0B"))
        {
            (digits, 2, IntStyle::Binary)
        } else {
            (literal, 10, IntStyle::Decimal)
        };
        match u64::from_str_radix(digits, radix) {
            Ok(value) => Ok(Expr::Number(range, value as i64, style)),
            Err(_) => Err(Error::InvalidNumber {
                range,
                literal: literal.to_owned(),
            }),
        }
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(
        lhs.range().merge(&rhs.range()),
        op,
        Box::new(lhs),
        Box::new(rhs),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Module, Error> {
        parse_module(FileId::try_from(1).unwrap(), source)
    }

    #[test]
    fn empty_namespace() {
        let module = parse("namespace Test {}").unwrap();
        assert_eq!(module.namespaces.len(), 1);
        assert_eq!(module.namespaces[0].name.1, "Test");
        assert!(module.namespaces[0].items.is_empty());
    }

    #[test]
    fn forward_and_full_interface() {
        let module = parse(
            "namespace Test {
                interface IForward;
                interface IUser {
                    IForward GetForward();
                }
            }",
        )
        .unwrap();
        let items = &module.namespaces[0].items;
        assert!(matches!(&items[0], Item::Forward { name, .. } if name.1 == "IForward"));
        assert!(matches!(&items[1], Item::Interface { members, .. } if members.len() == 1));
    }

    #[test]
    fn property_and_method_members() {
        let module = parse(
            "namespace Test {
                interface IConfig {
                    int32_t Count;
                    string_t Name writable;
                    bool Check(string_t name, int32_t limit);
                }
            }",
        )
        .unwrap();
        let items = &module.namespaces[0].items;
        let members = match &items[0] {
            Item::Interface { members, .. } => members,
            _ => panic!("expected an interface"),
        };
        assert!(matches!(
            &members[0],
            Member::Property { writable: false, .. }
        ));
        assert!(matches!(
            &members[1],
            Member::Property { writable: true, .. }
        ));
        assert!(matches!(&members[2], Member::Method { params, .. } if params.len() == 2));
    }

    #[test]
    fn nested_angle_brackets_split_shift_tokens() {
        let module = parse(
            "namespace Test {
                typedef dict<string_t, set<int32_t>> Index;
            }",
        )
        .unwrap();
        let items = &module.namespaces[0].items;
        let r#type = match &items[0] {
            Item::Typedef { r#type, .. } => r#type,
            _ => panic!("expected a typedef"),
        };
        match r#type {
            Type::Dict(_, _, value) => assert!(matches!(**value, Type::Set(_, _))),
            _ => panic!("expected a dict"),
        }
    }

    #[test]
    fn double_nullable_parses() {
        // Rejected by the validator, not the parser.
        let module = parse("namespace Test { typedef string_t?? Odd; }").unwrap();
        let r#type = match &module.namespaces[0].items[0] {
            Item::Typedef { r#type, .. } => r#type,
            _ => panic!("expected a typedef"),
        };
        assert!(matches!(r#type, Type::Nullable(_, inner)
            if matches!(**inner, Type::Nullable(_, _))));
    }

    #[test]
    fn enum_with_trailing_comma() {
        let module = parse(
            "namespace Test {
                enum Status : int32_t {
                    ACTIVE = 1,
                    INACTIVE = 2,
                }
            }",
        )
        .unwrap();
        let members = match &module.namespaces[0].items[0] {
            Item::Enum { members, .. } => members,
            _ => panic!("expected an enum"),
        };
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn number_literal_styles() {
        let module = parse(
            "namespace Test {
                const int32_t A = 100;
                const int32_t B = 0xFF;
                const int64_t C = 0b1010;
            }",
        )
        .unwrap();
        let exprs: Vec<_> = module.namespaces[0]
            .items
            .iter()
            .map(|item| match item {
                Item::Const { expr, .. } => expr.clone(),
                _ => panic!("expected a constant"),
            })
            .collect();
        assert!(matches!(exprs[0], Expr::Number(_, 100, IntStyle::Decimal)));
        assert!(matches!(exprs[1], Expr::Number(_, 0xFF, IntStyle::Hex)));
        assert!(matches!(exprs[2], Expr::Number(_, 0b1010, IntStyle::Binary)));
    }

    #[test]
    fn invalid_number_literal() {
        let error = parse("namespace Test { const int32_t A = 0xGG; }").unwrap_err();
        assert!(matches!(error, Error::InvalidNumber { .. }));
    }

    #[test]
    fn expression_precedence() {
        // `1 | 2 & 3 << 1 + 2 * 3` parses as `1 | (2 & (3 << (1 + (2 * 3))))`.
        let module = parse("namespace Test { const int32_t X = 1 | 2 & 3 << 1 + 2 * 3; }").unwrap();
        let expr = match &module.namespaces[0].items[0] {
            Item::Const { expr, .. } => expr,
            _ => panic!("expected a constant"),
        };
        let (op, rhs) = match expr {
            Expr::Binary(_, op, _, rhs) => (op, rhs),
            _ => panic!("expected a binary expression"),
        };
        assert_eq!(*op, BinOp::BitOr);
        assert!(matches!(**rhs, Expr::Binary(_, BinOp::BitAnd, _, _)));
    }

    #[test]
    fn missing_semicolon() {
        let error = parse(
            "namespace Test {
                interface ITest {
                    void Method()
                }
            }",
        )
        .unwrap_err();
        assert!(matches!(error, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn unclosed_namespace() {
        let error = parse("namespace Test { interface ITest {}").unwrap_err();
        assert!(matches!(error, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn nesting_limit() {
        let source = format!(
            "namespace Test {{ typedef {}int32_t{} Deep; }}",
            "set<".repeat(200),
            ">".repeat(200),
        );
        let error = parse(&source).unwrap_err();
        assert!(matches!(error, Error::NestingTooDeep { .. }));
    }

    #[test]
    fn flat_operator_chains_hit_the_nesting_limit() {
        // No written nesting, but each operator deepens the tree, and the
        // tree is recursed over after parsing.
        let source = format!(
            "namespace Test {{ const int64_t X = {}; }}",
            vec!["1"; 200_000].join(" | "),
        );
        let error = parse(&source).unwrap_err();
        assert!(matches!(error, Error::NestingTooDeep { .. }));
    }

    #[test]
    fn array_suffix_chains_hit_the_nesting_limit() {
        let source = format!(
            "namespace Test {{ typedef int32_t{} Deep; }}",
            "[]".repeat(200_000),
        );
        let error = parse(&source).unwrap_err();
        assert!(matches!(error, Error::NestingTooDeep { .. }));
    }

    #[test]
    fn long_but_reasonable_chains_parse() {
        let source = format!(
            "namespace Test {{ const int64_t X = {}; }}",
            vec!["1"; 100].join(" + "),
        );
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn keywords_cannot_name_declarations() {
        let error = parse("namespace Test { interface writable; }").unwrap_err();
        assert!(matches!(
            error,
            Error::KeywordAsName {
                keyword: "writable",
                ..
            }
        ));
    }
}
