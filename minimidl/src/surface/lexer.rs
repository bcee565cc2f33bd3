use codespan_reporting::diagnostic::{Diagnostic, Label};
use logos::Logos;

use crate::files::FileId;
use crate::source::{BytePos, ByteRange};

pub const KEYWORDS: &[&str] = &[
    "bool", "const", "dict", "double", "enum", "float", "int32_t", "int64_t", "interface",
    "namespace", "set", "string_t", "typedef", "void", "writable",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|keyword| word == *keyword)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Logos)]
#[logos(extras = FileId)]
pub enum Token<'source> {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name(&'source str),
    // A deliberately loose pattern: `0x`/`0b` prefixes and stray suffix
    // characters are all swallowed here and rejected by the parser, so that
    // `0xGG` reports an invalid literal rather than two confusing tokens.
    #[regex(r"[0-9][a-zA-Z0-9_]*")]
    Number(&'source str),

    #[token("bool")]
    KeywordBool,
    #[token("const")]
    KeywordConst,
    #[token("dict")]
    KeywordDict,
    #[token("double")]
    KeywordDouble,
    #[token("enum")]
    KeywordEnum,
    #[token("float")]
    KeywordFloat,
    #[token("int32_t")]
    KeywordInt32,
    #[token("int64_t")]
    KeywordInt64,
    #[token("interface")]
    KeywordInterface,
    #[token("namespace")]
    KeywordNamespace,
    #[token("set")]
    KeywordSet,
    #[token("string_t")]
    KeywordString,
    #[token("typedef")]
    KeywordTypedef,
    #[token("void")]
    KeywordVoid,
    #[token("writable")]
    KeywordWritable,

    #[token("&")]
    Amp,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[token("/")]
    ForwardSlash,
    #[token(">")]
    Greater,
    #[token(">>")]
    GreaterGreater,
    #[token("<")]
    Less,
    #[token("<<")]
    LessLess,
    #[token("-")]
    Minus,
    #[token("%")]
    Percent,
    #[token("|")]
    Pipe,
    #[token("+")]
    Plus,
    #[token("?")]
    Question,
    #[token(";")]
    Semicolon,
    #[token("*")]
    Star,
    #[token("~")]
    Tilde,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,

    #[error]
    #[regex(r"\p{Whitespace}", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    Error,
}

pub type Spanned<Tok> = (BytePos, Tok, BytePos);

#[derive(Clone, Debug)]
pub enum Error {
    UnexpectedCharacter { range: ByteRange },
}

impl Error {
    pub fn range(&self) -> ByteRange {
        match self {
            Error::UnexpectedCharacter { range } => *range,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Error::UnexpectedCharacter { range } => Diagnostic::error()
                .with_message("unexpected character")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
        }
    }
}

pub fn tokens(
    file_id: FileId,
    source: &str,
) -> impl Iterator<Item = Result<Spanned<Token<'_>>, Error>> {
    assert!(
        source.len() <= u32::MAX as usize,
        "`source` must be less than 4GiB in length"
    );

    Token::lexer_with_extras(source, file_id)
        .spanned()
        .map(move |(token, range)| {
            let start = range.start as BytePos;
            let end = range.end as BytePos;
            match token {
                Token::Error => Err(Error::UnexpectedCharacter {
                    range: ByteRange::new(file_id, start, end),
                }),
                token => Ok((start, token, end)),
            }
        })
}

impl<'source> Token<'source> {
    pub fn description(&self) -> &'static str {
        match self {
            Token::Name(_) => "name",
            Token::Number(_) => "number literal",
            Token::KeywordBool => "bool",
            Token::KeywordConst => "const",
            Token::KeywordDict => "dict",
            Token::KeywordDouble => "double",
            Token::KeywordEnum => "enum",
            Token::KeywordFloat => "float",
            Token::KeywordInt32 => "int32_t",
            Token::KeywordInt64 => "int64_t",
            Token::KeywordInterface => "interface",
            Token::KeywordNamespace => "namespace",
            Token::KeywordSet => "set",
            Token::KeywordString => "string_t",
            Token::KeywordTypedef => "typedef",
            Token::KeywordVoid => "void",
            Token::KeywordWritable => "writable",
            Token::Amp => "&",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Equals => "=",
            Token::ForwardSlash => "/",
            Token::Greater => ">",
            Token::GreaterGreater => ">>",
            Token::Less => "<",
            Token::LessLess => "<<",
            Token::Minus => "-",
            Token::Percent => "%",
            Token::Pipe => "|",
            Token::Plus => "+",
            Token::Question => "?",
            Token::Semicolon => ";",
            Token::Star => "*",
            Token::Tilde => "~",
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
            Token::OpenBracket => "[",
            Token::CloseBracket => "]",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Error => "error",
        }
    }
}
