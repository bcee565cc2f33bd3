//! Semantic error messages and their rendering as diagnostics.

use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::files::FileId;
use crate::source::ByteRange;

/// A semantic error found during validation.
///
/// Unlike syntax errors, semantic errors are batched: validation keeps going
/// after the first error so that one run reports everything it can.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    DuplicateDefinition {
        name: String,
        original_range: ByteRange,
        duplicate_range: ByteRange,
    },
    UnresolvedForwardDeclaration {
        name: String,
        range: ByteRange,
    },
    UnknownType {
        name: String,
        range: ByteRange,
        suggestion: Option<String>,
    },
    /// A name resolved to something that cannot be used as a type, for
    /// example a constant.
    NotAType {
        name: String,
        kind: &'static str,
        range: ByteRange,
    },
    CyclicTypedef {
        name: String,
        range: ByteRange,
    },
    InvalidKeyType {
        found: String,
        range: ByteRange,
    },
    InvalidNullability {
        range: ByteRange,
    },
    InvalidVoidType {
        range: ByteRange,
    },
    DuplicateMember {
        interface: String,
        name: String,
        original_range: ByteRange,
        duplicate_range: ByteRange,
    },
    DuplicateParameter {
        name: String,
        original_range: ByteRange,
        duplicate_range: ByteRange,
    },
    UnresolvedReference {
        name: String,
        range: ByteRange,
    },
    /// A constant expression referenced a declaration with no integer value.
    TypeMismatch {
        name: String,
        kind: &'static str,
        range: ByteRange,
    },
    DivisionByZero {
        range: ByteRange,
    },
}

impl Message {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Message::DuplicateDefinition {
                name,
                original_range,
                duplicate_range,
            } => Diagnostic::error()
                .with_message(format!("duplicate definition of `{}`", name))
                .with_labels(vec![
                    Label::primary(duplicate_range.file_id(), *duplicate_range)
                        .with_message("redefined here"),
                    Label::secondary(original_range.file_id(), *original_range)
                        .with_message("previous definition"),
                ]),
            Message::UnresolvedForwardDeclaration { name, range } => Diagnostic::error()
                .with_message(format!(
                    "interface `{}` is forward-declared but never defined",
                    name,
                ))
                .with_labels(vec![Label::primary(range.file_id(), *range)
                    .with_message("forward declaration here")]),
            Message::UnknownType {
                name,
                range,
                suggestion,
            } => {
                let diagnostic = Diagnostic::error()
                    .with_message(format!("unknown type `{}`", name))
                    .with_labels(vec![Label::primary(range.file_id(), *range)]);
                match suggestion {
                    Some(suggestion) => {
                        diagnostic.with_notes(vec![format!("did you mean `{}`?", suggestion)])
                    }
                    None => diagnostic,
                }
            }
            Message::NotAType { name, kind, range } => Diagnostic::error()
                .with_message(format!("`{}` is {}, not a type", name, kind))
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
            Message::CyclicTypedef { name, range } => Diagnostic::error()
                .with_message(format!("typedef `{}` refers to itself", name))
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
            Message::InvalidKeyType { found, range } => Diagnostic::error()
                .with_message("invalid dictionary key type")
                .with_labels(vec![
                    Label::primary(range.file_id(), *range).with_message(format!("found {}", found))
                ])
                .with_notes(vec![
                    "dictionary keys must be booleans, integers, floats, or strings".to_owned(),
                ]),
            Message::InvalidNullability { range } => Diagnostic::error()
                .with_message("type is already nullable")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
            Message::InvalidVoidType { range } => Diagnostic::error()
                .with_message("`void` is only valid as a method return type")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
            Message::DuplicateMember {
                interface,
                name,
                original_range,
                duplicate_range,
            } => Diagnostic::error()
                .with_message(format!(
                    "duplicate member `{}` in interface `{}`",
                    name, interface,
                ))
                .with_labels(vec![
                    Label::primary(duplicate_range.file_id(), *duplicate_range)
                        .with_message("redeclared here"),
                    Label::secondary(original_range.file_id(), *original_range)
                        .with_message("previous declaration"),
                ]),
            Message::DuplicateParameter {
                name,
                original_range,
                duplicate_range,
            } => Diagnostic::error()
                .with_message(format!("duplicate parameter `{}`", name))
                .with_labels(vec![
                    Label::primary(duplicate_range.file_id(), *duplicate_range)
                        .with_message("redeclared here"),
                    Label::secondary(original_range.file_id(), *original_range)
                        .with_message("previous declaration"),
                ]),
            Message::UnresolvedReference { name, range } => Diagnostic::error()
                .with_message(format!("cannot find `{}` in this scope", name))
                .with_labels(vec![Label::primary(range.file_id(), *range)])
                .with_notes(vec![
                    "constants can only refer to constants and enum members declared earlier"
                        .to_owned(),
                ]),
            Message::TypeMismatch { name, kind, range } => Diagnostic::error()
                .with_message(format!(
                    "`{}` is {} and has no constant value",
                    name, kind,
                ))
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
            Message::DivisionByZero { range } => Diagnostic::error()
                .with_message("division by zero in constant expression")
                .with_labels(vec![Label::primary(range.file_id(), *range)]),
        }
    }
}
