//! Versioned on-disk cache for validated modules.
//!
//! A cache file is a JSON document `{ "schema_version": N, "module": ... }`.
//! Reading probes `schema_version` before touching the module payload, so a
//! cache written by an incompatible build fails with [`Error::Version`]
//! instead of a confusing decode error. A decoded payload is then checked
//! structurally (resolved targets in bounds and of the right kind, constant
//! slots filled, alias chains terminating) so that a hand-edited cache is
//! rejected with [`Error::Invalid`] rather than crashing a consumer that
//! assumes a validated tree. Round-tripping a validated module is lossless,
//! including source spans and resolved constant values, and skips both the
//! parser and the validator.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ast::{Item, Module, NamedKind, NamedTarget, Type};

/// Bump on any change to the serialized shape of [`Module`].
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    schema_version: u32,
    module: &'a Module,
}

#[derive(Deserialize)]
struct OwnedEnvelope {
    #[allow(dead_code)]
    schema_version: u32,
    module: Module,
}

#[derive(Deserialize)]
struct VersionProbe {
    schema_version: u32,
}

#[derive(Debug)]
pub enum Error {
    /// The cache was written with a different schema version.
    Version { found: u32, expected: u32 },
    /// The payload decoded but does not describe a validated module.
    Invalid { detail: String },
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Version { found, expected } => write!(
                f,
                "cache schema version {} does not match expected version {}",
                found, expected,
            ),
            Error::Invalid { detail } => write!(f, "invalid cache: {}", detail),
            Error::Json(error) => write!(f, "malformed cache: {}", error),
            Error::Io(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Version { .. } | Error::Invalid { .. } => None,
            Error::Json(error) => Some(error),
            Error::Io(error) => Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::Io(error)
    }
}

/// Serialize a validated module to cache text.
pub fn to_string(module: &Module) -> Result<String, Error> {
    let envelope = Envelope {
        schema_version: SCHEMA_VERSION,
        module,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Decode a cache document, checking the schema version first.
pub fn from_str(source: &str) -> Result<Module, Error> {
    let probe: VersionProbe = serde_json::from_str(source)?;
    if probe.schema_version != SCHEMA_VERSION {
        return Err(Error::Version {
            found: probe.schema_version,
            expected: SCHEMA_VERSION,
        });
    }
    let envelope: OwnedEnvelope = serde_json::from_str(source)?;
    verify(&envelope.module)?;
    Ok(envelope.module)
}

fn invalid(detail: impl Into<String>) -> Error {
    Error::Invalid {
        detail: detail.into(),
    }
}

/// Check that a decoded payload has the shape validation guarantees.
///
/// Consumers of a loaded module index through [`NamedTarget`]s and unwrap
/// resolved constant slots without re-checking, so a payload that decodes
/// cleanly but was never validated (or was edited by hand) must be rejected
/// here. The type walk is bounded by the JSON decoder's own recursion limit.
fn verify(module: &Module) -> Result<(), Error> {
    for namespace in &module.namespaces {
        for item in &namespace.items {
            match item {
                Item::Forward(_) => {}
                Item::Interface(interface) => {
                    for property in &interface.properties {
                        verify_type(module, &property.r#type)?;
                    }
                    for method in &interface.methods {
                        verify_type(module, &method.return_type)?;
                        for param in &method.params {
                            verify_type(module, &param.r#type)?;
                        }
                    }
                }
                Item::Enum(r#enum) => {
                    for member in &r#enum.members {
                        if member.value.is_none() {
                            return Err(invalid(format!(
                                "enum member `{}` has no resolved value",
                                member.name,
                            )));
                        }
                    }
                }
                Item::Typedef(typedef) => verify_type(module, &typedef.r#type)?,
                Item::Const(r#const) => {
                    if r#const.value.is_none() {
                        return Err(invalid(format!(
                            "constant `{}` has no resolved value",
                            r#const.name,
                        )));
                    }
                }
            }
        }
    }
    verify_alias_chains(module)
}

fn verify_type(module: &Module, r#type: &Type) -> Result<(), Error> {
    match r#type {
        Type::Prim { .. } | Type::String { .. } => Ok(()),
        Type::Named { name, target, .. } => match target {
            None => Err(invalid(format!(
                "type reference `{}` has no resolved target",
                name,
            ))),
            Some(target) => verify_target(module, name, target),
        },
        Type::Array { element, .. } | Type::Set { element, .. } => verify_type(module, element),
        Type::Dict { key, value, .. } => {
            verify_type(module, key)?;
            verify_type(module, value)
        }
        Type::Nullable { inner, .. } => verify_type(module, inner),
    }
}

fn verify_target(module: &Module, name: &str, target: &NamedTarget) -> Result<(), Error> {
    let item = module
        .namespaces
        .get(target.namespace)
        .and_then(|namespace| namespace.items.get(target.item))
        .ok_or_else(|| invalid(format!("type reference `{}` points outside the module", name)))?;
    let kind_matches = matches!(
        (target.kind, item),
        (NamedKind::Interface, Item::Interface(_))
            | (NamedKind::Enum, Item::Enum(_))
            | (NamedKind::Typedef, Item::Typedef(_))
    );
    if !kind_matches {
        return Err(invalid(format!(
            "type reference `{}` does not point at {}",
            name,
            target.kind.description(),
        )));
    }
    Ok(())
}

/// Reject typedef chains that never reach a concrete type.
///
/// [`Module::resolve_alias`] is fuel-bounded rather than panicking, but its
/// callers expect expansion to terminate, so a cycle smuggled in through the
/// cache has to be caught at load time. Targets are already bounds-checked
/// by [`verify_type`] before this runs.
fn verify_alias_chains(module: &Module) -> Result<(), Error> {
    for namespace in &module.namespaces {
        for item in &namespace.items {
            let typedef = match item {
                Item::Typedef(typedef) => typedef,
                _ => continue,
            };
            let mut current = &typedef.r#type;
            let mut fuel: u32 = 256;
            loop {
                match current {
                    Type::Named {
                        target:
                            Some(NamedTarget {
                                namespace,
                                item,
                                kind: NamedKind::Typedef,
                            }),
                        ..
                    } => {
                        if fuel == 0 {
                            return Err(invalid(format!(
                                "typedef `{}` does not resolve to a concrete type",
                                typedef.name,
                            )));
                        }
                        fuel -= 1;
                        match &module.namespaces[*namespace].items[*item] {
                            Item::Typedef(next) => current = &next.r#type,
                            _ => break,
                        }
                    }
                    _ => break,
                }
            }
        }
    }
    Ok(())
}

pub fn write_path(path: &Path, module: &Module) -> Result<(), Error> {
    fs::write(path, to_string(module)?)?;
    Ok(())
}

pub fn read_path(path: &Path) -> Result<Module, Error> {
    from_str(&fs::read_to_string(path)?)
}
