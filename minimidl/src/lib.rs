//! A compiler front end for the MinimIDL interface definition language.
//!
//! MinimIDL describes object-oriented interfaces (namespaces, interfaces,
//! enums, typedefs, and integer constants) for cross-language code
//! generation. This crate parses definition files, validates them, maps
//! every mentioned type to a structural descriptor, and caches validated
//! syntax trees on disk.

pub mod ast;
pub mod cache;
pub mod descriptor;
pub mod driver;
pub mod files;
pub mod source;
pub mod surface;

pub use driver::{Driver, Status};
