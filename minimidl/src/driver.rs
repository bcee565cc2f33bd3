//! Driver for the command line interface.

use std::cell::RefCell;
use std::io::Read;
use std::path::Path;

use codespan_reporting::diagnostic::{Diagnostic, Severity};
use codespan_reporting::term::termcolor::{BufferedStandardStream, ColorChoice, WriteColor};

use crate::ast::{self, lower, validation};
use crate::cache;
use crate::descriptor::{Ownership, TypeMap};
use crate::files::{FileId, Files};
use crate::surface;

#[derive(Debug, Copy, Clone)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }
}

pub struct Driver {
    files: Files<String, String>,

    seen_errors: RefCell<bool>,
    codespan_config: codespan_reporting::term::Config,
    diagnostic_writer: RefCell<Box<dyn WriteColor>>,

    emit_writer: RefCell<Box<dyn WriteColor>>,
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            files: Files::new(),

            seen_errors: RefCell::new(false),
            codespan_config: codespan_reporting::term::Config::default(),
            diagnostic_writer: RefCell::new(Box::new(BufferedStandardStream::stderr(
                if atty::is(atty::Stream::Stderr) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                },
            ))),

            emit_writer: RefCell::new(Box::new(BufferedStandardStream::stdout(
                if atty::is(atty::Stream::Stdout) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                },
            ))),
        }
    }

    /// Set the writer to use when rendering diagnostics
    pub fn set_diagnostic_writer(&mut self, stream: impl 'static + WriteColor) {
        self.diagnostic_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Set the writer to use when emitting the type table and cache text
    pub fn set_emit_writer(&mut self, stream: impl 'static + WriteColor) {
        self.emit_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Load a source string into the file database.
    pub fn load_source_string(&mut self, name: String, source: String) -> FileId {
        self.files.add(name, source)
    }

    /// Load a source file into the file database using a reader.
    pub fn load_source(&mut self, name: String, mut reader: impl Read) -> Option<FileId> {
        let mut source = String::new();
        match reader.read_to_string(&mut source) {
            Ok(_) => Some(self.load_source_string(name, source)),
            Err(error) => {
                self.emit_read_diagnostic(name, error);
                None
            }
        }
    }

    /// Load a source file into the file database from the given path.
    pub fn load_source_path(&mut self, path: &Path) -> Option<FileId> {
        match std::fs::File::open(path) {
            Ok(file) => self.load_source(path.display().to_string(), file),
            Err(error) => {
                self.emit_read_diagnostic(path.display(), error);
                None
            }
        }
    }

    /// Parse and validate a compilation unit, reporting every diagnostic.
    pub fn check_module(&mut self, file_id: FileId) -> Status {
        match self.compile(file_id) {
            Some(_) => Status::Ok,
            None => Status::Error,
        }
    }

    /// Validate a compilation unit and emit its type descriptor table.
    pub fn emit_types(&mut self, file_id: FileId) -> Status {
        let module = match self.compile(file_id) {
            Some(module) => module,
            None => return Status::Error,
        };

        self.emit_type_table(&module);
        Status::Ok
    }

    /// Emit the type descriptor table for a previously cached module.
    pub fn emit_types_from_cache(&mut self, path: &Path) -> Status {
        let module = match cache::read_path(path) {
            Ok(module) => module,
            Err(error) => {
                self.emit_diagnostic(
                    Diagnostic::error()
                        .with_message(format!("couldn't load cache `{}`: {}", path.display(), error)),
                );
                return Status::Error;
            }
        };

        self.emit_type_table(&module);
        Status::Ok
    }

    /// Validate a compilation unit and write its AST cache to `out`.
    pub fn write_cache(&mut self, file_id: FileId, out: &Path) -> Status {
        let module = match self.compile(file_id) {
            Some(module) => module,
            None => return Status::Error,
        };

        match cache::write_path(out, &module) {
            Ok(()) => Status::Ok,
            Err(error) => {
                self.emit_diagnostic(Diagnostic::error().with_message(format!(
                    "couldn't write cache `{}`: {}",
                    out.display(),
                    error,
                )));
                Status::Error
            }
        }
    }

    /// Parse, lower, and validate one compilation unit. Returns `None` after
    /// emitting diagnostics if the unit has any error.
    fn compile(&self, file_id: FileId) -> Option<ast::Module> {
        let source = match self.files.get(file_id) {
            Ok(file) => file.source().as_str(),
            Err(_) => return None,
        };

        let surface = match surface::Module::parse(file_id, source) {
            Ok(surface) => surface,
            Err(error) => {
                self.emit_diagnostic(error.to_diagnostic());
                return None;
            }
        };

        let mut module = lower::module(&surface);
        let messages = validation::validate(&mut module);
        self.emit_diagnostics(messages.iter().map(|message| message.to_diagnostic()));

        if *self.seen_errors.borrow() {
            return None;
        }
        Some(module)
    }

    fn emit_type_table(&self, module: &ast::Module) {
        let map = TypeMap::of_module(module);
        let mut emit_writer = self.emit_writer.borrow_mut();
        for (id, descriptor) in map.iter() {
            let ownership = match descriptor.ownership() {
                Ownership::Value => "value",
                Ownership::RefCounted => "reference-counted",
            };
            writeln!(
                emit_writer,
                "{:>4}  {:<40} {}",
                id.to_usize(),
                map.name(id),
                ownership,
            )
            .unwrap();
        }
        emit_writer.flush().unwrap();
    }

    fn emit_diagnostic(&self, diagnostic: Diagnostic<FileId>) {
        let mut writer = self.diagnostic_writer.borrow_mut();
        let config = &self.codespan_config;

        codespan_reporting::term::emit(&mut *writer, config, &self.files, &diagnostic).unwrap();
        writer.flush().unwrap();

        if diagnostic.severity >= Severity::Error {
            *self.seen_errors.borrow_mut() = true;
        }
    }

    fn emit_diagnostics(&self, diagnostics: impl Iterator<Item = Diagnostic<FileId>>) {
        for diagnostic in diagnostics {
            self.emit_diagnostic(diagnostic);
        }
    }

    fn emit_read_diagnostic(&self, name: impl std::fmt::Display, error: std::io::Error) {
        let diagnostic =
            Diagnostic::error().with_message(format!("couldn't read `{name}`: {error}"));
        self.emit_diagnostic(diagnostic);
    }
}

impl Default for Driver {
    fn default() -> Driver {
        Driver::new()
    }
}
