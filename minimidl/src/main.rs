use clap::Parser;
use std::path::PathBuf;

/// A compiler front end for the MinimIDL interface definition language
#[derive(Parser)]
#[clap(author, version, about)]
enum Cli {
    /// Parse and validate an interface definition, reporting every error
    Check {
        /// Path to the definition to check
        #[clap(name = "FILE")]
        file: PathOrStdin,
    },
    /// Print the type descriptor table for an interface definition
    Types {
        /// Path to the definition to map
        #[clap(
            name = "FILE",
            group = "input",
            required_unless_present = "CACHE_FILE"
        )]
        file: Option<PathOrStdin>,
        /// Path to a previously written AST cache to map instead
        #[clap(long = "cache", name = "CACHE_FILE", group = "input")]
        cache: Option<PathBuf>,
    },
    /// Validate an interface definition and write its AST cache
    Cache {
        /// Path to the definition to cache
        #[clap(name = "FILE")]
        file: PathOrStdin,
        /// Path to write the cache to
        #[clap(short = 'o', long = "output", name = "OUT_FILE")]
        output: PathBuf,
    },
}

#[derive(Clone, Debug)]
enum PathOrStdin {
    StdIn,
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(src: &str) -> Result<PathOrStdin, std::convert::Infallible> {
        match src {
            "-" => Ok(PathOrStdin::StdIn),
            _ => Ok(PathOrStdin::Path(PathBuf::from(src))),
        }
    }
}

fn unwrap_or_exit<T>(option: Option<T>) -> T {
    option.unwrap_or_else(|| std::process::exit(minimidl::Status::Error.exit_code()))
}

fn load_file_or_exit(driver: &mut minimidl::Driver, file: PathOrStdin) -> minimidl::files::FileId {
    unwrap_or_exit(match file {
        PathOrStdin::StdIn => driver.load_source("<stdin>".to_owned(), std::io::stdin()),
        PathOrStdin::Path(path) => driver.load_source_path(&path),
    })
}

fn main() -> ! {
    match Cli::parse() {
        Cli::Check { file } => {
            let mut driver = minimidl::Driver::new();

            let file_id = load_file_or_exit(&mut driver, file);
            let status = driver.check_module(file_id);

            std::process::exit(status.exit_code());
        }
        Cli::Types { file, cache } => {
            let mut driver = minimidl::Driver::new();

            let status = match (file, cache) {
                (Some(file), None) => {
                    let file_id = load_file_or_exit(&mut driver, file);
                    driver.emit_types(file_id)
                }
                (None, Some(cache)) => driver.emit_types_from_cache(&cache),
                (Some(_), Some(_)) | (None, None) => {
                    unreachable!(r#"guarded by `required_unless_present = "CACHE_FILE"`"#)
                }
            };

            std::process::exit(status.exit_code());
        }
        Cli::Cache { file, output } => {
            let mut driver = minimidl::Driver::new();

            let file_id = load_file_or_exit(&mut driver, file);
            let status = driver.write_cache(file_id, &output);

            std::process::exit(status.exit_code());
        }
    }
}
