//! rbparse: check Ruby files for syntax errors and inspect how they parse.
//!
//! Usage:
//!   rbparse [options] <file>...
//!   rbparse --pack <template> [--unpack]
//!
//! Files are parsed in parallel. Syntax errors are printed with source
//! context and make the exit status non-zero.

mod diagnostic;
mod render;

use clap::{ArgAction, Parser as ClapParser, ValueEnum};
use diagnostic::SyntaxDiagnostic;
use rayon::prelude::*;
use rbparse::pack::{parse_directives, Variant, Version};
use rbparse::{LineMap, LoadError, ParseOptions};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "rbparse", about = "rbparse - a standalone Ruby parser", version)]
struct Cli {
    /// Ruby files to parse.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// JSON file with parse options.
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Number reported for the first source line.
    #[arg(long)]
    line: Option<i64>,

    /// Treat string literals as frozen.
    #[arg(long)]
    frozen_string_literal: bool,

    /// What to print for each file besides its errors.
    #[arg(long, value_enum, default_value_t = Output::Errors)]
    output: Output,

    /// Describe a pack template instead of parsing files.
    #[arg(long, value_name = "TEMPLATE", conflicts_with = "files")]
    pack: Option<String>,

    /// Read the --pack template as an unpack template.
    #[arg(long, requires = "pack")]
    unpack: bool,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Only diagnostics.
    Errors,
    /// The token stream.
    Tokens,
    /// An outline of the syntax tree.
    Tree,
    /// The binary tree dump, for a single file.
    Serialize,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Exit status when a file has syntax errors.
const EXIT_SYNTAX_ERRORS: i32 = 1;
/// Exit status when input could not be read or the invocation is invalid.
const EXIT_FAILURE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match &cli.pack {
        Some(template) => run_pack(template, cli.unpack),
        None => run_parse(&cli),
    };
    process::exit(exit_code);
}

fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_pack(template: &str, unpack: bool) -> i32 {
    let variant = if unpack { Variant::Unpack } else { Variant::Pack };
    match parse_directives(Version::Ruby3_2, variant, template) {
        Ok(format) => {
            for line in format.describe() {
                println!("{}", line);
            }
            println!("encoding: {:?}", format.encoding);
            0
        }
        Err(error) => {
            print_error(&error.to_string());
            EXIT_FAILURE
        }
    }
}

/// Everything one file contributes to the output.
struct FileReport {
    output: Vec<u8>,
    diagnostics: Vec<SyntaxDiagnostic>,
    error_count: usize,
    load_error: Option<LoadError>,
}

impl FileReport {
    fn failed(error: LoadError) -> Self {
        Self {
            output: Vec::new(),
            diagnostics: Vec::new(),
            error_count: 0,
            load_error: Some(error),
        }
    }
}

fn run_parse(cli: &Cli) -> i32 {
    let start = Instant::now();

    if cli.files.is_empty() {
        print_error("No input files.");
        return EXIT_FAILURE;
    }
    if cli.output == Output::Serialize && cli.files.len() != 1 {
        print_error("--output serialize takes exactly one file.");
        return EXIT_FAILURE;
    }

    let options = match resolve_options(cli) {
        Ok(options) => options,
        Err(error) => {
            print_error(&format!("{}: {}", error, error_source(&error)));
            return EXIT_FAILURE;
        }
    };

    let reports: Vec<FileReport> = cli
        .files
        .par_iter()
        .map(|path| check_file(path, &options, cli.output))
        .collect();

    let mut exit_code = 0;
    let mut total_errors = 0;
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    for report in reports {
        if let Some(error) = report.load_error {
            print_error(&format!("{}: {}", error, error_source(&error)));
            exit_code = EXIT_FAILURE;
            continue;
        }
        if let Err(error) = stdout.write_all(&report.output) {
            print_error(&format!("failed to write output: {}", error));
            return EXIT_FAILURE;
        }
        for diagnostic in report.diagnostics {
            eprintln!("{:?}", miette::Report::new(diagnostic));
        }
        total_errors += report.error_count;
    }
    let _ = stdout.flush();

    debug!(files = cli.files.len(), errors = total_errors, elapsed = ?start.elapsed(), "checked files");
    if total_errors > 0 {
        eprintln!(
            "Found {} error{} in {} file{}.",
            total_errors,
            if total_errors == 1 { "" } else { "s" },
            cli.files.len(),
            if cli.files.len() == 1 { "" } else { "s" }
        );
        if exit_code == 0 {
            exit_code = EXIT_SYNTAX_ERRORS;
        }
    }
    exit_code
}

/// Options file first, then command-line overrides.
fn resolve_options(cli: &Cli) -> Result<ParseOptions, rbparse::ConfigError> {
    let mut options = match &cli.options {
        Some(path) => rbparse::load_options(path)?,
        None => ParseOptions::default(),
    };
    if let Some(line) = cli.line {
        options.line = line;
    }
    if cli.frozen_string_literal {
        options.frozen_string_literal = true;
    }
    Ok(options)
}

fn check_file(path: &Path, options: &ParseOptions, output: Output) -> FileReport {
    let source = match rbparse::read_source(path) {
        Ok(source) => source,
        Err(error) => return FileReport::failed(error),
    };
    let display_path = path.to_string_lossy();
    let options = if options.filepath.is_empty() {
        options.clone().with_filepath(display_path.as_ref())
    } else {
        options.clone()
    };

    let arena = bumpalo::Bump::new();
    let result = rbparse::parse_with_options(&arena, &source, &options);
    let line_map = LineMap::with_first_line(&source, options.line);

    let output = match output {
        Output::Errors => Vec::new(),
        Output::Tokens => render::tokens(&source, &rbparse::lex(&source), &line_map).into_bytes(),
        Output::Tree => render::tree(result.root, &line_map).into_bytes(),
        Output::Serialize => rbparse::serialize_tree(result.root),
    };

    let diagnostics = result
        .errors
        .iter()
        .chain(&result.warnings)
        .map(|diagnostic| SyntaxDiagnostic::new(diagnostic, &display_path, &source))
        .collect();

    FileReport {
        output,
        diagnostics,
        error_count: result.errors.len(),
        load_error: None,
    }
}

fn error_source(error: &dyn std::error::Error) -> String {
    error.source().map(|source| source.to_string()).unwrap_or_default()
}

fn print_error(msg: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(directive_for_verbosity(0), "warn");
        assert_eq!(directive_for_verbosity(1), "debug");
        assert_eq!(directive_for_verbosity(5), "trace");
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from(["rbparse", "--line", "7", "--frozen-string-literal", "a.rb"]);
        let options = resolve_options(&cli).unwrap();
        assert_eq!(options.line, 7);
        assert!(options.frozen_string_literal);
        assert_eq!(cli.files, vec![PathBuf::from("a.rb")]);
    }

    #[test]
    fn test_missing_file_report() {
        let report = check_file(Path::new("/nonexistent/a.rb"), &ParseOptions::default(), Output::Errors);
        assert!(report.load_error.is_some());
    }
}
