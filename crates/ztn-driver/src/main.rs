use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use ztn_diag::{Diagnostic, LineIndex, Severity};
use ztn_driver::{check_units, read_source, UnitResult};
use ztn_lexer::{Lexer, TokenKind};

#[derive(Parser)]
#[command(
    name = "zetan",
    version = "0.1.0",
    about = "Zetan compiler front end",
    long_about = "Lexes, parses, and type-checks Zetan source files,\nincluding ownership and borrow verification."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one or more Zetan files without generating code
    Check {
        /// Input Zetan files (checked together as one program)
        inputs: Vec<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Lex a Zetan file and show tokens (debug)
    Lex {
        /// Input Zetan file
        input: PathBuf,

        /// Show line/column positions
        #[arg(short, long)]
        positions: bool,
    },

    /// Parse a Zetan file and show the AST (debug)
    Parse {
        /// Input Zetan file
        input: PathBuf,

        /// Pretty-print as source instead of the raw tree
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { inputs, verbose } => check_command(inputs, verbose),
        Commands::Lex { input, positions } => lex_command(input, positions),
        Commands::Parse { input, pretty } => parse_command(input, pretty),
    }
}

fn check_command(inputs: Vec<PathBuf>, verbose: bool) -> ExitCode {
    if inputs.is_empty() {
        eprintln!("error: no input files");
        return ExitCode::FAILURE;
    }

    let mut sources = Vec::new();
    for (file_id, path) in inputs.iter().enumerate() {
        match read_source(path) {
            Ok(source) => sources.push((file_id, source)),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let results = match check_units(&sources) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut error_count = 0;
    let mut warning_count = 0;
    for result in &results {
        let filename = inputs[result.file_id].to_string_lossy();
        let source = &sources[result.file_id].1;
        report_unit(result, &filename, source);
        error_count += result.diagnostics.error_count();
        warning_count += result.diagnostics.warning_count();
    }

    if error_count > 0 {
        eprintln!("{} error(s), {} warning(s)", error_count, warning_count);
        return ExitCode::FAILURE;
    }
    if verbose {
        for (file_id, path) in inputs.iter().enumerate() {
            let functions = results[file_id].typed.functions.len();
            println!("{}: {} function(s) verified", path.display(), functions);
        }
    }
    println!("Check passed ({} warning(s))", warning_count);
    ExitCode::SUCCESS
}

fn lex_command(input: PathBuf, positions: bool) -> ExitCode {
    let source = match read_source(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut lexer = Lexer::new(&source);
    let tokens = lexer.tokenize();
    let line_index = LineIndex::new(&source);

    for token in &tokens {
        if token.kind == TokenKind::Eof {
            break;
        }
        if positions {
            let (line, col) = line_index.position(token.span.start);
            println!("{}:{}: {:?} `{}`", line, col, token.kind, token.text);
        } else {
            println!("{:?} `{}`", token.kind, token.text);
        }
    }

    let diags = lexer.take_diagnostics();
    let filename = input.to_string_lossy();
    for diag in diags.iter() {
        report_diagnostic(diag, &filename, &source);
    }
    if diags.has_errors() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn parse_command(input: PathBuf, pretty: bool) -> ExitCode {
    let source = match read_source(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (program, diags) = ztn_parser::parse(&source, 0);
    let filename = input.to_string_lossy();
    for diag in diags.iter() {
        report_diagnostic(diag, &filename, &source);
    }

    if pretty {
        print!("{}", ztn_ast::print_program(&program));
    } else {
        println!("{:#?}", program);
    }

    if diags.has_errors() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn report_unit(result: &UnitResult, filename: &str, source: &str) {
    for diag in result.diagnostics.iter() {
        report_diagnostic(diag, filename, source);
    }
}

fn report_diagnostic(diag: &Diagnostic, filename: &str, source: &str) {
    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };
    let primary_color = match diag.severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    };

    let span = (filename, diag.span.start..diag.span.end);
    let mut report = Report::build(kind, span.clone())
        .with_code(diag.code.code_str())
        .with_message(&diag.message)
        .with_label(
            Label::new(span)
                .with_message(&diag.message)
                .with_color(primary_color),
        );

    for note in &diag.notes {
        report = report.with_label(
            Label::new((filename, note.span.start..note.span.end))
                .with_message(&note.message)
                .with_color(Color::Blue),
        );
    }

    let _ = report.finish().print((filename, Source::from(source)));
}
