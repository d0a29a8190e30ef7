//! oas-lint CLI
//!
//! Command-line interface for linting and resolving OpenAPI documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use oas_lint::{
    builtin_rules, lint, load_document_auto, resolve, FileStatus, LintConfig, Severity,
};

#[derive(Parser)]
#[command(name = "oas-lint")]
#[command(about = "Lint OpenAPI documents against API design rules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint documents for design-rule violations
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Rule configuration file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },

    /// Print a document with every $ref dereferenced
    Resolve {
        /// Document source: file path or URL (http:// or https://)
        source: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List builtin rules with their default severities
    Rules,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lint {
            path,
            format,
            config,
            strict,
            quiet,
        } => run_lint(&path, &format, config, strict, quiet),

        Commands::Resolve {
            source,
            output,
            pretty,
        } => run_resolve(&source, output, pretty),

        Commands::Rules => run_rules(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_lint(
    path: &Path,
    format: &str,
    config_path: Option<PathBuf>,
    strict: bool,
    quiet: bool,
) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let config = match config_path {
        Some(config_path) => LintConfig::load(&config_path).map_err(|e| {
            eprintln!("Error loading config: {}", e);
            e.exit_code() as u8
        })?,
        None => LintConfig::default(),
    };

    let result = lint(path, &config, strict);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
    } else {
        // Text output
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let color = match diag.severity {
                    Severity::Error => "\x1b[31m",
                    Severity::Warning => "\x1b[33m",
                    Severity::Info => "\x1b[36m",
                    Severity::Hint => "\x1b[90m",
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}\x1b[0m[{}]: {} - {}",
                        color,
                        diag.severity.as_str(),
                        diag.rule,
                        diag.path,
                        diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_resolve(source: &str, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let document = load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let resolved = resolve(&document);
    for diag in &resolved.diagnostics {
        eprintln!("Warning[{}]: {} - {}", diag.rule, diag.path, diag.message);
    }

    let json_output = if pretty {
        serde_json::to_string_pretty(&resolved.root)
    } else {
        serde_json::to_string(&resolved.root)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_rules() -> Result<(), u8> {
    for rule in builtin_rules() {
        println!(
            "{:<26} {:<8} {}",
            rule.id(),
            rule.default_severity().as_str(),
            rule.description()
        );
    }
    Ok(())
}
