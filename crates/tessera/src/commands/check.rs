//! Check command - Synthesize component types and check their usage sites.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, ValueEnum};
use serde::Serialize;
use tessera::carton::Diagnostic;
use tessera::config::{load_config, load_config_file};
use tessera::{Analysis, Compilation, TesseraError, TesseraResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct CheckArgs {
    /// JavaScript files forming one compilation
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the synthesized type declarations
    #[arg(long)]
    pub emit_types: bool,

    /// Filter a host checker's diagnostics (JSON array) through the guard
    #[arg(long)]
    pub host_diagnostics: Option<PathBuf>,

    /// Configuration file (defaults to ./tessera.config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Quiet mode - only show summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// JSON output structure
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    diagnostics: &'a [Diagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    host_diagnostics: Option<&'a [Diagnostic]>,
    error_count: usize,
    warning_count: usize,
    file_count: usize,
    side_effect_free: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    declarations: Option<String>,
}

pub fn run(args: CheckArgs) -> i32 {
    match check(&args) {
        Ok(failed) => i32::from(failed),
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {e}");
            2
        }
    }
}

/// Returns whether any error remains.
fn check(args: &CheckArgs) -> TesseraResult<bool> {
    let start = Instant::now();
    let config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => load_config(None),
    };

    let mut compilation = Compilation::new(config.pass);
    for path in &args.files {
        let text = std::fs::read_to_string(path).map_err(|source| TesseraError::Read {
            path: path.clone(),
            source,
        })?;
        compilation.add_file(path.to_string_lossy(), text);
    }

    let analysis = compilation.run()?;
    let host = match &args.host_diagnostics {
        Some(path) => Some(analysis.filter_host_diagnostics(read_host_diagnostics(path)?)),
        None => None,
    };

    let host_errors = host
        .as_ref()
        .map_or(0, |h| h.iter().filter(|d| d.is_error()).count());
    let error_count = analysis.result.error_count + host_errors;

    match args.format {
        OutputFormat::Json => {
            let output = JsonOutput {
                diagnostics: &analysis.result.diagnostics,
                host_diagnostics: host.as_deref(),
                error_count,
                warning_count: analysis.result.warning_count,
                file_count: args.files.len(),
                side_effect_free: analysis.facts.removable().collect(),
                declarations: args.emit_types.then(|| analysis.declarations()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if args.emit_types {
                print!("{}", analysis.declarations());
            }
            if !args.quiet {
                print_diagnostics(&analysis, &analysis.result.diagnostics);
                if let Some(host) = &host {
                    print_diagnostics(&analysis, host);
                }
            }
            let elapsed = start.elapsed();
            eprintln!(
                "Checked {} file(s) in {:.2?}: {} error(s), {} warning(s)",
                args.files.len(),
                elapsed,
                error_count,
                analysis.result.warning_count
            );
        }
    }

    Ok(error_count > 0)
}

fn read_host_diagnostics(path: &Path) -> TesseraResult<Vec<Diagnostic>> {
    let content = std::fs::read_to_string(path).map_err(|source| TesseraError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TesseraError::HostDiagnostics {
        path: path.to_path_buf(),
        source,
    })
}

fn print_diagnostics(analysis: &Analysis<'_>, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let label = if diagnostic.is_error() {
            "\x1b[31merror\x1b[0m"
        } else {
            "\x1b[33mwarning\x1b[0m"
        };
        println!(
            "{}: {}[{}]: {}",
            analysis.location(&diagnostic.site),
            label,
            diagnostic.code.name(),
            diagnostic.message
        );
        for related in &diagnostic.related {
            println!("  {}: {}", analysis.location(&related.site), related.message);
        }
    }
}
