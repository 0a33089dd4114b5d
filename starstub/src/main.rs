//! Command line entry point.

use anyhow::Context;
use clap::Parser;
use starstub::codegen::{DEFAULT_TOOL_NAME, Destination, GeneratorConfig};
use starstub::schema::DEFAULT_GEN_TAG;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Generate Starlark/Python stubs from annotated Go API types
#[derive(Parser, Debug)]
#[command(name = "starstub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the Go package
    input: PathBuf,

    /// Directory to write __init__.py into, or - for standard output
    output: String,

    /// Comment tag that marks a type for generation
    #[arg(long, default_value = DEFAULT_GEN_TAG)]
    tag: String,

    /// Tool name printed in the generated-file banner
    #[arg(long, default_value = DEFAULT_TOOL_NAME)]
    tool_name: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::new()
        .tag(cli.tag.as_str())
        .tool_name(cli.tool_name.as_str());
    let destination = Destination::parse(&cli.output);

    starstub::codegen::run(&cli.input, &destination, &config)
        .with_context(|| format!("generating stubs for {}", cli.input.display()))
}

/// Logs go to stderr so `-` output stays a clean stub file.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
