//! Pygmy interpreter CLI
//!
//! Main entry point for the `pygmy` command.

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pygmy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "The Pygmy scripting language interpreter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Pygmy script
    Run {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Dump the token stream of a Pygmy script
    Tokens {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Emit the tokens as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Run { input } => run(&input),
        Commands::Tokens { input, json } => tokens(&input, json),
    }
}

// Scripts are byte streams, not necessarily valid UTF-8.
fn read_source(input: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(input).map_err(|e| miette::miette!("Failed to read input file: {}", e))
}

fn run(input: &std::path::Path) -> Result<()> {
    tracing::info!("Running {:?}", input);

    let source = read_source(input)?;

    let program = pygmy::parse(&source).map_err(miette::Report::new)?;
    tracing::debug!("Parsed program");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut interpreter = pygmy::Interpreter::new();
    interpreter
        .run(&program, &mut out)
        .map_err(miette::Report::new)?;

    Ok(())
}

fn tokens(input: &std::path::Path, json: bool) -> Result<()> {
    let source = read_source(input)?;

    let tokens = pygmy::tokenize(&source).map_err(miette::Report::new)?;
    tracing::debug!("Lexed {} tokens", tokens.len());

    if json {
        let rendered = serde_json::to_string_pretty(&tokens)
            .map_err(|e| miette::miette!("Failed to serialize tokens: {}", e))?;
        println!("{}", rendered);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    Ok(())
}
