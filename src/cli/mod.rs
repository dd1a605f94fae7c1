use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod manifest;

#[derive(Parser)]
#[command(name = "cadenzac")]
#[command(author = "Cadenza Team")]
#[command(version = "0.1.0")]
#[command(about = "Cadenza language compiler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the lexer, parser, and semantic checker without generating code.
    Check {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Generate C# source for a Cadenza file.
    Transpile {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compile a Cadenza file to an executable or library (requires the
    /// `roslyn` feature for a real backend).
    Build {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long, default_value = "executable")]
        kind: String,
    },

    /// Compile a Cadenza file in memory and run its entry point (requires
    /// the `roslyn` feature).
    Run {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}
