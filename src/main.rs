use cadenza_compiler::cli::{Cli, Commands};
use cadenza_compiler::diagnostics::{render, Severity};
use cadenza_compiler::emit::{ArtifactKind, UnavailableEmitter};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { input } => run_check(&input),
        Commands::Transpile { input, output } => run_transpile(&input, output),
        Commands::Build { input, output, kind } => run_build(&input, output, &kind),
        Commands::Run { input } => run_run(&input),
    }
}

fn read_source(input: &PathBuf) -> Result<String, ExitCode> {
    std::fs::read_to_string(input).map_err(|e| {
        tracing::error!("failed to read {}: {e}", input.display());
        ExitCode::from(2)
    })
}

fn run_check(input: &PathBuf) -> ExitCode {
    let source = match read_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };
    match cadenza_compiler::check(&source) {
        Ok(()) => {
            println!("ok");
            ExitCode::SUCCESS
        }
        Err(diagnostics) => report(&diagnostics, &source)
    }
}

fn run_transpile(input: &PathBuf, output: Option<PathBuf>) -> ExitCode {
    let source = match read_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let result = cadenza_compiler::transpile(&source);
    if result.has_errors() {
        return report(&result.diagnostics, &source);
    }
    for diagnostic in &result.diagnostics {
        print!("{}", render::render(diagnostic, &source, true));
    }
    let generated = result.output.unwrap_or_default();
    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, generated) {
                tracing::error!("failed to write {}: {e}", path.display());
                return ExitCode::from(2);
            }
        }
        None => println!("{generated}"),
    }
    ExitCode::SUCCESS
}

fn run_build(input: &PathBuf, output: Option<PathBuf>, kind: &str) -> ExitCode {
    let source = match read_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let kind = match kind {
        "executable" => ArtifactKind::Executable,
        "library" => ArtifactKind::Library,
        other => {
            tracing::error!("unknown artifact kind '{other}', expected 'executable' or 'library'");
            return ExitCode::from(2);
        }
    };
    let output = output.unwrap_or_else(|| input.with_extension("dll"));
    let emitter = UnavailableEmitter;
    match cadenza_compiler::compile(&source, &output, kind, &emitter) {
        Ok(diagnostics) => {
            for diagnostic in &diagnostics {
                print!("{}", render::render(diagnostic, &source, true));
            }
            ExitCode::SUCCESS
        }
        Err(cadenza_compiler::CompileError::Diagnostics(diagnostics)) => report(&diagnostics, &source),
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(2)
        }
    }
}

fn run_run(input: &PathBuf) -> ExitCode {
    tracing::error!("'run' requires this build to be compiled with the 'roslyn' feature for {}", input.display());
    ExitCode::from(2)
}

fn report(diagnostics: &[cadenza_compiler::diagnostics::Diagnostic], source: &str) -> ExitCode {
    for diagnostic in diagnostics {
        eprint!("{}", render::render(diagnostic, source, true));
    }
    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
