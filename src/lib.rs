//! # Cadenza Compiler
//!
//! Cadenza is a small backend-service language: functions, modules,
//! `Result`/`Option` control flow, and a declared-effects purity system,
//! transpiled to C#. This crate implements the full pipeline — lexer,
//! parser, semantic checker, and code generator — plus an optional
//! assembly emitter behind the `roslyn` feature.
//!
//! ## Pipeline
//!
//! 1. **Lexical analysis** ([`lexer`]) — source text to tokens.
//! 2. **Syntax analysis** ([`parser`]) — tokens to an AST, with recovery so
//!    one bad statement doesn't hide every other problem in the file.
//! 3. **Semantic analysis** ([`semantic`]) — name resolution, purity and
//!    effect checking, type checking, annotated onto the AST via a side
//!    table rather than mutating it.
//! 4. **Code generation** ([`codegen`]) — deterministic C# source from the
//!    checked AST.
//! 5. **Assembly emission** ([`emit`], optional) — compiles the generated
//!    source to an executable or library via a managed-runtime compiler.
//!
//! Every stage collects [`diagnostics::Diagnostic`]s on a shared
//! [`diagnostics::DiagnosticSink`] instead of aborting on the first
//! problem (spec §7).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cadenza_compiler::transpile;
//!
//! let source = r#"function main() -> string { return "Hello, Cadenza!" }"#;
//! let result = transpile(source);
//! assert!(result.diagnostics.iter().all(|d| !matches!(d.severity, cadenza_compiler::diagnostics::Severity::Error)));
//! println!("{}", result.output.unwrap());
//! ```

pub mod cli;
pub mod codegen;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;

pub use error::{CompileError, Result};

use diagnostics::Diagnostic;

/// The result of a pipeline run that doesn't abort on the first error:
/// `output` is `Some` whenever every stage produced something to hand to
/// the next one, even if some diagnostics are errors (spec §7's
/// propagation policy — a phase skips what it can't make sense of rather
/// than stopping the whole compilation).
pub struct CompileOutput {
    pub output: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == diagnostics::Severity::Error)
    }
}

/// Runs the full pipeline (lex, parse, check, generate) over `source` and
/// returns the generated C# alongside every diagnostic raised. This is the
/// pure `compile(source_text) -> {output, diagnostics}` entry point: no
/// I/O, no shared state, safe to call repeatedly or from multiple threads
/// at once.
pub fn transpile(source: &str) -> CompileOutput {
    let (tokens, mut sink) = lexer::lex(source);
    let unit = parser::parse(tokens, &mut sink);
    let output = codegen::generate(&unit, &mut sink);
    CompileOutput { output: Some(output), diagnostics: sink.into_vec() }
}

/// Like [`transpile`], but reads `path` first and reports I/O failure
/// through [`CompileError`] rather than the diagnostic sink — a path is a
/// convenience over the pure text-in entry point, not a distinct pipeline.
pub fn transpile_file(path: &std::path::Path) -> Result<CompileOutput> {
    let source = std::fs::read_to_string(path)?;
    Ok(transpile(&source))
}

/// Runs the pipeline through semantic analysis only, without generating
/// code. Returns `Ok(())` if no diagnostic reached Error severity,
/// otherwise every diagnostic collected.
pub fn check(source: &str) -> std::result::Result<(), Vec<Diagnostic>> {
    let (tokens, mut sink) = lexer::lex(source);
    let unit = parser::parse(tokens, &mut sink);
    semantic::analyze(&unit, &mut sink);
    let diagnostics = sink.into_vec();
    if diagnostics.iter().any(|d| d.severity == diagnostics::Severity::Error) {
        Err(diagnostics)
    } else {
        Ok(())
    }
}

/// Transpiles `source` and, if clean, compiles the result to an assembly
/// at `output` via `emitter`. Requires the `roslyn` feature for a real
/// emitter; without it, [`emit::UnavailableEmitter`] reports an internal
/// failure (spec §6 exit code 2), not a diagnostic.
pub fn compile(source: &str, output: &std::path::Path, kind: emit::ArtifactKind, emitter: &dyn emit::AssemblyEmitter) -> Result<Vec<Diagnostic>> {
    let result = transpile(source);
    if result.has_errors() {
        return Err(CompileError::Diagnostics(result.diagnostics));
    }
    let mut sink = diagnostics::DiagnosticSink::new();
    emitter
        .emit(&result.output.unwrap_or_default(), output, kind, &mut sink)
        .map_err(|e| CompileError::Io { message: e.to_string() })?;
    let mut diagnostics = result.diagnostics;
    diagnostics.extend(sink.into_vec());
    Ok(diagnostics)
}
