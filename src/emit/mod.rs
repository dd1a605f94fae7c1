//! The assembly emitter (spec §4.5): an optional backend that takes the
//! generator's C# text and turns it into a compiled artefact. Cadenza's
//! core never bundles a C# compiler itself — the contract below is what a
//! `roslyn`-feature implementation plugs into.

use std::path::Path;

use crate::diagnostics::DiagnosticSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Executable,
    Library,
}

/// A managed-runtime compilation service that turns generated C# source
/// into a compiled artefact. The core is single-threaded and synchronous
/// (spec §5); an implementation may hold a process-wide, lazily
/// initialised cache of reference assembly metadata, but `emit` itself
/// takes no suspension points from the caller's point of view.
pub trait AssemblyEmitter {
    /// Compiles `csharp_source` to `output_path` as `kind`. Diagnostics
    /// from the underlying compilation service are reported unmodified
    /// where they cannot be mapped back to a Cadenza source position
    /// (spec §4.5); ones that can be mapped are pushed onto `sink` instead
    /// of returned in the error.
    fn emit(&self, csharp_source: &str, output_path: &Path, kind: ArtifactKind, sink: &mut DiagnosticSink) -> Result<(), EmitError>;
}

#[derive(Debug, Clone)]
pub struct EmitError {
    pub message: String,
}

impl std::fmt::Display for EmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assembly emission failed: {}", self.message)
    }
}

impl std::error::Error for EmitError {}

/// No real in-process .NET compilation service is wired into this crate;
/// the `roslyn` feature marks where a concrete emitter would plug into the
/// trait above once one is vendored. Calling this is an internal-failure
/// exit (spec §6, exit code 2), not a diagnosed compile error.
pub struct UnavailableEmitter;

impl AssemblyEmitter for UnavailableEmitter {
    fn emit(&self, _csharp_source: &str, _output_path: &Path, _kind: ArtifactKind, _sink: &mut DiagnosticSink) -> Result<(), EmitError> {
        Err(EmitError { message: "this build was not compiled with the 'roslyn' feature; no assembly emitter is available".to_string() })
    }
}
