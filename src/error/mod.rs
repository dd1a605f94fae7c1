//! Top-level error type for the public compiler entry points.
//!
//! Internally every pipeline stage communicates failure by pushing
//! [`crate::diagnostics::Diagnostic`]s onto a shared sink rather than
//! returning early (see [`crate::diagnostics`]). `CompileError` is the
//! boundary type: it is what [`crate::compile`] and friends return when a
//! stage cannot continue at all (no tokens to parse, no file to read) or
//! when the accumulated diagnostics include at least one error.

use crate::diagnostics::Diagnostic;
use std::fmt;

#[derive(Debug, Clone)]
pub enum CompileError {
    /// The source file could not be read.
    Io { message: String },
    /// Compilation produced one or more error-severity diagnostics.
    Diagnostics(Vec<Diagnostic>),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io { message } => write!(f, "I/O error: {message}"),
            CompileError::Diagnostics(diagnostics) => {
                write!(f, "compilation failed with {} diagnostic(s)", diagnostics.len())?;
                for diagnostic in diagnostics {
                    write!(f, "\n  {diagnostic}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::Io { message: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
