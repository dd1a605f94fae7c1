//! Semantic analysis: name resolution, effect/purity checking, minimal
//! structural type checking, and exhaustiveness/termination checks.
//!
//! The AST is never mutated here (spec §3 Lifecycle). Results live in an
//! [`Annotations`] side table keyed by [`NodeId`], and every problem is a
//! [`Diagnostic`] pushed onto the caller's sink; the checker always runs to
//! completion, even after reporting errors, so the caller sees every
//! problem in one pass.

mod checker;
mod signature;
mod symbol_table;

pub use signature::{EFFECT_ALPHABET, FunctionSignature};
pub use symbol_table::SymbolTable;

use std::collections::HashMap;

use crate::diagnostics::DiagnosticSink;
use crate::parser::{CompilationUnit, NodeId, Type};

/// Where a name resolved to: a plain top-level function, or one qualified
/// by its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCallee {
    TopLevel(String),
    Module { module: String, name: String },
}

/// The side table the generator reads alongside the AST (spec §3
/// Lifecycle): resolved expression types and resolved call targets, both
/// keyed by the immutable [`NodeId`] the parser assigned.
#[derive(Debug, Default)]
pub struct Annotations {
    pub resolved_types: HashMap<NodeId, Type>,
    pub resolved_callees: HashMap<NodeId, ResolvedCallee>,
}

impl Annotations {
    pub fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.resolved_types.get(&id)
    }

    pub fn callee_of(&self, id: NodeId) -> Option<&ResolvedCallee> {
        self.resolved_callees.get(&id)
    }
}

/// Runs every check in §4.3 over `unit`, returning the annotation table.
/// Diagnostics are pushed to `sink`; this function never fails outright,
/// matching the "checker never raises" failure semantics.
pub fn analyze(unit: &CompilationUnit, sink: &mut DiagnosticSink) -> Annotations {
    let registry = signature::build_registry(unit, sink);
    let mut annotations = Annotations::default();
    checker::check_unit(unit, &registry, &mut annotations, sink);
    annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::rules;

    fn check(source: &str) -> DiagnosticSink {
        let (tokens, mut sink) = crate::lexer::lex(source);
        let unit = crate::parser::parse(tokens, &mut sink);
        analyze(&unit, &mut sink);
        sink
    }

    #[test]
    fn pure_function_calling_effectful_function_is_rejected() {
        let sink = check(
            r#"
            function log_info(message: string) uses [Logging] -> int { return 0 }
            pure function p() -> int {
                log_info("hi")
                return 1
            }
            "#,
        );
        assert!(sink.iter().any(|d| d.rule == rules::SEM_PURITY_VIOLATED));
    }

    #[test]
    fn effect_not_covered_is_rejected() {
        let sink = check(
            r#"
            function log_info(message: string) uses [Logging] -> int { return 0 }
            function caller() -> int {
                log_info("hi")
                return 1
            }
            "#,
        );
        assert!(sink.iter().any(|d| d.rule == rules::SEM_EFFECT_MISSING));
    }

    #[test]
    fn guard_without_terminating_else_is_rejected() {
        let sink = check("function f(x: int) -> int { guard x > 0 else { x } return x }");
        assert!(sink.iter().any(|d| d.rule == rules::SEM_GUARD_NOT_TERMINATING));
    }

    #[test]
    fn non_exhaustive_result_match_is_rejected() {
        let sink = check(
            r#"
            function divide(a: int, b: int) -> Result<int, string> {
                if b == 0 { return Error("div by zero") }
                return Ok(a / b)
            }
            function run(a: int, b: int) -> int {
                return match divide(a, b) { Ok(v) => v }
            }
            "#,
        );
        assert!(sink.iter().any(|d| d.rule == rules::SEM_NON_EXHAUSTIVE_MATCH));
    }

    #[test]
    fn module_and_qualified_call_resolve_cleanly() {
        let sink = check(
            r#"
            module Math { pure function add(a: int, b: int) -> int { return a + b } export { add } }
            function main() -> int { return Math.add(2, 3) }
            "#,
        );
        assert!(!sink.has_errors());
    }

    #[test]
    fn unresolved_name_is_reported() {
        let sink = check("function f() -> int { return y }");
        assert!(sink.iter().any(|d| d.rule == rules::SEM_UNRESOLVED_NAME));
    }
}
