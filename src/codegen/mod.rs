//! C# code generation (spec §4.4): deterministic, pretty-printed output
//! from a checked AST plus its [`crate::semantic::Annotations`] side
//! table. Identical input always produces byte-identical output — there
//! is no hidden mutable state between calls.

mod expr;
mod stmt;
mod types;

use expr::ExprEmitter;
use types::emit_type;

use crate::diagnostics::DiagnosticSink;
use crate::parser::{CompilationUnit, FunctionDecl, Item, ModuleDecl, SpecBlock};
use crate::semantic::Annotations;

const RESULT_AND_OPTION_BOILERPLATE: &str = r#"public struct Result<T, E>
{
    public bool IsSuccess { get; }
    public bool IsError => !IsSuccess;
    public T Value { get; }
    public E ErrorValue { get; }

    private Result(bool isSuccess, T value, E errorValue)
    {
        IsSuccess = isSuccess;
        Value = value;
        ErrorValue = errorValue;
    }

    public static Result<T, E> Ok(T value) => new Result<T, E>(true, value, default);
    public static Result<T, E> Error(E errorValue) => new Result<T, E>(false, default, errorValue);
}

public struct Option<T>
{
    public bool HasValue { get; }
    public T Value { get; }

    private Option(bool hasValue, T value)
    {
        HasValue = hasValue;
        Value = value;
    }

    public static Option<T> Some(T value) => new Option<T>(true, value);
    public static Option<T> None() => new Option<T>(false, default);
}
"#;

/// Generates one C# compilation unit from `unit`. `annotations` must come
/// from [`crate::semantic::analyze`] run over the same AST. Diagnostics
/// raised here are strictly `gen.*` (spec §7) — an implementer bug, not a
/// user-facing error, since a checked AST should never hit them.
pub struct CodeGenerator<'a> {
    annotations: &'a Annotations,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(annotations: &'a Annotations) -> Self {
        CodeGenerator { annotations }
    }

    pub fn generate(&self, unit: &CompilationUnit, sink: &mut DiagnosticSink) -> String {
        let mut out = String::new();
        out.push_str("using System;\n");
        out.push_str("using System.Collections.Generic;\n\n");
        out.push_str(RESULT_AND_OPTION_BOILERPLATE);
        out.push('\n');

        let mut top_level = Vec::new();
        for item in &unit.items {
            match item {
                Item::Function(decl) => top_level.push(decl),
                Item::Module(module) => self.emit_module(&mut out, sink, module),
                Item::Import(_) => {}
            }
        }

        if !top_level.is_empty() {
            out.push_str("namespace Cadenza\n{\n    public static class Program\n    {\n");
            for decl in top_level {
                self.emit_function(&mut out, sink, decl, 2);
            }
            out.push_str("    }\n}\n");
        }

        out
    }

    fn emit_module(&self, out: &mut String, sink: &mut DiagnosticSink, module: &ModuleDecl) {
        out.push_str(&format!("namespace Cadenza.Modules.{}\n{{\n    public static class {}\n    {{\n", module.name, module.name));
        for item in &module.items {
            if let Item::Function(decl) = item {
                self.emit_function(out, sink, decl, 2);
            }
        }
        out.push_str("    }\n}\n");
    }

    fn emit_function(&self, out: &mut String, sink: &mut DiagnosticSink, decl: &FunctionDecl, indent: usize) {
        let pad = "    ".repeat(indent);
        self.emit_doc_comment(out, &pad, decl);

        let params = decl.params.iter().map(|p| format!("{} {}", emit_type(&p.ty), p.name)).collect::<Vec<_>>().join(", ");
        out.push_str(&format!("{pad}public static {} {}({params})\n{pad}{{\n", emit_type(&decl.return_type), decl.name));

        let mut emitter = ExprEmitter::new(self.annotations, sink);
        for stmt in &decl.body {
            stmt::emit_stmt(&mut emitter, out, indent + 1, stmt);
        }

        out.push_str(&format!("{pad}}}\n\n"));
    }

    fn emit_doc_comment(&self, out: &mut String, pad: &str, decl: &FunctionDecl) {
        let mut lines = Vec::new();

        if let Some(spec) = &decl.spec {
            if let Some(intent) = &spec.intent {
                lines.push(format!("<summary>{intent}</summary>"));
            }
            let remarks = spec_remarks(spec);
            if !remarks.is_empty() {
                lines.push("<remarks>".to_string());
                lines.extend(remarks);
                lines.push("</remarks>".to_string());
            }
        }

        if decl.is_pure {
            lines.push("Pure function - no side effects".to_string());
        } else if let Some(effects) = &decl.effects {
            if !effects.is_empty() {
                let names = effects.iter().map(|e| e.name.clone()).collect::<Vec<_>>().join(", ");
                lines.push(format!("Effects: {names}"));
            }
        }

        for line in lines {
            out.push_str(&format!("{pad}/// {line}\n"));
        }
    }
}

fn spec_remarks(spec: &SpecBlock) -> Vec<String> {
    let mut remarks = Vec::new();
    for rule in &spec.rules {
        remarks.push(format!("Rule: {rule}"));
    }
    for postcondition in &spec.postconditions {
        remarks.push(format!("Postcondition: {postcondition}"));
    }
    if let Some(source_doc) = &spec.source_doc {
        remarks.push(format!("See: {source_doc}"));
    }
    remarks
}

/// Generates C# source for `unit`, running semantic analysis first. This
/// is the entry point the compiler pipeline (`crate::compile`/`transpile`)
/// uses.
pub fn generate(unit: &CompilationUnit, sink: &mut DiagnosticSink) -> String {
    let annotations = crate::semantic::analyze(unit, sink);
    CodeGenerator::new(&annotations).generate(unit, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transpile(source: &str) -> (String, DiagnosticSink) {
        let (tokens, mut sink) = crate::lexer::lex(source);
        let unit = crate::parser::parse(tokens, &mut sink);
        let csharp = generate(&unit, &mut sink);
        (csharp, sink)
    }

    #[test]
    fn hello_world() {
        let (csharp, sink) = transpile(r#"function main() -> string { return "Hello, Cadenza!" }"#);
        assert!(!sink.has_errors());
        assert!(csharp.contains("public static string main()"));
        assert!(csharp.contains("\"Hello, Cadenza!\""));
    }

    #[test]
    fn precedence_is_preserved() {
        let (csharp, sink) = transpile(
            "pure function f(a: int, b: int, c: int) -> bool { return a + b * c > 10 && a - b < c || c == 0 }",
        );
        assert!(!sink.has_errors());
        assert!(csharp.contains("a + b * c > 10 && a - b < c || c == 0"));
    }

    #[test]
    fn multiplying_a_sum_needs_parens() {
        let (csharp, sink) = transpile("pure function f(a: int, b: int, c: int) -> int { return (a + b) * c }");
        assert!(!sink.has_errors());
        assert!(csharp.contains("(a + b) * c"));
    }

    #[test]
    fn error_propagation_lowers_to_two_statements() {
        let (csharp, sink) = transpile(
            r#"
            function divide(a: int, b: int) -> Result<int, string> {
                if b == 0 { return Error("div by zero") }
                return Ok(a / b)
            }
            function twice(x: int, y: int) -> Result<int, string> {
                let r = divide(x, y)?
                return Ok(r * 2)
            }
            "#,
        );
        assert!(!sink.has_errors());
        assert!(csharp.contains("var r_result = divide(x, y);"));
        assert!(csharp.contains("if (r_result.IsError) return r_result;"));
        assert!(csharp.contains("var r = r_result.Value;"));
    }

    #[test]
    fn module_and_qualified_call() {
        let (csharp, sink) = transpile(
            r#"
            module Math { pure function add(a: int, b: int) -> int { return a + b } export { add } }
            function main() -> int { return Math.add(2, 3) }
            "#,
        );
        assert!(!sink.has_errors());
        assert!(csharp.contains("namespace Cadenza.Modules.Math"));
        assert!(csharp.contains("Cadenza.Modules.Math.Math.add(2, 3)"));
    }

    #[test]
    fn interpolated_string_uses_native_syntax() {
        let (csharp, sink) = transpile(
            r#"pure function greet(name: string, n: int) -> string { return $"Hello {name}, you have {n + 1} messages" }"#,
        );
        assert!(!sink.has_errors());
        assert!(csharp.contains("$\"Hello {name}, you have {n + 1} messages\""));
    }
}
