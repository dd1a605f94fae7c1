use cadenza_compiler::diagnostics::rules;
use cadenza_compiler::{transpile, CompileOutput};

fn transpile_ok(source: &str) -> String {
    let result: CompileOutput = transpile(source);
    assert!(!result.has_errors(), "expected no errors, got: {:?}", result.diagnostics);
    result.output.expect("generator always produces output")
}

#[test]
fn hello_world() {
    let csharp = transpile_ok(r#"function main() -> string { return "Hello, Cadenza!" }"#);
    assert!(csharp.contains("public static string main()"));
    assert!(csharp.contains("\"Hello, Cadenza!\""));
    assert!(!csharp.contains("Result<"));
    assert!(!csharp.contains("Option<"));
}

#[test]
fn pure_arithmetic_with_precedence() {
    let csharp = transpile_ok(
        "pure function f(a: int, b: int, c: int) -> bool {\n\
         return a + b * c > 10 && a - b < c || c == 0\n\
         }",
    );
    assert!(csharp.contains("a + b * c > 10 && a - b < c || c == 0"));
}

#[test]
fn error_propagation_round_trips_result() {
    let csharp = transpile_ok(
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
    assert!(csharp.contains("var r_result = divide(x, y);"));
    assert!(csharp.contains("if (r_result.IsError) return r_result;"));
    assert!(csharp.contains("var r = r_result.Value;"));
    assert!(csharp.contains("Result<int, string>.Error(\"div by zero\")"));
    assert!(csharp.contains("Result<int, string>.Ok(a / b)"));
}

#[test]
fn effect_violation_is_a_single_purity_diagnostic() {
    let result = transpile(
        r#"
        function log_info(message: string) uses [Logging] -> int { return 0 }
        pure function p() -> int {
            log_info("hi")
            return 1
        }
        "#,
    );
    let error_count = result.diagnostics.iter().filter(|d| d.severity == cadenza_compiler::diagnostics::Severity::Error).count();
    assert_eq!(error_count, 1, "expected exactly one error diagnostic, got {:?}", result.diagnostics);
    assert_eq!(result.diagnostics[0].rule, rules::SEM_PURITY_VIOLATED);
    assert!(result.has_errors());
}

#[test]
fn module_and_qualified_call() {
    let csharp = transpile_ok(
        r#"
        module Math { pure function add(a: int, b: int) -> int { return a + b } export { add } }
        function main() -> int { return Math.add(2, 3) }
        "#,
    );
    assert!(csharp.contains("namespace Cadenza.Modules.Math"));
    assert!(csharp.contains("Cadenza.Modules.Math.Math.add(2, 3)"));
}

#[test]
fn interpolated_string_with_embedded_expression() {
    let csharp = transpile_ok(
        r#"pure function greet(name: string, n: int) -> string { return $"Hello {name}, you have {n + 1} messages" }"#,
    );
    assert!(csharp.contains("$\"Hello {name}, you have {n + 1} messages\""));
}

#[test]
fn idempotence() {
    let source = r#"
        module Math { pure function add(a: int, b: int) -> int { return a + b } export { add } }
        function main() -> int { return Math.add(2, 3) }
    "#;
    let first = transpile(source).output;
    let second = transpile(source).output;
    assert_eq!(first, second);
}

#[test]
fn monotone_diagnostics_after_adding_a_syntax_error() {
    let clean = "function f(a: int) -> int { return a }";
    let broken = "function f(a: int) -> int { return a } function g(( -> int { return 1 }";

    let clean_count = transpile(clean).diagnostics.len();
    let broken_diagnostics = transpile(broken).diagnostics;
    assert!(broken_diagnostics.len() > clean_count);
}

#[test]
fn guard_lowers_like_equivalent_if() {
    let guard_csharp = transpile_ok(
        "function f(a: int) -> int {\n\
         guard a > 0 else { return 0 }\n\
         return a\n\
         }",
    );
    let if_csharp = transpile_ok(
        "function f(a: int) -> int {\n\
         if !(a > 0) { return 0 }\n\
         return a\n\
         }",
    );
    assert!(guard_csharp.contains("if (!(a > 0)) {"));
    assert!(guard_csharp.contains("return 0;"));
    assert!(if_csharp.contains("return 0;"));
}

#[test]
fn non_exhaustive_match_is_rejected_but_exhaustive_match_is_accepted() {
    let bad = transpile(
        r#"
        function describe(r: Result<int, string>) -> string {
            return match r {
                Ok(v) => "got a value"
            }
        }
        "#,
    );
    assert!(bad.has_errors());
    assert!(bad.diagnostics.iter().any(|d| d.rule == rules::SEM_NON_EXHAUSTIVE_MATCH));

    let good = transpile_ok(
        r#"
        function describe(r: Result<int, string>) -> string {
            return match r {
                Ok(v) => "got a value",
                Error(e) => "got an error"
            }
        }
        "#,
    );
    assert!(good.contains(".IsSuccess ?"));
}
