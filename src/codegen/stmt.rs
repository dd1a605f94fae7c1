use super::expr::ExprEmitter;
use crate::parser::{Expr, ExprKind, Stmt, StmtKind};

/// Emits one statement, indented, terminated with a newline. `let x = e?`
/// and `return e?` get the two/three-line lowering from spec §4.4 instead
/// of going through the generic expression emitter, since that lowering
/// only makes sense at statement granularity (it introduces a new local
/// and an early return).
pub fn emit_stmt(emitter: &mut ExprEmitter, out: &mut String, indent: usize, stmt: &Stmt) {
    let pad = "    ".repeat(indent);
    match &stmt.kind {
        StmtKind::Let { name, value } => {
            if let ExprKind::ErrorPropagation(inner) = &value.kind {
                emit_propagated_let(emitter, out, indent, name, inner);
            } else {
                let text = emitter.emit(value);
                out.push_str(&format!("{pad}var {name} = {text};\n"));
            }
        }
        StmtKind::Return(Some(value)) => {
            if let ExprKind::ErrorPropagation(inner) = &value.kind {
                emit_propagated_return(emitter, out, indent, inner);
            } else {
                let text = emitter.emit(value);
                out.push_str(&format!("{pad}return {text};\n"));
            }
        }
        StmtKind::Return(None) => {
            out.push_str(&format!("{pad}return;\n"));
        }
        StmtKind::If { cond, then_block, else_block } => {
            let cond_text = emitter.emit(cond);
            out.push_str(&format!("{pad}if ({cond_text}) {{\n"));
            for stmt in then_block {
                emit_stmt(emitter, out, indent + 1, stmt);
            }
            out.push_str(&format!("{pad}}}\n"));
            if let Some(else_block) = else_block {
                out.push_str(&format!("{pad}else {{\n"));
                for stmt in else_block {
                    emit_stmt(emitter, out, indent + 1, stmt);
                }
                out.push_str(&format!("{pad}}}\n"));
            }
        }
        StmtKind::Guard { cond, else_block } => {
            let cond_text = emitter.emit(cond);
            out.push_str(&format!("{pad}if (!({cond_text})) {{\n"));
            for stmt in else_block {
                emit_stmt(emitter, out, indent + 1, stmt);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        StmtKind::Expr(value) => {
            let text = emitter.emit(value);
            out.push_str(&format!("{pad}{text};\n"));
        }
    }
}

fn emit_propagated_let(emitter: &mut ExprEmitter, out: &mut String, indent: usize, name: &str, inner: &Expr) {
    let pad = "    ".repeat(indent);
    let inner_text = emitter.emit(inner);
    let result_var = format!("{name}_result");
    out.push_str(&format!("{pad}var {result_var} = {inner_text};\n"));
    out.push_str(&format!("{pad}if ({result_var}.IsError) return {result_var};\n"));
    out.push_str(&format!("{pad}var {name} = {result_var}.Value;\n"));
}

fn emit_propagated_return(emitter: &mut ExprEmitter, out: &mut String, indent: usize, inner: &Expr) {
    let pad = "    ".repeat(indent);
    let inner_text = emitter.emit(inner);
    out.push_str(&format!("{pad}var __propagated = {inner_text};\n"));
    out.push_str(&format!("{pad}if (__propagated.IsError) return __propagated;\n"));
    out.push_str(&format!("{pad}return __propagated.Value;\n"));
}
