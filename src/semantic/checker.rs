use std::collections::HashSet;

use super::signature::{FunctionSignature, Registry};
use super::symbol_table::SymbolTable;
use super::{Annotations, ResolvedCallee};
use crate::diagnostics::{rules, Diagnostic, DiagnosticSink};
use crate::parser::{
    CompilationUnit, Expr, ExprKind, FunctionDecl, InterpolatedPart, Item, MatchArm, ModuleDecl, Pattern, Stmt, StmtKind, Type,
};

pub fn check_unit(unit: &CompilationUnit, registry: &Registry, annotations: &mut Annotations, sink: &mut DiagnosticSink) {
    for item in &unit.items {
        match item {
            Item::Function(decl) => check_function(decl, None, registry, annotations, sink),
            Item::Module(module) => check_module(module, registry, annotations, sink),
            Item::Import(_) => {}
        }
    }
}

fn check_module(module: &ModuleDecl, registry: &Registry, annotations: &mut Annotations, sink: &mut DiagnosticSink) {
    for item in &module.items {
        match item {
            Item::Function(decl) => check_function(decl, Some(&module.name), registry, annotations, sink),
            Item::Module(nested) => check_module(nested, registry, annotations, sink),
            Item::Import(_) => {}
        }
    }
}

fn check_function(decl: &FunctionDecl, module: Option<&str>, registry: &Registry, annotations: &mut Annotations, sink: &mut DiagnosticSink) {
    let declared_effects: HashSet<String> = decl.effects.iter().flatten().map(|e| e.name.clone()).collect();

    if decl.is_pure && !declared_effects.is_empty() {
        sink.push(
            Diagnostic::error(rules::SEM_PURITY_VIOLATED, format!("pure function '{}' declares a non-empty effect set", decl.name))
                .with_span(decl.span),
        );
    }

    let mut ctx = FnContext {
        registry,
        module,
        enclosing_return: &decl.return_type,
        is_pure: decl.is_pure,
        declared_effects: &declared_effects,
        symbols: SymbolTable::new(),
        annotations,
        sink,
    };

    for param in &decl.params {
        ctx.symbols.define(&param.name, param.ty.clone());
    }

    ctx.check_block(&decl.body);
}

struct FnContext<'a> {
    registry: &'a Registry,
    module: Option<&'a str>,
    enclosing_return: &'a Type,
    is_pure: bool,
    declared_effects: &'a HashSet<String>,
    symbols: SymbolTable,
    annotations: &'a mut Annotations,
    sink: &'a mut DiagnosticSink,
}

impl FnContext<'_> {
    fn check_block(&mut self, stmts: &[Stmt]) {
        self.symbols.push_scope();
        for stmt in stmts {
            self.check_stmt(stmt);
        }
        self.symbols.pop_scope();
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, value } => {
                let ty = self.check_expr(value);
                self.symbols.define(name, ty);
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.check_expr(value);
                }
            }
            StmtKind::If { cond, then_block, else_block } => {
                self.expect_bool(cond);
                self.check_block(then_block);
                if let Some(else_block) = else_block {
                    self.check_block(else_block);
                }
            }
            StmtKind::Guard { cond, else_block } => {
                self.expect_bool(cond);
                self.check_block(else_block);
                if !block_always_returns(else_block) {
                    self.sink.push(
                        Diagnostic::error(rules::SEM_GUARD_NOT_TERMINATING, "guard's else-block does not return on every path")
                            .with_span(stmt.span),
                    );
                }
            }
            StmtKind::Expr(value) => {
                self.check_expr(value);
            }
        }
    }

    fn expect_bool(&mut self, expr: &Expr) {
        let ty = self.check_expr(expr);
        if ty != Type::Bool {
            self.sink.push(Diagnostic::error(rules::SEM_TYPE_MISMATCH, format!("expected 'bool', found '{ty}'")).with_span(expr.span));
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        let ty = self.infer_expr(expr);
        self.annotations.resolved_types.insert(expr.id, ty.clone());
        ty
    }

    fn infer_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Identifier(name) => match self.symbols.lookup(name) {
                Some(ty) => ty.clone(),
                None => {
                    self.sink.push(
                        Diagnostic::error(rules::SEM_UNRESOLVED_NAME, format!("cannot find '{name}' in this scope")).with_span(expr.span),
                    );
                    Type::Named("unknown".to_string())
                }
            },
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::StringLit(_) => Type::String,
            ExprKind::BoolLit(_) => Type::Bool,
            ExprKind::InterpolatedString(parts) => {
                for part in parts {
                    if let InterpolatedPart::Expr(inner) = part {
                        self.check_expr(inner);
                    }
                }
                Type::String
            }
            ExprKind::Binary { op, left, right } => self.check_binary(expr, *op, left, right),
            ExprKind::Unary { op, operand } => self.check_unary(expr, *op, operand),
            ExprKind::Call { callee, args } => self.check_call(expr, callee, args),
            ExprKind::QualifiedCall { module, name, args } => self.check_qualified_call(expr, module, name, args),
            ExprKind::ListLit(elements) => {
                let element_type = elements.first().map(|first| self.check_expr(first)).unwrap_or(Type::Named("unknown".to_string()));
                for element in elements.iter().skip(1) {
                    self.check_expr(element);
                }
                Type::List(Box::new(element_type))
            }
            ExprKind::Index { target, index } => self.check_index(expr, target, index),
            ExprKind::Ok(inner) => {
                let ok_type = self.check_expr(inner);
                match self.enclosing_return.clone() {
                    Type::Result(_, err) => Type::Result(Box::new(ok_type), err),
                    _ => Type::Result(Box::new(ok_type), Box::new(Type::Named("unknown".to_string()))),
                }
            }
            ExprKind::Error(inner) => {
                let err_type = self.check_expr(inner);
                match self.enclosing_return.clone() {
                    Type::Result(ok, _) => Type::Result(ok, Box::new(err_type)),
                    _ => Type::Result(Box::new(Type::Named("unknown".to_string())), Box::new(err_type)),
                }
            }
            ExprKind::Some(inner) => Type::Option(Box::new(self.check_expr(inner))),
            ExprKind::None => match self.enclosing_return.clone() {
                Type::Option(inner) => Type::Option(inner),
                _ => Type::Option(Box::new(Type::Named("unknown".to_string()))),
            },
            ExprKind::ErrorPropagation(inner) => self.check_propagation(expr, inner),
            ExprKind::Match { scrutinee, arms } => self.check_match(expr, scrutinee, arms),
        }
    }

    fn check_binary(&mut self, expr: &Expr, op: crate::parser::BinaryOp, left: &Expr, right: &Expr) -> Type {
        use crate::parser::BinaryOp::*;
        let left_ty = self.check_expr(left);
        let right_ty = self.check_expr(right);

        match op {
            Add => {
                if left_ty == Type::String || right_ty == Type::String {
                    Type::String
                } else if left_ty == Type::Int && right_ty == Type::Int {
                    Type::Int
                } else {
                    self.mismatch(expr, "'int' or 'string'", &left_ty, &right_ty);
                    Type::Int
                }
            }
            Sub | Mul | Div => {
                if left_ty != Type::Int || right_ty != Type::Int {
                    self.mismatch(expr, "'int'", &left_ty, &right_ty);
                }
                Type::Int
            }
            Lt | Le | Gt | Ge => {
                if left_ty != Type::Int || right_ty != Type::Int {
                    self.mismatch(expr, "'int'", &left_ty, &right_ty);
                }
                Type::Bool
            }
            Eq | Ne => Type::Bool,
            And | Or => {
                if left_ty != Type::Bool || right_ty != Type::Bool {
                    self.mismatch(expr, "'bool'", &left_ty, &right_ty);
                }
                Type::Bool
            }
        }
    }

    fn check_unary(&mut self, expr: &Expr, op: crate::parser::UnaryOp, operand: &Expr) -> Type {
        use crate::parser::UnaryOp::*;
        let ty = self.check_expr(operand);
        match op {
            Neg => {
                if ty != Type::Int {
                    self.sink.push(Diagnostic::error(rules::SEM_TYPE_MISMATCH, format!("expected 'int', found '{ty}'")).with_span(expr.span));
                }
                Type::Int
            }
            Not => {
                if ty != Type::Bool {
                    self.sink.push(Diagnostic::error(rules::SEM_TYPE_MISMATCH, format!("expected 'bool', found '{ty}'")).with_span(expr.span));
                }
                Type::Bool
            }
        }
    }

    fn check_index(&mut self, expr: &Expr, target: &Expr, index: &Expr) -> Type {
        let target_ty = self.check_expr(target);
        let index_ty = self.check_expr(index);
        if index_ty != Type::Int {
            self.sink.push(Diagnostic::error(rules::SEM_TYPE_MISMATCH, format!("list index must be 'int', found '{index_ty}'")).with_span(expr.span));
        }
        match target_ty {
            Type::List(element) => *element,
            other => {
                self.sink.push(Diagnostic::error(rules::SEM_TYPE_MISMATCH, format!("cannot index into '{other}'")).with_span(expr.span));
                Type::Named("unknown".to_string())
            }
        }
    }

    fn check_call(&mut self, expr: &Expr, callee: &Expr, args: &[Expr]) -> Type {
        let name = match &callee.kind {
            ExprKind::Identifier(name) => name.clone(),
            _ => {
                self.sink.push(Diagnostic::error(rules::PARSE_MALFORMED_CONSTRUCT, "call target must be a function name").with_span(callee.span));
                for arg in args {
                    self.check_expr(arg);
                }
                return Type::Named("unknown".to_string());
            }
        };

        for arg in args {
            self.check_expr(arg);
        }

        let resolved = self.resolve_unqualified(&name);
        match resolved {
            Some((signature, owner_module)) => {
                let return_type = signature.return_type.clone();
                self.account_for_call(expr, &name, &signature);
                self.annotations.resolved_callees.insert(
                    expr.id,
                    match owner_module {
                        Some(module) => ResolvedCallee::Module { module, name },
                        None => ResolvedCallee::TopLevel(name),
                    },
                );
                return_type
            }
            None => {
                self.sink.push(
                    Diagnostic::error(rules::SEM_UNRESOLVED_NAME, format!("cannot find function '{name}' in this scope")).with_span(callee.span),
                );
                Type::Named("unknown".to_string())
            }
        }
    }

    fn check_qualified_call(&mut self, expr: &Expr, module: &str, name: &str, args: &[Expr]) -> Type {
        for arg in args {
            self.check_expr(arg);
        }

        let Some(info) = self.registry.modules.get(module) else {
            self.sink.push(Diagnostic::error(rules::SEM_UNKNOWN_MODULE, format!("no module named '{module}'")).with_span(expr.span));
            return Type::Named("unknown".to_string());
        };

        if !info.exports.contains(name) {
            self.sink.push(
                Diagnostic::error(rules::SEM_UNRESOLVED_NAME, format!("'{name}' is not exported by module '{module}'")).with_span(expr.span),
            );
            return Type::Named("unknown".to_string());
        }

        match info.functions.get(name).cloned() {
            Some(signature) => {
                let return_type = signature.return_type.clone();
                self.account_for_call(expr, name, &signature);
                self.annotations
                    .resolved_callees
                    .insert(expr.id, ResolvedCallee::Module { module: module.to_string(), name: name.to_string() });
                return_type
            }
            None => {
                self.sink.push(
                    Diagnostic::error(rules::SEM_UNRESOLVED_NAME, format!("cannot find function '{name}' in module '{module}'")).with_span(expr.span),
                );
                Type::Named("unknown".to_string())
            }
        }
    }

    /// Invariants 1 & 2: a pure caller must only call pure callees
    /// (invariant 1); an effectful caller's declared effects must cover
    /// every callee's declared effects (invariant 2, "modulo purity" — it
    /// does not additionally apply to a pure caller, whose only obligation
    /// is invariant 1). By induction over the call graph, checking this
    /// one level deep at every function is equivalent to the transitive
    /// property spec §8 states.
    fn account_for_call(&mut self, expr: &Expr, name: &str, signature: &FunctionSignature) {
        if self.is_pure {
            if !signature.is_pure {
                self.sink.push(
                    Diagnostic::error(rules::SEM_PURITY_VIOLATED, format!("pure function calls effectful function '{name}'")).with_span(expr.span),
                );
            }
            return;
        }
        for effect in &signature.effects {
            if !self.declared_effects.contains(effect) {
                self.sink.push(
                    Diagnostic::error(rules::SEM_EFFECT_MISSING, format!("call to '{name}' requires effect '{effect}', which is not declared"))
                        .with_span(expr.span),
                );
            }
        }
    }

    fn check_propagation(&mut self, expr: &Expr, inner: &Expr) -> Type {
        let inner_ty = self.check_expr(inner);
        let Type::Result(ok, err) = inner_ty else {
            self.sink.push(
                Diagnostic::error(rules::SEM_TYPE_MISMATCH, "'?' may only be applied to a 'Result<T, E>' expression").with_span(expr.span),
            );
            return Type::Named("unknown".to_string());
        };

        match self.enclosing_return {
            Type::Result(_, enclosing_err) if **enclosing_err == *err => *ok,
            Type::Result(_, _) => {
                self.sink.push(
                    Diagnostic::error(rules::SEM_PROPAGATION_ERROR_MISMATCH, format!("propagated error type '{err}' does not match the enclosing function's error type"))
                        .with_span(expr.span),
                );
                *ok
            }
            _ => {
                self.sink.push(
                    Diagnostic::error(rules::SEM_PROPAGATION_OUTSIDE_RESULT, "'?' used in a function that does not return 'Result<T, E>'")
                        .with_span(expr.span),
                );
                *ok
            }
        }
    }

    fn check_match(&mut self, expr: &Expr, scrutinee: &Expr, arms: &[MatchArm]) -> Type {
        let scrutinee_ty = self.check_expr(scrutinee);
        let mut result_ty: Option<Type> = None;

        let mut has_ok = false;
        let mut has_error = false;
        let mut has_some = false;
        let mut has_none = false;
        let mut has_wildcard = false;

        for arm in arms {
            self.symbols.push_scope();
            match &arm.pattern {
                Pattern::Ok(name) => {
                    has_ok = true;
                    if let Type::Result(ok, _) = &scrutinee_ty {
                        self.symbols.define(name, (**ok).clone());
                    }
                }
                Pattern::Error(name) => {
                    has_error = true;
                    if let Type::Result(_, err) = &scrutinee_ty {
                        self.symbols.define(name, (**err).clone());
                    }
                }
                Pattern::Some(name) => {
                    has_some = true;
                    if let Type::Option(inner) = &scrutinee_ty {
                        self.symbols.define(name, (**inner).clone());
                    }
                }
                Pattern::None => has_none = true,
                Pattern::Wildcard => has_wildcard = true,
                Pattern::Literal(_) => {}
            }

            let arm_ty = self.check_expr(&arm.body);
            self.symbols.pop_scope();
            if result_ty.is_none() {
                result_ty = Some(arm_ty);
            }
        }

        let exhaustive = match &scrutinee_ty {
            Type::Result(_, _) => has_wildcard || (has_ok && has_error),
            Type::Option(_) => has_wildcard || (has_some && has_none),
            _ => true,
        };
        if !exhaustive {
            self.sink.push(
                Diagnostic::error(rules::SEM_NON_EXHAUSTIVE_MATCH, format!("match on '{scrutinee_ty}' does not cover every case")).with_span(expr.span),
            );
        }

        result_ty.unwrap_or(Type::Named("unknown".to_string()))
    }

    fn mismatch(&mut self, expr: &Expr, expected: &str, left: &Type, right: &Type) {
        self.sink.push(
            Diagnostic::error(rules::SEM_TYPE_MISMATCH, format!("expected {expected} operands, found '{left}' and '{right}'")).with_span(expr.span),
        );
    }

    fn resolve_unqualified(&self, name: &str) -> Option<(FunctionSignature, Option<String>)> {
        if let Some(module) = self.module {
            if let Some(info) = self.registry.modules.get(module) {
                if let Some(signature) = info.functions.get(name) {
                    return Some((signature.clone(), Some(module.to_string())));
                }
            }
        }
        if let Some(signature) = self.registry.top_level.get(name) {
            return Some((signature.clone(), None));
        }
        if let Some(owner) = self.registry.unqualified_imports.get(name) {
            if let Some(info) = self.registry.modules.get(owner) {
                if let Some(signature) = info.functions.get(name) {
                    return Some((signature.clone(), Some(owner.clone())));
                }
            }
        }
        None
    }
}

/// Invariant 4: every path through a block must end in `return` for the
/// block to be considered terminating.
fn block_always_returns(stmts: &[Stmt]) -> bool {
    match stmts.last() {
        Some(Stmt { kind: StmtKind::Return(_), .. }) => true,
        Some(Stmt { kind: StmtKind::If { then_block, else_block: Some(else_block), .. }, .. }) => {
            block_always_returns(then_block) && block_always_returns(else_block)
        }
        _ => false,
    }
}
