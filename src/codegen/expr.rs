use std::collections::HashMap;

use super::types::emit_type;
use crate::diagnostics::{rules, Diagnostic, DiagnosticSink};
use crate::parser::{BinaryOp, Expr, ExprKind, InterpolatedPart, MatchArm, Pattern, Type, UnaryOp};
use crate::semantic::Annotations;

/// Emits expressions, tracking operator precedence so parentheses only
/// appear where dropping them would change meaning (spec §4.4
/// parenthesisation rule), plus the small amount of state match-arm
/// binding needs: the bound pattern name is textually substituted with a
/// field access on the (hoisted) scrutinee rather than declared as a C#
/// local, matching the ternary form the mapping table prescribes.
pub struct ExprEmitter<'a> {
    pub annotations: &'a Annotations,
    pub sink: &'a mut DiagnosticSink,
    substitutions: HashMap<String, String>,
    match_depth: u32,
}

impl<'a> ExprEmitter<'a> {
    pub fn new(annotations: &'a Annotations, sink: &'a mut DiagnosticSink) -> Self {
        ExprEmitter { annotations, sink, substitutions: HashMap::new(), match_depth: 0 }
    }

    pub fn emit(&mut self, expr: &Expr) -> String {
        self.emit_prec(expr, 0)
    }

    fn emit_prec(&mut self, expr: &Expr, min_prec: u8) -> String {
        let text = self.emit_inner(expr);
        match &expr.kind {
            ExprKind::Binary { op, .. } if op.precedence() < min_prec => format!("({text})"),
            _ => text,
        }
    }

    fn emit_inner(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Identifier(name) => self.substitutions.get(name).cloned().unwrap_or_else(|| name.clone()),
            ExprKind::IntLit(value) => value.to_string(),
            ExprKind::StringLit(value) => format!("{:?}", value),
            ExprKind::BoolLit(value) => value.to_string(),
            ExprKind::InterpolatedString(parts) => self.emit_interpolated(parts),
            ExprKind::Binary { op, left, right } => self.emit_binary(*op, left, right),
            ExprKind::Unary { op, operand } => self.emit_unary(*op, operand),
            ExprKind::Call { callee, args } => {
                let name = match &callee.kind {
                    ExprKind::Identifier(name) => name.clone(),
                    _ => {
                        self.sink.push(Diagnostic::error(rules::GEN_UNSUPPORTED_NODE, "unsupported call target").with_span(callee.span));
                        "/* unsupported */".to_string()
                    }
                };
                format!("{name}({})", self.emit_args(args))
            }
            ExprKind::QualifiedCall { module, name, args } => {
                format!("Cadenza.Modules.{module}.{module}.{name}({})", self.emit_args(args))
            }
            ExprKind::ListLit(elements) => {
                let element_type = self.annotations.type_of(expr.id).and_then(|ty| match ty {
                    Type::List(inner) => Some(emit_type(inner)),
                    _ => None,
                });
                let element_type = element_type.unwrap_or_else(|| "object".to_string());
                let items = elements.iter().map(|e| self.emit(e)).collect::<Vec<_>>().join(", ");
                format!("new List<{element_type}> {{ {items} }}")
            }
            ExprKind::Index { target, index } => {
                format!("{}[{}]", self.emit_prec(target, u8::MAX), self.emit(index))
            }
            ExprKind::Ok(inner) => {
                let (ok_ty, err_ty) = self.result_type_args(expr.id);
                format!("Result<{ok_ty}, {err_ty}>.Ok({})", self.emit(inner))
            }
            ExprKind::Error(inner) => {
                let (ok_ty, err_ty) = self.result_type_args(expr.id);
                format!("Result<{ok_ty}, {err_ty}>.Error({})", self.emit(inner))
            }
            ExprKind::Some(inner) => {
                let inner_ty = self.option_type_arg(expr.id);
                format!("Option<{inner_ty}>.Some({})", self.emit(inner))
            }
            ExprKind::None => {
                let inner_ty = self.option_type_arg(expr.id);
                format!("Option<{inner_ty}>.None()")
            }
            ExprKind::ErrorPropagation(inner) => {
                self.sink.push(
                    Diagnostic::error(rules::GEN_UNSUPPORTED_NODE, "'?' is only supported directly inside a 'let' or 'return' statement")
                        .with_span(expr.span),
                );
                self.emit(inner)
            }
            ExprKind::Match { scrutinee, arms } => self.emit_match(expr, scrutinee, arms),
        }
    }

    fn emit_args(&mut self, args: &[Expr]) -> String {
        args.iter().map(|a| self.emit(a)).collect::<Vec<_>>().join(", ")
    }

    fn emit_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> String {
        let prec = op.precedence();
        let left_text = self.emit_prec(left, prec);
        let right_text = self.emit_prec(right, prec + 1);
        format!("{left_text} {} {right_text}", op.as_str())
    }

    fn emit_unary(&mut self, op: UnaryOp, operand: &Expr) -> String {
        let symbol = match op {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        };
        // unary binds tighter than every binary operator, so a binary
        // operand always needs parentheses.
        format!("{symbol}{}", self.emit_prec(operand, u8::MAX))
    }

    fn emit_interpolated(&mut self, parts: &[InterpolatedPart]) -> String {
        let mut out = String::from("$\"");
        for part in parts {
            match part {
                InterpolatedPart::Literal(text) => out.push_str(&text.replace('{', "{{").replace('}', "}}")),
                InterpolatedPart::Expr(expr) => {
                    out.push('{');
                    out.push_str(&self.emit(expr));
                    out.push('}');
                }
            }
        }
        out.push('"');
        out
    }

    /// Lowers `match` to the mapping table's ternary form. The scrutinee is
    /// hoisted into a lambda parameter rather than re-emitted once per
    /// arm, so a side-effecting scrutinee (e.g. a call) is evaluated
    /// exactly once (spec §9 flags duplicated evaluation as a bug to
    /// avoid).
    fn emit_match(&mut self, expr: &Expr, scrutinee: &Expr, arms: &[MatchArm]) -> String {
        let scrutinee_ty = self.annotations.type_of(scrutinee.id).cloned();
        let result_ty = self.annotations.type_of(expr.id).cloned().unwrap_or(Type::Named("object".to_string()));
        let result_ty_name = emit_type(&result_ty);

        self.match_depth += 1;
        let subject = format!("__m{}", self.match_depth);

        let body = match &scrutinee_ty {
            Some(Type::Result(_, _)) => {
                let ok_arm = arms.iter().find(|a| matches!(a.pattern, Pattern::Ok(_)));
                let err_arm = arms.iter().find(|a| matches!(a.pattern, Pattern::Error(_)));
                let wildcard = arms.iter().find(|a| matches!(a.pattern, Pattern::Wildcard));

                let success = self.emit_arm_body(ok_arm.or(wildcard), &subject, ".Value");
                let failure = self.emit_arm_body(err_arm.or(wildcard), &subject, ".ErrorValue");
                format!("{subject}.IsSuccess ? {success} : {failure}")
            }
            Some(Type::Option(_)) => {
                let some_arm = arms.iter().find(|a| matches!(a.pattern, Pattern::Some(_)));
                let none_arm = arms.iter().find(|a| matches!(a.pattern, Pattern::None));
                let wildcard = arms.iter().find(|a| matches!(a.pattern, Pattern::Wildcard));

                let some = self.emit_arm_body(some_arm.or(wildcard), &subject, ".Value");
                let none = self.emit_arm_body(none_arm.or(wildcard), &subject, "");
                format!("{subject}.HasValue ? {some} : {none}")
            }
            _ => self.emit_literal_chain(arms, &subject),
        };

        self.match_depth -= 1;

        let subject_ty = scrutinee_ty.as_ref().map(emit_type).unwrap_or_else(|| "object".to_string());
        let scrutinee_text = self.emit(scrutinee);
        format!("((Func<{subject_ty}, {result_ty_name}>)({subject} => {body}))({scrutinee_text})")
    }

    fn emit_arm_body(&mut self, arm: Option<&MatchArm>, subject: &str, field: &str) -> String {
        let Some(arm) = arm else {
            return "throw new InvalidOperationException(\"non-exhaustive match\")".to_string();
        };
        let bound_name = match &arm.pattern {
            Pattern::Ok(name) | Pattern::Error(name) | Pattern::Some(name) => Some(name.clone()),
            _ => None,
        };

        let previous = bound_name.as_ref().map(|name| (name.clone(), self.substitutions.insert(name.clone(), format!("{subject}{field}"))));
        let text = self.emit(&arm.body);
        if let Some((name, previous_value)) = previous {
            match previous_value {
                Some(value) => {
                    self.substitutions.insert(name, value);
                }
                None => {
                    self.substitutions.remove(&name);
                }
            }
        }
        text
    }

    fn emit_literal_chain(&mut self, arms: &[MatchArm], subject: &str) -> String {
        let mut chain = "throw new InvalidOperationException(\"non-exhaustive match\")".to_string();
        for arm in arms.iter().rev() {
            chain = match &arm.pattern {
                Pattern::Wildcard => self.emit(&arm.body),
                Pattern::Literal(literal) => {
                    let literal_text = match literal {
                        crate::parser::Literal::Int(v) => v.to_string(),
                        crate::parser::Literal::String(v) => format!("{v:?}"),
                        crate::parser::Literal::Bool(v) => v.to_string(),
                    };
                    let body = self.emit(&arm.body);
                    format!("{subject} == {literal_text} ? {body} : ({chain})")
                }
                _ => chain,
            };
        }
        chain
    }

    fn result_type_args(&self, id: crate::parser::NodeId) -> (String, String) {
        match self.annotations.type_of(id) {
            Some(Type::Result(ok, err)) => (emit_type(ok), emit_type(err)),
            _ => ("object".to_string(), "object".to_string()),
        }
    }

    fn option_type_arg(&self, id: crate::parser::NodeId) -> String {
        match self.annotations.type_of(id) {
            Some(Type::Option(inner)) => emit_type(inner),
            _ => "object".to_string(),
        }
    }
}
