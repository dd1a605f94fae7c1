use super::{BinaryOp, Expr, ExprKind, InterpolatedPart, Literal, MatchArm, PResult, Parser, Pattern, UnaryOp};
use crate::diagnostics::rules;
use crate::lexer::{InterpolatedSegment, TokenKind};

impl Parser {
    /// `expr := or ('?')?` (spec §4.2). The trailing `?` wraps the whole
    /// expression in [`ExprKind::ErrorPropagation`].
    pub(crate) fn parse_expression(&mut self) -> PResult<Expr> {
        let value = self.parse_or()?;
        if self.match_token(&TokenKind::Question) {
            let span = value.span;
            let id = self.fresh_id();
            Ok(Expr { id, span, kind: ExprKind::ErrorPropagation(Box::new(value)) })
        } else {
            Ok(value)
        }
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.match_token(&TokenKind::PipePipe) {
            let right = self.parse_and()?;
            left = self.binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.match_token(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            left = self.binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = if self.match_token(&TokenKind::EqualEqual) {
                BinaryOp::Eq
            } else if self.match_token(&TokenKind::BangEqual) {
                BinaryOp::Ne
            } else {
                break;
            };
            let right = self.parse_comparison()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.match_token(&TokenKind::Less) {
                BinaryOp::Lt
            } else if self.match_token(&TokenKind::LessEqual) {
                BinaryOp::Le
            } else if self.match_token(&TokenKind::Greater) {
                BinaryOp::Gt
            } else if self.match_token(&TokenKind::GreaterEqual) {
                BinaryOp::Ge
            } else {
                break;
            };
            let right = self.parse_additive()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.match_token(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.match_token(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.match_token(&TokenKind::Star) {
                BinaryOp::Mul
            } else if self.match_token(&TokenKind::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.match_token(&TokenKind::Minus) {
            let start = self.span_here();
            let operand = self.parse_unary()?;
            let id = self.fresh_id();
            return Ok(Expr { id, span: start, kind: ExprKind::Unary { op: UnaryOp::Neg, operand: Box::new(operand) } });
        }
        if self.match_token(&TokenKind::Bang) {
            let start = self.span_here();
            let operand = self.parse_unary()?;
            let id = self.fresh_id();
            return Ok(Expr { id, span: start, kind: ExprKind::Unary { op: UnaryOp::Not, operand: Box::new(operand) } });
        }
        self.parse_call()
    }

    /// `call := primary ( '(' args? ')' | '.' Ident '(' args? ')' | '[' expr ']' )*`
    /// (spec §4.2). The only field-style postfix Cadenza has is a
    /// module-qualified call, so `.` must always be followed by `Ident (`.
    fn parse_call(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.match_token(&TokenKind::LeftParen) {
                let args = self.parse_args()?;
                let span = expr.span;
                let id = self.fresh_id();
                expr = Expr { id, span, kind: ExprKind::Call { callee: Box::new(expr), args } };
            } else if self.check(&TokenKind::Dot) {
                let module = match &expr.kind {
                    ExprKind::Identifier(name) => name.clone(),
                    _ => return Err(self.error_here(rules::PARSE_MALFORMED_CONSTRUCT, "qualified calls must start with a module identifier")),
                };
                self.advance();
                let name = self.consume_ident()?;
                self.consume(TokenKind::LeftParen)?;
                let args = self.parse_args()?;
                let span = expr.span;
                let id = self.fresh_id();
                expr = Expr { id, span, kind: ExprKind::QualifiedCall { module, name, args } };
            } else if self.match_token(&TokenKind::LeftBracket) {
                let index = self.parse_expression()?;
                self.consume(TokenKind::RightBracket)?;
                let span = expr.span;
                let id = self.fresh_id();
                expr = Expr { id, span, kind: ExprKind::Index { target: Box::new(expr), index: Box::new(index) } };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let start = self.span_here();
        let id = self.fresh_id();
        match self.peek().kind.clone() {
            TokenKind::IntLit(value) => {
                self.advance();
                Ok(Expr { id, span: start, kind: ExprKind::IntLit(value) })
            }
            TokenKind::StringLit(value) => {
                self.advance();
                Ok(Expr { id, span: start, kind: ExprKind::StringLit(value) })
            }
            TokenKind::InterpolatedStringLit(segments) => {
                self.advance();
                let parts = self.lower_interpolated_segments(segments)?;
                Ok(Expr { id, span: start, kind: ExprKind::InterpolatedString(parts) })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr { id, span: start, kind: ExprKind::BoolLit(true) })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr { id, span: start, kind: ExprKind::BoolLit(false) })
            }
            TokenKind::KwOk => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(Expr { id, span: start, kind: ExprKind::Ok(Box::new(inner)) })
            }
            TokenKind::KwError => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(Expr { id, span: start, kind: ExprKind::Error(Box::new(inner)) })
            }
            TokenKind::KwSome => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(Expr { id, span: start, kind: ExprKind::Some(Box::new(inner)) })
            }
            TokenKind::KwNone => {
                self.advance();
                Ok(Expr { id, span: start, kind: ExprKind::None })
            }
            TokenKind::LeftBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RightBracket) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume(TokenKind::RightBracket)?;
                Ok(Expr { id, span: start, kind: ExprKind::ListLit(elements) })
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::Match => self.parse_match(),
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr { id, span: start, kind: ExprKind::Identifier(name) })
            }
            _ => Err(self.error_here(rules::PARSE_UNEXPECTED_TOKEN, "expected an expression")),
        }
    }

    fn parse_match(&mut self) -> PResult<Expr> {
        let start = self.span_here();
        self.consume(TokenKind::Match)?;
        let scrutinee = self.parse_expression()?;
        self.consume(TokenKind::LeftBrace)?;

        let mut arms = vec![self.parse_match_arm()?];
        while self.match_token(&TokenKind::Comma) {
            if self.check(&TokenKind::RightBrace) {
                break;
            }
            arms.push(self.parse_match_arm()?);
        }
        self.consume(TokenKind::RightBrace)?;

        let id = self.fresh_id();
        Ok(Expr { id, span: start, kind: ExprKind::Match { scrutinee: Box::new(scrutinee), arms } })
    }

    fn parse_match_arm(&mut self) -> PResult<MatchArm> {
        let pattern = self.parse_pattern()?;
        self.consume(TokenKind::FatArrow)?;
        let body = self.parse_expression()?;
        Ok(MatchArm { pattern, body })
    }

    fn parse_pattern(&mut self) -> PResult<Pattern> {
        match self.peek().kind.clone() {
            TokenKind::KwOk => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                let name = self.consume_ident()?;
                self.consume(TokenKind::RightParen)?;
                Ok(Pattern::Ok(name))
            }
            TokenKind::KwError => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                let name = self.consume_ident()?;
                self.consume(TokenKind::RightParen)?;
                Ok(Pattern::Error(name))
            }
            TokenKind::KwSome => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                let name = self.consume_ident()?;
                self.consume(TokenKind::RightParen)?;
                Ok(Pattern::Some(name))
            }
            TokenKind::KwNone => {
                self.advance();
                Ok(Pattern::None)
            }
            TokenKind::IntLit(value) => {
                self.advance();
                Ok(Pattern::Literal(Literal::Int(value)))
            }
            TokenKind::StringLit(value) => {
                self.advance();
                Ok(Pattern::Literal(Literal::String(value)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Pattern::Literal(Literal::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Pattern::Literal(Literal::Bool(false)))
            }
            TokenKind::Ident(name) if name == "_" => {
                self.advance();
                Ok(Pattern::Wildcard)
            }
            _ => Err(self.error_here(rules::PARSE_UNEXPECTED_TOKEN, "expected a match pattern")),
        }
    }

    /// Re-lexes and re-parses every `Expr` segment of an interpolated
    /// string. A segment whose own tokens contain another interpolated
    /// string literal is a nested interpolation, which spec §4.2 forbids
    /// outright; everything else is a plain, non-interpolating expression.
    fn lower_interpolated_segments(&mut self, segments: Vec<InterpolatedSegment>) -> PResult<Vec<InterpolatedPart>> {
        let mut parts = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                InterpolatedSegment::Literal(text) => parts.push(InterpolatedPart::Literal(text)),
                InterpolatedSegment::Expr(source) => {
                    let (tokens, mut sub_sink) = crate::lexer::lex(&source);
                    if tokens.iter().any(|t| matches!(t.kind, TokenKind::InterpolatedStringLit(_))) {
                        return Err(self.error_here(rules::PARSE_NESTED_INTERPOLATION, "interpolated strings may not nest inside another interpolated string's braces"));
                    }
                    let mut sub_parser = Parser::new(tokens);
                    let expr = sub_parser.parse_expression().map_err(|mut diagnostic| {
                        diagnostic.rule = rules::LEX_UNBALANCED_INTERPOLATION;
                        diagnostic
                    })?;
                    if sub_sink.has_errors() {
                        return Err(sub_sink.into_vec().remove(0));
                    }
                    parts.push(InterpolatedPart::Expr(expr));
                }
            }
        }
        Ok(parts)
    }

    fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(&right.span);
        let id = self.fresh_id();
        Expr { id, span, kind: ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) } }
    }
}
