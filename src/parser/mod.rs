mod ast;
mod expr;
mod types;

pub use ast::*;

use crate::diagnostics::{rules, Diagnostic, DiagnosticSink, Span};
use crate::lexer::{Token, TokenKind};

/// Recursive-descent parser with statement- and top-level-boundary
/// recovery: a syntax error skips forward to the next safe resynchronise
/// point instead of aborting the whole parse (spec §4.2).
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: NodeId,
}

type PResult<T> = Result<T, Diagnostic>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0, next_id: 0 }
    }

    pub(crate) fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn parse(mut self, sink: &mut DiagnosticSink) -> CompilationUnit {
        let mut items = Vec::new();
        while !self.is_at_end() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(diagnostic) => {
                    sink.push(diagnostic);
                    self.recover_to_top_level();
                }
            }
        }
        CompilationUnit { items }
    }

    fn parse_item(&mut self) -> PResult<Item> {
        let spec = self.try_parse_spec_block()?;
        match &self.peek().kind {
            TokenKind::Module => self.parse_module().map(Item::Module),
            TokenKind::Import => self.parse_import().map(Item::Import),
            TokenKind::Pure | TokenKind::Function => self.parse_function(spec).map(Item::Function),
            _ => Err(self.error_here(rules::PARSE_UNEXPECTED_TOKEN, "expected 'module', 'import' or a function declaration")),
        }
    }

    /// Parses a leading `/*spec ... */` block if present; returns `None`
    /// when the next token is not a specification comment.
    fn try_parse_spec_block(&mut self) -> PResult<Option<SpecBlock>> {
        if let TokenKind::SpecComment(body) = &self.peek().kind {
            let body = body.clone();
            self.advance();
            Ok(Some(SpecBlock::parse(&body)))
        } else {
            Ok(None)
        }
    }

    fn parse_module(&mut self) -> PResult<ModuleDecl> {
        let start = self.span_here();
        self.consume(TokenKind::Module)?;
        let name = self.consume_ident()?;
        self.consume(TokenKind::LeftBrace)?;

        let mut items = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.check(&TokenKind::Export) && !self.is_at_end() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(diagnostic) => {
                    // surfaced by the caller's sink via parse(); here we
                    // cannot push directly, so re-raise after recovering
                    // locally is not possible without a sink reference.
                    // Module bodies therefore bubble the first error up
                    // and let the caller's top-level recovery resynchronise
                    // past the whole module.
                    return Err(diagnostic);
                }
            }
        }

        let exports = if self.match_token(&TokenKind::Export) {
            self.consume(TokenKind::LeftBrace)?;
            let mut names = vec![self.consume_ident()?];
            while self.match_token(&TokenKind::Comma) {
                names.push(self.consume_ident()?);
            }
            self.consume(TokenKind::RightBrace)?;
            Some(names)
        } else {
            None
        };

        self.consume(TokenKind::RightBrace)?;
        Ok(ModuleDecl { name, items, exports, span: start })
    }

    fn parse_import(&mut self) -> PResult<ImportDecl> {
        let start = self.span_here();
        self.consume(TokenKind::Import)?;
        let module_name = self.consume_ident()?;

        let shape = if self.match_token(&TokenKind::Dot) {
            if self.match_token(&TokenKind::Star) {
                ImportShape::All
            } else {
                self.consume(TokenKind::LeftBrace)?;
                let mut names = vec![self.consume_ident()?];
                while self.match_token(&TokenKind::Comma) {
                    names.push(self.consume_ident()?);
                }
                self.consume(TokenKind::RightBrace)?;
                ImportShape::Only(names)
            }
        } else {
            ImportShape::Bare
        };

        Ok(ImportDecl { module_name, shape, span: start })
    }

    fn parse_function(&mut self, spec: Option<SpecBlock>) -> PResult<FunctionDecl> {
        let start = self.span_here();
        let is_pure = self.match_token(&TokenKind::Pure);
        self.consume(TokenKind::Function)?;
        let name = self.consume_ident()?;

        self.consume(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                let param_name = self.consume_ident()?;
                self.consume(TokenKind::Colon)?;
                let ty = self.parse_type()?;
                params.push(Param { name: param_name, ty });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen)?;

        let effects = if self.match_token(&TokenKind::Uses) {
            self.consume(TokenKind::LeftBracket)?;
            let mut names = vec![self.consume_effect_name()?];
            while self.match_token(&TokenKind::Comma) {
                names.push(self.consume_effect_name()?);
            }
            self.consume(TokenKind::RightBracket)?;
            Some(names)
        } else {
            None
        };

        self.consume(TokenKind::Arrow)?;
        let return_type = self.parse_type()?;

        let body = self.parse_block()?;

        Ok(FunctionDecl { name, is_pure, params, return_type, effects, body, spec, span: start })
    }

    fn consume_effect_name(&mut self) -> PResult<EffectRef> {
        let span = self.span_here();
        let token = self.advance().clone();
        let name = match &token.kind {
            TokenKind::Ident(name) => name.clone(),
            other => match other.effect_name() {
                Some(name) => name.to_string(),
                None => return Err(self.error_at(rules::PARSE_MALFORMED_CONSTRUCT, token.line, token.column, "expected an effect name")),
            },
        };
        Ok(EffectRef { name, span })
    }

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.consume(TokenKind::LeftBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(diagnostic) => {
                    self.recover_to_statement_boundary();
                    return Err(diagnostic);
                }
            }
        }
        self.consume(TokenKind::RightBrace)?;
        Ok(statements)
    }

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let start = self.span_here();
        match &self.peek().kind {
            TokenKind::Let => {
                self.advance();
                let name = self.consume_ident()?;
                self.consume(TokenKind::Equal)?;
                let value = self.parse_expression()?;
                Ok(Stmt { span: start, kind: StmtKind::Let { name, value } })
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::RightBrace) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                Ok(Stmt { span: start, kind: StmtKind::Return(value) })
            }
            TokenKind::If => {
                self.advance();
                let cond = self.parse_expression()?;
                let then_block = self.parse_block()?;
                let else_block = if self.match_token(&TokenKind::Else) {
                    Some(self.parse_block()?)
                } else {
                    None
                };
                Ok(Stmt { span: start, kind: StmtKind::If { cond, then_block, else_block } })
            }
            TokenKind::Guard => {
                self.advance();
                let cond = self.parse_expression()?;
                self.consume(TokenKind::Else)?;
                let else_block = self.parse_block()?;
                Ok(Stmt { span: start, kind: StmtKind::Guard { cond, else_block } })
            }
            _ => {
                let value = self.parse_expression()?;
                Ok(Stmt { span: start, kind: StmtKind::Expr(value) })
            }
        }
    }

    /// Recovery inside a block: skip to the next `;` or the block's
    /// closing `}`, per spec §4.2.
    fn recover_to_statement_boundary(&mut self) {
        let mut depth = 0i32;
        while !self.is_at_end() {
            match &self.peek().kind {
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LeftBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RightBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Recovery at the top level: skip to the next `function`, `module`
    /// or `import` keyword, per spec §4.2.
    fn recover_to_top_level(&mut self) {
        while !self.is_at_end() {
            match &self.peek().kind {
                TokenKind::Function | TokenKind::Pure | TokenKind::Module | TokenKind::Import => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // --- token-stream primitives, shared by expr.rs and types.rs ---

    pub(crate) fn consume(&mut self, kind: TokenKind) -> PResult<()> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(rules::PARSE_MISSING_TOKEN, format!("expected {kind:?}, found {:?}", self.peek().kind)))
        }
    }

    pub(crate) fn consume_ident(&mut self) -> PResult<String> {
        let token = self.advance().clone();
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            other => Err(self.error_at(rules::PARSE_MISSING_TOKEN, token.line, token.column, format!("expected an identifier, found {other:?}"))),
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_any(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        for kind in kinds {
            if self.check(kind) {
                return Some(self.advance().clone().kind);
            }
        }
        None
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn span_here(&self) -> Span {
        let token = self.peek();
        Span::point(token.line, token.column)
    }

    pub(crate) fn error_here(&self, rule: &'static str, message: impl Into<String>) -> Diagnostic {
        let token = self.peek();
        self.error_at(rule, token.line, token.column, message)
    }

    pub(crate) fn error_at(&self, rule: &'static str, line: usize, column: usize, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(rule, message).with_span(Span::point(line, column))
    }
}

/// Tokenizes and parses `source` in one step, the entry point the
/// compiler pipeline (`crate::compile`) uses.
pub fn parse(tokens: Vec<Token>, sink: &mut DiagnosticSink) -> CompilationUnit {
    Parser::new(tokens).parse(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_source(source: &str) -> (CompilationUnit, DiagnosticSink) {
        let (tokens, mut sink) = lex(source);
        let unit = parse(tokens, &mut sink);
        (unit, sink)
    }

    #[test]
    fn parses_hello_world() {
        let (unit, sink) = parse_source(r#"function main() -> string { return "Hello, Cadenza!" }"#);
        assert!(sink.is_empty());
        assert_eq!(unit.items.len(), 1);
        match &unit.items[0] {
            Item::Function(f) => {
                assert_eq!(f.name, "main");
                assert_eq!(f.return_type, Type::String);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn parses_module_with_export() {
        let (unit, sink) = parse_source("module Math { pure function add(a: int, b: int) -> int { return a + b } export { add } }");
        assert!(sink.is_empty());
        match &unit.items[0] {
            Item::Module(m) => {
                assert_eq!(m.name, "Math");
                assert_eq!(m.exports, Some(vec!["add".to_string()]));
            }
            other => panic!("expected module, got {other:?}"),
        }
    }

    #[test]
    fn recovers_after_syntax_error_at_top_level() {
        let (unit, sink) = parse_source("function broken( -> int { return 1 }\nfunction ok() -> int { return 2 }");
        assert!(sink.has_errors());
        assert!(unit.items.iter().any(|item| matches!(item, Item::Function(f) if f.name == "ok")));
    }

    #[test]
    fn guard_requires_else_block() {
        let (_, sink) = parse_source("function f() -> int { guard true { return 1 } return 2 }");
        assert!(sink.has_errors());
    }
}
