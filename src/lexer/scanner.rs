use super::token::{InterpolatedSegment, Token, TokenKind};
use crate::diagnostics::{rules, Diagnostic, DiagnosticSink, Span};

/// Single left-to-right scan over the source with one character of
/// lookahead, mirroring the structure of a conventional hand-written
/// scanner: a char buffer, a cursor, and line/column counters advanced
/// together so every token carries its own position.
pub struct Scanner {
    source: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scans the whole source, collecting diagnostics into `sink` and
    /// resynchronising at the next newline after a lexical error so a
    /// single bad character does not abort the rest of the file.
    pub fn scan_tokens(&mut self, sink: &mut DiagnosticSink) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_line_comments();
            if self.is_at_end() {
                break;
            }

            match self.scan_token() {
                Ok(token) => tokens.push(token),
                Err(diagnostic) => {
                    sink.push(diagnostic);
                    self.resync_to_next_line();
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
        tokens
    }

    fn resync_to_next_line(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn scan_token(&mut self) -> Result<Token, Diagnostic> {
        let line = self.line;
        let column = self.column;
        let ch = self.advance();

        let kind = match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '-' => if self.match_char('>') { TokenKind::Arrow } else { TokenKind::Minus },
            '/' => {
                if self.match_char('*') {
                    return self.scan_block_comment_or_spec(line, column);
                }
                TokenKind::Slash
            }
            '=' => {
                if self.match_char('=') {
                    TokenKind::EqualEqual
                } else if self.match_char('>') {
                    TokenKind::FatArrow
                } else {
                    TokenKind::Equal
                }
            }
            '!' => if self.match_char('=') { TokenKind::BangEqual } else { TokenKind::Bang },
            '<' => if self.match_char('=') { TokenKind::LessEqual } else { TokenKind::Less },
            '>' => if self.match_char('=') { TokenKind::GreaterEqual } else { TokenKind::Greater },
            '&' => {
                if self.match_char('&') {
                    TokenKind::AmpAmp
                } else {
                    return Err(self.error(rules::LEX_INVALID_CHARACTER, line, column, "unexpected character '&'"));
                }
            }
            '|' => {
                if self.match_char('|') {
                    TokenKind::PipePipe
                } else {
                    return Err(self.error(rules::LEX_INVALID_CHARACTER, line, column, "unexpected character '|'"));
                }
            }
            '"' => self.scan_string(line, column)?,
            '$' => {
                if self.match_char('"') {
                    self.scan_interpolated_string(line, column)?
                } else {
                    return Err(self.error(rules::LEX_INVALID_CHARACTER, line, column, "unexpected character '$'"));
                }
            }
            _ if ch.is_ascii_digit() => self.scan_number(),
            _ if ch.is_alphabetic() || ch == '_' => self.scan_identifier(),
            other => {
                return Err(self.error(rules::LEX_INVALID_CHARACTER, line, column, format!("unexpected character '{other}'")));
            }
        };

        Ok(Token::new(kind, line, column))
    }

    fn scan_string(&mut self, start_line: usize, start_column: usize) -> Result<TokenKind, Diagnostic> {
        let value = self.scan_escaped_until('"', start_line, start_column)?;
        Ok(TokenKind::StringLit(value))
    }

    /// Reads the raw contents of a `"..."` literal up to (and consuming)
    /// the closing quote, applying the fixed escape table from spec §4.1.
    fn scan_escaped_until(&mut self, terminator: char, start_line: usize, start_column: usize) -> Result<String, Diagnostic> {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != terminator {
            if self.peek() == '\n' {
                break;
            }
            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
                let escaped = self.advance();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    other => other,
                });
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() || self.peek() != terminator {
            return Err(self.error(rules::LEX_UNTERMINATED_STRING, start_line, start_column, "unterminated string literal"));
        }

        self.advance();
        Ok(value)
    }

    /// Captures `$"..."` as segments of literal text and raw sub-expression
    /// text, without nesting braces (spec §4.1/§4.2).
    fn scan_interpolated_string(&mut self, start_line: usize, start_column: usize) -> Result<TokenKind, Diagnostic> {
        let mut segments = Vec::new();
        let mut literal = String::new();

        loop {
            if self.is_at_end() || self.peek() == '\n' {
                return Err(self.error(rules::LEX_UNTERMINATED_STRING, start_line, start_column, "unterminated interpolated string"));
            }
            match self.peek() {
                '"' => {
                    self.advance();
                    break;
                }
                '{' => {
                    if !literal.is_empty() {
                        segments.push(InterpolatedSegment::Literal(std::mem::take(&mut literal)));
                    }
                    self.advance();
                    let mut expr_text = String::new();
                    while !self.is_at_end() && self.peek() != '}' {
                        if self.peek() == '{' {
                            return Err(self.error(
                                rules::LEX_UNBALANCED_INTERPOLATION,
                                start_line,
                                start_column,
                                "nested '{' inside interpolated string braces is not permitted",
                            ));
                        }
                        expr_text.push(self.advance());
                    }
                    if self.is_at_end() {
                        return Err(self.error(
                            rules::LEX_UNBALANCED_INTERPOLATION,
                            start_line,
                            start_column,
                            "unbalanced '{' in interpolated string",
                        ));
                    }
                    self.advance();
                    segments.push(InterpolatedSegment::Expr(expr_text));
                }
                '}' => {
                    return Err(self.error(
                        rules::LEX_UNBALANCED_INTERPOLATION,
                        start_line,
                        start_column,
                        "unbalanced '}' in interpolated string",
                    ));
                }
                '\\' => {
                    self.advance();
                    if self.is_at_end() {
                        break;
                    }
                    let escaped = self.advance();
                    literal.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        other => other,
                    });
                }
                _ => literal.push(self.advance()),
            }
        }

        if !literal.is_empty() {
            segments.push(InterpolatedSegment::Literal(literal));
        }

        Ok(TokenKind::InterpolatedStringLit(segments))
    }

    /// Handles `/* ... */` after the opening `/*` has been consumed. A
    /// block opening with `/*spec` is returned as a specification token
    /// whose payload is the text up to the closing `*/`; any other block
    /// comment is skipped entirely (spec §4.1).
    fn scan_block_comment_or_spec(&mut self, start_line: usize, start_column: usize) -> Result<Token, Diagnostic> {
        let is_spec = self.peek() == 's'
            && self.peek_at(1) == Some('p')
            && self.peek_at(2) == Some('e')
            && self.peek_at(3) == Some('c');
        if is_spec {
            for _ in 0..4 {
                self.advance();
            }
        }

        let mut body = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error(rules::LEX_UNTERMINATED_COMMENT, start_line, start_column, "unterminated block comment"));
            }
            if self.peek() == '*' && self.peek_at(1) == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            body.push(self.advance());
        }

        if is_spec {
            Ok(Token::new(TokenKind::SpecComment(body.trim().to_string()), start_line, start_column))
        } else {
            self.scan_token_or_eof(start_line, start_column)
        }
    }

    /// After skipping an ordinary block comment we still owe the caller a
    /// token (or EOF); recurse into the normal scanning loop.
    fn scan_token_or_eof(&mut self, _line: usize, _column: usize) -> Result<Token, Diagnostic> {
        self.skip_whitespace_and_line_comments();
        if self.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, self.line, self.column));
        }
        self.scan_token()
    }

    fn scan_number(&mut self) -> TokenKind {
        let mut value = String::new();
        value.push(self.source[self.current - 1]);

        while !self.is_at_end() && self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        TokenKind::IntLit(value.parse().unwrap_or(0))
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let mut value = String::new();
        value.push(self.source[self.current - 1]);

        while !self.is_at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
            value.push(self.advance());
        }

        match value.as_str() {
            "function" => TokenKind::Function,
            "pure" => TokenKind::Pure,
            "uses" => TokenKind::Uses,
            "return" => TokenKind::Return,
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "guard" => TokenKind::Guard,
            "match" => TokenKind::Match,
            "module" => TokenKind::Module,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "from" => TokenKind::From,
            "Result" => TokenKind::KwResult,
            "Ok" => TokenKind::KwOk,
            "Error" => TokenKind::KwError,
            "Some" => TokenKind::KwSome,
            "None" => TokenKind::KwNone,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "Database" => TokenKind::EffectDatabase,
            "Network" => TokenKind::EffectNetwork,
            "Logging" => TokenKind::EffectLogging,
            "FileSystem" => TokenKind::EffectFileSystem,
            "Memory" => TokenKind::EffectMemory,
            "IO" => TokenKind::EffectIO,
            _ => TokenKind::Ident(value),
        }
    }

    fn skip_whitespace_and_line_comments(&mut self) {
        loop {
            if self.is_at_end() {
                break;
            }
            match self.peek() {
                ' ' | '\r' | '\t' | '\n' => {
                    self.advance();
                }
                '/' if self.peek_at(1) == Some('/') => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.source[self.current];
        self.current += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn peek(&self) -> char {
        self.source[self.current]
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.current + offset).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn error(&self, rule: &'static str, line: usize, column: usize, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(rule, message).with_span(Span::point(line, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<Token>, DiagnosticSink) {
        let mut sink = DiagnosticSink::new();
        let tokens = Scanner::new(source).scan_tokens(&mut sink);
        (tokens, sink)
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let (tokens, sink) = lex("pure function f() -> int { return 1 }");
        assert!(sink.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Pure);
        assert_eq!(tokens[1].kind, TokenKind::Function);
        assert_eq!(tokens[2].kind, TokenKind::Ident("f".to_string()));
    }

    #[test]
    fn lexes_effect_names() {
        let (tokens, _) = lex("uses [Database, Network]");
        assert_eq!(tokens[2].kind, TokenKind::EffectDatabase);
        assert_eq!(tokens[4].kind, TokenKind::EffectNetwork);
    }

    #[test]
    fn unterminated_string_is_a_diagnostic_and_resyncs() {
        let (tokens, sink) = lex("let x = \"oops\nlet y = 1");
        assert_eq!(sink.error_count(), 1);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Let));
    }

    #[test]
    fn interpolated_string_splits_segments() {
        let (tokens, sink) = lex(r#"$"Hello {name}, you have {n + 1} messages""#);
        assert!(sink.is_empty());
        match &tokens[0].kind {
            TokenKind::InterpolatedStringLit(segments) => {
                assert_eq!(segments.len(), 4);
                assert_eq!(segments[0], InterpolatedSegment::Literal("Hello ".to_string()));
                assert_eq!(segments[1], InterpolatedSegment::Expr("name".to_string()));
            }
            other => panic!("expected interpolated string, got {other:?}"),
        }
    }

    #[test]
    fn nested_braces_in_interpolation_are_rejected() {
        let (_, sink) = lex(r#"$"a {b{c}} d""#);
        assert!(sink.has_errors());
    }

    #[test]
    fn spec_block_comment_is_captured_as_token() {
        let (tokens, sink) = lex("/*spec\nintent: add two numbers\n*/\nfunction f() -> int { return 1 }");
        assert!(sink.is_empty());
        match &tokens[0].kind {
            TokenKind::SpecComment(body) => assert!(body.contains("intent")),
            other => panic!("expected spec comment, got {other:?}"),
        }
    }

    #[test]
    fn line_comments_are_skipped() {
        let (tokens, sink) = lex("// comment\nlet x = 1");
        assert!(sink.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Let);
    }
}
