use super::{PResult, Parser, Type};
use crate::lexer::TokenKind;

impl Parser {
    /// `type := 'int' | 'string' | 'bool' | 'Result' '<' type ',' type '>'
    ///        | 'Option' '<' type '>' | 'List' '<' type '>' | Ident`
    /// (spec §3/§4.2). Only `Result` is a reserved word; the other built-in
    /// type names are ordinary identifiers disambiguated here.
    pub(crate) fn parse_type(&mut self) -> PResult<Type> {
        if self.match_token(&TokenKind::KwResult) {
            self.consume(TokenKind::Less)?;
            let ok = self.parse_type()?;
            self.consume(TokenKind::Comma)?;
            let err = self.parse_type()?;
            self.consume(TokenKind::Greater)?;
            return Ok(Type::Result(Box::new(ok), Box::new(err)));
        }

        let name = self.consume_ident()?;
        match name.as_str() {
            "int" => Ok(Type::Int),
            "string" => Ok(Type::String),
            "bool" => Ok(Type::Bool),
            "Option" => {
                self.consume(TokenKind::Less)?;
                let inner = self.parse_type()?;
                self.consume(TokenKind::Greater)?;
                Ok(Type::Option(Box::new(inner)))
            }
            "List" => {
                self.consume(TokenKind::Less)?;
                let inner = self.parse_type()?;
                self.consume(TokenKind::Greater)?;
                Ok(Type::List(Box::new(inner)))
            }
            other => Ok(Type::Named(other.to_string())),
        }
    }
}
