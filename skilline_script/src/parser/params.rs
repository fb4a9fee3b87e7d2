use skilline_data::{ParamValue, Params};

use super::helpers::{number_value, unescape, word_value};
use super::{ParseError, Parser};
use crate::lexer::TokenKind;

impl Parser<'_> {
    /// `{ key=value (; key=value)* }`, tolerating a trailing `;`.
    pub(super) fn params(&mut self) -> Result<Params, ParseError> {
        self.expect(TokenKind::LBrace, "Expected '{'")?;
        let mut params = Params::new();
        if self.eat(TokenKind::RBrace) {
            return Ok(params);
        }
        loop {
            let key = self.expect(TokenKind::Identifier, "Expected parameter name")?.text.clone();
            self.expect(TokenKind::Equals, "Expected '=' after parameter name")?;
            let value = self.value()?;
            params.insert(key, value);

            if self.eat(TokenKind::Semicolon) {
                if self.eat(TokenKind::RBrace) {
                    break;
                }
                continue;
            }
            self.expect(TokenKind::RBrace, "Expected ';' or '}' in parameter list")?;
            break;
        }
        Ok(params)
    }

    fn value(&mut self) -> Result<ParamValue, ParseError> {
        let Some(tok) = self.peek() else {
            return Err(self.error_at(None, "Expected parameter value"));
        };
        let value = match tok.kind {
            TokenKind::String => ParamValue::Text(unescape(&tok.text)),
            TokenKind::Number => number_value(&tok.text),
            TokenKind::Identifier => word_value(&tok.text),
            TokenKind::LBracket => return self.list().map(ParamValue::List),
            _ => return Err(self.error_at(Some(tok), "Expected parameter value")),
        };
        self.advance();
        Ok(value)
    }

    /// Raw token texts between `[` and its matching `]`.
    fn list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(TokenKind::LBracket, "Expected '['")?;
        let mut items = Vec::new();
        let mut depth = 0usize;
        loop {
            let Some(tok) = self.peek() else { break };
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::RBracket if depth == 0 => {
                    self.advance();
                    return Ok(items);
                },
                TokenKind::RBracket => depth -= 1,
                TokenKind::LBracket => depth += 1,
                _ => {},
            }
            items.push(tok.text.clone());
            self.advance();
        }
        Err(self.error_at(self.peek(), "Unterminated list value, expected ']'"))
    }

    /// A `{...}` group copied verbatim, nested braces included.
    pub(super) fn raw_braces(&mut self) -> Result<String, ParseError> {
        let mut raw = String::new();
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Eof => break,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {},
            }
            raw.push_str(&tok.text);
            self.advance();
            if depth == 0 {
                return Ok(raw);
            }
        }
        Err(self.error_at(self.peek(), "Unterminated condition parameters, expected '}'"))
    }
}
