//! Recursive-descent parser turning a token stream into a [`SkillLineAst`].
//!
//! Parsing never fails outright: structural problems are collected as
//! [`ParseError`]s next to a best-effort AST, and oddities that don't stop
//! the parse become [`ParseWarning`]s. Only the lexer has a hard error.

use log::debug;
use serde::Serialize;
use thiserror::Error;

use skilline_data::{HealthModifier, HealthOp, InlineCondition, SkillLineAst, Targeter, Trigger};

use crate::lexer::{LexError, Token, TokenKind, tokenize};

mod helpers;
mod params;

pub(crate) use helpers::is_bool_word;

/// A structural problem that stopped the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
    /// Text of the offending token, if there was one.
    pub token: Option<String>,
}

/// Something suspicious that did not change the shape of the AST.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} at position {position}")]
pub struct ParseWarning {
    pub message: String,
    pub position: usize,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserOptions {
    /// Capture any trailing decimal number as chance, warning when it falls
    /// outside `0.0..=1.0`, instead of only in-range values.
    pub lenient_chance: bool,
}

/// Best-effort AST plus everything the parser noticed on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub ast: SkillLineAst,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    options: ParserOptions,
    warnings: Vec<ParseWarning>,
}

impl<'a> Parser<'a> {
    /// `tokens` should come from [`tokenize`] and end with an EOF token.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            options: ParserOptions::default(),
            warnings: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse(mut self) -> ParseOutcome {
        let mut ast = SkillLineAst::default();
        let mut errors = Vec::new();
        match self.skill_line(&mut ast) {
            Ok(()) => {
                if let Some(tok) = self.peek().filter(|t| !t.is(TokenKind::Eof)) {
                    let tok = tok.clone();
                    self.warn(&tok, format!("Ignored trailing input starting at '{}'", tok.text));
                }
            },
            Err(err) => errors.push(err),
        }
        for e in &errors {
            debug!("parse error: {e}");
        }
        for w in &self.warnings {
            debug!("parse warning: {w}");
        }
        ParseOutcome {
            ast,
            errors,
            warnings: self.warnings,
        }
    }

    fn skill_line(&mut self, ast: &mut SkillLineAst) -> Result<(), ParseError> {
        // "- " list marker when the line was copied out of a skill block
        self.eat(TokenKind::Minus);

        ast.mechanic = self.expect(TokenKind::Identifier, "Expected mechanic name")?.text.clone();

        if self.check(TokenKind::LBrace) {
            ast.parameters = Some(self.params()?).filter(|p| !p.is_empty());
        }

        if self.eat(TokenKind::At) {
            let kind = self.expect(TokenKind::Identifier, "Expected targeter type after '@'")?.text.clone();
            let mut targeter = Targeter::new(kind);
            if self.check(TokenKind::LBrace) {
                targeter.options = Some(self.params()?).filter(|p| !p.is_empty());
            }
            ast.targeter = Some(targeter);
        }

        if self.eat(TokenKind::Tilde) {
            ast.trigger = Some(self.trigger()?);
        }

        while self.eat(TokenKind::Question) {
            let condition = self.inline_condition()?;
            ast.inline_conditions.push(condition);
        }

        if let Some(op) = self.peek().and_then(health_op) {
            self.advance();
            ast.health_modifier = Some(HealthModifier::new(op, self.health_value()));
        }

        ast.chance = self.chance();
        Ok(())
    }

    fn trigger(&mut self) -> Result<Trigger, ParseError> {
        let text = self.expect(TokenKind::Identifier, "Expected trigger name after '~'")?.text.clone();

        // `onTimer: 100` lexes as "onTimer:" then a number.
        if let Some(name) = text.strip_suffix(':') {
            if let Some(value) = self.trigger_value(0) {
                return Ok(Trigger::with_value(name, value));
            }
        }
        // `onTimer : 100`
        if self.check(TokenKind::Colon) {
            if let Some(value) = self.trigger_value(1) {
                return Ok(Trigger::with_value(text, value));
            }
        }
        Ok(Trigger::from_fused(&text))
    }

    /// Integer tick count `ahead` tokens on; consumes it and anything before it.
    fn trigger_value(&mut self, ahead: usize) -> Option<String> {
        let tok = self.tokens.get(self.pos + ahead).filter(|t| t.is(TokenKind::Number))?;
        let digits = tok.text.strip_prefix('-').unwrap_or(&tok.text);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.pos += ahead + 1;
        Some(tok.text.clone())
    }

    fn inline_condition(&mut self) -> Result<InlineCondition, ParseError> {
        let negated = self.eat(TokenKind::Bang);
        let name = self.expect(TokenKind::Identifier, "Expected condition name after '?'")?.text.clone();
        let params = if self.check(TokenKind::LBrace) {
            Some(self.raw_braces()?)
        } else {
            None
        };
        Ok(InlineCondition { negated, name, params })
    }

    /// Reads `-`? NUMBER (`-`? NUMBER)?; an absent value is only a warning.
    fn health_value(&mut self) -> String {
        let mut value = String::new();
        if self.check(TokenKind::Minus) && self.check_at(1, TokenKind::Number) {
            self.advance();
            value.push('-');
        }
        match self.eat_text(TokenKind::Number) {
            Some(first) => value.push_str(&first),
            None => {
                if let Some(tok) = self.peek().cloned() {
                    self.warn(&tok, "Health modifier has no value");
                }
                return value;
            },
        }

        if self.check(TokenKind::Minus) && self.check_at(1, TokenKind::Number) {
            self.advance();
            value.push('-');
            value.push_str(&self.eat_text(TokenKind::Number).unwrap_or_default());
        } else if self.peek().is_some_and(|t| t.is(TokenKind::Number) && t.text.starts_with('-')) {
            // `30%-50%` lexes the upper bound as its own signed number.
            value.push_str(&self.eat_text(TokenKind::Number).unwrap_or_default());
        }
        value
    }

    fn chance(&mut self) -> Option<f64> {
        let tok = self.peek().filter(|t| t.is(TokenKind::Number))?.clone();
        if !tok.text.contains('.') || tok.text.ends_with('%') {
            return None;
        }
        let value: f64 = tok.text.parse().ok()?;
        let in_range = (0.0..=1.0).contains(&value);
        if !in_range && !self.options.lenient_chance {
            return None;
        }
        self.advance();
        if !in_range {
            self.warn(&tok, format!("Chance {value} is outside the typical range 0.0-1.0"));
        }
        Some(value)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.check_at(0, kind)
    }

    fn check_at(&self, ahead: usize, kind: TokenKind) -> bool {
        self.tokens.get(self.pos + ahead).is_some_and(|t| t.is(kind))
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos)?;
        if !tok.is(TokenKind::Eof) {
            self.pos += 1;
        }
        Some(tok)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_text(&mut self, kind: TokenKind) -> Option<String> {
        if self.check(kind) {
            self.advance().map(|t| t.text.clone())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<&'a Token, ParseError> {
        match self.peek() {
            Some(tok) if tok.is(kind) => {
                self.advance();
                Ok(tok)
            },
            other => Err(self.error_at(other, message)),
        }
    }

    fn error_at(&self, tok: Option<&Token>, message: &str) -> ParseError {
        let position = tok.map_or_else(|| self.end_position(), |t| t.position);
        let message = match tok {
            Some(t) if t.is(TokenKind::Eof) => format!("{message}, found end of input"),
            Some(t) => format!("{message}, found '{}'", t.text),
            None => message.to_string(),
        };
        ParseError {
            message,
            position,
            token: tok.filter(|t| !t.is(TokenKind::Eof)).map(|t| t.text.clone()),
        }
    }

    fn end_position(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.position)
    }

    fn warn(&mut self, tok: &Token, message: impl Into<String>) {
        self.warnings.push(ParseWarning {
            message: message.into(),
            position: tok.position,
            token: (!tok.is(TokenKind::Eof)).then(|| tok.text.clone()),
        });
    }
}

fn health_op(tok: &Token) -> Option<HealthOp> {
    match tok.kind {
        TokenKind::Less => Some(HealthOp::Below),
        TokenKind::Equals => Some(HealthOp::Equal),
        TokenKind::Greater => Some(HealthOp::Above),
        _ => None,
    }
}

/// Tokenize and parse one skill line with default options.
///
/// # Errors
/// Only lexing can fail; see [`LexError`]. Parse problems are reported in
/// the returned [`ParseOutcome`].
///
/// ```
/// use skilline_script::parse_skill_line;
///
/// let out = parse_skill_line("damage{amount=10} @target ~onAttack 0.5").expect("lex");
/// assert!(out.is_ok());
/// assert_eq!(out.ast.mechanic, "damage");
/// assert_eq!(out.ast.chance, Some(0.5));
/// ```
pub fn parse_skill_line(input: &str) -> Result<ParseOutcome, LexError> {
    parse_skill_line_with(input, ParserOptions::default())
}

/// Like [`parse_skill_line`] with explicit [`ParserOptions`].
///
/// # Errors
/// Returns a [`LexError`] for an unterminated quoted string.
pub fn parse_skill_line_with(input: &str, options: ParserOptions) -> Result<ParseOutcome, LexError> {
    let tokens = tokenize(input)?;
    Ok(Parser::new(&tokens).with_options(options).parse())
}

/// One parsed line of a skill block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLine {
    /// 1-based line number in the block.
    pub line: usize,
    pub source: String,
    pub outcome: Result<ParseOutcome, LexError>,
}

/// Parse a block of `- <skill line>` entries, skipping blank lines and
/// `#` comments.
pub fn parse_skill_block(text: &str, options: ParserOptions) -> Vec<BlockLine> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let source = raw.trim();
            if source.is_empty() || source.starts_with('#') {
                return None;
            }
            Some(BlockLine {
                line: idx + 1,
                source: source.to_string(),
                outcome: parse_skill_line_with(source, options),
            })
        })
        .collect()
}
