//! Tokenizer for the skill-line micro-syntax.
//!
//! Produces a flat token list terminated by [`TokenKind::Eof`]. Positions are
//! byte offsets into the source line.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Equals,
    At,
    Tilde,
    Question,
    Less,
    Greater,
    Bang,
    Colon,
    Minus,
    Eof,
}

impl TokenKind {
    fn from_symbol(c: char) -> Option<Self> {
        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            '=' => TokenKind::Equals,
            '@' => TokenKind::At,
            '~' => TokenKind::Tilde,
            '?' => TokenKind::Question,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '!' => TokenKind::Bang,
            ':' => TokenKind::Colon,
            '-' => TokenKind::Minus,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Equals => "'='",
            TokenKind::At => "'@'",
            TokenKind::Tilde => "'~'",
            TokenKind::Question => "'?'",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::Bang => "'!'",
            TokenKind::Colon => "':'",
            TokenKind::Minus => "'-'",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; quoted strings keep their delimiters and escapes.
    pub text: String,
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: &str, position: usize) -> Self {
        Self {
            kind,
            text: text.to_string(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: usize },
}

struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    idx: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            idx: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).map(|&(_, c)| c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.idx + ahead).map(|&(_, c)| c)
    }

    /// Byte offset of the current char, or the end of input.
    fn offset(&self) -> usize {
        self.chars.get(self.idx).map_or(self.src.len(), |&(o, _)| o)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.idx += 1;
        }
    }

    fn number(&mut self) -> Token {
        let start = self.offset();
        if self.peek() == Some('-') {
            self.idx += 1;
        }
        self.bump_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.idx += 1;
            self.bump_while(|c| c.is_ascii_digit());
        }
        if self.peek() == Some('%') {
            self.idx += 1;
        }
        Token::new(TokenKind::Number, &self.src[start..self.offset()], start)
    }

    fn string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.offset();
        self.idx += 1;
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedString { position: start }),
                Some('\\') => {
                    // The escaped char passes through; a trailing backslash
                    // leaves the string unterminated.
                    self.idx += 2;
                    if self.idx > self.chars.len() {
                        return Err(LexError::UnterminatedString { position: start });
                    }
                },
                Some(c) if c == quote => {
                    self.idx += 1;
                    return Ok(Token::new(TokenKind::String, &self.src[start..self.offset()], start));
                },
                Some(_) => self.idx += 1,
            }
        }
    }

    fn identifier(&mut self) -> Token {
        let start = self.offset();
        self.bump_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-'));
        Token::new(TokenKind::Identifier, &self.src[start..self.offset()], start)
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => self.idx += 1,
                '"' | '\'' => tokens.push(self.string(c)?),
                '-' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => tokens.push(self.number()),
                c if c.is_ascii_digit() => tokens.push(self.number()),
                c if c.is_ascii_alphabetic() => tokens.push(self.identifier()),
                c => {
                    if let Some(kind) = TokenKind::from_symbol(c) {
                        let at = self.offset();
                        tokens.push(Token::new(kind, &self.src[at..at + c.len_utf8()], at));
                    }
                    self.idx += 1;
                },
            }
        }
        tokens.push(Token::new(TokenKind::Eof, "", self.src.len()));
        Ok(tokens)
    }
}

/// Split a skill line into tokens.
///
/// # Errors
/// Returns [`LexError::UnterminatedString`] if a quoted string never closes.
///
/// ```
/// use skilline_script::lexer::{TokenKind, tokenize};
///
/// let tokens = tokenize("damage{amount=10} @target 0.5").unwrap();
/// let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds.first(), Some(&TokenKind::Identifier));
/// assert_eq!(kinds.last(), Some(&TokenKind::Eof));
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).run()
}
