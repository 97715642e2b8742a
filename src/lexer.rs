use crate::error::{LambError, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Semicolon,
    Assign,
    Lambda,

    // Literals
    Name,
    Integer,

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }
}

/// `[A-Za-z0-9_]`, the continuation class shared by names and integers.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, LambError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            String::new(),
            Span::new(self.current, self.current, self.line),
        ));

        Ok(self.tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Result<(), LambError> {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            ',' => self.add_token(TokenType::Comma),
            ':' => self.add_token(TokenType::Colon),
            ';' => self.add_token(TokenType::Semicolon),
            '=' => self.add_token(TokenType::Assign),
            'λ' => self.add_token(TokenType::Lambda),
            '#' => {
                // Comment goes until end of line
                while self.peek() != Some('\n') && !self.is_at_end() {
                    self.advance();
                }
            }
            '\n' => self.line += 1,
            c if c.is_whitespace() => {}
            c if c.is_ascii_digit() => self.integer(),
            c if is_name_char(c) => self.name(),
            _ => {
                return Err(LambError::lex_error(
                    Span::single(self.start, self.line),
                    format!("Unknown character '{}'", c),
                )
                .with_help("Only names, integers, comments and the symbols , : ; = ( ) [ ] λ are allowed."));
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    // A run starting with a digit takes only digits; `12ab` is INTEGER then NAME.
    fn integer(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        self.add_token(TokenType::Integer);
    }

    fn name(&mut self) {
        while self.peek().is_some_and(is_name_char) {
            self.advance();
        }
        self.add_token(TokenType::Name);
    }

    fn add_token(&mut self, token_type: TokenType) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(
            token_type,
            lexeme,
            Span::new(self.start, self.current, self.line),
        ));
    }
}

/// Converts source text into tokens, ending with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LambError> {
    Lexer::new(source).scan_tokens()
}
