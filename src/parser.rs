use crate::ast::{Expr, Program, Record, Stmt};
use crate::error::{LambError, Span};
use crate::lexer::{Token, TokenType};

/// Tokens that end a juxtaposition sequence.
const EXPRESSION_ENDINGS: [TokenType; 4] = [
    TokenType::RightParen,
    TokenType::RightBracket,
    TokenType::Comma,
    TokenType::Semicolon,
];

/// Tokens after a record's `]` that keep it from being applied to the
/// expression that follows.
const RECORD_ENDINGS: [TokenType; 5] = [
    TokenType::Semicolon,
    TokenType::RightParen,
    TokenType::RightBracket,
    TokenType::Comma,
    TokenType::LeftBracket,
];

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |token| token.token_type != TokenType::Eof) {
            let end = tokens.last().map_or(Span::default(), |token| {
                Span::new(token.span.end, token.span.end, token.span.line)
            });
            tokens.push(Token::new(TokenType::Eof, String::new(), end));
        }
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Program, LambError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.statement()?);
        }

        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, LambError> {
        let start = self.peek().span.clone();

        let expr = if self.check(TokenType::Name) && self.check_next(TokenType::Assign) {
            let target = self.advance().lexeme.clone();
            self.advance(); // the '='
            let value = self.expression()?;
            Expr::Assign {
                target,
                value: Box::new(value),
            }
        } else {
            self.expression()?
        };

        let span = start.to(&self.previous().span);

        if !self.match_types(&[TokenType::Semicolon]) && !self.is_at_end() {
            let token = self.peek();
            return Err(LambError::parse_error_with_help(
                token.span.clone(),
                format!("Expected ';' after statement, found '{}'", token.lexeme),
                "Statements are separated by ';'.",
            ));
        }

        Ok(Stmt { expr, span })
    }

    /// A maximal sequence of atoms, folded left into applications:
    /// `a b c` is `((a b) c)`.
    fn expression(&mut self) -> Result<Expr, LambError> {
        let mut atoms = Vec::new();

        while !self.is_at_end() && !self.check_any(&EXPRESSION_ENDINGS) {
            atoms.push(self.atom()?);
        }

        let mut atoms = atoms.into_iter();
        let first = match atoms.next() {
            Some(first) => first,
            None => {
                let token = self.peek();
                let found = if token.token_type == TokenType::Eof {
                    "end of input".to_string()
                } else {
                    format!("'{}'", token.lexeme)
                };
                return Err(LambError::parse_error(
                    token.span.clone(),
                    format!("Expected expression, found {}", found),
                ));
            }
        };

        Ok(atoms.fold(first, Expr::apply))
    }

    fn atom(&mut self) -> Result<Expr, LambError> {
        let token = self.peek().clone();

        match token.token_type {
            TokenType::Integer => {
                self.advance();
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    LambError::parse_error(
                        token.span.clone(),
                        format!("Invalid integer '{}'", token.lexeme),
                    )
                })?;
                Ok(Expr::Integer(value))
            }
            TokenType::Name => {
                self.advance();
                Ok(Expr::Name {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(
                    TokenType::RightParen,
                    "Expected ')' after expression",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'.",
                )?;
                Ok(expr)
            }
            TokenType::Lambda => self.function(),
            TokenType::LeftBracket => self.record(),
            _ => Err(LambError::parse_error_with_help(
                token.span,
                format!("Unexpected token '{}' in expression", token.lexeme),
                "Expressions are built from integers, names, (...), λ(...): ... and [...].",
            )),
        }
    }

    /// `[name = expr, ...]`, applied to the following expression unless the
    /// record is directly followed by `; ) ] , [` or the end of input.
    fn record(&mut self) -> Result<Expr, LambError> {
        self.consume(
            TokenType::LeftBracket,
            "Expected '[' at start of record",
            "Records are written [name = expr, ...].",
        )?;

        let mut record = Record::new();
        while !self.check(TokenType::RightBracket) && !self.is_at_end() {
            let name = self
                .consume(
                    TokenType::Name,
                    "Expected field name in record",
                    "Records are written [name = expr, ...].",
                )?
                .lexeme
                .clone();
            self.consume(
                TokenType::Assign,
                "Expected '=' after record field name",
                "Records are written [name = expr, ...].",
            )?;
            let value = self.expression()?;
            record.insert(name, value);

            if !self.match_types(&[TokenType::Comma]) {
                break;
            }
        }

        self.consume(
            TokenType::RightBracket,
            "Expected ']' after record fields",
            "Records must be closed with ']'. Example: [x = 1, y = 2]",
        )?;

        let record = Expr::Env(record);
        if self.is_at_end() || self.check_any(&RECORD_ENDINGS) {
            return Ok(record);
        }
        Ok(Expr::apply(record, self.expression()?))
    }

    /// `λ(a, b): body`, desugared to `λ(a): λ(b): body`.
    fn function(&mut self) -> Result<Expr, LambError> {
        self.consume(
            TokenType::Lambda,
            "Expected 'λ' at start of function",
            "Functions are written λ(x, y): body.",
        )?;
        self.consume(
            TokenType::LeftParen,
            "Expected '(' after 'λ'",
            "Functions are written λ(x, y): body.",
        )?;

        let mut params = Vec::new();
        loop {
            let param = self.consume(
                TokenType::Name,
                "Expected parameter name in λ parameter list",
                "Functions take at least one parameter: λ(x): body.",
            )?;
            params.push(param.lexeme.clone());
            if !self.match_types(&[TokenType::Comma]) {
                break;
            }
        }

        self.consume(
            TokenType::RightParen,
            "Expected ')' after λ parameter list",
            "Functions are written λ(x, y): body.",
        )?;
        self.consume(
            TokenType::Colon,
            "Expected ':' after λ parameter list",
            "Functions are written λ(x, y): body.",
        )?;

        let body = self.expression()?;
        Ok(params
            .into_iter()
            .rev()
            .fold(body, |body, param| Expr::function(param, body)))
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        if self.check_any(types) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token_type: TokenType) -> bool {
        !self.is_at_end() && self.peek().token_type == token_type
    }

    fn check_any(&self, types: &[TokenType]) -> bool {
        types.iter().any(|token_type| self.check(*token_type))
    }

    fn check_next(&self, token_type: TokenType) -> bool {
        self.seek(1)
            .is_some_and(|token| token.token_type == token_type)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn seek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.current + offset)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: &str,
    ) -> Result<&Token, LambError> {
        if self.check(token_type) {
            return Ok(self.advance());
        }

        let token = self.peek();
        let found = if token.token_type == TokenType::Eof {
            "end of input".to_string()
        } else {
            format!("'{}'", token.lexeme)
        };
        Err(LambError::parse_error_with_help(
            token.span.clone(),
            format!("{}, found {}", message, found),
            help,
        ))
    }
}

/// Parses a token stream into its statements.
pub fn parse(tokens: Vec<Token>) -> Result<Program, LambError> {
    Parser::new(tokens).parse()
}
